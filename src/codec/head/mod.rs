//! Message-head decoding.
//!
//! A head is the start line plus the field block, terminated by an empty
//! line. The decoders here wait until the whole block is buffered, then
//! commit it in one pass: nothing is consumed from the read buffer until
//! the terminating blank line has arrived, so a partial head survives any
//! read-boundary split.

mod request_decoder;
mod response_decoder;

pub use request_decoder::RequestHeadDecoder;
pub use response_decoder::ResponseHeadDecoder;

use bytes::BytesMut;

use crate::codec::body::PayloadDecoder;
use crate::codec::line::take_crlf_line;
use crate::ensure;
use crate::protocol::{Fields, ParseError, Role};

const MAX_HEAD_BYTES: usize = 8 * 1024;

/// Splits off the head block, terminator included, once it is fully
/// buffered. Guards the size limit on both complete and partial heads.
fn take_head_block(src: &mut BytesMut, role: Role) -> Result<Option<BytesMut>, ParseError> {
    match src.windows(4).position(|window| window == b"\r\n\r\n") {
        Some(pos) => {
            let end = pos + 4;
            ensure!(
                end <= MAX_HEAD_BYTES,
                role.bad_message(format!("head section of {end} bytes exceeds the {MAX_HEAD_BYTES} byte limit"))
            );
            Ok(Some(src.split_to(end)))
        }
        None => {
            ensure!(
                src.len() <= MAX_HEAD_BYTES,
                role.bad_message(format!("head section unterminated after {MAX_HEAD_BYTES} bytes"))
            );
            Ok(None)
        }
    }
}

/// Parses the field lines of a head block into `fields`, applying the
/// folding and duplicate-combination rules.
fn parse_fields(block: &mut BytesMut, role: Role, fields: &mut Fields) -> Result<(), ParseError> {
    let mut seen_field = false;
    while let Some(line) = take_crlf_line(block) {
        if line.is_empty() {
            break;
        }

        if line.starts_with(' ') || line.starts_with('\t') {
            ensure!(seen_field, role.bad_message("folded line without a preceding field"));
            fields.extend_last(trim_ows_start(&line));
            continue;
        }

        let (name, value) = match split_field_line(&line) {
            Some(name_value) => name_value,
            None => return Err(role.bad_message(format!("field line without a colon: {line:?}"))),
        };
        fields.insert(role.normalize_field_name(name), value);
        seen_field = true;
    }
    Ok(())
}

/// Splits `name: value` at the first colon; the name is trimmed, the
/// value keeps everything past any leading whitespace.
pub(crate) fn split_field_line(line: &str) -> Option<(&str, &str)> {
    let (name, rest) = line.split_once(':')?;
    Some((name.trim(), trim_ows_start(rest)))
}

fn trim_ows_start(value: &str) -> &str {
    value.trim_start_matches(|c| c == ' ' || c == '\t')
}

/// Selects the body decoder announced by a head's field map.
///
/// Chunked transfer coding fully determines framing, so it wins over a
/// `Content-Length` if both are present.
fn select_payload(role: Role, fields: &Fields) -> Result<PayloadDecoder, ParseError> {
    if let Some(value) = fields.get(&role.normalize_field_name("Transfer-Encoding")) {
        if is_chunked(value) {
            // a trailer section after the zero-size chunk is parsed only
            // when the head announced one
            let trailer_expected = fields.get(&role.normalize_field_name("Trailer")).is_some();
            return Ok(PayloadDecoder::chunked(role, trailer_expected));
        }
    }

    match fields.get(&role.normalize_field_name("Content-Length")) {
        Some(value) => {
            let digits = value.trim();
            ensure!(
                !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()),
                role.bad_message(format!("invalid content-length: {value:?}"))
            );
            let length = digits
                .parse::<u64>()
                .map_err(|_| role.bad_message(format!("content-length out of range: {value:?}")))?;
            Ok(PayloadDecoder::length(length))
        }
        None => Ok(PayloadDecoder::empty()),
    }
}

/// Chunked applies only when it is the final transfer coding.
fn is_chunked(value: &str) -> bool {
    value
        .rsplit(',')
        .next()
        .map(|last_encoding| last_encoding.trim().eq_ignore_ascii_case("chunked"))
        .unwrap_or(false)
}
