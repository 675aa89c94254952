//! Decoder for chunked transfer coding as specified in
//! [RFC 7230 Section 4.1](https://tools.ietf.org/html/rfc7230#section-4.1).
//!
//! Each chunk carries its size in hexadecimal, optionally followed by
//! extensions, which are discarded. A zero-sized chunk ends the body.
//! When the message's head announced a `Trailer` field, the section after
//! the zero-sized chunk is collected into a field map and emitted as its
//! own payload item when non-empty; without the announcement the body
//! ends at the zero-size line and the remaining bytes stay buffered for
//! the next message.

use std::mem;

use bytes::BytesMut;
use tokio_util::codec::Decoder;
use tracing::trace;

use crate::codec::head::split_field_line;
use crate::codec::line::take_crlf_line;
use crate::ensure;
use crate::protocol::{Fields, ParseError, PayloadItem, Role};

/// A decoder for chunked transfer coded bodies.
///
/// Chunk data streams out as it arrives; a chunk split across reads is
/// emitted in several pieces. The trailing CRLF after each chunk's data
/// is validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkedDecoder {
    state: ChunkedState,
    trailers: Fields,
    trailer_expected: bool,
    role: Role,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChunkedState {
    /// Read a chunk size line
    Size,
    /// Stream out chunk data
    Data { remaining: u64 },
    /// Consume the CRLF after chunk data
    DataEnd,
    /// Collect trailer lines after the zero-sized chunk
    Trailer,
    /// Final state after the trailer block
    End,
}

impl ChunkedDecoder {
    /// `trailer_expected` is whether the message's head carried a
    /// `Trailer` field; only then is a trailer section parsed.
    pub fn new(role: Role, trailer_expected: bool) -> Self {
        Self { state: ChunkedState::Size, trailers: Fields::new(), trailer_expected, role }
    }

    /// Parses a size line: the hex digits before any `;`-delimited
    /// extension, which is ignored.
    fn parse_size_line(&self, line: &str) -> Result<u64, ParseError> {
        let size_part = line.split_once(';').map_or(line, |(size, _extension)| size);
        let digits = size_part.trim_end_matches(|c| c == ' ' || c == '\t');
        ensure!(
            !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_hexdigit()),
            self.role.bad_message(format!("invalid chunk size line: {line:?}"))
        );
        u64::from_str_radix(digits, 16)
            .map_err(|_| self.role.bad_message(format!("chunk size overflows u64: {line:?}")))
    }

    fn consume_trailer_line(&mut self, line: &str) -> Result<(), ParseError> {
        if line.starts_with(' ') || line.starts_with('\t') {
            let continuation = line.trim_start_matches(|c| c == ' ' || c == '\t');
            ensure!(
                self.trailers.extend_last(continuation),
                self.role.bad_message("folded trailer line without a preceding trailer")
            );
            return Ok(());
        }

        let (name, value) = match split_field_line(line) {
            Some(name_value) => name_value,
            None => return Err(self.role.bad_message(format!("trailer line without a colon: {line:?}"))),
        };
        self.trailers.insert(self.role.normalize_field_name(name), value);
        Ok(())
    }
}

impl Decoder for ChunkedDecoder {
    type Item = PayloadItem;
    type Error = ParseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            match self.state {
                ChunkedState::Size => {
                    let line = match take_crlf_line(src) {
                        Some(line) => line,
                        None => return Ok(None),
                    };
                    let size = self.parse_size_line(&line)?;
                    self.state = if size != 0 {
                        ChunkedState::Data { remaining: size }
                    } else if self.trailer_expected {
                        ChunkedState::Trailer
                    } else {
                        // no trailer announced: the body ends at the
                        // zero-size line; remaining bytes belong to the
                        // next message
                        ChunkedState::End
                    };
                }

                ChunkedState::Data { remaining } => {
                    if src.is_empty() {
                        return Ok(None);
                    }

                    let len = std::cmp::min(remaining, src.len() as u64);
                    let bytes = src.split_to(len as usize).freeze();

                    let left = remaining - bytes.len() as u64;
                    self.state = if left == 0 {
                        ChunkedState::DataEnd
                    } else {
                        ChunkedState::Data { remaining: left }
                    };

                    trace!(len = bytes.len(), "decoded chunk data");
                    return Ok(Some(PayloadItem::Chunk(bytes)));
                }

                ChunkedState::DataEnd => {
                    if src.len() < 2 {
                        return Ok(None);
                    }
                    let terminator = src.split_to(2);
                    ensure!(
                        &terminator[..] == b"\r\n",
                        self.role.bad_message("chunk data not terminated by CRLF")
                    );
                    self.state = ChunkedState::Size;
                }

                ChunkedState::Trailer => {
                    let line = match take_crlf_line(src) {
                        Some(line) => line,
                        None => return Ok(None),
                    };
                    if line.is_empty() {
                        self.state = ChunkedState::End;
                        if !self.trailers.is_empty() {
                            return Ok(Some(PayloadItem::Trailers(mem::take(&mut self.trailers))));
                        }
                        continue;
                    }
                    self.consume_trailer_line(&line)?;
                }

                ChunkedState::End => {
                    trace!("finished reading chunked data");
                    return Ok(Some(PayloadItem::Eof));
                }
            }
        }
    }
}
