//! Response-head decoder.

use bytes::BytesMut;
use http::StatusCode;
use tokio_util::codec::Decoder;
use tracing::trace;

use crate::codec::body::PayloadDecoder;
use crate::codec::head::{parse_fields, select_payload, take_head_block};
use crate::codec::line::take_crlf_line;
use crate::ensure;
use crate::protocol::{
    Fields, ParseError, ResponseHead, Role, Version, SERVER_PROTOCOL_FIELD, SERVER_STATUS_MESSAGE_FIELD,
};

/// Decodes a status line and field block into a [`ResponseHead`] and the
/// body decoder its field map announces.
///
/// Field names are lowercased; the status line contributes the synthetic
/// `x-server-protocol` and `x-server-status-message` entries.
pub struct ResponseHeadDecoder;

impl Decoder for ResponseHeadDecoder {
    type Item = (ResponseHead, PayloadDecoder);
    type Error = ParseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let mut block = match take_head_block(src, Role::Client)? {
            Some(block) => block,
            None => return Ok(None),
        };

        let status_line = match take_crlf_line(&mut block) {
            Some(line) => line,
            None => return Err(ParseError::bad_response("missing status line")),
        };

        let mut parts = status_line.splitn(3, ' ');
        let (protocol, status) = match (parts.next(), parts.next()) {
            (Some(protocol), Some(status)) => (protocol, status),
            _ => return Err(ParseError::bad_response(format!("malformed status line: {status_line:?}"))),
        };
        // the reason phrase may contain spaces, or be absent entirely
        let reason = parts.next().unwrap_or("");

        let version = Version::parse_token(protocol)?;
        ensure!(
            !status.is_empty() && status.bytes().all(|b| b.is_ascii_digit()),
            ParseError::bad_response(format!("invalid status code: {status:?}"))
        );
        let status = status
            .parse::<u16>()
            .ok()
            .and_then(|code| StatusCode::from_u16(code).ok())
            .ok_or_else(|| ParseError::bad_response(format!("status code out of range: {status:?}")))?;

        let mut fields = Fields::new();
        fields.insert(SERVER_PROTOCOL_FIELD.to_owned(), version.as_str());
        fields.insert(SERVER_STATUS_MESSAGE_FIELD.to_owned(), reason);
        parse_fields(&mut block, Role::Client, &mut fields)?;

        let payload_decoder = select_payload(Role::Client, &fields)?;
        trace!(status = status.as_u16(), "decoded response head");

        Ok(Some((ResponseHead::new(status, reason.to_owned(), version, fields), payload_decoder)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(input: &str) -> Result<Option<(ResponseHead, PayloadDecoder)>, ParseError> {
        ResponseHeadDecoder.decode(&mut BytesMut::from(input))
    }

    #[test]
    fn ok_response_with_content_length() {
        let mut src = BytesMut::from(
            "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: 14\r\n\r\nHello World!\r\n",
        );
        let (head, payload_decoder) = ResponseHeadDecoder.decode(&mut src).unwrap().unwrap();

        assert_eq!(&src[..], b"Hello World!\r\n");
        assert!(!payload_decoder.is_empty());

        assert_eq!(head.status(), StatusCode::OK);
        assert_eq!(head.reason(), "OK");
        assert_eq!(head.version(), Version::Http11);
        assert_eq!(head.field(SERVER_PROTOCOL_FIELD), Some("HTTP/1.1"));
        assert_eq!(head.field(SERVER_STATUS_MESSAGE_FIELD), Some("OK"));
        assert_eq!(head.field("content-type"), Some("text/plain"));
        assert_eq!(head.field("content-length"), Some("14"));
    }

    #[test]
    fn reason_phrase_keeps_its_spaces() {
        let (head, _) = decode("HTTP/1.1 404 Not Found\r\n\r\n").unwrap().unwrap();
        assert_eq!(head.status(), StatusCode::NOT_FOUND);
        assert_eq!(head.reason(), "Not Found");
        assert_eq!(head.field(SERVER_STATUS_MESSAGE_FIELD), Some("Not Found"));
    }

    #[test]
    fn missing_reason_phrase_is_empty() {
        let (head, _) = decode("HTTP/1.1 204\r\n\r\n").unwrap().unwrap();
        assert_eq!(head.status(), StatusCode::NO_CONTENT);
        assert_eq!(head.reason(), "");
        assert_eq!(head.field(SERVER_STATUS_MESSAGE_FIELD), Some(""));
    }

    #[test]
    fn field_names_are_lowercased() {
        let (head, _) = decode("HTTP/1.1 200 OK\r\nX-Custom-Header: yes\r\n\r\n").unwrap().unwrap();
        assert_eq!(head.field("x-custom-header"), Some("yes"));
    }

    #[test]
    fn non_numeric_status_is_rejected() {
        let err = decode("HTTP/1.1 abc OK\r\n\r\n").unwrap_err();
        assert!(matches!(err, ParseError::BadResponse { .. }));
    }

    #[test]
    fn out_of_range_status_is_rejected() {
        let err = decode("HTTP/1.1 1000 Whoa\r\n\r\n").unwrap_err();
        assert!(matches!(err, ParseError::BadResponse { .. }));
    }

    #[test]
    fn unsupported_protocol_is_flagged() {
        let err = decode("HTTP/2.0 200 OK\r\n\r\n").unwrap_err();
        assert_eq!(err.looks_http_ish(), Some(true));
    }
}
