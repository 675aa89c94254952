//! The server-side frame decoder.
//!
//! Couples the head decoder with the per-message body decoder: after a
//! head completes, payload items flow until `Eof`, then the next head is
//! parsed from whatever bytes are already buffered. That carry-over is
//! how keep-alive messages reframe across arbitrary read boundaries
//! without copying.

use bytes::BytesMut;
use tokio_util::codec::Decoder;
use tracing::debug;

use crate::codec::body::PayloadDecoder;
use crate::codec::head::RequestHeadDecoder;
use crate::ensure;
use crate::protocol::{Message, ParseError, PayloadItem, RequestHead};

/// A decoder for HTTP requests that yields the head, then the body's
/// payload items.
///
/// # State machine
///
/// The decoder's phase lives in the `payload_decoder` field:
/// - `None`: expecting a head
/// - `Some(_)`: expecting body data for the current message
pub struct RequestDecoder {
    head_decoder: RequestHeadDecoder,
    payload_decoder: Option<PayloadDecoder>,
    debug: bool,
}

impl RequestDecoder {
    pub fn new() -> Self {
        Default::default()
    }

    /// Emit state transitions through `tracing` at debug level.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

impl Default for RequestDecoder {
    fn default() -> Self {
        Self { head_decoder: RequestHeadDecoder, payload_decoder: None, debug: false }
    }
}

impl Decoder for RequestDecoder {
    type Item = Message<RequestHead>;
    type Error = ParseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        // forward to the body decoder while one is active
        if let Some(payload_decoder) = &mut self.payload_decoder {
            let message = match payload_decoder.decode(src)? {
                Some(item @ PayloadItem::Eof) => {
                    if self.debug {
                        debug!(leftover = src.len(), "request body finished, expecting next head");
                    }
                    self.payload_decoder.take();
                    Some(Message::Payload(item))
                }
                Some(item) => Some(Message::Payload(item)),
                None => None,
            };

            return Ok(message);
        }

        // parse the next request head
        let message = match self.head_decoder.decode(src)? {
            Some((head, payload_decoder)) => {
                if self.debug {
                    debug!(uri = head.uri(), "request head decoded, expecting body");
                }
                self.payload_decoder = Some(payload_decoder);
                Some(Message::Header(head))
            }
            None => None,
        };

        Ok(message)
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(item) = self.decode(src)? {
            return Ok(Some(item));
        }

        // end-of-transport is clean only between messages
        ensure!(
            src.is_empty() && self.payload_decoder.is_none(),
            ParseError::bad_request("unexpected end of stream inside a message")
        );
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn next_chunk(decoder: &mut RequestDecoder, src: &mut BytesMut) -> Bytes {
        decoder.decode(src).unwrap().unwrap().into_payload_item().unwrap().into_bytes().unwrap()
    }

    #[test]
    fn head_then_payload_then_next_head() {
        let mut decoder = RequestDecoder::new();
        let mut src = BytesMut::from(
            "POST /a HTTP/1.1\r\nContent-Length: 3\r\n\r\nabcGET /b HTTP/1.1\r\n\r\n",
        );

        let head = match decoder.decode(&mut src).unwrap().unwrap() {
            Message::Header(head) => head,
            Message::Payload(_) => panic!("expected a head first"),
        };
        assert_eq!(head.uri(), "/a");

        assert_eq!(&next_chunk(&mut decoder, &mut src)[..], b"abc");
        assert!(decoder.decode(&mut src).unwrap().unwrap().into_payload_item().unwrap().is_eof());

        // the second head parses from the carried-over bytes
        let head = match decoder.decode(&mut src).unwrap().unwrap() {
            Message::Header(head) => head,
            Message::Payload(_) => panic!("expected the second head"),
        };
        assert_eq!(head.uri(), "/b");
    }

    #[test]
    fn message_without_body_yields_immediate_eof() {
        let mut decoder = RequestDecoder::new();
        let mut src = BytesMut::from("GET / HTTP/1.1\r\n\r\n");

        assert!(decoder.decode(&mut src).unwrap().unwrap().is_header());
        assert!(decoder.decode(&mut src).unwrap().unwrap().into_payload_item().unwrap().is_eof());
        assert!(decoder.decode(&mut src).unwrap().is_none());
    }

    #[test]
    fn eof_between_messages_is_clean() {
        let mut decoder = RequestDecoder::new();
        let mut src = BytesMut::new();
        assert!(decoder.decode_eof(&mut src).unwrap().is_none());
    }

    #[test]
    fn eof_inside_a_head_is_an_error() {
        let mut decoder = RequestDecoder::new();
        let mut src = BytesMut::from("GET / HT");
        assert!(decoder.decode(&mut src).unwrap().is_none());
        assert!(matches!(decoder.decode_eof(&mut src), Err(ParseError::BadRequest { .. })));
    }

    #[test]
    fn eof_inside_a_body_is_an_error() {
        let mut decoder = RequestDecoder::new();
        let mut src = BytesMut::from("POST / HTTP/1.1\r\nContent-Length: 10\r\n\r\nabc");

        assert!(decoder.decode(&mut src).unwrap().unwrap().is_header());
        assert_eq!(&next_chunk(&mut decoder, &mut src)[..], b"abc");
        assert!(decoder.decode(&mut src).unwrap().is_none());
        assert!(matches!(decoder.decode_eof(&mut src), Err(ParseError::BadRequest { .. })));
    }
}
