//! The client-side frame decoder.

use bytes::BytesMut;
use tokio_util::codec::Decoder;
use tracing::debug;

use crate::codec::body::PayloadDecoder;
use crate::codec::head::ResponseHeadDecoder;
use crate::ensure;
use crate::protocol::{Message, ParseError, PayloadItem, ResponseHead};

/// A decoder for HTTP responses that yields the head, then the body's
/// payload items. The counterpart of
/// [`RequestDecoder`](crate::codec::RequestDecoder) for the client side
/// of a connection.
pub struct ResponseDecoder {
    head_decoder: ResponseHeadDecoder,
    payload_decoder: Option<PayloadDecoder>,
    debug: bool,
}

impl ResponseDecoder {
    pub fn new() -> Self {
        Default::default()
    }

    /// Emit state transitions through `tracing` at debug level.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

impl Default for ResponseDecoder {
    fn default() -> Self {
        Self { head_decoder: ResponseHeadDecoder, payload_decoder: None, debug: false }
    }
}

impl Decoder for ResponseDecoder {
    type Item = Message<ResponseHead>;
    type Error = ParseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(payload_decoder) = &mut self.payload_decoder {
            let message = match payload_decoder.decode(src)? {
                Some(item @ PayloadItem::Eof) => {
                    if self.debug {
                        debug!(leftover = src.len(), "response body finished, expecting next head");
                    }
                    self.payload_decoder.take();
                    Some(Message::Payload(item))
                }
                Some(item) => Some(Message::Payload(item)),
                None => None,
            };

            return Ok(message);
        }

        let message = match self.head_decoder.decode(src)? {
            Some((head, payload_decoder)) => {
                if self.debug {
                    debug!(status = head.status().as_u16(), "response head decoded, expecting body");
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

        ensure!(
            src.is_empty() && self.payload_decoder.is_none(),
            ParseError::bad_response("unexpected end of stream inside a message")
        );
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;

    #[test]
    fn response_pair_reframes_across_the_buffer() {
        let mut decoder = ResponseDecoder::new();
        let mut src = BytesMut::from(
            "HTTP/1.1 200 OK\r\nContent-Length: 2\r\n\r\nhiHTTP/1.1 204 No Content\r\n\r\n",
        );

        let head = match decoder.decode(&mut src).unwrap().unwrap() {
            Message::Header(head) => head,
            Message::Payload(_) => panic!("expected a head first"),
        };
        assert_eq!(head.status(), StatusCode::OK);

        let chunk = decoder.decode(&mut src).unwrap().unwrap().into_payload_item().unwrap();
        assert_eq!(&chunk.into_bytes().unwrap()[..], b"hi");
        assert!(decoder.decode(&mut src).unwrap().unwrap().into_payload_item().unwrap().is_eof());

        let head = match decoder.decode(&mut src).unwrap().unwrap() {
            Message::Header(head) => head,
            Message::Payload(_) => panic!("expected the second head"),
        };
        assert_eq!(head.status(), StatusCode::NO_CONTENT);
    }

    #[test]
    fn eof_inside_a_response_body_is_an_error() {
        let mut decoder = ResponseDecoder::new();
        let mut src = BytesMut::from("HTTP/1.1 200 OK\r\nContent-Length: 5\r\n\r\nab");

        assert!(decoder.decode(&mut src).unwrap().unwrap().is_header());
        assert!(decoder.decode(&mut src).unwrap().unwrap().is_payload());
        assert!(matches!(decoder.decode_eof(&mut src), Err(ParseError::BadResponse { .. })));
    }
}
