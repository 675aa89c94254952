//! The body decoder selected at head-completion time.

use bytes::BytesMut;
use tokio_util::codec::Decoder;

use crate::codec::body::{ChunkedDecoder, LengthDecoder};
use crate::protocol::{ParseError, PayloadItem, Role};

/// Decodes the payload of one message.
///
/// The two framings are a closed set, so the decoder is a sum over them
/// rather than a trait object. A message without a body uses a
/// zero-length decoder, which yields `Eof` on first use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadDecoder {
    kind: Kind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Kind {
    /// content-length payload
    Length(LengthDecoder),

    /// transfer-encoding chunked payload
    Chunked(ChunkedDecoder),
}

impl PayloadDecoder {
    /// Creates a decoder for a message without a body
    pub fn empty() -> Self {
        Self::length(0)
    }

    /// Creates a fixed length decoder
    pub fn length(size: u64) -> Self {
        Self { kind: Kind::Length(LengthDecoder::new(size)) }
    }

    /// Creates a chunked decoder; trailer names normalize per `role` and
    /// a trailer section is parsed only when the head announced one
    pub fn chunked(role: Role, trailer_expected: bool) -> Self {
        Self { kind: Kind::Chunked(ChunkedDecoder::new(role, trailer_expected)) }
    }

    /// True when no body byte is expected
    pub fn is_empty(&self) -> bool {
        matches!(&self.kind, Kind::Length(length_decoder) if length_decoder.remaining() == 0)
    }

    /// True for the chunked framing
    pub fn is_chunked(&self) -> bool {
        matches!(&self.kind, Kind::Chunked(_))
    }
}

impl Decoder for PayloadDecoder {
    type Item = PayloadItem;
    type Error = ParseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match &mut self.kind {
            Kind::Length(length_decoder) => length_decoder.decode(src),
            Kind::Chunked(chunked_decoder) => chunked_decoder.decode(src),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_decoder_yields_eof_without_input() {
        let mut decoder = PayloadDecoder::empty();
        assert!(decoder.is_empty());
        assert!(decoder.decode(&mut BytesMut::new()).unwrap().unwrap().is_eof());
    }

    #[test]
    fn kind_predicates() {
        assert!(PayloadDecoder::chunked(Role::Server, false).is_chunked());
        assert!(!PayloadDecoder::length(3).is_empty());
        assert!(!PayloadDecoder::length(3).is_chunked());
    }
}
