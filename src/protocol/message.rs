use bytes::Bytes;

use crate::protocol::Fields;

/// One value produced by a frame decoder: a message head, then the
/// payload items of that message's body.
pub enum Message<T> {
    /// The parsed head of the next message
    Header(T),
    /// A piece of the current message's body
    Payload(PayloadItem),
}

impl<T> Message<T> {
    /// Returns true if this message contains payload data
    #[inline]
    pub fn is_payload(&self) -> bool {
        matches!(self, Message::Payload(_))
    }

    /// Returns true if this message contains header information
    #[inline]
    pub fn is_header(&self) -> bool {
        matches!(self, Message::Header(_))
    }

    /// Converts the message into a PayloadItem if it contains payload data
    pub fn into_payload_item(self) -> Option<PayloadItem> {
        match self {
            Message::Header(_) => None,
            Message::Payload(payload_item) => Some(payload_item),
        }
    }
}

/// An item produced by a body decoder.
///
/// Data chunks arrive in transport order; a non-empty trailer map of a
/// chunked body is emitted once, right before `Eof`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadItem {
    /// A chunk of body data
    Chunk(Bytes),
    /// The trailer map of a chunked body
    Trailers(Fields),
    /// Marks the end of the body; bytes still buffered belong to the
    /// next message
    Eof,
}

impl PayloadItem {
    /// Returns true if this item marks the end of the body
    #[inline]
    pub fn is_eof(&self) -> bool {
        matches!(self, PayloadItem::Eof)
    }

    /// Returns true if this item contains chunk data
    #[inline]
    pub fn is_chunk(&self) -> bool {
        matches!(self, PayloadItem::Chunk(_))
    }

    /// Returns true if this item carries a trailer map
    #[inline]
    pub fn is_trailers(&self) -> bool {
        matches!(self, PayloadItem::Trailers(_))
    }

    /// Returns a reference to the contained bytes if this is a Chunk
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            PayloadItem::Chunk(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Returns the contained bytes if this is a Chunk
    pub fn into_bytes(self) -> Option<Bytes> {
        match self {
            PayloadItem::Chunk(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Returns the contained trailer map if this is a Trailers item
    pub fn into_trailers(self) -> Option<Fields> {
        match self {
            PayloadItem::Trailers(trailers) => Some(trailers),
            _ => None,
        }
    }
}
