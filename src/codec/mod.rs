//! Framing state machines for HTTP/1.x messages.
//!
//! The decoders implement [`tokio_util::codec::Decoder`] over a shared
//! read buffer, so they compose directly with
//! [`FramedRead`](tokio_util::codec::FramedRead). A frame decoder yields
//! `Message::Header` once per message, then `Message::Payload` items
//! until `Eof`; bytes received past a body's end stay buffered and seed
//! the next head.

mod body;
mod head;
mod line;
mod request_decoder;
mod response_decoder;

pub use body::{ChunkedDecoder, LengthDecoder, PayloadDecoder};
pub use head::{RequestHeadDecoder, ResponseHeadDecoder};
pub use request_decoder::RequestDecoder;
pub use response_decoder::ResponseDecoder;
