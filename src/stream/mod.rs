//! The reactive parsing surface.
//!
//! A [`Parser`] turns a transport into a [`MessageStream`]: an
//! asynchronous sequence of parsed messages, each carrying a lazily
//! produced [`BodyStream`]. One cooperative driver task per connection
//! owns the frame decoder; backpressure propagates through the bounded
//! message and body channels.

mod body_stream;
mod message_stream;

pub use body_stream::{BodyFrame, BodyStream};
pub use message_stream::{InboundMessage, MessageStream};

use tokio::io::AsyncRead;

use crate::codec::{RequestDecoder, ResponseDecoder};
use crate::protocol::{RequestHead, ResponseHead};

/// Configuration and entry point for parsing a connection.
///
/// ```no_run
/// use futures::StreamExt;
/// use micro_h1::stream::Parser;
///
/// # async fn example(socket: tokio::net::TcpStream) {
/// let mut requests = Parser::new().parse_requests(socket);
/// while let Some(message) = requests.next().await {
///     let (head, body) = message.expect("parse failed").into_parts();
///     println!("{} {}", head.method(), head.uri());
///     let (data, _trailers) = body.aggregate().await.expect("body failed");
///     println!("{} body bytes", data.len());
/// }
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct Parser {
    debug: bool,
}

impl Parser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit decoder state transitions through `tracing` at debug level.
    /// Tracing output is a side channel; parsing semantics are unchanged.
    pub fn debug(mut self, enable: bool) -> Self {
        self.debug = enable;
        self
    }

    /// Parses server-side: a stream of requests read from `io`.
    pub fn parse_requests<R>(&self, io: R) -> MessageStream<RequestHead>
    where
        R: AsyncRead + Send + Unpin + 'static,
    {
        message_stream::spawn_driver(io, RequestDecoder::new().with_debug(self.debug))
    }

    /// Parses client-side: a stream of responses read from `io`.
    pub fn parse_responses<R>(&self, io: R) -> MessageStream<ResponseHead>
    where
        R: AsyncRead + Send + Unpin + 'static,
    {
        message_stream::spawn_driver(io, ResponseDecoder::new().with_debug(self.debug))
    }
}
