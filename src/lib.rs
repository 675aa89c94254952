//! Incremental, reactive HTTP/1.x message parsing.
//!
//! The crate consumes an asynchronous stream of arbitrary-sized byte chunks
//! and produces parsed messages (requests on the server side, responses on
//! the client side), each paired with a lazily produced body stream.
//! Keep-alive connections are reframed across arbitrary read boundaries,
//! with `Content-Length` and chunked bodies (including trailers) decoded
//! incrementally.
//!
//! * [`codec`]: the framing state machines, usable directly with
//!   [`tokio_util::codec::FramedRead`]
//! * [`protocol`]: the message model, field maps and error taxonomy
//! * [`stream`]: the reactive surface, where [`stream::Parser`] turns a
//!   transport into a stream of messages

pub mod codec;
pub mod protocol;
pub mod stream;

pub(crate) use help::ensure;

mod help {

    macro_rules! ensure {
        ($predicate:expr, $error:expr) => {
            if !$predicate {
                return Err($error);
            }
        };
    }
    pub(crate) use ensure;
}
