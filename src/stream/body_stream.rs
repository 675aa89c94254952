//! Per-message body streams.

use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::{Bytes, BytesMut};
use futures::channel::mpsc;
use futures::{Stream, StreamExt};

use crate::protocol::{Fields, ParseError};

/// One item on a message's body stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyFrame {
    /// A chunk of body bytes, in transport order
    Data(Bytes),
    /// The trailer map of a chunked body, emitted once before completion
    Trailers(Fields),
}

impl BodyFrame {
    pub fn is_data(&self) -> bool {
        matches!(self, BodyFrame::Data(_))
    }

    pub fn into_data(self) -> Option<Bytes> {
        match self {
            BodyFrame::Data(bytes) => Some(bytes),
            BodyFrame::Trailers(_) => None,
        }
    }

    pub fn into_trailers(self) -> Option<Fields> {
        match self {
            BodyFrame::Data(_) => None,
            BodyFrame::Trailers(trailers) => Some(trailers),
        }
    }
}

/// The lazily produced body of one parsed message.
///
/// The stream is its own independently drained queue: the connection
/// driver pushes frames in as it decodes them and closes the channel when
/// the body completes. Dropping the stream tells the driver to discard
/// the rest of this body and move on to the next message.
#[derive(Debug)]
pub struct BodyStream {
    receiver: mpsc::Receiver<Result<BodyFrame, ParseError>>,
}

impl BodyStream {
    pub(crate) fn channel() -> (mpsc::Sender<Result<BodyFrame, ParseError>>, BodyStream) {
        let (sender, receiver) = mpsc::channel(8);
        (sender, BodyStream { receiver })
    }

    /// Drains the stream into contiguous bytes plus the trailer map of a
    /// chunked body, when one was sent.
    pub async fn aggregate(mut self) -> Result<(Bytes, Option<Fields>), ParseError> {
        let mut data = BytesMut::new();
        let mut trailers = None;
        while let Some(frame) = self.next().await {
            match frame? {
                BodyFrame::Data(bytes) => data.extend_from_slice(&bytes),
                BodyFrame::Trailers(fields) => trailers = Some(fields),
            }
        }
        Ok((data.freeze(), trailers))
    }
}

impl Stream for BodyStream {
    type Item = Result<BodyFrame, ParseError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_next_unpin(cx)
    }
}
