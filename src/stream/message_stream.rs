//! The per-connection driver and the message stream it feeds.
//!
//! One driver task owns the frame decoder and its read buffer. It emits
//! each message as soon as the head is parsed, then pumps that message's
//! payload into the body channel before looking at the next head, which
//! keeps the ordering guarantees trivially true: heads in arrival order,
//! a head before any of its body bytes, and no message before the
//! previous body completed.

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::channel::{mpsc, oneshot};
use futures::{SinkExt, Stream, StreamExt};
use tokio::io::AsyncRead;
use tokio_util::codec::{Decoder, FramedRead};
use tracing::error;

use crate::protocol::{Message, ParseError, PayloadItem};
use crate::stream::body_stream::{BodyFrame, BodyStream};

type MessageSender<H> = mpsc::Sender<Result<InboundMessage<H>, ParseError>>;
type BodySender = mpsc::Sender<Result<BodyFrame, ParseError>>;

/// A parsed message head together with its lazily produced body stream.
///
/// The head is available before the body has fully arrived; the body may
/// be consumed concurrently with the connection's ongoing parsing.
#[derive(Debug)]
pub struct InboundMessage<H> {
    head: H,
    body: BodyStream,
}

impl<H> InboundMessage<H> {
    pub fn head(&self) -> &H {
        &self.head
    }

    pub fn into_parts(self) -> (H, BodyStream) {
        (self.head, self.body)
    }
}

/// An asynchronous sequence of parsed messages from one connection.
///
/// The stream yields messages in transport-arrival order and terminates
/// either cleanly (transport closed between messages) or with the first
/// error. Dropping the stream signals the driver task, which aborts any
/// in-flight body stream and releases the transport.
#[derive(Debug)]
pub struct MessageStream<H> {
    receiver: mpsc::Receiver<Result<InboundMessage<H>, ParseError>>,
    // dropping this sender wakes the driver's cancellation arm
    _cancel: oneshot::Sender<()>,
}

impl<H> Stream for MessageStream<H> {
    type Item = Result<InboundMessage<H>, ParseError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_next_unpin(cx)
    }
}

pub(crate) fn spawn_driver<R, D, H>(io: R, decoder: D) -> MessageStream<H>
where
    R: AsyncRead + Send + Unpin + 'static,
    D: Decoder<Item = Message<H>, Error = ParseError> + Send + 'static,
    H: Send + 'static,
{
    let (sender, receiver) = mpsc::channel(1);
    let (cancel, cancelled) = oneshot::channel();
    let framed = FramedRead::with_capacity(io, decoder, 8 * 1024);
    // the driver runs detached; it stops on its own once the transport,
    // the message receiver, or the cancel sender goes away
    let _ = tokio::spawn(drive(framed, sender, cancelled));
    MessageStream { receiver, _cancel: cancel }
}

async fn drive<R, D, H>(
    mut framed: FramedRead<R, D>,
    mut messages: MessageSender<H>,
    mut cancelled: oneshot::Receiver<()>,
) where
    R: AsyncRead + Unpin,
    D: Decoder<Item = Message<H>, Error = ParseError>,
{
    loop {
        let next = tokio::select! {
            biased;
            _ = &mut cancelled => return,
            next = framed.next() => next,
        };

        match next {
            // transport closed between messages
            None => return,

            Some(Ok(Message::Header(head))) => {
                let (body_sender, body) = BodyStream::channel();
                if messages.send(Ok(InboundMessage { head, body })).await.is_err() {
                    // consumer dropped the message stream
                    return;
                }
                if !pump_body(&mut framed, body_sender, &mut messages, &mut cancelled).await {
                    return;
                }
            }

            Some(Ok(Message::Payload(_))) => {
                error!("decoder produced payload data while expecting a head");
                let _ = messages
                    .send(Err(ParseError::server_error("payload data outside of any message body")))
                    .await;
                return;
            }

            Some(Err(e)) => {
                let _ = messages.send(Err(e)).await;
                return;
            }
        }
    }
}

/// Pumps one message's payload into its body channel until `Eof`.
///
/// Returns false when the connection must stop. A dropped body receiver
/// switches the pump to discarding: the rest of the body is still decoded
/// (its end frames the next message) but no longer delivered. A dropped
/// message stream aborts the in-flight body with an error before the
/// driver exits.
async fn pump_body<R, D, H>(
    framed: &mut FramedRead<R, D>,
    mut body_sender: BodySender,
    messages: &mut MessageSender<H>,
    cancelled: &mut oneshot::Receiver<()>,
) -> bool
where
    R: AsyncRead + Unpin,
    D: Decoder<Item = Message<H>, Error = ParseError>,
{
    let mut receiver_gone = false;
    loop {
        let next = tokio::select! {
            biased;
            _ = &mut *cancelled => {
                if !receiver_gone {
                    let abort = ParseError::io(io::Error::new(
                        io::ErrorKind::ConnectionAborted,
                        "message stream dropped while a body was in flight",
                    ));
                    let _ = body_sender.try_send(Err(abort));
                }
                return false;
            }
            next = framed.next() => next,
        };

        match next {
            // dropping the sender completes the body stream
            Some(Ok(Message::Payload(PayloadItem::Eof))) => return true,

            Some(Ok(Message::Payload(PayloadItem::Chunk(bytes)))) => {
                forward(&mut body_sender, &mut receiver_gone, BodyFrame::Data(bytes)).await;
            }

            Some(Ok(Message::Payload(PayloadItem::Trailers(trailers)))) => {
                forward(&mut body_sender, &mut receiver_gone, BodyFrame::Trailers(trailers)).await;
            }

            Some(Ok(Message::Header(_))) => {
                error!("decoder produced a head before the previous body finished");
                let _ = messages
                    .send(Err(ParseError::server_error("head decoded before the previous body finished")))
                    .await;
                return false;
            }

            Some(Err(e)) => {
                // abort the in-flight body, then terminate the message
                // stream with the original error
                if !receiver_gone {
                    let _ = body_sender.send(Err(e.aborted())).await;
                }
                let _ = messages.send(Err(e)).await;
                return false;
            }

            None => {
                let e = ParseError::io(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "transport closed inside a message body",
                ));
                if !receiver_gone {
                    let _ = body_sender.send(Err(e.aborted())).await;
                }
                let _ = messages.send(Err(e)).await;
                return false;
            }
        }
    }
}

async fn forward(body_sender: &mut BodySender, receiver_gone: &mut bool, frame: BodyFrame) {
    if *receiver_gone {
        return;
    }
    if body_sender.send(Ok(frame)).await.is_err() {
        *receiver_gone = true;
    }
}
