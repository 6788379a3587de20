// ABOUTME: Channel-backed Router that turns inbound messages into an async stream
// ABOUTME: Lets the hosting process consume messages from any number of backends in one place

use crate::message::IncomingMessage;
use crate::traits::Router;
use std::pin::Pin;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_stream::Stream;

/// Boxed stream type for inbound messages
pub type MessageStream = Pin<Box<dyn Stream<Item = IncomingMessage> + Send>>;

/// Router that forwards every message into an unbounded channel.
///
/// `incoming` never blocks, so it is safe to call from a transport's
/// delivery context.
#[derive(Clone)]
pub struct ChannelRouter {
    tx: mpsc::UnboundedSender<IncomingMessage>,
}

impl ChannelRouter {
    /// Create a router and the inbox that receives what it routes
    pub fn new() -> (Self, Inbox) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, Inbox { rx })
    }
}

impl Router for ChannelRouter {
    fn incoming(&self, message: IncomingMessage) {
        tracing::debug!(
            origin = %message.origin,
            sender = %message.sender,
            id = %message.id,
            "Routing incoming message"
        );
        if self.tx.send(message).is_err() {
            tracing::warn!("Inbox closed, dropping incoming message");
        }
    }
}

/// Receiving end of a [`ChannelRouter`]
pub struct Inbox {
    rx: mpsc::UnboundedReceiver<IncomingMessage>,
}

impl Inbox {
    /// Receive the next message, or None once every router clone is dropped
    pub async fn recv(&mut self) -> Option<IncomingMessage> {
        self.rx.recv().await
    }

    /// Try to receive a message without waiting
    pub fn try_recv(&mut self) -> Option<IncomingMessage> {
        self.rx.try_recv().ok()
    }

    pub fn into_stream(self) -> MessageStream {
        Box::pin(UnboundedReceiverStream::new(self.rx))
    }
}
