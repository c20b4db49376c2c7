//! Reply delivery.
//!
//! A conversation owns one outbound stream ([`ReplyTo`]). Every delivery onto it
//! goes through a one-shot [`Reply`], so the menu reply of a turn and the
//! action reply of the same turn are two separate handles and neither can
//! deliver twice.

use tokio::sync::mpsc;

use crate::{GuideflowError, Message, Result, utils};

/// Cloneable handle to a conversation's outbound stream.
#[derive(Debug, Clone)]
pub struct ReplyTo {
    sender: mpsc::UnboundedSender<Message>,
}

impl ReplyTo {
    /// Create an outbound stream and the receiver a connector drains.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Message>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    /// Mint a one-shot destination on this stream.
    pub fn reply(&self) -> Reply {
        Reply {
            sender: Some(self.sender.clone()),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

/// One-shot reply destination, consumed by [`Reply::deliver`].
#[derive(Debug)]
pub struct Reply {
    sender: Option<mpsc::UnboundedSender<Message>>,
}

impl Reply {
    /// Deliver `message` and consume the handle.
    pub fn deliver(
        mut self,
        mut message: Message,
    ) -> Result<()> {
        let Some(sender) = self.sender.take() else {
            return Err(GuideflowError::Reply("reply already used".to_string()));
        };
        message.end_time = utils::time::time_millis();
        sender.send(message).map_err(|e| GuideflowError::Reply(format!("reply destination closed, message {} lost", e.0.id)))
    }

    /// Drop the handle on purpose, e.g. when the request was rejected synchronously.
    pub fn abandon(mut self) {
        self.sender.take();
    }
}

impl Drop for Reply {
    fn drop(&mut self) {
        if self.sender.is_some() {
            tracing::warn!("reply dropped without delivery");
        }
    }
}

#[cfg(test)]
mod test {
    use super::ReplyTo;
    use crate::{GuideflowError, Message};

    #[tokio::test]
    async fn test_reply_delivers_once_per_handle() {
        let (reply_to, mut rx) = ReplyTo::channel();

        let first = reply_to.reply();
        let second = reply_to.reply();
        first.deliver(Message::new("s", "one")).unwrap();
        second.deliver(Message::new("s", "two")).unwrap();

        let one = rx.recv().await.unwrap();
        let two = rx.recv().await.unwrap();
        assert_eq!(one.input, "one");
        assert!(one.end_time >= one.start_time);
        assert_eq!(two.input, "two");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_reply_to_closed_destination() {
        let (reply_to, rx) = ReplyTo::channel();
        drop(rx);
        assert!(reply_to.is_closed());

        let err = reply_to.reply().deliver(Message::new("s", "lost")).unwrap_err();
        assert!(matches!(err, GuideflowError::Reply(_)));
    }

    #[test]
    fn test_reply_abandon() {
        let (reply_to, mut rx) = ReplyTo::channel();
        reply_to.reply().abandon();
        assert!(rx.try_recv().is_err());
    }
}
