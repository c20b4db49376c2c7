//! Message queues shared between producers and workers.

use std::sync::Arc;

use crate::{GuideflowError, Result};

/// MPMC (multi-producer, multi-consumer) queue.
///
/// Every message is consumed by exactly one receiver, which is what the
/// action workers and the processor inbound loop rely on.
/// Backed by flume for high-performance message passing.
#[derive(Clone)]
pub struct Queue<T> {
    receiver: Arc<flume::Receiver<T>>,
    sender: Arc<flume::Sender<T>>,
}

impl<T> Queue<T> {
    /// create a new bounded queue, `cap == 0` means unbounded
    pub fn new(cap: usize) -> Arc<Self> {
        let (tx, rx) = if cap == 0 { flume::unbounded() } else { flume::bounded(cap) };

        Arc::new(Self {
            receiver: Arc::new(rx),
            sender: Arc::new(tx),
        })
    }

    /// a producer handle, used by connectors feeding the queue
    pub fn sender(&self) -> flume::Sender<T> {
        self.sender.as_ref().clone()
    }

    /// take a message if one is ready, never waits
    pub fn try_next(&self) -> Option<T> {
        self.receiver.try_recv().ok()
    }

    /// receive a message from the queue asynchronously
    pub async fn next_async(&self) -> Option<T> {
        self.receiver.recv_async().await.ok()
    }

    /// send a message to the queue asynchronously, waits while a bounded queue is full
    pub async fn send_async(
        &self,
        msg: T,
    ) -> Result<()> {
        self.sender.send_async(msg).await.map_err(|e| GuideflowError::Queue(e.to_string()))
    }

    /// number of queued messages
    pub fn len(&self) -> usize {
        self.receiver.len()
    }
}

#[cfg(test)]
mod test {
    use super::Queue;

    #[tokio::test]
    async fn test_queue_fifo_and_drain() {
        let queue = Queue::new(4);
        queue.send_async(1).await.unwrap();
        queue.send_async(2).await.unwrap();
        assert_eq!(queue.len(), 2);

        assert_eq!(queue.next_async().await, Some(1));
        assert_eq!(queue.try_next(), Some(2));
        assert_eq!(queue.try_next(), None);
        assert_eq!(queue.len(), 0);
    }

    #[tokio::test]
    async fn test_queue_sender_handle() {
        let queue = Queue::new(0);
        let tx = queue.sender();
        tx.send("hello").unwrap();
        assert_eq!(queue.next_async().await, Some("hello"));
    }
}
