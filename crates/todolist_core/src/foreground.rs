//! Foreground delivery queue.
//!
//! # Responsibility
//! - Carry completions from worker threads back to the thread that owns the
//!   repository (the UI thread).
//!
//! # Invariants
//! - Messages are only consumed by the owner through `try_next`/`next_timeout`,
//!   so anything triggered by a message runs on the owner's thread.
//! - Posting never blocks; a closed queue drops the message.

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use log::debug;
use std::time::Duration;

/// Receiving side, owned by the foreground thread.
pub struct ForegroundQueue<M> {
    sender: Sender<M>,
    receiver: Receiver<M>,
}

/// Sending side, cloned into worker jobs.
pub struct ForegroundHandle<M> {
    sender: Sender<M>,
}

impl<M> Clone for ForegroundHandle<M> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<M> ForegroundHandle<M> {
    /// Posts a message; returns `false` when the foreground side is gone.
    pub fn post(&self, message: M) -> bool {
        if self.sender.send(message).is_err() {
            debug!("event=foreground_post module=foreground status=dropped reason=queue_closed");
            return false;
        }
        true
    }
}

impl<M> ForegroundQueue<M> {
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self { sender, receiver }
    }

    pub fn handle(&self) -> ForegroundHandle<M> {
        ForegroundHandle {
            sender: self.sender.clone(),
        }
    }

    /// Next queued message without blocking.
    pub fn try_next(&self) -> Option<M> {
        self.receiver.try_recv().ok()
    }

    /// Blocks up to `timeout` for the next message.
    pub fn next_timeout(&self, timeout: Duration) -> Option<M> {
        match self.receiver.recv_timeout(timeout) {
            Ok(message) => Some(message),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }

    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }
}

impl<M> Default for ForegroundQueue<M> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::ForegroundQueue;
    use std::time::Duration;

    #[test]
    fn messages_from_worker_arrive_in_order() {
        let queue = ForegroundQueue::new();
        let handle = queue.handle();

        let worker = std::thread::spawn(move || {
            assert!(handle.post(1));
            assert!(handle.post(2));
        });
        worker.join().unwrap();

        assert_eq!(queue.len(), 2);
        assert_eq!(queue.try_next(), Some(1));
        assert_eq!(queue.next_timeout(Duration::from_millis(10)), Some(2));
        assert!(queue.is_empty());
        assert_eq!(queue.try_next(), None);
    }

    #[test]
    fn post_after_queue_drop_reports_closed() {
        let queue = ForegroundQueue::<u8>::new();
        let handle = queue.handle();
        drop(queue);
        assert!(!handle.post(7));
    }
}
