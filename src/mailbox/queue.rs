//! Thread-safe FIFO mailbox with blocking hand-off.
//!
//! Producers (one per inbound connection or timer, typically) call
//! [`Mailbox::enqueue`] from any thread; a single dedicated consumer
//! loops on [`Mailbox::dequeue`]. The queue pairs a mutex-guarded
//! `VecDeque` with a counting semaphore: every enqueue adds exactly one
//! permit, every dequeue consumes exactly one, so at most one waiter
//! wakes per item and the permit count always equals the number of
//! unconsumed entries.
//!
//! `dequeue().await` is this subsystem's only suspension point. There
//! is no way to interrupt a parked consumer from outside; shutdown is
//! an explicit [`Mailbox::close`], which posts a poison wake that the
//! consumer observes once the queue has drained.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use bytes::Bytes;
use tokio::sync::Semaphore;

/// One queued message plus the id it will be dispatched under.
///
/// Owned by the mailbox from enqueue until a consumer dequeues it;
/// ownership then transfers to the consumer.
#[derive(Debug, Clone)]
pub struct MailboxEntry {
    /// Dispatch id (normally the message's operation code).
    pub id: i64,
    /// Raw message payload.
    pub payload: Bytes,
}

impl MailboxEntry {
    /// Create an entry.
    pub fn new(id: i64, payload: Bytes) -> Self {
        Self { id, payload }
    }
}

/// FIFO queue handing messages from producer threads to one consumer.
pub struct Mailbox {
    queue: Mutex<VecDeque<MailboxEntry>>,
    ready: Semaphore,
    closed: AtomicBool,
}

impl Mailbox {
    /// Create an empty, open mailbox.
    pub fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            ready: Semaphore::new(0),
            closed: AtomicBool::new(false),
        }
    }

    /// Append an entry to the tail and wake one waiting consumer.
    ///
    /// Safe to call from any thread. After [`close`](Self::close) the
    /// entry is dropped with a warning instead of queued.
    pub fn enqueue(&self, entry: MailboxEntry) {
        if self.closed.load(Ordering::Acquire) {
            tracing::warn!(id = entry.id, "mailbox closed, dropping entry");
            return;
        }

        {
            let mut queue = self.lock_queue();
            queue.push_back(entry);
        }

        self.ready.add_permits(1);
    }

    /// Take the head entry, parking until one is available.
    ///
    /// Returns `None` once the mailbox is closed and drained. Entries
    /// enqueued before the close are always delivered first, in
    /// arrival order.
    pub async fn dequeue(&self) -> Option<MailboxEntry> {
        loop {
            // The semaphore is never closed, but treat a failure like
            // shutdown rather than panicking in the consumer loop.
            let permit = match self.ready.acquire().await {
                Ok(permit) => permit,
                Err(_) => return None,
            };
            permit.forget();

            if let Some(entry) = self.lock_queue().pop_front() {
                return Some(entry);
            }

            if self.closed.load(Ordering::Acquire) {
                // Re-post the poison wake so any later dequeue also
                // observes shutdown immediately.
                self.ready.add_permits(1);
                return None;
            }
        }
    }

    /// Close the mailbox: queued entries still drain, then `dequeue`
    /// returns `None` forever.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
        self.ready.add_permits(1);
    }

    /// Has [`close`](Self::close) been called?
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Number of queued entries.
    pub fn len(&self) -> usize {
        self.lock_queue().len()
    }

    /// Is the queue empty?
    pub fn is_empty(&self) -> bool {
        self.lock_queue().is_empty()
    }

    fn lock_queue(&self) -> std::sync::MutexGuard<'_, VecDeque<MailboxEntry>> {
        // A producer panicking mid-push cannot leave the deque in a
        // torn state, so a poisoned lock is still safe to use.
        self.queue.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for Mailbox {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    fn entry(id: i64, body: &'static [u8]) -> MailboxEntry {
        MailboxEntry::new(id, Bytes::from_static(body))
    }

    #[tokio::test]
    async fn test_fifo_order() {
        let mailbox = Mailbox::new();

        mailbox.enqueue(entry(1, b"a"));
        mailbox.enqueue(entry(2, b"b"));
        mailbox.enqueue(entry(3, b"c"));
        assert_eq!(mailbox.len(), 3);

        assert_eq!(mailbox.dequeue().await.unwrap().id, 1);
        assert_eq!(mailbox.dequeue().await.unwrap().id, 2);
        assert_eq!(mailbox.dequeue().await.unwrap().id, 3);
        assert!(mailbox.is_empty());
    }

    #[tokio::test]
    async fn test_fifo_across_producer_threads() {
        let mailbox = Arc::new(Mailbox::new());

        // Serialize the producers externally to fix the arrival order.
        for id in 1..=3i64 {
            let mb = mailbox.clone();
            std::thread::spawn(move || mb.enqueue(MailboxEntry::new(id, Bytes::new())))
                .join()
                .unwrap();
        }

        assert_eq!(mailbox.dequeue().await.unwrap().id, 1);
        assert_eq!(mailbox.dequeue().await.unwrap().id, 2);
        assert_eq!(mailbox.dequeue().await.unwrap().id, 3);
    }

    #[tokio::test]
    async fn test_dequeue_parks_until_enqueue() {
        let mailbox = Arc::new(Mailbox::new());

        let consumer = {
            let mb = mailbox.clone();
            tokio::spawn(async move { mb.dequeue().await })
        };

        // Give the consumer time to park before producing.
        tokio::time::sleep(Duration::from_millis(20)).await;
        mailbox.enqueue(entry(7, b"late"));

        let got = consumer.await.unwrap().unwrap();
        assert_eq!(got.id, 7);
        assert_eq!(&got.payload[..], b"late");
    }

    #[tokio::test]
    async fn test_close_drains_then_stops() {
        let mailbox = Mailbox::new();

        mailbox.enqueue(entry(1, b"a"));
        mailbox.enqueue(entry(2, b"b"));
        mailbox.close();

        // Queued entries still come out, in order.
        assert_eq!(mailbox.dequeue().await.unwrap().id, 1);
        assert_eq!(mailbox.dequeue().await.unwrap().id, 2);

        // Then shutdown, repeatedly.
        assert!(mailbox.dequeue().await.is_none());
        assert!(mailbox.dequeue().await.is_none());
    }

    #[tokio::test]
    async fn test_close_wakes_parked_consumer() {
        let mailbox = Arc::new(Mailbox::new());

        let consumer = {
            let mb = mailbox.clone();
            tokio::spawn(async move { mb.dequeue().await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        mailbox.close();

        assert!(consumer.await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_enqueue_after_close_is_dropped() {
        let mailbox = Mailbox::new();
        mailbox.close();
        assert!(mailbox.is_closed());

        mailbox.enqueue(entry(9, b"too late"));
        assert!(mailbox.is_empty());
        assert!(mailbox.dequeue().await.is_none());
    }
}
