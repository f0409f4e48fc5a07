//! Callback registry and synchronous fan-out dispatch.
//!
//! Components register callbacks against an integer message id,
//! normally during startup; the dispatcher invokes every callback for
//! a received message's id, synchronously, in registration order. A
//! failing callback is logged and the remaining callbacks still run.
//! Messages for ids nobody registered are dropped silently - that is
//! "nobody is listening for this event", not an error.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::Result;

use super::queue::Mailbox;

/// A registered message callback. Receives the raw message payload.
pub type ControlCallback = Box<dyn Fn(&[u8]) -> Result<()> + Send + Sync>;

/// Mapping from message id to its ordered callback list.
///
/// The registry is expected to be populated once at startup and read
/// thereafter, so a read-write lock suffices. Dispatch holds the read
/// lock for the duration of the fan-out, which serializes any late
/// registration against in-flight dispatch.
pub struct CallbackRegistry {
    table: RwLock<HashMap<i64, Vec<ControlCallback>>>,
}

impl CallbackRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            table: RwLock::new(HashMap::new()),
        }
    }

    /// Append `callback` to the list for `id`, creating the list if
    /// absent. Insertion order is invocation order.
    pub fn register<F>(&self, id: i64, callback: F)
    where
        F: Fn(&[u8]) -> Result<()> + Send + Sync + 'static,
    {
        let mut table = self.table.write().unwrap_or_else(|e| e.into_inner());
        table.entry(id).or_default().push(Box::new(callback));
    }

    /// Number of callbacks registered for `id`.
    pub fn callback_count(&self, id: i64) -> usize {
        let table = self.table.read().unwrap_or_else(|e| e.into_inner());
        table.get(&id).map_or(0, Vec::len)
    }

    /// Invoke every callback registered for `id` with `payload`.
    ///
    /// Callbacks run synchronously, in registration order. A callback
    /// error is logged and isolated - it never stops the rest of the
    /// list and never propagates to the caller. An unknown id is a
    /// silent no-op.
    pub fn dispatch(&self, id: i64, payload: &[u8]) {
        let table = self.table.read().unwrap_or_else(|e| e.into_inner());

        let Some(callbacks) = table.get(&id) else {
            tracing::debug!(id, "no callbacks for message id, dropping");
            return;
        };

        for (idx, callback) in callbacks.iter().enumerate() {
            if let Err(e) = callback(payload) {
                tracing::error!(id, callback = idx, "callback failed: {}", e);
            }
        }
    }
}

impl Default for CallbackRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Consumer loop: dequeue, dispatch, repeat until the mailbox closes.
///
/// Run this on one dedicated task/thread per mailbox. A malformed or
/// unwanted message only costs its own dispatch - the loop itself
/// never stops early.
pub async fn dispatch_loop(mailbox: &Mailbox, registry: &CallbackRegistry) {
    while let Some(entry) = mailbox.dequeue().await {
        registry.dispatch(entry.id, &entry.payload);
    }
    tracing::debug!("mailbox closed, dispatch loop exiting");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ControlError;
    use crate::mailbox::MailboxEntry;
    use bytes::Bytes;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_dispatch_in_registration_order() {
        let registry = CallbackRegistry::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for tag in ["first", "second", "third"] {
            let order = order.clone();
            registry.register(5, move |_payload| {
                order.lock().unwrap().push(tag);
                Ok(())
            });
        }
        assert_eq!(registry.callback_count(5), 3);

        registry.dispatch(5, b"payload");
        assert_eq!(*order.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_failing_callback_is_isolated() {
        let registry = CallbackRegistry::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let c1 = calls.clone();
        registry.register(5, move |_| {
            c1.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        registry.register(5, |_| {
            Err(ControlError::InvalidValue("broken callback".to_string()))
        });
        let c3 = calls.clone();
        registry.register(5, move |_| {
            c3.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        // The middle failure must not stop the third callback.
        registry.dispatch(5, b"x");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_unknown_id_is_a_no_op() {
        let registry = CallbackRegistry::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let c = calls.clone();
        registry.register(5, move |_| {
            c.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        registry.dispatch(9, b"nobody listens");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_payload_reaches_callbacks() {
        let registry = CallbackRegistry::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let s = seen.clone();
        registry.register(2, move |payload| {
            s.lock().unwrap().extend_from_slice(payload);
            Ok(())
        });

        registry.dispatch(2, b"record data");
        assert_eq!(&seen.lock().unwrap()[..], b"record data");
    }

    #[tokio::test]
    async fn test_dispatch_loop_drains_and_exits() {
        let mailbox = Mailbox::new();
        let registry = CallbackRegistry::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let s = seen.clone();
        registry.register(1, move |payload| {
            s.lock().unwrap().push(payload.to_vec());
            Ok(())
        });

        mailbox.enqueue(MailboxEntry::new(1, Bytes::from_static(b"a")));
        mailbox.enqueue(MailboxEntry::new(9, Bytes::from_static(b"ignored")));
        mailbox.enqueue(MailboxEntry::new(1, Bytes::from_static(b"b")));
        mailbox.close();

        dispatch_loop(&mailbox, &registry).await;

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0], b"a");
        assert_eq!(seen[1], b"b");
    }
}
