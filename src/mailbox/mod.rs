//! Mailbox module - blocking FIFO hand-off and callback fan-out.
//!
//! Producers enqueue received messages from any thread; one dedicated
//! consumer runs dequeue-then-dispatch for the mailbox's lifetime.
//!
//! # Example
//!
//! ```ignore
//! use ctlwire::mailbox::{dispatch_loop, CallbackRegistry, Mailbox, MailboxEntry};
//!
//! let mailbox = Mailbox::new();
//! let registry = CallbackRegistry::new();
//!
//! registry.register(1, |payload| {
//!     // react to the message
//!     Ok(())
//! });
//!
//! tokio::spawn(async move { dispatch_loop(&mailbox, &registry).await });
//! ```

mod dispatch;
mod queue;

pub use dispatch::{dispatch_loop, CallbackRegistry, ControlCallback};
pub use queue::{Mailbox, MailboxEntry};
