//! Session registry for push/pull delivery
//!
//! The registry maps session IDs to sessions; each session maps client IDs to a
//! bounded mailbox. Pushing to a session fans the message out to every mailbox,
//! and each client pulls from its own.
//!
//! # Architecture
//!
//! ```text
//!                      SessionRegistry (Clone)
//!                 ┌─────────────────────────────┐
//!                 │ sessions: HashMap<S,        │
//!                 │   Arc<Session {             │
//!                 │     clients: HashMap<C,     │
//!                 │       Mailbox { mpsc }>     │
//!                 │   }>                        │
//!                 │ >                           │
//!                 └──────────────┬──────────────┘
//!                                │
//!        ┌───────────────────────┼───────────────────────┐
//!        │                       │                       │
//!        ▼                       ▼                       ▼
//!   [Application]          [Client "dev-1"]        [Client "dev-2"]
//!   session.push()         client.pull()           stream.recv()
//!        │                       ▲                       ▲
//!        └──► try_send ──────────┴───────────────────────┘
//! ```
//!
//! # Backpressure
//!
//! Mailboxes are bounded. A broadcast never waits for a slow client: if its
//! mailbox is full the message is dropped for that client only.

pub mod client;
pub mod config;
pub mod entry;
pub mod error;
pub mod key;
pub mod session;
pub mod store;

pub use client::{Client, ClientStream};
pub use config::{RegistryConfig, DEFAULT_QUEUE_DEPTH};
pub use entry::Delivery;
pub use error::{RegistryError, Result};
pub use key::Key;
pub use session::Session;
pub use store::SessionRegistry;
