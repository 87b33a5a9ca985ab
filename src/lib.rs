//! In-process push/pull message delivery
//!
//! A process groups addressable clients (device connections) under a session
//! (a user or group identity). Messages pushed to a session are delivered to
//! every client currently registered on it; each client pulls its own messages.
//!
//! ```no_run
//! # async fn demo() -> session_push::Result<()> {
//! use session_push::SessionRegistry;
//!
//! let registry: SessionRegistry = SessionRegistry::new();
//!
//! let session = registry.get_or_create("user-1234".to_string()).await;
//! let client = session.new_client("device_mobile_5445".to_string()).await;
//!
//! session.push("Hello world!".into()).await;
//! let msg = client.pull().await?;
//! assert_eq!(&msg[..], b"Hello world!");
//! # Ok(())
//! # }
//! ```

pub mod registry;
pub mod stats;

pub use registry::{
    Client, ClientStream, RegistryConfig, RegistryError, Result, Session, SessionRegistry,
};
pub use stats::{PushOutcome, SessionStats};
