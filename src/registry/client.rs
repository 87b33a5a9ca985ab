//! Client handles
//!
//! A [`Client`] is a thin handle bound to one client ID of one session. It owns no
//! state of its own; every operation is delegated to the session.
//! A [`ClientStream`] is the reusable receive endpoint returned by `pull_handle`,
//! meant for event loops that consume many messages (e.g. a WebSocket writer).

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use futures::stream::{self, BoxStream, StreamExt};
use tokio::sync::mpsc::error::TryRecvError;

use super::entry::{Mailbox, SharedReceiver};
use super::error::{RegistryError, Result};
use super::key::Key;
use super::session::Session;

/// Handle onto a single client of a session
#[derive(Clone)]
pub struct Client<S, C, M = Bytes> {
    id: C,
    session: Arc<Session<S, C, M>>,
}

impl<S, C, M> Client<S, C, M>
where
    S: Key,
    C: Key,
    M: Clone + Send + 'static,
{
    pub(super) fn new(id: C, session: Arc<Session<S, C, M>>) -> Self {
        Self { id, session }
    }

    /// Wait for the next message for this client
    ///
    /// ```no_run
    /// # async fn demo() -> session_push::Result<()> {
    /// use session_push::SessionRegistry;
    ///
    /// let registry: SessionRegistry<u64, String, String> = SessionRegistry::new();
    /// let session = registry.get_or_create(123446555).await;
    /// let client = session.new_client("device_mobile_5445".to_string()).await;
    ///
    /// let msg = client.pull().await?;
    /// println!("{msg}");
    /// # Ok(())
    /// # }
    /// ```
    pub async fn pull(&self) -> Result<M> {
        self.session.pull(&self.id).await
    }

    /// Wait for the next message, giving up after `timeout`
    pub async fn pull_timeout(&self, timeout: Duration) -> Result<M> {
        self.session.pull_timeout(&self.id, timeout).await
    }

    /// Wait for the next message, blocking the current thread
    ///
    /// # Panics
    ///
    /// Panics if called from within an asynchronous execution context.
    pub fn pull_blocking(&self) -> Result<M> {
        self.session.pull_blocking(&self.id)
    }

    /// Get a reusable receive endpoint for this client
    pub async fn pull_handle(&self) -> Result<ClientStream<C, M>> {
        self.session.pull_handle(&self.id).await
    }

    /// Close this client's mailbox
    ///
    /// Only the first close (across all handles) has an effect and returns true.
    pub async fn close(&self) -> bool {
        self.session.close_client(&self.id).await
    }

    /// Client ID
    pub fn key(&self) -> &C {
        &self.id
    }

    /// Client ID rendered as a string
    pub fn key_as_string(&self) -> String {
        self.id.to_string()
    }

    /// Remove this client from its session
    pub async fn delete_self(&self) -> bool {
        self.session.delete_client(&self.id).await
    }

    /// The owning session
    pub fn session(&self) -> &Arc<Session<S, C, M>> {
        &self.session
    }
}

impl<S: fmt::Debug, C: fmt::Debug, M> fmt::Debug for Client<S, C, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("id", &self.id)
            .field("session", &self.session)
            .finish()
    }
}

/// Receive endpoint bound to one client's mailbox
///
/// Keeps the mailbox alive, so it keeps receiving after the client is removed
/// from its session. The stream ends once the mailbox is closed and drained.
pub struct ClientStream<C, M = Bytes> {
    client_id: C,
    mailbox: Arc<Mailbox<M>>,
    rx: SharedReceiver<M>,
}

impl<C, M> ClientStream<C, M>
where
    C: Key,
    M: Send + 'static,
{
    pub(super) fn new(client_id: C, mailbox: Arc<Mailbox<M>>) -> Self {
        let rx = mailbox.receiver();
        Self {
            client_id,
            mailbox,
            rx,
        }
    }

    /// Client ID this stream receives for
    pub fn client_id(&self) -> &C {
        &self.client_id
    }

    /// Receive the next message
    ///
    /// Returns `None` once the mailbox is closed and drained.
    pub async fn recv(&mut self) -> Option<M> {
        self.rx.lock().await.recv().await
    }

    /// Receive a message if one is ready, without waiting
    ///
    /// Returns `Ok(None)` when nothing is buffered (or another handle is
    /// currently receiving), and `ClientClosed` at end of stream.
    pub fn try_recv(&mut self) -> Result<Option<M>> {
        let Ok(mut rx) = self.rx.try_lock() else {
            return Ok(None);
        };

        match rx.try_recv() {
            Ok(msg) => Ok(Some(msg)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => {
                Err(RegistryError::ClientClosed(self.client_id.to_string()))
            }
        }
    }

    /// Close the mailbox this stream is bound to
    ///
    /// Same one-shot guard as `Client::close`; also works after the client was
    /// deleted from its session.
    pub fn close(&self) -> bool {
        self.mailbox.close()
    }

    /// Convert into a stream of messages that ends when the mailbox closes
    pub fn into_stream(self) -> BoxStream<'static, M> {
        stream::unfold(self, |mut this| async move {
            let msg = this.recv().await?;
            Some((msg, this))
        })
        .boxed()
    }
}

impl<C: fmt::Debug, M> fmt::Debug for ClientStream<C, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientStream")
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}
