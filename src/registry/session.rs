//! Session implementation
//!
//! A session groups the mailboxes of every client registered under one session ID
//! and fans broadcast messages out to them.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, Weak};
use std::time::Duration;

use bytes::Bytes;
use tokio::sync::RwLock;

use super::client::{Client, ClientStream};
use super::entry::Mailbox;
use super::error::{RegistryError, Result};
use super::key::{is_absent, Key};
use super::store::RegistryInner;
use crate::stats::{PushCounters, PushOutcome, SessionStats};

/// A group of clients that all receive the same broadcasts
///
/// Obtained from [`SessionRegistry::get_or_create`](super::SessionRegistry::get_or_create).
/// Client registration takes the write lock on the client map; broadcasting and
/// lookups only take the read lock.
pub struct Session<S, C, M = Bytes> {
    /// Session ID
    id: S,

    /// Capacity of every mailbox created by this session
    max_queue_depth: usize,

    /// Map of client ID to mailbox
    clients: RwLock<HashMap<C, Arc<Mailbox<M>>>>,

    /// Owning registry (for `delete_self`)
    registry: Weak<RegistryInner<S, C, M>>,

    counters: PushCounters,
}

impl<S, C, M> Session<S, C, M>
where
    S: Key,
    C: Key,
    M: Clone + Send + 'static,
{
    pub(super) fn new(
        id: S,
        max_queue_depth: usize,
        registry: Weak<RegistryInner<S, C, M>>,
    ) -> Self {
        Self {
            id,
            max_queue_depth: max_queue_depth.max(1),
            clients: RwLock::new(HashMap::new()),
            registry,
            counters: PushCounters::default(),
        }
    }

    /// Get the session ID
    pub fn id(&self) -> &S {
        &self.id
    }

    /// Get the mailbox capacity used for this session's clients
    pub fn max_queue_depth(&self) -> usize {
        self.max_queue_depth
    }

    /// Register a client, or get a handle onto an already registered one
    ///
    /// Handles for the same client ID share one mailbox, including a mailbox that
    /// was already closed. Delete the client first to start over with a fresh one.
    ///
    /// # Panics
    ///
    /// Panics if `client_id` is the absent (empty) ID.
    pub async fn new_client(self: &Arc<Self>, client_id: C) -> Client<S, C, M> {
        assert!(
            !is_absent(&client_id),
            "client id must not be empty (session {})",
            self.id
        );

        if self.clients.read().await.contains_key(&client_id) {
            return Client::new(client_id, Arc::clone(self));
        }

        let mut clients = self.clients.write().await;

        // Re-check under the write lock; another caller may have registered it
        if !clients.contains_key(&client_id) {
            clients.insert(
                client_id.clone(),
                Arc::new(Mailbox::new(self.max_queue_depth)),
            );

            tracing::debug!(
                session = %self.id,
                client = %client_id,
                depth = self.max_queue_depth,
                clients = clients.len(),
                "Client registered"
            );
        }
        drop(clients);

        Client::new(client_id, Arc::clone(self))
    }

    /// Broadcast a message to every client registered at call time
    ///
    /// Each recipient gets one non-blocking delivery attempt. A full mailbox drops
    /// the message for that client only, and a closed mailbox is skipped. Neither
    /// is reported as an error.
    pub async fn push(&self, message: M) -> PushOutcome {
        let recipients: Vec<Arc<Mailbox<M>>> =
            self.clients.read().await.values().cloned().collect();

        let mut outcome = PushOutcome::default();
        for mailbox in &recipients {
            outcome.record(mailbox.offer(message.clone()));
        }

        self.counters.add(&outcome);

        tracing::trace!(
            session = %self.id,
            recipients = recipients.len(),
            "Broadcast dispatched"
        );

        outcome
    }

    /// Wait for the next message for `client_id`
    ///
    /// Fails immediately with `NoSuchClient` if the client is not registered, and
    /// with `ClientClosed` once the mailbox is closed and drained.
    pub async fn pull(&self, client_id: &C) -> Result<M> {
        // Holding the mailbox keeps it open even if the client is deleted meanwhile
        let mailbox = self.mailbox(client_id).await?;
        let receiver = mailbox.receiver();
        let mut rx = receiver.lock().await;

        rx.recv()
            .await
            .ok_or_else(|| RegistryError::ClientClosed(client_id.to_string()))
    }

    /// Like [`pull`](Self::pull), giving up after `timeout`
    pub async fn pull_timeout(&self, client_id: &C, timeout: Duration) -> Result<M> {
        tokio::time::timeout(timeout, self.pull(client_id))
            .await
            .map_err(|_| RegistryError::Timeout(timeout))?
    }

    /// Like [`pull`](Self::pull), blocking the current thread
    ///
    /// For synchronous callers outside the runtime (e.g. `spawn_blocking`).
    ///
    /// # Panics
    ///
    /// Panics if called from within an asynchronous execution context.
    pub fn pull_blocking(&self, client_id: &C) -> Result<M> {
        let mailbox = self
            .clients
            .blocking_read()
            .get(client_id)
            .cloned()
            .ok_or_else(|| RegistryError::NoSuchClient(client_id.to_string()))?;
        let receiver = mailbox.receiver();
        let mut rx = receiver.blocking_lock();

        rx.blocking_recv()
            .ok_or_else(|| RegistryError::ClientClosed(client_id.to_string()))
    }

    /// Get a reusable receive endpoint for `client_id`
    pub async fn pull_handle(&self, client_id: &C) -> Result<ClientStream<C, M>> {
        let mailbox = self.mailbox(client_id).await?;
        Ok(ClientStream::new(client_id.clone(), mailbox))
    }

    /// Close a client's mailbox
    ///
    /// Returns true only for the call that actually closed it. The client stays
    /// registered; pulls drain buffered messages and then fail with `ClientClosed`.
    pub async fn close_client(&self, client_id: &C) -> bool {
        let Some(mailbox) = self.clients.read().await.get(client_id).cloned() else {
            return false;
        };

        let closed = mailbox.close();
        if closed {
            tracing::debug!(session = %self.id, client = %client_id, "Client closed");
        }
        closed
    }

    /// Close every client mailbox, returning how many were newly closed
    pub async fn close_all(&self) -> usize {
        let mailboxes: Vec<Arc<Mailbox<M>>> =
            self.clients.read().await.values().cloned().collect();

        let closed = mailboxes.iter().filter(|m| m.close()).count();
        if closed > 0 {
            tracing::debug!(session = %self.id, closed = closed, "Closed all clients");
        }
        closed
    }

    /// Remove a client's registration
    ///
    /// Safe to call for a client that does not exist. The mailbox is not closed:
    /// pulls and streams already bound to it can still drain what is buffered.
    pub async fn delete_client(&self, client_id: &C) -> bool {
        let removed = self.clients.write().await.remove(client_id).is_some();

        if removed {
            tracing::debug!(session = %self.id, client = %client_id, "Client removed");
        }
        removed
    }

    /// Number of registered clients
    pub async fn len(&self) -> usize {
        self.clients.read().await.len()
    }

    /// Check if no client is registered
    pub async fn is_empty(&self) -> bool {
        self.clients.read().await.is_empty()
    }

    /// IDs of the registered clients
    ///
    /// Point-in-time snapshot; may be stale as soon as it is returned.
    pub async fn client_ids(&self) -> HashSet<C> {
        self.clients.read().await.keys().cloned().collect()
    }

    /// Check if a client is registered
    pub async fn client_exists(&self, client_id: &C) -> bool {
        self.clients.read().await.contains_key(client_id)
    }

    /// Get session statistics
    pub async fn stats(&self) -> SessionStats {
        let clients = self.clients.read().await;

        let mut stats = SessionStats {
            client_count: clients.len(),
            closed_clients: clients.values().filter(|m| m.is_closed()).count(),
            max_queue_depth: self.max_queue_depth,
            ..Default::default()
        };
        self.counters.fill(&mut stats);
        stats
    }

    /// Remove this session from its registry
    ///
    /// Does nothing if the registry is gone or already maps the ID to another session.
    pub async fn delete_self(&self) -> bool {
        match self.registry.upgrade() {
            Some(registry) => registry.remove(&self.id, Some(self)).await,
            None => false,
        }
    }

    async fn mailbox(&self, client_id: &C) -> Result<Arc<Mailbox<M>>> {
        self.clients
            .read()
            .await
            .get(client_id)
            .cloned()
            .ok_or_else(|| RegistryError::NoSuchClient(client_id.to_string()))
    }
}

impl<S: fmt::Debug, C, M> fmt::Debug for Session<S, C, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("max_queue_depth", &self.max_queue_depth)
            .finish_non_exhaustive()
    }
}
