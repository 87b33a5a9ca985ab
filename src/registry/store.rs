//! Session registry implementation
//!
//! The central registry that maps session IDs to sessions. It is constructed
//! once and shared by cloning; clones refer to the same sessions.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::RwLock;

use super::config::RegistryConfig;
use super::key::Key;
use super::session::Session;

/// Central registry for all sessions
///
/// Thread-safe via `RwLock`. Lookups take the read lock; only the first reference
/// to a session ID (creation) and deletion take the write lock.
pub struct SessionRegistry<S = String, C = String, M = Bytes> {
    inner: Arc<RegistryInner<S, C, M>>,
}

pub(crate) struct RegistryInner<S, C, M> {
    /// Map of session ID to session
    sessions: RwLock<HashMap<S, Arc<Session<S, C, M>>>>,

    /// Configuration
    config: RegistryConfig,
}

impl<S, C, M> SessionRegistry<S, C, M>
where
    S: Key,
    C: Key,
    M: Clone + Send + 'static,
{
    /// Create a new session registry with default configuration
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create a new session registry with custom configuration
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                sessions: RwLock::new(HashMap::new()),
                config,
            }),
        }
    }

    /// Get the registry configuration
    pub fn config(&self) -> &RegistryConfig {
        &self.inner.config
    }

    /// Get the session for `id`, creating it with the default queue depth if needed
    pub async fn get_or_create(&self, id: S) -> Arc<Session<S, C, M>> {
        let depth = self.inner.config.default_queue_depth;
        self.get_or_create_with_depth(id, depth).await
    }

    /// Get the session for `id`, creating it with `max_queue_depth` if needed
    ///
    /// The depth only applies when the session is created; an existing session
    /// keeps its own. Concurrent callers for the same ID always get the same
    /// session instance.
    pub async fn get_or_create_with_depth(
        &self,
        id: S,
        max_queue_depth: usize,
    ) -> Arc<Session<S, C, M>> {
        if let Some(session) = self.inner.sessions.read().await.get(&id) {
            return Arc::clone(session);
        }

        let mut sessions = self.inner.sessions.write().await;
        let session = sessions.entry(id).or_insert_with_key(|id| {
            tracing::info!(
                session = %id,
                depth = max_queue_depth,
                "Session created"
            );
            Arc::new(Session::new(
                id.clone(),
                max_queue_depth,
                Arc::downgrade(&self.inner),
            ))
        });

        Arc::clone(session)
    }

    /// Get an existing session without creating one
    pub async fn get(&self, id: &S) -> Option<Arc<Session<S, C, M>>> {
        self.inner.sessions.read().await.get(id).cloned()
    }

    /// Check if a session exists
    pub async fn exists(&self, id: &S) -> bool {
        self.inner.sessions.read().await.contains_key(id)
    }

    /// Delete a session
    ///
    /// Safe to call for a session that does not exist. Existing handles keep
    /// working; the ID resolves to a new session on the next `get_or_create`.
    pub async fn delete(&self, id: &S) -> bool {
        self.inner.remove(id, None).await
    }

    /// Get total number of sessions
    pub async fn session_count(&self) -> usize {
        self.inner.sessions.read().await.len()
    }

    /// IDs of all sessions
    pub async fn session_ids(&self) -> Vec<S> {
        self.inner.sessions.read().await.keys().cloned().collect()
    }
}

impl<S, C, M> RegistryInner<S, C, M>
where
    S: Key,
    C: Key,
    M: Clone + Send + 'static,
{
    /// Remove `id`, optionally only if it still maps to `expected`
    pub(super) async fn remove(&self, id: &S, expected: Option<&Session<S, C, M>>) -> bool {
        let removed = {
            let mut sessions = self.sessions.write().await;
            let matches = sessions.get(id).is_some_and(|existing| {
                expected.map_or(true, |expected| std::ptr::eq(Arc::as_ptr(existing), expected))
            });

            if matches {
                sessions.remove(id)
            } else {
                None
            }
        };

        let Some(session) = removed else {
            return false;
        };

        if self.config.close_clients_on_delete {
            session.close_all().await;
        }

        let clients = session.len().await;
        tracing::info!(session = %id, clients = clients, "Session deleted");

        true
    }
}

impl<S, C, M> Clone for SessionRegistry<S, C, M> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S, C, M> Default for SessionRegistry<S, C, M>
where
    S: Key,
    C: Key,
    M: Clone + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
