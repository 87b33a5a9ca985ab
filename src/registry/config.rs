//! Registry configuration

/// Mailbox capacity used when a session is created without an explicit depth
pub const DEFAULT_QUEUE_DEPTH: usize = 10;

/// Session registry configuration options
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Capacity of each client mailbox for sessions created via `get_or_create`
    pub default_queue_depth: usize,

    /// Close every client mailbox of a session when it is deleted from the registry
    pub close_clients_on_delete: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            default_queue_depth: DEFAULT_QUEUE_DEPTH,
            close_clients_on_delete: false,
        }
    }
}

impl RegistryConfig {
    /// Set the default mailbox depth
    ///
    /// A mailbox must be able to hold at least one message, so zero is raised to one.
    pub fn default_queue_depth(mut self, depth: usize) -> Self {
        self.default_queue_depth = depth.max(1);
        self
    }

    /// Close client mailboxes when their session is deleted
    pub fn close_clients_on_delete(mut self, enabled: bool) -> Self {
        self.close_clients_on_delete = enabled;
        self
    }
}
