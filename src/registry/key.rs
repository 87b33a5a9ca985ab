//! Identity types for sessions and clients
//!
//! Session and client identities are supplied by the caller. Any value that can
//! be compared, hashed, cloned and printed qualifies.

use std::fmt::{Debug, Display};
use std::hash::Hash;

/// Bound shared by session IDs and client IDs
pub trait Key: Eq + Hash + Clone + Debug + Display + Send + Sync + 'static {}

impl<T> Key for T where T: Eq + Hash + Clone + Debug + Display + Send + Sync + 'static {}

/// Returns true for the "absent" identity (one that prints as an empty string)
pub(crate) fn is_absent<K: Key>(key: &K) -> bool {
    key.to_string().is_empty()
}
