//! Statistics for sessions and broadcasts

pub mod metrics;

pub use metrics::{PushOutcome, SessionStats};
pub(crate) use metrics::PushCounters;
