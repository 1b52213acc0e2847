//! Error type for entity construction and configuration loading.
//!
//! Per-tick operations never fail; only startup paths (building an entity,
//! registering states, loading config) return [`Result`].

use thiserror::Error;

/// Errors raised while setting up an entity.
#[derive(Debug, Error)]
pub enum EntityError {
    /// A shape field is outside its valid range.
    #[error("invalid shape: {field} = {value}")]
    InvalidShape { field: &'static str, value: f32 },

    /// A state manager was built without any states.
    #[error("state manager has no registered states")]
    NoStates,

    /// The same state id was registered twice.
    #[error("state {0} registered more than once")]
    DuplicateState(String),

    /// Reading a config file failed.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// A config file is not valid JSON for [`EntityConfig`](crate::config::EntityConfig).
    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias used by construction paths.
pub type Result<T> = std::result::Result<T, EntityError>;
