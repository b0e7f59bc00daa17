use thiserror::Error;

use crate::quiz::window::format_seconds;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
    #[error("Quiz {0} not found")]
    NotFound(u64),
    #[error("Result not available yet, wait {}s more", wait_secs(.remaining_secs))]
    NotYetAvailable { remaining_secs: f64 },
    #[error("stored quiz has no '{0}' field")]
    MissingField(&'static str),
    #[error("invalid timestamp {value:?}: {reason}")]
    InvalidTimestamp { value: String, reason: String },
    #[error("storage error: {0}")]
    Storage(String),
}

fn wait_secs(secs: &f64) -> String { format_seconds(*secs) }

impl ServiceError {
    pub fn storage(e: impl std::fmt::Display) -> Self { Self::Storage(e.to_string()) }
}

impl From<std::io::Error> for ServiceError {
    fn from(e: std::io::Error) -> Self { Self::storage(e) }
}

impl From<serde_json::Error> for ServiceError {
    fn from(e: serde_json::Error) -> Self { Self::storage(e) }
}
