//! Domain error types.

use thiserror::Error;

use crate::models::JoinRequestStatus;

/// Errors produced by ride lifecycle operations.
#[derive(Debug, Error)]
pub enum RideError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Ride not found")]
    RideNotFound,

    #[error("Request not found")]
    JoinRequestNotFound,

    #[error("A pending join request from this contact already exists")]
    DuplicateRequest,

    #[error("Join request is already {0}")]
    InvalidTransition(JoinRequestStatus),

    #[error("Ride was modified concurrently, please retry")]
    ConcurrentModification,

    #[error("Store error: {0}")]
    Store(String),
}

impl From<validator::ValidationErrors> for RideError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |err| {
                    format!(
                        "{}: {}",
                        field,
                        err.message.as_ref().unwrap_or(&"".into())
                    )
                })
            })
            .collect();
        messages.sort();
        RideError::Validation(messages.join(", "))
    }
}
