use binplan_core::{GridError, PlacementId};
use thiserror::Error;

/// Shown for failures that carry no message meant for the user.
pub const GENERIC_FAILURE_MESSAGE: &str = "Request failed, please try again";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),
}

impl ClientError {
    /// The server rejected the request as invalid (overlap, out of bounds, bad input).
    pub fn is_validation(&self) -> bool {
        matches!(self, ClientError::Api { status: 400 | 409 | 422, .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::Api { status: 404, .. })
    }

    /// Text for the error banner: validation messages verbatim, anything else generic.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Api { message, .. } if self.is_validation() => message.clone(),
            _ => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum EditorError {
    #[error(transparent)]
    Grid(#[from] GridError),

    #[error(transparent)]
    Service(#[from] ClientError),

    #[error("No placement is awaiting confirmation")]
    NoPendingPlacement,

    #[error("No resize is in progress")]
    NoActiveResize,

    #[error("Placement not found: {0}")]
    UnknownPlacement(PlacementId),

    #[error("Layout has not been loaded")]
    LayoutNotLoaded,
}

impl EditorError {
    pub fn user_message(&self) -> String {
        match self {
            EditorError::Service(e) => e.user_message(),
            other => other.to_string(),
        }
    }
}
