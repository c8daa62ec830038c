use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, TaskError>;

/// Failures of a single call against the task endpoints.
#[derive(Debug, Error)]
pub enum TaskError {
    /// The endpoint answered with a non-success status.
    #[error("{endpoint} responded with {status}")]
    Network {
        endpoint: &'static str,
        status: StatusCode,
    },

    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A success response carried a body that is not the expected JSON.
    #[error("malformed response: {0}")]
    Parse(#[from] serde_json::Error),

    /// The add form failed a required-field or date check.
    #[error("{0}")]
    InvalidForm(String),

    /// A comma in either field would make the delete body unreadable server-side.
    #[error("cannot remove a task whose employee name or description contains a comma")]
    AmbiguousDelete,
}
