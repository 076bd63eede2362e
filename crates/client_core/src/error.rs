use thiserror::Error;

/// Internal failures of the state containers. User-facing failures
/// (validation, not found) travel as [`shared::error::ApiError`] instead.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("stored session under '{key}' is malformed: {source}")]
    MalformedSession {
        key: &'static str,
        source: serde_json::Error,
    },
    #[error("local storage failure: {source:#}")]
    Storage { source: anyhow::Error },
    #[error("bundled event catalog is invalid: {source}")]
    Catalog { source: serde_json::Error },
    #[error("operation queue has shut down")]
    ShutDown,
}

impl ClientError {
    pub(crate) fn storage(source: anyhow::Error) -> Self {
        Self::Storage { source }
    }
}
