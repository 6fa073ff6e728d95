//! Shared error types for the services crate.

use thiserror::Error;

use assess_core::model::{ScoreError, SessionStateError};
use storage::repository::StorageError;

/// Errors reported by the scoring backend client.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    /// Transport-level failure; always retryable by user action.
    #[error(transparent)]
    Network(#[from] reqwest::Error),

    /// The backend answered with a non-success status; the message is
    /// surfaced verbatim.
    #[error("server error ({status}): {message}")]
    Server {
        status: reqwest::StatusCode,
        message: String,
    },

    /// 401-class response; the caller must clear the token and re-login.
    #[error("unauthorized")]
    Auth,

    /// The backend rejected the input, or a success body failed validation.
    #[error("invalid data: {0}")]
    Validation(String),
}

/// Errors emitted by `AssessmentFlow`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AssessmentError {
    #[error("no auth token stored; log in before submitting")]
    NotAuthenticated,
    #[error(transparent)]
    State(#[from] SessionStateError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `DashboardService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DashboardError {
    #[error("no auth token stored; log in to load the dashboard")]
    NotAuthenticated,
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Score(#[from] ScoreError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `AuthService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AuthServiceError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("server error ({status}): {message}")]
    Server {
        status: reqwest::StatusCode,
        message: String,
    },
    #[error(transparent)]
    Network(#[from] reqwest::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ChatService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ChatError {
    #[error("prompt is empty")]
    EmptyPrompt,
    #[error("chat backend returned an empty response")]
    EmptyResponse,
    #[error("chat request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Failure while rendering a report document.
#[derive(Debug, Error)]
#[error("render failed: {0}")]
pub struct RenderError(pub String);

/// Failure while uploading a rendered report.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum UploadError {
    #[error("upload failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("upload rejected: {0}")]
    Rejected(String),
}

/// Which export stage failed; retry logic keys off this so a successful
/// render is never repeated for an upload-only failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportStage {
    Render,
    Upload,
}

/// Errors emitted by `ReportExporter`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExportError {
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Upload(#[from] UploadError),
    #[error("session has no score result to export")]
    NotScored,
    #[error("no rendered report retained; export before retrying the upload")]
    NothingRendered,
}

impl ExportError {
    /// The stage this failure belongs to.
    #[must_use]
    pub fn stage(&self) -> ExportStage {
        match self {
            ExportError::Render(_) | ExportError::NotScored => ExportStage::Render,
            ExportError::Upload(_) | ExportError::NothingRendered => ExportStage::Upload,
        }
    }
}
