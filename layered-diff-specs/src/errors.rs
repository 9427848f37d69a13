//! Error types for fixture runs.

use layered_diff::DiffError;
use layered_diff_agreement::AgreementError;
use thiserror::Error;

/// Errors that can occur while loading or running fixtures.
#[derive(Debug, Error)]
pub enum SpecError {
    /// Error parsing a fixture file.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Error loading a fixture file.
    #[error("failed to load fixture: {path}: {message}")]
    Load { path: String, message: String },

    /// A fixture describes documents that cannot be built.
    #[error("invalid fixture: {message}")]
    Fixture { message: String },

    #[error("diff failed: {0}")]
    Diff(#[from] DiffError),

    #[error("agreement failed: {0}")]
    Agreement(#[from] AgreementError),
}

/// Result type for spec operations.
pub type SpecResult<T> = Result<T, SpecError>;
