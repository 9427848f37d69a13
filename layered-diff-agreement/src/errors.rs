use layered_diff::DiffError;
use thiserror::Error;

/// Errors that can occur while computing agreement.
#[derive(Debug, Error)]
pub enum AgreementError {
    /// Pairwise statistics need exactly two groups.
    #[error("agreement needs exactly two groups, found {found}")]
    GroupCount { found: usize },

    #[error(transparent)]
    Diff(#[from] DiffError),
}
