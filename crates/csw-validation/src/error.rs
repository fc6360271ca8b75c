//! # Engine Error Types
//!
//! Collaborator failures ([`StoreError`]) propagate out of validation
//! unchanged inside [`ValidationError`]. Override-workflow precondition
//! failures are ordinary values of [`OverrideError`] so callers can map
//! them to user-facing messages.

use thiserror::Error;

use csw_core::TransactionId;
use csw_state::{OverrideStateError, OverrideStatus};

/// Error returned by every collaborator port.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The addressed record does not exist.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Record kind.
        kind: &'static str,
        /// Identifier that was looked up.
        id: String,
    },

    /// A write conflicted with existing state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The backend could not be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Any other backend failure.
    #[error("store backend error: {0}")]
    Backend(String),
}

/// Errors returned by the validation entry points.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// `revalidate_transaction` was asked for an unknown transaction.
    #[error("transaction not found: {0}")]
    TransactionNotFound(TransactionId),

    /// A collaborator failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The override decision rejected an engine-initiated transition.
    #[error("override state: {0}")]
    State(#[from] OverrideStateError),
}

/// Typed failure results of the override workflow.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OverrideError {
    /// No transaction has this id.
    #[error("transaction not found: {0}")]
    TransactionNotFound(TransactionId),

    /// The transaction's violations do not admit an override.
    #[error("transaction {0} does not require an override")]
    OverrideNotRequired(TransactionId),

    /// The override has already been decided, or was never requested.
    #[error("override is not pending (current status: {current})")]
    NotPending {
        /// Status found on the transaction.
        current: OverrideStatus,
    },

    /// The approver or rejecter was blank.
    #[error("an approver or rejecter is required")]
    MissingActor,

    /// The justification or reason was blank.
    #[error("a justification is required")]
    MissingJustification,

    /// The transaction store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<OverrideStateError> for OverrideError {
    fn from(err: OverrideStateError) -> Self {
        match err {
            OverrideStateError::MissingActor => Self::MissingActor,
            OverrideStateError::MissingJustification => Self::MissingJustification,
            OverrideStateError::InvalidTransition { from, .. } => Self::NotPending { current: from },
            OverrideStateError::TerminalState { state } => Self::NotPending { current: state },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_errors_map_to_typed_results() {
        assert_eq!(
            OverrideError::from(OverrideStateError::MissingJustification),
            OverrideError::MissingJustification
        );
        assert_eq!(
            OverrideError::from(OverrideStateError::TerminalState {
                state: OverrideStatus::Approved
            }),
            OverrideError::NotPending {
                current: OverrideStatus::Approved
            }
        );
    }

    #[test]
    fn store_error_display() {
        let err = StoreError::NotFound {
            kind: "transaction",
            id: "abc".into(),
        };
        assert_eq!(err.to_string(), "transaction not found: abc");
        let wrapped: ValidationError = err.into();
        assert!(wrapped.to_string().contains("abc"));
    }
}
