//! Error types for snapstage operations.
//!
//! The taxonomy is intentionally small: malformed operator input, failed
//! provider reads, and failed provider writes. Everything propagates to the
//! top of the command — there is no internal retry logic. The tool favors
//! visible failure over silent partial progress and expects the operator or
//! a wrapping scheduler to re-invoke.
//!
//! "No eligible resource" and "too new" are *not* errors; they are expected
//! clean-exit conditions modeled by [`crate::workflow::WorkflowOutcome`].

use thiserror::Error;

use crate::provider::ProviderError;

/// The main error type for snapstage operations.
#[derive(Debug, Clone, Error)]
pub enum SnapstageError {
    /// An operator-supplied tag string could not be parsed.
    #[error("{0}")]
    MalformedTag(#[from] MalformedTagError),

    /// A provider read (resource or tag listing) failed.
    #[error("{0}")]
    ProviderQuery(#[from] ProviderQueryError),

    /// A provider mutation (tag write, resource change) failed.
    #[error("{0}")]
    ProviderWrite(#[from] ProviderWriteError),
}

/// Error raised when a user-supplied tag string is missing its `=`
/// separator or has an empty key.
///
/// Raised before any provider call is made.
#[derive(Debug, Clone, Error)]
#[error("malformed tag {raw:?}: expected key=value")]
pub struct MalformedTagError {
    /// The raw input that failed to parse.
    pub raw: String,
}

impl MalformedTagError {
    /// Creates a new malformed-tag error for the given raw input.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }
}

/// Error raised when listing resources or tags fails.
///
/// A failed read aborts the entire directory query rather than skipping the
/// resource: an incomplete family view would corrupt downstream stage
/// decisions.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ProviderQueryError {
    /// The provider operation that failed (e.g., `list-tags`).
    pub operation: String,
    /// The resource involved, when the failure was per-resource.
    pub resource_id: Option<String>,
    /// Human-readable failure description.
    pub message: String,
}

impl ProviderQueryError {
    /// Wraps a transport-level provider error from a read operation.
    #[must_use]
    pub fn new(
        operation: impl Into<String>,
        resource_id: Option<String>,
        source: &ProviderError,
    ) -> Self {
        let operation = operation.into();
        let message = match &resource_id {
            Some(id) => format!("provider query {operation} failed for {id}: {source}"),
            None => format!("provider query {operation} failed: {source}"),
        };
        Self {
            operation,
            resource_id,
            message,
        }
    }
}

/// Error raised when a tag update or resource mutation fails.
///
/// Carries the resource identifier so the operator can remediate by hand —
/// a failure mid-way through promotion supersession can leave the previous
/// promoted resource un-retired until the command is re-run.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ProviderWriteError {
    /// The provider operation that failed (e.g., `add-or-update-tag`).
    pub operation: String,
    /// The resource the write targeted.
    pub resource_id: String,
    /// Human-readable failure description.
    pub message: String,
}

impl ProviderWriteError {
    /// Wraps a transport-level provider error from a mutating operation.
    #[must_use]
    pub fn new(
        operation: impl Into<String>,
        resource_id: impl Into<String>,
        source: &ProviderError,
    ) -> Self {
        let operation = operation.into();
        let resource_id = resource_id.into();
        let message = format!("provider write {operation} failed for {resource_id}: {source}");
        Self {
            operation,
            resource_id,
            message,
        }
    }
}
