//! Operator confirmation seam.

use async_trait::async_trait;

/// Asks the operator to confirm a mutating action before it runs.
///
/// Declining aborts the workflow before any provider mutation. The CLI
/// provides a stdin-backed implementation; tests and non-interactive runs
/// use [`AutoApproval`].
#[async_trait]
pub trait Approval: Send + Sync {
    /// Returns true when the operator approves the action.
    async fn confirm(&self, prompt: &str) -> bool;
}

/// An approval that always says yes.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoApproval;

#[async_trait]
impl Approval for AutoApproval {
    async fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

/// An approval that always says no. Test helper.
#[derive(Debug, Clone, Copy, Default)]
pub struct DenyApproval;

#[async_trait]
impl Approval for DenyApproval {
    async fn confirm(&self, _prompt: &str) -> bool {
        false
    }
}
