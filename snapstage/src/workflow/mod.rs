//! Lifecycle workflows.
//!
//! Every operation follows the same sequence: eligibility (directory plus
//! age guard or stage selector), operator confirmation, the external
//! provisioning action, then stage recording through the transition
//! executor. Only the external action and the specific transition differ
//! between commands.

mod approval;
mod clone;
mod modify;
mod new;
mod outcome;
mod promote;
mod retire;

#[cfg(test)]
mod integration_tests;

pub use approval::{Approval, AutoApproval, DenyApproval};
pub use clone::{run_clone, CloneClusterRequest};
pub use modify::{run_modify, ModifyRequest};
pub use new::{run_new, NewClusterRequest};
pub use outcome::WorkflowOutcome;
pub use promote::{run_promote, PromoteRequest};
pub use retire::{run_retire, RetireRequest};

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::directory::ResourceDirectory;
use crate::executor::TransitionExecutor;
use crate::guard::AgeGuard;
use crate::provider::{ProvisioningApi, ResourceApi};

/// Shared collaborators for the lifecycle workflows.
///
/// Both provider halves and the approval seam are injected explicitly; a
/// context is cheap to clone and carries no state of its own.
#[derive(Clone)]
pub struct WorkflowContext {
    resources: Arc<dyn ResourceApi>,
    provisioning: Arc<dyn ProvisioningApi>,
    approval: Arc<dyn Approval>,
}

impl WorkflowContext {
    /// Creates a context from the injected collaborators.
    #[must_use]
    pub fn new(
        resources: Arc<dyn ResourceApi>,
        provisioning: Arc<dyn ProvisioningApi>,
        approval: Arc<dyn Approval>,
    ) -> Self {
        Self {
            resources,
            provisioning,
            approval,
        }
    }

    /// A directory over the resource API.
    #[must_use]
    pub fn directory(&self) -> ResourceDirectory {
        ResourceDirectory::new(Arc::clone(&self.resources))
    }

    /// An age guard over the resource API.
    #[must_use]
    pub fn age_guard(&self) -> AgeGuard {
        AgeGuard::new(self.directory())
    }

    /// A transition executor over the resource API.
    #[must_use]
    pub fn executor(&self) -> TransitionExecutor {
        TransitionExecutor::new(Arc::clone(&self.resources))
    }

    /// The provisioning API half.
    #[must_use]
    pub fn provisioning(&self) -> &dyn ProvisioningApi {
        self.provisioning.as_ref()
    }

    /// Asks the operator for confirmation when running interactively;
    /// non-interactive runs are pre-approved.
    pub(crate) async fn confirm(&self, interactive: bool, prompt: &str) -> bool {
        if interactive {
            self.approval.confirm(prompt).await
        } else {
            true
        }
    }
}

/// Logs a parameter set as pretty-printed JSON so the operator can see
/// exactly what will be sent before confirming.
pub(crate) fn preview<T: Serialize>(label: &str, value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => info!("{label}:\n{json}"),
        Err(err) => warn!(label, %err, "failed to render parameter preview"),
    }
}
