//! The `modify` workflow: post-restore changes to the `new` cluster.

use tracing::info;
use uuid::Uuid;

use super::{preview, WorkflowContext, WorkflowOutcome};
use crate::constants::MODIFY_COMMAND;
use crate::errors::{ProviderQueryError, ProviderWriteError, SnapstageError};
use crate::model::Stage;
use crate::selector::select_in_stage;

/// Inputs for [`run_modify`].
#[derive(Debug, Clone)]
pub struct ModifyRequest {
    /// Logical name grouping the family through its lifecycle.
    pub managed_name: String,
    /// IAM roles to attach to the cluster. Empty is allowed — the resource
    /// still advances to `modified`.
    pub iam_role_arns: Vec<String>,
    /// Gate mutating calls behind a confirmation prompt.
    pub interactive: bool,
}

/// Attaches IAM roles to the cluster of the family's `new` resource and
/// records stage `modified`.
///
/// The cluster must already be `available`; a cluster still being created
/// cannot be modified yet, so the command reports nothing-to-do and a later
/// scheduled run picks it up.
pub async fn run_modify(
    ctx: &WorkflowContext,
    req: &ModifyRequest,
) -> Result<WorkflowOutcome, SnapstageError> {
    let run_id = Uuid::new_v4();
    info!(command = MODIFY_COMMAND, %run_id, managed_name = %req.managed_name, "starting");

    let members = ctx
        .directory()
        .find_managed_resources(&req.managed_name)
        .await?;
    let Some(found) = select_in_stage(&members, Stage::New).cloned() else {
        return Ok(WorkflowOutcome::NothingToDo(format!(
            "no resource in stage {} for {}",
            Stage::New,
            req.managed_name
        )));
    };
    info!(instance = %found.instance_id, "found instance in stage new");

    let status = ctx
        .provisioning()
        .cluster_status(&found.cluster_id)
        .await
        .map_err(|e| {
            ProviderQueryError::new("cluster-status", Some(found.cluster_id.clone()), &e)
        })?;
    if status != "available" {
        return Ok(WorkflowOutcome::NothingToDo(format!(
            "cluster {} has status {status}, not available",
            found.cluster_id
        )));
    }

    if req.iam_role_arns.is_empty() {
        info!(cluster = %found.cluster_id, "no IAM roles provided; nothing to modify");
    } else {
        preview("IAM roles to attach", &req.iam_role_arns);
        if !ctx
            .confirm(
                req.interactive,
                "Ready to modify cluster with these settings?",
            )
            .await
        {
            return Ok(WorkflowOutcome::Declined);
        }
        for role_arn in &req.iam_role_arns {
            ctx.provisioning()
                .add_cluster_role(&found.cluster_id, role_arn)
                .await
                .map_err(|e| {
                    ProviderWriteError::new("add-cluster-role", &found.cluster_id, &e)
                })?;
            info!(cluster = %found.cluster_id, role = %role_arn, "attached IAM role");
        }
    }

    ctx.executor()
        .record_stage(&req.managed_name, &found, Stage::Modified)
        .await?;

    info!(instance = %found.instance_id, "modification recorded");
    Ok(WorkflowOutcome::Completed)
}
