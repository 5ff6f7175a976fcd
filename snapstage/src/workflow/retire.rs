//! The `retire` workflow: delete the superseded cluster.

use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use super::{preview, WorkflowContext, WorkflowOutcome};
use crate::constants::RETIRE_COMMAND;
use crate::errors::{ProviderWriteError, SnapstageError};
use crate::model::Stage;
use crate::selector::select_in_stage;

/// Inputs for [`run_retire`].
#[derive(Debug, Clone)]
pub struct RetireRequest {
    /// Logical name grouping the family through its lifecycle.
    pub managed_name: String,
    /// Gate the deletion behind a confirmation prompt.
    pub interactive: bool,
}

#[derive(Debug, Serialize)]
struct DeletionPlan<'a> {
    instance_id: &'a str,
    cluster_id: &'a str,
    skip_final_snapshot: bool,
}

/// Deletes the family member in stage `retired`, instance first so the
/// cluster is empty when it goes.
///
/// This is the only way a resource leaves its family. Deletion also drops
/// automated backups, hence the louder prompt.
pub async fn run_retire(
    ctx: &WorkflowContext,
    req: &RetireRequest,
) -> Result<WorkflowOutcome, SnapstageError> {
    let run_id = Uuid::new_v4();
    info!(command = RETIRE_COMMAND, %run_id, managed_name = %req.managed_name, "starting");

    let members = ctx
        .directory()
        .find_managed_resources(&req.managed_name)
        .await?;
    let Some(found) = select_in_stage(&members, Stage::Retired).cloned() else {
        return Ok(WorkflowOutcome::NothingToDo(format!(
            "no resource in stage {} for {}",
            Stage::Retired,
            req.managed_name
        )));
    };
    info!(instance = %found.instance_id, "found instance ready for retirement");

    preview(
        "deletion plan",
        &DeletionPlan {
            instance_id: &found.instance_id,
            cluster_id: &found.cluster_id,
            skip_final_snapshot: true,
        },
    );
    if !ctx
        .confirm(
            req.interactive,
            "Ready to DELETE this database instance and cluster along with ALL AUTOMATED BACKUPS?",
        )
        .await
    {
        return Ok(WorkflowOutcome::Declined);
    }

    ctx.provisioning()
        .delete_instance(&found.instance_id)
        .await
        .map_err(|e| ProviderWriteError::new("delete-instance", &found.instance_id, &e))?;
    ctx.provisioning()
        .delete_cluster(&found.cluster_id)
        .await
        .map_err(|e| ProviderWriteError::new("delete-cluster", &found.cluster_id, &e))?;

    info!(instance = %found.instance_id, cluster = %found.cluster_id, "deletion underway");
    Ok(WorkflowOutcome::Completed)
}
