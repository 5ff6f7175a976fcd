//! The `new` workflow: restore a fresh cluster from the newest snapshot.

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use super::{preview, WorkflowContext, WorkflowOutcome};
use crate::constants::NEW_COMMAND;
use crate::errors::{ProviderQueryError, ProviderWriteError, SnapstageError};
use crate::model::{Stage, Tag};
use crate::provider::{CreateInstanceParams, RestoreClusterParams};
use crate::tags::build_tag_set;

/// Inputs for [`run_new`].
#[derive(Debug, Clone)]
pub struct NewClusterRequest {
    /// Logical name grouping the family through its lifecycle.
    pub managed_name: String,
    /// Production cluster whose newest snapshot is restored.
    pub source_cluster_id: String,
    /// Subnet group for the new cluster.
    pub subnet_group: String,
    /// Database engine.
    pub engine: String,
    /// Instance class for the new instance.
    pub instance_class: String,
    /// Availability zone, when pinned.
    pub availability_zone: Option<String>,
    /// Parameter group, when overridden.
    pub parameter_group: Option<String>,
    /// Security groups for the new cluster.
    pub security_group_ids: Vec<String>,
    /// Operator-supplied tags, already parsed at the boundary.
    pub user_tags: Vec<Tag>,
    /// Age-guard threshold: skip creation if any family member is younger.
    pub min_age_hours: i64,
    /// Gate mutating calls behind a confirmation prompt.
    pub interactive: bool,
}

/// Restores a cluster from the newest available snapshot of the source
/// cluster and creates an instance in it, tagged `new`.
///
/// Throttled by the age guard so a scheduler cannot spawn redundant
/// clusters faster than one per `min_age_hours`.
pub async fn run_new(
    ctx: &WorkflowContext,
    req: &NewClusterRequest,
) -> Result<WorkflowOutcome, SnapstageError> {
    let run_id = Uuid::new_v4();
    info!(command = NEW_COMMAND, %run_id, managed_name = %req.managed_name, "starting");

    if ctx
        .age_guard()
        .is_too_new(&req.managed_name, req.min_age_hours)
        .await?
    {
        info!(
            managed_name = %req.managed_name,
            min_age_hours = req.min_age_hours,
            "age guard tripped"
        );
        return Ok(WorkflowOutcome::Throttled);
    }

    let snapshot = ctx
        .provisioning()
        .latest_snapshot(&req.source_cluster_id)
        .await
        .map_err(|e| {
            ProviderQueryError::new("latest-snapshot", Some(req.source_cluster_id.clone()), &e)
        })?;
    let Some(snapshot_id) = snapshot else {
        return Ok(WorkflowOutcome::NothingToDo(format!(
            "no available snapshot for cluster {}",
            req.source_cluster_id
        )));
    };
    info!(%snapshot_id, "located cluster snapshot");

    // One restore per day per family; the date suffix keeps identifiers
    // unique across runs and the age guard keeps runs apart.
    let new_name = format!("{}-{}", req.managed_name, Utc::now().format("%Y-%m-%d"));
    let tags = build_tag_set(&req.managed_name, Stage::New, &req.user_tags);

    let cluster_params = RestoreClusterParams {
        cluster_id: new_name.clone(),
        snapshot_id,
        subnet_group: req.subnet_group.clone(),
        engine: req.engine.clone(),
        security_group_ids: req.security_group_ids.clone(),
        tags: tags.clone(),
    };
    let mut instance_params = CreateInstanceParams {
        instance_id: new_name.clone(),
        cluster_id: new_name,
        engine: req.engine.clone(),
        instance_class: req.instance_class.clone(),
        availability_zone: req.availability_zone.clone(),
        parameter_group: req.parameter_group.clone(),
        tags,
    };
    preview("cluster settings", &cluster_params);
    preview("instance settings", &instance_params);

    if !ctx
        .confirm(
            req.interactive,
            "Ready to create cluster and instance with these settings?",
        )
        .await
    {
        return Ok(WorkflowOutcome::Declined);
    }

    let cluster_id = ctx
        .provisioning()
        .restore_cluster(&cluster_params)
        .await
        .map_err(|e| ProviderWriteError::new("restore-cluster", &cluster_params.cluster_id, &e))?;
    // Use the identifier the provider actually assigned.
    instance_params.cluster_id = cluster_id;

    ctx.provisioning()
        .create_instance(&instance_params)
        .await
        .map_err(|e| {
            ProviderWriteError::new("create-instance", &instance_params.instance_id, &e)
        })?;

    info!(instance = %instance_params.instance_id, "cluster and instance creation underway");
    Ok(WorkflowOutcome::Completed)
}
