//! The `clone` workflow: copy-on-write clone of a live cluster.

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use super::{preview, WorkflowContext, WorkflowOutcome};
use crate::constants::CLONE_COMMAND;
use crate::errors::{ProviderWriteError, SnapstageError};
use crate::model::{Stage, Tag};
use crate::provider::{CloneClusterParams, CreateInstanceParams};
use crate::tags::build_tag_set;

/// Inputs for [`run_clone`].
#[derive(Debug, Clone)]
pub struct CloneClusterRequest {
    /// Logical name grouping the family through its lifecycle.
    pub managed_name: String,
    /// Cluster to clone at its latest restorable time.
    pub source_cluster_id: String,
    /// Subnet group for the clone.
    pub subnet_group: String,
    /// Database engine for the instance.
    pub engine: String,
    /// Instance class for the new instance.
    pub instance_class: String,
    /// Availability zone, when pinned.
    pub availability_zone: Option<String>,
    /// Parameter group, when overridden.
    pub parameter_group: Option<String>,
    /// Security groups for the clone.
    pub security_group_ids: Vec<String>,
    /// Operator-supplied tags, already parsed at the boundary.
    pub user_tags: Vec<Tag>,
    /// Age-guard threshold: skip creation if any family member is younger.
    pub min_age_hours: i64,
    /// Gate mutating calls behind a confirmation prompt.
    pub interactive: bool,
}

/// Creates a copy-on-write clone of the source cluster and an instance in
/// it, tagged `new` — all roads into the lifecycle lead to `new`.
pub async fn run_clone(
    ctx: &WorkflowContext,
    req: &CloneClusterRequest,
) -> Result<WorkflowOutcome, SnapstageError> {
    let run_id = Uuid::new_v4();
    info!(command = CLONE_COMMAND, %run_id, managed_name = %req.managed_name, "starting");

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

    let new_name = format!("{}-{}", req.managed_name, Utc::now().format("%Y-%m-%d"));
    let tags = build_tag_set(&req.managed_name, Stage::New, &req.user_tags);

    let cluster_params = CloneClusterParams {
        cluster_id: new_name.clone(),
        source_cluster_id: req.source_cluster_id.clone(),
        subnet_group: req.subnet_group.clone(),
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
    preview("clone settings", &cluster_params);
    preview("instance settings", &instance_params);

    if !ctx
        .confirm(
            req.interactive,
            "Ready to clone cluster and create instance with these settings?",
        )
        .await
    {
        return Ok(WorkflowOutcome::Declined);
    }

    let cluster_id = ctx
        .provisioning()
        .clone_cluster(&cluster_params)
        .await
        .map_err(|e| ProviderWriteError::new("clone-cluster", &cluster_params.cluster_id, &e))?;
    instance_params.cluster_id = cluster_id;

    ctx.provisioning()
        .create_instance(&instance_params)
        .await
        .map_err(|e| {
            ProviderWriteError::new("create-instance", &instance_params.instance_id, &e)
        })?;

    info!(instance = %instance_params.instance_id, "clone and instance creation underway");
    Ok(WorkflowOutcome::Completed)
}
