//! The `promote` workflow: point DNS at the candidate and supersede the
//! previous promoted resource.

use tracing::info;
use uuid::Uuid;

use super::{preview, WorkflowContext, WorkflowOutcome};
use crate::constants::PROMOTE_COMMAND;
use crate::errors::{ProviderQueryError, ProviderWriteError, SnapstageError};
use crate::model::Stage;
use crate::provider::RecordSet;
use crate::selector::select_in_stage;

/// Inputs for [`run_promote`].
#[derive(Debug, Clone)]
pub struct PromoteRequest {
    /// Logical name grouping the family through its lifecycle.
    pub managed_name: String,
    /// Hosted zone containing the record set to repoint.
    pub hosted_zone_id: String,
    /// Name of the record set to repoint.
    pub record_set_name: String,
    /// TTL for the upserted record, in seconds.
    pub ttl: u32,
    /// Gate mutating calls behind a confirmation prompt.
    pub interactive: bool,
}

/// Promotes the family's candidate resource: repoints the DNS record at its
/// endpoint, records stage `promoted`, and retires whatever was promoted
/// before.
///
/// The candidate is the `modified` member when one exists, otherwise the
/// `new` member — modification is an optional step in the lifecycle. The
/// candidate must be `available` with an endpoint; anything younger is left
/// for a later scheduled run.
pub async fn run_promote(
    ctx: &WorkflowContext,
    req: &PromoteRequest,
) -> Result<WorkflowOutcome, SnapstageError> {
    let run_id = Uuid::new_v4();
    info!(command = PROMOTE_COMMAND, %run_id, managed_name = %req.managed_name, "starting");

    let members = ctx
        .directory()
        .find_managed_resources(&req.managed_name)
        .await?;
    let candidate = select_in_stage(&members, Stage::Modified)
        .or_else(|| select_in_stage(&members, Stage::New))
        .cloned();
    let Some(found) = candidate else {
        return Ok(WorkflowOutcome::NothingToDo(format!(
            "no promotable resource for {}",
            req.managed_name
        )));
    };

    let endpoint = match (&found.endpoint, found.is_available()) {
        (Some(endpoint), true) => endpoint.clone(),
        _ => {
            return Ok(WorkflowOutcome::NothingToDo(format!(
                "instance {} is not available yet (status {})",
                found.instance_id, found.status
            )));
        }
    };
    info!(instance = %found.instance_id, %endpoint, "found promotable instance");

    let existing = ctx
        .provisioning()
        .find_record_set(&req.hosted_zone_id, &req.record_set_name)
        .await
        .map_err(|e| {
            ProviderQueryError::new("find-record-set", Some(req.record_set_name.clone()), &e)
        })?;
    let Some(record) = existing else {
        return Ok(WorkflowOutcome::NothingToDo(format!(
            "record set {} not found in zone {}",
            req.record_set_name, req.hosted_zone_id
        )));
    };
    info!(
        record = %record.name,
        current = %record.value.as_deref().unwrap_or("nothing"),
        "found record set"
    );

    let desired = RecordSet {
        name: record.name,
        record_type: record.record_type,
        value: Some(endpoint),
        ttl: req.ttl,
    };
    preview("DNS change", &desired);

    if !ctx
        .confirm(
            req.interactive,
            "Ready to update DNS record with these settings?",
        )
        .await
    {
        return Ok(WorkflowOutcome::Declined);
    }

    ctx.provisioning()
        .upsert_record_set(&req.hosted_zone_id, &desired)
        .await
        .map_err(|e| ProviderWriteError::new("upsert-record-set", &desired.name, &e))?;
    info!(record = %desired.name, "DNS updated");

    let supersession = ctx.executor().promote(&req.managed_name, &found).await?;
    for retired in &supersession.retired {
        info!(instance = %retired, "previous promoted instance retired");
    }
    info!(instance = %supersession.promoted, "promotion recorded");

    Ok(WorkflowOutcome::Completed)
}
