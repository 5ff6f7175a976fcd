//! Test doubles for the provider seams.
//!
//! [`InMemoryProvider`] implements both provider traits over plain maps so
//! unit and integration tests can seed a family, run a workflow, and
//! inspect every write that happened — no network, no cloud.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::model::{ManagedResource, Stage, Tag};
use crate::provider::{
    CloneClusterParams, CreateInstanceParams, ProviderError, ProvisioningApi, RecordSet,
    ResourceApi, RestoreClusterParams,
};
use crate::tags::stage_tag_key;

#[derive(Debug, Default)]
struct ProviderState {
    calls: usize,
    resources: Vec<ManagedResource>,
    tags: HashMap<String, Vec<Tag>>,
    latest_snapshots: HashMap<String, String>,
    cluster_statuses: HashMap<String, String>,
    record_sets: HashMap<(String, String), RecordSet>,
    fail_tags_for: Option<String>,

    restored: Vec<RestoreClusterParams>,
    cloned: Vec<CloneClusterParams>,
    created_instances: Vec<CreateInstanceParams>,
    roles_added: Vec<(String, String)>,
    upserted_records: Vec<(String, RecordSet)>,
    deleted_instances: Vec<String>,
    deleted_clusters: Vec<String>,
}

/// An in-memory provider implementing [`ResourceApi`] and
/// [`ProvisioningApi`] for tests.
#[derive(Debug, Default)]
pub struct InMemoryProvider {
    state: Mutex<ProviderState>,
}

impl InMemoryProvider {
    /// Creates an empty provider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, ProviderState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record_call(&self) -> MutexGuard<'_, ProviderState> {
        let mut state = self.lock();
        state.calls += 1;
        state
    }

    /// Total number of provider calls made, reads and writes alike.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.lock().calls
    }

    /// Adds a resource carrying the stage tag for `managed_name`.
    pub fn seed_resource(&self, resource: ManagedResource, managed_name: &str, stage: Stage) {
        let mut state = self.lock();
        state.tags.insert(
            resource.instance_id.clone(),
            vec![Tag::new(stage_tag_key(managed_name), stage.as_str())],
        );
        state.resources.push(resource);
    }

    /// Adds a resource with an arbitrary tag set (possibly none).
    pub fn seed_untracked_resource(&self, resource: ManagedResource, tags: Vec<Tag>) {
        let mut state = self.lock();
        state.tags.insert(resource.instance_id.clone(), tags);
        state.resources.push(resource);
    }

    /// Registers the newest available snapshot of a cluster.
    pub fn seed_latest_snapshot(&self, cluster_id: &str, snapshot_id: &str) {
        self.lock()
            .latest_snapshots
            .insert(cluster_id.to_string(), snapshot_id.to_string());
    }

    /// Sets the status reported for a cluster.
    pub fn seed_cluster_status(&self, cluster_id: &str, status: &str) {
        self.lock()
            .cluster_statuses
            .insert(cluster_id.to_string(), status.to_string());
    }

    /// Registers a record set in a hosted zone.
    pub fn seed_record_set(&self, zone_id: &str, record: RecordSet) {
        self.lock()
            .record_sets
            .insert((zone_id.to_string(), record.name.clone()), record);
    }

    /// Makes `list_tags` fail for one resource, to exercise abort paths.
    pub fn fail_tags_for(&self, instance_id: &str) {
        self.lock().fail_tags_for = Some(instance_id.to_string());
    }

    /// Returns the full tag set of a resource.
    #[must_use]
    pub fn tags_of(&self, instance_id: &str) -> Vec<Tag> {
        self.lock()
            .tags
            .get(instance_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Returns the stage-tag value a resource carries for a managed name.
    #[must_use]
    pub fn stage_of(&self, managed_name: &str, instance_id: &str) -> Option<String> {
        let key = stage_tag_key(managed_name);
        self.tags_of(instance_id)
            .into_iter()
            .find(|t| t.key == key)
            .map(|t| t.value)
    }

    /// Restore calls recorded so far.
    #[must_use]
    pub fn restored(&self) -> Vec<RestoreClusterParams> {
        self.lock().restored.clone()
    }

    /// Clone calls recorded so far.
    #[must_use]
    pub fn cloned(&self) -> Vec<CloneClusterParams> {
        self.lock().cloned.clone()
    }

    /// Instance creations recorded so far.
    #[must_use]
    pub fn created_instances(&self) -> Vec<CreateInstanceParams> {
        self.lock().created_instances.clone()
    }

    /// `(cluster_id, role_arn)` pairs recorded so far.
    #[must_use]
    pub fn roles_added(&self) -> Vec<(String, String)> {
        self.lock().roles_added.clone()
    }

    /// Record-set upserts recorded so far.
    #[must_use]
    pub fn upserted_records(&self) -> Vec<(String, RecordSet)> {
        self.lock().upserted_records.clone()
    }

    /// Instances deleted so far, in order.
    #[must_use]
    pub fn deleted_instances(&self) -> Vec<String> {
        self.lock().deleted_instances.clone()
    }

    /// Clusters deleted so far, in order.
    #[must_use]
    pub fn deleted_clusters(&self) -> Vec<String> {
        self.lock().deleted_clusters.clone()
    }
}

#[async_trait]
impl ResourceApi for InMemoryProvider {
    async fn list_resources(&self) -> Result<Vec<ManagedResource>, ProviderError> {
        Ok(self.record_call().resources.clone())
    }

    async fn list_tags(&self, resource_id: &str) -> Result<Vec<Tag>, ProviderError> {
        let state = self.record_call();
        if state.fail_tags_for.as_deref() == Some(resource_id) {
            return Err(ProviderError::new("not authorized to list tags"));
        }
        Ok(state.tags.get(resource_id).cloned().unwrap_or_default())
    }

    async fn add_or_update_tag(&self, resource_id: &str, tag: Tag) -> Result<(), ProviderError> {
        let mut state = self.record_call();
        let tags = state.tags.entry(resource_id.to_string()).or_default();
        if let Some(existing) = tags.iter_mut().find(|t| t.key == tag.key) {
            existing.value = tag.value;
        } else {
            tags.push(tag);
        }
        Ok(())
    }

    async fn delete_resource(&self, resource_id: &str) -> Result<(), ProviderError> {
        let mut state = self.record_call();
        state.resources.retain(|r| r.instance_id != resource_id);
        state.tags.remove(resource_id);
        Ok(())
    }

    async fn describe_resource(&self, resource_id: &str) -> Result<ManagedResource, ProviderError> {
        self.record_call()
            .resources
            .iter()
            .find(|r| r.instance_id == resource_id)
            .cloned()
            .ok_or_else(|| ProviderError::new(format!("no such resource: {resource_id}")))
    }
}

#[async_trait]
impl ProvisioningApi for InMemoryProvider {
    async fn latest_snapshot(&self, cluster_id: &str) -> Result<Option<String>, ProviderError> {
        Ok(self.record_call().latest_snapshots.get(cluster_id).cloned())
    }

    async fn restore_cluster(
        &self,
        params: &RestoreClusterParams,
    ) -> Result<String, ProviderError> {
        let mut state = self.record_call();
        state.restored.push(params.clone());
        Ok(params.cluster_id.clone())
    }

    async fn clone_cluster(&self, params: &CloneClusterParams) -> Result<String, ProviderError> {
        let mut state = self.record_call();
        state.cloned.push(params.clone());
        Ok(params.cluster_id.clone())
    }

    async fn create_instance(&self, params: &CreateInstanceParams) -> Result<(), ProviderError> {
        let mut state = self.record_call();
        state.created_instances.push(params.clone());
        // The new instance joins the resource listing the way a freshly
        // provisioned one would: creating, no timestamp, no endpoint.
        state.tags.insert(params.instance_id.clone(), params.tags.clone());
        state.resources.push(ManagedResource {
            instance_id: params.instance_id.clone(),
            cluster_id: params.cluster_id.clone(),
            created_at: None,
            status: crate::model::ResourceStatus::Creating,
            endpoint: None,
        });
        Ok(())
    }

    async fn cluster_status(&self, cluster_id: &str) -> Result<String, ProviderError> {
        self.record_call()
            .cluster_statuses
            .get(cluster_id)
            .cloned()
            .ok_or_else(|| ProviderError::new(format!("no such cluster: {cluster_id}")))
    }

    async fn add_cluster_role(
        &self,
        cluster_id: &str,
        role_arn: &str,
    ) -> Result<(), ProviderError> {
        self.record_call()
            .roles_added
            .push((cluster_id.to_string(), role_arn.to_string()));
        Ok(())
    }

    async fn find_record_set(
        &self,
        zone_id: &str,
        name: &str,
    ) -> Result<Option<RecordSet>, ProviderError> {
        Ok(self
            .record_call()
            .record_sets
            .get(&(zone_id.to_string(), name.to_string()))
            .cloned())
    }

    async fn upsert_record_set(
        &self,
        zone_id: &str,
        record: &RecordSet,
    ) -> Result<(), ProviderError> {
        let mut state = self.record_call();
        state
            .record_sets
            .insert((zone_id.to_string(), record.name.clone()), record.clone());
        state
            .upserted_records
            .push((zone_id.to_string(), record.clone()));
        Ok(())
    }

    async fn delete_instance(&self, instance_id: &str) -> Result<(), ProviderError> {
        let mut state = self.record_call();
        state.deleted_instances.push(instance_id.to_string());
        state.resources.retain(|r| r.instance_id != instance_id);
        state.tags.remove(instance_id);
        Ok(())
    }

    async fn delete_cluster(&self, cluster_id: &str) -> Result<(), ProviderError> {
        self.record_call().deleted_clusters.push(cluster_id.to_string());
        Ok(())
    }
}
