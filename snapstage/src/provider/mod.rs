//! Provider trait seams.
//!
//! The core state machine only ever talks to the provider through
//! [`ResourceApi`] (resource listing and tagging) and [`ProvisioningApi`]
//! (the restore/clone/DNS/delete calls that the lifecycle workflows
//! delegate to). Both are injected explicitly into the components that need
//! them — there is no ambient or global client.

#[cfg(feature = "http")]
pub mod http;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{ManagedResource, Tag};

/// Transport-level provider failure.
///
/// Converted into [`crate::errors::ProviderQueryError`] or
/// [`crate::errors::ProviderWriteError`] by the component that made the
/// call, which knows whether it was reading or mutating.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ProviderError {
    /// Human-readable failure description from the transport.
    pub message: String,
}

impl ProviderError {
    /// Creates a new provider error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Read/tag access to provider resources.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResourceApi: Send + Sync {
    /// Lists all resources visible in the account/region, managed or not.
    async fn list_resources(&self) -> Result<Vec<ManagedResource>, ProviderError>;

    /// Lists the full tag set of one resource.
    async fn list_tags(&self, resource_id: &str) -> Result<Vec<Tag>, ProviderError>;

    /// Adds or overwrites a single tag; idempotent at the key level.
    async fn add_or_update_tag(&self, resource_id: &str, tag: Tag) -> Result<(), ProviderError>;

    /// Deletes a resource.
    async fn delete_resource(&self, resource_id: &str) -> Result<(), ProviderError>;

    /// Fetches the current attributes of one resource.
    async fn describe_resource(&self, resource_id: &str) -> Result<ManagedResource, ProviderError>;
}

/// Parameters for restoring a cluster from a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestoreClusterParams {
    /// Identifier for the new cluster.
    pub cluster_id: String,
    /// Snapshot to restore from.
    pub snapshot_id: String,
    /// Subnet group to place the cluster in.
    pub subnet_group: String,
    /// Database engine.
    pub engine: String,
    /// Security groups to attach, if any.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub security_group_ids: Vec<String>,
    /// Management and user tags attached at creation.
    pub tags: Vec<Tag>,
}

/// Parameters for a copy-on-write clone of a live cluster at its latest
/// restorable time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloneClusterParams {
    /// Identifier for the new cluster.
    pub cluster_id: String,
    /// Cluster to clone from.
    pub source_cluster_id: String,
    /// Subnet group to place the clone in.
    pub subnet_group: String,
    /// Security groups to attach, if any.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub security_group_ids: Vec<String>,
    /// Management and user tags attached at creation.
    pub tags: Vec<Tag>,
}

/// Parameters for creating an instance inside a cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateInstanceParams {
    /// Identifier for the new instance.
    pub instance_id: String,
    /// Cluster the instance joins.
    pub cluster_id: String,
    /// Database engine.
    pub engine: String,
    /// Instance class (machine size).
    pub instance_class: String,
    /// Availability zone, when pinned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability_zone: Option<String>,
    /// Parameter group, when overridden.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter_group: Option<String>,
    /// Management and user tags attached at creation.
    pub tags: Vec<Tag>,
}

/// A DNS record set within a hosted zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSet {
    /// Fully qualified record name.
    pub name: String,
    /// Record type (e.g., `CNAME`).
    pub record_type: String,
    /// Current target value, absent for an empty record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Time to live in seconds.
    pub ttl: u32,
}

/// Provisioning calls consumed by the lifecycle workflows.
///
/// These are simple provider-specific RPC wrappers with no algorithmic
/// content; the core state machine never calls them directly.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProvisioningApi: Send + Sync {
    /// Returns the newest `available` snapshot of a cluster, if any.
    async fn latest_snapshot(&self, cluster_id: &str) -> Result<Option<String>, ProviderError>;

    /// Restores a new cluster from a snapshot; returns the provider's
    /// cluster identifier.
    async fn restore_cluster(&self, params: &RestoreClusterParams)
        -> Result<String, ProviderError>;

    /// Creates a copy-on-write clone of a cluster at its latest restorable
    /// time; returns the provider's cluster identifier.
    async fn clone_cluster(&self, params: &CloneClusterParams) -> Result<String, ProviderError>;

    /// Creates an instance inside a cluster.
    async fn create_instance(&self, params: &CreateInstanceParams) -> Result<(), ProviderError>;

    /// Returns the provider-reported status string of a cluster.
    async fn cluster_status(&self, cluster_id: &str) -> Result<String, ProviderError>;

    /// Attaches an IAM role to a cluster.
    async fn add_cluster_role(&self, cluster_id: &str, role_arn: &str)
        -> Result<(), ProviderError>;

    /// Looks up a record set by name within a hosted zone.
    async fn find_record_set(
        &self,
        zone_id: &str,
        name: &str,
    ) -> Result<Option<RecordSet>, ProviderError>;

    /// Creates or replaces a record set within a hosted zone.
    async fn upsert_record_set(&self, zone_id: &str, record: &RecordSet)
        -> Result<(), ProviderError>;

    /// Deletes an instance. Must happen before its cluster is deleted.
    async fn delete_instance(&self, instance_id: &str) -> Result<(), ProviderError>;

    /// Deletes an (empty) cluster.
    async fn delete_cluster(&self, cluster_id: &str) -> Result<(), ProviderError>;
}
