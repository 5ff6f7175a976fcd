//! Provider-side resource representation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Operational status of a managed resource.
///
/// Only the statuses the state machine cares about are distinguished; every
/// other provider status string is preserved in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ResourceStatus {
    /// Still provisioning; no creation timestamp or endpoint yet.
    Creating,
    /// Fully provisioned and reachable.
    Available,
    /// Deletion in progress.
    Deleting,
    /// Any other provider-reported status.
    Other(String),
}

impl From<String> for ResourceStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "creating" => Self::Creating,
            "available" => Self::Available,
            "deleting" => Self::Deleting,
            _ => Self::Other(value),
        }
    }
}

impl From<ResourceStatus> for String {
    fn from(status: ResourceStatus) -> Self {
        match status {
            ResourceStatus::Creating => "creating".to_string(),
            ResourceStatus::Available => "available".to_string(),
            ResourceStatus::Deleting => "deleting".to_string(),
            ResourceStatus::Other(s) => s,
        }
    }
}

impl fmt::Display for ResourceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Creating => f.write_str("creating"),
            Self::Available => f.write_str("available"),
            Self::Deleting => f.write_str("deleting"),
            Self::Other(s) => f.write_str(s),
        }
    }
}

/// A provider-side compute resource within a managed database cluster.
///
/// The provider owns resource lifetime; this tool only reads attributes and
/// writes tags. `created_at` is absent while the resource is still being
/// created, and `endpoint` is present only once it is available.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagedResource {
    /// Opaque instance identifier (tag operations target this).
    pub instance_id: String,
    /// Identifier of the cluster the instance belongs to.
    pub cluster_id: String,
    /// Creation timestamp; `None` while still provisioning.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Current operational status.
    pub status: ResourceStatus,
    /// Endpoint address, present only once available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

impl ManagedResource {
    /// Returns true when the resource is fully provisioned.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.status == ResourceStatus::Available
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_strings() {
        assert_eq!(ResourceStatus::from("creating".to_string()), ResourceStatus::Creating);
        assert_eq!(String::from(ResourceStatus::Available), "available");
        let other = ResourceStatus::from("backing-up".to_string());
        assert_eq!(other, ResourceStatus::Other("backing-up".to_string()));
        assert_eq!(String::from(other), "backing-up");
    }

    #[test]
    fn resource_deserializes_without_optional_fields() {
        let json = r#"{"instance_id":"db-1","cluster_id":"c-1","status":"creating"}"#;
        let resource: ManagedResource = serde_json::from_str(json).unwrap();
        assert_eq!(resource.created_at, None);
        assert_eq!(resource.endpoint, None);
        assert_eq!(resource.status, ResourceStatus::Creating);
        assert!(!resource.is_available());
    }
}
