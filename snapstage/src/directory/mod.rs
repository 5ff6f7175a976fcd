//! Resource directory: discovery of a managed-name family.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::errors::{ProviderQueryError, SnapstageError};
use crate::model::{FamilyMember, Stage};
use crate::provider::ResourceApi;
use crate::tags::stage_tag_key;

/// Read-only view over the provider's resources, filtered to a managed
/// family.
///
/// The family is never stored anywhere — it is recomputed on each query by
/// scanning all resources and testing tag membership. Cost is
/// O(resources × tags-per-resource) provider calls, which is fine for an
/// operational tool working on tens of resources.
#[derive(Clone)]
pub struct ResourceDirectory {
    api: Arc<dyn ResourceApi>,
}

impl ResourceDirectory {
    /// Creates a directory over the given resource API.
    #[must_use]
    pub fn new(api: Arc<dyn ResourceApi>) -> Self {
        Self { api }
    }

    /// Finds every resource carrying the stage tag for `managed_name`,
    /// paired with the stage its tag records.
    ///
    /// The first tag whose key matches wins and ends that resource's tag
    /// scan; the provider guarantees per-key uniqueness so there is never a
    /// second match. Resources without the key are excluded. A tag-listing
    /// failure for any resource aborts the whole query — an incomplete
    /// family view would corrupt downstream stage decisions.
    pub async fn find_managed_resources(
        &self,
        managed_name: &str,
    ) -> Result<Vec<FamilyMember>, SnapstageError> {
        let key = stage_tag_key(managed_name);
        let resources = self
            .api
            .list_resources()
            .await
            .map_err(|e| ProviderQueryError::new("list-resources", None, &e))?;

        let mut members = Vec::new();
        for resource in resources {
            let tags = self.api.list_tags(&resource.instance_id).await.map_err(|e| {
                ProviderQueryError::new("list-tags", Some(resource.instance_id.clone()), &e)
            })?;

            if let Some(tag) = tags.into_iter().find(|t| t.key == key) {
                let stage = Stage::from_tag_value(&tag.value);
                if stage.is_none() {
                    warn!(
                        instance = %resource.instance_id,
                        value = %tag.value,
                        "unrecognized stage tag value; member kept but never selectable"
                    );
                }
                members.push(FamilyMember::new(resource, stage));
            }
        }

        debug!(
            managed_name,
            members = members.len(),
            "managed family resolved"
        );
        Ok(members)
    }
}
