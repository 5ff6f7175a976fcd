//! Transition executor: stage-tag writes and promotion supersession.

use std::sync::Arc;

use tracing::{info, warn};

use crate::directory::ResourceDirectory;
use crate::errors::{ProviderWriteError, SnapstageError};
use crate::model::{ManagedResource, Stage, Tag};
use crate::provider::ResourceApi;
use crate::tags::stage_tag_key;

/// Result of a promotion: which resource became `promoted` and which
/// previously promoted resources were advanced to `retired`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Supersession {
    /// Instance that now carries the `promoted` stage.
    pub promoted: String,
    /// Previously promoted instances moved to `retired` (usually zero or
    /// one; more than one only after an earlier race or partial failure).
    pub retired: Vec<String>,
}

/// Applies stage transitions by writing stage tags.
///
/// Uses the same key derivation as resource creation, which is what makes
/// transitions observable to subsequent directory queries.
#[derive(Clone)]
pub struct TransitionExecutor {
    api: Arc<dyn ResourceApi>,
    directory: ResourceDirectory,
}

impl TransitionExecutor {
    /// Creates an executor over the given resource API.
    #[must_use]
    pub fn new(api: Arc<dyn ResourceApi>) -> Self {
        let directory = ResourceDirectory::new(Arc::clone(&api));
        Self { api, directory }
    }

    /// Writes the stage tag for `resource` (add-or-overwrite).
    ///
    /// Idempotent: repeating the call with the same arguments leaves
    /// exactly one stage tag with the same value.
    pub async fn record_stage(
        &self,
        managed_name: &str,
        resource: &ManagedResource,
        stage: Stage,
    ) -> Result<(), SnapstageError> {
        let tag = Tag::new(stage_tag_key(managed_name), stage.as_str());
        info!(
            instance = %resource.instance_id,
            stage = %stage,
            "recording stage"
        );
        self.api
            .add_or_update_tag(&resource.instance_id, tag)
            .await
            .map_err(|e| {
                ProviderWriteError::new("add-or-update-tag", &resource.instance_id, &e)
            })?;
        Ok(())
    }

    /// Records `resource` as `promoted`, then retires whatever else still
    /// carries the `promoted` stage for this managed name.
    ///
    /// The two writes are not atomic: between them an external observer can
    /// see two resources tagged `promoted`. That window is a transient, not
    /// an error. A failure after the first write leaves the old promoted
    /// resource un-retired; re-running promote with the same target
    /// re-detects and retires it.
    pub async fn promote(
        &self,
        managed_name: &str,
        resource: &ManagedResource,
    ) -> Result<Supersession, SnapstageError> {
        self.record_stage(managed_name, resource, Stage::Promoted)
            .await?;

        let members = self.directory.find_managed_resources(managed_name).await?;
        let mut retired = Vec::new();
        for member in &members {
            if member.stage == Some(Stage::Promoted)
                && member.resource.instance_id != resource.instance_id
            {
                warn!(
                    instance = %member.resource.instance_id,
                    "retiring previously promoted instance"
                );
                self.record_stage(managed_name, &member.resource, Stage::Retired)
                    .await?;
                retired.push(member.resource.instance_id.clone());
            }
        }

        Ok(Supersession {
            promoted: resource.instance_id.clone(),
            retired,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ResourceStatus;
    use crate::testing::InMemoryProvider;
    use chrono::{TimeZone, Utc};

    fn resource(id: &str, hour: u32) -> ManagedResource {
        ManagedResource {
            instance_id: id.to_string(),
            cluster_id: format!("{id}-cluster"),
            created_at: Some(Utc.with_ymd_and_hms(2024, 6, 1, hour, 0, 0).unwrap()),
            status: ResourceStatus::Available,
            endpoint: Some(format!("{id}.db.internal")),
        }
    }

    #[tokio::test]
    async fn record_stage_writes_the_stage_tag() {
        let provider = Arc::new(InMemoryProvider::new());
        let a = resource("db-a", 0);
        provider.seed_resource(a.clone(), "reporting", Stage::New);

        let executor = TransitionExecutor::new(provider.clone());
        executor
            .record_stage("reporting", &a, Stage::Modified)
            .await
            .unwrap();

        assert_eq!(
            provider.stage_of("reporting", "db-a"),
            Some("modified".to_string())
        );
    }

    #[tokio::test]
    async fn record_stage_is_idempotent() {
        let provider = Arc::new(InMemoryProvider::new());
        let a = resource("db-a", 0);
        provider.seed_resource(a.clone(), "reporting", Stage::New);

        let executor = TransitionExecutor::new(provider.clone());
        executor
            .record_stage("reporting", &a, Stage::Promoted)
            .await
            .unwrap();
        executor
            .record_stage("reporting", &a, Stage::Promoted)
            .await
            .unwrap();

        let stage_key = stage_tag_key("reporting");
        let stage_tags: Vec<_> = provider
            .tags_of("db-a")
            .into_iter()
            .filter(|t| t.key == stage_key)
            .collect();
        assert_eq!(stage_tags, vec![Tag::new(stage_key, "promoted")]);
    }

    #[tokio::test]
    async fn promote_supersedes_the_previously_promoted_resource() {
        let provider = Arc::new(InMemoryProvider::new());
        let old = resource("db-old", 0);
        let new = resource("db-new", 1);
        provider.seed_resource(old, "reporting", Stage::Promoted);
        provider.seed_resource(new.clone(), "reporting", Stage::New);

        let executor = TransitionExecutor::new(provider.clone());
        let outcome = executor.promote("reporting", &new).await.unwrap();

        assert_eq!(outcome.promoted, "db-new");
        assert_eq!(outcome.retired, vec!["db-old".to_string()]);
        assert_eq!(
            provider.stage_of("reporting", "db-new"),
            Some("promoted".to_string())
        );
        assert_eq!(
            provider.stage_of("reporting", "db-old"),
            Some("retired".to_string())
        );
    }

    #[tokio::test]
    async fn promote_without_a_predecessor_retires_nothing() {
        let provider = Arc::new(InMemoryProvider::new());
        let new = resource("db-new", 1);
        provider.seed_resource(new.clone(), "reporting", Stage::New);

        let executor = TransitionExecutor::new(provider.clone());
        let outcome = executor.promote("reporting", &new).await.unwrap();

        assert_eq!(outcome.retired, Vec::<String>::new());
    }

    #[tokio::test]
    async fn rerunning_promote_after_partial_failure_is_safe() {
        // Simulate the accepted inconsistency: the target is already
        // promoted but the old one was never retired.
        let provider = Arc::new(InMemoryProvider::new());
        let stale = resource("db-stale", 0);
        let target = resource("db-target", 1);
        provider.seed_resource(stale, "reporting", Stage::Promoted);
        provider.seed_resource(target.clone(), "reporting", Stage::Promoted);

        let executor = TransitionExecutor::new(provider.clone());
        let outcome = executor.promote("reporting", &target).await.unwrap();

        assert_eq!(outcome.retired, vec!["db-stale".to_string()]);
        assert_eq!(
            provider.stage_of("reporting", "db-target"),
            Some("promoted".to_string())
        );
    }

    #[tokio::test]
    async fn promote_does_not_touch_other_families() {
        let provider = Arc::new(InMemoryProvider::new());
        let other = resource("db-other", 0);
        let new = resource("db-new", 1);
        provider.seed_resource(other, "analytics", Stage::Promoted);
        provider.seed_resource(new.clone(), "reporting", Stage::New);

        let executor = TransitionExecutor::new(provider.clone());
        let outcome = executor.promote("reporting", &new).await.unwrap();

        assert!(outcome.retired.is_empty());
        assert_eq!(
            provider.stage_of("analytics", "db-other"),
            Some("promoted".to_string())
        );
    }
}
