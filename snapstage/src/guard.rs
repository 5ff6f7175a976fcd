//! Age guard: throttle for the creation workflows.
//!
//! Scheduled invocation of `new`/`clone` must not spawn redundant clusters
//! faster than one per `min_age_hours`. The guard looks at the whole family
//! (every stage) and reports "too new" if anything is still provisioning or
//! younger than the threshold.

use chrono::{DateTime, Duration, Utc};
use tracing::info;

use crate::directory::ResourceDirectory;
use crate::errors::SnapstageError;
use crate::model::ResourceStatus;

/// Decides whether a managed family already has a resource too recent to
/// allow creating another.
#[derive(Clone)]
pub struct AgeGuard {
    directory: ResourceDirectory,
}

impl AgeGuard {
    /// Creates a guard over the given directory.
    #[must_use]
    pub fn new(directory: ResourceDirectory) -> Self {
        Self { directory }
    }

    /// Returns true when any family member is still `creating` (always too
    /// new, regardless of age) or was created within the last
    /// `min_age_hours`.
    ///
    /// An empty family is never too new; that case is logged since it
    /// usually means the managed name is misspelled or the family has been
    /// fully retired.
    pub async fn is_too_new(
        &self,
        managed_name: &str,
        min_age_hours: i64,
    ) -> Result<bool, SnapstageError> {
        self.is_too_new_at(managed_name, min_age_hours, Utc::now())
            .await
    }

    /// Clock-injected variant of [`Self::is_too_new`].
    pub async fn is_too_new_at(
        &self,
        managed_name: &str,
        min_age_hours: i64,
        now: DateTime<Utc>,
    ) -> Result<bool, SnapstageError> {
        let cutoff = now - Duration::hours(min_age_hours);
        let members = self.directory.find_managed_resources(managed_name).await?;

        if members.is_empty() {
            info!(managed_name, "no managed resources found under this name");
            return Ok(false);
        }

        for member in &members {
            if member.resource.status == ResourceStatus::Creating {
                return Ok(true);
            }
            if let Some(created_at) = member.resource.created_at {
                if created_at > cutoff {
                    return Ok(true);
                }
            }
        }

        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ManagedResource, Tag};
    use crate::provider::MockResourceApi;
    use chrono::TimeZone;
    use std::sync::Arc;

    fn family_api(resources: Vec<ManagedResource>) -> Arc<MockResourceApi> {
        let mut api = MockResourceApi::new();
        api.expect_list_resources()
            .returning(move || Ok(resources.clone()));
        api.expect_list_tags()
            .returning(|_| Ok(vec![Tag::new("snapstage:reporting:stage", "new")]));
        Arc::new(api)
    }

    fn guard(resources: Vec<ManagedResource>) -> AgeGuard {
        AgeGuard::new(ResourceDirectory::new(family_api(resources)))
    }

    fn resource(id: &str, status: ResourceStatus, created_at: Option<DateTime<Utc>>) -> ManagedResource {
        ManagedResource {
            instance_id: id.to_string(),
            cluster_id: format!("{id}-cluster"),
            created_at,
            status,
            endpoint: None,
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn creating_resource_is_always_too_new() {
        let guard = guard(vec![resource("db-a", ResourceStatus::Creating, None)]);
        assert!(guard.is_too_new_at("reporting", 1, t0()).await.unwrap());
        // even with a huge threshold satisfied by age, creating wins
        assert!(guard
            .is_too_new_at("reporting", 1, t0() + Duration::days(30))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn young_resource_is_too_new_until_threshold_passes() {
        let guard = guard(vec![resource(
            "db-a",
            ResourceStatus::Available,
            Some(t0()),
        )]);
        // 1.5h after creation with a 2h threshold: too new
        assert!(guard
            .is_too_new_at("reporting", 2, t0() + Duration::minutes(90))
            .await
            .unwrap());
        // 3h after creation: old enough
        assert!(!guard
            .is_too_new_at("reporting", 2, t0() + Duration::hours(3))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn any_young_member_trips_the_guard() {
        let guard = guard(vec![
            resource("db-old", ResourceStatus::Available, Some(t0() - Duration::days(7))),
            resource("db-new", ResourceStatus::Available, Some(t0())),
        ]);
        assert!(guard
            .is_too_new_at("reporting", 24, t0() + Duration::hours(1))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn empty_family_is_not_too_new() {
        let guard = guard(vec![]);
        assert!(!guard.is_too_new_at("reporting", 24, t0()).await.unwrap());
    }
}
