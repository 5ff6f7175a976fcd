//! End-to-end workflow tests against the in-memory provider.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use pretty_assertions::assert_eq;

use super::approval::DenyApproval;
use super::*;
use crate::guard::AgeGuard;
use crate::model::{ManagedResource, ResourceStatus, Stage};
use crate::provider::RecordSet;
use crate::selector::select_in_stage;
use crate::tags::parse_user_tags;
use crate::testing::InMemoryProvider;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
}

fn available(id: &str, created_at: DateTime<Utc>) -> ManagedResource {
    ManagedResource {
        instance_id: id.to_string(),
        cluster_id: format!("{id}-cluster"),
        created_at: Some(created_at),
        status: ResourceStatus::Available,
        endpoint: Some(format!("{id}.db.internal")),
    }
}

fn context(provider: &Arc<InMemoryProvider>) -> WorkflowContext {
    WorkflowContext::new(provider.clone(), provider.clone(), Arc::new(AutoApproval))
}

fn new_request() -> NewClusterRequest {
    NewClusterRequest {
        managed_name: "reporting".to_string(),
        source_cluster_id: "prod-cluster".to_string(),
        subnet_group: "private-subnets".to_string(),
        engine: "aurora-postgresql".to_string(),
        instance_class: "db.r5.large".to_string(),
        availability_zone: None,
        parameter_group: None,
        security_group_ids: vec!["sg-1".to_string()],
        user_tags: vec![],
        min_age_hours: 20,
        interactive: false,
    }
}

fn promote_request() -> PromoteRequest {
    PromoteRequest {
        managed_name: "reporting".to_string(),
        hosted_zone_id: "Z123".to_string(),
        record_set_name: "reporting.db.example.com.".to_string(),
        ttl: 60,
        interactive: false,
    }
}

fn seed_record_set(provider: &InMemoryProvider) {
    provider.seed_record_set(
        "Z123",
        RecordSet {
            name: "reporting.db.example.com.".to_string(),
            record_type: "CNAME".to_string(),
            value: Some("db-old.db.internal".to_string()),
            ttl: 300,
        },
    );
}

#[tokio::test]
async fn new_restores_tags_and_is_then_throttled() {
    let provider = Arc::new(InMemoryProvider::new());
    provider.seed_latest_snapshot("prod-cluster", "snap-42");
    let ctx = context(&provider);

    let outcome = run_new(&ctx, &new_request()).await.unwrap();
    assert_eq!(outcome, WorkflowOutcome::Completed);

    let restored = provider.restored();
    assert_eq!(restored.len(), 1);
    assert_eq!(restored[0].snapshot_id, "snap-42");
    // management tag first in the creation tag set
    assert_eq!(restored[0].tags[0].key, "snapstage:reporting:stage");
    assert_eq!(restored[0].tags[0].value, "new");

    let created = provider.created_instances();
    assert_eq!(created.len(), 1);
    assert_eq!(provider.stage_of("reporting", &created[0].instance_id), Some("new".to_string()));

    // the freshly created (still `creating`) instance trips the age guard
    let outcome = run_new(&ctx, &new_request()).await.unwrap();
    assert_eq!(outcome, WorkflowOutcome::Throttled);
    assert_eq!(provider.restored().len(), 1);
}

#[tokio::test]
async fn new_without_snapshot_is_nothing_to_do() {
    let provider = Arc::new(InMemoryProvider::new());
    let ctx = context(&provider);

    let outcome = run_new(&ctx, &new_request()).await.unwrap();
    assert!(matches!(outcome, WorkflowOutcome::NothingToDo(_)));
    assert!(provider.restored().is_empty());
}

#[tokio::test]
async fn malformed_user_tag_aborts_before_any_provider_call() {
    let provider = Arc::new(InMemoryProvider::new());
    provider.seed_latest_snapshot("prod-cluster", "snap-42");
    let ctx = context(&provider);

    // The command boundary parses user tags before a workflow runs, so a
    // bad tag fails the invocation with the provider untouched.
    let raw = vec!["team=data".to_string(), "justakey".to_string()];
    match parse_user_tags(&raw) {
        Ok(tags) => {
            let mut req = new_request();
            req.user_tags = tags;
            run_new(&ctx, &req).await.unwrap();
        }
        Err(err) => assert_eq!(err.raw, "justakey"),
    }

    assert_eq!(provider.call_count(), 0);
    assert!(provider.restored().is_empty());
}

#[tokio::test]
async fn clone_creates_copy_on_write_clone_tagged_new() {
    let provider = Arc::new(InMemoryProvider::new());
    let ctx = context(&provider);
    let req = CloneClusterRequest {
        managed_name: "reporting".to_string(),
        source_cluster_id: "prod-cluster".to_string(),
        subnet_group: "private-subnets".to_string(),
        engine: "aurora-postgresql".to_string(),
        instance_class: "db.r5.large".to_string(),
        availability_zone: None,
        parameter_group: None,
        security_group_ids: vec![],
        user_tags: vec![],
        min_age_hours: 20,
        interactive: false,
    };

    let outcome = run_clone(&ctx, &req).await.unwrap();
    assert_eq!(outcome, WorkflowOutcome::Completed);

    let cloned = provider.cloned();
    assert_eq!(cloned.len(), 1);
    assert_eq!(cloned[0].source_cluster_id, "prod-cluster");
    assert_eq!(cloned[0].tags[0].value, "new");
}

#[tokio::test]
async fn modify_attaches_roles_and_advances_stage() {
    let provider = Arc::new(InMemoryProvider::new());
    let resource = available("db-a", t0());
    provider.seed_cluster_status(&resource.cluster_id, "available");
    provider.seed_resource(resource, "reporting", Stage::New);
    let ctx = context(&provider);

    let outcome = run_modify(
        &ctx,
        &ModifyRequest {
            managed_name: "reporting".to_string(),
            iam_role_arns: vec!["arn:role/reader".to_string()],
            interactive: false,
        },
    )
    .await
    .unwrap();

    assert_eq!(outcome, WorkflowOutcome::Completed);
    assert_eq!(
        provider.roles_added(),
        vec![("db-a-cluster".to_string(), "arn:role/reader".to_string())]
    );
    assert_eq!(provider.stage_of("reporting", "db-a"), Some("modified".to_string()));
}

#[tokio::test]
async fn modify_without_roles_still_advances_stage() {
    let provider = Arc::new(InMemoryProvider::new());
    let resource = available("db-a", t0());
    provider.seed_cluster_status(&resource.cluster_id, "available");
    provider.seed_resource(resource, "reporting", Stage::New);
    let ctx = context(&provider);

    let outcome = run_modify(
        &ctx,
        &ModifyRequest {
            managed_name: "reporting".to_string(),
            iam_role_arns: vec![],
            interactive: false,
        },
    )
    .await
    .unwrap();

    assert_eq!(outcome, WorkflowOutcome::Completed);
    assert!(provider.roles_added().is_empty());
    assert_eq!(provider.stage_of("reporting", "db-a"), Some("modified".to_string()));
}

#[tokio::test]
async fn modify_waits_for_cluster_availability() {
    let provider = Arc::new(InMemoryProvider::new());
    let resource = available("db-a", t0());
    provider.seed_cluster_status(&resource.cluster_id, "creating");
    provider.seed_resource(resource, "reporting", Stage::New);
    let ctx = context(&provider);

    let outcome = run_modify(
        &ctx,
        &ModifyRequest {
            managed_name: "reporting".to_string(),
            iam_role_arns: vec!["arn:role/reader".to_string()],
            interactive: false,
        },
    )
    .await
    .unwrap();

    assert!(matches!(outcome, WorkflowOutcome::NothingToDo(_)));
    assert!(provider.roles_added().is_empty());
    assert_eq!(provider.stage_of("reporting", "db-a"), Some("new".to_string()));
}

#[tokio::test]
async fn promote_repoints_dns_and_supersedes_previous() {
    let provider = Arc::new(InMemoryProvider::new());
    provider.seed_resource(available("db-old", t0()), "reporting", Stage::Promoted);
    provider.seed_resource(
        available("db-new", t0() + Duration::hours(1)),
        "reporting",
        Stage::New,
    );
    seed_record_set(&provider);
    let ctx = context(&provider);

    let outcome = run_promote(&ctx, &promote_request()).await.unwrap();
    assert_eq!(outcome, WorkflowOutcome::Completed);

    let upserts = provider.upserted_records();
    assert_eq!(upserts.len(), 1);
    assert_eq!(upserts[0].1.value.as_deref(), Some("db-new.db.internal"));
    assert_eq!(upserts[0].1.ttl, 60);

    assert_eq!(provider.stage_of("reporting", "db-new"), Some("promoted".to_string()));
    assert_eq!(provider.stage_of("reporting", "db-old"), Some("retired".to_string()));

    // exactly one promoted member afterward
    let members = ctx.directory().find_managed_resources("reporting").await.unwrap();
    let promoted: Vec<_> = members
        .iter()
        .filter(|m| m.stage == Some(Stage::Promoted))
        .collect();
    assert_eq!(promoted.len(), 1);
    assert_eq!(promoted[0].resource.instance_id, "db-new");
}

#[tokio::test]
async fn promote_prefers_modified_over_new() {
    let provider = Arc::new(InMemoryProvider::new());
    provider.seed_resource(
        available("db-newer", t0() + Duration::hours(2)),
        "reporting",
        Stage::New,
    );
    provider.seed_resource(available("db-modified", t0()), "reporting", Stage::Modified);
    seed_record_set(&provider);
    let ctx = context(&provider);

    let outcome = run_promote(&ctx, &promote_request()).await.unwrap();
    assert_eq!(outcome, WorkflowOutcome::Completed);
    assert_eq!(
        provider.stage_of("reporting", "db-modified"),
        Some("promoted".to_string())
    );
    assert_eq!(provider.stage_of("reporting", "db-newer"), Some("new".to_string()));
}

#[tokio::test]
async fn promote_skips_unready_candidate() {
    let provider = Arc::new(InMemoryProvider::new());
    let mut creating = available("db-a", t0());
    creating.status = ResourceStatus::Creating;
    creating.endpoint = None;
    creating.created_at = None;
    provider.seed_resource(creating, "reporting", Stage::New);
    seed_record_set(&provider);
    let ctx = context(&provider);

    let outcome = run_promote(&ctx, &promote_request()).await.unwrap();
    assert!(matches!(outcome, WorkflowOutcome::NothingToDo(_)));
    assert!(provider.upserted_records().is_empty());
    assert_eq!(provider.stage_of("reporting", "db-a"), Some("new".to_string()));
}

#[tokio::test]
async fn promote_requires_an_existing_record_set() {
    let provider = Arc::new(InMemoryProvider::new());
    provider.seed_resource(available("db-a", t0()), "reporting", Stage::New);
    let ctx = context(&provider);

    let outcome = run_promote(&ctx, &promote_request()).await.unwrap();
    assert!(matches!(outcome, WorkflowOutcome::NothingToDo(_)));
    assert_eq!(provider.stage_of("reporting", "db-a"), Some("new".to_string()));
}

#[tokio::test]
async fn retire_deletes_instance_before_cluster() {
    let provider = Arc::new(InMemoryProvider::new());
    provider.seed_resource(available("db-old", t0()), "reporting", Stage::Retired);
    let ctx = context(&provider);

    let outcome = run_retire(
        &ctx,
        &RetireRequest {
            managed_name: "reporting".to_string(),
            interactive: false,
        },
    )
    .await
    .unwrap();

    assert_eq!(outcome, WorkflowOutcome::Completed);
    assert_eq!(provider.deleted_instances(), vec!["db-old".to_string()]);
    assert_eq!(provider.deleted_clusters(), vec!["db-old-cluster".to_string()]);

    // the resource has left the family
    let members = ctx.directory().find_managed_resources("reporting").await.unwrap();
    assert!(members.is_empty());
}

#[tokio::test]
async fn retire_with_nothing_retired_is_nothing_to_do() {
    let provider = Arc::new(InMemoryProvider::new());
    provider.seed_resource(available("db-a", t0()), "reporting", Stage::Promoted);
    let ctx = context(&provider);

    let outcome = run_retire(
        &ctx,
        &RetireRequest {
            managed_name: "reporting".to_string(),
            interactive: false,
        },
    )
    .await
    .unwrap();

    assert!(matches!(outcome, WorkflowOutcome::NothingToDo(_)));
    assert!(provider.deleted_instances().is_empty());
}

#[tokio::test]
async fn declined_confirmation_prevents_all_mutations() {
    let provider = Arc::new(InMemoryProvider::new());
    provider.seed_resource(available("db-old", t0()), "reporting", Stage::Retired);
    let ctx = WorkflowContext::new(
        provider.clone(),
        provider.clone(),
        Arc::new(DenyApproval),
    );

    let outcome = run_retire(
        &ctx,
        &RetireRequest {
            managed_name: "reporting".to_string(),
            interactive: true,
        },
    )
    .await
    .unwrap();

    assert_eq!(outcome, WorkflowOutcome::Declined);
    assert!(provider.deleted_instances().is_empty());
    assert!(provider.deleted_clusters().is_empty());
}

#[tokio::test]
async fn directory_failure_aborts_a_workflow() {
    let provider = Arc::new(InMemoryProvider::new());
    provider.seed_resource(available("db-a", t0()), "reporting", Stage::Retired);
    provider.fail_tags_for("db-a");
    let ctx = context(&provider);

    let err = run_retire(
        &ctx,
        &RetireRequest {
            managed_name: "reporting".to_string(),
            interactive: false,
        },
    )
    .await
    .unwrap_err();

    assert!(matches!(err, crate::errors::SnapstageError::ProviderQuery(_)));
    assert!(provider.deleted_instances().is_empty());
}

/// The end-to-end scenario from the selection and age-guard contracts:
/// two `new` members X (T0) and Y (T0+1h); Y is the selection, and the
/// family is too new at T0+1.5h with a 2h threshold but not at T0+3h.
#[tokio::test]
async fn selection_and_age_guard_agree_on_the_younger_member() {
    let provider = Arc::new(InMemoryProvider::new());
    provider.seed_resource(available("db-x", t0()), "reporting", Stage::New);
    provider.seed_resource(
        available("db-y", t0() + Duration::hours(1)),
        "reporting",
        Stage::New,
    );
    let ctx = context(&provider);

    let members = ctx.directory().find_managed_resources("reporting").await.unwrap();
    let chosen = select_in_stage(&members, Stage::New).unwrap();
    assert_eq!(chosen.instance_id, "db-y");

    let guard = AgeGuard::new(ctx.directory());
    assert!(guard
        .is_too_new_at("reporting", 2, t0() + Duration::minutes(90))
        .await
        .unwrap());
    assert!(!guard
        .is_too_new_at("reporting", 2, t0() + Duration::hours(3))
        .await
        .unwrap());
}
