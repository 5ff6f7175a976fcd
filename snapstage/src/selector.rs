//! Stage selector: deterministic choice of the authoritative resource in a
//! stage.
//!
//! Multiple resources can legitimately carry the same stage at once (e.g.,
//! during the promotion supersession window), so selection must be a pure
//! function of the set, never of provider listing order.

use std::cmp::Ordering;

use crate::model::{FamilyMember, ManagedResource, Stage};

/// Picks the single authoritative resource in `desired` stage, or `None`
/// if the stage is empty.
///
/// Tie-break: latest creation timestamp wins. A resource with no creation
/// timestamp yet (still being created) is treated as having the earliest
/// possible timestamp — it loses to any resource that has finished
/// creating, since a not-yet-created resource is not a reliable pick for
/// promotion or retirement (the age guard, by contrast, always counts it).
/// Exact timestamp ties break on the greater instance identifier.
#[must_use]
pub fn select_in_stage(members: &[FamilyMember], desired: Stage) -> Option<&ManagedResource> {
    members
        .iter()
        .filter(|m| m.stage == Some(desired))
        .map(|m| &m.resource)
        .max_by(|a, b| creation_order(a, b))
}

/// Total order on resources by creation time, then instance id.
///
/// `Option<DateTime>` already orders `None` before any `Some`, which is
/// exactly the not-yet-created policy.
fn creation_order(a: &ManagedResource, b: &ManagedResource) -> Ordering {
    a.created_at
        .cmp(&b.created_at)
        .then_with(|| a.instance_id.cmp(&b.instance_id))
}
