//! Core data model: resources, stages, and tags.

mod resource;
mod stage;
mod tag;

pub use resource::{ManagedResource, ResourceStatus};
pub use stage::Stage;
pub use tag::Tag;

use serde::{Deserialize, Serialize};

/// A resource belonging to a managed-name family, paired with the stage its
/// tag currently records.
///
/// `stage` is `None` when the tag value is not one of the four known stage
/// identifiers (out-of-band edits can produce this). Such a member still
/// counts toward the family for age-guard purposes but is never selectable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyMember {
    /// The provider-side resource.
    pub resource: ManagedResource,
    /// The parsed stage, if the tag value was recognized.
    pub stage: Option<Stage>,
}

impl FamilyMember {
    /// Creates a new family member.
    #[must_use]
    pub fn new(resource: ManagedResource, stage: Option<Stage>) -> Self {
        Self { resource, stage }
    }
}
