//! Stable identifiers shared across commands.
//!
//! The stage-tag key format `snapstage:<managed_name>:stage` and the stage
//! values in [`crate::model::Stage`] are a persistence contract: out-of-band
//! tooling reads these tags directly, so they must not change.

/// Namespace prefix for every management tag this tool writes.
pub const MANAGEMENT_TAG_NAMESPACE: &str = "snapstage";

/// Suffix of the stage-tag key.
pub const STAGE_TAG_SUFFIX: &str = "stage";

/// Delimiter between the namespace, managed name, and suffix in a tag key.
///
/// Managed names must not contain this character or two distinct names
/// could derive the same key; [`crate::tags::validate_managed_name`] is the
/// boundary check.
pub const TAG_KEY_DELIMITER: char = ':';

/// Command name for the `new` workflow (restore from snapshot).
pub const NEW_COMMAND: &str = "new";

/// Command name for the `clone` workflow (copy-on-write clone).
pub const CLONE_COMMAND: &str = "clone";

/// Command name for the `modify` workflow.
pub const MODIFY_COMMAND: &str = "modify";

/// Command name for the `promote` workflow.
pub const PROMOTE_COMMAND: &str = "promote";

/// Command name for the `retire` workflow.
pub const RETIRE_COMMAND: &str = "retire";
