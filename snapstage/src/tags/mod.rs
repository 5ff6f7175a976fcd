//! Tag codec: stage-tag key derivation, user-tag parsing, and tag-set
//! construction.
//!
//! The stage-tag key is `snapstage:<managed_name>:stage`. Key derivation is
//! pure string concatenation with no escaping, so a managed name containing
//! the delimiter could collide with another name's key. Names are validated
//! at the command boundary with [`validate_managed_name`]; the derivation
//! itself stays pure so the collision case is directly testable.

use std::sync::OnceLock;

use regex::Regex;

use crate::constants::{MANAGEMENT_TAG_NAMESPACE, STAGE_TAG_SUFFIX, TAG_KEY_DELIMITER};
use crate::errors::MalformedTagError;
use crate::model::{Stage, Tag};

/// Derives the stage-tag key for a managed name.
///
/// Deterministic and collision-resistant for distinct names drawn from the
/// validated character set.
#[must_use]
pub fn stage_tag_key(managed_name: &str) -> String {
    format!(
        "{MANAGEMENT_TAG_NAMESPACE}{TAG_KEY_DELIMITER}{managed_name}{TAG_KEY_DELIMITER}{STAGE_TAG_SUFFIX}"
    )
}

/// Returns true when the managed name is safe to embed in a tag key.
///
/// Lowercase alphanumerics and interior hyphens only — in particular the
/// key delimiter is excluded, which is what makes [`stage_tag_key`]
/// collision-free across names.
#[must_use]
pub fn validate_managed_name(name: &str) -> bool {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| {
        #[allow(clippy::expect_used)]
        Regex::new(r"^[a-z0-9][a-z0-9-]*$").expect("managed-name pattern is valid")
    });
    pattern.is_match(name)
}

/// Parses an operator-supplied `key=value` string.
///
/// Splits on the **first** `=` only, so values may themselves contain `=`.
/// A missing separator or empty key is a [`MalformedTagError`], reported
/// before any provider call is made.
pub fn parse_user_tag(raw: &str) -> Result<Tag, MalformedTagError> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok(Tag::new(key, value)),
        _ => Err(MalformedTagError::new(raw)),
    }
}

/// Parses a batch of operator-supplied tag strings, failing on the first
/// malformed entry.
pub fn parse_user_tags(raw_tags: &[String]) -> Result<Vec<Tag>, MalformedTagError> {
    raw_tags.iter().map(|raw| parse_user_tag(raw)).collect()
}

/// Builds the full tag set attached to a resource at creation.
///
/// The stage tag always comes first so it is trivially locatable even if
/// the set is later rewritten, followed by user tags in input order.
#[must_use]
pub fn build_tag_set(managed_name: &str, stage: Stage, user_tags: &[Tag]) -> Vec<Tag> {
    let mut tags = Vec::with_capacity(1 + user_tags.len());
    tags.push(Tag::new(stage_tag_key(managed_name), stage.as_str()));
    tags.extend(user_tags.iter().cloned());
    tags
}
