//! Key/value tag pairs.

use serde::{Deserialize, Serialize};

/// A key/value pair attached to a provider resource.
///
/// The provider's tag model guarantees per-key uniqueness on a single
/// resource; writes are add-or-overwrite at the key level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Tag key.
    pub key: String,
    /// Tag value.
    pub value: String,
}

impl Tag {
    /// Creates a new tag.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}
