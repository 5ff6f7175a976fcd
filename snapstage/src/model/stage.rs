//! Lifecycle stages and their stable wire strings.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The lifecycle position of a resource within its managed family.
///
/// The string forms `new`, `modified`, `promoted`, and `retired` are a
/// persistence contract — they are written verbatim as tag values and read
/// back by out-of-band tooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Freshly restored or cloned; both `new` and `clone` land here.
    New,
    /// Post-restore modifications applied.
    Modified,
    /// Serving traffic behind the DNS record.
    Promoted,
    /// Superseded; eligible for deletion by the retire workflow.
    Retired,
}

impl Stage {
    /// Returns the stable tag-value string for this stage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Modified => "modified",
            Self::Promoted => "promoted",
            Self::Retired => "retired",
        }
    }

    /// Parses a tag value into a stage, or `None` for unrecognized values.
    #[must_use]
    pub fn from_tag_value(value: &str) -> Option<Self> {
        match value {
            "new" => Some(Self::New),
            "modified" => Some(Self::Modified),
            "promoted" => Some(Self::Promoted),
            "retired" => Some(Self::Retired),
            _ => None,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_strings_round_trip() {
        for stage in [Stage::New, Stage::Modified, Stage::Promoted, Stage::Retired] {
            assert_eq!(Stage::from_tag_value(stage.as_str()), Some(stage));
        }
    }

    #[test]
    fn unknown_value_does_not_parse() {
        assert_eq!(Stage::from_tag_value("archived"), None);
        assert_eq!(Stage::from_tag_value(""), None);
        assert_eq!(Stage::from_tag_value("New"), None);
    }

    #[test]
    fn serde_uses_wire_strings() {
        let json = serde_json::to_string(&Stage::Promoted).unwrap();
        assert_eq!(json, "\"promoted\"");
        let back: Stage = serde_json::from_str("\"retired\"").unwrap();
        assert_eq!(back, Stage::Retired);
    }
}
