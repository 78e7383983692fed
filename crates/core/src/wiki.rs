//! Wiki subject registry and wiki chain constants.
//!
//! Every describable non-text entity (writer, text, edition, tag) owns
//! exactly one wiki. The subject kind is an explicit enum rather than a
//! reflective class registry so the set is statically known.

use crate::error::CoreError;

/// Body given to a wiki created without a description.
pub const DEFAULT_WIKI_BODY: &str = "This wiki is currently blank.";

/// Reason string recorded on the synthetic first revision of every chain.
pub const INITIAL_VERSION_REASON: &str = "Initial version.";

/// The kind of entity a wiki describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WikiSubject {
    Writer,
    Text,
    Edition,
    Tag,
}

const VALID_SUBJECTS: &[&str] = &["writer", "text", "edition", "tag"];

impl WikiSubject {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Writer => "writer",
            Self::Text => "text",
            Self::Edition => "edition",
            Self::Tag => "tag",
        }
    }

    pub fn from_str(s: &str) -> Result<Self, CoreError> {
        match s {
            "writer" => Ok(Self::Writer),
            "text" => Ok(Self::Text),
            "edition" => Ok(Self::Edition),
            "tag" => Ok(Self::Tag),
            _ => Err(CoreError::Validation(format!(
                "Invalid wiki subject '{s}'. Must be one of: {}",
                VALID_SUBJECTS.join(", ")
            ))),
        }
    }
}
