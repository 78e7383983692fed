//! Flag kind enums for the moderation subsystem.

use crate::error::CoreError;

/// Reasons an annotation can be flagged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationFlagKind {
    Spam,
    Offensive,
    Incoherent,
    Misinformation,
}

const VALID_ANNOTATION_FLAGS: &[&str] = &["spam", "offensive", "incoherent", "misinformation"];

impl AnnotationFlagKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Spam => "spam",
            Self::Offensive => "offensive",
            Self::Incoherent => "incoherent",
            Self::Misinformation => "misinformation",
        }
    }

    pub fn from_str(s: &str) -> Result<Self, CoreError> {
        match s {
            "spam" => Ok(Self::Spam),
            "offensive" => Ok(Self::Offensive),
            "incoherent" => Ok(Self::Incoherent),
            "misinformation" => Ok(Self::Misinformation),
            _ => Err(CoreError::Validation(format!(
                "Invalid annotation flag '{s}'. Must be one of: {}",
                VALID_ANNOTATION_FLAGS.join(", ")
            ))),
        }
    }
}

/// Reasons a user can be flagged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UserFlagKind {
    Spam,
    Abusive,
    Impersonation,
}

const VALID_USER_FLAGS: &[&str] = &["spam", "abusive", "impersonation"];

impl UserFlagKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Spam => "spam",
            Self::Abusive => "abusive",
            Self::Impersonation => "impersonation",
        }
    }

    pub fn from_str(s: &str) -> Result<Self, CoreError> {
        match s {
            "spam" => Ok(Self::Spam),
            "abusive" => Ok(Self::Abusive),
            "impersonation" => Ok(Self::Impersonation),
            _ => Err(CoreError::Validation(format!(
                "Invalid user flag '{s}'. Must be one of: {}",
                VALID_USER_FLAGS.join(", ")
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn annotation_flag_round_trip() {
        for s in VALID_ANNOTATION_FLAGS {
            assert_eq!(AnnotationFlagKind::from_str(s).unwrap().as_str(), *s);
        }
    }

    #[test]
    fn user_flag_round_trip() {
        for s in VALID_USER_FLAGS {
            assert_eq!(UserFlagKind::from_str(s).unwrap().as_str(), *s);
        }
    }

    #[test]
    fn invalid_flags_rejected() {
        assert!(AnnotationFlagKind::from_str("boring").is_err());
        assert!(UserFlagKind::from_str("boring").is_err());
    }
}
