//! The profile summary attached to a presence entry.

use serde::{Deserialize, Serialize};

/// Public profile summary shown to other users in the presence directory
/// and in incoming-call notifications.
///
/// These fields are opaque pass-through data minted by the identity
/// service; the coordinator never validates or interprets them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSummary {
    /// Display name.
    pub name: String,
    /// Avatar URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Short bio.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    /// Industry label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    /// Skill tags.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skills: Vec<String>,
}

impl ProfileSummary {
    /// A profile carrying only a display name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image: None,
            bio: None,
            industry: None,
            skills: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_fields_omitted_from_json() {
        let json = serde_json::to_value(ProfileSummary::named("Aiko")).expect("serialize");
        assert_eq!(json, serde_json::json!({ "name": "Aiko" }));
    }

    #[test]
    fn test_deserializes_with_missing_optionals() {
        let profile: ProfileSummary =
            serde_json::from_str(r#"{"name":"Ben","skills":["rust"]}"#).expect("deserialize");
        assert_eq!(profile.name, "Ben");
        assert_eq!(profile.skills, vec!["rust".to_string()]);
        assert!(profile.bio.is_none());
    }
}
