//! Row types for the context tables and the inputs used to create or filter them.

/// Closed text domains stored as plain `text` columns.
macro_rules! text_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = crate::error::ContextError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($text => Ok($name::$variant),)+
                    other => Err(crate::error::ContextError::InvalidValue(format!(
                        "unknown {} '{}'",
                        stringify!($name),
                        other
                    ))),
                }
            }
        }
    };
}

pub mod agent;
pub mod checkpoint;
pub mod decision;
pub mod issue;
pub mod search;

pub use agent::{
    AgentCompletion, AgentInteraction, AgentStatusQuery, EffectivenessRating, NewAgentInteraction,
};
pub use checkpoint::{Checkpoint, CheckpointQuery, NewCheckpoint};
pub use decision::{Decision, DecisionQuery, DecisionStatus, ImpactLevel, NewDecision};
pub use issue::{Issue, IssueQuery, NewIssue, Severity};
pub use search::{SearchHit, DEFAULT_SEARCH_LIMIT};

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_text_enum_round_trips_every_variant() {
        for status in DecisionStatus::ALL {
            assert_eq!(DecisionStatus::from_str(status.as_str()).unwrap(), *status);
        }
        for rating in EffectivenessRating::ALL {
            assert_eq!(rating.to_string().parse::<EffectivenessRating>().unwrap(), *rating);
        }
    }

    #[test]
    fn test_text_enum_parse_is_case_insensitive() {
        assert_eq!(Severity::from_str(" HIGH ").unwrap(), Severity::High);
        assert_eq!(ImpactLevel::from_str("Critical").unwrap(), ImpactLevel::Critical);
    }

    #[test]
    fn test_text_enum_rejects_unknown() {
        let err = DecisionStatus::from_str("deleted").unwrap_err();
        assert!(err.to_string().contains("DecisionStatus"));
        assert!(err.to_string().contains("deleted"));
    }

    #[test]
    fn test_text_enum_serializes_as_stored_text() {
        let json = serde_json::to_value(EffectivenessRating::Excellent).unwrap();
        assert_eq!(json, serde_json::json!("excellent"));
    }
}
