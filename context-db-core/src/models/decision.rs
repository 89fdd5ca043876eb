use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

text_enum! {
    DecisionStatus {
        Active => "active",
        Superseded => "superseded",
        Archived => "archived",
    }
}

text_enum! {
    ImpactLevel {
        Low => "low",
        Medium => "medium",
        High => "high",
        Critical => "critical",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Decision {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub decision_type: String,
    pub rationale: Option<String>,
    pub affected_components: Vec<String>,
    pub impact_level: Option<String>,
    pub created_by: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub const DECISION_COLUMNS: &str = "id, title, description, decision_type, rationale, \
     affected_components, impact_level, created_by, status, created_at, updated_at";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDecision {
    pub title: String,
    pub description: String,
    /// Free-form category, e.g. architecture, technical, operational.
    pub decision_type: String,
    pub rationale: String,
    pub affected_components: Vec<String>,
    pub impact_level: ImpactLevel,
    pub created_by: String,
    pub status: DecisionStatus,
}

#[derive(Debug, Clone)]
pub struct DecisionQuery {
    pub status: Option<DecisionStatus>,
    pub decision_type: Option<String>,
    pub limit: i64,
}

impl Default for DecisionQuery {
    fn default() -> Self {
        Self {
            status: None,
            decision_type: None,
            limit: 10,
        }
    }
}
