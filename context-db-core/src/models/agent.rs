use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

text_enum! {
    /// Self-assessed quality of a completed agent task.
    EffectivenessRating {
        Excellent => "excellent",
        Good => "good",
        Fair => "fair",
        Poor => "poor",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AgentInteraction {
    pub id: Uuid,
    pub agent_name: String,
    pub task_description: String,
    pub project_id: Option<Uuid>,
    pub session_id: Option<Uuid>,
    pub input_context: Option<Value>,
    pub output_summary: Option<String>,
    pub issues_encountered: Option<Value>,
    pub blockers: Option<Value>,
    pub task_completed: bool,
    pub effectiveness_rating: Option<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub duration_seconds: Option<i32>,
}

pub const AGENT_INTERACTION_COLUMNS: &str = "id, agent_name, task_description, project_id, \
     session_id, input_context, output_summary, issues_encountered, blockers, task_completed, \
     effectiveness_rating, started_at, completed_at, duration_seconds";

/// A new interaction in its "in progress" shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAgentInteraction {
    pub agent_name: String,
    pub task_description: String,
    pub project_id: Option<Uuid>,
    pub session_id: Option<Uuid>,
    pub input_context: Option<Value>,
    pub task_completed: bool,
    pub effectiveness_rating: Option<EffectivenessRating>,
}

impl NewAgentInteraction {
    pub fn new(agent_name: impl Into<String>, task_description: impl Into<String>) -> Self {
        Self {
            agent_name: agent_name.into(),
            task_description: task_description.into(),
            project_id: None,
            session_id: None,
            input_context: None,
            task_completed: false,
            effectiveness_rating: None,
        }
    }
}

/// Fields filled in when an interaction is marked complete.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentCompletion {
    pub output_summary: Option<String>,
    pub issues_encountered: Option<Value>,
    pub blockers: Option<Value>,
    pub effectiveness_rating: Option<EffectivenessRating>,
}

#[derive(Debug, Clone)]
pub struct AgentStatusQuery {
    pub agent_name: Option<String>,
    pub project_id: Option<Uuid>,
    pub limit: i64,
}

impl Default for AgentStatusQuery {
    fn default() -> Self {
        Self {
            agent_name: None,
            project_id: None,
            limit: 50,
        }
    }
}
