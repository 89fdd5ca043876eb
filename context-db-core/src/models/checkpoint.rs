use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

/// Checkpoints are stored as rows of the `sessions` table.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Checkpoint {
    pub id: Uuid,
    pub session_name: String,
    pub project_id: Option<Uuid>,
    pub focus_area: Option<String>,
    pub work_completed: Option<String>,
    pub blockers_encountered: Option<Value>,
    pub context_snapshot: Option<Value>,
    pub created_by: Option<String>,
    pub status: Option<String>,
    pub started_at: DateTime<Utc>,
}

pub const CHECKPOINT_COLUMNS: &str = "id, session_name, project_id, focus_area, work_completed, \
     blockers_encountered, context_snapshot, created_by, status, started_at";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCheckpoint {
    pub project: Uuid,
    pub milestone: String,
    pub accomplishments: Vec<String>,
    pub decisions: Vec<Value>,
    pub blockers: Vec<Value>,
    pub next_steps: Vec<String>,
    pub created_by: String,
    pub metadata: Option<Value>,
}

impl NewCheckpoint {
    pub fn session_name(&self) -> String {
        format!("Checkpoint: {}", self.milestone)
    }

    pub fn work_completed(&self) -> String {
        self.accomplishments.join("\n")
    }

    pub fn blockers_blob(&self) -> Value {
        json!({ "blockers": self.blockers })
    }

    /// Full checkpoint payload kept in `sessions.context_snapshot`.
    pub fn snapshot(&self) -> Value {
        json!({
            "milestone": self.milestone,
            "accomplishments": self.accomplishments,
            "decisions": self.decisions,
            "blockers": self.blockers,
            "next_steps": self.next_steps,
            "metadata": self.metadata.clone().unwrap_or_else(|| json!({})),
        })
    }
}

#[derive(Debug, Clone)]
pub struct CheckpointQuery {
    pub project: Option<Uuid>,
    pub limit: i64,
}

impl Default for CheckpointQuery {
    fn default() -> Self {
        Self {
            project: None,
            limit: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> NewCheckpoint {
        NewCheckpoint {
            project: Uuid::new_v4(),
            milestone: "Schema v2".to_string(),
            accomplishments: vec!["migrated sessions".to_string(), "added indexes".to_string()],
            decisions: vec![json!({"title": "use jsonb"})],
            blockers: vec![json!({"what": "slow CI"})],
            next_steps: vec!["ship".to_string()],
            created_by: "rias".to_string(),
            metadata: None,
        }
    }

    #[test]
    fn test_session_name_and_work_completed() {
        let checkpoint = sample();
        assert_eq!(checkpoint.session_name(), "Checkpoint: Schema v2");
        assert_eq!(checkpoint.work_completed(), "migrated sessions\nadded indexes");
    }

    #[test]
    fn test_snapshot_defaults_metadata_to_empty_object() {
        let snapshot = sample().snapshot();
        assert_eq!(snapshot["milestone"], "Schema v2");
        assert_eq!(snapshot["accomplishments"][1], "added indexes");
        assert_eq!(snapshot["decisions"][0]["title"], "use jsonb");
        assert_eq!(snapshot["next_steps"], json!(["ship"]));
        assert_eq!(snapshot["metadata"], json!({}));
    }

    #[test]
    fn test_snapshot_keeps_metadata() {
        let mut checkpoint = sample();
        checkpoint.metadata = Some(json!({"sprint": 7}));
        assert_eq!(checkpoint.snapshot()["metadata"]["sprint"], 7);
    }

    #[test]
    fn test_blockers_blob_wraps_list() {
        let blob = sample().blockers_blob();
        assert_eq!(blob, json!({"blockers": [{"what": "slow CI"}]}));
    }

    #[test]
    fn test_query_default_limit() {
        let query = CheckpointQuery::default();
        assert!(query.project.is_none());
        assert_eq!(query.limit, 10);
    }
}
