use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

text_enum! {
    Severity {
        Low => "low",
        Medium => "medium",
        High => "high",
        Critical => "critical",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Issue {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub issue_type: String,
    pub severity: String,
    pub created_by: String,
    pub component_affected: Option<String>,
    /// Resolution status; the store defaults new rows to `open`.
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub const ISSUE_COLUMNS: &str = "id, title, description, issue_type, severity, created_by, \
     component_affected, status, created_at, updated_at";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewIssue {
    pub title: String,
    pub description: String,
    /// Free-form category, e.g. bug, performance, security.
    pub issue_type: String,
    pub severity: Severity,
    pub created_by: String,
    pub component_affected: Option<String>,
}

#[derive(Debug, Clone)]
pub struct IssueQuery {
    pub status: Option<String>,
    pub severity: Option<Severity>,
    pub limit: i64,
}

impl Default for IssueQuery {
    fn default() -> Self {
        Self {
            status: None,
            severity: None,
            limit: 10,
        }
    }
}
