use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_SEARCH_LIMIT: i64 = 20;

/// One full-text match from any of the context tables.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SearchHit {
    /// `decision`, `issue`, `checkpoint` or `agent_interaction`
    pub source: String,
    pub id: Uuid,
    pub title: String,
    pub excerpt: Option<String>,
    pub rank: f32,
    pub created_at: DateTime<Utc>,
}
