//! Decision, issue and search queries shared by every client of the context database.

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::filter::FilterQuery;
use crate::models::decision::DECISION_COLUMNS;
use crate::models::issue::ISSUE_COLUMNS;
use crate::models::{
    Decision, DecisionQuery, DecisionStatus, Issue, IssueQuery, NewDecision, NewIssue, SearchHit,
};

/// Ranked full-text match across decisions, issues, checkpoints and agent interactions.
const SEARCH_ALL_SQL: &str = r#"
    SELECT source, id, title, excerpt, rank, created_at FROM (
        SELECT 'decision' AS source, id, title, description AS excerpt, created_at,
               ts_rank(
                   to_tsvector('english',
                       title || ' ' || description || ' ' || coalesce(rationale, '')),
                   plainto_tsquery('english', $1)) AS rank
        FROM decisions
        WHERE to_tsvector('english',
                  title || ' ' || description || ' ' || coalesce(rationale, ''))
              @@ plainto_tsquery('english', $1)
        UNION ALL
        SELECT 'issue', id, title, description, created_at,
               ts_rank(
                   to_tsvector('english',
                       title || ' ' || description || ' ' || coalesce(component_affected, '')),
                   plainto_tsquery('english', $1))
        FROM issues
        WHERE to_tsvector('english',
                  title || ' ' || description || ' ' || coalesce(component_affected, ''))
              @@ plainto_tsquery('english', $1)
        UNION ALL
        SELECT 'checkpoint', id, session_name, work_completed, started_at,
               ts_rank(
                   to_tsvector('english',
                       session_name || ' ' || coalesce(focus_area, '') || ' '
                           || coalesce(work_completed, '')),
                   plainto_tsquery('english', $1))
        FROM sessions
        WHERE to_tsvector('english',
                  session_name || ' ' || coalesce(focus_area, '') || ' '
                      || coalesce(work_completed, ''))
              @@ plainto_tsquery('english', $1)
        UNION ALL
        SELECT 'agent_interaction', id, agent_name, task_description, started_at,
               ts_rank(
                   to_tsvector('english', task_description || ' ' || coalesce(output_summary, '')),
                   plainto_tsquery('english', $1))
        FROM agent_interactions
        WHERE to_tsvector('english', task_description || ' ' || coalesce(output_summary, ''))
              @@ plainto_tsquery('english', $1)
    ) hits
    ORDER BY rank DESC, created_at DESC
    LIMIT $2
"#;

/// Higher-level CRUD over the decision and issue tables plus cross-table search.
#[derive(Debug, Clone)]
pub struct QueryHelper {
    pool: PgPool,
}

impl QueryHelper {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    // ========================================================================
    // DECISIONS
    // ========================================================================

    pub async fn create_decision(&self, decision: &NewDecision) -> Result<Decision> {
        let sql = format!(
            r#"
            INSERT INTO decisions (
                title, description, decision_type, rationale,
                affected_components, impact_level, created_by, status
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {DECISION_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, Decision>(&sql)
            .bind(&decision.title)
            .bind(&decision.description)
            .bind(&decision.decision_type)
            .bind(&decision.rationale)
            .bind(&decision.affected_components)
            .bind(decision.impact_level.as_str())
            .bind(&decision.created_by)
            .bind(decision.status.as_str())
            .fetch_one(&self.pool)
            .await?;

        tracing::info!(id = %row.id, decision_type = %row.decision_type, "Decision created");
        Ok(row)
    }

    pub async fn get_decision(&self, id: Uuid) -> Result<Option<Decision>> {
        let sql = format!("SELECT {DECISION_COLUMNS} FROM decisions WHERE id = $1");
        let row = sqlx::query_as::<_, Decision>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn query_decisions(&self, query: &DecisionQuery) -> Result<Vec<Decision>> {
        let base = format!("SELECT {DECISION_COLUMNS} FROM decisions");
        let mut builder = FilterQuery::new(&base)
            .eq("status", query.status.map(|s| s.as_str()))
            .eq("decision_type", query.decision_type.clone())
            .newest_first("created_at", query.limit);

        tracing::debug!(sql = builder.sql(), "Querying decisions");
        let rows = builder
            .build_query_as::<Decision>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Returns `false` when no decision has the given id.
    pub async fn update_decision_status(&self, id: Uuid, status: DecisionStatus) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE decisions SET status = $1, updated_at = now() WHERE id = $2",
        )
        .bind(status.as_str())
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    // ========================================================================
    // ISSUES
    // ========================================================================

    pub async fn create_issue(&self, issue: &NewIssue) -> Result<Issue> {
        let sql = format!(
            r#"
            INSERT INTO issues (
                title, description, issue_type, severity, created_by, component_affected
            ) VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {ISSUE_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, Issue>(&sql)
            .bind(&issue.title)
            .bind(&issue.description)
            .bind(&issue.issue_type)
            .bind(issue.severity.as_str())
            .bind(&issue.created_by)
            .bind(&issue.component_affected)
            .fetch_one(&self.pool)
            .await?;

        tracing::info!(id = %row.id, severity = %row.severity, "Issue created");
        Ok(row)
    }

    pub async fn get_issue(&self, id: Uuid) -> Result<Option<Issue>> {
        let sql = format!("SELECT {ISSUE_COLUMNS} FROM issues WHERE id = $1");
        let row = sqlx::query_as::<_, Issue>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn query_issues(&self, query: &IssueQuery) -> Result<Vec<Issue>> {
        let base = format!("SELECT {ISSUE_COLUMNS} FROM issues");
        let mut builder = FilterQuery::new(&base)
            .eq("status", query.status.clone())
            .eq("severity", query.severity.map(|s| s.as_str()))
            .newest_first("created_at", query.limit);

        tracing::debug!(sql = builder.sql(), "Querying issues");
        let rows = builder
            .build_query_as::<Issue>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Returns `false` when no issue has the given id.
    pub async fn update_issue_status(&self, id: Uuid, status: &str) -> Result<bool> {
        let result = sqlx::query("UPDATE issues SET status = $1, updated_at = now() WHERE id = $2")
            .bind(status)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // ========================================================================
    // SEARCH
    // ========================================================================

    /// Blank queries return no hits without touching the database.
    pub async fn search_all(&self, query_text: &str, limit: i64) -> Result<Vec<SearchHit>> {
        let query_text = query_text.trim();
        if query_text.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, SearchHit>(SEARCH_ALL_SQL)
            .bind(query_text)
            .bind(limit.max(0))
            .fetch_all(&self.pool)
            .await?;

        tracing::debug!(query = query_text, hits = rows.len(), "Search complete");
        Ok(rows)
    }
}
