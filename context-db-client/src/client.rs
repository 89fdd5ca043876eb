use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::PgPool;
use tokio::sync::Mutex;
use uuid::Uuid;

use context_db_core::config::DatabaseConfig;
use context_db_core::db;
use context_db_core::filter::FilterQuery;
use context_db_core::models::agent::AGENT_INTERACTION_COLUMNS;
use context_db_core::models::checkpoint::CHECKPOINT_COLUMNS;
use context_db_core::models::{
    AgentCompletion, AgentInteraction, AgentStatusQuery, Checkpoint, CheckpointQuery, Decision,
    DecisionQuery, DecisionStatus, Issue, IssueQuery, NewAgentInteraction, NewCheckpoint,
    NewDecision, NewIssue, SearchHit,
};
use context_db_core::{ContextError, QueryHelper, Result};

/// Pool and helper pair created on first use.
#[derive(Debug, Clone)]
struct Resources {
    pool: PgPool,
    helper: QueryHelper,
    initialized_at: DateTime<Utc>,
}

/// Client for the context database.
///
/// Every operation initializes the pool on demand and performs a single round
/// trip. Store errors are returned unchanged inside [`ContextError::Database`].
///
/// [`ContextError::Database`]: context_db_core::ContextError::Database
#[derive(Debug)]
pub struct ContextClient {
    config: DatabaseConfig,
    state: Mutex<Option<Resources>>,
    shut_down: AtomicBool,
}

impl ContextClient {
    pub fn new(config: DatabaseConfig) -> Self {
        Self {
            config,
            state: Mutex::new(None),
            shut_down: AtomicBool::new(false),
        }
    }

    // ========================================================================
    // LIFECYCLE
    // ========================================================================

    async fn resources(&self) -> Result<Resources> {
        let mut state = self.state.lock().await;
        if self.shut_down.load(Ordering::SeqCst) {
            return Err(ContextError::Other("client closed".to_string()));
        }
        if let Some(resources) = state.as_ref() {
            return Ok(resources.clone());
        }

        let pool = db::create_pool(&self.config).await?;
        let resources = Resources {
            helper: QueryHelper::new(pool.clone()),
            pool,
            initialized_at: Utc::now(),
        };
        tracing::info!(
            max_connections = self.config.max_connections,
            "Context DB pool initialized"
        );
        *state = Some(resources.clone());
        Ok(resources)
    }

    /// Create the pool if it does not exist yet. Concurrent callers wait on the
    /// same lock, so only one pool is ever created per initialization.
    pub async fn initialize(&self) -> Result<()> {
        self.resources().await.map(|_| ())
    }

    /// Close the pool. Safe to call when already closed; the next operation
    /// initializes a fresh pool.
    pub async fn close(&self) {
        let resources = self.state.lock().await.take();
        if let Some(resources) = resources {
            resources.pool.close().await;
            tracing::info!("Context DB pool closed");
        }
    }

    /// Close the pool for good. Every later operation fails with
    /// `ContextError::Other("client closed")` instead of opening a new pool.
    pub async fn shutdown(&self) {
        let resources = {
            let mut state = self.state.lock().await;
            self.shut_down.store(true, Ordering::SeqCst);
            state.take()
        };
        if let Some(resources) = resources {
            resources.pool.close().await;
        }
        tracing::info!("Context DB client shut down");
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::SeqCst)
    }

    pub async fn is_initialized(&self) -> bool {
        self.state.lock().await.is_some()
    }

    pub async fn initialized_at(&self) -> Option<DateTime<Utc>> {
        self.state.lock().await.as_ref().map(|r| r.initialized_at)
    }

    /// The underlying pool, initializing it if needed.
    pub async fn pool(&self) -> Result<PgPool> {
        Ok(self.resources().await?.pool)
    }

    pub async fn health_check(&self) -> Result<String> {
        let pool = self.pool().await?;
        Ok(db::health_check(&pool).await?)
    }

    // ========================================================================
    // CHECKPOINTS
    // ========================================================================

    pub async fn create_checkpoint(&self, checkpoint: &NewCheckpoint) -> Result<Uuid> {
        let pool = self.pool().await?;

        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO sessions (
                session_name, project_id, focus_area,
                work_completed, blockers_encountered, context_snapshot,
                created_by, status
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(checkpoint.session_name())
        .bind(checkpoint.project)
        .bind(&checkpoint.milestone)
        .bind(checkpoint.work_completed())
        .bind(checkpoint.blockers_blob())
        .bind(checkpoint.snapshot())
        .bind(&checkpoint.created_by)
        .bind("active")
        .fetch_one(&pool)
        .await?;

        tracing::info!(
            %id,
            project = %checkpoint.project,
            milestone = %checkpoint.milestone,
            "Checkpoint created"
        );
        Ok(id)
    }

    pub async fn get_checkpoint(&self, id: Uuid) -> Result<Option<Checkpoint>> {
        let pool = self.pool().await?;
        let sql = format!("SELECT {CHECKPOINT_COLUMNS} FROM sessions WHERE id = $1");
        let row = sqlx::query_as::<_, Checkpoint>(&sql)
            .bind(id)
            .fetch_optional(&pool)
            .await?;
        Ok(row)
    }

    pub async fn query_checkpoints(&self, query: &CheckpointQuery) -> Result<Vec<Checkpoint>> {
        let pool = self.pool().await?;
        let base = format!("SELECT {CHECKPOINT_COLUMNS} FROM sessions");
        let mut builder = FilterQuery::new(&base)
            .eq("project_id", query.project)
            .newest_first("started_at", query.limit);

        tracing::debug!(sql = builder.sql(), "Querying checkpoints");
        let rows = builder
            .build_query_as::<Checkpoint>()
            .fetch_all(&pool)
            .await?;
        Ok(rows)
    }

    // ========================================================================
    // AGENT INTERACTIONS
    // ========================================================================

    pub async fn record_agent_interaction(
        &self,
        interaction: &NewAgentInteraction,
    ) -> Result<Uuid> {
        let pool = self.pool().await?;

        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO agent_interactions (
                agent_name, task_description, project_id, session_id,
                input_context, task_completed, effectiveness_rating
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(&interaction.agent_name)
        .bind(&interaction.task_description)
        .bind(interaction.project_id)
        .bind(interaction.session_id)
        .bind(interaction.input_context.clone().unwrap_or_else(|| json!({})))
        .bind(interaction.task_completed)
        .bind(interaction.effectiveness_rating.map(|r| r.as_str()))
        .fetch_one(&pool)
        .await?;

        tracing::info!(%id, agent = %interaction.agent_name, "Agent interaction recorded");
        Ok(id)
    }

    pub async fn get_agent_status(
        &self,
        query: &AgentStatusQuery,
    ) -> Result<Vec<AgentInteraction>> {
        let pool = self.pool().await?;
        let base = format!("SELECT {AGENT_INTERACTION_COLUMNS} FROM agent_interactions");
        let mut builder = FilterQuery::new(&base)
            .eq("agent_name", query.agent_name.clone())
            .eq("project_id", query.project_id)
            .newest_first("started_at", query.limit);

        tracing::debug!(sql = builder.sql(), "Querying agent status");
        let rows = builder
            .build_query_as::<AgentInteraction>()
            .fetch_all(&pool)
            .await?;
        Ok(rows)
    }

    /// Mark an interaction complete. `duration_seconds` is the whole number of
    /// seconds between the recorded start and the server's `now()`, so both
    /// ends come from the database clock.
    ///
    /// Returns `false` when no interaction has the given id.
    pub async fn complete_agent_interaction(
        &self,
        id: Uuid,
        completion: &AgentCompletion,
    ) -> Result<bool> {
        let pool = self.pool().await?;

        let result = sqlx::query(
            r#"
            UPDATE agent_interactions
            SET completed_at = now(),
                duration_seconds = floor(EXTRACT(EPOCH FROM (now() - started_at)))::integer,
                output_summary = $1,
                issues_encountered = $2,
                blockers = $3,
                task_completed = true,
                effectiveness_rating = $4
            WHERE id = $5
            "#,
        )
        .bind(&completion.output_summary)
        .bind(completion.issues_encountered.clone().unwrap_or_else(|| json!({})))
        .bind(completion.blockers.clone().unwrap_or_else(|| json!({})))
        .bind(completion.effectiveness_rating.map(|r| r.as_str()))
        .bind(id)
        .execute(&pool)
        .await?;

        if result.rows_affected() == 0 {
            tracing::warn!(%id, "No agent interaction matched completion");
            return Ok(false);
        }

        tracing::info!(%id, "Agent interaction completed");
        Ok(true)
    }

    // ========================================================================
    // DECISIONS
    // ========================================================================

    pub async fn create_decision(&self, decision: &NewDecision) -> Result<Uuid> {
        let helper = self.resources().await?.helper;
        Ok(helper.create_decision(decision).await?.id)
    }

    pub async fn get_decision(&self, id: Uuid) -> Result<Option<Decision>> {
        let helper = self.resources().await?.helper;
        helper.get_decision(id).await
    }

    pub async fn query_decisions(&self, query: &DecisionQuery) -> Result<Vec<Decision>> {
        let helper = self.resources().await?.helper;
        helper.query_decisions(query).await
    }

    pub async fn update_decision_status(&self, id: Uuid, status: DecisionStatus) -> Result<bool> {
        let helper = self.resources().await?.helper;
        helper.update_decision_status(id, status).await
    }

    // ========================================================================
    // ISSUES
    // ========================================================================

    pub async fn create_issue(&self, issue: &NewIssue) -> Result<Uuid> {
        let helper = self.resources().await?.helper;
        Ok(helper.create_issue(issue).await?.id)
    }

    pub async fn get_issue(&self, id: Uuid) -> Result<Option<Issue>> {
        let helper = self.resources().await?.helper;
        helper.get_issue(id).await
    }

    pub async fn query_issues(&self, query: &IssueQuery) -> Result<Vec<Issue>> {
        let helper = self.resources().await?.helper;
        helper.query_issues(query).await
    }

    pub async fn update_issue_status(&self, id: Uuid, status: &str) -> Result<bool> {
        let helper = self.resources().await?.helper;
        helper.update_issue_status(id, status).await
    }

    // ========================================================================
    // SEARCH
    // ========================================================================

    pub async fn search_all(&self, query_text: &str, limit: i64) -> Result<Vec<SearchHit>> {
        let helper = self.resources().await?.helper;
        helper.search_all(query_text, limit).await
    }
}
