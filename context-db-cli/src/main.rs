//! context-db: command-line access to the context database
//!
//! Every subcommand maps onto one `ContextClient` operation and prints the
//! result as pretty JSON on stdout. Logs go to stderr.
//!
//! # Subcommands
//! - `health`: PostgreSQL version check
//! - `checkpoint create|get|list`: project checkpoints
//! - `agent record|status|complete`: agent interaction log
//! - `decision create|get|list|set-status`: decision records
//! - `issue create|get|list|set-status`: issue records
//! - `search <text> [-n <limit>]`: full-text search over everything

use clap::{Args, Parser, Subcommand};
use context_db_client::models::{
    AgentCompletion, AgentStatusQuery, CheckpointQuery, DecisionQuery, DecisionStatus,
    EffectivenessRating, ImpactLevel, IssueQuery, NewAgentInteraction, NewCheckpoint, NewDecision,
    NewIssue, Severity, DEFAULT_SEARCH_LIMIT,
};
use context_db_client::{ContextClient, ContextConfig};
use serde::Serialize;
use serde_json::Value;
use tracing_subscriber::{fmt, EnvFilter};
use uuid::Uuid;

// ============================================================================
// CLI Definition
// ============================================================================

#[derive(Debug, Parser)]
#[command(
    name = "context-db",
    version,
    about = "Store and query project context: checkpoints, agent status, decisions and issues"
)]
struct Cli {
    /// TOML config file. Without it, DATABASE_URL / CONTEXT_DB__* variables are used.
    #[arg(short, long, env = "CONTEXT_DB_CONFIG")]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Check database connectivity
    Health,

    /// Project checkpoints
    #[command(subcommand)]
    Checkpoint(CheckpointCommand),

    /// Agent interactions
    #[command(subcommand)]
    Agent(AgentCommand),

    /// Decision records
    #[command(subcommand)]
    Decision(DecisionCommand),

    /// Issue records
    #[command(subcommand)]
    Issue(IssueCommand),

    /// Full-text search across all tables
    Search {
        text: String,

        #[arg(short = 'n', long, default_value_t = DEFAULT_SEARCH_LIMIT)]
        limit: i64,
    },
}

#[derive(Debug, Subcommand)]
enum CheckpointCommand {
    /// Save a checkpoint for a project
    Create(CreateCheckpointArgs),

    /// Show one checkpoint
    Get { id: Uuid },

    /// List recent checkpoints
    List {
        #[arg(long)]
        project: Option<Uuid>,

        #[arg(short = 'n', long, default_value_t = 10)]
        limit: i64,
    },
}

#[derive(Debug, Args)]
struct CreateCheckpointArgs {
    #[arg(long)]
    project: Uuid,

    #[arg(long)]
    milestone: String,

    /// Repeat for each accomplishment
    #[arg(long = "accomplishment")]
    accomplishments: Vec<String>,

    /// JSON object; repeat for each decision
    #[arg(long = "decision", value_parser = parse_json)]
    decisions: Vec<Value>,

    /// JSON object; repeat for each blocker
    #[arg(long = "blocker", value_parser = parse_json)]
    blockers: Vec<Value>,

    /// Repeat for each next step
    #[arg(long = "next-step")]
    next_steps: Vec<String>,

    #[arg(long)]
    created_by: String,

    #[arg(long, value_parser = parse_json)]
    metadata: Option<Value>,
}

#[derive(Debug, Subcommand)]
enum AgentCommand {
    /// Record the start of an agent task
    Record {
        #[arg(long)]
        agent: String,

        #[arg(long)]
        task: String,

        #[arg(long)]
        project: Option<Uuid>,

        #[arg(long)]
        session: Option<Uuid>,

        #[arg(long, value_parser = parse_json)]
        input_context: Option<Value>,

        #[arg(long)]
        rating: Option<EffectivenessRating>,
    },

    /// List recent agent interactions
    Status {
        #[arg(long)]
        agent: Option<String>,

        #[arg(long)]
        project: Option<Uuid>,

        #[arg(short = 'n', long, default_value_t = 50)]
        limit: i64,
    },

    /// Mark an agent task complete
    Complete {
        id: Uuid,

        #[arg(long)]
        summary: Option<String>,

        #[arg(long, value_parser = parse_json)]
        issues: Option<Value>,

        #[arg(long, value_parser = parse_json)]
        blockers: Option<Value>,

        #[arg(long)]
        rating: Option<EffectivenessRating>,
    },
}

#[derive(Debug, Subcommand)]
enum DecisionCommand {
    /// Record a decision
    Create {
        #[arg(long)]
        title: String,

        #[arg(long)]
        description: String,

        /// e.g. architecture, technical, operational
        #[arg(long = "type")]
        decision_type: String,

        #[arg(long)]
        rationale: String,

        /// Repeat for each affected component
        #[arg(long = "component")]
        components: Vec<String>,

        #[arg(long)]
        impact: ImpactLevel,

        #[arg(long)]
        created_by: String,

        #[arg(long, default_value_t = DecisionStatus::Active)]
        status: DecisionStatus,
    },

    /// Show one decision
    Get { id: Uuid },

    /// List recent decisions
    List {
        #[arg(long)]
        status: Option<DecisionStatus>,

        #[arg(long = "type")]
        decision_type: Option<String>,

        #[arg(short = 'n', long, default_value_t = 10)]
        limit: i64,
    },

    /// Change a decision's status
    SetStatus { id: Uuid, status: DecisionStatus },
}

#[derive(Debug, Subcommand)]
enum IssueCommand {
    /// Report an issue
    Create {
        #[arg(long)]
        title: String,

        #[arg(long)]
        description: String,

        /// e.g. bug, performance, security
        #[arg(long = "type")]
        issue_type: String,

        #[arg(long)]
        severity: Severity,

        #[arg(long)]
        created_by: String,

        #[arg(long)]
        component: Option<String>,
    },

    /// Show one issue
    Get { id: Uuid },

    /// List recent issues
    List {
        #[arg(long)]
        status: Option<String>,

        #[arg(long)]
        severity: Option<Severity>,

        #[arg(short = 'n', long, default_value_t = 10)]
        limit: i64,
    },

    /// Change an issue's resolution status
    SetStatus { id: Uuid, status: String },
}

fn parse_json(raw: &str) -> Result<Value, String> {
    serde_json::from_str(raw).map_err(|e| format!("invalid JSON: {e}"))
}

// ============================================================================
// Output
// ============================================================================

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_found<T: Serialize>(kind: &str, id: Uuid, value: Option<T>) -> anyhow::Result<()> {
    match value {
        Some(v) => print_json(&v),
        None => anyhow::bail!("{kind} {id} not found"),
    }
}

// ============================================================================
// Dispatch
// ============================================================================

async fn run(command: Commands, client: &ContextClient) -> anyhow::Result<()> {
    match command {
        Commands::Health => {
            let version = client.health_check().await?;
            print_json(&serde_json::json!({ "status": "healthy", "postgresql": version }))
        }
        Commands::Checkpoint(cmd) => run_checkpoint(cmd, client).await,
        Commands::Agent(cmd) => run_agent(cmd, client).await,
        Commands::Decision(cmd) => run_decision(cmd, client).await,
        Commands::Issue(cmd) => run_issue(cmd, client).await,
        Commands::Search { text, limit } => print_json(&client.search_all(&text, limit).await?),
    }
}

async fn run_checkpoint(cmd: CheckpointCommand, client: &ContextClient) -> anyhow::Result<()> {
    match cmd {
        CheckpointCommand::Create(args) => {
            let id = client
                .create_checkpoint(&NewCheckpoint {
                    project: args.project,
                    milestone: args.milestone,
                    accomplishments: args.accomplishments,
                    decisions: args.decisions,
                    blockers: args.blockers,
                    next_steps: args.next_steps,
                    created_by: args.created_by,
                    metadata: args.metadata,
                })
                .await?;
            print_json(&serde_json::json!({ "id": id }))
        }
        CheckpointCommand::Get { id } => {
            print_found("checkpoint", id, client.get_checkpoint(id).await?)
        }
        CheckpointCommand::List { project, limit } => {
            let rows = client
                .query_checkpoints(&CheckpointQuery { project, limit })
                .await?;
            print_json(&rows)
        }
    }
}

async fn run_agent(cmd: AgentCommand, client: &ContextClient) -> anyhow::Result<()> {
    match cmd {
        AgentCommand::Record {
            agent,
            task,
            project,
            session,
            input_context,
            rating,
        } => {
            let mut interaction = NewAgentInteraction::new(agent, task);
            interaction.project_id = project;
            interaction.session_id = session;
            interaction.input_context = input_context;
            interaction.effectiveness_rating = rating;
            let id = client.record_agent_interaction(&interaction).await?;
            print_json(&serde_json::json!({ "id": id }))
        }
        AgentCommand::Status {
            agent,
            project,
            limit,
        } => {
            let rows = client
                .get_agent_status(&AgentStatusQuery {
                    agent_name: agent,
                    project_id: project,
                    limit,
                })
                .await?;
            print_json(&rows)
        }
        AgentCommand::Complete {
            id,
            summary,
            issues,
            blockers,
            rating,
        } => {
            let updated = client
                .complete_agent_interaction(
                    id,
                    &AgentCompletion {
                        output_summary: summary,
                        issues_encountered: issues,
                        blockers,
                        effectiveness_rating: rating,
                    },
                )
                .await?;
            print_json(&serde_json::json!({ "id": id, "updated": updated }))
        }
    }
}

async fn run_decision(cmd: DecisionCommand, client: &ContextClient) -> anyhow::Result<()> {
    match cmd {
        DecisionCommand::Create {
            title,
            description,
            decision_type,
            rationale,
            components,
            impact,
            created_by,
            status,
        } => {
            let id = client
                .create_decision(&NewDecision {
                    title,
                    description,
                    decision_type,
                    rationale,
                    affected_components: components,
                    impact_level: impact,
                    created_by,
                    status,
                })
                .await?;
            print_json(&serde_json::json!({ "id": id }))
        }
        DecisionCommand::Get { id } => print_found("decision", id, client.get_decision(id).await?),
        DecisionCommand::List {
            status,
            decision_type,
            limit,
        } => {
            let rows = client
                .query_decisions(&DecisionQuery {
                    status,
                    decision_type,
                    limit,
                })
                .await?;
            print_json(&rows)
        }
        DecisionCommand::SetStatus { id, status } => {
            let updated = client.update_decision_status(id, status).await?;
            print_json(&serde_json::json!({ "id": id, "updated": updated }))
        }
    }
}

async fn run_issue(cmd: IssueCommand, client: &ContextClient) -> anyhow::Result<()> {
    match cmd {
        IssueCommand::Create {
            title,
            description,
            issue_type,
            severity,
            created_by,
            component,
        } => {
            let id = client
                .create_issue(&NewIssue {
                    title,
                    description,
                    issue_type,
                    severity,
                    created_by,
                    component_affected: component,
                })
                .await?;
            print_json(&serde_json::json!({ "id": id }))
        }
        IssueCommand::Get { id } => print_found("issue", id, client.get_issue(id).await?),
        IssueCommand::List {
            status,
            severity,
            limit,
        } => {
            let rows = client
                .query_issues(&IssueQuery {
                    status,
                    severity,
                    limit,
                })
                .await?;
            print_json(&rows)
        }
        IssueCommand::SetStatus { id, status } => {
            let updated = client.update_issue_status(id, &status).await?;
            print_json(&serde_json::json!({ "id": id, "updated": updated }))
        }
    }
}

// ============================================================================
// Main
// ============================================================================

fn load_config(path: Option<&str>) -> anyhow::Result<ContextConfig> {
    let config = match path {
        Some(path) => ContextConfig::load(path)?,
        None => ContextConfig::from_env()?,
    };
    Ok(config)
}

#[tokio::main]
async fn main() {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("context-db: failed to load config: {}", e);
            std::process::exit(1);
        }
    };

    // Init logging on stderr so stdout stays machine-readable
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(max_connections = config.database.max_connections, "Config loaded");

    let client = ContextClient::new(config.database);
    let result = run(cli.command, &client).await;
    client.close().await;

    if let Err(e) = result {
        eprintln!("context-db: {}", e);
        std::process::exit(1);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_checkpoint_create_collects_repeated_args() {
        let project = Uuid::new_v4();
        let cli = Cli::try_parse_from([
            "context-db",
            "checkpoint",
            "create",
            "--project",
            &project.to_string(),
            "--milestone",
            "v1",
            "--accomplishment",
            "a",
            "--accomplishment",
            "b",
            "--decision",
            r#"{"title": "use sqlx"}"#,
            "--created-by",
            "rias",
        ])
        .unwrap();

        match cli.command {
            Commands::Checkpoint(CheckpointCommand::Create(args)) => {
                assert_eq!(args.project, project);
                assert_eq!(args.accomplishments, vec!["a", "b"]);
                assert_eq!(args.decisions[0]["title"], "use sqlx");
                assert!(args.blockers.is_empty());
                assert!(args.metadata.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_invalid_json_argument_rejected() {
        let result = Cli::try_parse_from([
            "context-db",
            "agent",
            "complete",
            &Uuid::new_v4().to_string(),
            "--issues",
            "{not json",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_list_defaults() {
        let cli = Cli::try_parse_from(["context-db", "agent", "status"]).unwrap();
        match cli.command {
            Commands::Agent(AgentCommand::Status { agent, project, limit }) => {
                assert!(agent.is_none());
                assert!(project.is_none());
                assert_eq!(limit, 50);
            }
            other => panic!("unexpected command: {:?}", other),
        }

        let cli = Cli::try_parse_from(["context-db", "search", "pool"]).unwrap();
        match cli.command {
            Commands::Search { text, limit } => {
                assert_eq!(text, "pool");
                assert_eq!(limit, 20);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_enum_arguments_parse() {
        let cli = Cli::try_parse_from([
            "context-db",
            "issue",
            "list",
            "--severity",
            "high",
        ])
        .unwrap();
        match cli.command {
            Commands::Issue(IssueCommand::List { severity, limit, .. }) => {
                assert_eq!(severity, Some(Severity::High));
                assert_eq!(limit, 10);
            }
            other => panic!("unexpected command: {:?}", other),
        }

        let bad = Cli::try_parse_from(["context-db", "decision", "list", "--status", "deleted"]);
        assert!(bad.is_err());
    }

    #[test]
    fn test_invalid_uuid_rejected() {
        let result = Cli::try_parse_from(["context-db", "checkpoint", "get", "not-a-uuid"]);
        assert!(result.is_err());
    }
}
