// [apps/cli/src/main.rs]
//! Reference CLI for the mission panel: a submitter harness (`submit`,
//! `tag`) and a handler harness (`run`, `run-parallel`) whose
//! `execute_mission` shells out `content.command` as a subprocess. This is
//! provided so the crate is runnable end-to-end — any real handler is free
//! to implement `Handler` on its own mission shape instead.

use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use missionpanel_core::{Handler, HandlerRuntime, ParallelHandlerRuntime, Submitter};
use missionpanel_models::{Attempt, Mission};
use missionpanel_store::{LibsqlStore, MissionStore, StoreClient};
use tokio::process::Command;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(
    name = "missionpanel",
    author = "Raz Podesta <metaShark Tech>",
    version,
    about = "Submit, tag, and run missions against a mission panel store."
)]
struct Cli {
    /// A libSQL connection string: a local file path, `:memory:`, or a
    /// `libsql://`/`https://` remote endpoint.
    #[arg(long, env = "DATABASE_URL", default_value = "missionpanel.db")]
    database_url: String,

    /// Required when `--database-url` is a remote endpoint.
    #[arg(long, env = "DATABASE_AUTH_TOKEN")]
    database_auth_token: Option<String>,

    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand, Debug)]
enum Action {
    /// Register a mission, deduplicated by its match patterns.
    Submit {
        /// Mission content as a JSON document.
        #[arg(long)]
        content: String,
        #[arg(long = "pattern", required = true)]
        patterns: Vec<String>,
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
    /// Attach tags to the mission resolved by the given match patterns.
    Tag {
        #[arg(long = "pattern", required = true)]
        patterns: Vec<String>,
        #[arg(long = "tag", required = true)]
        tags: Vec<String>,
    },
    /// Run a single-worker handler loop against missions carrying every
    /// given tag.
    Run {
        #[arg(long = "tags", required = true)]
        tags: Vec<String>,
        /// The handler identity recorded on each Attempt.
        #[arg(long)]
        handler: String,
        /// Heartbeat staleness threshold, in milliseconds.
        #[arg(long = "interval-ms", default_value_t = 30_000)]
        interval_ms: i64,
        /// Claim and run a single mission, then exit, instead of draining
        /// the whole queue.
        #[arg(long)]
        once: bool,
    },
    /// Run an N-way parallel handler loop against missions carrying every
    /// given tag.
    RunParallel {
        #[arg(long = "tags", required = true)]
        tags: Vec<String>,
        #[arg(long)]
        handler: String,
        #[arg(long = "interval-ms", default_value_t = 30_000)]
        interval_ms: i64,
        #[arg(long)]
        parallelism: usize,
    },
}

/// Runs a mission's `content.command` field as a shell subprocess. Success
/// is exit code zero; anything else — including a missing `command` field —
/// is a failed Attempt, never a propagated error.
struct SubprocessHandler {
    name: String,
    max_time_interval: Duration,
}

#[async_trait]
impl Handler for SubprocessHandler {
    fn name(&self) -> &str {
        &self.name
    }

    fn max_time_interval(&self) -> Duration {
        self.max_time_interval
    }

    async fn execute_mission(&self, mission: &Mission, _attempt: &Attempt) -> anyhow::Result<bool> {
        let Some(command) = mission.content.get("command").and_then(|v| v.as_str()) else {
            warn!(mission_id = mission.id, "mission content has no string \"command\" field");
            return Ok(false);
        };

        info!(mission_id = mission.id, command, "running mission subprocess");
        let status = Command::new("sh")
            .arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .status()
            .await
            .context("failed to spawn mission subprocess")?;

        if !status.success() {
            warn!(mission_id = mission.id, ?status, "mission subprocess exited non-zero");
        }
        Ok(status.success())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    missionpanel_telemetry::init_tracing("missionpanel-cli");

    let cli = Cli::parse();
    let client = StoreClient::connect(&cli.database_url, cli.database_auth_token.clone())
        .await
        .context("failed to connect to the mission panel store")?;
    let store: Arc<dyn MissionStore> =
        Arc::new(LibsqlStore::new(&client).await.context("failed to prepare store repositories")?);

    match cli.action {
        Action::Submit { content, patterns, tags } => {
            let content: serde_json::Value = serde_json::from_str(&content).context("--content must be valid JSON")?;
            let mission = Submitter::new(store).create_mission(content, &patterns, &tags).await?;
            println!("{}", serde_json::to_string_pretty(&mission)?);
        }
        Action::Tag { patterns, tags } => {
            let mission = Submitter::new(store).add_tags(&patterns, &tags).await?;
            println!("{}", serde_json::to_string_pretty(&mission)?);
        }
        Action::Run { tags, handler, interval_ms, once } => {
            let handler = Arc::new(SubprocessHandler {
                name: handler,
                max_time_interval: Duration::from_millis(interval_ms.max(0) as u64),
            });
            let runtime = HandlerRuntime::new(store, handler, tags);
            if once {
                match runtime.run_once().await? {
                    Some(attempt) => info!(attempt_id = attempt.id, success = attempt.success, "attempt finished"),
                    None => info!("nothing eligible"),
                }
            } else {
                let completed = runtime.run_all().await?;
                info!(completed, "drained every eligible mission");
            }
        }
        Action::RunParallel { tags, handler, interval_ms, parallelism } => {
            let handler = Arc::new(SubprocessHandler {
                name: handler,
                max_time_interval: Duration::from_millis(interval_ms.max(0) as u64),
            });
            let runtime = ParallelHandlerRuntime::new(store, handler, tags, parallelism);
            let completed = runtime.run_all().await?;
            info!(completed, parallelism, "parallel run drained every eligible mission");
        }
    }

    Ok(())
}
