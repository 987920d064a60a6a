// Draftline entry point.
//
// Usage:
//   draftline <draft.json> [champion ...]   report on the next step
//   draftline simulate <draft.json>         play the draft out
//   draftline replay <draft.json>           rank every recorded action
//
// Startup sequence:
// 1. Initialize tracing (log to file, not terminal)
// 2. Load config
// 3. Load catalog, pair tables and priors; build the engine
// 4. Open a session from the draft file
// 5. Report mode only: commit any champions given after the draft file
// 6. Print the report, simulation or replay as JSON

use std::sync::Arc;

use anyhow::Context;
use serde::Serialize;
use tracing::{error, info};

use draftline_app::bootstrap;
use draftline_app::cli::Command;
use draftline_app::registry::SessionRegistry;
use draftline_core::catalog::ChampionId;
use draftline_core::config;

const SESSION_ID: &str = "cli";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let command = Command::parse(std::env::args().skip(1))?;
    let draft_path = command.draft().clone();

    // 1. Initialize tracing (log to file, not terminal)
    init_tracing()?;
    info!("Draftline starting up");

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: hint_limit={}, result_limit={}, intent_size={}",
        config.limits.hint_limit, config.limits.result_limit, config.limits.intent_size
    );

    // 3. Build the engine
    let engine = bootstrap::load_engine(&config).context("failed to load reference data")?;
    let registry = SessionRegistry::new(Arc::new(engine));

    // 4. Open a session from the draft file
    let parts = bootstrap::read_draft(&draft_path)
        .with_context(|| format!("failed to read draft from {}", draft_path.display()))?;
    registry
        .open(SESSION_ID, &parts)
        .await
        .context("draft file describes an invalid draft")?;

    // 5. Commit trailing champions
    if let Command::Report { commits, .. } = &command {
        for name in commits {
            let champion = ChampionId::from_name(name);
            let committed = registry
                .commit(SESSION_ID, champion)
                .await
                .with_context(|| format!("failed to commit '{name}'"))?;
            info!(
                "Committed {} {} for {} at step {}",
                committed.action, committed.champion, committed.side, committed.step
            );
        }
    }

    // 6. Output
    let result = match &command {
        Command::Report { .. } => registry.report(SESSION_ID).await.map(|r| to_json(&r)),
        Command::Simulate { .. } => registry.simulate(SESSION_ID).await.map(|s| to_json(&s)),
        Command::Replay { .. } => registry.replay(SESSION_ID).await.map(|r| to_json(&r)),
    };
    let json = match result {
        Ok(json) => json?,
        Err(e) => {
            error!("analysis failed: {}", e);
            return Err(e).context("failed to analyze draft");
        }
    };
    println!("{json}");

    info!("Draftline finished");
    Ok(())
}

fn to_json<T: Serialize>(value: &T) -> anyhow::Result<String> {
    serde_json::to_string_pretty(value).context("failed to serialize output")
}

/// Initialize tracing to write to a log file instead of stdout, which
/// carries the JSON report.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("draftline.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("draftline_core=info,draftline_app=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
