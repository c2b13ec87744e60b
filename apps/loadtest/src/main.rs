use std::env;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use dotenv::dotenv;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use executor_cell::{HarnessExecutor, HttpRequestExecutor, QueryExecutor};
use loadgen_cell::LoadGenerator;
use report_cell::ReportBuilder;
use scenario_cell::ScenarioOrchestrator;
use shared_config::{HarnessConfig, ScenarioCatalog};
use shared_database::DbPoolManager;
use shared_models::{Report, ScenarioOutcome};

#[tokio::main]
async fn main() -> ExitCode {
    // Loading Env Vars
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting loadbench");

    let config = HarnessConfig::from_env();
    let command = env::args().nth(1).unwrap_or_else(|| "suite".to_string());
    let argument = env::args().nth(2);

    match run(&config, &command, argument.as_deref()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(config: &HarnessConfig, command: &str, argument: Option<&str>) -> anyhow::Result<()> {
    let http = HttpRequestExecutor::new(config)?;

    // An unreachable database is fatal for query scenarios only; the run
    // continues with web-only testing.
    let query = match DbPoolManager::connect(config).await {
        Ok(pool) => Some(QueryExecutor::new(Arc::new(pool))),
        Err(e) => {
            warn!("{} - continuing with web-only testing", e);
            None
        }
    };

    let executor = HarnessExecutor::new(http, query);
    let database_available = executor.has_database();
    let generator = Arc::new(LoadGenerator::new(Arc::new(executor)));
    let orchestrator = ScenarioOrchestrator::new(
        generator,
        ScenarioCatalog::default(),
        config,
        database_available,
    );
    let builder = ReportBuilder::new(config);

    let started = Instant::now();
    let outcomes: Vec<ScenarioOutcome> = match command {
        "suite" => orchestrator.run_suite().await,
        "spike" => vec![orchestrator.run_spike().await],
        "endurance" => {
            let secs = parse_secs(argument, orchestrator.catalog().endurance.duration_secs)?;
            vec![orchestrator.run_endurance(Duration::from_secs(secs)).await]
        }
        "monitor" => {
            let secs = parse_secs(argument, orchestrator.catalog().monitor.duration_secs)?;
            let interval = Duration::from_secs(orchestrator.catalog().monitor.interval_secs);
            vec![
                orchestrator
                    .run_monitoring(Duration::from_secs(secs), interval)
                    .await,
            ]
        }
        "scenario" => {
            let name = argument.context("scenario command requires a scenario name")?;
            vec![orchestrator.run_named(name).await?]
        }
        other => anyhow::bail!("Unknown command: {}", other),
    };

    let report = builder.from_outcomes(outcomes, started.elapsed());
    persist_report(&report)
}

fn parse_secs(argument: Option<&str>, default: u64) -> anyhow::Result<u64> {
    match argument {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("invalid duration in seconds: {}", raw)),
        None => Ok(default),
    }
}

/// Prints the report and writes it under `reports/`. The JSON shape is the
/// harness's output contract; rendering beyond this lives elsewhere.
fn persist_report(report: &Report) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    println!("{}", json);

    let dir = Path::new("reports");
    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!(
        "loadbench-{}.json",
        report.generated_at.format("%Y%m%dT%H%M%SZ")
    ));
    std::fs::write(&path, json)?;
    info!("Report written to {}", path.display());
    Ok(())
}
