use rea_sniper::config::{AppConfig, load_config};
use rea_sniper::matcher::MatchEngine;
use rea_sniper::model::RunError;
use rea_sniper::monitor::{deal_stats, match_stats, recipe_stats};
use rea_sniper::optimize::optimize;
use rea_sniper::source::{CatalogSource, JsonFileSource};
use rea_sniper::storage::{RunRecord, SqliteStorage, write_optimized, write_report};
use rea_sniper::validate::{Issue, validate_deals, validate_recipes, validate_report};
use chrono::Utc;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;
use tokio::time::{Duration, sleep};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const CONFIG_ENV: &str = "REA_SNIPER_CONFIG";
const MAX_LOGGED_ISSUES: usize = 10;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration from file
    let config_path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| "config.json".to_string());
    let config = match load_config(&config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Config load error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let engine = match MatchEngine::new(&config.matching) {
        Ok(engine) => Arc::new(engine),
        Err(e) => {
            error!("Invalid matching configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let source = JsonFileSource::new(&config.deals_path, &config.recipes_path);

    // Run history is optional; a broken database only costs the history
    let storage = config.db_path.as_deref().and_then(|path| match SqliteStorage::new(path) {
        Ok(s) => Some(s),
        Err(e) => {
            warn!("Failed to open run history {}: {}", path, e);
            None
        }
    });

    let Some(interval) = config.check_interval_seconds else {
        return match run_once(&config, &engine, &source, storage.as_ref()).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                error!("Run failed: {}", e);
                ExitCode::FAILURE
            }
        };
    };

    // Periodic mode
    loop {
        if let Err(e) = run_once(&config, &engine, &source, storage.as_ref()).await {
            error!("Run failed: {}", e);
        }

        info!("Waiting {}s for the next run (Ctrl-C to stop)...", interval);
        tokio::select! {
            _ = sleep(Duration::from_secs(interval)) => {
                info!("Timer triggered.");
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down.");
                return ExitCode::SUCCESS;
            }
        }
    }
}

async fn run_once(
    config: &AppConfig,
    engine: &Arc<MatchEngine>,
    source: &dyn CatalogSource,
    storage: Option<&SqliteStorage>,
) -> Result<(), RunError> {
    let started = Instant::now();
    info!("Loading catalogs...");
    let (deals, recipes) = futures::try_join!(source.load_deals(), source.load_recipes())?;

    log_issues("deals", &validate_deals(&deals.records));
    log_issues("recipes", &validate_recipes(&recipes.records));
    deal_stats(&deals.records).log();
    recipe_stats(&recipes.records).log();

    let mut report = engine
        .run_parallel(&deals.records, &recipes.records, config.workers, Utc::now())
        .await?;
    report.skipped_deals += deals.rejected.len();
    report.skipped_recipes += recipes.rejected.len();

    log_issues("report", &validate_report(&report));
    match_stats(&report, Utc::now()).log();

    write_report(&config.output_path, &report).await?;
    if let Some(path) = &config.optimized_output_path {
        if let Err(e) = write_optimized(path, &optimize(&report)).await {
            warn!("Failed to write optimized report {}: {}", path, e);
        }
    }

    if let Some(storage) = storage {
        let run = RunRecord::from_report(&report, started.elapsed().as_millis() as i64);
        match storage.last_run() {
            Ok(Some(prev)) => info!(
                "Previous run {}: {} deals, {} recipes, avg {:.1}% (now {} / {} / {:.1}%)",
                prev.run_at,
                prev.total_deals,
                prev.total_recipes,
                prev.average_match_percentage,
                run.total_deals,
                run.total_recipes,
                run.average_match_percentage
            ),
            Ok(None) => info!("First recorded run."),
            Err(e) => warn!("Failed to read run history: {}", e),
        }
        if let Err(e) = storage.record_run(&run) {
            warn!("Failed to record run: {}", e);
        }
    }

    info!("Run finished in {} ms", started.elapsed().as_millis());
    Ok(())
}

fn log_issues(what: &str, issues: &[Issue]) {
    if issues.is_empty() {
        info!("Validation of {} passed", what);
        return;
    }
    warn!("Validation of {} found {} issues", what, issues.len());
    for issue in issues.iter().take(MAX_LOGGED_ISSUES) {
        warn!("  - {}", issue);
    }
    if issues.len() > MAX_LOGGED_ISSUES {
        warn!("  ... and {} more", issues.len() - MAX_LOGGED_ISSUES);
    }
}
