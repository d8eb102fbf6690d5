//! Policyscope - Policy Dashboard Report Generator
//!
//! A CLI tool that fetches policy records from a data-governance
//! service, aggregates them into chart view models, and writes a
//! Markdown/JSON report with SVG chart artifacts.
//!
//! Exit codes:
//!   0 - Success (fetch failures are logged, not fatal)
//!   1 - Runtime error (config, report/chart write failure, etc.)

mod analysis;
mod cli;
mod client;
mod config;
mod models;
mod render;
mod report;
mod store;

use anyhow::{Context, Result};
use chrono::Utc;
use cli::{Args, OutputFormat};
use client::PolicyClient;
use config::Config;
use indicatif::{ProgressBar, ProgressStyle};
use models::{Report, ReportMetadata};
use render::ChartSet;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use store::PolicyStore;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("Policyscope v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    // Run the dashboard pipeline
    match run(args).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Run failed: {}", e);
            eprintln!("\n❌ Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .policyscope.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(".policyscope.toml");

    if path.exists() {
        eprintln!("⚠️  .policyscope.toml already exists. Remove it first or edit it manually.");
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).context("Failed to write .policyscope.toml")?;

    println!("✅ Created .policyscope.toml with default settings.");
    println!("   Edit it to customize the endpoint, default policy, and chart output.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run the complete fetch → aggregate → report pipeline. Returns exit code.
async fn run(args: Args) -> Result<i32> {
    let start_time = Instant::now();

    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let endpoint = config.api.endpoint.clone();
    let selected_id = config.api.default_policy.clone();

    println!("🌐 Policy service: {}", endpoint);
    println!("   Timeout: {}s", config.api.timeout_seconds);
    if let Some(ref id) = selected_id {
        println!("   Selected policy: {}", id);
    }

    let client = Arc::new(PolicyClient::new(&endpoint, config.api.timeout_seconds));
    let store = Arc::new(Mutex::new(PolicyStore::new()));

    let spinner = make_spinner(args.quiet);
    spinner.set_message("Fetching policy data…");

    // The list fetch and the selected-policy fetch race independently;
    // each resolves the shared store on its own completion. Fetch
    // failures are logged and swallowed, leaving the store stale or
    // empty.
    let list_task = {
        let client = Arc::clone(&client);
        let store = Arc::clone(&store);
        tokio::spawn(async move {
            match client.fetch_policies().await {
                Ok(policies) => {
                    info!("Fetched {} policies", policies.len());
                    lock_store(&store).set_policies(policies);
                }
                Err(e) => warn!("Policy list fetch failed: {}", e),
            }
        })
    };

    let selected_task = selected_id.clone().map(|id| {
        lock_store(&store).begin_selected_fetch();

        let client = Arc::clone(&client);
        let store = Arc::clone(&store);
        tokio::spawn(async move {
            match client.fetch_policy(&id).await {
                Ok(policy) => {
                    info!("Fetched selected policy {}", policy.id);
                    lock_store(&store).resolve_selected(policy);
                }
                Err(e) => lock_store(&store).fail_selected(&e.to_string()),
            }
        })
    });

    list_task.await.context("Policy list task failed")?;
    if let Some(task) = selected_task {
        task.await.context("Selected-policy task failed")?;
    }

    spinner.finish_and_clear();

    let store = lock_store(&store);

    // Handle --dry-run: print what was fetched and exit
    if args.dry_run {
        return handle_dry_run(&store);
    }

    // Render chart artifacts
    let mut charts = Vec::new();
    if config.charts.enabled {
        let mut chart_set = ChartSet::new(config.charts.width, config.charts.height);
        chart_set.redraw_from_store(&store);
        charts = chart_set.export(Path::new(&config.charts.dir))?;

        for chart in &charts {
            println!("   📈 {}", chart.path);
        }
    }

    // Build the report
    println!("\n📝 Generating report...");

    let duration = start_time.elapsed().as_secs_f64();
    let metadata = ReportMetadata {
        endpoint,
        generated_at: Utc::now(),
        policy_count: store.policies().len(),
        selected_id,
        duration_seconds: duration,
    };

    let report = Report {
        metadata,
        policies: store.policies().to_vec(),
        status_distribution: store.status_distribution().clone(),
        selected: store.selected().cloned(),
        retention: store.retention_series(),
        cookie: store.cookie_series(),
        charts,
    };

    let output = match args.format {
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Markdown => report::generate_markdown_report(&report),
    };

    let output_path = Path::new(&config.general.output);
    std::fs::write(output_path, &output)
        .with_context(|| format!("Failed to write report to {}", output_path.display()))?;

    // Print summary
    println!("\n📊 Summary:");
    println!("   Policies: {}", report.policies.len());

    if !report.status_distribution.is_empty() {
        let breakdown: Vec<String> = report
            .status_distribution
            .iter()
            .map(|e| format!("{}: {}", e.status, e.count))
            .collect();
        println!("   Status: {}", breakdown.join(" | "));
    }

    if let Some(ref selected) = report.selected {
        println!("   Selected: {} ({})", selected.id, selected.status);
        if let Some(retention) = report.retention {
            println!("   Data retention: {} months", retention.months);
        }
        if let Some(cookie) = report.cookie {
            let state = if cookie.enabled() { "enabled" } else { "disabled" };
            println!("   Cookie policy: {}", state);
        }
    }

    println!("   Duration: {:.1}s", duration);
    println!("\n✅ Report saved to: {}", config.general.output);

    Ok(0)
}

/// Handle --dry-run: print the fetched data, write nothing.
fn handle_dry_run(store: &PolicyStore) -> Result<i32> {
    println!("\n🔍 Dry run: nothing will be written.\n");

    if store.policies().is_empty() {
        println!("   No policies were fetched.");
    } else {
        println!("   Found {} policies:\n", store.policies().len());
        for policy in store.policies() {
            println!("     📄 {}", policy.summary_line());
        }
    }

    match store.selected() {
        Some(policy) => println!("\n   Selected policy: {}", policy.summary_line()),
        None => println!("\n   No selected policy."),
    }

    println!("\n✅ Dry run complete.");
    Ok(0)
}

/// Spinner shown while fetches are in flight; hidden in quiet mode.
fn make_spinner(quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("valid spinner template"),
    );
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Lock the shared store, recovering the data if a fetch task panicked
/// while holding the lock.
fn lock_store(store: &Mutex<PolicyStore>) -> std::sync::MutexGuard<'_, PolicyStore> {
    store.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from .policyscope.toml");
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
