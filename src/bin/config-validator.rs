//! # Workflow Scheduler Configuration Validator
//!
//! Command-line tool for validating scheduler configuration files and
//! previewing the paged query documents a run would send to its source.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use tracing::{error, info};
use workflow_scheduler::config::ConfigManager;
use workflow_scheduler::logging::init_structured_logging;
use workflow_scheduler::models::BulkDispatchJob;
use workflow_scheduler::query_builder::QueryCursorBuilder;

#[derive(Parser)]
#[command(name = "config-validator")]
#[command(about = "Validate workflow scheduler configuration files")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Environment to validate (development, test, production)
    #[arg(short, long, default_value = "development")]
    environment: String,

    /// Configuration directory path (default: config)
    #[arg(short, long)]
    config_dir: Option<PathBuf>,

    /// Verbose output level (use multiple times for more verbosity)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Output format (table, json)
    #[arg(long, default_value = "table")]
    format: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load and validate the configuration, including the query document
    Validate,

    /// Print the query document sent for a given page
    Preview {
        /// Page number (1-based)
        #[arg(short, long, default_value_t = 1)]
        page: u32,

        /// Paging cookie returned with the previous page
        #[arg(long)]
        cookie: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    init_structured_logging(Some(level));

    let result = match &cli.command {
        Some(Commands::Validate) | None => validate(&cli),
        Some(Commands::Preview { page, cookie }) => preview(&cli, *page, cookie.as_deref()),
    };

    match result {
        Ok(()) => {
            info!("Configuration check completed successfully");
            process::exit(0);
        }
        Err(e) => {
            error!("Configuration check failed: {e:#}");
            eprintln!("❌ {e:#}");
            process::exit(1);
        }
    }
}

fn load(cli: &Cli) -> anyhow::Result<(std::sync::Arc<ConfigManager>, BulkDispatchJob)> {
    let manager =
        ConfigManager::load_from_directory_with_env(cli.config_dir.clone(), &cli.environment)
            .context("failed to load configuration")?;
    let job = BulkDispatchJob::from_config(&manager.config().job)
        .context("job configuration is not runnable")?;
    Ok((manager, job))
}

fn validate(cli: &Cli) -> anyhow::Result<()> {
    let (manager, job) = load(cli)?;

    if cli.format == "json" {
        println!("{}", serde_json::to_string_pretty(&manager.debug_config())?);
        return Ok(());
    }

    let execution = &manager.config().execution;
    println!("🔧 Validating Workflow Scheduler Configuration");
    println!("Environment:          {}", manager.environment());
    println!("Config file:          {}", manager.config_file().display());
    println!();
    println!("✅ Query root:         <{}>", job.query().root_name());
    println!("✅ Target action:      {}", job.target_action_id());
    println!("✅ Page size:          {}", job.page_size());
    println!("✅ Max pages:          {}", display_option(execution.max_pages));
    println!("✅ Fetch timeout ms:   {}", display_option(execution.fetch_timeout_ms));
    println!("✅ Action timeout ms:  {}", display_option(execution.action_timeout_ms));
    println!("✅ Concurrency:        {}", execution.dispatch_concurrency);
    println!("\n🎉 All configuration validation checks passed!");
    Ok(())
}

fn preview(cli: &Cli, page: u32, cookie: Option<&str>) -> anyhow::Result<()> {
    let (_manager, job) = load(cli)?;
    let query = QueryCursorBuilder::build_with(job.query(), cookie, page, job.page_size())
        .with_context(|| format!("failed to build query for page {page}"))?;
    println!("{query}");
    Ok(())
}

fn display_option<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| "unbounded".to_string(), |v| v.to_string())
}
