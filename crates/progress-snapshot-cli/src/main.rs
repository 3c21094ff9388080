//! progress-snapshot CLI - weekly interface progress rollup
//!
//! Meant to be triggered by an external scheduler (cron, systemd timer). With no
//! subcommand it performs a snapshot run for today.

use std::process::ExitCode;

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use progress_snapshot_core::commands::{
    snapshot_history, take_weekly_snapshot, ProjectOutcome, RunOptions, RunReport,
};
use progress_snapshot_core::config::Config;
use progress_snapshot_core::domain::snapshot::WeeklySnapshot;
use progress_snapshot_core::storage::{Database, DatabaseConfig};
use tracing::info;

#[derive(Parser)]
#[command(name = "progress-snapshot")]
#[command(author, version, about = "Weekly per-project interface progress snapshots", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Database URL (overrides DATABASE_URL)
    #[arg(long, global = true)]
    database_url: Option<String>,

    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Take the weekly snapshot for every project (default)
    Run {
        /// Evaluate as of this date instead of today (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Compute everything but roll back instead of saving
        #[arg(long)]
        dry_run: bool,
    },

    /// Show stored snapshots for a project
    History {
        /// Project name
        project: String,
        /// Maximum number of weeks to show
        #[arg(short, long)]
        limit: Option<u32>,
    },

    /// Check configuration and database connectivity
    Doctor,
}

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env is fine; the environment may already carry DATABASE_URL
    dotenvy::dotenv().ok();

    if let Err(err) = init_tracing() {
        eprintln!("Failed to initialize logging: {:#}", err);
        return ExitCode::FAILURE;
    }

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_failure(&err);
            ExitCode::FAILURE
        }
    }
}

/// Print a failure with its error code and hint when it came from the core library
fn report_failure(err: &anyhow::Error) {
    match err.downcast_ref::<progress_snapshot_core::Error>() {
        Some(core_err) => {
            eprintln!("Error [{}]: {:#}", core_err.code(), err);
            if let Some(hint) = core_err.suggestion() {
                eprintln!("  hint: {}", hint);
            }
        }
        None => eprintln!("Error: {:#}", err),
    }
}

fn init_tracing() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("progress_snapshot=info".parse()?)
                .add_directive("progress_snapshot_core=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load()?;
    if let Some(url) = cli.database_url {
        config.database.url = Some(url);
    }

    let command = cli.command.unwrap_or(Commands::Run {
        date: None,
        dry_run: false,
    });

    if let Commands::Doctor = command {
        return cmd_doctor(&config, cli.quiet).await;
    }

    // Configuration problems are fatal before any work starts
    let db_config = DatabaseConfig::from_config(&config)?;
    let db = Database::new(db_config).await?;

    let result = match command {
        Commands::Run { date, dry_run } => {
            let run_date = date.unwrap_or_else(|| Local::now().date_naive());
            cmd_run(&db, &config, run_date, dry_run, cli.format, cli.quiet).await
        }
        Commands::History { project, limit } => {
            cmd_history(&db, &project, limit, cli.format, cli.quiet).await
        }
        Commands::Doctor => Ok(()),
    };

    db.close().await;
    info!("Database connection closed");
    result
}

// ============================================================================
// Command Implementations
// ============================================================================

async fn cmd_run(
    db: &Database,
    config: &Config,
    run_date: NaiveDate,
    dry_run: bool,
    format: OutputFormat,
    quiet: bool,
) -> anyhow::Result<()> {
    let options = RunOptions::new(run_date, &config.snapshot).dry_run(dry_run);
    let report = take_weekly_snapshot(db, &options).await?;

    if quiet {
        return Ok(());
    }

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => print_report(&report),
    }

    Ok(())
}

fn print_report(report: &RunReport) {
    if report.not_week_end_day {
        println!(
            "{} is not snapshot day (week ends on {}). Nothing to do.",
            report.run_date,
            report.week_end_date.format("%A")
        );
        return;
    }

    println!(
        "Week ending {} (run date {}){}",
        report.week_end_date,
        report.run_date,
        if report.dry_run { " [dry run]" } else { "" }
    );

    for project in &report.projects {
        match (project.outcome, project.counts) {
            (ProjectOutcome::Skipped, _) | (_, None) => {
                println!("  {}: skipped (no interfaces)", project.project_name);
            }
            (outcome, Some(counts)) => {
                let verb = match outcome {
                    ProjectOutcome::Created => "created",
                    _ => "updated",
                };
                println!(
                    "  {}: {}  total={} completed={} in_progress={} failed={} not_started={} delayed={}",
                    project.project_name,
                    verb,
                    counts.total,
                    counts.completed,
                    counts.in_progress,
                    counts.failed,
                    counts.not_started,
                    counts.delayed
                );
            }
        }
    }

    println!(
        "Snapshots written: {}, skipped: {}",
        report.written(),
        report.skipped()
    );
}

async fn cmd_history(
    db: &Database,
    project: &str,
    limit: Option<u32>,
    format: OutputFormat,
    quiet: bool,
) -> anyhow::Result<()> {
    let snapshots = snapshot_history(db, project, limit).await?;

    if quiet {
        return Ok(());
    }

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&snapshots)?),
        OutputFormat::Text => print_history(project, &snapshots),
    }

    Ok(())
}

fn print_history(project: &str, snapshots: &[WeeklySnapshot]) {
    if snapshots.is_empty() {
        println!("No snapshots for '{}' yet.", project);
        return;
    }

    println!(
        "{:<12} {:>6} {:>10} {:>12} {:>7} {:>12} {:>8}",
        "Week ending", "Total", "Completed", "In progress", "Failed", "Not started", "Delayed"
    );
    for snapshot in snapshots {
        let c = &snapshot.counts;
        println!(
            "{:<12} {:>6} {:>10} {:>12} {:>7} {:>12} {:>8}",
            snapshot.week_end_date.to_string(),
            c.total,
            c.completed,
            c.in_progress,
            c.failed,
            c.not_started,
            c.delayed
        );
    }
}

async fn cmd_doctor(config: &Config, quiet: bool) -> anyhow::Result<()> {
    let say = |line: String| {
        if !quiet {
            println!("{}", line);
        }
    };

    match Config::config_path() {
        Ok(path) if path.exists() => say(format!("[ok]   config file: {}", path.display())),
        Ok(path) => say(format!("[info] no config file at {} (using defaults)", path.display())),
        Err(err) => say(format!("[warn] config directory unavailable: {}", err)),
    }
    say(format!(
        "[info] week ends on {}{}",
        config.get("snapshot.week_end_day")?,
        if config.snapshot.only_on_week_end_day {
            " (runs on other days are skipped)"
        } else {
            ""
        }
    ));

    // Inspect the store as it is; pending migrations are applied by the next run
    let db_config = DatabaseConfig::from_config(config)?.no_migrate();
    say(format!("[ok]   database url: {}", db_config.url));

    let db = Database::new(db_config).await?;
    db.health_check().await?;
    let status = db.migration_status().await?;
    if status.needs_migration {
        say(format!(
            "[warn] schema version {}/{} (pending migrations are applied on the next run)",
            status.current_version, status.target_version
        ));
    } else {
        say(format!(
            "[ok]   schema version {}/{}",
            status.current_version, status.target_version
        ));
    }
    db.close().await;

    say("All checks passed.".to_string());
    Ok(())
}
