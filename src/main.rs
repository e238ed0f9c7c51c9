use std::path::PathBuf;

use anyhow::Context;
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use okr_dashboard::metrics::Period;
use okr_dashboard::source::{CsvFileSource, RecordSource};
use okr_dashboard::{aggregate, ingest, metrics, query, report};
use okr_dashboard::{build_dashboard, DashboardConfig, Selection};

#[derive(Parser)]
#[command(name = "okr-dashboard")]
#[command(about = "Objective and key result progress reporting", long_about = None)]
struct Cli {
    /// CSV export of the key results sheet
    #[arg(long, env = "OKR_CSV", global = true)]
    csv: Option<PathBuf>,
    /// Date the confidence score is measured at (defaults to today)
    #[arg(long, value_parser = parse_date, global = true)]
    reference_date: Option<NaiveDate>,
    /// Start of the reporting period (defaults to the reference quarter)
    #[arg(long, value_parser = parse_date, requires = "period_end", global = true)]
    period_start: Option<NaiveDate>,
    #[arg(long, value_parser = parse_date, requires = "period_start", global = true)]
    period_end: Option<NaiveDate>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Markdown,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Print headline metrics and objective progress
    Summary,
    /// List objectives and the departments working on each
    Objectives,
    /// Drill into the key results of one objective
    KeyResults {
        #[arg(long)]
        objective: String,
        #[arg(long)]
        department: Option<String>,
    },
    /// Render the full dashboard
    Report {
        #[arg(long)]
        objective: Option<String>,
        #[arg(long, requires = "objective")]
        department: Option<String>,
        #[arg(long, value_enum, default_value_t = Format::Markdown)]
        format: Format,
        #[arg(long, default_value = "IDR")]
        currency: String,
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    ingest::parse_date_str(value).ok_or_else(|| format!("unrecognized date {value:?}"))
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    let csv = cli
        .csv
        .context("--csv or OKR_CSV must point to the key results export")?;
    let records = CsvFileSource::new(&csv)
        .load()
        .with_context(|| format!("failed to load key results from {}", csv.display()))?;

    let reference_date = cli.reference_date.unwrap_or_else(|| Utc::now().date_naive());
    let mut config = DashboardConfig::for_quarter(reference_date);
    if let (Some(start), Some(end)) = (cli.period_start, cli.period_end) {
        let period = Period::new(start, end).context("invalid reporting period")?;
        config = config.with_period(period);
    }

    match cli.command {
        Commands::Summary => {
            let overall = metrics::overall_achievement(&records);
            let employees = aggregate::summarize_by_employee(&records);
            let salary = metrics::salary_utilization(&employees);
            let confidence =
                metrics::confidence_for_period(reference_date, &config.period, overall);

            println!("{}", metrics::quarter_label(reference_date));
            println!("Overall achievement {overall:.2}%");
            println!("Confidence score {confidence:.2}%");
            println!(
                "Salary utilization {} (delta {})",
                report::abbreviate(salary.realized),
                report::abbreviate(salary.delta)
            );

            let objectives = aggregate::summarize_by_objective(&records);
            if objectives.is_empty() {
                println!("No objectives found.");
                return Ok(());
            }
            println!("Objectives:");
            for row in objectives.iter() {
                println!("- {} {:.1}%", row.objective, row.progress * 100.0);
            }
        }
        Commands::Objectives => {
            let objectives = query::objectives_available(&records);
            if objectives.is_empty() {
                println!("No objectives found.");
                return Ok(());
            }
            for objective in objectives.iter() {
                let departments = query::departments_for_objective(&records, objective);
                println!("{objective}: {}", departments.join(", "));
            }
            let departments = query::departments_available(&records);
            println!("Departments: {}", departments.join(", "));
        }
        Commands::KeyResults {
            objective,
            department,
        } => {
            let rows = query::key_results_for(&records, &objective, department.as_deref());
            if rows.is_empty() {
                println!("No key results match this selection.");
                return Ok(());
            }
            for row in rows {
                println!(
                    "- {} ({}, {}) {} points, {:.1}% done, {} to {}",
                    row.key_result,
                    row.department,
                    row.assignee,
                    row.sprint_point,
                    row.progress() * 100.0,
                    row.start_date,
                    row.end_date
                );
            }
        }
        Commands::Report {
            objective,
            department,
            format,
            currency,
            out,
        } => {
            if let Some(objective) = objective {
                let mut selection = Selection::objective(objective);
                selection.department = department;
                config = config.with_selection(selection);
            }
            let dashboard = build_dashboard(&records, &config);
            let rendered = match format {
                Format::Markdown => report::render_markdown(&dashboard, &currency),
                Format::Json => {
                    report::render_json(&dashboard).context("failed to encode dashboard")?
                }
            };
            match out {
                Some(path) => {
                    std::fs::write(&path, rendered)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    println!("Report written to {}.", path.display());
                }
                None => print!("{rendered}"),
            }
        }
    }

    Ok(())
}
