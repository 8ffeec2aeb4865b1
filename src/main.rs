//! Logistics KPI mini dashboard
//!
//! Usage:
//!   delivery_kpi --csv <PATH> [--group-by <COLUMN>] [--out-dir <DIR>] [--format table|json|csv]

use anyhow::Result;
use clap::{Parser, ValueEnum};
use delivery_kpi::{chart, loader, report, summarize, Grouping};
use std::io;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

/// Logistics KPI mini dashboard (CLI)
#[derive(Parser, Debug)]
#[command(name = "delivery_kpi")]
#[command(about = "Order, box, delay, misdelivery and round-change KPIs from a deliveries CSV")]
struct Args {
    /// Path to deliveries CSV
    #[arg(long)]
    csv: PathBuf,

    /// Group column (estimated_delivery_date, center_code, region_group_code, etc.); empty or ALL for overall
    #[arg(long, default_value = "estimated_delivery_date")]
    group_by: String,

    /// Output directory for charts
    #[arg(long, default_value = "out")]
    out_dir: PathBuf,

    /// Report format written to stdout
    #[arg(long, value_enum, default_value = "table")]
    format: OutputFormat,

    /// Do not write the delay-rate chart
    #[arg(long)]
    no_chart: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .init();

    let args = Args::parse();

    let loaded = loader::load_events(&args.csv)?;
    let resolution = Grouping::resolve(Some(args.group_by.as_str()));
    let summary = summarize(&loaded.events, &resolution.grouping);

    match args.format {
        OutputFormat::Table => println!("{}", report::render_table(&summary)),
        OutputFormat::Json => println!("{}", report::to_json(&summary)?),
        OutputFormat::Csv => report::write_csv(&summary, io::stdout().lock())?,
    }

    if !args.no_chart {
        if let Some(path) = chart::export_delay_rate_chart(&summary, &args.out_dir)? {
            info!("Saved chart: {}", path.display());
        }
    }

    Ok(())
}
