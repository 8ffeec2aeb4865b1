//! Synthetic deliveries CSV generator
//!
//! Generates per-package delivery rows with controlled random variation,
//! including duplicate rows for the same order, for exercising the KPI report.
//!
//! Usage:
//!   cargo run --release --bin generate_synthetic -- [OPTIONS]
//!
//! Options:
//!   --orders <N>              Number of logical orders (default: 1000)
//!   --start-date <DATE>       First estimated delivery date (default: 2024-01-01)
//!   --days <N>                Number of delivery days spanned (default: 14)
//!   --duplicate-rate <F>      Probability an order gets an extra row (default: 0.15)
//!   --delay-rate <F>          Probability an order is delayed (default: 0.08)
//!   --misdelivery-rate <F>    Probability an order is misdelivered (default: 0.01)
//!   --round-change-rate <F>   Probability a round-1 order completes later (default: 0.05)
//!   --seed <N>                Random seed for reproducibility (optional)
//!   --output <PATH>           Output CSV path (default: data/deliveries.csv)

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use clap::Parser;
use csv::WriterBuilder;
use rand::prelude::*;
use rand::rngs::StdRng;
use serde::Serialize;
use std::path::PathBuf;

/// Synthetic deliveries generator
#[derive(Parser, Debug)]
#[command(name = "generate_synthetic")]
#[command(about = "Generate synthetic delivery rows with controlled variation")]
struct Args {
    /// Number of logical orders
    #[arg(long, default_value = "1000")]
    orders: usize,

    /// First estimated delivery date
    #[arg(long, default_value = "2024-01-01")]
    start_date: NaiveDate,

    /// Number of delivery days spanned
    #[arg(long, default_value = "14")]
    days: i64,

    /// Number of distinct workers
    #[arg(long, default_value = "20")]
    workers: u32,

    /// Number of distinct region groups
    #[arg(long, default_value = "5")]
    regions: u32,

    /// Number of distinct centers
    #[arg(long, default_value = "3")]
    centers: u32,

    /// Probability an order is written with an extra duplicate row (0.0 - 1.0)
    #[arg(long, default_value = "0.15")]
    duplicate_rate: f64,

    /// Probability an order is delayed (0.0 - 1.0)
    #[arg(long, default_value = "0.08")]
    delay_rate: f64,

    /// Probability an order is misdelivered (0.0 - 1.0)
    #[arg(long, default_value = "0.01")]
    misdelivery_rate: f64,

    /// Probability a round-1 order completes on round 2 or 3 (0.0 - 1.0)
    #[arg(long, default_value = "0.05")]
    round_change_rate: f64,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,

    /// Output CSV path
    #[arg(long, default_value = "data/deliveries.csv")]
    output: PathBuf,
}

/// Output row, same header as the KPI loader expects
#[derive(Debug, Clone, Serialize)]
struct OutputRecord {
    pdt: String,
    estimated_delivery_date: String,
    center_code: String,
    worker_id: String,
    region_group_code: String,
    delivery_completion_round: i64,
    full_address_hash: String,
    org_delivery_round: i64,
    is_delayed: u8,
    is_misdelivered: u8,
    box_cnt: i64,
}

/// Generate an anonymized address hash
fn generate_address_hash(rng: &mut impl Rng) -> String {
    format!("{:012x}", rng.gen::<u64>() & 0xFFFFFFFFFFFF)
}

/// Processing time: the evening before the delivery date
fn processing_time(date: NaiveDate, rng: &mut impl Rng) -> NaiveDateTime {
    let evening = (date - Duration::days(1)).and_time(NaiveTime::default()) + Duration::hours(18);
    evening + Duration::minutes(rng.gen_range(0..360))
}

/// Pick the completion round for an order scheduled on `org_round`
fn completion_round(org_round: i64, change_rate: f64, rng: &mut impl Rng) -> i64 {
    if org_round != 1 || rng.gen::<f64>() >= change_rate {
        return org_round;
    }
    if rng.gen_bool(0.7) {
        2
    } else {
        3
    }
}

fn generate_order(args: &Args, rng: &mut impl Rng) -> OutputRecord {
    let date = args.start_date + Duration::days(rng.gen_range(0..args.days.max(1)));
    let org_round = if rng.gen_bool(0.9) { 1 } else { 2 };

    OutputRecord {
        pdt: processing_time(date, rng).format("%Y-%m-%d %H:%M:%S").to_string(),
        estimated_delivery_date: date.format("%Y-%m-%d").to_string(),
        center_code: format!("C{:02}", rng.gen_range(1..=args.centers.max(1))),
        worker_id: format!("W{:03}", rng.gen_range(1..=args.workers.max(1))),
        region_group_code: format!("R{}", rng.gen_range(1..=args.regions.max(1))),
        delivery_completion_round: completion_round(org_round, args.round_change_rate, rng),
        full_address_hash: generate_address_hash(rng),
        org_delivery_round: org_round,
        is_delayed: u8::from(rng.gen::<f64>() < args.delay_rate),
        is_misdelivered: u8::from(rng.gen::<f64>() < args.misdelivery_rate),
        box_cnt: rng.gen_range(1..=5),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    println!("Synthetic Delivery Generator");
    println!("{}", "━".repeat(60));
    println!("Output:            {}", args.output.display());
    println!("Orders:            {}", args.orders);
    println!("Dates:             {} + {} days", args.start_date, args.days);
    println!("Duplicate rate:    {:.1}%", args.duplicate_rate * 100.0);
    println!("Delay rate:        {:.1}%", args.delay_rate * 100.0);
    println!("Misdelivery rate:  {:.1}%", args.misdelivery_rate * 100.0);
    println!("Round-change rate: {:.1}%", args.round_change_rate * 100.0);
    if let Some(seed) = args.seed {
        println!("Random seed:       {}", seed);
    }
    println!();

    let mut rng: StdRng = match args.seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };

    if let Some(parent) = args.output.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("cannot create {}", parent.display()))?;
    }

    let mut writer = WriterBuilder::new()
        .has_headers(true)
        .from_path(&args.output)
        .with_context(|| format!("cannot write {}", args.output.display()))?;

    let mut rows = 0;
    let mut duplicates = 0;

    for i in 0..args.orders {
        let order = generate_order(&args, &mut rng);
        writer.serialize(&order)?;
        rows += 1;

        // same order key, another box scan
        if rng.gen::<f64>() < args.duplicate_rate {
            let mut dup = order.clone();
            dup.box_cnt = rng.gen_range(1..=3);
            writer.serialize(&dup)?;
            rows += 1;
            duplicates += 1;
        }

        if (i + 1) % 10000 == 0 {
            println!("   Generated {}/{} orders...", i + 1, args.orders);
        }
    }

    writer.flush()?;

    println!("Generation complete");
    println!("{}", "━".repeat(60));
    println!("Orders:          {:>8}", args.orders);
    println!("Duplicate rows:  {:>8}", duplicates);
    println!("Total rows:      {:>8}", rows);
    println!("Output file:     {}", args.output.display());

    Ok(())
}
