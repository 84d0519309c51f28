//! Sweep one parameter of the comparison and write the results as CSV
//!
//! Usage: cargo run --bin sweep -- --axis rate --from 3 --to 10 --steps 5

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use investment_compare::config::ConfigArgs;
use investment_compare::scenario::{linspace, ScenarioRunner, SweepPoint};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Axis {
    /// Gross rate of both scenarios (percent)
    Rate,
    /// Reorganizations of the unwrapped investment
    Reorg,
    /// Horizon in months
    Horizon,
    /// Initial monthly contribution
    Contribution,
}

impl Axis {
    /// Default range `(from, to, steps)` per axis
    fn default_range(self) -> (f64, f64, usize) {
        match self {
            Axis::Rate => (3.0, 10.0, 5),
            Axis::Reorg => (0.0, 30.0, 31),
            Axis::Horizon => (360.0, 600.0, 5),
            Axis::Contribution => (100.0, 1000.0, 5),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "sweep", about = "Sweep one comparison parameter and write CSV")]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,

    /// Parameter to vary
    #[arg(long, value_enum, default_value = "rate")]
    axis: Axis,

    /// First value (defaults depend on the axis)
    #[arg(long, allow_hyphen_values = true)]
    from: Option<f64>,

    /// Last value, included
    #[arg(long, allow_hyphen_values = true)]
    to: Option<f64>,

    /// Number of evenly spaced values
    #[arg(long)]
    steps: Option<usize>,

    /// Output CSV path
    #[arg(long, default_value = "sweep_output.csv")]
    output: PathBuf,
}

#[derive(Debug, Serialize)]
struct SweepRow {
    value: f64,
    worth_unwrapped: f64,
    worth_wrapped: f64,
    difference: f64,
    ratio: f64,
    contract_fees: f64,
}

impl From<&SweepPoint> for SweepRow {
    fn from(point: &SweepPoint) -> Self {
        Self {
            value: point.value,
            worth_unwrapped: point.result.final_worth_a,
            worth_wrapped: point.result.final_worth_b,
            difference: point.result.difference,
            ratio: point.result.ratio,
            contract_fees: point.result.total_contract_fees,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let start = Instant::now();

    let config = cli.config.resolve().context("failed to load configuration")?;
    let runner = ScenarioRunner::from_config(&config);

    let (default_from, default_to, default_steps) = cli.axis.default_range();
    let values = linspace(
        cli.from.unwrap_or(default_from),
        cli.to.unwrap_or(default_to),
        cli.steps.unwrap_or(default_steps),
    );
    if values.is_empty() {
        bail!("sweep needs at least one step");
    }

    let points = match cli.axis {
        Axis::Rate => runner.vary_gross_rate(&values)?,
        Axis::Reorg => runner.vary_reorg_events(&to_counts(&values)?)?,
        Axis::Horizon => runner.vary_horizon(&to_counts(&values)?)?,
        Axis::Contribution => runner.vary_contribution(&values)?,
    };

    let mut writer = csv::Writer::from_path(&cli.output)
        .with_context(|| format!("unable to create {}", cli.output.display()))?;
    for point in &points {
        writer.serialize(SweepRow::from(point))?;
    }
    writer.flush()?;

    println!(
        "{} points over {:?} written to {} in {:?}",
        points.len(),
        cli.axis,
        cli.output.display(),
        start.elapsed()
    );
    Ok(())
}

/// Whole, non-negative axis values (reorganization counts, months)
fn to_counts(values: &[f64]) -> Result<Vec<u32>> {
    values
        .iter()
        .map(|&v| {
            let rounded = v.round();
            if !rounded.is_finite() || rounded < 0.0 || rounded > u32::MAX as f64 {
                bail!("{} is not a valid count", v);
            }
            Ok(rounded as u32)
        })
        .collect()
}
