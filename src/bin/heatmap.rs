//! Compute the difference grid over unwrapped/wrapped gross rates
//!
//! Writes one CSV row per grid cell and prints the break-even wrapped rate
//! for each unwrapped rate (the zero contour of the grid).
//!
//! Usage: cargo run --release --bin heatmap -- --from 3 --to 10 --steps 50

use anyhow::{Context, Result};
use clap::Parser;
use investment_compare::comparison::breakeven_wrapped_rate;
use investment_compare::config::ConfigArgs;
use investment_compare::scenario::{linspace, ScenarioRunner};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Debug, Parser)]
#[command(name = "heatmap", about = "Difference grid over unwrapped and wrapped gross rates")]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,

    /// Lowest gross rate on both axes (percent)
    #[arg(long, default_value_t = 3.0, allow_hyphen_values = true)]
    from: f64,

    /// Highest gross rate on both axes (percent)
    #[arg(long, default_value_t = 10.0, allow_hyphen_values = true)]
    to: f64,

    /// Grid points per axis
    #[arg(long, default_value_t = 50)]
    steps: usize,

    /// Output CSV path
    #[arg(long, default_value = "heatmap_output.csv")]
    output: PathBuf,
}

#[derive(Debug, Serialize)]
struct CellRow {
    unwrapped_rate: f64,
    wrapped_rate: f64,
    difference: f64,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let start = Instant::now();

    let config = cli.config.resolve().context("failed to load configuration")?;
    let runner = ScenarioRunner::from_config(&config);

    let rates = linspace(cli.from, cli.to, cli.steps);
    let grid = runner.interest_grid(&rates, &rates)?;

    let mut writer = csv::Writer::from_path(&cli.output)
        .with_context(|| format!("unable to create {}", cli.output.display()))?;
    for (unwrapped_rate, wrapped_rate, difference) in grid.cells() {
        writer.serialize(CellRow {
            unwrapped_rate,
            wrapped_rate,
            difference,
        })?;
    }
    writer.flush()?;

    println!(
        "{}x{} grid written to {} in {:?}",
        grid.b_rates.len(),
        grid.a_rates.len(),
        cli.output.display(),
        start.elapsed()
    );

    println!("\nBreak-even wrapped gross rate:");
    println!("{:>12} {:>12}", "Unwrapped", "Wrapped");
    for &rate in rates.iter().step_by((rates.len() / 10).max(1)) {
        let mut inputs = runner.base().clone();
        inputs.scenario_a.gross_annual_rate = rate;
        match breakeven_wrapped_rate(&inputs, cli.from, cli.to)? {
            Some(wrapped) => println!("{:>11.2}% {:>11.4}%", rate, wrapped),
            None => println!("{:>11.2}% {:>12}", rate, "outside grid"),
        }
    }

    Ok(())
}
