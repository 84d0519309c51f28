//! Investment Compare CLI
//!
//! Compares an unwrapped investment against a wrapped contract and prints
//! the after-tax outcome of both.

use anyhow::{Context, Result};
use clap::Parser;
use investment_compare::comparison::{breakeven_wrapped_rate, compare};
use investment_compare::config::ConfigArgs;
use investment_compare::projection::{GrowthEngine, Projection};

#[derive(Debug, Parser)]
#[command(name = "investment-compare", version, about = "Compare an unwrapped investment with a wrapped contract")]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,

    /// Also search the wrapped gross rate at which both end equal
    #[arg(long)]
    breakeven: bool,

    /// Print year-end balances of both scenarios
    #[arg(long)]
    yearly: bool,

    /// Print the comparison as JSON instead of text
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = cli.config.resolve().context("failed to load configuration")?;
    let inputs = config.to_inputs();
    let result = compare(&inputs).context("comparison failed")?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!("Investment Compare v{}", env!("CARGO_PKG_VERSION"));
    println!("==========================\n");
    println!(
        "Horizon: {} years {} months, contribution {:.2}/month (+{}%/year), rate model {:?}",
        config.horizon_months / 12,
        config.horizon_months % 12,
        config.monthly_contribution,
        config.contribution_growth_rate,
        config.rate_model,
    );
    println!(
        "  Unwrapped: {:.2}% gross - {:.2}% fees = {:.2}% net, tax {}%",
        inputs.scenario_a.gross_annual_rate,
        inputs.scenario_a.percentage_fee,
        inputs.scenario_a.effective_rate(),
        inputs.scenario_a.final_tax_rate,
    );
    println!(
        "  Wrapped:   {:.2}% gross - {:.2}% fees = {:.2}% net, tax {}%",
        inputs.scenario_b.gross_annual_rate,
        inputs.scenario_b.percentage_fee,
        inputs.scenario_b.effective_rate(),
        inputs.scenario_b.final_tax_rate,
    );
    println!();

    println!("Without contract: {:>14.0}", result.final_worth_a);
    println!("With contract:    {:>14.0}", result.final_worth_b);
    println!(
        "Difference:       {:>14.0}  ({:+.3}%)",
        result.difference,
        result.relative_advantage_pct()
    );
    println!("Contract fees (absolute, excluding percentage fees): {:.0}", result.total_contract_fees);

    if cli.breakeven {
        match breakeven_wrapped_rate(&inputs, -50.0, 50.0)? {
            Some(rate) => println!("\nBreak-even wrapped gross rate: {:.4}%", rate),
            None => println!("\nNo break-even wrapped gross rate between -50% and 50%"),
        }
    }

    if cli.yearly {
        let unwrapped = GrowthEngine::new(inputs.parameters_a())?
            .with_detailed_output(true)
            .project();
        let wrapped = GrowthEngine::new(inputs.parameters_b())?
            .with_detailed_output(true)
            .project();
        print_yearly(&unwrapped, &wrapped);
    }

    Ok(())
}

fn print_yearly(unwrapped: &Projection, wrapped: &Projection) {
    println!("\nYear-end balances:");
    println!(
        "{:>4} {:>14} {:>14} {:>14} {:>14} {:>12}",
        "Year", "A taxed", "A untaxed", "B taxed", "B untaxed", "A reorg tax"
    );
    println!("{}", "-".repeat(78));

    for (a, b) in unwrapped.years.iter().zip(&wrapped.years) {
        println!(
            "{:>4} {:>14.2} {:>14.2} {:>14.2} {:>14.2} {:>12.2}",
            a.year + 1,
            a.taxed_balance,
            a.untaxed_balance,
            b.taxed_balance,
            b.untaxed_balance,
            a.reorg_tax_paid,
        );
    }

    let summary = unwrapped.summary();
    println!("\nUnwrapped summary:");
    println!("  Contributions:       {:.2}", summary.total_contributions);
    println!("  Interest:            {:.2}", summary.total_interest);
    println!("  Reorganization tax:  {:.2}", summary.total_reorg_tax);
    println!("  Allowance harvested: {:.2}", summary.total_allowance_harvested);

    let summary = wrapped.summary();
    println!("Wrapped summary:");
    println!("  Contributions:       {:.2}", summary.total_contributions);
    println!("  Interest:            {:.2}", summary.total_interest);
    println!("  Absolute fees:       {:.2}", summary.total_fees);
}
