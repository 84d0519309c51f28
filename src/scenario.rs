//! Scenario runner for batch comparisons and parameter sweeps
//!
//! Holds one base comparison and evaluates many variations of it. Every
//! variation is an independent pure computation, so batches run in parallel
//! and results come back in input order.

use log::info;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::comparison::{compare, ComparisonInputs, ComparisonResult};
use crate::config::ComparisonConfig;
use crate::error::Result;

/// One point of a one-axis sweep
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepPoint {
    /// Value of the swept parameter
    pub value: f64,
    pub result: ComparisonResult,
}

/// Differences over a grid of scenario A and scenario B gross rates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeatmapGrid {
    /// Column axis: scenario A gross rates
    pub a_rates: Vec<f64>,
    /// Row axis: scenario B gross rates
    pub b_rates: Vec<f64>,
    /// `differences[row][col]` for `b_rates[row]`, `a_rates[col]`
    pub differences: Vec<Vec<f64>>,
}

impl HeatmapGrid {
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.differences.get(row).and_then(|r| r.get(col)).copied()
    }

    /// Flatten into `(a_rate, b_rate, difference)` triples, row by row
    pub fn cells(&self) -> impl Iterator<Item = (f64, f64, f64)> + '_ {
        self.b_rates.iter().zip(&self.differences).flat_map(move |(&b, row)| {
            self.a_rates.iter().zip(row).map(move |(&a, &d)| (a, b, d))
        })
    }
}

/// Runs variations of a base comparison
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::from_config(&ComparisonConfig::default_reference());
/// let points = runner.vary_gross_rate(&linspace(3.0, 10.0, 5))?;
/// ```
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    base: ComparisonInputs,
}

impl ScenarioRunner {
    pub fn new(base: ComparisonInputs) -> Self {
        Self { base }
    }

    pub fn from_config(config: &ComparisonConfig) -> Self {
        Self::new(config.to_inputs())
    }

    /// Compare the base inputs
    pub fn run(&self) -> Result<ComparisonResult> {
        compare(&self.base)
    }

    /// Compare every input set in parallel; results keep input order
    pub fn run_batch(&self, inputs: &[ComparisonInputs]) -> Vec<Result<ComparisonResult>> {
        info!("Running {} comparisons", inputs.len());
        inputs.par_iter().map(compare).collect()
    }

    /// Set both scenarios' gross rate to each value
    pub fn vary_gross_rate(&self, rates: &[f64]) -> Result<Vec<SweepPoint>> {
        self.sweep(rates, |inputs, rate| {
            inputs.scenario_a.gross_annual_rate = rate;
            inputs.scenario_b.gross_annual_rate = rate;
        })
    }

    /// Vary the number of reorganizations of scenario A
    pub fn vary_reorg_events(&self, counts: &[u32]) -> Result<Vec<SweepPoint>> {
        let values: Vec<f64> = counts.iter().map(|&c| c as f64).collect();
        self.sweep(&values, |inputs, count| {
            inputs.scenario_a.reorg_event_count = count as u32;
        })
    }

    /// Vary the horizon; fixed-month fee thresholds stay put, horizon-bound
    /// fees follow the new horizon
    pub fn vary_horizon(&self, months: &[u32]) -> Result<Vec<SweepPoint>> {
        let values: Vec<f64> = months.iter().map(|&m| m as f64).collect();
        self.sweep(&values, |inputs, months| {
            inputs.horizon_months = months as u32;
        })
    }

    /// Vary the initial monthly contribution
    pub fn vary_contribution(&self, amounts: &[f64]) -> Result<Vec<SweepPoint>> {
        self.sweep(amounts, |inputs, amount| {
            inputs.monthly_contribution = amount;
        })
    }

    /// Difference for every pair of scenario A and scenario B gross rates
    pub fn interest_grid(&self, a_rates: &[f64], b_rates: &[f64]) -> Result<HeatmapGrid> {
        let cells: Vec<ComparisonInputs> = b_rates
            .iter()
            .flat_map(|&b| {
                a_rates.iter().map(move |&a| {
                    let mut inputs = self.base.clone();
                    inputs.scenario_a.gross_annual_rate = a;
                    inputs.scenario_b.gross_annual_rate = b;
                    inputs
                })
            })
            .collect();

        let results = self
            .run_batch(&cells)
            .into_iter()
            .map(|r| r.map(|c| c.difference))
            .collect::<Result<Vec<f64>>>()?;

        let differences = if a_rates.is_empty() {
            vec![Vec::new(); b_rates.len()]
        } else {
            results.chunks(a_rates.len()).map(<[f64]>::to_vec).collect()
        };

        Ok(HeatmapGrid {
            a_rates: a_rates.to_vec(),
            b_rates: b_rates.to_vec(),
            differences,
        })
    }

    pub fn base(&self) -> &ComparisonInputs {
        &self.base
    }

    pub fn base_mut(&mut self) -> &mut ComparisonInputs {
        &mut self.base
    }

    fn sweep<F>(&self, values: &[f64], apply: F) -> Result<Vec<SweepPoint>>
    where
        F: Fn(&mut ComparisonInputs, f64),
    {
        let variants: Vec<ComparisonInputs> = values
            .iter()
            .map(|&value| {
                let mut inputs = self.base.clone();
                apply(&mut inputs, value);
                inputs
            })
            .collect();

        values
            .iter()
            .zip(self.run_batch(&variants))
            .map(|(&value, result)| result.map(|result| SweepPoint { value, result }))
            .collect()
    }
}

/// `num` evenly spaced values from `start` to `stop`, both included
pub fn linspace(start: f64, stop: f64, num: usize) -> Vec<f64> {
    match num {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (num - 1) as f64;
            let mut values: Vec<f64> = (0..num).map(|i| start + i as f64 * step).collect();
            values[num - 1] = stop;
            values
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn runner() -> ScenarioRunner {
        ScenarioRunner::from_config(&ComparisonConfig::default_reference())
    }

    #[test]
    fn test_linspace() {
        assert_eq!(linspace(3.0, 10.0, 8), vec![3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0]);
        assert_eq!(linspace(1.0, 2.0, 1), vec![1.0]);
        assert!(linspace(1.0, 2.0, 0).is_empty());
        assert_eq!(*linspace(0.1, 0.7, 7).last().unwrap(), 0.7);
    }

    #[test]
    fn test_batch_matches_single_runs() {
        let runner = runner();
        let mut other = runner.base().clone();
        other.horizon_months = 120;

        let results = runner.run_batch(&[runner.base().clone(), other.clone()]);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].as_ref().unwrap(), &runner.run().unwrap());
        assert_eq!(results[1].as_ref().unwrap(), &compare(&other).unwrap());
    }

    #[test]
    fn test_gross_rate_sweep_is_increasing() {
        let points = runner().vary_gross_rate(&linspace(3.0, 10.0, 5)).unwrap();
        assert_eq!(points.len(), 5);
        for pair in points.windows(2) {
            assert!(pair[1].result.final_worth_a > pair[0].result.final_worth_a);
            assert!(pair[1].result.final_worth_b > pair[0].result.final_worth_b);
        }
    }

    #[test]
    fn test_reorganizations_only_hurt_unwrapped() {
        let counts: Vec<u32> = (0..=30).collect();
        let points = runner().vary_reorg_events(&counts).unwrap();

        assert_eq!(points.len(), 31);
        let first = &points[0].result;
        for point in &points[1..] {
            assert!(point.result.final_worth_a < first.final_worth_a);
            assert_eq!(point.result.final_worth_b, first.final_worth_b);
        }
    }

    #[test]
    fn test_horizon_and_contribution_sweeps() {
        let runner = runner();
        let by_horizon = runner.vary_horizon(&[360, 420, 480]).unwrap();
        assert_eq!(by_horizon[1].value, 420.0);
        assert!(by_horizon[2].result.final_worth_a > by_horizon[0].result.final_worth_a);
        // Administration fee runs until each variant's own horizon
        assert_relative_eq!(
            by_horizon[2].result.total_contract_fees,
            61.0 * 28.88 + 480.0 * 17.86,
            max_relative = 1e-10
        );

        let by_amount = runner.vary_contribution(&[100.0, 200.0]).unwrap();
        // No absolute fees in A, so worth scales linearly with contribution
        assert_relative_eq!(
            by_amount[1].result.final_worth_a,
            2.0 * by_amount[0].result.final_worth_a,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_interest_grid_layout() {
        let a_rates = linspace(3.0, 10.0, 4);
        let b_rates = linspace(3.0, 10.0, 3);
        let grid = runner().interest_grid(&a_rates, &b_rates).unwrap();

        assert_eq!(grid.differences.len(), 3);
        assert!(grid.differences.iter().all(|row| row.len() == 4));
        assert_eq!(grid.cells().count(), 12);

        // Higher A rate widens the gap, higher B rate narrows it
        assert!(grid.get(0, 3).unwrap() > grid.get(0, 0).unwrap());
        assert!(grid.get(2, 0).unwrap() < grid.get(0, 0).unwrap());

        let mut inputs = runner().base().clone();
        inputs.scenario_a.gross_annual_rate = a_rates[1];
        inputs.scenario_b.gross_annual_rate = b_rates[2];
        assert_eq!(grid.get(2, 1).unwrap(), compare(&inputs).unwrap().difference);
    }

    #[test]
    fn test_sweep_surfaces_errors() {
        let err = runner().vary_contribution(&[100.0, -1.0]).unwrap_err();
        assert!(matches!(
            err,
            crate::error::SimulationError::InvalidParameter { .. }
        ));
    }
}
