//! Scenario comparator: unwrapped vs wrapped investment
//!
//! Runs the growth engine once per scenario, taxes the unrealized gains left
//! at the horizon at each scenario's own rate, and derives the comparison
//! metrics. Scenario policies (fees, reorganizations, allowance) are plain
//! per-scenario parameters; nothing is special-cased for A or B apart from
//! reporting B's absolute fees as contract fees.

mod comparator;
mod breakeven;

pub use comparator::{compare, ComparisonInputs, ComparisonResult, ScenarioConfig};
pub use breakeven::{breakeven_unwrapped_rate, breakeven_wrapped_rate};
