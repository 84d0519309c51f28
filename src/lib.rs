//! Investment Compare - monthly projection of recurring investments under fees and tax
//!
//! This library provides:
//! - A growth simulator with two balance buckets (taxed principal, untaxed gains)
//! - Absolute fee schedules, portfolio reorganizations and tax-free allowances
//! - Comparison of an unwrapped investment against a wrapped contract
//! - Parallel sweeps, interest-rate grids and break-even search

pub mod error;
pub mod config;
pub mod projection;
pub mod comparison;
pub mod scenario;

// Re-export commonly used types
pub use error::{Result, SimulationError};
pub use config::{ComparisonConfig, FeeEntry, FeeSchedule, FeeThreshold};
pub use projection::{simulate, GrowthEngine, RateModel, SimulationParameters, SimulationResult};
pub use comparison::{compare, ComparisonInputs, ComparisonResult, ScenarioConfig};
pub use scenario::{linspace, ScenarioRunner};
