//! CSV-based fee schedule loader
//!
//! Reads `month_threshold,monthly_fee` rows into a [`FeeSchedule`]. An empty
//! threshold charges the fee through the whole horizon.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use log::{debug, warn};
use serde::Deserialize;

use super::fees::{FeeEntry, FeeSchedule};
use crate::error::Result;

/// Raw CSV row of a fee schedule file
#[derive(Debug, Deserialize)]
struct FeeRow {
    month_threshold: Option<u32>,
    monthly_fee: f64,
}

/// Load a fee schedule from a CSV file with a `month_threshold,monthly_fee` header
pub fn load_fee_schedule(path: &Path) -> Result<FeeSchedule> {
    let file = File::open(path)?;
    let schedule = load_fee_schedule_from_reader(file)?;
    debug!(
        "Loaded {} fee entries from {}",
        schedule.entries().len(),
        path.display()
    );
    Ok(schedule)
}

/// Load a fee schedule from any CSV source
pub fn load_fee_schedule_from_reader<R: Read>(reader: R) -> Result<FeeSchedule> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let mut schedule = FeeSchedule::empty();
    for result in reader.deserialize() {
        let row: FeeRow = result?;
        schedule.push(FeeEntry::from((row.month_threshold, row.monthly_fee)));
    }

    if schedule.is_empty() {
        warn!("Fee schedule CSV contained no rows; no absolute fees will be charged");
    }

    schedule.validate()?;
    Ok(schedule)
}
