//! Draw simulation
//!
//! Runs a selector many times and compares how often each entry was picked
//! against its configured share.

use crate::error::{BalancerError, BalancerResult};
use crate::selector::WeightedSelector;
use serde::Serialize;

/// Outcome of [`simulate`]
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub draws: u64,
    pub entries: Vec<EntryReport>,
}

/// Per-entry line of a [`SimulationReport`]
#[derive(Debug, Clone, Serialize)]
pub struct EntryReport {
    pub name: String,
    pub probability: i32,
    pub lower_bound: i32,
    pub upper_bound: i32,
    pub hits: u64,
    pub observed_percentage: f64,
}

impl EntryReport {
    /// Observed minus configured share, in percentage points
    pub fn deviation(&self) -> f64 {
        self.observed_percentage - f64::from(self.probability)
    }
}

impl SimulationReport {
    /// Largest absolute deviation across all entries
    pub fn max_deviation(&self) -> f64 {
        self.entries
            .iter()
            .map(|e| e.deviation().abs())
            .fold(0.0, f64::max)
    }
}

/// Call `balance()` `draws` times and tally the picks
///
/// Entries without a name are reported as `#<index>`. Selection counters the
/// selector already holds are not reset; the tally only covers this run.
///
/// # Errors
///
/// Returns `BalancerError::InvalidArgument` when `draws` is 0, and whatever
/// `balance()` returns on the first failing draw.
pub fn simulate<T>(
    selector: &WeightedSelector<T>,
    draws: u64,
) -> BalancerResult<SimulationReport> {
    if draws == 0 {
        return Err(BalancerError::InvalidArgument(
            "draws must be greater than 0".to_string(),
        ));
    }

    let before = selector.selection_counts();
    for _ in 0..draws {
        selector.balance()?;
    }
    let after = selector.selection_counts();

    let entries = selector
        .entries()
        .zip(before.iter().zip(after.iter()))
        .enumerate()
        .map(|(index, ((entry, allocation), (start, end)))| {
            let hits = end - start;
            EntryReport {
                name: entry
                    .name()
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("#{}", index)),
                probability: entry.probability(),
                lower_bound: allocation.lower_bound(),
                upper_bound: allocation.upper_bound(),
                hits,
                observed_percentage: hits as f64 / draws as f64 * 100.0,
            }
        })
        .collect();

    tracing::info!(draws = draws, "Simulation finished");

    Ok(SimulationReport { draws, entries })
}
