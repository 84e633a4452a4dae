//! Numeric views of aggregated cycle values
//!
//! All views derive from the same cycle value: cycles per instruction,
//! fraction of core 0's elapsed cycles, or absolute seconds.

use crate::counters::{categories, CategoryMap, TimeBasis};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The simulator's native time unit is the femtosecond
pub const FEMTOSECONDS_PER_SECOND: f64 = 1e15;

/// Categories counted as not computing by the minimum-compute-fraction filter
pub const NON_COMPUTE_CATEGORIES: [&str; 6] = [
    categories::START_TIME,
    categories::IMBALANCE,
    categories::SYNC_COND,
    categories::SYNC_BARRIER,
    categories::SYNC_JOIN,
    categories::RECV,
];

/// Numeric space of a projected series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// Cycles per instruction
    Cpi,
    /// Fraction of elapsed time
    #[default]
    Time,
    /// Seconds
    AbsTime,
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ViewMode::Cpi => "cpi",
            ViewMode::Time => "time",
            ViewMode::AbsTime => "abstime",
        })
    }
}

/// `numerator / denominator`, 0 when the denominator is 0
fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// Arithmetic mean, 0 for no values
pub fn mean(values: impl IntoIterator<Item = f64>) -> f64 {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), value| (sum + value, count + 1));
    ratio(sum, count as f64)
}

/// Projects cycle values of one run into the numeric views
#[derive(Debug, Clone, Copy)]
pub struct ViewProjector<'a> {
    basis: &'a TimeBasis,
    instructions: &'a [f64],
}

impl<'a> ViewProjector<'a> {
    pub fn new(basis: &'a TimeBasis, instructions: &'a [f64]) -> Self {
        Self {
            basis,
            instructions,
        }
    }

    /// Cycles per instruction; an idle core projects to 0
    pub fn rate(&self, value: f64, core: usize) -> f64 {
        ratio(value, self.instructions.get(core).copied().unwrap_or(0.0))
    }

    /// Share of core 0's elapsed cycles
    pub fn fraction(&self, value: f64) -> f64 {
        ratio(value, self.basis.reference_cycles())
    }

    /// Seconds, fast-forwarded time included
    pub fn absolute_time(&self, value: f64) -> f64 {
        let scale = self.basis.scale.first().copied().unwrap_or(0.0);
        self.basis.fastforward_scale * ratio(value, scale) / FEMTOSECONDS_PER_SECOND
    }

    pub fn project(&self, mode: ViewMode, value: f64, core: usize) -> f64 {
        match mode {
            ViewMode::Cpi => self.rate(value, core),
            ViewMode::Time => self.fraction(value),
            ViewMode::AbsTime => self.absolute_time(value),
        }
    }
}

/// Per-core share of elapsed cycles spent computing
pub fn compute_fraction(categories: &CategoryMap, core: usize, max_cycles: f64) -> f64 {
    let idle: f64 = NON_COMPUTE_CATEGORIES
        .iter()
        .map(|category| categories.get(core, category))
        .sum();
    1.0 - ratio(idle, max_cycles)
}

/// Cores of `cores` that spend at least `min_fraction` of their time computing
///
/// `None` or a non-positive fraction keeps every core.
pub fn summary_cores(
    categories: &CategoryMap,
    cores: &[usize],
    max_cycles: f64,
    min_fraction: Option<f64>,
) -> Vec<usize> {
    match min_fraction {
        Some(min_fraction) if min_fraction > 0.0 => cores
            .iter()
            .copied()
            .filter(|&core| compute_fraction(categories, core, max_cycles) >= min_fraction)
            .collect(),
        _ => cores.to_vec(),
    }
}
