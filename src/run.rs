//! Simulation run snapshot and results-document loader

use crate::error::{Result, StackError};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Names of the run-level statistics the reconciler reads
pub mod stat_names {
    pub const TOTAL_CORES: &str = "general/total_cores";
    pub const INSTRUCTION_COUNT: &str = "performance_model.instruction_count";
    pub const ELAPSED_TIME: &str = "performance_model.elapsed_time";
    pub const CYCLE_COUNT: &str = "performance_model.cycle_count";
    pub const IDLE_ELAPSED_TIME: &str = "performance_model.idle_elapsed_time";
    pub const FS_TO_CYCLES: &str = "fs_to_cycles_cores";
    pub const FASTFORWARDED_TIME: &str = "fastforward_performance_model.fastforwarded_time";
    pub const CPI_FASTFORWARD_TIME: &str = "performance_model.cpiFastforwardTime";
}

/// On-disk shape of a results document
///
/// # Example JSON
/// ```json
/// {
///   "config": { "general/total_cores": "2" },
///   "results": { "performance_model.cpiBase": [50, 40] }
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunDocument {
    #[serde(default)]
    pub config: BTreeMap<String, String>,
    #[serde(default)]
    pub results: BTreeMap<String, Vec<f64>>,
}

/// Immutable snapshot of one simulation run
#[derive(Debug, Clone)]
pub struct Run {
    ncores: usize,
    config: BTreeMap<String, String>,
    results: BTreeMap<String, Vec<f64>>,
}

impl Run {
    /// Build a run from a config map that must expose the core count
    pub fn new(
        config: BTreeMap<String, String>,
        results: BTreeMap<String, Vec<f64>>,
    ) -> Result<Self> {
        let raw = config.get(stat_names::TOTAL_CORES).ok_or_else(|| {
            StackError::IncompatibleRun(format!(
                "config is missing '{}'",
                stat_names::TOTAL_CORES
            ))
        })?;
        let ncores = raw.trim().parse::<usize>().map_err(|_| {
            StackError::IncompatibleRun(format!(
                "'{}' is not a core count: '{}'",
                stat_names::TOTAL_CORES,
                raw
            ))
        })?;
        if ncores == 0 {
            return Err(StackError::IncompatibleRun(format!(
                "'{}' must be at least 1",
                stat_names::TOTAL_CORES
            )));
        }

        Ok(Self {
            ncores,
            config,
            results,
        })
    }

    /// Build a run directly from counters, setting the core count in the config
    pub fn with_counters<K: Into<String>>(
        ncores: usize,
        counters: impl IntoIterator<Item = (K, Vec<f64>)>,
    ) -> Result<Self> {
        let mut config = BTreeMap::new();
        config.insert(stat_names::TOTAL_CORES.to_string(), ncores.to_string());
        let results = counters
            .into_iter()
            .map(|(name, values)| (name.into(), values))
            .collect();
        Self::new(config, results)
    }

    pub fn from_document(document: RunDocument) -> Result<Self> {
        Self::new(document.config, document.results)
    }

    /// Parse a results document from a JSON string
    pub fn from_json_str(content: &str) -> anyhow::Result<Self> {
        let document: RunDocument =
            serde_json::from_str(content).context("Failed to parse results document")?;
        Ok(Self::from_document(document)?)
    }

    /// Load a results document from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref()).with_context(|| {
            format!("Failed to read results file: {}", path.as_ref().display())
        })?;
        Self::from_json_str(&content)
            .with_context(|| format!("Invalid results file: {}", path.as_ref().display()))
    }

    pub fn ncores(&self) -> usize {
        self.ncores
    }

    pub fn config(&self) -> &BTreeMap<String, String> {
        &self.config
    }

    /// Raw per-core values of one counter, if the run carries it
    pub fn counter(&self, name: &str) -> Option<&[f64]> {
        self.results.get(name).map(Vec::as_slice)
    }

    /// All counters in name order
    pub fn counters(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.results
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    /// Per-core value of a counter; absent counters and short vectors read as 0
    pub fn value(&self, name: &str, core: usize) -> f64 {
        self.counter(name)
            .and_then(|values| values.get(core).copied())
            .unwrap_or(0.0)
    }

    /// A counter that must carry one value per core
    pub fn per_core(&self, name: &str) -> Option<Result<Vec<f64>>> {
        let values = self.counter(name)?;
        if values.len() < self.ncores {
            return Some(Err(StackError::IncompatibleRun(format!(
                "'{}' has {} values for {} cores",
                name,
                values.len(),
                self.ncores
            ))));
        }
        Some(Ok(values[..self.ncores].to_vec()))
    }

    /// Per-core instruction counts
    pub fn instructions(&self) -> Result<Vec<f64>> {
        self.per_core(stat_names::INSTRUCTION_COUNT)
            .unwrap_or_else(|| {
                Err(StackError::IncompatibleRun(format!(
                    "results are missing '{}'",
                    stat_names::INSTRUCTION_COUNT
                )))
            })
    }
}
