// Options for a stack computation
//
// Loadable from TOML; command-line flags override the file's values.

use crate::aggregate::MergeOptions;
use crate::error::ConfigError;
use crate::tree::{MemoryGranularity, SyncGranularity, TreeVariant};
use crate::view::ViewMode;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Options selecting the tree, the view and the cores of a stack
///
/// # Example
/// ```
/// use cyclestack::config::StackOptions;
///
/// let options = StackOptions::default();
/// assert_eq!(options.min_compute_fraction, Some(0.5));
/// assert!(options.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StackOptions {
    /// Numeric space of the projected series
    pub view: ViewMode,

    /// Rewrite the tree into the compute / communicate / synchronize groups
    pub simplified: bool,

    pub memory: MemoryGranularity,

    pub sync: SyncGranularity,

    /// Fold below-threshold categories into remainders
    ///
    /// Default: true
    pub collapse: bool,

    /// Cores to report, every core when unset
    pub cores: Option<Vec<usize>>,

    /// Cores computing less than this share of the time are left out of the
    /// summary row. Unset or non-positive disables the filter.
    ///
    /// Default: 0.5
    pub min_compute_fraction: Option<f64>,

    /// Average the selected cores into one synthetic core
    pub aggregate: bool,
}

impl Default for StackOptions {
    fn default() -> Self {
        Self {
            view: ViewMode::default(),
            simplified: false,
            memory: MemoryGranularity::default(),
            sync: SyncGranularity::default(),
            collapse: true,
            cores: None,
            min_compute_fraction: Some(0.5),
            aggregate: false,
        }
    }
}

impl StackOptions {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(fraction) = self.min_compute_fraction {
            if !fraction.is_finite() || fraction > 1.0 {
                return Err(ConfigError::InvalidOption(format!(
                    "min_compute_fraction must be at most 1, got {}",
                    fraction
                )));
            }
        }

        if let Some(cores) = &self.cores {
            if cores.is_empty() {
                return Err(ConfigError::InvalidOption(
                    "core filter must name at least one core".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Reject core indices the run does not have
    pub fn validate_cores(&self, ncores: usize) -> Result<(), ConfigError> {
        match self.cores.iter().flatten().find(|&&core| core >= ncores) {
            Some(&core) => Err(ConfigError::CoreOutOfRange { core, ncores }),
            None => Ok(()),
        }
    }

    /// Selected cores in run order, duplicates removed
    pub fn selected_cores(&self, ncores: usize) -> Vec<usize> {
        match &self.cores {
            Some(cores) => (0..ncores).filter(|core| cores.contains(core)).collect(),
            None => (0..ncores).collect(),
        }
    }

    pub fn tree_variant(&self) -> TreeVariant {
        TreeVariant {
            simplified: self.simplified,
            memory: self.memory,
            sync: self.sync,
        }
    }

    pub fn merge_options(&self) -> MergeOptions {
        MergeOptions {
            collapse: self.collapse,
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let options: StackOptions =
            toml::from_str(content).context("Failed to parse TOML stack options")?;
        options.validate()?;
        Ok(options)
    }

    /// Load options from a TOML file
    pub fn from_toml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).with_context(|| {
            format!("Failed to read options file: {}", path.as_ref().display())
        })?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid options file: {}", path.as_ref().display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options_validate() {
        let options = StackOptions::default();
        assert!(options.validate().is_ok());
        assert_eq!(options.view, ViewMode::Time);
        assert!(options.collapse);
        assert_eq!(options.merge_options(), MergeOptions { collapse: true });
        assert_eq!(options.tree_variant(), TreeVariant::default());
    }

    #[test]
    fn test_min_compute_fraction_above_one_is_rejected() {
        let options = StackOptions {
            min_compute_fraction: Some(1.5),
            ..Default::default()
        };
        assert!(matches!(
            options.validate(),
            Err(ConfigError::InvalidOption(_))
        ));

        let disabled = StackOptions {
            min_compute_fraction: Some(-1.0),
            ..Default::default()
        };
        assert!(disabled.validate().is_ok());
    }

    #[test]
    fn test_empty_core_filter_is_rejected() {
        let options = StackOptions {
            cores: Some(Vec::new()),
            ..Default::default()
        };
        assert!(options.validate().is_err());
    }

    #[test]
    fn test_core_selection() {
        let options = StackOptions {
            cores: Some(vec![3, 1, 1]),
            ..Default::default()
        };
        assert_eq!(options.selected_cores(4), vec![1, 3]);
        assert!(options.validate_cores(4).is_ok());
        assert_eq!(
            options.validate_cores(2),
            Err(ConfigError::CoreOutOfRange { core: 3, ncores: 2 })
        );
        assert_eq!(StackOptions::default().selected_cores(3), vec![0, 1, 2]);
    }

    #[test]
    fn test_options_from_toml() {
        let options = StackOptions::from_toml_str(
            r#"
view = "cpi"
simplified = true
memory = "with-neighbors"
sync = "flat"
cores = [0, 2]
aggregate = true
"#,
        )
        .unwrap();

        assert_eq!(options.view, ViewMode::Cpi);
        assert!(options.simplified);
        assert_eq!(options.memory, MemoryGranularity::WithNeighbors);
        assert_eq!(options.sync, SyncGranularity::Flat);
        assert_eq!(options.cores, Some(vec![0, 2]));
        assert!(options.aggregate);
        // unspecified fields keep their defaults
        assert!(options.collapse);
        assert_eq!(options.min_compute_fraction, Some(0.5));
    }

    #[test]
    fn test_options_from_toml_rejects_unknown_and_invalid() {
        assert!(StackOptions::from_toml_str("colapse = false").is_err());
        let err = StackOptions::from_toml_str("min_compute_fraction = 2.0").unwrap_err();
        assert!(format!("{:#}", err).contains("min_compute_fraction"));
    }
}
