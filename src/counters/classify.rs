// Classification of raw counter names into typed roles
//
// Every raw counter is classified exactly once; reconciliation passes match on
// `CounterRole` instead of re-inspecting names.

use crate::counters::tables::{
    CRITICAL_PATH_PREFIX, DETAILED_BASE_PREFIX, FU_DETAIL_PREFIX, PER_CYCLE_MARKER,
};
use crate::run::{stat_names, Run};

/// Role of one raw counter in cycle accounting
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CounterRole<'a> {
    /// Per-cycle-stat counter contributing directly to `category`
    PerCycle { category: &'a str },

    /// Critical-path contribution, mapped through the critical-path table
    CriticalPath,

    /// Coarse detailed-base counter carrying cycles otherwise in `Base`
    DetailedBase {
        functional_unit: bool,
        dispatch_width: bool,
        dispatch_rate: bool,
    },

    /// Per-port functional-unit counter listing the units it covers
    FunctionalUnitDetail { units: Vec<&'a str> },

    /// Not a cycle-accounting counter
    Other,
}

/// A raw counter paired with its role
#[derive(Debug, Clone)]
pub struct ClassifiedCounter<'a> {
    pub name: &'a str,
    pub values: &'a [f64],
    pub role: CounterRole<'a>,
}

impl ClassifiedCounter<'_> {
    /// Value for one core; short vectors read as 0
    pub fn value(&self, core: usize) -> f64 {
        self.values.get(core).copied().unwrap_or(0.0)
    }
}

/// Classify one raw counter name
pub fn classify(name: &str) -> CounterRole<'_> {
    if let Some(labels) = name.strip_prefix(FU_DETAIL_PREFIX) {
        let units = labels
            .rsplit('-')
            .next()
            .unwrap_or(labels)
            .split('+')
            .filter(|unit| !unit.is_empty())
            .collect();
        return CounterRole::FunctionalUnitDetail { units };
    }

    if let Some(labels) = name.strip_prefix(DETAILED_BASE_PREFIX) {
        return CounterRole::DetailedBase {
            functional_unit: labels.contains("FunctionalUnit"),
            dispatch_width: labels.contains("DispatchWidth"),
            dispatch_rate: labels.contains("DispatchRate"),
        };
    }

    if name.starts_with(CRITICAL_PATH_PREFIX) {
        return CounterRole::CriticalPath;
    }

    if name == stat_names::CPI_FASTFORWARD_TIME {
        return CounterRole::Other;
    }

    match name.split(PER_CYCLE_MARKER).nth(1) {
        Some(category) if !category.is_empty() => CounterRole::PerCycle { category },
        _ => CounterRole::Other,
    }
}

/// Classify every counter of a run, in counter name order
pub fn classify_run(run: &Run) -> Vec<ClassifiedCounter<'_>> {
    run.counters()
        .map(|(name, values)| ClassifiedCounter {
            name,
            values,
            role: classify(name),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_per_cycle() {
        assert_eq!(
            classify("performance_model.cpiBase"),
            CounterRole::PerCycle { category: "Base" }
        );
        assert_eq!(
            classify("performance_model.cpiDataCachedram-local"),
            CounterRole::PerCycle {
                category: "DataCachedram-local"
            }
        );
    }

    #[test]
    fn test_fastforward_time_is_not_a_category() {
        assert_eq!(
            classify("performance_model.cpiFastforwardTime"),
            CounterRole::Other
        );
    }

    #[test]
    fn test_classify_critical_path() {
        assert_eq!(
            classify("interval_timer.cpContr_port05"),
            CounterRole::CriticalPath
        );
    }

    #[test]
    fn test_classify_detailed_base() {
        assert_eq!(
            classify("interval_timer.detailed-cpiBase-FunctionalUnit-Load"),
            CounterRole::DetailedBase {
                functional_unit: true,
                dispatch_width: false,
                dispatch_rate: false,
            }
        );
        assert_eq!(
            classify("interval_timer.detailed-cpiBase-DispatchWidth"),
            CounterRole::DetailedBase {
                functional_unit: false,
                dispatch_width: true,
                dispatch_rate: false,
            }
        );
    }

    #[test]
    fn test_classify_functional_unit_detail() {
        assert_eq!(
            classify("interval_timer.detailed-cpiBaseFunctionalUnit-Load+Store"),
            CounterRole::FunctionalUnitDetail {
                units: vec!["Load", "Store"]
            }
        );
        assert_eq!(
            classify("interval_timer.detailed-cpiBaseFunctionalUnit-port2-Generic"),
            CounterRole::FunctionalUnitDetail {
                units: vec!["Generic"]
            }
        );
    }

    #[test]
    fn test_classify_other() {
        assert_eq!(
            classify("performance_model.instruction_count"),
            CounterRole::Other
        );
        assert_eq!(classify("performance_model.cpi"), CounterRole::Other);
    }
}
