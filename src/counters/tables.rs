// Fixed lookup tables consumed by the counter reconciler
//
// The critical-path map and functional-unit groupings are plain values built
// once and handed to `CounterReconciler::new`, so alternative simulator
// versions can supply their own tables.

use std::collections::BTreeMap;
use std::fmt;

/// Raw counter names containing this marker are per-cycle-stat counters
pub const PER_CYCLE_MARKER: &str = ".cpi";

/// Prefix of critical-path contribution counters
pub const CRITICAL_PATH_PREFIX: &str = "interval_timer.cpContr_";

/// Prefix of coarse detailed-base counters (labels follow the prefix)
pub const DETAILED_BASE_PREFIX: &str = "interval_timer.detailed-cpiBase-";

/// Prefix of per-port functional-unit counters (`...-<Unit>[+<Unit>...]`)
pub const FU_DETAIL_PREFIX: &str = "interval_timer.detailed-cpiBaseFunctionalUnit-";

/// Reconciled category names the reconciler reads or writes
pub mod categories {
    pub const BASE: &str = "Base";
    pub const ISSUE: &str = "Issue";
    pub const IMBALANCE: &str = "Imbalance";
    pub const START_TIME: &str = "StartTime";
    pub const SYNC_FUTEX: &str = "SyncFutex";
    pub const SYNC_MUTEX: &str = "SyncPthreadMutex";
    pub const SYNC_COND: &str = "SyncPthreadCond";
    pub const SYNC_BARRIER: &str = "SyncPthreadBarrier";
    pub const SYNC_JOIN: &str = "SyncJoin";
    pub const SYNC_MEM_ACCESS: &str = "SyncMemAccess";
    pub const RECV: &str = "Recv";
}

/// Execution unit buckets for functional-unit contention
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FunctionalUnit {
    FpAddSub,
    FpMulDiv,
    Load,
    Store,
    Generic,
    Branch,
}

impl FunctionalUnit {
    pub const ALL: [FunctionalUnit; 6] = [
        FunctionalUnit::FpAddSub,
        FunctionalUnit::FpMulDiv,
        FunctionalUnit::Load,
        FunctionalUnit::Store,
        FunctionalUnit::Generic,
        FunctionalUnit::Branch,
    ];

    /// Label used by the simulator in per-port counter names
    pub fn label(self) -> &'static str {
        match self {
            FunctionalUnit::FpAddSub => "FpAddSub",
            FunctionalUnit::FpMulDiv => "FpMulDiv",
            FunctionalUnit::Load => "Load",
            FunctionalUnit::Store => "Store",
            FunctionalUnit::Generic => "Generic",
            FunctionalUnit::Branch => "Branch",
        }
    }

    /// Reconciled category receiving this unit's share of contention
    pub fn category(self) -> String {
        format!("FU_{}", self.label())
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|unit| unit.label() == label)
    }
}

impl fmt::Display for FunctionalUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Mapping tables for one simulator counter layout
#[derive(Debug, Clone, PartialEq)]
pub struct ReconcileTables {
    /// Critical-path counter name → target category
    pub critical_path: BTreeMap<String, String>,

    /// Divisor turning a critical-path counter into cycles
    pub critical_path_normalization: f64,
}

impl Default for ReconcileTables {
    fn default() -> Self {
        let critical_path = [
            // critical path components
            ("generic", "PathInt"),
            ("store", "PathStore"),
            ("load_other", "PathLoadX"),
            ("branch", "PathBranch"),
            ("load_l1", "DataCacheL1"),
            ("load_l2", "DataCacheL2"),
            ("load_l3", "DataCacheL3"),
            ("fp_addsub", "PathFP"),
            ("fp_muldiv", "PathFP"),
            // issue ports
            ("port0", "PathP0"),
            ("port1", "PathP1"),
            ("port2", "PathP2"),
            ("port34", "PathP34"),
            ("port5", "PathP5"),
            ("port05", "PathP05"),
            ("port015", "PathP015"),
        ]
        .into_iter()
        .map(|(suffix, target)| {
            (
                format!("{}{}", CRITICAL_PATH_PREFIX, suffix),
                target.to_string(),
            )
        })
        .collect();

        Self {
            critical_path,
            critical_path_normalization: 1e6,
        }
    }
}

impl ReconcileTables {
    /// Target category of a critical-path counter
    pub fn critical_path_target(&self, counter: &str) -> Option<&str> {
        self.critical_path.get(counter).map(String::as_str)
    }
}
