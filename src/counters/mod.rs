// Counter reconciliation for interval-model cycle accounting
//
// Raw simulator counters overlap: critical-path, functional-unit and
// dispatch-width counters all carve cycles out of `Base`. This module
// classifies raw counters by role, moves each claimed share to its own
// category exactly once, and books the unexplained remainder as `Imbalance`.

mod category_map;
mod classify;
mod reconcile;
mod tables;

pub use category_map::CategoryMap;
pub use classify::{classify, classify_run, ClassifiedCounter, CounterRole};
pub use reconcile::{CounterReconciler, Reconciliation, TimeBasis};
pub use tables::{
    categories, FunctionalUnit, ReconcileTables, CRITICAL_PATH_PREFIX, DETAILED_BASE_PREFIX,
    FU_DETAIL_PREFIX, PER_CYCLE_MARKER,
};
