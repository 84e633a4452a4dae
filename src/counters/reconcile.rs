// Counter reconciliation
//
// Turns overlapping raw counters into a disjoint per-core category map. Steps
// run in a fixed order; `Imbalance` is the residual computed last, so every
// core sums exactly to scale[core] × max(elapsed time).

use crate::counters::category_map::CategoryMap;
use crate::counters::classify::{classify_run, ClassifiedCounter, CounterRole};
use crate::counters::tables::{categories, FunctionalUnit, ReconcileTables, PER_CYCLE_MARKER};
use crate::error::{Diagnostic, Result, StackError};
use crate::run::{stat_names, Run};
use std::collections::{BTreeMap, BTreeSet};

/// Time basis shared by reconciliation and the numeric views
#[derive(Debug, Clone, PartialEq)]
pub struct TimeBasis {
    /// Per-core elapsed time, fast-forwarded prefix removed
    pub times: Vec<f64>,

    /// Per-core factor from time units to cycles
    pub scale: Vec<f64>,

    /// elapsed_time[0] / adjusted_time[0], 1 without fast-forwarding
    pub fastforward_scale: f64,
}

impl TimeBasis {
    pub fn max_time(&self) -> f64 {
        self.times.iter().copied().fold(0.0, f64::max)
    }

    /// Cycles a core's categories must sum to
    pub fn core_cycles(&self, core: usize) -> f64 {
        self.scale.get(core).copied().unwrap_or(0.0) * self.max_time()
    }

    /// Core 0's cycle budget, the normalizer of the time views
    pub fn reference_cycles(&self) -> f64 {
        self.core_cycles(0)
    }
}

/// Output of reconciling one run
#[derive(Debug, Clone)]
pub struct Reconciliation {
    pub categories: CategoryMap,
    pub basis: TimeBasis,
    pub instructions: Vec<f64>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Reconciles raw run counters using a fixed set of mapping tables
#[derive(Debug, Clone, Default)]
pub struct CounterReconciler {
    tables: ReconcileTables,
}

/// Functional-unit counter with its resolved units
struct UnitCounter<'a> {
    counter: &'a ClassifiedCounter<'a>,
    units: Vec<FunctionalUnit>,
}

impl CounterReconciler {
    pub fn new(tables: ReconcileTables) -> Self {
        Self { tables }
    }

    pub fn tables(&self) -> &ReconcileTables {
        &self.tables
    }

    /// Reconcile every core of `run`
    ///
    /// # Errors
    /// `IncompatibleRun` when no time basis or instruction count is present,
    /// `MissingModel` when the run has no per-cycle-stat counters.
    pub fn reconcile(&self, run: &Run) -> Result<Reconciliation> {
        let ncores = run.ncores();
        let instructions = run.instructions()?;
        let basis = time_basis(run)?;
        let counters = classify_run(run);
        let mut diagnostics = BTreeSet::new();

        let mut cores = per_cycle_categories(&counters, &basis, ncores);
        if cores.iter().all(BTreeMap::is_empty) {
            return Err(StackError::MissingModel {
                marker: PER_CYCLE_MARKER.to_string(),
            });
        }

        for counter in &counters {
            if counter.role == CounterRole::CriticalPath
                && self.tables.critical_path_target(counter.name).is_none()
            {
                diagnostics.insert(Diagnostic::UnmappedCounter {
                    counter: counter.name.to_string(),
                });
            }
        }

        let unit_counters = resolve_units(&counters, &mut diagnostics);
        let has_idle_time = run.counter(stat_names::IDLE_ELAPSED_TIME).is_some();

        for (core, data) in cores.iter_mut().enumerate() {
            correct_sync_mem_access(data);

            if !data.contains_key(categories::START_TIME) {
                if has_idle_time {
                    let idle = run.value(stat_names::IDLE_ELAPSED_TIME, core);
                    let start = reconstruct_start_time(data, basis.scale[core], idle);
                    data.insert(categories::START_TIME.to_string(), start);
                } else {
                    tracing::warn!(
                        core,
                        "no StartTime and no '{}', start time is left in Imbalance",
                        stat_names::IDLE_ELAPSED_TIME
                    );
                }
            }

            self.attribute_critical_path(run, core, data);
            attribute_functional_units(&counters, &unit_counters, core, data);
            attribute_dispatch_width(&counters, core, data);

            data.remove(categories::IMBALANCE);
            let accounted: f64 = data.values().sum();
            data.insert(
                categories::IMBALANCE.to_string(),
                basis.core_cycles(core) - accounted,
            );
        }

        let diagnostics: Vec<Diagnostic> = diagnostics.into_iter().collect();
        for diagnostic in &diagnostics {
            tracing::warn!("{}", diagnostic);
        }
        tracing::debug!(
            ncores,
            counters = counters.len(),
            fastforward_scale = basis.fastforward_scale,
            "reconciled run"
        );

        Ok(Reconciliation {
            categories: CategoryMap::from_cores(cores),
            basis,
            instructions,
            diagnostics,
        })
    }

    /// Move critical-path contributions out of `Base` into their target categories
    fn attribute_critical_path(&self, run: &Run, core: usize, data: &mut BTreeMap<String, f64>) {
        for (counter, target) in &self.tables.critical_path {
            if run.counter(counter).is_none() {
                continue;
            }
            let cycles = run.value(counter, core) / self.tables.critical_path_normalization;
            *data.entry(categories::BASE.to_string()).or_default() -= cycles;
            *data.entry(target.clone()).or_default() += cycles;
        }
    }
}

fn time_basis(run: &Run) -> Result<TimeBasis> {
    let ncores = run.ncores();
    let elapsed = run.per_core(stat_names::ELAPSED_TIME);
    let scale = run.per_core(stat_names::FS_TO_CYCLES);

    let (mut times, scale) = match (elapsed, scale) {
        (Some(times), Some(scale)) => (times?, scale?),
        _ => match run.per_core(stat_names::CYCLE_COUNT) {
            Some(cycles) => (cycles?, vec![1.0; ncores]),
            None => {
                return Err(StackError::IncompatibleRun(format!(
                    "results carry neither '{}' with '{}' nor '{}'",
                    stat_names::ELAPSED_TIME,
                    stat_names::FS_TO_CYCLES,
                    stat_names::CYCLE_COUNT
                )))
            }
        },
    };

    let mut fastforward_scale = 1.0;
    if let Some(skipped) = run.counter(stat_names::FASTFORWARDED_TIME) {
        let first = skipped.first().copied().unwrap_or(0.0);
        if first != 0.0 {
            let adjusted = times[0] - first;
            if adjusted != 0.0 {
                fastforward_scale = times[0] / adjusted;
            } else {
                tracing::warn!("core 0 was fast-forwarded for its whole run, fastforward scale set to 1");
            }
            for (core, time) in times.iter_mut().enumerate() {
                *time -= skipped.get(core).copied().unwrap_or(0.0);
            }
        }
    }

    Ok(TimeBasis {
        times,
        scale,
        fastforward_scale,
    })
}

fn per_cycle_categories(
    counters: &[ClassifiedCounter<'_>],
    basis: &TimeBasis,
    ncores: usize,
) -> Vec<BTreeMap<String, f64>> {
    let mut cores = vec![BTreeMap::new(); ncores];
    for counter in counters {
        if let CounterRole::PerCycle { category } = counter.role {
            for (core, data) in cores.iter_mut().enumerate() {
                *data.entry(category.to_string()).or_insert(0.0) +=
                    counter.value(core) * basis.scale[core];
            }
        }
    }
    cores
}

/// Zero `SyncMemAccess` when it is a bit-identical copy of `SyncPthreadBarrier`
///
/// Older interval-model versions copied the barrier counter into the memory
/// access counter.
fn correct_sync_mem_access(data: &mut BTreeMap<String, f64>) {
    let barrier = data.get(categories::SYNC_BARRIER).copied();
    if let (Some(mem_access), Some(barrier)) = (data.get_mut(categories::SYNC_MEM_ACCESS), barrier)
    {
        if mem_access.to_bits() == barrier.to_bits() {
            *mem_access = 0.0;
        }
    }
}

/// Start time of a core that did not report one
///
/// Uses the core's own cycle scale.
fn reconstruct_start_time(data: &BTreeMap<String, f64>, scale: f64, idle_time: f64) -> f64 {
    let get = |category: &str| data.get(category).copied().unwrap_or(0.0);
    scale * idle_time
        - get(categories::SYNC_FUTEX)
        - get(categories::SYNC_MUTEX)
        - get(categories::SYNC_COND)
        - get(categories::SYNC_BARRIER)
        - get(categories::RECV)
}

fn resolve_units<'a>(
    counters: &'a [ClassifiedCounter<'a>],
    diagnostics: &mut BTreeSet<Diagnostic>,
) -> Vec<UnitCounter<'a>> {
    let mut resolved = Vec::new();
    for counter in counters {
        if let CounterRole::FunctionalUnitDetail { units } = &counter.role {
            if let Some(unknown) = units
                .iter()
                .find(|unit| FunctionalUnit::from_label(unit).is_none())
            {
                diagnostics.insert(Diagnostic::UnknownFunctionalUnit {
                    counter: counter.name.to_string(),
                    unit: unknown.to_string(),
                });
                continue;
            }
            let units: Vec<FunctionalUnit> = units
                .iter()
                .filter_map(|unit| FunctionalUnit::from_label(unit))
                .collect();
            if units.is_empty() {
                diagnostics.insert(Diagnostic::UnmappedCounter {
                    counter: counter.name.to_string(),
                });
            } else {
                resolved.push(UnitCounter { counter, units });
            }
        }
    }
    resolved
}

/// Move functional-unit contention out of `Base` into the `FU_*` buckets
///
/// The coarse counters define the total; the per-port counters only define
/// how it splits across units.
fn attribute_functional_units(
    counters: &[ClassifiedCounter<'_>],
    unit_counters: &[UnitCounter<'_>],
    core: usize,
    data: &mut BTreeMap<String, f64>,
) {
    let coarse: f64 = counters
        .iter()
        .filter(|counter| {
            matches!(
                counter.role,
                CounterRole::DetailedBase {
                    functional_unit: true,
                    dispatch_rate: false,
                    ..
                }
            )
        })
        .map(|counter| counter.value(core))
        .sum();
    *data.entry(categories::BASE.to_string()).or_default() -= coarse;

    let mut buckets: BTreeMap<FunctionalUnit, f64> = FunctionalUnit::ALL
        .into_iter()
        .map(|unit| (unit, 0.0))
        .collect();
    for UnitCounter { counter, units } in unit_counters {
        let share = counter.value(core) / units.len() as f64;
        for unit in units {
            *buckets.entry(*unit).or_default() += share;
        }
    }

    let fine: f64 = buckets.values().sum();
    let rescale = if fine == 0.0 { 0.0 } else { coarse / fine };
    if fine == 0.0 && coarse != 0.0 {
        tracing::debug!(core, coarse, "no per-port FU counters, FU contention is left in Imbalance");
    }
    for (unit, value) in buckets {
        data.insert(unit.category(), rescale * value);
    }
}

/// Move dispatch-width stalls out of `Base` into `Issue`
fn attribute_dispatch_width(
    counters: &[ClassifiedCounter<'_>],
    core: usize,
    data: &mut BTreeMap<String, f64>,
) {
    let mut present = false;
    let mut cycles = 0.0;
    for counter in counters {
        if let CounterRole::DetailedBase {
            functional_unit: false,
            dispatch_width: true,
            dispatch_rate: false,
        } = counter.role
        {
            present = true;
            cycles += counter.value(core);
        }
    }

    if present {
        *data.entry(categories::BASE.to_string()).or_default() -= cycles;
        *data.entry(categories::ISSUE.to_string()).or_default() += cycles;
    }
}
