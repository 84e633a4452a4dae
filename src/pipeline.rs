//! Stack computation from a loaded run to projected per-core series
//!
//! Reconciles the run's counters, picks the reported cores, optionally
//! averages them into one synthetic core, aggregates every core through the
//! category tree, and projects the result into the requested view.

use crate::aggregate::{merge_core, union_names, CoreStack};
use crate::config::StackOptions;
use crate::counters::{CategoryMap, CounterReconciler, Reconciliation, TimeBasis};
use crate::error::{Diagnostic, Result};
use crate::run::Run;
use crate::tree::CategoryTree;
use crate::view::{mean, summary_cores, ViewMode, ViewProjector};

/// Stack of one reported core
#[derive(Debug, Clone, PartialEq)]
pub struct CoreSeries {
    /// Core index, 0 for the synthetic aggregate core
    pub core: usize,

    /// Aggregated entries in cycles
    pub stack: CoreStack,

    /// Projected values aligned to the report's names
    pub values: Vec<f64>,

    /// Projected total
    pub total: f64,
}

/// Result of one stack computation
#[derive(Debug, Clone)]
pub struct StackReport {
    pub view: ViewMode,

    /// Names emitted by any reported core, in tree order with `other` last
    pub names: Vec<String>,

    pub series: Vec<CoreSeries>,

    /// Cores the summary row averages over
    pub summary_cores: Vec<usize>,

    /// Whether `series` holds a single synthetic mean core
    pub aggregated: bool,

    pub basis: TimeBasis,

    /// Instruction counts indexed by core
    pub instructions: Vec<f64>,

    pub diagnostics: Vec<Diagnostic>,
}

impl StackReport {
    pub fn core(&self, core: usize) -> Option<&CoreSeries> {
        self.series.iter().find(|series| series.core == core)
    }

    /// Projected value of `name` on `core`, 0 when the core did not emit it
    pub fn value(&self, core: usize, name: &str) -> Option<f64> {
        let index = self.names.iter().position(|entry| entry == name)?;
        self.core(core).map(|series| series.values[index])
    }

    /// Projected per-core totals in series order
    pub fn totals(&self) -> Vec<f64> {
        self.series.iter().map(|series| series.total).collect()
    }

    pub fn projector(&self) -> ViewProjector<'_> {
        ViewProjector::new(&self.basis, &self.instructions)
    }

    /// Per name, the mean projected value over the summary cores
    pub fn summary_row(&self) -> Vec<f64> {
        let summary: Vec<&CoreSeries> = self
            .summary_cores
            .iter()
            .filter_map(|&core| self.core(core))
            .collect();
        (0..self.names.len())
            .map(|index| mean(summary.iter().map(|series| series.values[index])))
            .collect()
    }
}

/// Builds stack reports with a fixed reconciler
#[derive(Debug, Clone, Default)]
pub struct StackEngine {
    reconciler: CounterReconciler,
}

impl StackEngine {
    pub fn new(reconciler: CounterReconciler) -> Self {
        Self { reconciler }
    }

    /// Compute the stack of `run` through `tree`
    ///
    /// # Errors
    /// `Config` for invalid options or core indices the run does not have,
    /// otherwise any error of [`CounterReconciler::reconcile`].
    pub fn compute(
        &self,
        run: &Run,
        tree: &CategoryTree,
        options: &StackOptions,
    ) -> Result<StackReport> {
        options.validate()?;
        options.validate_cores(run.ncores())?;

        let Reconciliation {
            categories,
            basis,
            instructions,
            mut diagnostics,
        } = self.reconciler.reconcile(run)?;
        diagnostics.extend(unused_keys(tree, &categories));

        let selected = options.selected_cores(run.ncores());
        let summary = summary_cores(
            &categories,
            &selected,
            basis.reference_cycles(),
            options.min_compute_fraction,
        );
        tracing::debug!(
            selected = selected.len(),
            summary = summary.len(),
            "selected cores"
        );

        let (categories, instructions, cores, summary) = if options.aggregate {
            if summary.is_empty() {
                tracing::warn!("no core passes the minimum compute fraction, aggregate is empty");
            }
            let mean_instructions = mean(
                summary
                    .iter()
                    .map(|&core| instructions.get(core).copied().unwrap_or(0.0)),
            );
            (
                categories.mean_over(&summary),
                vec![mean_instructions],
                vec![0],
                vec![0],
            )
        } else {
            (categories, instructions, selected, summary)
        };

        let merge_options = options.merge_options();
        let stacks: Vec<(usize, CoreStack)> = cores
            .iter()
            .map(|&core| (core, merge_core(tree, &categories, core, merge_options)))
            .collect();
        let names = union_names(tree, stacks.iter().map(|(_, stack)| stack));

        let projector = ViewProjector::new(&basis, &instructions);
        let series = stacks
            .into_iter()
            .map(|(core, stack)| {
                let values = stack
                    .aligned(&names)
                    .into_iter()
                    .map(|value| projector.project(options.view, value, core))
                    .collect();
                let total = projector.project(options.view, stack.total, core);
                CoreSeries {
                    core,
                    stack,
                    values,
                    total,
                }
            })
            .collect();

        Ok(StackReport {
            view: options.view,
            names,
            series,
            summary_cores: summary,
            aggregated: options.aggregate,
            basis,
            instructions,
            diagnostics,
        })
    }
}

/// Compute the stack of `run` through the built-in tree selected by `options`
pub fn compute(run: &Run, options: &StackOptions) -> Result<StackReport> {
    StackEngine::default().compute(run, &options.tree_variant().build(), options)
}

/// Categories present in the run that no tree node reads
fn unused_keys(tree: &CategoryTree, categories: &CategoryMap) -> Vec<Diagnostic> {
    let consumed = tree.keys();
    categories
        .keys()
        .into_iter()
        .filter(|key| !consumed.contains(key))
        .map(|key| {
            let diagnostic = Diagnostic::UnusedKey {
                key: key.to_string(),
            };
            tracing::warn!("{}", diagnostic);
            diagnostic
        })
        .collect()
}
