// End-to-end stack scenarios on small hand-computed runs

mod utils;

use cyclestack::aggregate::{merge_core, MergeOptions};
use cyclestack::config::StackOptions;
use cyclestack::counters::{categories, CounterReconciler};
use cyclestack::run::Run;
use cyclestack::tree::{CategoryNode, CategoryTree};
use cyclestack::view::{ViewMode, ViewProjector};
use cyclestack::{compute, Diagnostic, StackEngine, StackError};
use utils::{assert_close, fixture, interval_run};

fn scenario_a_run() -> Run {
    interval_run(
        &[100.0, 100.0],
        &[100.0, 120.0],
        &[("Base", vec![50.0, 40.0]), ("Issue", vec![10.0, 20.0])],
    )
}

// ============================================================================
// Scenario A: residual imbalance, fraction view, zero-threshold node
// ============================================================================

#[test]
fn test_scenario_a_imbalance_residual() {
    let result = CounterReconciler::default()
        .reconcile(&scenario_a_run())
        .unwrap();

    assert_close(result.categories.get(0, categories::IMBALANCE), 60.0);
    assert_close(result.categories.get(1, categories::IMBALANCE), 60.0);
    for core in 0..2 {
        assert_close(result.categories.total(core), 120.0);
    }

    let projector = ViewProjector::new(&result.basis, &result.instructions);
    assert_close(
        projector.fraction(result.categories.get(0, categories::IMBALANCE)),
        0.5,
    );
}

#[test]
fn test_scenario_a_zero_threshold_emits_both_children() {
    let result = CounterReconciler::default()
        .reconcile(&scenario_a_run())
        .unwrap();
    let tree = CategoryTree::new(vec![CategoryNode::node(
        "compute",
        0.0,
        vec![
            CategoryNode::leaf("base", 0.0, "Base"),
            CategoryNode::leaf("issue", 0.0, "Issue"),
        ],
    )])
    .unwrap();
    let stack = merge_core(&tree, &result.categories, 0, MergeOptions::default());

    assert_eq!(
        stack.names().collect::<Vec<_>>(),
        vec!["compute-base", "compute-issue"]
    );
    assert_close(stack.total, 60.0);
}

#[test]
fn test_scenario_a_full_pipeline() {
    let options = StackOptions {
        min_compute_fraction: None,
        ..Default::default()
    };
    let report = compute(&scenario_a_run(), &options).unwrap();

    assert_eq!(report.view, ViewMode::Time);
    // both cores sum to the whole elapsed time of core 0
    for total in report.totals() {
        assert_close(total, 1.0);
    }
    assert_close(report.value(0, "imbalance-end").unwrap(), 0.5);
    assert_close(report.value(1, "dispatch_width").unwrap(), 20.0 / 120.0);
    assert_eq!(report.names.last().map(String::as_str), Some("imbalance-end"));
}

// ============================================================================
// Scenario B: unmapped critical-path counter
// ============================================================================

#[test]
fn test_scenario_b_unmapped_critical_path_counter() {
    let run = interval_run(
        &[100.0, 100.0],
        &[100.0, 120.0],
        &[
            ("Base", vec![50.0, 40.0]),
            ("interval_timer.cpContr_mystery", vec![5e6, 5e6]),
        ],
    );
    let result = CounterReconciler::default().reconcile(&run).unwrap();

    assert_eq!(
        result.diagnostics,
        vec![Diagnostic::UnmappedCounter {
            counter: "interval_timer.cpContr_mystery".to_string()
        }]
    );
    assert_close(result.categories.get(0, categories::BASE), 50.0);
    assert_close(result.categories.get(1, categories::BASE), 40.0);

    let report = compute(&run, &StackOptions::default()).unwrap();
    assert!(report
        .diagnostics
        .iter()
        .any(|d| matches!(d, Diagnostic::UnmappedCounter { .. })));
}

#[test]
fn test_mapped_critical_path_counter_moves_out_of_base() {
    let run = interval_run(
        &[100.0, 100.0],
        &[100.0, 120.0],
        &[
            ("Base", vec![50.0, 40.0]),
            ("interval_timer.cpContr_load_l2", vec![20e6, 0.0]),
        ],
    );
    let result = CounterReconciler::default().reconcile(&run).unwrap();

    assert!(result.diagnostics.is_empty());
    assert_close(result.categories.get(0, categories::BASE), 30.0);
    assert_close(result.categories.get(0, "DataCacheL2"), 20.0);
    assert_close(result.categories.total(0), 120.0);
}

// ============================================================================
// Scenario C: aggregate mode
// ============================================================================

#[test]
fn test_scenario_c_aggregate_is_mean() {
    let run = interval_run(
        &[10.0, 30.0],
        &[100.0, 100.0],
        &[("Base", vec![4.0, 6.0])],
    );
    let options = StackOptions {
        aggregate: true,
        view: ViewMode::Cpi,
        min_compute_fraction: None,
        ..Default::default()
    };
    let tree = CategoryTree::new(vec![CategoryNode::leaf("base", 0.0, "Base")]).unwrap();
    let report = StackEngine::default().compute(&run, &tree, &options).unwrap();

    assert_eq!(report.series.len(), 1);
    assert_close(report.series[0].stack.get("base").unwrap(), 5.0);
    assert_close(report.instructions[0], 20.0);
    assert_close(report.value(0, "base").unwrap(), 0.25);
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_run_without_per_cycle_stats_is_missing_model() {
    let run = Run::with_counters(
        1,
        [
            ("performance_model.instruction_count", vec![1.0]),
            ("performance_model.cycle_count", vec![10.0]),
        ],
    )
    .unwrap();
    let err = compute(&run, &StackOptions::default()).unwrap_err();
    assert!(matches!(err, StackError::MissingModel { .. }));
}

#[test]
fn test_short_instruction_vector_is_incompatible() {
    let run = interval_run(&[1.0], &[100.0, 100.0], &[("Base", vec![1.0, 1.0])]);
    let err = compute(&run, &StackOptions::default()).unwrap_err();
    assert!(matches!(err, StackError::IncompatibleRun(_)));
}

// ============================================================================
// Results documents
// ============================================================================

#[test]
fn test_fixture_document_stack() {
    let run = Run::load(fixture("two_core_run.json")).unwrap();
    assert_eq!(run.ncores(), 2);

    let options = StackOptions {
        view: ViewMode::Cpi,
        ..Default::default()
    };
    let report = compute(&run, &options).unwrap();

    assert_eq!(
        report.names,
        vec!["base", "dispatch_width", "mem-l1d", "imbalance-end"]
    );
    assert_close(report.value(0, "base").unwrap(), 50.0 / 60.0);
    assert_close(report.value(0, "mem-l1d").unwrap(), 0.5);
    assert_close(report.value(1, "imbalance-end").unwrap(), 50.0 / 40.0);
    assert!(report.diagnostics.is_empty());
}

#[test]
fn test_simplified_fixture_stack() {
    let run = Run::load(fixture("two_core_run.json")).unwrap();
    let options = StackOptions {
        simplified: true,
        ..Default::default()
    };
    let report = compute(&run, &options).unwrap();

    assert_eq!(report.names, vec!["compute", "communicate", "synchronize"]);
    assert_close(report.value(0, "compute").unwrap(), 60.0 / 120.0);
    assert_close(report.value(0, "communicate").unwrap(), 30.0 / 120.0);
    assert_close(report.value(0, "synchronize").unwrap(), 30.0 / 120.0);
}
