// Shared helpers for integration tests
//
// Builders for simulation runs with an identity cycle scale.

#![allow(dead_code)]

use cyclestack::run::{stat_names, Run};
use std::path::PathBuf;

pub const EPS: f64 = 1e-9;

/// Run with the given elapsed times, unit scale, zero start time and
/// `counters` as `performance_model.cpi<Name>` per-cycle stats
pub fn interval_run(instructions: &[f64], elapsed: &[f64], counters: &[(&str, Vec<f64>)]) -> Run {
    let ncores = elapsed.len();
    let mut results = vec![
        (stat_names::INSTRUCTION_COUNT.to_string(), instructions.to_vec()),
        (stat_names::ELAPSED_TIME.to_string(), elapsed.to_vec()),
        (stat_names::FS_TO_CYCLES.to_string(), vec![1.0; ncores]),
        (
            "performance_model.cpiStartTime".to_string(),
            vec![0.0; ncores],
        ),
    ];
    for (name, values) in counters {
        let name = if name.contains('.') {
            name.to_string()
        } else {
            format!("performance_model.cpi{}", name)
        };
        results.push((name, values.clone()));
    }
    Run::with_counters(ncores, results).expect("valid test run")
}

pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < EPS,
        "expected {}, got {}",
        expected,
        actual
    );
}
