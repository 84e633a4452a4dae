//! cyclestack - cycle stacks from interval core model simulation results
//!
//! Reconciles overlapping per-core cycle counters into a disjoint set of
//! categories, rolls them up through a category tree with per-node
//! thresholds, and projects the result as cycles per instruction, fraction of
//! time, or absolute time.
//!
//! - [`counters`]: counter classification and reconciliation
//! - [`tree`]: category trees, built-in variants and the simplified rewrite
//! - [`aggregate`]: threshold-driven hierarchical aggregation
//! - [`view`]: numeric views and the minimum-compute-fraction filter
//! - [`pipeline`]: end-to-end stack computation
//! - [`report`], [`csv_output`]: text and CSV sinks

pub mod aggregate;
pub mod cli;
pub mod config;
pub mod counters;
pub mod csv_output;
pub mod error;
pub mod pipeline;
pub mod report;
pub mod run;
pub mod tree;
pub mod view;

pub use error::{ConfigError, Diagnostic, Result, StackError};
pub use pipeline::{compute, StackEngine, StackReport};
