//! Evaluation pipeline and report generation.
//!
//! - [`session::EvalSession`]: runs both metrics over a reference/test pair
//! - [`session::EvalConfig`]: denominator policy, boundary handling, overlap strictness
//! - [`diagnostics`]: optional sink for intermediate grids and point sets
//! - [`report`]: JSON and CSV reports

pub mod diagnostics;
pub mod report;
pub mod session;

pub use diagnostics::{DiagnosticSink, Plot, PlotData};
pub use report::{AccuracyReport, write_csv_summary};
pub use session::{EvalConfig, EvalConfigBuilder, EvalSession, Evaluation, Warning, evaluate};
