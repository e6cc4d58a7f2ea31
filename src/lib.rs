//! # dsm-eval
//!
//! Relative accuracy metrics for Digital Surface Models.
//!
//! Given a reference and a test elevation raster on the same grid, each with
//! a validity mask, this library computes two scalars:
//!
//! - **Vertical RMSE**: root mean square of the elevation differences over
//!   the cells both models define.
//! - **Horizontal RMSE**: root mean square of the distances from each
//!   reference footprint boundary cell to the nearest test boundary cell.
//!
//! ## Quick Start
//!
//! ```
//! use dsm_eval::{BoundaryMode, EvalConfig, EvalSession};
//! use dsm_eval::raster::{Shape, filled_mask, raster_from_rows};
//!
//! let reference = raster_from_rows(vec![10.0; 16], 4, 4)?;
//! let test = raster_from_rows(vec![12.0; 16], 4, 4)?;
//! let mask = filled_mask(Shape::new(4, 4), true)?;
//!
//! let config = EvalConfig::builder()
//!     .boundary(BoundaryMode::OutsideInvalid)
//!     .build();
//! let evaluation = EvalSession::new(config).evaluate(&reference, &test, &mask, &mask)?;
//!
//! assert_eq!(evaluation.metrics().vertical_rmse(), 2.0);
//! assert_eq!(evaluation.metrics().horizontal_rmse(), Some(0.0));
//! # Ok::<(), dsm_eval::Error>(())
//! ```
//!
//! ## Modules
//!
//! - [`error`]: Error types for the library
//! - [`raster`]: Grid types, shape checks and mask intersection
//! - [`edges`]: Footprint boundary extraction
//! - [`spatial`]: Nearest-neighbor matching of boundary points
//! - [`metrics`]: Vertical and horizontal RMSE
//! - [`eval`]: Evaluation session, diagnostics and reports
//! - [`import`]: Plain-text grid ingestion and export
//! - [`stats`]: Descriptive statistics

pub mod edges;
pub mod error;
pub mod eval;
pub mod import;
pub mod metrics;
pub mod raster;
pub mod spatial;
pub mod stats;

// Re-export commonly used types
pub use edges::{BoundaryMode, edge_mask, edge_points};
pub use error::{Error, Result};
pub use eval::{
    diagnostics::{DiagnosticSink, Plot, PlotData},
    report::AccuracyReport,
    session::{EvalConfig, EvalSession, Evaluation, Warning, evaluate},
};
pub use metrics::{Denominator, MetricsResult, horizontal_rmse, vertical_error};
pub use raster::{GridPoint, Mask, Raster, Shape};
pub use spatial::{RTreeIndex, SpatialIndex, match_nearest};
pub use stats::Summary;
