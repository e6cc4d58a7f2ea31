//! Error types for dsm-eval operations.

use thiserror::Error;

/// Result type alias for dsm-eval operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while computing accuracy metrics.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Two grids that must share a shape do not.
    #[error("Shape mismatch ({what}): expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        /// Which pair of inputs disagreed.
        what: &'static str,
        /// Expected shape (rows, cols).
        expected: (usize, usize),
        /// Actual shape (rows, cols).
        actual: (usize, usize),
    },

    /// A grid with zero rows or zero columns was supplied.
    #[error("Grid has no cells ({rows}x{cols})")]
    EmptyGrid {
        /// Number of rows.
        rows: usize,
        /// Number of columns.
        cols: usize,
    },

    /// An elevation inside the overlap region is NaN or infinite.
    #[error("Non-finite elevation difference at row {row}, col {col}")]
    NonFiniteElevation {
        /// Row index.
        row: usize,
        /// Column index.
        col: usize,
    },

    /// Nearest-neighbor query against an index holding no test points.
    #[error("Nearest-neighbor query against an empty point set: test mask has no boundary points")]
    EmptyReferenceSet,

    /// The overlap of the two validity masks is empty.
    #[error("Overlap mask is entirely false ({cells} cells, no comparable region)")]
    DegenerateOverlap {
        /// Total number of grid cells.
        cells: usize,
    },

    /// Horizontal RMSE requested over zero distances.
    #[error("No matched distances to aggregate: reference mask has no boundary points")]
    EmptyDistances,

    /// A distance was negative or not finite.
    #[error("Invalid distance at index {index}: {value}")]
    InvalidDistance {
        /// Position in the distance sequence.
        index: usize,
        /// Offending value.
        value: f64,
    },

    /// Clip limit for the clipped error map is negative or not finite.
    #[error("Invalid clip limit {value}: expected a finite, non-negative value")]
    InvalidClipLimit {
        /// Offending value.
        value: f64,
    },

    /// Failed to parse a grid file.
    #[error("Grid parse error at line {line}: {reason}")]
    GridParse {
        /// Line number (1-based).
        line: usize,
        /// Reason for the failure.
        reason: String,
    },

    /// Error raised by a diagnostics sink.
    #[error("Diagnostics error: {0}")]
    Diagnostics(String),

    /// I/O error wrapper.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
