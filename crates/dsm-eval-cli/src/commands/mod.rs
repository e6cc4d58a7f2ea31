//! Subcommand implementations.

pub mod diagnostics;
pub mod edges;
pub mod run;
pub mod summary;

use dsm_eval::BoundaryMode;

/// Boundary handling selected by the `--outside-invalid` flag.
pub fn boundary_mode(outside_invalid: bool) -> BoundaryMode {
    if outside_invalid {
        BoundaryMode::OutsideInvalid
    } else {
        BoundaryMode::Symmetric
    }
}
