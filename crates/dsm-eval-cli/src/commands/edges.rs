//! Boundary extraction command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use dsm_eval::edges::{edge_mask_with, mask_points};
use dsm_eval::import::{read_mask_csv, write_mask_csv};
use dsm_eval::raster::count_valid;

use super::boundary_mode;

pub fn run(mask: PathBuf, output: Option<PathBuf>, outside_invalid: bool, verbose: bool) -> Result<()> {
    if verbose {
        eprintln!("Loading mask from: {}", mask.display());
    }

    let valid = read_mask_csv(&mask)
        .with_context(|| format!("Failed to read mask from {}", mask.display()))?;
    let edges = edge_mask_with(&valid, boundary_mode(outside_invalid));

    println!(
        "{}x{} mask: {} valid cells, {} boundary cells",
        valid.height(),
        valid.width(),
        count_valid(&valid),
        mask_points(&edges).len()
    );

    match output {
        Some(output_path) => {
            write_mask_csv(&edges, &output_path)
                .with_context(|| format!("Failed to write to {}", output_path.display()))?;
            println!("Saved to: {}", output_path.display());
        }
        None => {
            for row in edges.rows() {
                let line: String = row.iter().map(|&e| if e { '#' } else { '.' }).collect();
                println!("{line}");
            }
        }
    }

    Ok(())
}
