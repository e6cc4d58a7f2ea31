//! Accuracy evaluation command.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dsm_eval::import::{read_mask_csv, read_raster_csv};
use dsm_eval::raster::mask_from_nodata;
use dsm_eval::{Denominator, EvalConfig, EvalSession, Mask, Raster};
use log::{info, warn};

use super::boundary_mode;
use super::diagnostics::CsvDiagnostics;

/// Arguments of the `run` subcommand.
pub struct RunArgs {
    pub reference: PathBuf,
    pub test: PathBuf,
    pub reference_mask: Option<PathBuf>,
    pub test_mask: Option<PathBuf>,
    pub nodata: Option<f64>,
    pub denominator: Denominator,
    pub outside_invalid: bool,
    pub strict_overlap: bool,
    pub require_boundary: bool,
    pub clip_limit: f64,
    pub diagnostics: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub name: Option<String>,
}

pub fn run(args: RunArgs, verbose: bool) -> Result<()> {
    if verbose {
        eprintln!("Reference: {}", args.reference.display());
        eprintln!("Test: {}", args.test.display());
    }

    let reference = load_raster(&args.reference)?;
    let test = load_raster(&args.test)?;
    let reference_mask = load_mask(args.reference_mask.as_deref(), &reference, args.nodata)?;
    let test_mask = load_mask(args.test_mask.as_deref(), &test, args.nodata)?;

    let config = EvalConfig::builder()
        .denominator(args.denominator)
        .boundary(boundary_mode(args.outside_invalid))
        .strict_overlap(args.strict_overlap)
        .require_boundary(args.require_boundary)
        .clip_limit(args.clip_limit)
        .build();
    let session = EvalSession::new(config.clone());

    let evaluation = match &args.diagnostics {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
            let mut sink = CsvDiagnostics::new(dir);
            let evaluation = session
                .evaluate_with_diagnostics(&reference, &test, &reference_mask, &test_mask, &mut sink)
                .context("Evaluation failed")?;
            info!("wrote {} diagnostic files to {}", sink.written().len(), dir.display());
            evaluation
        }
        None => session
            .evaluate(&reference, &test, &reference_mask, &test_mask)
            .context("Evaluation failed")?,
    };

    let metrics = evaluation.metrics();
    println!("Vertical RMSE:   {:.4}", metrics.vertical_rmse());
    match metrics.horizontal_rmse() {
        Some(hrmse) => println!("Horizontal RMSE: {:.4}", hrmse),
        None => println!("Horizontal RMSE: n/a (no boundary)"),
    }
    println!(
        "Overlap: {} of {} cells ({})",
        evaluation.vertical.overlap_cells, evaluation.vertical.grid_cells, config.denominator
    );
    println!(
        "Boundary points: {} reference, {} test",
        evaluation.reference_edges.len(),
        evaluation.test_edges.len()
    );
    if evaluation.is_low_confidence() {
        warn!("results are low confidence");
    }

    if let Some(output_path) = args.output {
        let name = args.name.unwrap_or_else(|| {
            args.test
                .file_stem()
                .map_or_else(|| "test".to_string(), |s| s.to_string_lossy().into_owned())
        });
        let report = evaluation.to_report(&name, &config);
        report
            .write_json(&output_path)
            .with_context(|| format!("Failed to write to {}", output_path.display()))?;
        println!("Saved to: {}", output_path.display());
    }

    Ok(())
}

fn load_raster(path: &Path) -> Result<Raster> {
    read_raster_csv(path).with_context(|| format!("Failed to read grid from {}", path.display()))
}

/// Explicit mask file, or validity derived from the elevations.
fn load_mask(path: Option<&Path>, raster: &Raster, nodata: Option<f64>) -> Result<Mask> {
    match path {
        Some(path) => read_mask_csv(path)
            .with_context(|| format!("Failed to read mask from {}", path.display())),
        None => Ok(mask_from_nodata(raster, nodata)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dsm_eval::AccuracyReport;
    use dsm_eval::import::write_raster_csv;
    use dsm_eval::raster::raster_from_rows;

    const NODATA: f64 = -9999.0;

    /// 6x6 grid: `value` inside, a one-cell nodata frame around it.
    fn framed_tile(path: &Path, value: f64) {
        let values: Vec<f64> = (0..36)
            .map(|i| {
                let (r, c) = (i / 6, i % 6);
                if (1..5).contains(&r) && (1..5).contains(&c) {
                    value
                } else {
                    NODATA
                }
            })
            .collect();
        write_raster_csv(&raster_from_rows(values, 6, 6).unwrap(), path).unwrap();
    }

    fn args(reference: PathBuf, test: PathBuf) -> RunArgs {
        RunArgs {
            reference,
            test,
            reference_mask: None,
            test_mask: None,
            nodata: Some(NODATA),
            denominator: Denominator::ValidCells,
            outside_invalid: false,
            strict_overlap: false,
            require_boundary: false,
            clip_limit: 5.0,
            diagnostics: None,
            output: None,
            name: None,
        }
    }

    #[test]
    fn test_run_writes_report_from_nodata_masks() {
        let dir = tempfile::tempdir().unwrap();
        let reference = dir.path().join("reference.csv");
        let test = dir.path().join("test.csv");
        framed_tile(&reference, 10.0);
        framed_tile(&test, 11.0);

        let output = dir.path().join("report.json");
        let mut run_args = args(reference, test);
        run_args.output = Some(output.clone());
        run(run_args, false).unwrap();

        let report = AccuracyReport::read_json(&output).unwrap();
        assert_eq!(report.name, "test");
        assert_eq!(report.overlap_cells, 16);
        assert_eq!(report.grid_cells, 36);
        assert_eq!(report.reference_edge_points, 12);
        assert!((report.metrics.vertical_rmse() - 1.0).abs() < 1e-12);
        assert_eq!(report.metrics.horizontal_rmse(), Some(0.0));
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_run_with_diagnostics_and_name() {
        let dir = tempfile::tempdir().unwrap();
        let reference = dir.path().join("reference.csv");
        framed_tile(&reference, 3.0);

        let diagnostics = dir.path().join("diag");
        let output = dir.path().join("report.json");
        let mut run_args = args(reference.clone(), reference);
        run_args.diagnostics = Some(diagnostics.clone());
        run_args.output = Some(output.clone());
        run_args.name = Some("tile-3".to_string());
        run(run_args, false).unwrap();

        assert!(diagnostics.join("relVertAcc_hgtErr.csv").exists());
        assert!(diagnostics.join("relHorzAcc_nearestPoints.csv").exists());
        let report = AccuracyReport::read_json(&output).unwrap();
        assert_eq!(report.name, "tile-3");
        assert_eq!(report.metrics.vertical_rmse(), 0.0);
    }

    #[test]
    fn test_run_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.csv");
        let err = run(args(missing.clone(), missing), false).unwrap_err();
        assert!(err.to_string().contains("Failed to read grid"));
    }
}
