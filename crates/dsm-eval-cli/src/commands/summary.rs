//! Report summary command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use dsm_eval::AccuracyReport;
use dsm_eval::eval::report::write_csv_summary;

pub fn run(inputs: Vec<PathBuf>, output: PathBuf, verbose: bool) -> Result<()> {
    let mut reports = Vec::with_capacity(inputs.len());
    for input in &inputs {
        if verbose {
            eprintln!("Loading report from: {}", input.display());
        }
        let report = AccuracyReport::read_json(input)
            .with_context(|| format!("Failed to read report from {}", input.display()))?;
        reports.push(report);
    }

    println!("{:<24} {:>10} {:>10} {:>8}", "Name", "ZRMSE", "HRMSE", "Overlap");
    println!("{:-<56}", "");
    for report in &reports {
        let hrmse = report
            .metrics
            .horizontal_rmse()
            .map_or_else(|| "n/a".to_string(), |h| format!("{:.4}", h));
        println!(
            "{:<24} {:>10.4} {:>10} {:>7.1}%",
            report.name,
            report.metrics.vertical_rmse(),
            hrmse,
            report.overlap_fraction() * 100.0
        );
    }

    write_csv_summary(&reports, &output)
        .with_context(|| format!("Failed to write to {}", output.display()))?;
    println!("Saved to: {}", output.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dsm_eval::raster::{Shape, filled_mask, raster_from_rows};
    use dsm_eval::{EvalConfig, EvalSession};

    #[test]
    fn test_summary_from_reports() {
        let dir = tempfile::tempdir().unwrap();
        let reference = raster_from_rows(vec![0.0; 16], 4, 4).unwrap();
        let test = raster_from_rows(vec![2.0; 16], 4, 4).unwrap();
        let mask = filled_mask(Shape::new(4, 4), true).unwrap();
        let config = EvalConfig::default();
        let evaluation = EvalSession::new(config.clone())
            .evaluate(&reference, &test, &mask, &mask)
            .unwrap();

        let mut inputs = Vec::new();
        for name in ["north", "south"] {
            let path = dir.path().join(format!("{name}.json"));
            evaluation.to_report(name, &config).write_json(&path).unwrap();
            inputs.push(path);
        }

        let output = dir.path().join("summary.csv");
        run(inputs, output.clone(), false).unwrap();

        let content = std::fs::read_to_string(&output).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        // Full masks have no boundary: horizontal column left empty
        assert!(lines[1].starts_with("north,4,4,2.000000,,grid"));
        assert!(lines[2].starts_with("south,"));
    }

    #[test]
    fn test_summary_missing_report() {
        let dir = tempfile::tempdir().unwrap();
        let err = run(
            vec![dir.path().join("absent.json")],
            dir.path().join("summary.csv"),
            false,
        )
        .unwrap_err();
        assert!(err.to_string().contains("Failed to read report"));
    }
}
