//! Report types for evaluation results.
//!
//! This module defines the data structures for evaluation reports that can be
//! serialized to JSON or CSV.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::eval::session::{EvalConfig, Evaluation, Warning};
use crate::metrics::MetricsResult;
use crate::raster::Shape;
use crate::stats::Summary;

/// Report for one reference/test comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccuracyReport {
    /// Name or identifier of the comparison.
    pub name: String,

    /// Grid dimensions.
    pub shape: Shape,

    /// The two accuracy scalars.
    pub metrics: MetricsResult,

    /// Configuration used for this evaluation.
    pub config: EvalConfig,

    /// Cells valid in both masks.
    pub overlap_cells: usize,

    /// Total grid cells.
    pub grid_cells: usize,

    /// Number of reference boundary points.
    pub reference_edge_points: usize,

    /// Number of test boundary points.
    pub test_edge_points: usize,

    /// Signed `test - reference` differences over the overlap.
    pub vertical_summary: Option<Summary>,

    /// Matched boundary distances.
    pub distance_summary: Option<Summary>,

    /// Low-confidence conditions.
    #[serde(default)]
    pub warnings: Vec<Warning>,

    /// When this report was generated.
    #[serde(with = "chrono_serde")]
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl AccuracyReport {
    /// Build a report from an evaluation.
    #[must_use]
    pub fn from_evaluation(name: &str, evaluation: &Evaluation, config: &EvalConfig) -> Self {
        let vertical = &evaluation.vertical;
        let differences: Vec<f64> = vertical
            .delta
            .pixels()
            .zip(vertical.overlap.pixels())
            .filter(|&(_, inside)| inside)
            .map(|(d, _)| d)
            .collect();

        Self {
            name: name.to_string(),
            shape: Shape::of(&vertical.delta),
            metrics: evaluation.metrics(),
            config: config.clone(),
            overlap_cells: vertical.overlap_cells,
            grid_cells: vertical.grid_cells,
            reference_edge_points: evaluation.reference_edges.len(),
            test_edge_points: evaluation.test_edges.len(),
            vertical_summary: Summary::compute(&differences),
            distance_summary: Summary::compute(&evaluation.distances()),
            warnings: evaluation.warnings.clone(),
            timestamp: chrono::Utc::now(),
        }
    }

    /// Fraction of grid cells inside the overlap.
    #[must_use]
    pub fn overlap_fraction(&self) -> f64 {
        if self.grid_cells == 0 {
            0.0
        } else {
            self.overlap_cells as f64 / self.grid_cells as f64
        }
    }

    /// Write the report as pretty-printed JSON.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Read a report written by [`write_json`](Self::write_json).
    pub fn read_json(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}

/// Write a one-line-per-report CSV summary.
pub fn write_csv_summary(reports: &[AccuracyReport], path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "name",
        "rows",
        "cols",
        "zrmse",
        "hrmse",
        "denominator",
        "overlap_cells",
        "grid_cells",
        "ref_edge_points",
        "test_edge_points",
        "max_distance",
        "warnings",
    ])?;

    for report in reports {
        let warnings: Vec<String> = report.warnings.iter().map(|w| w.to_string()).collect();
        wtr.write_record([
            &report.name,
            &report.shape.rows.to_string(),
            &report.shape.cols.to_string(),
            &format!("{:.6}", report.metrics.vertical_rmse()),
            &report
                .metrics
                .horizontal_rmse()
                .map_or(String::new(), |h| format!("{:.6}", h)),
            &report.config.denominator.code().to_string(),
            &report.overlap_cells.to_string(),
            &report.grid_cells.to_string(),
            &report.reference_edge_points.to_string(),
            &report.test_edge_points.to_string(),
            &report
                .distance_summary
                .as_ref()
                .map_or(String::new(), |s| format!("{:.4}", s.max)),
            &warnings.join("; "),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

mod chrono_serde {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        dt.to_rfc3339().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::session::EvalSession;
    use crate::raster::{mask_from_rows, raster_from_rows};

    fn sample_evaluation() -> (Evaluation, EvalConfig) {
        let reference = raster_from_rows(vec![1.0; 64], 8, 8).unwrap();
        let test = raster_from_rows(vec![1.5; 64], 8, 8).unwrap();
        let cells: Vec<bool> = (0..64)
            .map(|i| (2..6).contains(&(i / 8)) && (2..6).contains(&(i % 8)))
            .collect();
        let mask = mask_from_rows(cells, 8, 8).unwrap();
        let config = EvalConfig::default();
        let evaluation = EvalSession::new(config.clone())
            .evaluate(&reference, &test, &mask, &mask)
            .unwrap();
        (evaluation, config)
    }

    #[test]
    fn test_report_from_evaluation() {
        let (evaluation, config) = sample_evaluation();
        let report = evaluation.to_report("tile-07", &config);

        assert_eq!(report.name, "tile-07");
        assert_eq!(report.shape, Shape::new(8, 8));
        assert_eq!(report.overlap_cells, 16);
        assert_eq!(report.grid_cells, 64);
        assert_eq!(report.reference_edge_points, 12);
        assert_eq!(report.test_edge_points, 12);
        assert!((report.overlap_fraction() - 0.25).abs() < 1e-12);

        let vertical = report.vertical_summary.as_ref().unwrap();
        assert_eq!(vertical.count, 16);
        assert!((vertical.mean - 0.5).abs() < 1e-12);

        let distances = report.distance_summary.as_ref().unwrap();
        assert_eq!(distances.max, 0.0);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_report_json_round_trip() {
        let (evaluation, config) = sample_evaluation();
        let report = evaluation.to_report("tile", &config);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tile.json");
        report.write_json(&path).unwrap();
        let loaded = AccuracyReport::read_json(&path).unwrap();

        assert_eq!(loaded.name, report.name);
        assert_eq!(loaded.metrics, report.metrics);
        assert_eq!(loaded.config, report.config);
        assert_eq!(loaded.timestamp.timestamp(), report.timestamp.timestamp());
    }

    #[test]
    fn test_csv_summary() {
        let (evaluation, config) = sample_evaluation();
        let reports = vec![
            evaluation.to_report("a", &config),
            evaluation.to_report("b", &config),
        ];

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.csv");
        write_csv_summary(&reports, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("name,rows,cols,zrmse,hrmse"));
        assert!(lines[1].starts_with("a,8,8,0.250000,0.000000,grid,16,64"));
    }
}
