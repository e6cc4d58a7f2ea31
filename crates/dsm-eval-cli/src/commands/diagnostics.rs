//! Diagnostics sink writing CSV files.

use std::path::{Path, PathBuf};

use dsm_eval::eval::diagnostics::{DiagnosticSink, Plot, PlotData};
use dsm_eval::import::{write_mask_csv, write_raster_csv};
use dsm_eval::spatial::Match;
use dsm_eval::{Error, GridPoint, Result};
use log::debug;

/// Writes every diagnostic as `<name>.csv` into a directory.
///
/// Point diagnostics produce `<name>.csv` with one matched pair per line and
/// `<name>_test.csv` with the test boundary points.
pub struct CsvDiagnostics {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl CsvDiagnostics {
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
            written: Vec::new(),
        }
    }

    /// Files written so far.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl DiagnosticSink for CsvDiagnostics {
    fn emit(&mut self, plot: Plot<'_>) -> Result<()> {
        let path = self.dir.join(format!("{}.csv", plot.name));
        debug!("diagnostic '{}' -> {}", plot.title, path.display());

        let written = match plot.data {
            PlotData::Grid(grid) => write_raster_csv(grid, &path).map(|()| vec![path.clone()]),
            PlotData::Mask(mask) => write_mask_csv(mask, &path).map(|()| vec![path.clone()]),
            PlotData::Matches { test, matches, .. } => {
                let test_path = self.dir.join(format!("{}_test.csv", plot.name));
                write_matches(&path, matches)
                    .and_then(|()| write_points(&test_path, test))
                    .map(|()| vec![path.clone(), test_path])
            }
        };

        let written =
            written.map_err(|e| Error::Diagnostics(format!("{}: {e}", path.display())))?;
        self.written.extend(written);
        Ok(())
    }
}

fn write_matches(path: &Path, matches: &[Match]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(["ref_row", "ref_col", "test_row", "test_col", "distance"])?;
    for m in matches {
        wtr.write_record([
            m.reference.row.to_string(),
            m.reference.col.to_string(),
            m.matched.row.to_string(),
            m.matched.col.to_string(),
            format!("{:.6}", m.distance),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

fn write_points(path: &Path, points: &[GridPoint]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(["row", "col"])?;
    for p in points {
        wtr.write_record([p.row.to_string(), p.col.to_string()])?;
    }
    wtr.flush()?;
    Ok(())
}
