//! Plain-text grid ingestion and export.
//!
//! A grid file holds one grid row per line. Values are separated by commas
//! or by runs of whitespace; the separator is chosen from the first data
//! line. Comma-separated files go through the `csv` reader, so quoted cells
//! are accepted. Blank lines and lines starting with `#` are skipped.
//!
//! - Raster cells parse as `f64` (`nan` and `inf` are accepted and later
//!   treated as invalid by [`mask_from_nodata`](crate::raster::mask_from_nodata)).
//! - Mask cells accept `0`/`1` and `true`/`false` (case-insensitive).
//!
//! ## Example
//!
//! ```
//! use dsm_eval::import::{read_raster_csv, write_raster_csv};
//! use dsm_eval::raster::raster_from_rows;
//!
//! let dir = tempfile::tempdir()?;
//! let path = dir.path().join("dsm.csv");
//!
//! let dsm = raster_from_rows(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 2, 3)?;
//! write_raster_csv(&dsm, &path)?;
//! let loaded = read_raster_csv(&path)?;
//! assert_eq!(loaded.width(), 3);
//! assert_eq!(loaded.height(), 2);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::path::Path;

use log::debug;

use crate::error::{Error, Result};
use crate::raster::{Mask, Raster, mask_from_rows, raster_from_rows};

/// Read an elevation raster.
pub fn read_raster_csv(path: impl AsRef<Path>) -> Result<Raster> {
    let path = path.as_ref();
    let (values, rows, cols) = read_grid(path, parse_elevation)?;
    debug!("read {rows}x{cols} raster from {}", path.display());
    raster_from_rows(values, rows, cols)
}

/// Read a validity mask.
pub fn read_mask_csv(path: impl AsRef<Path>) -> Result<Mask> {
    let path = path.as_ref();
    let (values, rows, cols) = read_grid(path, parse_flag)?;
    debug!("read {rows}x{cols} mask from {}", path.display());
    mask_from_rows(values, rows, cols)
}

/// Write a raster as comma-separated rows.
pub fn write_raster_csv(raster: &Raster, path: impl AsRef<Path>) -> Result<()> {
    write_grid(raster.rows(), path.as_ref(), |v: &f64| v.to_string())
}

/// Write a mask as comma-separated `0`/`1` rows.
pub fn write_mask_csv(mask: &Mask, path: impl AsRef<Path>) -> Result<()> {
    write_grid(mask.rows(), path.as_ref(), |&v: &bool| {
        String::from(if v { "1" } else { "0" })
    })
}

fn write_grid<'a, T, I, F>(rows: I, path: &Path, format: F) -> Result<()>
where
    T: 'a,
    I: Iterator<Item = &'a [T]>,
    F: Fn(&T) -> String,
{
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;

    for row in rows {
        wtr.write_record(row.iter().map(&format))?;
    }

    wtr.flush()?;
    Ok(())
}

/// Parse a grid file into row-major values plus its dimensions.
fn read_grid<T, F>(path: &Path, parse: F) -> Result<(Vec<T>, usize, usize)>
where
    F: Fn(&str) -> Option<T>,
{
    let text = std::fs::read_to_string(path)?;
    parse_grid(&text, parse)
}

fn parse_grid<T, F>(text: &str, parse: F) -> Result<(Vec<T>, usize, usize)>
where
    F: Fn(&str) -> Option<T>,
{
    let comma_separated = text
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with('#'))
        .is_some_and(|line| line.contains(','));

    let mut grid = GridRows::default();
    if comma_separated {
        parse_delimited(text, &parse, &mut grid)?;
    } else {
        parse_whitespace(text, &parse, &mut grid)?;
    }

    if grid.rows == 0 {
        return Err(Error::EmptyGrid {
            rows: grid.rows,
            cols: grid.cols,
        });
    }

    Ok((grid.values, grid.rows, grid.cols))
}

/// Comma-separated rows, read with the `csv` reader (quoted cells allowed).
fn parse_delimited<T, F>(text: &str, parse: &F, grid: &mut GridRows<T>) -> Result<()>
where
    F: Fn(&str) -> Option<T>,
{
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .comment(Some(b'#'))
        .from_reader(text.as_bytes());

    for result in reader.records() {
        let record = result.map_err(|e| Error::GridParse {
            line: e.position().map_or(0, |p| p.line() as usize),
            reason: e.to_string(),
        })?;
        let fields: Vec<&str> = record.iter().collect();
        if fields.iter().all(|f| f.is_empty()) {
            continue;
        }
        let line = record.position().map_or(0, |p| p.line() as usize);
        grid.push(line, &fields, parse)?;
    }
    Ok(())
}

/// Rows separated by runs of spaces or tabs.
fn parse_whitespace<T, F>(text: &str, parse: &F, grid: &mut GridRows<T>) -> Result<()>
where
    F: Fn(&str) -> Option<T>,
{
    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        grid.push(idx + 1, &fields, parse)?;
    }
    Ok(())
}

/// Row-major values accumulated while reading a grid.
struct GridRows<T> {
    values: Vec<T>,
    rows: usize,
    cols: usize,
}

impl<T> Default for GridRows<T> {
    fn default() -> Self {
        Self {
            values: Vec::new(),
            rows: 0,
            cols: 0,
        }
    }
}

impl<T> GridRows<T> {
    fn push<F>(&mut self, line: usize, fields: &[&str], parse: &F) -> Result<()>
    where
        F: Fn(&str) -> Option<T>,
    {
        if self.rows == 0 {
            self.cols = fields.len();
        } else if fields.len() != self.cols {
            return Err(Error::GridParse {
                line,
                reason: format!("expected {} values, found {}", self.cols, fields.len()),
            });
        }

        for field in fields {
            let value = parse(field).ok_or_else(|| Error::GridParse {
                line,
                reason: format!("invalid value '{field}'"),
            })?;
            self.values.push(value);
        }
        self.rows += 1;
        Ok(())
    }
}

fn parse_elevation(field: &str) -> Option<f64> {
    field.parse().ok()
}

fn parse_flag(field: &str) -> Option<bool> {
    match field.to_ascii_lowercase().as_str() {
        "1" | "true" => Some(true),
        "0" | "false" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::Shape;

    #[test]
    fn test_parse_comma_and_whitespace() {
        let (values, rows, cols) = parse_grid("1, 2, 3\n4,5,6\n", parse_elevation).unwrap();
        assert_eq!((rows, cols), (2, 3));
        assert_eq!(values, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);

        let (values, rows, cols) =
            parse_grid("# header\n  1.5   2\n\n3\t-4e1\n", parse_elevation).unwrap();
        assert_eq!((rows, cols), (2, 2));
        assert_eq!(values, vec![1.5, 2.0, 3.0, -40.0]);
    }

    #[test]
    fn test_parse_quoted_cells() {
        let (values, rows, cols) =
            parse_grid("\"1.0\",\"2.0\"\n\"3.0\",\"4.0\"\n", parse_elevation).unwrap();
        assert_eq!((rows, cols), (2, 2));
        assert_eq!(values, vec![1.0, 2.0, 3.0, 4.0]);

        let (values, _, _) = parse_grid("\"1\",0\n# note\n\n0,\"true\"\n", parse_flag).unwrap();
        assert_eq!(values, vec![true, false, false, true]);
    }

    #[test]
    fn test_parse_nan_cells() {
        let (values, _, _) = parse_grid("nan,1\n2,NaN\n", parse_elevation).unwrap();
        assert!(values[0].is_nan());
        assert!(values[3].is_nan());
    }

    #[test]
    fn test_ragged_rows() {
        let err = parse_grid("1,2,3\n4,5\n", parse_elevation).unwrap_err();
        assert!(matches!(err, Error::GridParse { line: 2, .. }));
    }

    #[test]
    fn test_ragged_row_after_blank_line() {
        let err = parse_grid("1,2\n\n3,4,5\n", parse_elevation).unwrap_err();
        match err {
            Error::GridParse { line, reason } => {
                assert!(line >= 2);
                assert!(reason.contains("expected 2 values"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_bad_value() {
        let err = parse_grid("1 2\n3 x\n", parse_elevation).unwrap_err();
        match err {
            Error::GridParse { line, reason } => {
                assert_eq!(line, 2);
                assert!(reason.contains("'x'"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_file() {
        assert!(matches!(
            parse_grid("\n# nothing\n", parse_elevation),
            Err(Error::EmptyGrid { .. })
        ));
    }

    #[test]
    fn test_mask_flags() {
        let (values, _, _) = parse_grid("1,0,TRUE\nfalse,True,0\n", parse_flag).unwrap();
        assert_eq!(values, vec![true, false, true, false, true, false]);
        assert!(parse_grid("1,2\n", parse_flag).is_err());
    }

    #[test]
    fn test_raster_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dsm.csv");

        let dsm = raster_from_rows(vec![0.25, -1.0, 12.5, 3.0, 4.0, 1e-3], 3, 2).unwrap();
        write_raster_csv(&dsm, &path).unwrap();
        let loaded = read_raster_csv(&path).unwrap();

        assert_eq!(Shape::of(&loaded), Shape::new(3, 2));
        let original: Vec<f64> = dsm.pixels().collect();
        let reread: Vec<f64> = loaded.pixels().collect();
        assert_eq!(original, reread);
    }

    #[test]
    fn test_mask_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mask.csv");

        let mask = mask_from_rows(vec![true, false, false, true, true, true], 2, 3).unwrap();
        write_mask_csv(&mask, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "1,0,0\n1,1,1\n");

        let loaded = read_mask_csv(&path).unwrap();
        let cells: Vec<bool> = loaded.pixels().collect();
        assert_eq!(cells, vec![true, false, false, true, true, true]);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_raster_csv(dir.path().join("absent.csv")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
