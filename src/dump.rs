//! Diagnostic dumps of loaded sensor geometry.
//!
//! Writes `<tag>_points.csv` and `<tag>_normals.csv`, one `x y z` line per
//! sensor, for inspection with external plotting tools.

use crate::types::CalibrationRecord;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Write the sensor locations and normals of `record` into `dir`.
///
/// Returns the paths written. Arrays that were never loaded produce empty
/// files.
pub fn write_calinfo(dir: &Path, record: &CalibrationRecord) -> io::Result<(PathBuf, PathBuf)> {
    let points = dir.join(format!("{}_points.csv", record.codename()));
    write_triples(&points, record.sensor_locations.as_deref().unwrap_or(&[]))?;

    let normals = dir.join(format!("{}_normals.csv", record.codename()));
    write_triples(&normals, record.sensor_normals.as_deref().unwrap_or(&[]))?;

    log::debug!("Wrote {} and {}", points.display(), normals.display());
    Ok((points, normals))
}

fn write_triples(path: &Path, values: &[f64]) -> io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    for v in values.chunks_exact(3) {
        writeln!(out, "{:.6} {:.6} {:.6}", v[0], v[1], v[2])?;
    }
    out.flush()
}
