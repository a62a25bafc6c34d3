//! Shared fixtures for the integration tests.

use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Write a small netCDF-4 file:
///
/// ```text
/// /                 title = "sample"
/// /group_a/dataset_x  int32 [3, 4] = 0..12, units = "m"
/// /cube             float64 [2, 2, 2] = 0.0, 0.25, ..
/// ```
pub fn write_sample(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("sample.nc");
    write_sample_to(&path);
    path
}

fn write_sample_to(path: &Path) {
    let mut file = netcdf::create(path).unwrap();
    file.add_attribute("title", "sample").unwrap();

    file.add_dimension("t", 2).unwrap();
    file.add_dimension("lat", 2).unwrap();
    file.add_dimension("lon", 2).unwrap();
    {
        let mut cube = file.add_variable::<f64>("cube", &["t", "lat", "lon"]).unwrap();
        let values: Vec<f64> = (0..8).map(|v| v as f64 * 0.25).collect();
        cube.put_values(&values, ..).unwrap();
    }

    let mut group = file.add_group("group_a").unwrap();
    group.add_dimension("y", 3).unwrap();
    group.add_dimension("x", 4).unwrap();
    let mut var = group.add_variable::<i32>("dataset_x", &["y", "x"]).unwrap();
    let values: Vec<i32> = (0..12).collect();
    var.put_values(&values, ..).unwrap();
    var.put_attribute("units", "m").unwrap();
}
