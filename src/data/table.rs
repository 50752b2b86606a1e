//! CSV / Parquet loading of fire detection tables

use crate::data::EventRecord;
use anyhow::{anyhow, Result};
use polars::prelude::*;
use std::path::Path;

pub const LATITUDE_COLUMN: &str = "Latitude";
pub const LONGITUDE_COLUMN: &str = "Longitude";
pub const FRP_COLUMN: &str = "FRP";

/// Load fire detections from a CSV or Parquet file.
///
/// Rows with a missing coordinate or FRP value are dropped here so that no
/// missing values reach the graph core.
pub fn load_event_table(path: &str) -> Result<Vec<EventRecord>> {
    log::info!("Reading event table: {}", path);

    // Check if the file exists
    if !Path::new(path).exists() {
        return Err(anyhow!("File not found: {}", path));
    }

    let is_parquet = Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("parquet"))
        .unwrap_or(false);

    let lazy = if is_parquet {
        LazyFrame::scan_parquet(path, Default::default())?
    } else {
        LazyCsvReader::new(path).with_has_header(true).finish()?
    };

    let df = lazy
        .select([
            col(LATITUDE_COLUMN).cast(DataType::Float64),
            col(LONGITUDE_COLUMN).cast(DataType::Float64),
            col(FRP_COLUMN).cast(DataType::Float64),
        ])
        .collect()?;

    log::info!("Loaded {} rows", df.height());

    records_from_frame(&df)
}

/// Convert a frame with Latitude, Longitude and FRP columns into records
pub fn records_from_frame(df: &DataFrame) -> Result<Vec<EventRecord>> {
    let latitudes = df.column(LATITUDE_COLUMN)?.cast(&DataType::Float64)?;
    let longitudes = df.column(LONGITUDE_COLUMN)?.cast(&DataType::Float64)?;
    let intensities = df.column(FRP_COLUMN)?.cast(&DataType::Float64)?;

    let latitudes = latitudes.f64()?;
    let longitudes = longitudes.f64()?;
    let intensities = intensities.f64()?;

    let mut records = Vec::with_capacity(df.height());
    let mut skipped = 0usize;

    for i in 0..df.height() {
        match (latitudes.get(i), longitudes.get(i), intensities.get(i)) {
            (Some(lat), Some(lon), Some(frp)) => records.push(EventRecord::new(lat, lon, frp)),
            _ => skipped += 1,
        }
    }

    if skipped > 0 {
        log::warn!("Dropped {} rows with missing values", skipped);
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn frame_rows_become_records() {
        let df = df!(
            "Latitude" => [Some(-22.0), None, Some(-23.0)],
            "Longitude" => [Some(-47.0), Some(-47.5), Some(-48.0)],
            "FRP" => [Some(10.0), Some(3.0), Some(0.5)]
        )
        .unwrap();

        let records = records_from_frame(&df).unwrap();
        assert_eq!(
            records,
            vec![EventRecord::new(-22.0, -47.0, 10.0), EventRecord::new(-23.0, -48.0, 0.5)]
        );
    }

    #[test]
    fn loads_csv_with_extra_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("queimadas.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "DataHora,Latitude,Longitude,FRP").unwrap();
        writeln!(file, "2024-09-01,-21.5,-47.9,33.1").unwrap();
        writeln!(file, "2024-09-01,-21.6,-48.0,4").unwrap();
        drop(file);

        let records = load_event_table(path.to_str().unwrap()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1], EventRecord::new(-21.6, -48.0, 4.0));
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(load_event_table("/nonexistent/events.csv").is_err());
    }
}
