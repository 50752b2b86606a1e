//! Flat event records consumed by the graph core

use crate::error::{GraphError, GraphResult};
use serde::{Deserialize, Serialize};

/// One detected fire event
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    #[serde(rename = "Latitude")]
    pub latitude: f64,

    #[serde(rename = "Longitude")]
    pub longitude: f64,

    /// Fire radiative power
    #[serde(rename = "FRP")]
    pub frp: f64,
}

impl EventRecord {
    pub fn new(latitude: f64, longitude: f64, frp: f64) -> Self {
        Self {
            latitude,
            longitude,
            frp,
        }
    }

    /// Check that all fields are finite and intensity is non-negative
    pub fn validate(&self) -> GraphResult<()> {
        if !self.latitude.is_finite() || !self.longitude.is_finite() {
            return Err(GraphError::InvalidArgument(format!(
                "record has non-finite coordinates ({}, {})",
                self.latitude, self.longitude
            )));
        }
        if !self.frp.is_finite() || self.frp < 0.0 {
            return Err(GraphError::InvalidArgument(format!(
                "record has invalid FRP {}",
                self.frp
            )));
        }
        Ok(())
    }
}

/// Validate a whole batch, reporting the first bad row
pub fn validate_records(records: &[EventRecord]) -> GraphResult<()> {
    for (row, record) in records.iter().enumerate() {
        record.validate().map_err(|e| match e {
            GraphError::InvalidArgument(msg) => {
                GraphError::InvalidArgument(format!("row {}: {}", row, msg))
            }
            other => other,
        })?;
    }
    Ok(())
}
