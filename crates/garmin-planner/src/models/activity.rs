//! Activity data models for the Garmin Connect API
//!
//! These structures represent activities returned from the activity list
//! endpoint, consumed by the downloader.

use serde::{Deserialize, Serialize};

/// Activity summary returned from the activity list endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivitySummary {
    /// Unique activity identifier
    pub activity_id: u64,

    /// User-provided or auto-generated activity name
    #[serde(default)]
    pub activity_name: Option<String>,

    /// Start time in local timezone (ISO 8601 format)
    #[serde(default)]
    pub start_time_local: Option<String>,

    /// Activity type information
    #[serde(default)]
    pub activity_type: Option<ActivityType>,

    /// Distance in meters
    #[serde(default)]
    pub distance: Option<f64>,

    /// Duration in seconds
    #[serde(default)]
    pub duration: Option<f64>,

    /// Calories burned
    #[serde(default)]
    pub calories: Option<f64>,

    /// Average heart rate in bpm
    #[serde(default)]
    pub average_hr: Option<f64>,
}

/// Activity type information
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityType {
    /// Type key (e.g., "running", "cycling", "walking")
    pub type_key: String,

    /// Type ID
    #[serde(default)]
    pub type_id: Option<u64>,
}

impl ActivitySummary {
    /// Type key or "unknown" when the API omits the type
    pub fn type_key(&self) -> String {
        self.activity_type
            .as_ref()
            .map(|t| t.type_key.clone())
            .unwrap_or_else(|| "unknown".to_string())
    }

    /// `YYYY-MM-DD_HH-MM` slug from the local start time, used in
    /// download file names
    pub fn datetime_slug(&self) -> String {
        match &self.start_time_local {
            // "2025-08-04 07:12:33" or "2025-08-04T07:12:33"
            Some(ts) if ts.len() >= 16 => {
                let date = &ts[..10];
                let time = ts[11..16].replace(':', "-");
                format!("{}_{}", date, time)
            }
            _ => "unknown-date".to_string(),
        }
    }
}
