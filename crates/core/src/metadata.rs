//! Persisted sidecar metadata for one image.
//!
//! The shape returned by the backend's metadata load. `adjustments` stays raw
//! JSON here; [`AdjustmentDocument::normalize`](crate::AdjustmentDocument::normalize)
//! owns legacy/missing-field handling when the session materializes it.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

/// Current sidecar schema version.
pub const METADATA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImageMetadata {
    pub version: u32,
    /// Star rating, `0..=5`.
    pub rating: u8,
    pub tags: Vec<String>,
    /// Raw persisted adjustment document; may be from an older schema.
    pub adjustments: serde_json::Value,
    pub last_modified: Timestamp,
}

impl Default for ImageMetadata {
    fn default() -> Self {
        Self {
            version: METADATA_VERSION,
            rating: 0,
            tags: Vec::new(),
            adjustments: serde_json::Value::Null,
            last_modified: Utc::now(),
        }
    }
}
