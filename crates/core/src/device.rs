//! Device records and their display projection.
//!
//! A `DeviceRecord` is one row of the identity store: exactly one per
//! `unique_id`, with first/last-seen stamps and the self-reported attributes
//! from the most recent heartbeat. `ArchiveRecord` is its point-in-time
//! mirror captured at deletion.

use serde::{Deserialize, Serialize};

/// Display substitute for null attribute values. Substitution happens at
/// render and grouping time only; stored values stay null.
pub const UNKNOWN: &str = "Unknown";

/// One row of the identity store.
///
/// `part_num` is mandatory at the ingestion API but the field is optional
/// here: the store may hold seeded or legacy rows without one, and the
/// metrics grouping folds those into the "Unknown" bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRecord {
    pub unique_id: String,
    pub first_seen: i64,
    pub last_seen: i64,
    pub part_num: Option<String>,
    pub fw_version: Option<String>,
    pub sw_version: Option<String>,
    pub ciq_version: Option<String>,
    pub lang: Option<String>,
    pub feat: Option<String>,
    pub country: Option<String>,
}

/// A deleted device as captured into the archive mirror.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveRecord {
    pub unique_id: String,
    pub first_seen: i64,
    pub last_seen: i64,
    pub part_num: Option<String>,
    pub fw_version: Option<String>,
    pub sw_version: Option<String>,
    pub ciq_version: Option<String>,
    pub lang: Option<String>,
    pub feat: Option<String>,
    pub country: Option<String>,
    pub deleted_at: i64,
}

/// A validated heartbeat: the full current truth for the device's mutable
/// attributes. Omitted optionals overwrite stored values with null.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heartbeat {
    pub unique_id: String,
    pub part_num: String,
    pub fw_version: Option<String>,
    pub sw_version: Option<String>,
    pub ciq_version: Option<String>,
    pub lang: Option<String>,
    pub feat: Option<String>,
    /// Derived from the request's network origin, never client-supplied.
    pub country: Option<String>,
}

/// Listing row with nulls substituted for display.
#[derive(Debug, Clone, Serialize)]
pub struct DeviceView {
    pub unique_id: String,
    pub first_seen: i64,
    pub last_seen: i64,
    pub part_num: String,
    pub fw_version: String,
    pub sw_version: String,
    pub country: String,
}

impl From<&DeviceRecord> for DeviceView {
    fn from(rec: &DeviceRecord) -> Self {
        DeviceView {
            unique_id: rec.unique_id.clone(),
            first_seen: rec.first_seen,
            last_seen: rec.last_seen,
            part_num: rec.part_num.clone().unwrap_or_default(),
            fw_version: unknown_or(rec.fw_version.as_deref()),
            sw_version: unknown_or(rec.sw_version.as_deref()),
            country: unknown_or(rec.country.as_deref()),
        }
    }
}

fn unknown_or(value: Option<&str>) -> String {
    value.map_or_else(|| UNKNOWN.to_string(), str::to_string)
}
