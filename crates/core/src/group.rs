//! Group-key validation for the metrics query.
//!
//! Grouping is restricted to a fixed attribute set; anything outside it is a
//! validation failure, never a passthrough into SQL.

use crate::error::ValidationError;

/// Attributes the metrics query may group by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKey {
    PartNum,
    FwVersion,
    SwVersion,
    Country,
}

impl GroupKey {
    /// Column name in the `devices` table, also the name used in output.
    pub fn column(&self) -> &'static str {
        match self {
            GroupKey::PartNum => "part_num",
            GroupKey::FwVersion => "fw_version",
            GroupKey::SwVersion => "sw_version",
            GroupKey::Country => "country",
        }
    }

    fn parse(raw: &str) -> Result<Self, ValidationError> {
        match raw {
            "part_num" => Ok(GroupKey::PartNum),
            "fw_version" => Ok(GroupKey::FwVersion),
            "sw_version" => Ok(GroupKey::SwVersion),
            "country" => Ok(GroupKey::Country),
            _ => Err(ValidationError::UnknownGroupKey(raw.to_string())),
        }
    }
}

/// Parse a comma-separated group list. Duplicates collapse to the first
/// occurrence; an absent or empty list defaults to `part_num` alone.
pub fn parse_group_list(raw: Option<&str>) -> Result<Vec<GroupKey>, ValidationError> {
    let mut keys = Vec::new();
    if let Some(raw) = raw {
        for part in raw.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            let key = GroupKey::parse(part)?;
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
    }
    if keys.is_empty() {
        keys.push(GroupKey::PartNum);
    }
    Ok(keys)
}
