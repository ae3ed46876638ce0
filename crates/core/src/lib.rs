//! Pulse Core Library
//!
//! Domain types and pure request-shaping logic for the heartbeat analytics
//! service: window resolution, group-key validation, output formats, and the
//! display-time "Unknown" substitution. No I/O lives here.

pub mod device;
pub mod error;
pub mod format;
pub mod group;
pub mod window;

pub use device::{ArchiveRecord, DeviceRecord, DeviceView, Heartbeat, UNKNOWN};
pub use error::ValidationError;
pub use format::{csv_escape, OutputFormat};
pub use group::{parse_group_list, GroupKey};
pub use window::{resolve_window, DEFAULT_WINDOW_SECS, MAX_WINDOW_SECS, MIN_WINDOW_SECS};
