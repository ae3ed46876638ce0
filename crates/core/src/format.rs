//! Output encodings for the query endpoints.

use crate::error::ValidationError;

/// Response encoding. JSON is the default; anything other than `json`/`csv`
/// is a validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Csv,
}

impl OutputFormat {
    pub fn parse(raw: Option<&str>) -> Result<Self, ValidationError> {
        match raw {
            None => Ok(OutputFormat::Json),
            Some("json") => Ok(OutputFormat::Json),
            Some("csv") => Ok(OutputFormat::Csv),
            Some(other) => Err(ValidationError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Escape a single CSV field: wrap in quotes and double any embedded quote
/// if the field contains a comma, quote, or newline. Clean fields pass
/// through untouched.
pub fn csv_escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
