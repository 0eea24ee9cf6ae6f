//! Errors raised while loading and compiling network tables.

use std::path::PathBuf;

pub type NetworkResult<T> = Result<T, NetworkError>;

#[derive(thiserror::Error, Debug)]
pub enum NetworkError {
    #[error("Unknown network '{input}': choose 1, 2, 3 or 4")]
    InputSelection { input: String },

    #[error("Missing data: required sheet '{sheet}' not found at {}", path.display())]
    MissingData { sheet: &'static str, path: PathBuf },

    #[error("Failed to read sheet '{sheet}' row {row}: {reason}")]
    Row {
        sheet: &'static str,
        row: u64,
        reason: String,
    },

    #[error("Dangling reference: {element} field '{field}' refers to unknown '{id}'")]
    ReferentialIntegrity {
        element: String,
        field: &'static str,
        id: String,
    },

    #[error("Duplicate ID: {id} in {context}")]
    DuplicateId { id: String, context: &'static str },

    #[error("LV line {line} is not connected to any transformer busbar")]
    Islanded { line: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl NetworkError {
    pub(crate) fn invalid(field: impl Into<String>, value: impl ToString, reason: &str) -> Self {
        NetworkError::InvalidValue {
            field: field.into(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }

    /// True for the dangling-reference family (including islanded LV conductors).
    pub fn is_referential(&self) -> bool {
        matches!(
            self,
            NetworkError::ReferentialIntegrity { .. }
                | NetworkError::DuplicateId { .. }
                | NetworkError::Islanded { .. }
        )
    }
}
