//! Error types for form-state operations.

use crate::FieldPath;
use thiserror::Error;

/// Result type alias for form-state operations.
pub type FormStateResult<T> = Result<T, FormStateError>;

/// Errors that can occur during form-state operations.
///
/// The reducer itself never fails: malformed field names resolve to a
/// best-effort path and transitions against missing targets are no-ops.
/// These errors surface from the surrounding surfaces instead: record shape
/// validation, state (de)serialization, and store history access.
#[derive(Debug, Error)]
pub enum FormStateError {
    /// Path does not exist in the field tree.
    #[error("path not found: {path}")]
    PathNotFound {
        /// The path that was not found.
        path: FieldPath,
    },

    /// List item index is out of bounds.
    #[error("index {index} out of bounds (len: {len}) at path {path}")]
    IndexOutOfBounds {
        /// The path to the list field.
        path: FieldPath,
        /// The index that was accessed.
        index: usize,
        /// The actual length of the items sequence.
        len: usize,
    },

    /// Type mismatch when accessing a value.
    #[error("type mismatch at {path}: expected {expected}, found {found}")]
    TypeMismatch {
        /// The path where the mismatch occurred.
        path: FieldPath,
        /// The expected type.
        expected: &'static str,
        /// The actual type found.
        found: &'static str,
    },

    /// Invalid replay index into the store history.
    #[error("invalid replay index: {index}, history length: {len}")]
    InvalidReplayIndex {
        /// The requested index.
        index: usize,
        /// The history length.
        len: usize,
    },

    /// JSON serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl FormStateError {
    /// Create a path not found error.
    #[inline]
    pub fn path_not_found(path: FieldPath) -> Self {
        FormStateError::PathNotFound { path }
    }

    /// Create an index out of bounds error.
    #[inline]
    pub fn index_out_of_bounds(path: FieldPath, index: usize, len: usize) -> Self {
        FormStateError::IndexOutOfBounds { path, index, len }
    }

    /// Create a type mismatch error.
    #[inline]
    pub fn type_mismatch(path: FieldPath, expected: &'static str, found: &'static str) -> Self {
        FormStateError::TypeMismatch {
            path,
            expected,
            found,
        }
    }

}

/// Get the type name of a JSON value.
#[inline]
pub fn value_type_name(v: &serde_json::Value) -> &'static str {
    match v {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
