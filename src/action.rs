//! Transition operations for the form reducer.
//!
//! Each variant is one operation of the vocabulary. [`Action::name`] returns
//! the historical kind strings (`updateValue`, `touched`, ...) for
//! wire/API compatibility with existing callers.

use crate::listener::{FieldListener, ListenerFn};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// A single form state transition.
#[derive(Clone)]
pub enum Action {
    /// Set a field's current value, recompute pristine, notify listeners on
    /// change.
    UpdateValue {
        /// Target field name.
        field_name: String,
        /// The new value.
        value: Value,
    },

    /// Mark a field as touched.
    Touched {
        /// Target field name.
        field_name: String,
    },

    /// Store a validation result on a field.
    ValidationResult {
        /// Target field name.
        field_name: String,
        /// Error flag or payload.
        error: Value,
        /// Helper text shown alongside the field.
        helper_text: String,
    },

    /// Insert (or replace) a field record; clears the name from
    /// `removedFields`.
    InsertField {
        /// Target field name.
        field_name: String,
        /// The record document to store.
        record: Value,
    },

    /// Delete a field record; records the name in `removedFields`.
    RemoveField {
        /// Target field name.
        field_name: String,
    },

    /// Append a list item to a list-backed field.
    AddListItem {
        /// The list field name.
        field_name: String,
        /// The wrapped `{"fields": ...}` list item to append.
        item: Value,
    },

    /// Remove the list item at an index and renumber the remaining items.
    RemoveListItem {
        /// The list field name.
        field_name: String,
        /// Zero-based index of the item to remove.
        index: usize,
    },

    /// Register a value-change listener on a field.
    AddListener {
        /// Target field name (full path string for list-item fields).
        field_name: String,
        /// The listener handle.
        listener: FieldListener,
    },

    /// Remove listeners by callback reference identity.
    RemoveListener {
        /// Target field name.
        field_name: String,
        /// The callback to match by reference.
        callback: Arc<ListenerFn>,
    },

    /// Merge validation results onto multiple fields at once.
    ///
    /// Each entry value is either a `{error, helperText}` object or a bare
    /// error string.
    ValidateAll {
        /// Field name -> validation result.
        results: Map<String, Value>,
    },
}

impl Action {
    /// Create an `updateValue` operation.
    #[inline]
    pub fn update_value(field_name: impl Into<String>, value: impl Into<Value>) -> Self {
        Action::UpdateValue {
            field_name: field_name.into(),
            value: value.into(),
        }
    }

    /// Create a `touched` operation.
    #[inline]
    pub fn touched(field_name: impl Into<String>) -> Self {
        Action::Touched {
            field_name: field_name.into(),
        }
    }

    /// Create a `validationResult` operation.
    #[inline]
    pub fn validation_result(
        field_name: impl Into<String>,
        error: impl Into<Value>,
        helper_text: impl Into<String>,
    ) -> Self {
        Action::ValidationResult {
            field_name: field_name.into(),
            error: error.into(),
            helper_text: helper_text.into(),
        }
    }

    /// Create an `insertField` operation.
    #[inline]
    pub fn insert_field(field_name: impl Into<String>, record: impl Into<Value>) -> Self {
        Action::InsertField {
            field_name: field_name.into(),
            record: record.into(),
        }
    }

    /// Create a `removeField` operation.
    #[inline]
    pub fn remove_field(field_name: impl Into<String>) -> Self {
        Action::RemoveField {
            field_name: field_name.into(),
        }
    }

    /// Create an `addListItem` operation from a bare sub-field map.
    ///
    /// The map is wrapped into a `{"fields": ...}` list item, whatever its
    /// sub-field names. Use [`Action::add_list_item_entry`] for an item that
    /// is already wrapped.
    #[inline]
    pub fn add_list_item(field_name: impl Into<String>, fields: impl Into<Value>) -> Self {
        Action::AddListItem {
            field_name: field_name.into(),
            item: crate::record::new_list_item(fields.into()),
        }
    }

    /// Create an `addListItem` operation from an already-wrapped list item.
    #[inline]
    pub fn add_list_item_entry(field_name: impl Into<String>, item: impl Into<Value>) -> Self {
        Action::AddListItem {
            field_name: field_name.into(),
            item: item.into(),
        }
    }

    /// Create a `removeListItem` operation.
    #[inline]
    pub fn remove_list_item(field_name: impl Into<String>, index: usize) -> Self {
        Action::RemoveListItem {
            field_name: field_name.into(),
            index,
        }
    }

    /// Create an `addListener` operation from a shared callback.
    ///
    /// Keep a clone of the `Arc` to remove the listener later.
    #[inline]
    pub fn add_listener(field_name: impl Into<String>, callback: Arc<ListenerFn>) -> Self {
        Action::AddListener {
            field_name: field_name.into(),
            listener: FieldListener::new(callback),
        }
    }

    /// Create a `removeListener` operation.
    #[inline]
    pub fn remove_listener(field_name: impl Into<String>, callback: Arc<ListenerFn>) -> Self {
        Action::RemoveListener {
            field_name: field_name.into(),
            callback,
        }
    }

    /// Create a `validateAll` operation.
    #[inline]
    pub fn validate_all(results: impl IntoIterator<Item = (String, Value)>) -> Self {
        Action::ValidateAll {
            results: results.into_iter().collect(),
        }
    }

    /// Get the operation kind name (historical camelCase vocabulary).
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Action::UpdateValue { .. } => "updateValue",
            Action::Touched { .. } => "touched",
            Action::ValidationResult { .. } => "validationResult",
            Action::InsertField { .. } => "insertField",
            Action::RemoveField { .. } => "removeField",
            Action::AddListItem { .. } => "addListItem",
            Action::RemoveListItem { .. } => "removeListItem",
            Action::AddListener { .. } => "addListener",
            Action::RemoveListener { .. } => "removeListener",
            Action::ValidateAll { .. } => "validateAll",
        }
    }

    /// Get the field name this operation targets, if it targets one.
    #[inline]
    pub fn field_name(&self) -> Option<&str> {
        match self {
            Action::UpdateValue { field_name, .. }
            | Action::Touched { field_name }
            | Action::ValidationResult { field_name, .. }
            | Action::InsertField { field_name, .. }
            | Action::RemoveField { field_name }
            | Action::AddListItem { field_name, .. }
            | Action::RemoveListItem { field_name, .. }
            | Action::AddListener { field_name, .. }
            | Action::RemoveListener { field_name, .. } => Some(field_name),
            Action::ValidateAll { .. } => None,
        }
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.field_name() {
            Some(field) => write!(f, "Action::{}({:?})", self.name(), field),
            None => write!(f, "Action::{}", self.name()),
        }
    }
}
