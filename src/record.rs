//! Canonical field-record document shape.
//!
//! The key names in this module are the wire contract consumed by the
//! renderer and must not change. A scalar field record looks like:
//!
//! ```json
//! {
//!   "initial": { "value": "" },
//!   "current": {
//!     "value": "",
//!     "pristine": true,
//!     "touched": false,
//!     "error": false,
//!     "helperText": ""
//!   }
//! }
//! ```
//!
//! A list-backed field carries `"items"`: an array of `{ "fields": { ... } }`
//! entries whose records have the same shape, recursively.

use crate::{value_type_name, FieldPath, FormStateError, FormStateResult};
use serde_json::{Map, Value};

/// Root key holding the field-name -> record map.
pub const FIELDS_KEY: &str = "fields";
/// Record key holding the initial snapshot.
pub const INITIAL_KEY: &str = "initial";
/// Record key holding the live UI state.
pub const CURRENT_KEY: &str = "current";
/// Value key inside `initial` and `current`.
pub const VALUE_KEY: &str = "value";
/// `current` key: true iff the current value deep-equals the initial value.
pub const PRISTINE_KEY: &str = "pristine";
/// `current` key: set once the field has been visited.
pub const TOUCHED_KEY: &str = "touched";
/// `current` key: validation error flag or payload.
pub const ERROR_KEY: &str = "error";
/// `current` key: validation helper text.
pub const HELPER_TEXT_KEY: &str = "helperText";
/// Record key holding the list item sequence of a list-backed field.
pub const ITEMS_KEY: &str = "items";
/// Root key holding the opaque form-tools context.
pub const FORM_TOOLS_KEY: &str = "formTools";
/// Internal root key tracking removed field names.
pub const REMOVED_FIELDS_KEY: &str = "removedFields";

/// Build a scalar field record with the given initial value.
///
/// The current value starts equal to the initial value, so the record is
/// pristine, untouched and error-free.
pub fn new_record(initial_value: Value) -> Value {
    let mut initial = Map::new();
    initial.insert(VALUE_KEY.to_owned(), initial_value.clone());

    let mut current = Map::new();
    current.insert(VALUE_KEY.to_owned(), initial_value);
    current.insert(PRISTINE_KEY.to_owned(), Value::Bool(true));
    current.insert(TOUCHED_KEY.to_owned(), Value::Bool(false));
    current.insert(ERROR_KEY.to_owned(), Value::Bool(false));
    current.insert(HELPER_TEXT_KEY.to_owned(), Value::String(String::new()));

    let mut record = Map::new();
    record.insert(INITIAL_KEY.to_owned(), Value::Object(initial));
    record.insert(CURRENT_KEY.to_owned(), Value::Object(current));
    Value::Object(record)
}

/// Build an empty list-backed field record.
pub fn new_list_record() -> Value {
    let mut record = Map::new();
    record.insert(ITEMS_KEY.to_owned(), Value::Array(Vec::new()));
    Value::Object(record)
}

/// Build a list item wrapping the given field map.
pub fn new_list_item(fields: Value) -> Value {
    let mut item = Map::new();
    item.insert(FIELDS_KEY.to_owned(), fields);
    Value::Object(item)
}

/// Check a field-record document against the canonical shape.
///
/// A valid record is an object with either an `items` array of object items
/// (list-backed field) or an `initial` object carrying at least `value`.
/// `current`, when present, must be an object.
pub fn validate_record(record: &Value) -> FormStateResult<()> {
    let obj = record.as_object().ok_or_else(|| {
        FormStateError::type_mismatch(FieldPath::new(), "object", value_type_name(record))
    })?;

    if let Some(items) = obj.get(ITEMS_KEY) {
        let arr = items.as_array().ok_or_else(|| {
            FormStateError::type_mismatch(
                FieldPath::new().key(ITEMS_KEY),
                "array",
                value_type_name(items),
            )
        })?;
        for (i, item) in arr.iter().enumerate() {
            if !item.is_object() {
                return Err(FormStateError::type_mismatch(
                    FieldPath::new().key(ITEMS_KEY).index(i),
                    "object",
                    value_type_name(item),
                ));
            }
        }
        return Ok(());
    }

    let initial = obj
        .get(INITIAL_KEY)
        .ok_or_else(|| FormStateError::path_not_found(FieldPath::new().key(INITIAL_KEY)))?;
    let initial_obj = initial.as_object().ok_or_else(|| {
        FormStateError::type_mismatch(
            FieldPath::new().key(INITIAL_KEY),
            "object",
            value_type_name(initial),
        )
    })?;
    if !initial_obj.contains_key(VALUE_KEY) {
        return Err(FormStateError::path_not_found(
            FieldPath::new().key(INITIAL_KEY).key(VALUE_KEY),
        ));
    }

    if let Some(current) = obj.get(CURRENT_KEY) {
        if !current.is_object() {
            return Err(FormStateError::type_mismatch(
                FieldPath::new().key(CURRENT_KEY),
                "object",
                value_type_name(current),
            ));
        }
    }

    Ok(())
}
