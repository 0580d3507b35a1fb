//! The form state transition engine.
//!
//! `FieldReducer::reduce` is a pure function `(state, action) ->
//! (state', notifications)`. The input state is never mutated; the successor
//! is computed by cloning and applying a localized change at the resolved
//! path, so older state values stay valid. Listener invocation is *not*
//! performed here: value changes are returned as [`Notification`]s and
//! delivered by the caller (see [`crate::FormStore`]) after the new tree is
//! committed.
//!
//! Transitions against missing targets (unknown field name, out-of-bounds
//! list index) leave the state unchanged.

use crate::listener::Notification;
use crate::record::{
    CURRENT_KEY, ERROR_KEY, HELPER_TEXT_KEY, INITIAL_KEY, ITEMS_KEY, PRISTINE_KEY, TOUCHED_KEY,
    VALUE_KEY,
};
use crate::sync::{EmbeddedNameSync, ListIndexSync};
use crate::{resolve_field_path, Action, FieldPath, FormState, Seg};
use serde_json::{Map, Value};
use std::sync::Arc;

/// The form state reducer.
///
/// Carries the index-renumbering collaborator invoked after list item
/// removal; everything else is stateless.
#[derive(Clone)]
pub struct FieldReducer {
    sync: Arc<dyn ListIndexSync>,
}

impl FieldReducer {
    /// Create a reducer with a custom renumbering collaborator.
    pub fn new(sync: Arc<dyn ListIndexSync>) -> Self {
        Self { sync }
    }

    /// Apply one transition, returning the successor state and any pending
    /// value-change notifications.
    pub fn reduce(&self, state: &FormState, action: Action) -> (FormState, Vec<Notification>) {
        match action {
            Action::UpdateValue { field_name, value } => update_value(state, field_name, value),
            Action::Touched { field_name } => {
                (set_current_entry(state, &field_name, TOUCHED_KEY, Value::Bool(true)), Vec::new())
            }
            Action::ValidationResult {
                field_name,
                error,
                helper_text,
            } => (validation_result(state, &field_name, error, helper_text), Vec::new()),
            Action::InsertField { field_name, record } => {
                (insert_field(state, field_name, record), Vec::new())
            }
            Action::RemoveField { field_name } => (remove_field(state, field_name), Vec::new()),
            Action::AddListItem { field_name, item } => {
                (add_list_item(state, &field_name, item), Vec::new())
            }
            Action::RemoveListItem { field_name, index } => {
                (self.remove_list_item(state, &field_name, index), Vec::new())
            }
            Action::AddListener {
                field_name,
                listener,
            } => {
                let mut next = state.clone();
                next.listeners_mut().add(field_name, listener);
                (next, Vec::new())
            }
            Action::RemoveListener {
                field_name,
                callback,
            } => {
                let mut next = state.clone();
                next.listeners_mut().remove(&field_name, &callback);
                (next, Vec::new())
            }
            Action::ValidateAll { results } => (validate_all(state, results), Vec::new()),
        }
    }

    fn remove_list_item(&self, state: &FormState, field_name: &str, index: usize) -> FormState {
        let path = resolve_field_path(field_name);
        let mut next = state.clone();

        let removed = get_at_path_mut(next.fields_mut(), path.segments())
            .and_then(|record| record.get_mut(ITEMS_KEY))
            .and_then(Value::as_array_mut)
            .map(|items| {
                if index < items.len() {
                    items.remove(index);
                    true
                } else {
                    false
                }
            })
            .unwrap_or(false);

        if !removed {
            tracing::trace!(field = field_name, index, "removeListItem target missing, state unchanged");
            return next;
        }

        self.sync.sync(next, field_name)
    }
}

impl Default for FieldReducer {
    fn default() -> Self {
        Self::new(Arc::new(EmbeddedNameSync))
    }
}

fn update_value(state: &FormState, field_name: String, value: Value) -> (FormState, Vec<Notification>) {
    let path = resolve_field_path(&field_name);
    let mut next = state.clone();
    let mut notifications = Vec::new();

    if let Some(record) = get_at_path_mut(next.fields_mut(), path.segments()) {
        let initial_value = record
            .get(INITIAL_KEY)
            .and_then(|initial| initial.get(VALUE_KEY))
            .cloned()
            .unwrap_or(Value::Null);
        let pristine = value == initial_value;

        if let Some(current) = current_mut(record) {
            let previous_value = current.get(VALUE_KEY).cloned().unwrap_or(Value::Null);
            current.insert(VALUE_KEY.to_owned(), value.clone());
            current.insert(PRISTINE_KEY.to_owned(), Value::Bool(pristine));

            if previous_value != value {
                notifications.push(Notification {
                    field_name,
                    new_value: value,
                    previous_value,
                });
            }
        }
    }

    (next, notifications)
}

fn validation_result(
    state: &FormState,
    field_name: &str,
    error: Value,
    helper_text: String,
) -> FormState {
    let path = resolve_field_path(field_name);
    let mut next = state.clone();
    if let Some(current) =
        get_at_path_mut(next.fields_mut(), path.segments()).and_then(current_mut)
    {
        current.insert(ERROR_KEY.to_owned(), error);
        current.insert(HELPER_TEXT_KEY.to_owned(), Value::String(helper_text));
    }
    next
}

/// Set a single entry in a field's `current` map, no-op if the field is
/// missing.
fn set_current_entry(state: &FormState, field_name: &str, key: &str, value: Value) -> FormState {
    let path = resolve_field_path(field_name);
    let mut next = state.clone();
    if let Some(current) =
        get_at_path_mut(next.fields_mut(), path.segments()).and_then(current_mut)
    {
        current.insert(key.to_owned(), value);
    }
    next
}

fn insert_field(state: &FormState, field_name: String, record: Value) -> FormState {
    let path = resolve_field_path(&field_name);
    let mut next = state.clone();
    if set_at_path(next.fields_mut(), path.segments(), record) {
        next.removed_fields_mut().remove(&field_name);
    }
    next
}

fn remove_field(state: &FormState, field_name: String) -> FormState {
    let path = resolve_field_path(&field_name);
    let mut next = state.clone();
    delete_at_path(next.fields_mut(), path.segments());
    next.removed_fields_mut().insert(field_name);
    next
}

fn add_list_item(state: &FormState, field_name: &str, item: Value) -> FormState {
    let path = resolve_field_path(field_name);
    let mut next = state.clone();

    let items = get_or_create_at_path(next.fields_mut(), path.segments()).and_then(|record| {
        if record.is_null() {
            *record = Value::Object(Map::new());
        }
        record
            .as_object_mut()?
            .entry(ITEMS_KEY)
            .or_insert_with(|| Value::Array(Vec::new()))
            .as_array_mut()
    });
    if let Some(items) = items {
        items.push(item);
    }
    next
}

fn validate_all(state: &FormState, results: Map<String, Value>) -> FormState {
    let mut next = state.clone();
    for (field_name, entry) in results {
        let (error, helper_text) = validation_from_entry(&entry);
        let path = resolve_field_path(&field_name);
        if let Some(current) =
            get_at_path_mut(next.fields_mut(), path.segments()).and_then(current_mut)
        {
            current.insert(ERROR_KEY.to_owned(), error);
            current.insert(HELPER_TEXT_KEY.to_owned(), Value::String(helper_text));
        }
    }
    next
}

/// Interpret one `validateAll` entry.
///
/// An `{error, helperText}` object is taken apart; a bare string becomes
/// `error: true` with the string as helper text; anything else is stored as
/// the error payload directly.
fn validation_from_entry(entry: &Value) -> (Value, String) {
    match entry {
        Value::Object(obj) => {
            let error = obj.get(ERROR_KEY).cloned().unwrap_or(Value::Bool(true));
            let helper_text = obj
                .get(HELPER_TEXT_KEY)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_owned();
            (error, helper_text)
        }
        Value::String(message) => (Value::Bool(true), message.clone()),
        other => (other.clone(), String::new()),
    }
}

/// Get the `current` map of a record, creating it when absent.
fn current_mut(record: &mut Value) -> Option<&mut Map<String, Value>> {
    record
        .as_object_mut()?
        .entry(CURRENT_KEY)
        .or_insert_with(|| Value::Object(Map::new()))
        .as_object_mut()
}

/// Get a reference to the value at a path in the field tree.
pub fn get_at_path<'a>(fields: &'a Value, path: &FieldPath) -> Option<&'a Value> {
    let mut current = fields;
    for seg in path.segments() {
        current = match seg {
            Seg::Key(key) => current.get(key.as_str())?,
            Seg::Index(index) => current.get(*index)?,
        };
    }
    Some(current)
}

/// Get a mutable reference to the value at a path in the field tree.
pub(crate) fn get_at_path_mut<'a>(fields: &'a mut Value, segments: &[Seg]) -> Option<&'a mut Value> {
    match segments {
        [] => Some(fields),
        [Seg::Key(key), rest @ ..] => {
            get_at_path_mut(fields.as_object_mut()?.get_mut(key)?, rest)
        }
        [Seg::Index(index), rest @ ..] => {
            get_at_path_mut(fields.as_array_mut()?.get_mut(*index)?, rest)
        }
    }
}

/// Check that a write walk can complete, without touching the tree.
///
/// Key segments may be created on the way down; index segments must resolve
/// to an existing array slot. Once a key is missing, only further key
/// segments can still succeed.
fn can_write_at_path(current: &Value, segments: &[Seg]) -> bool {
    match segments {
        [] => true,
        [Seg::Key(key), rest @ ..] => match current.get(key.as_str()) {
            Some(child) => can_write_at_path(child, rest),
            None => rest.iter().all(|seg| matches!(seg, Seg::Key(_))),
        },
        [Seg::Index(index), rest @ ..] => current
            .as_array()
            .and_then(|arr| arr.get(*index))
            .map_or(false, |child| can_write_at_path(child, rest)),
    }
}

/// Set a value at a path, creating intermediate objects for key segments.
///
/// Index segments must already exist. Returns whether the set happened; a
/// set that cannot complete leaves the tree untouched.
fn set_at_path(current: &mut Value, segments: &[Seg], value: Value) -> bool {
    if !can_write_at_path(current, segments) {
        return false;
    }
    write_at_path(current, segments, value);
    true
}

/// Infallible write walk; callers check `can_write_at_path` first.
fn write_at_path(current: &mut Value, segments: &[Seg], value: Value) {
    match segments {
        [] => *current = value,
        [Seg::Key(key), rest @ ..] => {
            if !current.is_object() {
                *current = Value::Object(Map::new());
            }
            let obj = current.as_object_mut().expect("object ensured above");
            if rest.is_empty() {
                obj.insert(key.clone(), value);
            } else {
                let entry = obj.entry(key.clone()).or_insert(Value::Null);
                write_at_path(entry, rest, value);
            }
        }
        [Seg::Index(index), rest @ ..] => {
            let slot = current
                .as_array_mut()
                .and_then(|arr| arr.get_mut(*index))
                .expect("walk checked by can_write_at_path");
            write_at_path(slot, rest, value);
        }
    }
}

/// Walk to a path, creating intermediate objects for key segments.
///
/// Returns `None` without touching the tree when an index segment is out of
/// bounds or hits a non-array.
fn get_or_create_at_path<'a>(current: &'a mut Value, segments: &[Seg]) -> Option<&'a mut Value> {
    if !can_write_at_path(current, segments) {
        return None;
    }
    Some(create_at_path(current, segments))
}

/// Infallible create walk; callers check `can_write_at_path` first.
fn create_at_path<'a>(current: &'a mut Value, segments: &[Seg]) -> &'a mut Value {
    match segments {
        [] => current,
        [Seg::Key(key), rest @ ..] => {
            if !current.is_object() {
                *current = Value::Object(Map::new());
            }
            let entry = current
                .as_object_mut()
                .expect("object ensured above")
                .entry(key.clone())
                .or_insert(Value::Null);
            create_at_path(entry, rest)
        }
        [Seg::Index(index), rest @ ..] => {
            let slot = current
                .as_array_mut()
                .and_then(|arr| arr.get_mut(*index))
                .expect("walk checked by can_write_at_path");
            create_at_path(slot, rest)
        }
    }
}

/// Try to delete a value at a path. Returns whether a deletion happened.
fn delete_at_path(current: &mut Value, segments: &[Seg]) -> bool {
    match segments {
        [] => false,
        [Seg::Key(key)] => current
            .as_object_mut()
            .map_or(false, |obj| obj.remove(key).is_some()),
        [Seg::Index(index)] => current.as_array_mut().map_or(false, |arr| {
            if *index < arr.len() {
                arr.remove(*index);
                true
            } else {
                false
            }
        }),
        [Seg::Key(key), rest @ ..] => current
            .as_object_mut()
            .and_then(|obj| obj.get_mut(key))
            .map_or(false, |child| delete_at_path(child, rest)),
        [Seg::Index(index), rest @ ..] => current
            .as_array_mut()
            .and_then(|arr| arr.get_mut(*index))
            .map_or(false, |child| delete_at_path(child, rest)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path;
    use serde_json::json;

    #[test]
    fn test_get_at_path() {
        let fields = json!({"list": {"items": [{"fields": {"x": {"current": {"value": 1}}}}]}});
        let found = get_at_path(&fields, &path!("list", "items", 0, "fields", "x"));
        assert_eq!(found, Some(&json!({"current": {"value": 1}})));

        assert_eq!(get_at_path(&fields, &path!("list", "items", 3)), None);
        assert_eq!(get_at_path(&fields, &path!("missing")), None);
    }

    #[test]
    fn test_set_at_path_creates_key_intermediates() {
        let mut fields = json!({});
        assert!(set_at_path(&mut fields, path!("a", "b").segments(), json!(1)));
        assert_eq!(fields, json!({"a": {"b": 1}}));
    }

    #[test]
    fn test_set_at_path_rejects_missing_index() {
        let mut fields = json!({"list": {"items": []}});
        let set = set_at_path(
            &mut fields,
            path!("list", "items", 0, "fields", "x").segments(),
            json!(1),
        );
        assert!(!set);
        assert_eq!(fields, json!({"list": {"items": []}}));
    }

    #[test]
    fn test_set_at_path_failed_set_leaves_tree_untouched() {
        let mut fields = json!({});
        let set = set_at_path(
            &mut fields,
            path!("newList", "items", 0, "fields", "x").segments(),
            json!(1),
        );
        assert!(!set);
        assert_eq!(fields, json!({}));
    }

    #[test]
    fn test_get_or_create_at_path_failed_walk_leaves_tree_untouched() {
        let mut fields = json!({"list": {"items": []}});
        let found =
            get_or_create_at_path(&mut fields, path!("list", "items", 2, "fields").segments());
        assert!(found.is_none());
        assert_eq!(fields, json!({"list": {"items": []}}));
    }

    #[test]
    fn test_delete_at_path() {
        let mut fields = json!({"a": 1, "list": {"items": [10, 20]}});
        assert!(delete_at_path(&mut fields, path!("a").segments()));
        assert!(delete_at_path(&mut fields, path!("list", "items", 0).segments()));
        assert!(!delete_at_path(&mut fields, path!("missing").segments()));
        assert_eq!(fields, json!({"list": {"items": [20]}}));
    }

    #[test]
    fn test_validation_from_entry_shapes() {
        assert_eq!(
            validation_from_entry(&json!({"error": true, "helperText": "bad"})),
            (json!(true), "bad".to_owned()),
        );
        assert_eq!(
            validation_from_entry(&json!("too short")),
            (json!(true), "too short".to_owned()),
        );
        assert_eq!(
            validation_from_entry(&json!({"helperText": "implied"})),
            (json!(true), "implied".to_owned()),
        );
        assert_eq!(validation_from_entry(&json!(false)), (json!(false), String::new()));
    }

    #[test]
    fn test_reduce_never_mutates_input() {
        let reducer = FieldReducer::default();
        let state = FormState::new().with_field("f", crate::record::new_record(json!("")));
        let before = state.clone();

        let (next, _) = reducer.reduce(&state, Action::update_value("f", json!("changed")));

        assert_eq!(state, before);
        assert_ne!(next, before);
    }
}
