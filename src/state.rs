//! The root form state value.
//!
//! `FormState` bundles the `fields` document (the renderer contract), the
//! opaque `formTools` context, the internal `removedFields` set, and the
//! listener registry. Transitions never mutate a `FormState` in place; the
//! reducer computes a successor and older values stay valid.

use crate::listener::ListenerRegistry;
use crate::record::{FIELDS_KEY, FORM_TOOLS_KEY, ITEMS_KEY, REMOVED_FIELDS_KEY};
use crate::reducer::get_at_path;
use crate::{resolve_field_path, value_type_name, FieldPath, FormStateError, FormStateResult};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::fmt;

/// Immutable root of the form state tree.
#[derive(Clone)]
pub struct FormState {
    /// Field-name -> record document. Always a JSON object.
    fields: Value,
    /// Opaque context, set once, passed through unchanged to listeners.
    form_tools: Value,
    /// Names of removed fields, reconciled on re-insertion.
    removed_fields: BTreeSet<String>,
    /// Listener registry; excluded from equality and serialization.
    listeners: ListenerRegistry,
}

impl FormState {
    /// Create an empty form state.
    pub fn new() -> Self {
        Self {
            fields: Value::Object(Map::new()),
            form_tools: Value::Null,
            removed_fields: BTreeSet::new(),
            listeners: ListenerRegistry::new(),
        }
    }

    /// Create a form state from an existing `fields` document.
    ///
    /// Non-object input is replaced with an empty object.
    pub fn with_fields(fields: Value) -> Self {
        let fields = if fields.is_object() {
            fields
        } else {
            Value::Object(Map::new())
        };
        Self {
            fields,
            ..Self::new()
        }
    }

    /// Set the opaque form-tools context (builder pattern).
    pub fn with_form_tools(mut self, form_tools: impl Into<Value>) -> Self {
        self.form_tools = form_tools.into();
        self
    }

    /// Insert a field record under a literal key (builder pattern).
    ///
    /// Used at initial load; the name is not path-resolved.
    pub fn with_field(mut self, name: impl Into<String>, record: Value) -> Self {
        if let Some(obj) = self.fields.as_object_mut() {
            obj.insert(name.into(), record);
        }
        self
    }

    /// The `fields` document.
    #[inline]
    pub fn fields(&self) -> &Value {
        &self.fields
    }

    /// The opaque form-tools context.
    #[inline]
    pub fn form_tools(&self) -> &Value {
        &self.form_tools
    }

    /// The removed-field names.
    #[inline]
    pub fn removed_fields(&self) -> &BTreeSet<String> {
        &self.removed_fields
    }

    /// The listener registry.
    #[inline]
    pub fn listeners(&self) -> &ListenerRegistry {
        &self.listeners
    }

    #[inline]
    pub(crate) fn fields_mut(&mut self) -> &mut Value {
        &mut self.fields
    }

    #[inline]
    pub(crate) fn removed_fields_mut(&mut self) -> &mut BTreeSet<String> {
        &mut self.removed_fields
    }

    #[inline]
    pub(crate) fn listeners_mut(&mut self) -> &mut ListenerRegistry {
        &mut self.listeners
    }

    /// Look up a field record by name (path-resolved).
    pub fn field(&self, name: &str) -> Option<&Value> {
        get_at_path(&self.fields, &resolve_field_path(name))
    }

    /// Look up a field's `current.value` by name.
    pub fn current_value(&self, name: &str) -> Option<&Value> {
        self.field(name)
            .and_then(|record| record.get(crate::record::CURRENT_KEY))
            .and_then(|current| current.get(crate::record::VALUE_KEY))
    }

    /// Look up a list item by list field name and index.
    pub fn list_item(&self, list_field: &str, index: usize) -> FormStateResult<&Value> {
        let path = resolve_field_path(list_field);
        let record = get_at_path(&self.fields, &path)
            .ok_or_else(|| FormStateError::path_not_found(path.clone()))?;
        let items = record
            .get(ITEMS_KEY)
            .ok_or_else(|| FormStateError::path_not_found(path.clone().key(ITEMS_KEY)))?;
        let arr = items.as_array().ok_or_else(|| {
            FormStateError::type_mismatch(
                path.clone().key(ITEMS_KEY),
                "array",
                value_type_name(items),
            )
        })?;
        arr.get(index)
            .ok_or_else(|| FormStateError::index_out_of_bounds(path.key(ITEMS_KEY), index, arr.len()))
    }

    /// Serialize to the renderer-contract document.
    ///
    /// Listeners are internal and never serialized.
    pub fn to_value(&self) -> Value {
        let mut root = Map::new();
        root.insert(FIELDS_KEY.to_owned(), self.fields.clone());
        root.insert(FORM_TOOLS_KEY.to_owned(), self.form_tools.clone());
        root.insert(
            REMOVED_FIELDS_KEY.to_owned(),
            Value::Array(
                self.removed_fields
                    .iter()
                    .map(|name| Value::String(name.clone()))
                    .collect(),
            ),
        );
        Value::Object(root)
    }

    /// Rebuild a form state from a renderer-contract document.
    ///
    /// `fields` defaults to an empty object, `formTools` to null and
    /// `removedFields` to empty when absent.
    pub fn try_from_value(value: Value) -> FormStateResult<Self> {
        let mut root = match value {
            Value::Object(root) => root,
            other => {
                return Err(FormStateError::type_mismatch(
                    FieldPath::new(),
                    "object",
                    value_type_name(&other),
                ))
            }
        };

        let fields = match root.remove(FIELDS_KEY) {
            None => Value::Object(Map::new()),
            Some(fields) if fields.is_object() => fields,
            Some(other) => {
                return Err(FormStateError::type_mismatch(
                    FieldPath::new().key(FIELDS_KEY),
                    "object",
                    value_type_name(&other),
                ))
            }
        };

        let form_tools = root.remove(FORM_TOOLS_KEY).unwrap_or(Value::Null);

        let mut removed_fields = BTreeSet::new();
        if let Some(removed) = root.remove(REMOVED_FIELDS_KEY) {
            let arr = removed.as_array().ok_or_else(|| {
                FormStateError::type_mismatch(
                    FieldPath::new().key(REMOVED_FIELDS_KEY),
                    "array",
                    value_type_name(&removed),
                )
            })?;
            for entry in arr {
                let name = entry.as_str().ok_or_else(|| {
                    FormStateError::type_mismatch(
                        FieldPath::new().key(REMOVED_FIELDS_KEY),
                        "string",
                        value_type_name(entry),
                    )
                })?;
                removed_fields.insert(name.to_owned());
            }
        }

        Ok(Self {
            fields,
            form_tools,
            removed_fields,
            listeners: ListenerRegistry::new(),
        })
    }
}

impl Default for FormState {
    fn default() -> Self {
        Self::new()
    }
}

/// Value equality over the state tree: fields, form tools and removed set.
/// Listener registries are identity-bearing and excluded.
impl PartialEq for FormState {
    fn eq(&self, other: &Self) -> bool {
        self.fields == other.fields
            && self.form_tools == other.form_tools
            && self.removed_fields == other.removed_fields
    }
}

impl fmt::Debug for FormState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormState")
            .field("fields", &self.fields)
            .field("form_tools", &self.form_tools)
            .field("removed_fields", &self.removed_fields)
            .field("listeners", &self.listeners)
            .finish()
    }
}
