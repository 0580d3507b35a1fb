//! Index renumbering after list item removal.
//!
//! Removing a list item shifts every later sibling down by one, so any data
//! that embeds an item's full path must be rewritten to match the new
//! positions. The reducer invokes the collaborator exactly once per
//! `removeListItem` transition, on the post-removal state.

use crate::record::{FIELDS_KEY, INITIAL_KEY, ITEMS_KEY};
use crate::{resolve_field_path, FormState};
use serde_json::Value;

/// Renumbering collaborator contract.
///
/// Implementations must be idempotent and must not alter fields outside the
/// named list.
pub trait ListIndexSync: Send + Sync {
    /// Re-derive item-position data for `list_field` and return the state.
    fn sync(&self, state: FormState, list_field: &str) -> FormState;
}

/// Key inside `initial` holding renderer field metadata.
const FIELD_META_KEY: &str = "field";
/// Key inside the field metadata holding the full path name.
const NAME_KEY: &str = "name";

/// Default collaborator: rewrites embedded full-path field names.
///
/// Each sub-field record in a list item may carry its own full path under
/// `initial.field.name` (placed there by the schema layer so the renderer
/// can address the field). After a removal those names still reference the
/// old indices; this implementation rewrites the `items.<index>` portion to
/// the item's new position. Records without an embedded name are left
/// untouched.
#[derive(Clone, Copy, Debug, Default)]
pub struct EmbeddedNameSync;

impl ListIndexSync for EmbeddedNameSync {
    fn sync(&self, mut state: FormState, list_field: &str) -> FormState {
        let path = resolve_field_path(list_field);
        let items = crate::reducer::get_at_path_mut(state.fields_mut(), path.segments())
            .and_then(|record| record.get_mut(ITEMS_KEY))
            .and_then(Value::as_array_mut);

        if let Some(items) = items {
            for (index, item) in items.iter_mut().enumerate() {
                let Some(fields) = item.get_mut(FIELDS_KEY).and_then(Value::as_object_mut) else {
                    continue;
                };
                for (sub_name, sub_record) in fields.iter_mut() {
                    let embedded = sub_record
                        .get_mut(INITIAL_KEY)
                        .and_then(|initial| initial.get_mut(FIELD_META_KEY))
                        .and_then(|meta| meta.get_mut(NAME_KEY));
                    if let Some(name) = embedded {
                        if name.is_string() {
                            *name = Value::String(format!(
                                "{list_field}.{ITEMS_KEY}.{index}.{FIELDS_KEY}.{sub_name}"
                            ));
                        }
                    }
                }
            }
        }

        state
    }
}
