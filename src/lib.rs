//! Path-addressed state-transition engine for structured form state.
//!
//! `form-state` tracks, for every field in a (possibly nested, possibly
//! list-backed) form schema, the field's initial value, current value, and
//! derived UI status (pristine, touched, error, helper text). Field names
//! are plain strings; dotted names are opaque identifiers unless they carry
//! an `items.<index>.fields.` list marker, which resolves into a traversal
//! through list items.
//!
//! # Core Concepts
//!
//! - **FieldPath / resolve_field_path**: pure resolver from field-name
//!   strings to structural addresses in the field tree
//! - **Action**: tagged union over the transition vocabulary
//!   (`updateValue`, `touched`, `validationResult`, `insertField`,
//!   `removeField`, `addListItem`, `removeListItem`, `addListener`,
//!   `removeListener`, `validateAll`)
//! - **FieldReducer**: pure reduction `(state, action) -> (state',
//!   notifications)`; the input state is never mutated and stays valid
//! - **FormState**: the immutable state root (`fields` document, opaque
//!   `formTools`, removed-field set, listener registry)
//! - **FormStore**: serialized dispatch with deferred listener delivery and
//!   snapshot history
//!
//! # Quick Start
//!
//! ```
//! use form_state::{record, Action, FieldReducer, FormState};
//! use serde_json::json;
//!
//! let state = FormState::new()
//!     .with_form_tools(json!({"form": "signup"}))
//!     .with_field("email", record::new_record(json!("")));
//!
//! let reducer = FieldReducer::default();
//! let (state, notifications) =
//!     reducer.reduce(&state, Action::update_value("email", json!("a@b.c")));
//!
//! assert_eq!(state.current_value("email"), Some(&json!("a@b.c")));
//! assert_eq!(notifications.len(), 1);
//! assert_eq!(state.field("email").unwrap()["current"]["pristine"], json!(false));
//! ```
//!
//! # List-item addressing
//!
//! ```
//! use form_state::{path, resolve_field_path};
//!
//! // Dots alone never split a name.
//! assert_eq!(resolve_field_path("data.name"), path!("data.name"));
//!
//! // A list marker does.
//! assert_eq!(
//!     resolve_field_path("data.listField.items.1.fields.city"),
//!     path!("data.listField", "items", 1, "fields", "city"),
//! );
//! ```

mod action;
mod error;
mod listener;
mod path;
pub mod record;
mod reducer;
mod state;
mod store;
mod sync;

pub use action::Action;
pub use error::{value_type_name, FormStateError, FormStateResult};
pub use listener::{deliver, FieldListener, ListenerFn, ListenerRegistry, Notification};
pub use path::{resolve_field_path, FieldPath, Seg};
pub use reducer::{get_at_path, FieldReducer};
pub use state::FormState;
pub use store::{DispatchResult, FormStore};
pub use sync::{EmbeddedNameSync, ListIndexSync};

// Re-export serde_json::Value for convenience
pub use serde_json::Value;
