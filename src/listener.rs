//! Per-field value-change listeners.
//!
//! Listeners are registered under the exact field-name string (including the
//! full list-item path) and fire in registration order when that field's
//! value changes. Removal is by callback reference identity, so a listener
//! is a handle around an `Arc`'d callback plus a unique id.

use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Callback signature: `(new_value, previous_value, form_tools)`.
pub type ListenerFn = dyn Fn(&Value, &Value, &Value) + Send + Sync;

static NEXT_LISTENER_ID: AtomicU64 = AtomicU64::new(1);

/// A registered value-change listener.
///
/// Cloning shares the callback and keeps the id, so clones are
/// interchangeable for identity-based removal.
#[derive(Clone)]
pub struct FieldListener {
    id: u64,
    callback: Arc<ListenerFn>,
}

impl FieldListener {
    /// Wrap a shared callback into a listener handle.
    pub fn new(callback: Arc<ListenerFn>) -> Self {
        Self {
            id: NEXT_LISTENER_ID.fetch_add(1, Ordering::Relaxed),
            callback,
        }
    }

    /// Convenience constructor from a plain closure.
    pub fn from_fn(f: impl Fn(&Value, &Value, &Value) + Send + Sync + 'static) -> Self {
        Self::new(Arc::new(f))
    }

    /// Unique id of this listener.
    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// The shared callback.
    #[inline]
    pub fn callback(&self) -> &Arc<ListenerFn> {
        &self.callback
    }

    /// Invoke the callback, isolating panics.
    ///
    /// A panicking listener must not prevent later listeners from being
    /// notified; the panic is caught and logged.
    pub fn invoke(&self, new_value: &Value, previous_value: &Value, form_tools: &Value) {
        let result = catch_unwind(AssertUnwindSafe(|| {
            (self.callback)(new_value, previous_value, form_tools)
        }));
        if result.is_err() {
            tracing::error!(listener_id = self.id, "field listener panicked during notification");
        }
    }
}

impl fmt::Debug for FieldListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldListener").field("id", &self.id).finish()
    }
}

/// Registry of listeners keyed by exact field-name string.
///
/// Registration order per field is preserved. The registry is not part of
/// field value equality and is excluded from state serialization.
#[derive(Clone, Default)]
pub struct ListenerRegistry {
    by_field: BTreeMap<String, Vec<FieldListener>>,
}

impl ListenerRegistry {
    /// Create an empty registry.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a listener under the given field name.
    pub fn add(&mut self, field_name: impl Into<String>, listener: FieldListener) {
        self.by_field.entry(field_name.into()).or_default().push(listener);
    }

    /// Remove every listener under `field_name` whose callback is
    /// reference-equal to the given one.
    pub fn remove(&mut self, field_name: &str, callback: &Arc<ListenerFn>) {
        if let Some(listeners) = self.by_field.get_mut(field_name) {
            listeners.retain(|l| !Arc::ptr_eq(&l.callback, callback));
            if listeners.is_empty() {
                self.by_field.remove(field_name);
            }
        }
    }

    /// Listeners registered for a field, in registration order.
    pub fn listeners_for(&self, field_name: &str) -> &[FieldListener] {
        self.by_field.get(field_name).map_or(&[], Vec::as_slice)
    }

    /// Number of listeners registered for a field.
    pub fn count_for(&self, field_name: &str) -> usize {
        self.by_field.get(field_name).map_or(0, Vec::len)
    }

    /// Check if the registry has no listeners at all.
    pub fn is_empty(&self) -> bool {
        self.by_field.is_empty()
    }
}

impl fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (field, listeners) in &self.by_field {
            map.entry(field, &listeners.len());
        }
        map.finish()
    }
}

/// A pending value-change notification produced by the reducer.
///
/// Notifications are delivered after the new state tree is fully committed,
/// never from inside the reduction itself.
#[derive(Clone, Debug, PartialEq)]
pub struct Notification {
    /// Full field-name string the change occurred on.
    pub field_name: String,
    /// The value after the transition.
    pub new_value: Value,
    /// The value before the transition.
    pub previous_value: Value,
}

/// Deliver pending notifications against a registry.
///
/// Every listener registered for a notified field at delivery time is
/// invoked in registration order with `(new, previous, form_tools)`.
/// Returns the number of listener invocations performed.
pub fn deliver(
    notifications: &[Notification],
    registry: &ListenerRegistry,
    form_tools: &Value,
) -> usize {
    let mut invoked = 0;
    for notification in notifications {
        for listener in registry.listeners_for(&notification.field_name) {
            listener.invoke(
                &notification.new_value,
                &notification.previous_value,
                form_tools,
            );
            invoked += 1;
        }
    }
    invoked
}
