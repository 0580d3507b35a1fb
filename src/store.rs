//! FormStore: serialized transitions with deferred listener dispatch.
//!
//! The store owns the latest [`FormState`] behind a `tokio` `RwLock` and
//! applies actions one at a time. Listener notification is deferred past the
//! commit: the reducer only returns pending notifications, and the store
//! delivers them after the successor state is installed, so listeners
//! observe a fully settled world. Notifications for a dispatch are always
//! drained before the next dispatch from the same caller is processed.
//!
//! Every transition also snapshots the successor into a history list; old
//! snapshots stay valid, enabling replay/undo.

use crate::listener::deliver;
use crate::{Action, FieldReducer, FormState, FormStateError, FormStateResult};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Result of dispatching one action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchResult {
    /// Whether the transition changed the state tree (value equality).
    pub changed: bool,
    /// Number of listener invocations performed.
    pub notified: usize,
}

/// Store applying form transitions against the latest state.
pub struct FormStore {
    reducer: Arc<FieldReducer>,
    initial: FormState,
    state: Arc<RwLock<FormState>>,
    history: Arc<RwLock<Vec<FormState>>>,
}

impl FormStore {
    /// Create a store with the default reducer.
    pub fn new(initial: FormState) -> Self {
        Self::with_reducer(initial, FieldReducer::default())
    }

    /// Create a store with a custom reducer (e.g. a custom renumbering
    /// collaborator).
    pub fn with_reducer(initial: FormState, reducer: FieldReducer) -> Self {
        Self {
            reducer: Arc::new(reducer),
            state: Arc::new(RwLock::new(initial.clone())),
            initial,
            history: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Get a snapshot of the current state.
    pub async fn snapshot(&self) -> FormState {
        self.state.read().await.clone()
    }

    /// Get the current state without waiting.
    ///
    /// Returns `None` while a transition holds the lock. Safe to call from
    /// inside a listener: notifications are delivered after the lock is
    /// released.
    pub fn try_snapshot(&self) -> Option<FormState> {
        self.state.try_read().ok().map(|state| state.clone())
    }

    /// The state the store was created with.
    pub fn initial(&self) -> &FormState {
        &self.initial
    }

    /// Apply one action, commit the successor, then deliver pending
    /// notifications.
    pub async fn dispatch(&self, action: Action) -> DispatchResult {
        let name = action.name();

        let mut state = self.state.write().await;
        let (next, notifications) = self.reducer.reduce(&state, action);
        let changed = next != *state;
        *state = next.clone();
        drop(state);

        self.history.write().await.push(next.clone());

        tracing::debug!(
            action = name,
            changed,
            pending = notifications.len(),
            "applied form transition"
        );

        let notified = deliver(&notifications, next.listeners(), next.form_tools());
        if notified > 0 {
            tracing::trace!(action = name, notified, "delivered field notifications");
        }

        DispatchResult { changed, notified }
    }

    /// Number of transitions recorded.
    pub async fn history_len(&self) -> usize {
        self.history.read().await.len()
    }

    /// Get the state as it was after transition `index` (zero-based).
    pub async fn replay_to(&self, index: usize) -> FormStateResult<FormState> {
        let history = self.history.read().await;
        history
            .get(index)
            .cloned()
            .ok_or(FormStateError::InvalidReplayIndex {
                index,
                len: history.len(),
            })
    }

    /// Drop recorded history (keeps the current state).
    pub async fn clear_history(&self) {
        self.history.write().await.clear();
    }
}

impl Clone for FormStore {
    fn clone(&self) -> Self {
        Self {
            reducer: Arc::clone(&self.reducer),
            initial: self.initial.clone(),
            state: Arc::clone(&self.state),
            history: Arc::clone(&self.history),
        }
    }
}
