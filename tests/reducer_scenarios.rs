//! Reducer scenario coverage: every operation of the transition vocabulary
//! against scalar, dotted and list-backed fields.

use form_state::{
    deliver, record, Action, FieldReducer, FormState, ListIndexSync, ListenerFn, Notification,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

const FIELD: &str = "field-name";
const OTHER: &str = "otherField";

fn base_state() -> FormState {
    FormState::new()
        .with_form_tools(json!({"current": "current-form-tools"}))
        .with_field(FIELD, record::new_record(json!("")))
        .with_field(OTHER, record::new_record(json!("")))
}

fn reduce(state: &FormState, action: Action) -> (FormState, Vec<Notification>) {
    FieldReducer::default().reduce(state, action)
}

#[test]
fn update_value_sets_current_value() {
    let (next, _) = reduce(&base_state(), Action::update_value(FIELD, json!("new value")));

    let current = &next.field(FIELD).unwrap()["current"];
    assert_eq!(current["value"], json!("new value"));
    assert_eq!(current["pristine"], json!(false));
    // Untouched keys survive the transition.
    assert_eq!(current["touched"], json!(false));
    assert_eq!(current["error"], json!(false));
}

#[test]
fn pristine_tracks_deep_equality_with_initial() {
    let state = base_state();
    let (dirty, _) = reduce(&state, Action::update_value(FIELD, json!("new value")));
    assert_eq!(dirty.field(FIELD).unwrap()["current"]["pristine"], json!(false));

    // Back to the initial value: pristine again.
    let (clean, _) = reduce(&dirty, Action::update_value(FIELD, json!("")));
    assert_eq!(clean.field(FIELD).unwrap()["current"]["pristine"], json!(true));
}

#[test]
fn update_value_leaves_other_fields_untouched() {
    let state = base_state();
    let before = state.field(OTHER).unwrap().clone();

    let (next, _) = reduce(&state, Action::update_value(FIELD, json!("changed")));

    assert_eq!(next.field(OTHER).unwrap(), &before);
}

#[test]
fn update_value_on_missing_field_is_identity() {
    let state = base_state();
    let (next, notifications) = reduce(&state, Action::update_value("missing", json!("x")));
    assert_eq!(next, state);
    assert!(notifications.is_empty());
}

#[test]
fn touched_set_on_current() {
    let (next, _) = reduce(&base_state(), Action::touched(FIELD));
    let current = &next.field(FIELD).unwrap()["current"];
    assert_eq!(current["touched"], json!(true));
    assert_eq!(current["value"], json!(""));
}

#[test]
fn validation_result_set_on_current() {
    let (next, _) = reduce(
        &base_state(),
        Action::validation_result(FIELD, true, "i am error"),
    );
    let current = &next.field(FIELD).unwrap()["current"];
    assert_eq!(current["error"], json!(true));
    assert_eq!(current["helperText"], json!("i am error"));
}

#[test]
fn insert_field_stores_record() {
    let record = json!({"initial": {"value": "one"}, "current": {"value": "one"}});
    let (next, _) = reduce(&base_state(), Action::insert_field("newField", record.clone()));
    assert_eq!(next.field("newField"), Some(&record));
}

#[test]
fn insert_field_clears_removed_mark() {
    let state = base_state();
    let (removed, _) = reduce(&state, Action::remove_field("newField"));
    assert!(removed.removed_fields().contains("newField"));

    let record = json!({"initial": {"value": "one"}, "current": {"value": "one"}});
    let (reinserted, _) = reduce(&removed, Action::insert_field("newField", record));

    assert!(!reinserted.removed_fields().contains("newField"));
    assert!(reinserted.field("newField").is_some());
}

#[test]
fn insert_field_on_missing_list_path_is_identity() {
    let state = base_state();
    let (next, _) = reduce(
        &state,
        Action::insert_field("newList.items.0.fields.x", record::new_record(json!(""))),
    );

    assert_eq!(next, state);
    // No partial intermediates were left behind.
    assert!(next.fields().get("newList").is_none());
}

#[test]
fn remove_field_deletes_record_and_marks_name() {
    let (next, _) = reduce(&base_state(), Action::remove_field(FIELD));
    assert!(next.field(FIELD).is_none());
    assert!(next.removed_fields().contains(FIELD));
    assert!(next.field(OTHER).is_some());
}

#[test]
fn dotted_field_name_is_one_key() {
    let state = FormState::new().with_field("parent.nested", record::new_record(json!("")));
    let (next, _) = reduce(&state, Action::update_value("parent.nested", json!("new value")));

    assert_eq!(next.current_value("parent.nested"), Some(&json!("new value")));
    // No nested "parent" object was created.
    assert!(next.fields().get("parent").is_none());
}

// -- list-backed fields -------------------------------------------------

fn list_state() -> FormState {
    FormState::new()
        .with_field(
            "data.listField",
            json!({
                "items": [
                    {},
                    { "fields": { FIELD: record::new_record(json!("")) } },
                ],
            }),
        )
        .with_field(OTHER, record::new_record(json!("")))
}

fn list_item_field() -> String {
    format!("data.listField.items.1.fields.{FIELD}")
}

#[test]
fn update_value_reaches_list_item_field() {
    let (next, notifications) = reduce(
        &list_state(),
        Action::update_value(list_item_field(), json!("new value")),
    );

    let record = &next.list_item("data.listField", 1).unwrap()["fields"][FIELD];
    assert_eq!(record["current"]["value"], json!("new value"));
    assert_eq!(record["current"]["pristine"], json!(false));
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].field_name, list_item_field());
}

#[test]
fn touched_reaches_list_item_field() {
    let (next, _) = reduce(&list_state(), Action::touched(list_item_field()));
    let record = &next.list_item("data.listField", 1).unwrap()["fields"][FIELD];
    assert_eq!(record["current"]["touched"], json!(true));
}

#[test]
fn add_list_item_appends_wrapped_item() {
    let item = json!({"fields": {FIELD: record::new_record(json!(""))}});
    let (next, _) = reduce(
        &list_state(),
        Action::add_list_item_entry("data.listField", item.clone()),
    );

    assert_eq!(next.list_item("data.listField", 2).unwrap(), &item);
    assert!(next.list_item("data.listField", 3).is_err());
}

#[test]
fn add_list_item_wraps_bare_field_map() {
    let bare = json!({"name": record::new_record(json!("x"))});
    let (next, _) = reduce(&list_state(), Action::add_list_item("data.listField", bare));

    let item = next.list_item("data.listField", 2).unwrap();
    assert!(item["fields"]["name"].is_object());
}

#[test]
fn add_list_item_wraps_sub_field_named_fields() {
    // A sub-field literally named "fields" is still a bare map entry.
    let bare = json!({"fields": record::new_record(json!("x"))});
    let (next, _) = reduce(&list_state(), Action::add_list_item("data.listField", bare));

    let item = next.list_item("data.listField", 2).unwrap();
    assert!(item["fields"]["fields"]["initial"].is_object());
}

#[test]
fn add_list_item_creates_missing_list_field() {
    let (next, _) = reduce(&FormState::new(), Action::add_list_item("fresh", json!({})));
    assert_eq!(next.list_item("fresh", 0).unwrap(), &json!({"fields": {}}));
}

#[test]
fn add_list_item_on_missing_parent_list_is_identity() {
    let state = base_state();
    let (next, _) = reduce(
        &state,
        Action::add_list_item("gone.items.0.fields.inner", json!({})),
    );
    assert_eq!(next, state);
}

/// Recording stand-in for the renumbering collaborator.
struct RecordingSync {
    calls: Arc<Mutex<Vec<String>>>,
}

impl ListIndexSync for RecordingSync {
    fn sync(&self, state: FormState, list_field: &str) -> FormState {
        self.calls.lock().unwrap().push(list_field.to_owned());
        state
    }
}

#[test]
fn remove_list_item_removes_one_and_invokes_sync_once() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let reducer = FieldReducer::new(Arc::new(RecordingSync { calls: calls.clone() }));

    let (next, _) = reducer.reduce(&list_state(), Action::remove_list_item("data.listField", 1));

    assert!(next.list_item("data.listField", 0).is_ok());
    assert!(next.list_item("data.listField", 1).is_err());
    assert_eq!(*calls.lock().unwrap(), vec!["data.listField".to_owned()]);
}

#[test]
fn remove_list_item_out_of_bounds_is_identity_without_sync() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let reducer = FieldReducer::new(Arc::new(RecordingSync { calls: calls.clone() }));

    let state = list_state();
    let (next, _) = reducer.reduce(&state, Action::remove_list_item("data.listField", 9));

    assert_eq!(next, state);
    assert!(calls.lock().unwrap().is_empty());
}

// -- listeners ----------------------------------------------------------

type CallLog = Arc<Mutex<Vec<(String, Value, Value, Value)>>>;

fn logging_callback(log: CallLog, tag: &'static str) -> Arc<ListenerFn> {
    Arc::new(move |new_value, previous_value, form_tools| {
        log.lock().unwrap().push((
            tag.to_owned(),
            new_value.clone(),
            previous_value.clone(),
            form_tools.clone(),
        ));
    })
}

fn deliver_all(state: &FormState, notifications: &[Notification]) -> usize {
    deliver(notifications, state.listeners(), state.form_tools())
}

#[test]
fn listeners_called_in_order_on_value_change() {
    let log: CallLog = Arc::new(Mutex::new(Vec::new()));
    let reducer = FieldReducer::default();

    let (state, _) = reducer.reduce(
        &base_state(),
        Action::update_value(FIELD, json!("previousValue")),
    );
    let (state, _) = reducer.reduce(
        &state,
        Action::add_listener(FIELD, logging_callback(log.clone(), "one")),
    );
    let (state, _) = reducer.reduce(
        &state,
        Action::add_listener(FIELD, logging_callback(log.clone(), "two")),
    );

    let (state, notifications) =
        reducer.reduce(&state, Action::update_value(FIELD, json!("i am update")));
    let invoked = deliver_all(&state, &notifications);

    assert_eq!(invoked, 2);
    let calls = log.lock().unwrap();
    let expected = |tag: &str| {
        (
            tag.to_owned(),
            json!("i am update"),
            json!("previousValue"),
            json!({"current": "current-form-tools"}),
        )
    };
    assert_eq!(*calls, vec![expected("one"), expected("two")]);
}

#[test]
fn equal_value_update_does_not_notify() {
    let log: CallLog = Arc::new(Mutex::new(Vec::new()));
    let reducer = FieldReducer::default();

    let (state, _) = reducer.reduce(
        &base_state(),
        Action::add_listener(FIELD, logging_callback(log.clone(), "one")),
    );
    // Current value is already "".
    let (state, notifications) = reducer.reduce(&state, Action::update_value(FIELD, json!("")));
    deliver_all(&state, &notifications);

    assert!(notifications.is_empty());
    assert!(log.lock().unwrap().is_empty());
}

#[test]
fn listener_not_called_for_other_fields() {
    let log: CallLog = Arc::new(Mutex::new(Vec::new()));
    let reducer = FieldReducer::default();

    let (state, _) = reducer.reduce(
        &base_state(),
        Action::add_listener(FIELD, logging_callback(log.clone(), "one")),
    );
    let (state, notifications) =
        reducer.reduce(&state, Action::update_value(OTHER, json!("i am update")));
    deliver_all(&state, &notifications);

    assert!(log.lock().unwrap().is_empty());
}

#[test]
fn remove_listener_removes_by_reference() {
    let log: CallLog = Arc::new(Mutex::new(Vec::new()));
    let reducer = FieldReducer::default();

    let cb_one = logging_callback(log.clone(), "one");
    let cb_two = logging_callback(log.clone(), "two");

    let (state, _) = reducer.reduce(
        &base_state(),
        Action::update_value(FIELD, json!("previousValue")),
    );
    let (state, _) = reducer.reduce(&state, Action::add_listener(FIELD, cb_one.clone()));
    let (state, _) = reducer.reduce(&state, Action::add_listener(FIELD, cb_two));
    let (state, _) = reducer.reduce(&state, Action::remove_listener(FIELD, cb_one));

    assert_eq!(state.listeners().count_for(FIELD), 1);

    let (state, notifications) =
        reducer.reduce(&state, Action::update_value(FIELD, json!("i am update")));
    deliver_all(&state, &notifications);

    let calls = log.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "two");
    assert_eq!(calls[0].1, json!("i am update"));
    assert_eq!(calls[0].2, json!("previousValue"));
}

// -- validateAll --------------------------------------------------------

#[test]
fn validate_all_merges_errors_onto_named_fields_only() {
    let state = base_state().with_field("untouched", record::new_record(json!("keep")));
    let before = state.field("untouched").unwrap().clone();

    let (next, _) = reduce(
        &state,
        Action::validate_all([
            (FIELD.to_owned(), json!("error 1")),
            (OTHER.to_owned(), json!("error 2")),
        ]),
    );

    assert_eq!(next.field(FIELD).unwrap()["current"]["error"], json!(true));
    assert_eq!(
        next.field(FIELD).unwrap()["current"]["helperText"],
        json!("error 1"),
    );
    assert_eq!(
        next.field(OTHER).unwrap()["current"]["helperText"],
        json!("error 2"),
    );
    assert_eq!(next.field("untouched").unwrap(), &before);
}

#[test]
fn validate_all_accepts_structured_entries() {
    let (next, _) = reduce(
        &base_state(),
        Action::validate_all([(
            FIELD.to_owned(),
            json!({"error": {"code": 7}, "helperText": "structured"}),
        )]),
    );

    let current = &next.field(FIELD).unwrap()["current"];
    assert_eq!(current["error"], json!({"code": 7}));
    assert_eq!(current["helperText"], json!("structured"));
}

#[test]
fn validate_all_skips_unknown_fields() {
    let state = base_state();
    let (next, _) = reduce(
        &state,
        Action::validate_all([("ghost".to_owned(), json!("boo"))]),
    );
    assert_eq!(next, state);
}
