// Lifecycle events emitted by the engine boundary
//
// The capture is global to this test binary, so every test uses its own
// parent or record id to find its events.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::memory_engine;
use ordo_core::logging_facility::test_capture::init_test_capture;
use ordo_core_types::schema::{EVENT_END, EVENT_END_ERROR, EVENT_START};
use tracing::Level;

#[test]
fn test_create_logs_start_and_end_with_same_request_id() {
    let capture = init_test_capture();
    let engine = memory_engine(&["log-create-q1"]);

    let entry = engine.append("log-create-q1", ()).unwrap();

    let events = capture.events_for("create", "parent_id", "log-create-q1");
    let start = events
        .iter()
        .find(|e| e.event.as_deref() == Some(EVENT_START))
        .expect("start event");
    let end = events
        .iter()
        .find(|e| e.event.as_deref() == Some(EVENT_END))
        .expect("end event");

    assert_eq!(start.field("request_id"), end.field("request_id"));
    assert_eq!(end.field("record_id"), Some(entry.record.id.as_str()));
    assert_eq!(end.field("position"), Some("1"));
    assert!(end.field("duration_ms").is_some());
}

#[test]
fn test_failed_move_logs_end_error_with_code() {
    let capture = init_test_capture();
    let engine = memory_engine(&[]);

    let _ = engine.move_to("log-missing-record", 1);

    let errors: Vec<_> = capture
        .events()
        .into_iter()
        .filter(|e| {
            e.op.as_deref() == Some("move")
                && e.event.as_deref() == Some(EVENT_END_ERROR)
                && e.field("error")
                    .is_some_and(|msg| msg.contains("log-missing-record"))
        })
        .collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].level, Level::ERROR);
    assert_eq!(errors[0].field("err_code"), Some("ERR_NOT_FOUND"));
}

#[test]
fn test_invalid_position_is_logged_as_error() {
    let capture = init_test_capture();
    let engine = memory_engine(&["log-invalid-q"]);

    let _ = engine.insert_at("log-invalid-q", 0, ());

    let errors: Vec<_> = capture
        .events()
        .into_iter()
        .filter(|e| {
            e.op.as_deref() == Some("create")
                && e.event.as_deref() == Some(EVENT_END_ERROR)
                && e.field("error")
                    .is_some_and(|msg| msg.contains("log-invalid-q"))
        })
        .collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field("err_code"), Some("ERR_INVALID_POSITION"));
}

#[test]
fn test_reindex_end_reports_rewrites() {
    let capture = init_test_capture();
    let engine = memory_engine(&["log-reindex-q"]);
    let first = engine.append("log-reindex-q", ()).unwrap();
    engine.append("log-reindex-q", ()).unwrap();
    engine.release(&first.record.id).unwrap();

    engine.reindex("log-reindex-q").unwrap();

    let ends: Vec<_> = capture
        .events_for("reindex", "parent_id", "log-reindex-q")
        .into_iter()
        .filter(|e| e.event.as_deref() == Some(EVENT_END))
        .collect();
    assert_eq!(ends.len(), 1);
    assert_eq!(ends[0].field("shifted"), Some("1"));
}
