//! Canonical schema constants for structured logging
//!
//! Every lifecycle event emitted by the engine uses these keys so that log
//! pipelines and tests can match on them without string drift.

pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_REQUEST_ID: &str = "request_id";
pub const FIELD_TRACE_ID: &str = "trace_id";

// Positioning
pub const FIELD_PARENT_ID: &str = "parent_id";
pub const FIELD_RECORD_ID: &str = "record_id";
pub const FIELD_POSITION: &str = "position";
pub const FIELD_SHIFTED: &str = "shifted";
pub const FIELD_ATTEMPT: &str = "attempt";

// Errors
pub const FIELD_ERR_KIND: &str = "err_kind";
pub const FIELD_ERR_CODE: &str = "err_code";

pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
pub const EVENT_RETRY: &str = "retry";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names_are_distinct() {
        let events = [EVENT_START, EVENT_END, EVENT_END_ERROR, EVENT_RETRY];
        for (i, a) in events.iter().enumerate() {
            for b in &events[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
