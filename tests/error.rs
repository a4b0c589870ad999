use chrono::NaiveDate;
use serde_json::Value;
use taskboard::error::{exit_codes, Error, JsonError};
use taskboard::TaskKind;

#[test]
fn exit_code_user_error() {
    let err = Error::NotFound {
        kind: TaskKind::Subtask,
        id: 9,
    };
    assert_eq!(err.exit_code(), exit_codes::USER_ERROR);
    assert_eq!(err.to_string(), "subtask not found: 9");
}

#[test]
fn exit_code_rejected() {
    assert_eq!(Error::EpicNotFound(3).exit_code(), exit_codes::REJECTED);
    assert_eq!(Error::DuplicateId(3).exit_code(), exit_codes::REJECTED);
}

#[test]
fn exit_code_operation_failed() {
    let err = Error::MalformedRecord {
        line: 4,
        reason: "invalid status 'LATER'".to_string(),
    };
    assert_eq!(err.exit_code(), exit_codes::OPERATION_FAILED);
    assert_eq!(
        Error::InvalidFormat("header".to_string()).exit_code(),
        exit_codes::OPERATION_FAILED
    );
}

#[test]
fn details_include_conflict_fields() {
    let day = NaiveDate::from_ymd_opt(2024, 5, 1).expect("date");
    let err = Error::ScheduleConflict {
        name: "B".to_string(),
        conflicting_id: 1,
        start: day.and_hms_opt(10, 20, 0).expect("time"),
        end: day.and_hms_opt(10, 30, 0).expect("time"),
    };
    assert_eq!(err.exit_code(), exit_codes::REJECTED);
    let details = err.details().expect("details");
    assert_eq!(details["name"], Value::String("B".to_string()));
    assert_eq!(details["conflicting_id"], Value::from(1));
    assert_eq!(details["start"], Value::String("2024-05-01 10:20:00".to_string()));
}

#[test]
fn json_error_includes_details() {
    let err = Error::InvalidConfig("bad config".to_string());
    let json = JsonError::from(&err);
    assert_eq!(json.code, exit_codes::USER_ERROR);
    let details = json.details.expect("details");
    assert_eq!(details["message"], Value::String("bad config".to_string()));
}
