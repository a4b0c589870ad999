//! Epic status and schedule derivation.
//!
//! An epic never carries its own schedule: everything here is a pure function
//! of the subtask list, applied to the epic as one [`EpicSummary`] value.

use chrono::{Duration, NaiveDateTime};

use crate::error::{Error, Result};
use crate::model::{Status, Subtask, WorkItem};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpicSummary {
    pub status: Status,
    pub start_time: Option<NaiveDateTime>,
    pub end_time: Option<NaiveDateTime>,
    pub duration: Duration,
}

impl Default for EpicSummary {
    fn default() -> Self {
        Self {
            status: Status::New,
            start_time: None,
            end_time: None,
            duration: Duration::zero(),
        }
    }
}

/// NEW when empty or all NEW, DONE when all DONE, IN_PROGRESS otherwise.
pub fn derive_status<I>(statuses: I) -> Status
where
    I: IntoIterator<Item = Status>,
{
    let mut all_new = true;
    let mut all_done = true;
    for status in statuses {
        all_new &= status == Status::New;
        all_done &= status == Status::Done;
        if !all_new && !all_done {
            return Status::InProgress;
        }
    }
    // An empty list leaves both flags set; NEW wins.
    if all_new {
        Status::New
    } else if all_done {
        Status::Done
    } else {
        Status::InProgress
    }
}

/// Fails when the summed subtask durations leave the representable range.
pub fn summarize(subtasks: &[Subtask]) -> Result<EpicSummary> {
    let start_time = subtasks.iter().filter_map(|subtask| subtask.start_time()).min();
    let end_time = subtasks.iter().filter_map(|subtask| subtask.end_time()).max();
    let mut duration = Duration::zero();
    for subtask in subtasks {
        duration = duration.checked_add(&subtask.duration()).ok_or_else(|| {
            Error::InvalidArgument(format!(
                "total duration of subtasks overflows at '{}'",
                subtask.name()
            ))
        })?;
    }

    Ok(EpicSummary {
        status: derive_status(subtasks.iter().map(|subtask| subtask.status())),
        start_time,
        end_time,
        duration,
    })
}
