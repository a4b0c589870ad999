//! Human rendering of entities.

use chrono::{Duration, NaiveDateTime};

use crate::model::{Epic, Subtask, WorkItem};
use crate::output::HumanOutput;

fn timestamp(value: Option<NaiveDateTime>, format: &str) -> String {
    value
        .map(|value| value.format(format).to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn minutes(duration: Duration) -> String {
    format!("{}m", duration.num_minutes())
}

/// One-line summary used by list commands.
pub(crate) fn line<T: WorkItem + ?Sized>(item: &T, format: &str) -> String {
    let mut line = format!(
        "#{} [{}] {} ({})",
        item.id(),
        item.kind().as_str(),
        item.name(),
        item.status()
    );
    if let Some(start) = item.start_time() {
        line.push_str(&format!(
            " {} +{}",
            start.format(format),
            minutes(item.duration())
        ));
    }
    line
}

/// Summary block for a single item.
pub(crate) fn describe<T: WorkItem + ?Sized>(human: &mut HumanOutput, item: &T, format: &str) {
    human.push_summary("id", item.id().to_string());
    human.push_summary("type", item.kind().as_str());
    human.push_summary("name", item.name());
    if !item.description().is_empty() {
        human.push_summary("description", item.description());
    }
    human.push_summary("status", item.status().to_string());
    human.push_summary("start", timestamp(item.start_time(), format));
    human.push_summary("end", timestamp(item.end_time(), format));
    human.push_summary("duration", minutes(item.duration()));
}

pub(crate) fn describe_epic(human: &mut HumanOutput, epic: &Epic, format: &str) {
    describe(human, epic, format);
    for subtask in epic.subtasks() {
        human.push_detail(line(subtask, format));
    }
}

pub(crate) fn describe_subtask(human: &mut HumanOutput, subtask: &Subtask, format: &str) {
    describe(human, subtask, format);
    if let Some(epic) = subtask.epic() {
        human.push_summary("epic", format!("#{} {}", epic.id(), epic.name()));
    }
}
