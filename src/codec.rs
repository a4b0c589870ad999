//! Row codec for the snapshot file.
//!
//! One header line followed by one comma-separated row per entity:
//!
//! ```text
//! id,type,name,status,description,epic,start_time,duration
//! 1,TASK,Write report,NEW,"Draft, review",,2024-05-01T10:00:00,30
//! 2,EPIC,Release,IN_PROGRESS,,,,
//! 3,SUBTASK,Tag build,DONE,,2,,
//! ```
//!
//! `epic` is only set for subtasks, `duration` is in whole minutes and left
//! empty when zero. Fields containing a comma, quote or newline are quoted
//! with inner quotes doubled.

use chrono::{Duration, NaiveDateTime};

use crate::error::{Error, Result};
use crate::model::{
    parse_date_time, Entity, Epic, Status, Subtask, Task, TaskId, TaskKind, WorkItem,
    UNASSIGNED_ID,
};

pub const HEADER: [&str; 8] = [
    "id",
    "type",
    "name",
    "status",
    "description",
    "epic",
    "start_time",
    "duration",
];

pub const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// One decoded row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub id: TaskId,
    pub kind: TaskKind,
    pub name: String,
    pub status: Status,
    pub description: String,
    pub epic_id: Option<TaskId>,
    pub start_time: Option<NaiveDateTime>,
    pub duration: Duration,
}

impl Record {
    pub fn from_entity(entity: &Entity) -> Self {
        let epic_id = match entity {
            Entity::Subtask(subtask) => subtask.epic_id(),
            _ => None,
        };
        Self {
            id: entity.id(),
            kind: entity.kind(),
            name: entity.name().to_string(),
            status: entity.status(),
            description: entity.description().to_string(),
            epic_id,
            start_time: entity.start_time(),
            duration: entity.duration(),
        }
    }

    fn to_row(&self) -> [String; 8] {
        let minutes = self.duration.num_minutes();
        [
            self.id.to_string(),
            self.kind.as_str().to_string(),
            self.name.clone(),
            self.status.as_str().to_string(),
            self.description.clone(),
            self.epic_id.map(|id| id.to_string()).unwrap_or_default(),
            self.start_time
                .map(|start| start.format(DATE_TIME_FORMAT).to_string())
                .unwrap_or_default(),
            if minutes == 0 {
                String::new()
            } else {
                minutes.to_string()
            },
        ]
    }

    fn from_row(row: &csv::StringRecord) -> std::result::Result<Self, String> {
        if row.len() != HEADER.len() {
            return Err(format!(
                "expected {} fields, found {}",
                HEADER.len(),
                row.len()
            ));
        }

        let id: TaskId = row[0]
            .trim()
            .parse()
            .map_err(|_| format!("invalid id '{}'", &row[0]))?;
        if id == UNASSIGNED_ID {
            return Err("id must be non-zero".to_string());
        }
        let kind: TaskKind = row[1].parse().map_err(|err: Error| err.to_string())?;
        let status: Status = row[3].parse().map_err(|err: Error| err.to_string())?;

        let epic_id = match (kind, row[5].trim()) {
            (TaskKind::Subtask, "") => return Err("subtask without epic id".to_string()),
            (TaskKind::Subtask, value) => Some(
                value
                    .parse::<TaskId>()
                    .map_err(|_| format!("invalid epic id '{value}'"))?,
            ),
            _ => None,
        };

        let start_time = match row[6].trim() {
            "" => None,
            value => Some(
                parse_date_time(value).ok_or_else(|| format!("invalid start time '{value}'"))?,
            ),
        };

        let duration = match row[7].trim() {
            "" => Duration::zero(),
            value => value
                .parse::<i64>()
                .ok()
                .filter(|minutes| *minutes >= 0)
                .and_then(Duration::try_minutes)
                .ok_or_else(|| format!("invalid duration '{value}'"))?,
        };

        Ok(Self {
            id,
            kind,
            name: row[2].to_string(),
            status,
            description: row[4].to_string(),
            epic_id,
            start_time,
            duration,
        })
    }

    pub fn to_task(&self) -> Task {
        Task::from_parts(
            self.id,
            self.name.clone(),
            self.description.clone(),
            self.status,
            self.start_time,
            self.duration,
        )
    }

    /// Epic rows only carry descriptive fields; the rest is derived.
    pub fn to_epic(&self) -> Epic {
        Epic::from_parts(self.id, self.name.clone(), self.description.clone())
    }

    pub fn to_subtask(&self) -> Subtask {
        Subtask::from_parts(
            self.id,
            self.name.clone(),
            self.description.clone(),
            self.status,
            self.start_time,
            self.duration,
        )
    }
}

/// Rows that decoded, with their line numbers, plus the ones that did not.
#[derive(Debug, Default)]
pub struct Decoded {
    pub records: Vec<(u64, Record)>,
    pub errors: Vec<Error>,
}

pub fn encode(entities: &[Entity]) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Necessary)
        .from_writer(Vec::new());
    writer.write_record(HEADER)?;
    for entity in entities {
        writer.write_record(Record::from_entity(entity).to_row())?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| Error::Io(err.into_error()))?;
    String::from_utf8(bytes).map_err(|err| Error::InvalidFormat(err.to_string()))
}

/// Decode a snapshot. A wrong header fails the whole decode; bad rows are
/// collected in [`Decoded::errors`] and skipped.
pub fn decode(input: &str) -> Result<Decoded> {
    let mut decoded = Decoded::default();
    if input.trim().is_empty() {
        return Ok(decoded);
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(input.as_bytes());

    let header = reader.headers()?;
    let matches = header.len() == HEADER.len()
        && header
            .iter()
            .zip(HEADER)
            .all(|(found, expected)| found.trim().eq_ignore_ascii_case(expected));
    if !matches {
        return Err(Error::InvalidFormat(format!(
            "unexpected header '{}', expected '{}'",
            header.iter().collect::<Vec<_>>().join(","),
            HEADER.join(",")
        )));
    }

    for row in reader.records() {
        match row {
            Ok(row) => {
                let line = row.position().map(|pos| pos.line()).unwrap_or_default();
                if row.iter().all(|field| field.trim().is_empty()) {
                    continue;
                }
                match Record::from_row(&row) {
                    Ok(record) => decoded.records.push((line, record)),
                    Err(reason) => decoded.errors.push(Error::MalformedRecord { line, reason }),
                }
            }
            Err(err) => {
                let line = err.position().map(|pos| pos.line()).unwrap_or_default();
                decoded.errors.push(Error::MalformedRecord {
                    line,
                    reason: err.to_string(),
                });
            }
        }
    }

    Ok(decoded)
}
