//! taskboard demo: reference scenarios replayed against an in-memory repository.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::cli::render;
use crate::error::{Error, Result};
use crate::manager::TaskManager;
use crate::model::{Entity, Epic, Status, Subtask, Task, TaskId, TaskKind, WorkItem};
use crate::output::{emit_success, HumanOutput, OutputOptions};

#[derive(Debug, Serialize)]
struct DemoStep {
    action: String,
    outcome: String,
}

#[derive(Serialize)]
struct DemoReport {
    steps: Vec<DemoStep>,
    prioritized: Vec<Entity>,
    history: Vec<Entity>,
}

#[derive(Default)]
struct Script {
    steps: Vec<DemoStep>,
}

impl Script {
    fn record(&mut self, action: impl Into<String>, outcome: impl Into<String>) {
        self.steps.push(DemoStep {
            action: action.into(),
            outcome: outcome.into(),
        });
    }

    /// Record an operation whose failure is part of the scenario.
    fn attempt<T: std::fmt::Display>(&mut self, action: impl Into<String>, result: Result<T>) {
        let outcome = match result {
            Ok(value) => format!("ok: {value}"),
            Err(err) => format!("rejected: {err}"),
        };
        self.record(action, outcome);
    }
}

fn at(hour: u32, minute: u32) -> Result<NaiveDateTime> {
    NaiveDate::from_ymd_opt(2024, 1, 15)
        .and_then(|date| date.and_hms_opt(hour, minute, 0))
        .ok_or_else(|| Error::InvalidArgument(format!("invalid demo time {hour}:{minute}")))
}

fn epic_status(manager: &mut TaskManager, id: TaskId) -> String {
    manager
        .get_epic(id)
        .map(|epic| epic.status().to_string())
        .unwrap_or_else(|| "missing".to_string())
}

fn schedule_scenario(manager: &mut TaskManager, script: &mut Script) -> Result<()> {
    let a = Task::scheduled("A", "", at(10, 0)?, Duration::minutes(30));
    let b = Task::scheduled("B", "", at(10, 20)?, Duration::minutes(10));
    let c = Task::scheduled("C", "", at(10, 30)?, Duration::minutes(10));

    let mut added = Vec::new();
    for (action, task) in [
        ("add task A 10:00 +30m", &a),
        ("add task B 10:20 +10m", &b),
        ("add task C 10:30 +10m", &c),
    ] {
        let result = manager.add_task(task);
        if let Ok(id) = &result {
            added.push(*id);
        }
        script.attempt(action, result);
    }

    // Views feed the history shown at the end.
    for id in added.into_iter().rev() {
        manager.get_task(id);
    }
    Ok(())
}

fn epic_scenario(manager: &mut TaskManager, script: &mut Script) -> Result<()> {
    let epic_id = manager.add_epic(&Epic::new("E", "release"))?;
    script.record("add epic E", epic_status(manager, epic_id));

    let epic = manager
        .get_epic(epic_id)
        .ok_or(Error::EpicNotFound(epic_id))?;
    let first = manager.add_subtask(&Subtask::new("S1", ""), &epic)?;
    let second = manager.add_subtask(&Subtask::new("S2", ""), &epic)?;
    script.record("add subtasks S1, S2 (NEW)", epic_status(manager, epic_id));

    for (id, label) in [(first, "S1"), (second, "S2")] {
        let mut subtask = manager.get_subtask(id).ok_or(Error::NotFound {
            kind: TaskKind::Subtask,
            id,
        })?;
        subtask.set_status(Status::Done);
        manager.update_subtask(&subtask)?;
        script.record(format!("mark {label} DONE"), epic_status(manager, epic_id));
    }

    let mut forced = manager
        .get_epic(epic_id)
        .ok_or(Error::EpicNotFound(epic_id))?;
    forced.set_status(Status::New);
    manager.update_epic(&forced)?;
    script.record("force epic E to NEW", epic_status(manager, epic_id));

    let removed = manager
        .delete_epic(epic_id)
        .map(|epic| epic.subtasks().len())
        .unwrap_or_default();
    script.record(
        "delete epic E",
        format!("removed with {removed} subtasks, {} subtasks left", manager.subtasks().len()),
    );
    Ok(())
}

pub(crate) fn run(options: OutputOptions) -> Result<()> {
    let mut manager = TaskManager::new();
    let mut script = Script::default();

    schedule_scenario(&mut manager, &mut script)?;
    epic_scenario(&mut manager, &mut script)?;

    let report = DemoReport {
        steps: script.steps,
        prioritized: manager.get_prioritized_tasks(),
        history: manager.get_history(),
    };

    let format = "%H:%M";
    let mut human = HumanOutput::new("taskboard demo");
    for step in &report.steps {
        human.push_summary(step.action.clone(), step.outcome.clone());
    }
    for entity in &report.prioritized {
        human.push_detail(format!("prioritized {}", render::line(entity, format)));
    }
    for entity in &report.history {
        human.push_detail(format!("viewed {}", render::line(entity, format)));
    }

    emit_success(options, "demo", &report, Some(&human))
}
