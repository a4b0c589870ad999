//! taskboard subtask command implementations.

use chrono::Duration;

use crate::cli::{
    parse_status, render, ClearedReport, Context, DeletedReport, ScheduleArgs, SubtaskCommands,
};
use crate::error::{Error, Result};
use crate::model::{Subtask, TaskId, TaskKind, WorkItem};

fn not_found(id: TaskId) -> Error {
    Error::NotFound {
        kind: TaskKind::Subtask,
        id,
    }
}

pub(crate) fn run(ctx: &mut Context, command: SubtaskCommands) -> Result<()> {
    match command {
        SubtaskCommands::Add {
            epic,
            name,
            description,
            status,
            schedule,
        } => run_add(ctx, epic, name, description, status, schedule),
        SubtaskCommands::Update {
            id,
            name,
            description,
            status,
            schedule,
            unschedule,
        } => {
            let mut subtask = ctx.repo.get_subtask(id).ok_or_else(|| not_found(id))?;
            if let Some(name) = name {
                subtask.set_name(name);
            }
            if let Some(description) = description {
                subtask.set_description(description);
            }
            if let Some(status) = parse_status(status.as_deref())? {
                subtask.set_status(status);
            }
            if unschedule {
                subtask.set_schedule(None, Duration::zero());
            } else {
                let (start, duration) = schedule.merge(subtask.start_time(), subtask.duration())?;
                subtask.set_schedule(start, duration);
            }
            ctx.repo.update_subtask(&subtask)?;

            let mut human = ctx.human(format!("taskboard subtask update: #{id}"));
            render::describe_subtask(&mut human, &subtask, ctx.date_format());
            if let Some(epic) = ctx.repo.get_epic_by_subtask(&subtask) {
                human.push_summary("epic status", epic.status().to_string());
            }
            ctx.emit("subtask update", &subtask, &human)
        }
        SubtaskCommands::Show { id } => {
            let subtask = ctx.repo.get_subtask(id).ok_or_else(|| not_found(id))?;
            let mut human = ctx.human(format!("taskboard subtask: {}", subtask.name()));
            render::describe_subtask(&mut human, &subtask, ctx.date_format());
            ctx.emit("subtask show", &subtask, &human)
        }
        SubtaskCommands::List => {
            let subtasks = ctx.repo.manager().subtasks();
            let mut human = ctx.human(format!("taskboard subtasks: {}", subtasks.len()));
            for subtask in &subtasks {
                let owner = subtask
                    .epic_id()
                    .map(|epic_id| format!(" <- epic #{epic_id}"))
                    .unwrap_or_default();
                human.push_detail(format!("{}{owner}", render::line(subtask, ctx.date_format())));
            }
            ctx.emit("subtask list", &subtasks, &human)
        }
        SubtaskCommands::Delete { id } => {
            ctx.repo.delete_subtask(id)?.ok_or_else(|| not_found(id))?;
            let human = ctx.human(format!("taskboard subtask delete: #{id}"));
            let report = DeletedReport {
                kind: TaskKind::Subtask,
                id,
            };
            ctx.emit("subtask delete", &report, &human)
        }
        SubtaskCommands::Clear => {
            let removed = ctx.repo.manager().subtasks().len();
            ctx.repo.delete_subtasks()?;
            let mut human = ctx.human("taskboard subtask clear");
            human.push_summary("removed", removed.to_string());
            let report = ClearedReport {
                kind: TaskKind::Subtask,
                removed,
            };
            ctx.emit("subtask clear", &report, &human)
        }
    }
}

fn run_add(
    ctx: &mut Context,
    epic_id: TaskId,
    name: String,
    description: String,
    status: Option<String>,
    schedule: ScheduleArgs,
) -> Result<()> {
    let (start, duration) = schedule.resolve()?;
    let mut subtask = match start {
        Some(start) => Subtask::scheduled(name, description, start, duration),
        None => Subtask::new(name, description),
    };
    if let Some(status) = parse_status(status.as_deref())? {
        subtask.set_status(status);
    }

    let epic = ctx.repo.get_epic(epic_id).ok_or(Error::EpicNotFound(epic_id))?;
    let id = ctx.repo.add_subtask(&subtask, &epic)?;
    let stored = ctx.repo.get_subtask(id).ok_or_else(|| not_found(id))?;

    let mut human = ctx.human(format!("taskboard subtask add: #{id}"));
    render::describe_subtask(&mut human, &stored, ctx.date_format());
    if let Some(epic) = ctx.repo.get_epic_by_subtask(&stored) {
        human.push_summary("epic status", epic.status().to_string());
    }
    human.push_next_step(format!("taskboard epic show {epic_id}"));
    ctx.emit("subtask add", &stored, &human)
}
