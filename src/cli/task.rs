//! taskboard task command implementations.

use crate::cli::{
    parse_status, render, ClearedReport, Context, DeletedReport, ScheduleArgs, TaskCommands,
};
use crate::error::{Error, Result};
use crate::model::{Task, TaskId, TaskKind, WorkItem};

pub(crate) fn run(ctx: &mut Context, command: TaskCommands) -> Result<()> {
    match command {
        TaskCommands::Add {
            name,
            description,
            status,
            schedule,
        } => run_add(ctx, name, description, status, schedule),
        TaskCommands::Update {
            id,
            name,
            description,
            status,
            schedule,
            unschedule,
        } => run_update(ctx, id, name, description, status, schedule, unschedule),
        TaskCommands::Show { id } => run_show(ctx, id),
        TaskCommands::List => run_list(ctx),
        TaskCommands::Delete { id } => run_delete(ctx, id),
        TaskCommands::Clear => run_clear(ctx),
    }
}

fn run_add(
    ctx: &mut Context,
    name: String,
    description: String,
    status: Option<String>,
    schedule: ScheduleArgs,
) -> Result<()> {
    let (start, duration) = schedule.resolve()?;
    let mut task = match start {
        Some(start) => Task::scheduled(name, description, start, duration),
        None => Task::new(name, description),
    };
    if let Some(status) = parse_status(status.as_deref())? {
        task.set_status(status);
    }

    let id = ctx.repo.add_task(&task)?;
    let stored = ctx.repo.get_task(id).ok_or(Error::NotFound {
        kind: TaskKind::Task,
        id,
    })?;

    let mut human = ctx.human(format!("taskboard task add: #{id}"));
    render::describe(&mut human, &stored, ctx.date_format());
    human.push_next_step(format!("taskboard task show {id}"));
    ctx.emit("task add", &stored, &human)
}

fn run_update(
    ctx: &mut Context,
    id: TaskId,
    name: Option<String>,
    description: Option<String>,
    status: Option<String>,
    schedule: ScheduleArgs,
    unschedule: bool,
) -> Result<()> {
    let mut task = ctx.repo.get_task(id).ok_or(Error::NotFound {
        kind: TaskKind::Task,
        id,
    })?;
    if let Some(name) = name {
        task.set_name(name);
    }
    if let Some(description) = description {
        task.set_description(description);
    }
    if let Some(status) = parse_status(status.as_deref())? {
        task.set_status(status);
    }
    if unschedule {
        task.set_schedule(None, chrono::Duration::zero());
    } else {
        let (start, duration) = schedule.merge(task.start_time(), task.duration())?;
        task.set_schedule(start, duration);
    }

    ctx.repo.update_task(&task)?;

    let mut human = ctx.human(format!("taskboard task update: #{id}"));
    render::describe(&mut human, &task, ctx.date_format());
    ctx.emit("task update", &task, &human)
}

fn run_show(ctx: &mut Context, id: TaskId) -> Result<()> {
    let task = ctx.repo.get_task(id).ok_or(Error::NotFound {
        kind: TaskKind::Task,
        id,
    })?;
    let mut human = ctx.human(format!("taskboard task: {}", task.name()));
    render::describe(&mut human, &task, ctx.date_format());
    ctx.emit("task show", &task, &human)
}

fn run_list(ctx: &mut Context) -> Result<()> {
    let tasks = ctx.repo.manager().tasks();
    let mut human = ctx.human(format!("taskboard tasks: {}", tasks.len()));
    for task in &tasks {
        human.push_detail(render::line(task, ctx.date_format()));
    }
    if tasks.is_empty() {
        human.push_next_step("taskboard task add <name>");
    }
    ctx.emit("task list", &tasks, &human)
}

fn run_delete(ctx: &mut Context, id: TaskId) -> Result<()> {
    ctx.repo.delete_task(id)?.ok_or(Error::NotFound {
        kind: TaskKind::Task,
        id,
    })?;
    let human = ctx.human(format!("taskboard task delete: #{id}"));
    let report = DeletedReport {
        kind: TaskKind::Task,
        id,
    };
    ctx.emit("task delete", &report, &human)
}

fn run_clear(ctx: &mut Context) -> Result<()> {
    let removed = ctx.repo.manager().tasks().len();
    ctx.repo.delete_tasks()?;
    let mut human = ctx.human("taskboard task clear");
    human.push_summary("removed", removed.to_string());
    let report = ClearedReport {
        kind: TaskKind::Task,
        removed,
    };
    ctx.emit("task clear", &report, &human)
}
