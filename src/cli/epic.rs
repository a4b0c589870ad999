//! taskboard epic command implementations.

use crate::cli::{render, ClearedReport, Context, DeletedReport, EpicCommands};
use crate::error::{Error, Result};
use crate::model::{Epic, TaskId, TaskKind, WorkItem};

fn not_found(id: TaskId) -> Error {
    Error::NotFound {
        kind: TaskKind::Epic,
        id,
    }
}

pub(crate) fn run(ctx: &mut Context, command: EpicCommands) -> Result<()> {
    match command {
        EpicCommands::Add { name, description } => {
            let id = ctx.repo.add_epic(&Epic::new(name, description))?;
            let epic = ctx.repo.get_epic(id).ok_or_else(|| not_found(id))?;

            let mut human = ctx.human(format!("taskboard epic add: #{id}"));
            render::describe_epic(&mut human, &epic, ctx.date_format());
            human.push_next_step(format!("taskboard subtask add {id} <name>"));
            ctx.emit("epic add", &epic, &human)
        }
        EpicCommands::Update {
            id,
            name,
            description,
        } => {
            let mut epic = ctx.repo.get_epic(id).ok_or_else(|| not_found(id))?;
            if let Some(name) = name {
                epic.set_name(name);
            }
            if let Some(description) = description {
                epic.set_description(description);
            }
            ctx.repo.update_epic(&epic)?;
            let epic = ctx.repo.get_epic(id).ok_or_else(|| not_found(id))?;

            let mut human = ctx.human(format!("taskboard epic update: #{id}"));
            render::describe_epic(&mut human, &epic, ctx.date_format());
            ctx.emit("epic update", &epic, &human)
        }
        EpicCommands::Show { id } => {
            let epic = ctx.repo.get_epic(id).ok_or_else(|| not_found(id))?;
            let mut human = ctx.human(format!("taskboard epic: {}", epic.name()));
            render::describe_epic(&mut human, &epic, ctx.date_format());
            ctx.emit("epic show", &epic, &human)
        }
        EpicCommands::List => {
            let epics = ctx.repo.manager().epics();
            let mut human = ctx.human(format!("taskboard epics: {}", epics.len()));
            for epic in &epics {
                human.push_detail(format!(
                    "{} [{} subtasks]",
                    render::line(epic, ctx.date_format()),
                    epic.subtasks().len()
                ));
            }
            ctx.emit("epic list", &epics, &human)
        }
        EpicCommands::Delete { id } => {
            let epic = ctx.repo.delete_epic(id)?.ok_or_else(|| not_found(id))?;
            let mut human = ctx.human(format!("taskboard epic delete: #{id}"));
            human.push_summary("subtasks removed", epic.subtasks().len().to_string());
            let report = DeletedReport {
                kind: TaskKind::Epic,
                id,
            };
            ctx.emit("epic delete", &report, &human)
        }
        EpicCommands::Clear => {
            let removed = ctx.repo.manager().epics().len();
            ctx.repo.delete_epics()?;
            let mut human = ctx.human("taskboard epic clear");
            human.push_summary("removed", removed.to_string());
            let report = ClearedReport {
                kind: TaskKind::Epic,
                removed,
            };
            ctx.emit("epic clear", &report, &human)
        }
        EpicCommands::Subtasks { id } => {
            if ctx.repo.manager().kind_of(id) != Some(TaskKind::Epic) {
                return Err(not_found(id));
            }
            let subtasks = ctx.repo.get_subtasks_by_epic_id(id);
            let mut human = ctx.human(format!("taskboard epic #{id} subtasks: {}", subtasks.len()));
            for subtask in &subtasks {
                human.push_detail(render::line(subtask, ctx.date_format()));
            }
            ctx.emit("epic subtasks", &subtasks, &human)
        }
    }
}
