mod support;

use chrono::Duration;
use taskboard::{Entity, Epic, Error, Status, Subtask, Task, TaskManager, TaskPatch, WorkItem};

use support::{at, minutes, stored_epic};

#[test]
fn back_to_back_tasks_fit_but_overlaps_are_rejected() {
    let mut manager = TaskManager::new();

    let a = manager
        .add_task(&Task::scheduled("A", "", at(10, 0), minutes(30)))
        .expect("A fits");
    let err = manager
        .add_task(&Task::scheduled("B", "", at(10, 20), minutes(10)))
        .expect_err("B overlaps A");
    match err {
        Error::ScheduleConflict {
            name,
            conflicting_id,
            ..
        } => {
            assert_eq!(name, "B");
            assert_eq!(conflicting_id, a);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    let c = manager
        .add_task(&Task::scheduled("C", "", at(10, 30), minutes(10)))
        .expect("C starts when A ends");

    let order: Vec<_> = manager
        .get_prioritized_tasks()
        .iter()
        .map(|entity| entity.id())
        .collect();
    assert_eq!(order, vec![a, c]);
}

#[test]
fn same_start_conflicts_even_with_zero_duration() {
    let mut manager = TaskManager::new();
    manager
        .add_task(&Task::scheduled("A", "", at(9, 0), minutes(0)))
        .expect("A");
    assert!(matches!(
        manager.add_task(&Task::scheduled("B", "", at(9, 0), minutes(0))),
        Err(Error::ScheduleConflict { .. })
    ));
}

#[test]
fn subtasks_and_tasks_share_one_timeline() {
    let mut manager = TaskManager::new();
    let epic = stored_epic(&mut manager, "E");
    manager
        .add_subtask(&Subtask::scheduled("S", "", at(14, 0), minutes(60)), &epic)
        .expect("S");
    assert!(matches!(
        manager.add_task(&Task::scheduled("T", "", at(14, 30), minutes(15))),
        Err(Error::ScheduleConflict { .. })
    ));
}

#[test]
fn update_may_keep_or_shift_its_own_slot() {
    let mut manager = TaskManager::new();
    let id = manager
        .add_task(&Task::scheduled("A", "", at(10, 0), minutes(30)))
        .expect("A");
    let other = manager
        .add_task(&Task::scheduled("B", "", at(11, 0), minutes(30)))
        .expect("B");

    let task = manager.get_task(id).expect("A");
    manager
        .update_task(&task.copy_with(TaskPatch {
            start_time: Some(at(10, 15)),
            ..TaskPatch::default()
        }))
        .expect("shift within own slot");

    let err = manager
        .update_task(&task.copy_with(TaskPatch {
            start_time: Some(at(10, 45)),
            ..TaskPatch::default()
        }))
        .expect_err("runs into B");
    assert!(matches!(err, Error::ScheduleConflict { conflicting_id, .. } if conflicting_id == other));
    assert_eq!(
        manager.get_task(id).expect("A").start_time(),
        Some(at(10, 15))
    );
}

#[test]
fn epic_status_follows_subtasks() {
    let mut manager = TaskManager::new();
    let epic = stored_epic(&mut manager, "E");
    let epic_id = epic.id();
    assert_eq!(epic.status(), Status::New);

    let s1 = manager
        .add_subtask(&Subtask::new("S1", ""), &epic)
        .expect("S1");
    let s2 = manager
        .add_subtask(&Subtask::new("S2", ""), &epic)
        .expect("S2");
    assert_eq!(manager.get_epic(epic_id).expect("E").status(), Status::New);

    let mut first = manager.get_subtask(s1).expect("S1");
    first.set_status(Status::Done);
    manager.update_subtask(&first).expect("update S1");
    assert_eq!(
        manager.get_epic(epic_id).expect("E").status(),
        Status::InProgress
    );

    let mut second = manager.get_subtask(s2).expect("S2");
    second.set_status(Status::Done);
    manager.update_subtask(&second).expect("update S2");
    assert_eq!(manager.get_epic(epic_id).expect("E").status(), Status::Done);

    manager.delete_subtasks();
    let epic = manager.get_epic(epic_id).expect("E");
    assert_eq!(epic.status(), Status::New);
    assert!(epic.subtasks().is_empty());
}

#[test]
fn epic_schedule_spans_its_subtasks() {
    let mut manager = TaskManager::new();
    let epic = stored_epic(&mut manager, "E");
    manager
        .add_subtask(&Subtask::scheduled("late", "", at(15, 0), minutes(30)), &epic)
        .expect("late");
    manager
        .add_subtask(&Subtask::scheduled("early", "", at(9, 0), minutes(60)), &epic)
        .expect("early");
    manager
        .add_subtask(&Subtask::new("unscheduled", ""), &epic)
        .expect("unscheduled");

    let epic = manager.get_epic(epic.id()).expect("E");
    assert_eq!(epic.start_time(), Some(at(9, 0)));
    assert_eq!(epic.end_time(), Some(at(15, 30)));
    assert_eq!(epic.duration(), minutes(90));
}

#[test]
fn forced_epic_status_is_recomputed() {
    let mut manager = TaskManager::new();
    let mut epic = stored_epic(&mut manager, "E");
    epic.set_status(Status::Done);
    epic.set_name("Renamed");
    manager.update_epic(&epic).expect("update");

    let stored = manager.get_epic(epic.id()).expect("E");
    assert_eq!(stored.name(), "Renamed");
    assert_eq!(stored.status(), Status::New);
}

#[test]
fn returned_values_are_copies() {
    let mut manager = TaskManager::new();
    let id = manager.add_task(&Task::new("A", "original")).expect("A");

    let mut copy = manager.get_task(id).expect("A");
    copy.set_description("changed outside");
    assert_eq!(
        manager.get_task(id).expect("A").description(),
        "original"
    );

    let mut input = Task::new("B", "");
    let b = manager.add_task(&input).expect("B");
    input.set_name("mutated input");
    assert_eq!(manager.get_task(b).expect("B").name(), "B");
}

#[test]
fn subtask_requires_a_stored_epic() {
    let mut manager = TaskManager::new();
    let ghost = Epic::from_parts(42, "ghost", "");
    assert!(matches!(
        manager.add_subtask(&Subtask::new("S", ""), &ghost),
        Err(Error::EpicNotFound(42))
    ));
    assert!(manager.is_empty());
    assert_eq!(manager.next_id(), 1);
}

#[test]
fn subtask_knows_its_epic() {
    let mut manager = TaskManager::new();
    let epic = stored_epic(&mut manager, "E");
    let id = manager
        .add_subtask(&Subtask::new("S", ""), &epic)
        .expect("S");
    let subtask = manager.get_subtask(id).expect("S");

    assert_eq!(subtask.epic_id(), Some(epic.id()));
    assert_eq!(subtask.epic().map(|epic| epic.name()), Some("E"));
    let owner = manager.get_epic_by_subtask(&subtask).expect("owner");
    assert_eq!(owner.subtask_ids(), vec![id]);
    assert_eq!(manager.get_subtasks_by_epic_id(epic.id()).len(), 1);
    assert!(manager.get_subtasks_by_epic_id(999).is_empty());
}

#[test]
fn deleting_an_epic_cascades() {
    let mut manager = TaskManager::new();
    let epic = stored_epic(&mut manager, "E");
    let s1 = manager
        .add_subtask(&Subtask::scheduled("S1", "", at(8, 0), minutes(30)), &epic)
        .expect("S1");
    manager.get_subtask(s1).expect("view S1");

    let removed = manager.delete_epic(epic.id()).expect("deleted");
    assert_eq!(removed.subtask_ids(), vec![s1]);
    assert!(manager.subtasks().is_empty());
    assert!(manager.get_history().is_empty());
    assert!(manager.get_prioritized_tasks().is_empty());

    // the freed slot can be reused
    manager
        .add_task(&Task::scheduled("T", "", at(8, 0), minutes(30)))
        .expect("slot free");
}

#[test]
fn deleting_a_subtask_unlinks_and_recomputes() {
    let mut manager = TaskManager::new();
    let epic = stored_epic(&mut manager, "E");
    let open = manager
        .add_subtask(&Subtask::new("open", ""), &epic)
        .expect("open");
    let mut done = Subtask::new("done", "");
    done.set_status(Status::Done);
    manager.add_subtask(&done, &epic).expect("done");
    assert_eq!(
        manager.get_epic(epic.id()).expect("E").status(),
        Status::InProgress
    );

    manager.delete_subtask(open).expect("deleted");
    let epic = manager.get_epic(epic.id()).expect("E");
    assert_eq!(epic.subtasks().len(), 1);
    assert_eq!(epic.status(), Status::Done);
}

#[test]
fn deleting_missing_ids_is_a_no_op() {
    let mut manager = TaskManager::new();
    assert!(manager.delete_task(7).is_none());
    assert!(manager.delete_epic(7).is_none());
    assert!(manager.delete_subtask(7).is_none());
    assert!(matches!(
        manager.update_task(&Task::from_parts(7, "x", "", Status::New, None, minutes(0))),
        Err(Error::NotFound { id: 7, .. })
    ));
}

#[test]
fn history_is_deduplicated_and_ordered() {
    let mut manager = TaskManager::new();
    let a = manager.add_task(&Task::new("A", "")).expect("A");
    let b = manager.add_task(&Task::new("B", "")).expect("B");
    let epic = stored_epic(&mut manager, "E");

    manager.get_task(a);
    manager.get_task(b);
    manager.get_task(a);

    let ids: Vec<_> = manager.get_history().iter().map(Entity::id).collect();
    assert_eq!(ids, vec![epic.id(), b, a]);

    manager.delete_task(b);
    let ids: Vec<_> = manager.get_history().iter().map(Entity::id).collect();
    assert_eq!(ids, vec![epic.id(), a]);

    manager.clear_history();
    assert!(manager.get_history().is_empty());
}

#[test]
fn history_keeps_the_viewed_snapshot() {
    let mut manager = TaskManager::new();
    let id = manager.add_task(&Task::new("before", "")).expect("task");
    let mut task = manager.get_task(id).expect("task");
    task.set_name("after");
    manager.update_task(&task).expect("update");

    let history = manager.get_history();
    assert_eq!(history[0].name(), "before");
}

#[test]
fn bulk_deletes_leave_other_kinds_alone() {
    let mut manager = TaskManager::new();
    manager.add_task(&Task::new("T", "")).expect("T");
    let epic = stored_epic(&mut manager, "E");
    manager
        .add_subtask(&Subtask::new("S", ""), &epic)
        .expect("S");

    manager.delete_tasks();
    assert!(manager.tasks().is_empty());
    assert_eq!(manager.epics().len(), 1);
    assert_eq!(manager.subtasks().len(), 1);

    manager.delete_epics();
    assert!(manager.is_empty());
    assert_eq!(manager.next_id(), 4);
}

#[test]
fn snapshot_orders_tasks_then_epics_then_subtasks() {
    let mut manager = TaskManager::new();
    let epic = stored_epic(&mut manager, "E");
    manager
        .add_subtask(&Subtask::new("S", ""), &epic)
        .expect("S");
    manager.add_task(&Task::new("T", "")).expect("T");

    let kinds: Vec<_> = manager
        .snapshot()
        .iter()
        .map(|entity| entity.kind().as_str())
        .collect();
    assert_eq!(kinds, vec!["TASK", "EPIC", "SUBTASK"]);
}

#[test]
fn added_items_keep_the_callers_status() {
    let mut manager = TaskManager::new();
    let mut task = Task::new("T", "");
    task.set_status(Status::InProgress);
    let task_id = manager.add_task(&task).expect("T");
    assert_eq!(
        manager.get_task(task_id).expect("T").status(),
        Status::InProgress
    );

    let epic = stored_epic(&mut manager, "E");
    let mut subtask = Subtask::new("S", "");
    subtask.set_status(Status::Done);
    let subtask_id = manager.add_subtask(&subtask, &epic).expect("S");
    assert_eq!(
        manager.get_subtask(subtask_id).expect("S").status(),
        Status::Done
    );
    assert_eq!(manager.get_epic(epic.id()).expect("E").status(), Status::Done);
}

#[test]
fn overflowing_epic_duration_leaves_the_repository_untouched() {
    let mut manager = TaskManager::new();
    let epic = stored_epic(&mut manager, "E");
    let huge = Duration::minutes(100_000_000_000_000);

    let first = manager
        .add_subtask(&Subtask::from_parts(0, "S1", "", Status::New, None, huge), &epic)
        .expect("S1 fits");
    let err = manager
        .add_subtask(&Subtask::from_parts(0, "S2", "", Status::New, None, huge), &epic)
        .expect_err("total overflows");
    assert!(matches!(err, Error::InvalidArgument(_)));

    assert_eq!(manager.subtasks().len(), 1);
    assert_eq!(manager.next_id(), first + 1);
    let stored = manager.get_epic(epic.id()).expect("E");
    assert_eq!(stored.subtask_ids(), vec![first]);
    assert_eq!(stored.duration(), huge);

    let small = manager
        .add_subtask(&Subtask::new("S3", ""), &epic)
        .expect("S3");
    assert_eq!(small, first + 1);

    let grown = manager.get_subtask(small).expect("S3").copy_with(TaskPatch {
        duration: Some(huge),
        ..TaskPatch::default()
    });
    assert!(matches!(
        manager.update_subtask(&grown),
        Err(Error::InvalidArgument(_))
    ));
    assert_eq!(manager.get_subtask(small).expect("S3").duration(), minutes(0));
    assert_eq!(manager.get_epic(epic.id()).expect("E").duration(), huge);
}

#[test]
fn sub_minute_schedules_are_rejected() {
    let mut manager = TaskManager::new();
    assert!(matches!(
        manager.add_task(&Task::scheduled("A", "", at(10, 0), Duration::seconds(90))),
        Err(Error::InvalidArgument(_))
    ));
    assert!(matches!(
        manager.add_task(&Task::scheduled(
            "B",
            "",
            at(10, 0) + Duration::milliseconds(500),
            minutes(30)
        )),
        Err(Error::InvalidArgument(_))
    ));
    assert!(manager.is_empty());
    assert_eq!(manager.next_id(), 1);
}
