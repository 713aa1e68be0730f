//! Headless task commands

use serde::Serialize;

use crate::config::Config;
use crate::error::Result;
use crate::manager::TaskListManager;
use crate::output::{emit_success, format_task_row, HumanOutput, OutputOptions};
use crate::task::Task;

#[derive(Serialize)]
struct ListReport<'a> {
    pending: Vec<&'a Task>,
    completed: Vec<&'a Task>,
}

#[derive(Serialize)]
struct AddReport {
    added: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    task: Option<Task>,
}

#[derive(Serialize)]
struct ToggleReport {
    id: String,
    changed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    completed: Option<bool>,
}

#[derive(Serialize)]
struct ClearReport {
    removed: usize,
    remaining: usize,
}

pub fn list(manager: &TaskListManager, config: &Config, options: OutputOptions) -> Result<()> {
    let view = manager.render();

    let mut human = HumanOutput::new(format!(
        "{}: {} tasks",
        config.display.title,
        view.pending.len() + view.completed.len()
    ));
    human.push_summary("pending", view.pending.len().to_string());
    human.push_summary("completed", view.completed.len().to_string());
    human.push_section(
        "Pending",
        view.pending.iter().map(|task| format_task_row(task)).collect(),
    );
    if view.shows_completed() {
        human.push_section(
            config.display.completed_title.clone(),
            view.completed.iter().map(|task| format_task_row(task)).collect(),
        );
    }

    let report = ListReport {
        pending: view.pending.clone(),
        completed: view.completed.clone(),
    };
    emit_success(options, "list", &report, Some(&human))
}

pub fn add(manager: &mut TaskListManager, text: &str, options: OutputOptions) -> Result<()> {
    manager.set_draft(text);
    let task = manager.add_task().cloned();

    let human = match task.as_ref() {
        Some(task) => {
            let mut human = HumanOutput::new(format!("checklist add: added {}", task.id));
            human.push_summary("text", task.text.clone());
            human.push_summary("created", task.created_at.clone());
            human
        }
        None => HumanOutput::new("checklist add: nothing to add (empty text)"),
    };

    let report = AddReport {
        added: task.is_some(),
        task,
    };
    emit_success(options, "add", &report, Some(&human))
}

pub fn toggle(manager: &mut TaskListManager, id: &str, options: OutputOptions) -> Result<()> {
    let changed = manager.toggle_complete(id);
    let completed = manager.tasks().get(id).map(|task| task.completed);

    let human = match completed {
        Some(true) => HumanOutput::new(format!("checklist toggle: {id} completed")),
        Some(false) => HumanOutput::new(format!("checklist toggle: {id} pending")),
        None => HumanOutput::new(format!("checklist toggle: no task {id}")),
    };

    let report = ToggleReport {
        id: id.to_string(),
        changed,
        completed,
    };
    emit_success(options, "toggle", &report, Some(&human))
}

pub fn clear_completed(manager: &mut TaskListManager, options: OutputOptions) -> Result<()> {
    let removed = manager.clear_completed();
    let remaining = manager.tasks().len();

    let mut human = HumanOutput::new(format!("checklist clear-completed: removed {removed}"));
    human.push_summary("remaining", remaining.to_string());

    let report = ClearReport { removed, remaining };
    emit_success(options, "clear-completed", &report, Some(&human))
}
