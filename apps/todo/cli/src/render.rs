//! Plain-text output for tasks, filters and stats

use domain_tasks::{FilterSummary, StoreError, Task, TaskStats};
use domain_users::AuthUser;

pub fn format_task(task: &Task) -> String {
    let checkbox = if task.completed { "[x]" } else { "[ ]" };
    let mut line = format!("{} {}  ({})", checkbox, task.title, task.priority);

    if let Some(due) = task.due_date {
        line.push_str(&format!("  Due: {}", due.format("%Y-%m-%d")));
    }
    line.push_str(&format!("  #{}", task.id));

    if let Some(description) = task.description.as_deref().filter(|d| !d.trim().is_empty()) {
        line.push_str(&format!("\n      {}", description));
    }
    line
}

pub fn format_task_list(tasks: &[Task], summary: Option<FilterSummary>) -> String {
    let mut out = String::new();

    if let Some(summary) = summary {
        out.push_str(&format!("{}\n", summary));
    }

    if tasks.is_empty() {
        out.push_str("No tasks yet. Add one with `todo add --title <TITLE>` to get started!");
        return out;
    }

    out.push_str(&format!("Your Tasks ({})\n", tasks.len()));
    let lines: Vec<String> = tasks.iter().map(format_task).collect();
    out.push_str(&lines.join("\n"));
    out
}

pub fn format_stats(stats: &TaskStats) -> String {
    format!(
        "Total: {}  Active: {}  Completed: {} ({}%)\n\
         High: {}  Medium: {}  Low: {}\n\
         Overdue: {}",
        stats.total,
        stats.active,
        stats.completed,
        stats.completion_percent(),
        stats.high,
        stats.medium,
        stats.low,
        stats.overdue
    )
}

pub fn format_user(user: &AuthUser) -> String {
    match user.initial() {
        Some(initial) => format!("({}) {} <{}>", initial, user.name, user.email),
        None => format!("{} <{}>", user.name, user.email),
    }
}

/// Error slot as shown to the user, with the remote detail on a second line
pub fn format_store_error(err: &StoreError) -> String {
    format!("{}\n  caused by: {}", err, err.detail())
}
