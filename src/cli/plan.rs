//! Plan commands (tree, stats, renumber, validate, remove, span)

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Serialize;
use tracing::debug;

use super::output::Output;
use crate::project::ProjectFile;
use crate::storage::{Config, SnapshotStore};

fn open(config: &Config, file: &Path) -> Result<ProjectFile> {
    let store = SnapshotStore::new(file);
    store.read(config.project.clone())
}

fn save(project: &mut ProjectFile, file: &Path, target: Option<&Path>) -> Result<PathBuf> {
    let path = target.unwrap_or(file).to_path_buf();
    SnapshotStore::new(&path).write(project)?;
    Ok(path)
}

#[derive(Serialize)]
struct TreeRow {
    id: Option<u32>,
    unique_id: Option<u32>,
    depth: u32,
    wbs: Option<String>,
    outline_number: Option<String>,
    name: Option<String>,
    parent_unique_id: Option<u32>,
}

/// Print the task hierarchy
pub fn tree(output: &Output, config: &Config, file: &Path) -> Result<()> {
    let project = open(config, file)?;

    let rows: Vec<TreeRow> = project
        .tasks_depth_first()
        .into_iter()
        .filter_map(|key| {
            let task = project.task(key)?;
            Some(TreeRow {
                id: task.id(),
                unique_id: task.unique_id(),
                depth: project.task_depth(key).unwrap_or(1),
                wbs: task.wbs.clone(),
                outline_number: task.outline_number.clone(),
                name: task.name.clone(),
                parent_unique_id: task
                    .parent()
                    .and_then(|p| project.task(p))
                    .and_then(|p| p.unique_id()),
            })
        })
        .collect();

    if output.is_json() {
        output.data(&rows);
    } else if rows.is_empty() {
        println!("No tasks.");
    } else {
        for row in rows {
            let indent = "  ".repeat(row.depth.saturating_sub(1) as usize);
            println!(
                "{}{:<8} {}  [id {}]",
                indent,
                row.wbs.as_deref().unwrap_or("-"),
                row.name.as_deref().unwrap_or("(unnamed)"),
                row.id.map_or_else(|| "-".to_string(), |id| id.to_string()),
            );
        }
    }

    Ok(())
}

/// Show entity counts
pub fn stats(output: &Output, config: &Config, file: &Path) -> Result<()> {
    let project = open(config, file)?;

    let tasks = project.all_tasks().len();
    let top_level = project.child_tasks().len();
    let summaries = project.tasks().filter(|t| t.is_summary()).count();
    let placeholders = project.tasks().filter(|t| t.is_null()).count();
    let max_depth = project
        .all_tasks()
        .iter()
        .filter_map(|key| project.task_depth(*key))
        .max()
        .unwrap_or(0);
    let resources = project.all_resources().len();
    let assignments = project.all_resource_assignments().len();
    let calendars = project.calendars().len();
    let relations = project.relations().len();

    if output.is_json() {
        output.data(&serde_json::json!({
            "tasks": {
                "total": tasks,
                "top_level": top_level,
                "summary": summaries,
                "placeholder": placeholders,
                "max_depth": max_depth,
            },
            "resources": resources,
            "assignments": assignments,
            "calendars": calendars,
            "relations": relations,
        }));
    } else {
        if let Some(title) = &project.header().title {
            println!("{}", title);
            println!();
        }
        println!(
            "Tasks:       {} ({} top-level, {} summary, {} placeholder)",
            tasks, top_level, summaries, placeholders
        );
        println!("Max depth:   {}", max_depth);
        println!("Resources:   {}", resources);
        println!("Assignments: {}", assignments);
        println!("Calendars:   {}", calendars);
        println!("Relations:   {}", relations);
    }

    Ok(())
}

/// Make task and resource IDs dense
pub fn renumber(
    output: &Output,
    config: &Config,
    file: &Path,
    hierarchy: bool,
    target: Option<&Path>,
) -> Result<()> {
    let mut project = open(config, file)?;

    if hierarchy {
        project.synchronize_task_id_to_hierarchy();
    } else {
        project.renumber_task_ids();
    }
    project.renumber_resource_ids();
    project.update_structure();
    debug!(hierarchy, "renumbered plan");

    let path = save(&mut project, file, target)?;
    output.success(&format!(
        "Renumbered {} tasks and {} resources into {}",
        project.all_tasks().len(),
        project.all_resources().len(),
        path.display()
    ));

    Ok(())
}

/// Renumber kinds whose unique IDs exceed the ceiling
pub fn validate(output: &Output, config: &Config, file: &Path, target: Option<&Path>) -> Result<()> {
    let mut project = open(config, file)?;

    let renumbered = project.validate_unique_ids();

    if renumbered.is_empty() {
        output.success("All unique IDs are within range");
        return Ok(());
    }

    let path = save(&mut project, file, target)?;
    let kinds: Vec<&str> = renumbered.iter().map(|k| k.label()).collect();
    if output.is_json() {
        output.data(&serde_json::json!({
            "renumbered": kinds,
            "path": path.display().to_string(),
        }));
    } else {
        println!("Renumbered unique IDs: {}", kinds.join(", "));
        println!("Saved to {}", path.display());
    }

    Ok(())
}

/// Remove a task, its subtree and its assignments
pub fn remove_task(
    output: &Output,
    config: &Config,
    file: &Path,
    id: u32,
    target: Option<&Path>,
) -> Result<()> {
    let mut project = open(config, file)?;

    let Some(key) = project.task_by_id(id).map(|t| t.key()) else {
        bail!("Task not found: {}", id);
    };
    let tasks_before = project.all_tasks().len();
    let assignments_before = project.all_resource_assignments().len();

    project.remove_task(key);

    let path = save(&mut project, file, target)?;
    output.success(&format!(
        "Removed {} task(s) and {} assignment(s); saved to {}",
        tasks_before - project.all_tasks().len(),
        assignments_before - project.all_resource_assignments().len(),
        path.display()
    ));

    Ok(())
}

/// Remove a resource and its assignments
pub fn remove_resource(
    output: &Output,
    config: &Config,
    file: &Path,
    id: u32,
    target: Option<&Path>,
) -> Result<()> {
    let mut project = open(config, file)?;

    let Some(key) = project.resource_by_id(id).map(|r| r.key()) else {
        bail!("Resource not found: {}", id);
    };
    let assignments_before = project.all_resource_assignments().len();

    project.remove_resource(key);

    let path = save(&mut project, file, target)?;
    output.success(&format!(
        "Removed resource {} and {} assignment(s); saved to {}",
        id,
        assignments_before - project.all_resource_assignments().len(),
        path.display()
    ));

    Ok(())
}

/// Show project start, finish and working duration
pub fn span(output: &Output, config: &Config, file: &Path, calendar: Option<&str>) -> Result<()> {
    let project = open(config, file)?;

    let (Some(start), Some(finish)) = (project.start_date(), project.finish_date()) else {
        output.success("Plan has no dated tasks");
        return Ok(());
    };

    let calendar = calendar.unwrap_or(&config.project.calendar.default_name);
    let duration = project
        .duration_for(calendar, start, finish)
        .context("Failed to measure project duration")?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "start": start,
            "finish": finish,
            "calendar": calendar,
            "duration": duration,
        }));
    } else {
        println!("Start:    {}", start.format("%Y-%m-%d %H:%M"));
        println!("Finish:   {}", finish.format("%Y-%m-%d %H:%M"));
        println!("Duration: {} ({})", duration, calendar);
    }

    Ok(())
}
