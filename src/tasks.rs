use chrono::{Duration, NaiveDate};
use egui::Color32;
use uuid::Uuid;

use gantt_timeline::engine::{ConnectResponse, Connection, GanttHandler};
use gantt_timeline::model::{GanttRecord, Node, RowId};

use crate::ui::palette;

/// A task in the demo backlog.
#[derive(Debug, Clone)]
pub struct Task {
    pub id: Uuid,
    pub name: String,
    /// Grouping column: tasks sharing a story collapse under one group bar.
    pub story: String,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    /// Progress from 0.0 (not started) to 1.0 (complete).
    pub progress: f32,
    pub color: Color32,
    /// Tasks that must finish before this one.
    pub depends_on: Vec<Uuid>,
}

impl Task {
    pub fn new(name: impl Into<String>, story: impl Into<String>, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            story: story.into(),
            start: Some(start),
            end: Some(end),
            progress: 0.0,
            color: Color32::from_rgb(70, 130, 180), // Steel blue
            depends_on: Vec::new(),
        }
    }

    /// A task that has not been scheduled yet.
    pub fn unscheduled(name: impl Into<String>, story: impl Into<String>) -> Self {
        Self {
            start: None,
            end: None,
            ..Self::new(name, story, NaiveDate::MIN, NaiveDate::MIN)
        }
    }

    pub fn row_id(&self) -> RowId {
        RowId::from(self.id)
    }
}

impl GanttRecord for Task {
    fn record_id(&self) -> RowId {
        self.row_id()
    }

    fn bar_start(&self) -> Option<NaiveDate> {
        self.start
    }

    fn bar_end(&self) -> Option<NaiveDate> {
        self.end
    }

    fn from_link_ids(&self) -> Vec<RowId> {
        self.depends_on.iter().copied().map(RowId::from).collect()
    }
}

/// Generate a sample backlog for demonstration.
pub fn sample_tasks(today: NaiveDate) -> Vec<Task> {
    let day = Duration::days;

    // ── Planning ────────────────────────────────────────────────
    let mut kickoff = Task::new("Project Kickoff", "Planning", today - day(5), today - day(2));
    kickoff.progress = 1.0;

    let mut requirements =
        Task::new("Requirements Gathering", "Planning", today - day(2), today + day(5));
    requirements.progress = 0.6;
    requirements.depends_on.push(kickoff.id);

    // ── Execution ───────────────────────────────────────────────
    let mut design = Task::new("UI Design", "Execution", today + day(6), today + day(18));
    design.depends_on.push(requirements.id);

    let mut backend = Task::new("Backend Development", "Execution", today + day(6), today + day(28));
    backend.depends_on.push(requirements.id);

    let mut testing = Task::new("Testing & QA", "Execution", today + day(22), today + day(30));
    testing.depends_on.extend([design.id, backend.id]);

    // ── Launch ──────────────────────────────────────────────────
    let mut rollout = Task::new("Staged Rollout", "Launch", today + day(31), today + day(38));
    rollout.depends_on.push(testing.id);

    let retro = Task::unscheduled("Retrospective", "Launch");

    let mut tasks = vec![kickoff, requirements, design, backend, testing, rollout, retro];

    // A long tail of maintenance work to give the virtualizer something to do.
    for i in 0..60 {
        let start = today + day(40 + i * 3);
        tasks.push(Task::new(format!("Maintenance #{}", i + 1), "Maintenance", start, start + day(4)));
    }

    for (i, task) in tasks.iter_mut().enumerate() {
        task.color = palette::swatch(i);
    }
    tasks
}

/// Whether making `target` depend on `source` would close a cycle.
pub fn would_cycle(tasks: &[Task], source: Uuid, target: Uuid) -> bool {
    let mut stack = vec![source];
    let mut seen = Vec::new();
    while let Some(id) = stack.pop() {
        if id == target {
            return true;
        }
        if seen.contains(&id) {
            continue;
        }
        seen.push(id);
        if let Some(task) = tasks.iter().find(|t| t.id == id) {
            stack.extend(task.depends_on.iter().copied());
        }
    }
    false
}

pub fn find_by_row<'a>(tasks: &'a mut [Task], id: &RowId) -> Option<&'a mut Task> {
    tasks.iter_mut().find(|t| t.row_id() == *id)
}

fn parse_uuid(id: &RowId) -> Option<Uuid> {
    Uuid::parse_str(id.as_str()).ok()
}

/// Applies chart callbacks to the backlog.
pub struct TaskBoard<'a> {
    pub tasks: &'a mut Vec<Task>,
    pub status: &'a mut String,
    /// Hand new links to the background validator instead of accepting
    /// them on the spot.
    pub defer_links: bool,
}

impl GanttHandler for TaskBoard<'_> {
    fn on_bar_change(&mut self, start: NaiveDate, end: NaiveDate, node: &Node) {
        if let Some(group) = &node.group {
            // Moving a group bar shifts every task in it.
            let Some(old_start) = node.start else {
                return;
            };
            let delta = start - old_start;
            for task in self.tasks.iter_mut().filter(|t| t.story == group.value) {
                task.start = task.start.map(|d| d + delta);
                task.end = task.end.map(|d| d + delta);
            }
            *self.status = format!("Moved '{}' by {} days", group.value, delta.num_days());
            return;
        }

        if let Some(task) = find_by_row(self.tasks, &node.id) {
            task.start = Some(start);
            task.end = Some(end);
            *self.status = format!(
                "Updated '{}' ({} → {})",
                task.name,
                start.format("%Y-%m-%d"),
                end.format("%Y-%m-%d")
            );
        }
    }

    fn on_connect(&mut self, connection: &Connection) -> ConnectResponse {
        if self.defer_links {
            *self.status = "Validating link…".to_string();
            return ConnectResponse::Defer;
        }
        let (Some(source), Some(target)) =
            (parse_uuid(&connection.source), parse_uuid(&connection.target))
        else {
            return ConnectResponse::Reject;
        };
        if !link(self.tasks, source, target) {
            *self.status = "Link rejected: it would create a cycle".to_string();
            return ConnectResponse::Reject;
        }
        *self.status = "Link added".to_string();
        ConnectResponse::Accept
    }

    fn on_disconnect(&mut self, from: &RowId, to: &RowId) {
        let Some(from) = parse_uuid(from) else {
            return;
        };
        if let Some(task) = find_by_row(self.tasks, to) {
            task.depends_on.retain(|id| *id != from);
            *self.status = format!("Removed a dependency of '{}'", task.name);
        }
    }
}

/// Record that `target` depends on `source`. Returns `false` when the link
/// would close a cycle or duplicates an existing one.
pub fn link(tasks: &mut [Task], source: Uuid, target: Uuid) -> bool {
    if would_cycle(tasks, source, target) {
        return false;
    }
    match tasks.iter_mut().find(|t| t.id == target) {
        Some(task) if !task.depends_on.contains(&source) => {
            task.depends_on.push(source);
            true
        }
        _ => false,
    }
}

/// Parse both ends of a connection back into task ids.
pub fn connection_ids(connection: &Connection) -> Option<(Uuid, Uuid)> {
    Some((parse_uuid(&connection.source)?, parse_uuid(&connection.target)?))
}
