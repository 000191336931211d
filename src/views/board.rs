//! Kanban grouping and the drop reducer.
//!
//! The board holds task ids only; the task records stay with the caller.
//! A drop is turned into a [`StatusChange`] to send to the task service, and
//! the board is rearranged once that update has resolved.

use crate::models::{Task, TaskStatus};
use std::str::FromStr;

/// One kanban column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KanbanColumn {
    pub status: TaskStatus,
    pub task_ids: Vec<String>,
}

impl KanbanColumn {
    /// Droppable id of the column. The complete column is `done`.
    pub fn id(&self) -> &'static str {
        column_id(self.status)
    }

    pub fn title(&self) -> &'static str {
        match self.status {
            TaskStatus::Todo => "To Do",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Review => "Review",
            TaskStatus::Complete => "Done",
        }
    }
}

fn column_id(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Complete => "done",
        other => other.as_str(),
    }
}

/// Position on the board: column id and index within it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DropTarget {
    pub column: String,
    pub index: usize,
}

impl DropTarget {
    pub fn new(column: impl Into<String>, index: usize) -> Self {
        DropTarget {
            column: column.into(),
            index,
        }
    }
}

/// A finished drag. `destination` is `None` when dropped outside any column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoardMove {
    pub task_id: String,
    pub source: DropTarget,
    pub destination: Option<DropTarget>,
}

/// Update to send for a drop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusChange {
    pub task_id: String,
    pub status: TaskStatus,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KanbanBoard {
    pub columns: Vec<KanbanColumn>,
}

impl KanbanBoard {
    /// Group tasks by status, keeping their order within each column.
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let columns = TaskStatus::ALL
            .iter()
            .map(|&status| KanbanColumn {
                status,
                task_ids: tasks
                    .iter()
                    .filter(|task| task.status == status)
                    .map(|task| task.id.clone())
                    .collect(),
            })
            .collect();
        KanbanBoard { columns }
    }

    pub fn column(&self, status: TaskStatus) -> Option<&KanbanColumn> {
        self.columns.iter().find(|column| column.status == status)
    }

    /// Current position of a task.
    pub fn locate(&self, task_id: &str) -> Option<DropTarget> {
        self.columns.iter().find_map(|column| {
            column
                .task_ids
                .iter()
                .position(|id| id == task_id)
                .map(|index| DropTarget::new(column.id(), index))
        })
    }

    /// Move a task to `destination` after its status update succeeded.
    ///
    /// Returns `false` if the task or the column is unknown.
    pub fn move_task(&mut self, task_id: &str, destination: &DropTarget) -> bool {
        let Ok(status) = TaskStatus::from_str(&destination.column) else {
            return false;
        };
        let Some(source) = self.columns.iter_mut().find_map(|column| {
            let index = column.task_ids.iter().position(|id| id == task_id)?;
            Some(column.task_ids.remove(index))
        }) else {
            return false;
        };

        match self.columns.iter_mut().find(|column| column.status == status) {
            Some(column) => {
                let index = destination.index.min(column.task_ids.len());
                column.task_ids.insert(index, source);
                true
            }
            None => false,
        }
    }
}

/// Decide what a drop means.
///
/// Nothing is sent when the task was dropped outside a column, put back
/// where it was, is not on the board, or landed on an unknown column.
pub fn plan_move(board: &KanbanBoard, mv: &BoardMove) -> Option<StatusChange> {
    let destination = mv.destination.as_ref()?;
    if *destination == mv.source {
        return None;
    }
    board.locate(&mv.task_id)?;

    let status = TaskStatus::from_str(&destination.column).ok()?;
    Some(StatusChange {
        task_id: mv.task_id.clone(),
        status,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewTask;
    use chrono::{NaiveDate, Utc};

    fn task(id: &str, status: TaskStatus) -> Task {
        let draft = NewTask {
            title: id.to_string(),
            status,
            ..Default::default()
        };
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        Task::from_draft(id.to_string(), draft, today, Utc::now())
    }

    fn board() -> KanbanBoard {
        KanbanBoard::from_tasks(&[
            task("t1", TaskStatus::Todo),
            task("t2", TaskStatus::Complete),
            task("t3", TaskStatus::Todo),
            task("t4", TaskStatus::Review),
        ])
    }

    fn drag(task: &str, from: (&str, usize), to: Option<(&str, usize)>) -> BoardMove {
        BoardMove {
            task_id: task.to_string(),
            source: DropTarget::new(from.0, from.1),
            destination: to.map(|(column, index)| DropTarget::new(column, index)),
        }
    }

    #[test]
    fn test_four_columns() {
        let board = board();
        let ids: Vec<&str> = board.columns.iter().map(KanbanColumn::id).collect();
        assert_eq!(ids, vec!["todo", "in-progress", "review", "done"]);

        let todo = board.column(TaskStatus::Todo).unwrap();
        assert_eq!(todo.task_ids, vec!["t1", "t3"]);
        assert_eq!(board.column(TaskStatus::Complete).unwrap().task_ids, vec!["t2"]);
        assert_eq!(board.locate("t3"), Some(DropTarget::new("todo", 1)));
    }

    #[test]
    fn test_plan_move_no_ops() {
        let board = board();
        assert_eq!(plan_move(&board, &drag("t1", ("todo", 0), None)), None);
        assert_eq!(plan_move(&board, &drag("t1", ("todo", 0), Some(("todo", 0)))), None);
        assert_eq!(plan_move(&board, &drag("t9", ("todo", 5), Some(("review", 0)))), None);
        assert_eq!(plan_move(&board, &drag("t1", ("todo", 0), Some(("archive", 0)))), None);
    }

    #[test]
    fn test_plan_move_to_done() {
        let change = plan_move(&board(), &drag("t1", ("todo", 0), Some(("done", 0))));
        assert_eq!(
            change,
            Some(StatusChange {
                task_id: "t1".into(),
                status: TaskStatus::Complete
            })
        );
    }

    #[test]
    fn test_reorder_within_column_keeps_status() {
        let change = plan_move(&board(), &drag("t3", ("todo", 1), Some(("todo", 0)))).unwrap();
        assert_eq!(change.status, TaskStatus::Todo);
    }

    #[test]
    fn test_move_task() {
        let mut board = board();
        assert!(board.move_task("t3", &DropTarget::new("review", 0)));
        assert_eq!(board.column(TaskStatus::Todo).unwrap().task_ids, vec!["t1"]);
        assert_eq!(
            board.column(TaskStatus::Review).unwrap().task_ids,
            vec!["t3", "t4"]
        );

        assert!(board.move_task("t1", &DropTarget::new("done", 99)));
        assert_eq!(board.locate("t1"), Some(DropTarget::new("done", 1)));

        assert!(!board.move_task("t9", &DropTarget::new("done", 0)));
        assert!(!board.move_task("t4", &DropTarget::new("archive", 0)));
        assert_eq!(board.locate("t4"), Some(DropTarget::new("review", 1)));
    }
}
