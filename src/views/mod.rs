//! Presentation-neutral view logic.
//!
//! Nothing here renders; these are the filters, groupings and reducers the
//! dashboard screens are built from.

pub mod board;
pub mod cache;
pub mod filter;

pub use board::{plan_move, BoardMove, DropTarget, KanbanBoard, KanbanColumn, StatusChange};
pub use cache::ViewCache;
pub use filter::{
    due_today, project_progress, search_clients, urgent_tasks, ProjectProgress, ProjectSelection,
    TaskFilter,
};
