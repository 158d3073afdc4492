//! # Taskboard Core
//!
//! Ordering logic for a kanban task board: boards hold ordered columns,
//! columns hold ordered tasks, and drag gestures move either one.
//!
//! The [`reorder`] module is a set of pure functions that turn a board
//! snapshot and a drag descriptor into a new snapshot plus the position
//! updates needed to persist it. [`session::BoardSession`] applies those
//! updates optimistically and reconciles them with a [`BoardStore`],
//! rolling back whatever the store rejects.

pub mod domain;
pub mod error;
pub mod reconcile;
pub mod reorder;
pub mod service;
pub mod session;
pub mod storage;

// Re-export commonly used types
pub use domain::{
    board::{Board, BoardConfig, BoardId, NewBoard},
    column::{Column, ColumnId},
    hierarchy::{ColumnWithTasks, Hierarchy},
    task::{Priority, Task, TaskId},
};
pub use error::{EntityKind, Result, TaskboardError};
pub use reorder::{resolve_drag_event, DragDescriptor, DragOutcome, ItemType, PositionOp, Reordered};
pub use session::BoardSession;
pub use storage::BoardStore;
