#[macro_use]
mod id;

pub mod board;
pub mod column;
pub mod hierarchy;
pub mod sorting;
pub mod task;

pub use board::{Board, BoardConfig, BoardId, NewBoard};
pub use column::{Column, ColumnId};
pub use hierarchy::{ColumnWithTasks, Hierarchy};
pub use sorting::{position_of, sort_columns, sort_tasks};
pub use task::{Priority, Task, TaskId};
