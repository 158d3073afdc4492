use crate::domain::{ColumnId, TaskId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single remote write produced by a reorder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum PositionOp {
    /// A column took a new place on its board
    ColumnPosition { column_id: ColumnId, sort_order: i32 },
    /// A task took a new place within the column it already belongs to
    TaskPosition {
        task_id: TaskId,
        column_id: ColumnId,
        sort_order: i32,
    },
    /// A task changed parent column and position together
    TaskMove {
        task_id: TaskId,
        from_column_id: ColumnId,
        column_id: ColumnId,
        sort_order: i32,
    },
}

impl PositionOp {
    /// The entity this op writes to
    pub fn entity(&self) -> EntityRef {
        match self {
            Self::ColumnPosition { column_id, .. } => EntityRef::Column(column_id.clone()),
            Self::TaskPosition { task_id, .. } | Self::TaskMove { task_id, .. } => {
                EntityRef::Task(task_id.clone())
            }
        }
    }

    pub fn sort_order(&self) -> i32 {
        match self {
            Self::ColumnPosition { sort_order, .. }
            | Self::TaskPosition { sort_order, .. }
            | Self::TaskMove { sort_order, .. } => *sort_order,
        }
    }

    pub fn changes_parent(&self) -> bool {
        matches!(self, Self::TaskMove { .. })
    }
}

impl fmt::Display for PositionOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ColumnPosition {
                column_id,
                sort_order,
            } => write!(f, "column {} -> {}", column_id, sort_order),
            Self::TaskPosition {
                task_id,
                column_id,
                sort_order,
            } => write!(f, "task {} -> {}[{}]", task_id, column_id, sort_order),
            Self::TaskMove {
                task_id,
                from_column_id,
                column_id,
                sort_order,
            } => write!(
                f,
                "task {} {} -> {}[{}]",
                task_id, from_column_id, column_id, sort_order
            ),
        }
    }
}

/// Identity of a board entity that ops can target
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "lowercase")]
pub enum EntityRef {
    Column(ColumnId),
    Task(TaskId),
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Column(id) => write!(f, "column {}", id),
            Self::Task(id) => write!(f, "task {}", id),
        }
    }
}
