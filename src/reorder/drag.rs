use crate::reorder::Reordered;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of item being dragged or hovered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Task,
    Column,
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Task => write!(f, "task"),
            Self::Column => write!(f, "column"),
        }
    }
}

/// The end of a drag gesture, stripped of UI toolkit detail
///
/// `over_id == None` means the item was dropped outside any target.
/// `over_type` may be omitted, in which case it is inferred from the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragDescriptor {
    pub active_id: String,
    pub active_type: ItemType,
    #[serde(default)]
    pub over_id: Option<String>,
    #[serde(default)]
    pub over_type: Option<ItemType>,
}

impl DragDescriptor {
    pub fn new(
        active_id: impl Into<String>,
        active_type: ItemType,
        over_id: Option<String>,
        over_type: Option<ItemType>,
    ) -> Self {
        Self {
            active_id: active_id.into(),
            active_type,
            over_id,
            over_type,
        }
    }

    /// A task dropped onto another task
    pub fn task_over_task(active_id: impl Into<String>, over_id: impl Into<String>) -> Self {
        Self::new(active_id, ItemType::Task, Some(over_id.into()), Some(ItemType::Task))
    }

    /// A task dropped onto a column container or header
    pub fn task_over_column(active_id: impl Into<String>, column_id: impl Into<String>) -> Self {
        Self::new(active_id, ItemType::Task, Some(column_id.into()), Some(ItemType::Column))
    }

    /// A column dropped onto another column
    pub fn column_over_column(active_id: impl Into<String>, over_id: impl Into<String>) -> Self {
        Self::new(active_id, ItemType::Column, Some(over_id.into()), Some(ItemType::Column))
    }

    /// A drag released outside every drop target
    pub fn cancelled(active_id: impl Into<String>, active_type: ItemType) -> Self {
        Self::new(active_id, active_type, None, None)
    }
}

/// Result of resolving a drag gesture
#[derive(Debug, Clone, PartialEq)]
pub enum DragOutcome {
    /// Nothing moved; nothing must be written
    NoOp,
    Reordered(Reordered),
}

impl DragOutcome {
    pub fn is_noop(&self) -> bool {
        matches!(self, Self::NoOp)
    }

    pub fn into_reordered(self) -> Option<Reordered> {
        match self {
            Self::NoOp => None,
            Self::Reordered(reordered) => Some(reordered),
        }
    }
}
