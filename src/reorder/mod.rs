//! Drag-and-drop reordering over a board snapshot.
//!
//! Every function here is pure: it borrows a [`Hierarchy`], returns a new
//! one, and lists the [`PositionOp`]s that turn the old stored state into
//! the new one. Nothing is written anywhere.

pub mod drag;
pub mod engine;
pub mod lifecycle;
pub mod ops;

use crate::domain::Hierarchy;
use serde::Serialize;

pub use drag::{DragDescriptor, DragOutcome, ItemType};
pub use engine::{move_task_across_columns, move_task_within_column, reorder_columns, resolve_drag_event};
pub use lifecycle::{append_column, append_task, normalize, remove_column, remove_task};
pub use ops::{EntityRef, PositionOp};

/// A new snapshot plus the writes that persist it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reordered {
    pub hierarchy: Hierarchy,
    pub ops: Vec<PositionOp>,
}

impl Reordered {
    pub fn new(hierarchy: Hierarchy, ops: Vec<PositionOp>) -> Self {
        Self { hierarchy, ops }
    }

    /// True when no stored position changes
    pub fn is_unchanged(&self) -> bool {
        self.ops.is_empty()
    }
}
