use crate::domain::{position_of, ColumnId, ColumnWithTasks, Hierarchy, TaskId};
use crate::error::{EntityKind, Result, TaskboardError};
use crate::reorder::{DragDescriptor, DragOutcome, ItemType, PositionOp, Reordered};

/// Where a drag was released, resolved against the snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DropTarget {
    Task { column: usize, index: usize },
    Column { column: usize },
}

impl DropTarget {
    fn column(self) -> usize {
        match self {
            Self::Task { column, .. } | Self::Column { column } => column,
        }
    }
}

/// Moves a column to `target_index` among its siblings
///
/// The index is clamped to the last slot. Columns are renumbered densely
/// and an op is emitted for every column whose stored position changes.
pub fn reorder_columns(
    hierarchy: &Hierarchy,
    active_column_id: &ColumnId,
    target_index: usize,
) -> Result<Reordered> {
    let from = hierarchy
        .column_index(active_column_id)
        .ok_or_else(|| TaskboardError::invalid_reference(EntityKind::Column, active_column_id.as_str()))?;
    let to = target_index.min(hierarchy.columns.len() - 1);

    let mut next = hierarchy.clone();
    let moved = next.columns.remove(from);
    next.columns.insert(to, moved);

    let mut ops = Vec::new();
    renumber_columns(&mut next.columns, &mut ops);

    tracing::debug!(column = %active_column_id, from, to, ops = ops.len(), "reordered columns");
    Ok(Reordered::new(next, ops))
}

/// Moves a task to `target_index` within its own column
///
/// Same contract as [`reorder_columns`], scoped to one task list.
pub fn move_task_within_column(
    hierarchy: &Hierarchy,
    column_id: &ColumnId,
    active_task_id: &TaskId,
    target_index: usize,
) -> Result<Reordered> {
    let ci = hierarchy
        .column_index(column_id)
        .ok_or_else(|| TaskboardError::invalid_reference(EntityKind::Column, column_id.as_str()))?;
    let from = hierarchy.columns[ci]
        .task_index(active_task_id)
        .ok_or_else(|| TaskboardError::invalid_reference(EntityKind::Task, active_task_id.as_str()))?;
    let to = target_index.min(hierarchy.columns[ci].tasks.len() - 1);

    let mut next = hierarchy.clone();
    let column = &mut next.columns[ci];
    let moved = column.tasks.remove(from);
    column.tasks.insert(to, moved);

    let mut ops = Vec::new();
    renumber_tasks(column, &mut ops);

    tracing::debug!(task = %active_task_id, column = %column_id, from, to, ops = ops.len(), "moved task within column");
    Ok(Reordered::new(next, ops))
}

/// Moves a task into another column at `target_index`
///
/// The index is clamped to `[0, len]` of the target list, where `len`
/// appends. The moved task always yields one [`PositionOp::TaskMove`],
/// listed first; displaced siblings in the source and then the target
/// column follow as [`PositionOp::TaskPosition`] ops.
pub fn move_task_across_columns(
    hierarchy: &Hierarchy,
    active_task_id: &TaskId,
    source_column_id: &ColumnId,
    target_column_id: &ColumnId,
    target_index: usize,
) -> Result<Reordered> {
    let source = hierarchy
        .column_index(source_column_id)
        .ok_or_else(|| TaskboardError::invalid_reference(EntityKind::Column, source_column_id.as_str()))?;
    let target = hierarchy
        .column_index(target_column_id)
        .ok_or_else(|| TaskboardError::invalid_reference(EntityKind::Column, target_column_id.as_str()))?;
    let from = hierarchy.columns[source]
        .task_index(active_task_id)
        .ok_or_else(|| TaskboardError::invalid_reference(EntityKind::Task, active_task_id.as_str()))?;

    if source == target {
        return move_task_within_column(hierarchy, source_column_id, active_task_id, target_index);
    }

    let mut next = hierarchy.clone();
    let mut moved = next.columns[source].tasks.remove(from);
    let to = target_index.min(next.columns[target].tasks.len());

    moved.column_id = target_column_id.clone();
    moved.sort_order = position_of(to);
    next.columns[target].tasks.insert(to, moved);

    let mut ops = vec![PositionOp::TaskMove {
        task_id: active_task_id.clone(),
        from_column_id: source_column_id.clone(),
        column_id: target_column_id.clone(),
        sort_order: position_of(to),
    }];
    renumber_tasks(&mut next.columns[source], &mut ops);
    renumber_tasks(&mut next.columns[target], &mut ops);

    tracing::debug!(
        task = %active_task_id,
        from = %source_column_id,
        to = %target_column_id,
        index = to,
        ops = ops.len(),
        "moved task across columns"
    );
    Ok(Reordered::new(next, ops))
}

/// Turns a drag-end descriptor into a reorder, or [`DragOutcome::NoOp`]
///
/// Dropping a task on a task inserts it at the hovered task's current slot.
/// Dropping it on another column's container appends it (index 0 when that
/// column is empty); dropping it on its own column's container changes
/// nothing. A column dropped on a task is treated as dropped on that task's
/// column.
pub fn resolve_drag_event(hierarchy: &Hierarchy, drag: &DragDescriptor) -> Result<DragOutcome> {
    let Some(over_id) = drag.over_id.as_deref() else {
        return Ok(DragOutcome::NoOp);
    };
    if drag.active_id == over_id {
        return Ok(DragOutcome::NoOp);
    }

    let reordered = match drag.active_type {
        ItemType::Task => {
            let task_id = TaskId::from(drag.active_id.as_str());
            let (source, from) = hierarchy
                .locate_task(&task_id)
                .ok_or_else(|| TaskboardError::invalid_reference(EntityKind::Task, task_id.as_str()))?;
            let source_id = hierarchy.columns[source].id().clone();

            match resolve_target(hierarchy, over_id, drag.over_type)? {
                DropTarget::Task { column, index } if column == source => {
                    if index == from {
                        return Ok(DragOutcome::NoOp);
                    }
                    move_task_within_column(hierarchy, &source_id, &task_id, index)?
                }
                DropTarget::Task { column, index } => {
                    let target_id = hierarchy.columns[column].id().clone();
                    move_task_across_columns(hierarchy, &task_id, &source_id, &target_id, index)?
                }
                DropTarget::Column { column } if column == source => {
                    return Ok(DragOutcome::NoOp);
                }
                DropTarget::Column { column } => {
                    let target_column = &hierarchy.columns[column];
                    let index = target_column.tasks.len();
                    move_task_across_columns(hierarchy, &task_id, &source_id, target_column.id(), index)?
                }
            }
        }
        ItemType::Column => {
            let column_id = ColumnId::from(drag.active_id.as_str());
            let from = hierarchy
                .column_index(&column_id)
                .ok_or_else(|| TaskboardError::invalid_reference(EntityKind::Column, column_id.as_str()))?;
            let to = resolve_target(hierarchy, over_id, drag.over_type)?.column();

            if to == from {
                return Ok(DragOutcome::NoOp);
            }
            reorder_columns(hierarchy, &column_id, to)?
        }
    };

    if reordered.is_unchanged() {
        return Ok(DragOutcome::NoOp);
    }
    Ok(DragOutcome::Reordered(reordered))
}

fn resolve_target(
    hierarchy: &Hierarchy,
    over_id: &str,
    over_type: Option<ItemType>,
) -> Result<DropTarget> {
    let as_column = || {
        hierarchy
            .column_index(&ColumnId::from(over_id))
            .map(|column| DropTarget::Column { column })
    };
    let as_task = || {
        hierarchy
            .locate_task(&TaskId::from(over_id))
            .map(|(column, index)| DropTarget::Task { column, index })
    };

    match over_type {
        Some(ItemType::Column) => {
            as_column().ok_or_else(|| TaskboardError::invalid_reference(EntityKind::Column, over_id))
        }
        Some(ItemType::Task) => {
            as_task().ok_or_else(|| TaskboardError::invalid_reference(EntityKind::Task, over_id))
        }
        None => as_column()
            .or_else(as_task)
            .ok_or_else(|| TaskboardError::invalid_reference(EntityKind::Task, over_id)),
    }
}

/// Assigns positions `0..n-1` to columns, recording each change
pub(crate) fn renumber_columns(columns: &mut [ColumnWithTasks], ops: &mut Vec<PositionOp>) {
    for (index, entry) in columns.iter_mut().enumerate() {
        let position = position_of(index);
        if entry.column.sort_order != position {
            entry.column.sort_order = position;
            ops.push(PositionOp::ColumnPosition {
                column_id: entry.column.id.clone(),
                sort_order: position,
            });
        }
    }
}

/// Assigns positions `0..n-1` to one column's tasks, recording each change
///
/// Tasks already carrying their dense position are left alone, which also
/// skips a task that was just placed by a cross-column move.
pub(crate) fn renumber_tasks(column: &mut ColumnWithTasks, ops: &mut Vec<PositionOp>) {
    let column_id = column.column.id.clone();
    for (index, task) in column.tasks.iter_mut().enumerate() {
        let position = position_of(index);
        if task.sort_order != position {
            task.sort_order = position;
            ops.push(PositionOp::TaskPosition {
                task_id: task.id.clone(),
                column_id: column_id.clone(),
                sort_order: position,
            });
        }
    }
}
