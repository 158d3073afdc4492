use crate::domain::{position_of, Column, ColumnId, ColumnWithTasks, Hierarchy, Task, TaskId};
use crate::error::{EntityKind, Result, TaskboardError};
use crate::reorder::engine::{renumber_columns, renumber_tasks};
use crate::reorder::Reordered;

/// Places a newly created task at the end of its column
///
/// The task's `column_id` picks the column; its `sort_order` is overwritten
/// with the next free position. A column hydrated with gaps is renumbered
/// first so the new position cannot collide; the ops persist that
/// renumbering and never include the new task itself.
pub fn append_task(hierarchy: &Hierarchy, mut task: Task) -> Result<Reordered> {
    let ci = hierarchy
        .column_index(&task.column_id)
        .ok_or_else(|| TaskboardError::invalid_reference(EntityKind::Column, task.column_id.as_str()))?;

    let mut next = hierarchy.clone();
    let mut ops = Vec::new();
    let column = &mut next.columns[ci];
    renumber_tasks(column, &mut ops);
    task.sort_order = position_of(column.tasks.len());
    column.tasks.push(task);
    Ok(Reordered::new(next, ops))
}

/// Places a newly created column at the end of the board
///
/// Existing columns are renumbered first, as in [`append_task`].
pub fn append_column(hierarchy: &Hierarchy, mut column: Column) -> Reordered {
    let mut next = hierarchy.clone();
    let mut ops = Vec::new();
    renumber_columns(&mut next.columns, &mut ops);
    column.sort_order = position_of(next.columns.len());
    next.columns.push(ColumnWithTasks::new(column, Vec::new()));
    Reordered::new(next, ops)
}

/// Removes a deleted task and closes the gap it leaves
///
/// Only the siblings after the removed task shift, so only they get ops.
pub fn remove_task(hierarchy: &Hierarchy, task_id: &TaskId) -> Result<Reordered> {
    let (ci, ti) = hierarchy
        .locate_task(task_id)
        .ok_or_else(|| TaskboardError::invalid_reference(EntityKind::Task, task_id.as_str()))?;

    let mut next = hierarchy.clone();
    next.columns[ci].tasks.remove(ti);

    let mut ops = Vec::new();
    renumber_tasks(&mut next.columns[ci], &mut ops);
    Ok(Reordered::new(next, ops))
}

/// Removes a deleted column, with its tasks, and closes the gap it leaves
pub fn remove_column(hierarchy: &Hierarchy, column_id: &ColumnId) -> Result<Reordered> {
    let ci = hierarchy
        .column_index(column_id)
        .ok_or_else(|| TaskboardError::invalid_reference(EntityKind::Column, column_id.as_str()))?;

    let mut next = hierarchy.clone();
    next.columns.remove(ci);

    let mut ops = Vec::new();
    renumber_columns(&mut next.columns, &mut ops);
    Ok(Reordered::new(next, ops))
}

/// Renumbers every list densely without changing any order
///
/// Useful after hydrating rows whose stored positions have gaps or
/// duplicates; the ops bring the store in line with the snapshot.
pub fn normalize(hierarchy: &Hierarchy) -> Reordered {
    let mut next = hierarchy.clone();
    let mut ops = Vec::new();

    renumber_columns(&mut next.columns, &mut ops);
    for column in next.columns.iter_mut() {
        renumber_tasks(column, &mut ops);
    }

    Reordered::new(next, ops)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BoardId;
    use crate::reorder::PositionOp;

    fn column(id: &str, sort_order: i32) -> Column {
        Column::new(BoardId::from("board-1"), id, sort_order, "user-1").with_id(id)
    }

    fn task(id: &str, column_id: &str, sort_order: i32) -> Task {
        Task::new(ColumnId::from(column_id), id, sort_order).with_id(id)
    }

    fn sample() -> Hierarchy {
        Hierarchy::from_records(
            vec![column("a", 0), column("b", 1), column("c", 2)],
            vec![task("t1", "a", 0), task("t2", "a", 1), task("t3", "a", 2)],
        )
        .unwrap()
    }

    #[test]
    fn test_append_task_goes_last() {
        let result = append_task(&sample(), task("t4", "a", 99)).unwrap();

        let appended = result.hierarchy.task(&TaskId::from("t4")).unwrap();
        assert_eq!(appended.sort_order, 3);
        assert!(result.ops.is_empty());
        assert!(result.hierarchy.is_consistent());
    }

    #[test]
    fn test_append_task_to_unknown_column_fails() {
        let err = append_task(&sample(), task("t4", "ghost", 0)).unwrap_err();
        assert!(matches!(err, TaskboardError::InvalidReference { kind: EntityKind::Column, .. }));
    }

    #[test]
    fn test_append_column_goes_last() {
        let result = append_column(&sample(), column("d", 0));
        assert_eq!(result.hierarchy.columns[3].column.sort_order, 3);
        assert!(result.ops.is_empty());
        assert!(result.hierarchy.is_consistent());
    }

    #[test]
    fn test_append_task_after_gapped_load_does_not_collide() {
        let h = Hierarchy::from_records(
            vec![column("a", 0)],
            vec![task("t1", "a", 1), task("t2", "a", 2)],
        )
        .unwrap();

        let result = append_task(&h, task("t3", "a", 0)).unwrap();

        let positions: Vec<(String, i32)> = result.hierarchy.columns[0]
            .tasks
            .iter()
            .map(|t| (t.id.to_string(), t.sort_order))
            .collect();
        assert_eq!(
            positions,
            vec![("t1".to_string(), 0), ("t2".to_string(), 1), ("t3".to_string(), 2)]
        );
        assert_eq!(
            result.ops,
            vec![
                PositionOp::TaskPosition { task_id: TaskId::from("t1"), column_id: ColumnId::from("a"), sort_order: 0 },
                PositionOp::TaskPosition { task_id: TaskId::from("t2"), column_id: ColumnId::from("a"), sort_order: 1 },
            ]
        );
        assert!(result.hierarchy.is_consistent());
    }

    #[test]
    fn test_append_column_after_gapped_load_does_not_collide() {
        let h = Hierarchy::from_records(vec![column("a", 3), column("b", 7)], Vec::new()).unwrap();

        let result = append_column(&h, column("c", 0));

        let positions: Vec<i32> = result.hierarchy.columns.iter().map(|c| c.column.sort_order).collect();
        assert_eq!(positions, vec![0, 1, 2]);
        assert_eq!(result.ops.len(), 2);
    }

    #[test]
    fn test_remove_task_renumbers_only_later_siblings() {
        let result = remove_task(&sample(), &TaskId::from("t2")).unwrap();

        assert_eq!(
            result.ops,
            vec![PositionOp::TaskPosition {
                task_id: TaskId::from("t3"),
                column_id: ColumnId::from("a"),
                sort_order: 1,
            }]
        );
        assert!(result.hierarchy.is_consistent());
    }

    #[test]
    fn test_remove_last_task_needs_no_ops() {
        let result = remove_task(&sample(), &TaskId::from("t3")).unwrap();
        assert!(result.ops.is_empty());
    }

    #[test]
    fn test_remove_column_closes_gap() {
        let result = remove_column(&sample(), &ColumnId::from("a")).unwrap();

        assert_eq!(result.hierarchy.columns.len(), 2);
        assert_eq!(result.ops.len(), 2);
        assert_eq!(result.hierarchy.task_count(), 0);
        assert!(result.hierarchy.is_consistent());
    }

    #[test]
    fn test_normalize_fixes_gaps_and_duplicates() {
        let h = Hierarchy::from_records(
            vec![column("a", 5), column("b", 5)],
            vec![task("t1", "a", 3), task("t2", "a", 3), task("t3", "b", 0)],
        )
        .unwrap();

        let result = normalize(&h);

        assert!(result.hierarchy.is_consistent());
        // a: 5 -> 0, b: 5 -> 1, t1: 3 -> 0, t2: 3 -> 1
        assert_eq!(result.ops.len(), 4);
        assert!(normalize(&result.hierarchy).ops.is_empty());
    }
}
