use crate::domain::{
    column::{Column, ColumnId},
    sorting::{is_dense, sort_columns, sort_tasks},
    task::{Task, TaskId},
};
use crate::error::{EntityKind, Result, TaskboardError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A column together with its tasks in display order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnWithTasks {
    #[serde(flatten)]
    pub column: Column,
    pub tasks: Vec<Task>,
}

impl ColumnWithTasks {
    pub fn new(column: Column, tasks: Vec<Task>) -> Self {
        Self { column, tasks }
    }

    pub fn id(&self) -> &ColumnId {
        &self.column.id
    }

    /// Index of a task in this column's list
    pub fn task_index(&self, task_id: &TaskId) -> Option<usize> {
        self.tasks.iter().position(|t| &t.id == task_id)
    }
}

/// Snapshot of one board's columns and tasks, both in display order
///
/// A `Hierarchy` is a plain value. Reorder operations never modify one in
/// place; they return a new snapshot alongside the position updates that
/// produced it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Hierarchy {
    pub columns: Vec<ColumnWithTasks>,
}

impl Hierarchy {
    pub fn new(columns: Vec<ColumnWithTasks>) -> Self {
        Self { columns }
    }

    /// Builds a snapshot from flat store rows
    ///
    /// Rows are ordered by `sort_order` with deterministic tie-breaks; their
    /// stored positions are kept as-is, gaps included. Every task must point
    /// at one of the given columns, and all columns must share a board.
    pub fn from_records(mut columns: Vec<Column>, tasks: Vec<Task>) -> Result<Self> {
        if let Some(first) = columns.first() {
            let board_id = first.board_id.clone();
            if let Some(stray) = columns.iter().find(|c| c.board_id != board_id) {
                return Err(TaskboardError::invalid_reference(
                    EntityKind::Board,
                    stray.board_id.as_str(),
                ));
            }
        }

        sort_columns(&mut columns);

        let mut grouped: HashMap<ColumnId, Vec<Task>> = columns
            .iter()
            .map(|c| (c.id.clone(), Vec::new()))
            .collect();

        for task in tasks {
            match grouped.get_mut(&task.column_id) {
                Some(list) => list.push(task),
                None => {
                    return Err(TaskboardError::invalid_reference(
                        EntityKind::Column,
                        task.column_id.as_str(),
                    ))
                }
            }
        }

        let columns = columns
            .into_iter()
            .map(|column| {
                let mut tasks = grouped.remove(&column.id).unwrap_or_default();
                sort_tasks(&mut tasks);
                ColumnWithTasks::new(column, tasks)
            })
            .collect();

        Ok(Self { columns })
    }

    pub fn column_index(&self, column_id: &ColumnId) -> Option<usize> {
        self.columns.iter().position(|c| c.id() == column_id)
    }

    pub fn column(&self, column_id: &ColumnId) -> Option<&ColumnWithTasks> {
        self.columns.iter().find(|c| c.id() == column_id)
    }

    /// Finds a task, returning `(column index, task index)`
    pub fn locate_task(&self, task_id: &TaskId) -> Option<(usize, usize)> {
        self.columns.iter().enumerate().find_map(|(ci, column)| {
            column.task_index(task_id).map(|ti| (ci, ti))
        })
    }

    pub fn task(&self, task_id: &TaskId) -> Option<&Task> {
        self.locate_task(task_id)
            .map(|(ci, ti)| &self.columns[ci].tasks[ti])
    }

    pub fn contains_column(&self, column_id: &ColumnId) -> bool {
        self.column_index(column_id).is_some()
    }

    pub fn contains_task(&self, task_id: &TaskId) -> bool {
        self.locate_task(task_id).is_some()
    }

    pub fn task_count(&self) -> usize {
        self.columns.iter().map(|c| c.tasks.len()).sum()
    }

    /// Task ids of one column in display order
    pub fn task_ids(&self, column_id: &ColumnId) -> Vec<TaskId> {
        self.column(column_id)
            .map(|c| c.tasks.iter().map(|t| t.id.clone()).collect())
            .unwrap_or_default()
    }

    pub fn column_ids(&self) -> Vec<ColumnId> {
        self.columns.iter().map(|c| c.id().clone()).collect()
    }

    /// Checks that every list carries positions `0..n-1` and every task
    /// points at the column holding it
    pub fn is_consistent(&self) -> bool {
        is_dense(self.columns.iter().map(|c| c.column.sort_order))
            && self.columns.iter().all(|c| {
                is_dense(c.tasks.iter().map(|t| t.sort_order))
                    && c.tasks.iter().all(|t| &t.column_id == c.id())
            })
    }
}
