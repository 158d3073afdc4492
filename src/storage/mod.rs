use crate::{
    domain::{Board, BoardId, Column, ColumnId, Task, TaskId},
    error::Result,
    reorder::PositionOp,
};
use async_trait::async_trait;

#[cfg(feature = "file-storage")]
pub mod file_storage;
pub mod memory_storage;

#[cfg(feature = "file-storage")]
pub use file_storage::FileBoardStore;
pub use memory_storage::InMemoryBoardStore;

/// Storage trait for boards, columns and tasks
///
/// The store owns durability and authorization. Position updates are the
/// only writes the reorder path needs; the rest is plain CRUD.
#[async_trait]
pub trait BoardStore: Send + Sync {
    /// Lists the boards owned by a user, newest first
    async fn list_boards(&self, user_id: &str) -> Result<Vec<Board>>;

    /// Loads a board by ID
    async fn get_board(&self, id: &BoardId) -> Result<Board>;

    /// Saves a new board
    async fn create_board(&self, board: &Board) -> Result<Board>;

    /// Overwrites an existing board's fields
    async fn update_board(&self, board: &Board) -> Result<Board>;

    /// Deletes a board together with its columns and tasks
    async fn delete_board(&self, id: &BoardId) -> Result<()>;

    /// Deletes several boards; an empty slice does nothing
    async fn delete_boards(&self, ids: &[BoardId]) -> Result<()> {
        for id in ids {
            self.delete_board(id).await?;
        }
        Ok(())
    }

    /// Lists a board's columns in any order
    async fn list_columns(&self, board_id: &BoardId) -> Result<Vec<Column>>;

    /// Saves a new column
    async fn create_column(&self, column: &Column) -> Result<Column>;

    /// Renames a column
    async fn update_column_title(&self, id: &ColumnId, title: &str) -> Result<Column>;

    /// Deletes a column together with its tasks
    async fn delete_column(&self, id: &ColumnId) -> Result<()>;

    /// Lists every task on a board in any order
    async fn list_tasks(&self, board_id: &BoardId) -> Result<Vec<Task>>;

    /// Saves a new task
    async fn create_task(&self, task: &Task) -> Result<Task>;

    /// Overwrites an existing task's fields
    async fn update_task(&self, task: &Task) -> Result<Task>;

    /// Deletes a task
    async fn delete_task(&self, id: &TaskId) -> Result<()>;

    /// Stores a column's new position
    async fn update_column_position(&self, id: &ColumnId, sort_order: i32) -> Result<Column>;

    /// Stores a task's new parent column and position together
    async fn update_task_position(
        &self,
        id: &TaskId,
        column_id: &ColumnId,
        sort_order: i32,
    ) -> Result<Task>;

    /// Best-effort batch of column position updates, one result per item
    async fn update_column_positions(&self, updates: &[(ColumnId, i32)]) -> Vec<Result<Column>> {
        let mut results = Vec::with_capacity(updates.len());
        for (id, sort_order) in updates {
            results.push(self.update_column_position(id, *sort_order).await);
        }
        results
    }

    /// Best-effort batch of task position updates, one result per item
    async fn update_task_positions(
        &self,
        updates: &[(TaskId, ColumnId, i32)],
    ) -> Vec<Result<Task>> {
        let mut results = Vec::with_capacity(updates.len());
        for (id, column_id, sort_order) in updates {
            results.push(self.update_task_position(id, column_id, *sort_order).await);
        }
        results
    }

    /// Applies one reorder op
    async fn apply_op(&self, op: &PositionOp) -> Result<()> {
        match op {
            PositionOp::ColumnPosition {
                column_id,
                sort_order,
            } => self.update_column_position(column_id, *sort_order).await.map(|_| ()),
            PositionOp::TaskPosition {
                task_id,
                column_id,
                sort_order,
            }
            | PositionOp::TaskMove {
                task_id,
                column_id,
                sort_order,
                ..
            } => self
                .update_task_position(task_id, column_id, *sort_order)
                .await
                .map(|_| ()),
        }
    }

    /// Applies reorder ops in order, best-effort, one result per op
    async fn apply_ops(&self, ops: &[PositionOp]) -> Vec<Result<()>> {
        let mut results = Vec::with_capacity(ops.len());
        for op in ops {
            results.push(self.apply_op(op).await);
        }
        results
    }
}
