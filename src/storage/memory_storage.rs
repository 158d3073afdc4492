use crate::{
    domain::{Board, BoardId, Column, ColumnId, Task, TaskId},
    error::{Result, TaskboardError},
    storage::BoardStore,
};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct State {
    boards: HashMap<BoardId, Board>,
    columns: HashMap<ColumnId, Column>,
    tasks: HashMap<TaskId, Task>,
    failing: HashSet<String>,
    position_writes: Vec<String>,
}

impl State {
    fn check_writable(&self, id: &str) -> Result<()> {
        if self.failing.contains(id) {
            return Err(TaskboardError::Persistence(format!("write rejected for {}", id)));
        }
        Ok(())
    }

    fn remove_column_cascade(&mut self, id: &ColumnId) {
        self.columns.remove(id);
        self.tasks.retain(|_, task| &task.column_id != id);
    }
}

/// In-memory storage, for tests and for callers without a backend
///
/// Writes to specific entities can be made to fail with
/// [`InMemoryBoardStore::fail_writes_for`], which is how the rollback path
/// is exercised.
#[derive(Debug, Default)]
pub struct InMemoryBoardStore {
    state: RwLock<State>,
}

impl InMemoryBoardStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts rows as if they had been loaded from a backend
    pub async fn seed(&self, board: Board, columns: Vec<Column>, tasks: Vec<Task>) {
        let mut state = self.state.write().await;
        state.boards.insert(board.id.clone(), board);
        for column in columns {
            state.columns.insert(column.id.clone(), column);
        }
        for task in tasks {
            state.tasks.insert(task.id.clone(), task);
        }
    }

    /// Makes every later write to this entity id fail
    pub async fn fail_writes_for(&self, id: impl Into<String>) {
        self.state.write().await.failing.insert(id.into());
    }

    pub async fn clear_failures(&self) {
        self.state.write().await.failing.clear();
    }

    /// Entity ids of accepted position writes, in the order they landed
    pub async fn position_writes(&self) -> Vec<String> {
        self.state.read().await.position_writes.clone()
    }
}

#[async_trait]
impl BoardStore for InMemoryBoardStore {
    async fn list_boards(&self, user_id: &str) -> Result<Vec<Board>> {
        let state = self.state.read().await;
        let mut boards: Vec<Board> = state
            .boards
            .values()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect();
        boards.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(boards)
    }

    async fn get_board(&self, id: &BoardId) -> Result<Board> {
        self.state
            .read()
            .await
            .boards
            .get(id)
            .cloned()
            .ok_or_else(|| TaskboardError::BoardNotFound(id.to_string()))
    }

    async fn create_board(&self, board: &Board) -> Result<Board> {
        let mut state = self.state.write().await;
        state.check_writable(board.id.as_str())?;
        state.boards.insert(board.id.clone(), board.clone());
        Ok(board.clone())
    }

    async fn update_board(&self, board: &Board) -> Result<Board> {
        let mut state = self.state.write().await;
        state.check_writable(board.id.as_str())?;
        if !state.boards.contains_key(&board.id) {
            return Err(TaskboardError::BoardNotFound(board.id.to_string()));
        }
        let mut updated = board.clone();
        updated.updated_at = Utc::now();
        state.boards.insert(updated.id.clone(), updated.clone());
        Ok(updated)
    }

    async fn delete_board(&self, id: &BoardId) -> Result<()> {
        let mut state = self.state.write().await;
        state.check_writable(id.as_str())?;
        if state.boards.remove(id).is_none() {
            return Err(TaskboardError::BoardNotFound(id.to_string()));
        }
        let column_ids: Vec<ColumnId> = state
            .columns
            .values()
            .filter(|c| &c.board_id == id)
            .map(|c| c.id.clone())
            .collect();
        for column_id in &column_ids {
            state.remove_column_cascade(column_id);
        }
        Ok(())
    }

    async fn list_columns(&self, board_id: &BoardId) -> Result<Vec<Column>> {
        let state = self.state.read().await;
        if !state.boards.contains_key(board_id) {
            return Err(TaskboardError::BoardNotFound(board_id.to_string()));
        }
        Ok(state
            .columns
            .values()
            .filter(|c| &c.board_id == board_id)
            .cloned()
            .collect())
    }

    async fn create_column(&self, column: &Column) -> Result<Column> {
        let mut state = self.state.write().await;
        state.check_writable(column.id.as_str())?;
        if !state.boards.contains_key(&column.board_id) {
            return Err(TaskboardError::BoardNotFound(column.board_id.to_string()));
        }
        state.columns.insert(column.id.clone(), column.clone());
        Ok(column.clone())
    }

    async fn update_column_title(&self, id: &ColumnId, title: &str) -> Result<Column> {
        let mut state = self.state.write().await;
        state.check_writable(id.as_str())?;
        let column = state
            .columns
            .get_mut(id)
            .ok_or_else(|| TaskboardError::ColumnNotFound(id.to_string()))?;
        column.title = title.to_string();
        Ok(column.clone())
    }

    async fn delete_column(&self, id: &ColumnId) -> Result<()> {
        let mut state = self.state.write().await;
        state.check_writable(id.as_str())?;
        if !state.columns.contains_key(id) {
            return Err(TaskboardError::ColumnNotFound(id.to_string()));
        }
        state.remove_column_cascade(id);
        Ok(())
    }

    async fn list_tasks(&self, board_id: &BoardId) -> Result<Vec<Task>> {
        let state = self.state.read().await;
        let column_ids: HashSet<&ColumnId> = state
            .columns
            .values()
            .filter(|c| &c.board_id == board_id)
            .map(|c| &c.id)
            .collect();
        Ok(state
            .tasks
            .values()
            .filter(|t| column_ids.contains(&t.column_id))
            .cloned()
            .collect())
    }

    async fn create_task(&self, task: &Task) -> Result<Task> {
        let mut state = self.state.write().await;
        state.check_writable(task.id.as_str())?;
        if !state.columns.contains_key(&task.column_id) {
            return Err(TaskboardError::ColumnNotFound(task.column_id.to_string()));
        }
        state.tasks.insert(task.id.clone(), task.clone());
        Ok(task.clone())
    }

    async fn update_task(&self, task: &Task) -> Result<Task> {
        let mut state = self.state.write().await;
        state.check_writable(task.id.as_str())?;
        if !state.tasks.contains_key(&task.id) {
            return Err(TaskboardError::TaskNotFound(task.id.to_string()));
        }
        let mut updated = task.clone();
        updated.updated_at = Utc::now();
        state.tasks.insert(updated.id.clone(), updated.clone());
        Ok(updated)
    }

    async fn delete_task(&self, id: &TaskId) -> Result<()> {
        let mut state = self.state.write().await;
        state.check_writable(id.as_str())?;
        state
            .tasks
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| TaskboardError::TaskNotFound(id.to_string()))
    }

    async fn update_column_position(&self, id: &ColumnId, sort_order: i32) -> Result<Column> {
        let mut state = self.state.write().await;
        state.check_writable(id.as_str())?;
        let column = state
            .columns
            .get_mut(id)
            .ok_or_else(|| TaskboardError::ColumnNotFound(id.to_string()))?;
        column.sort_order = sort_order;
        let column = column.clone();
        state.position_writes.push(id.to_string());
        Ok(column)
    }

    async fn update_task_position(
        &self,
        id: &TaskId,
        column_id: &ColumnId,
        sort_order: i32,
    ) -> Result<Task> {
        let mut state = self.state.write().await;
        state.check_writable(id.as_str())?;
        if !state.columns.contains_key(column_id) {
            return Err(TaskboardError::ColumnNotFound(column_id.to_string()));
        }
        let task = state
            .tasks
            .get_mut(id)
            .ok_or_else(|| TaskboardError::TaskNotFound(id.to_string()))?;
        task.place(column_id.clone(), sort_order);
        let task = task.clone();
        state.position_writes.push(id.to_string());
        Ok(task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BoardConfig, NewBoard};
    use crate::reorder::PositionOp;

    async fn seeded() -> (InMemoryBoardStore, Board) {
        let store = InMemoryBoardStore::new();
        let board = Board::from_new(NewBoard::new("Alpha", "user-1"), &BoardConfig::default());
        let todo = Column::new(board.id.clone(), "To Do", 0, "user-1").with_id("todo");
        let done = Column::new(board.id.clone(), "Done", 1, "user-1").with_id("done");
        let task = Task::new(ColumnId::from("todo"), "Write tests", 0).with_id("t1");
        store.seed(board.clone(), vec![todo, done], vec![task]).await;
        (store, board)
    }

    #[tokio::test]
    async fn test_update_task_position_moves_parent() {
        let (store, board) = seeded().await;

        let task = store
            .update_task_position(&TaskId::from("t1"), &ColumnId::from("done"), 0)
            .await
            .unwrap();
        assert_eq!(task.column_id.as_str(), "done");

        let tasks = store.list_tasks(&board.id).await.unwrap();
        assert_eq!(tasks[0].column_id.as_str(), "done");
        assert_eq!(store.position_writes().await, vec!["t1"]);
    }

    #[tokio::test]
    async fn test_update_task_position_to_unknown_column_fails() {
        let (store, _) = seeded().await;
        let err = store
            .update_task_position(&TaskId::from("t1"), &ColumnId::from("ghost"), 0)
            .await
            .unwrap_err();
        assert!(matches!(err, TaskboardError::ColumnNotFound(_)));
    }

    #[tokio::test]
    async fn test_injected_failure() {
        let (store, _) = seeded().await;
        store.fail_writes_for("todo").await;

        let err = store
            .update_column_position(&ColumnId::from("todo"), 1)
            .await
            .unwrap_err();
        assert!(matches!(err, TaskboardError::Persistence(_)));

        store.clear_failures().await;
        assert!(store.update_column_position(&ColumnId::from("todo"), 1).await.is_ok());
    }

    #[tokio::test]
    async fn test_batch_is_best_effort() {
        let (store, _) = seeded().await;
        store.fail_writes_for("todo").await;

        let results = store
            .update_column_positions(&[(ColumnId::from("todo"), 1), (ColumnId::from("done"), 0)])
            .await;

        assert!(results[0].is_err());
        assert_eq!(results[1].as_ref().unwrap().sort_order, 0);
    }

    #[tokio::test]
    async fn test_apply_ops_reports_each_op() {
        let (store, _) = seeded().await;
        let ops = vec![
            PositionOp::TaskMove {
                task_id: TaskId::from("t1"),
                from_column_id: ColumnId::from("todo"),
                column_id: ColumnId::from("done"),
                sort_order: 0,
            },
            PositionOp::ColumnPosition {
                column_id: ColumnId::from("ghost"),
                sort_order: 0,
            },
        ];

        let results = store.apply_ops(&ops).await;
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(TaskboardError::ColumnNotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_board_cascades() {
        let (store, board) = seeded().await;

        store.delete_board(&board.id).await.unwrap();

        assert!(matches!(
            store.get_board(&board.id).await,
            Err(TaskboardError::BoardNotFound(_))
        ));
        assert!(store.list_tasks(&board.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_boards_empty_slice() {
        let (store, board) = seeded().await;
        store.delete_boards(&[]).await.unwrap();
        assert!(store.get_board(&board.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_list_boards_newest_first() {
        let store = InMemoryBoardStore::new();
        let mut older = Board::from_new(NewBoard::new("Older", "user-1"), &BoardConfig::default());
        older.created_at = Utc::now() - chrono::Duration::days(1);
        let newer = Board::from_new(NewBoard::new("Newer", "user-1"), &BoardConfig::default());
        let foreign = Board::from_new(NewBoard::new("Foreign", "user-2"), &BoardConfig::default());

        for board in [older, newer, foreign] {
            store.create_board(&board).await.unwrap();
        }

        let boards = store.list_boards("user-1").await.unwrap();
        let titles: Vec<&str> = boards.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, vec!["Newer", "Older"]);
    }
}
