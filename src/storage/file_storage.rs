use crate::{
    domain::{Board, BoardConfig, BoardId, Column, ColumnId, Task, TaskId},
    error::{Result, TaskboardError},
    storage::BoardStore,
};
use async_trait::async_trait;
use chrono::Utc;
use serde::{de::DeserializeOwned, Serialize};
use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};
use tokio::fs;

/// File-based storage implementation
///
/// Every record lives in its own JSON file:
/// `.taskboard/{boards,columns,tasks}/<id>.json`.
pub struct FileBoardStore {
    root_path: PathBuf,
}

impl FileBoardStore {
    const DATA_DIR: &'static str = ".taskboard";
    const BOARDS_DIR: &'static str = "boards";
    const COLUMNS_DIR: &'static str = "columns";
    const TASKS_DIR: &'static str = "tasks";
    const CONFIG_FILE: &'static str = "config.json";

    /// Creates a new FileBoardStore for the given project root
    pub fn new(project_root: impl AsRef<Path>) -> Self {
        Self {
            root_path: project_root.as_ref().join(Self::DATA_DIR),
        }
    }

    /// Creates the directory layout
    pub async fn initialize(&self) -> Result<()> {
        for dir in [Self::BOARDS_DIR, Self::COLUMNS_DIR, Self::TASKS_DIR] {
            self.ensure_directory_exists(&self.root_path.join(dir)).await?;
        }
        Ok(())
    }

    pub async fn is_initialized(&self) -> bool {
        self.root_path.join(Self::BOARDS_DIR).exists()
    }

    /// Loads `config.json`, falling back to defaults when it is absent
    pub async fn load_config(&self) -> Result<BoardConfig> {
        let path = self.root_path.join(Self::CONFIG_FILE);
        if !path.exists() {
            return Ok(BoardConfig::default());
        }

        let contents = fs::read_to_string(&path).await?;
        let config: BoardConfig = serde_json::from_str(&contents)
            .map_err(|e| TaskboardError::ConfigError(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Writes `config.json`
    pub async fn save_config(&self, config: &BoardConfig) -> Result<()> {
        config.validate()?;
        self.ensure_directory_exists(&self.root_path).await?;
        let json = serde_json::to_string_pretty(config)?;
        fs::write(self.root_path.join(Self::CONFIG_FILE), json).await?;
        Ok(())
    }

    /// Ids become file names, so only `[A-Za-z0-9_-]` is accepted.
    fn record_file(&self, dir: &str, id: &str) -> Result<PathBuf> {
        let safe = !id.is_empty()
            && id.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
        if !safe {
            return Err(TaskboardError::InvalidId(id.to_string()));
        }
        Ok(self.root_path.join(dir).join(format!("{}.json", id)))
    }

    async fn ensure_directory_exists(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path).await?;
        }
        Ok(())
    }

    async fn write_record<T: Serialize>(&self, dir: &str, id: &str, record: &T) -> Result<()> {
        let path = self.record_file(dir, id)?;
        self.ensure_directory_exists(&self.root_path.join(dir)).await?;
        let json = serde_json::to_string_pretty(record)?;
        fs::write(path, json).await?;
        tracing::debug!(dir, id, "wrote record");
        Ok(())
    }

    async fn read_record<T: DeserializeOwned>(&self, dir: &str, id: &str) -> Result<Option<T>> {
        let path = self.record_file(dir, id)?;
        if !path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&path).await?;
        Ok(Some(serde_json::from_str(&contents)?))
    }

    async fn read_all<T: DeserializeOwned>(&self, dir: &str) -> Result<Vec<T>> {
        let dir_path = self.root_path.join(dir);
        if !dir_path.exists() {
            return Ok(Vec::new());
        }

        let mut entries = fs::read_dir(&dir_path).await?;
        let mut records = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) == Some("json") {
                let contents = fs::read_to_string(&path).await?;
                records.push(serde_json::from_str(&contents)?);
            }
        }

        Ok(records)
    }

    async fn remove_record(&self, dir: &str, id: &str) -> Result<bool> {
        let path = self.record_file(dir, id)?;
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(path).await?;
        Ok(true)
    }

    async fn load_column(&self, id: &ColumnId) -> Result<Column> {
        self.read_record(Self::COLUMNS_DIR, id.as_str())
            .await?
            .ok_or_else(|| TaskboardError::ColumnNotFound(id.to_string()))
    }

    async fn load_task(&self, id: &TaskId) -> Result<Task> {
        self.read_record(Self::TASKS_DIR, id.as_str())
            .await?
            .ok_or_else(|| TaskboardError::TaskNotFound(id.to_string()))
    }

    async fn delete_tasks_of_column(&self, column_id: &ColumnId) -> Result<()> {
        let tasks: Vec<Task> = self.read_all(Self::TASKS_DIR).await?;
        for task in tasks.iter().filter(|t| &t.column_id == column_id) {
            self.remove_record(Self::TASKS_DIR, task.id.as_str()).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl BoardStore for FileBoardStore {
    async fn list_boards(&self, user_id: &str) -> Result<Vec<Board>> {
        let mut boards: Vec<Board> = self.read_all(Self::BOARDS_DIR).await?;
        boards.retain(|b| b.user_id == user_id);
        boards.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(boards)
    }

    async fn get_board(&self, id: &BoardId) -> Result<Board> {
        self.read_record(Self::BOARDS_DIR, id.as_str())
            .await?
            .ok_or_else(|| TaskboardError::BoardNotFound(id.to_string()))
    }

    async fn create_board(&self, board: &Board) -> Result<Board> {
        self.write_record(Self::BOARDS_DIR, board.id.as_str(), board).await?;
        Ok(board.clone())
    }

    async fn update_board(&self, board: &Board) -> Result<Board> {
        self.get_board(&board.id).await?;
        let mut updated = board.clone();
        updated.updated_at = Utc::now();
        self.write_record(Self::BOARDS_DIR, updated.id.as_str(), &updated).await?;
        Ok(updated)
    }

    async fn delete_board(&self, id: &BoardId) -> Result<()> {
        let columns = self.list_columns(id).await?;
        for column in &columns {
            self.delete_column(&column.id).await?;
        }
        self.remove_record(Self::BOARDS_DIR, id.as_str()).await?;
        Ok(())
    }

    async fn list_columns(&self, board_id: &BoardId) -> Result<Vec<Column>> {
        self.get_board(board_id).await?;
        let mut columns: Vec<Column> = self.read_all(Self::COLUMNS_DIR).await?;
        columns.retain(|c| &c.board_id == board_id);
        Ok(columns)
    }

    async fn create_column(&self, column: &Column) -> Result<Column> {
        self.get_board(&column.board_id).await?;
        self.write_record(Self::COLUMNS_DIR, column.id.as_str(), column).await?;
        Ok(column.clone())
    }

    async fn update_column_title(&self, id: &ColumnId, title: &str) -> Result<Column> {
        let mut column = self.load_column(id).await?;
        column.title = title.to_string();
        self.write_record(Self::COLUMNS_DIR, id.as_str(), &column).await?;
        Ok(column)
    }

    async fn delete_column(&self, id: &ColumnId) -> Result<()> {
        if !self.remove_record(Self::COLUMNS_DIR, id.as_str()).await? {
            return Err(TaskboardError::ColumnNotFound(id.to_string()));
        }
        self.delete_tasks_of_column(id).await
    }

    async fn list_tasks(&self, board_id: &BoardId) -> Result<Vec<Task>> {
        let column_ids: HashSet<ColumnId> = self
            .list_columns(board_id)
            .await?
            .into_iter()
            .map(|c| c.id)
            .collect();
        let mut tasks: Vec<Task> = self.read_all(Self::TASKS_DIR).await?;
        tasks.retain(|t| column_ids.contains(&t.column_id));
        Ok(tasks)
    }

    async fn create_task(&self, task: &Task) -> Result<Task> {
        self.load_column(&task.column_id).await?;
        self.write_record(Self::TASKS_DIR, task.id.as_str(), task).await?;
        Ok(task.clone())
    }

    async fn update_task(&self, task: &Task) -> Result<Task> {
        self.load_task(&task.id).await?;
        let mut updated = task.clone();
        updated.updated_at = Utc::now();
        self.write_record(Self::TASKS_DIR, updated.id.as_str(), &updated).await?;
        Ok(updated)
    }

    async fn delete_task(&self, id: &TaskId) -> Result<()> {
        if !self.remove_record(Self::TASKS_DIR, id.as_str()).await? {
            return Err(TaskboardError::TaskNotFound(id.to_string()));
        }
        Ok(())
    }

    async fn update_column_position(&self, id: &ColumnId, sort_order: i32) -> Result<Column> {
        let mut column = self.load_column(id).await?;
        column.sort_order = sort_order;
        self.write_record(Self::COLUMNS_DIR, id.as_str(), &column).await?;
        Ok(column)
    }

    async fn update_task_position(
        &self,
        id: &TaskId,
        column_id: &ColumnId,
        sort_order: i32,
    ) -> Result<Task> {
        self.load_column(column_id).await?;
        let mut task = self.load_task(id).await?;
        task.place(column_id.clone(), sort_order);
        self.write_record(Self::TASKS_DIR, id.as_str(), &task).await?;
        Ok(task)
    }
}
