use crate::domain::board::BoardId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

string_id!(
    /// Unique identifier for a column
    ColumnId
);

/// An ordered container of tasks within a board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub id: ColumnId,
    pub board_id: BoardId,
    pub title: String,
    pub sort_order: i32,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

impl Column {
    /// Creates a new column at the given position
    pub fn new(board_id: BoardId, title: impl Into<String>, sort_order: i32, user_id: impl Into<String>) -> Self {
        Self {
            id: ColumnId::generate(),
            board_id,
            title: title.into(),
            sort_order,
            user_id: user_id.into(),
            created_at: Utc::now(),
        }
    }

    pub fn with_id(mut self, id: impl Into<ColumnId>) -> Self {
        self.id = id.into();
        self
    }
}
