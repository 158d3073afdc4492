use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

string_id!(
    /// Unique identifier for a board
    BoardId
);

/// Board configuration used when creating new boards
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Column titles created for every new board, in order
    pub default_columns: Vec<String>,
    /// Color tag used when a new board does not name one
    pub default_color: String,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            default_columns: vec![
                "To Do".to_string(),
                "In Progress".to_string(),
                "Review".to_string(),
                "Done".to_string(),
            ],
            default_color: "blue".to_string(),
        }
    }
}

impl BoardConfig {
    /// Checks the configuration for values the store would reject
    pub fn validate(&self) -> crate::error::Result<()> {
        if let Some(title) = self.default_columns.iter().find(|t| t.trim().is_empty()) {
            return Err(crate::error::TaskboardError::ConfigError(format!(
                "default column title {:?} is blank",
                title
            )));
        }
        if self.default_color.trim().is_empty() {
            return Err(crate::error::TaskboardError::ConfigError(
                "default color is blank".to_string(),
            ));
        }
        Ok(())
    }
}

/// Input for creating a board
#[derive(Debug, Clone, Default)]
pub struct NewBoard {
    pub title: String,
    pub description: Option<String>,
    pub color: Option<String>,
    pub user_id: String,
}

impl NewBoard {
    pub fn new(title: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            user_id: user_id.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

/// A kanban board owned by a single user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    pub id: BoardId,
    pub title: String,
    pub description: Option<String>,
    pub color: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Board {
    /// Builds a board record from creation input, filling unset fields from config
    pub fn from_new(new: NewBoard, config: &BoardConfig) -> Self {
        let now = Utc::now();
        Self {
            id: BoardId::generate(),
            title: new.title,
            description: new.description,
            color: new.color.unwrap_or_else(|| config.default_color.clone()),
            user_id: new.user_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets the title
    pub fn set_title(&mut self, title: String) {
        self.title = title;
        self.updated_at = Utc::now();
    }

    /// Sets the color tag
    pub fn set_color(&mut self, color: String) {
        self.color = color;
        self.updated_at = Utc::now();
    }
}
