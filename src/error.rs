use thiserror::Error;

pub type Result<T> = std::result::Result<T, TaskboardError>;

/// Kind of entity named by an identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Board,
    Column,
    Task,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Board => write!(f, "board"),
            Self::Column => write!(f, "column"),
            Self::Task => write!(f, "task"),
        }
    }
}

#[derive(Debug, Error)]
pub enum TaskboardError {
    #[error("Invalid reference: {kind} {id} is not in the loaded board")]
    InvalidReference { kind: EntityKind, id: String },

    #[error("Board not found: {0}")]
    BoardNotFound(String),

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Persistence failure: {0}")]
    Persistence(String),

    #[error("{failed} of {total} position updates failed")]
    PartialBatchFailure { failed: usize, total: usize },

    #[error("Invalid identifier: {0:?}")]
    InvalidId(String),

    #[error("Invalid priority '{0}'. Valid priorities: low, medium, high")]
    InvalidPriority(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl TaskboardError {
    pub(crate) fn invalid_reference(kind: EntityKind, id: impl Into<String>) -> Self {
        Self::InvalidReference {
            kind,
            id: id.into(),
        }
    }
}
