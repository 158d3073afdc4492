use crate::domain::column::ColumnId;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

string_id!(
    /// Unique identifier for a task
    TaskId
);

/// Priority of a task
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

impl FromStr for Priority {
    type Err = crate::error::TaskboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(crate::error::TaskboardError::InvalidPriority(s.to_string())),
        }
    }
}

/// A unit of work on the board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub column_id: ColumnId,
    pub title: String,
    pub description: Option<String>,
    pub assignee: Option<String>,
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub priority: Priority,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a new task in the given column at the given position
    pub fn new(column_id: ColumnId, title: impl Into<String>, sort_order: i32) -> Self {
        let now = Utc::now();
        Self {
            id: TaskId::generate(),
            column_id,
            title: title.into(),
            description: None,
            assignee: None,
            due_date: None,
            priority: Priority::default(),
            sort_order,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_id(mut self, id: impl Into<TaskId>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the description
    pub fn set_description(&mut self, description: String) {
        self.description = Some(description);
        self.updated_at = Utc::now();
    }

    /// Sets or clears the assignee
    pub fn set_assignee(&mut self, assignee: Option<String>) {
        self.assignee = assignee;
        self.updated_at = Utc::now();
    }

    /// Sets or clears the due date
    pub fn set_due_date(&mut self, due_date: Option<NaiveDate>) {
        self.due_date = due_date;
        self.updated_at = Utc::now();
    }

    /// Moves the task to a column and position in one step
    pub fn place(&mut self, column_id: ColumnId, sort_order: i32) {
        self.column_id = column_id;
        self.sort_order = sort_order;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_parsing() {
        assert_eq!(Priority::from_str("low").unwrap(), Priority::Low);
        assert_eq!(Priority::from_str("HIGH").unwrap(), Priority::High);
        assert_eq!(Priority::from_str(" Medium ").unwrap(), Priority::Medium);
        assert!(Priority::from_str("urgent").is_err());
    }

    #[test]
    fn test_priority_display_matches_serde() {
        for priority in [Priority::Low, Priority::Medium, Priority::High] {
            let json = serde_json::to_string(&priority).unwrap();
            assert_eq!(json, format!("\"{}\"", priority));
        }
    }

    #[test]
    fn test_place_updates_parent_and_position() {
        let mut task = Task::new(ColumnId::from("col-1"), "Write tests", 3);
        let before = task.updated_at;

        std::thread::sleep(std::time::Duration::from_millis(5));
        task.place(ColumnId::from("col-2"), 0);

        assert_eq!(task.column_id.as_str(), "col-2");
        assert_eq!(task.sort_order, 0);
        assert!(task.updated_at > before);
    }

    #[test]
    fn test_task_deserializes_backend_row() {
        let json = r#"{
            "id": "task-test-1",
            "column_id": "col-test-1",
            "title": "Setup testing framework",
            "description": "Install Vitest and configure test environment",
            "assignee": "John Doe",
            "due_date": "2025-01-15",
            "priority": "high",
            "sort_order": 0,
            "created_at": "2025-01-01T00:00:00Z",
            "updated_at": "2025-01-01T00:00:00Z"
        }"#;

        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.priority, Priority::High);
        assert_eq!(task.due_date, NaiveDate::from_ymd_opt(2025, 1, 15));
        assert_eq!(task.assignee.as_deref(), Some("John Doe"));
    }

    #[test]
    fn test_task_without_priority_defaults_to_medium() {
        let json = r#"{
            "id": "task-1",
            "column_id": "col-1",
            "title": "Old row",
            "description": null,
            "assignee": null,
            "due_date": null,
            "sort_order": 4,
            "created_at": "2025-01-01T00:00:00Z",
            "updated_at": "2025-01-01T00:00:00Z"
        }"#;

        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.priority, Priority::Medium);
    }
}
