use crate::domain::{column::Column, task::Task};
use chrono::{DateTime, Utc};
use std::cmp::Ordering;

/// Converts a list index into a sort position
///
/// Lists never approach `i32::MAX` entries; saturating keeps the conversion total.
pub fn position_of(index: usize) -> i32 {
    i32::try_from(index).unwrap_or(i32::MAX)
}

/// Sorts columns into board order
///
/// Backend rows may carry gaps or duplicate positions after concurrent
/// edits. Ties on `sort_order` fall back to creation time, then id, so the
/// order is always total and stable across reloads.
///
/// # Examples
/// ```
/// use taskboard_core::domain::{sorting::sort_columns, BoardId, Column};
///
/// let board = BoardId::from("board-1");
/// let mut columns = vec![
///     Column::new(board.clone(), "Done", 7, "user").with_id("c"),
///     Column::new(board.clone(), "To Do", 0, "user").with_id("a"),
///     Column::new(board, "Doing", 3, "user").with_id("b"),
/// ];
///
/// sort_columns(&mut columns);
/// assert_eq!(columns[0].title, "To Do");
/// assert_eq!(columns[2].title, "Done");
/// ```
pub fn sort_columns(columns: &mut [Column]) {
    columns.sort_by(|a, b| {
        compare_positions(
            (a.sort_order, a.created_at, a.id.as_str()),
            (b.sort_order, b.created_at, b.id.as_str()),
        )
    });
}

/// Sorts the tasks of one column into display order
pub fn sort_tasks(tasks: &mut [Task]) {
    tasks.sort_by(|a, b| {
        compare_positions(
            (a.sort_order, a.created_at, a.id.as_str()),
            (b.sort_order, b.created_at, b.id.as_str()),
        )
    });
}

/// Compare by position, then creation time, then id
fn compare_positions(
    a: (i32, DateTime<Utc>, &str),
    b: (i32, DateTime<Utc>, &str),
) -> Ordering {
    a.0.cmp(&b.0)
        .then_with(|| a.1.cmp(&b.1))
        .then_with(|| a.2.cmp(b.2))
}

/// Checks that positions are exactly `0..n-1` in list order
pub fn is_dense<I>(positions: I) -> bool
where
    I: IntoIterator<Item = i32>,
{
    positions
        .into_iter()
        .enumerate()
        .all(|(index, position)| position == position_of(index))
}
