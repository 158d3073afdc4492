//! Board-level helpers that combine several store calls.

use crate::domain::{position_of, Board, BoardConfig, BoardId, Column, Hierarchy, NewBoard};
use crate::error::Result;
use crate::storage::BoardStore;

/// Loads a board's columns and tasks into a snapshot
pub async fn load_hierarchy<S>(store: &S, board_id: &BoardId) -> Result<Hierarchy>
where
    S: BoardStore + ?Sized,
{
    let columns = store.list_columns(board_id).await?;
    let tasks = store.list_tasks(board_id).await?;
    Hierarchy::from_records(columns, tasks)
}

/// Creates a board and its configured default columns
///
/// If a column cannot be created the board is deleted again, so a failed
/// call never leaves a half-built board behind.
pub async fn create_board_with_default_columns<S>(
    store: &S,
    new_board: NewBoard,
    config: &BoardConfig,
) -> Result<Board>
where
    S: BoardStore + ?Sized,
{
    config.validate()?;

    let board = store.create_board(&Board::from_new(new_board, config)).await?;

    for (index, title) in config.default_columns.iter().enumerate() {
        let column = Column::new(board.id.clone(), title.clone(), position_of(index), board.user_id.clone());
        if let Err(e) = store.create_column(&column).await {
            tracing::warn!(board = %board.id, column = %title, error = %e, "default column failed, removing board");
            if let Err(cleanup) = store.delete_board(&board.id).await {
                tracing::warn!(board = %board.id, error = %cleanup, "could not remove half-built board");
            }
            return Err(e);
        }
    }

    tracing::info!(board = %board.id, columns = config.default_columns.len(), "created board");
    Ok(board)
}
