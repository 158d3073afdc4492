//! The owner of a board's live snapshot.
//!
//! A [`BoardSession`] is what a UI holds while a board is open. It applies
//! reorders optimistically, pushes the resulting ops through a
//! [`Reconciler`], and snaps rejected entities back. Gestures are serialized
//! by `&mut self`. Dropping the session discards its snapshot; writes that
//! were already sent finish or fail on their own.

use crate::domain::{Board, BoardId, Column, ColumnId, Hierarchy, Task, TaskId};
use crate::error::{Result, TaskboardError};
use crate::reconcile::{rollback, OpFailure, ReconcileReport, Reconciler};
use crate::reorder::{
    append_column, append_task, remove_column, remove_task, resolve_drag_event, DragDescriptor,
    DragOutcome, PositionOp,
};
use crate::service::load_hierarchy;
use crate::storage::BoardStore;
use serde::Serialize;
use std::sync::Arc;

/// What happened to a drag gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DragStatus {
    /// Nothing moved, or the gesture named something not on the board
    NoOp,
    /// Every op was accepted
    Persisted,
    /// Some ops were rejected and their entities snapped back
    RolledBack,
}

/// Result of [`BoardSession::handle_drag`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DragReport {
    pub status: DragStatus,
    pub ops: Vec<PositionOp>,
    pub failures: Vec<OpFailure>,
    pub repairs: Vec<PositionOp>,
}

impl DragReport {
    fn noop() -> Self {
        Self {
            status: DragStatus::NoOp,
            ops: Vec::new(),
            failures: Vec::new(),
            repairs: Vec::new(),
        }
    }

    /// Turns a rolled-back gesture into an error for callers that only
    /// want to surface failures
    pub fn into_result(self) -> Result<Self> {
        match self.status {
            DragStatus::RolledBack if self.failures.len() == self.ops.len() => {
                let reason = self
                    .failures
                    .first()
                    .map(|f| f.error.clone())
                    .unwrap_or_default();
                Err(TaskboardError::Persistence(reason))
            }
            DragStatus::RolledBack => Err(TaskboardError::PartialBatchFailure {
                failed: self.failures.len(),
                total: self.ops.len(),
            }),
            _ => Ok(self),
        }
    }
}

/// A loaded board plus its live snapshot
pub struct BoardSession<S: BoardStore> {
    board: Board,
    snapshot: Hierarchy,
    reconciler: Reconciler<S>,
}

impl<S: BoardStore> BoardSession<S> {
    /// Loads a board and its columns and tasks from the store
    pub async fn load(store: Arc<S>, board_id: &BoardId) -> Result<Self> {
        let board = store.get_board(board_id).await?;
        let snapshot = load_hierarchy(store.as_ref(), board_id).await?;
        tracing::info!(board = %board_id, columns = snapshot.columns.len(), tasks = snapshot.task_count(), "board session opened");

        Ok(Self {
            board,
            snapshot,
            reconciler: Reconciler::new(store),
        })
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// The current snapshot, including optimistic changes
    pub fn snapshot(&self) -> &Hierarchy {
        &self.snapshot
    }

    pub fn reconciler(&self) -> &Reconciler<S> {
        &self.reconciler
    }

    fn store(&self) -> &S {
        self.reconciler.store().as_ref()
    }

    /// Replaces the snapshot with fresh store contents
    pub async fn reload(&mut self) -> Result<()> {
        self.snapshot = load_hierarchy(self.store(), &self.board.id).await?;
        Ok(())
    }

    /// Applies a drag gesture and persists it
    ///
    /// A gesture naming an unknown entity is logged and treated as a no-op.
    /// When the store rejects some ops, the affected entities return to
    /// their pre-drag place, the rest keep their new place, and repair ops
    /// are sent for anything the re-densified lists shifted.
    pub async fn handle_drag(&mut self, drag: &DragDescriptor) -> Result<DragReport> {
        let reordered = match resolve_drag_event(&self.snapshot, drag) {
            Ok(DragOutcome::NoOp) => return Ok(DragReport::noop()),
            Ok(DragOutcome::Reordered(reordered)) => reordered,
            Err(e @ TaskboardError::InvalidReference { .. }) => {
                tracing::warn!(active = %drag.active_id, error = %e, "ignoring drag on stale snapshot");
                return Ok(DragReport::noop());
            }
            Err(e) => return Err(e),
        };

        let before = std::mem::replace(&mut self.snapshot, reordered.hierarchy);
        let report = self.reconciler.submit(&reordered.ops).await;

        if report.is_clean() {
            return Ok(DragReport {
                status: DragStatus::Persisted,
                ops: reordered.ops,
                failures: Vec::new(),
                repairs: Vec::new(),
            });
        }

        tracing::warn!(
            board = %self.board.id,
            failed = report.failures.len(),
            total = report.total(),
            "rolling back rejected position updates"
        );
        let repaired = rollback(&before, &self.snapshot, &report.failed_entities());
        self.snapshot = repaired.hierarchy;
        self.send_repairs(&repaired.ops).await;

        Ok(DragReport {
            status: DragStatus::RolledBack,
            ops: reordered.ops,
            failures: report.failures,
            repairs: repaired.ops,
        })
    }

    async fn send_repairs(&self, ops: &[PositionOp]) {
        if ops.is_empty() {
            return;
        }
        let report = self.reconciler.submit(ops).await;
        if !report.is_clean() {
            tracing::warn!(
                board = %self.board.id,
                failed = report.failures.len(),
                "repair writes rejected; stored positions keep gaps until the next reload"
            );
        }
    }

    /// Creates a task at the end of its column
    ///
    /// Any gaps left in the column's stored positions are closed first.
    pub async fn add_task(&mut self, task: Task) -> Result<Task> {
        let task_id = task.id.clone();
        let appended = append_task(&self.snapshot, task)?;
        let placed = appended
            .hierarchy
            .task(&task_id)
            .cloned()
            .ok_or_else(|| TaskboardError::TaskNotFound(task_id.to_string()))?;

        let created = self.store().create_task(&placed).await?;
        self.snapshot = appended.hierarchy;
        self.close_gap(&appended.ops).await;
        Ok(created)
    }

    /// Creates a column at the end of the board
    pub async fn add_column(&mut self, title: impl Into<String>) -> Result<Column> {
        let column = Column::new(self.board.id.clone(), title, 0, self.board.user_id.clone());
        let appended = append_column(&self.snapshot, column);
        let placed = appended
            .hierarchy
            .columns
            .last()
            .map(|c| c.column.clone())
            .ok_or_else(|| TaskboardError::ColumnNotFound(self.board.id.to_string()))?;

        let created = self.store().create_column(&placed).await?;
        self.snapshot = appended.hierarchy;
        self.close_gap(&appended.ops).await;
        Ok(created)
    }

    /// Renames a column in the store and the snapshot
    pub async fn rename_column(&mut self, id: &ColumnId, title: &str) -> Result<Column> {
        let ci = self
            .snapshot
            .column_index(id)
            .ok_or_else(|| TaskboardError::ColumnNotFound(id.to_string()))?;
        let updated = self.store().update_column_title(id, title).await?;
        self.snapshot.columns[ci].column.title = updated.title.clone();
        Ok(updated)
    }

    /// Deletes a task and closes the gap it leaves
    pub async fn delete_task(&mut self, id: &TaskId) -> Result<ReconcileReport> {
        let removed = remove_task(&self.snapshot, id)?;
        self.store().delete_task(id).await?;
        self.snapshot = removed.hierarchy;
        Ok(self.close_gap(&removed.ops).await)
    }

    /// Deletes a column with its tasks and closes the gap it leaves
    pub async fn delete_column(&mut self, id: &ColumnId) -> Result<ReconcileReport> {
        let removed = remove_column(&self.snapshot, id)?;
        self.store().delete_column(id).await?;
        self.snapshot = removed.hierarchy;
        Ok(self.close_gap(&removed.ops).await)
    }

    async fn close_gap(&self, ops: &[PositionOp]) -> ReconcileReport {
        let report = self.reconciler.submit(ops).await;
        if !report.is_clean() {
            // Hydration tolerates gaps, so the snapshot stays dense and the
            // store catches up on the next reorder of that list.
            tracing::warn!(board = %self.board.id, failed = report.failures.len(), "gap-closing writes rejected");
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BoardConfig, NewBoard};
    use crate::service::create_board_with_default_columns;
    use crate::storage::InMemoryBoardStore;

    async fn open() -> (Arc<InMemoryBoardStore>, BoardSession<InMemoryBoardStore>) {
        let store = Arc::new(InMemoryBoardStore::new());
        let board = create_board_with_default_columns(
            store.as_ref(),
            NewBoard::new("Alpha", "user-1"),
            &BoardConfig::default(),
        )
        .await
        .unwrap();
        let session = BoardSession::load(store.clone(), &board.id).await.unwrap();
        (store, session)
    }

    fn layout(hierarchy: &Hierarchy) -> Vec<(ColumnId, i32, Vec<(TaskId, i32)>)> {
        hierarchy
            .columns
            .iter()
            .map(|c| {
                let tasks = c.tasks.iter().map(|t| (t.id.clone(), t.sort_order)).collect();
                (c.id().clone(), c.column.sort_order, tasks)
            })
            .collect()
    }

    #[tokio::test]
    async fn test_add_task_appends_and_persists() {
        let (store, mut session) = open().await;
        let todo = session.snapshot().columns[0].id().clone();

        let first = session.add_task(Task::new(todo.clone(), "One", 42)).await.unwrap();
        let second = session.add_task(Task::new(todo.clone(), "Two", 42)).await.unwrap();

        assert_eq!(first.sort_order, 0);
        assert_eq!(second.sort_order, 1);
        assert_eq!(store.list_tasks(&session.board().id).await.unwrap().len(), 2);
        assert!(session.snapshot().is_consistent());
    }

    #[tokio::test]
    async fn test_add_task_to_gapped_column_persists_dense_positions() {
        let (store, session) = open().await;
        let todo = session.snapshot().columns[0].id().clone();
        let board_id = session.board().id.clone();
        store.create_task(&Task::new(todo.clone(), "Gap one", 1).with_id("g1")).await.unwrap();
        store.create_task(&Task::new(todo.clone(), "Gap two", 2).with_id("g2")).await.unwrap();
        let mut session = BoardSession::load(store.clone(), &board_id).await.unwrap();

        let added = session.add_task(Task::new(todo.clone(), "New", 0)).await.unwrap();

        assert_eq!(added.sort_order, 2);
        assert!(session.snapshot().is_consistent());
        session.reload().await.unwrap();
        assert!(session.snapshot().is_consistent());
        assert_eq!(
            session.snapshot().task_ids(&todo),
            vec![TaskId::from("g1"), TaskId::from("g2"), added.id]
        );
    }

    #[tokio::test]
    async fn test_drag_persists_and_matches_reload() {
        let (_store, mut session) = open().await;
        let todo = session.snapshot().columns[0].id().clone();
        let doing = session.snapshot().columns[1].id().clone();
        let task = session.add_task(Task::new(todo, "Move me", 0)).await.unwrap();

        let report = session
            .handle_drag(&DragDescriptor::task_over_column(task.id.as_str(), doing.as_str()))
            .await
            .unwrap();

        assert_eq!(report.status, DragStatus::Persisted);
        let optimistic = layout(session.snapshot());
        session.reload().await.unwrap();
        assert_eq!(layout(session.snapshot()), optimistic);
        assert_eq!(session.snapshot().task_ids(&doing), vec![task.id]);
    }

    #[tokio::test]
    async fn test_rejected_drag_snaps_back() {
        let (store, mut session) = open().await;
        let todo = session.snapshot().columns[0].id().clone();
        let doing = session.snapshot().columns[1].id().clone();
        let task = session.add_task(Task::new(todo, "Stuck", 0)).await.unwrap();
        let before = session.snapshot().clone();
        store.fail_writes_for(task.id.as_str()).await;

        let report = session
            .handle_drag(&DragDescriptor::task_over_column(task.id.as_str(), doing.as_str()))
            .await
            .unwrap();

        assert_eq!(report.status, DragStatus::RolledBack);
        assert_eq!(session.snapshot(), &before);
        assert!(matches!(report.into_result(), Err(TaskboardError::Persistence(_))));
    }

    #[tokio::test]
    async fn test_stale_drag_is_ignored() {
        let (_store, mut session) = open().await;
        let before = session.snapshot().clone();

        let report = session
            .handle_drag(&DragDescriptor::task_over_task("gone", "also-gone"))
            .await
            .unwrap();

        assert_eq!(report.status, DragStatus::NoOp);
        assert_eq!(session.snapshot(), &before);
    }

    #[tokio::test]
    async fn test_delete_task_closes_gap_in_store() {
        let (store, mut session) = open().await;
        let todo = session.snapshot().columns[0].id().clone();
        let a = session.add_task(Task::new(todo.clone(), "A", 0)).await.unwrap();
        session.add_task(Task::new(todo.clone(), "B", 0)).await.unwrap();
        session.add_task(Task::new(todo.clone(), "C", 0)).await.unwrap();

        let report = session.delete_task(&a.id).await.unwrap();

        assert_eq!(report.applied.len(), 2);
        session.reload().await.unwrap();
        assert!(session.snapshot().is_consistent());
        let titles: Vec<String> = store
            .list_tasks(&session.board().id)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(titles.len(), 2);
    }

    #[tokio::test]
    async fn test_failed_delete_leaves_snapshot() {
        let (store, mut session) = open().await;
        let todo = session.snapshot().columns[0].id().clone();
        let task = session.add_task(Task::new(todo, "Keep", 0)).await.unwrap();
        store.fail_writes_for(task.id.as_str()).await;
        let before = session.snapshot().clone();

        assert!(session.delete_task(&task.id).await.is_err());
        assert_eq!(session.snapshot(), &before);
    }

    #[tokio::test]
    async fn test_add_rename_and_delete_column() {
        let (_store, mut session) = open().await;

        let column = session.add_column("Blocked").await.unwrap();
        assert_eq!(column.sort_order, 4);

        session.rename_column(&column.id, "On Hold").await.unwrap();
        assert_eq!(session.snapshot().columns[4].column.title, "On Hold");

        let first = session.snapshot().columns[0].id().clone();
        let report = session.delete_column(&first).await.unwrap();
        assert_eq!(report.applied.len(), 4);

        session.reload().await.unwrap();
        assert!(session.snapshot().is_consistent());
        assert_eq!(session.snapshot().columns.len(), 4);
    }
}
