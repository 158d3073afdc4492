//! Pushing reorder ops to a store and repairing the snapshot when some fail.

use crate::domain::{position_of, ColumnId, ColumnWithTasks, Hierarchy, Task};
use crate::reorder::{EntityRef, PositionOp, Reordered};
use crate::storage::BoardStore;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Mutex;

/// An op the store rejected
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OpFailure {
    pub op: PositionOp,
    pub error: String,
}

/// Outcome of one submission
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub applied: Vec<PositionOp>,
    pub failures: Vec<OpFailure>,
}

impl ReconcileReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn total(&self) -> usize {
        self.applied.len() + self.failures.len()
    }

    pub fn failed_entities(&self) -> HashSet<EntityRef> {
        self.failures.iter().map(|f| f.op.entity()).collect()
    }
}

/// Sends ops to a [`BoardStore`] in the order they were generated
///
/// Each entity has its own FIFO lock, so ops for one entity from
/// overlapping submissions reach the store in submission order while ops
/// for other entities proceed independently. A rejected op never stops
/// the ops after it.
pub struct Reconciler<S: BoardStore> {
    store: Arc<S>,
    locks: Mutex<HashMap<EntityRef, Arc<Mutex<()>>>>,
    in_flight: Mutex<HashMap<EntityRef, usize>>,
}

impl<S: BoardStore> Reconciler<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            locks: Mutex::new(HashMap::new()),
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Number of writes for this entity that have been queued but not finished
    pub async fn in_flight(&self, entity: &EntityRef) -> usize {
        self.in_flight.lock().await.get(entity).copied().unwrap_or(0)
    }

    /// Applies every op, best-effort, and reports what stuck
    pub async fn submit(&self, ops: &[PositionOp]) -> ReconcileReport {
        let mut report = ReconcileReport::default();

        for op in ops {
            let entity = op.entity();
            let lock = self.entity_lock(&entity).await;
            self.track(&entity, true).await;

            let result = {
                let _guard = lock.lock().await;
                self.store.apply_op(op).await
            };
            drop(lock);

            self.track(&entity, false).await;
            self.release_lock(&entity).await;
            match result {
                Ok(()) => report.applied.push(op.clone()),
                Err(e) => {
                    tracing::warn!(%entity, op = %op, error = %e, "position update rejected");
                    report.failures.push(OpFailure {
                        op: op.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        report
    }

    async fn entity_lock(&self, entity: &EntityRef) -> Arc<Mutex<()>> {
        self.locks
            .lock()
            .await
            .entry(entity.clone())
            .or_default()
            .clone()
    }

    /// Forgets an entity's lock once no submission holds or waits on it.
    async fn release_lock(&self, entity: &EntityRef) {
        let mut locks = self.locks.lock().await;
        if locks.get(entity).is_some_and(|lock| Arc::strong_count(lock) == 1) {
            locks.remove(entity);
        }
    }

    #[cfg(test)]
    async fn lock_count(&self) -> usize {
        self.locks.lock().await.len()
    }

    async fn track(&self, entity: &EntityRef, queued: bool) {
        let mut in_flight = self.in_flight.lock().await;
        if queued {
            *in_flight.entry(entity.clone()).or_insert(0) += 1;
        } else if let Some(count) = in_flight.get_mut(entity) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                in_flight.remove(entity);
            }
        }
    }
}

/// Reverts the entities the store rejected and re-densifies every list
///
/// `before` is the snapshot the store last fully agreed with and `after`
/// the optimistic one. Rejected entities go back to their `before` parent
/// and position; accepted ones keep their `after` state. When a reverted
/// entity and an accepted one claim the same slot, the reverted one comes
/// first, since the store still holds it there. The returned ops are repairs: entities whose final position
/// differs from what the store currently holds.
pub fn rollback(before: &Hierarchy, after: &Hierarchy, failed: &HashSet<EntityRef>) -> Reordered {
    let mut ops = Vec::new();

    let previous_columns: HashMap<&ColumnId, i32> = before
        .columns
        .iter()
        .map(|c| (c.id(), c.column.sort_order))
        .collect();
    let previous_tasks: HashMap<_, (&ColumnId, i32)> = before
        .columns
        .iter()
        .flat_map(|c| c.tasks.iter().map(move |t| (&t.id, (c.id(), t.sort_order))))
        .collect();

    // Column order: stored position, reverted before accepted, then optimistic order.
    let mut columns: Vec<(i32, bool, usize, &ColumnWithTasks)> = after
        .columns
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let reverted = failed.contains(&EntityRef::Column(entry.id().clone()));
            let stored = match previous_columns.get(entry.id()) {
                Some(position) if reverted => *position,
                _ => entry.column.sort_order,
            };
            (stored, reverted, index, entry)
        })
        .collect();
    columns.sort_by_key(|(stored, reverted, index, _)| (*stored, !*reverted, *index));

    // Task placement: same rule, grouped by the column each task is stored under.
    let mut placed: HashMap<ColumnId, Vec<(i32, bool, usize, &Task)>> = HashMap::new();
    let mut order = 0usize;
    for entry in &after.columns {
        for task in &entry.tasks {
            let reverted = failed.contains(&EntityRef::Task(task.id.clone()));
            let (column_id, stored) = match previous_tasks.get(&task.id) {
                Some((column_id, position)) if reverted => ((*column_id).clone(), *position),
                _ => (entry.id().clone(), task.sort_order),
            };
            placed
                .entry(column_id)
                .or_default()
                .push((stored, reverted, order, task));
            order += 1;
        }
    }

    let mut next = Vec::with_capacity(columns.len());
    for (index, (stored, _, _, entry)) in columns.into_iter().enumerate() {
        let mut column = entry.column.clone();
        column.sort_order = position_of(index);
        if column.sort_order != stored {
            ops.push(PositionOp::ColumnPosition {
                column_id: column.id.clone(),
                sort_order: column.sort_order,
            });
        }

        let mut slots = placed.remove(&column.id).unwrap_or_default();
        slots.sort_by_key(|(stored, reverted, order, _)| (*stored, !*reverted, *order));

        let mut tasks = Vec::with_capacity(slots.len());
        for (ti, (stored, _, _, task)) in slots.into_iter().enumerate() {
            let mut task = task.clone();
            let position = position_of(ti);
            if position != stored {
                ops.push(PositionOp::TaskPosition {
                    task_id: task.id.clone(),
                    column_id: column.id.clone(),
                    sort_order: position,
                });
            }
            task.column_id = column.id.clone();
            task.sort_order = position;
            tasks.push(task);
        }

        next.push(ColumnWithTasks::new(column, tasks));
    }

    for orphaned in placed.keys() {
        tracing::warn!(column = %orphaned, "rollback target column no longer loaded");
    }

    Reordered::new(Hierarchy::new(next), ops)
}
