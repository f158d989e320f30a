//! Authoritative in-memory task list, reconciled against the remote store.
//!
//! Every change to the held sequence happens after the store confirms it. The
//! state lock is taken to read a snapshot before a request and again to merge the
//! response; it is never held across a network call, so each merge applies to the
//! sequence as it stands when the response arrives.

use std::{collections::HashSet, sync::Arc};

use futures::future::join_all;
use shared::{
    domain::{Filter, Task, TaskId},
    protocol::{TaskDraft, TaskPatch},
};
use tokio::sync::{broadcast, Mutex};
use tracing::{info, warn};

use crate::{
    error::ListError,
    events::{ListAction, ListEvent, Notice},
    sequence,
    store::TaskStore,
};

const EVENT_CAPACITY: usize = 256;

/// What presentation renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListView {
    /// Filtered display sequence. While a reorder is in flight the held tasks
    /// appear in the dragged arrangement. Drag indices refer to this list.
    pub tasks: Vec<Task>,
    pub filter: Filter,
    pub pending_input: String,
    pub loading: bool,
}

#[derive(Debug, Clone)]
struct ListState {
    held: Vec<Task>,
    filter: Filter,
    pending_input: String,
    loading: bool,
    /// Arrangement of the newest in-flight reorder, by id.
    overlay: Option<Overlay>,
    /// Last reorder issued.
    reorder_issued: u64,
    /// Newest reorder whose response was adopted into `held`.
    reorder_adopted: u64,
}

#[derive(Debug, Clone)]
struct Overlay {
    generation: u64,
    arrangement: Vec<TaskId>,
}

impl ListState {
    /// Held tasks with their current values, in overlay order when a reorder is
    /// in flight.
    fn displayed(&self) -> Vec<Task> {
        match &self.overlay {
            Some(overlay) => sequence::arrange_by(&self.held, &overlay.arrangement),
            None => self.held.clone(),
        }
    }
}

impl Default for ListState {
    fn default() -> Self {
        Self {
            held: Vec::new(),
            filter: Filter::All,
            pending_input: String::new(),
            loading: true,
            overlay: None,
            reorder_issued: 0,
            reorder_adopted: 0,
        }
    }
}

pub struct ListController {
    store: Arc<dyn TaskStore>,
    inner: Mutex<ListState>,
    events: broadcast::Sender<ListEvent>,
}

impl ListController {
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            store,
            inner: Mutex::new(ListState::default()),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ListEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> ListView {
        let inner = self.inner.lock().await;
        ListView {
            tasks: sequence::filtered(&inner.displayed(), inner.filter),
            filter: inner.filter,
            pending_input: inner.pending_input.clone(),
            loading: inner.loading,
        }
    }

    pub async fn held(&self) -> Vec<Task> {
        self.inner.lock().await.held.clone()
    }

    pub async fn filtered(&self) -> Vec<Task> {
        let inner = self.inner.lock().await;
        sequence::filtered(&inner.held, inner.filter)
    }

    pub async fn set_filter(&self, filter: Filter) {
        self.inner.lock().await.filter = filter;
        self.emit(ListEvent::Changed);
    }

    pub async fn pending_input(&self) -> String {
        self.inner.lock().await.pending_input.clone()
    }

    pub async fn set_pending_input(&self, text: impl Into<String>) {
        self.inner.lock().await.pending_input = text.into();
        self.emit(ListEvent::Changed);
    }

    pub async fn is_loading(&self) -> bool {
        self.inner.lock().await.loading
    }

    /// Replaces the held sequence with the store's collection sorted by `order`.
    /// A failed load keeps whatever was held before.
    pub async fn load(&self) -> Result<(), ListError> {
        let result = self.store.list().await;
        let mut inner = self.inner.lock().await;
        inner.loading = false;
        match result {
            Ok(tasks) => {
                let mut tasks = sequence::dedup_by_id(tasks);
                sequence::sort_by_order(&mut tasks);
                info!(count = tasks.len(), "loaded task list");
                inner.held = tasks;
                drop(inner);
                self.emit(ListEvent::Changed);
                Ok(())
            }
            Err(err) => {
                drop(inner);
                self.fail(ListAction::Load, err)
            }
        }
    }

    /// Looks a single task up in the store's current collection.
    pub async fn fetch_task(&self, id: &TaskId) -> Result<Option<Task>, ListError> {
        match self.store.list().await {
            Ok(tasks) => Ok(tasks.into_iter().find(|task| &task.id == id)),
            Err(err) => self.fail(ListAction::LoadDetail, err),
        }
    }

    /// Creates a task from the pending input and appends it on success.
    pub async fn add(&self) -> Result<Task, ListError> {
        let draft = {
            let inner = self.inner.lock().await;
            // Held length, not filtered length, so the new rank follows every task.
            let order = inner.held.len() as i64 + 1;
            TaskDraft::new(inner.pending_input.clone(), order)?
        };

        let created = match self.store.create(&draft).await {
            Ok(task) => task,
            Err(err) => return self.fail(ListAction::Add, err),
        };

        {
            let mut inner = self.inner.lock().await;
            inner.held.retain(|task| task.id != created.id);
            inner.held.push(created.clone());
            if inner.pending_input == draft.text {
                inner.pending_input.clear();
            }
        }
        info!(id = %created.id, order = created.order, "added task");
        self.emit(ListEvent::Changed);
        self.notify(Notice::success(ListAction::Add, "Todo added successfully"));
        Ok(created)
    }

    /// Flips completion. Returns `Ok(None)` without a request when `id` is not held.
    pub async fn toggle(&self, id: &TaskId) -> Result<Option<Task>, ListError> {
        let current = {
            let inner = self.inner.lock().await;
            inner
                .held
                .iter()
                .find(|task| &task.id == id)
                .map(|task| task.completed)
        };
        let Some(completed) = current else {
            return Ok(None);
        };

        self.patch(ListAction::Toggle, id, TaskPatch::completed(!completed))
            .await
    }

    /// Replaces the text. Returns `Ok(None)` without a request when `id` is not held.
    pub async fn edit_text(
        &self,
        id: &TaskId,
        text: impl Into<String>,
    ) -> Result<Option<Task>, ListError> {
        let patch = TaskPatch::text(text)?;
        let held = {
            let inner = self.inner.lock().await;
            inner.held.iter().any(|task| &task.id == id)
        };
        if !held {
            return Ok(None);
        }

        let updated = self.patch(ListAction::Edit, id, patch).await?;
        if updated.is_some() {
            self.notify(Notice::success(ListAction::Edit, "Todo updated successfully"));
        }
        Ok(updated)
    }

    async fn patch(
        &self,
        action: ListAction,
        id: &TaskId,
        patch: TaskPatch,
    ) -> Result<Option<Task>, ListError> {
        let updated = match self.store.patch(id, &patch).await {
            Ok(task) => task,
            Err(err) => return self.fail(action, err),
        };

        let replaced = {
            let mut inner = self.inner.lock().await;
            match inner.held.iter_mut().find(|task| &task.id == id) {
                Some(slot) => {
                    *slot = updated.clone();
                    true
                }
                None => false,
            }
        };
        if !replaced {
            warn!(%id, %action, "task left the list before its update settled");
            return Ok(None);
        }
        self.emit(ListEvent::Changed);
        Ok(Some(updated))
    }

    /// Deletes one task. Remaining tasks keep their `order` values.
    pub async fn delete(&self, id: &TaskId) -> Result<(), ListError> {
        if let Err(err) = self.store.delete(id).await {
            return self.fail(ListAction::Delete, err);
        }

        self.inner.lock().await.held.retain(|task| &task.id != id);
        info!(%id, "deleted task");
        self.emit(ListEvent::Changed);
        self.notify(Notice::success(ListAction::Delete, "Todo deleted successfully"));
        Ok(())
    }

    /// Deletes every completed task concurrently and applies the removal only if
    /// all deletions succeed. Returns the number of tasks removed.
    pub async fn clear_completed(&self) -> Result<usize, ListError> {
        let targets: Vec<TaskId> = {
            let inner = self.inner.lock().await;
            inner
                .held
                .iter()
                .filter(|task| task.completed)
                .map(|task| task.id.clone())
                .collect()
        };

        let total = targets.len();
        let results = join_all(targets.iter().map(|id| self.store.delete(id))).await;
        let failed = results.iter().filter(|result| result.is_err()).count();
        if failed > 0 {
            for err in results.into_iter().filter_map(Result::err) {
                warn!(error = %err, "completed task deletion failed");
            }
            self.notify(Notice::failure(ListAction::ClearCompleted));
            return Err(ListError::ClearCompleted { failed, total });
        }

        if total > 0 {
            let cleared: HashSet<TaskId> = targets.into_iter().collect();
            self.inner
                .lock()
                .await
                .held
                .retain(|task| !cleared.contains(&task.id));
            info!(count = total, "cleared completed tasks");
            self.emit(ListEvent::Changed);
        }
        self.notify(Notice::success(
            ListAction::ClearCompleted,
            "Completed todos cleared",
        ));
        Ok(total)
    }

    /// Commits a drag from index `source` to index `destination` of the
    /// displayed view (see [`ListView::tasks`]). The new arrangement is shown as
    /// an overlay until the store answers; the held sequence only changes on
    /// success. When drags overlap, only the newest confirmed one is adopted, so
    /// an older response arriving late cannot undo a newer drag.
    pub async fn reorder(&self, source: usize, destination: usize) -> Result<(), ListError> {
        let (generation, proposed) = {
            let mut inner = self.inner.lock().await;
            let proposed = sequence::move_within_filter(
                &inner.displayed(),
                inner.filter,
                source,
                destination,
            )?;
            if source == destination {
                return Ok(());
            }
            inner.reorder_issued += 1;
            let generation = inner.reorder_issued;
            inner.overlay = Some(Overlay {
                generation,
                arrangement: proposed.iter().map(|task| task.id.clone()).collect(),
            });
            (generation, proposed)
        };
        self.emit(ListEvent::Changed);

        let result = self.store.replace_order(&proposed).await;

        let mut inner = self.inner.lock().await;
        if inner
            .overlay
            .as_ref()
            .is_some_and(|overlay| overlay.generation == generation)
        {
            inner.overlay = None;
        }
        match result {
            Ok(returned) => {
                if generation > inner.reorder_adopted {
                    let next = sequence::adopt_reordered(&inner.held, returned);
                    inner.held = next;
                    inner.reorder_adopted = generation;
                    info!(count = inner.held.len(), generation, "reordered tasks");
                } else {
                    warn!(generation, "newer reorder already adopted; dropping response");
                }
                drop(inner);
                self.emit(ListEvent::Changed);
                Ok(())
            }
            Err(err) => {
                drop(inner);
                self.emit(ListEvent::Changed);
                self.fail(ListAction::Reorder, err)
            }
        }
    }

    fn fail<T>(&self, action: ListAction, err: impl Into<ListError>) -> Result<T, ListError> {
        let err = err.into();
        warn!(%action, error = %err, "list intent failed");
        self.notify(Notice::failure(action));
        Err(err)
    }

    fn notify(&self, notice: Notice) {
        self.emit(ListEvent::Notice(notice));
    }

    fn emit(&self, event: ListEvent) {
        // No subscribers is fine; presentation may not be listening yet.
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
