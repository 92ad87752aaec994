//! Task Store: the session's authoritative task collection.
//!
//! The collection only changes after the remote service confirms a change. `load`
//! replaces it wholesale; `add_task`, `toggle_complete` and `delete_task` patch a
//! single task by identifier against whatever the collection holds when the remote
//! call settles, so in-flight operations on different tasks never overwrite each
//! other. Operations on the same task race and the last response to arrive wins.
//!
//! Failures never escape as errors: they land in a single error slot, replacing any
//! previous one, and are cleared by the next successful operation or
//! [`TaskStore::dismiss_error`].

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::watch;
use tracing::{error, info, instrument, warn};

use crate::error::StoreError;
use crate::models::{CreateTask, Task, TaskId, UpdateTask};
use crate::remote::TaskRemote;

pub struct TaskStore<R: TaskRemote> {
    remote: Arc<R>,
    tasks: watch::Sender<Vec<Task>>,
    loading: watch::Sender<bool>,
    loads_in_flight: Mutex<usize>,
    error: watch::Sender<Option<StoreError>>,
}

impl<R: TaskRemote> TaskStore<R> {
    pub fn new(remote: R) -> Self {
        Self::from_arc(Arc::new(remote))
    }

    pub fn from_arc(remote: Arc<R>) -> Self {
        Self {
            remote,
            tasks: watch::Sender::new(Vec::new()),
            loading: watch::Sender::new(false),
            loads_in_flight: Mutex::new(0),
            error: watch::Sender::new(None),
        }
    }

    /// Receiver that observes every change to the collection
    pub fn subscribe(&self) -> watch::Receiver<Vec<Task>> {
        self.tasks.subscribe()
    }

    pub fn subscribe_errors(&self) -> watch::Receiver<Option<StoreError>> {
        self.error.subscribe()
    }

    pub fn subscribe_loading(&self) -> watch::Receiver<bool> {
        self.loading.subscribe()
    }

    /// Snapshot of the collection, newest first
    pub fn tasks(&self) -> Vec<Task> {
        self.tasks.borrow().clone()
    }

    pub fn get(&self, id: &TaskId) -> Option<Task> {
        self.tasks.borrow().iter().find(|task| task.id == *id).cloned()
    }

    pub fn len(&self) -> usize {
        self.tasks.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.borrow().is_empty()
    }

    pub fn is_loading(&self) -> bool {
        *self.loading.borrow()
    }

    pub fn error(&self) -> Option<StoreError> {
        self.error.borrow().clone()
    }

    /// Replace the collection with the server's.
    ///
    /// On failure the previous collection is kept. Returns whether the collection was replaced.
    /// The loading flag stays set until every overlapping load has settled.
    #[instrument(skip(self))]
    pub async fn load(&self) -> bool {
        self.begin_load();
        let result = self.remote.fetch_all().await;

        let loaded = match result {
            Ok(tasks) => {
                info!(count = tasks.len(), "Loaded tasks");
                self.tasks.send_replace(tasks);
                self.clear_error();
                true
            }
            Err(err) => {
                error!(error = %err, "Failed to fetch tasks");
                self.fail(StoreError::fetch(&err));
                false
            }
        };

        self.end_load();
        loaded
    }

    /// Create a task and prepend the server's record.
    ///
    /// Input is forwarded as-is; title validation belongs to the caller.
    #[instrument(skip(self, input), fields(task_title = %input.title))]
    pub async fn add_task(&self, input: CreateTask) -> Option<Task> {
        match self.remote.create(input).await {
            Ok(task) => {
                self.tasks.send_modify(|tasks| {
                    if let Some(position) = tasks.iter().position(|t| t.id == task.id) {
                        warn!(task_id = %task.id, "Created task id already present, replacing stale entry");
                        tasks.remove(position);
                    }
                    tasks.insert(0, task.clone());
                });
                self.clear_error();
                Some(task)
            }
            Err(err) => {
                error!(error = %err, "Failed to add task");
                self.fail(StoreError::create(&err));
                None
            }
        }
    }

    /// Ask the server to flip completion and replace the task in place with its answer.
    ///
    /// Returns the applied record, or `None` when the call failed or the id no longer
    /// matches a task in the collection.
    #[instrument(skip(self), fields(task_id = %id))]
    pub async fn toggle_complete(&self, id: &TaskId, current_status: bool) -> Option<Task> {
        let patch = UpdateTask::completion(!current_status);

        let updated = match self.remote.update(id, patch).await {
            Ok(updated) => updated,
            Err(err) => {
                error!(error = %err, "Failed to update task");
                self.fail(StoreError::update(&err));
                return None;
            }
        };
        self.clear_error();

        if updated.id != *id {
            warn!(returned_id = %updated.id, "Update response is for a different task, ignoring");
            return None;
        }

        let replaced = self.tasks.send_if_modified(|tasks| {
            match tasks.iter_mut().find(|task| task.id == *id) {
                Some(slot) => {
                    *slot = updated.clone();
                    true
                }
                None => false,
            }
        });

        if !replaced {
            warn!("Stale task reference, nothing to update");
            return None;
        }
        Some(updated)
    }

    /// Delete a task on the server, then drop it locally.
    ///
    /// On failure the task stays in the collection. Returns whether the server confirmed.
    #[instrument(skip(self), fields(task_id = %id))]
    pub async fn delete_task(&self, id: &TaskId) -> bool {
        match self.remote.delete(id).await {
            Ok(()) => {
                let removed = self.tasks.send_if_modified(|tasks| {
                    let before = tasks.len();
                    tasks.retain(|task| task.id != *id);
                    tasks.len() != before
                });
                if !removed {
                    warn!("Deleted task was not in the collection");
                }
                self.clear_error();
                true
            }
            Err(err) => {
                error!(error = %err, "Failed to delete task");
                self.fail(StoreError::delete(&err));
                false
            }
        }
    }

    pub fn dismiss_error(&self) {
        self.clear_error();
    }

    /// Drop all session state (on logout)
    pub fn clear(&self) {
        self.tasks.send_if_modified(|tasks| {
            let had_tasks = !tasks.is_empty();
            tasks.clear();
            had_tasks
        });
        self.clear_error();
    }

    fn begin_load(&self) {
        let mut in_flight = self
            .loads_in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *in_flight += 1;
        self.loading.send_if_modified(|loading| !std::mem::replace(loading, true));
    }

    fn end_load(&self) {
        let mut in_flight = self
            .loads_in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *in_flight = in_flight.saturating_sub(1);
        if *in_flight == 0 {
            self.loading.send_if_modified(|loading| std::mem::replace(loading, false));
        }
    }

    fn fail(&self, err: StoreError) {
        self.error.send_replace(Some(err));
    }

    fn clear_error(&self) {
        self.error.send_if_modified(|slot| slot.take().is_some());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{TaskError, TaskResult};
    use crate::models::TaskPriority;
    use crate::remote::MockTaskRemote;
    use async_trait::async_trait;
    use mockall::predicate::eq;
    use std::collections::VecDeque;
    use tokio::sync::oneshot;

    fn buy_milk() -> Task {
        Task::new("1", "Buy milk").with_priority(TaskPriority::High)
    }

    fn clean_house() -> Task {
        Task::new("2", "Clean house")
            .with_priority(TaskPriority::Low)
            .with_completed(true)
    }

    fn offline() -> TaskError {
        TaskError::Transport("connection refused".to_string())
    }

    async fn loaded_store(mut remote: MockTaskRemote) -> TaskStore<MockTaskRemote> {
        remote
            .expect_fetch_all()
            .times(1)
            .returning(|| Ok(vec![buy_milk(), clean_house()]));
        let store = TaskStore::new(remote);
        assert!(store.load().await);
        store
    }

    #[tokio::test]
    async fn test_load_replaces_collection() {
        let store = loaded_store(MockTaskRemote::new()).await;

        assert_eq!(store.tasks(), vec![buy_milk(), clean_house()]);
        assert!(!store.is_loading());
        assert_eq!(store.error(), None);
    }

    #[tokio::test]
    async fn test_load_failure_keeps_previous_collection() {
        let mut remote = MockTaskRemote::new();
        let mut calls = 0;
        remote.expect_fetch_all().times(2).returning(move || {
            calls += 1;
            if calls == 1 {
                Ok(vec![buy_milk(), clean_house()])
            } else {
                Err(offline())
            }
        });
        let store = TaskStore::new(remote);

        assert!(store.load().await);
        assert!(!store.load().await);

        assert_eq!(store.tasks(), vec![buy_milk(), clean_house()]);
        assert!(matches!(store.error(), Some(StoreError::Fetch { .. })));
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn test_add_task_prepends_confirmed_record() {
        let mut remote = MockTaskRemote::new();
        remote
            .expect_create()
            .withf(|input| input.title == "New")
            .times(1)
            .returning(|_| Ok(Task::new("3", "New")));
        let store = loaded_store(remote).await;

        let added = store.add_task(CreateTask::new("New")).await;

        assert_eq!(added, Some(Task::new("3", "New")));
        assert_eq!(
            store.tasks(),
            vec![Task::new("3", "New"), buy_milk(), clean_house()]
        );
    }

    #[tokio::test]
    async fn test_add_task_failure_leaves_collection() {
        let mut remote = MockTaskRemote::new();
        remote.expect_create().returning(|_| Err(offline()));
        let store = loaded_store(remote).await;

        assert_eq!(store.add_task(CreateTask::new("New")).await, None);

        assert_eq!(store.len(), 2);
        assert!(matches!(store.error(), Some(StoreError::Create { .. })));
    }

    #[tokio::test]
    async fn test_add_task_with_duplicate_id_keeps_ids_unique() {
        let mut remote = MockTaskRemote::new();
        remote
            .expect_create()
            .returning(|_| Ok(Task::new("2", "Clean house again")));
        let store = loaded_store(remote).await;

        store.add_task(CreateTask::new("Clean house again")).await;

        let ids: Vec<_> = store.tasks().into_iter().map(|task| task.id).collect();
        assert_eq!(ids, vec![TaskId::new("2"), TaskId::new("1")]);
    }

    #[tokio::test]
    async fn test_toggle_complete_replaces_in_place() {
        let mut remote = MockTaskRemote::new();
        remote
            .expect_update()
            .with(eq(TaskId::new("1")), eq(UpdateTask::completion(true)))
            .times(1)
            .returning(|_, _| Ok(buy_milk().with_completed(true)));
        let store = loaded_store(remote).await;

        let updated = store.toggle_complete(&TaskId::new("1"), false).await;

        assert_eq!(updated, Some(buy_milk().with_completed(true)));
        assert_eq!(
            store.tasks(),
            vec![buy_milk().with_completed(true), clean_house()]
        );
    }

    #[tokio::test]
    async fn test_toggle_complete_failure_sets_error() {
        let mut remote = MockTaskRemote::new();
        remote.expect_update().returning(|_, _| Err(offline()));
        let store = loaded_store(remote).await;

        assert_eq!(store.toggle_complete(&TaskId::new("1"), false).await, None);

        assert_eq!(store.tasks(), vec![buy_milk(), clean_house()]);
        assert!(matches!(store.error(), Some(StoreError::Update { .. })));
    }

    #[tokio::test]
    async fn test_toggle_complete_unknown_id_is_noop() {
        let mut remote = MockTaskRemote::new();
        remote
            .expect_update()
            .returning(|_, _| Ok(Task::new("99", "Ghost").with_completed(true)));
        let store = loaded_store(remote).await;
        let mut changes = store.subscribe();
        changes.borrow_and_update();

        assert_eq!(store.toggle_complete(&TaskId::new("99"), false).await, None);

        assert_eq!(store.tasks(), vec![buy_milk(), clean_house()]);
        assert!(!changes.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_toggle_complete_ignores_response_for_other_task() {
        let mut remote = MockTaskRemote::new();
        remote
            .expect_update()
            .returning(|_, _| Ok(clean_house().with_completed(false)));
        let store = loaded_store(remote).await;

        assert_eq!(store.toggle_complete(&TaskId::new("1"), false).await, None);
        assert_eq!(store.tasks(), vec![buy_milk(), clean_house()]);
    }

    #[tokio::test]
    async fn test_delete_task_removes_after_confirmation() {
        let mut remote = MockTaskRemote::new();
        remote
            .expect_delete()
            .with(eq(TaskId::new("2")))
            .times(1)
            .returning(|_| Ok(()));
        let store = loaded_store(remote).await;

        assert!(store.delete_task(&TaskId::new("2")).await);
        assert_eq!(store.tasks(), vec![buy_milk()]);
    }

    #[tokio::test]
    async fn test_delete_task_failure_keeps_task() {
        let mut remote = MockTaskRemote::new();
        remote.expect_delete().returning(|_| Err(offline()));
        let store = loaded_store(remote).await;

        assert!(!store.delete_task(&TaskId::new("2")).await);

        assert!(store.get(&TaskId::new("2")).is_some());
        let err = store.error().unwrap();
        assert!(matches!(err, StoreError::Delete { .. }));
        assert_eq!(err.to_string(), "Failed to delete task. Please try again.");
    }

    #[tokio::test]
    async fn test_latest_error_wins_and_success_clears() {
        let mut remote = MockTaskRemote::new();
        remote.expect_delete().returning(|_| Err(offline()));
        remote.expect_create().times(1).returning(|_| Err(offline()));
        remote
            .expect_update()
            .returning(|_, _| Ok(buy_milk().with_completed(true)));
        let store = loaded_store(remote).await;

        store.delete_task(&TaskId::new("2")).await;
        store.add_task(CreateTask::new("New")).await;
        assert!(matches!(store.error(), Some(StoreError::Create { .. })));

        store.toggle_complete(&TaskId::new("1"), false).await;
        assert_eq!(store.error(), None);
    }

    #[tokio::test]
    async fn test_dismiss_error() {
        let mut remote = MockTaskRemote::new();
        remote.expect_fetch_all().returning(|| Err(offline()));
        let store = TaskStore::new(remote);

        store.load().await;
        assert!(store.error().is_some());

        store.dismiss_error();
        assert_eq!(store.error(), None);
    }

    #[tokio::test]
    async fn test_clear_drops_session_state() {
        let store = loaded_store(MockTaskRemote::new()).await;

        store.clear();

        assert!(store.is_empty());
        assert_eq!(store.error(), None);
    }

    #[tokio::test]
    async fn test_load_notifies_subscribers() {
        let mut remote = MockTaskRemote::new();
        remote
            .expect_fetch_all()
            .returning(|| Ok(vec![buy_milk()]));
        let store = TaskStore::new(remote);
        let mut changes = store.subscribe();

        store.load().await;

        assert!(changes.has_changed().unwrap());
        assert_eq!(*changes.borrow_and_update(), vec![buy_milk()]);
    }

    type Gate<T> = oneshot::Receiver<TaskResult<T>>;

    /// Remote whose calls resolve only when the test releases them. Each method takes
    /// the next gate of its queue; with no gate left it answers immediately.
    #[derive(Default)]
    struct GatedRemote {
        fetches: Mutex<VecDeque<Gate<Vec<Task>>>>,
        updates: Mutex<VecDeque<Gate<Task>>>,
        deletes: Mutex<VecDeque<Gate<()>>>,
    }

    impl GatedRemote {
        fn with_fetches(mut self, gates: Vec<Gate<Vec<Task>>>) -> Self {
            self.fetches = Mutex::new(gates.into());
            self
        }

        fn with_updates(mut self, gates: Vec<Gate<Task>>) -> Self {
            self.updates = Mutex::new(gates.into());
            self
        }

        fn with_deletes(mut self, gates: Vec<Gate<()>>) -> Self {
            self.deletes = Mutex::new(gates.into());
            self
        }
    }

    async fn pass<T>(queue: &Mutex<VecDeque<Gate<T>>>, otherwise: TaskResult<T>) -> TaskResult<T> {
        let gate = queue.lock().unwrap().pop_front();
        match gate {
            Some(gate) => gate
                .await
                .unwrap_or_else(|_| Err(TaskError::Internal("gate dropped".to_string()))),
            None => otherwise,
        }
    }

    #[async_trait]
    impl TaskRemote for GatedRemote {
        async fn fetch_all(&self) -> TaskResult<Vec<Task>> {
            pass(&self.fetches, Ok(vec![buy_milk(), clean_house()])).await
        }

        async fn fetch_one(&self, id: &TaskId) -> TaskResult<Task> {
            Err(TaskError::NotFound(id.clone()))
        }

        async fn create(&self, _input: CreateTask) -> TaskResult<Task> {
            Err(TaskError::Internal("not used".to_string()))
        }

        async fn update(&self, _id: &TaskId, _input: UpdateTask) -> TaskResult<Task> {
            pass(&self.updates, Err(TaskError::Internal("no gate".to_string()))).await
        }

        async fn delete(&self, _id: &TaskId) -> TaskResult<()> {
            pass(&self.deletes, Ok(())).await
        }
    }

    /// Collection receiver with the current version marked as seen
    fn watch_tasks<R: TaskRemote>(store: &TaskStore<R>) -> watch::Receiver<Vec<Task>> {
        let mut changes = store.subscribe();
        changes.borrow_and_update();
        changes
    }

    #[tokio::test]
    async fn test_concurrent_toggles_on_distinct_tasks_both_apply() {
        let (first_tx, first_rx) = oneshot::channel();
        let (second_tx, second_rx) = oneshot::channel();
        let store = TaskStore::new(GatedRemote::default().with_updates(vec![first_rx, second_rx]));
        store.load().await;
        let mut changes = watch_tasks(&store);

        let milk = TaskId::new("1");
        let house = TaskId::new("2");
        let release = async {
            second_tx.send(Ok(clean_house().with_completed(false))).unwrap();
            changes.changed().await.unwrap();
            first_tx.send(Ok(buy_milk().with_completed(true))).unwrap();
        };

        let (milk_result, house_result, ()) = tokio::join!(
            store.toggle_complete(&milk, false),
            store.toggle_complete(&house, true),
            release
        );

        assert!(milk_result.is_some());
        assert!(house_result.is_some());
        assert_eq!(
            store.tasks(),
            vec![
                buy_milk().with_completed(true),
                clean_house().with_completed(false)
            ]
        );
    }

    #[tokio::test]
    async fn test_concurrent_toggles_on_same_task_last_response_wins() {
        let (first_tx, first_rx) = oneshot::channel();
        let (second_tx, second_rx) = oneshot::channel();
        let store = TaskStore::new(GatedRemote::default().with_updates(vec![first_rx, second_rx]));
        store.load().await;
        let mut changes = watch_tasks(&store);

        let milk = TaskId::new("1");
        let release = async {
            second_tx.send(Ok(buy_milk().with_completed(false))).unwrap();
            changes.changed().await.unwrap();
            first_tx.send(Ok(buy_milk().with_completed(true))).unwrap();
        };

        tokio::join!(
            store.toggle_complete(&milk, false),
            store.toggle_complete(&milk, true),
            release
        );

        assert_eq!(store.get(&milk), Some(buy_milk().with_completed(true)));
    }

    #[tokio::test]
    async fn test_toggle_settling_after_delete_does_not_restore_task() {
        let (update_tx, update_rx) = oneshot::channel();
        let (delete_tx, delete_rx) = oneshot::channel();
        let store = TaskStore::new(
            GatedRemote::default()
                .with_updates(vec![update_rx])
                .with_deletes(vec![delete_rx]),
        );
        store.load().await;
        let mut changes = watch_tasks(&store);

        let milk = TaskId::new("1");
        let release = async {
            delete_tx.send(Ok(())).unwrap();
            changes.changed().await.unwrap();
            update_tx.send(Ok(buy_milk().with_completed(true))).unwrap();
        };

        let (toggled, deleted, ()) = tokio::join!(
            store.toggle_complete(&milk, false),
            store.delete_task(&milk),
            release
        );

        assert!(deleted);
        assert_eq!(toggled, None);
        assert_eq!(store.get(&milk), None);
        assert_eq!(store.tasks(), vec![clean_house()]);
        assert_eq!(store.error(), None);
    }

    #[tokio::test]
    async fn test_overlapping_loads_keep_loading_until_last_settles() {
        let (first_tx, first_rx) = oneshot::channel();
        let (second_tx, second_rx) = oneshot::channel();
        let store = TaskStore::new(GatedRemote::default().with_fetches(vec![first_rx, second_rx]));
        let mut changes = watch_tasks(&store);

        let release = async {
            assert!(store.is_loading());
            first_tx.send(Ok(vec![buy_milk()])).unwrap();
            changes.changed().await.unwrap();
            assert!(store.is_loading());
            second_tx.send(Ok(vec![buy_milk(), clean_house()])).unwrap();
        };

        let (first, second, ()) = tokio::join!(store.load(), store.load(), release);

        assert!(first && second);
        assert!(!store.is_loading());
        assert_eq!(store.tasks(), vec![buy_milk(), clean_house()]);
    }
}
