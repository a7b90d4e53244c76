//! Task Executor
//!
//! Drives one command through resolve → select → invoke, recording every
//! transition in the task store and publishing progress events. Each task
//! runs on its own tokio task; transitions within a task are sequential.
//! Cancellation is checked at every transition boundary and never interrupts
//! an in-flight invocation. Nothing is retried here.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::command;
use super::selector;
use super::store::TaskStore;
use super::streaming::{CancelHandle, TaskEvent};
use super::task::{Task, TaskState};
use crate::armory::{CombatResult, ToolRegistry};
use crate::error::TaskError;

/// Result of a cancellation request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    /// Flag set; the task ends `Failed` with `Cancelled`
    Requested,
    /// The task's outcome was already decided
    AlreadyTerminal,
    /// The task is stored but driven by another executor
    NotOwned,
}

/// Executes submitted commands against the armory
#[derive(Clone)]
pub struct TaskExecutor {
    registry: Arc<ToolRegistry>,
    store: Arc<dyn TaskStore>,
    running: Arc<RwLock<HashMap<String, CancelHandle>>>,
}

impl TaskExecutor {
    pub fn new(registry: Arc<ToolRegistry>, store: Arc<dyn TaskStore>) -> Self {
        Self {
            registry,
            store,
            running: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    pub fn store(&self) -> &Arc<dyn TaskStore> {
        &self.store
    }

    /// Accept a command and run it in the background; returns the task id
    pub async fn submit(&self, command: &str) -> Result<String, TaskError> {
        let task = Task::new(command);
        let id = task.id.clone();

        self.store.save(&task).await?;
        self.store.publish(TaskEvent::working(&task, "Command received"));

        let handle = CancelHandle::new(&id);
        self.running.write().insert(id.clone(), handle.clone());

        info!("Task {} submitted: {}", id, command);

        let executor = self.clone();
        tokio::spawn(async move {
            executor.execute(task, &handle).await;
        });

        Ok(id)
    }

    /// Create a task and run it to completion inline
    pub async fn run(&self, command: &str) -> Task {
        let task = Task::new(command);
        let handle = CancelHandle::new(&task.id);
        if let Err(e) = self.store.save(&task).await {
            let mut task = task;
            task.fail(&e);
            return task;
        }
        self.running.write().insert(task.id.clone(), handle.clone());
        self.execute(task, &handle).await
    }

    /// Drive a task to a terminal state
    pub async fn execute(&self, mut task: Task, cancel: &CancelHandle) -> Task {
        let outcome = self.drive(&mut task, cancel).await;

        // A cancel request accepted before the close wins over any result
        let outcome = if self.close(cancel) {
            Err(TaskError::Cancelled)
        } else {
            outcome
        };

        if let Err(err) = outcome.and_then(|result| task.complete(result)) {
            warn!("Task {} failed in {}: {}", task.id, task.state, err);
            task.fail(&err);
        }

        if let Err(e) = self.store.save(&task).await {
            error!("Failed to record terminal state of task {}: {}", task.id, e);
        }
        self.running.write().remove(&task.id);
        self.store.publish(TaskEvent::terminal(&task));

        info!(
            "Task {} finished: {} in {}ms",
            task.id,
            task.state,
            cancel.elapsed().as_millis()
        );
        task
    }

    /// Resolve, select and invoke; the caller settles the terminal state
    async fn drive(
        &self,
        task: &mut Task,
        cancel: &CancelHandle,
    ) -> Result<CombatResult, TaskError> {
        checkpoint(cancel)?;
        let resolution = command::resolve(&task.command)?;
        task.target = resolution.target.clone();
        task.weakness = Some(resolution.weakness.clone());
        let message = match &resolution.target {
            Some(target) => format!("Target '{}', weakness '{}'", target, resolution.weakness),
            None => format!("Weakness '{}'", resolution.weakness),
        };
        self.advance(task, TaskState::Resolving, message).await?;

        checkpoint(cancel)?;
        let best = selector::select(self.registry.list(), &resolution)
            .ok_or_else(|| TaskError::NoMatchingTool(resolution.weakness.clone()))?;
        let tool = best.weapon.name.clone();
        task.selected_tool = Some(tool.clone());
        self.advance(
            task,
            TaskState::Selecting,
            format!("Selected {} (score {})", best.weapon.weapon_name, best.score),
        )
        .await?;

        checkpoint(cancel)?;
        self.advance(task, TaskState::Invoking, format!("Invoking {}", tool))
            .await?;
        self.registry.invoke(&tool).map_err(TaskError::from)
    }

    /// Close the handle under the running lock; true if cancellation got in first
    fn close(&self, cancel: &CancelHandle) -> bool {
        let _running = self.running.write();
        cancel.close();
        cancel.is_cancelled()
    }

    async fn advance(
        &self,
        task: &mut Task,
        next: TaskState,
        message: String,
    ) -> Result<(), TaskError> {
        task.transition(next)?;
        self.store.save(task).await?;
        debug!("Task {} → {}: {}", task.id, next, message);
        self.store.publish(TaskEvent::working(task, message));
        Ok(())
    }

    /// Request cancellation of a task
    pub async fn cancel(&self, id: &str) -> Result<CancelOutcome, TaskError> {
        // Decided under the lock that `close` takes, so an accepted request is never lost
        let requested = self.running.read().get(id).map(|handle| {
            if handle.is_closed() {
                false
            } else {
                handle.cancel();
                true
            }
        });
        match requested {
            Some(true) => {
                info!("Cancellation requested for task {}", id);
                return Ok(CancelOutcome::Requested);
            }
            Some(false) => return Ok(CancelOutcome::AlreadyTerminal),
            None => {}
        }

        match self.store.get(id).await? {
            Some(task) if task.is_terminal() => Ok(CancelOutcome::AlreadyTerminal),
            Some(_) => Ok(CancelOutcome::NotOwned),
            None => Err(TaskError::TaskNotFound(id.to_string())),
        }
    }

    /// Latest stored snapshot of a task
    pub async fn get(&self, id: &str) -> Result<Task, TaskError> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| TaskError::TaskNotFound(id.to_string()))
    }

    /// Number of tasks currently running
    pub fn running(&self) -> usize {
        self.running.read().len()
    }
}

fn checkpoint(cancel: &CancelHandle) -> Result<(), TaskError> {
    if cancel.is_cancelled() {
        Err(TaskError::Cancelled)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::store::InMemoryTaskStore;
    use crate::armory::{standard_registry, Weapon};
    use crate::error::FailureKind;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::{broadcast, Notify};

    fn executor() -> TaskExecutor {
        TaskExecutor::new(
            Arc::new(standard_registry().unwrap()),
            Arc::new(InMemoryTaskStore::default()),
        )
    }

    /// Store that fails every save after the first `ok_saves`
    struct FailingStore {
        inner: InMemoryTaskStore,
        ok_saves: usize,
        saves: AtomicUsize,
    }

    #[async_trait]
    impl TaskStore for FailingStore {
        async fn save(&self, task: &Task) -> Result<(), TaskError> {
            if self.saves.fetch_add(1, Ordering::SeqCst) >= self.ok_saves {
                return Err(TaskError::TaskStore("connection refused".into()));
            }
            self.inner.save(task).await
        }

        async fn get(&self, id: &str) -> Result<Option<Task>, TaskError> {
            self.inner.get(id).await
        }

        fn publish(&self, event: TaskEvent) {
            self.inner.publish(event)
        }

        fn subscribe(&self) -> broadcast::Receiver<TaskEvent> {
            self.inner.subscribe()
        }
    }

    /// Store that flips a cancel handle once a task reaches `trigger`
    struct CancelOnState {
        inner: InMemoryTaskStore,
        trigger: TaskState,
        handle: CancelHandle,
    }

    #[async_trait]
    impl TaskStore for CancelOnState {
        async fn save(&self, task: &Task) -> Result<(), TaskError> {
            if task.state == self.trigger {
                self.handle.cancel();
            }
            self.inner.save(task).await
        }

        async fn get(&self, id: &str) -> Result<Option<Task>, TaskError> {
            self.inner.get(id).await
        }

        fn publish(&self, event: TaskEvent) {
            self.inner.publish(event)
        }

        fn subscribe(&self) -> broadcast::Receiver<TaskEvent> {
            self.inner.subscribe()
        }
    }

    /// Store that holds the `Completed` save until released
    struct GateStore {
        inner: InMemoryTaskStore,
        reached: Notify,
        release: Notify,
    }

    #[async_trait]
    impl TaskStore for GateStore {
        async fn save(&self, task: &Task) -> Result<(), TaskError> {
            if task.state == TaskState::Completed {
                self.reached.notify_one();
                self.release.notified().await;
            }
            self.inner.save(task).await
        }

        async fn get(&self, id: &str) -> Result<Option<Task>, TaskError> {
            self.inner.get(id).await
        }

        fn publish(&self, event: TaskEvent) {
            self.inner.publish(event)
        }

        fn subscribe(&self) -> broadcast::Receiver<TaskEvent> {
            self.inner.subscribe()
        }
    }

    async fn wait_terminal(rx: &mut broadcast::Receiver<TaskEvent>, id: &str) -> TaskEvent {
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                let event = rx.recv().await.unwrap();
                if event.task_id == id && event.is_final {
                    return event;
                }
            }
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_attack_completes_with_broadsword() {
        let task = executor()
            .run("Attack 'The Weaver of Spaghetti Code' with Slashing weakness")
            .await;

        assert_eq!(task.state, TaskState::Completed);
        assert_eq!(task.selected_tool.as_deref(), Some("forge_broadsword"));
        assert_eq!(task.weakness.as_deref(), Some("Slashing"));
        let result = task.result.unwrap();
        assert_eq!(result.weapon_name, "Forged Broadsword");
        assert!((110..=140).contains(&result.base_damage));
    }

    #[tokio::test]
    async fn test_no_matching_tool_fails() {
        let task = executor()
            .run("Attack 'The Gremlin' with Glitter weakness")
            .await;

        assert_eq!(task.state, TaskState::Failed);
        assert_eq!(task.failure.unwrap().kind, FailureKind::NoMatchingTool);
        assert!(task.selected_tool.is_none());
    }

    #[tokio::test]
    async fn test_ambiguous_command_never_selects() {
        let executor = executor();
        let mut rx = executor.store().subscribe();
        let task = executor.run("hello there").await;

        assert_eq!(task.state, TaskState::Failed);
        assert_eq!(task.failure.unwrap().kind, FailureKind::AmbiguousCommand);
        assert!(task.weakness.is_none());

        let mut states = Vec::new();
        while let Ok(event) = rx.try_recv() {
            states.push(event.state);
        }
        assert_eq!(states, vec![TaskState::Failed]);
    }

    #[tokio::test]
    async fn test_weakness_without_target_fails() {
        let executor = executor();
        let mut rx = executor.store().subscribe();
        let task = executor.run("with Latency weakness").await;

        assert_eq!(task.state, TaskState::Failed);
        assert_eq!(task.failure.unwrap().kind, FailureKind::AmbiguousCommand);
        assert!(task.target.is_none());
        assert!(task.selected_tool.is_none());
        assert!(task.result.is_none());

        let mut states = Vec::new();
        while let Ok(event) = rx.try_recv() {
            states.push(event.state);
        }
        assert_eq!(states, vec![TaskState::Failed]);
    }

    #[tokio::test]
    async fn test_events_follow_lifecycle_order() {
        let executor = executor();
        let mut rx = executor.store().subscribe();
        let task = executor
            .run("Take down 'The Colossus of a Thousand Patches' with Revolutionary Rewrite weakness")
            .await;
        assert_eq!(task.selected_tool.as_deref(), Some("enchant_soulshard_dagger"));

        let mut states = Vec::new();
        while let Ok(event) = rx.try_recv() {
            states.push((event.state, event.is_final));
        }
        assert_eq!(
            states,
            vec![
                (TaskState::Resolving, false),
                (TaskState::Selecting, false),
                (TaskState::Invoking, false),
                (TaskState::Completed, true),
            ]
        );
    }

    #[tokio::test]
    async fn test_cancel_before_start() {
        let executor = executor();
        let task = Task::new("Attack 'The Weaver of Spaghetti Code'");
        let handle = CancelHandle::new(&task.id);
        handle.cancel();

        let task = executor.execute(task, &handle).await;
        assert_eq!(task.state, TaskState::Failed);
        assert_eq!(task.failure.unwrap().kind, FailureKind::Cancelled);
        assert!(task.weakness.is_none());
    }

    #[tokio::test]
    async fn test_cancel_observed_at_next_boundary() {
        let task = Task::new("Attack 'The Weaver of Spaghetti Code'");
        let handle = CancelHandle::new(&task.id);
        let store = CancelOnState {
            inner: InMemoryTaskStore::default(),
            trigger: TaskState::Selecting,
            handle: handle.clone(),
        };
        let executor = TaskExecutor::new(Arc::new(standard_registry().unwrap()), Arc::new(store));

        let task = executor.execute(task, &handle).await;
        assert_eq!(task.state, TaskState::Failed);
        assert_eq!(task.failure.unwrap().kind, FailureKind::Cancelled);
        // Selection finished before the flag was seen; invocation never ran
        assert_eq!(task.selected_tool.as_deref(), Some("forge_broadsword"));
        assert!(task.result.is_none());
    }

    #[tokio::test]
    async fn test_cancel_during_invoke_discards_result() {
        let task = Task::new("Attack 'The Weaver of Spaghetti Code'");
        let handle = CancelHandle::new(&task.id);
        let store = CancelOnState {
            inner: InMemoryTaskStore::default(),
            trigger: TaskState::Invoking,
            handle: handle.clone(),
        };
        let executor = TaskExecutor::new(Arc::new(standard_registry().unwrap()), Arc::new(store));

        let task = executor.execute(task, &handle).await;
        assert_eq!(task.state, TaskState::Failed);
        assert_eq!(task.failure.unwrap().kind, FailureKind::Cancelled);
        assert!(task.result.is_none());
        assert!(handle.is_closed());
    }

    #[tokio::test]
    async fn test_cancel_after_outcome_decided_is_refused() {
        let store = Arc::new(GateStore {
            inner: InMemoryTaskStore::default(),
            reached: Notify::new(),
            release: Notify::new(),
        });
        let executor = TaskExecutor::new(Arc::new(standard_registry().unwrap()), store.clone());
        let mut rx = executor.store().subscribe();

        let id = executor
            .submit("Attack 'The Weaver of Spaghetti Code' with Slashing weakness")
            .await
            .unwrap();
        tokio::time::timeout(Duration::from_secs(5), store.reached.notified())
            .await
            .unwrap();

        // Snapshot still says Invoking, but the task is committed to Completed
        assert_eq!(executor.get(&id).await.unwrap().state, TaskState::Invoking);
        assert_eq!(
            executor.cancel(&id).await.unwrap(),
            CancelOutcome::AlreadyTerminal
        );

        store.release.notify_one();
        let event = wait_terminal(&mut rx, &id).await;
        assert_eq!(event.state, TaskState::Completed);
        assert_eq!(executor.get(&id).await.unwrap().state, TaskState::Completed);
    }

    #[tokio::test]
    async fn test_accepted_cancel_always_ends_cancelled() {
        let executor = executor();
        let mut rx = executor.store().subscribe();

        for _ in 0..50 {
            let id = executor
                .submit("Attack 'The Weaver of Spaghetti Code' with Slashing weakness")
                .await
                .unwrap();
            tokio::task::yield_now().await;
            let outcome = executor.cancel(&id).await.unwrap();
            let event = wait_terminal(&mut rx, &id).await;

            match outcome {
                CancelOutcome::Requested => {
                    assert_eq!(event.state, TaskState::Failed);
                    assert_eq!(event.failure.unwrap().kind, FailureKind::Cancelled);
                }
                CancelOutcome::AlreadyTerminal => {
                    assert_eq!(event.state, TaskState::Completed)
                }
                CancelOutcome::NotOwned => panic!("task {} not tracked", id),
            }
        }
    }

    #[tokio::test]
    async fn test_store_failure_fails_task() {
        let store = FailingStore {
            inner: InMemoryTaskStore::default(),
            ok_saves: 1,
            saves: AtomicUsize::new(0),
        };
        let executor = TaskExecutor::new(Arc::new(standard_registry().unwrap()), Arc::new(store));

        let task = executor.run("Attack 'The Weaver of Spaghetti Code'").await;
        assert_eq!(task.state, TaskState::Failed);
        assert_eq!(task.failure.unwrap().kind, FailureKind::TaskStore);
    }

    #[tokio::test]
    async fn test_submit_returns_id_and_completes() {
        let executor = executor();
        let mut rx = executor.store().subscribe();

        let id = executor
            .submit("Attack 'The Weaver of Spaghetti Code' with Slashing weakness")
            .await
            .unwrap();
        let event = wait_terminal(&mut rx, &id).await;
        assert_eq!(event.state, TaskState::Completed);
        assert_eq!(event.result.unwrap().weapon_name, "Forged Broadsword");

        let stored = executor.get(&id).await.unwrap();
        assert_eq!(stored.state, TaskState::Completed);
        assert_eq!(executor.running(), 0);
        assert_eq!(
            executor.cancel(&id).await.unwrap(),
            CancelOutcome::AlreadyTerminal
        );
    }

    #[tokio::test]
    async fn test_cancel_unknown_task() {
        let err = executor().cancel("missing").await.unwrap_err();
        assert_eq!(err, TaskError::TaskNotFound("missing".into()));
    }

    #[tokio::test]
    async fn test_tie_break_is_stable() {
        let registry = ToolRegistry::from_weapons(vec![
            Weapon::new("frost_a", "Frost A", "Bane of the Frost Wyrm").with_damage(1, 3),
            Weapon::new("frost_b", "Frost B", "Also bane of the Frost Wyrm").with_damage(1, 3),
        ])
        .unwrap();
        let executor = TaskExecutor::new(Arc::new(registry), Arc::new(InMemoryTaskStore::default()));

        for _ in 0..100 {
            let task = executor.run("Attack 'Frost Wyrm'").await;
            assert_eq!(task.selected_tool.as_deref(), Some("frost_a"));
        }
    }
}
