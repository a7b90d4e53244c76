//! Task Store
//!
//! The executor only emits state to a store; polling and subscription are the
//! store's business. The in-memory store keeps records in a TTL cache (the
//! retention policy) and fans events out over a broadcast channel, so a slow
//! subscriber loses events instead of stalling a task.

use async_trait::async_trait;
use moka::future::Cache;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::trace;

use super::streaming::TaskEvent;
use super::task::Task;
use crate::error::TaskError;

/// Storage and delivery collaborator for task state
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Insert or replace a task snapshot
    async fn save(&self, task: &Task) -> Result<(), TaskError>;

    /// Latest snapshot, `None` if unknown or evicted
    async fn get(&self, id: &str) -> Result<Option<Task>, TaskError>;

    /// Deliver an event to current subscribers (best-effort, never blocks)
    fn publish(&self, event: TaskEvent);

    /// Subscribe to events of all tasks
    fn subscribe(&self) -> broadcast::Receiver<TaskEvent>;
}

/// In-memory task store
#[derive(Clone)]
pub struct InMemoryTaskStore {
    tasks: Cache<String, Task>,
    events: broadcast::Sender<TaskEvent>,
}

impl InMemoryTaskStore {
    pub fn new(max_tasks: u64, ttl_secs: u64, event_buffer: usize) -> Self {
        let tasks = Cache::builder()
            .max_capacity(max_tasks)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();
        let (events, _) = broadcast::channel(event_buffer.max(1));

        Self { tasks, events }
    }

    /// Number of retained tasks (approximate until pending maintenance runs)
    pub fn len(&self) -> u64 {
        self.tasks.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryTaskStore {
    fn default() -> Self {
        Self::new(10_000, 3600, 64)
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn save(&self, task: &Task) -> Result<(), TaskError> {
        self.tasks.insert(task.id.clone(), task.clone()).await;
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Task>, TaskError> {
        Ok(self.tasks.get(id).await)
    }

    fn publish(&self, event: TaskEvent) {
        // Err only means nobody is listening
        if self.events.send(event).is_err() {
            trace!("No subscribers for task event");
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<TaskEvent> {
        self.events.subscribe()
    }
}
