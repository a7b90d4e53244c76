//! Task event streaming
//!
//! Ordered per-task status events plus the cancellation handle the executor
//! polls at every state-transition boundary. Events are advisory: the stored
//! task record is the source of truth for final state.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::task::{Task, TaskFailure, TaskState};
use crate::armory::CombatResult;

/// A task status update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskEvent {
    pub task_id: String,
    pub state: TaskState,
    /// Human-readable progress text
    pub message: String,
    /// True only for the terminal event
    #[serde(rename = "final")]
    pub is_final: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<CombatResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<TaskFailure>,
    /// Timestamp (RFC 3339)
    pub timestamp: String,
}

impl TaskEvent {
    /// Non-terminal progress event
    pub fn working(task: &Task, message: impl Into<String>) -> Self {
        Self {
            task_id: task.id.clone(),
            state: task.state,
            message: message.into(),
            is_final: false,
            result: None,
            failure: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Terminal event carrying the result or failure
    pub fn terminal(task: &Task) -> Self {
        let message = match (&task.result, &task.failure) {
            (Some(result), _) => format!(
                "{} dealt {} {} damage",
                result.weapon_name, result.base_damage, result.damage_type
            ),
            (_, Some(failure)) => format!("{}: {}", failure.kind.as_str(), failure.message),
            _ => task.state.to_string(),
        };

        Self {
            task_id: task.id.clone(),
            state: task.state,
            message,
            is_final: true,
            result: task.result.clone(),
            failure: task.failure.clone(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// SSE event name
    pub fn kind(&self) -> &'static str {
        match self.state {
            TaskState::Completed => "completed",
            TaskState::Failed => "failed",
            _ => "working",
        }
    }
}

/// Handle for cancelling a running task
#[derive(Debug, Clone)]
pub struct CancelHandle {
    pub task_id: String,
    cancelled: Arc<AtomicBool>,
    closed: Arc<AtomicBool>,
    started_at: Instant,
}

impl CancelHandle {
    pub fn new(task_id: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            cancelled: Arc::new(AtomicBool::new(false)),
            closed: Arc::new(AtomicBool::new(false)),
            started_at: Instant::now(),
        }
    }

    /// Request cancellation; observed at the next transition
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Mark the outcome as decided; later requests no longer apply
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }
}
