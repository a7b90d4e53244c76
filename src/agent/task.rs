//! Task model and lifecycle
//!
//! ```text
//! Submitted ──► Resolving ──► Selecting ──► Invoking ──► Completed
//!     │             │             │             │
//!     └─────────────┴─────────────┴─────────────┴──────► Failed
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::armory::CombatResult;
use crate::error::{FailureKind, TaskError};

/// Task lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskState {
    Submitted,
    Resolving,
    Selecting,
    Invoking,
    Completed,
    Failed,
}

impl TaskState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::Resolving => "resolving",
            Self::Selecting => "selecting",
            Self::Invoking => "invoking",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Valid next states
    pub fn valid_transitions(&self) -> &'static [TaskState] {
        use TaskState::*;
        match self {
            Submitted => &[Resolving, Failed],
            Resolving => &[Selecting, Failed],
            Selecting => &[Invoking, Failed],
            Invoking => &[Completed, Failed],
            Completed | Failed => &[],
        }
    }

    pub fn can_transition_to(&self, target: TaskState) -> bool {
        self.valid_transitions().contains(&target)
    }

    pub fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal failure payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl From<&TaskError> for TaskFailure {
    fn from(err: &TaskError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// One end-to-end command lifecycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub state: TaskState,
    pub command: String,
    pub target: Option<String>,
    pub weakness: Option<String>,
    pub selected_tool: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<CombatResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<TaskFailure>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// New task in `Submitted` with a generated id
    pub fn new(command: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            state: TaskState::Submitted,
            command: command.into(),
            target: None,
            weakness: None,
            selected_tool: None,
            result: None,
            failure: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Move to `next` if the lifecycle allows it
    pub fn transition(&mut self, next: TaskState) -> Result<(), TaskError> {
        if !self.state.can_transition_to(next) {
            return Err(TaskError::InvalidTransition {
                from: self.state.to_string(),
                to: next.to_string(),
            });
        }
        self.state = next;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Terminate successfully with a combat result
    pub fn complete(&mut self, result: CombatResult) -> Result<(), TaskError> {
        self.transition(TaskState::Completed)?;
        self.result = Some(result);
        Ok(())
    }

    /// Terminate with a failure; no-op on an already terminal task
    pub fn fail(&mut self, err: &TaskError) {
        if self.state.is_terminal() {
            return;
        }
        self.state = TaskState::Failed;
        self.failure = Some(TaskFailure::from(err));
        self.updated_at = Utc::now();
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }
}
