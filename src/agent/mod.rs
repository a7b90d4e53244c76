//! Shadowblade Agent
//!
//! Advertises the agent's capabilities and turns battlefield commands into
//! armory invocations:
//!
//! ```text
//! command ──► resolve (target, weakness) ──► select weapon ──► invoke ──► result
//!                 │                              │                │
//!                 └──────────── TaskStore ◄──────┴── events ──────┘
//! ```

pub mod card;
pub mod command;
pub mod executor;
pub mod selector;
pub mod store;
pub mod streaming;
pub mod task;

pub use card::{AgentCapabilities, AgentDescriptor, Skill, SUPPORTED_CONTENT_TYPES};
pub use command::{resolve, Resolution};
pub use executor::{CancelOutcome, TaskExecutor};
pub use selector::{select, ScoredWeapon};
pub use store::{InMemoryTaskStore, TaskStore};
pub use streaming::{CancelHandle, TaskEvent};
pub use task::{Task, TaskFailure, TaskState};
