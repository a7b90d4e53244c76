//! Shadowblade
//!
//! A combat agent and the armory it draws its weapons from.
//!
//! # Features
//!
//! - **Armory**: fixed registry of weapon tools with schema-described, range-bounded outcomes
//! - **MCP Protocol**: JSON-RPC 2.0 over stdio for tool discovery and invocation
//! - **Agent Card**: static capability advertisement for discovery
//! - **Task Executor**: resolve → select → invoke lifecycle with cancellation
//! - **Streaming**: per-task progress events over SSE
//!
//! # Architecture
//!
//! ```text
//! Caller ──► A2A (HTTP) ──► TaskExecutor ──► ToolRegistry ──► Outcome
//!                               │                 ▲
//!                               ├── TaskStore     │
//!                               └── Events        └── MCP (stdio) ◄── Other agents
//! ```

pub mod a2a;
pub mod agent;
pub mod armory;
pub mod config;
pub mod error;
pub mod mcp;

pub use a2a::AgentServer;
pub use agent::{
    AgentDescriptor, InMemoryTaskStore, Task, TaskEvent, TaskExecutor, TaskState, TaskStore,
};
pub use armory::{standard_registry, CombatResult, ToolRegistry, Weapon};
pub use config::Config;
pub use error::{ArmoryError, FailureKind, TaskError};
pub use mcp::{McpRequest, McpResponse, McpServer};
