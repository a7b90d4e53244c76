//! Agent-to-Agent (A2A) HTTP surface
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │              Shadowblade Server              │
//! ├──────────────────────────────────────────────┤
//! │  GET  /.well-known/agent.json → Descriptor   │
//! │  POST /                       → JSON-RPC     │
//! │  POST /tasks                  → Submit       │
//! │  GET  /tasks/{id}             → Poll         │
//! │  POST /tasks/{id}/cancel      → Cancel       │
//! │  GET  /tasks/{id}/events      → SSE stream   │
//! │  GET  /health                 → Health check │
//! └──────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod server;

pub use api::{agent_router, AgentState, ApiError, ErrorResponse};
pub use server::AgentServer;
