//! A2A JSON-RPC endpoint
//!
//! Same JSON-RPC 2.0 envelope as the armory's MCP server:
//! - `message/send`  `{message: {parts: [{kind: "text", text}]}}` or `{text}`
//! - `tasks/get`     `{id}`
//! - `tasks/cancel`  `{id}`

use axum::{extract::State, response::Json};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::warn;

use super::AgentState;
use crate::agent::{CancelOutcome, Task};
use crate::error::TaskError;
use crate::mcp::{error_codes, McpRequest, McpResponse};

/// POST / - JSON-RPC dispatch
pub async fn rpc_handler(
    State(state): State<Arc<AgentState>>,
    Json(request): Json<McpRequest>,
) -> Json<McpResponse> {
    let id = request.id.clone();
    if request.jsonrpc != "2.0" {
        return Json(McpResponse::error(
            id,
            error_codes::INVALID_REQUEST,
            "Only JSON-RPC 2.0 is supported",
        ));
    }

    let response = match request.method.as_str() {
        "message/send" => match message_text(&request.params) {
            Some(text) => match state.executor.submit(&text).await {
                Ok(task_id) => task_response(&state, id, &task_id).await,
                Err(e) => task_error(id, e),
            },
            None => McpResponse::error(
                id,
                error_codes::INVALID_PARAMS,
                "Message contains no text part",
            ),
        },
        "tasks/get" => match task_id(&request.params) {
            Some(task_id) => task_response(&state, id, &task_id).await,
            None => McpResponse::error(id, error_codes::INVALID_PARAMS, "Missing 'id' parameter"),
        },
        "tasks/cancel" => match task_id(&request.params) {
            Some(task_id) => match state.executor.cancel(&task_id).await {
                Ok(CancelOutcome::Requested) => task_response(&state, id, &task_id).await,
                Ok(_) => McpResponse::error(
                    id,
                    error_codes::TASK_NOT_CANCELABLE,
                    format!("Task {} cannot be cancelled", task_id),
                ),
                Err(e) => task_error(id, e),
            },
            None => McpResponse::error(id, error_codes::INVALID_PARAMS, "Missing 'id' parameter"),
        },
        method => {
            warn!("Unknown method: {}", method);
            McpResponse::error(
                id,
                error_codes::METHOD_NOT_FOUND,
                format!("Method not found: {}", method),
            )
        }
    };

    Json(response)
}

async fn task_response(state: &AgentState, id: Option<Value>, task_id: &str) -> McpResponse {
    match state.executor.get(task_id).await {
        Ok(task) => McpResponse::success(id, task_json(&task)),
        Err(e) => task_error(id, e),
    }
}

fn task_json(task: &Task) -> Value {
    let mut value = serde_json::to_value(task).unwrap_or_default();
    if let Some(obj) = value.as_object_mut() {
        obj.insert("kind".to_string(), json!("task"));
    }
    value
}

fn task_error(id: Option<Value>, err: TaskError) -> McpResponse {
    let code = match err {
        TaskError::TaskNotFound(_) => error_codes::TASK_NOT_FOUND,
        _ => error_codes::INTERNAL_ERROR,
    };
    McpResponse::error(id, code, err.to_string())
}

/// Concatenated text parts of an A2A message
fn message_text(params: &Value) -> Option<String> {
    if let Some(text) = params.get("text").and_then(Value::as_str) {
        return Some(text.to_string()).filter(|t| !t.trim().is_empty());
    }

    let parts = params.get("message")?.get("parts")?.as_array()?;
    let text = parts
        .iter()
        .filter(|p| p.get("kind").and_then(Value::as_str).unwrap_or("text") == "text")
        .filter_map(|p| p.get("text").and_then(Value::as_str))
        .collect::<Vec<_>>()
        .join(" ");

    Some(text).filter(|t| !t.trim().is_empty())
}

fn task_id(params: &Value) -> Option<String> {
    params
        .get("id")
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::super::{agent_router, test_support};
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    async fn rpc(state: Arc<AgentState>, body: Value) -> Value {
        let response = agent_router(state)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[test]
    fn test_message_text_from_parts() {
        let params = json!({
            "message": {
                "role": "user",
                "parts": [
                    { "kind": "text", "text": "Attack 'The Weaver of Spaghetti Code'" },
                    { "kind": "file", "uri": "ignored" },
                    { "kind": "text", "text": "with Slashing weakness" }
                ]
            }
        });
        assert_eq!(
            message_text(&params).as_deref(),
            Some("Attack 'The Weaver of Spaghetti Code' with Slashing weakness")
        );
        assert!(message_text(&json!({ "message": { "parts": [] } })).is_none());
        assert_eq!(message_text(&json!({ "text": "Attack 'X'" })).as_deref(), Some("Attack 'X'"));
    }

    #[tokio::test]
    async fn test_message_send_returns_task() {
        let json = rpc(
            test_support::state(),
            json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": "message/send",
                "params": { "message": { "parts": [{ "kind": "text", "text": "Attack 'The Weaver of Spaghetti Code'" }] } }
            }),
        )
        .await;

        assert_eq!(json["id"], 1);
        assert_eq!(json["result"]["kind"], "task");
        assert!(json["result"]["id"].is_string());
    }

    #[tokio::test]
    async fn test_tasks_get_completed() {
        let state = test_support::state();
        let task = state
            .executor
            .run("Take down 'The Colossus of a Thousand Patches' with Revolutionary Rewrite weakness")
            .await;

        let json = rpc(
            state,
            json!({ "jsonrpc": "2.0", "id": 2, "method": "tasks/get", "params": { "id": task.id } }),
        )
        .await;

        assert_eq!(json["result"]["state"], "completed");
        assert_eq!(json["result"]["result"]["weapon_name"], "Soulshard Dagger");
    }

    #[tokio::test]
    async fn test_tasks_get_unknown() {
        let json = rpc(
            test_support::state(),
            json!({ "jsonrpc": "2.0", "id": 3, "method": "tasks/get", "params": { "id": "missing" } }),
        )
        .await;
        assert_eq!(json["error"]["code"], error_codes::TASK_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_tasks_cancel_terminal() {
        let state = test_support::state();
        let task = state.executor.run("hello there").await;

        let json = rpc(
            state,
            json!({ "jsonrpc": "2.0", "id": 4, "method": "tasks/cancel", "params": { "id": task.id } }),
        )
        .await;
        assert_eq!(json["error"]["code"], error_codes::TASK_NOT_CANCELABLE);
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let json = rpc(
            test_support::state(),
            json!({ "jsonrpc": "2.0", "id": 5, "method": "agent/dance" }),
        )
        .await;
        assert_eq!(json["error"]["code"], error_codes::METHOD_NOT_FOUND);
    }
}
