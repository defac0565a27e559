//! # Task Handlers
//!
//! Starting, commanding and listing a caller's tasks.

use axum::extract::State;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{AuthenticatedCaller, RunningTask, ScheduledTask, TaskCommand};
use crate::web::auth::CallerIdentity;
use crate::web::errors::ApiResult;
use crate::web::state::AppState;

/// Body of `POST /tasks/start`
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartTasksRequest {
    #[serde(default)]
    pub task_ids: Vec<String>,
}

/// Body of `POST /tasks/command`
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendCommandRequest {
    pub control_token: String,
    pub command: TaskCommand,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SuccessResponse {
    pub success: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledTasksResponse {
    pub tasks: Vec<ScheduledTask>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunningTasksResponse {
    pub tasks: Vec<RunningTask>,
}

fn require_caller(identity: CallerIdentity) -> ApiResult<AuthenticatedCaller> {
    Ok(identity.into_caller()?)
}

/// Start a batch of scheduled tasks: POST /tasks/start
pub async fn start_tasks(
    State(state): State<AppState>,
    Extension(identity): Extension<CallerIdentity>,
    Json(request): Json<StartTasksRequest>,
) -> ApiResult<Json<SuccessResponse>> {
    let caller = require_caller(identity)?;
    debug!(user_id = %caller.user_id(), count = request.task_ids.len(), "Start tasks requested");

    state
        .task_starter
        .start_tasks(&caller, &request.task_ids)
        .await?;

    Ok(Json(SuccessResponse { success: true }))
}

/// Send a control command to a running task: POST /tasks/command
pub async fn send_command(
    State(state): State<AppState>,
    Extension(identity): Extension<CallerIdentity>,
    Json(request): Json<SendCommandRequest>,
) -> ApiResult<Json<SuccessResponse>> {
    let caller = require_caller(identity)?;

    let success = state
        .commands
        .send_command(&caller, &request.control_token, request.command)
        .await?;

    Ok(Json(SuccessResponse { success }))
}

/// List tasks scheduled for the caller: GET /tasks/scheduled
pub async fn scheduled_tasks(
    State(state): State<AppState>,
    Extension(identity): Extension<CallerIdentity>,
) -> ApiResult<Json<ScheduledTasksResponse>> {
    let caller = require_caller(identity)?;
    let tasks = state.task_queries.scheduled_tasks(&caller).await?;
    Ok(Json(ScheduledTasksResponse { tasks }))
}

/// List the caller's tasks workers are executing: GET /tasks/running
pub async fn running_tasks(
    State(state): State<AppState>,
    Extension(identity): Extension<CallerIdentity>,
) -> ApiResult<Json<RunningTasksResponse>> {
    let caller = require_caller(identity)?;
    let tasks = state.task_queries.running_tasks(&caller).await?;
    Ok(Json(RunningTasksResponse { tasks }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_bodies_use_camel_case() {
        let start: StartTasksRequest =
            serde_json::from_value(json!({ "taskIds": ["t1", "t2"] })).unwrap();
        assert_eq!(start.task_ids, vec!["t1", "t2"]);

        let command: SendCommandRequest =
            serde_json::from_value(json!({ "controlToken": "ctl-1", "command": "STOP" })).unwrap();
        assert_eq!(command.control_token, "ctl-1");
        assert_eq!(command.command, TaskCommand::Stop);

        assert!(serde_json::from_value::<SendCommandRequest>(
            json!({ "control_token": "ctl-1", "command": "STOP" })
        )
        .is_err());
    }
}
