//! # Update Stream Handler
//!
//! Server-sent events carrying translated status updates for the tasks a
//! client is watching.

use axum::extract::{Query, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Extension;
use futures::{Stream, StreamExt};
use serde::Deserialize;
use tracing::info;

use crate::web::auth::CallerIdentity;
use crate::web::errors::{ApiError, ApiResult};
use crate::web::state::AppState;

/// Name of the SSE event carrying a status update
pub const UPDATE_EVENT: &str = "update";

/// Query of `GET /tasks/updates`
#[derive(Debug, Clone, Deserialize)]
pub struct UpdatesQuery {
    /// Comma-separated subscription tokens
    #[serde(default)]
    pub tokens: String,
}

impl UpdatesQuery {
    pub fn subscription_tokens(&self) -> Vec<String> {
        self.tokens
            .split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Stream status updates for the given tokens: GET /tasks/updates
///
/// The stream is torn down when the client disconnects or the server
/// shuts down.
pub async fn stream_updates(
    State(state): State<AppState>,
    Extension(identity): Extension<CallerIdentity>,
    Query(query): Query<UpdatesQuery>,
) -> ApiResult<Sse<impl Stream<Item = Result<Event, axum::Error>>>> {
    let caller = identity.into_caller().map_err(ApiError::from)?;
    let tokens = query.subscription_tokens();

    let cancel = state.shutdown.child_token();
    let updates = state.update_stream.open(&tokens, cancel.clone()).await?;
    info!(user_id = %caller.user_id(), tokens = tokens.len(), "Client subscribed to updates");

    // Dropping the response body cancels the stream
    let guard = cancel.drop_guard();
    let events = updates.map(move |update| {
        let _ = &guard;
        Event::default().event(UPDATE_EVENT).json_data(update)
    });

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}
