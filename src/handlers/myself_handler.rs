use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tower_sessions::Session;

use crate::error::Result;
use crate::jira_client::JiraClient;
use crate::models::AppState;

const MYSELF_API: &str = "rest/api/2/myself";

/// Fetches the current user's Jira profile with the access token from the session.
pub async fn myself_handler(
    State(app_state): State<AppState>,
    session: Session,
) -> Result<Response> {
    let Some(client) =
        JiraClient::from_session(&app_state.config, app_state.http.clone(), &session).await?
    else {
        return Ok((StatusCode::UNAUTHORIZED, "No Jira access token in session").into_response());
    };

    let profile: serde_json::Value = client.get_json(MYSELF_API).await?;
    Ok(Json(profile).into_response())
}
