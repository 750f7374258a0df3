use axum::{
    extract::{OriginalUri, Request},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::error::Result;
use crate::models::oauth::ACCESS_TOKEN_KEY;
use crate::routes::AUTHORIZE_PATH;
use crate::session::SessionStore;

/// Middleware for routes that need a Jira access token. Without one the user is
/// sent through the authorize endpoint and brought back to the current path.
pub async fn require_jira_access_token(
    session: Session,
    OriginalUri(uri): OriginalUri,
    request: Request,
    next: Next,
) -> Response {
    let full_path = uri
        .path_and_query()
        .map(|path| path.as_str())
        .unwrap_or("/");

    match access_gate(&session, full_path).await {
        Ok(None) => next.run(request).await,
        Ok(Some(location)) => Redirect::to(&location).into_response(),
        Err(e) => e.into_response(),
    }
}

/// `None` when the session holds an access token, otherwise the location of the
/// authorize endpoint carrying `full_path` as the post-auth target.
pub async fn access_gate<S>(session: &S, full_path: &str) -> Result<Option<String>>
where
    S: SessionStore + ?Sized,
{
    if session.contains(ACCESS_TOKEN_KEY).await? {
        return Ok(None);
    }
    Ok(Some(authorize_location(full_path)))
}

pub fn authorize_location(full_path: &str) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("auth_redirect", full_path)
        .finish();
    format!("{AUTHORIZE_PATH}?{query}")
}
