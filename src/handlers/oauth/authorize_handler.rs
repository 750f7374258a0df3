use axum::{
    extract::{Query, State},
    http::HeaderValue,
    response::Redirect,
};
use tower_sessions::Session;
use tracing::{info, warn};
use url::Url;

use crate::error::Result;
use crate::handlers::origin::RequestOrigin;
use crate::models::AppState;
use crate::models::oauth::{AUTH_REDIRECT_KEY, AuthorizeParams};
use crate::oauth1::TokenClient;
use crate::routes::ACCESS_TOKEN_PATH;
use crate::session::SessionStore;

/// `GET /jira-oauth/authorize`
pub async fn authorize_handler(
    State(app_state): State<AppState>,
    origin: RequestOrigin,
    Query(params): Query<AuthorizeParams>,
    session: Session,
) -> Result<Redirect> {
    let location = authorize(&app_state, &session, &origin, params).await?;
    Ok(Redirect::to(location.as_str()))
}

/// Starts the dance: remembers where to send the user afterwards, obtains a
/// request token and returns the remote authorization URL to redirect to.
pub async fn authorize<S>(
    app_state: &AppState,
    session: &S,
    origin: &RequestOrigin,
    params: AuthorizeParams,
) -> Result<Url>
where
    S: SessionStore + ?Sized,
{
    let settings = app_state.config.request_token_settings()?;

    match params.auth_redirect {
        Some(target) if HeaderValue::from_str(&target).is_ok() => {
            session.set(AUTH_REDIRECT_KEY, target).await?;
        }
        // Would not fit in the callback's Location header.
        Some(target) => warn!(?target, "ignoring auth_redirect that is not a valid header value"),
        None => {}
    }

    let request_token = TokenClient::new(&app_state.http, &settings.consumer)
        .fetch_request_token(&settings.request_token_url)
        .await?;

    let callback = origin.url_for(ACCESS_TOKEN_PATH);
    let mut location = settings.authorize_url;
    location
        .query_pairs_mut()
        .append_pair("oauth_token", &request_token.token)
        .append_pair("oauth_callback", &callback);

    info!(%callback, "request token obtained, redirecting to Jira for authorization");
    Ok(location)
}
