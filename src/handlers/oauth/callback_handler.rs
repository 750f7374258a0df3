use axum::{
    extract::{Query, State},
    response::Redirect,
};
use tower_sessions::Session;
use tracing::{info, warn};

use crate::error::{ConfigurationError, Error, Result};
use crate::models::oauth::{
    ACCESS_TOKEN_KEY, ACCESS_TOKEN_SECRET_KEY, AUTH_REDIRECT_KEY, CallbackParams,
};
use crate::models::{AppConfig, AppState};
use crate::oauth1::TokenClient;
use crate::session::SessionStore;

/// `GET /jira-oauth/access_token`
pub async fn callback_handler(
    Query(params): Query<CallbackParams>,
    State(app_state): State<AppState>,
    session: Session,
) -> Result<Redirect> {
    let target = access_token(&app_state, &session, params).await?;
    Ok(Redirect::to(&target))
}

/// Exchanges the authorized request token for an access token and returns the
/// location the user should land on.
///
/// A rejected exchange is not an error for the caller: the user is sent to the
/// same destination without a token in the session.
pub async fn access_token<S>(
    app_state: &AppState,
    session: &S,
    params: CallbackParams,
) -> Result<String>
where
    S: SessionStore + ?Sized,
{
    let settings = app_state.config.access_token_settings()?;

    let exchange = TokenClient::new(&app_state.http, &settings.consumer)
        .fetch_access_token(
            &settings.access_token_url,
            &params.oauth_token,
            params.oauth_verifier.as_deref(),
        )
        .await;

    match exchange {
        Ok(credentials) => {
            if app_state.config.save_token_to_session {
                session.set(ACCESS_TOKEN_KEY, credentials.token).await?;
                session
                    .set(ACCESS_TOKEN_SECRET_KEY, credentials.secret)
                    .await?;
            }
            info!("Jira access token obtained");
        }
        Err(Error::AuthorizationExchange(e)) => {
            warn!(error = %e, "Jira access token exchange failed");
        }
        Err(e) => return Err(e),
    }

    resolve_redirect(&app_state.config, session).await
}

/// Pending session redirect (consumed), then the configured fallback.
pub async fn resolve_redirect<S>(config: &AppConfig, session: &S) -> Result<String>
where
    S: SessionStore + ?Sized,
{
    if let Some(target) = session.delete(AUTH_REDIRECT_KEY).await? {
        return Ok(target);
    }

    config
        .auth_redirect
        .clone()
        .ok_or_else(|| ConfigurationError::NoRedirectTarget.into())
}
