//! The route table. The OAuth endpoints live under [`OAUTH_PREFIX`]; the
//! callback URL sent to Jira and the access gate's redirect are built from the
//! same constants.

use axum::{Router, middleware, routing::get};
use time::Duration;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer, cookie::SameSite};

use crate::handlers::{
    authorize_handler, callback_handler, home_handler, myself_handler, require_jira_access_token,
};
use crate::models::AppState;

pub const OAUTH_PREFIX: &str = "/jira-oauth";
pub const AUTHORIZE_ROUTE: &str = "/authorize";
pub const ACCESS_TOKEN_ROUTE: &str = "/access_token";

pub const AUTHORIZE_PATH: &str = "/jira-oauth/authorize";
pub const ACCESS_TOKEN_PATH: &str = "/jira-oauth/access_token";
pub const MYSELF_PATH: &str = "/jira/myself";

pub fn oauth_router() -> Router<AppState> {
    Router::new()
        .route(AUTHORIZE_ROUTE, get(authorize_handler))
        .route(ACCESS_TOKEN_ROUTE, get(callback_handler))
}

pub fn session_layer(secure: bool) -> SessionManagerLayer<MemoryStore> {
    let session_store = MemoryStore::default();
    let session_expiry = Expiry::OnInactivity(Duration::hours(6));
    SessionManagerLayer::new(session_store)
        .with_secure(secure)
        .with_same_site(SameSite::Lax)
        .with_expiry(session_expiry)
}

pub fn app_router(app_state: AppState, secure_cookie: bool) -> Router {
    let protected = Router::new()
        .route("/", get(home_handler))
        .route(MYSELF_PATH, get(myself_handler))
        .route_layer(middleware::from_fn(require_jira_access_token));

    Router::new()
        .merge(protected)
        .nest(OAUTH_PREFIX, oauth_router())
        .layer(session_layer(secure_cookie))
        .with_state(app_state)
}
