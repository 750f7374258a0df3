use jira_oauth::models::app_config::{ACCESS_TOKEN_KEYS, REQUEST_TOKEN_KEYS};
use jira_oauth::models::{AppConfig, AppState, ServerConfig, SettingKey};
use jira_oauth::routes;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let app_config = AppConfig::from_env()?;
    let server_config = ServerConfig::from_env();

    let mut required: Vec<SettingKey> = REQUEST_TOKEN_KEYS.to_vec();
    for key in ACCESS_TOKEN_KEYS {
        if !required.contains(key) {
            required.push(*key);
        }
    }
    for key in app_config.missing_settings(&required) {
        warn!(%key, "Jira OAuth setting is not configured; endpoints that need it will fail");
    }
    if app_config.auth_redirect.is_none() {
        warn!("JIRA_AUTH_REDIRECT is not set; callbacks without a pending auth_redirect will fail");
    }

    let app_state = AppState::new(app_config);
    let app = routes::app_router(app_state, server_config.secure_cookie);

    info!("listening on http://{}", server_config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&server_config.bind_addr).await?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
