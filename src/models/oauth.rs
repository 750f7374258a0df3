use serde::Deserialize;

/// Post-authorization destination captured by the authorize endpoint.
pub const AUTH_REDIRECT_KEY: &str = "jira_auth_redirect";
pub const ACCESS_TOKEN_KEY: &str = "jira_access_token";
pub const ACCESS_TOKEN_SECRET_KEY: &str = "jira_access_token_secret";

#[derive(Debug, Default, Deserialize)]
pub struct AuthorizeParams {
    pub auth_redirect: Option<String>,
}

/// Query string the remote service appends when sending the user back.
#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub oauth_token: String,
    pub oauth_verifier: Option<String>,
}
