//! Error types for the Jira OAuth flow.
//!
//! `ConfigurationError` is fatal and surfaces to the operator. `TokenError` is the
//! authorization-exchange failure that the callback recovers from by redirecting.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::models::SettingKey;

/// A required setting is absent or unusable.
#[derive(thiserror::Error, Debug)]
pub enum ConfigurationError {
    #[error("You must specify {0} in your configuration.")]
    MissingSetting(SettingKey),

    #[error(
        "You must specify {} in your configuration or pass 'auth_redirect' as a query \
         parameter to the authorize endpoint.",
        SettingKey::AuthRedirect
    )]
    NoRedirectTarget,

    #[error("Invalid value for {key}: {reason}")]
    InvalidSetting { key: SettingKey, reason: String },
}

impl ConfigurationError {
    pub fn invalid(key: SettingKey, reason: impl ToString) -> Self {
        Self::InvalidSetting {
            key,
            reason: reason.to_string(),
        }
    }
}

/// The remote service answered a token request without usable credentials.
#[derive(thiserror::Error, Debug)]
pub enum TokenError {
    #[error("Token request denied (HTTP {status}): {body}")]
    Denied { status: u16, body: String },

    #[error("Token response is missing '{0}'")]
    Missing(&'static str),

    #[error("Token response body is empty")]
    Malformed,
}

#[derive(thiserror::Error, Debug)]
pub enum SigningError {
    #[error("Unable to parse RSA private key: {0}")]
    InvalidKey(String),

    #[error("RSA-SHA1 signing failed: {0}")]
    Sign(#[from] rsa::signature::Error),
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("Authorization exchange failed: {0}")]
    AuthorizationExchange(#[from] TokenError),

    #[error(transparent)]
    Signing(#[from] SigningError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::AuthorizationExchange(_) | Self::Http(_) => StatusCode::BAD_GATEWAY,
            Self::Configuration(_) | Self::Signing(_) | Self::Url(_) | Self::Session(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        tracing::error!(%status, error = %self, "request failed");
        (status, self.to_string()).into_response()
    }
}

pub type Result<T> = std::result::Result<T, Error>;
