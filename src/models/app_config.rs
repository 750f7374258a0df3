use std::{fmt, sync::Arc};

use url::Url;

use crate::error::ConfigurationError;
use crate::oauth1::{Consumer, RsaSigningKey};

/// Names of the settings the flow reads, as they appear in the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    ConsumerKey,
    PrivateRsaKey,
    RequestTokenUrl,
    AuthorizeUrl,
    AccessTokenUrl,
    AuthRedirect,
    SaveTokenToSession,
    Server,
}

impl SettingKey {
    pub const fn env_name(self) -> &'static str {
        match self {
            Self::ConsumerKey => "JIRA_CONSUMER_KEY",
            Self::PrivateRsaKey => "JIRA_PRIVATE_RSA_KEY",
            Self::RequestTokenUrl => "JIRA_REQUEST_TOKEN_URL",
            Self::AuthorizeUrl => "JIRA_AUTHORIZE_URL",
            Self::AccessTokenUrl => "JIRA_ACCESS_TOKEN_URL",
            Self::AuthRedirect => "JIRA_AUTH_REDIRECT",
            Self::SaveTokenToSession => "JIRA_SAVE_TOKEN_TO_SESSION",
            Self::Server => "JIRA_SERVER",
        }
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.env_name())
    }
}

/// Alternative to `JIRA_PRIVATE_RSA_KEY`: a path to the PEM file.
pub const PRIVATE_RSA_KEY_FILE_ENV: &str = "JIRA_PRIVATE_RSA_KEY_FILE";

/// Settings the authorization initiator cannot run without.
pub const REQUEST_TOKEN_KEYS: &[SettingKey] = &[
    SettingKey::ConsumerKey,
    SettingKey::PrivateRsaKey,
    SettingKey::RequestTokenUrl,
    SettingKey::AuthorizeUrl,
];

/// Settings the callback handler cannot run without.
pub const ACCESS_TOKEN_KEYS: &[SettingKey] = &[
    SettingKey::ConsumerKey,
    SettingKey::PrivateRsaKey,
    SettingKey::AccessTokenUrl,
];

/// Jira OAuth settings. Values are parsed when loaded; presence is checked per
/// step through [`AppConfig::require_settings`].
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub consumer_key: Option<String>,
    pub private_key: Option<RsaSigningKey>,
    pub request_token_url: Option<Url>,
    pub authorize_url: Option<Url>,
    pub access_token_url: Option<Url>,
    pub auth_redirect: Option<String>,
    pub save_token_to_session: bool,
    pub jira_server: Option<Url>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            consumer_key: None,
            private_key: None,
            request_token_url: None,
            authorize_url: None,
            access_token_url: None,
            auth_redirect: None,
            save_token_to_session: true,
            jira_server: None,
        }
    }
}

/// Validated view used by the authorization initiator.
#[derive(Debug, Clone)]
pub struct RequestTokenSettings {
    pub consumer: Consumer,
    pub request_token_url: Url,
    pub authorize_url: Url,
}

/// Validated view used by the callback handler.
#[derive(Debug, Clone)]
pub struct AccessTokenSettings {
    pub consumer: Consumer,
    pub access_token_url: Url,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigurationError> {
        use dotenvy::dotenv;
        use std::env;

        dotenv().ok();

        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Loads settings through `lookup`, treating blank values as absent.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigurationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let get_url = |key: SettingKey| -> Result<Option<Url>, ConfigurationError> {
            get(key.env_name())
                .map(|raw| Url::parse(raw.trim()).map_err(|e| ConfigurationError::invalid(key, e)))
                .transpose()
        };

        let pem = match get(SettingKey::PrivateRsaKey.env_name()) {
            Some(pem) => Some(pem),
            None => get(PRIVATE_RSA_KEY_FILE_ENV)
                .map(|path| {
                    std::fs::read_to_string(path.trim()).map_err(|e| {
                        ConfigurationError::invalid(
                            SettingKey::PrivateRsaKey,
                            format!("cannot read {PRIVATE_RSA_KEY_FILE_ENV}: {e}"),
                        )
                    })
                })
                .transpose()?,
        };
        let private_key = pem
            .map(|pem| {
                RsaSigningKey::from_pem(&pem)
                    .map_err(|e| ConfigurationError::invalid(SettingKey::PrivateRsaKey, e))
            })
            .transpose()?;

        let save_token_to_session = match get(SettingKey::SaveTokenToSession.env_name()) {
            Some(raw) => parse_bool(&raw)
                .ok_or_else(|| ConfigurationError::invalid(SettingKey::SaveTokenToSession, raw))?,
            None => true,
        };

        Ok(Self {
            consumer_key: get(SettingKey::ConsumerKey.env_name()),
            private_key,
            request_token_url: get_url(SettingKey::RequestTokenUrl)?,
            authorize_url: get_url(SettingKey::AuthorizeUrl)?,
            access_token_url: get_url(SettingKey::AccessTokenUrl)?,
            auth_redirect: get(SettingKey::AuthRedirect.env_name()),
            save_token_to_session,
            jira_server: get_url(SettingKey::Server)?,
        })
    }

    pub fn is_configured(&self, key: SettingKey) -> bool {
        match key {
            SettingKey::ConsumerKey => self.consumer_key.is_some(),
            SettingKey::PrivateRsaKey => self.private_key.is_some(),
            SettingKey::RequestTokenUrl => self.request_token_url.is_some(),
            SettingKey::AuthorizeUrl => self.authorize_url.is_some(),
            SettingKey::AccessTokenUrl => self.access_token_url.is_some(),
            SettingKey::AuthRedirect => self.auth_redirect.is_some(),
            SettingKey::SaveTokenToSession => true,
            SettingKey::Server => self.jira_server.is_some(),
        }
    }

    /// Fails with the first key in `keys` that is not configured.
    pub fn require_settings(&self, keys: &[SettingKey]) -> Result<(), ConfigurationError> {
        match keys.iter().find(|key| !self.is_configured(**key)) {
            Some(key) => Err(ConfigurationError::MissingSetting(*key)),
            None => Ok(()),
        }
    }

    pub fn missing_settings(&self, keys: &[SettingKey]) -> Vec<SettingKey> {
        keys.iter()
            .copied()
            .filter(|key| !self.is_configured(*key))
            .collect()
    }

    pub fn consumer(&self) -> Result<Consumer, ConfigurationError> {
        self.require_settings(&[SettingKey::ConsumerKey, SettingKey::PrivateRsaKey])?;
        match (&self.consumer_key, &self.private_key) {
            (Some(key), Some(private_key)) => Ok(Consumer::new(key.clone(), private_key.clone())),
            (None, _) => Err(ConfigurationError::MissingSetting(SettingKey::ConsumerKey)),
            (_, None) => Err(ConfigurationError::MissingSetting(SettingKey::PrivateRsaKey)),
        }
    }

    pub fn request_token_settings(&self) -> Result<RequestTokenSettings, ConfigurationError> {
        self.require_settings(REQUEST_TOKEN_KEYS)?;
        Ok(RequestTokenSettings {
            consumer: self.consumer()?,
            request_token_url: required(&self.request_token_url, SettingKey::RequestTokenUrl)?,
            authorize_url: required(&self.authorize_url, SettingKey::AuthorizeUrl)?,
        })
    }

    pub fn access_token_settings(&self) -> Result<AccessTokenSettings, ConfigurationError> {
        self.require_settings(ACCESS_TOKEN_KEYS)?;
        Ok(AccessTokenSettings {
            consumer: self.consumer()?,
            access_token_url: required(&self.access_token_url, SettingKey::AccessTokenUrl)?,
        })
    }
}

fn required(value: &Option<Url>, key: SettingKey) -> Result<Url, ConfigurationError> {
    value
        .clone()
        .ok_or(ConfigurationError::MissingSetting(key))
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Listener and cookie settings for the binary.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub secure_cookie: bool,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:10000".to_string());
        let secure_cookie = std::env::var("SESSION_SECURE_COOKIE")
            .ok()
            .and_then(|raw| parse_bool(&raw))
            .unwrap_or(false);

        Self {
            bind_addr,
            secure_cookie,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config: Arc::new(config),
            http: reqwest::Client::new(),
        }
    }
}
