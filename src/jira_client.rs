//! Signed calls to the Jira REST API on behalf of the user who completed the
//! OAuth dance.

use reqwest::header::AUTHORIZATION;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::{ConfigurationError, Result};
use crate::models::oauth::{ACCESS_TOKEN_KEY, ACCESS_TOKEN_SECRET_KEY};
use crate::models::{AppConfig, SettingKey};
use crate::oauth1::{Consumer, TokenCredentials};
use crate::session::SessionStore;

#[derive(Debug, Clone)]
pub struct JiraClient {
    http: reqwest::Client,
    consumer: Consumer,
    server: Url,
    credentials: TokenCredentials,
}

impl JiraClient {
    pub fn new(
        http: reqwest::Client,
        consumer: Consumer,
        mut server: Url,
        credentials: TokenCredentials,
    ) -> Self {
        // Keep a context path such as `/jira` when joining API paths.
        if !server.path().ends_with('/') {
            let path = format!("{}/", server.path());
            server.set_path(&path);
        }

        Self {
            http,
            consumer,
            server,
            credentials,
        }
    }

    /// Builds a client from the access token stored in `session`.
    ///
    /// Returns `Ok(None)` when the session has no access token.
    pub async fn from_session<S>(
        config: &AppConfig,
        http: reqwest::Client,
        session: &S,
    ) -> Result<Option<Self>>
    where
        S: SessionStore + ?Sized,
    {
        config.require_settings(&[
            SettingKey::ConsumerKey,
            SettingKey::PrivateRsaKey,
            SettingKey::Server,
        ])?;
        let consumer = config.consumer()?;
        let server = config
            .jira_server
            .clone()
            .ok_or(ConfigurationError::MissingSetting(SettingKey::Server))?;

        let Some(token) = session.get(ACCESS_TOKEN_KEY).await? else {
            return Ok(None);
        };
        let secret = session
            .get(ACCESS_TOKEN_SECRET_KEY)
            .await?
            .unwrap_or_default();

        Ok(Some(Self::new(
            http,
            consumer,
            server,
            TokenCredentials { token, secret },
        )))
    }

    pub fn url_for(&self, path: &str) -> Result<Url> {
        Ok(self.server.join(path.trim_start_matches('/'))?)
    }

    /// Signed `GET` against the Jira server, decoding the JSON body.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url_for(path)?;
        let header = self.consumer.authorization_header(
            "GET",
            &url,
            &[("oauth_token", self.credentials.token.as_str())],
        )?;

        debug!(%url, "signed Jira API request");
        let response = self
            .http
            .get(url)
            .header(AUTHORIZATION, header)
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json::<T>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oauth1::RsaSigningKey;
    use crate::session::MemorySession;

    const TEST_KEY: &str = include_str!("../tests/fixtures/jira_test_key.pem");

    fn config() -> AppConfig {
        AppConfig {
            consumer_key: Some("consumer".into()),
            private_key: Some(RsaSigningKey::from_pem(TEST_KEY).unwrap()),
            jira_server: Some(Url::parse("https://example.com/jira").unwrap()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_from_session_without_token_is_none() {
        let session = MemorySession::new();
        let client = JiraClient::from_session(&config(), reqwest::Client::new(), &session)
            .await
            .unwrap();
        assert!(client.is_none());
    }

    #[tokio::test]
    async fn test_from_session_requires_server() {
        let config = AppConfig {
            jira_server: None,
            ..config()
        };
        let session = MemorySession::with_values([(ACCESS_TOKEN_KEY, "tok")]);
        let err = JiraClient::from_session(&config, reqwest::Client::new(), &session)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("JIRA_SERVER"));
    }

    #[tokio::test]
    async fn test_url_for_keeps_context_path() {
        let session = MemorySession::with_values([
            (ACCESS_TOKEN_KEY, "tok"),
            (ACCESS_TOKEN_SECRET_KEY, "secret"),
        ]);
        let client = JiraClient::from_session(&config(), reqwest::Client::new(), &session)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            client.url_for("/rest/api/2/myself").unwrap().as_str(),
            "https://example.com/jira/rest/api/2/myself"
        );
    }
}
