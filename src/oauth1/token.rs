use std::{collections::HashMap, fmt};

use reqwest::header::AUTHORIZATION;
use tracing::debug;
use url::Url;

use super::signer::Consumer;
use crate::error::{Result, TokenError};

/// Temporary credentials handed out by the request-token endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct RequestToken {
    pub token: String,
    pub secret: Option<String>,
}

/// Token credentials returned by the access-token endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenCredentials {
    pub token: String,
    pub secret: String,
}

impl fmt::Debug for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestToken")
            .field("token", &self.token)
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl fmt::Debug for TokenCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCredentials")
            .field("token", &self.token)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Performs the signed token requests of the three-legged flow.
///
/// No timeout or retry is applied here; whatever the underlying `reqwest::Client`
/// does is what the caller gets.
#[derive(Debug, Clone)]
pub struct TokenClient<'a> {
    http: &'a reqwest::Client,
    consumer: &'a Consumer,
}

impl<'a> TokenClient<'a> {
    pub fn new(http: &'a reqwest::Client, consumer: &'a Consumer) -> Self {
        Self { http, consumer }
    }

    pub async fn fetch_request_token(&self, url: &Url) -> Result<RequestToken> {
        let mut fields = self.post_signed(url, &[]).await?;
        let token = fields
            .remove("oauth_token")
            .ok_or(TokenError::Missing("oauth_token"))?;

        Ok(RequestToken {
            token,
            secret: fields.remove("oauth_token_secret"),
        })
    }

    /// Exchanges an authorized request token for token credentials. `verifier`
    /// is forwarded when the remote service supplied one on the callback.
    pub async fn fetch_access_token(
        &self,
        url: &Url,
        request_token: &str,
        verifier: Option<&str>,
    ) -> Result<TokenCredentials> {
        let mut params = vec![("oauth_token", request_token)];
        if let Some(verifier) = verifier {
            params.push(("oauth_verifier", verifier));
        }

        let mut fields = self.post_signed(url, &params).await?;
        let token = fields
            .remove("oauth_token")
            .ok_or(TokenError::Missing("oauth_token"))?;
        let secret = fields
            .remove("oauth_token_secret")
            .ok_or(TokenError::Missing("oauth_token_secret"))?;

        Ok(TokenCredentials { token, secret })
    }

    async fn post_signed(
        &self,
        url: &Url,
        oauth_params: &[(&str, &str)],
    ) -> Result<HashMap<String, String>> {
        let header = self
            .consumer
            .authorization_header("POST", url, oauth_params)?;

        debug!(%url, consumer_key = self.consumer.key(), "requesting OAuth token");
        let response = self
            .http
            .post(url.clone())
            .header(AUTHORIZATION, header)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(TokenError::Denied {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        Ok(parse_token_response(&body)?)
    }
}

pub(crate) fn parse_token_response(
    body: &str,
) -> std::result::Result<HashMap<String, String>, TokenError> {
    let body = body.trim();
    if body.is_empty() {
        return Err(TokenError::Malformed);
    }
    Ok(url::form_urlencoded::parse(body.as_bytes())
        .into_owned()
        .collect())
}
