use axum::{
    extract::FromRequestParts,
    http::{StatusCode, header::HOST, request::Parts},
};

/// Scheme and host the client used to reach this service, honouring the usual
/// reverse-proxy headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOrigin {
    pub scheme: String,
    pub host: String,
}

impl RequestOrigin {
    pub fn url_for(&self, path: &str) -> String {
        format!("{}://{}{}", self.scheme, self.host, path)
    }

    pub fn from_parts(parts: &Parts) -> Option<Self> {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.split(',').next())
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let host = header("x-forwarded-host")
            .or_else(|| header(HOST.as_str()))
            .or_else(|| parts.uri.authority().map(|authority| authority.to_string()))?;
        let scheme = header("x-forwarded-proto")
            .or_else(|| parts.uri.scheme_str().map(str::to_string))
            .unwrap_or_else(|| "http".to_string())
            .to_ascii_lowercase();

        Some(Self { scheme, host })
    }
}

impl<S> FromRequestParts<S> for RequestOrigin
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Self::from_parts(parts).ok_or((StatusCode::BAD_REQUEST, "Missing Host header"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(builder: axum::http::request::Builder) -> Parts {
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_plain_host_defaults_to_http() {
        let parts = parts(Request::get("/jira-oauth/authorize").header("host", "app.local:8000"));
        let origin = RequestOrigin::from_parts(&parts).unwrap();
        assert_eq!(origin.url_for("/cb"), "http://app.local:8000/cb");
    }

    #[test]
    fn test_forwarded_headers_win() {
        let parts = parts(
            Request::get("/")
                .header("host", "internal:10000")
                .header("x-forwarded-host", "jira-app.example.com")
                .header("x-forwarded-proto", "HTTPS, http"),
        );
        let origin = RequestOrigin::from_parts(&parts).unwrap();
        assert_eq!(origin.scheme, "https");
        assert_eq!(origin.host, "jira-app.example.com");
    }

    #[test]
    fn test_missing_host_is_none() {
        let parts = parts(Request::get("/"));
        assert!(RequestOrigin::from_parts(&parts).is_none());
    }
}
