//! Signed token requests against a mocked Jira.

use std::collections::HashMap;

use base64::{Engine, engine::general_purpose::STANDARD};
use rsa::{
    RsaPrivateKey,
    pkcs1v15::{Signature, VerifyingKey},
    pkcs8::DecodePrivateKey,
    signature::Verifier,
};
use sha1::Sha1;
use url::Url;
use wiremock::matchers::{header_regex, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use jira_oauth::error::{Error, TokenError};
use jira_oauth::oauth1::signer::signature_base_string;
use jira_oauth::oauth1::{Consumer, RsaSigningKey, TokenClient};

const TEST_KEY: &str = include_str!("fixtures/jira_test_key.pem");

fn consumer() -> Consumer {
    Consumer::new("jira-consumer", RsaSigningKey::from_pem(TEST_KEY).unwrap())
}

/// Splits an `OAuth k="v", ...` header into decoded pairs.
fn parse_oauth_header(header: &str) -> HashMap<String, String> {
    header
        .trim_start_matches("OAuth ")
        .split(", ")
        .filter_map(|field| field.split_once('='))
        .map(|(k, v)| {
            let v = v.trim_matches('"');
            (
                k.to_string(),
                percent_encoding::percent_decode_str(v)
                    .decode_utf8()
                    .unwrap()
                    .into_owned(),
            )
        })
        .collect()
}

fn assert_valid_signature(url: &Url, header: &str) {
    let mut params = parse_oauth_header(header);
    let signature = params.remove("oauth_signature").expect("signature present");
    let params: Vec<(String, String)> = params.into_iter().collect();

    let base = signature_base_string("POST", url, &params);
    let bytes = STANDARD.decode(signature).unwrap();
    let signature = Signature::try_from(bytes.as_slice()).unwrap();

    let public = RsaPrivateKey::from_pkcs8_pem(TEST_KEY).unwrap().to_public_key();
    VerifyingKey::<Sha1>::new(public)
        .verify(base.as_bytes(), &signature)
        .expect("signature verifies");
}

#[tokio::test]
async fn test_request_token_is_fetched_with_valid_signature() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/plugins/servlet/oauth/request-token"))
        .and(header_regex("authorization", "^OAuth .*oauth_signature_method=\"RSA-SHA1\""))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("oauth_token=reqtok&oauth_token_secret=reqsecret"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let http = reqwest::Client::new();
    let consumer = consumer();
    let url = Url::parse(&format!("{}/plugins/servlet/oauth/request-token", server.uri())).unwrap();

    let token = TokenClient::new(&http, &consumer)
        .fetch_request_token(&url)
        .await
        .unwrap();
    assert_eq!(token.token, "reqtok");
    assert_eq!(token.secret.as_deref(), Some("reqsecret"));

    let requests = server.received_requests().await.unwrap();
    let header = requests[0]
        .headers
        .get("authorization")
        .unwrap()
        .to_str()
        .unwrap();
    let fields = parse_oauth_header(header);
    assert_eq!(fields["oauth_consumer_key"], "jira-consumer");
    assert!(!fields.contains_key("oauth_token"));
    assert_valid_signature(&url, header);
}

#[tokio::test]
async fn test_access_token_exchange_signs_token_and_verifier() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/plugins/servlet/oauth/access-token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("oauth_token=acc&oauth_token_secret=accsecret"),
        )
        .mount(&server)
        .await;

    let http = reqwest::Client::new();
    let consumer = consumer();
    let url = Url::parse(&format!("{}/plugins/servlet/oauth/access-token", server.uri())).unwrap();

    let credentials = TokenClient::new(&http, &consumer)
        .fetch_access_token(&url, "reqtok", Some("v123"))
        .await
        .unwrap();
    assert_eq!(credentials.token, "acc");
    assert_eq!(credentials.secret, "accsecret");

    let requests = server.received_requests().await.unwrap();
    let header = requests[0]
        .headers
        .get("authorization")
        .unwrap()
        .to_str()
        .unwrap();
    let fields = parse_oauth_header(header);
    assert_eq!(fields["oauth_token"], "reqtok");
    assert_eq!(fields["oauth_verifier"], "v123");
    assert_valid_signature(&url, header);
}

#[tokio::test]
async fn test_rejected_exchange_is_denied() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_string("oauth_problem=token_rejected"))
        .mount(&server)
        .await;

    let http = reqwest::Client::new();
    let consumer = consumer();
    let url = Url::parse(&format!("{}/access-token", server.uri())).unwrap();

    let err = TokenClient::new(&http, &consumer)
        .fetch_access_token(&url, "reqtok", None)
        .await
        .unwrap_err();
    match err {
        Error::AuthorizationExchange(TokenError::Denied { status, body }) => {
            assert_eq!(status, 401);
            assert!(body.contains("token_rejected"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_secret_is_authorization_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("oauth_token=acc"))
        .mount(&server)
        .await;

    let http = reqwest::Client::new();
    let consumer = consumer();
    let url = Url::parse(&format!("{}/access-token", server.uri())).unwrap();

    let err = TokenClient::new(&http, &consumer)
        .fetch_access_token(&url, "reqtok", None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::AuthorizationExchange(TokenError::Missing("oauth_token_secret"))
    ));
}

#[tokio::test]
async fn test_unreachable_endpoint_is_transport_error() {
    let http = reqwest::Client::new();
    let consumer = consumer();
    let url = Url::parse("http://127.0.0.1:1/request-token").unwrap();

    let err = TokenClient::new(&http, &consumer)
        .fetch_request_token(&url)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Http(_)));
}
