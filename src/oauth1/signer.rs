use std::fmt;

use base64::{Engine, engine::general_purpose::STANDARD};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use rand::{Rng, distributions::Alphanumeric};
use rsa::{
    RsaPrivateKey,
    pkcs1::DecodeRsaPrivateKey,
    pkcs1v15::SigningKey,
    pkcs8::DecodePrivateKey,
    signature::{SignatureEncoding, Signer},
};
use sha1::Sha1;
use url::Url;

use crate::error::SigningError;

pub const SIGNATURE_METHOD: &str = "RSA-SHA1";
const OAUTH_VERSION: &str = "1.0";
const NONCE_LEN: usize = 32;

/// Everything outside the RFC 3986 unreserved set.
const OAUTH_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

pub fn percent_encode(value: &str) -> String {
    utf8_percent_encode(value, OAUTH_ENCODE_SET).to_string()
}

/// RSA private key used to produce `RSA-SHA1` signatures.
#[derive(Clone)]
pub struct RsaSigningKey(SigningKey<Sha1>);

impl RsaSigningKey {
    /// Accepts PKCS#8 (`BEGIN PRIVATE KEY`) or PKCS#1 (`BEGIN RSA PRIVATE KEY`) PEM.
    /// Literal `\n` sequences are unfolded so a key can live on one line of a `.env` file.
    pub fn from_pem(pem: &str) -> Result<Self, SigningError> {
        let pem = if pem.contains('\n') {
            pem.trim().to_string()
        } else {
            pem.trim().replace("\\n", "\n")
        };

        let key = RsaPrivateKey::from_pkcs8_pem(&pem)
            .or_else(|_| RsaPrivateKey::from_pkcs1_pem(&pem))
            .map_err(|e| SigningError::InvalidKey(e.to_string()))?;

        Ok(Self(SigningKey::<Sha1>::new(key)))
    }

    /// Base64 encoded PKCS#1 v1.5 signature over the SHA-1 digest of `message`.
    pub fn sign(&self, message: &str) -> Result<String, SigningError> {
        let signature = self.0.try_sign(message.as_bytes())?;
        Ok(STANDARD.encode(signature.to_bytes()))
    }
}

impl fmt::Debug for RsaSigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RsaSigningKey(..)")
    }
}

/// The registered application: its consumer key and the private half of the
/// key pair whose public half is configured on the remote side.
#[derive(Debug, Clone)]
pub struct Consumer {
    key: String,
    signing_key: RsaSigningKey,
}

impl Consumer {
    pub fn new(key: impl Into<String>, signing_key: RsaSigningKey) -> Self {
        Self {
            key: key.into(),
            signing_key,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Builds the `Authorization: OAuth ...` header value for a request.
    ///
    /// `extra` carries protocol parameters such as `oauth_token` or
    /// `oauth_verifier`; they are signed and sent in the header.
    pub fn authorization_header(
        &self,
        method: &str,
        url: &Url,
        extra: &[(&str, &str)],
    ) -> Result<String, SigningError> {
        let timestamp = time::OffsetDateTime::now_utc().unix_timestamp();
        self.authorization_header_with(method, url, extra, &generate_nonce(), timestamp)
    }

    pub(crate) fn authorization_header_with(
        &self,
        method: &str,
        url: &Url,
        extra: &[(&str, &str)],
        nonce: &str,
        timestamp: i64,
    ) -> Result<String, SigningError> {
        let timestamp = timestamp.to_string();
        let mut oauth_params: Vec<(String, String)> = vec![
            ("oauth_consumer_key".into(), self.key.clone()),
            ("oauth_nonce".into(), nonce.to_string()),
            ("oauth_signature_method".into(), SIGNATURE_METHOD.into()),
            ("oauth_timestamp".into(), timestamp),
            ("oauth_version".into(), OAUTH_VERSION.into()),
        ];
        oauth_params.extend(extra.iter().map(|(k, v)| (k.to_string(), v.to_string())));

        let base = signature_base_string(method, url, &oauth_params);
        let signature = self.signing_key.sign(&base)?;

        oauth_params.sort();
        oauth_params.push(("oauth_signature".into(), signature));

        let fields = oauth_params
            .iter()
            .map(|(k, v)| format!("{}=\"{}\"", percent_encode(k), percent_encode(v)))
            .collect::<Vec<_>>()
            .join(", ");

        Ok(format!("OAuth {fields}"))
    }
}

fn generate_nonce() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(NONCE_LEN)
        .map(char::from)
        .collect()
}

/// `scheme://host[:port]/path` with scheme and host lowercased, default port and
/// query dropped.
pub fn base_string_uri(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default().to_ascii_lowercase();
    let port = url.port().map(|p| format!(":{p}")).unwrap_or_default();
    format!("{}://{}{}{}", url.scheme(), host, port, url.path())
}

/// Signature base string (RFC 5849 section 3.4.1). Query parameters of `url` are
/// merged with `oauth_params` before normalization.
pub fn signature_base_string(method: &str, url: &Url, oauth_params: &[(String, String)]) -> String {
    let mut encoded: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (percent_encode(&k), percent_encode(&v)))
        .chain(
            oauth_params
                .iter()
                .map(|(k, v)| (percent_encode(k), percent_encode(v))),
        )
        .collect();
    encoded.sort();

    let normalized = encoded
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    format!(
        "{}&{}&{}",
        method.to_ascii_uppercase(),
        percent_encode(&base_string_uri(url)),
        percent_encode(&normalized)
    )
}
