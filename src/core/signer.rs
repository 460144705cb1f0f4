//! AWS Signature Version 4 request signing
//!
//! Only header-based signing of requests with a known payload hash is
//! supported; that is all the replication endpoints need.

use chrono::{DateTime, Utc};
use hmac::digest::InvalidLength;
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;
use url::Url;

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "AWS4-HMAC-SHA256";

/// SHA-256 of an empty payload
pub const EMPTY_PAYLOAD_SHA256: &str =
    "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

/// Access/secret key pair
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_key: String,
    pub secret_key: String,
}

impl Credentials {
    pub fn new(access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

/// Signs requests for one region/service pair
#[derive(Debug, Clone)]
pub struct SigV4Signer {
    credentials: Credentials,
    region: String,
    service: String,
}

impl SigV4Signer {
    pub fn new(credentials: Credentials, region: impl Into<String>, service: impl Into<String>) -> Self {
        Self {
            credentials,
            region: region.into(),
            service: service.into(),
        }
    }

    /// Compute the `Authorization` header value.
    ///
    /// `headers` must hold every header to be signed, keyed by lowercase name,
    /// including `host` and `x-amz-date`.
    pub fn authorization(
        &self,
        method: &str,
        url: &Url,
        headers: &BTreeMap<String, String>,
        payload_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<String, InvalidLength> {
        let date = now.format("%Y%m%d").to_string();
        let scope = format!("{}/{}/{}/aws4_request", date, self.region, self.service);

        let canonical = canonical_request(method, url, headers, payload_hash);
        let string_to_sign = format!(
            "{}\n{}\n{}\n{}",
            ALGORITHM,
            amz_date(now),
            scope,
            hex::encode(Sha256::digest(canonical.as_bytes()))
        );

        let key = self.signing_key(&date)?;
        let signature = hex::encode(hmac_sha256(&key, string_to_sign.as_bytes())?);
        let signed_headers = headers.keys().cloned().collect::<Vec<_>>().join(";");

        tracing::trace!(%scope, %signed_headers, "signed request");

        Ok(format!(
            "{} Credential={}/{}, SignedHeaders={}, Signature={}",
            ALGORITHM, self.credentials.access_key, scope, signed_headers, signature
        ))
    }

    /// Derive the per-day signing key
    fn signing_key(&self, date: &str) -> Result<Vec<u8>, InvalidLength> {
        let secret = format!("AWS4{}", self.credentials.secret_key);
        let k_date = hmac_sha256(secret.as_bytes(), date.as_bytes())?;
        let k_region = hmac_sha256(&k_date, self.region.as_bytes())?;
        let k_service = hmac_sha256(&k_region, self.service.as_bytes())?;
        hmac_sha256(&k_service, b"aws4_request")
    }
}

/// `x-amz-date` timestamp format
pub fn amz_date(now: DateTime<Utc>) -> String {
    now.format("%Y%m%dT%H%M%SZ").to_string()
}

/// The `Host` header value the HTTP client will send for `url`
pub fn host_header(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    }
}

/// Percent-encode a query component the way SigV4 expects
pub fn encode_query_component(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Build a sorted, SigV4-canonical query string from key/value pairs
pub fn canonical_query_string<'a, I>(pairs: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut encoded: Vec<(String, String)> = pairs
        .into_iter()
        .map(|(k, v)| (encode_query_component(k), encode_query_component(v)))
        .collect();
    encoded.sort();
    encoded
        .into_iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&")
}

fn canonical_request(
    method: &str,
    url: &Url,
    headers: &BTreeMap<String, String>,
    payload_hash: &str,
) -> String {
    let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    let query = canonical_query_string(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())));

    let canonical_headers: String = headers
        .iter()
        .map(|(name, value)| format!("{}:{}\n", name, value.trim()))
        .collect();
    let signed_headers = headers.keys().cloned().collect::<Vec<_>>().join(";");

    let path = match url.path() {
        "" => "/",
        p => p,
    };

    format!(
        "{}\n{}\n{}\n{}\n{}\n{}",
        method, path, query, canonical_headers, signed_headers, payload_hash
    )
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<Vec<u8>, InvalidLength> {
    let mut mac = HmacSha256::new_from_slice(key)?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const EXAMPLE_SECRET: &str = "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY";

    #[test]
    fn test_signing_key_derivation() {
        let signer = SigV4Signer::new(
            Credentials::new("AKIDEXAMPLE", EXAMPLE_SECRET),
            "us-east-1",
            "iam",
        );
        let key = signer.signing_key("20120215").unwrap();
        assert_eq!(
            hex::encode(key),
            "f4780e2d9f65fa895f9c67b32ce1baf0b0d8a43505a000a1a9e090d414db404d"
        );
    }

    #[test]
    fn test_get_vanilla_signature() {
        let signer = SigV4Signer::new(
            Credentials::new("AKIDEXAMPLE", EXAMPLE_SECRET),
            "us-east-1",
            "service",
        );
        let now = Utc.with_ymd_and_hms(2015, 8, 30, 12, 36, 0).unwrap();
        let url = Url::parse("https://example.amazonaws.com/").unwrap();

        let mut headers = BTreeMap::new();
        headers.insert("host".to_string(), host_header(&url));
        headers.insert("x-amz-date".to_string(), amz_date(now));

        let auth = signer
            .authorization("GET", &url, &headers, EMPTY_PAYLOAD_SHA256, now)
            .unwrap();
        assert_eq!(
            auth,
            "AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20150830/us-east-1/service/aws4_request, \
             SignedHeaders=host;x-amz-date, \
             Signature=5fa00fa31553b73ebf1942676e86291e8372ff2a2260956d9b8aae1d763fbf31"
        );
    }

    #[test]
    fn test_canonical_query_sorted_and_encoded() {
        let query = canonical_query_string([
            ("replication-reset", ""),
            ("older-than", "1440h0m0s"),
            ("arn", "arn:minio:replication::xxx:mybucket"),
        ]);
        assert_eq!(
            query,
            "arn=arn%3Aminio%3Areplication%3A%3Axxx%3Amybucket&older-than=1440h0m0s&replication-reset="
        );
    }

    #[test]
    fn test_canonical_request_layout() {
        let url = Url::parse("http://127.0.0.1:9000/mybucket?replication-reset=&arn=a%3Ab").unwrap();
        let mut headers = BTreeMap::new();
        headers.insert("host".to_string(), host_header(&url));
        headers.insert("x-amz-date".to_string(), "20261018T000000Z".to_string());

        let canonical = canonical_request("PUT", &url, &headers, EMPTY_PAYLOAD_SHA256);
        let lines: Vec<&str> = canonical.lines().collect();
        assert_eq!(lines[0], "PUT");
        assert_eq!(lines[1], "/mybucket");
        assert_eq!(lines[2], "arn=a%3Ab&replication-reset=");
        assert_eq!(lines[3], "host:127.0.0.1:9000");
        assert_eq!(lines[4], "x-amz-date:20261018T000000Z");
        assert_eq!(lines[5], "");
        assert_eq!(lines[6], "host;x-amz-date");
        assert_eq!(lines[7], EMPTY_PAYLOAD_SHA256);
    }

    #[test]
    fn test_host_header_omits_default_port() {
        assert_eq!(host_header(&Url::parse("https://s3.example.com:443/").unwrap()), "s3.example.com");
        assert_eq!(host_header(&Url::parse("http://localhost:9000").unwrap()), "localhost:9000");
    }

    #[test]
    fn test_credentials_debug_redacts_secret() {
        let creds = Credentials::new("AKID", "topsecret");
        let debug = format!("{:?}", creds);
        assert!(debug.contains("AKID"));
        assert!(!debug.contains("topsecret"));
    }
}
