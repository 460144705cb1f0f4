//! HTTP client for S3-compatible servers
//!
//! Implements [`ReplicationClient`] against the bucket-level
//! `?replication-reset` API using SigV4-signed requests.

use chrono::Utc;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::core::client::{ClientError, ReplicationClient, ResyncTargetsInfo};
use crate::core::config::ResolvedAlias;
use crate::core::duration::OlderThan;
use crate::core::signer::{
    amz_date, canonical_query_string, encode_query_component, host_header, SigV4Signer,
    EMPTY_PAYLOAD_SHA256,
};

const SERVICE: &str = "s3";

/// Client bound to one alias endpoint
pub struct S3Client {
    http: reqwest::Client,
    endpoint: Url,
    signer: SigV4Signer,
}

impl S3Client {
    /// Create a client for a resolved alias
    pub fn new(alias: &ResolvedAlias, connect_timeout: Duration) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .danger_accept_invalid_certs(alias.insecure)
            .user_agent(concat!("objctl/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            endpoint: alias.endpoint.clone(),
            signer: SigV4Signer::new(alias.credentials.clone(), &alias.region, SERVICE),
        })
    }

    /// Build the `PUT /{bucket}?replication-reset` URL
    pub fn reset_url(
        &self,
        bucket: &str,
        older_than: Option<OlderThan>,
        target_arn: &str,
    ) -> Result<Url, ClientError> {
        let mut url = self.endpoint.clone();
        if url.cannot_be_a_base() {
            return Err(ClientError::InvalidEndpoint {
                url: self.endpoint.to_string(),
                reason: "not a base URL".to_string(),
            });
        }
        url.set_path(&format!("/{}", encode_query_component(bucket)));

        let older_than = older_than.map(OlderThan::to_go_duration);
        let mut params = vec![("replication-reset", "")];
        if let Some(value) = older_than.as_deref() {
            params.push(("older-than", value));
        }
        if !target_arn.is_empty() {
            params.push(("arn", target_arn));
        }
        url.set_query(Some(&canonical_query_string(params)));
        Ok(url)
    }

    async fn send_reset(
        &self,
        bucket: &str,
        older_than: Option<OlderThan>,
        target_arn: &str,
    ) -> Result<ResyncTargetsInfo, ClientError> {
        let url = self.reset_url(bucket, older_than, target_arn)?;
        let now = Utc::now();

        let mut headers = BTreeMap::new();
        headers.insert("host".to_string(), host_header(&url));
        headers.insert(
            "x-amz-content-sha256".to_string(),
            EMPTY_PAYLOAD_SHA256.to_string(),
        );
        headers.insert("x-amz-date".to_string(), amz_date(now));
        let authorization = self
            .signer
            .authorization("PUT", &url, &headers, EMPTY_PAYLOAD_SHA256, now)?;

        debug!(%url, "sending replication reset");
        let mut request = self.http.put(url).header("authorization", authorization);
        for (name, value) in headers.iter().filter(|(name, _)| *name != "host") {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        debug!(%status, bytes = body.len(), "replication reset response");

        if !status.is_success() {
            let (code, message) = parse_error_body(&body).unwrap_or_else(|| {
                (
                    status.as_str().to_string(),
                    status
                        .canonical_reason()
                        .unwrap_or("Unexpected response")
                        .to_string(),
                )
            });
            return Err(ClientError::Server {
                status: status.as_u16(),
                code,
                message,
            });
        }

        decode_targets(&body)
    }
}

impl ReplicationClient for S3Client {
    fn reset_replication(
        &self,
        bucket: &str,
        older_than: Option<OlderThan>,
        target_arn: &str,
    ) -> Result<ResyncTargetsInfo, ClientError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(ClientError::Runtime)?;

        runtime.block_on(async {
            let request = self.send_reset(bucket, older_than, target_arn);
            tokio::pin!(request);

            // Dropping the request future aborts the in-flight call
            tokio::select! {
                result = &mut request => result,
                signal = tokio::signal::ctrl_c() => match signal {
                    Ok(()) => Err(ClientError::Interrupted),
                    Err(e) => {
                        warn!(error = %e, "unable to listen for interrupts");
                        request.await
                    }
                },
            }
        })
    }
}

/// Decode a successful response body; an empty body means no targets
fn decode_targets(body: &[u8]) -> Result<ResyncTargetsInfo, ClientError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(ResyncTargetsInfo::default());
    }
    serde_json::from_slice(body).map_err(ClientError::Decode)
}

/// Extract `<Code>` and `<Message>` from an S3 XML error document
fn parse_error_body(body: &[u8]) -> Option<(String, String)> {
    let text = std::str::from_utf8(body).ok()?;
    let code = xml_element(text, "Code")?;
    let message = xml_element(text, "Message").unwrap_or_else(|| code.clone());
    Some((code, message))
}

fn xml_element(text: &str, name: &str) -> Option<String> {
    let open = format!("<{}>", name);
    let close = format!("</{}>", name);
    let start = text.find(&open)? + open.len();
    let end = start + text[start..].find(&close)?;
    Some(unescape_xml(text[start..end].trim()))
}

fn unescape_xml(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
