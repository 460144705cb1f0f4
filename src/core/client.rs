//! Replication client interface and response types

use chrono::{DateTime, Utc};
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::duration::OlderThan;

/// The remote side of `replicate resync`
pub trait ReplicationClient {
    /// Start re-replication of `bucket` towards the target identified by `target_arn`.
    ///
    /// `older_than` restricts the reset to objects older than the given age;
    /// `None` resets every previously replicated object.
    fn reset_replication(
        &self,
        bucket: &str,
        older_than: Option<OlderThan>,
        target_arn: &str,
    ) -> Result<ResyncTargetsInfo, ClientError>;
}

/// Resync state per replication target, as returned by the server
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResyncTargetsInfo {
    #[serde(rename = "target", default, skip_serializing_if = "Vec::is_empty")]
    pub targets: Vec<ResyncTarget>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResyncTarget {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub arn: String,

    /// Identifier of this reset, used to query its progress
    #[serde(rename = "resetid", default, skip_serializing_if = "String::is_empty")]
    pub reset_id: String,

    #[serde(rename = "startTime", default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,

    #[serde(rename = "endTime", default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,

    #[serde(rename = "resyncStatus", default, skip_serializing_if = "String::is_empty")]
    pub resync_status: String,

    #[serde(rename = "completedReplicationSize", default, skip_serializing_if = "is_zero")]
    pub replicated_size: i64,

    #[serde(rename = "failedReplicationSize", default, skip_serializing_if = "is_zero")]
    pub failed_size: i64,

    #[serde(rename = "failedReplicationCount", default, skip_serializing_if = "is_zero")]
    pub failed_count: i64,

    #[serde(rename = "replicationCount", default, skip_serializing_if = "is_zero")]
    pub replicated_count: i64,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub bucket: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub object: String,

    /// Fields added by newer servers, passed through untouched
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn is_zero(n: &i64) -> bool {
    *n == 0
}

/// Errors raised by a [`ReplicationClient`]
#[derive(Debug, Error, Diagnostic)]
pub enum ClientError {
    #[error("Request failed")]
    #[diagnostic(code(objctl::client::request))]
    Request(#[from] reqwest::Error),

    #[error("{message} (code: {code}, HTTP {status})")]
    #[diagnostic(code(objctl::client::server))]
    Server {
        status: u16,
        code: String,
        message: String,
    },

    #[error("Unable to decode server response")]
    #[diagnostic(code(objctl::client::decode))]
    Decode(#[source] serde_json::Error),

    #[error("Invalid endpoint `{url}`: {reason}")]
    #[diagnostic(code(objctl::client::endpoint))]
    InvalidEndpoint { url: String, reason: String },

    #[error("Unable to sign request")]
    #[diagnostic(code(objctl::client::signing))]
    Signing(#[from] hmac::digest::InvalidLength),

    #[error("Unable to start the I/O runtime")]
    #[diagnostic(code(objctl::client::runtime))]
    Runtime(#[source] std::io::Error),

    #[error("Interrupted")]
    #[diagnostic(code(objctl::client::interrupted))]
    Interrupted,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_single_target() {
        let body = r#"{"target":[{"arn":"arn:minio:replication::xxx:mybucket","resetid":"abc123"}]}"#;
        let info: ResyncTargetsInfo = serde_json::from_str(body).unwrap();
        assert_eq!(info.targets.len(), 1);
        assert_eq!(info.targets[0].reset_id, "abc123");
        assert_eq!(info.targets[0].arn, "arn:minio:replication::xxx:mybucket");
        assert!(info.targets[0].start_time.is_none());
    }

    #[test]
    fn test_decode_empty_object() {
        let info: ResyncTargetsInfo = serde_json::from_str("{}").unwrap();
        assert!(info.targets.is_empty());
    }

    #[test]
    fn test_decode_full_target() {
        let body = r#"{"target":[{
            "arn":"arn:minio:replication::xxx:mybucket",
            "resetid":"abc123",
            "startTime":"2024-03-01T10:00:00Z",
            "resyncStatus":"Ongoing",
            "completedReplicationSize":2048,
            "replicationCount":2,
            "bucket":"mybucket",
            "object":"photos/a.jpg"
        }]}"#;
        let info: ResyncTargetsInfo = serde_json::from_str(body).unwrap();
        let target = &info.targets[0];
        assert_eq!(target.resync_status, "Ongoing");
        assert_eq!(target.replicated_size, 2048);
        assert_eq!(target.replicated_count, 2);
        assert_eq!(target.object, "photos/a.jpg");
        assert!(target.start_time.is_some());
    }

    #[test]
    fn test_unknown_fields_preserved() {
        let body = r#"{"target":[{"arn":"a","resetid":"r","queuedCount":7}]}"#;
        let info: ResyncTargetsInfo = serde_json::from_str(body).unwrap();
        assert_eq!(info.targets[0].extra["queuedCount"], 7);

        let value = serde_json::to_value(&info).unwrap();
        assert_eq!(value, serde_json::from_str::<serde_json::Value>(body).unwrap());
    }

    #[test]
    fn test_decode_target_without_ids() {
        let body = r#"{"target":[{"resyncStatus":"Pending"}]}"#;
        let info: ResyncTargetsInfo = serde_json::from_str(body).unwrap();
        assert!(info.targets[0].arn.is_empty());
        assert!(info.targets[0].reset_id.is_empty());

        let value = serde_json::to_value(&info).unwrap();
        assert_eq!(value, serde_json::from_str::<serde_json::Value>(body).unwrap());
    }

    #[test]
    fn test_server_error_message() {
        let err = ClientError::Server {
            status: 400,
            code: "XMinioAdminReplicationRemoteConnectionError".to_string(),
            message: "Remote service connection error".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Remote service connection error (code: XMinioAdminReplicationRemoteConnectionError, HTTP 400)"
        );
    }
}
