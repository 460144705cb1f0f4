//! objctl: administration CLI for S3-compatible object storage
//!
//! Bucket replication commands plus the alias configuration they rely on.

pub mod cli;
pub mod core;
