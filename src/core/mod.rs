//! Core module - configuration, target paths and the storage client

pub mod client;
pub mod config;
pub mod duration;
pub mod s3;
pub mod signer;
pub mod target;

pub use client::{ClientError, ReplicationClient, ResyncTarget, ResyncTargetsInfo};
pub use config::{AliasConfig, Config, ConfigError, ResolvedAlias};
pub use duration::{parse_older_than, AgeFilterError, OlderThan};
pub use s3::S3Client;
pub use signer::{Credentials, SigV4Signer};
pub use target::{TargetError, TargetPath};
