//! `ALIAS/BUCKET[/PREFIX]` target paths

use miette::Diagnostic;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A parsed command-line target such as `myminio/mybucket`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetPath {
    pub alias: String,
    pub bucket: String,
    /// Object prefix after the bucket, if any
    pub prefix: Option<String>,
}

#[derive(Debug, Error, Diagnostic, PartialEq, Eq)]
pub enum TargetError {
    #[error("Invalid target `{0}`: alias is missing")]
    #[diagnostic(
        code(objctl::target::alias),
        help("targets have the form ALIAS/BUCKET, e.g. myminio/mybucket")
    )]
    MissingAlias(String),

    #[error("Invalid target `{0}`: bucket name cannot be empty")]
    #[diagnostic(
        code(objctl::target::bucket),
        help("targets have the form ALIAS/BUCKET, e.g. myminio/mybucket")
    )]
    EmptyBucket(String),
}

impl FromStr for TargetPath {
    type Err = TargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (alias, rest) = trimmed.split_once('/').unwrap_or((trimmed, ""));

        if alias.is_empty() {
            return Err(TargetError::MissingAlias(s.to_string()));
        }

        let rest = rest.trim_start_matches('/');
        let (bucket, prefix) = rest.split_once('/').unwrap_or((rest, ""));
        if bucket.is_empty() {
            return Err(TargetError::EmptyBucket(s.to_string()));
        }

        let prefix = prefix.trim_matches('/');
        Ok(Self {
            alias: alias.to_string(),
            bucket: bucket.to_string(),
            prefix: (!prefix.is_empty()).then(|| prefix.to_string()),
        })
    }
}

impl fmt::Display for TargetPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.alias, self.bucket)?;
        if let Some(prefix) = &self.prefix {
            write!(f, "/{}", prefix)?;
        }
        Ok(())
    }
}
