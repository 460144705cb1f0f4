//! `objctl replicate` command - Bucket replication management
//!
//! `resync` (alias `reset`) asks the server to re-replicate previously
//! replicated objects of a bucket to one remote target. The command only
//! starts the reset; progress is tracked by the server.

use clap::Subcommand;
use console::style;
use miette::{Diagnostic, IntoDiagnostic, Result, WrapErr};
use serde::Serialize;
use std::io::{self, Write};
use thiserror::Error;

use crate::cli::output::write_json;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{
    parse_older_than, AgeFilterError, Config, OlderThan, ReplicationClient, ResyncTargetsInfo,
    S3Client, TargetError, TargetPath,
};

const RESYNC_EXAMPLES: &str = "\
EXAMPLES:
  1. Re-replicate previously replicated objects in bucket \"mybucket\" for alias \"myminio\" for remote target.
     $ objctl replicate resync myminio/mybucket --remote-bucket \"arn:minio:replication::xxx:mybucket\"

  2. Re-replicate all objects older than 60 days in bucket \"mybucket\" for remote bucket target.
     $ objctl replicate resync myminio/mybucket --older-than 60d --remote-bucket \"arn:minio:replication::xxx:mybucket\"";

#[derive(Subcommand, Debug)]
pub enum ReplicateCommands {
    /// Re-replicate all previously replicated objects
    #[command(visible_alias = "reset", after_help = RESYNC_EXAMPLES)]
    Resync(ResyncArgs),
}

#[derive(clap::Args, Debug)]
pub struct ResyncArgs {
    /// Alias and bucket, e.g. myminio/mybucket
    #[arg(value_name = "TARGET")]
    pub target: String,

    /// Re-replicate objects older than the given age (e.g. 60d, 2w, 1y)
    #[arg(long, value_name = "DURATION")]
    pub older_than: Option<String>,

    /// Remote bucket ARN
    #[arg(long, value_name = "ARN")]
    pub remote_bucket: Option<String>,
}

/// Argument errors detected before any remote call
#[derive(Debug, Error, Diagnostic, PartialEq, Eq)]
pub enum ResyncError {
    #[error("--remote-bucket flag needs to be specified.")]
    #[diagnostic(
        code(objctl::resync::remote_bucket),
        help("pass the ARN of the remote replication target, e.g. --remote-bucket \"arn:minio:replication::xxx:mybucket\"")
    )]
    MissingRemoteBucket,

    #[error(transparent)]
    #[diagnostic(transparent)]
    Target(#[from] TargetError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    AgeFilter(#[from] AgeFilterError),
}

/// A validated resync invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResyncRequest {
    /// `TARGET` exactly as given on the command line
    pub url: String,
    pub target: TargetPath,
    pub older_than: Option<OlderThan>,
    pub remote_bucket: String,
}

impl ResyncRequest {
    /// Validate parsed arguments
    pub fn from_args(args: &ResyncArgs) -> Result<Self, ResyncError> {
        let remote_bucket = args
            .remote_bucket
            .as_deref()
            .map(str::trim)
            .filter(|arn| !arn.is_empty())
            .ok_or(ResyncError::MissingRemoteBucket)?;

        let target: TargetPath = args.target.parse()?;

        let older_than = match args.older_than.as_deref() {
            Some(value) => parse_older_than(value)?,
            None => None,
        };

        Ok(Self {
            url: args.target.clone(),
            target,
            older_than,
            remote_bucket: remote_bucket.to_string(),
        })
    }
}

/// Result document for a started resync
#[derive(Debug, Serialize)]
pub struct ResyncMessage<'a> {
    pub op: &'static str,
    pub url: &'a str,
    #[serde(rename = "resyncInfo")]
    pub resync_info: &'a ResyncTargetsInfo,
    pub status: &'static str,
    #[serde(rename = "targetArn")]
    pub target_arn: &'a str,
}

impl<'a> ResyncMessage<'a> {
    pub fn new(request: &'a ResyncRequest, resync_info: &'a ResyncTargetsInfo) -> Self {
        Self {
            op: "status",
            url: &request.url,
            resync_info,
            status: "success",
            target_arn: &request.remote_bucket,
        }
    }

    /// One-line human-readable summary
    pub fn text(&self) -> String {
        match self.resync_info.targets.as_slice() {
            [target] => format!(
                "Replication reset started for {} with ID {}",
                self.url, target.reset_id
            ),
            _ => format!("Replication reset started for {}", self.url),
        }
    }

    pub fn write<W: Write + ?Sized>(&self, format: OutputFormat, out: &mut W) -> Result<()> {
        if format.is_json() {
            write_json(self, out)
        } else {
            writeln!(out, "{}", style(self.text()).green()).into_diagnostic()
        }
    }
}

/// Run a replicate subcommand
pub fn run(cmd: ReplicateCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ReplicateCommands::Resync(args) => run_resync(args, global),
    }
}

fn run_resync(args: ResyncArgs, global: &GlobalOpts) -> Result<()> {
    let request = ResyncRequest::from_args(&args)?;

    let config = Config::load(global.config_dir.as_deref())?;
    let alias = config.resolve_alias(&request.target.alias)?;
    let client = S3Client::new(&alias, config.connect_timeout())
        .wrap_err("Unable to initialize connection")?;

    let stdout = io::stdout();
    resync(&client, &request, global.format, &mut stdout.lock())
}

/// Start the reset through `client` and render the outcome to `out`
pub fn resync<C, W>(
    client: &C,
    request: &ResyncRequest,
    format: OutputFormat,
    out: &mut W,
) -> Result<()>
where
    C: ReplicationClient + ?Sized,
    W: Write + ?Sized,
{
    if let Some(prefix) = &request.target.prefix {
        tracing::debug!(%prefix, "ignoring object prefix; reset applies to the whole bucket");
    }
    tracing::debug!(
        path = %request.target,
        older_than = request.older_than.map(tracing::field::display),
        arn = %request.remote_bucket,
        "resetting replication"
    );

    let info = client
        .reset_replication(
            &request.target.bucket,
            request.older_than,
            &request.remote_bucket,
        )
        .wrap_err_with(|| format!("Unable to reset replication for `{}`", request.url))?;

    ResyncMessage::new(request, &info).write(format, out)
}
