//! `objctl alias` command - Server alias management

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::io::{self, Write};
use tabled::{builder::Builder, settings::Style};

use crate::cli::output::write_json;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::config::{parse_endpoint, validate_alias_name};
use crate::core::{AliasConfig, Config, ConfigError};

#[derive(Subcommand, Debug)]
pub enum AliasCommands {
    /// Add or update an alias
    Set(SetArgs),

    /// List configured aliases
    #[command(visible_alias = "ls")]
    List,

    /// Remove an alias
    #[command(visible_alias = "rm")]
    Remove(RemoveArgs),
}

#[derive(clap::Args, Debug)]
pub struct SetArgs {
    /// Alias name, e.g. myminio
    pub alias: String,

    /// Server endpoint, e.g. http://localhost:9000
    pub url: String,

    /// Access key
    pub access_key: String,

    /// Secret key
    pub secret_key: String,

    /// Signing region (default: config `region`, or us-east-1)
    #[arg(long)]
    pub region: Option<String>,

    /// Skip TLS certificate verification
    #[arg(long)]
    pub insecure: bool,
}

#[derive(clap::Args, Debug)]
pub struct RemoveArgs {
    /// Alias name
    pub alias: String,
}

/// Alias as shown by `alias list`; secret keys are never printed
#[derive(Debug, Serialize, PartialEq, Eq)]
struct AliasEntry<'a> {
    alias: &'a str,
    url: &'a str,
    #[serde(rename = "accessKey")]
    access_key: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    region: Option<&'a str>,
    insecure: bool,
}

/// Run an alias subcommand
pub fn run(cmd: AliasCommands, global: &GlobalOpts) -> Result<()> {
    let path = Config::config_path(global.config_dir.as_deref())?;
    let mut config = Config::load_from(&path)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cmd {
        AliasCommands::Set(args) => {
            set_alias(&mut config, args)?;
            config.save_to(&path)?;
            tracing::debug!(path = %path.display(), "saved config");
            writeln!(out, "{} Alias saved to {}", style("✓").green(), path.display())
                .into_diagnostic()
        }
        AliasCommands::List => list_aliases(&config, global.format, &mut out),
        AliasCommands::Remove(args) => {
            remove_alias(&mut config, &args.alias)?;
            config.save_to(&path)?;
            writeln!(
                out,
                "{} Removed alias {}",
                style("✓").green(),
                style(&args.alias).cyan()
            )
            .into_diagnostic()
        }
    }
}

fn set_alias(config: &mut Config, args: SetArgs) -> Result<(), ConfigError> {
    validate_alias_name(&args.alias)?;
    let url = parse_endpoint(&args.url)?;

    config.aliases.insert(
        args.alias,
        AliasConfig {
            url: url.as_str().trim_end_matches('/').to_string(),
            access_key: args.access_key,
            secret_key: args.secret_key,
            region: args.region,
            insecure: args.insecure,
        },
    );
    Ok(())
}

fn remove_alias(config: &mut Config, alias: &str) -> Result<(), ConfigError> {
    config
        .aliases
        .remove(alias)
        .map(|_| ())
        .ok_or_else(|| ConfigError::UnknownAlias(alias.to_string()))
}

fn list_aliases<W: Write + ?Sized>(config: &Config, format: OutputFormat, out: &mut W) -> Result<()> {
    let entries: Vec<AliasEntry> = config
        .aliases
        .iter()
        .map(|(name, alias)| AliasEntry {
            alias: name,
            url: &alias.url,
            access_key: &alias.access_key,
            region: alias.region.as_deref(),
            insecure: alias.insecure,
        })
        .collect();

    if format.is_json() {
        return write_json(&entries, out);
    }

    if entries.is_empty() {
        return writeln!(out, "No aliases configured").into_diagnostic();
    }

    let mut builder = Builder::default();
    builder.push_record(["ALIAS", "URL", "ACCESS KEY", "REGION"]);
    for entry in &entries {
        builder.push_record([
            entry.alias,
            entry.url,
            entry.access_key,
            entry.region.unwrap_or(config.region()),
        ]);
    }
    writeln!(out, "{}", builder.build().with(Style::sharp())).into_diagnostic()
}
