use std::{fmt::Display, path::PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use cloudlog::{logging::diagnostics, ParsedLog, StoreConfig, LOG_TARGET};
use log::LevelFilter;
use serde_json::{Map, Value};

mod append;
mod cat;
mod info;
mod path;
mod remaining;

#[derive(Subcommand, Debug)]
pub enum CloudlogCmd {
    Append(append::Cmd),

    Cat(cat::Cmd),

    Remaining(remaining::Cmd),

    Path(path::Cmd),

    Info(info::Cmd),
}

impl Display for CloudlogCmd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CloudlogCmd::Append(cmd) => write!(f, "append {}", cmd.uri),
            CloudlogCmd::Cat(cmd) => write!(f, "cat {}", cmd.uri),
            CloudlogCmd::Remaining(cmd) => write!(f, "remaining {}", cmd.uri),
            CloudlogCmd::Path(_cmd) => write!(f, "path"),
            CloudlogCmd::Info(_cmd) => write!(f, "info"),
        }
    }
}

#[derive(ValueEnum, Clone, Debug, PartialEq)]
pub enum OutputType {
    Text,
    Json,
}

#[derive(Parser)]
#[command(version, long_version = "")]
#[command(about = "Append job records to delimited logs in object storage and resume jobs from them.", long_about = None, disable_help_subcommand = true)]
pub struct Cloudlog {
    #[arg(
        global = true,
        long,
        help = "The AWS profile to use. Defaults to the AWS_PROFILE environment variable.",
        display_order = 0
    )]
    pub profile: Option<String>,

    #[arg(
        global = true,
        long,
        help = "The AWS region to use. Defaults to AWS_REGION or the region of the profile.",
        display_order = 0
    )]
    pub region: Option<String>,

    #[arg(
        global = true,
        long,
        help = "Endpoint of an S3-compatible store, e.g. http://localhost:9000.",
        display_order = 0
    )]
    pub endpoint: Option<String>,

    #[arg(
        global = true,
        long,
        help = "Address S3 buckets by path instead of virtual host.",
        display_order = 0
    )]
    pub path_style: bool,

    #[arg(
        global = true,
        long,
        help = "Azure storage account. Defaults to AZURE_STORAGE_ACCOUNT.",
        display_order = 1
    )]
    pub azure_account: Option<String>,

    #[arg(
        global = true,
        long,
        help = "Azure storage access key. Defaults to AZURE_STORAGE_KEY.",
        display_order = 1
    )]
    pub azure_key: Option<String>,

    #[arg(
        global = true,
        long,
        help = "Azure SAS token. Defaults to AZURE_STORAGE_SAS_TOKEN.",
        display_order = 1
    )]
    pub azure_sas: Option<String>,

    #[arg(
        global = true,
        long,
        help = "Use the local Azurite storage emulator.",
        display_order = 1
    )]
    pub azure_emulator: bool,

    #[arg(
        global = true,
        long,
        help = "Write diagnostics to this file instead of stderr.",
        display_order = 998
    )]
    pub log_file: Option<PathBuf>,

    #[arg(
        long,
        short = 'v',
        action = clap::ArgAction::Count,
        global = true,
        help = "Write verbose messages for debugging, repeat for more.",
        display_order = 999
    )]
    pub verbose: u8,

    #[command(subcommand)]
    pub cmd: CloudlogCmd,
}

impl Cloudlog {
    fn log_filter(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Off,
            1 => LevelFilter::Error,
            2 => LevelFilter::Warn,
            3 => LevelFilter::Info,
            4 => LevelFilter::Debug,
            5_u8..=u8::MAX => LevelFilter::Trace,
        }
    }

    fn setup_logging(&self) -> eyre::Result<()> {
        let mut builder = diagnostics::Builder::new().with_level(self.log_filter());

        builder = match &self.log_file {
            Some(path) => builder.with_file_sink(path),
            None => builder.with_stderr_sink(),
        };

        builder.build()?.init()
    }

    /// Environment first, flags on top.
    pub fn store_config(&self) -> StoreConfig {
        let mut config = StoreConfig::from_env();

        if self.profile.is_some() {
            config.s3.profile = self.profile.clone();
        }
        if self.region.is_some() {
            config.s3.region = self.region.clone();
        }
        if self.endpoint.is_some() {
            config.s3.endpoint_url = self.endpoint.clone();
        }
        config.s3.force_path_style |= self.path_style;

        if self.azure_account.is_some() {
            config.azure.account = self.azure_account.clone();
        }
        if self.azure_key.is_some() {
            config.azure.access_key = self.azure_key.clone();
        }
        if self.azure_sas.is_some() {
            config.azure.sas_token = self.azure_sas.clone();
        }
        config.azure.use_emulator |= self.azure_emulator;

        config
    }

    pub fn run(self) -> eyre::Result<()> {
        self.setup_logging()?;

        log::info!(target: LOG_TARGET, "running command {}", &self.cmd);
        log::trace!(target: LOG_TARGET, "log level: {}", self.log_filter());

        let config = self.store_config();
        let result = match &self.cmd {
            CloudlogCmd::Append(cmd) => cmd.run(&config),
            CloudlogCmd::Cat(cmd) => cmd.run(&config),
            CloudlogCmd::Remaining(cmd) => cmd.run(&config),
            CloudlogCmd::Path(cmd) => cmd.run(),
            CloudlogCmd::Info(cmd) => cmd.run(&config),
        };

        if let Err(msg) = &result {
            log::error!(
                target: LOG_TARGET,
                "failed running command {}, error={} cause={}",
                &self.cmd,
                msg,
                msg.root_cause()
            );
        }

        result
    }
}

/// Prints a table as delimited text (header first) or as one JSON object per row.
pub fn print_table<'a>(
    columns: &[String],
    rows: impl IntoIterator<Item = (Option<&'a str>, &'a [String])>,
    delimiter: char,
    output: &OutputType,
) -> eyre::Result<()> {
    let separator = delimiter.to_string();

    if *output == OutputType::Text {
        println!("{}", columns.join(&separator));
    }

    for (timestamp, fields) in rows {
        match output {
            OutputType::Text => {
                let line = fields.join(&separator);
                match timestamp {
                    Some(timestamp) => println!("{}{}{}", timestamp, separator, line),
                    None => println!("{}", line),
                }
            }
            OutputType::Json => {
                let mut json = Map::new();
                if let Some(timestamp) = timestamp {
                    json.insert("timestamp".to_string(), timestamp.into());
                }
                for (column, value) in columns.iter().zip(fields) {
                    json.insert(column.clone(), Value::String(value.clone()));
                }
                println!("{}", serde_json::to_string(&json)?);
            }
        }
    }

    Ok(())
}

pub fn print_log(log: &ParsedLog, delimiter: char, output: &OutputType) -> eyre::Result<()> {
    print_table(
        log.columns(),
        log.rows()
            .iter()
            .map(|row| (row.timestamp.as_deref(), row.fields.as_slice())),
        delimiter,
        output,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_environment() {
        let cli = Cloudlog::parse_from([
            "cloudlog",
            "--region",
            "eu-west-1",
            "--azure-emulator",
            "cat",
            "s3://bucket/key",
        ]);
        let config = cli.store_config();

        assert_eq!(config.s3.region.as_deref(), Some("eu-west-1"));
        assert!(config.azure.use_emulator);
    }

    #[test]
    fn verbosity_maps_to_levels() {
        let cli = Cloudlog::parse_from(["cloudlog", "-vvvv", "path", "p", "d", "v", "t"]);
        assert_eq!(cli.log_filter(), LevelFilter::Debug);
        assert_eq!(cli.cmd.to_string(), "path");
    }
}
