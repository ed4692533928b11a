use std::path::PathBuf;

use clap::Args;
use cloudlog::{
    filter_by_log, open_target, utils::parse_delimiter, AppendTarget, Candidates, ParsedLog,
    StoreConfig, LOG_TARGET,
};
use eyre::Context;

use super::{print_table, OutputType};

#[derive(Args, Debug)]
pub struct Cmd {
    #[arg(index = 1, value_name = "URI", help = "Log target: azure://, s3:// or file://.")]
    pub uri: String,

    #[arg(
        index = 2,
        value_name = "CANDIDATES",
        help = "Local delimited file of tasks with an 'index' column."
    )]
    pub candidates: PathBuf,

    #[arg(short, long, default_value = "|", value_parser = parse_delimiter)]
    pub delimiter: char,

    #[arg(long, help = "Only rows logged with status 'complete' count as done.")]
    pub retry_errors: bool,

    #[arg(long, short, value_enum, default_value_t = OutputType::Text)]
    pub output: OutputType,
}

impl Cmd {
    pub fn run(&self, config: &StoreConfig) -> eyre::Result<()> {
        let data = std::fs::read(&self.candidates)
            .with_context(|| format!("Failed reading {}", self.candidates.display()))?;
        let table = ParsedLog::parse(&data, self.delimiter)
            .wrap_err_with(|| format!("Failed parsing {}", self.candidates.display()))?;
        let candidates = Candidates::from_table(&table)?;

        let target = open_target(&self.uri, config)?;
        let log = ParsedLog::parse(&target.read()?, self.delimiter)
            .wrap_err_with(|| format!("Failed parsing log {}", self.uri))?;

        let remaining = filter_by_log(&candidates, &log, self.retry_errors)?;
        log::info!(
            target: LOG_TARGET,
            "{} of {} candidates remaining",
            remaining.len(),
            candidates.len()
        );

        print_table(
            table.columns(),
            remaining
                .iter()
                .map(|(_, fields)| (None, fields.as_slice())),
            self.delimiter,
            &self.output,
        )
    }
}
