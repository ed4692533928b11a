use clap::Args;
use cloudlog::{open_target, utils::parse_delimiter, AppendTarget, ParsedLog, StoreConfig};
use eyre::Context;

use super::{print_log, OutputType};

#[derive(Args, Debug)]
pub struct Cmd {
    #[arg(index = 1, value_name = "URI", help = "Log target: azure://, s3:// or file://.")]
    pub uri: String,

    #[arg(short, long, default_value = "|", value_parser = parse_delimiter)]
    pub delimiter: char,

    #[arg(long, short, value_enum, default_value_t = OutputType::Text)]
    pub output: OutputType,
}

impl Cmd {
    pub fn run(&self, config: &StoreConfig) -> eyre::Result<()> {
        let target = open_target(&self.uri, config)?;
        let data = target.read()?;
        let log = ParsedLog::parse(&data, self.delimiter)
            .wrap_err_with(|| format!("Failed parsing log {}", self.uri))?;

        print_log(&log, self.delimiter, &self.output)
    }
}
