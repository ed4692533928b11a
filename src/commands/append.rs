use clap::Args;
use cloudlog::{
    open_target, utils::parse_delimiter, CsvLogger, Literal, StoreConfig, LOG_TARGET,
};

#[derive(Args, Debug)]
pub struct Cmd {
    #[arg(index = 1, value_name = "URI", help = "Log target: azure://, s3:// or file://.")]
    pub uri: String,

    #[arg(
        index = 2,
        value_name = "FIELD",
        required = true,
        help = "Fields of the row. Values that parse as literals, e.g. (1, 2), are kept typed."
    )]
    pub fields: Vec<String>,

    #[arg(long, help = "Header line written when the log is created.")]
    pub header: Option<String>,

    #[arg(long, help = "Replace an existing log instead of appending to it.")]
    pub overwrite: bool,

    #[arg(short, long, default_value = "|", value_parser = parse_delimiter)]
    pub delimiter: char,
}

impl Cmd {
    pub fn run(&self, config: &StoreConfig) -> eyre::Result<()> {
        let target = open_target(&self.uri, config)?;

        let mut builder = CsvLogger::builder(target)
            .with_overwrite(self.overwrite)
            .with_delimiter(self.delimiter);
        if let Some(header) = &self.header {
            builder = builder.with_header(header);
        }
        let logger = builder.build()?;

        let fields = self
            .fields
            .iter()
            .map(|field| Literal::parse(field).unwrap_or_else(|_| Literal::from(field.as_str())));
        logger.log_fields(fields)?;

        log::info!(target: LOG_TARGET, "appended {} fields to {}", self.fields.len(), logger.uri());
        Ok(())
    }
}
