use clap::Args;
use cloudlog::utils::log_path;

#[derive(Args, Debug)]
pub struct Cmd {
    #[arg(index = 1, help = "Storage prefix, e.g. s3://bucket/runs.")]
    pub prefix: String,

    #[arg(index = 2)]
    pub dataset_id: String,

    #[arg(index = 3)]
    pub version: String,

    #[arg(index = 4, help = "Run date or datetime; '/' is replaced by '_'.")]
    pub datetime: String,
}

impl Cmd {
    pub fn run(&self) -> eyre::Result<()> {
        println!(
            "{}",
            log_path(&self.prefix, &self.dataset_id, &self.version, &self.datetime)
        );
        Ok(())
    }
}
