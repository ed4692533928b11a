use clap::{Args, CommandFactory};
use cloudlog::StoreConfig;

use crate::commands::Cloudlog;

#[derive(Args, Debug)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cmd {}

fn show(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("-")
}

fn secret(value: &Option<String>) -> &str {
    if value.is_some() {
        "set"
    } else {
        "-"
    }
}

impl Cmd {
    pub fn run(&self, config: &StoreConfig) -> eyre::Result<()> {
        println!(
            "Version:          {}",
            Cloudlog::command().get_version().unwrap_or("")
        );
        println!("AWS profile:      {}", show(&config.s3.profile));
        println!("AWS region:       {}", show(&config.s3.region));
        println!("S3 endpoint:      {}", show(&config.s3.endpoint_url));
        println!("S3 path style:    {}", config.s3.force_path_style);
        println!("Azure account:    {}", show(&config.azure.account));
        println!("Azure key:        {}", secret(&config.azure.access_key));
        println!("Azure SAS token:  {}", secret(&config.azure.sas_token));
        println!("Azure emulator:   {}", config.azure.use_emulator);
        Ok(())
    }
}
