use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use video_sizer::{cli::Cli, run};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    run(cli).await
}
