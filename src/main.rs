use celine_chat::cli::{self, Cli};
use celine_chat::logging::init_logging;

use clap::Parser;
use color_eyre::Result;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    init_logging();

    let cli = Cli::parse();
    cli::run(cli.into_command()).await
}
