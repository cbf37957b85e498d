mod api;
mod cli;
mod export;
mod model;
mod notify;
mod storage;
mod summary;
mod workspace;

use anyhow::Result;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();
    let quiet = args.quiet;
    cli::init_tracing();

    match cli::run(args).await {
        Ok(()) => Ok(()),
        Err(e) => {
            if quiet {
                eprintln!("{e:#}");
                std::process::exit(1);
            }
            Err(e)
        }
    }
}
