use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use log::debug;
use webfetch::{
    cli::{run, Args},
    output::FileSystemResolver,
    retriever::WebRetriever,
};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    env_logger::init();
    let args = Args::parse();
    let config = args.load_config()?;
    debug!("Starting with {config:#?}.");
    let retriever = WebRetriever::with_config(&config.retriever)?;
    let resolver = FileSystemResolver::new(&config.output);

    let summary = run(&args, &retriever, &resolver).await;
    debug!("Finished with {summary:?}.");
    Ok(summary.exit_code())
}
