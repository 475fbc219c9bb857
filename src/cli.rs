use std::{path::PathBuf, process::ExitCode, time::Duration};

use clap::Parser;
use log::error;

use crate::{
    config::Config,
    error::ConfigError,
    output::OutputResolver,
    retriever::Retrieve,
    target::Target,
};

#[derive(Debug, Parser)]
#[clap(
    name = "webfetch",
    author,
    version,
    about = "Fetches each given URL or bare domain (`www.example.com` means \
`http://www.example.com`).\n\
Writes the bodies to standard output, or with `-o` to files\n\
named after the last segment of each URL's path."
)]
pub struct Args {
    #[clap(required = true, help = "The URLs or domains to fetch.")]
    pub targets: Vec<String>,
    #[clap(
        short,
        long,
        action,
        help = "Write each body to a file named after its URL instead of standard output."
    )]
    pub output_to_file: bool,
    #[clap(short = 'd', long, help = "Directory to write files to.")]
    pub output_dir: Option<PathBuf>,
    #[clap(short, long, action, help = "Do not overwrite existing files.")]
    pub no_clobber: bool,
    #[clap(
        short,
        long,
        help = "Connection timeout for each request in integer milliseconds."
    )]
    pub connection_timeout: Option<u64>,
    #[clap(short = 'C', long, help = "TOML configuration file.")]
    pub config: Option<PathBuf>,
}

impl Args {
    /// The config file (or defaults) with command-line flags layered on top.
    pub fn load_config(&self) -> Result<Config, ConfigError> {
        let config = match &self.config {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };
        let config = self.apply(config);
        config.validate()?;
        Ok(config)
    }

    pub fn apply(&self, config: Config) -> Config {
        let Config {
            mut retriever,
            mut output,
        } = config;
        if let Some(timeout) = self.connection_timeout {
            retriever = retriever.connect_timeout(Duration::from_millis(timeout));
        }
        if let Some(output_dir) = &self.output_dir {
            output = output.dir(output_dir.to_owned());
        }
        if self.no_clobber {
            output = output.no_clobber();
        }
        Config { retriever, output }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub succeeded: usize,
    pub failed: usize,
}

impl Summary {
    pub fn exit_code(&self) -> ExitCode {
        if self.failed == 0 {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }
}

/// Build every target, then retrieve them in order.
///
/// Arguments that are not valid targets are reported and skipped; a target
/// that fails to retrieve does not stop the ones after it.
pub async fn run<R, O>(args: &Args, retriever: &R, resolver: &O) -> Summary
where
    R: Retrieve + ?Sized,
    O: OutputResolver + ?Sized,
{
    let mut summary = Summary::default();
    let mut targets = Vec::with_capacity(args.targets.len());
    for raw in &args.targets {
        match Target::new(raw, args.output_to_file) {
            Ok(target) => targets.push(target),
            Err(err) => {
                error!("{err}.");
                summary.failed += 1;
            }
        }
    }
    for mut target in targets {
        match target.retrieve(retriever, resolver).await {
            Ok(_) => summary.succeeded += 1,
            Err(err) => {
                error!("{target}: {err}.");
                summary.failed += 1;
            }
        }
    }
    summary
}
