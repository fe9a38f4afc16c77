use std::io;
use std::process;
use std::sync::Arc;

use anyhow::Result;
use clap::CommandFactory;
use clap_complete::generate;
use rscurl::cli::{self, Cli, Commands};
use rscurl::executor::RealCommandExecutor;
use tracing::error;

fn main() -> Result<()> {
    let args = cli::parse_args()?;

    let log_level = match &args.command {
        Commands::Request(opts) => opts.log_level,
        Commands::Download(opts) => opts.log_level,
        Commands::Completions(opts) => {
            let mut cmd = Cli::command();
            generate(opts.shell, &mut cmd, env!("CARGO_PKG_NAME"), &mut io::stdout());
            return Ok(());
        }
    };

    rscurl::init_logging(log_level)?;

    let result = match &args.command {
        Commands::Request(opts) => rscurl::run_request(
            opts,
            Arc::new(RealCommandExecutor {
                dry_run: opts.dry_run,
            }),
            io::stdout().lock(),
        ),
        Commands::Download(opts) => rscurl::run_download(
            opts,
            Arc::new(RealCommandExecutor { dry_run: false }),
            io::stdout().lock(),
        ),
        Commands::Completions(_) => Ok(()),
    };

    if let Err(e) = result {
        error!("{:#}", e);
        if let Some(stderr) = e.downcast_ref::<rscurl::RscurlError>().and_then(|e| e.stderr()) {
            eprint!("{}", stderr);
        }
        process::exit(1);
    }

    Ok(())
}
