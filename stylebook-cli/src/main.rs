//! Stylebook CLI - manage a style library and select diverse exemplars.

use clap::Parser;
use stylebook_cli::{Args, run};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("stylebook=debug,stylebook_cli=debug")
    } else {
        EnvFilter::new("stylebook=warn,stylebook_cli=info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let mut stdout = std::io::stdout().lock();
    run(&args, &mut stdout).await
}
