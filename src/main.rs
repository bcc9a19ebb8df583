use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use trygo::Gen;

/// trygo is a translator from TryGo sources into Go sources.
#[derive(Parser, Debug)]
#[command(name = "trygo")]
#[command(about = "Translate TryGo sources into Go sources")]
struct Cli {
    /// Output directory path
    #[arg(short = 'o', value_name = "DIR")]
    outdir: Option<PathBuf>,

    /// Check only; no files are generated
    #[arg(short = 'c', long)]
    check: bool,

    /// Output debug log
    #[arg(long)]
    debug: bool,

    /// Input directories, scanned recursively for .go files. With no
    /// directories given, `GOFILE` enables `go generate` mode on the
    /// working directory.
    dirs: Vec<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.debug {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "trygo=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    if let Err(err) = run(&cli) {
        eprintln!("trygo: error: {err}");
        return ExitCode::from(111);
    }
    ExitCode::SUCCESS
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    if cli.check {
        // Output directory checks are unnecessary in check-only mode.
        let mut gen = Gen::checker(std::io::stdout());
        gen.check(&cli.dirs)?;
        return Ok(());
    }

    let outdir = cli.outdir.clone().unwrap_or_default();
    let mut gen = Gen::new(outdir)?;
    gen.generate(&cli.dirs, true)?;
    Ok(())
}
