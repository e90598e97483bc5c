//! gainscope command line driver.
//!
//! ```text
//! gainscope run data.csv --nodes 23,50,50,2 --activations tanh,tanh,none \
//!     --epochs 10000 --batch-size 200 --eta0 0.01 --n-print 100 --plots --out-dir out
//! gainscope evaluate out/predictions.csv --window 50 --prefix eval_
//! ```
//!
//! Log verbosity follows `RUST_LOG` (default `info`).

mod cli;
mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match cli.command {
        Commands::Run(args) => commands::run(args),
        Commands::Evaluate(args) => commands::evaluate(args),
    }
}
