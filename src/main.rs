#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
//! kpxc-lookup — print KeePassXC credentials for a URL.

mod association;
mod cli;
mod commands;
mod proxy;
mod template;
mod types;

use clap::Parser;
use log::LevelFilter;

use cli::{Cli, OutputCtx, write_error};
use types::ErrorOutput;

/// Exit status for every usage, keyfile, association, or query failure.
const EXIT_FAILURE: i32 = 1;

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            std::process::exit(usage_exit_code(&err));
        }
    };

    init_logging(cli.debug);

    let ctx = OutputCtx::new(cli.json, cli.suppress_newline, cli.debug);

    if let Err(err) = commands::dispatch(&cli, &ctx) {
        log::debug!("lookup failed: {err:?}");
        let error_output = ErrorOutput::from_lookup_error(&err);
        write_error(&error_output, cli.json);
        std::process::exit(EXIT_FAILURE);
    }
}

/// Help and version exit 0; every other parse failure, including the help
/// shown for a bare invocation, exits 1.
fn usage_exit_code(err: &clap::Error) -> i32 {
    if err.use_stderr() { EXIT_FAILURE } else { 0 }
}

/// Build the stderr logger. `--debug` raises the level; `RUST_LOG` still wins.
fn init_logging(debug: bool) {
    let level = if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}
