//! tscp CLI - copy non-TypeScript files to your outDir
//!
//! Usage: tscp [OPTIONS] [PROJECT]...
//!
//!   -w, --watch     Keep the output in sync after the first copy
//!   -b, --build     Copy every referenced project
//!   -p, --project   Configuration file or directory (default: tsconfig.json)

mod cli;
mod commands;
mod logging;
mod ui;

use clap::Parser;

use crate::cli::{Cli, Mode};

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let json = cli.json;
    let result = match cli.mode() {
        Mode::Copy => commands::copy::cmd_copy(&cli),
        Mode::Watch => commands::watch::cmd_watch(&cli),
    };

    if let Err(err) = result {
        ui::error::print_error(&err, json);
        std::process::exit(1);
    }
}
