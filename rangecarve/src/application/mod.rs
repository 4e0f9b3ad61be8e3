pub mod handlers;

use crate::presentation::cli::Cli;
use clap::{CommandFactory, Parser};
use rangecarve_core::error::Result;

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let Some(capture) = cli.capture.clone() else {
        // no capture given: usage only, not an error
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };
    let opts = handlers::options_from_cli(&cli);
    handlers::handle_carve(capture, &opts, cli.summary_json)
}
