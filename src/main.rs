//! checklist - a terminal to-do list
//!
//! Add tasks, tick them off and clear the finished ones, with every change
//! written through to local storage.

use checklist::cli::Cli;
use checklist::output::{emit_error, infer_command_name_from_args};
use clap::Parser;

fn main() {
    let command = infer_command_name_from_args();
    let cli = Cli::parse();
    let json = cli.json;
    if let Err(err) = cli.run() {
        let _ = emit_error(&command, &err, json);
        std::process::exit(err.exit_code());
    }
}
