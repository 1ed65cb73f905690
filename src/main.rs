mod builtins;
mod error;
mod exec;
mod parser;
mod reader;
mod shell;
mod signals;
mod utils;

use crate::reader::{Interactive, StreamReader};
use crate::shell::{run_shell, PROG};
use log::warn;
use std::io::{self, IsTerminal};
use std::process;

fn main() {
    // Parse command-line arguments.
    let options: utils::Options = argh::from_env();
    utils::init_logging(options.verbose);

    // Install signal handlers.
    if let Err(e) = signals::install_signal_handlers() {
        warn!("{}", e);
    }

    // Run the main shell loop, with line editing only on a terminal.
    let emit_prompt = !options.no_prompt;
    let result = if io::stdin().is_terminal() {
        Interactive::new().and_then(|reader| run_shell(reader, emit_prompt))
    } else {
        run_shell(StreamReader::new(io::stdin().lock(), io::stdout()), emit_prompt)
    };

    if let Err(e) = result {
        eprintln!("{}: {}", PROG, e);
        process::exit(1);
    }
}
