/*
 * mystop.rs - Test helper for the interpreter's launcher
 *
 * usage: mystop
 * Prints its pid on stdout, then sends SIGSTOP to itself (not its
 * process group). Whoever started it is responsible for killing it.
 */

use nix::sys::signal::{self, Signal};
use nix::unistd::getpid;
use std::io::{self, Write};
use std::process;

fn main() {
    let pid = getpid();
    println!("{}", pid);
    let _ = io::stdout().flush();

    if let Err(err) = signal::kill(pid, Signal::SIGSTOP) {
        eprintln!("mystop: kill: {}", err);
        process::exit(1);
    }

    process::exit(0);
}
