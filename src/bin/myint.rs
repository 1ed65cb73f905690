/*
 * myint.rs - Test helper for the interpreter's launcher
 *
 * usage: myint [n]
 * Sleeps for [n] seconds (default 0), then sends SIGINT to itself.
 * The interpreter should survive and prompt again.
 */

use nix::sys::signal::{self, Signal};
use nix::unistd::getpid;
use std::env;
use std::process;
use std::thread;
use std::time::Duration;

fn main() {
    let secs = match env::args().nth(1) {
        None => 0,
        Some(arg) => arg.parse::<u64>().unwrap_or_else(|_| {
            eprintln!("myint: <n> must be a non-negative integer");
            process::exit(2);
        }),
    };
    thread::sleep(Duration::from_secs(secs));

    if let Err(err) = signal::kill(getpid(), Signal::SIGINT) {
        eprintln!("myint: kill: {}", err);
        process::exit(1);
    }

    // Only reached if SIGINT is ignored.
    thread::sleep(Duration::from_secs(1));
    process::exit(0);
}
