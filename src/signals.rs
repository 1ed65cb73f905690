use crate::error::ShellError;
use log::debug;
use signal_hook::{consts::signal::SIGINT, iterator::Signals};
use std::thread;

/// Keeps SIGINT (Ctrl-C) from killing the interpreter.
///
/// The handler is reset to the default in every exec'd child, so the
/// foreground program is still interrupted as usual.
pub fn install_signal_handlers() -> Result<(), ShellError> {
    let mut signals = Signals::new([SIGINT]).map_err(|e| ShellError::io("signals", e))?;
    thread::spawn(move || {
        for signal in signals.forever() {
            debug!("received signal {}", signal);
        }
    });
    Ok(())
}
