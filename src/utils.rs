use argh::FromArgs;
use env_logger::Env;

/// A minimal interactive command interpreter.
#[derive(FromArgs, Debug)]
pub struct Options {
    /// enable verbose (debug) logging on stderr
    #[argh(switch, short = 'v')]
    pub verbose: bool,

    /// do not print a command prompt
    #[argh(switch, short = 'p')]
    pub no_prompt: bool,
}

/// Sets up stderr logging. `RUST_LOG` wins over `-v`.
pub fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}
