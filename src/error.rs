use nix::errno::Errno;
use std::io;
use thiserror::Error;

/// Errors surfaced by the interpreter.
///
/// Everything except `ReadLine` is recoverable: the dispatcher prints it and
/// the loop keeps going.
#[derive(Debug, Error)]
pub enum ShellError {
    #[error("{command}: missing argument")]
    MissingArgument { command: &'static str },

    #[error("{command}: no arguments expected")]
    UnexpectedArguments { command: &'static str },

    #[error("{context}: {}", .source.desc())]
    Sys { context: String, source: Errno },

    #[error("{context}: {source}")]
    Io { context: String, source: io::Error },

    #[error("fork: {}", .0.desc())]
    Fork(Errno),

    #[error("{0}: argument contains an interior NUL byte")]
    NulByte(String),

    #[error("read error: {0}")]
    ReadLine(String),
}

impl ShellError {
    pub fn sys(context: impl Into<String>, source: Errno) -> Self {
        ShellError::Sys {
            context: context.into(),
            source,
        }
    }

    /// OS-level I/O failures are reported like `sys` ones, without the
    /// "(os error N)" suffix.
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        match source.raw_os_error() {
            Some(code) => ShellError::sys(context, Errno::from_i32(code)),
            None => ShellError::Io {
                context: context.into(),
                source,
            },
        }
    }
}
