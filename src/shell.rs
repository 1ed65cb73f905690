use crate::builtins;
use crate::error::ShellError;
use crate::exec::{launch, reap_stopped};
use crate::parser::tokenize;
use crate::reader::LineReader;
use log::debug;
use std::io::{self, Write};

/// Global prompt string.
pub static PROMPT: &str = "> ";

/// Prefix for every message the interpreter prints on stderr.
pub static PROG: &str = "smartshell";

/// What the loop does after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Continue,
    Terminate,
}

/// The read-tokenize-dispatch loop.
pub struct Shell<R, O, E> {
    reader: R,
    out: O,
    err: E,
    emit_prompt: bool,
}

impl<R: LineReader, O: Write, E: Write> Shell<R, O, E> {
    pub fn new(reader: R, out: O, err: E, emit_prompt: bool) -> Self {
        Shell {
            reader,
            out,
            err,
            emit_prompt,
        }
    }

    /// Runs until `exit` or end of input. Only fatal errors are returned.
    pub fn run(&mut self) -> Result<(), ShellError> {
        let prompt = if self.emit_prompt { PROMPT } else { "" };
        loop {
            reap_stopped();
            let line = match self.reader.read_line(prompt)? {
                Some(line) => line,
                None => return Ok(()),
            };
            debug!("received command: {}", line.trim_end());

            let tokens = tokenize(&line);
            if dispatch(&tokens, &mut self.out, &mut self.err) == Status::Terminate {
                return Ok(());
            }
        }
    }
}

/// Runs one tokenized command: a builtin if the first token names one,
/// otherwise an external program. Errors are reported on `err` and never stop
/// the loop.
pub fn dispatch(tokens: &[String], out: &mut dyn Write, err: &mut dyn Write) -> Status {
    let name = match tokens.first() {
        Some(name) => name,
        None => return Status::Continue,
    };

    let result = match builtins::lookup(name) {
        Some(builtin) => {
            debug!("builtin: {}", builtin.name);
            (builtin.run)(tokens, out)
        }
        None => {
            debug!("external: {:?}", tokens);
            // The child shares our stdout; anything buffered goes first.
            let _ = out.flush();
            launch(tokens, err)
        }
    };

    match result {
        Ok(status) => status,
        Err(e) => {
            let _ = writeln!(err, "{}: {}", PROG, e);
            Status::Continue
        }
    }
}

/// Runs the interpreter on the process's stdout and stderr.
pub fn run_shell<R: LineReader>(reader: R, emit_prompt: bool) -> Result<(), ShellError> {
    Shell::new(reader, io::stdout(), io::stderr(), emit_prompt).run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::StreamReader;
    use std::io::Cursor;

    fn tokens(words: &[&str]) -> Vec<String> {
        words.iter().map(|word| word.to_string()).collect()
    }

    fn run_script(script: &str, emit_prompt: bool) -> (Result<(), ShellError>, String, String) {
        let mut prompts = Vec::new();
        let mut out = Vec::new();
        let mut err = Vec::new();
        let result = {
            let reader = StreamReader::new(Cursor::new(script.to_string()), &mut prompts);
            Shell::new(reader, &mut out, &mut err, emit_prompt).run()
        };
        let mut stdout = String::from_utf8(prompts).unwrap();
        stdout.push_str(&String::from_utf8(out).unwrap());
        (result, stdout, String::from_utf8(err).unwrap())
    }

    #[test]
    fn test_dispatch_empty_is_noop() {
        let mut out = Vec::new();
        let mut err = Vec::new();
        assert_eq!(dispatch(&[], &mut out, &mut err), Status::Continue);
        assert!(out.is_empty());
        assert!(err.is_empty());
    }

    #[test]
    fn test_dispatch_reports_builtin_errors() {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let status = dispatch(&tokens(&["rmdir"]), &mut out, &mut err);
        assert_eq!(status, Status::Continue);
        assert_eq!(String::from_utf8(err).unwrap(), "smartshell: rmdir: missing argument\n");
    }

    #[test]
    fn test_dispatch_exit_terminates() {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let status = dispatch(&tokens(&["exit", "1", "2"]), &mut out, &mut err);
        assert_eq!(status, Status::Terminate);
    }

    #[test]
    fn test_dispatch_is_case_sensitive() {
        let mut out = Vec::new();
        let mut err = Vec::new();
        // "EXIT" is not a builtin, so it is launched (and fails) instead.
        let status = dispatch(&tokens(&["EXIT"]), &mut out, &mut err);
        assert_eq!(status, Status::Continue);
    }

    #[test]
    fn test_empty_input_exits_cleanly() {
        let (result, stdout, stderr) = run_script("", false);
        assert!(result.is_ok());
        assert!(stdout.is_empty());
        assert!(stderr.is_empty());
    }

    #[test]
    fn test_prompt_is_printed_per_line() {
        let (result, stdout, _) = run_script("\n\n", true);
        assert!(result.is_ok());
        assert_eq!(stdout, "> > > ");
    }

    #[test]
    fn test_delimiter_lines_are_noops() {
        let (result, stdout, stderr) = run_script(" \t\x07\r\n\n   \n", false);
        assert!(result.is_ok());
        assert!(stdout.is_empty());
        assert!(stderr.is_empty());
    }

    #[test]
    fn test_exit_stops_reading() {
        let (result, stdout, stderr) = run_script("exit please\nhelp\n", false);
        assert!(result.is_ok());
        assert!(stdout.is_empty());
        assert!(stderr.is_empty());
    }

    #[test]
    fn test_errors_do_not_stop_the_loop() {
        let (result, stdout, stderr) = run_script("cd\nls -a\nhelp\n", false);
        assert!(result.is_ok());
        assert_eq!(
            stderr,
            "smartshell: cd: missing argument\nsmartshell: ls: no arguments expected\n"
        );
        assert!(stdout.starts_with("SmartShell\n"));
    }
}
