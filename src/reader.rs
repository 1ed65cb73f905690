use crate::error::ShellError;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::io::{BufRead, Write};

/// Source of command lines.
///
/// `Ok(None)` means end of input. Any error returned here, including a
/// failure to show the prompt, is fatal.
pub trait LineReader {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>, ShellError>;
}

/// Line editing on a terminal. Nothing is added to the history.
pub struct Interactive {
    editor: DefaultEditor,
}

impl Interactive {
    pub fn new() -> Result<Self, ShellError> {
        let editor = DefaultEditor::new().map_err(|e| ShellError::ReadLine(e.to_string()))?;
        Ok(Interactive { editor })
    }
}

impl LineReader for Interactive {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>, ShellError> {
        match self.editor.readline(prompt) {
            Ok(line) => Ok(Some(line)),
            // Ctrl-C abandons the current line only.
            Err(ReadlineError::Interrupted) => Ok(Some(String::new())),
            Err(ReadlineError::Eof) => Ok(None),
            Err(e) => Err(ShellError::ReadLine(e.to_string())),
        }
    }
}

/// Reads lines from any buffered stream, writing the prompt to `prompt_out`.
pub struct StreamReader<R, W> {
    input: R,
    prompt_out: W,
}

impl<R: BufRead, W: Write> StreamReader<R, W> {
    pub fn new(input: R, prompt_out: W) -> Self {
        StreamReader { input, prompt_out }
    }
}

impl<R: BufRead, W: Write> LineReader for StreamReader<R, W> {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>, ShellError> {
        if !prompt.is_empty() {
            write!(self.prompt_out, "{}", prompt)
                .and_then(|_| self.prompt_out.flush())
                .map_err(|e| ShellError::io("prompt", e))?;
        }

        let mut buf = Vec::new();
        match self.input.read_until(b'\n', &mut buf) {
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(String::from_utf8_lossy(&buf).into_owned())),
            Err(e) => Err(ShellError::ReadLine(e.to_string())),
        }
    }
}
