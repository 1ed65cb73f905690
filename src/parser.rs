/// Initial capacity of the token buffer.
pub const TOKEN_BUFSIZE: usize = 64;

/// Characters that separate tokens: space, tab, carriage return, newline, bell.
pub const DELIMITERS: [char; 5] = [' ', '\t', '\r', '\n', '\x07'];

/// Splits a command line into owned tokens.
///
/// There is no quoting or escaping, so a delimiter can never be part of a
/// token. Runs of delimiters produce no empty tokens.
pub fn tokenize(line: &str) -> Vec<String> {
    let mut tokens = Vec::with_capacity(TOKEN_BUFSIZE);
    tokens.extend(
        line.split(|c: char| DELIMITERS.contains(&c))
            .filter(|token| !token.is_empty())
            .map(str::to_string),
    );
    tokens
}
