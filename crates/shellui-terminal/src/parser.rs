//! Command line parser.
//!
//! A line is split into tokens, where a token is a single-quoted run, a
//! double-quoted run, or a maximal run of non-whitespace characters. The
//! first token names the command. Remaining tokens are positional values,
//! `-x` / `--name` flag markers, or the value following a flag marker.
//!
//! There is no escaping, expansion, piping or redirection.

use std::collections::HashMap;

/// Result of parsing one input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    command_name: String,
    positional_args: Vec<String>,
    named_options: HashMap<String, String>,
}

impl ParsedCommand {
    /// The first token of the line, quote-stripped.
    pub fn command_name(&self) -> &str {
        &self.command_name
    }

    /// Values not attached to a flag, in input order.
    pub fn positional_args(&self) -> &[String] {
        &self.positional_args
    }

    /// Flag name to value.
    pub fn named_options(&self) -> &HashMap<String, String> {
        &self.named_options
    }

    pub fn named_option(&self, name: &str) -> Option<&str> {
        self.named_options.get(name).map(String::as_str)
    }
}

/// Parse a line. Returns `None` for an empty or all-whitespace line.
///
/// A flag marker with no value before the next flag or the end of the line
/// is dropped without error.
pub fn parse(line: &str) -> Option<ParsedCommand> {
    let mut tokens = split_tokens(line).into_iter();
    let command_name = strip_quotes(tokens.next()?).to_string();

    let mut positional_args = Vec::new();
    let mut named_options = HashMap::new();
    let mut pending_flag: Option<&str> = None;

    for token in tokens {
        if let Some(flag) = flag_name(token) {
            if let Some(dropped) = pending_flag.replace(flag) {
                log::debug!("flag '{dropped}' has no value; dropped");
            }
        } else if let Some(flag) = pending_flag.take() {
            named_options.insert(flag.to_string(), strip_quotes(token).to_string());
        } else {
            positional_args.push(strip_quotes(token).to_string());
        }
    }
    if let Some(dropped) = pending_flag {
        log::debug!("flag '{dropped}' has no value; dropped");
    }

    Some(ParsedCommand {
        command_name,
        positional_args,
        named_options,
    })
}

/// `--name` -> `name`, `-x` -> `x`, anything else -> `None`.
fn flag_name(token: &str) -> Option<&str> {
    token
        .strip_prefix("--")
        .or_else(|| token.strip_prefix('-'))
}

/// Split a line into raw (still quoted) tokens.
///
/// A quote character opens a quoted token only if a matching closing quote
/// follows; otherwise the quote is an ordinary character.
pub fn split_tokens(line: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut rest = line;
    loop {
        rest = rest.trim_start();
        let Some(first) = rest.chars().next() else {
            break;
        };
        let quoted_len = if first == '\'' || first == '"' {
            rest[1..].find(first).map(|close| close + 2)
        } else {
            None
        };
        let len = quoted_len
            .unwrap_or_else(|| rest.find(char::is_whitespace).unwrap_or(rest.len()));
        tokens.push(&rest[..len]);
        rest = &rest[len..];
    }
    tokens
}

/// Remove one pair of wrapping quotes when the first and last characters
/// are the same quote character. Anything else is returned unchanged.
pub fn strip_quotes(token: &str) -> &str {
    let bytes = token.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if first == last && (first == b'\'' || first == b'"') {
            return &token[1..token.len() - 1];
        }
    }
    token
}
