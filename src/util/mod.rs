#![allow(clippy::module_name_repetitions)]
//! Shell quoting for command previews, shell-word tokenization, path lists.

pub mod exec;

use std::path::PathBuf;

pub use exec::{ExecOutput, ExecRequest, ExecService};

pub fn shell_join(args: &[String]) -> String {
    args.iter()
        .map(|a| shell_escape(a))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn shell_escape(s: &str) -> String {
    if s.is_empty() {
        "''".to_string()
    } else if s
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "-_=./:@".contains(c))
    {
        s.to_string()
    } else {
        let escaped = s.replace('\'', "'\"'\"'");
        format!("'{}'", escaped)
    }
}

/// Shell-word tokenizer: whitespace separates words, single and double quotes
/// group, backslash escapes the next character outside single quotes.
///
/// Nothing is evaluated: `|`, `>`, `*` and `$VAR` stay literal characters.
/// An empty quoted pair (`''`) yields an empty word.
pub fn shell_like_split_args(s: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut in_single = false;
    let mut in_double = false;
    let mut chars = s.chars();

    while let Some(ch) = chars.next() {
        match ch {
            '\'' if !in_double => {
                in_single = !in_single;
                in_word = true;
            }
            '"' if !in_single => {
                in_double = !in_double;
                in_word = true;
            }
            '\\' if !in_single => {
                if let Some(next) = chars.next() {
                    // Inside double quotes only a few characters are escapable.
                    if in_double && !matches!(next, '"' | '\\' | '$' | '`') {
                        current.push('\\');
                    }
                    current.push(next);
                } else {
                    current.push('\\');
                }
                in_word = true;
            }
            c if c.is_whitespace() && !in_single && !in_double => {
                if in_word {
                    out.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            c => {
                current.push(c);
                in_word = true;
            }
        }
    }
    if in_word {
        out.push(current);
    }
    out
}

/// Split a `:`-separated path list, dropping empty segments.
pub fn split_paths_env(v: &str) -> Vec<PathBuf> {
    v.split(':')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .collect()
}
