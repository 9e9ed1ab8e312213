//! Argument interpolation for command lines
//!
//! A command may say where its arguments go:
//! - `$@` or `${@}` - all arguments, space-joined
//! - `${1}`, `${2}`, ... - a single argument
//! - `${1:-default}`, `${@:-default}` - fallback when the argument is missing or empty
//!
//! Commands without placeholders get their arguments appended. Unbraced `$1`
//! is left for the shell.

use regex::{Captures, Regex};
use std::sync::OnceLock;

fn placeholder() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| {
        Regex::new(r"\$@|\$\{(@|[1-9][0-9]*)(?::-([^}]*))?\}")
            .expect("placeholder pattern is valid")
    })
}

/// Whether `cmd` refers to its arguments explicitly
pub fn has_placeholders(cmd: &str) -> bool {
    placeholder().is_match(cmd)
}

/// Replace argument placeholders in `cmd`
pub fn interpolate_args(cmd: &str, args: &[String]) -> String {
    placeholder()
        .replace_all(cmd, |caps: &Captures| {
            let value = match caps.get(1).map(|m| m.as_str()) {
                None | Some("@") => args.join(" "),
                Some(index) => index
                    .parse::<usize>()
                    .ok()
                    .and_then(|i| args.get(i - 1))
                    .cloned()
                    .unwrap_or_default(),
            };

            if value.is_empty() {
                caps.get(2).map(|m| m.as_str().to_string()).unwrap_or_default()
            } else {
                value
            }
        })
        .into_owned()
}

/// Build the shell command line for `cmd` and its arguments
pub fn command_line(cmd: &str, args: &[String]) -> String {
    if has_placeholders(cmd) {
        interpolate_args(cmd, args)
    } else if args.is_empty() {
        cmd.to_string()
    } else {
        format!("{} {}", cmd, args.join(" "))
    }
}
