//! Task token parsing
//!
//! Turns the flat list of command-line task tokens into a root composite task,
//! one child per task invocation, each carrying its own arguments:
//!
//! ```text
//! ds clean --all -- build test --no-gpu
//! ds echo: "Hello from" -- echo: "the world"
//! ds +lint test
//! ```
//!
//! Parsing is best-effort: misplaced markers never fail, they are kept as
//! literal text. A `:` with no task before it opens an argument region whose
//! first token names the task, so `ds : echo hi` runs `echo hi`.

use crate::runner::Task;

/// Starts a task's arguments (`echo: hi` or `echo : hi`)
pub const ARG_BEG: &str = ":";

/// Ends a task's arguments
pub const ARG_END: &str = "--";

/// A token with this prefix after a task name starts its arguments implicitly
pub const ARG_OPTION: &str = "-";

/// A task reference with this prefix does not halt the run when it fails
pub const SUPPRESS: &str = "+";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// The next plain token names a task
    ExpectingTask,
    /// Tokens belong to the most recent task
    InArguments,
}

/// Parse task tokens into a root composite task
pub fn parse_tokens<S: AsRef<str>>(tokens: &[S]) -> Task {
    let mut root = Task::default();
    let mut state = State::ExpectingTask;
    // A task name has been read and no end marker has been seen since.
    let mut pending = false;
    // A bare `:` opened arguments before any name; the next token names the task.
    let mut unnamed = false;

    for token in tokens.iter().map(AsRef::as_ref) {
        if pending && token == ARG_BEG {
            state = State::InArguments;
            continue;
        }

        if token == ARG_END {
            pending = false;
            unnamed = false;
            state = State::ExpectingTask;
            continue;
        }

        if pending && token.starts_with(ARG_OPTION) {
            state = State::InArguments;
        }

        match state {
            State::InArguments if unnamed => {
                root.depends.push(parse_reference(token));
                unnamed = false;
            }
            State::InArguments => {
                if let Some(task) = root.depends.last_mut() {
                    task.args.push(token.to_string());
                }
            }
            State::ExpectingTask if token == ARG_BEG => {
                unnamed = true;
                state = State::InArguments;
            }
            State::ExpectingTask => {
                let (reference, opens_args) = match token.strip_suffix(ARG_BEG) {
                    Some(name) if !name.is_empty() => (name, true),
                    _ => (token, false),
                };
                root.depends.push(parse_reference(reference));
                pending = true;
                if opens_args {
                    state = State::InArguments;
                }
            }
        }
    }

    root
}

/// Parse a single task reference such as `build`, `+lint` or `'echo "hi there"'`
///
/// A reference containing whitespace is split once: the first word becomes the
/// command and the rest is kept verbatim as one argument.
pub fn parse_reference(reference: &str) -> Task {
    let (suppress, rest) = match reference.strip_prefix(SUPPRESS) {
        Some(rest) if !rest.is_empty() => (true, rest),
        _ => (false, reference),
    };

    let rest = rest.trim();
    let mut task = match rest.split_once(char::is_whitespace) {
        Some((cmd, tail)) => Task::command(cmd).with_args([tail.trim()]),
        None => Task::command(rest),
    };
    task.suppress_failure = suppress;
    task
}

/// Serialize the children of a root task back into task tokens
///
/// Arguments are always wrapped in explicit markers so that
/// `parse_tokens(&to_tokens(root))` rebuilds the same children.
pub fn to_tokens(root: &Task) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut iter = root.depends.iter().peekable();

    while let Some(task) = iter.next() {
        let mut head = String::new();
        if task.suppress_failure {
            head.push_str(SUPPRESS);
        }
        head.push_str(&task.cmd);

        if task.args.is_empty() && task.cmd != ARG_BEG {
            tokens.push(head);
            // The next task would otherwise be read as our argument or marker.
            let ambiguous = iter
                .peek()
                .map(|next| !next.suppress_failure && next.cmd.starts_with(ARG_OPTION))
                .unwrap_or(false);
            if ambiguous {
                tokens.push(ARG_END.to_string());
            }
        } else {
            head.push_str(ARG_BEG);
            tokens.push(head);
            tokens.extend(task.args.iter().cloned());
            tokens.push(ARG_END.to_string());
        }
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(root: &Task) -> Vec<(String, Vec<String>, bool)> {
        root.depends
            .iter()
            .map(|t| (t.cmd.clone(), t.args.clone(), t.suppress_failure))
            .collect()
    }

    fn entry(cmd: &str, args: &[&str], suppress: bool) -> (String, Vec<String>, bool) {
        (
            cmd.to_string(),
            args.iter().map(|a| a.to_string()).collect(),
            suppress,
        )
    }

    #[test]
    fn test_explicit_markers() {
        let root = parse_tokens(&["echo:", "hello", "world", "--", "echo:", "again"]);
        assert_eq!(
            summary(&root),
            vec![
                entry("echo", &["hello", "world"], false),
                entry("echo", &["again"], false),
            ]
        );
    }

    #[test]
    fn test_plain_words_after_end_marker_are_tasks() {
        let root = parse_tokens(&["echo:", "hello", "world", "--", "echo", "again"]);
        assert_eq!(
            summary(&root),
            vec![
                entry("echo", &["hello", "world"], false),
                entry("echo", &[], false),
                entry("again", &[], false),
            ]
        );
    }

    #[test]
    fn test_separate_start_marker() {
        let root = parse_tokens(&["echo", ":", "hi", "--", "ls"]);
        assert_eq!(
            summary(&root),
            vec![entry("echo", &["hi"], false), entry("ls", &[], false)]
        );
    }

    #[test]
    fn test_implicit_argument_start() {
        let root = parse_tokens(&["clean", "--all", "--", "build", "test", "--no-gpu"]);
        assert_eq!(
            summary(&root),
            vec![
                entry("clean", &["--all"], false),
                entry("build", &[], false),
                entry("test", &["--no-gpu"], false),
            ]
        );
    }

    #[test]
    fn test_arguments_run_until_end_of_input() {
        let root = parse_tokens(&["pytest", "-x", "tests", "more"]);
        assert_eq!(
            summary(&root),
            vec![entry("pytest", &["-x", "tests", "more"], false)]
        );
    }

    #[test]
    fn test_suppress_prefix() {
        let root = parse_tokens(&["+lint", "test"]);
        assert_eq!(
            summary(&root),
            vec![entry("lint", &[], true), entry("test", &[], false)]
        );
    }

    #[test]
    fn test_suppress_prefix_with_marker() {
        let root = parse_tokens(&["+lint:", "--fix"]);
        assert_eq!(summary(&root), vec![entry("lint", &["--fix"], true)]);
    }

    #[test]
    fn test_start_marker_inside_arguments_is_consumed() {
        let root = parse_tokens(&["echo:", "a", ":", "b"]);
        assert_eq!(summary(&root), vec![entry("echo", &["a", "b"], false)]);
    }

    #[test]
    fn test_bare_start_marker_opens_unnamed_task() {
        let root = parse_tokens(&[":", "echo", "hi"]);
        assert_eq!(summary(&root), vec![entry("echo", &["hi"], false)]);

        let root = parse_tokens(&[":", "+lint", "--fix", "--", "test"]);
        assert_eq!(
            summary(&root),
            vec![entry("lint", &["--fix"], true), entry("test", &[], false)]
        );

        let root = parse_tokens(&[":", ":", "x"]);
        assert_eq!(summary(&root), vec![entry(":", &["x"], false)]);
    }

    #[test]
    fn test_dangling_start_marker_adds_nothing() {
        let root = parse_tokens(&["echo:", "a", "--", ":"]);
        assert_eq!(summary(&root), vec![entry("echo", &["a"], false)]);

        let root = parse_tokens(&[":", "--", "ls"]);
        assert_eq!(summary(&root), vec![entry("ls", &[], false)]);
    }

    #[test]
    fn test_unmatched_end_marker_is_ignored() {
        let root = parse_tokens(&["--", "ls", "--", "--"]);
        assert_eq!(summary(&root), vec![entry("ls", &[], false)]);
    }

    #[test]
    fn test_lone_suppress_marker_is_literal() {
        let root = parse_tokens(&["+"]);
        assert_eq!(summary(&root), vec![entry("+", &[], false)]);
    }

    #[test]
    fn test_quoted_task_is_split_once() {
        let root = parse_tokens(&["echo \"Hello world\"", "-n"]);
        assert_eq!(
            summary(&root),
            vec![entry("echo", &["\"Hello world\"", "-n"], false)]
        );
    }

    #[test]
    fn test_empty_input() {
        let root = parse_tokens::<&str>(&[]);
        assert!(root.depends.is_empty());
        assert!(root.cmd.is_empty());
    }

    #[test]
    fn test_round_trip() {
        let inputs: Vec<Vec<&str>> = vec![
            vec!["echo:", "hello", "world", "--", "echo", "again"],
            vec!["+lint", "test", "--no-gpu", "--", "build"],
            vec!["clean", "--", "-weird", "x"],
            vec!["echo \"Hello world\"", "--", "ls:", ":", "-la", "--"],
            vec![":", ":", "--", ":", "-x", "--", "ls"],
        ];

        for input in inputs {
            let parsed = parse_tokens(&input);
            let tokens = to_tokens(&parsed);
            let reparsed = parse_tokens(&tokens);
            assert_eq!(
                parsed, reparsed,
                "round trip failed for {:?} via {:?}",
                input, tokens
            );
        }
    }

    #[test]
    fn test_to_tokens_uses_explicit_markers() {
        let root = parse_tokens(&["+lint", "--fix", "--", "test"]);
        assert_eq!(to_tokens(&root), vec!["+lint:", "--fix", "--", "test"]);
    }
}
