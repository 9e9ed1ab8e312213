//! Global command-line options
//!
//! Every option is declared once in [`OPTIONS`]. The table drives both the clap
//! command (help text, parsing) and the copy of the parsed values into [`Args`].

use crate::runner::EnvMap;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Where a parsed option is stored in [`Args`]
#[derive(Clone, Copy)]
pub enum Target {
    /// A switch
    Flag(fn(&mut Args) -> &mut bool),
    /// A single path
    Path(fn(&mut Args) -> &mut Option<PathBuf>),
    /// A repeatable string
    List(fn(&mut Args) -> &mut Vec<String>),
    /// A repeatable `NAME=VALUE` pair
    Assign(fn(&mut Args) -> &mut EnvMap),
}

/// One global option
pub struct OptionSpec {
    pub long: &'static str,
    pub short: Option<char>,
    pub value_name: &'static str,
    pub help: &'static str,
    pub target: Target,
}

/// Shorthand for `--workspace '*'`
pub const ALL_WORKSPACES: &str = "-w*";

/// Global options, in help order
pub static OPTIONS: &[OptionSpec] = &[
    OptionSpec {
        long: "debug",
        short: None,
        value_name: "",
        help: "Show debug messages",
        target: Target::Flag(|args| &mut args.debug),
    },
    OptionSpec {
        long: "dry-run",
        short: None,
        value_name: "",
        help: "Show which tasks would be run, but don't actually run them",
        target: Target::Flag(|args| &mut args.dry_run),
    },
    OptionSpec {
        long: "no-config",
        short: None,
        value_name: "",
        help: "Do not search for or load a configuration file (supersedes --file)",
        target: Target::Flag(|args| &mut args.no_config),
    },
    OptionSpec {
        long: "no-project",
        short: None,
        value_name: "",
        help: "Do not add project tool directories (.venv, node_modules) to PATH",
        target: Target::Flag(|args| &mut args.no_project),
    },
    OptionSpec {
        long: "list",
        short: Some('l'),
        value_name: "",
        help: "List available tasks and exit",
        target: Target::Flag(|args| &mut args.list),
    },
    OptionSpec {
        long: "cwd",
        short: None,
        value_name: "PATH",
        help: "Set the starting working directory (default: --file parent)",
        target: Target::Path(|args| &mut args.cwd),
    },
    OptionSpec {
        long: "file",
        short: Some('f'),
        value_name: "PATH",
        help: "File with task and workspace definitions (default: search in parents)",
        target: Target::Path(|args| &mut args.file),
    },
    OptionSpec {
        long: "env-file",
        short: None,
        value_name: "PATH",
        help: "File with environment variables, read before --env values are applied",
        target: Target::Path(|args| &mut args.env_file),
    },
    OptionSpec {
        long: "env",
        short: Some('e'),
        value_name: "NAME=VALUE",
        help: "Set an environment variable (supersedes --env-file)",
        target: Target::Assign(|args| &mut args.env),
    },
    OptionSpec {
        long: "workspace",
        short: Some('w'),
        value_name: "GLOB",
        help: "Run tasks in the matching workspaces ('*' matches all of them)",
        target: Target::List(|args| &mut args.workspace),
    },
    OptionSpec {
        long: "pre",
        short: None,
        value_name: "",
        help: "Also run pre<task> before each named task",
        target: Target::Flag(|args| &mut args.pre),
    },
    OptionSpec {
        long: "post",
        short: None,
        value_name: "",
        help: "Also run post<task> after each named task",
        target: Target::Flag(|args| &mut args.post),
    },
    OptionSpec {
        long: "parallel",
        short: None,
        value_name: "",
        help: "Run top-level tasks in parallel",
        target: Target::Flag(|args| &mut args.parallel),
    },
    OptionSpec {
        long: "sync-git-hooks",
        short: None,
        value_name: "",
        help: "Install tasks named git-hook-<hook> as git hooks",
        target: Target::Flag(|args| &mut args.sync_git_hooks),
    },
];

const TASK_HELP: &str = "\
Tasks:
  Pass arguments by quoting the task or by using ':' and '--':
    ds 'echo \"Hello world\"'
    ds echo: \"Hello from\" -- echo: \"the world\"

  If the first argument starts with '-', the ':' may be omitted. The final
  '--' may always be omitted.

  Tasks run in order. A failing task stops the run unless it is prefixed
  with '+':
    ds +lint test";

/// Parsed global options and task tokens
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Args {
    pub debug: bool,
    pub dry_run: bool,
    pub no_config: bool,
    pub no_project: bool,
    pub list: bool,
    pub cwd: Option<PathBuf>,
    pub file: Option<PathBuf>,
    pub env_file: Option<PathBuf>,
    pub env: EnvMap,
    pub workspace: Vec<String>,
    pub pre: bool,
    pub post: bool,
    pub parallel: bool,
    pub sync_git_hooks: bool,

    /// Task tokens, verbatim
    pub task: Vec<String>,
}

impl Args {
    /// Parse the process arguments, exiting on `--help`, `--version` or errors
    pub fn parse() -> Self {
        let argv = expand_shorthand(std::env::args_os());
        Args::from_matches(&build_command().get_matches_from(argv))
    }

    /// Parse `argv` (including the program name)
    pub fn try_parse_from<I, T>(argv: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let argv = expand_shorthand(argv);
        Ok(Args::from_matches(&build_command().try_get_matches_from(argv)?))
    }

    pub fn from_matches(matches: &ArgMatches) -> Self {
        let mut args = Args::default();
        for spec in OPTIONS {
            apply(spec, matches, &mut args);
        }
        args.task = matches
            .get_many::<String>("task")
            .map(|values| values.cloned().collect())
            .unwrap_or_default();
        args
    }

    /// Serialize back into command-line arguments (without the program name)
    pub fn as_argv(&self) -> Vec<String> {
        let mut copy = self.clone();
        let mut argv = Vec::new();

        for spec in OPTIONS {
            let flag = format!("--{}", spec.long);
            match spec.target {
                Target::Flag(field) => {
                    if *field(&mut copy) {
                        argv.push(flag);
                    }
                }
                Target::Path(field) => {
                    if let Some(path) = field(&mut copy) {
                        argv.push(flag);
                        argv.push(path.display().to_string());
                    }
                }
                Target::List(field) => {
                    for value in field(&mut copy).iter() {
                        argv.push(flag.clone());
                        argv.push(value.clone());
                    }
                }
                Target::Assign(field) => {
                    for (name, value) in field(&mut copy).iter() {
                        argv.push(flag.clone());
                        argv.push(format!("{}={}", name, value));
                    }
                }
            }
        }

        if self.task.first().is_some_and(|token| token.starts_with('-')) {
            argv.push("--".to_string());
        }
        argv.extend(self.task.iter().cloned());
        argv
    }

    /// Make relative path options absolute against `base`
    pub fn resolve_paths(&mut self, base: &Path) {
        for spec in OPTIONS {
            if let Target::Path(field) = spec.target {
                if let Some(path) = field(self) {
                    if path.is_relative() {
                        *path = base.join(&*path);
                    }
                }
            }
        }
    }
}

/// Build the clap command from the option table
pub fn build_command() -> Command {
    let mut command = Command::new("ds")
        .version(crate::VERSION)
        .about("Run dev scripts")
        .after_help(TASK_HELP);

    for spec in OPTIONS {
        let mut arg = Arg::new(spec.long).long(spec.long).help(spec.help);
        if let Some(short) = spec.short {
            arg = arg.short(short);
        }

        arg = match spec.target {
            Target::Flag(_) => arg.action(ArgAction::SetTrue),
            Target::Path(_) => arg
                .value_name(spec.value_name)
                .value_parser(value_parser!(PathBuf)),
            Target::List(_) => arg.value_name(spec.value_name).action(ArgAction::Append),
            Target::Assign(_) => arg
                .value_name(spec.value_name)
                .action(ArgAction::Append)
                .value_parser(parse_assignment),
        };
        command = command.arg(arg);
    }

    command.arg(
        Arg::new("task")
            .value_name("TASK")
            .help("One or more tasks to run, each with its own arguments")
            .num_args(0..)
            .trailing_var_arg(true)
            .allow_hyphen_values(true),
    )
}

/// Rewrite `-w*` into `-w '*'` among the leading options
///
/// Scanning stops at the first task token so task arguments are never touched.
fn expand_shorthand<I, T>(argv: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let mut iter = argv.into_iter().map(Into::into);
    let mut expanded: Vec<OsString> = iter.next().into_iter().collect();

    while let Some(token) = iter.next() {
        let Some(text) = token.to_str() else {
            expanded.push(token);
            break;
        };

        if text == ALL_WORKSPACES {
            expanded.push("-w".into());
            expanded.push("*".into());
            continue;
        }
        if text == "--" || !text.starts_with('-') {
            expanded.push(token);
            break;
        }

        let takes_value = OPTIONS.iter().any(|spec| {
            !matches!(spec.target, Target::Flag(_))
                && (text == format!("--{}", spec.long)
                    || spec.short.is_some_and(|short| text == format!("-{}", short)))
        });
        expanded.push(token);
        if takes_value {
            expanded.extend(iter.next());
        }
    }

    expanded.extend(iter);
    expanded
}

fn apply(spec: &OptionSpec, matches: &ArgMatches, args: &mut Args) {
    match spec.target {
        Target::Flag(field) => *field(args) = matches.get_flag(spec.long),
        Target::Path(field) => *field(args) = matches.get_one::<PathBuf>(spec.long).cloned(),
        Target::List(field) => field(args).extend(
            matches
                .get_many::<String>(spec.long)
                .into_iter()
                .flatten()
                .cloned(),
        ),
        Target::Assign(field) => field(args).extend(
            matches
                .get_many::<(String, String)>(spec.long)
                .into_iter()
                .flatten()
                .cloned(),
        ),
    }
}

/// Parse `NAME=VALUE`
fn parse_assignment(value: &str) -> Result<(String, String), String> {
    match value.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(format!("expected NAME=VALUE, got '{}'", value)),
    }
}
