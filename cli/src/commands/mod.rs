mod bench;
mod matching;

pub use bench::*;
pub use matching::*;

use std::path::PathBuf;

use anyhow::{anyhow, bail};
use clap::{arg, command, crate_authors, Arg, ArgMatches, Command};
use regex_integrator::{
    compile, error_message, CompileOption, CompileOptions, ExecOption,
    ExecOptions, Log, Priority, Regex, SUCCESS,
};

use crate::config::Config;
use crate::{commands, help, APP_HELP_TEMPLATE};

pub fn command(name: &'static str) -> Command {
    Command::new(name).help_template(
        r#"{about-with-newline}
{usage-heading}
  {usage}

{all-args}
"#,
    )
}

pub fn cli() -> Command {
    command!()
        .author(crate_authors!("\n")) // requires `cargo` feature
        .arg_required_else_help(true)
        .arg(
            arg!(-C --config <CONFIG_FILE> "Config file")
                .value_parser(existing_path_parser)
                .long_help(help::CONFIG_FILE),
        )
        .help_template(APP_HELP_TEMPLATE)
        .subcommand_required(true)
        .subcommands(vec![commands::matching(), commands::bench()])
}

/// Arguments shared by the commands that compile a pattern. Keep them sorted
/// alphabetically by their long name.
fn pattern_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("PATTERN")
            .required(true)
            .help("Regular expression"),
    )
    .arg(arg!(-i --"caseless").help("Case-insensitive matching"))
    .arg(
        arg!(-E --"dollar-end-only")
            .help("Make `$` match only at the very end of the subject"),
    )
    .arg(arg!(-s --"dotall").help("Make `.` match newlines too"))
    .arg(
        arg!(-m --"multiline")
            .help("Make `^` and `$` match at the start and end of each line"),
    )
    .arg(arg!(--"not-empty").help("Don't accept empty matches"))
}

/// Parses a priority like `automata,pcre-jit`.
fn priority_parser(input: &str) -> Result<Priority, anyhow::Error> {
    input.parse::<Priority>().map_err(|err| anyhow!(err))
}

/// Parses a path and makes sure that it exists.
fn existing_path_parser(input: &str) -> Result<PathBuf, anyhow::Error> {
    let path = PathBuf::from(input);
    if path.try_exists()? {
        Ok(path)
    } else {
        Err(anyhow!("file not found"))
    }
}

fn compile_options(args: &ArgMatches) -> CompileOptions {
    let mut options = CompileOptions::none();
    for (flag, option) in [
        ("caseless", CompileOption::Caseless),
        ("multiline", CompileOption::Multiline),
        ("dotall", CompileOption::Dotall),
        ("dollar-end-only", CompileOption::DollarEndOnly),
    ] {
        if args.get_flag(flag) {
            options.set(option);
        }
    }
    options
}

fn exec_options(args: &ArgMatches) -> ExecOptions {
    let mut options = ExecOptions::none();
    if args.get_flag("not-empty") {
        options.set(ExecOption::NotEmpty);
    }
    options
}

/// Compiles the pattern in `args` with the options in `args` and the
/// parameters in `config`.
///
/// Messages other than the success message are printed to stderr.
pub fn compile_pattern(
    args: &ArgMatches,
    priority: Option<&Priority>,
    config: &Config,
) -> Result<Regex, anyhow::Error> {
    let pattern = args.get_one::<String>("PATTERN").unwrap();
    let mut log = Log::new();

    let result = compile(
        pattern.as_bytes(),
        compile_options(args),
        priority,
        Some(&config.params()),
        Some(&mut log),
    );

    let message = log.message();

    match result {
        Ok(regex) => {
            match message {
                Some(message) if message != error_message(SUCCESS) => {
                    eprintln!("{}", message)
                }
                _ => {}
            }
            Ok(regex)
        }
        Err(err) => match message {
            Some(message) => bail!("can not compile `{}`: {}", pattern, message),
            None => bail!("can not compile `{}`: {}", pattern, err),
        },
    }
}

/// Escapes non-printable bytes in `bytes` the way Rust escapes byte strings.
fn escape(bytes: &[u8]) -> String {
    bytes.escape_ascii().to_string()
}
