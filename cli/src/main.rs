mod commands;
mod config;
mod help;

#[cfg(test)]
mod tests;

use std::path::PathBuf;
use std::{io, panic, process};

use config::{load_config_from_file, Config};
use crossterm::tty::IsTty;
use regex_integrator::LogSink;
use yansi::Color::Red;
use yansi::Paint;

use crate::commands::cli;

const APP_HELP_TEMPLATE: &str = r#"regex-integrator {version}, runs each pattern on the engine that suits it.

{author-with-newline}
{before-help}{usage-heading}
  {usage}

{all-args}{after-help}
"#;

const EXIT_ERROR: i32 = 1;
const CONFIG_FILE: &str = ".ri.toml";

fn main() -> anyhow::Result<()> {
    // Enable support for ANSI escape codes in Windows. In other platforms
    // this is a no-op.
    if let Err(err) = enable_ansi_support::enable_ansi_support() {
        println!("could not enable ANSI support: {}", err)
    }

    #[cfg(feature = "logging")]
    env_logger::init();

    // Don't write escape codes when the output is redirected.
    if !io::stdout().is_tty() {
        yansi::disable();
    }

    let args = cli().get_matches();

    let orig_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        orig_hook(panic_info);
        process::exit(EXIT_ERROR);
    }));

    // A config file passed explicitly must be valid, the one in the home
    // directory is ignored when it can't be loaded.
    let config = match args.get_one::<PathBuf>("config") {
        Some(path) => load_config_from_file(path),
        None => Ok(match home::home_dir() {
            Some(home_path) if !home_path.as_os_str().is_empty() => {
                load_config_from_file(&home_path.join(CONFIG_FILE))
                    .unwrap_or_default()
            }
            _ => Config::default(),
        }),
    };

    let result = config.map_err(anyhow::Error::from).and_then(|config| {
        LogSink::global().set_level(config.log_level);
        match args.subcommand() {
            Some(("match", args)) => commands::exec_match(args, &config),
            Some(("bench", args)) => commands::exec_bench(args, &config),
            _ => unreachable!(),
        }
    });

    if let Err(err) = result {
        if let Some(source) = err.source() {
            eprintln!("{} {}: {}", "error:".paint(Red).bold(), err, source);
        } else {
            eprintln!("{} {}", "error:".paint(Red).bold(), err);
        }
        process::exit(EXIT_ERROR);
    }

    Ok(())
}
