use std::time::{Duration, Instant};

use clap::{arg, value_parser, Arg, ArgAction, ArgMatches, Command};
use regex_integrator::{Engine, ExecOptions, MatchResult, Priority, Regex};
use yansi::Color::{Green, Yellow};
use yansi::Paint;

use crate::commands::{
    compile_pattern, exec_options, pattern_args, priority_parser,
};
use crate::config::Config;
use crate::help;

// Number of executions between two checks of the clock.
const BATCH: u64 = 64;

pub fn bench() -> Command {
    pattern_args(
        super::command("bench")
            .about("Measure how fast a pattern runs with different priorities")
            .long_about(help::BENCH_LONG_HELP),
    )
    .arg(
        Arg::new("SUBJECT")
            .required(true)
            .help("Subject to match the pattern against"),
    )
    .arg(
        arg!(-d --"duration" <MILLISECONDS>)
            .help("Time spent measuring each priority")
            .default_value("1000")
            .value_parser(value_parser!(u64).range(1..)),
    )
    .arg(
        arg!(-p --"priority" <ENGINES>)
            .help("Priority to measure, can be used multiple times")
            .long_help(help::PRIORITY_LONG_HELP)
            .value_parser(priority_parser)
            .action(ArgAction::Append),
    )
}

pub fn exec_bench(args: &ArgMatches, config: &Config) -> anyhow::Result<()> {
    let subject = args.get_one::<String>("SUBJECT").unwrap();
    let duration =
        Duration::from_millis(*args.get_one::<u64>("duration").unwrap());

    let priorities: Vec<Priority> = match args.get_many::<Priority>("priority")
    {
        Some(priorities) => priorities.cloned().collect(),
        None => default_priorities(config),
    };

    // The priority stored in the regex is not used, each measurement
    // passes its own.
    let regex = compile_pattern(args, None, config)?;
    let exec_options = exec_options(args);

    let mut reference = None;

    for priority in &priorities {
        let (result, ops) =
            measure(&regex, subject.as_bytes(), exec_options, priority, duration);

        let differs = *reference.get_or_insert(result) != result;

        println!(
            "{:<32} {:>10} ops/s  {}{}",
            priority.to_string(),
            human_units(ops),
            result,
            if differs {
                format!("  {}", "differs".paint(Yellow).bold())
            } else {
                String::new()
            },
        );
    }

    println!("{} {}", "Compiled for:".paint(Green).bold(), compiled_engines(&regex));

    Ok(())
}

/// Executes `regex` repeatedly during `duration` and returns the result
/// and the number of executions per second.
fn measure(
    regex: &Regex,
    subject: &[u8],
    exec_options: ExecOptions,
    priority: &Priority,
    duration: Duration,
) -> (MatchResult, f64) {
    let mut captures = [0; 30];
    let mut count: u64 = 0;
    let mut result = MatchResult::NO_MATCH;

    let start = Instant::now();

    while start.elapsed() < duration {
        for _ in 0..BATCH {
            result = regex.exec(
                subject,
                0,
                exec_options,
                Some(priority),
                Some(&mut captures),
                None,
            );
        }
        count += BATCH;
    }

    (result, count as f64 / start.elapsed().as_secs_f64())
}

fn default_priorities(config: &Config) -> Vec<Priority> {
    let mut priorities = Vec::new();

    for engines in [
        &[Engine::Pcre][..],
        &[Engine::PcreJit],
        &[Engine::Automata, Engine::Pcre],
    ] {
        if let Ok(priority) = Priority::new(engines) {
            priorities.push(priority);
        }
    }

    priorities.push(config.priority.unwrap_or_default());
    priorities
}

fn compiled_engines(regex: &Regex) -> String {
    [Engine::Pcre, Engine::PcreJit, Engine::Automata]
        .into_iter()
        .filter(|engine| regex.is_compiled(*engine))
        .map(|engine| engine.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Formats `value` with a K, M or G suffix.
fn human_units(value: f64) -> String {
    for (unit, scale) in [("G", 1e9), ("M", 1e6), ("K", 1e3)] {
        if value >= scale {
            return format!("{:.2}{}", value / scale, unit);
        }
    }
    format!("{:.2}", value)
}
