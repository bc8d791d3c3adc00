use anyhow::bail;
use clap::{arg, value_parser, Arg, ArgAction, ArgMatches, Command};
use regex_integrator::{Log, MatchResult, Priority};
use yansi::Color::{Green, Red, Yellow};
use yansi::{Paint, Painted};

use crate::commands::{
    compile_pattern, escape, exec_options, pattern_args, priority_parser,
};
use crate::config::Config;
use crate::help;

pub fn matching() -> Command {
    pattern_args(
        super::command("match")
            .about("Match a pattern against one or more subjects")
            .long_about(help::MATCH_LONG_HELP),
    )
    .arg(
        Arg::new("SUBJECT")
            .required(true)
            .help("Subject to match the pattern against")
            .action(ArgAction::Append),
    )
    .arg(
        arg!(-c --"captures" <SIZE>)
            .help("Number of elements in the capture vector")
            .default_value("30")
            .value_parser(value_parser!(usize)),
    )
    .arg(
        arg!(-p --"priority" <ENGINES>)
            .help("Order in which engines are tried")
            .long_help(help::PRIORITY_LONG_HELP)
            .value_parser(priority_parser),
    )
    .arg(
        arg!(-o --"start-offset" <OFFSET>)
            .help("Offset in each subject where the search starts")
            .default_value("0")
            .value_parser(value_parser!(usize)),
    )
}

pub fn exec_match(args: &ArgMatches, config: &Config) -> anyhow::Result<()> {
    let subjects = args.get_many::<String>("SUBJECT").unwrap();
    let capacity = *args.get_one::<usize>("captures").unwrap();
    let start_offset = *args.get_one::<usize>("start-offset").unwrap();

    let priority: Option<&Priority> =
        args.get_one::<Priority>("priority").or(config.priority.as_ref());

    let regex = compile_pattern(args, priority, config)?;
    let exec_options = exec_options(args);

    let mut captures = vec![0; capacity];
    let mut failures = 0;

    for subject in subjects {
        let mut log = Log::new();

        let result = regex.exec(
            subject.as_bytes(),
            start_offset,
            exec_options,
            None,
            Some(&mut captures),
            Some(&mut log),
        );

        println!("{}: {}", subject, paint_result(&result.to_string(), result));

        if result.is_error() {
            failures += 1;
            if let Some(message) = log.message() {
                println!("  {}", message);
            }
            continue;
        }

        let groups = match result.groups() {
            Some(groups) if groups > 0 => groups,
            _ => continue,
        };

        for (i, pair) in captures.chunks(2).take(groups).enumerate() {
            let (start, end) = (pair[0], pair[1]);
            if start < 0 {
                println!("  ${} = {}", i, "unset".paint(Yellow));
            } else {
                let text = &subject.as_bytes()[start as usize..end as usize];
                println!("  ${} = {}..{} \"{}\"", i, start, end, escape(text));
            }
        }
    }

    if failures > 0 {
        bail!("{} of the executions failed", failures);
    }

    Ok(())
}

fn paint_result(text: &str, result: MatchResult) -> Painted<&str> {
    if result.is_match() {
        text.paint(Green).bold()
    } else if result.is_error() {
        text.paint(Red).bold()
    } else {
        text.paint(Yellow)
    }
}
