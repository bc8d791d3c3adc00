pub const BENCH_LONG_HELP: &str = r#"Measure how fast a pattern runs with different priorities

The pattern is compiled once and executed repeatedly on <SUBJECT> with each
priority, for the given duration. The first priority is used as reference,
priorities that produce a different result are flagged.

If no priority is given, the following ones are measured: pcre, pcre-jit,
automata,pcre and the default priority."#;

pub const CONFIG_FILE: &str = r#"Config file

Specifies a config file which controls the default priority, the log level and
the PCRE match limits. If config file is not specified, ${HOME}/.ri.toml is used.
If it does not exist the default options are applied.

Example:

priority = ["automata", "pcre-jit", "pcre"]
log_level = "warn"
match_limit = 100000
match_limit_recursion = 0"#;

pub const MATCH_LONG_HELP: &str = r#"Match a pattern against one or more subjects

The pattern is compiled once and executed on each <SUBJECT>. For each of them
the result and the captured groups are printed."#;

pub const PRIORITY_LONG_HELP: &str = r#"Order in which engines are tried

A comma-separated list of engines. Valid engines are: pcre, pcre-jit, automata
and auto. Automata can't be the only engine, and auto can't be combined with
other engines.

Examples:

--priority pcre
--priority automata,pcre-jit"#;
