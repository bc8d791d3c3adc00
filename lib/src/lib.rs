/*! A regular expression integrator that runs each pattern on the engine that
suits it best.

Patterns are compiled for several engines at once: PCRE, PCRE with its JIT
compiler, and a linear-time engine based on finite automata. When a pattern
is executed the engines are tried in the order given by a [`Priority`], and
the result is reported with the same conventions no matter which engine
produced it, so callers written for PCRE keep working unchanged.

By default Automata comes first, as it never backtracks, and PCRE-JIT and
PCRE are used for the patterns Automata can't handle, or when Automata's
result is not enough (for instance, an empty match when empty matches are
not allowed).

# Example

```rust
use regex_integrator::{compile, CompileOption, CompileOptions, ExecOptions};

let re = compile(
    b"(a+)(b+)",
    CompileOptions::none() | CompileOption::Caseless,
    None,
    None,
    None,
)
.unwrap();

let mut captures = [0; 9];
let result = re.exec(b"xAAb", 0, ExecOptions::none(), None, Some(&mut captures), None);

assert_eq!(result.groups(), Some(3));
assert_eq!(&captures[..6], &[1, 4, 1, 3, 3, 4]);
```

Messages describing what happened during compilation or execution can be
obtained by passing a [`Log`] to those functions. Formatted messages are
stored in a buffer private to each thread, [`init`] and [`release`] must be
called at the start and at the end of each thread that uses the crate.
*/

pub use engines::MatchResult;

pub use errors::error_message;
pub use errors::ErrorCode;
pub use errors::SUCCESS;

pub use logging::init;
pub use logging::release;
pub use logging::Log;
pub use logging::LogLevel;
pub use logging::LogSink;

pub use options::CompileOption;
pub use options::CompileOptions;
pub use options::ExecOption;
pub use options::ExecOptions;
pub use options::Params;
pub use options::PcreLimits;

pub use priority::Engine;
pub use priority::Priority;
pub use priority::ENGINE_COUNT;

pub use regex::compile;
pub use regex::Regex;

pub mod compat;
pub mod errors;
pub mod logging;

mod engines;
mod options;
mod priority;
mod regex;

#[cfg(test)]
mod tests;
