/*! Engine priorities.

A [`Priority`] is the ordered list of engines tried when a pattern is
executed. Priorities supplied by users are validated before they are used,
and invalid ones are rejected, never corrected.
*/

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ErrorCode;
use crate::logging::{fill, Log, LogLevel};
use crate::options::{CompileOptions, ExecOptions};

#[cfg(test)]
mod tests;

/// Maximum number of entries in a priority, `Auto` included.
pub const ENGINE_COUNT: usize = 4;

/// A regular expression engine.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Engine {
    /// The PCRE backtracking engine.
    Pcre,
    /// The PCRE backtracking engine with its JIT-compiled matcher.
    PcreJit,
    /// The linear-time automata engine.
    Automata,
    /// Placeholder for an order chosen by profiling the pattern.
    Auto,
}

impl Engine {
    /// Returns true for the engines of the PCRE family.
    #[inline]
    pub fn is_backtracking(&self) -> bool {
        matches!(self, Engine::Pcre | Engine::PcreJit)
    }

    fn name(&self) -> &'static str {
        match self {
            Engine::Pcre => "pcre",
            Engine::PcreJit => "pcre-jit",
            Engine::Automata => "automata",
            Engine::Auto => "auto",
        }
    }
}

impl Display for Engine {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Engine {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pcre" => Ok(Engine::Pcre),
            "pcre-jit" => Ok(Engine::PcreJit),
            "automata" => Ok(Engine::Automata),
            "auto" => Ok(Engine::Auto),
            _ => Err(format!(
                "unknown engine `{}`, expecting one of: pcre, pcre-jit, automata, auto",
                s
            )),
        }
    }
}

/// Order in which engines are tried. Priorities built from the default are
/// `[Automata, PcreJit, Pcre]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Priority {
    engines: [Engine; ENGINE_COUNT],
    len: usize,
}

impl Priority {
    /// Creates a priority with the given engines, in order.
    ///
    /// Only the length is checked here, use [`Priority::validate`] for
    /// checking the ordering rules.
    pub fn new(engines: &[Engine]) -> Result<Self, ErrorCode> {
        if engines.len() > ENGINE_COUNT {
            return Err(ErrorCode::InvalidPriorityLength);
        }
        let mut priority =
            Priority { engines: [Engine::Auto; ENGINE_COUNT], len: 0 };
        priority.engines[..engines.len()].copy_from_slice(engines);
        priority.len = engines.len();
        Ok(priority)
    }

    /// Returns the engines in this priority.
    #[inline]
    pub fn engines(&self) -> &[Engine] {
        &self.engines[..self.len]
    }

    /// Number of engines in this priority.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the priority has no engines.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Checks the ordering rules.
    ///
    /// * There must be at least one engine.
    /// * If [`Engine::Automata`] comes first, the second engine must be
    ///   [`Engine::Pcre`] or [`Engine::PcreJit`]. Automata can't reject empty
    ///   matches by itself, and it needs an engine to fall back to.
    /// * [`Engine::Auto`] must be the only engine.
    pub fn validate(&self, log: Option<&mut Log>) -> Result<(), ErrorCode> {
        let result = self.check();
        if let Err(err) = result {
            fill(log, LogLevel::Error, err.code());
        }
        result
    }

    fn check(&self) -> Result<(), ErrorCode> {
        let engines = self.engines();

        let first = match engines.first() {
            Some(first) => *first,
            None => return Err(ErrorCode::InvalidPriorityLength),
        };

        if first == Engine::Automata
            && !engines.get(1).is_some_and(|second| second.is_backtracking())
        {
            return Err(ErrorCode::InvalidPriorityAutomata);
        }

        if first == Engine::Auto && engines.len() != 1 {
            return Err(ErrorCode::InvalidPriorityAuto);
        }

        if engines.iter().skip(1).any(|engine| *engine == Engine::Auto) {
            return Err(ErrorCode::InvalidPriorityAuto);
        }

        Ok(())
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority {
            engines: [
                Engine::Automata,
                Engine::PcreJit,
                Engine::Pcre,
                Engine::Auto,
            ],
            len: 3,
        }
    }
}

impl Display for Priority {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        for (i, engine) in self.engines().iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", engine)?;
        }
        write!(f, "]")
    }
}

impl FromStr for Priority {
    type Err = String;

    /// Parses a comma-separated list of engines, like `automata,pcre-jit`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let engines = s
            .split(',')
            .map(|name| name.trim().parse::<Engine>())
            .collect::<Result<Vec<_>, _>>()?;

        Priority::new(&engines).map_err(|err| err.to_string())
    }
}

impl Serialize for Priority {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        self.engines().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Self, D::Error> {
        let engines = Vec::<Engine>::deserialize(deserializer)?;
        Priority::new(&engines).map_err(serde::de::Error::custom)
    }
}

/// Determines the priority that must be used.
///
/// If `requested` is `None` the result is the default priority. Otherwise
/// `requested` is validated and returned as is, unless it is `[Auto]`, in
/// which case the order would be determined by profiling the pattern.
pub fn resolve(
    requested: Option<&Priority>,
    pattern: &[u8],
    compile_options: CompileOptions,
    exec_options: ExecOptions,
    mut log: Option<&mut Log>,
) -> Result<Priority, ErrorCode> {
    let requested = match requested {
        Some(requested) => requested,
        None => return Ok(Priority::default()),
    };

    requested.validate(log.as_deref_mut())?;

    if requested.engines()[0] == Engine::Auto {
        return profile(pattern, compile_options, exec_options, log);
    }

    Ok(*requested)
}

/// Chooses an engine order by measuring each engine on the pattern.
///
/// There are no documented selection criteria yet, so this always fails
/// with [`ErrorCode::NotSupported`] instead of guessing an order.
fn profile(
    _pattern: &[u8],
    _compile_options: CompileOptions,
    _exec_options: ExecOptions,
    log: Option<&mut Log>,
) -> Result<Priority, ErrorCode> {
    fill(log, LogLevel::Error, ErrorCode::NotSupported.code());
    Err(ErrorCode::NotSupported)
}
