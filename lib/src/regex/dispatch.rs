#[cfg(feature = "logging")]
use log::*;

use crate::engines::{pair_capacity, MatchResult};
use crate::errors::ErrorCode;
use crate::logging::{fill, Log, LogLevel};
use crate::options::{CompileOptions, ExecOption, ExecOptions};
use crate::priority::{resolve, Engine, Priority};
use crate::regex::Regex;

impl Regex {
    /// Matches `subject` starting at `start_offset`.
    ///
    /// Engines are tried in the order given by `priority`, or by the priority
    /// stored in the regex if `priority` is `None`. The first engine in that
    /// order the pattern was compiled for produces the result, with one
    /// exception: Automata can't honor [`ExecOption::NotEmpty`], so when it
    /// finds a match and the option is set, the match is discarded if it is
    /// empty (or if its bounds are unknown because there's no room for them
    /// in `captures`) and the next engine is tried.
    ///
    /// Captures are written into `captures` as explained in the
    /// documentation of [`MatchResult`].
    pub fn exec(
        &self,
        subject: &[u8],
        start_offset: usize,
        options: ExecOptions,
        priority: Option<&Priority>,
        mut captures: Option<&mut [i32]>,
        mut log: Option<&mut Log>,
    ) -> MatchResult {
        let requested;
        let priority = match priority {
            None => &self.priority,
            Some(priority) => {
                match resolve(
                    Some(priority),
                    &self.pattern,
                    CompileOptions::none(),
                    ExecOptions::none(),
                    log.as_deref_mut(),
                ) {
                    Ok(priority) => {
                        requested = priority;
                        &requested
                    }
                    Err(err) => return err.into(),
                }
            }
        };

        for engine in priority.engines() {
            match engine {
                Engine::Pcre | Engine::PcreJit => {
                    if self.pcre.is_compiled() {
                        return self.pcre.exec(
                            *engine == Engine::PcreJit,
                            subject,
                            start_offset,
                            options,
                            captures,
                        );
                    }
                }
                Engine::Automata => {
                    if let Some(automata) = &self.automata {
                        let result = automata.exec(
                            subject,
                            start_offset,
                            captures.as_deref_mut(),
                        );
                        if !(result.is_match()
                            && options.contains(ExecOption::NotEmpty)
                            && is_empty_or_unknown(captures.as_deref()))
                        {
                            return result;
                        }
                        #[cfg(feature = "logging")]
                        debug!("automata found an empty match, trying next engine");
                    }
                }
                Engine::Auto => {
                    fill(log, LogLevel::Error, ErrorCode::InvalidEngine.code());
                    return ErrorCode::InvalidEngine.into();
                }
            }
        }

        fill(log, LogLevel::Error, ErrorCode::NoUsableEngine.code());
        ErrorCode::NoUsableEngine.into()
    }
}

/// Returns true if the match stored in `captures` is empty, or if there's
/// no match stored at all.
fn is_empty_or_unknown(captures: Option<&[i32]>) -> bool {
    match captures {
        Some(captures) if pair_capacity(Some(captures)) > 0 => {
            captures[0] == captures[1]
        }
        _ => true,
    }
}
