/*! Facade with the interface of the legacy PCRE-only wrapper.

Options are given with the legacy PCRE bit values, and results follow the
conventions of that wrapper. A process-wide switch, [`set_use_integrator`],
decides whether patterns compiled by [`pregcomp_ex`] go through the
integrator, with the default priority and every engine available, or through
the baseline path, which compiles the pattern with PCRE only (JIT included
when available) and never uses Automata.

The switch is read when a pattern is compiled. A [`LegacyRegex`] keeps the
path it was compiled for even if the switch changes later.
*/

use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;

use crate::engines::pcre::Pcre;
use crate::engines::MatchResult;
use crate::errors::ErrorCode;
use crate::logging::Log;
use crate::options::{
    CompileOption, CompileOptions, ExecOption, ExecOptions, Params,
    PcreLimits,
};
use crate::priority::{Engine, Priority};
use crate::regex::{compile, Regex};


/// Compilation and execution bits of the legacy interface.
pub mod legacy {
    /// Case-insensitive matching.
    pub const CASELESS: i32 = 0x0000_0001;
    /// `^` and `$` match at newlines.
    pub const MULTILINE: i32 = 0x0000_0002;
    /// `.` matches newlines.
    pub const DOTALL: i32 = 0x0000_0004;
    /// `$` matches only at the end of the subject.
    pub const DOLLAR_ENDONLY: i32 = 0x0000_0020;
    /// An empty string is not a valid match.
    pub const NOTEMPTY: i32 = 0x0000_0400;
}

/// Returned by [`LegacyRegex::capture_count`] for patterns compiled by the
/// integrator. It can't be confused with any PCRE return value.
pub const INFO_NOT_AVAILABLE: i32 = -1000;

static USE_INTEGRATOR: AtomicBool = AtomicBool::new(false);

/// Selects the integrator (`true`) or the baseline path (`false`) for the
/// patterns compiled from now on. The baseline path is the default.
pub fn set_use_integrator(enabled: bool) {
    USE_INTEGRATOR.store(enabled, Ordering::Relaxed)
}

/// Returns true if new patterns are compiled by the integrator.
pub fn use_integrator() -> bool {
    USE_INTEGRATOR.load(Ordering::Relaxed)
}

/// Error returned by [`pregcomp_ex`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct CompileError {
    /// Error code.
    pub code: ErrorCode,
    /// Description of the error, it includes the offset in the pattern
    /// where the error was found when PCRE reports one.
    pub message: String,
}

/// A pattern compiled by [`pregcomp_ex`].
pub struct LegacyRegex {
    pattern: Vec<u8>,
    inner: Inner,
}

enum Inner {
    Integrator(Regex),
    Baseline(Pcre),
}

/// Compiles `pattern` with default limits.
pub fn pregcomp(
    pattern: &[u8],
    options: i32,
) -> Result<LegacyRegex, CompileError> {
    pregcomp_ex(pattern, options, 0, 0)
}

/// Compiles `pattern`. `options` is a combination of the bits in
/// [`legacy`], bits that are not known are ignored. Limits that are not
/// greater than 0 are not applied.
pub fn pregcomp_ex(
    pattern: &[u8],
    options: i32,
    match_limit: i32,
    match_limit_recursion: i32,
) -> Result<LegacyRegex, CompileError> {
    let options = compile_options(options);
    let limits = PcreLimits::new(
        u32::try_from(match_limit).unwrap_or(0),
        u32::try_from(match_limit_recursion).unwrap_or(0),
    );

    let mut log = Log::new();

    let result = if use_integrator() {
        let regex = Priority::new(&[
            Engine::Automata,
            Engine::PcreJit,
            Engine::Pcre,
        ])
        .and_then(|priority| {
            compile(
                pattern,
                options,
                Some(&priority),
                Some(&Params::with_limits(limits)),
                Some(&mut log),
            )
        });
        regex.map(Inner::Integrator)
    } else {
        let mut pcre = Pcre::default();
        pcre.compile(pattern, options, &limits, true, Some(&mut log))
            .map(|_| Inner::Baseline(pcre))
    };

    match result {
        Ok(inner) => Ok(LegacyRegex { pattern: pattern.to_vec(), inner }),
        Err(code) => Err(CompileError {
            code,
            message: log
                .message()
                .map(|message| message.into_owned())
                .unwrap_or_else(|| code.message().to_string()),
        }),
    }
}

impl LegacyRegex {
    /// Returns the pattern.
    pub fn pattern(&self) -> &[u8] {
        &self.pattern
    }

    /// Returns true if the pattern was compiled by the integrator.
    pub fn is_integrated(&self) -> bool {
        matches!(self.inner, Inner::Integrator(_))
    }

    /// Number of capture groups in the pattern. For patterns compiled by
    /// the integrator the information is not available and the result is
    /// [`INFO_NOT_AVAILABLE`].
    pub fn capture_count(&self) -> i32 {
        match &self.inner {
            Inner::Integrator(_) => INFO_NOT_AVAILABLE,
            Inner::Baseline(pcre) => pcre
                .capture_count()
                .and_then(|count| i32::try_from(count).ok())
                .unwrap_or(INFO_NOT_AVAILABLE),
        }
    }

    /// Matches `subject` starting at `start_offset`. `options` is a
    /// combination of the bits in [`legacy`].
    ///
    /// `error_msg` is cleared first, and it receives a description of the
    /// error when the result is an error.
    pub fn regexec_ex(
        &self,
        subject: &[u8],
        start_offset: usize,
        options: i32,
        captures: Option<&mut [i32]>,
        error_msg: &mut Option<String>,
    ) -> MatchResult {
        *error_msg = None;

        let options = exec_options(options);
        let mut log = Log::new();

        let result = match &self.inner {
            Inner::Integrator(regex) => regex.exec(
                subject,
                start_offset,
                options,
                None,
                captures,
                Some(&mut log),
            ),
            Inner::Baseline(pcre) => {
                pcre.exec(true, subject, start_offset, options, captures)
            }
        };

        if result.is_error() {
            *error_msg = Some(match log.message() {
                Some(message) => message.into_owned(),
                None => format!("Error {}", result.raw()),
            });
        }

        result
    }

    /// Matches `subject` from its start, capturing groups in `captures`.
    pub fn regexec_capture(
        &self,
        subject: &[u8],
        captures: &mut [i32],
        error_msg: &mut Option<String>,
    ) -> MatchResult {
        self.regexec_ex(subject, 0, 0, Some(captures), error_msg)
    }

    /// Matches `subject` from its start, without capturing groups.
    pub fn regexec(
        &self,
        subject: &[u8],
        error_msg: &mut Option<String>,
    ) -> MatchResult {
        self.regexec_ex(subject, 0, 0, None, error_msg)
    }
}

fn compile_options(legacy_options: i32) -> CompileOptions {
    let mut options = CompileOptions::none();
    if legacy_options & legacy::CASELESS != 0 {
        options.set(CompileOption::Caseless);
    }
    if legacy_options & legacy::MULTILINE != 0 {
        options.set(CompileOption::Multiline);
    }
    if legacy_options & legacy::DOTALL != 0 {
        options.set(CompileOption::Dotall);
    }
    if legacy_options & legacy::DOLLAR_ENDONLY != 0 {
        options.set(CompileOption::DollarEndOnly);
    }
    options
}

fn exec_options(legacy_options: i32) -> ExecOptions {
    let mut options = ExecOptions::none();
    if legacy_options & legacy::NOTEMPTY != 0 {
        options.set(ExecOption::NotEmpty);
    }
    options
}
