/*! Compiled regular expressions.

A [`Regex`] holds the pattern compiled for every engine that accepted it,
together with the [`Priority`] used when executing it. PCRE is mandatory:
if it rejects the pattern the whole compilation fails. Automata is optional,
when it can't handle the pattern it is simply skipped at execution time.
*/

#[cfg(feature = "logging")]
use log::*;

use crate::engines::automata::Automata;
use crate::engines::pcre::Pcre;
use crate::errors::{ErrorCode, SUCCESS};
use crate::logging::{fill, Log, LogLevel};
use crate::options::{CompileOptions, ExecOptions, Params};
use crate::priority::{resolve, Engine, Priority};

mod dispatch;


/// A regular expression compiled for multiple engines.
///
/// Executing a `Regex` doesn't modify it, so it can be shared among threads
/// and executed concurrently. Changing its priority requires exclusive
/// access.
pub struct Regex {
    pattern: Vec<u8>,
    pcre: Pcre,
    automata: Option<Automata>,
    priority: Priority,
}

impl Regex {
    /// Compiles `pattern` with default options, priority and parameters.
    ///
    /// ```
    /// # use regex_integrator::Regex;
    /// let re = Regex::new("a+b").unwrap();
    /// assert!(re.is_match(b"xaab"));
    /// ```
    pub fn new<P: AsRef<[u8]>>(pattern: P) -> Result<Self, ErrorCode> {
        compile(pattern.as_ref(), CompileOptions::none(), None, None, None)
    }

    /// Returns the pattern this regex was compiled from.
    #[inline]
    pub fn pattern(&self) -> &[u8] {
        &self.pattern
    }

    /// Returns the priority used when [`Regex::exec`] doesn't receive one.
    #[inline]
    pub fn priority(&self) -> &Priority {
        &self.priority
    }

    /// Replaces the priority stored in this regex. With `None` the default
    /// priority is restored.
    ///
    /// The new priority is validated first, if it is invalid the current one
    /// is kept.
    pub fn set_priority(
        &mut self,
        priority: Option<&Priority>,
        log: Option<&mut Log>,
    ) -> Result<(), ErrorCode> {
        self.priority = resolve(
            priority,
            &self.pattern,
            CompileOptions::none(),
            ExecOptions::none(),
            log,
        )?;
        Ok(())
    }

    /// Returns true if the pattern was compiled for `engine`.
    ///
    /// For [`Engine::PcreJit`] this is true even if the JIT compiler is not
    /// available, see [`Regex::jit_available`].
    pub fn is_compiled(&self, engine: Engine) -> bool {
        match engine {
            Engine::Pcre | Engine::PcreJit => self.pcre.is_compiled(),
            Engine::Automata => self.automata.is_some(),
            Engine::Auto => false,
        }
    }

    /// Returns true if PCRE-JIT actually runs JIT-compiled code.
    pub fn jit_available(&self) -> bool {
        self.pcre.jit_available()
    }

    /// Number of capture groups in the pattern, not counting the whole match.
    pub fn capture_count(&self) -> usize {
        self.pcre.capture_count().unwrap_or(0)
    }

    /// Returns true if `subject` matches, using the stored priority.
    pub fn is_match(&self, subject: &[u8]) -> bool {
        self.exec(subject, 0, ExecOptions::none(), None, None, None).is_match()
    }
}

/// Compiles `pattern` for every engine.
///
/// `priority` is validated and stored in the returned [`Regex`], when it is
/// `None` the default priority is used. `params` carries the PCRE limits,
/// by default there are no limits.
///
/// If `log` is given it receives the error message in case of failure, or
/// `"Success!"` if no other message was recorded while compiling.
pub fn compile(
    pattern: &[u8],
    options: CompileOptions,
    priority: Option<&Priority>,
    params: Option<&Params>,
    mut log: Option<&mut Log>,
) -> Result<Regex, ErrorCode> {
    let priority = resolve(
        priority,
        pattern,
        options,
        ExecOptions::none(),
        log.as_deref_mut(),
    )?;

    let params = params.copied().unwrap_or_default();
    let mut pcre = Pcre::default();

    pcre.compile(pattern, options, &params.pcre, false, log.as_deref_mut())?;
    pcre.compile(pattern, options, &params.pcre_jit, true, log.as_deref_mut())?;

    let automata = Automata::compile(pattern, options, log.as_deref_mut());

    #[cfg(feature = "logging")]
    debug!(
        "compiled {:?}: priority = {}, jit = {}, automata = {}",
        String::from_utf8_lossy(pattern),
        priority,
        pcre.jit_available(),
        automata.is_some(),
    );

    if let Some(log) = log {
        if log.is_empty() {
            fill(Some(log), LogLevel::Error, SUCCESS);
        }
    }

    Ok(Regex { pattern: pattern.to_vec(), pcre, automata, priority })
}
