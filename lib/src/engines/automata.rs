/*! Adapter for the linear-time automata engine.

Patterns are matched as raw bytes: Unicode support is disabled, and any
byte in the pattern outside the ASCII range is turned into an `\xNN` escape
before it is handed to the engine.

The engine doesn't support every construct that PCRE does (back
references and lookarounds, for instance). Compiling such patterns fails,
and the failure is not fatal: the pattern is simply executed by the
engines that follow in the priority.
*/

use std::fmt::Write;

use regex_automata::meta;
use regex_automata::util::syntax;
use regex_automata::Input;

#[cfg(feature = "logging")]
use log::*;

use crate::engines::{pair_capacity, store_pair, MatchResult};
use crate::errors::ErrorCode;
use crate::logging::{fill, log_fmt, Log, LogLevel};
use crate::options::{CompileOption, CompileOptions};

const MULTI_LINE_PREFIX: &str = "(?m:";

/// A pattern compiled by the automata engine.
pub(crate) struct Automata {
    regex: meta::Regex,
}

impl Automata {
    /// Compiles `pattern`. Returns `None` if the engine can't handle it.
    ///
    /// The reason of the failure is recorded in `log` as a warning, so that
    /// it doesn't hide the result of the compilation as a whole.
    pub fn compile(
        pattern: &[u8],
        options: CompileOptions,
        log: Option<&mut Log>,
    ) -> Option<Self> {
        // Without DOLLAR_ENDONLY the `$` of a PCRE pattern also matches
        // before a newline at the end of the subject, something the engine
        // can't express outside of multi-line mode.
        let dollar_differs = !options.contains(CompileOption::DollarEndOnly)
            && !options.contains(CompileOption::Multiline)
            && has_dollar_anchor(pattern);

        if dollar_differs || has_divergent_syntax(pattern) {
            #[cfg(feature = "logging")]
            debug!("automata skipped: pattern requires PCRE semantics");
            fill(
                log,
                LogLevel::Warn,
                ErrorCode::AutomataCannotConstruct.code(),
            );
            return None;
        }

        let mut escaped = escape_non_ascii(pattern);

        // Multi-line mode is enabled with a group wrapping the whole pattern.
        let prefix_len = if options.contains(CompileOption::Multiline) {
            escaped.insert_str(0, MULTI_LINE_PREFIX);
            escaped.push(')');
            MULTI_LINE_PREFIX.len()
        } else {
            0
        };

        let result = meta::Regex::builder()
            .syntax(
                syntax::Config::new()
                    .case_insensitive(options.contains(CompileOption::Caseless))
                    .dot_matches_new_line(
                        options.contains(CompileOption::Dotall),
                    )
                    .unicode(false)
                    .utf8(false),
            )
            .configure(meta::Regex::config().utf8_empty(false))
            .build(&escaped);

        match result {
            Ok(regex) => Some(Self { regex }),
            Err(err) => {
                #[cfg(feature = "logging")]
                debug!("automata compilation failed: {}", err);
                let offset = syntax_error_offset(&err)
                    .map(|offset| offset.saturating_sub(prefix_len));
                let _ = match offset {
                    Some(offset) => log_fmt!(
                        log,
                        LogLevel::Warn,
                        "{}, error offset = {}",
                        ErrorCode::AutomataCannotConstruct,
                        offset
                    ),
                    None => log_fmt!(
                        log,
                        LogLevel::Warn,
                        "{}",
                        ErrorCode::AutomataCannotConstruct
                    ),
                };
                None
            }
        }
    }

    /// Matches the subject starting at `start_offset`.
    ///
    /// The bytes that precede `start_offset` are still visible to
    /// assertions like `^` or `\b`.
    pub fn exec(
        &self,
        subject: &[u8],
        start_offset: usize,
        captures: Option<&mut [i32]>,
    ) -> MatchResult {
        if start_offset > subject.len() {
            return ErrorCode::BadOffset.into();
        }

        let input = Input::new(subject).span(start_offset..subject.len());
        let pairs = pair_capacity(captures.as_deref());

        let captures = match captures {
            Some(captures) if pairs > 0 => captures,
            _ => {
                return if self.regex.search(&input).is_some() {
                    MatchResult::VECTOR_TOO_SMALL
                } else {
                    MatchResult::NO_MATCH
                }
            }
        };

        let mut caps = self.regex.create_captures();
        self.regex.search_captures(&input, &mut caps);

        if !caps.is_match() {
            return MatchResult::NO_MATCH;
        }

        // Trailing groups that didn't participate are not counted.
        let groups = (0..caps.group_len())
            .rev()
            .find(|i| caps.get_group(*i).is_some())
            .map_or(0, |i| i + 1);

        for i in 0..pairs.min(caps.group_len()) {
            store_pair(
                captures,
                i,
                caps.get_group(i).map(|span| (span.start, span.end)),
            );
        }

        if groups <= pairs {
            MatchResult::matched(groups)
        } else {
            MatchResult::VECTOR_TOO_SMALL
        }
    }
}

/// Rewrites the bytes outside the ASCII range as `\xNN`. A backslash that
/// escapes one of those bytes is dropped, it would escape the `\` of the
/// new escape sequence otherwise.
fn escape_non_ascii(pattern: &[u8]) -> String {
    let mut escaped = String::with_capacity(pattern.len());
    let mut pending_backslash = false;

    for byte in pattern {
        if byte.is_ascii() {
            pending_backslash = *byte == b'\\' && !pending_backslash;
            escaped.push(*byte as char);
        } else {
            if pending_backslash {
                escaped.pop();
                pending_backslash = false;
            }
            // Writing into a `String` can't fail.
            let _ = write!(escaped, "\\x{:02X}", byte);
        }
    }

    escaped
}

/// Returns true if the pattern contains a `$` anchor, that is, a `$` that
/// is neither escaped nor inside a character class.
fn has_dollar_anchor(pattern: &[u8]) -> bool {
    let mut i = 0;
    let mut in_class = false;

    while i < pattern.len() {
        match pattern[i] {
            b'\\' => i += 1,
            b'[' if !in_class => {
                in_class = true;
                i += leading_literals(&pattern[i + 1..]);
            }
            b']' if in_class => in_class = false,
            b'$' if !in_class => return true,
            _ => {}
        }
        i += 1;
    }

    false
}

/// Returns true if the pattern contains constructs that both engines
/// accept but read differently:
///
/// * `[` inside a class, which PCRE takes as a literal and the automata
///   engine as a nested class. POSIX classes like `[:digit:]` are fine.
/// * `&&`, `--` and `~~` inside a class, literals for PCRE and set
///   operations for the automata engine.
/// * `\v`, vertical whitespace for PCRE but only the vertical tab for the
///   automata engine.
/// * `\<` and `\>`, literals for PCRE and word boundaries for the
///   automata engine. The same goes for `\b{` and `\B{`.
fn has_divergent_syntax(pattern: &[u8]) -> bool {
    let mut i = 0;
    let mut in_class = false;

    while i < pattern.len() {
        match pattern[i] {
            b'\\' => {
                match pattern.get(i + 1).copied() {
                    Some(b'v' | b'<' | b'>') => return true,
                    Some(b'b' | b'B')
                        if !in_class && pattern.get(i + 2) == Some(&b'{') =>
                    {
                        return true
                    }
                    _ => {}
                }
                i += 1;
            }
            b'[' if !in_class => {
                in_class = true;
                i += leading_literals(&pattern[i + 1..]);
            }
            b'[' => match posix_class_len(&pattern[i..]) {
                Some(len) => i += len - 1,
                None => return true,
            },
            b']' if in_class => in_class = false,
            op @ (b'&' | b'-' | b'~')
                if in_class && pattern.get(i + 1) == Some(&op) =>
            {
                return true
            }
            _ => {}
        }
        i += 1;
    }

    false
}

/// Number of bytes right after the `[` that opens a class which don't end
/// the class: a `]` after `[` or `[^` is a literal.
fn leading_literals(rest: &[u8]) -> usize {
    match rest {
        [b'^', b']', ..] => 2,
        [b']', ..] => 1,
        _ => 0,
    }
}

/// Length of the POSIX class (like `[:alpha:]` or `[:^space:]`) at the
/// start of `bytes`, if any.
fn posix_class_len(bytes: &[u8]) -> Option<usize> {
    let name = bytes.strip_prefix(b"[:")?;
    let name_len = name
        .iter()
        .position(|b| !(b.is_ascii_alphabetic() || *b == b'^'))?;

    if name_len > 0 && name[name_len..].starts_with(b":]") {
        Some(2 + name_len + 2)
    } else {
        None
    }
}

/// Offset of a syntax error within the pattern given to the engine.
fn syntax_error_offset(err: &meta::BuildError) -> Option<usize> {
    match err.syntax_error()? {
        regex_syntax::Error::Parse(err) => Some(err.span().start.offset),
        regex_syntax::Error::Translate(err) => Some(err.span().start.offset),
        _ => None,
    }
}
