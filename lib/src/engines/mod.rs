/*! Adapters for the regular expression engines.

Each adapter translates the engine-independent options into the engine's
native ones, owns the engine's compiled objects, and reports results with
the same conventions, so that callers can't tell which engine answered:

* Captures are written into a caller-owned vector of `i32`. For a vector
  of `n` elements, only the first `n / 3` `(start, end)` pairs are used,
  stored at positions `2 * i` and `2 * i + 1`. The remaining third of the
  vector is never touched, and neither are the pairs beyond the number of
  groups in the pattern. Groups that didn't participate in the match are
  written as `(-1, -1)`.
* The result is a [`MatchResult`].
*/

use std::fmt::{Display, Formatter};

use crate::errors::ErrorCode;

pub(crate) mod automata;
pub(crate) mod pcre;


/// Result of executing a regular expression.
///
/// Wraps the signed integer used by the C API:
///
/// * `n > 0`: the subject matched, and `n` groups were captured (the whole
///   match included).
/// * `0`: the subject matched, but the capture vector is too small for
///   holding all the groups.
/// * `-1`: no match.
/// * `< -1`: an error. It's either an [`ErrorCode`] or an error code
///   reported by PCRE itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MatchResult(i32);

impl MatchResult {
    /// The subject doesn't match.
    pub const NO_MATCH: MatchResult = MatchResult(-1);

    /// The subject matched, but the capture vector is too small.
    pub const VECTOR_TOO_SMALL: MatchResult = MatchResult(0);

    /// Creates a result from its integer representation.
    #[inline]
    pub fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    /// A match where `groups` groups were captured.
    #[inline]
    pub(crate) fn matched(groups: usize) -> Self {
        Self(i32::try_from(groups).unwrap_or(i32::MAX))
    }

    /// Returns the integer representation of this result.
    #[inline]
    pub fn raw(&self) -> i32 {
        self.0
    }

    /// Returns true if the subject matched, no matter whether the capture
    /// vector was large enough or not.
    #[inline]
    pub fn is_match(&self) -> bool {
        self.0 >= 0
    }

    /// Returns true if the subject doesn't match.
    #[inline]
    pub fn is_no_match(&self) -> bool {
        self.0 == -1
    }

    /// Returns true if the result is an error.
    #[inline]
    pub fn is_error(&self) -> bool {
        self.0 < -1
    }

    /// Number of captured groups, `Some(0)` means that the capture vector
    /// was too small. `None` if the subject didn't match.
    pub fn groups(&self) -> Option<usize> {
        usize::try_from(self.0).ok()
    }

    /// Returns the [`ErrorCode`] if this result is one of the integrator's
    /// own errors. Errors reported by PCRE return `None`.
    pub fn error_code(&self) -> Option<ErrorCode> {
        if self.is_error() {
            ErrorCode::from_code(self.0)
        } else {
            None
        }
    }
}

impl From<ErrorCode> for MatchResult {
    fn from(err: ErrorCode) -> Self {
        Self(err.code())
    }
}

impl From<MatchResult> for i32 {
    fn from(result: MatchResult) -> Self {
        result.0
    }
}

impl Display for MatchResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            -1 => write!(f, "no match"),
            0 => write!(f, "match (capture vector too small)"),
            n if n > 0 => write!(f, "match ({} groups)", n),
            n => match ErrorCode::from_code(n) {
                Some(err) => write!(f, "error {}: {}", n, err),
                None => write!(f, "engine error {}", n),
            },
        }
    }
}

/// Number of `(start, end)` pairs that fit in a capture vector.
#[inline]
pub(crate) fn pair_capacity(captures: Option<&[i32]>) -> usize {
    captures.map_or(0, |c| c.len() / 3)
}

/// Converts a byte offset into the `i32` stored in capture vectors.
#[inline]
pub(crate) fn to_offset(offset: usize) -> i32 {
    i32::try_from(offset).unwrap_or(i32::MAX)
}

/// Stores a `(start, end)` pair in the capture vector. `None` is stored as
/// `(-1, -1)`.
#[inline]
pub(crate) fn store_pair(
    captures: &mut [i32],
    index: usize,
    pair: Option<(usize, usize)>,
) {
    let (start, end) = match pair {
        Some((start, end)) => (to_offset(start), to_offset(end)),
        None => (-1, -1),
    };
    captures[2 * index] = start;
    captures[2 * index + 1] = end;
}
