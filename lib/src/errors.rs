/*! Error codes shared by every layer of the integrator.

Codes are negative integers grouped by the subsystem that produces them. The
second hex digit identifies the subsystem: `0` for general and priority
errors, `1` for compilation, `2` for execution and `3` for logging. `-1` is
never used because at the execution layer it means "no match".
*/

use std::ffi::c_char;
use std::fmt::{Display, Formatter};

use thiserror::Error;

/// Value returned by operations that succeed.
pub const SUCCESS: i32 = 0;

/// Declares [`ErrorCode`] together with its message table. Messages are
/// stored NUL-terminated so that the C API can hand them out as-is.
macro_rules! error_codes {
    ($($(#[$attr:meta])* $variant:ident = $code:literal => $msg:literal,)+) => {
        /// Error codes returned by the integrator.
        #[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(i32)]
        pub enum ErrorCode {
            $($(#[$attr])* $variant = -$code,)+
        }

        impl ErrorCode {
            /// Returns the error code that corresponds to the given integer,
            /// if any.
            pub fn from_code(code: i32) -> Option<ErrorCode> {
                match code {
                    $(c if c == -$code => Some(ErrorCode::$variant),)+
                    _ => None,
                }
            }

            fn message_with_nul(&self) -> &'static str {
                match self {
                    $(ErrorCode::$variant => concat!($msg, "\0"),)+
                }
            }
        }
    };
}

error_codes! {
    /// Unspecified error.
    Generic = 0x1000 => "Error!",
    /// The regex handle is null.
    RegexNull = 0x1001 => "ERROR: regex is NULL!",
    /// The pattern is null.
    PatternNull = 0x1002 => "ERROR: pattern is NULL!",
    /// Memory for the regex handle could not be allocated.
    OutOfMemory = 0x1003 => "ERROR: Can NOT allocate memory to regex!",
    /// The requested feature is not implemented.
    NotSupported = 0x1004 => "ERROR: The operation is not supported.",

    /// The priority to update is null.
    ///
    /// Never returned. The destination of a priority update is always a
    /// valid reference, and a null source priority in the C API means
    /// "restore the default". The code keeps its number so that codes
    /// stored by callers keep their meaning.
    PriorityNull = 0x1010 => "ERROR: The priority to update is NULL!",
    /// The priority is empty or longer than the number of engines.
    InvalidPriorityLength = 0x1011 => "ERROR: Invalid priority length, which should be in [1, ENGINE_COUNT]!",
    /// Automata comes first but is not followed by PCRE or PCRE-JIT.
    InvalidPriorityAutomata = 0x1012 => "ERROR: Invalid priority: the second priority should be PCRE or PCRE-JIT if Automata has the highest priority.",
    /// Auto is not the only entry of the priority.
    InvalidPriorityAuto = 0x1013 => "ERROR: priority should be {AUTO} with length 1 if AUTO mode is preferred.",

    /// PCRE could not compile the pattern.
    PcreCompilationFailure = 0x1101 => "ERROR: PCRE compilation fails.",
    /// The PCRE slot to compile into is missing.
    PcreNullPointer = 0x1102 => "ERROR: PCRE pointer in compilation is NULL.",
    /// PCRE could not allocate its match context.
    PcreAlloc = 0x1103 => "ERROR: PCRE allocation fails.",
    /// The Automata engine could not be built for the pattern.
    AutomataCannotConstruct = 0x1104 => "ERROR: Can NOT construct Automata!",

    /// The subject is null.
    SubjectNull = 0x1200 => "ERROR: The subject to match is NULL!",
    /// The engine can't be used for execution.
    InvalidEngine = 0x1201 => "ERROR: Invalid regex engine for execution.",
    /// None of the engines in the priority is available.
    NoUsableEngine = 0x1202 => "ERROR: No usable regex engine for execution.",
    /// The start offset lies outside the subject.
    BadOffset = 0x1203 => "ERROR: The start offset is out of the subject.",

    /// The log message could not be stored.
    LogSpaceInsufficient = 0x1301 => "ERROR: Log space is insufficient.",
    /// The log message could not be formatted.
    LogFormat = 0x1302 => "ERROR: Log format error.",
}

const SUCCESS_MESSAGE: &str = "Success!\0";
const UNKNOWN_MESSAGE: &str = "Error code is not found.\0";

impl ErrorCode {
    /// Returns the numeric value of this error code.
    #[inline]
    pub fn code(&self) -> i32 {
        *self as i32
    }

    /// Returns the static message describing this error code.
    pub fn message(&self) -> &'static str {
        strip_nul(self.message_with_nul())
    }
}

impl Display for ErrorCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl From<ErrorCode> for i32 {
    fn from(value: ErrorCode) -> Self {
        value.code()
    }
}

/// Returns the message for any integer code, including [`SUCCESS`] and codes
/// that are unknown. Never fails.
pub fn error_message(code: i32) -> &'static str {
    strip_nul(message_with_nul(code))
}

/// Same as [`error_message`], but the returned pointer is a NUL-terminated C
/// string with static lifetime.
pub fn error_message_ptr(code: i32) -> *const c_char {
    message_with_nul(code).as_ptr() as *const c_char
}

fn message_with_nul(code: i32) -> &'static str {
    if code == SUCCESS {
        return SUCCESS_MESSAGE;
    }
    match ErrorCode::from_code(code) {
        Some(err) => err.message_with_nul(),
        None => UNKNOWN_MESSAGE,
    }
}

#[inline]
fn strip_nul(msg: &'static str) -> &'static str {
    &msg[..msg.len() - 1]
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{error_message, ErrorCode, SUCCESS};

    #[test]
    fn codes_are_negative_and_never_no_match() {
        for code in -0x1400..0 {
            if let Some(err) = ErrorCode::from_code(code) {
                assert_eq!(err.code(), code);
                assert!(err.code() < -1);
            }
        }
        assert_eq!(ErrorCode::from_code(-1), None);
        assert_eq!(ErrorCode::RegexNull.code(), -0x1001);
        assert_eq!(ErrorCode::NoUsableEngine.code(), -0x1202);
    }

    #[test]
    fn reserved_codes_keep_their_message() {
        assert_eq!(
            ErrorCode::from_code(-0x1010),
            Some(ErrorCode::PriorityNull)
        );
        assert_eq!(
            error_message(-0x1010),
            "ERROR: The priority to update is NULL!"
        );
    }

    #[test]
    fn messages() {
        assert_eq!(error_message(SUCCESS), "Success!");
        assert_eq!(error_message(-0x1013), ErrorCode::InvalidPriorityAuto.message());
        assert_eq!(error_message(12345), "Error code is not found.");
        assert_eq!(error_message(-1), "Error code is not found.");
        assert_eq!(
            ErrorCode::LogFormat.to_string(),
            "ERROR: Log format error."
        );
    }
}
