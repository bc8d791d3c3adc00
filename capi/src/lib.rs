/*! C API for the regular expression integrator.

The functions in this crate mirror the ones in the Rust API. Results are
returned as integers: `0` ([`RI_SUCCESS`]) or a negative error code for
functions that compile or configure, and the match convention described
in [`ri_exec`] for executions. [`ri_get_error_msg`] returns the description
of any of those codes.

Most functions accept an optional `log` argument. When it is not null it
receives a pointer to a message describing what happened. Messages that
are not formatted have static lifetime, formatted ones are valid until the
next formatted message is produced in the same thread, or until
[`ri_release`] is called.
*/

#![allow(non_camel_case_types)]
#![allow(clippy::missing_safety_doc)]

use std::ffi::{c_char, c_int, c_uint, CStr};
use std::ptr;
use std::slice;

use regex_integrator::errors::error_message_ptr;
use regex_integrator::{
    compile, CompileOption, CompileOptions, Engine, ErrorCode, ExecOption,
    ExecOptions, Log, LogLevel, LogSink, Params, PcreLimits, Priority,
    Regex, ENGINE_COUNT, SUCCESS,
};


/// Value returned by functions that succeed.
pub const RI_SUCCESS: c_int = SUCCESS;

/// Default compilation options.
pub const RI_COMP_DEFAULT: c_int = 0x000000;
/// Case-insensitive matching.
pub const RI_COMP_CASELESS: c_int = 0x000001;
/// `^` and `$` match at newlines too.
pub const RI_COMP_MULTILINE: c_int = 0x000002;
/// `.` matches newlines too.
pub const RI_COMP_DOTALL: c_int = 0x000004;
/// `$` matches only at the end of the subject.
pub const RI_COMP_DOLLAR_ENDONLY: c_int = 0x000008;

/// Default execution options.
pub const RI_EXEC_DEFAULT: c_int = 0x000000;
/// An empty string is not a valid match.
pub const RI_EXEC_NOTEMPTY: c_int = 0x001000;

/// Regular expression engines.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RI_ENGINE {
    /// PCRE.
    RI_PCRE = 0,
    /// PCRE with its JIT compiler.
    RI_PCRE_JIT = 1,
    /// The linear-time automata engine.
    RI_AUTOMATA = 2,
    /// Order chosen automatically (not supported yet).
    RI_AUTO = 3,
}

/// Order in which engines are tried.
///
/// `engines` contains values from [`RI_ENGINE`], only the first
/// `engine_count` entries are used.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct ri_priority {
    pub engines: [c_int; ENGINE_COUNT],
    pub engine_count: c_uint,
}

/// Limits for PCRE. Values lower than or equal to 0 mean "no limit".
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct ri_pcre_params {
    pub match_limit: c_int,
    pub match_limit_recursion: c_int,
}

/// Parameters used while compiling a pattern.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct ri_params {
    pub pcre: ri_pcre_params,
    pub pcre_jit: ri_pcre_params,
}

/// A compiled regular expression.
pub struct RI_REGEX(Regex);

/// Compiles `pattern`.
///
/// `options` is a combination of the `RI_COMP_*` values. `priority` and
/// `params` are optional, when they are null the default priority and no
/// limits are used.
///
/// On success `*regex` receives the compiled regular expression, which must
/// be destroyed with [`ri_free`]. On failure `*regex` is set to null.
#[no_mangle]
pub unsafe extern "C" fn ri_create(
    regex: *mut *mut RI_REGEX,
    pattern: *const c_char,
    options: c_int,
    priority: *const ri_priority,
    params: *const ri_params,
    log: *mut *const c_char,
) -> c_int {
    with_log(log, |mut log| {
        let regex = match regex.as_mut() {
            Some(regex) => regex,
            None => return fail(log, ErrorCode::RegexNull),
        };

        *regex = ptr::null_mut();

        if pattern.is_null() {
            return fail(log, ErrorCode::PatternNull);
        }

        let priority = match priority.as_ref() {
            Some(priority) => match to_priority(priority) {
                Ok(priority) => Some(priority),
                Err(err) => return fail(log, err),
            },
            None => None,
        };

        let params = params.as_ref().map(|params| Params {
            pcre: to_limits(&params.pcre),
            pcre_jit: to_limits(&params.pcre_jit),
        });

        match compile(
            CStr::from_ptr(pattern).to_bytes(),
            compile_options(options),
            priority.as_ref(),
            params.as_ref(),
            log.as_deref_mut(),
        ) {
            Ok(re) => {
                *regex = Box::into_raw(Box::new(RI_REGEX(re)));
                RI_SUCCESS
            }
            Err(err) => err.code(),
        }
    })
}

/// Executes a compiled regular expression on `subject`, starting at
/// `start_offset`.
///
/// `options` is a combination of the `RI_EXEC_*` values. If `priority` is
/// not null it is used instead of the regex's own priority for this call
/// only.
///
/// `ovector` is optional, it has `ovec_size` elements and receives the
/// `(start, end)` offsets of the captured groups, stored in the first
/// two thirds of it.
///
/// Returns the number of captured groups (whole match included), `0` if
/// the subject matched but `ovector` is too small, `-1` if it doesn't
/// match, or an error code lower than `-1`.
#[no_mangle]
pub unsafe extern "C" fn ri_exec(
    regex: *const RI_REGEX,
    subject: *const c_char,
    subject_len: c_uint,
    start_offset: c_int,
    options: c_int,
    priority: *const ri_priority,
    ovector: *mut c_int,
    ovec_size: c_int,
    log: *mut *const c_char,
) -> c_int {
    with_log(log, |mut log| {
        let regex = match regex.as_ref() {
            Some(regex) => regex,
            None => return fail(log, ErrorCode::RegexNull),
        };

        if subject.is_null() {
            return fail(log, ErrorCode::SubjectNull);
        }

        let start_offset = match usize::try_from(start_offset) {
            Ok(start_offset) => start_offset,
            Err(_) => return fail(log, ErrorCode::BadOffset),
        };

        let priority = match priority.as_ref() {
            Some(priority) => match to_priority(priority) {
                Ok(priority) => Some(priority),
                Err(err) => return fail(log, err),
            },
            None => None,
        };

        let subject =
            slice::from_raw_parts(subject as *const u8, subject_len as usize);

        let captures = if ovector.is_null() {
            None
        } else {
            let len = usize::try_from(ovec_size).unwrap_or(0);
            Some(slice::from_raw_parts_mut(ovector, len))
        };

        regex
            .0
            .exec(
                subject,
                start_offset,
                exec_options(options),
                priority.as_ref(),
                captures,
                log.as_deref_mut(),
            )
            .raw()
    })
}

/// Destroys a compiled regular expression. Nothing happens if `regex` is
/// null.
#[no_mangle]
pub unsafe extern "C" fn ri_free(regex: *mut RI_REGEX) {
    if !regex.is_null() {
        drop(Box::from_raw(regex));
    }
}

/// Replaces the priority of a compiled regular expression. If `priority`
/// is null the default priority is restored.
#[no_mangle]
pub unsafe extern "C" fn ri_set_priority(
    regex: *mut RI_REGEX,
    priority: *const ri_priority,
    log: *mut *const c_char,
) -> c_int {
    with_log(log, |mut log| {
        let regex = match regex.as_mut() {
            Some(regex) => regex,
            None => return fail(log, ErrorCode::RegexNull),
        };

        let priority = match priority.as_ref() {
            Some(priority) => match to_priority(priority) {
                Ok(priority) => Some(priority),
                Err(err) => return fail(log, err),
            },
            None => None,
        };

        match regex.0.set_priority(priority.as_ref(), log.as_deref_mut()) {
            Ok(()) => RI_SUCCESS,
            Err(err) => err.code(),
        }
    })
}

/// Returns the description of a code returned by any function in this
/// API. The returned string has static lifetime.
#[no_mangle]
pub extern "C" fn ri_get_error_msg(error_code: c_int) -> *const c_char {
    error_message_ptr(error_code)
}

/// Initializes the log buffer of the calling thread. Must be called before
/// using the API in a thread.
#[no_mangle]
pub extern "C" fn ri_init() {
    regex_integrator::init()
}

/// Frees the log buffer of the calling thread. Must be called after the
/// last use of the API in a thread.
#[no_mangle]
pub extern "C" fn ri_release() {
    regex_integrator::release()
}

/// Returns the global log level.
#[no_mangle]
pub extern "C" fn ri_get_log_level() -> c_int {
    LogSink::global().level() as c_int
}

/// Sets the global log level. Valid levels go from `0` (no messages) to
/// `4` (debug messages).
#[no_mangle]
pub extern "C" fn ri_set_log_level(level: c_int) -> c_int {
    match u8::try_from(level).ok().and_then(LogLevel::from_u8) {
        Some(level) => {
            LogSink::global().set_level(level);
            RI_SUCCESS
        }
        None => ErrorCode::Generic.code(),
    }
}

/// Runs `f` with a [`Log`] if `log` is not null, and copies the message
/// recorded by `f` (if any) into `*log`.
unsafe fn with_log<F>(log: *mut *const c_char, f: F) -> c_int
where
    F: FnOnce(Option<&mut Log>) -> c_int,
{
    match log.as_mut() {
        Some(out) => {
            let mut log = Log::new();
            let result = f(Some(&mut log));
            if !log.is_empty() {
                *out = log.as_c_ptr();
            }
            result
        }
        None => f(None),
    }
}

fn fail(log: Option<&mut Log>, err: ErrorCode) -> c_int {
    regex_integrator::logging::fill(log, LogLevel::Error, err.code());
    err.code()
}

fn to_priority(priority: &ri_priority) -> Result<Priority, ErrorCode> {
    let len = priority.engine_count as usize;
    if len > ENGINE_COUNT {
        return Err(ErrorCode::InvalidPriorityLength);
    }
    let engines = priority.engines[..len]
        .iter()
        .map(|engine| to_engine(*engine))
        .collect::<Result<Vec<_>, _>>()?;
    Priority::new(&engines)
}

fn to_engine(engine: c_int) -> Result<Engine, ErrorCode> {
    match engine {
        e if e == RI_ENGINE::RI_PCRE as c_int => Ok(Engine::Pcre),
        e if e == RI_ENGINE::RI_PCRE_JIT as c_int => Ok(Engine::PcreJit),
        e if e == RI_ENGINE::RI_AUTOMATA as c_int => Ok(Engine::Automata),
        e if e == RI_ENGINE::RI_AUTO as c_int => Ok(Engine::Auto),
        _ => Err(ErrorCode::InvalidEngine),
    }
}

fn to_limits(params: &ri_pcre_params) -> PcreLimits {
    PcreLimits::new(
        u32::try_from(params.match_limit).unwrap_or(0),
        u32::try_from(params.match_limit_recursion).unwrap_or(0),
    )
}

fn compile_options(options: c_int) -> CompileOptions {
    let mut result = CompileOptions::none();
    for (bit, option) in [
        (RI_COMP_CASELESS, CompileOption::Caseless),
        (RI_COMP_MULTILINE, CompileOption::Multiline),
        (RI_COMP_DOTALL, CompileOption::Dotall),
        (RI_COMP_DOLLAR_ENDONLY, CompileOption::DollarEndOnly),
    ] {
        if options & bit != 0 {
            result.set(option);
        }
    }
    result
}

fn exec_options(options: c_int) -> ExecOptions {
    let mut result = ExecOptions::none();
    if options & RI_EXEC_NOTEMPTY != 0 {
        result.set(ExecOption::NotEmpty);
    }
    result
}
