/*! Adapter for the PCRE backtracking engine and its JIT variant.

Both engines share the same compiled pattern. What makes them different is
the study attached to each of them: the match limits, and whether the
JIT-compiled matcher is used or not. When JIT compilation is not supported
by the linked PCRE library the PCRE-JIT engine silently runs the
interpreter.
*/

use std::ffi::{c_int, c_void};
use std::fmt::{Display, Formatter};
use std::ptr::{self, NonNull};
use std::slice;

use pcre2_sys::{
    pcre2_code_8, pcre2_code_free_8, pcre2_compile_8,
    pcre2_get_error_message_8, pcre2_get_ovector_count_8,
    pcre2_get_ovector_pointer_8, pcre2_jit_compile_8, pcre2_match_8,
    pcre2_match_context_8, pcre2_match_context_create_8,
    pcre2_match_context_free_8, pcre2_match_data_8,
    pcre2_match_data_create_8, pcre2_match_data_free_8, pcre2_pattern_info_8,
    pcre2_set_depth_limit_8, pcre2_set_match_limit_8, PCRE2_CASELESS,
    PCRE2_DOLLAR_ENDONLY, PCRE2_DOTALL, PCRE2_ERROR_NOMEMORY,
    PCRE2_INFO_CAPTURECOUNT, PCRE2_JIT_COMPLETE, PCRE2_MULTILINE,
    PCRE2_NOTEMPTY, PCRE2_NO_JIT, PCRE2_UNSET,
};

#[cfg(feature = "logging")]
use log::*;

use crate::engines::{pair_capacity, store_pair, MatchResult};
use crate::errors::ErrorCode;
use crate::logging::{fill, log_fmt, Log, LogLevel};
use crate::options::{
    CompileOption, CompileOptions, ExecOption, ExecOptions, PcreLimits,
};

/// Compiled forms of a pattern for PCRE and PCRE-JIT.
///
/// The pattern is compiled once. Each engine gets its own study, and any of
/// them can be missing.
#[derive(Default)]
pub(crate) struct Pcre {
    code: Option<Code>,
    study: Option<Study>,
    jit_study: Option<Study>,
}

impl Pcre {
    /// Compiles `pattern` and creates the study for PCRE (`jit == false`)
    /// or PCRE-JIT (`jit == true`).
    ///
    /// The pattern is not compiled again if it was compiled already, and
    /// the same goes for the study. Limits equal to 0 are not applied.
    pub fn compile(
        &mut self,
        pattern: &[u8],
        options: CompileOptions,
        limits: &PcreLimits,
        jit: bool,
        mut log: Option<&mut Log>,
    ) -> Result<(), ErrorCode> {
        if self.code.is_none() {
            self.code = Some(Code::compile(
                pattern,
                translate_compile_options(options),
                log.as_deref_mut(),
            )?);
        }

        let code = match self.code.as_mut() {
            Some(code) => code,
            None => {
                fill(log, LogLevel::Error, ErrorCode::PcreNullPointer.code());
                return Err(ErrorCode::PcreNullPointer);
            }
        };

        let study = if jit { &mut self.jit_study } else { &mut self.study };

        if study.is_none() {
            if jit {
                code.jit_compile();
            }
            match Study::new(limits, jit && code.jit) {
                Some(new_study) => *study = Some(new_study),
                None => {
                    fill(log, LogLevel::Error, ErrorCode::PcreAlloc.code());
                    return Err(ErrorCode::PcreAlloc);
                }
            }
        }

        Ok(())
    }

    /// Returns true if the pattern was compiled.
    #[inline]
    pub fn is_compiled(&self) -> bool {
        self.code.is_some()
    }

    /// Returns true if the JIT-compiled matcher is available.
    pub fn jit_available(&self) -> bool {
        self.jit_study.as_ref().is_some_and(|study| study.jit)
    }

    /// Number of capture groups in the pattern, the whole match excluded.
    pub fn capture_count(&self) -> Option<usize> {
        self.code.as_ref().map(|code| code.groups - 1)
    }

    /// Matches the subject starting at `start_offset`, with the study of
    /// PCRE (`jit == false`) or PCRE-JIT (`jit == true`).
    pub fn exec(
        &self,
        jit: bool,
        subject: &[u8],
        start_offset: usize,
        options: ExecOptions,
        captures: Option<&mut [i32]>,
    ) -> MatchResult {
        let code = match &self.code {
            Some(code) => code,
            None => return ErrorCode::PcreNullPointer.into(),
        };

        let study = if jit { self.jit_study.as_ref() } else { self.study.as_ref() };

        let (context, use_jit) = match study {
            Some(study) => (study.as_ptr(), study.jit),
            None => (ptr::null_mut(), false),
        };

        let mut native_options = translate_exec_options(options);
        if !use_jit {
            native_options |= PCRE2_NO_JIT;
        }

        let pairs = pair_capacity(captures.as_deref());

        // PCRE needs room for at least the whole match.
        let match_data = match MatchData::new(pairs.max(1)) {
            Some(match_data) => match_data,
            None => return MatchResult::from_raw(PCRE2_ERROR_NOMEMORY),
        };

        let rc = unsafe {
            pcre2_match_8(
                code.as_ptr(),
                subject.as_ptr(),
                subject.len(),
                start_offset,
                native_options,
                match_data.as_ptr(),
                context,
            )
        };

        if rc < 0 {
            return MatchResult::from_raw(rc);
        }

        // Pairs beyond the groups in the pattern are not written by PCRE,
        // and they are left untouched in the capture vector too.
        if let Some(captures) = captures {
            for (i, pair) in match_data
                .ovector()
                .chunks_exact(2)
                .take(pairs.min(code.groups))
                .enumerate()
            {
                let pair = if pair[0] == PCRE2_UNSET {
                    None
                } else {
                    Some((pair[0], pair[1]))
                };
                store_pair(captures, i, pair);
            }
        }

        // Without room for the whole match the vector is always too small.
        if pairs == 0 {
            return MatchResult::VECTOR_TOO_SMALL;
        }

        MatchResult::from_raw(rc)
    }
}

/// A pattern compiled by PCRE.
struct Code {
    code: NonNull<pcre2_code_8>,
    jit: bool,
    /// Number of groups, the whole match included.
    groups: usize,
}

// SAFETY: A compiled pattern is never modified by `pcre2_match`, so it can
// be used from multiple threads at the same time. JIT compilation, the
// only operation that modifies it, requires a mutable reference.
unsafe impl Send for Code {}
unsafe impl Sync for Code {}

impl Code {
    fn compile(
        pattern: &[u8],
        options: u32,
        log: Option<&mut Log>,
    ) -> Result<Self, ErrorCode> {
        let mut error_code: c_int = 0;
        let mut error_offset: usize = 0;

        let code = unsafe {
            pcre2_compile_8(
                pattern.as_ptr(),
                pattern.len(),
                options,
                &mut error_code,
                &mut error_offset,
                ptr::null_mut(),
            )
        };

        match NonNull::new(code) {
            Some(code) => {
                let mut count: u32 = 0;
                let rc = unsafe {
                    pcre2_pattern_info_8(
                        code.as_ptr(),
                        PCRE2_INFO_CAPTURECOUNT,
                        &mut count as *mut u32 as *mut c_void,
                    )
                };
                let groups = if rc == 0 { count as usize + 1 } else { 1 };
                Ok(Self { code, jit: false, groups })
            }
            None => {
                #[cfg(feature = "logging")]
                debug!(
                    "PCRE compilation failed: {}, error offset = {}",
                    PcreError(error_code),
                    error_offset
                );
                // A failure here only degrades the log message.
                let _ = log_fmt!(
                    log,
                    LogLevel::Error,
                    "{}, error offset = {}",
                    PcreError(error_code),
                    error_offset
                );
                Err(ErrorCode::PcreCompilationFailure)
            }
        }
    }

    /// JIT-compiles the pattern. If the PCRE library doesn't support JIT
    /// the pattern is left as it was.
    fn jit_compile(&mut self) {
        if self.jit {
            return;
        }
        let rc =
            unsafe { pcre2_jit_compile_8(self.code.as_ptr(), PCRE2_JIT_COMPLETE) };
        self.jit = rc == 0;

        #[cfg(feature = "logging")]
        if !self.jit {
            debug!("PCRE JIT compilation not available: {}", PcreError(rc));
        }
    }

    #[inline]
    fn as_ptr(&self) -> *mut pcre2_code_8 {
        self.code.as_ptr()
    }
}

impl Drop for Code {
    fn drop(&mut self) {
        unsafe { pcre2_code_free_8(self.code.as_ptr()) }
    }
}

/// Match limits and matcher selection for one engine.
struct Study {
    context: Option<NonNull<pcre2_match_context_8>>,
    jit: bool,
}

// SAFETY: The match context is only read by `pcre2_match`.
unsafe impl Send for Study {}
unsafe impl Sync for Study {}

impl Study {
    /// Creates a study. A match context is allocated only when some limit
    /// must be applied. Returns `None` if the allocation fails.
    fn new(limits: &PcreLimits, jit: bool) -> Option<Self> {
        if limits.match_limit == 0 && limits.match_limit_recursion == 0 {
            return Some(Self { context: None, jit });
        }

        let context =
            NonNull::new(unsafe { pcre2_match_context_create_8(ptr::null_mut()) })?;

        unsafe {
            if limits.match_limit > 0 {
                pcre2_set_match_limit_8(context.as_ptr(), limits.match_limit);
            }
            if limits.match_limit_recursion > 0 {
                pcre2_set_depth_limit_8(
                    context.as_ptr(),
                    limits.match_limit_recursion,
                );
            }
        }

        Some(Self { context: Some(context), jit })
    }

    #[inline]
    fn as_ptr(&self) -> *mut pcre2_match_context_8 {
        self.context.map_or(ptr::null_mut(), |context| context.as_ptr())
    }
}

impl Drop for Study {
    fn drop(&mut self) {
        if let Some(context) = self.context {
            unsafe { pcre2_match_context_free_8(context.as_ptr()) }
        }
    }
}

/// Output vector used by a single call to `pcre2_match`.
struct MatchData(NonNull<pcre2_match_data_8>);

impl MatchData {
    fn new(pairs: usize) -> Option<Self> {
        let pairs = u32::try_from(pairs).unwrap_or(u32::MAX);
        NonNull::new(unsafe {
            pcre2_match_data_create_8(pairs, ptr::null_mut())
        })
        .map(Self)
    }

    #[inline]
    fn as_ptr(&self) -> *mut pcre2_match_data_8 {
        self.0.as_ptr()
    }

    fn ovector(&self) -> &[usize] {
        unsafe {
            let count = pcre2_get_ovector_count_8(self.as_ptr()) as usize;
            let ovector = pcre2_get_ovector_pointer_8(self.as_ptr());
            if ovector.is_null() {
                return &[];
            }
            slice::from_raw_parts(ovector, count * 2)
        }
    }
}

impl Drop for MatchData {
    fn drop(&mut self) {
        unsafe { pcre2_match_data_free_8(self.as_ptr()) }
    }
}

/// Formats the message of a PCRE error code. The message is obtained only
/// when the value is actually formatted.
struct PcreError(c_int);

impl Display for PcreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut buf = [0_u8; 256];
        let len = unsafe {
            pcre2_get_error_message_8(self.0, buf.as_mut_ptr(), buf.len())
        };
        match usize::try_from(len) {
            Ok(len) => f.write_str(&String::from_utf8_lossy(&buf[..len])),
            Err(_) => write!(f, "unknown PCRE error {}", self.0),
        }
    }
}

fn translate_compile_options(options: CompileOptions) -> u32 {
    let mut native = 0;
    if options.contains(CompileOption::Caseless) {
        native |= PCRE2_CASELESS;
    }
    if options.contains(CompileOption::Multiline) {
        native |= PCRE2_MULTILINE;
    }
    if options.contains(CompileOption::Dotall) {
        native |= PCRE2_DOTALL;
    }
    if options.contains(CompileOption::DollarEndOnly) {
        native |= PCRE2_DOLLAR_ENDONLY;
    }
    native
}

fn translate_exec_options(options: ExecOptions) -> u32 {
    let mut native = 0;
    if options.contains(ExecOption::NotEmpty) {
        native |= PCRE2_NOTEMPTY;
    }
    native
}
