/*! Diagnostic messages produced by compilation and execution.

Every entry point accepts an optional [`Log`]. When it is `None` no message
is ever built, so hot paths don't pay for formatting. Messages are filtered
by the severity threshold of the [`LogSink`] the log belongs to.

Static messages (the ones in the error table) are stored as references.
Formatted messages are written into a buffer that is private to the calling
thread and reused across calls: it grows when a message doesn't fit, but it
never shrinks. The buffer is released by [`release`].
*/

use std::borrow::Cow;
use std::cell::RefCell;
use std::ffi::c_char;
use std::fmt;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU8, Ordering};

use serde::{Deserialize, Serialize};

use crate::errors::{error_message, error_message_ptr, ErrorCode};

thread_local! {
    static MESSAGE_BUFFER: RefCell<Vec<u8>> = const { RefCell::new(Vec::new()) };
    static SCRATCH_BUFFER: RefCell<Vec<u8>> = const { RefCell::new(Vec::new()) };
}

static GLOBAL_SINK: LogSink = LogSink::new(LogLevel::Error);

/// Severity of a log message.
///
/// A message is recorded only if its level is lower than or equal to the
/// threshold of the sink.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
#[repr(u8)]
pub enum LogLevel {
    None = 0,
    Error = 1,
    Warn = 2,
    Info = 3,
    Debug = 4,
}

impl LogLevel {
    /// Converts an integer into a level. Returns `None` if the value doesn't
    /// correspond to any level.
    pub fn from_u8(value: u8) -> Option<LogLevel> {
        match value {
            0 => Some(LogLevel::None),
            1 => Some(LogLevel::Error),
            2 => Some(LogLevel::Warn),
            3 => Some(LogLevel::Info),
            4 => Some(LogLevel::Debug),
            _ => None,
        }
    }
}

/// Holds the severity threshold applied to log messages.
///
/// The threshold is advisory, so it is read and written with relaxed
/// ordering.
#[derive(Debug)]
pub struct LogSink {
    level: AtomicU8,
}

impl LogSink {
    /// Creates a sink with the given threshold.
    pub const fn new(level: LogLevel) -> Self {
        Self { level: AtomicU8::new(level as u8) }
    }

    /// Returns the process-wide sink. Its default threshold is
    /// [`LogLevel::Error`].
    pub fn global() -> &'static LogSink {
        &GLOBAL_SINK
    }

    /// Returns the current threshold.
    pub fn level(&self) -> LogLevel {
        LogLevel::from_u8(self.level.load(Ordering::Relaxed))
            .unwrap_or(LogLevel::Error)
    }

    /// Changes the threshold.
    pub fn set_level(&self, level: LogLevel) {
        self.level.store(level as u8, Ordering::Relaxed)
    }

    #[inline]
    fn accepts(&self, level: LogLevel) -> bool {
        level as u8 <= self.level.load(Ordering::Relaxed)
    }
}

impl Default for LogSink {
    fn default() -> Self {
        Self::new(LogLevel::Error)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Entry {
    Empty,
    Static(i32),
    Buffered,
}

/// Output slot for the message produced by an operation.
///
/// A `Log` can't be sent to another thread: a formatted message lives in
/// the buffer of the thread that produced it, and it is overwritten by the
/// next formatted message produced in that thread.
#[derive(Debug)]
pub struct Log<'s> {
    sink: &'s LogSink,
    entry: Entry,
    _not_send: PhantomData<*const ()>,
}

impl Log<'static> {
    /// Creates an empty log attached to the global sink.
    pub fn new() -> Self {
        Self::with_sink(LogSink::global())
    }
}

impl Default for Log<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'s> Log<'s> {
    /// Creates an empty log attached to `sink`.
    pub fn with_sink(sink: &'s LogSink) -> Self {
        Self { sink, entry: Entry::Empty, _not_send: PhantomData }
    }

    /// Returns true if no message has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entry == Entry::Empty
    }

    /// Forgets the recorded message.
    pub fn clear(&mut self) {
        self.entry = Entry::Empty;
    }

    /// Returns the recorded message, if any.
    pub fn message(&self) -> Option<Cow<'static, str>> {
        match self.entry {
            Entry::Empty => None,
            Entry::Static(code) => Some(Cow::Borrowed(error_message(code))),
            Entry::Buffered => MESSAGE_BUFFER.with(|buf| {
                let buf = buf.try_borrow().ok()?;
                let bytes: &[u8] = &buf;
                let text = bytes.strip_suffix(&[0]).unwrap_or(bytes);
                Some(Cow::Owned(String::from_utf8_lossy(text).into_owned()))
            }),
        }
    }

    /// Returns the recorded message as a NUL-terminated C string, or null
    /// if there is none.
    ///
    /// For formatted messages the pointer refers to the buffer of the
    /// current thread, it is valid until the next formatted message is
    /// produced in this thread or until [`release`] is called.
    pub fn as_c_ptr(&self) -> *const c_char {
        match self.entry {
            Entry::Empty => std::ptr::null(),
            Entry::Static(code) => error_message_ptr(code),
            Entry::Buffered => MESSAGE_BUFFER.with(|buf| match buf.try_borrow()
            {
                Ok(buf) if !buf.is_empty() => buf.as_ptr() as *const c_char,
                _ => std::ptr::null(),
            }),
        }
    }
}

/// Records the static message for `code` in `log`.
///
/// Nothing happens if `log` is `None` or if `level` is filtered out by the
/// sink.
pub fn fill(log: Option<&mut Log>, level: LogLevel, code: i32) {
    if let Some(log) = log {
        if log.sink.accepts(level) {
            log.entry = Entry::Static(code);
        }
    }
}

/// Records a formatted message in `log`.
///
/// The message is formatted only if `log` is `Some` and `level` passes the
/// sink's threshold. Use the [`log_fmt!`] macro instead of calling this
/// function directly.
pub fn fill_fmt(
    log: Option<&mut Log>,
    level: LogLevel,
    args: fmt::Arguments<'_>,
) -> Result<(), ErrorCode> {
    let log = match log {
        Some(log) if log.sink.accepts(level) => log,
        _ => return Ok(()),
    };

    // First pass: compute the message size without touching the buffer.
    let mut counter = Counter(0);
    if fmt::write(&mut counter, args).is_err() {
        log.entry = Entry::Static(ErrorCode::LogFormat.code());
        return Err(ErrorCode::LogFormat);
    }

    // One more byte for the NUL terminator.
    let size = counter.0 + 1;

    // The message is formatted in the scratch buffer first, a failure
    // while formatting leaves the previous message untouched.
    let result = SCRATCH_BUFFER.with(|scratch| {
        MESSAGE_BUFFER.with(|buf| {
            let mut scratch = scratch
                .try_borrow_mut()
                .map_err(|_| ErrorCode::LogSpaceInsufficient)?;
            let mut buf = buf
                .try_borrow_mut()
                .map_err(|_| ErrorCode::LogSpaceInsufficient)?;

            scratch.clear();
            reserve(&mut scratch, size)?;

            if fmt::write(&mut ByteWriter(&mut scratch), args).is_err() {
                scratch.clear();
                return Err(ErrorCode::LogFormat);
            }

            scratch.push(0);

            reserve(&mut buf, size)?;
            buf.clear();
            buf.extend_from_slice(&scratch);
            Ok(())
        })
    });

    match result {
        Ok(()) => {
            log.entry = Entry::Buffered;
            Ok(())
        }
        Err(err) => {
            log.entry = Entry::Static(err.code());
            Err(err)
        }
    }
}

/// Records a formatted message in an `Option<&mut Log>`.
///
/// ```ignore
/// log_fmt!(log, LogLevel::Error, "{}, error offset = {}", msg, offset);
/// ```
macro_rules! log_fmt {
    ($log:expr, $level:expr, $($arg:tt)+) => {
        $crate::logging::fill_fmt($log, $level, format_args!($($arg)+))
    };
}

pub(crate) use log_fmt;

/// Resets the log buffer of the calling thread.
///
/// Must be called before the first use of the integrator in a thread.
/// Calling it more than once is harmless.
pub fn init() {
    reset_buffer()
}

/// Frees the log buffer of the calling thread.
///
/// Must be called after the last use of the integrator in a thread. Any
/// pointer previously returned by [`Log::as_c_ptr`] for a formatted message
/// is invalid after this call.
pub fn release() {
    reset_buffer()
}

fn reset_buffer() {
    for buffer in [&MESSAGE_BUFFER, &SCRATCH_BUFFER] {
        buffer.with(|buf| {
            if let Ok(mut buf) = buf.try_borrow_mut() {
                *buf = Vec::new();
            }
        })
    }
}

/// Makes room for `size` bytes in `buf`, growing it only if its capacity
/// is not enough. The contents of `buf` are kept.
fn reserve(buf: &mut Vec<u8>, size: usize) -> Result<(), ErrorCode> {
    if size > buf.capacity() {
        buf.try_reserve_exact(size - buf.len())
            .map_err(|_| ErrorCode::LogSpaceInsufficient)?;
    }
    Ok(())
}

#[cfg(test)]
pub(crate) fn buffer_capacity() -> usize {
    MESSAGE_BUFFER.with(|buf| buf.borrow().capacity())
}

struct Counter(usize);

impl fmt::Write for Counter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0 += s.len();
        Ok(())
    }
}

struct ByteWriter<'a>(&'a mut Vec<u8>);

impl fmt::Write for ByteWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0.extend_from_slice(s.as_bytes());
        Ok(())
    }
}
