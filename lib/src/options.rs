use bitmask::bitmask;
use serde::{Deserialize, Serialize};

bitmask! {
    /// Options that affect how a pattern is compiled. They have the same
    /// meaning no matter which engine ends up running the pattern.
    #[derive(Debug)]
    pub mask CompileOptions: u32 where
    /// Each of the compilation options.
    flags CompileOption {
        Caseless = 0x01,
        Multiline = 0x02,
        Dotall = 0x04,
        DollarEndOnly = 0x08,
    }
}

bitmask! {
    /// Options that affect a single execution.
    #[derive(Debug)]
    pub mask ExecOptions: u32 where
    /// Each of the execution options.
    flags ExecOption {
        // An empty string is not a valid match.
        NotEmpty = 0x1000,
    }
}

/// Resource limits for a PCRE study. A value of 0 means "no limit".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PcreLimits {
    /// Limit on the number of internal matching steps.
    pub match_limit: u32,
    /// Limit on the backtracking depth.
    pub match_limit_recursion: u32,
}

impl PcreLimits {
    /// Creates limits with the given values.
    pub fn new(match_limit: u32, match_limit_recursion: u32) -> Self {
        Self { match_limit, match_limit_recursion }
    }
}

/// Per-engine parameters used while compiling a pattern.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Params {
    /// Limits for the PCRE engine.
    pub pcre: PcreLimits,
    /// Limits for the PCRE-JIT engine.
    pub pcre_jit: PcreLimits,
}

impl Params {
    /// Uses the same limits for both PCRE and PCRE-JIT.
    pub fn with_limits(limits: PcreLimits) -> Self {
        Self { pcre: limits, pcre_jit: limits }
    }
}
