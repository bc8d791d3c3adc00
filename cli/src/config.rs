use std::path::Path;

use figment::{
    providers::{Format, Serialized, Toml},
    Figment,
};
use regex_integrator::{LogLevel, Params, PcreLimits, Priority};
use serde::{Deserialize, Serialize};

/// Configuration for the CLI.
#[derive(Deserialize, Serialize, Debug)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Engines tried when the command line doesn't specify a priority.
    /// When missing the library's default priority is used.
    pub priority: Option<Priority>,
    /// Threshold for the messages produced while compiling and executing
    /// patterns.
    pub log_level: LogLevel,
    /// Limit on the number of PCRE matching steps. 0 means no limit.
    pub match_limit: u32,
    /// Limit on the PCRE backtracking depth. 0 means no limit.
    pub match_limit_recursion: u32,
}

impl Config {
    /// Parameters used when compiling patterns, the same limits apply to
    /// PCRE and PCRE-JIT.
    pub fn params(&self) -> Params {
        Params::with_limits(PcreLimits::new(
            self.match_limit,
            self.match_limit_recursion,
        ))
    }
}

impl Default for Config {
    fn default() -> Config {
        Config {
            priority: None,
            log_level: LogLevel::Error,
            match_limit: 0,
            match_limit_recursion: 0,
        }
    }
}

/// Load a config file from a given path. Path must contain a valid TOML file
/// or this function will propagate the error.
pub fn load_config_from_file(
    config_file: &Path,
) -> Result<Config, Box<figment::Error>> {
    let config: Config =
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file_exact(config_file))
            .extract()?;
    Ok(config)
}
