//! Environment-driven configuration.
//!
//! Variables (command-line flags take precedence):
//! - `FINDBY_PLATFORM_STRATEGIES`: `0`, `false`, `no` or `off` disables the
//!   `android=`, `ios=` and `~` shorthands (default: enabled)
//! - `FINDBY_RELATIVE`: build relative (`./`) XPath by default (default: off)
//! - `FINDBY_MAX_REQUEST_SIZE`: byte limit for one `serve` request line
//!   (default: 1 MiB)
//!
//! Empty values are ignored. Unparseable values log a warning and keep the
//! default.

use std::env;

use findby_core::ResolverOptions;

/// Default maximum size of a single request line.
pub const DEFAULT_MAX_REQUEST_SIZE: usize = 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub platform_strategies: bool,
    pub relative: bool,
    pub max_request_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            platform_strategies: true,
            relative: false,
            max_request_size: DEFAULT_MAX_REQUEST_SIZE,
        }
    }
}

impl Config {
    /// Read configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        Self {
            platform_strategies: get("FINDBY_PLATFORM_STRATEGIES")
                .and_then(|v| parse_flag("FINDBY_PLATFORM_STRATEGIES", &v))
                .unwrap_or(defaults.platform_strategies),
            relative: get("FINDBY_RELATIVE")
                .and_then(|v| parse_flag("FINDBY_RELATIVE", &v))
                .unwrap_or(defaults.relative),
            max_request_size: get("FINDBY_MAX_REQUEST_SIZE")
                .and_then(|v| parse_size("FINDBY_MAX_REQUEST_SIZE", &v))
                .unwrap_or(defaults.max_request_size),
        }
    }

    pub fn resolver_options(&self) -> ResolverOptions {
        ResolverOptions {
            platform_strategies: self.platform_strategies,
        }
    }
}

fn parse_flag(name: &str, value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => {
            tracing::warn!("Ignoring {}='{}': expected a boolean", name, value);
            None
        }
    }
}

fn parse_size(name: &str, value: &str) -> Option<usize> {
    match value.trim().parse::<usize>() {
        Ok(size) if size > 0 => Some(size),
        _ => {
            tracing::warn!("Ignoring {}='{}': expected a positive byte count", name, value);
            None
        }
    }
}
