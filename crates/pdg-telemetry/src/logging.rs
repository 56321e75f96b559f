// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Logger bootstrap on top of `env_logger`.
//!
//! `RUST_LOG` always wins over the default filter. A `-loglevel=` command line
//! argument, when present, overrides both.

use env_logger::{Builder, Env};
use log::LevelFilter;

/// Prefix of the command line argument selecting the log level.
pub const LOG_LEVEL_ARG: &str = "-loglevel=";

/// Installs the global logger.
///
/// ## Arguments
/// * `default_filter` - Filter used when `RUST_LOG` is not set, e.g. `"info"`.
/// * `level_override` - A level taken from the command line, if any.
///
/// ## Returns
/// `true` if this call installed the logger, `false` if one was already set.
pub fn init(default_filter: &str, level_override: Option<LevelFilter>) -> bool {
    let mut builder = Builder::from_env(Env::default().default_filter_or(default_filter));
    if let Some(level) = level_override {
        builder.filter_level(level);
    }
    let installed = builder.try_init().is_ok();
    if installed {
        log::debug!("Logger initialised (default filter '{default_filter}')");
    }
    installed
}

/// Flushes buffered log output. Called last during teardown.
pub fn flush() {
    log::logger().flush();
}

/// Parses one level name or number.
///
/// Accepts the framework's names (`none`, `fatal`, `error`, `inform`,
/// `detail`, `verbose`, `trace`), the `log` crate's names, and the numeric
/// scale where `-1` is off, `0..=2` errors, `3` warnings, `4..=5`
/// informational, `6..=9` debug and `10` or more trace.
pub fn parse_level(value: &str) -> Option<LevelFilter> {
    let value = value.trim();
    let named = match value.to_ascii_lowercase().as_str() {
        "none" | "off" => Some(LevelFilter::Off),
        "fatal" | "error" => Some(LevelFilter::Error),
        "warn" | "warning" => Some(LevelFilter::Warn),
        "inform" | "info" => Some(LevelFilter::Info),
        "detail" | "verbose" | "debug" => Some(LevelFilter::Debug),
        "trace" => Some(LevelFilter::Trace),
        _ => None,
    };
    named.or_else(|| {
        value.parse::<i32>().ok().map(|n| match n {
            i32::MIN..=-1 => LevelFilter::Off,
            0..=2 => LevelFilter::Error,
            3 => LevelFilter::Warn,
            4..=5 => LevelFilter::Info,
            6..=9 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        })
    })
}

/// Scans command line arguments for `-loglevel=<level>`.
///
/// The last recognised occurrence wins. Returns `default` when none is found.
pub fn level_from_args<I, S>(args: I, default: LevelFilter) -> LevelFilter
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    args.into_iter()
        .filter_map(|arg| {
            let value = arg.as_ref().strip_prefix(LOG_LEVEL_ARG)?;
            let level = parse_level(value);
            if level.is_none() {
                log::warn!("Ignoring unrecognised log level '{value}'");
            }
            level
        })
        .last()
        .unwrap_or(default)
}
