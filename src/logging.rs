//! # Logging Setup
//!
//! The library logs through the `log` facade. The binary installs
//! `env_logger` once at startup with [`init`], writing to stderr so the
//! output of the command being run stays untouched on stdout.
//!
//! ## Respecting User Preferences
//!
//! The log level comes from `--log-level` or the config file; `RUST_LOG`
//! refines it when set. Colors follow `--color` and, in `auto` mode:
//! - `NO_COLOR` - Disables colors when set (per https://no-color.org/)
//! - `CLICOLOR=0` - Disables colors
//! - `CLICOLOR_FORCE=1` - Forces colors even in non-TTY
//! - `TERM=dumb` - Disables colors for dumb terminals

use std::env;

use log::LevelFilter;

/// Default level when neither the CLI nor the config file set one.
pub const DEFAULT_LEVEL: LevelFilter = LevelFilter::Warn;

/// When to color log output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ColorChoice {
    /// Detect from the environment and terminal.
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorChoice {
    /// Whether log output should be colored.
    pub fn use_color(self) -> bool {
        match self {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => detect_color_support(),
        }
    }
}

/// Detect whether color output is supported based on environment.
fn detect_color_support() -> bool {
    // The presence of the variable (even if empty) disables colors
    if env::var_os("NO_COLOR").is_some() {
        return false;
    }

    if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
        return false;
    }

    if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
        return true;
    }

    if env::var("TERM").is_ok_and(|v| v == "dumb") {
        return false;
    }

    console::Term::stderr().features().colors_supported()
}

/// Parse a log level name (`error`, `warn`, `info`, `debug`, `trace`, `off`).
pub fn parse_level(value: &str) -> Result<LevelFilter, String> {
    value.parse::<LevelFilter>().map_err(|_| {
        format!(
            "invalid log level '{}', expected one of: off, error, warn, info, debug, trace",
            value
        )
    })
}

/// Install the global logger.
///
/// Does nothing if a logger is already installed.
pub fn init(level: LevelFilter, color: ColorChoice) {
    let style = if color.use_color() {
        env_logger::WriteStyle::Always
    } else {
        env_logger::WriteStyle::Never
    };

    let result = env_logger::Builder::new()
        .filter_level(level)
        .parse_env(env_logger::Env::default().filter("RUST_LOG"))
        .write_style(style)
        .target(env_logger::Target::Stderr)
        .try_init();
    if result.is_ok() {
        log::debug!("Logging initialized at level {}", level);
    }
}
