//! Sinew Logging
//!
//! Stderr logging for code that runs inside the compiler. Expansion output
//! interleaves with rustc's own diagnostics, so lines are short and quiet by
//! default: only `WARN` and above print unless the environment asks for more.
//!
//! ```rust
//! use sinew_log::{debug, scope};
//!
//! let _scope = scope("Greeter");
//! debug!("provider field already declared");
//! // with SINEW_DEBUG=1:
//! // sinew D synth::service [Greeter] provider field already declared
//! ```
//!
//! # Environment Variables
//!
//! - `SINEW_DEBUG=1` - Shorthand for `SINEW_LOG=debug`
//! - `SINEW_LOG=trace|debug|info|warn|error|off` - Minimum level
//! - `SINEW_LOG_TIMESTAMPS=1` - Prefix each line with the wall-clock time

use once_cell::sync::Lazy;
use std::cell::RefCell;
use std::env;
use std::fmt;
use std::io::Write;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

/// Severity of a log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Level {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
    /// Disables output entirely
    Off = 5,
}

impl Level {
    /// Single-letter tag used in the line prefix.
    pub fn tag(self) -> char {
        match self {
            Level::Trace => 'T',
            Level::Debug => 'D',
            Level::Info => 'I',
            Level::Warn => 'W',
            Level::Error => 'E',
            Level::Off => '-',
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            0 => Level::Trace,
            1 => Level::Debug,
            2 => Level::Info,
            3 => Level::Warn,
            4 => Level::Error,
            _ => Level::Off,
        }
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(Level::Trace),
            "debug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "warn" | "warning" => Ok(Level::Warn),
            "error" => Ok(Level::Error),
            "off" | "none" | "0" => Ok(Level::Off),
            other => Err(format!("unknown log level `{}`", other)),
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Level::Trace => "trace",
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
            Level::Off => "off",
        };
        f.write_str(name)
    }
}

static LOG_LEVEL: AtomicU8 = AtomicU8::new(Level::Warn as u8);
static TIMESTAMPS: AtomicBool = AtomicBool::new(false);

static CONFIG: Lazy<LogConfig> = Lazy::new(|| {
    let config = LogConfig::from_env();
    config.apply();
    config
});

/// Settings read once from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub level: Level,
    pub timestamps: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::Warn,
            timestamps: false,
        }
    }
}

impl LogConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build a config from an arbitrary variable lookup.
    ///
    /// An explicit `SINEW_LOG` wins over `SINEW_DEBUG`; unparseable values
    /// fall back to the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let flag = |name: &str| {
            lookup(name)
                .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
                .unwrap_or(false)
        };

        let level = lookup("SINEW_LOG")
            .and_then(|value| value.parse().ok())
            .unwrap_or(if flag("SINEW_DEBUG") {
                Level::Debug
            } else {
                defaults.level
            });

        Self {
            level,
            timestamps: flag("SINEW_LOG_TIMESTAMPS"),
        }
    }

    fn apply(&self) {
        LOG_LEVEL.store(self.level as u8, Ordering::SeqCst);
        TIMESTAMPS.store(self.timestamps, Ordering::SeqCst);
    }
}

/// Read the environment once. Later calls are no-ops.
pub fn init() {
    Lazy::force(&CONFIG);
}

#[inline]
pub fn is_level_enabled(level: Level) -> bool {
    init();
    level != Level::Off && level as u8 >= LOG_LEVEL.load(Ordering::Relaxed)
}

pub fn current_level() -> Level {
    Level::from_u8(LOG_LEVEL.load(Ordering::Relaxed))
}

/// Override the level for the rest of the process. Applied after the
/// environment is read, so it always wins.
pub fn set_level(level: Level) {
    init();
    LOG_LEVEL.store(level as u8, Ordering::SeqCst);
}

thread_local! {
    static SCOPES: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
}

/// Tags every line logged on this thread with `name` until the guard drops.
///
/// Scopes nest; the innermost one is printed.
#[must_use = "the scope ends when the guard is dropped"]
pub fn scope(name: impl fmt::Display) -> ScopeGuard {
    SCOPES.with(|scopes| scopes.borrow_mut().push(name.to_string()));
    ScopeGuard { _private: () }
}

/// Returned by [`scope`].
#[derive(Debug)]
pub struct ScopeGuard {
    _private: (),
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        SCOPES.with(|scopes| {
            scopes.borrow_mut().pop();
        });
    }
}

fn current_scope() -> Option<String> {
    SCOPES.with(|scopes| scopes.borrow().last().cloned())
}

/// `sinew_synth::service` -> `synth::service`
fn short_target(target: &str) -> &str {
    target.strip_prefix("sinew_").unwrap_or(target)
}

fn render(
    level: Level,
    target: &str,
    scope: Option<&str>,
    time: Option<&str>,
    message: fmt::Arguments<'_>,
) -> String {
    let mut line = String::from("sinew ");
    if let Some(time) = time {
        line.push_str(time);
        line.push(' ');
    }
    line.push(level.tag());
    line.push(' ');
    line.push_str(short_target(target));
    if let Some(scope) = scope {
        line.push_str(" [");
        line.push_str(scope);
        line.push(']');
    }
    line.push(' ');
    fmt::Write::write_fmt(&mut line, message).ok();
    line
}

#[doc(hidden)]
pub fn log(level: Level, target: &str, message: fmt::Arguments<'_>) {
    if !is_level_enabled(level) {
        return;
    }

    let time = TIMESTAMPS
        .load(Ordering::Relaxed)
        .then(|| chrono::Local::now().format("%H:%M:%S%.3f").to_string());
    let line = render(
        level,
        target,
        current_scope().as_deref(),
        time.as_deref(),
        message,
    );
    let _ = writeln!(std::io::stderr().lock(), "{}", line);
}

#[doc(hidden)]
#[macro_export]
macro_rules! __log {
    ($level:expr, target: $target:expr, $($arg:tt)+) => {
        if $crate::is_level_enabled($level) {
            $crate::log($level, $target, format_args!($($arg)+));
        }
    };
    ($level:expr, $($arg:tt)+) => {
        $crate::__log!($level, target: module_path!(), $($arg)+)
    };
}

/// Matcher-level detail, only with `SINEW_LOG=trace`.
#[macro_export]
macro_rules! trace {
    ($($arg:tt)+) => { $crate::__log!($crate::Level::Trace, $($arg)+) };
}

/// Per-declaration decisions: what was skipped, what was generated.
///
/// ```rust
/// sinew_log::debug!(target: "sinew::matcher", "no alias named {}", "GreeterInterface");
/// ```
#[macro_export]
macro_rules! debug {
    ($($arg:tt)+) => { $crate::__log!($crate::Level::Debug, $($arg)+) };
}

#[macro_export]
macro_rules! info {
    ($($arg:tt)+) => { $crate::__log!($crate::Level::Info, $($arg)+) };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)+) => { $crate::__log!($crate::Level::Warn, $($arg)+) };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)+) => { $crate::__log!($crate::Level::Error, $($arg)+) };
}
