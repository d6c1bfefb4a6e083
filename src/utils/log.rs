//! Simple logging module with macros.
//!
//! Messages go to stderr with a colored level tag and an optional timestamp.
//! The level filter and the timestamp switch are read from the environment by
//! [`init_from_env`]:
//!
//! - `HACKVM_LOG`: `debug`, `info` (default), `warn`, `error` or `off`
//! - `HACKVM_LOG_TIMESTAMP`: `0`, `false` or `off` hides timestamps

use std::fmt::Display;
use std::io::Write;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Environment variable holding the level filter.
pub const LEVEL_ENV: &str = "HACKVM_LOG";
/// Environment variable toggling timestamps.
pub const TIMESTAMP_ENV: &str = "HACKVM_LOG_TIMESTAMP";

/// Log level for filtering messages.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Debug = 0,
    Info = 1,
    Warn = 2,
    Error = 3,
}

impl Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Level::Debug => write!(f, "DEBUG"),
            Level::Info => write!(f, "INFO"),
            Level::Warn => write!(f, "WARN"),
            Level::Error => write!(f, "ERROR"),
        }
    }
}

/// Level filter parsed from [`LEVEL_ENV`]. `Off` silences everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    Level(Level),
    Off,
}

impl FromStr for Filter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(Filter::Level(Level::Debug)),
            "info" => Ok(Filter::Level(Level::Info)),
            "warn" | "warning" => Ok(Filter::Level(Level::Warn)),
            "error" => Ok(Filter::Level(Level::Error)),
            "off" | "none" => Ok(Filter::Off),
            other => Err(format!("unknown log level '{other}'")),
        }
    }
}

const OFF: u8 = u8::MAX;

pub static SHOW_TIMESTAMP: AtomicBool = AtomicBool::new(true);
pub static SHOW_TYPE: AtomicBool = AtomicBool::new(true);
static MIN_LEVEL: AtomicU8 = AtomicU8::new(Level::Info as u8);

/// Sets the minimum level that will be written.
pub fn set_filter(filter: Filter) {
    let raw = match filter {
        Filter::Level(level) => level as u8,
        Filter::Off => OFF,
    };
    MIN_LEVEL.store(raw, Ordering::Relaxed);
}

/// Returns true if messages at `level` pass the current filter.
pub fn enabled(level: Level) -> bool {
    let min = MIN_LEVEL.load(Ordering::Relaxed);
    min != OFF && level as u8 >= min
}

/// Applies [`LEVEL_ENV`] and [`TIMESTAMP_ENV`].
///
/// An unparsable level is reported once as a warning and the default is kept.
pub fn init_from_env() {
    configure(
        std::env::var(LEVEL_ENV).ok().as_deref(),
        std::env::var(TIMESTAMP_ENV).ok().as_deref(),
    );
}

fn configure(level: Option<&str>, timestamp: Option<&str>) {
    if let Some(raw) = level {
        match raw.parse::<Filter>() {
            Ok(filter) => set_filter(filter),
            Err(reason) => log(Level::Warn, &format!("{LEVEL_ENV}: {reason}")),
        }
    }
    if let Some(raw) = timestamp {
        let hide = matches!(
            raw.trim().to_ascii_lowercase().as_str(),
            "0" | "false" | "off" | "no"
        );
        SHOW_TIMESTAMP.store(!hide, Ordering::Relaxed);
    }
}

/// Converts days since Unix epoch to (year, month, day).
fn days_to_date(days: u64) -> (u32, u32, u32) {
    // Algorithm based on Howard Hinnant's date algorithms
    let z = days as i64 + 719468;
    let era = z.div_euclid(146097);
    let doe = z.rem_euclid(146097) as u32;
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146096) / 365;
    let y = yoe as i64 + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = doy - (153 * mp + 2) / 5 + 1;
    let m = if mp < 10 { mp + 3 } else { mp - 9 };
    let y = if m <= 2 { y + 1 } else { y };
    (y as u32, m, d)
}

fn write_timestamp(out: &mut impl Write) {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default();
    let secs = now.as_secs();
    let (year, month, day) = days_to_date(secs / 86400);
    let _ = write!(
        out,
        "{:04}-{:02}-{:02} {:02}:{:02}:{:02}.{:03} ",
        year,
        month,
        day,
        (secs / 3600) % 24,
        (secs / 60) % 60,
        secs % 60,
        now.subsec_millis()
    );
}

/// Internal logging function. Use the `debug!`, `info!`, `warn!`, or `error!` macros instead.
#[doc(hidden)]
pub fn log(level: Level, message: &str) {
    if !enabled(level) {
        return;
    }

    let mut stderr = StandardStream::stderr(ColorChoice::Auto);
    let mut spec = ColorSpec::new();
    match level {
        Level::Debug => {
            spec.set_fg(Some(Color::Cyan));
        }
        Level::Info => {
            spec.clear();
        }
        Level::Warn => {
            spec.set_fg(Some(Color::Yellow)).set_bold(true);
        }
        Level::Error => {
            spec.set_fg(Some(Color::Red)).set_bold(true);
        }
    }
    let _ = stderr.set_color(&spec);

    if SHOW_TIMESTAMP.load(Ordering::Relaxed) {
        write_timestamp(&mut stderr);
    }
    if SHOW_TYPE.load(Ordering::Relaxed) {
        let _ = write!(stderr, "[{:5}] ", level);
    }
    let _ = writeln!(stderr, "{}", message);
    let _ = stderr.reset();
}

/// Logs a debug-level message.
#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {{
        if cfg!(not(test)) && $crate::utils::log::enabled($crate::utils::log::Level::Debug) {
            $crate::utils::log::log($crate::utils::log::Level::Debug, &format!($($arg)*))
        }
    }};
}

/// Logs an info-level message.
#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {{
        if cfg!(not(test)) {
            $crate::utils::log::log($crate::utils::log::Level::Info, &format!($($arg)*))
        }
    }};
}

/// Logs a warning-level message.
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {{
        if cfg!(not(test)) {
            $crate::utils::log::log($crate::utils::log::Level::Warn, &format!($($arg)*))
        }
    }};
}

/// Logs an error-level message.
#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {{
        if cfg!(not(test)) {
            $crate::utils::log::log($crate::utils::log::Level::Error, &format!($($arg)*))
        }
    }};
}
