//! Logging infrastructure for the dumper core.
//!
//! Messages go through the `log` facade, tagged with a category prefix. Hot
//! paths (one message per bank of a multi-megabyte dump) go through a
//! [`RateLimiter`] so the serial-bound loop is not drowned in output.

use std::sync::atomic::{AtomicU32, Ordering};

/// Log categories for filtering and rate limiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogCategory {
    Bus,
    Bank,
    Command,
    Serial,
    Status,
}

impl LogCategory {
    pub(crate) fn prefix(self) -> &'static str {
        match self {
            LogCategory::Bus => "[Bus]",
            LogCategory::Bank => "[Bank]",
            LogCategory::Command => "[Cmd]",
            LogCategory::Serial => "[Serial]",
            LogCategory::Status => "[Status]",
        }
    }

    /// `log` target, so `RUST_LOG=gb_dumper::bank=trace` style filters work.
    pub fn target(self) -> &'static str {
        match self {
            LogCategory::Bus => "gb_dumper::bus",
            LogCategory::Bank => "gb_dumper::bank",
            LogCategory::Command => "gb_dumper::command",
            LogCategory::Serial => "gb_dumper::serial",
            LogCategory::Status => "gb_dumper::status",
        }
    }
}

/// Rate limiter that tracks how many times a particular log point has been hit.
pub struct RateLimiter {
    counter: AtomicU32,
    limit: u32,
}

impl RateLimiter {
    /// Create a new rate limiter that allows `limit` messages.
    pub const fn new(limit: u32) -> Self {
        RateLimiter {
            counter: AtomicU32::new(0),
            limit,
        }
    }

    /// Check if we should log. Returns true if under the limit.
    pub fn should_log(&self) -> bool {
        let count = self.counter.fetch_add(1, Ordering::Relaxed);
        count < self.limit
    }

    /// Like [`should_log`](Self::should_log), but also lets every
    /// `interval`-th hit through once the limit is exhausted.
    pub fn should_log_interval(&self, interval: u32) -> bool {
        let count = self.counter.fetch_add(1, Ordering::Relaxed);
        count < self.limit || (interval != 0 && count % interval == 0)
    }

    /// Get current count without incrementing.
    pub fn count(&self) -> u32 {
        self.counter.load(Ordering::Relaxed)
    }
}

/// Thin category-aware front for the `log` facade.
pub struct Logger;

impl Logger {
    /// Metadata a message in `category` is filtered by.
    pub fn metadata(level: ::log::Level, category: LogCategory) -> ::log::Metadata<'static> {
        ::log::Metadata::builder()
            .level(level)
            .target(category.target())
            .build()
    }

    /// Whether the installed logger accepts `level` for `category`'s target.
    pub fn enabled(level: ::log::Level, category: LogCategory) -> bool {
        level <= ::log::max_level() && ::log::logger().enabled(&Self::metadata(level, category))
    }

    pub fn log(level: ::log::Level, category: LogCategory, msg: &str) {
        ::log::log!(target: category.target(), level, "{} {}", category.prefix(), msg);
    }

    pub fn debug(category: LogCategory, msg: &str) {
        Self::log(::log::Level::Debug, category, msg);
    }

    pub fn info(category: LogCategory, msg: &str) {
        Self::log(::log::Level::Info, category, msg);
    }

    pub fn warn(category: LogCategory, msg: &str) {
        Self::log(::log::Level::Warn, category, msg);
    }

    /// Log at debug level with rate limiting at intervals.
    pub fn debug_interval(category: LogCategory, limiter: &RateLimiter, interval: u32, msg: &str) {
        if limiter.should_log_interval(interval) {
            Self::debug(category, msg);
        }
    }
}

/// Convenience macros for logging. The message is only formatted when the
/// level is enabled.
#[macro_export]
macro_rules! log_debug {
    ($cat:expr, $($arg:tt)*) => {{
        let cat = $cat;
        if $crate::log::Logger::enabled(::log::Level::Debug, cat) {
            $crate::log::Logger::debug(cat, &format!($($arg)*))
        }
    }};
}

#[macro_export]
macro_rules! log_info {
    ($cat:expr, $($arg:tt)*) => {{
        let cat = $cat;
        if $crate::log::Logger::enabled(::log::Level::Info, cat) {
            $crate::log::Logger::info(cat, &format!($($arg)*))
        }
    }};
}

#[macro_export]
macro_rules! log_warn {
    ($cat:expr, $($arg:tt)*) => {
        $crate::log::Logger::warn($cat, &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_debug_interval {
    ($cat:expr, $limiter:expr, $interval:expr, $($arg:tt)*) => {{
        let cat = $cat;
        if $crate::log::Logger::enabled(::log::Level::Debug, cat) {
            $crate::log::Logger::debug_interval(cat, $limiter, $interval, &format!($($arg)*))
        }
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limiter_limit() {
        let limiter = RateLimiter::new(2);
        assert!(limiter.should_log());
        assert!(limiter.should_log());
        assert!(!limiter.should_log());
        assert_eq!(limiter.count(), 3);
    }

    #[test]
    fn test_rate_limiter_interval() {
        let limiter = RateLimiter::new(1);
        let allowed: Vec<bool> = (0..9).map(|_| limiter.should_log_interval(4)).collect();
        // count 0 is under the limit; 4 and 8 hit the interval
        assert_eq!(
            allowed,
            vec![true, false, false, false, true, false, false, false, true]
        );
    }

    #[test]
    fn test_category_targets_are_distinct() {
        let all = [
            LogCategory::Bus,
            LogCategory::Bank,
            LogCategory::Command,
            LogCategory::Serial,
            LogCategory::Status,
        ];
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert_ne!(a.target(), b.target());
                assert_ne!(a.prefix(), b.prefix());
            }
        }
    }

    #[test]
    fn test_category_filter_applies_to_target() {
        use ::log::{Level, Log};

        let filter = env_logger::Builder::new()
            .parse_filters("gb_dumper::command=debug")
            .build();
        assert!(filter.enabled(&Logger::metadata(Level::Debug, LogCategory::Command)));
        assert!(!filter.enabled(&Logger::metadata(Level::Debug, LogCategory::Bank)));
        assert_eq!(
            Logger::metadata(Level::Info, LogCategory::Command).target(),
            "gb_dumper::command"
        );
    }
}
