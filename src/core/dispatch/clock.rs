//! Clock abstraction so cooldown and paginator timing can be driven in tests.
//!
//! `SystemClock` reads wall-clock unix milliseconds. Tests use the manual clock
//! in `test_support`.

use chrono::Utc;

pub trait Clock: Send + Sync {
    /// Current time in unix milliseconds.
    fn now_millis(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}
