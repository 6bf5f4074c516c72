//! Time source for audit timestamps.

use chrono::{DateTime, SubsecRound, Utc};

/// Supplies "now" to the service layer.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock truncated to microseconds, the precision stores persist.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now().trunc_subsecs(6)
    }
}
