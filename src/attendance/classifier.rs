use chrono::{DateTime, Utc};

use crate::model::attendance::AttendanceStatus;

/// Default half-width of the check-in window, in minutes.
pub const DEFAULT_WINDOW_MINUTES: i64 = 15;

/// A scan arrived at or before `window` minutes ahead of the lecture start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("too early; retry closer to lecture start time")]
pub struct TooEarly;

/// Symmetric window around a lecture's start time.
///
/// With a window of `w` minutes and `delta = observed - scheduled` truncated
/// toward zero to whole minutes:
///
/// | delta            | outcome          |
/// |------------------|------------------|
/// | `delta <= -w`    | `Err(TooEarly)`  |
/// | `-w < delta < w` | `Ok(Present)`    |
/// | `delta >= w`     | `Ok(Late)`       |
///
/// There is no upper bound on lateness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckInWindow {
    minutes: i64,
}

impl CheckInWindow {
    /// Returns `None` for a non-positive window.
    pub fn new(minutes: i64) -> Option<Self> {
        (minutes > 0).then_some(Self { minutes })
    }

    pub fn minutes(&self) -> i64 {
        self.minutes
    }

    pub fn classify(
        &self,
        scheduled_start: DateTime<Utc>,
        observed: DateTime<Utc>,
    ) -> Result<AttendanceStatus, TooEarly> {
        let delta = delta_minutes(scheduled_start, observed);

        if delta <= -self.minutes {
            Err(TooEarly)
        } else if delta >= self.minutes {
            Ok(AttendanceStatus::Late)
        } else {
            Ok(AttendanceStatus::Present)
        }
    }
}

impl Default for CheckInWindow {
    fn default() -> Self {
        Self {
            minutes: DEFAULT_WINDOW_MINUTES,
        }
    }
}

/// Signed whole minutes from `scheduled_start` to `observed`, truncated toward zero.
pub fn delta_minutes(scheduled_start: DateTime<Utc>, observed: DateTime<Utc>) -> i64 {
    (observed - scheduled_start).num_minutes()
}

/// Classifies a check-in against the default 15 minute window.
pub fn classify(
    scheduled_start: DateTime<Utc>,
    observed: DateTime<Utc>,
) -> Result<AttendanceStatus, TooEarly> {
    CheckInWindow::default().classify(scheduled_start, observed)
}
