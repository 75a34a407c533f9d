// ABOUTME: Media-timeline timestamp type
// ABOUTME: Microsecond-precision position on the content's own timeline

use std::ops::{Add, AddAssign, Sub};
use std::time::Duration;

/// A position on a media timeline, in microseconds.
///
/// Media timestamps are distinct from wall-clock time: they measure where
/// playback sits within the content, and advance at `playback_rate` times
/// real time. Positions may be negative (content trimmed before zero, or
/// streams whose timeline starts mid-file).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MediaTimestamp {
    micros: i64,
}

impl MediaTimestamp {
    /// The zero position of the media timeline
    pub const ZERO: MediaTimestamp = MediaTimestamp { micros: 0 };

    /// Create a timestamp from microseconds
    pub const fn from_micros(micros: i64) -> Self {
        Self { micros }
    }

    /// Create a timestamp from milliseconds
    pub const fn from_millis(millis: i64) -> Self {
        Self {
            micros: millis * 1_000,
        }
    }

    /// Create a timestamp from fractional seconds, truncated to microseconds
    pub fn from_secs_f64(secs: f64) -> Self {
        Self {
            micros: (secs * 1_000_000.0) as i64,
        }
    }

    /// This timestamp in microseconds
    pub const fn as_micros(&self) -> i64 {
        self.micros
    }

    /// This timestamp in fractional seconds
    pub fn as_secs_f64(&self) -> f64 {
        self.micros as f64 / 1_000_000.0
    }

    /// Duration from `earlier` to `self`, or `Duration::ZERO` if `earlier`
    /// is actually later.
    pub fn saturating_duration_since(&self, earlier: MediaTimestamp) -> Duration {
        if self.micros <= earlier.micros {
            Duration::ZERO
        } else {
            Duration::from_micros((self.micros - earlier.micros) as u64)
        }
    }
}

impl Add<Duration> for MediaTimestamp {
    type Output = MediaTimestamp;

    fn add(self, rhs: Duration) -> MediaTimestamp {
        MediaTimestamp {
            micros: self.micros + rhs.as_micros() as i64,
        }
    }
}

impl AddAssign<Duration> for MediaTimestamp {
    fn add_assign(&mut self, rhs: Duration) {
        self.micros += rhs.as_micros() as i64;
    }
}

impl Sub<Duration> for MediaTimestamp {
    type Output = MediaTimestamp;

    fn sub(self, rhs: Duration) -> MediaTimestamp {
        MediaTimestamp {
            micros: self.micros - rhs.as_micros() as i64,
        }
    }
}
