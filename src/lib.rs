// ABOUTME: Main library entry point for playclock
// ABOUTME: Exports the playback clock, media timestamps, and shared handle

//! # playclock
//!
//! A playback clock for buffered, rate-adjustable audio pipelines.
//!
//! Audio output paths buffer: frames handed to the device on one callback are
//! not heard until device latency has drained. This crate reconstructs, from
//! per-callback bookkeeping alone, (a) the media timestamp the listener is
//! hearing *right now* and (b) how much wall-clock time separates now from
//! the moment a future media timestamp becomes audible. It handles playback
//! rate changes (including pause, i.e. rate 0), output underruns, and
//! suspend/resume gaps, in memory bounded by the number of rate changes
//! currently buffered rather than the number of callbacks.
//!
//! ## Example
//!
//! ```
//! use playclock::{MediaTimestamp, PlaybackClock};
//!
//! let mut clock = PlaybackClock::new(MediaTimestamp::ZERO, 48_000).unwrap();
//!
//! // Once per render cycle, from the audio output callback:
//! clock.wrote_audio(480, 480, 240, 1.0).unwrap();
//!
//! // From anywhere else (behind your synchronization boundary):
//! let hearing_now = clock.front_timestamp();
//! let wait = clock.time_until_playback(clock.back_timestamp()).unwrap();
//! println!("listener is at {hearing_now:?}, back of buffer audible in {wait:?}");
//! ```

#![warn(missing_docs)]

/// The playback clock itself
pub mod clock;
/// Media-timeline timestamp type
pub mod timestamp;

mod queue;
mod shared;

pub use clock::PlaybackClock;
pub use shared::SharedPlaybackClock;
pub use timestamp::MediaTimestamp;

/// Result type for playclock operations
pub type Result<T> = std::result::Result<T, error::Error>;

/// Error types for playclock
pub mod error {
    use crate::timestamp::MediaTimestamp;
    use thiserror::Error;

    /// Error types for playclock operations
    ///
    /// Every variant is a caller contract violation: the clock is a pure,
    /// deterministic function of its inputs and current state, so there is
    /// nothing to retry. State is left untouched when an error is returned.
    #[derive(Error, Debug, Clone, PartialEq)]
    pub enum Error {
        /// Sample rate of zero passed at construction
        #[error("sample rate must be nonzero")]
        InvalidSampleRate,

        /// Frame counts out of range: requires 0 <= written <= requested
        #[error("invalid frame counts: written={written}, requested={requested}")]
        InvalidFrameCount {
            /// Frames reported as written
            written: i64,
            /// Frames reported as requested
            requested: i64,
        },

        /// Negative device delay reported
        #[error("delay frames must be non-negative, got {0}")]
        NegativeDelay(i64),

        /// Playback rate is negative or not finite
        #[error("playback rate must be finite and non-negative, got {0}")]
        InvalidPlaybackRate(f64),

        /// `time_until_playback` target outside the buffered range
        #[error("timestamp {timestamp:?} outside buffered range [{front:?}, {back:?}]")]
        TimestampOutOfRange {
            /// The requested timestamp
            timestamp: MediaTimestamp,
            /// Earliest queryable timestamp (currently audible)
            front: MediaTimestamp,
            /// Latest queryable timestamp (end of buffered audio)
            back: MediaTimestamp,
        },
    }
}
