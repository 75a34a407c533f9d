// ABOUTME: Thread-safe handle around a playback clock
// ABOUTME: Mutex-guarded single-writer, multi-reader access for sync consumers

use crate::clock::PlaybackClock;
use crate::timestamp::MediaTimestamp;
use crate::Result;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// A [`PlaybackClock`] behind a mutex, for pipelines where queries come from
/// other threads than the output callback.
///
/// Cloning the handle is cheap and shares the same clock. The single-writer
/// contract still applies: only the output callback thread should call
/// [`wrote_audio`](Self::wrote_audio) and
/// [`compensate_for_suspended_writes`](Self::compensate_for_suspended_writes);
/// readers on any thread get a consistent snapshot through the same lock.
/// Every method holds the lock only for the duration of one clock call, all
/// of which are short in-memory walks over the buffered rate segments.
#[derive(Debug, Clone)]
pub struct SharedPlaybackClock {
    inner: Arc<Mutex<PlaybackClock>>,
}

impl SharedPlaybackClock {
    /// Create a shared clock; see [`PlaybackClock::new`].
    pub fn new(start_timestamp: MediaTimestamp, sample_rate: u32) -> Result<Self> {
        Ok(Self {
            inner: Arc::new(Mutex::new(PlaybackClock::new(start_timestamp, sample_rate)?)),
        })
    }

    /// Wrap an existing clock.
    pub fn from_clock(clock: PlaybackClock) -> Self {
        Self {
            inner: Arc::new(Mutex::new(clock)),
        }
    }

    /// Record one render cycle; see [`PlaybackClock::wrote_audio`].
    pub fn wrote_audio(
        &self,
        frames_written: i64,
        frames_requested: i64,
        delay_frames: i64,
        playback_rate: f64,
    ) -> Result<()> {
        self.inner
            .lock()
            .wrote_audio(frames_written, frames_requested, delay_frames, playback_rate)
    }

    /// Resynchronize after a callback-free gap; see
    /// [`PlaybackClock::compensate_for_suspended_writes`].
    pub fn compensate_for_suspended_writes(
        &self,
        elapsed: Duration,
        delay_frames: i64,
    ) -> Result<()> {
        self.inner
            .lock()
            .compensate_for_suspended_writes(elapsed, delay_frames)
    }

    /// Output-buffer time until `timestamp` is heard; see
    /// [`PlaybackClock::time_until_playback`].
    pub fn time_until_playback(&self, timestamp: MediaTimestamp) -> Result<Duration> {
        self.inner.lock().time_until_playback(timestamp)
    }

    /// Media timestamp of the next frame to become audible.
    pub fn front_timestamp(&self) -> MediaTimestamp {
        self.inner.lock().front_timestamp()
    }

    /// Media timestamp just past the most recently written real frame.
    pub fn back_timestamp(&self) -> MediaTimestamp {
        self.inner.lock().back_timestamp()
    }

    /// Both timestamps under one lock acquisition, so readers never see a
    /// front from one render cycle paired with a back from another.
    pub fn timestamps(&self) -> (MediaTimestamp, MediaTimestamp) {
        let clock = self.inner.lock();
        (clock.front_timestamp(), clock.back_timestamp())
    }

    /// Contiguous buffered audio across rate changes; see
    /// [`PlaybackClock::contiguous_audio_buffered`].
    pub fn contiguous_audio_buffered(&self) -> Duration {
        self.inner.lock().contiguous_audio_buffered()
    }

    /// Contiguous buffered audio at the head rate only; see
    /// [`PlaybackClock::contiguous_audio_buffered_at_same_rate`].
    pub fn contiguous_audio_buffered_at_same_rate(&self) -> Duration {
        self.inner.lock().contiguous_audio_buffered_at_same_rate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_one_clock() {
        let writer = SharedPlaybackClock::new(MediaTimestamp::ZERO, 48_000).unwrap();
        let reader = writer.clone();

        writer.wrote_audio(480, 480, 240, 1.0).unwrap();

        assert_eq!(reader.back_timestamp(), MediaTimestamp::from_millis(10));
        let (front, back) = reader.timestamps();
        assert_eq!(front, MediaTimestamp::ZERO);
        assert_eq!(back, MediaTimestamp::from_millis(10));
    }

    #[test]
    fn test_construction_error_propagates() {
        assert!(SharedPlaybackClock::new(MediaTimestamp::ZERO, 0).is_err());
    }
}
