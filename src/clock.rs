// ABOUTME: Playback clock for buffered, rate-adjustable audio output
// ABOUTME: Reconstructs audible media time from per-callback write bookkeeping

use crate::error::Error;
use crate::queue::PendingQueue;
use crate::timestamp::MediaTimestamp;
use crate::Result;
use std::time::Duration;

/// Tracks the media timeline through a buffered audio output path.
///
/// The output callback reports, once per render cycle, how many frames it
/// produced, how many the device asked for, the device's current latency in
/// frames, and the playback rate those frames were rendered at. From that
/// bookkeeping alone the clock maintains:
///
/// - [`front_timestamp`](Self::front_timestamp): the media timestamp of the
///   next frame to become audible, i.e. what the listener is hearing now.
/// - [`back_timestamp`](Self::back_timestamp): the media timestamp just past
///   the most recently written real (non-silence) frame.
/// - [`time_until_playback`](Self::time_until_playback): how much
///   output-buffer time separates now from the moment a buffered media
///   timestamp is physically heard.
///
/// Pending audio is kept run-length encoded by playback rate, so memory is
/// bounded by the number of buffered rate changes (typically one or two),
/// not by how many callbacks have occurred.
///
/// # Threading
///
/// One clock per output stream. [`wrote_audio`](Self::wrote_audio) and
/// [`compensate_for_suspended_writes`](Self::compensate_for_suspended_writes)
/// must be called only from the output callback thread, serialized by that
/// callback's own scheduling. Queries read the same state, so concurrent
/// readers need an external synchronization boundary; use
/// [`SharedPlaybackClock`](crate::SharedPlaybackClock) if you don't already
/// have one.
#[derive(Debug)]
pub struct PlaybackClock {
    start_timestamp: MediaTimestamp,
    microseconds_per_frame: f64,
    pending: PendingQueue,
    front_timestamp: MediaTimestamp,
    back_timestamp: MediaTimestamp,
    contiguous_buffered: Duration,
    contiguous_buffered_at_same_rate: Duration,
}

impl PlaybackClock {
    /// Create a clock for a stream starting at `start_timestamp` on the
    /// media timeline, rendering at `sample_rate` Hz.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSampleRate`] if `sample_rate` is zero.
    pub fn new(start_timestamp: MediaTimestamp, sample_rate: u32) -> Result<Self> {
        if sample_rate == 0 {
            return Err(Error::InvalidSampleRate);
        }

        Ok(Self {
            start_timestamp,
            microseconds_per_frame: 1_000_000.0 / sample_rate as f64,
            pending: PendingQueue::new(),
            front_timestamp: start_timestamp,
            back_timestamp: start_timestamp,
            contiguous_buffered: Duration::ZERO,
            contiguous_buffered_at_same_rate: Duration::ZERO,
        })
    }

    /// Record one render cycle.
    ///
    /// `frames_written` real frames were produced at `playback_rate` out of
    /// `frames_requested` asked for by the device (any shortfall is tracked
    /// as silence), with `delay_frames` of device latency still between the
    /// written frames and the listener. The drop in buffered-versus-delay
    /// frames since the previous call determines how far
    /// [`front_timestamp`](Self::front_timestamp) advances.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidFrameCount`] unless `0 <= frames_written <=
    ///   frames_requested`.
    /// - [`Error::NegativeDelay`] if `delay_frames < 0`.
    /// - [`Error::InvalidPlaybackRate`] if `playback_rate` is negative or
    ///   not finite.
    ///
    /// State is untouched when an error is returned.
    pub fn wrote_audio(
        &mut self,
        frames_written: i64,
        frames_requested: i64,
        delay_frames: i64,
        playback_rate: f64,
    ) -> Result<()> {
        if frames_written < 0 || frames_written > frames_requested {
            return Err(Error::InvalidFrameCount {
                written: frames_written,
                requested: frames_requested,
            });
        }
        if delay_frames < 0 {
            return Err(Error::NegativeDelay(delay_frames));
        }
        if !playback_rate.is_finite() || playback_rate < 0.0 {
            return Err(Error::InvalidPlaybackRate(playback_rate));
        }

        // First write: seed the pipeline's initial latency with silence.
        if self.front_timestamp == self.start_timestamp && self.pending.is_empty() {
            self.pending.push(delay_frames, 0.0);
        }

        // Frames that must have become audible since the last call, inferred
        // from the drop in reported device delay. Must be computed against
        // the pre-push queue state.
        let frames_played = (self.pending.total_frames() - delay_frames).max(0);

        self.front_timestamp +=
            self.scaled_frames_to_duration(self.pending.scaled_frames_in(frames_played));
        self.pending.push(frames_written, playback_rate);
        self.pending.push(frames_requested - frames_written, 0.0);
        self.pending.pop(frames_played);

        self.back_timestamp += self
            .scaled_frames_to_duration(frames_written as f64 * playback_rate);

        self.pending.check_total_invariant();

        if self.front_timestamp > self.back_timestamp {
            debug_assert!(
                false,
                "playback clock desync: front={:?} back={:?} frames_written={} \
                 frames_requested={} delay_frames={} playback_rate={} frames_played={}",
                self.front_timestamp,
                self.back_timestamp,
                frames_written,
                frames_requested,
                delay_frames,
                playback_rate,
                frames_played,
            );
            log::error!(
                "playback clock desync: front {:?} ahead of back {:?}, clamping",
                self.front_timestamp,
                self.back_timestamp
            );
            self.front_timestamp = self.back_timestamp;
        }

        self.recompute_contiguous_buffered();

        Ok(())
    }

    /// Resynchronize after a gap during which the output stream delivered no
    /// render callbacks for a known wall-clock interval (system suspend,
    /// device reconfiguration).
    ///
    /// If `elapsed` is still covered by the audio already tracked, or the
    /// device reports no latency, nothing happens: the next
    /// [`wrote_audio`](Self::wrote_audio) call expires everything correctly
    /// on its own. A gap larger than anything tracked flushes the pending
    /// queue and re-seeds it with `delay_frames` of silence, restoring a
    /// valid steady state.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NegativeDelay`] if `delay_frames < 0`.
    pub fn compensate_for_suspended_writes(
        &mut self,
        elapsed: Duration,
        delay_frames: i64,
    ) -> Result<()> {
        if delay_frames < 0 {
            return Err(Error::NegativeDelay(delay_frames));
        }

        // Round half up, truncating: the behavior at exact half-frame
        // boundaries is part of the contract.
        let frames_elapsed =
            (elapsed.as_micros() as f64 / self.microseconds_per_frame + 0.5) as i64;

        if frames_elapsed < self.pending.total_frames() || delay_frames == 0 {
            return Ok(());
        }

        log::debug!(
            "suspend gap of {:?} exceeds {} pending frames, flushing playback clock",
            elapsed,
            self.pending.total_frames()
        );

        self.wrote_audio(0, 0, 0, 0.0)?;
        debug_assert!(self.pending.is_empty());
        self.pending.push(delay_frames, 0.0);

        Ok(())
    }

    /// Output-buffer time separating now from the moment `timestamp` is
    /// heard.
    ///
    /// Walks the pending queue from the front: leading silence always plays
    /// out first regardless of the target's rate, and a target falling
    /// mid-run contributes that run's proportional frame share. The
    /// accumulated frame count converts to wall-clock time at the stream's
    /// sample rate (modulo device scheduling).
    ///
    /// # Errors
    ///
    /// Returns [`Error::TimestampOutOfRange`] unless `front_timestamp <=
    /// timestamp <= back_timestamp`.
    pub fn time_until_playback(&self, timestamp: MediaTimestamp) -> Result<Duration> {
        if timestamp < self.front_timestamp || timestamp > self.back_timestamp {
            return Err(Error::TimestampOutOfRange {
                timestamp,
                front: self.front_timestamp,
                back: self.back_timestamp,
            });
        }

        let mut frames_until_timestamp: i64 = 0;
        let target_us = timestamp.as_micros() as f64;
        let mut media_time_us = self.front_timestamp.as_micros() as f64;

        for run in self.pending.runs() {
            // Leading silence is always accounted prior to anything else.
            if run.rate == 0.0 {
                frames_until_timestamp += run.frames;
                continue;
            }

            let span_us = run.frames as f64 * run.rate * self.microseconds_per_frame;
            let run_end_us = media_time_us + span_us;

            if target_us <= run_end_us {
                frames_until_timestamp +=
                    (run.frames as f64 * (target_us - media_time_us) / span_us) as i64;
                break;
            }

            media_time_us = run_end_us;
            frames_until_timestamp += run.frames;
        }

        Ok(self.scaled_frames_to_duration(frames_until_timestamp as f64))
    }

    /// Media timestamp of the next frame to become audible.
    pub fn front_timestamp(&self) -> MediaTimestamp {
        self.front_timestamp
    }

    /// Media timestamp just past the most recently written real frame.
    pub fn back_timestamp(&self) -> MediaTimestamp {
        self.back_timestamp
    }

    /// Media time covered by buffered real audio up to the first buffered
    /// silence, across rate changes.
    ///
    /// Tells callers how far ahead of `front_timestamp` they can schedule
    /// against uninterrupted audio.
    pub fn contiguous_audio_buffered(&self) -> Duration {
        self.contiguous_buffered
    }

    /// Media time covered by buffered real audio at the current head rate
    /// only.
    pub fn contiguous_audio_buffered_at_same_rate(&self) -> Duration {
        self.contiguous_buffered_at_same_rate
    }

    pub(crate) fn pending_frames(&self) -> i64 {
        self.pending.total_frames()
    }

    pub(crate) fn pending_run_count(&self) -> usize {
        self.pending.run_count()
    }

    fn scaled_frames_to_duration(&self, scaled_frames: f64) -> Duration {
        Duration::from_micros((scaled_frames * self.microseconds_per_frame) as u64)
    }

    fn recompute_contiguous_buffered(&mut self) {
        let mut scaled_frames = 0.0;
        let mut scaled_frames_at_same_rate = 0.0;
        let mut found_silence = false;

        for (i, run) in self.pending.runs().enumerate() {
            if run.rate == 0.0 {
                found_silence = true;
                continue;
            }

            // Buffered silence breaks the contiguous stretch of audio.
            if found_silence {
                break;
            }

            scaled_frames += run.frames as f64 * run.rate;
            if i == 0 {
                scaled_frames_at_same_rate = scaled_frames;
            }
        }

        self.contiguous_buffered = self.scaled_frames_to_duration(scaled_frames);
        self.contiguous_buffered_at_same_rate =
            self.scaled_frames_to_duration(scaled_frames_at_same_rate);
    }
}
