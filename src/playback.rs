// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Playback control.
//!
//! Turns transport intents into requests against the attached
//! [`MediaElement`] and keeps a local copy of the time state that is
//! corrected by the element's events.
//!
//! Seeks raise a short-lived `seeking` flag so that a time update already
//! in flight does not overwrite the seek target. The flag clears after a
//! fixed delay, not on acknowledgement; a time update older than the seek
//! that arrives after the delay will still win.

use crate::io::media::{MediaElement, MediaEvent};
use crate::util::geometry::MediaDimensions;
use crate::util::timecode::{Timecode, TimecodeMode, DEFAULT_FRAME_RATE};
use std::time::{Duration, Instant};

/// How long time updates are ignored after a seek.
pub const DEFAULT_SEEK_SETTLE: Duration = Duration::from_millis(100);

/// Volume used for newly attached media.
pub const DEFAULT_VOLUME: f64 = 0.7;

pub struct PlaybackController {
    media: Option<Box<dyn MediaElement>>,
    is_video: bool,
    frame_rate: f64,
    current_time: f64,
    duration: f64,
    dimensions: MediaDimensions,
    is_playing: bool,
    rate: f64,
    volume: f64,
    muted: bool,
    seeking_until: Option<Instant>,
    seek_settle: Duration,
    estimate_frame_rate: bool,
}

impl Default for PlaybackController {
    fn default() -> Self {
        Self::new(DEFAULT_SEEK_SETTLE, DEFAULT_VOLUME)
    }
}

impl PlaybackController {
    pub fn new(seek_settle: Duration, volume: f64) -> Self {
        Self {
            media: None,
            is_video: true,
            frame_rate: DEFAULT_FRAME_RATE,
            current_time: 0.0,
            duration: 0.0,
            dimensions: MediaDimensions::default(),
            is_playing: false,
            rate: 1.0,
            volume,
            muted: false,
            seeking_until: None,
            seek_settle,
            estimate_frame_rate: false,
        }
    }

    /// Take control of a new media element. Time state starts over; the
    /// volume and rate carry across.
    pub fn attach(&mut self, mut media: Box<dyn MediaElement>, is_video: bool) {
        media.set_volume(self.volume);
        media.set_playback_rate(self.rate);

        self.media = Some(media);
        self.is_video = is_video;
        self.frame_rate = DEFAULT_FRAME_RATE;
        self.current_time = 0.0;
        self.duration = 0.0;
        self.dimensions = MediaDimensions::default();
        self.is_playing = false;
        self.seeking_until = None;
        self.estimate_frame_rate = false;
    }

    pub fn has_media(&self) -> bool {
        self.media.is_some()
    }

    pub fn is_video(&self) -> bool {
        self.is_video
    }

    pub fn frame_rate(&self) -> f64 {
        self.frame_rate
    }

    /// Adopt mode and frame rate from a loaded project.
    pub fn set_mode(&mut self, is_video: bool, frame_rate: f64) {
        self.is_video = is_video;
        if frame_rate > 0.0 && frame_rate.is_finite() {
            self.frame_rate = frame_rate;
        }
    }

    pub fn timecode(&self) -> Timecode {
        Timecode::new(TimecodeMode::from_is_video(self.is_video), self.frame_rate)
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn dimensions(&self) -> MediaDimensions {
        self.dimensions
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn is_seeking(&self, now: Instant) -> bool {
        self.seeking_until.is_some_and(|until| now < until)
    }

    /// Position as a fraction of the duration, for progress bars.
    pub fn progress(&self) -> f64 {
        if self.duration > 0.0 {
            (self.current_time / self.duration).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    pub fn play_pause(&mut self) {
        let Some(media) = self.media.as_mut() else {
            return;
        };
        if self.is_playing {
            media.pause();
        } else {
            media.play();
        }
        self.is_playing = !self.is_playing;
    }

    /// Move the position by `seconds` relative to where the media is.
    pub fn skip(&mut self, seconds: f64) {
        if let Some(media) = self.media.as_mut() {
            let target = (media.current_time() + seconds).max(0.0);
            media.set_current_time(target);
        }
    }

    /// Step by whole frames (video) or milliseconds (audio).
    pub fn frame_step(&mut self, frames: i32) {
        let seconds = if self.is_video {
            f64::from(frames) / self.frame_rate
        } else {
            f64::from(frames) * 0.001
        };
        self.skip(seconds);
    }

    pub fn set_rate(&mut self, rate: f64) {
        if rate <= 0.0 || !rate.is_finite() {
            return;
        }
        self.rate = rate;
        if let Some(media) = self.media.as_mut() {
            media.set_playback_rate(rate);
        }
    }

    /// Set volume in `0..=1`. Raising it above zero also unmutes.
    pub fn set_volume(&mut self, volume: f64) {
        let volume = volume.clamp(0.0, 1.0);
        self.volume = volume;
        let unmute = volume > 0.0 && self.muted;
        if unmute {
            self.muted = false;
        }
        if let Some(media) = self.media.as_mut() {
            media.set_volume(volume);
            if unmute {
                media.set_muted(false);
            }
        }
    }

    pub fn toggle_mute(&mut self) {
        self.muted = !self.muted;
        if let Some(media) = self.media.as_mut() {
            media.set_muted(self.muted);
        }
    }

    /// Seek to a fraction (`0..=1`) of the duration.
    pub fn seek_to_fraction(&mut self, fraction: f64, now: Instant) {
        if self.duration <= 0.0 {
            return;
        }
        self.seek_to_time(fraction.clamp(0.0, 1.0) * self.duration, now);
    }

    /// Seek to an absolute position in seconds.
    pub fn seek_to_time(&mut self, seconds: f64, now: Instant) {
        let Some(media) = self.media.as_mut() else {
            return;
        };
        let target = if seconds.is_finite() { seconds.max(0.0) } else { 0.0 };
        media.set_current_time(target);
        self.current_time = target;
        self.seeking_until = Some(now + self.seek_settle);
        log::debug!("Seek to {:.3}s", target);
    }

    /// Let the element advance and clear an expired seek flag.
    pub fn tick(&mut self, now: Instant) {
        if let Some(media) = self.media.as_mut() {
            media.poll(now);
        }
        if self.seeking_until.is_some_and(|until| now >= until) {
            self.seeking_until = None;
        }
    }

    /// Fold one media notification into the local state.
    pub fn handle_event(&mut self, event: MediaEvent, now: Instant) {
        match event {
            MediaEvent::TimeUpdate(time) => {
                if !self.is_seeking(now) {
                    self.current_time = time;
                }
            }
            MediaEvent::MetadataLoaded {
                duration,
                width,
                height,
            } => {
                self.duration = if duration.is_finite() { duration } else { 0.0 };
                if self.is_video {
                    self.dimensions = MediaDimensions::new(f64::from(width), f64::from(height));
                    self.estimate_frame_rate = true;
                }
                self.muted = false;
                if let Some(media) = self.media.as_mut() {
                    media.set_muted(false);
                }
                log::info!(
                    "Metadata: duration {:.2}s, size {}x{}",
                    self.duration,
                    width,
                    height
                );
            }
            MediaEvent::VideoFrame { media_time } => {
                if !self.estimate_frame_rate {
                    return;
                }
                self.estimate_frame_rate = false;
                let estimate = if media_time == 0.0 {
                    DEFAULT_FRAME_RATE
                } else {
                    1.0 / (media_time - self.current_time)
                };
                if estimate.is_finite() && estimate > 0.0 {
                    self.frame_rate = estimate;
                    log::info!("Estimated frame rate: {:.3}", estimate);
                } else {
                    log::warn!("Ignoring frame rate estimate {}", estimate);
                }
            }
            MediaEvent::Ended => {
                if self.is_playing {
                    log::debug!("Playback reached the end at {:.3}s", self.current_time);
                }
                self.is_playing = false;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Default)]
    struct FakeState {
        time: f64,
        playing: bool,
        muted: bool,
        volume: f64,
        rate: f64,
        seeks: Vec<f64>,
    }

    /// Records requests; shares its state with the test through `Rc`.
    struct FakeMedia(Rc<RefCell<FakeState>>);

    impl MediaElement for FakeMedia {
        fn current_time(&self) -> f64 {
            self.0.borrow().time
        }
        fn set_current_time(&mut self, seconds: f64) {
            let mut state = self.0.borrow_mut();
            state.time = seconds;
            state.seeks.push(seconds);
        }
        fn duration(&self) -> f64 {
            100.0
        }
        fn intrinsic_size(&self) -> (u32, u32) {
            (1920, 1080)
        }
        fn play(&mut self) {
            self.0.borrow_mut().playing = true;
        }
        fn pause(&mut self) {
            self.0.borrow_mut().playing = false;
        }
        fn muted(&self) -> bool {
            self.0.borrow().muted
        }
        fn set_muted(&mut self, muted: bool) {
            self.0.borrow_mut().muted = muted;
        }
        fn volume(&self) -> f64 {
            self.0.borrow().volume
        }
        fn set_volume(&mut self, volume: f64) {
            self.0.borrow_mut().volume = volume;
        }
        fn playback_rate(&self) -> f64 {
            self.0.borrow().rate
        }
        fn set_playback_rate(&mut self, rate: f64) {
            self.0.borrow_mut().rate = rate;
        }
    }

    fn attached(is_video: bool) -> (PlaybackController, Rc<RefCell<FakeState>>) {
        let state = Rc::new(RefCell::new(FakeState::default()));
        let mut controller = PlaybackController::default();
        controller.attach(Box::new(FakeMedia(state.clone())), is_video);
        controller.handle_event(
            MediaEvent::MetadataLoaded {
                duration: 100.0,
                width: 1920,
                height: 1080,
            },
            Instant::now(),
        );
        (controller, state)
    }

    #[test]
    fn test_play_pause_toggles_media() {
        let (mut controller, state) = attached(true);
        controller.play_pause();
        assert!(state.borrow().playing);
        assert!(controller.is_playing());
        controller.play_pause();
        assert!(!state.borrow().playing);
    }

    #[test]
    fn test_ended_clears_playing() {
        let (mut controller, state) = attached(true);
        controller.play_pause();
        state.borrow_mut().playing = false;
        controller.handle_event(MediaEvent::Ended, Instant::now());
        assert!(!controller.is_playing());

        // The next press plays again instead of pausing stopped media
        controller.play_pause();
        assert!(state.borrow().playing);
        assert!(controller.is_playing());
    }

    #[test]
    fn test_frame_step_video_and_audio() {
        let (mut controller, state) = attached(true);
        controller.frame_step(12);
        assert!((state.borrow().time - 0.5).abs() < 1e-9);

        let (mut controller, state) = attached(false);
        state.borrow_mut().time = 1.0;
        controller.frame_step(-5);
        assert!((state.borrow().time - 0.995).abs() < 1e-9);
    }

    #[test]
    fn test_skip_does_not_go_negative() {
        let (mut controller, state) = attached(true);
        state.borrow_mut().time = 2.0;
        controller.skip(-5.0);
        assert_eq!(state.borrow().time, 0.0);
    }

    #[test]
    fn test_time_updates_ignored_while_seeking() {
        let (mut controller, state) = attached(true);
        let now = Instant::now();
        controller.seek_to_fraction(0.5, now);
        assert_eq!(state.borrow().seeks, vec![50.0]);
        assert_eq!(controller.current_time(), 50.0);

        // A stale update during the settle window is dropped
        controller.handle_event(MediaEvent::TimeUpdate(3.0), now + Duration::from_millis(50));
        assert_eq!(controller.current_time(), 50.0);

        controller.tick(now + Duration::from_millis(100));
        assert!(!controller.is_seeking(now + Duration::from_millis(100)));
        controller.handle_event(MediaEvent::TimeUpdate(50.2), now + Duration::from_millis(120));
        assert_eq!(controller.current_time(), 50.2);
    }

    #[test]
    fn test_volume_unmutes() {
        let (mut controller, state) = attached(true);
        controller.toggle_mute();
        assert!(controller.is_muted());
        assert!(state.borrow().muted);

        controller.set_volume(0.0);
        assert!(controller.is_muted());

        controller.set_volume(1.4);
        assert_eq!(controller.volume(), 1.0);
        assert!(!controller.is_muted());
        assert!(!state.borrow().muted);
    }

    #[test]
    fn test_metadata_sets_dimensions_and_unmutes() {
        let (controller, state) = attached(true);
        assert_eq!(controller.duration(), 100.0);
        assert_eq!(controller.dimensions(), MediaDimensions::new(1920.0, 1080.0));
        assert!(!state.borrow().muted);

        let (audio, _) = attached(false);
        assert!(!audio.dimensions().is_known());
    }

    #[test]
    fn test_frame_rate_estimate_from_first_frame() {
        let (mut controller, _) = attached(true);
        let now = Instant::now();
        controller.handle_event(MediaEvent::VideoFrame { media_time: 0.04 }, now);
        assert!((controller.frame_rate() - 25.0).abs() < 1e-9);

        // Only the first frame after metadata counts
        controller.handle_event(MediaEvent::VideoFrame { media_time: 0.5 }, now);
        assert!((controller.frame_rate() - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_frame_rate_estimate_at_zero_is_default() {
        let (mut controller, _) = attached(true);
        controller.set_mode(true, 30.0);
        controller.handle_event(MediaEvent::VideoFrame { media_time: 0.0 }, Instant::now());
        assert_eq!(controller.frame_rate(), 24.0);
    }

    #[test]
    fn test_rate_is_forwarded() {
        let (mut controller, state) = attached(true);
        controller.set_rate(1.5);
        assert_eq!(state.borrow().rate, 1.5);
        controller.set_rate(0.0);
        assert_eq!(controller.rate(), 1.5);
    }

    #[test]
    fn test_no_media_is_inert() {
        let mut controller = PlaybackController::default();
        controller.play_pause();
        controller.seek_to_time(4.0, Instant::now());
        assert!(!controller.is_playing());
        assert_eq!(controller.current_time(), 0.0);
    }
}
