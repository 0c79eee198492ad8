// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Media playback capability.
//!
//! The review core never decodes media. It talks to a [`MediaElement`]
//! (position, volume, rate, play state) and hears back through a channel of
//! [`MediaEvent`]s that a single consumer drains once per frame.
//! [`ClockMedia`] is the desktop element: a clock that runs over the
//! probed duration of the file.

use std::path::Path;
use std::sync::mpsc::Sender;
use std::time::Instant;

/// Notifications from a media element, in the order they happened.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MediaEvent {
    /// Playback position advanced.
    TimeUpdate(f64),
    /// Duration and (for video) intrinsic size became available.
    MetadataLoaded {
        duration: f64,
        width: u32,
        height: u32,
    },
    /// A video frame was presented at `media_time`.
    VideoFrame { media_time: f64 },
    /// Playback stopped on its own at the end of the media.
    Ended,
}

/// What a media element can be asked to do.
///
/// Requests are fire-and-forget: the element may apply them later, and the
/// caller learns the outcome from [`MediaEvent`]s.
pub trait MediaElement {
    fn current_time(&self) -> f64;
    fn set_current_time(&mut self, seconds: f64);
    fn duration(&self) -> f64;
    /// Intrinsic (width, height); zero for audio or when unknown.
    fn intrinsic_size(&self) -> (u32, u32);
    fn play(&mut self);
    fn pause(&mut self);
    fn muted(&self) -> bool;
    fn set_muted(&mut self, muted: bool);
    fn volume(&self) -> f64;
    fn set_volume(&mut self, volume: f64);
    fn playback_rate(&self) -> f64;
    fn set_playback_rate(&mut self, rate: f64);

    /// Called once per host frame so elements driven by the host loop can
    /// advance and emit events.
    fn poll(&mut self, _now: Instant) {}
}

/// Static facts about a media file.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaInfo {
    pub filename: String,
    pub is_video: bool,
    /// Seconds; 0 when unknown.
    pub duration: f64,
    pub width: u32,
    pub height: u32,
    /// Frames per second; 0 when unknown.
    pub frame_rate: f64,
}

const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "avi", "mkv", "webm", "m4v"];
const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "ogg", "m4a", "flac", "aac"];

/// Whether a path names media this tool can review.
pub fn is_media_file(path: &Path) -> bool {
    extension(path).is_some_and(|ext| {
        VIDEO_EXTENSIONS.contains(&ext.as_str()) || AUDIO_EXTENSIONS.contains(&ext.as_str())
    })
}

/// Extensions accepted by the file picker.
pub fn media_extensions() -> Vec<&'static str> {
    VIDEO_EXTENSIONS
        .iter()
        .chain(AUDIO_EXTENSIONS.iter())
        .copied()
        .collect()
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_ascii_lowercase())
}

/// Gather what can be known about a media file without playing it.
pub fn probe(path: &Path) -> anyhow::Result<MediaInfo> {
    let filename = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string();
    let is_video = extension(path).is_some_and(|ext| VIDEO_EXTENSIONS.contains(&ext.as_str()));

    let mut info = MediaInfo {
        filename,
        is_video,
        duration: 0.0,
        width: 0,
        height: 0,
        frame_rate: 0.0,
    };

    #[cfg(feature = "video-opencv")]
    if is_video {
        probe_video(path, &mut info)?;
    }

    log::info!(
        "Probed {}: video={} duration={:.2}s size={}x{} fps={:.3}",
        info.filename,
        info.is_video,
        info.duration,
        info.width,
        info.height,
        info.frame_rate
    );
    Ok(info)
}

#[cfg(feature = "video-opencv")]
fn probe_video(path: &Path, info: &mut MediaInfo) -> anyhow::Result<()> {
    use opencv::prelude::*;
    use opencv::videoio;

    let capture = videoio::VideoCapture::from_file(&path.to_string_lossy(), videoio::CAP_ANY)?;
    if !capture.is_opened()? {
        anyhow::bail!("Could not open video: {}", path.display());
    }

    let fps = capture.get(videoio::CAP_PROP_FPS)?;
    let frames = capture.get(videoio::CAP_PROP_FRAME_COUNT)?;
    info.width = capture.get(videoio::CAP_PROP_FRAME_WIDTH)? as u32;
    info.height = capture.get(videoio::CAP_PROP_FRAME_HEIGHT)? as u32;
    if fps > 0.0 {
        info.frame_rate = fps;
        info.duration = frames / fps;
    }
    Ok(())
}

/// A media element that plays a virtual clock.
///
/// Position advances with wall time times the playback rate while playing
/// and stops at the end of the probed duration. Metadata is announced on
/// the first poll, followed by one frame notification for video so the
/// consumer can estimate the frame rate.
pub struct ClockMedia {
    info: MediaInfo,
    events: Sender<MediaEvent>,
    position: f64,
    playing: bool,
    muted: bool,
    volume: f64,
    rate: f64,
    last_tick: Option<Instant>,
    announced: bool,
}

impl ClockMedia {
    pub fn new(info: MediaInfo, events: Sender<MediaEvent>) -> Self {
        Self {
            info,
            events,
            position: 0.0,
            playing: false,
            // Starts muted until metadata arrives, like a browser element
            muted: true,
            volume: 1.0,
            rate: 1.0,
            last_tick: None,
            announced: false,
        }
    }

    fn emit(&self, event: MediaEvent) {
        // The receiver goes away when the media is replaced
        let _ = self.events.send(event);
    }

    fn clamp(&self, seconds: f64) -> f64 {
        let time = seconds.max(0.0);
        if self.info.duration > 0.0 {
            time.min(self.info.duration)
        } else {
            time
        }
    }
}

impl MediaElement for ClockMedia {
    fn current_time(&self) -> f64 {
        self.position
    }

    fn set_current_time(&mut self, seconds: f64) {
        self.position = self.clamp(seconds);
        self.emit(MediaEvent::TimeUpdate(self.position));
    }

    fn duration(&self) -> f64 {
        self.info.duration
    }

    fn intrinsic_size(&self) -> (u32, u32) {
        (self.info.width, self.info.height)
    }

    fn play(&mut self) {
        self.playing = true;
    }

    fn pause(&mut self) {
        self.playing = false;
        self.last_tick = None;
    }

    fn muted(&self) -> bool {
        self.muted
    }

    fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn volume(&self) -> f64 {
        self.volume
    }

    fn set_volume(&mut self, volume: f64) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    fn playback_rate(&self) -> f64 {
        self.rate
    }

    fn set_playback_rate(&mut self, rate: f64) {
        self.rate = rate;
    }

    fn poll(&mut self, now: Instant) {
        if !self.announced {
            self.announced = true;
            self.emit(MediaEvent::MetadataLoaded {
                duration: self.info.duration,
                width: self.info.width,
                height: self.info.height,
            });
            if self.info.is_video && self.info.frame_rate > 0.0 {
                self.emit(MediaEvent::VideoFrame {
                    media_time: self.position + 1.0 / self.info.frame_rate,
                });
            }
        }

        if !self.playing {
            return;
        }

        if let Some(last) = self.last_tick {
            let elapsed = now.saturating_duration_since(last).as_secs_f64();
            self.position = self.clamp(self.position + elapsed * self.rate);
            self.emit(MediaEvent::TimeUpdate(self.position));
            if self.info.duration > 0.0 && self.position >= self.info.duration {
                self.playing = false;
                self.last_tick = None;
                self.emit(MediaEvent::Ended);
                return;
            }
        }
        self.last_tick = Some(now);
    }
}
