// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Timecode formatting and parsing.
//!
//! Video media is addressed as `HH:MM:SS:FF` (frame index within the second),
//! audio media as `HH:MM:SS:mmm` (milliseconds within the second).
//! Formatting truncates, so a parsed timecode is at most one frame (or one
//! millisecond) earlier than the time it was formatted from.

use serde::{Deserialize, Serialize};

/// Frame rate assumed until the media tells us otherwise.
pub const DEFAULT_FRAME_RATE: f64 = 24.0;

/// Which kind of fourth field a timecode carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimecodeMode {
    /// Frame index, two digits.
    Video,
    /// Milliseconds, three digits.
    Audio,
}

impl TimecodeMode {
    pub fn from_is_video(is_video: bool) -> Self {
        if is_video {
            TimecodeMode::Video
        } else {
            TimecodeMode::Audio
        }
    }
}

/// A formatter/parser bound to one mode and frame rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timecode {
    pub mode: TimecodeMode,
    pub frame_rate: f64,
}

impl Timecode {
    pub fn new(mode: TimecodeMode, frame_rate: f64) -> Self {
        Self { mode, frame_rate }
    }

    pub fn format(&self, seconds: f64) -> String {
        format_timecode(seconds, self.mode, self.frame_rate)
    }

    pub fn parse(&self, text: &str) -> f64 {
        parse_timecode(text, self.mode, self.frame_rate)
    }
}

/// Format `seconds` as a timecode string.
///
/// Negative and non-finite inputs are formatted as zero. No carry correction
/// is applied to the last field, so a floating-point frame index equal to the
/// frame rate can appear.
pub fn format_timecode(seconds: f64, mode: TimecodeMode, frame_rate: f64) -> String {
    let time = if seconds.is_finite() && seconds > 0.0 {
        seconds
    } else {
        0.0
    };

    let hours = (time / 3600.0).floor() as u64;
    let minutes = ((time % 3600.0) / 60.0).floor() as u64;
    let secs = (time % 60.0).floor() as u64;
    let fraction = time % 1.0;

    match mode {
        TimecodeMode::Video => {
            let frames = (fraction * frame_rate).floor().max(0.0) as u64;
            format!("{:02}:{:02}:{:02}:{:02}", hours, minutes, secs, frames)
        }
        TimecodeMode::Audio => {
            let millis = (fraction * 1000.0).floor() as u64;
            format!("{:02}:{:02}:{:02}:{:03}", hours, minutes, secs, millis)
        }
    }
}

/// Parse a timecode string back into seconds.
///
/// Anything other than exactly four `:`-separated fields yields `0.0`.
/// Each field is read as a leading integer and defaults to 0 when it has
/// none. The result is non-finite only when a video frame rate of zero is
/// supplied; callers that store the value must check `is_finite`.
pub fn parse_timecode(text: &str, mode: TimecodeMode, frame_rate: f64) -> f64 {
    let parts: Vec<&str> = text.split(':').collect();
    if parts.len() != 4 {
        return 0.0;
    }

    let hours = leading_int(parts[0]) as f64;
    let minutes = leading_int(parts[1]) as f64;
    let seconds = leading_int(parts[2]) as f64;
    let last = leading_int(parts[3]) as f64;

    let whole = hours * 3600.0 + minutes * 60.0 + seconds;
    match mode {
        TimecodeMode::Video => whole + last / frame_rate,
        TimecodeMode::Audio => whole + last / 1000.0,
    }
}

/// Read an optionally signed integer prefix, ignoring leading whitespace.
/// `"12abc"` is 12, `"abc"` is 0.
fn leading_int(field: &str) -> i64 {
    let trimmed = field.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let value = digits[..end].parse::<i64>().unwrap_or(0);

    if negative {
        -value
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_video() {
        assert_eq!(format_timecode(0.0, TimecodeMode::Video, 24.0), "00:00:00:00");
        assert_eq!(format_timecode(1.5, TimecodeMode::Video, 24.0), "00:00:01:12");
        assert_eq!(format_timecode(3725.25, TimecodeMode::Video, 24.0), "01:02:05:06");
    }

    #[test]
    fn test_format_audio() {
        assert_eq!(format_timecode(1.5, TimecodeMode::Audio, 24.0), "00:00:01:500");
        assert_eq!(format_timecode(61.0625, TimecodeMode::Audio, 24.0), "00:01:01:062");
    }

    #[test]
    fn test_format_negative_is_zero() {
        assert_eq!(format_timecode(-3.0, TimecodeMode::Video, 24.0), "00:00:00:00");
        assert_eq!(format_timecode(f64::NAN, TimecodeMode::Audio, 24.0), "00:00:00:000");
    }

    #[test]
    fn test_parse_wrong_field_count() {
        assert_eq!(parse_timecode("00:01:02", TimecodeMode::Video, 24.0), 0.0);
        assert_eq!(parse_timecode("", TimecodeMode::Audio, 24.0), 0.0);
        assert_eq!(parse_timecode("1:2:3:4:5", TimecodeMode::Video, 24.0), 0.0);
    }

    #[test]
    fn test_parse_lenient_fields() {
        // "xx" defaults to 0, "5s" reads as 5
        let t = parse_timecode("xx:01:5s:12", TimecodeMode::Video, 24.0);
        assert!((t - 65.5).abs() < 1e-9);
    }

    #[test]
    fn test_parse_zero_frame_rate_is_not_finite() {
        let t = parse_timecode("00:00:01:05", TimecodeMode::Video, 0.0);
        assert!(!t.is_finite());
    }

    #[test]
    fn test_roundtrip_within_one_unit() {
        for &frame_rate in &[24.0, 25.0, 29.97, 60.0] {
            let codec = Timecode::new(TimecodeMode::Video, frame_rate);
            let mut t = 0.0;
            while t < 86_399.999 {
                let back = codec.parse(&codec.format(t));
                assert!(back <= t + 1e-9, "{t} -> {back}");
                assert!(t - back < 1.0 / frame_rate + 1e-6, "{t} -> {back}");
                t += 1234.567;
            }
        }

        let codec = Timecode::new(TimecodeMode::Audio, 24.0);
        for &t in &[0.0, 0.001, 1.999, 59.5, 3599.9994, 86_399.999] {
            let back = codec.parse(&codec.format(t));
            assert!((t - back).abs() < 0.001 + 1e-6, "{t} -> {back}");
        }
    }
}
