// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Periodic backup timer.
//!
//! Every interval the timer checks whether there are unsaved changes and,
//! if so, asks for a backup download. Times are passed in by the caller so
//! the timer can be driven from the UI frame loop.

use chrono::{DateTime, Local};
use std::time::{Duration, Instant};

/// Default interval between backup checks (5 minutes).
pub const DEFAULT_AUTOSAVE_INTERVAL: Duration = Duration::from_secs(300);

#[derive(Debug)]
pub struct AutosaveTimer {
    interval: Duration,
    next_due: Option<Instant>,
}

impl Default for AutosaveTimer {
    fn default() -> Self {
        Self::new(DEFAULT_AUTOSAVE_INTERVAL)
    }
}

impl AutosaveTimer {
    /// Create a stopped timer.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_due: None,
        }
    }

    pub fn start(&mut self, now: Instant) {
        self.next_due = Some(now + self.interval);
        log::debug!("Autosave: started, every {:?}", self.interval);
    }

    /// Stop the timer. A cancelled timer never fires until started again.
    pub fn cancel(&mut self) {
        if self.next_due.take().is_some() {
            log::debug!("Autosave: cancelled");
        }
    }

    pub fn is_running(&self) -> bool {
        self.next_due.is_some()
    }

    /// Returns true when a backup should be written now.
    ///
    /// The timer re-arms every time an interval elapses, whether or not
    /// there was anything to save.
    pub fn poll(&mut self, now: Instant, unsaved_changes: bool) -> bool {
        let Some(due) = self.next_due else {
            return false;
        };
        if now < due {
            return false;
        }

        self.next_due = Some(now + self.interval);
        if unsaved_changes {
            log::trace!("Autosave: due with unsaved changes");
        }
        unsaved_changes
    }
}

/// Human readable age of the last save: `NEVER SAVED`, `12m`, `2h 5m`.
pub fn time_since_save(last_saved: Option<DateTime<Local>>, now: DateTime<Local>) -> String {
    let Some(last) = last_saved else {
        return "NEVER SAVED".to_string();
    };
    let minutes = (now - last).num_minutes().max(0);
    let hours = minutes / 60;
    if hours > 0 {
        format!("{}h {}m", hours, minutes % 60)
    } else {
        format!("{}m", minutes)
    }
}
