// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Review session state.
//!
//! [`Review`] ties the comment store, the drawing engine and the playback
//! controller together and is what the UI drives. UI events are reduced to
//! [`Action`]s or to direct calls; everything here runs on the UI thread,
//! one event at a time.

use crate::config::ReviewConfig;
use crate::io::autosave::{time_since_save, AutosaveTimer};
use crate::io::media::{ClockMedia, MediaElement, MediaEvent, MediaInfo};
use crate::io::naming::{backup_file_name, save_file_name};
use crate::io::serialization::{edl_file_name, to_document, to_edl, ProjectError};
use crate::models::annotation::{Comment, CommentId};
use crate::models::drawing::DrawingEngine;
use crate::models::project::{project_name_for, ProjectData, UNTITLED_PROJECT};
use crate::models::store::{
    sorted_view, AnnotationStore, DeleteOutcome, NodeRef, ReplyDraft, ViewOptions,
};
use crate::playback::PlaybackController;
use crate::session::Session;
use chrono::{DateTime, Local, Utc};
use std::sync::mpsc::{channel, Receiver};
use std::time::Instant;

/// Direction of a wheel step, as the user perceives it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WheelDirection {
    Up,
    Down,
}

/// Semantic actions bound to keys, wheel and toolbar buttons.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    PlayPause,
    SkipForward,
    SkipBackward,
    FrameStep(i32),
    VolumeUp,
    VolumeDown,
    ToggleMute,
    SetRate(f64),
    SetVolume(f64),
    SeekFraction(f64),
    SetLineWidth(f64),
    CommitComment,
    UndoStroke,
    RedoStroke,
    ToggleDrawingMode,
    /// Clear reply target, drawing mode and pending delete; leave fullscreen.
    Cancel,
    FocusCommentInput,
    WheelVolume(WheelDirection),
    WheelSeek(WheelDirection),
    ToggleFullscreen,
}

/// Bytes offered to the user under a file name.
#[derive(Debug, Clone, PartialEq)]
pub struct Download {
    pub file_name: String,
    pub contents: String,
}

pub struct Review {
    config: ReviewConfig,
    pub session: Session,
    project_name: String,
    media_filename: String,
    created_at: DateTime<Utc>,
    store: AnnotationStore,
    drawing: DrawingEngine,
    playback: PlaybackController,
    events: Option<Receiver<MediaEvent>>,
    view: ViewOptions,
    /// Text of the new-comment box.
    pub comment_draft: String,
    /// Text of the reply box.
    pub reply_draft: String,
    reply_target: Option<CommentId>,
    selected: Option<CommentId>,
    unsaved: bool,
    last_saved: Option<DateTime<Local>>,
    autosave: AutosaveTimer,
    fullscreen: bool,
    fullscreen_request: Option<bool>,
    focus_comment_input: bool,
}

impl Review {
    pub fn new(config: ReviewConfig, mut session: Session) -> Self {
        if session.needs_username() {
            if let Some(name) = &config.username {
                session.username = name.clone();
            }
        }

        let mut playback = PlaybackController::new(config.seek_settle(), config.initial_volume);
        playback.set_mode(true, config.default_frame_rate);

        Self {
            drawing: DrawingEngine::new(&config.stroke_color, config.default_line_width),
            autosave: AutosaveTimer::new(config.autosave_interval()),
            config,
            session,
            project_name: UNTITLED_PROJECT.to_string(),
            media_filename: String::new(),
            created_at: Utc::now(),
            store: AnnotationStore::new(),
            playback,
            events: None,
            view: ViewOptions::default(),
            comment_draft: String::new(),
            reply_draft: String::new(),
            reply_target: None,
            selected: None,
            unsaved: false,
            last_saved: None,
            fullscreen: false,
            fullscreen_request: None,
            focus_comment_input: false,
        }
    }

    pub fn config(&self) -> &ReviewConfig {
        &self.config
    }

    pub fn store(&self) -> &AnnotationStore {
        &self.store
    }

    pub fn drawing(&self) -> &DrawingEngine {
        &self.drawing
    }

    pub fn drawing_mut(&mut self) -> &mut DrawingEngine {
        &mut self.drawing
    }

    pub fn playback(&self) -> &PlaybackController {
        &self.playback
    }

    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    pub fn media_filename(&self) -> &str {
        &self.media_filename
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.unsaved
    }

    pub fn time_since_save(&self) -> String {
        time_since_save(self.last_saved, Local::now())
    }

    pub fn view_options(&self) -> ViewOptions {
        self.view
    }

    pub fn set_view_options(&mut self, view: ViewOptions) {
        self.view = view;
    }

    /// Top-level comments in the current display order.
    pub fn visible_comments(&self) -> Vec<&Comment> {
        sorted_view(self.store.comments(), &self.view)
    }

    pub fn format_time(&self, seconds: f64) -> String {
        self.playback.timecode().format(seconds)
    }

    pub fn reply_target(&self) -> Option<CommentId> {
        self.reply_target
    }

    /// Open the reply box under `id`, or close it if it is already open there.
    pub fn toggle_reply(&mut self, id: CommentId) {
        self.reply_target = if self.reply_target == Some(id) {
            None
        } else {
            Some(id)
        };
    }

    pub fn selected(&self) -> Option<CommentId> {
        self.selected
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    /// Fullscreen change the host should request, if any.
    pub fn take_fullscreen_request(&mut self) -> Option<bool> {
        self.fullscreen_request.take()
    }

    /// The host reports the actual fullscreen state. A rejected request
    /// never reports a change, so the flag stays where it was.
    pub fn on_fullscreen_changed(&mut self, fullscreen: bool) {
        if self.fullscreen != fullscreen {
            log::debug!("Fullscreen: {}", fullscreen);
        }
        self.fullscreen = fullscreen;
    }

    /// Whether the comment box should grab keyboard focus this frame.
    pub fn take_focus_request(&mut self) -> bool {
        std::mem::take(&mut self.focus_comment_input)
    }

    pub fn apply(&mut self, action: Action, now: Instant) {
        let skip = self.config.skip_seconds;
        let step = self.config.volume_step;
        let wheel_seek = self.config.wheel_seek_seconds;

        match action {
            Action::PlayPause => self.playback.play_pause(),
            Action::SkipForward => self.playback.skip(skip),
            Action::SkipBackward => self.playback.skip(-skip),
            Action::FrameStep(frames) => self.playback.frame_step(frames),
            Action::VolumeUp => self.playback.set_volume(self.playback.volume() + step),
            Action::VolumeDown => self.playback.set_volume(self.playback.volume() - step),
            Action::ToggleMute => self.playback.toggle_mute(),
            Action::SetRate(rate) => self.playback.set_rate(rate),
            Action::SetVolume(volume) => self.playback.set_volume(volume),
            Action::SeekFraction(fraction) => self.playback.seek_to_fraction(fraction, now),
            Action::SetLineWidth(width) => self.drawing.set_line_width(width),
            Action::CommitComment => {
                self.commit_comment();
            }
            Action::UndoStroke => {
                self.drawing.undo();
            }
            Action::RedoStroke => {
                self.drawing.redo();
            }
            Action::ToggleDrawingMode => self.toggle_drawing_mode(),
            Action::Cancel => self.cancel(),
            Action::FocusCommentInput => self.focus_comment_input = true,
            Action::WheelVolume(direction) => {
                let delta = match direction {
                    WheelDirection::Up => step,
                    WheelDirection::Down => -step,
                };
                self.playback.set_volume(self.playback.volume() + delta);
            }
            Action::WheelSeek(direction) => match direction {
                WheelDirection::Up => self.playback.skip(wheel_seek),
                WheelDirection::Down => self.playback.skip(-wheel_seek),
            },
            Action::ToggleFullscreen => self.fullscreen_request = Some(!self.fullscreen),
        }
    }

    fn cancel(&mut self) {
        self.reply_target = None;
        self.drawing.set_drawing_mode(false);
        self.store.cancel_delete();
        if self.fullscreen {
            self.fullscreen_request = Some(false);
        }
    }

    /// Cancel only a pending delete (Escape while a text field has focus).
    pub fn cancel_delete(&mut self) {
        self.store.cancel_delete();
    }

    pub fn toggle_drawing_mode(&mut self) {
        let enable = !self.drawing.is_drawing_mode();
        if enable {
            // The stroke being drawn must be visible
            self.drawing.hide();
        }
        self.drawing.set_drawing_mode(enable);
    }

    /// Give playback a chance to advance, then fold in every queued media
    /// event in arrival order.
    pub fn pump_media_events(&mut self, now: Instant) {
        self.playback.tick(now);
        let Some(events) = &self.events else {
            return;
        };
        let pending: Vec<MediaEvent> = events.try_iter().collect();
        for event in pending {
            self.playback.handle_event(event, now);
        }
    }

    /// Load media through the desktop clock element.
    pub fn open_media(&mut self, info: MediaInfo, now: Instant) {
        let (sender, receiver) = channel();
        let filename = info.filename.clone();
        let is_video = info.is_video;
        self.attach_media(
            Box::new(ClockMedia::new(info, sender)),
            receiver,
            &filename,
            is_video,
            now,
        );
    }

    /// Switch to new media. Comments are kept; numbering restarts, and any
    /// in-progress stroke, reply or pending delete is dropped.
    pub fn attach_media(
        &mut self,
        media: Box<dyn MediaElement>,
        events: Receiver<MediaEvent>,
        filename: &str,
        is_video: bool,
        now: Instant,
    ) {
        self.playback.attach(media, is_video);
        self.events = Some(events);
        self.media_filename = filename.to_string();
        self.project_name = project_name_for(filename);
        self.store.reset_next_id();
        self.store.cancel_delete();
        self.drawing.set_drawing_mode(false);
        self.drawing.hide();
        self.reply_target = None;
        self.selected = None;
        self.unsaved = false;
        self.autosave.start(now);
        log::info!("Opened media {} (video: {})", filename, is_video);
    }

    /// Replace the comment set and metadata with a loaded project.
    pub fn load_project(&mut self, project: ProjectData) {
        log::info!(
            "Loaded project {} with {} comments",
            project.project_name,
            project.comments.len()
        );
        self.project_name = project.project_name;
        self.media_filename = project.media_filename;
        self.created_at = project.created_at;
        self.playback.set_mode(project.is_video, project.frame_rate);
        self.store.replace(project.comments, project.next_comment_id);
        self.drawing.hide();
        self.reply_target = None;
        self.selected = None;
        self.unsaved = false;
    }

    /// The current state as a project document.
    pub fn snapshot(&self) -> ProjectData {
        ProjectData {
            project_name: self.project_name.clone(),
            media_filename: self.media_filename.clone(),
            is_video: self.playback.is_video(),
            comments: self.store.comments().to_vec(),
            frame_rate: self.playback.frame_rate(),
            created_at: self.created_at,
            next_comment_id: self.store.next_id(),
        }
    }

    /// Add a comment from the comment box and any in-progress stroke.
    pub fn commit_comment(&mut self) -> Option<CommentId> {
        if self.session.needs_username() {
            log::warn!("Comment ignored: no username set");
            return None;
        }
        if self.comment_draft.trim().is_empty() && !self.drawing.has_stroke() {
            return None;
        }

        let drawing = if self.drawing.has_stroke() {
            self.drawing.commit(self.playback.dimensions())
        } else {
            self.drawing.set_drawing_mode(false);
            None
        };

        let id = self.store.add_comment(
            &self.comment_draft,
            self.playback.current_time(),
            &self.session.username,
            drawing,
        )?;
        self.comment_draft.clear();
        self.unsaved = true;
        Some(id)
    }

    /// Post the reply box under the current reply target.
    pub fn submit_reply(&mut self) -> Option<CommentId> {
        let target = self.reply_target?;
        if self.session.needs_username() {
            return None;
        }
        let id = self.store.add_reply(
            target,
            ReplyDraft {
                text: &self.reply_draft,
                username: &self.session.username,
                timecode: None,
            },
        )?;
        self.reply_draft.clear();
        self.reply_target = None;
        self.unsaved = true;
        Some(id)
    }

    pub fn toggle_done(&mut self, node: NodeRef) {
        if self.store.toggle_done(node) {
            self.unsaved = true;
        }
    }

    pub fn edit_text(&mut self, node: NodeRef, text: &str) {
        if self.store.edit_text(node, text) {
            self.unsaved = true;
        }
    }

    /// Parse `text` with the current timecode mode and move the node there.
    /// Text that is not four colon-separated fields reads as zero.
    pub fn edit_timecode(&mut self, node: NodeRef, text: &str) -> bool {
        let seconds = self.playback.timecode().parse(text);
        let changed = self.store.edit_timecode(node, seconds);
        if changed {
            self.unsaved = true;
        }
        changed
    }

    /// Two-phase delete; see [`AnnotationStore::delete`].
    pub fn request_delete(&mut self, node: NodeRef) -> DeleteOutcome {
        let outcome = self.store.delete(node);
        if outcome == DeleteOutcome::Deleted {
            if self.drawing.displayed().map(|d| d.comment_id) == Some(node.id) {
                self.drawing.hide();
            }
            if self.selected == Some(node.id) {
                self.selected = None;
            }
            self.unsaved = true;
        }
        outcome
    }

    pub fn pending_delete(&self) -> Option<CommentId> {
        self.store.pending_delete()
    }

    /// Show a comment's drawing, or hide it if it is already shown.
    pub fn toggle_drawing_display(&mut self, id: CommentId) {
        if self.drawing.displayed().map(|d| d.comment_id) == Some(id) {
            self.drawing.hide();
            return;
        }
        let Some(comment) = self.store.find(id) else {
            return;
        };
        if let Some(stroke) = comment.drawing.clone() {
            let line_width = comment.line_width;
            self.drawing.show(id, stroke, line_width);
        }
    }

    /// Seek to `timecode`. A top-level comment at exactly that time with a
    /// drawing gets its drawing shown and becomes the selection.
    pub fn jump_to(&mut self, timecode: f64, now: Instant) {
        self.playback.seek_to_time(timecode, now);

        let hit = self
            .store
            .comments()
            .iter()
            .find(|c| c.timecode == timecode && c.has_drawing())
            .map(|c| (c.id, c.drawing.clone().unwrap_or_default(), c.line_width));

        match hit {
            Some((id, stroke, line_width)) => {
                self.drawing.show(id, stroke, line_width);
                self.selected = Some(id);
            }
            None => {
                self.drawing.hide();
                self.selected = None;
            }
        }
    }

    /// Clicking a comment: jump to its time and select it.
    pub fn activate_comment(&mut self, id: CommentId, now: Instant) {
        if let Some(timecode) = self.store.find(id).map(|c| c.timecode) {
            self.jump_to(timecode, now);
            self.selected = Some(id);
        }
    }

    /// Build the manual-save download.
    ///
    /// Nothing is saved until media has been loaded. The project only counts
    /// as saved once the host confirms with [`Review::mark_saved`].
    pub fn save_project(&self, now: DateTime<Local>) -> Result<Option<Download>, ProjectError> {
        if !self.playback.has_media() {
            return Ok(None);
        }
        let contents = to_document(&self.snapshot())?;
        let file_name = save_file_name(
            &self.session.username,
            &self.media_filename,
            &self.project_name,
            now.naive_local(),
        );
        Ok(Some(Download { file_name, contents }))
    }

    pub fn mark_saved(&mut self, now: DateTime<Local>) {
        self.unsaved = false;
        self.last_saved = Some(now);
        log::info!("Project {} saved", self.project_name);
    }

    /// Backup download when the autosave interval has elapsed with
    /// unsaved changes. Does not clear the unsaved flag.
    pub fn poll_autosave(
        &mut self,
        now: Instant,
        wall: DateTime<Local>,
    ) -> Result<Option<Download>, ProjectError> {
        if !self.autosave.poll(now, self.unsaved) || !self.playback.has_media() {
            return Ok(None);
        }
        let contents = to_document(&self.snapshot())?;
        let file_name = backup_file_name(
            &self.session.username,
            &self.media_filename,
            &self.project_name,
            wall.naive_local(),
        );
        log::info!("Autosave backup {}", file_name);
        Ok(Some(Download { file_name, contents }))
    }

    /// EDL of the comments in display order; `None` when disabled or empty.
    pub fn export_edl(&self) -> Option<Download> {
        if !self.config.edl_export || self.store.comments().is_empty() {
            return None;
        }
        Some(Download {
            file_name: edl_file_name(&self.project_name),
            contents: to_edl(
                self.store.comments(),
                &self.project_name,
                self.playback.timecode(),
                &self.view,
            ),
        })
    }

    /// End of session: stop timers and drop transient state.
    pub fn shutdown(&mut self) {
        self.autosave.cancel();
        self.drawing.set_drawing_mode(false);
        self.store.cancel_delete();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::serialization::from_document;
    use crate::models::store::SortOrder;
    use std::sync::mpsc::Sender;
    use std::time::Duration;

    /// Minimal element that applies requests immediately.
    struct InstantMedia {
        time: f64,
        events: Sender<MediaEvent>,
    }

    impl MediaElement for InstantMedia {
        fn current_time(&self) -> f64 {
            self.time
        }
        fn set_current_time(&mut self, seconds: f64) {
            self.time = seconds;
            let _ = self.events.send(MediaEvent::TimeUpdate(seconds));
        }
        fn duration(&self) -> f64 {
            60.0
        }
        fn intrinsic_size(&self) -> (u32, u32) {
            (1280, 720)
        }
        fn play(&mut self) {}
        fn pause(&mut self) {}
        fn muted(&self) -> bool {
            false
        }
        fn set_muted(&mut self, _muted: bool) {}
        fn volume(&self) -> f64 {
            1.0
        }
        fn set_volume(&mut self, _volume: f64) {}
        fn playback_rate(&self) -> f64 {
            1.0
        }
        fn set_playback_rate(&mut self, _rate: f64) {}
    }

    fn review() -> (Review, Instant) {
        let session = Session {
            username: "ana".to_string(),
            ..Default::default()
        };
        let mut review = Review::new(ReviewConfig::default(), session);
        let (sender, receiver) = channel();
        sender
            .send(MediaEvent::MetadataLoaded {
                duration: 60.0,
                width: 1280,
                height: 720,
            })
            .unwrap();
        let media = InstantMedia {
            time: 0.0,
            events: sender,
        };
        let now = Instant::now();
        review.attach_media(Box::new(media), receiver, "take1.mov", true, now);
        review.pump_media_events(now);
        (review, now)
    }

    fn comment_at(review: &mut Review, seconds: f64, text: &str, now: Instant) -> CommentId {
        review.playback.seek_to_time(seconds, now);
        review.comment_draft = text.to_string();
        review.commit_comment().unwrap()
    }

    #[test]
    fn test_media_load_sets_project_name() {
        let (review, _) = review();
        assert_eq!(review.project_name(), "take1");
        assert_eq!(review.media_filename(), "take1.mov");
        assert_eq!(review.playback().duration(), 60.0);
    }

    #[test]
    fn test_playback_stops_at_end_of_media() {
        let mut review = Review::new(ReviewConfig::default(), Session::default());
        let info = MediaInfo {
            filename: "short.mp4".to_string(),
            is_video: true,
            duration: 1.0,
            width: 640,
            height: 360,
            frame_rate: 25.0,
        };
        let start = Instant::now();
        review.open_media(info, start);
        review.pump_media_events(start);

        review.apply(Action::PlayPause, start);
        review.pump_media_events(start);
        review.pump_media_events(start + Duration::from_secs(3));
        assert_eq!(review.playback().current_time(), 1.0);
        assert!(!review.playback().is_playing());

        // One press starts playback again
        review.apply(Action::PlayPause, start + Duration::from_secs(4));
        assert!(review.playback().is_playing());
    }

    #[test]
    fn test_commit_comment_with_drawing() {
        let (mut review, now) = review();
        review.playback.seek_to_time(12.0, now);
        review.apply(Action::ToggleDrawingMode, now);
        review.drawing_mut().resize(640.0, 360.0);
        review.drawing_mut().begin_stroke(320.0, 180.0);
        review.drawing_mut().extend_stroke(330.0, 190.0);

        let id = review.commit_comment().unwrap();
        let comment = review.store().find(id).unwrap();
        assert_eq!(comment.timecode, 12.0);
        assert_eq!(comment.username, "ana");
        assert!((comment.drawing.as_ref().unwrap()[0].x - 640.0).abs() < 1e-9);
        assert!(!review.drawing().is_drawing_mode());
        assert!(review.has_unsaved_changes());
    }

    #[test]
    fn test_blank_comment_is_ignored() {
        let (mut review, now) = review();
        review.comment_draft = "   ".to_string();
        review.apply(Action::CommitComment, now);
        assert!(review.store().comments().is_empty());
        assert!(!review.has_unsaved_changes());
    }

    #[test]
    fn test_comment_requires_username() {
        let mut review = Review::new(ReviewConfig::default(), Session::default());
        review.comment_draft = "hello".to_string();
        assert!(review.commit_comment().is_none());
    }

    #[test]
    fn test_cancel_clears_transient_state() {
        let (mut review, now) = review();
        let id = comment_at(&mut review, 1.0, "a", now);
        review.toggle_reply(id);
        review.apply(Action::ToggleDrawingMode, now);
        review.drawing_mut().begin_stroke(1.0, 1.0);
        review.request_delete(NodeRef::top(id));
        review.on_fullscreen_changed(true);

        review.apply(Action::Cancel, now);
        assert_eq!(review.reply_target(), None);
        assert!(!review.drawing().is_drawing_mode());
        assert!(!review.drawing().has_stroke());
        assert_eq!(review.pending_delete(), None);
        assert_eq!(review.take_fullscreen_request(), Some(false));

        // Next delete only arms again
        assert_eq!(review.request_delete(NodeRef::top(id)), DeleteOutcome::Armed);
    }

    #[test]
    fn test_rejected_fullscreen_keeps_flag() {
        let (mut review, now) = review();
        review.apply(Action::ToggleFullscreen, now);
        assert_eq!(review.take_fullscreen_request(), Some(true));
        // Host never confirms
        assert!(!review.is_fullscreen());
    }

    #[test]
    fn test_reply_uses_parent_time() {
        let (mut review, now) = review();
        let id = comment_at(&mut review, 4.0, "parent", now);
        review.playback.seek_to_time(30.0, now);
        review.toggle_reply(id);
        review.reply_draft = "child".to_string();
        let reply = review.submit_reply().unwrap();

        assert_eq!(review.store().find(reply).unwrap().timecode, 4.0);
        assert_eq!(review.reply_target(), None);
        assert!(review.reply_draft.is_empty());
    }

    #[test]
    fn test_edit_timecode_parses_with_mode() {
        let (mut review, now) = review();
        let id = comment_at(&mut review, 1.0, "a", now);
        assert!(review.edit_timecode(NodeRef::top(id), "00:00:02:12"));
        assert_eq!(review.store().find(id).unwrap().timecode, 2.5);

        // Malformed text reads as the start of the media
        assert!(review.edit_timecode(NodeRef::top(id), "garbage"));
        assert_eq!(review.store().find(id).unwrap().timecode, 0.0);
    }

    #[test]
    fn test_delete_hides_displayed_drawing() {
        let (mut review, now) = review();
        review.apply(Action::ToggleDrawingMode, now);
        review.drawing_mut().resize(1280.0, 720.0);
        review.drawing_mut().begin_stroke(5.0, 5.0);
        let id = review.commit_comment().unwrap();

        review.toggle_drawing_display(id);
        assert_eq!(review.drawing().displayed().unwrap().comment_id, id);

        assert_eq!(review.request_delete(NodeRef::top(id)), DeleteOutcome::Armed);
        assert!(review.drawing().displayed().is_some());
        assert_eq!(review.request_delete(NodeRef::top(id)), DeleteOutcome::Deleted);
        assert!(review.drawing().displayed().is_none());
    }

    #[test]
    fn test_jump_to_shows_drawing_at_exact_time() {
        let (mut review, now) = review();
        review.playback.seek_to_time(7.5, now);
        review.apply(Action::ToggleDrawingMode, now);
        review.drawing_mut().resize(1280.0, 720.0);
        review.drawing_mut().begin_stroke(5.0, 5.0);
        let id = review.commit_comment().unwrap();

        review.jump_to(7.5, now);
        assert_eq!(review.selected(), Some(id));
        assert!(review.drawing().displayed().is_some());

        review.jump_to(8.0, now);
        assert_eq!(review.selected(), None);
        assert!(review.drawing().displayed().is_none());
    }

    #[test]
    fn test_skip_and_wheel_seek() {
        let (mut review, now) = review();
        review.apply(Action::SkipForward, now);
        review.apply(Action::WheelSeek(WheelDirection::Up), now);
        let later = now + Duration::from_millis(500);
        review.pump_media_events(later);
        assert_eq!(review.playback().current_time(), 65.0);

        review.apply(Action::SkipBackward, later);
        review.pump_media_events(later);
        assert_eq!(review.playback().current_time(), 60.0);
    }

    #[test]
    fn test_volume_actions_are_clamped() {
        let (mut review, now) = review();
        for _ in 0..10 {
            review.apply(Action::VolumeUp, now);
        }
        assert_eq!(review.playback().volume(), 1.0);
        review.apply(Action::WheelVolume(WheelDirection::Down), now);
        assert!((review.playback().volume() - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_save_download() {
        let (mut review, now) = review();
        comment_at(&mut review, 1.0, "a", now);
        let wall = Local::now();
        let download = review.save_project(wall).unwrap().unwrap();
        assert!(download.file_name.contains("ana comments-take1-MsMediaReview-"));
        assert!(review.has_unsaved_changes());
        assert_eq!(review.time_since_save(), "NEVER SAVED");

        review.mark_saved(wall);
        assert!(!review.has_unsaved_changes());
        assert_eq!(review.time_since_save(), "0m");
        let project = from_document(&download.contents).unwrap();
        assert_eq!(project.comments.len(), 1);
        assert_eq!(project.next_comment_id, 2);
    }

    #[test]
    fn test_save_without_media_is_noop() {
        let review = Review::new(ReviewConfig::default(), Session::default());
        assert_eq!(review.save_project(Local::now()).unwrap(), None);
    }

    #[test]
    fn test_autosave_only_when_dirty() {
        let (mut review, now) = review();
        let due = now + Duration::from_secs(301);
        assert_eq!(review.poll_autosave(due, Local::now()).unwrap(), None);

        comment_at(&mut review, 1.0, "a", now);
        let due = now + Duration::from_secs(700);
        let backup = review.poll_autosave(due, Local::now()).unwrap().unwrap();
        assert!(backup.file_name.contains("_Backup-ana comments-take1-"));
        assert!(review.has_unsaved_changes());

        review.shutdown();
        let later = now + Duration::from_secs(3600);
        assert_eq!(review.poll_autosave(later, Local::now()).unwrap(), None);
    }

    #[test]
    fn test_edl_export_uses_view_order() {
        let (mut review, now) = review();
        comment_at(&mut review, 5.0, "five", now);
        comment_at(&mut review, 1.0, "one", now);
        review.set_view_options(ViewOptions::new(SortOrder::Desc, false));

        let edl = review.export_edl().unwrap();
        assert_eq!(edl.file_name, "take1_comments_export.edl");
        let comments: Vec<&str> = edl
            .contents
            .lines()
            .filter(|l| l.starts_with("* COMMENT"))
            .collect();
        assert_eq!(comments, vec!["* COMMENT: ID-0001: five", "* COMMENT: ID-0002: one"]);
    }

    #[test]
    fn test_new_media_restarts_numbering_and_keeps_comments() {
        let (mut review, now) = review();
        comment_at(&mut review, 1.0, "a", now);
        review.request_delete(NodeRef::top(1));

        let (sender, receiver) = channel();
        let media = InstantMedia {
            time: 0.0,
            events: sender,
        };
        review.attach_media(Box::new(media), receiver, "take2.mov", true, now);
        assert_eq!(review.store().next_id(), 1);
        assert_eq!(review.store().comments().len(), 1);
        assert_eq!(review.pending_delete(), None);
        assert!(!review.has_unsaved_changes());
    }

    #[test]
    fn test_load_project_replaces_everything() {
        let (mut review, now) = review();
        comment_at(&mut review, 1.0, "a", now);

        let mut project = ProjectData::new("other.wav", false);
        project.frame_rate = 30.0;
        project.comments = vec![Comment::new(40, "bo", 2.0, "x")];
        project.next_comment_id = 41;
        review.load_project(project);

        assert_eq!(review.store().comments().len(), 1);
        assert_eq!(review.store().next_id(), 41);
        assert!(!review.playback().is_video());
        assert_eq!(review.format_time(2.5), "00:00:02:500");
        assert_eq!(review.snapshot().frame_rate, 30.0);
    }
}
