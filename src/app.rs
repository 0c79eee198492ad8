// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main application state and egui App implementation.
//!
//! This module contains the main application structure that implements
//! the egui::App trait. It feeds window input, files and timers into the
//! review session and lays out the panels around it.

use crate::ui::{canvas, comments, timeline, toolbar};
use chrono::Local;
use media_review::config::ReviewConfig;
use media_review::io::media::{is_media_file, media_extensions, probe, MediaInfo};
use media_review::io::serialization::{export_project, import_project, ProjectFormat};
use media_review::models::project::ProjectData;
use media_review::review::{Action, Download, Review, WheelDirection};
use media_review::session::{Session, Theme};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver};
use std::time::{Duration, Instant};

/// Result of a background load.
enum Loaded {
    Media(MediaInfo, PathBuf),
    Project(ProjectData),
}

/// Main application state.
pub struct ReviewApp {
    review: Review,

    /// UI-only state of the comment panel
    comments_panel: comments::CommentsPanel,

    /// Receiver for background media probing and project import
    loader: Option<Receiver<Result<Loaded, String>>>,

    /// Loading state message
    loading_message: Option<String>,

    /// Last error, shown in the status bar until the next one
    last_error: Option<String>,

    /// Where autosave backups are written
    backup_dir: Option<PathBuf>,

    /// Buffer for the username prompt
    username_input: String,

    show_shortcuts: bool,

    /// A close was held back because of unsaved changes
    confirm_close: bool,

    /// The user chose to leave; the next close request goes through
    allow_close: bool,

    /// Theme currently applied to the context
    applied_theme: Option<Theme>,
}

impl ReviewApp {
    /// Create the application, restoring the session from storage.
    pub fn new(cc: &eframe::CreationContext<'_>, config: ReviewConfig) -> Self {
        let session = Session::load(cc.storage);
        log::info!("Session user: {:?}", session.username);

        Self {
            review: Review::new(config, session),
            comments_panel: comments::CommentsPanel::default(),
            loader: None,
            loading_message: None,
            last_error: None,
            backup_dir: None,
            username_input: String::new(),
            show_shortcuts: false,
            confirm_close: false,
            allow_close: false,
            applied_theme: None,
        }
    }

    fn report_error(&mut self, message: String) {
        log::error!("{}", message);
        self.last_error = Some(message);
    }

    /// Probe a media file in the background.
    fn open_media(&mut self, path: PathBuf) {
        let (sender, receiver) = channel();
        self.loader = Some(receiver);
        self.loading_message = Some("Opening media...".to_string());

        std::thread::spawn(move || {
            let result = probe(&path)
                .map(|info| Loaded::Media(info, path.clone()))
                .map_err(|e| format!("Failed to open {}: {}", path.display(), e));
            let _ = sender.send(result);
        });
    }

    /// Read a project file in the background. The comment set is replaced
    /// in one step once the whole file has parsed.
    fn import_project(&mut self, path: PathBuf) {
        let (sender, receiver) = channel();
        self.loader = Some(receiver);
        self.loading_message = Some("Loading project...".to_string());

        std::thread::spawn(move || {
            let result = import_project(&path)
                .map(Loaded::Project)
                .map_err(|e| format!("Failed to load project {}: {}", path.display(), e));
            let _ = sender.send(result);
        });
    }

    fn open_path(&mut self, path: PathBuf) {
        if is_media_file(&path) {
            self.open_media(path);
        } else if ProjectFormat::from_path(&path).is_ok() {
            self.import_project(path);
        } else {
            self.report_error(format!("Unsupported file: {}", path.display()));
        }
    }

    fn poll_loader(&mut self, now: Instant) {
        let Some(receiver) = &self.loader else {
            return;
        };
        let Ok(result) = receiver.try_recv() else {
            return;
        };
        self.loader = None;
        self.loading_message = None;

        match result {
            Ok(Loaded::Media(info, path)) => {
                self.backup_dir = path.parent().map(Path::to_path_buf);
                self.review.open_media(info, now);
                self.last_error = None;
            }
            Ok(Loaded::Project(project)) => {
                self.review.load_project(project);
                self.last_error = None;
            }
            Err(e) => self.report_error(e),
        }
    }

    /// Ask where to put a download and write it.
    fn offer_download(&mut self, download: &Download) -> bool {
        let Some(path) = rfd::FileDialog::new()
            .set_file_name(&download.file_name)
            .save_file()
        else {
            return false;
        };
        match std::fs::write(&path, &download.contents) {
            Ok(()) => {
                log::info!("Wrote {}", path.display());
                true
            }
            Err(e) => {
                self.report_error(format!("Failed to write {}: {}", path.display(), e));
                false
            }
        }
    }

    fn save_project(&mut self) {
        let now = Local::now();
        match self.review.save_project(now) {
            Ok(Some(download)) => {
                if self.offer_download(&download) {
                    self.review.mark_saved(now);
                }
            }
            Ok(None) => log::warn!("Nothing to save: no media loaded"),
            Err(e) => self.report_error(format!("Failed to save project: {}", e)),
        }
    }

    fn export_edl(&mut self) {
        match self.review.export_edl() {
            Some(download) => {
                self.offer_download(&download);
            }
            None => log::warn!("EDL export skipped: no comments"),
        }
    }

    /// Export the project in the format picked by the file extension.
    fn export_as(&mut self, filter: &str, extensions: &[&str], file_name: &str) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter(filter, extensions)
            .set_file_name(file_name)
            .save_file()
        else {
            return;
        };
        match export_project(&self.review.snapshot(), &path) {
            Ok(()) => log::info!("Exported project to {}", path.display()),
            Err(e) => self.report_error(format!("Failed to export project: {}", e)),
        }
    }

    /// Write a backup next to the media without prompting.
    fn write_backup(&mut self, download: Download) {
        let dir = self.backup_dir.clone().unwrap_or_else(|| PathBuf::from("."));
        let path = dir.join(&download.file_name);
        if let Err(e) = std::fs::write(&path, download.contents) {
            self.report_error(format!("Autosave to {} failed: {}", path.display(), e));
        }
    }

    fn handle_input(&mut self, ctx: &egui::Context, now: Instant) {
        // Text fields keep their keys; Esc still abandons a pending delete
        if ctx.wants_keyboard_input() {
            if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
                self.review.cancel_delete();
            }
            return;
        }

        let actions: Vec<Action> = ctx.input(|i| {
            i.events
                .iter()
                .filter_map(|event| match event {
                    egui::Event::Key {
                        key,
                        pressed: true,
                        modifiers,
                        ..
                    } => key_action(*key, *modifiers),
                    egui::Event::MouseWheel {
                        delta, modifiers, ..
                    } => wheel_action(*delta, *modifiers),
                    _ => None,
                })
                .collect()
        });

        for action in actions {
            self.review.apply(action, now);
        }
    }

    fn apply_comment_action(&mut self, action: comments::CommentAction, now: Instant) {
        use comments::CommentAction;

        match action {
            CommentAction::Commit => self.review.apply(Action::CommitComment, now),
            CommentAction::Activate(id) => self.review.activate_comment(id, now),
            CommentAction::ToggleDone(node) => self.review.toggle_done(node),
            CommentAction::ToggleReply(id) => self.review.toggle_reply(id),
            CommentAction::SubmitReply => {
                self.review.submit_reply();
            }
            CommentAction::Delete(node) => {
                self.review.request_delete(node);
            }
            CommentAction::ToggleDrawing(id) => self.review.toggle_drawing_display(id),
            CommentAction::EditText(node, text) => self.review.edit_text(node, &text),
            CommentAction::EditTimecode(node, text) => {
                if !self.review.edit_timecode(node, &text) {
                    log::warn!("Timecode edit rejected: {}", text);
                }
            }
            CommentAction::SetView(view) => self.review.set_view_options(view),
        }
    }

    fn show_username_prompt(&mut self, ctx: &egui::Context) {
        egui::Window::new("Who is reviewing?")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .show(ctx, |ui| {
                ui.label("Comments are signed with this name.");
                let response = ui.text_edit_singleline(&mut self.username_input);
                let entered = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                if ui.button("Start reviewing").clicked() || entered {
                    let name = self.username_input.trim();
                    if !name.is_empty() {
                        self.review.session.username = name.to_string();
                        log::info!("Reviewer set to {}", name);
                    }
                }
            });
    }

    fn show_close_prompt(&mut self, ctx: &egui::Context) {
        egui::Window::new("Unsaved changes")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .show(ctx, |ui| {
                ui.label("You have unsaved changes. Save before leaving?");
                ui.horizontal(|ui| {
                    if ui.button("Save").clicked() {
                        self.save_project();
                        if !self.review.has_unsaved_changes() {
                            self.leave(ctx);
                        }
                    }
                    if ui.button("Discard").clicked() {
                        log::warn!("Closing with unsaved changes discarded");
                        self.leave(ctx);
                    }
                    if ui.button("Cancel").clicked() {
                        self.confirm_close = false;
                    }
                });
            });
    }

    fn leave(&mut self, ctx: &egui::Context) {
        self.confirm_close = false;
        self.allow_close = true;
        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
    }

    fn show_shortcuts_window(&mut self, ctx: &egui::Context) {
        egui::Window::new("Keyboard Shortcuts")
            .open(&mut self.show_shortcuts)
            .resizable(false)
            .show(ctx, |ui| {
                egui::Grid::new("shortcuts").striped(true).show(ui, |ui| {
                    for (keys, what) in SHORTCUTS {
                        ui.label(egui::RichText::new(*keys).monospace());
                        ui.label(*what);
                        ui.end_row();
                    }
                });
            });
    }
}

const SHORTCUTS: &[(&str, &str)] = &[
    ("Space", "Play / pause"),
    ("← / →", "Skip back / forward"),
    ("↑ / ↓", "Volume up / down"),
    ("Enter", "Post comment"),
    ("Ctrl+Z", "Undo drawing"),
    ("Ctrl+Shift+Z", "Redo drawing"),
    ("Esc", "Cancel reply, drawing and delete; leave fullscreen"),
    ("Ctrl+Shift+C", "Focus comment box"),
    ("F11", "Toggle fullscreen"),
    ("Shift+Wheel", "Volume"),
    ("Shift+Alt+Wheel", "Seek one minute"),
];

/// Whether a window close request should be held for confirmation.
fn hold_close(unsaved: bool, allowed: bool) -> bool {
    unsaved && !allowed
}

/// Keyboard binding for a key press outside text fields.
fn key_action(key: egui::Key, modifiers: egui::Modifiers) -> Option<Action> {
    use egui::Key;

    if modifiers.command {
        return match (key, modifiers.shift) {
            (Key::Z, false) => Some(Action::UndoStroke),
            (Key::Z, true) => Some(Action::RedoStroke),
            (Key::C, true) => Some(Action::FocusCommentInput),
            _ => None,
        };
    }

    match key {
        Key::Space => Some(Action::PlayPause),
        Key::ArrowRight => Some(Action::SkipForward),
        Key::ArrowLeft => Some(Action::SkipBackward),
        Key::ArrowUp => Some(Action::VolumeUp),
        Key::ArrowDown => Some(Action::VolumeDown),
        Key::Enter => Some(Action::CommitComment),
        Key::Escape => Some(Action::Cancel),
        Key::F11 => Some(Action::ToggleFullscreen),
        _ => None,
    }
}

/// Wheel binding: Shift adjusts volume, Shift+Alt seeks.
fn wheel_action(delta: egui::Vec2, modifiers: egui::Modifiers) -> Option<Action> {
    if !modifiers.shift {
        return None;
    }
    // Some platforms turn a shifted wheel into horizontal scrolling
    let amount = if delta.y != 0.0 { delta.y } else { delta.x };
    let direction = if amount > 0.0 {
        WheelDirection::Up
    } else if amount < 0.0 {
        WheelDirection::Down
    } else {
        return None;
    };

    if modifiers.alt {
        Some(Action::WheelSeek(direction))
    } else {
        Some(Action::WheelVolume(direction))
    }
}

impl eframe::App for ReviewApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();

        // Check for completed background loading
        self.poll_loader(now);

        // Window close button and File > Quit both arrive here
        if ctx.input(|i| i.viewport().close_requested())
            && hold_close(self.review.has_unsaved_changes(), self.allow_close)
        {
            ctx.send_viewport_cmd(egui::ViewportCommand::CancelClose);
            self.confirm_close = true;
        }

        // Files dropped on the window
        let dropped: Vec<PathBuf> =
            ctx.input(|i| i.raw.dropped_files.iter().filter_map(|f| f.path.clone()).collect());
        for path in dropped {
            self.open_path(path);
        }

        let fullscreen = ctx.input(|i| i.viewport().fullscreen.unwrap_or(false));
        self.review.on_fullscreen_changed(fullscreen);

        self.review.pump_media_events(now);

        match self.review.poll_autosave(now, Local::now()) {
            Ok(Some(backup)) => self.write_backup(backup),
            Ok(None) => {}
            Err(e) => self.report_error(format!("Autosave failed: {}", e)),
        }

        if self.applied_theme != Some(self.review.session.theme) {
            let theme = self.review.session.theme;
            ctx.set_visuals(match theme {
                Theme::Dark => egui::Visuals::dark(),
                Theme::Light => egui::Visuals::light(),
            });
            self.applied_theme = Some(theme);
        }

        // Top menu bar
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Open Media...").clicked() {
                        if let Some(path) = rfd::FileDialog::new()
                            .add_filter("Media", media_extensions().as_slice())
                            .pick_file()
                        {
                            self.open_media(path);
                        }
                        ui.close_menu();
                    }
                    if ui.button("Load Project...").clicked() {
                        if let Some(path) = rfd::FileDialog::new()
                            .add_filter("Projects", &["json", "yaml", "yml"])
                            .pick_file()
                        {
                            self.import_project(path);
                        }
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Save Project...").clicked() {
                        self.save_project();
                        ui.close_menu();
                    }
                    ui.menu_button("Export", |ui| {
                        let name = self.review.project_name().to_string();
                        if ui.button("Export as YAML...").clicked() {
                            self.export_as("YAML", &["yaml", "yml"], &format!("{}.yaml", name));
                            ui.close_menu();
                        }
                        if ui.button("Export as JSON...").clicked() {
                            self.export_as("JSON", &["json"], &format!("{}.json", name));
                            ui.close_menu();
                        }
                        if self.review.config().edl_export {
                            let has_comments = !self.review.store().comments().is_empty();
                            if ui
                                .add_enabled(has_comments, egui::Button::new("Export EDL..."))
                                .clicked()
                            {
                                self.export_edl();
                                ui.close_menu();
                            }
                        }
                    });
                    ui.separator();
                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });

                ui.menu_button("View", |ui| {
                    let label = match self.review.session.theme {
                        Theme::Dark => "Light Theme",
                        Theme::Light => "Dark Theme",
                    };
                    if ui.button(label).clicked() {
                        self.review.session.theme = self.review.session.theme.toggled();
                        ui.close_menu();
                    }
                    if ui.button("Change Reviewer...").clicked() {
                        self.username_input = self.review.session.username.clone();
                        self.review.session.username.clear();
                        ui.close_menu();
                    }
                });

                ui.menu_button("Help", |ui| {
                    if ui.button("Keyboard Shortcuts").clicked() {
                        self.show_shortcuts = true;
                        ui.close_menu();
                    }
                });
            });
        });

        // Toolbar
        let toolbar_action = egui::TopBottomPanel::top("toolbar")
            .show(ctx, |ui| toolbar::show(ui, &self.review))
            .inner;
        if let Some(action) = toolbar_action {
            self.review.apply(action, now);
        }

        // Status bar
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(self.review.project_name());
                if self.review.has_unsaved_changes() {
                    ui.label(egui::RichText::new("● unsaved").color(egui::Color32::YELLOW));
                }
                ui.separator();
                ui.label(format!("Last save: {}", self.review.time_since_save()));
                ui.separator();
                ui.label(format!("Reviewer: {}", self.review.session.username));
                if let Some(ref message) = self.loading_message {
                    ui.separator();
                    ui.spinner();
                    ui.label(message);
                }
                if let Some(ref error) = self.last_error {
                    ui.separator();
                    ui.label(egui::RichText::new(error).color(egui::Color32::LIGHT_RED));
                }
            });
        });

        // Timeline
        let timeline_action = egui::TopBottomPanel::bottom("timeline")
            .show(ctx, |ui| {
                ui.add_space(4.0);
                timeline::show(ui, &self.review)
            })
            .inner;
        match timeline_action {
            timeline::TimelineAction::Seek(fraction) => {
                self.review.apply(Action::SeekFraction(fraction), now);
            }
            timeline::TimelineAction::JumpToComment(id) => self.review.activate_comment(id, now),
            timeline::TimelineAction::None => {}
        }

        // Comments panel (right side)
        let comment_actions = egui::SidePanel::right("comments")
            .default_width(340.0)
            .show(ctx, |ui| {
                comments::show(ui, &mut self.comments_panel, &mut self.review)
            })
            .inner;
        for action in comment_actions {
            self.apply_comment_action(action, now);
        }

        // Main canvas (center)
        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| canvas::show(ui, &mut self.review));

        if self.review.session.needs_username() {
            self.show_username_prompt(ctx);
        }
        if self.show_shortcuts {
            self.show_shortcuts_window(ctx);
        }
        if self.confirm_close {
            self.show_close_prompt(ctx);
        }

        self.handle_input(ctx, now);

        if let Some(fullscreen) = self.review.take_fullscreen_request() {
            ctx.send_viewport_cmd(egui::ViewportCommand::Fullscreen(fullscreen));
        }

        // Keep the clock and timers moving
        if self.review.playback().is_playing() || self.loading_message.is_some() {
            ctx.request_repaint();
        } else if self.review.playback().has_media() {
            ctx.request_repaint_after(Duration::from_millis(250));
        }
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        self.review.session.save(storage);
    }
}

impl Drop for ReviewApp {
    fn drop(&mut self) {
        self.review.shutdown();
        log::info!("Review session ended");
    }
}
