// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Per-user session settings.
//!
//! The reviewer's name and theme survive restarts through the framework's
//! key/value storage. They are read once at startup and written back
//! whenever the framework asks the app to save.

use eframe::Storage;

const USERNAME_KEY: &str = "annotator-username";
const THEME_KEY: &str = "annotator-theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "dark" => Some(Theme::Dark),
            "light" => Some(Theme::Light),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub username: String,
    pub theme: Theme,
}

impl Session {
    /// Read the session from storage; missing keys fall back to defaults.
    pub fn load(storage: Option<&dyn Storage>) -> Self {
        let Some(storage) = storage else {
            return Self::default();
        };
        Self {
            username: storage.get_string(USERNAME_KEY).unwrap_or_default(),
            theme: storage
                .get_string(THEME_KEY)
                .and_then(|value| Theme::parse(&value))
                .unwrap_or_default(),
        }
    }

    pub fn save(&self, storage: &mut dyn Storage) {
        storage.set_string(USERNAME_KEY, self.username.clone());
        storage.set_string(THEME_KEY, self.theme.as_str().to_string());
    }

    /// Comments cannot be attributed until a name is entered.
    pub fn needs_username(&self) -> bool {
        self.username.trim().is_empty()
    }
}
