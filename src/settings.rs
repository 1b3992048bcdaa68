//! Game settings and preferences
//!
//! Persisted separately from the high score, as JSON. A malformed store just
//! means default settings, never an error the player sees.

use serde::{Deserialize, Serialize};

use crate::persistence;

/// Storage slot: a file name on native, a localStorage key suffix on web
const SLOT: &str = "settings.json";

/// Music volume the M key toggles back up to
pub const MUSIC_VOLUME_ON: f32 = 0.5;

/// Game settings/preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Siren loop volume (0.0 - 1.0); M toggles between 0.0 and 0.5
    pub music_volume: f32,
    /// One-shot effect volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Mute audio while the window is unfocused
    pub mute_on_blur: bool,
    /// Show the FPS counter in the HUD
    pub show_fps: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            music_volume: MUSIC_VOLUME_ON,
            sfx_volume: 1.0,
            mute_on_blur: true,
            show_fps: false,
        }
    }
}

impl Settings {
    /// Flip the music between silent and audible. Returns true when audible.
    pub fn toggle_music(&mut self) -> bool {
        self.music_volume = if self.music_volume > 0.0 {
            0.0
        } else {
            MUSIC_VOLUME_ON
        };
        self.music_volume > 0.0
    }

    /// Load settings; malformed or missing stores fall back to defaults
    pub fn load() -> Self {
        match persistence::read(SLOT).map(|json| serde_json::from_str(&json)) {
            Some(Ok(settings)) => {
                log::info!("Loaded settings");
                settings
            }
            Some(Err(err)) => {
                log::debug!("Stored settings unreadable ({err}); using defaults");
                Self::default()
            }
            None => Self::default(),
        }
    }

    /// Persist, best effort
    pub fn save(&self) {
        if let Ok(json) = serde_json::to_string(self) {
            persistence::write(SLOT, &json);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_music_flips_between_off_and_on() {
        let mut s = Settings::default();
        assert!(s.music_volume > 0.0);
        assert!(!s.toggle_music());
        assert_eq!(s.music_volume, 0.0);
        assert!(s.toggle_music());
        assert_eq!(s.music_volume, MUSIC_VOLUME_ON);
    }

    #[test]
    fn test_json_round_trip() {
        let mut s = Settings::default();
        s.sfx_volume = 0.25;
        s.show_fps = true;
        let json = serde_json::to_string(&s).unwrap();
        let back: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(back.sfx_volume, 0.25);
        assert!(back.show_fps);
        assert_eq!(back.music_volume, s.music_volume);
        assert_eq!(back.mute_on_blur, s.mute_on_blur);
    }
}
