use std::time::Duration;
use serde::{Deserialize, Serialize};

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(10);

/// User-facing playback switches, passed into every tick as a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackSettings {
    pub interval: Duration,
    pub random: bool,
    pub sponsors_enabled: bool,
    pub watch_new_files: bool,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            random: false,
            sponsors_enabled: false,
            watch_new_files: true,
        }
    }
}
