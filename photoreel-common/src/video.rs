use std::path::Path;
use serde::{Deserialize, Serialize};
use crate::Result;

pub const VIDEO_EXTENSIONS: [&str; 3] = ["mp4", "mpeg", "wmv"];

pub fn is_video(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
        .is_some_and(|ext| VIDEO_EXTENSIONS.contains(&ext.as_str()))
}

/// Playback state reported by the external video player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VideoState {
    Stopped,
    Paused,
    Playing,
    Finished,
    Error,
}

impl VideoState {
    /// Maps a numeric player state code.
    ///
    /// Buffering, seeking and the other transitional codes keep the player
    /// busy, so they count as playing.
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => VideoState::Stopped,
            2 => VideoState::Paused,
            3 => VideoState::Playing,
            8 => VideoState::Finished,
            4..=7 | 9..=12 => VideoState::Playing,
            _ => VideoState::Error,
        }
    }

    pub fn is_playing(self) -> bool {
        self == VideoState::Playing
    }
}

impl std::fmt::Display for VideoState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            VideoState::Stopped => "stopped",
            VideoState::Paused => "paused",
            VideoState::Playing => "playing",
            VideoState::Finished => "finished",
            VideoState::Error => "error",
        };
        write!(f, "{}", name)
    }
}

pub trait VideoControl {
    fn play(&mut self, path: &Path) -> Result<()>;
    fn stop(&mut self);
    fn clear_playlist(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_codes() {
        assert_eq!(VideoState::from_code(1), VideoState::Stopped);
        assert_eq!(VideoState::from_code(2), VideoState::Paused);
        assert_eq!(VideoState::from_code(3), VideoState::Playing);
        assert_eq!(VideoState::from_code(8), VideoState::Finished);
        assert_eq!(VideoState::from_code(0), VideoState::Error);
        assert_eq!(VideoState::from_code(42), VideoState::Error);
        assert_eq!(VideoState::from_code(-1), VideoState::Error);
    }

    #[test]
    fn test_transitional_codes_count_as_playing() {
        for code in (4..=7).chain(9..=12) {
            assert!(VideoState::from_code(code).is_playing(), "code {}", code);
        }
    }

    #[test]
    fn test_video_extension_filter() {
        assert!(is_video(Path::new("/v/clip.MP4")));
        assert!(is_video(Path::new("/v/old.mpeg")));
        assert!(is_video(Path::new("/v/promo.wmv")));
        assert!(!is_video(Path::new("/v/photo.jpg")));
        assert!(!is_video(Path::new("/v/noext")));
    }
}
