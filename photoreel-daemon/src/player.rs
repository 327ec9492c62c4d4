use std::path::{Path, PathBuf};
use std::process::Stdio;
use photoreel_common::error::{GalleryError, VideoError};
use photoreel_common::{is_video, Result, VideoControl, VideoState};
use tokio::sync::{mpsc, oneshot};

/// A player state change, tagged with the playback session it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoEvent {
    pub session: u64,
    pub state: VideoState,
}

/// Plays videos with an external player process (mpv by default).
///
/// Each `play` starts a new session; events from an older session are stale
/// once a newer video was started.
pub struct MpvPlayer {
    program: String,
    args: Vec<String>,
    events: mpsc::UnboundedSender<VideoEvent>,
    session: u64,
    playlist: Vec<PathBuf>,
    stop: Option<oneshot::Sender<()>>,
}

impl MpvPlayer {
    /// `command` is the player binary, optionally followed by arguments.
    pub fn new(command: &str, events: mpsc::UnboundedSender<VideoEvent>) -> Self {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts.next().unwrap_or_else(|| "mpv".to_string());
        Self {
            program,
            args: parts.collect(),
            events,
            session: 0,
            playlist: Vec::new(),
            stop: None,
        }
    }

    pub fn session(&self) -> u64 {
        self.session
    }

    pub fn playlist(&self) -> &[PathBuf] {
        &self.playlist
    }
}

impl VideoControl for MpvPlayer {
    fn play(&mut self, path: &Path) -> Result<()> {
        if !is_video(path) {
            return Err(GalleryError::Video(VideoError::Unsupported {
                path: path.to_path_buf(),
            }));
        }

        let mut child = tokio::process::Command::new(&self.program)
            .args(&self.args)
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                GalleryError::Video(VideoError::Spawn {
                    player: self.program.clone(),
                    source: e,
                })
            })?;

        self.session += 1;
        self.playlist.push(path.to_path_buf());
        let session = self.session;
        let events = self.events.clone();
        let (stop_tx, stop_rx) = oneshot::channel();
        self.stop = Some(stop_tx);

        log::info!("Playing video {:?} with {}", path, self.program);
        let _ = events.send(VideoEvent { session, state: VideoState::Playing });

        tokio::spawn(async move {
            let state = tokio::select! {
                status = child.wait() => match status {
                    Ok(status) if status.success() => VideoState::Finished,
                    Ok(status) => {
                        log::warn!("Video player exited with {}", status);
                        VideoState::Error
                    }
                    Err(e) => {
                        log::error!("Failed to wait for video player: {}", e);
                        VideoState::Error
                    }
                },
                _ = stop_rx => {
                    if let Err(e) = child.kill().await {
                        log::warn!("Failed to kill video player: {}", e);
                    }
                    VideoState::Stopped
                }
            };
            let _ = events.send(VideoEvent { session, state });
        });

        Ok(())
    }

    fn stop(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
    }

    fn clear_playlist(&mut self) {
        self.playlist.clear();
    }
}
