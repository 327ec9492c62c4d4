use std::path::Path;
use std::time::{Duration, Instant};
use photoreel_common::swww::{self, Monitor};
use photoreel_common::{
    duration::check_interval, is_video, ErrorReporting, IpcCommand, IpcResponse, Slideshow, SlotId,
    VideoControl, VideoState,
};

/// Everything the event loop owns besides the timers and channels.
pub struct Daemon<V: VideoControl> {
    pub slideshow: Slideshow,
    pub player: V,
    pub monitors: Vec<Monitor>,
    pub gallery_output: Option<String>,
}

fn describe(path: Option<&Path>) -> String {
    path.map(|p| p.display().to_string())
        .unwrap_or_else(|| "nothing".to_string())
}

impl<V: VideoControl> Daemon<V> {
    pub fn handle_command(&mut self, command: IpcCommand, now: Instant) -> IpcResponse {
        let slideshow = &mut self.slideshow;

        match command {
            IpcCommand::Next => {
                slideshow.advance_now(now);
                IpcResponse::success(format!(
                    "Showing {}",
                    describe(slideshow.slots().path(SlotId::Current))
                ))
            }
            IpcCommand::Start => {
                if slideshow.start(now) {
                    IpcResponse::success("Slideshow started")
                } else {
                    IpcResponse::error("No photos loaded")
                }
            }
            IpcCommand::Stop => {
                slideshow.stop(now);
                IpcResponse::success("Slideshow stopped")
            }
            IpcCommand::Toggle => {
                if slideshow.is_video_playing() {
                    self.player.stop();
                }
                if slideshow.toggle_cycling(now) {
                    IpcResponse::success("Slideshow started")
                } else if slideshow.catalog().is_empty() {
                    IpcResponse::error("No photos loaded")
                } else {
                    IpcResponse::success("Slideshow stopped")
                }
            }
            IpcCommand::Select { path } => {
                if slideshow.select_photo(&path, now) {
                    IpcResponse::success(format!("Selected {}", path.display()))
                } else {
                    IpcResponse::error(format!("Could not load {}", path.display()))
                }
            }
            IpcCommand::Preview { path } => {
                if slideshow.preview_photo(&path, now) {
                    IpcResponse::success(format!("Previewing {}", path.display()))
                } else {
                    IpcResponse::error(format!("Could not load {}", path.display()))
                }
            }
            IpcCommand::SetFolder { path } => match slideshow.set_folder(&path) {
                Ok(count) => IpcResponse::success(format!("Loaded {} photos from {}", count, path.display())),
                Err(e) => IpcResponse::error(e.user_friendly_message()),
            },
            IpcCommand::Rescan => match slideshow.rescan() {
                Ok(count) => IpcResponse::success(format!("Rescanned, {} photos", count)),
                Err(e) => IpcResponse::error(e.user_friendly_message()),
            },
            IpcCommand::Clear => {
                slideshow.clear();
                IpcResponse::success("Cleared")
            }
            IpcCommand::AddFolder { path } => match slideshow.add_folder(&path) {
                Ok(added) => IpcResponse::success(format!("Added {} photos", added)),
                Err(e) => IpcResponse::error(e.user_friendly_message()),
            },
            IpcCommand::AddFile { path } => match slideshow.add_file(&path) {
                Ok(true) => IpcResponse::success(format!("Added {}", path.display())),
                Ok(false) => IpcResponse::success(format!("{} is already listed", path.display())),
                Err(e) => IpcResponse::error(e.user_friendly_message()),
            },
            IpcCommand::SetSponsorFolder { path } => match slideshow.set_sponsor_folder(&path) {
                Ok(0) => IpcResponse::success("No sponsor photos found, sponsors disabled"),
                Ok(count) => IpcResponse::success(format!("Loaded {} sponsor photos", count)),
                Err(e) => IpcResponse::error(e.user_friendly_message()),
            },
            IpcCommand::SetInterval { seconds } => {
                let interval = Duration::from_secs(seconds);
                if let Err(e) = check_interval(interval) {
                    return IpcResponse::error(e.to_string());
                }
                slideshow.set_interval(interval);
                IpcResponse::success(format!("Interval set to {}s", seconds))
            }
            IpcCommand::SetRandom { enabled } => {
                slideshow.set_random(enabled);
                IpcResponse::success(format!("Random order {}", on_off(enabled)))
            }
            IpcCommand::SetSponsors { enabled } => {
                slideshow.set_sponsors_enabled(enabled);
                IpcResponse::success(format!("Sponsors {}", on_off(enabled)))
            }
            IpcCommand::SetWatch { enabled } => {
                slideshow.set_watch_enabled(enabled);
                IpcResponse::success(format!("New file watching {}", on_off(enabled)))
            }
            IpcCommand::PlayVideo { path } => {
                if !is_video(&path) {
                    return IpcResponse::error(format!("{} is not a supported video", path.display()));
                }
                self.player.stop();
                self.player.clear_playlist();
                match self.player.play(&path) {
                    Ok(()) => IpcResponse::success(format!("Playing {}", path.display())),
                    Err(e) => IpcResponse::error(e.user_friendly_message()),
                }
            }
            IpcCommand::StopVideo => {
                self.player.stop();
                IpcResponse::success("Video stopped")
            }
            IpcCommand::VideoState { code } => {
                let state = VideoState::from_code(code);
                slideshow.on_video_state_changed(state, now);
                IpcResponse::success(format!("Video {}", state))
            }
            IpcCommand::Archive { dest } => match slideshow.archive_to(&dest) {
                Ok(report) => IpcResponse::success(format!(
                    "Archived {} photos to {} ({} failed)",
                    report.moved,
                    dest.display(),
                    report.failed
                )),
                Err(e) => IpcResponse::error(e.user_friendly_message()),
            },
            IpcCommand::DeleteRecent => match slideshow.delete_recent() {
                Ok(true) => IpcResponse::success("Deleted recent photo"),
                Ok(false) => IpcResponse::success("No recent photo"),
                Err(e) => IpcResponse::error(e.user_friendly_message()),
            },
            IpcCommand::Delete { paths } => {
                let report = slideshow.delete_photos(&paths);
                if report.failed == 0 {
                    IpcResponse::success(format!("Deleted {} photos", report.deleted))
                } else {
                    IpcResponse::error(format!(
                        "Deleted {} photos, {} could not be deleted",
                        report.deleted, report.failed
                    ))
                }
            }
            IpcCommand::ShowGallery | IpcCommand::HideGallery if !slideshow.slots().has_gallery() => {
                IpcResponse::error("No gallery output configured")
            }
            IpcCommand::ShowGallery => {
                slideshow.slots_mut().show_gallery();
                IpcResponse::success("Gallery shown")
            }
            IpcCommand::HideGallery => {
                slideshow.slots_mut().hide_gallery();
                IpcResponse::success("Gallery hidden")
            }
            IpcCommand::Monitors => {
                match swww::query_monitors() {
                    Ok(monitors) => self.monitors = monitors,
                    Err(e) => log::warn!("Using cached monitor list: {}", e),
                }
                IpcResponse::Monitors {
                    monitors: self.monitors.clone(),
                    gallery: self.gallery_output.clone(),
                }
            }
            IpcCommand::Status => IpcResponse::Status {
                status: slideshow.status(now),
            },
        }
    }
}

fn on_off(enabled: bool) -> &'static str {
    if enabled { "enabled" } else { "disabled" }
}
