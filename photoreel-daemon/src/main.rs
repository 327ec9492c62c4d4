mod commands;
mod player;

use anyhow::Result;
use photoreel_config::Config;
use photoreel_common::error::{GalleryError, IpcError};
use photoreel_common::swww::{self, Monitor};
use photoreel_common::{
    DisplaySlots, ErrorReporting, FileDecoder, IpcCommand, IpcResponse, IpcServer, NotifyWatcher,
    Slideshow, SwwwGallery, VideoControl,
};
use std::time::Instant;
use tokio::sync::{mpsc, oneshot};

use crate::commands::Daemon;
use crate::player::MpvPlayer;

struct Request {
    command: IpcCommand,
    reply: oneshot::Sender<IpcResponse>,
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await,
        None => std::future::pending().await,
    }
}

/// Opens the gallery surface on the configured output, or the default one.
fn open_gallery(config: &Config) -> (Vec<Monitor>, Option<SwwwGallery>) {
    if !config.gallery.enabled {
        log::info!("Gallery output disabled in configuration");
        return (Vec::new(), None);
    }

    let monitors = match swww::query_monitors() {
        Ok(monitors) => monitors,
        Err(e) => {
            log::error!("Failed to query outputs: {}", e.user_friendly_message());
            return (Vec::new(), None);
        }
    };

    let output = match &config.gallery.output {
        Some(output) => Some(output.clone()),
        None => swww::pick_monitor(&monitors, config.gallery.monitor).map(|m| m.name.clone()),
    };
    let Some(output) = output else {
        log::warn!("No gallery output available (found: {:?})", monitors);
        return (monitors, None);
    };

    match SwwwGallery::new(output, config.gallery.options()) {
        Ok(gallery) => (monitors, Some(gallery)),
        Err(e) => {
            log::error!("Gallery disabled: {}", e.user_friendly_message());
            (monitors, None)
        }
    }
}

fn start_ipc(requests: mpsc::Sender<Request>) -> Result<()> {
    let server = IpcServer::new();
    let listener = server.bind()?;

    std::thread::spawn(move || {
        IpcServer::serve(listener, move |command| {
            let (reply, response) = oneshot::channel();
            requests
                .blocking_send(Request { command, reply })
                .map_err(|_| GalleryError::Ipc(IpcError::LoopClosed))?;
            let response = response
                .blocking_recv()
                .map_err(|_| GalleryError::Ipc(IpcError::LoopClosed))?;
            Ok(response)
        });
    });

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    log::info!("Starting photoreel daemon...");

    // A missing file is fine, a broken one is not
    let config = Config::load_or_default()
        .map_err(|e| {
            log::error!("Configuration error: {}", e.user_friendly_message());
            anyhow::anyhow!("Configuration error: {}", e.user_friendly_message())
        })?;

    let (watch_tx, mut watch_rx) = mpsc::unbounded_channel();
    let watcher = NotifyWatcher::new(watch_tx)
        .map_err(|e| anyhow::anyhow!("Failed to create folder watcher: {}", e))?;
    let gate = watcher.gate();

    let (monitors, gallery) = open_gallery(&config);
    let gallery_output = gallery.as_ref().map(|g| g.output().to_string());
    let mut slots = DisplaySlots::new(Box::new(FileDecoder));
    if let Some(gallery) = gallery {
        slots = slots.with_gallery(Box::new(gallery));
    }

    let mut slideshow = Slideshow::new(slots, Box::new(watcher), config.playback_settings());

    if let Some(sponsors) = &config.folders.sponsors {
        match slideshow.set_sponsor_folder(sponsors) {
            Ok(count) => log::info!("Loaded {} sponsor photos", count),
            Err(e) => log::error!("Sponsor folder: {}", e.user_friendly_message()),
        }
        if !config.playback.sponsors {
            slideshow.set_sponsors_enabled(false);
        }
    }

    if let Some(photos) = &config.folders.photos {
        match slideshow.set_folder(photos) {
            Ok(count) => log::info!("Loaded {} photos from {:?}", count, photos),
            Err(e) => log::error!("Photo folder: {}", e.user_friendly_message()),
        }
    }

    let (video_tx, mut video_rx) = mpsc::unbounded_channel();
    let mut daemon = Daemon {
        slideshow,
        player: MpvPlayer::new(&config.video.player, video_tx),
        monitors,
        gallery_output,
    };

    let (request_tx, mut request_rx) = mpsc::channel::<Request>(16);
    start_ipc(request_tx)?;

    log::info!("Daemon started successfully");

    loop {
        let tick = sleep_until(daemon.slideshow.tick_deadline());
        let recent = sleep_until(daemon.slideshow.recent_deadline());

        tokio::select! {
            _ = tick => {
                daemon.slideshow.on_tick_due(Instant::now());
            }
            _ = recent => {
                daemon.slideshow.expire_recent(Instant::now());
            }
            Some(stamped) = watch_rx.recv() => {
                if gate.accepts(stamped.generation) {
                    daemon.slideshow.apply(stamped.event, Instant::now());
                } else {
                    log::debug!("Dropping stale watcher event {:?}", stamped.event);
                }
            }
            Some(event) = video_rx.recv() => {
                if event.session == daemon.player.session() {
                    daemon.slideshow.on_video_state_changed(event.state, Instant::now());
                } else {
                    log::debug!("Ignoring {} from an earlier video", event.state);
                }
            }
            Some(request) = request_rx.recv() => {
                let response = daemon.handle_command(request.command, Instant::now());
                if request.reply.send(response).is_err() {
                    log::warn!("IPC client went away before the reply");
                }
            }
            _ = tokio::signal::ctrl_c() => {
                log::info!("Received shutdown signal");
                break;
            }
        }
    }

    daemon.player.stop();
    if let Err(e) = std::fs::remove_file(photoreel_common::ipc::default_socket_path()) {
        log::debug!("Socket cleanup: {}", e);
    }
    log::info!("photoreel daemon stopped");
    Ok(())
}
