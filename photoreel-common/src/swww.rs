use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::mpsc;
use serde::{Deserialize, Serialize};
use crate::error::{DisplayError, GalleryError};
use crate::slots::GallerySurface;
use crate::Result;

/// A Wayland output as reported by `swww query`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Monitor {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub primary: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GalleryOptions {
    pub resize: Option<String>,
    pub fill_color: Option<String>,
    pub transition_type: Option<String>,
    pub transition_step: Option<u8>,
    pub transition_fps: Option<u8>,
}

pub fn swww_path() -> Result<PathBuf> {
    which::which("swww").map_err(|_| GalleryError::Display(DisplayError::SwwwNotFound))
}

/// A command carrying the Wayland session variables swww needs, with
/// fallbacks for when the daemon was started outside the session.
pub fn session_command(program: &Path) -> Command {
    let mut cmd = Command::new(program);

    match std::env::var("WAYLAND_DISPLAY") {
        Ok(display) => cmd.env("WAYLAND_DISPLAY", display),
        Err(_) => cmd.env("WAYLAND_DISPLAY", "wayland-0"),
    };

    match std::env::var("XDG_RUNTIME_DIR") {
        Ok(runtime_dir) => cmd.env("XDG_RUNTIME_DIR", runtime_dir),
        Err(_) => {
            let uid = unsafe { libc::getuid() };
            cmd.env("XDG_RUNTIME_DIR", format!("/run/user/{}", uid))
        }
    };

    if let Ok(desktop) = std::env::var("XDG_CURRENT_DESKTOP") {
        cmd.env("XDG_CURRENT_DESKTOP", desktop);
    }

    match std::env::var("XDG_SESSION_TYPE") {
        Ok(session_type) => cmd.env("XDG_SESSION_TYPE", session_type),
        Err(_) => cmd.env("XDG_SESSION_TYPE", "wayland"),
    };

    cmd
}

pub fn build_img_command(swww: &Path, image_path: &Path, options: &GalleryOptions, output: &str) -> Command {
    let mut cmd = session_command(swww);
    cmd.arg("img");
    cmd.args(["-o", output]);

    if let Some(resize) = &options.resize {
        cmd.args(["--resize", resize]);
    }
    if let Some(fill_color) = &options.fill_color {
        cmd.args(["--fill-color", fill_color]);
    }
    if let Some(transition_type) = &options.transition_type {
        cmd.args(["--transition-type", transition_type]);
    }
    if let Some(transition_step) = options.transition_step {
        cmd.args(["--transition-step", &transition_step.to_string()]);
    }
    if let Some(transition_fps) = options.transition_fps {
        cmd.args(["--transition-fps", &transition_fps.to_string()]);
    }
    cmd.arg(image_path);
    cmd
}

pub fn build_clear_command(swww: &Path, options: &GalleryOptions, output: &str) -> Command {
    let mut cmd = session_command(swww);
    cmd.arg("clear");
    cmd.args(["-o", output]);
    let color = options.fill_color.as_deref().unwrap_or("000000");
    cmd.arg(color);
    cmd
}

/// Parses `swww query` output.
///
/// Accepts both the current `: NAME: WxH, scale: ...` lines and the older
/// `NAME: WxH, scale: ...` form. The first output listed is the primary.
pub fn parse_query(stdout: &str) -> Vec<Monitor> {
    let mut monitors = Vec::new();

    for line in stdout.lines() {
        let line = line.trim();
        let line = line.strip_prefix(':').unwrap_or(line).trim_start();
        let Some((name, rest)) = line.split_once(':') else {
            continue;
        };
        let name = name.trim();
        if name.is_empty() {
            continue;
        }

        let geometry = rest.trim().split(',').next().unwrap_or("").trim();
        let (width, height) = geometry
            .split_once('x')
            .and_then(|(w, h)| Some((w.trim().parse().ok()?, h.trim().parse().ok()?)))
            .unwrap_or((0, 0));

        monitors.push(Monitor {
            name: name.to_string(),
            width,
            height,
            primary: monitors.is_empty(),
        });
    }

    monitors
}

fn run(mut cmd: Command) -> Result<String> {
    let output = cmd.output().map_err(|e| {
        GalleryError::Display(DisplayError::Execution {
            command: format!("{:?}", cmd),
            source: e,
        })
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(GalleryError::Display(DisplayError::NonZeroExit {
            code: output.status.code().unwrap_or(-1),
            stderr: stderr.to_string(),
        }));
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

pub fn query_monitors() -> Result<Vec<Monitor>> {
    let swww = swww_path()?;
    let mut cmd = session_command(&swww);
    cmd.arg("query");

    let stdout = run(cmd)?;
    let monitors = parse_query(&stdout);
    if monitors.is_empty() {
        log::warn!("No outputs parsed from swww query: {}", stdout);
    }
    log::debug!("swww outputs: {:?}", monitors);
    Ok(monitors)
}

/// Chooses the gallery output. Without an explicit index the last monitor
/// is used when there is more than one, so the primary stays free.
pub fn pick_monitor(monitors: &[Monitor], index: Option<usize>) -> Option<&Monitor> {
    match index {
        Some(index) => monitors.get(index),
        None => monitors.last(),
    }
}

struct GalleryJob {
    cmd: Command,
    what: String,
}

/// Starts the thread that runs gallery commands one at a time, in the order
/// they were queued. It exits once every sender is dropped.
fn start_worker<F>(mut run: F) -> Result<mpsc::Sender<GalleryJob>>
where
    F: FnMut(Command) -> Result<String> + Send + 'static,
{
    let (tx, rx) = mpsc::channel::<GalleryJob>();
    std::thread::Builder::new()
        .name("swww-gallery".to_string())
        .spawn(move || {
            for job in rx {
                match run(job.cmd) {
                    Ok(stdout) => {
                        if !stdout.is_empty() {
                            log::debug!("swww stdout: {}", stdout);
                        }
                        log::debug!("Gallery {}", job.what);
                    }
                    Err(e) => log::error!("Gallery {} failed: {}", job.what, e),
                }
            }
            log::debug!("Gallery worker finished");
        })
        .map_err(|e| {
            GalleryError::Display(DisplayError::Execution {
                command: "gallery worker".to_string(),
                source: e,
            })
        })?;
    Ok(tx)
}

/// Gallery surface that mirrors photos onto a Wayland output through swww.
///
/// Commands go to a single worker thread, so the event loop never waits on
/// a transition and a `clear` can never overtake a later `img`.
pub struct SwwwGallery {
    swww: PathBuf,
    output: String,
    options: GalleryOptions,
    jobs: mpsc::Sender<GalleryJob>,
}

impl SwwwGallery {
    pub fn new(output: String, options: GalleryOptions) -> Result<Self> {
        let swww = swww_path()?;
        Self::with_runner(swww, output, options, run)
    }

    fn with_runner<F>(swww: PathBuf, output: String, options: GalleryOptions, runner: F) -> Result<Self>
    where
        F: FnMut(Command) -> Result<String> + Send + 'static,
    {
        let jobs = start_worker(runner)?;
        log::info!("Gallery output: {}", output);
        Ok(Self { swww, output, options, jobs })
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    fn queue(&self, cmd: Command, what: String) -> Result<()> {
        log::debug!("Queueing swww command: {:?}", cmd);
        self.jobs
            .send(GalleryJob { cmd, what })
            .map_err(|_| GalleryError::Display(DisplayError::WorkerStopped))
    }
}

impl GallerySurface for SwwwGallery {
    fn show_image(&mut self, path: &Path) -> Result<()> {
        let cmd = build_img_command(&self.swww, path, &self.options, &self.output);
        self.queue(cmd, format!("showing {:?}", path))
    }

    fn hide(&mut self) -> Result<()> {
        let cmd = build_clear_command(&self.swww, &self.options, &self.output);
        self.queue(cmd, "cleared".to_string())
    }
}
