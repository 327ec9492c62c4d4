use std::path::{Path, PathBuf};
use clap::{Parser, Subcommand, ValueEnum};
use photoreel_common::{parse_interval, IpcClient, IpcCommand, IpcResponse, SlideshowStatus};

#[derive(Parser)]
#[command(name = "photoreel-cli")]
#[command(about = "photoreel-cli (photo slideshow daemon control)")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Switch {
    On,
    Off,
}

impl Switch {
    fn enabled(self) -> bool {
        self == Switch::On
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Visibility {
    Show,
    Hide,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the photoreel daemon
    Daemon,

    /// Advance to the next photo now
    Next,

    /// Start cycling
    Start,

    /// Stop cycling
    Stop,

    /// Start or stop cycling
    Toggle,

    /// Show a photo now, or queue it next while cycling
    Select { path: PathBuf },

    /// Show a photo in the preview slot
    Preview { path: PathBuf },

    /// Load a new photo folder and watch it
    Folder { path: PathBuf },

    /// Reload the current photo folder
    Rescan,

    /// Forget all photos and stop watching
    Clear,

    /// Add the photos of another folder
    AddFolder { path: PathBuf },

    /// Add a single photo
    AddFile { path: PathBuf },

    /// Load the sponsor folder
    SponsorFolder { path: PathBuf },

    /// Set the slideshow interval (e.g. 10, 30s, 2m)
    Interval { interval: String },

    /// Random or sequential order
    Random {
        #[arg(value_enum)]
        state: Switch,
    },

    /// Interleave sponsor photos
    Sponsors {
        #[arg(value_enum)]
        state: Switch,
    },

    /// Add new files from the watched folder
    Watch {
        #[arg(value_enum)]
        state: Switch,
    },

    /// Play a video, pausing the slideshow while it runs
    Video { path: PathBuf },

    /// Stop the playing video
    StopVideo,

    /// Report an external player state code
    VideoState { code: i32 },

    /// Move every photo into another folder
    Archive { dest: PathBuf },

    /// Delete the most recently added photo
    DeleteRecent,

    /// Delete photos from disk
    Delete {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Show or hide the gallery output
    Gallery {
        #[arg(value_enum)]
        visibility: Visibility,
    },

    /// List the available outputs
    Monitors,

    /// Show current status
    Status,
}

// The daemon does not share our working directory
fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

fn to_command(command: Commands) -> Result<Option<IpcCommand>, String> {
    let command = match command {
        Commands::Daemon => return Ok(None),
        Commands::Next => IpcCommand::Next,
        Commands::Start => IpcCommand::Start,
        Commands::Stop => IpcCommand::Stop,
        Commands::Toggle => IpcCommand::Toggle,
        Commands::Select { path } => IpcCommand::Select { path: absolute(&path) },
        Commands::Preview { path } => IpcCommand::Preview { path: absolute(&path) },
        Commands::Folder { path } => IpcCommand::SetFolder { path: absolute(&path) },
        Commands::Rescan => IpcCommand::Rescan,
        Commands::Clear => IpcCommand::Clear,
        Commands::AddFolder { path } => IpcCommand::AddFolder { path: absolute(&path) },
        Commands::AddFile { path } => IpcCommand::AddFile { path: absolute(&path) },
        Commands::SponsorFolder { path } => IpcCommand::SetSponsorFolder { path: absolute(&path) },
        Commands::Interval { interval } => {
            let interval = parse_interval(&interval).map_err(|e| e.to_string())?;
            IpcCommand::SetInterval { seconds: interval.as_secs() }
        }
        Commands::Random { state } => IpcCommand::SetRandom { enabled: state.enabled() },
        Commands::Sponsors { state } => IpcCommand::SetSponsors { enabled: state.enabled() },
        Commands::Watch { state } => IpcCommand::SetWatch { enabled: state.enabled() },
        Commands::Video { path } => IpcCommand::PlayVideo { path: absolute(&path) },
        Commands::StopVideo => IpcCommand::StopVideo,
        Commands::VideoState { code } => IpcCommand::VideoState { code },
        Commands::Archive { dest } => IpcCommand::Archive { dest: absolute(&dest) },
        Commands::DeleteRecent => IpcCommand::DeleteRecent,
        Commands::Delete { paths } => IpcCommand::Delete {
            paths: paths.iter().map(|p| absolute(p)).collect(),
        },
        Commands::Gallery { visibility: Visibility::Show } => IpcCommand::ShowGallery,
        Commands::Gallery { visibility: Visibility::Hide } => IpcCommand::HideGallery,
        Commands::Monitors => IpcCommand::Monitors,
        Commands::Status => IpcCommand::Status,
    };
    Ok(Some(command))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let command = match to_command(cli.command) {
        Ok(Some(command)) => command,
        Ok(None) => {
            println!("To start the daemon, run: photoreel-daemon");
            return Ok(());
        }
        Err(message) => {
            eprintln!("Error: {}", message);
            std::process::exit(2);
        }
    };

    let client = IpcClient::new();
    match client.send_command(command) {
        Ok(response) => print_response(response),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}

fn format_duration(seconds: u64) -> String {
    if seconds < 60 {
        format!("{}s", seconds)
    } else if seconds < 3600 {
        let minutes = seconds / 60;
        let secs = seconds % 60;
        if secs == 0 {
            format!("{}m", minutes)
        } else {
            format!("{}m{}s", minutes, secs)
        }
    } else {
        let hours = seconds / 3600;
        let remaining = seconds % 3600;
        let minutes = remaining / 60;
        if minutes == 0 {
            format!("{}h", hours)
        } else {
            format!("{}h{}m", hours, minutes)
        }
    }
}

fn file_name(path: Option<&PathBuf>) -> &str {
    path.and_then(|p| p.file_name())
        .and_then(|n| n.to_str())
        .unwrap_or("-")
}

fn yes_no(value: bool) -> &'static str {
    if value { "on" } else { "off" }
}

fn print_status(status: &SlideshowStatus) {
    println!("photoreel Status:");
    println!("=================");
    println!("State: {}", status.phase.to_string().to_uppercase());

    let folder = status.folder.as_ref()
        .map(|f| f.display().to_string())
        .unwrap_or_else(|| "none".to_string());
    println!("Folder: {} ({} photos)", folder, status.photo_count);
    println!();

    println!("Current: {}", file_name(status.current.as_ref()));
    println!("Next:    {}", file_name(status.next.as_ref()));
    println!("Preview: {}", file_name(status.preview.as_ref()));
    println!("Recent:  {}", file_name(status.recent.as_ref()));
    println!();

    let timer_str = match status.timer_remaining {
        Some(0) => "ready".to_string(),
        Some(remaining) => format_duration(remaining),
        None => "no timer".to_string(),
    };
    println!("Interval: {} | next in {}", format_duration(status.interval_secs), timer_str);
    println!(
        "Random: {} | Sponsors: {} ({} photos{}) | Watch: {}{}",
        yes_no(status.random),
        yes_no(status.sponsors_enabled),
        status.sponsor_count,
        if status.sponsors_active { "" } else { ", inactive" },
        yes_no(status.watch_new_files),
        if status.watching { "" } else { " (not watching)" },
    );
    println!("Gallery: {}", if status.gallery_visible { "visible" } else { "hidden" });
}

fn print_response(response: IpcResponse) {
    match response {
        IpcResponse::Success { message } => {
            println!("✓ {}", message);
        }

        IpcResponse::Error { message } => {
            eprintln!("✗ Error: {}", message);
            std::process::exit(1);
        }

        IpcResponse::Status { status } => print_status(&status),

        IpcResponse::Monitors { monitors, gallery } => {
            if monitors.is_empty() {
                println!("No outputs found");
                return;
            }

            for (index, monitor) in monitors.iter().enumerate() {
                let mut tags = Vec::new();
                if monitor.primary {
                    tags.push("primary");
                }
                if gallery.as_deref() == Some(monitor.name.as_str()) {
                    tags.push("gallery");
                }
                println!("{}: {} {}x{} {}",
                    index,
                    monitor.name,
                    monitor.width,
                    monitor.height,
                    tags.join(", ")
                );
            }
        }
    }
}
