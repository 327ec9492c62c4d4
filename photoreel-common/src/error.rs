use std::path::PathBuf;
use thiserror::Error;

/// Main error type for photoreel operations
#[derive(Error, Debug)]
pub enum GalleryError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Image decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Folder watcher error: {0}")]
    Watch(#[from] WatchError),

    #[error("File operation error: {0}")]
    Io(#[from] IoError),

    #[error("Gallery display error: {0}")]
    Display(#[from] DisplayError),

    #[error("Video playback error: {0}")]
    Video(#[from] VideoError),

    #[error("IPC error: {0}")]
    Ipc(#[from] IpcError),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration file: {path:?}")]
    FileRead { path: PathBuf, source: std::io::Error },

    #[error("Failed to parse TOML configuration: {message}")]
    TomlParse { message: String },

    #[error("Invalid configuration value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("Could not determine config directory")]
    NoConfigDir,
}

/// Folder binding and scanning errors
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Cannot access folder: {path:?}")]
    FolderAccess { path: PathBuf, source: std::io::Error },

    #[error("Not a photo file: {path:?}")]
    NotAPhoto { path: PathBuf },

    #[error("No photo folder is bound")]
    NoFolder,
}

/// Raised when a slot assignment cannot decode its image
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Failed to open image: {path:?}")]
    Open { path: PathBuf, source: std::io::Error },

    #[error("Image file is corrupted or unsupported: {path:?}: {message}")]
    Corrupted { path: PathBuf, message: String },
}

/// Filesystem watcher errors
#[derive(Error, Debug)]
pub enum WatchError {
    #[error("Failed to arm watcher on {path:?}: {message}")]
    Arm { path: PathBuf, message: String },

    #[error("Failed to disarm watcher on {path:?}: {message}")]
    Disarm { path: PathBuf, message: String },

    #[error("Watcher has no folder bound")]
    Unbound,
}

/// Per-file failures while archiving or deleting photos
#[derive(Error, Debug)]
pub enum IoError {
    #[error("Failed to copy {from:?} to {to:?}")]
    Copy { from: PathBuf, to: PathBuf, source: std::io::Error },

    #[error("Failed to delete {path:?}")]
    Delete { path: PathBuf, source: std::io::Error },

    #[error("Archive destination is not a directory: {path:?}")]
    BadDestination { path: PathBuf },
}

/// Gallery surface (swww) errors
#[derive(Error, Debug)]
pub enum DisplayError {
    #[error("swww binary not found in PATH")]
    SwwwNotFound,

    #[error("Command execution failed: {command}")]
    Execution { command: String, source: std::io::Error },

    #[error("Command returned non-zero exit code {code}: {stderr}")]
    NonZeroExit { code: i32, stderr: String },

    #[error("No gallery output available")]
    NoOutput,

    #[error("Gallery worker has stopped")]
    WorkerStopped,
}

/// Video player errors
#[derive(Error, Debug)]
pub enum VideoError {
    #[error("Not a supported video file: {path:?}")]
    Unsupported { path: PathBuf },

    #[error("Video player {player:?} could not be started")]
    Spawn { player: String, source: std::io::Error },
}

/// IPC communication errors
#[derive(Error, Debug)]
pub enum IpcError {
    #[error("Failed to connect to daemon")]
    Connection,

    #[error("Daemon event loop is not running")]
    LoopClosed,

    #[error("Invalid IPC message format")]
    InvalidMessage,
}

// Convenience type alias
pub type Result<T> = std::result::Result<T, GalleryError>;

// Error reporting utilities
pub trait ErrorReporting {
    fn log_error(&self, context: &str);
    fn user_friendly_message(&self) -> String;
}

impl ErrorReporting for GalleryError {
    fn log_error(&self, context: &str) {
        log::error!("{}: {:?}", context, self);
    }

    fn user_friendly_message(&self) -> String {
        match self {
            GalleryError::Config(ConfigError::FileRead { path, .. }) => {
                format!("Configuration file not found: {:?}", path)
            }
            GalleryError::Config(ConfigError::TomlParse { message }) => {
                format!("Invalid configuration format: {}", message)
            }
            GalleryError::Catalog(CatalogError::FolderAccess { path, source }) => {
                format!("Cannot open folder {:?}: {}", path, source)
            }
            GalleryError::Decode(DecodeError::Corrupted { path, .. }) => {
                format!("Could not display {:?}: the file is damaged or not an image", path)
            }
            GalleryError::Display(DisplayError::SwwwNotFound) => {
                "swww is not installed. The gallery output needs swww and swww-daemon.".to_string()
            }
            GalleryError::Ipc(IpcError::Connection) => {
                "photoreel daemon is not running. Start photoreel-daemon first.".to_string()
            }
            _ => self.to_string(),
        }
    }
}
