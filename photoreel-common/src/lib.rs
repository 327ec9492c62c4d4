pub mod archive;
pub mod bridge;
pub mod catalog;
pub mod duration;
pub mod error;
pub mod ipc;
pub mod settings;
pub mod slideshow;
pub mod slots;
pub mod sponsor;
pub mod swww;
pub mod timer;
pub mod video;
pub mod watch;

pub use archive::{ArchiveReport, DeleteReport};
pub use catalog::{is_photo, Photo, PhotoCatalog};
pub use duration::{parse_duration, parse_interval};
pub use error::{GalleryError, Result, ErrorReporting};
pub use ipc::{IpcClient, IpcServer, IpcCommand, IpcResponse};
pub use settings::PlaybackSettings;
pub use slideshow::{Phase, Slideshow, SlideshowStatus};
pub use slots::{DisplaySlots, FileDecoder, Frame, GallerySurface, ImageDecoder, SlotId, RECENT_TTL};
pub use sponsor::SponsorRotation;
pub use swww::{GalleryOptions, Monitor, SwwwGallery};
pub use timer::Timer;
pub use video::{is_video, VideoControl, VideoState};
pub use watch::{EventTranslator, FolderWatch, NotifyWatcher, StampedEvent, WatchEvent, WatchGate};
