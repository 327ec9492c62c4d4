use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use serde::{Deserialize, Serialize};
use crate::error::{DecodeError, GalleryError};
use crate::timer::Timer;
use crate::Result;

/// How long a freshly detected photo stays in the recent slot.
pub const RECENT_TTL: Duration = Duration::from_secs(15);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SlotId {
    Current,
    Next,
    Preview,
    Recent,
}

impl SlotId {
    pub const ALL: [SlotId; 4] = [SlotId::Current, SlotId::Next, SlotId::Preview, SlotId::Recent];

    fn index(self) -> usize {
        match self {
            SlotId::Current => 0,
            SlotId::Next => 1,
            SlotId::Preview => 2,
            SlotId::Recent => 3,
        }
    }
}

impl std::fmt::Display for SlotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SlotId::Current => write!(f, "current"),
            SlotId::Next => write!(f, "next"),
            SlotId::Preview => write!(f, "preview"),
            SlotId::Recent => write!(f, "recent"),
        }
    }
}

/// A decoded photo, exclusively owned by the slot that displays it.
#[derive(Debug)]
pub struct Frame {
    pixels: image::RgbaImage,
}

impl Frame {
    pub fn new(pixels: image::RgbaImage) -> Self {
        Self { pixels }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &image::RgbaImage {
        &self.pixels
    }
}

pub trait ImageDecoder {
    fn decode(&self, path: &Path) -> Result<Frame>;
}

/// Decodes photos from disk with the `image` crate.
#[derive(Debug, Clone, Default)]
pub struct FileDecoder;

impl ImageDecoder for FileDecoder {
    fn decode(&self, path: &Path) -> Result<Frame> {
        let reader = image::ImageReader::open(path).map_err(|e| {
            GalleryError::Decode(DecodeError::Open {
                path: path.to_path_buf(),
                source: e,
            })
        })?;

        let decoded = reader
            .with_guessed_format()
            .map_err(|e| {
                GalleryError::Decode(DecodeError::Open {
                    path: path.to_path_buf(),
                    source: e,
                })
            })?
            .decode()
            .map_err(|e| {
                GalleryError::Decode(DecodeError::Corrupted {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })
            })?;

        Ok(Frame::new(decoded.to_rgba8()))
    }
}

/// Secondary full-screen display that mirrors the current slot.
///
/// It only ever receives paths and decodes its own copy.
pub trait GallerySurface {
    fn show_image(&mut self, path: &Path) -> Result<()>;
    fn hide(&mut self) -> Result<()>;
}

#[derive(Debug, Default)]
enum SlotImage {
    #[default]
    Placeholder,
    Decoded(Frame),
}

#[derive(Debug, Default)]
struct Slot {
    image: SlotImage,
    path: Option<PathBuf>,
}

/// Owns the four displayed images and their lifecycles.
pub struct DisplaySlots {
    decoder: Box<dyn ImageDecoder>,
    gallery: Option<Box<dyn GallerySurface>>,
    gallery_visible: bool,
    slots: [Slot; 4],
    recent_timer: Timer,
}

impl DisplaySlots {
    pub fn new(decoder: Box<dyn ImageDecoder>) -> Self {
        Self {
            decoder,
            gallery: None,
            gallery_visible: true,
            slots: Default::default(),
            recent_timer: Timer::new(RECENT_TTL),
        }
    }

    pub fn with_gallery(mut self, gallery: Box<dyn GallerySurface>) -> Self {
        self.gallery = Some(gallery);
        self
    }

    /// Decodes `path` into `slot`. On failure the slot keeps what it had.
    pub fn set(&mut self, slot: SlotId, path: &Path, now: Instant) -> bool {
        let frame = match self.decoder.decode(path) {
            Ok(frame) => frame,
            Err(e) => {
                log::warn!("Cannot load {:?} into {} slot: {}", path, slot, e);
                return false;
            }
        };

        let target = &mut self.slots[slot.index()];
        let previous = std::mem::replace(&mut target.image, SlotImage::Decoded(frame));
        drop(previous);
        target.path = Some(path.to_path_buf());
        log::debug!("{} slot now shows {:?}", slot, path);

        match slot {
            SlotId::Current => self.mirror_to_gallery(path),
            SlotId::Recent => self.recent_timer.start(now),
            SlotId::Next | SlotId::Preview => {}
        }
        true
    }

    pub fn clear(&mut self, slot: SlotId) {
        let target = &mut self.slots[slot.index()];
        let previous = std::mem::take(&mut target.image);
        drop(previous);
        target.path = None;

        match slot {
            SlotId::Current => {
                if let Some(gallery) = self.gallery.as_mut() {
                    if let Err(e) = gallery.hide() {
                        log::warn!("Failed to hide gallery: {}", e);
                    }
                }
            }
            SlotId::Recent => self.recent_timer.stop(),
            SlotId::Next | SlotId::Preview => {}
        }
    }

    pub fn clear_all(&mut self) {
        for slot in SlotId::ALL {
            self.clear(slot);
        }
    }

    /// Clears the recent slot once its timer has run out.
    pub fn expire_recent(&mut self, now: Instant) -> bool {
        if !self.recent_timer.take_due(now) {
            return false;
        }
        log::debug!("Recent photo {:?} expired", self.path(SlotId::Recent));
        self.clear(SlotId::Recent);
        true
    }

    pub fn recent_deadline(&self) -> Option<Instant> {
        self.recent_timer.deadline()
    }

    pub fn path(&self, slot: SlotId) -> Option<&Path> {
        self.slots[slot.index()].path.as_deref()
    }

    pub fn frame(&self, slot: SlotId) -> Option<&Frame> {
        match &self.slots[slot.index()].image {
            SlotImage::Decoded(frame) => Some(frame),
            SlotImage::Placeholder => None,
        }
    }

    pub fn is_empty(&self, slot: SlotId) -> bool {
        matches!(self.slots[slot.index()].image, SlotImage::Placeholder)
    }

    pub fn has_gallery(&self) -> bool {
        self.gallery.is_some()
    }

    pub fn gallery_visible(&self) -> bool {
        self.gallery_visible
    }

    pub fn show_gallery(&mut self) {
        self.gallery_visible = true;
        if let Some(path) = self.path(SlotId::Current).map(Path::to_path_buf) {
            self.mirror_to_gallery(&path);
        }
    }

    pub fn hide_gallery(&mut self) {
        self.gallery_visible = false;
        if let Some(gallery) = self.gallery.as_mut() {
            if let Err(e) = gallery.hide() {
                log::warn!("Failed to hide gallery: {}", e);
            }
        }
    }

    fn mirror_to_gallery(&mut self, path: &Path) {
        if !self.gallery_visible {
            return;
        }
        if let Some(gallery) = self.gallery.as_mut() {
            if let Err(e) = gallery.show_image(path) {
                log::warn!("Gallery could not show {:?}: {}", path, e);
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use tempfile::tempdir;

    fn slots() -> DisplaySlots {
        DisplaySlots::new(Box::new(FakeDecoder))
    }

    #[test]
    fn test_set_and_clear_slot() {
        let now = Instant::now();
        let mut slots = slots();
        assert!(slots.is_empty(SlotId::Next));

        assert!(slots.set(SlotId::Next, Path::new("/p/a.jpg"), now));
        assert!(!slots.is_empty(SlotId::Next));
        assert_eq!(slots.path(SlotId::Next), Some(Path::new("/p/a.jpg")));
        assert_eq!(slots.frame(SlotId::Next).unwrap().width(), 1);

        slots.clear(SlotId::Next);
        assert!(slots.is_empty(SlotId::Next));
        assert_eq!(slots.path(SlotId::Next), None);

        // Clearing an empty slot is harmless
        slots.clear(SlotId::Next);
        assert!(slots.is_empty(SlotId::Next));
    }

    #[test]
    fn test_decode_failure_keeps_previous_content() {
        let now = Instant::now();
        let mut slots = slots();
        assert!(slots.set(SlotId::Preview, Path::new("/p/good.jpg"), now));
        assert!(!slots.set(SlotId::Preview, Path::new("/p/corrupt.jpg"), now));
        assert_eq!(slots.path(SlotId::Preview), Some(Path::new("/p/good.jpg")));
        assert!(!slots.is_empty(SlotId::Preview));
    }

    #[test]
    fn test_current_slot_mirrors_to_gallery() {
        let now = Instant::now();
        let gallery = RecordingGallery::default();
        let calls = gallery.calls.clone();
        let mut slots = slots().with_gallery(Box::new(gallery));

        slots.set(SlotId::Current, Path::new("/p/a.jpg"), now);
        slots.set(SlotId::Next, Path::new("/p/b.jpg"), now);
        slots.set(SlotId::Current, Path::new("/p/corrupt.jpg"), now);
        slots.clear(SlotId::Current);

        assert_eq!(
            *calls.borrow(),
            vec![GalleryCall::Show(PathBuf::from("/p/a.jpg")), GalleryCall::Hide]
        );
    }

    #[test]
    fn test_hidden_gallery_is_not_updated() {
        let now = Instant::now();
        let gallery = RecordingGallery::default();
        let calls = gallery.calls.clone();
        let mut slots = slots().with_gallery(Box::new(gallery));

        slots.hide_gallery();
        slots.set(SlotId::Current, Path::new("/p/a.jpg"), now);
        slots.show_gallery();

        assert_eq!(
            *calls.borrow(),
            vec![GalleryCall::Hide, GalleryCall::Show(PathBuf::from("/p/a.jpg"))]
        );
    }

    #[test]
    fn test_recent_slot_expires_after_ttl() {
        let start = Instant::now();
        let mut slots = slots();
        slots.set(SlotId::Recent, Path::new("/p/new.jpg"), start);
        assert_eq!(slots.recent_deadline(), Some(start + RECENT_TTL));

        assert!(!slots.expire_recent(start + Duration::from_secs(14)));
        assert_eq!(slots.path(SlotId::Recent), Some(Path::new("/p/new.jpg")));

        assert!(slots.expire_recent(start + RECENT_TTL));
        assert!(slots.is_empty(SlotId::Recent));
        assert_eq!(slots.path(SlotId::Recent), None);
        assert_eq!(slots.recent_deadline(), None);
    }

    #[test]
    fn test_recent_reassignment_restarts_ttl() {
        let start = Instant::now();
        let mut slots = slots();
        slots.set(SlotId::Recent, Path::new("/p/one.jpg"), start);
        slots.set(SlotId::Recent, Path::new("/p/two.jpg"), start + Duration::from_secs(10));

        assert!(!slots.expire_recent(start + Duration::from_secs(16)));
        assert_eq!(slots.path(SlotId::Recent), Some(Path::new("/p/two.jpg")));
        assert!(slots.expire_recent(start + Duration::from_secs(25)));
    }

    #[test]
    fn test_file_decoder_reports_failures() {
        let temp_dir = tempdir().unwrap();
        let bogus = temp_dir.path().join("bogus.jpg");
        std::fs::write(&bogus, "definitely not a jpeg").unwrap();

        let decoder = FileDecoder;
        assert!(decoder.decode(&temp_dir.path().join("missing.jpg")).is_err());
        assert!(decoder.decode(&bogus).is_err());
    }

    #[test]
    fn test_file_decoder_reads_png() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("tiny.png");
        image::RgbaImage::new(3, 2).save(&path).unwrap();

        let frame = FileDecoder.decode(&path).unwrap();
        assert_eq!((frame.width(), frame.height()), (3, 2));
    }
}
