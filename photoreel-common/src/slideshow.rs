use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use serde::{Deserialize, Serialize};
use crate::archive::{self, ArchiveReport, DeleteReport};
use crate::catalog::{is_photo, PhotoCatalog};
use crate::error::{CatalogError, ErrorReporting, GalleryError};
use crate::settings::PlaybackSettings;
use crate::slots::{DisplaySlots, SlotId};
use crate::sponsor::SponsorRotation;
use crate::timer::Timer;
use crate::video::VideoState;
use crate::watch::FolderWatch;
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Nothing on screen and not cycling
    Idle,
    Cycling,
    VideoSuspended,
    /// A photo is on screen but the tick timer is stopped
    Paused,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Idle => write!(f, "idle"),
            Phase::Cycling => write!(f, "cycling"),
            Phase::VideoSuspended => write!(f, "video"),
            Phase::Paused => write!(f, "paused"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlideshowStatus {
    pub phase: Phase,
    pub folder: Option<PathBuf>,
    pub photo_count: usize,
    pub photo_index: Option<usize>,
    pub current: Option<PathBuf>,
    pub next: Option<PathBuf>,
    pub preview: Option<PathBuf>,
    pub recent: Option<PathBuf>,
    pub sponsor_count: usize,
    pub sponsors_active: bool,
    pub interval_secs: u64,
    pub random: bool,
    pub sponsors_enabled: bool,
    pub watch_new_files: bool,
    pub watching: bool,
    pub gallery_visible: bool,
    pub timer_remaining: Option<u64>, // seconds
}

/// The slideshow state machine.
///
/// Owns the catalog, the sponsor rotation and the display slots, and decides
/// on every tick which photo moves from the next slot to the current one.
/// All mutation happens through `&mut self`, so the owner serializes ticks,
/// watcher events and commands.
pub struct Slideshow {
    catalog: PhotoCatalog,
    sponsors: SponsorRotation,
    slots: DisplaySlots,
    watcher: Box<dyn FolderWatch>,
    settings: PlaybackSettings,
    folder: Option<PathBuf>,
    photo_index: Option<usize>,
    playing: bool,
    video_playing: bool,
    tick_timer: Timer,
}

impl Slideshow {
    pub fn new(slots: DisplaySlots, watcher: Box<dyn FolderWatch>, settings: PlaybackSettings) -> Self {
        Self {
            catalog: PhotoCatalog::new(),
            sponsors: SponsorRotation::new(),
            slots,
            watcher,
            settings,
            folder: None,
            photo_index: None,
            playing: false,
            video_playing: false,
            tick_timer: Timer::new(settings.interval),
        }
    }

    pub fn catalog(&self) -> &PhotoCatalog {
        &self.catalog
    }

    pub(crate) fn catalog_mut(&mut self) -> &mut PhotoCatalog {
        &mut self.catalog
    }

    pub fn sponsors(&self) -> &SponsorRotation {
        &self.sponsors
    }

    pub fn slots(&self) -> &DisplaySlots {
        &self.slots
    }

    pub fn slots_mut(&mut self) -> &mut DisplaySlots {
        &mut self.slots
    }

    pub fn settings(&self) -> PlaybackSettings {
        self.settings
    }

    pub fn folder(&self) -> Option<&Path> {
        self.folder.as_deref()
    }

    pub fn photo_index(&self) -> Option<usize> {
        self.photo_index
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_video_playing(&self) -> bool {
        self.video_playing
    }

    pub fn tick_deadline(&self) -> Option<Instant> {
        self.tick_timer.deadline()
    }

    pub fn recent_deadline(&self) -> Option<Instant> {
        self.slots.recent_deadline()
    }

    pub fn phase(&self) -> Phase {
        if self.video_playing {
            Phase::VideoSuspended
        } else if self.playing {
            Phase::Cycling
        } else if self.slots.is_empty(SlotId::Current) {
            Phase::Idle
        } else {
            Phase::Paused
        }
    }

    /// Runs a tick if the tick timer is due.
    pub fn on_tick_due(&mut self, now: Instant) -> bool {
        if !self.tick_timer.take_due(now) {
            return false;
        }
        self.tick(now);
        true
    }

    pub fn expire_recent(&mut self, now: Instant) -> bool {
        self.slots.expire_recent(now)
    }

    /// Advances immediately instead of waiting for the timer.
    pub fn advance_now(&mut self, now: Instant) {
        self.tick_timer.stop();
        self.tick(now);
    }

    fn tick(&mut self, now: Instant) {
        let settings = self.settings;

        if self.video_playing {
            self.rearm(settings, now);
            return;
        }

        if settings.sponsors_enabled && self.sponsors.is_active() && !self.sponsors.just_shown() {
            if let Some(sponsor) = self.sponsors.advance() {
                log::debug!("Showing sponsor {:?}", sponsor);
                if self.needs_seed() {
                    self.slots.set(SlotId::Current, &sponsor, now);
                    if self.catalog.len() > 1 {
                        let index = self.catalog.random_index(self.photo_index);
                        self.queue_catalog_photo(index, now);
                    }
                } else {
                    self.promote_next(now);
                    self.queue_next(&sponsor, now);
                }
                self.sponsors.set_just_shown(true);
                self.rearm(settings, now);
                return;
            }
        }

        self.sponsors.set_just_shown(false);

        let count = self.catalog.len();
        if count == 0 {
            self.photo_index = Some(0);
            log::debug!("Tick with an empty catalog, nothing to show");
            self.rearm(settings, now);
            return;
        }

        let index = if count == 1 {
            0
        } else if settings.random {
            self.catalog.random_index(None)
        } else {
            match self.photo_index {
                Some(index) if index + 1 < count => index + 1,
                _ => 0,
            }
        };
        self.photo_index = Some(index);

        if let Some(target) = self.catalog.at(index).map(|photo| photo.path.clone()) {
            if self.needs_seed() {
                self.slots.set(SlotId::Current, &target, now);
                if count > 1 {
                    let next = self.catalog.random_index(Some(index));
                    self.queue_catalog_photo(next, now);
                }
            } else {
                self.promote_next(now);
                self.queue_next(&target, now);
            }
        }

        self.rearm(settings, now);
    }

    fn needs_seed(&self) -> bool {
        self.slots.is_empty(SlotId::Current) || self.slots.is_empty(SlotId::Next)
    }

    fn promote_next(&mut self, now: Instant) {
        if let Some(next) = self.slots.path(SlotId::Next).map(Path::to_path_buf) {
            self.slots.set(SlotId::Current, &next, now);
        }
    }

    /// Queues `path` as the next photo, or shows it right away when the
    /// current slot is empty.
    fn queue_next(&mut self, path: &Path, now: Instant) -> bool {
        if self.slots.is_empty(SlotId::Current) {
            self.slots.set(SlotId::Current, path, now)
        } else {
            self.slots.set(SlotId::Next, path, now)
        }
    }

    fn queue_catalog_photo(&mut self, index: usize, now: Instant) {
        if let Some(path) = self.catalog.at(index).map(|photo| photo.path.clone()) {
            self.queue_next(&path, now);
        }
    }

    fn rearm(&mut self, settings: PlaybackSettings, now: Instant) {
        self.tick_timer.set_interval(settings.interval);
        if self.playing {
            self.tick_timer.start(now);
        }
    }

    /// Starts or stops cycling and returns the new playing state.
    pub fn toggle_cycling(&mut self, now: Instant) -> bool {
        self.tick_timer.stop();

        if self.playing {
            self.playing = false;
            log::info!("Slideshow stopped");
            return false;
        }

        if self.catalog.is_empty() {
            log::warn!("Cannot start the slideshow: no photos loaded");
            return false;
        }

        if self.slots.is_empty(SlotId::Current) {
            self.photo_index = Some(0);
            if let Some(first) = self.catalog.at(0).map(|photo| photo.path.clone()) {
                self.slots.set(SlotId::Current, &first, now);
            }
            let next = self.catalog.random_index(Some(0));
            self.queue_catalog_photo(next, now);
        }

        if !self.slots.gallery_visible() {
            self.slots.show_gallery();
        }

        self.playing = true;
        self.tick_timer.set_interval(self.settings.interval);
        self.tick_timer.start(now);
        log::info!("Slideshow started with {} photos", self.catalog.len());
        true
    }

    pub fn start(&mut self, now: Instant) -> bool {
        if self.playing {
            return true;
        }
        self.toggle_cycling(now)
    }

    pub fn stop(&mut self, now: Instant) {
        if self.playing {
            self.toggle_cycling(now);
        }
    }

    pub fn on_video_state_changed(&mut self, state: VideoState, now: Instant) {
        log::debug!("Video state changed to {}", state);
        if state.is_playing() {
            self.video_playing = true;
            self.tick_timer.stop();
            return;
        }

        self.video_playing = false;
        if self.playing && !self.tick_timer.is_enabled() {
            self.tick_timer.set_interval(self.settings.interval);
            self.tick_timer.start(now);
        }
    }

    /// Shows `path` now, or queues it as the next photo while cycling.
    pub fn select_photo(&mut self, path: &Path, now: Instant) -> bool {
        if self.playing {
            self.queue_next(path, now)
        } else {
            self.slots.set(SlotId::Current, path, now)
        }
    }

    pub fn preview_photo(&mut self, path: &Path, now: Instant) -> bool {
        self.slots.set(SlotId::Preview, path, now)
    }

    /// Rebinds the slideshow to a new photo folder.
    ///
    /// On a scan failure the catalog stays empty and the watcher disabled.
    pub fn set_folder(&mut self, folder: &Path) -> Result<usize> {
        if let Err(e) = self.watcher.enable(false) {
            e.log_error("Failed to disable folder watcher");
        }

        self.slots.clear_all();
        self.catalog.clear();
        self.photo_index = None;
        self.folder = None;

        let count = match self.catalog.bind(folder) {
            Ok(count) => count,
            Err(e) => {
                e.log_error("Failed to load photo folder");
                return Err(e);
            }
        };
        self.folder = Some(folder.to_path_buf());

        let armed = self.watcher.bind(folder).and_then(|_| self.watcher.enable(true));
        if let Err(e) = armed {
            e.log_error("Folder watcher not started");
        }

        Ok(count)
    }

    pub fn rescan(&mut self) -> Result<usize> {
        let folder = self.folder.clone().ok_or(GalleryError::Catalog(CatalogError::NoFolder))?;
        if !folder.is_dir() {
            return Err(GalleryError::Catalog(CatalogError::FolderAccess {
                path: folder,
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "Folder no longer exists"),
            }));
        }
        self.set_folder(&folder)
    }

    /// Forgets every photo and stops watching.
    pub fn clear(&mut self) {
        if let Err(e) = self.watcher.enable(false) {
            e.log_error("Failed to disable folder watcher");
        }
        self.catalog.clear();
        self.photo_index = None;
        self.folder = None;
        self.slots.clear(SlotId::Current);
        self.slots.clear(SlotId::Next);
        self.slots.clear(SlotId::Preview);
        log::info!("Slideshow cleared");
    }

    pub fn add_folder(&mut self, folder: &Path) -> Result<usize> {
        self.catalog.extend_from(folder)
    }

    pub fn add_file(&mut self, path: &Path) -> Result<bool> {
        if !is_photo(path) || !path.is_file() {
            return Err(GalleryError::Catalog(CatalogError::NotAPhoto {
                path: path.to_path_buf(),
            }));
        }
        Ok(self.catalog.add(path))
    }

    /// Loads the sponsor folder and switches sponsor interleaving on when it
    /// holds at least one photo.
    pub fn set_sponsor_folder(&mut self, folder: &Path) -> Result<usize> {
        let result = self.sponsors.bind(folder);
        self.settings.sponsors_enabled = self.sponsors.is_active();
        result
    }

    pub fn set_interval(&mut self, interval: Duration) {
        self.settings.interval = interval;
        self.tick_timer.set_interval(interval);
    }

    pub fn set_random(&mut self, random: bool) {
        self.settings.random = random;
    }

    pub fn set_sponsors_enabled(&mut self, enabled: bool) {
        self.settings.sponsors_enabled = enabled;
    }

    /// Controls whether newly created files join the catalog.
    pub fn set_watch_enabled(&mut self, enabled: bool) {
        self.settings.watch_new_files = enabled;
    }

    /// Drops `path` from the catalog and from the preview and next slots.
    pub(crate) fn forget_photo(&mut self, path: &Path) -> bool {
        if self.slots.path(SlotId::Preview) == Some(path) {
            self.slots.clear(SlotId::Preview);
        }
        if self.slots.path(SlotId::Next) == Some(path) {
            self.slots.clear(SlotId::Next);
        }
        self.catalog.remove(path)
    }

    /// Moves every catalogued photo into `dest`.
    pub fn archive_to(&mut self, dest: &Path) -> Result<ArchiveReport> {
        let mut report = ArchiveReport::default();
        if self.folder.as_deref() == Some(dest) {
            log::warn!("Archive destination {:?} is the photo folder, nothing to do", dest);
            return Ok(report);
        }
        archive::check_destination(dest)?;

        for slot in SlotId::ALL {
            self.slots.clear(slot);
        }

        let photos: Vec<PathBuf> = self.catalog.iter().map(|photo| photo.path.clone()).collect();
        for path in photos {
            self.forget_photo(&path);
            match archive::archive_file(&path, dest) {
                Ok(_) => report.moved += 1,
                Err(e) => {
                    e.log_error("Failed to archive photo");
                    report.failed += 1;
                }
            }
        }

        log::info!("Archived {} photos to {:?} ({} failed)", report.moved, dest, report.failed);
        Ok(report)
    }

    /// Deletes the file shown in the recent slot.
    pub fn delete_recent(&mut self) -> Result<bool> {
        let Some(path) = self.slots.path(SlotId::Recent).map(Path::to_path_buf) else {
            return Ok(false);
        };
        if !path.exists() {
            return Ok(false);
        }
        self.slots.clear(SlotId::Recent);
        archive::delete_file(&path)?;
        log::info!("Deleted recent photo {:?}", path);
        Ok(true)
    }

    pub fn delete_photos(&mut self, paths: &[PathBuf]) -> DeleteReport {
        let mut report = DeleteReport::default();
        self.slots.clear(SlotId::Preview);

        for path in paths {
            match archive::delete_file(path) {
                Ok(()) => {
                    self.forget_photo(path);
                    report.deleted += 1;
                }
                Err(e) => {
                    e.log_error("Failed to delete photo");
                    report.failed += 1;
                }
            }
        }
        report
    }

    pub fn status(&self, now: Instant) -> SlideshowStatus {
        let owned = |slot| self.slots.path(slot).map(Path::to_path_buf);
        SlideshowStatus {
            phase: self.phase(),
            folder: self.folder.clone(),
            photo_count: self.catalog.len(),
            photo_index: self.photo_index,
            current: owned(SlotId::Current),
            next: owned(SlotId::Next),
            preview: owned(SlotId::Preview),
            recent: owned(SlotId::Recent),
            sponsor_count: self.sponsors.len(),
            sponsors_active: self.sponsors.is_active(),
            interval_secs: self.settings.interval.as_secs(),
            random: self.settings.random,
            sponsors_enabled: self.settings.sponsors_enabled,
            watch_new_files: self.settings.watch_new_files,
            watching: self.watcher.is_enabled(),
            gallery_visible: self.slots.gallery_visible(),
            timer_remaining: self.tick_timer.remaining(now).map(|d| d.as_secs()),
        }
    }
}
