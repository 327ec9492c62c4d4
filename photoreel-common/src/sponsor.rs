use std::path::{Path, PathBuf};
use crate::catalog::scan_folder;
use crate::Result;

/// Sponsor photos shown in strict order between regular photos.
#[derive(Debug, Clone, Default)]
pub struct SponsorRotation {
    photos: Vec<PathBuf>,
    // None until the first advance after (re)binding
    cursor: Option<usize>,
    active: bool,
    just_shown: bool,
}

impl SponsorRotation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the sponsor folder. The rotation is active only when at least one
    /// sponsor photo was found; a failed scan leaves it empty and inactive.
    pub fn bind(&mut self, folder: &Path) -> Result<usize> {
        self.photos.clear();
        self.active = false;

        self.photos = scan_folder(folder)?;
        if self.photos.is_empty() {
            log::warn!("No sponsor photos found in {:?}", folder);
            return Ok(0);
        }

        self.cursor = None;
        self.just_shown = false;
        self.active = true;
        log::info!("Sponsor rotation bound to {:?} with {} photos", folder, self.photos.len());
        Ok(self.photos.len())
    }

    pub fn advance(&mut self) -> Option<PathBuf> {
        if !self.active || self.photos.is_empty() {
            return None;
        }

        let next = match self.cursor {
            Some(index) if index + 1 < self.photos.len() => index + 1,
            _ => 0,
        };
        self.cursor = Some(next);
        self.photos.get(next).cloned()
    }

    pub fn is_active(&self) -> bool {
        self.active && !self.photos.is_empty()
    }

    pub fn just_shown(&self) -> bool {
        self.just_shown
    }

    pub fn set_just_shown(&mut self, shown: bool) {
        self.just_shown = shown;
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.photos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }
}
