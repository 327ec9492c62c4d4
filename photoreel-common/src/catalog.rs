use std::path::{Path, PathBuf};
use rand::Rng;
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;
use crate::error::{CatalogError, GalleryError};
use crate::Result;

pub const PHOTO_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "gif"];

/// Returns true when `path` carries one of the photo extensions (case-insensitive).
pub fn is_photo(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
        .is_some_and(|ext| PHOTO_EXTENSIONS.contains(&ext.as_str()))
}

/// Lists the photos directly inside `folder`, ordered by file name.
pub fn scan_folder(folder: &Path) -> Result<Vec<PathBuf>> {
    let metadata = std::fs::metadata(folder).map_err(|e| {
        GalleryError::Catalog(CatalogError::FolderAccess {
            path: folder.to_path_buf(),
            source: e,
        })
    })?;

    if !metadata.is_dir() {
        return Err(GalleryError::Catalog(CatalogError::FolderAccess {
            path: folder.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "Path is not a directory"),
        }));
    }

    // Surface permission problems up front instead of silently yielding an empty scan
    std::fs::read_dir(folder).map_err(|e| {
        GalleryError::Catalog(CatalogError::FolderAccess {
            path: folder.to_path_buf(),
            source: e,
        })
    })?;

    let mut photos = Vec::new();
    for entry in WalkDir::new(folder)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if entry.file_type().is_file() && is_photo(entry.path()) {
            photos.push(entry.path().to_path_buf());
        }
    }

    log::debug!("Scanned {} photos in {:?}", photos.len(), folder);
    Ok(photos)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Photo {
    pub name: String,
    pub path: PathBuf,
}

impl Photo {
    pub fn new(path: PathBuf) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());
        Self { name, path }
    }
}

/// Ordered, path-unique list of the photos known in the bound folder.
#[derive(Debug, Clone, Default)]
pub struct PhotoCatalog {
    photos: Vec<Photo>,
}

impl PhotoCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the catalog with the photos found in `folder`.
    ///
    /// On failure the catalog is left untouched.
    pub fn bind(&mut self, folder: &Path) -> Result<usize> {
        let found = scan_folder(folder)?;
        self.photos.clear();
        for path in found {
            self.add(&path);
        }
        log::info!("Catalog bound to {:?} with {} photos", folder, self.photos.len());
        Ok(self.photos.len())
    }

    /// Adds the photos of another folder without dropping what is already known.
    pub fn extend_from(&mut self, folder: &Path) -> Result<usize> {
        let mut added = 0;
        for path in scan_folder(folder)? {
            if self.add(&path) {
                added += 1;
            }
        }
        log::info!("Added {} photos from {:?}", added, folder);
        Ok(added)
    }

    pub fn add(&mut self, path: &Path) -> bool {
        if !is_photo(path) {
            log::debug!("Ignoring non-photo {:?}", path);
            return false;
        }
        if self.contains(path) {
            return false;
        }
        self.photos.push(Photo::new(path.to_path_buf()));
        true
    }

    pub fn remove(&mut self, path: &Path) -> bool {
        match self.position(path) {
            Some(index) => {
                self.photos.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn rename(&mut self, from: &Path, to: &Path) -> bool {
        self.remove(from);
        self.add(to)
    }

    pub fn clear(&mut self) {
        self.photos.clear();
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.position(path).is_some()
    }

    pub fn position(&self, path: &Path) -> Option<usize> {
        self.photos.iter().position(|photo| photo.path == path)
    }

    pub fn at(&self, index: usize) -> Option<&Photo> {
        self.photos.get(index)
    }

    pub fn len(&self) -> usize {
        self.photos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Photo> {
        self.photos.iter()
    }

    /// Uniform random index, redrawn until it differs from `excluding`.
    ///
    /// Returns 0 when the catalog holds at most one photo. Callers must only
    /// pass an exclusion when there are at least two photos to choose from.
    pub fn random_index(&self, excluding: Option<usize>) -> usize {
        let count = self.photos.len();
        if count <= 1 {
            return 0;
        }

        let mut rng = rand::thread_rng();
        let mut index = rng.gen_range(0..count);
        if let Some(excluded) = excluding {
            while index == excluded {
                index = rng.gen_range(0..count);
            }
        }
        index
    }
}
