use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use crate::error::{GalleryError, IoError};
use crate::Result;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveReport {
    pub moved: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteReport {
    pub deleted: usize,
    pub failed: usize,
}

/// First free name for `source` inside `dest_dir`: `name.ext`, then
/// `name_001.ext`, `name_002.ext` and so on.
pub fn unique_destination(dest_dir: &Path, source: &Path) -> PathBuf {
    let file_name = source.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    let candidate = dest_dir.join(&file_name);
    if !candidate.exists() {
        return candidate;
    }

    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let extension = source.extension().map(|e| e.to_string_lossy().to_string());

    let mut counter = 1u32;
    loop {
        let name = match &extension {
            Some(ext) => format!("{}_{:03}.{}", stem, counter, ext),
            None => format!("{}_{:03}", stem, counter),
        };
        let candidate = dest_dir.join(name);
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}

/// Copies `source` into `dest_dir` under a unique name, then deletes it.
pub fn archive_file(source: &Path, dest_dir: &Path) -> Result<PathBuf> {
    let target = unique_destination(dest_dir, source);
    std::fs::copy(source, &target).map_err(|e| {
        GalleryError::Io(IoError::Copy {
            from: source.to_path_buf(),
            to: target.clone(),
            source: e,
        })
    })?;

    delete_file(source)?;
    log::debug!("Archived {:?} to {:?}", source, target);
    Ok(target)
}

pub fn delete_file(path: &Path) -> Result<()> {
    std::fs::remove_file(path).map_err(|e| {
        GalleryError::Io(IoError::Delete {
            path: path.to_path_buf(),
            source: e,
        })
    })
}

pub fn check_destination(dest_dir: &Path) -> Result<()> {
    if dest_dir.is_dir() {
        Ok(())
    } else {
        Err(GalleryError::Io(IoError::BadDestination {
            path: dest_dir.to_path_buf(),
        }))
    }
}
