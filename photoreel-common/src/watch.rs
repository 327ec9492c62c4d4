use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use notify::{
    event::{CreateKind, ModifyKind, RemoveKind, RenameMode},
    Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher,
};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;
use crate::error::{GalleryError, WatchError};
use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WatchEvent {
    Created(PathBuf),
    Deleted(PathBuf),
    Renamed { from: PathBuf, to: PathBuf },
    Changed(PathBuf),
}

/// A watcher event tagged with the watcher generation it was observed in.
#[derive(Debug, Clone)]
pub struct StampedEvent {
    pub generation: u64,
    pub event: WatchEvent,
}

pub trait FolderWatch {
    /// Points the watcher at `folder`. The watcher stays disabled until
    /// [`FolderWatch::enable`] is called.
    fn bind(&mut self, folder: &Path) -> Result<()>;
    fn enable(&mut self, enabled: bool) -> Result<()>;
    fn is_enabled(&self) -> bool;
}

/// Rejects events that were observed before the watcher was last disabled.
#[derive(Debug, Clone)]
pub struct WatchGate {
    generation: Arc<AtomicU64>,
}

impl WatchGate {
    pub fn accepts(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }
}

// Rename halves still waiting for their pairing `Both` event
const PENDING_RENAMES: usize = 64;

/// Converts raw notify events into folder events.
///
/// Inotify reports a rename inside the folder three times: `From`, `To` and
/// then `Both`, all sharing one tracker. The `To` half of such a pair is
/// dropped so the rename is applied once, as `Renamed`. A `From` with no
/// partner is a move out of the folder and a `To` with no partner is a move
/// in, so those become `Deleted` and `Created`.
#[derive(Debug, Default)]
pub struct EventTranslator {
    pending: VecDeque<usize>,
}

impl EventTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn translate(&mut self, event: &Event) -> Vec<WatchEvent> {
        match &event.kind {
            EventKind::Create(CreateKind::Folder) | EventKind::Remove(RemoveKind::Folder) => Vec::new(),
            EventKind::Create(_) => event.paths.iter().cloned().map(WatchEvent::Created).collect(),
            EventKind::Remove(_) => event.paths.iter().cloned().map(WatchEvent::Deleted).collect(),
            EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
                if let Some(tracker) = event.attrs.tracker() {
                    self.pending.retain(|&t| t != tracker);
                }
                match event.paths.as_slice() {
                    [from, to] => vec![WatchEvent::Renamed {
                        from: from.clone(),
                        to: to.clone(),
                    }],
                    _ => Vec::new(),
                }
            }
            EventKind::Modify(ModifyKind::Name(RenameMode::From)) => {
                if let Some(tracker) = event.attrs.tracker() {
                    if self.pending.len() == PENDING_RENAMES {
                        self.pending.pop_front();
                    }
                    self.pending.push_back(tracker);
                }
                event.paths.iter().cloned().map(WatchEvent::Deleted).collect()
            }
            EventKind::Modify(ModifyKind::Name(RenameMode::To)) => {
                let paired = event
                    .attrs
                    .tracker()
                    .is_some_and(|tracker| self.pending.contains(&tracker));
                if paired {
                    // The matching `Both` carries the rename
                    return Vec::new();
                }
                event.paths.iter().cloned().map(WatchEvent::Created).collect()
            }
            EventKind::Modify(ModifyKind::Data(_)) | EventKind::Modify(ModifyKind::Metadata(_)) => {
                event.paths.iter().cloned().map(WatchEvent::Changed).collect()
            }
            _ => Vec::new(),
        }
    }
}

/// Non-recursive folder watcher backed by `notify`.
pub struct NotifyWatcher {
    watcher: RecommendedWatcher,
    folder: Option<PathBuf>,
    enabled: bool,
    generation: Arc<AtomicU64>,
}

impl NotifyWatcher {
    pub fn new(tx: UnboundedSender<StampedEvent>) -> Result<Self> {
        let generation = Arc::new(AtomicU64::new(0));
        let stamp = generation.clone();
        let mut translator = EventTranslator::new();

        let watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
            Ok(event) => {
                let generation = stamp.load(Ordering::SeqCst);
                for event in translator.translate(&event) {
                    // Receiver gone means the daemon is shutting down
                    let _ = tx.send(StampedEvent { generation, event });
                }
            }
            Err(e) => log::warn!("Folder watcher error: {}", e),
        })
        .map_err(|e| {
            GalleryError::Watch(WatchError::Arm {
                path: PathBuf::new(),
                message: e.to_string(),
            })
        })?;

        Ok(Self {
            watcher,
            folder: None,
            enabled: false,
            generation,
        })
    }

    pub fn gate(&self) -> WatchGate {
        WatchGate {
            generation: self.generation.clone(),
        }
    }

    pub fn folder(&self) -> Option<&Path> {
        self.folder.as_deref()
    }

    fn disarm(&mut self) -> Result<()> {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if !self.enabled {
            return Ok(());
        }
        self.enabled = false;

        let Some(folder) = self.folder.as_ref() else {
            return Ok(());
        };
        self.watcher.unwatch(folder).map_err(|e| {
            GalleryError::Watch(WatchError::Disarm {
                path: folder.clone(),
                message: e.to_string(),
            })
        })
    }
}

impl FolderWatch for NotifyWatcher {
    fn bind(&mut self, folder: &Path) -> Result<()> {
        if let Err(e) = self.disarm() {
            // The old folder may already be gone
            log::debug!("Ignoring disarm failure while rebinding: {}", e);
        }
        self.folder = Some(folder.to_path_buf());
        log::debug!("Watcher bound to {:?}", folder);
        Ok(())
    }

    fn enable(&mut self, enabled: bool) -> Result<()> {
        if !enabled {
            return self.disarm();
        }
        if self.enabled {
            return Ok(());
        }

        let folder = self.folder.clone().ok_or(GalleryError::Watch(WatchError::Unbound))?;
        self.watcher
            .watch(&folder, RecursiveMode::NonRecursive)
            .map_err(|e| {
                GalleryError::Watch(WatchError::Arm {
                    path: folder.clone(),
                    message: e.to_string(),
                })
            })?;
        self.enabled = true;
        log::info!("Watching {:?} for new photos", folder);
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{DataChange, MetadataKind};
    use tempfile::tempdir;

    fn translate(event: &Event) -> Vec<WatchEvent> {
        EventTranslator::new().translate(event)
    }

    fn rename(mode: RenameMode, paths: &[&str], tracker: usize) -> Event {
        event(EventKind::Modify(ModifyKind::Name(mode)), paths).set_tracker(tracker)
    }

    fn event(kind: EventKind, paths: &[&str]) -> Event {
        let mut event = Event::new(kind);
        for path in paths {
            event = event.add_path(PathBuf::from(path));
        }
        event
    }

    #[test]
    fn test_translate_create_and_remove() {
        let created = translate(&event(EventKind::Create(CreateKind::File), &["/p/a.jpg"]));
        assert_eq!(created, vec![WatchEvent::Created(PathBuf::from("/p/a.jpg"))]);

        let removed = translate(&event(EventKind::Remove(RemoveKind::File), &["/p/a.jpg"]));
        assert_eq!(removed, vec![WatchEvent::Deleted(PathBuf::from("/p/a.jpg"))]);

        assert!(translate(&event(EventKind::Create(CreateKind::Folder), &["/p/sub"])).is_empty());
    }

    #[test]
    fn test_translate_renames() {
        let both = translate(&event(
            EventKind::Modify(ModifyKind::Name(RenameMode::Both)),
            &["/p/a.jpg", "/p/b.jpg"],
        ));
        assert_eq!(
            both,
            vec![WatchEvent::Renamed {
                from: PathBuf::from("/p/a.jpg"),
                to: PathBuf::from("/p/b.jpg"),
            }]
        );

        let from = translate(&event(EventKind::Modify(ModifyKind::Name(RenameMode::From)), &["/p/a.jpg"]));
        assert_eq!(from, vec![WatchEvent::Deleted(PathBuf::from("/p/a.jpg"))]);

        let to = translate(&event(EventKind::Modify(ModifyKind::Name(RenameMode::To)), &["/p/b.jpg"]));
        assert_eq!(to, vec![WatchEvent::Created(PathBuf::from("/p/b.jpg"))]);
    }

    #[test]
    fn test_paired_rename_is_reported_once() {
        let mut translator = EventTranslator::new();
        let mut events = Vec::new();
        events.extend(translator.translate(&rename(RenameMode::From, &["/p/a.jpg"], 7)));
        events.extend(translator.translate(&rename(RenameMode::To, &["/p/b.jpg"], 7)));
        events.extend(translator.translate(&rename(RenameMode::Both, &["/p/a.jpg", "/p/b.jpg"], 7)));

        assert_eq!(
            events,
            vec![
                WatchEvent::Deleted(PathBuf::from("/p/a.jpg")),
                WatchEvent::Renamed {
                    from: PathBuf::from("/p/a.jpg"),
                    to: PathBuf::from("/p/b.jpg"),
                },
            ]
        );
        assert!(translator.pending.is_empty());
    }

    #[test]
    fn test_unpaired_move_in_counts_as_created() {
        let mut translator = EventTranslator::new();
        translator.translate(&rename(RenameMode::From, &["/p/a.jpg"], 1));
        let moved_in = translator.translate(&rename(RenameMode::To, &["/p/c.jpg"], 2));
        assert_eq!(moved_in, vec![WatchEvent::Created(PathBuf::from("/p/c.jpg"))]);
    }

    #[test]
    fn test_pending_renames_are_bounded() {
        let mut translator = EventTranslator::new();
        for tracker in 0..PENDING_RENAMES + 10 {
            translator.translate(&rename(RenameMode::From, &["/p/gone.jpg"], tracker));
        }
        assert_eq!(translator.pending.len(), PENDING_RENAMES);
        assert!(!translator.pending.contains(&0));
    }

    #[test]
    fn test_translate_changes() {
        let data = translate(&event(
            EventKind::Modify(ModifyKind::Data(DataChange::Content)),
            &["/p/a.jpg"],
        ));
        assert_eq!(data, vec![WatchEvent::Changed(PathBuf::from("/p/a.jpg"))]);

        let meta = translate(&event(
            EventKind::Modify(ModifyKind::Metadata(MetadataKind::Permissions)),
            &["/p/a.jpg"],
        ));
        assert_eq!(meta, vec![WatchEvent::Changed(PathBuf::from("/p/a.jpg"))]);

        assert!(translate(&event(EventKind::Access(notify::event::AccessKind::Any), &["/p/a.jpg"])).is_empty());
    }

    #[test]
    fn test_disable_invalidates_generation() {
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
        let temp_dir = tempdir().unwrap();
        let mut watcher = NotifyWatcher::new(tx).unwrap();
        let gate = watcher.gate();
        assert!(gate.accepts(0));

        watcher.bind(temp_dir.path()).unwrap();
        assert!(!watcher.is_enabled());
        watcher.enable(true).unwrap();
        assert!(watcher.is_enabled());

        let before = watcher.generation.load(Ordering::SeqCst);
        watcher.enable(false).unwrap();
        assert!(!watcher.is_enabled());
        assert!(!gate.accepts(before));
        assert!(gate.accepts(watcher.generation.load(Ordering::SeqCst)));
    }

    #[test]
    fn test_enable_without_folder_fails() {
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
        let mut watcher = NotifyWatcher::new(tx).unwrap();
        match watcher.enable(true).unwrap_err() {
            GalleryError::Watch(WatchError::Unbound) => {}
            e => panic!("Expected Unbound, got {:?}", e),
        }
    }

    #[test]
    fn test_enable_missing_folder_fails_to_arm() {
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
        let mut watcher = NotifyWatcher::new(tx).unwrap();
        watcher.bind(Path::new("/nonexistent/photos")).unwrap();
        assert!(watcher.enable(true).is_err());
        assert!(!watcher.is_enabled());
    }
}
