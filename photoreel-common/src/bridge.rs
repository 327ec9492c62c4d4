use std::path::Path;
use std::time::Instant;
use crate::slideshow::Slideshow;
use crate::slots::SlotId;
use crate::watch::WatchEvent;

impl Slideshow {
    /// Applies one folder event to the catalog and the slots.
    pub fn apply(&mut self, event: WatchEvent, now: Instant) {
        match event {
            WatchEvent::Created(path) => self.on_created(&path, now),
            WatchEvent::Deleted(path) => self.on_deleted(&path),
            WatchEvent::Renamed { from, to } => self.on_renamed(&from, &to),
            WatchEvent::Changed(_) => {}
        }
    }

    pub fn on_created(&mut self, path: &Path, now: Instant) {
        if !self.settings().watch_new_files || self.catalog().contains(path) {
            return;
        }
        if self.catalog_mut().add(path) {
            log::info!("New photo {:?}", path);
            self.slots_mut().set(SlotId::Recent, path, now);
        }
    }

    pub fn on_deleted(&mut self, path: &Path) {
        if self.forget_photo(path) {
            log::info!("Photo removed {:?}", path);
        }
    }

    pub fn on_renamed(&mut self, from: &Path, to: &Path) {
        self.on_deleted(from);
        if self.catalog_mut().add(to) {
            log::debug!("Photo renamed {:?} -> {:?}", from, to);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::slideshow::testing::*;
    use crate::slots::{SlotId, RECENT_TTL};
    use crate::watch::{EventTranslator, WatchEvent};
    use notify::event::{ModifyKind, RenameMode};
    use notify::{Event, EventKind};
    use std::path::{Path, PathBuf};
    use std::time::{Duration, Instant};

    fn p(path: &str) -> PathBuf {
        PathBuf::from(path)
    }

    #[test]
    fn test_created_photo_joins_catalog_and_recent() {
        let now = Instant::now();
        let (mut show, _) = slideshow_with(&["/p/a.jpg"]);

        show.apply(WatchEvent::Created(p("/p/new.png")), now);
        assert!(show.catalog().contains(Path::new("/p/new.png")));
        assert_eq!(slot(&show, SlotId::Recent), Some(p("/p/new.png")));

        show.apply(WatchEvent::Created(p("/p/notes.txt")), now);
        assert_eq!(show.catalog().len(), 2);
        assert_eq!(slot(&show, SlotId::Recent), Some(p("/p/new.png")));
    }

    #[test]
    fn test_known_photo_does_not_refresh_recent() {
        let start = Instant::now();
        let (mut show, _) = slideshow_with(&["/p/a.jpg"]);
        show.apply(WatchEvent::Created(p("/p/a.jpg")), start);
        assert_eq!(slot(&show, SlotId::Recent), None);
        assert_eq!(show.catalog().len(), 1);
    }

    #[test]
    fn test_created_ignored_when_watching_disabled() {
        let now = Instant::now();
        let (mut show, _) = slideshow_with(&[]);
        show.set_watch_enabled(false);
        show.apply(WatchEvent::Created(p("/p/new.jpg")), now);
        assert!(show.catalog().is_empty());
        assert_eq!(slot(&show, SlotId::Recent), None);
    }

    #[test]
    fn test_recent_photo_expires() {
        let start = Instant::now();
        let (mut show, _) = slideshow_with(&[]);
        show.apply(WatchEvent::Created(p("/p/one.jpg")), start);
        show.apply(WatchEvent::Created(p("/p/two.jpg")), start + Duration::from_secs(10));

        assert!(!show.expire_recent(start + RECENT_TTL));
        assert_eq!(slot(&show, SlotId::Recent), Some(p("/p/two.jpg")));

        assert!(show.expire_recent(start + Duration::from_secs(10) + RECENT_TTL));
        assert_eq!(slot(&show, SlotId::Recent), None);
        assert_eq!(show.catalog().len(), 2);
    }

    #[test]
    fn test_deleting_next_clears_it() {
        let now = Instant::now();
        let (mut show, _) = slideshow_with(&["/p/a.jpg", "/p/b.jpg"]);
        show.toggle_cycling(now);
        assert_eq!(slot(&show, SlotId::Next), Some(p("/p/b.jpg")));

        show.apply(WatchEvent::Deleted(p("/p/b.jpg")), now);
        assert_eq!(slot(&show, SlotId::Next), None);
        assert!(!show.catalog().contains(Path::new("/p/b.jpg")));
        assert_eq!(slot(&show, SlotId::Current), Some(p("/p/a.jpg")));

        // The next tick has to reseed instead of promoting a stale path
        show.advance_now(now);
        assert_eq!(slot(&show, SlotId::Current), Some(p("/p/a.jpg")));
        assert_eq!(show.photo_index(), Some(0));
    }

    #[test]
    fn test_deleting_previewed_photo_clears_preview() {
        let now = Instant::now();
        let (mut show, _) = slideshow_with(&["/p/a.jpg", "/p/b.jpg"]);
        show.preview_photo(Path::new("/p/a.jpg"), now);

        show.apply(WatchEvent::Deleted(p("/p/a.jpg")), now);
        assert_eq!(slot(&show, SlotId::Preview), None);
        show.apply(WatchEvent::Deleted(p("/p/a.jpg")), now);
        assert_eq!(show.catalog().len(), 1);
    }

    #[test]
    fn test_rename_updates_catalog_without_recent() {
        let now = Instant::now();
        let (mut show, _) = slideshow_with(&["/p/a.jpg", "/p/b.jpg"]);
        show.toggle_cycling(now);

        show.apply(
            WatchEvent::Renamed {
                from: p("/p/b.jpg"),
                to: p("/p/z.jpg"),
            },
            now,
        );
        assert!(show.catalog().contains(Path::new("/p/z.jpg")));
        assert!(!show.catalog().contains(Path::new("/p/b.jpg")));
        assert_eq!(slot(&show, SlotId::Next), None);
        assert_eq!(slot(&show, SlotId::Recent), None);
    }

    #[test]
    fn test_inotify_rename_sequence_leaves_recent_empty() {
        let now = Instant::now();
        let (mut show, _) = slideshow_with(&["/p/a.jpg", "/p/b.jpg"]);
        let mut translator = EventTranslator::new();

        let name = |mode, paths: &[&str]| {
            let mut event = Event::new(EventKind::Modify(ModifyKind::Name(mode))).set_tracker(3);
            for path in paths {
                event = event.add_path(p(path));
            }
            event
        };
        let raw = [
            name(RenameMode::From, &["/p/b.jpg"]),
            name(RenameMode::To, &["/p/z.jpg"]),
            name(RenameMode::Both, &["/p/b.jpg", "/p/z.jpg"]),
        ];
        for event in raw.iter().flat_map(|e| translator.translate(e)) {
            show.apply(event, now);
        }

        assert!(show.catalog().contains(Path::new("/p/z.jpg")));
        assert!(!show.catalog().contains(Path::new("/p/b.jpg")));
        assert_eq!(show.catalog().len(), 2);
        assert_eq!(slot(&show, SlotId::Recent), None);
    }

    #[test]
    fn test_changed_is_ignored() {
        let now = Instant::now();
        let (mut show, _) = slideshow_with(&["/p/a.jpg"]);
        show.apply(WatchEvent::Changed(p("/p/a.jpg")), now);
        show.apply(WatchEvent::Changed(p("/p/other.jpg")), now);
        assert_eq!(show.catalog().len(), 1);
    }
}
