// src/watch/event_handler.rs

//! Translation of raw `notify` events into [`ChangeEvent`]s.

use notify::event::{EventKind, ModifyKind, RenameMode};
use notify::Event;

use crate::fs::FileSystem;
use crate::types::{ChangeEvent, ChangeKind};

/// Flatten one notify event into per-path change events.
///
/// Access and metadata-only events are dropped, as are creations or
/// modifications of directories (their files produce their own events).
/// A rename reported with both paths becomes a deletion of the old path and a
/// creation of the new one.
pub fn change_events(event: &Event, fs: &dyn FileSystem) -> Vec<ChangeEvent> {
    let mut out = Vec::new();

    match event.kind {
        EventKind::Create(_) => push_files(&mut out, event, ChangeKind::Created, fs),
        EventKind::Remove(_) => {
            out.extend(
                event
                    .paths
                    .iter()
                    .map(|p| ChangeEvent::new(p.clone(), ChangeKind::Deleted)),
            );
        }
        EventKind::Modify(ModifyKind::Metadata(_)) => {}
        EventKind::Modify(ModifyKind::Name(mode)) => match (mode, event.paths.as_slice()) {
            (RenameMode::Both, [from, to]) => {
                out.push(ChangeEvent::new(from.clone(), ChangeKind::Deleted));
                if !fs.is_dir(to) {
                    out.push(ChangeEvent::new(to.clone(), ChangeKind::Created));
                }
            }
            (RenameMode::From, _) => {
                out.extend(
                    event
                        .paths
                        .iter()
                        .map(|p| ChangeEvent::new(p.clone(), ChangeKind::Deleted)),
                );
            }
            _ => push_files(&mut out, event, ChangeKind::Created, fs),
        },
        EventKind::Modify(_) => push_files(&mut out, event, ChangeKind::Modified, fs),
        EventKind::Access(_) | EventKind::Any | EventKind::Other => {}
    }

    out
}

fn push_files(out: &mut Vec<ChangeEvent>, event: &Event, kind: ChangeKind, fs: &dyn FileSystem) {
    for path in &event.paths {
        if fs.is_dir(path) {
            continue;
        }
        out.push(ChangeEvent::new(path.clone(), kind));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;
    use notify::event::{AccessKind, CreateKind, DataChange, MetadataKind, RemoveKind};
    use std::path::PathBuf;

    fn event(kind: EventKind, paths: &[&str]) -> Event {
        let mut e = Event::new(kind);
        for p in paths {
            e = e.add_path(PathBuf::from(p));
        }
        e
    }

    #[test]
    fn maps_basic_kinds() {
        let fs = MockFileSystem::new();
        let created = change_events(
            &event(EventKind::Create(CreateKind::File), &["/s/a.html"]),
            &fs,
        );
        assert_eq!(created, vec![ChangeEvent::new("/s/a.html", ChangeKind::Created)]);

        let modified = change_events(
            &event(
                EventKind::Modify(ModifyKind::Data(DataChange::Content)),
                &["/s/a.html"],
            ),
            &fs,
        );
        assert_eq!(modified, vec![ChangeEvent::modified("/s/a.html")]);

        let removed = change_events(
            &event(EventKind::Remove(RemoveKind::File), &["/s/a.html"]),
            &fs,
        );
        assert_eq!(removed, vec![ChangeEvent::new("/s/a.html", ChangeKind::Deleted)]);
    }

    #[test]
    fn drops_noise() {
        let fs = MockFileSystem::new();
        let access = event(EventKind::Access(AccessKind::Any), &["/s/a.html"]);
        let meta = event(
            EventKind::Modify(ModifyKind::Metadata(MetadataKind::Permissions)),
            &["/s/a.html"],
        );
        assert!(change_events(&access, &fs).is_empty());
        assert!(change_events(&meta, &fs).is_empty());
    }

    #[test]
    fn skips_created_directories() {
        let fs = MockFileSystem::new();
        fs.add_file("/s/components/_x.scss", "");
        let created = event(EventKind::Create(CreateKind::Folder), &["/s/components"]);
        assert!(change_events(&created, &fs).is_empty());
    }

    #[test]
    fn rename_becomes_delete_and_create() {
        let fs = MockFileSystem::new();
        let rename = event(
            EventKind::Modify(ModifyKind::Name(RenameMode::Both)),
            &["/s/old.html", "/s/new.html"],
        );
        assert_eq!(
            change_events(&rename, &fs),
            vec![
                ChangeEvent::new("/s/old.html", ChangeKind::Deleted),
                ChangeEvent::new("/s/new.html", ChangeKind::Created),
            ]
        );
    }
}
