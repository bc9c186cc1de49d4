use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tempfile::TempDir;

use replica_core::{EventSink, SyncConfig, SyncEvent};
use replica_sync::{CycleOutcome, CycleStats, SyncEngine};

#[derive(Default)]
struct RecordingSink {
    events: Mutex<Vec<SyncEvent>>,
}

impl RecordingSink {
    fn events(&self) -> Vec<SyncEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: &SyncEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

fn engine_for(source: &TempDir, replica: &TempDir) -> (SyncEngine, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::default());
    let config = SyncConfig::new(source.path(), replica.path(), Duration::from_secs(1));
    (SyncEngine::new(config, sink.clone()), sink)
}

fn completed(engine: &SyncEngine) -> CycleStats {
    match engine.run_cycle().unwrap() {
        CycleOutcome::Completed(stats) => stats,
        CycleOutcome::RootMissing => panic!("roots should exist"),
    }
}

#[test]
fn fresh_tree_converges_in_one_cycle() {
    let source = TempDir::new().unwrap();
    let replica = TempDir::new().unwrap();
    fs::create_dir_all(source.path().join("a/b")).unwrap();
    fs::write(source.path().join("a/file1.txt"), "hello").unwrap();

    let (engine, sink) = engine_for(&source, &replica);
    let stats = completed(&engine);

    assert_eq!(stats.dirs_created, 2);
    assert_eq!(stats.files_created, 1);
    assert!(replica.path().join("a/b").is_dir());
    assert_eq!(
        fs::read(replica.path().join("a/file1.txt")).unwrap(),
        b"hello"
    );

    let events = sink.events();
    assert!(events.contains(&SyncEvent::directory_created("a")));
    assert!(events.contains(&SyncEvent::directory_created("a/b")));
    assert!(events.contains(&SyncEvent::file_created("a/file1.txt")));
}

#[test]
fn changed_content_of_equal_length_is_updated() {
    let source = TempDir::new().unwrap();
    let replica = TempDir::new().unwrap();
    fs::write(source.path().join("x.txt"), "new--").unwrap();
    fs::write(replica.path().join("x.txt"), "old--").unwrap();

    let (engine, sink) = engine_for(&source, &replica);
    let stats = completed(&engine);

    assert_eq!(stats.files_updated, 1);
    assert_eq!(fs::read(replica.path().join("x.txt")).unwrap(), b"new--");
    assert_eq!(sink.events(), vec![SyncEvent::file_updated("x.txt")]);
}

#[test]
fn extraneous_file_is_deleted() {
    let source = TempDir::new().unwrap();
    let replica = TempDir::new().unwrap();
    fs::write(replica.path().join("old.txt"), "stale").unwrap();

    let (engine, sink) = engine_for(&source, &replica);
    let stats = completed(&engine);

    assert_eq!(stats.files_deleted, 1);
    assert!(!replica.path().join("old.txt").exists());
    assert_eq!(sink.events(), vec![SyncEvent::file_deleted("old.txt")]);
}

#[test]
fn second_cycle_is_a_noop() {
    let source = TempDir::new().unwrap();
    let replica = TempDir::new().unwrap();
    fs::create_dir_all(source.path().join("docs/archive")).unwrap();
    fs::write(source.path().join("docs/a.txt"), "alpha").unwrap();
    fs::write(source.path().join("top.txt"), "beta").unwrap();
    fs::write(replica.path().join("leftover.txt"), "x").unwrap();

    let (engine, sink) = engine_for(&source, &replica);
    let first = completed(&engine);
    assert!(first.actions() > 0);

    let events_after_first = sink.events().len();
    let second = completed(&engine);

    assert_eq!(second.actions(), 0);
    assert_eq!(second.files_skipped, 0);
    assert_eq!(sink.events().len(), events_after_first);
}

#[test]
fn full_tree_converges_to_set_equality() {
    let source = TempDir::new().unwrap();
    let replica = TempDir::new().unwrap();

    fs::create_dir_all(source.path().join("a/b/c")).unwrap();
    fs::create_dir_all(source.path().join("empty")).unwrap();
    fs::write(source.path().join("root.txt"), "root").unwrap();
    fs::write(source.path().join("a/one.txt"), "one").unwrap();
    fs::write(source.path().join("a/b/two.txt"), "two").unwrap();

    fs::create_dir_all(replica.path().join("obsolete/deep")).unwrap();
    fs::write(replica.path().join("obsolete/gone.txt"), "gone").unwrap();
    fs::write(replica.path().join("root.txt"), "outdated").unwrap();

    let (engine, _) = engine_for(&source, &replica);
    completed(&engine);

    assert_eq!(list_tree(source.path()), list_tree(replica.path()));
    assert_eq!(fs::read(replica.path().join("root.txt")).unwrap(), b"root");
    assert_eq!(fs::read(replica.path().join("a/b/two.txt")).unwrap(), b"two");
    assert!(replica.path().join("empty").is_dir());
    assert!(!replica.path().join("obsolete").exists());
}

#[test]
fn file_occupying_directory_path_aborts_directory_sync() {
    // A replica file sits where the source has a directory. Directory sync
    // fails structurally, so file sync is never attempted and no events are
    // emitted for this cycle.
    let source = TempDir::new().unwrap();
    let replica = TempDir::new().unwrap();
    fs::create_dir(source.path().join("entry")).unwrap();
    fs::write(source.path().join("entry/child.txt"), "x").unwrap();
    fs::write(replica.path().join("entry"), "was a file").unwrap();

    let (engine, sink) = engine_for(&source, &replica);

    assert!(engine.run_cycle().is_err());
    assert!(sink.events().is_empty());

    // Once the blocking file is out of the way, the next cycle converges.
    fs::remove_file(replica.path().join("entry")).unwrap();
    let stats = completed(&engine);

    assert_eq!(stats.dirs_created, 1);
    assert_eq!(
        fs::read(replica.path().join("entry/child.txt")).unwrap(),
        b"x"
    );
}

#[test]
fn moved_file_converges_as_delete_plus_create() {
    let source = TempDir::new().unwrap();
    let replica = TempDir::new().unwrap();
    fs::write(source.path().join("renamed.txt"), "payload").unwrap();
    fs::write(replica.path().join("original.txt"), "payload").unwrap();

    let (engine, sink) = engine_for(&source, &replica);
    let stats = completed(&engine);

    assert_eq!(stats.files_created, 1);
    assert_eq!(stats.files_deleted, 1);
    let events = sink.events();
    assert!(events.contains(&SyncEvent::file_created("renamed.txt")));
    assert!(events.contains(&SyncEvent::file_deleted("original.txt")));
}

#[cfg(unix)]
#[test]
fn blocked_file_is_skipped_without_aborting_the_phase() {
    // A dangling symlink occupies the target path: the walker does not list
    // it as a file, and the create-new copy refuses to replace it. The copy
    // fails for that one file only; the rest of the phase proceeds.
    let source = TempDir::new().unwrap();
    let replica = TempDir::new().unwrap();
    fs::write(source.path().join("blocked.txt"), "data").unwrap();
    fs::write(source.path().join("fine.txt"), "data").unwrap();
    std::os::unix::fs::symlink("no-such-target", replica.path().join("blocked.txt")).unwrap();

    let (engine, sink) = engine_for(&source, &replica);
    let stats = completed(&engine);

    assert_eq!(stats.files_skipped, 1);
    assert_eq!(stats.files_created, 1);
    let events = sink.events();
    assert!(events.contains(&SyncEvent::file_created("fine.txt")));
    assert!(!events.contains(&SyncEvent::file_created("blocked.txt")));
}

/// Sorted relative paths of all entries under a root.
fn list_tree(root: &Path) -> Vec<std::path::PathBuf> {
    let mut paths = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        for entry in fs::read_dir(&dir).unwrap() {
            let entry = entry.unwrap();
            let path = entry.path();
            paths.push(path.strip_prefix(root).unwrap().to_path_buf());
            if path.is_dir() {
                stack.push(path);
            }
        }
    }
    paths.sort();
    paths
}
