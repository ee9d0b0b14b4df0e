//! Synchronisations between JSON-lines stores opened through their URIs.

use std::fs;
use std::path::Path;

use backend::Uri;
use engine::{Locator, SyncError, SyncMode, SyncOptions, sync};
use fsentry::{FsEntry, Id, Statx, Xattrs};

fn write_store(path: &Path, entries: &[FsEntry]) {
    let lines: Vec<String> = entries
        .iter()
        .map(|entry| serde_json::to_string(entry).expect("serializes"))
        .collect();
    fs::write(path, lines.join("\n") + "\n").expect("write store");
}

fn read_store(path: &Path) -> Vec<FsEntry> {
    fs::read_to_string(path)
        .expect("read store")
        .lines()
        .map(|line| serde_json::from_str(line).expect("parses"))
        .collect()
}

fn sample() -> Vec<FsEntry> {
    vec![
        FsEntry::new(1_u64).with_statx(Statx::new().with_mode(0o040_755)),
        FsEntry::new(2_u64)
            .with_parent(1_u64, "etc")
            .with_statx(Statx::new().with_mode(0o040_755)),
        FsEntry::new(3_u64)
            .with_parent(2_u64, "motd")
            .with_statx(Statx::new().with_mode(0o100_644).with_size(12))
            .with_inode_xattrs(Xattrs::new().with("user.tag", "x")),
        FsEntry::new(4_u64)
            .with_parent(1_u64, "lib")
            .with_symlink("usr/lib"),
    ]
}

fn uri(path: &Path) -> Uri {
    format!("rbh:json:{}", path.display()).parse().expect("valid uri")
}

#[test]
fn full_copy_reproduces_the_source() {
    let dir = tempfile::tempdir().expect("tempdir");
    let from = dir.path().join("from.jsonl");
    let to = dir.path().join("to.jsonl");
    write_store(&from, &sample());

    let source = backend::open(&uri(&from)).expect("source");
    let mut destination = backend::open(&uri(&to)).expect("destination");
    let stats = sync(
        source.as_source(),
        destination.as_destination(),
        &SyncOptions::default(),
    )
    .expect("syncs");

    assert_eq!(stats.converted, 4);
    assert_eq!(stats.links, 3);
    assert_eq!(read_store(&to), sample());
}

#[test]
fn branch_copy_stops_at_the_subtree() {
    let dir = tempfile::tempdir().expect("tempdir");
    let from = dir.path().join("from.jsonl");
    let to = dir.path().join("to.jsonl");
    write_store(&from, &sample());

    let source = backend::open(&uri(&from)).expect("source");
    let mut destination = backend::open(&uri(&to)).expect("destination");
    let options =
        SyncOptions::default().with_mode(SyncMode::Branch(Locator::Path("/etc".to_owned())));
    sync(source.as_source(), destination.as_destination(), &options).expect("syncs");

    let ids: Vec<Id> = read_store(&to).into_iter().filter_map(|entry| entry.id).collect();
    assert_eq!(ids, [Id::from(2_u64), Id::from(3_u64)]);
}

#[test]
fn repeated_runs_converge() {
    let dir = tempfile::tempdir().expect("tempdir");
    let from = dir.path().join("from.jsonl");
    let to = dir.path().join("to.jsonl");
    write_store(&from, &sample());

    for _ in 0..2 {
        let source = backend::open(&uri(&from)).expect("source");
        let mut destination = backend::open(&uri(&to)).expect("destination");
        sync(
            source.as_source(),
            destination.as_destination(),
            &SyncOptions::default(),
        )
        .expect("syncs");
    }

    assert_eq!(read_store(&to), sample());
}

#[test]
fn unknown_backends_are_usage_errors() {
    let uri: Uri = "rbh:mongo:db".parse().expect("valid uri");
    let error = backend::open(&uri).err().expect("rejected");

    assert!(matches!(error, SyncError::Usage(_)));
    assert_eq!(error.exit_code(), engine::EXIT_USAGE);
}
