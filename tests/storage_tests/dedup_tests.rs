//! Deduplication Tests
//!
//! Identical content under different names shares one blob.

#[path = "../common/mod.rs"]
mod common;

use common::{container_path, setup_container, setup_counting_container, StubCodec};
use imgfs::storage::content_hash;
use imgfs::{Container, OpenMode, Resolution};

#[test]
fn test_same_content_shares_storage() {
    let (_temp, mut container) = setup_container(4);
    container.insert(b"shared bytes", "first").unwrap();
    let size_after_first = container.file_size().unwrap();

    container.insert(b"shared bytes", "second").unwrap();

    // No new blob appended
    assert_eq!(container.file_size().unwrap(), size_after_first);
    assert_eq!(container.nb_files(), 2);

    let a = container.find("first").unwrap();
    let b = container.find("second").unwrap();
    assert_eq!(a.hash, b.hash);
    assert_eq!(a.offset, b.offset);
    assert_eq!(a.size, b.size);
    assert_eq!(a.orig_res, b.orig_res);
}

#[test]
fn test_distinct_content_gets_distinct_blobs() {
    let (_temp, mut container) = setup_container(4);
    container.insert(b"left", "l").unwrap();
    container.insert(b"right", "r").unwrap();

    let l = container.find("l").unwrap();
    let r = container.find("r").unwrap();
    assert_ne!(l.hash, r.hash);
    assert_ne!(
        l.location(Resolution::Original).0,
        r.location(Resolution::Original).0
    );
}

#[test]
fn test_alias_inherits_cached_variants() {
    let (_temp, mut container, count) = setup_counting_container(4);
    container.insert(b"picture", "orig").unwrap();
    let small = container.read("orig", Resolution::Small).unwrap();
    assert_eq!(count.load(std::sync::atomic::Ordering::SeqCst), 1);

    container.insert(b"picture", "alias").unwrap();
    let alias_small = container.read("alias", Resolution::Small).unwrap();

    assert_eq!(alias_small, small);
    assert_eq!(count.load(std::sync::atomic::Ordering::SeqCst), 1);
}

const ALL_RESOLUTIONS: [Resolution; 3] =
    [Resolution::Original, Resolution::Small, Resolution::Thumbnail];

#[test]
fn test_delete_one_alias_keeps_other() {
    let (temp, mut container, count) = setup_counting_container(4);
    container.insert(b"twin", "a").unwrap();
    let expected: Vec<Vec<u8>> = ALL_RESOLUTIONS
        .iter()
        .map(|&res| container.read("a", res).unwrap())
        .collect();
    container.insert(b"twin", "b").unwrap();
    let size = container.file_size().unwrap();

    container.delete("a").unwrap();

    for (&res, bytes) in ALL_RESOLUTIONS.iter().zip(&expected) {
        assert_eq!(&container.read("b", res).unwrap(), bytes, "{} after delete", res);
    }
    assert_eq!(container.file_size().unwrap(), size);
    assert_eq!(count.load(std::sync::atomic::Ordering::SeqCst), 2);
    container.close();

    let codec = StubCodec::new();
    let reopened_count = codec.transcode_count();
    let mut reopened =
        Container::open_with_codec(container_path(&temp), OpenMode::ReadWrite, Box::new(codec))
            .unwrap();
    for (&res, bytes) in ALL_RESOLUTIONS.iter().zip(&expected) {
        assert_eq!(&reopened.read("b", res).unwrap(), bytes, "{} after reopen", res);
    }
    assert!(reopened.find("a").is_none());
    assert_eq!(reopened.file_size().unwrap(), size);
    assert_eq!(reopened_count.load(std::sync::atomic::Ordering::SeqCst), 0);
}

#[test]
fn test_deleted_record_is_not_a_dedup_source() {
    let (_temp, mut container) = setup_container(4);
    container.insert(b"content", "old").unwrap();
    container.delete("old").unwrap();
    let size = container.file_size().unwrap();

    container.insert(b"content", "new").unwrap();

    // Appended again since the only match was deleted
    assert!(container.file_size().unwrap() > size);
    assert_eq!(container.find("new").unwrap().hash, content_hash(b"content"));
}
