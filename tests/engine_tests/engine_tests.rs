//! Tests for Engine
//!
//! These tests verify:
//! - Command execution and replies
//! - Errors surface unchanged
//! - Concurrent access through the shared lock
//! - Engine lifecycle (open/close)

#[path = "../common/mod.rs"]
mod common;

use std::sync::Arc;
use std::thread;

use common::{container_path, setup_container, stub_resized};
use imgfs::engine::{Engine, Reply};
use imgfs::protocol::Command;
use imgfs::{Container, ImgfsError, OpenMode, Resolution};

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_engine(max_files: u32) -> (tempfile::TempDir, Engine) {
    let (temp, container) = setup_container(max_files);
    (temp, Engine::new(container))
}

fn insert(engine: &Engine, name: &str, data: &[u8]) -> Reply {
    engine
        .execute(Command::Insert {
            img_id: name.to_string(),
            data: data.to_vec(),
        })
        .unwrap()
}

// =============================================================================
// Command Execution Tests
// =============================================================================

#[test]
fn test_engine_insert_and_read() {
    let (_temp, engine) = setup_temp_engine(4);

    assert_eq!(insert(&engine, "img", b"content"), Reply::Done);

    let reply = engine
        .execute(Command::Read {
            img_id: "img".to_string(),
            resolution: Resolution::Original,
        })
        .unwrap();
    assert_eq!(reply, Reply::Image(b"content".to_vec()));
}

#[test]
fn test_engine_lazy_read() {
    let (_temp, engine) = setup_temp_engine(4);
    insert(&engine, "img", b"content");

    let reply = engine
        .execute(Command::Read {
            img_id: "img".to_string(),
            resolution: Resolution::Thumbnail,
        })
        .unwrap();

    assert_eq!(reply, Reply::Image(stub_resized(b"content", 64, 64)));
}

#[test]
fn test_engine_list() {
    let (_temp, engine) = setup_temp_engine(4);
    insert(&engine, "a", b"1");
    insert(&engine, "b", b"2");

    let reply = engine.execute(Command::List).unwrap();

    assert_eq!(reply, Reply::Listing(r#"{"Images":["a","b"]}"#.to_string()));
}

#[test]
fn test_engine_delete() {
    let (_temp, engine) = setup_temp_engine(4);
    insert(&engine, "a", b"1");

    let reply = engine
        .execute(Command::Delete {
            img_id: "a".to_string(),
        })
        .unwrap();

    assert_eq!(reply, Reply::Done);
    assert_eq!(engine.header().nb_files, 0);
    assert_eq!(engine.header().version, 2);
}

#[test]
fn test_engine_errors_propagate() {
    let (_temp, engine) = setup_temp_engine(1);
    insert(&engine, "only", b"1");

    let full = engine.execute(Command::Insert {
        img_id: "more".to_string(),
        data: b"2".to_vec(),
    });
    assert!(matches!(full, Err(ImgfsError::ContainerFull)));

    let missing = engine.execute(Command::Delete {
        img_id: "nobody".to_string(),
    });
    assert!(matches!(missing, Err(ImgfsError::ImageNotFound(_))));
}

#[test]
fn test_engine_with_container() {
    let (_temp, engine) = setup_temp_engine(4);
    insert(&engine, "a", b"abc");

    let hash = engine.with_container(|c| c.find("a").map(|r| r.hash));

    assert_eq!(hash, Some(imgfs::storage::content_hash(b"abc")));
}

// =============================================================================
// Concurrency Tests
// =============================================================================

#[test]
fn test_concurrent_inserts() {
    let (_temp, engine) = setup_temp_engine(64);
    let engine = Arc::new(engine);

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                for i in 0..4 {
                    let name = format!("t{}-{}", t, i);
                    insert(&engine, &name, name.as_bytes());
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let header = engine.header();
    assert_eq!(header.nb_files, 32);
    assert_eq!(header.version, 32);
}

#[test]
fn test_concurrent_lazy_reads_resize_once() {
    let (_temp, engine) = setup_temp_engine(4);
    insert(&engine, "shared", b"pixels");
    let engine = Arc::new(engine);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                engine
                    .execute(Command::Read {
                        img_id: "shared".to_string(),
                        resolution: Resolution::Small,
                    })
                    .unwrap()
            })
        })
        .collect();
    let replies: Vec<Reply> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert!(replies.iter().all(|r| r == &replies[0]));
    let size = engine.with_container(|c| c.find("shared").unwrap().location(Resolution::Small).1);
    assert_eq!(size as usize, stub_resized(b"pixels", 256, 256).len());
}

// =============================================================================
// Lifecycle Tests
// =============================================================================

#[test]
fn test_engine_close_persists() {
    let (temp, engine) = setup_temp_engine(4);
    insert(&engine, "kept", b"data");
    engine.close();

    let container = Container::open(container_path(&temp), OpenMode::ReadOnly).unwrap();
    assert!(container.find("kept").is_some());
}

#[test]
fn test_engine_open_path() {
    let (temp, container) = setup_container(4);
    container.close();

    let engine = Engine::open_path(&container_path(&temp)).unwrap();

    assert_eq!(engine.header().max_files, 4);
}
