//! # imgFS
//!
//! A single-file image store with:
//! - A fixed-capacity record table and an append-only blob region
//! - Content-hash deduplication of identical images
//! - Lazily generated, memoized small and thumbnail variants
//! - A command-line tool and a small HTTP front end
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────┐   ┌──────────────────────────┐
//! │       HTTP Server        │   │       imgfscmd CLI       │
//! │  (thread per connection) │   │  (one command per run)   │
//! └────────────┬─────────────┘   └────────────┬─────────────┘
//!              │                              │
//! ┌────────────▼─────────────┐                │
//! │          Engine          │                │
//! │   (one lock per file)    │                │
//! └────────────┬─────────────┘                │
//!              └───────────────┬──────────────┘
//!                              ▼
//!               ┌──────────────────────────────┐
//!               │          Container           │
//!               │ insert / read / delete / list│
//!               └──────┬───────────────┬───────┘
//!                      │               │
//!                      ▼               ▼
//!               ┌─────────────┐ ┌─────────────┐
//!               │ RecordTable │ │    Codec    │
//!               │  + dedup    │ │ (lazy resize│
//!               └─────────────┘ └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod codec;
pub mod storage;
pub mod network;
pub mod protocol;
pub mod engine;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use codec::{Codec, ImageCodec};
pub use config::{Config, CreateOptions};
pub use engine::Engine;
pub use error::{ImgfsError, Result};
pub use storage::{Container, ListFormat, OpenMode, Resolution};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of imgFS
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
