//! Error types for imgFS
//!
//! Provides a unified error type for all operations.

use std::collections::TryReserveError;

use thiserror::Error;

/// Result type alias using ImgfsError
pub type Result<T> = std::result::Result<T, ImgfsError>;

/// Unified error type for imgFS operations
#[derive(Debug, Error)]
pub enum ImgfsError {
    // -------------------------------------------------------------------------
    // Argument Errors
    // -------------------------------------------------------------------------
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid resolution: {0}")]
    InvalidResolution(String),

    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    // -------------------------------------------------------------------------
    // Container Errors
    // -------------------------------------------------------------------------
    #[error("imgFS is full")]
    ContainerFull,

    #[error("Existing image ID: {0}")]
    DuplicateName(String),

    #[error("Image not found: {0}")]
    ImageNotFound(String),

    // -------------------------------------------------------------------------
    // I/O and Resource Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Out of memory: {0}")]
    OutOfMemory(String),

    // -------------------------------------------------------------------------
    // Codec Errors
    // -------------------------------------------------------------------------
    #[error("Image codec error: {0}")]
    Codec(String),

    // -------------------------------------------------------------------------
    // Serving Layer Errors
    // -------------------------------------------------------------------------
    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<TryReserveError> for ImgfsError {
    fn from(e: TryReserveError) -> Self {
        ImgfsError::OutOfMemory(e.to_string())
    }
}

impl From<image::ImageError> for ImgfsError {
    fn from(e: image::ImageError) -> Self {
        ImgfsError::Codec(e.to_string())
    }
}

impl From<serde_json::Error> for ImgfsError {
    fn from(e: serde_json::Error) -> Self {
        ImgfsError::Serialization(e.to_string())
    }
}
