//! Error Types
//!
//! This module defines the error types used throughout SceneGL.
//!
//! # Overview
//!
//! The main error type [`SceneGlError`] covers all failure modes including:
//! - Context currency violations
//! - Native object allocation failures
//! - Share group submission failures
//! - Transparent pass protocol violations
//! - Shader snippet loading errors
//!
//! # Usage
//!
//! All public APIs return [`Result<T>`] which is an alias for `std::result::Result<T, SceneGlError>`.
//!
//! ```rust,ignore
//! use scenegl::errors::{SceneGlError, Result};
//!
//! fn allocate() -> Result<()> {
//!     // Operations that may fail return Result
//!     Ok(())
//! }
//! ```

use std::path::PathBuf;

use thiserror::Error;

/// The main error type for SceneGL.
#[derive(Error, Debug)]
pub enum SceneGlError {
    // ========================================================================
    // Context Errors
    // ========================================================================
    /// An operation that issues GL calls ran without any context current on
    /// the calling thread.
    #[error("No render context is current on this thread")]
    NoCurrentContext,

    /// The context is already current on another thread.
    #[error("Render context is current on another thread")]
    ContextCurrentElsewhere,

    // ========================================================================
    // Object Errors
    // ========================================================================
    /// The native allocation call returned the invalid name 0.
    #[error("Failed to allocate GL object: {kind}")]
    AllocationFailed {
        /// Label of the object kind that failed to allocate
        kind: &'static str,
    },

    /// The share group no longer accepts tasks (all member contexts are gone).
    #[error("Share group is closed")]
    ShareGroupClosed,

    // ========================================================================
    // Transparent Pass Errors
    // ========================================================================
    /// `begin_transparent_pass` was called while a pass was already active.
    #[error("Transparent pass already active")]
    PassAlreadyActive,

    /// `end_transparent_pass` was called without a matching begin.
    #[error("No transparent pass active")]
    NoActivePass,

    /// The requested transparency mode has no strategy implementation.
    #[error("Unsupported transparency mode: {0}")]
    UnsupportedTransparencyMode(String),

    // ========================================================================
    // I/O Errors
    // ========================================================================
    /// A shader snippet could not be found in the configured source.
    #[error("Shader snippet not found: {}", .0.display())]
    SnippetNotFound(PathBuf),

    /// File I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Alias for `Result<T, SceneGlError>`.
pub type Result<T> = std::result::Result<T, SceneGlError>;
