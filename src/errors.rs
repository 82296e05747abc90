//! Error Types
//!
//! This module defines the error types used throughout the forward renderer.
//!
//! # Overview
//!
//! The main error type [`ForwardError`] covers the failure modes that callers
//! are expected to handle:
//! - Precondition violations while drawing (a light pass with no active light)
//! - Strict program checks requested through [`ShaderProgram::check`]
//! - Configuration loading and validation
//!
//! Shader compile/link/validate failures and uniform lookup misses are
//! **not** represented here. A broken program is logged and kept
//! alive in a failed state, and writes through unknown uniforms are no-ops.
//!
//! [`ShaderProgram::check`]: crate::renderer::pipeline::ShaderProgram::check
//!
//! # Usage
//!
//! ```rust,ignore
//! use myth_forward::errors::{ForwardError, Result};
//!
//! fn draw_frame() -> Result<()> {
//!     // Operations that may fail return Result
//!     Ok(())
//! }
//! ```

use thiserror::Error;

use crate::renderer::pipeline::{PassKind, ProgramFailure};

/// The main error type for the forward renderer.
#[derive(Error, Debug)]
pub enum ForwardError {
    // ========================================================================
    // Rendering Errors
    // ========================================================================
    /// A light pass was updated while no light of its kind was active.
    #[error("{pass:?} pass updated without an active light of that kind")]
    MissingActiveLight {
        /// The pass that required the light
        pass: PassKind,
    },

    /// A program failed to build and a strict check was requested.
    #[error("Shader program '{name}' is unavailable: {failure}")]
    ProgramUnavailable {
        /// Base name of the program
        name: String,
        /// Where the build failed and the driver diagnostic
        failure: ProgramFailure,
    },

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Settings were parsed but contain unusable values.
    #[error("Invalid renderer settings: {0}")]
    InvalidSettings(String),

    /// JSON parsing error.
    #[error("Settings parse error: {0}")]
    Settings(#[from] serde_json::Error),

    // ========================================================================
    // I/O Errors
    // ========================================================================
    /// File I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Alias for `Result<T, ForwardError>`.
pub type Result<T> = std::result::Result<T, ForwardError>;
