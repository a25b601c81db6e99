//! Error taxonomy for the analytics pipeline.
//!
//! Dictionary initialization and unusable cloud settings are fatal. Layout
//! exhaustion is reported as data on [`crate::layout::LayoutOutcome`] and
//! markup irregularities are absorbed by the extractor.

use std::path::PathBuf;

use thiserror::Error;

/// The segmentation dictionary could not be made usable.
#[derive(Error, Debug)]
pub enum TokenizerInitError {
    /// The configured dictionary path does not exist
    #[error("dictionary not found at {}", path.display())]
    DictionaryNotFound { path: PathBuf },

    /// The dictionary exists but could not be loaded
    #[error("failed to load dictionary: {0}")]
    DictionaryLoad(String),

    /// The background loading task panicked or was cancelled
    #[error("dictionary loading was interrupted: {0}")]
    Interrupted(String),
}

/// A cloud section of the configuration cannot drive a layout.
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    /// Padding must be finite, non-negative and no wider than the canvas
    #[error("invalid padding {padding} for a {width}x{height} canvas")]
    InvalidPadding {
        padding: f64,
        width: u32,
        height: u32,
    },

    /// Font size exponent or zoom is NaN or infinite
    #[error("font size exponent and zoom must be finite")]
    InvalidFontSize,
}

/// Errors returned by [`crate::pipeline::Pipeline`].
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    TokenizerInit(#[from] TokenizerInitError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A cloud sub-pipeline task failed to complete
    #[error("cloud task failed: {0}")]
    Task(String),
}
