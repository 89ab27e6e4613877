use std::fmt;
use std::io;
use std::path::PathBuf;

use crate::overlay::MAX_OVERLAYS;

/// Error type for layout loading and block texture formatting.
#[derive(Debug)]
pub enum LayoutError {
    /// File I/O error.
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// JSON parse error.
    Json {
        /// File the parser choked on.
        path: PathBuf,
        /// Underlying parse error.
        source: serde_json::Error,
    },
    /// Unsupported file format (non-JSON).
    UnsupportedFormat(String),
    /// A required child node is absent.
    MissingChild {
        /// Name of the node that was searched.
        node: String,
        /// Name of the child that was expected.
        child: String,
    },
    /// A node value failed validation.
    InvalidValue {
        /// Name of the node the value belongs to.
        node: String,
        /// Field that failed.
        field: String,
        /// What was wrong with it.
        reason: String,
    },
    /// A key entry's name is not exactly one character.
    InvalidKeyName(String),
    /// A referenced texture file does not exist.
    MissingTexture(PathBuf),
    /// An overlay the resolved plan needs was never loaded.
    MissingOverlay(String),
    /// More overlays requested than one compositing pass supports.
    TooManyOverlays(usize),
    /// Shader or texture infrastructure failure.
    Gpu(macroquad::Error),
}

impl From<macroquad::Error> for LayoutError {
    fn from(err: macroquad::Error) -> Self {
        LayoutError::Gpu(err)
    }
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutError::Io { path, source } => {
                write!(f, "I/O error reading {}: {}", path.display(), source)
            }
            LayoutError::Json { path, source } => {
                write!(f, "JSON parse error in {}: {}", path.display(), source)
            }
            LayoutError::UnsupportedFormat(path) => {
                write!(f, "Unsupported file format: {}", path)
            }
            LayoutError::MissingChild { node, child } => {
                write!(f, "Node '{}' is missing required child '{}'", node, child)
            }
            LayoutError::InvalidValue { node, field, reason } => {
                write!(f, "Invalid value for '{}' in '{}': {}", field, node, reason)
            }
            LayoutError::InvalidKeyName(name) => {
                write!(f, "Key entry '{}' must be named by a single character", name)
            }
            LayoutError::MissingTexture(path) => {
                write!(f, "Texture does not exist: {}", path.display())
            }
            LayoutError::MissingOverlay(kind) => {
                write!(f, "Overlay '{}' required by the resolved plan was not loaded", kind)
            }
            LayoutError::TooManyOverlays(count) => {
                write!(
                    f,
                    "{} overlays requested but one pass applies at most {}",
                    count, MAX_OVERLAYS
                )
            }
            LayoutError::Gpu(err) => write!(f, "GPU resource failure: {}", err),
        }
    }
}

impl std::error::Error for LayoutError {}
