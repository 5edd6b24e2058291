//! Error types for the tile layer.

use thiserror::Error;

/// Failure to load one tile's imagery.
///
/// Load failures are isolated: they are recorded in the tile's cache entry and
/// the tile is never drawn. They never abort a viewport update or a frame.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// Transport-level failure (connection, timeout, body read).
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Tile server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    /// Response body is not a decodable image.
    #[error("Failed to decode tile image: {0}")]
    Decode(String),

    /// The loader dropped the request without reporting an outcome.
    #[error("Tile load abandoned before completion")]
    Abandoned,
}

/// Errors raised while configuring or attaching a layer.
#[derive(Debug, Error)]
pub enum LayerError {
    /// Tile URL template is missing a required placeholder.
    #[error("Invalid tile URL template '{template}': {reason}")]
    InvalidTemplate { template: String, reason: String },

    /// Tile size is not a supported power of two.
    #[error("Invalid tile size: {0} (must be a power of two between 64 and 4096)")]
    InvalidTileSize(u32),

    /// Minimum zoom is above maximum zoom, or out of range.
    #[error("Invalid zoom range: {min}..={max}")]
    InvalidZoomRange { min: u8, max: u8 },

    /// Layer options could not be parsed.
    #[error("Invalid layer configuration: {0}")]
    InvalidConfig(#[from] serde_json::Error),

    /// The HTTP client could not be created.
    #[error("Failed to create HTTP client: {0}")]
    HttpClient(String),

    /// `on_add` was called on a layer that is already attached.
    #[error("Layer '{0}' is already added to a map")]
    AlreadyAdded(String),
}
