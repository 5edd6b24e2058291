//! Layer configuration.
//!
//! [`LayerOptions`] is the application-facing constructor input for a raster
//! tile layer: `{ id, tileUrlTemplate, tileSize? }` plus loader and cache
//! tuning. It can be built in code or parsed from the JSON layer description
//! map styles use.

use std::time::Duration;

use serde::Deserialize;

use crate::coord::MAX_ZOOM;
use crate::error::LayerError;
use crate::loader::UrlTemplate;

/// Default tile edge length in pixels.
pub const DEFAULT_TILE_SIZE: u32 = 256;

/// Default maximum zoom (OpenStreetMap's standard tile server limit).
pub const DEFAULT_MAX_ZOOM: u8 = 19;

/// Default cap on simultaneous tile downloads.
pub const DEFAULT_MAX_CONCURRENT_REQUESTS: usize = 16;

/// Default HTTP request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default User-Agent sent to tile servers.
///
/// OpenStreetMap's tile usage policy requires an identifying agent.
pub const DEFAULT_USER_AGENT: &str = concat!("osmlayer/", env!("CARGO_PKG_VERSION"));

/// Configuration for a raster tile layer.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerOptions {
    /// Layer identifier, unique within the host map.
    pub id: String,

    /// Tile URL with `{z}`, `{x}`, `{y}` (or `{-y}`) and optional `{s}`.
    pub tile_url_template: String,

    /// Tile edge length in pixels.
    #[serde(default = "default_tile_size")]
    pub tile_size: u32,

    /// Lowest zoom tiles are requested at.
    #[serde(default)]
    pub min_zoom: u8,

    /// Highest zoom tiles are requested at; deeper camera zooms overscale.
    #[serde(default = "default_max_zoom")]
    pub max_zoom: u8,

    /// Values substituted for `{s}`.
    #[serde(default = "default_subdomains")]
    pub subdomains: Vec<String>,

    /// Draw every visible world copy instead of only the primary one.
    #[serde(default = "default_true")]
    pub render_world_copies: bool,

    /// Maximum number of tile downloads in flight.
    #[serde(default = "default_max_concurrent_requests")]
    pub max_concurrent_requests: usize,

    /// Cache bound in tiles; `None` keeps every tile ever loaded.
    #[serde(default)]
    pub max_cached_tiles: Option<usize>,

    /// HTTP request timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// User-Agent header for tile requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_tile_size() -> u32 {
    DEFAULT_TILE_SIZE
}

fn default_max_zoom() -> u8 {
    DEFAULT_MAX_ZOOM
}

fn default_subdomains() -> Vec<String> {
    vec!["a".to_string(), "b".to_string(), "c".to_string()]
}

fn default_true() -> bool {
    true
}

fn default_max_concurrent_requests() -> usize {
    DEFAULT_MAX_CONCURRENT_REQUESTS
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

impl LayerOptions {
    /// Create options with defaults for everything but the id and template.
    pub fn new(id: impl Into<String>, tile_url_template: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tile_url_template: tile_url_template.into(),
            tile_size: DEFAULT_TILE_SIZE,
            min_zoom: 0,
            max_zoom: DEFAULT_MAX_ZOOM,
            subdomains: default_subdomains(),
            render_world_copies: true,
            max_concurrent_requests: DEFAULT_MAX_CONCURRENT_REQUESTS,
            max_cached_tiles: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            user_agent: default_user_agent(),
        }
    }

    /// Parse options from a JSON layer description.
    pub fn from_json(json: &str) -> Result<Self, LayerError> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    /// Set the tile size.
    pub fn with_tile_size(mut self, tile_size: u32) -> Self {
        self.tile_size = tile_size;
        self
    }

    /// Set the zoom range tiles are requested in.
    pub fn with_zoom_range(mut self, min_zoom: u8, max_zoom: u8) -> Self {
        self.min_zoom = min_zoom;
        self.max_zoom = max_zoom;
        self
    }

    /// Set the `{s}` substitutions.
    pub fn with_subdomains<I, S>(mut self, subdomains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.subdomains = subdomains.into_iter().map(Into::into).collect();
        self
    }

    /// Enable or disable drawing of repeated world copies.
    pub fn with_world_copies(mut self, render_world_copies: bool) -> Self {
        self.render_world_copies = render_world_copies;
        self
    }

    /// Set the in-flight download cap.
    pub fn with_max_concurrent_requests(mut self, max: usize) -> Self {
        self.max_concurrent_requests = max;
        self
    }

    /// Bound the cache to `max` tiles.
    pub fn with_max_cached_tiles(mut self, max: usize) -> Self {
        self.max_cached_tiles = Some(max);
        self
    }

    /// Request timeout as a [`Duration`].
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Parse the URL template with this layer's subdomains.
    pub fn url_template(&self) -> Result<UrlTemplate, LayerError> {
        UrlTemplate::parse(&self.tile_url_template, self.subdomains.clone())
    }

    /// Check that the options describe a usable layer.
    pub fn validate(&self) -> Result<(), LayerError> {
        if !self.tile_size.is_power_of_two() || !(64..=4096).contains(&self.tile_size) {
            return Err(LayerError::InvalidTileSize(self.tile_size));
        }
        if self.min_zoom > self.max_zoom || self.max_zoom > MAX_ZOOM {
            return Err(LayerError::InvalidZoomRange {
                min: self.min_zoom,
                max: self.max_zoom,
            });
        }
        self.url_template()?;
        Ok(())
    }
}
