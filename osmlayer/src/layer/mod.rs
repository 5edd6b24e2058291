//! Raster tile layer for the host's custom-layer protocol.
//!
//! The host drives a layer through [`CustomLayer`]:
//!
//! 1. `on_add` once, with the host handle
//! 2. `on_viewport_changed` on every move or zoom
//! 3. `prerender` then `render` every frame
//! 4. `on_remove` once
//!
//! `prerender` is the only per-frame mutation point: it applies load outcomes
//! delivered since the last frame. `render` only reads the cache.

use std::sync::Arc;

use glam::DMat4;
use tracing::{info, trace};

use crate::config::LayerOptions;
use crate::error::LayerError;
use crate::host::MapHost;
use crate::loader::TileLoader;
use crate::projection::{self, CameraProjection};
use crate::tile::{TileSource, TileSourceStats};

/// GPU seam: draws one textured unit quad.
pub trait TileRenderer<T> {
    /// Draw `texture` on the unit quad transformed by `matrix`.
    fn draw_tile(&mut self, texture: &T, matrix: &DMat4);

    /// Called once when a layer using this renderer is added.
    fn on_layer_added(&mut self, _layer_id: &str) {}

    /// Called once when a layer using this renderer is removed.
    fn on_layer_removed(&mut self, _layer_id: &str) {}
}

/// The host's custom-layer protocol.
///
/// `G` is the host's GPU context.
pub trait CustomLayer<G: ?Sized> {
    fn id(&self) -> &str;

    fn on_add(&mut self, host: Arc<dyn MapHost>, gpu: &mut G) -> Result<(), LayerError>;

    fn prerender(&mut self, gpu: &mut G, camera: &CameraProjection);

    fn render(&self, gpu: &mut G, camera: &CameraProjection);

    fn on_remove(&mut self, gpu: &mut G);
}

/// Draws a slippy-map tile mosaic under the host's other layers.
pub struct RasterTileLayer<L: TileLoader> {
    options: LayerOptions,
    loader: Option<L>,
    source: Option<TileSource<L>>,
}

impl<L: TileLoader> RasterTileLayer<L> {
    /// Create a layer that is not yet added to a host.
    pub fn new(options: LayerOptions, loader: L) -> Result<Self, LayerError> {
        options.validate()?;
        Ok(Self {
            options,
            loader: Some(loader),
            source: None,
        })
    }

    pub fn options(&self) -> &LayerOptions {
        &self.options
    }

    /// Whether the layer is currently added to a host.
    pub fn is_added(&self) -> bool {
        self.source.is_some()
    }

    /// The tile source, while added.
    pub fn source(&self) -> Option<&TileSource<L>> {
        self.source.as_ref()
    }

    pub fn stats(&self) -> Option<TileSourceStats> {
        self.source.as_ref().map(TileSource::stats)
    }

    /// Host move/zoom event. Returns the number of load requests issued.
    pub fn on_viewport_changed(&mut self) -> usize {
        self.source
            .as_mut()
            .map_or(0, TileSource::on_viewport_changed)
    }

    /// Draw every loaded visible tile, in cover order.
    ///
    /// Returns the number of quads drawn.
    pub fn draw<R>(&self, renderer: &mut R, camera: &CameraProjection) -> usize
    where
        R: TileRenderer<L::Texture> + ?Sized,
    {
        let Some(source) = &self.source else {
            return 0;
        };
        let tile_size = self.options.tile_size;

        let mut drawn = 0;
        for tile in source.visible_tiles() {
            let Some(texture) = tile.entry.texture() else {
                continue;
            };
            let matrix = source
                .host()
                .tile_matrix(&tile.coord)
                .unwrap_or_else(|| projection::tile_matrix(&tile.coord, tile_size, camera));
            renderer.draw_tile(texture, &matrix);
            drawn += 1;
        }

        trace!(layer = %self.options.id, drawn, "Rendered tiles");
        drawn
    }
}

impl<L, G> CustomLayer<G> for RasterTileLayer<L>
where
    L: TileLoader,
    G: TileRenderer<L::Texture> + ?Sized,
{
    fn id(&self) -> &str {
        &self.options.id
    }

    fn on_add(&mut self, host: Arc<dyn MapHost>, gpu: &mut G) -> Result<(), LayerError> {
        let Some(loader) = self.loader.take() else {
            return Err(LayerError::AlreadyAdded(self.options.id.clone()));
        };

        let mut source = TileSource::new(self.options.clone(), host, loader);
        let requested = source.on_viewport_changed();
        self.source = Some(source);
        gpu.on_layer_added(&self.options.id);

        info!(layer = %self.options.id, requested, "Raster tile layer added");
        Ok(())
    }

    fn prerender(&mut self, _gpu: &mut G, _camera: &CameraProjection) {
        if let Some(source) = self.source.as_mut() {
            source.process_completions();
        }
    }

    fn render(&self, gpu: &mut G, camera: &CameraProjection) {
        self.draw(gpu, camera);
    }

    fn on_remove(&mut self, gpu: &mut G) {
        let Some(source) = self.source.take() else {
            return;
        };
        let stats = source.stats();
        self.loader = Some(source.into_loader());
        gpu.on_layer_removed(&self.options.id);

        info!(layer = %self.options.id, %stats, "Raster tile layer removed");
    }
}
