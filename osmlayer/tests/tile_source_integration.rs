//! Integration tests for the tile source and raster layer.
//!
//! These tests drive the full flow over the public API:
//! - viewport → cover → HTTP load requests
//! - decoded textures → Loaded entries → drawn quads
//! - HTTP failures → Failed entries that are never retried
//!
//! Run with: `cargo test --test tile_source_integration`

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use futures::future::BoxFuture;
use glam::DMat4;
use image::{Rgba, RgbaImage};
use tokio::runtime::Handle;

use osmlayer::{
    AsyncHttpClient, CameraProjection, CustomLayer, HttpTileLoader, LayerOptions, LoadError,
    LoadState, MapHost, MercatorPoint, RasterTileLayer, TileImage, TileKey, TileRenderer,
    TileSource, Viewport,
};

// ============================================================================
// Helper Types
// ============================================================================

/// Serves a PNG for every registered URL and 404 for the rest.
#[derive(Default)]
struct TileServer {
    tiles: HashMap<String, Vec<u8>>,
    requests: Mutex<Vec<String>>,
}

impl TileServer {
    fn with_tile(mut self, url: &str, color: [u8; 4]) -> Self {
        let image = RgbaImage::from_pixel(256, 256, Rgba(color));
        let mut body = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut body), image::ImageFormat::Png)
            .unwrap();
        self.tiles.insert(url.to_string(), body);
        self
    }
}

#[derive(Clone, Default)]
struct SharedServer(Arc<TileServer>);

impl SharedServer {
    fn new(server: TileServer) -> Self {
        Self(Arc::new(server))
    }

    fn requests(&self) -> Vec<String> {
        self.0.requests.lock().unwrap().clone()
    }
}

impl AsyncHttpClient for SharedServer {
    fn get<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Bytes, LoadError>> {
        self.0.requests.lock().unwrap().push(url.to_string());
        let response = match self.0.tiles.get(url) {
            Some(body) => Ok(Bytes::from(body.clone())),
            None => Err(LoadError::Status {
                status: 404,
                url: url.to_string(),
            }),
        };
        Box::pin(async move { response })
    }
}

struct TestHost {
    viewport: Mutex<Viewport>,
    repaints: AtomicUsize,
}

impl TestHost {
    fn new(viewport: Viewport) -> Arc<Self> {
        Arc::new(Self {
            viewport: Mutex::new(viewport),
            repaints: AtomicUsize::new(0),
        })
    }

    fn set_viewport(&self, viewport: Viewport) {
        *self.viewport.lock().unwrap() = viewport;
    }
}

impl MapHost for TestHost {
    fn viewport(&self) -> Viewport {
        *self.viewport.lock().unwrap()
    }

    fn camera(&self) -> CameraProjection {
        CameraProjection::new(DMat4::IDENTITY, self.viewport().zoom)
    }

    fn trigger_repaint(&self) {
        self.repaints.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
struct PixelRenderer {
    drawn: Vec<Rgba<u8>>,
}

impl TileRenderer<Arc<TileImage>> for PixelRenderer {
    fn draw_tile(&mut self, texture: &Arc<TileImage>, _matrix: &DMat4) {
        self.drawn.push(*texture.get_pixel(0, 0));
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

const TEMPLATE: &str = "https://tiles.test/{z}/{x}/{y}.png";

/// Viewport over a rectangle given in tile units at tile zoom `z`.
fn viewport(zoom: f64, z: u8, x0: f64, y0: f64, x1: f64, y1: f64) -> Viewport {
    let n = f64::from(1u32 << z);
    let corner = |x: f64, y: f64| MercatorPoint::new(x / n, y / n).to_lng_lat();
    Viewport::new(
        zoom,
        [corner(x0, y0), corner(x1, y0), corner(x1, y1), corner(x0, y1)],
    )
}

fn loader(server: &SharedServer, options: &LayerOptions) -> HttpTileLoader<SharedServer> {
    HttpTileLoader::new(
        server.clone(),
        options.url_template().unwrap(),
        Handle::current(),
        options.max_concurrent_requests,
    )
}

async fn wait_for(source: &mut TileSource<HttpTileLoader<SharedServer>>, outcomes: usize) {
    for _ in 0..outcomes {
        tokio::time::timeout(Duration::from_secs(5), source.wait_for_completion())
            .await
            .expect("load outcome not delivered");
    }
}

// ============================================================================
// Integration Tests
// ============================================================================

/// Two visible tiles load and both end up Loaded with their pixels.
#[tokio::test]
async fn test_visible_tiles_load_over_http() {
    let server = SharedServer::new(
        TileServer::default()
            .with_tile("https://tiles.test/2/1/1.png", [255, 0, 0, 255])
            .with_tile("https://tiles.test/2/2/1.png", [0, 255, 0, 255]),
    );
    let options = LayerOptions::new("osm", TEMPLATE);
    let host = TestHost::new(viewport(2.5, 2, 1.2, 1.2, 2.8, 1.8));
    let mut source = TileSource::new(options.clone(), host.clone(), loader(&server, &options));

    assert_eq!(source.on_viewport_changed(), 2);
    wait_for(&mut source, 2).await;

    let a = source.entry(&TileKey { zoom: 2, x: 1, y: 1 }).unwrap();
    assert_eq!(a.texture().unwrap().get_pixel(0, 0), &Rgba([255, 0, 0, 255]));
    assert_eq!(source.count_in_state(LoadState::Loaded), 2);
    assert_eq!(host.repaints.load(Ordering::SeqCst), 2);
}

/// A 404 leaves a Failed entry that is not requested again.
#[tokio::test]
async fn test_missing_tile_fails_once() {
    let server = SharedServer::new(TileServer::default());
    let options = LayerOptions::new("osm", TEMPLATE);
    let host = TestHost::new(viewport(3.5, 3, 0.2, 0.2, 0.8, 0.8));
    let mut source = TileSource::new(options.clone(), host.clone(), loader(&server, &options));

    assert_eq!(source.on_viewport_changed(), 1);
    wait_for(&mut source, 1).await;

    let key = TileKey { zoom: 3, x: 0, y: 0 };
    let error = source.entry(&key).and_then(|e| e.error()).cloned();
    assert!(matches!(error, Some(LoadError::Status { status: 404, .. })));

    assert_eq!(source.on_viewport_changed(), 0);
    assert_eq!(server.requests(), vec!["https://tiles.test/3/0/0.png"]);
    assert_eq!(host.repaints.load(Ordering::SeqCst), 1);
}

/// Panning back over already covered tiles issues no new downloads.
#[tokio::test]
async fn test_pan_and_return_reuses_cache() {
    let server = SharedServer::new(
        TileServer::default()
            .with_tile("https://tiles.test/4/5/5.png", [1, 1, 1, 255])
            .with_tile("https://tiles.test/4/9/5.png", [2, 2, 2, 255]),
    );
    let options = LayerOptions::new("osm", TEMPLATE);
    let home = viewport(4.2, 4, 5.2, 5.2, 5.8, 5.8);
    let host = TestHost::new(home);
    let mut source = TileSource::new(options.clone(), host.clone(), loader(&server, &options));

    source.on_viewport_changed();
    host.set_viewport(viewport(4.2, 4, 9.2, 5.2, 9.8, 5.8));
    source.on_viewport_changed();
    host.set_viewport(home);
    assert_eq!(source.on_viewport_changed(), 0);

    wait_for(&mut source, 2).await;
    assert_eq!(server.requests().len(), 2);
    assert_eq!(source.cached_len(), 2);
    assert_eq!(source.stats().in_flight(), 0);
}

/// Subdomains rotate by tile position.
#[tokio::test]
async fn test_subdomain_rotation() {
    let server = SharedServer::new(TileServer::default());
    let options = LayerOptions::new("osm", "https://{s}.tiles.test/{z}/{x}/{y}.png")
        .with_subdomains(["a", "b"]);
    let host = TestHost::new(viewport(2.5, 2, 1.2, 1.2, 2.8, 1.8));
    let mut source = TileSource::new(options.clone(), host, loader(&server, &options));

    source.on_viewport_changed();
    wait_for(&mut source, 2).await;

    let mut requests = server.requests();
    requests.sort();
    assert_eq!(
        requests,
        vec![
            "https://a.tiles.test/2/1/1.png",
            "https://b.tiles.test/2/2/1.png",
        ]
    );
}

/// The layer draws loaded world copies and skips failed tiles.
#[tokio::test]
async fn test_layer_renders_loaded_tiles_only() {
    let server = SharedServer::new(
        TileServer::default().with_tile("https://tiles.test/1/0/0.png", [9, 9, 9, 255]),
    );
    let options = LayerOptions::from_json(
        r#"{ "id": "base", "tileUrlTemplate": "https://tiles.test/{z}/{x}/{y}.png" }"#,
    )
    .unwrap();
    let host = TestHost::new(viewport(1.3, 1, 0.2, 0.2, 1.8, 0.8));
    let mut layer = RasterTileLayer::new(options.clone(), loader(&server, &options)).unwrap();
    let mut gpu = PixelRenderer::default();
    layer.on_add(host.clone(), &mut gpu).unwrap();

    let camera = host.camera();
    for _ in 0..500 {
        layer.prerender(&mut gpu, &camera);
        if layer.stats().unwrap().in_flight() == 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    let stats = layer.stats().unwrap();
    assert_eq!(stats.tiles_loaded, 1);
    assert_eq!(stats.tiles_failed, 1);

    layer.render(&mut gpu, &camera);
    assert_eq!(gpu.drawn, vec![Rgba([9, 9, 9, 255])]);

    layer.on_remove(&mut gpu);
    assert!(!layer.is_added());
}
