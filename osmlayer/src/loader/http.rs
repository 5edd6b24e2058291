//! HTTP tile loading.
//!
//! [`HttpTileLoader`] downloads tile images through an [`AsyncHttpClient`],
//! decodes them with the `image` crate off the async workers and hands the
//! RGBA pixels back as the tile's texture handle.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use futures::future::BoxFuture;
use image::imageops::FilterType;
use image::RgbaImage;
use tokio::runtime::Handle;
use tokio::sync::Semaphore;
use tracing::debug;

use super::{LoadCompletion, TileLoadRequest, TileLoader, UrlTemplate};
use crate::config::LayerOptions;
use crate::error::{LayerError, LoadError};

/// Decoded tile pixels.
pub type TileImage = RgbaImage;

/// Trait for async HTTP GET requests.
///
/// Abstracts the HTTP stack so loaders can be tested with a mock client.
pub trait AsyncHttpClient: Send + Sync + 'static {
    /// Performs an HTTP GET request, returning the response body.
    fn get<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Bytes, LoadError>>;
}

/// Real HTTP client implementation using reqwest.
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    /// Creates a client with the given timeout and User-Agent.
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, LayerError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| LayerError::HttpClient(e.to_string()))?;

        Ok(Self { client })
    }

    /// Creates a client configured from layer options.
    pub fn from_options(options: &LayerOptions) -> Result<Self, LayerError> {
        Self::new(options.request_timeout(), &options.user_agent)
    }
}

impl AsyncHttpClient for ReqwestClient {
    fn get<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Bytes, LoadError>> {
        Box::pin(async move {
            let response = self
                .client
                .get(url)
                .send()
                .await
                .map_err(|e| LoadError::Http(format!("Request failed: {}", e)))?;

            let status = response.status();
            if !status.is_success() {
                return Err(LoadError::Status {
                    status: status.as_u16(),
                    url: url.to_string(),
                });
            }

            response
                .bytes()
                .await
                .map_err(|e| LoadError::Http(format!("Failed to read response: {}", e)))
        })
    }
}

/// Loads tiles from a URL template over HTTP.
///
/// Requests run as tasks on the given tokio runtime; at most
/// `max_concurrent_requests` downloads are in flight, the rest wait for a
/// permit. Decoding runs on the blocking pool.
pub struct HttpTileLoader<C: AsyncHttpClient = ReqwestClient> {
    client: Arc<C>,
    template: UrlTemplate,
    runtime: Handle,
    permits: Arc<Semaphore>,
}

impl HttpTileLoader<ReqwestClient> {
    /// Creates a reqwest-backed loader from layer options.
    pub fn from_options(options: &LayerOptions, runtime: Handle) -> Result<Self, LayerError> {
        let client = ReqwestClient::from_options(options)?;
        Ok(Self::new(
            client,
            options.url_template()?,
            runtime,
            options.max_concurrent_requests,
        ))
    }
}

impl<C: AsyncHttpClient> HttpTileLoader<C> {
    /// Creates a loader around any HTTP client.
    ///
    /// # Arguments
    ///
    /// * `client` - HTTP client used for every download
    /// * `template` - URL template tiles are fetched from
    /// * `runtime` - Tokio runtime the downloads are spawned on
    /// * `max_concurrent_requests` - In-flight download cap (at least 1)
    pub fn new(
        client: C,
        template: UrlTemplate,
        runtime: Handle,
        max_concurrent_requests: usize,
    ) -> Self {
        Self {
            client: Arc::new(client),
            template,
            runtime,
            permits: Arc::new(Semaphore::new(max_concurrent_requests.max(1))),
        }
    }

    /// The URL template tiles are fetched from.
    pub fn template(&self) -> &UrlTemplate {
        &self.template
    }
}

impl<C: AsyncHttpClient> TileLoader for HttpTileLoader<C> {
    type Texture = Arc<TileImage>;

    fn load_tile(&self, request: TileLoadRequest, completion: LoadCompletion<Self::Texture>) {
        let url = self.template.expand(&request.coord);
        let client = Arc::clone(&self.client);
        let permits = Arc::clone(&self.permits);

        debug!(key = %request.coord.key(), url = %url, "Requesting tile");

        self.runtime.spawn(async move {
            let result = fetch_tile(client.as_ref(), &url, request.tile_size, &permits).await;
            completion.complete(result.map(Arc::new));
        });
    }
}

async fn fetch_tile<C: AsyncHttpClient>(
    client: &C,
    url: &str,
    tile_size: u32,
    permits: &Semaphore,
) -> Result<TileImage, LoadError> {
    let body = {
        let _permit = permits.acquire().await.map_err(|_| LoadError::Abandoned)?;
        client.get(url).await?
    };

    tokio::task::spawn_blocking(move || decode_tile(&body, tile_size))
        .await
        .map_err(|e| LoadError::Decode(format!("Decode task failed: {}", e)))?
}

/// Decodes an encoded tile image into RGBA pixels of `tile_size`².
///
/// # Arguments
///
/// * `body` - Encoded image bytes (any format the `image` crate reads)
/// * `tile_size` - Edge length of the returned image
///
/// # Returns
///
/// The pixels, resampled when the server image has another size, or
/// `LoadError::Decode` if the bytes are not an image.
pub fn decode_tile(body: &[u8], tile_size: u32) -> Result<TileImage, LoadError> {
    let image = image::load_from_memory(body).map_err(|e| LoadError::Decode(e.to_string()))?;
    let rgba = image.to_rgba8();

    if rgba.width() == tile_size && rgba.height() == tile_size {
        return Ok(rgba);
    }

    debug!(
        width = rgba.width(),
        height = rgba.height(),
        tile_size,
        "Resampling tile to layer tile size"
    );
    Ok(image::imageops::resize(
        &rgba,
        tile_size,
        tile_size,
        FilterType::Triangle,
    ))
}
