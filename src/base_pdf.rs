//! Base Document Resolver
//!
//! Turns a template's base document into a PDF data-URI, fetching it over
//! the network only when it is a plain reference and a fetcher is available.
//! Nothing is cached; every call re-fetches.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use std::sync::Arc;
use tracing::{debug, info};

use crate::codec::{blob_to_base64_pdf, Blob};
use crate::config::FetchConfig;
use crate::error::AssetError;
use crate::template::BasePdf;

/// Retrieves a referenced resource as a blob.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Blob, AssetError>;
}

pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self, AssetError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(AssetError::HttpClient)?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Blob, AssetError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AssetError::network(url, e))?;

        let media_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let data = response
            .bytes()
            .await
            .map_err(|e| AssetError::network(url, e))?;

        debug!(url, media_type = %media_type, bytes = data.len(), "fetched base document");
        Ok(Blob::new(&media_type, data))
    }
}

/// Whether resolving `base_pdf` requires a fetch.
pub fn needs_fetch(base_pdf: &BasePdf) -> bool {
    matches!(base_pdf, BasePdf::Url(_))
}

/// Fetches and encodes a URL reference when `fetcher` is present; returns
/// every other form unchanged.
pub async fn resolve_base_pdf(
    base_pdf: &BasePdf,
    fetcher: Option<&dyn Fetcher>,
) -> Result<BasePdf, AssetError> {
    match (base_pdf, fetcher) {
        (BasePdf::Url(url), Some(fetcher)) => {
            info!(url = %url, "fetching base document");
            let blob = fetcher.fetch(url).await?;
            Ok(BasePdf::DataUri(blob_to_base64_pdf(&blob).await?))
        }
        _ => Ok(base_pdf.clone()),
    }
}

/// Resolver bound to an optional shared fetcher.
#[derive(Clone, Default)]
pub struct BasePdfResolver {
    fetcher: Option<Arc<dyn Fetcher>>,
}

impl BasePdfResolver {
    /// No network access; references pass through unchanged.
    pub fn offline() -> Self {
        Self { fetcher: None }
    }

    pub fn with_fetcher(fetcher: Arc<dyn Fetcher>) -> Self {
        Self { fetcher: Some(fetcher) }
    }

    pub fn from_config(config: &FetchConfig) -> Result<Self, AssetError> {
        if !config.enabled {
            return Ok(Self::offline());
        }
        Ok(Self::with_fetcher(Arc::new(HttpFetcher::new(config)?)))
    }

    pub fn is_online(&self) -> bool {
        self.fetcher.is_some()
    }

    pub async fn resolve(&self, base_pdf: &BasePdf) -> Result<BasePdf, AssetError> {
        resolve_base_pdf(base_pdf, self.fetcher.as_deref()).await
    }
}
