use crate::model::{IllustratedProduct, ProductDescriptor};
use crate::platforms::build_client;
use crate::InsightError;
use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.unsplash.com";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PhotoUrls {
    pub regular: Option<String>,
    pub small: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Photo {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub urls: PhotoUrls,
}

impl Photo {
    /// `regular` size, or `small` when the regular variant is missing
    pub fn preferred_url(&self) -> Option<&str> {
        self.urls
            .regular
            .as_deref()
            .or(self.urls.small.as_deref())
    }
}

/// Stock photo search
#[async_trait]
pub trait PhotoSearch: Send + Sync {
    async fn search(&self, query: &str, count: u32) -> Result<Vec<Photo>, InsightError>;
}

/// Image URLs for a keyword string. Search failures and empty results both
/// give an empty list.
pub async fn illustrate(search: &dyn PhotoSearch, keywords: &str, count: u32) -> Vec<String> {
    if keywords.trim().is_empty() || count == 0 {
        return Vec::new();
    }

    match search.search(keywords, count).await {
        Ok(photos) => {
            let urls: Vec<String> = photos
                .iter()
                .filter_map(|p| p.preferred_url().map(String::from))
                .collect();
            debug!("Found {} images for '{}'", urls.len(), keywords);
            urls
        }
        Err(e) => {
            warn!("Image search for '{}' failed: {}", keywords, e);
            Vec::new()
        }
    }
}

/// Illustrate each product in order. Without a photo search every product
/// gets an empty image list.
pub async fn illustrate_all(
    search: Option<&dyn PhotoSearch>,
    products: Vec<ProductDescriptor>,
    count: u32,
) -> Vec<IllustratedProduct> {
    let mut illustrated = Vec::with_capacity(products.len());
    for descriptor in products {
        let image_urls = match search {
            Some(search) => illustrate(search, &descriptor.image_keywords, count).await,
            None => Vec::new(),
        };
        illustrated.push(IllustratedProduct {
            descriptor,
            image_urls,
        });
    }
    illustrated
}

/// Unsplash `search/photos` client
pub struct UnsplashClient {
    client: Client,
    access_key: String,
    base_url: String,
}

impl UnsplashClient {
    pub fn new(
        access_key: String,
        base_url: Option<String>,
        timeout: Duration,
    ) -> Result<Self, InsightError> {
        Ok(Self {
            client: build_client(timeout)?,
            access_key,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        })
    }
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<Photo>,
}

#[async_trait]
impl PhotoSearch for UnsplashClient {
    async fn search(&self, query: &str, count: u32) -> Result<Vec<Photo>, InsightError> {
        let per_page = count.to_string();
        let response = self
            .client
            .get(format!("{}/search/photos", self.base_url))
            .header("Authorization", format!("Client-ID {}", self.access_key))
            .header("Accept-Version", "v1")
            .query(&[("query", query), ("per_page", per_page.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(InsightError::upstream(
                "unsplash",
                format!("search returned status {}", response.status()),
            ));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| InsightError::upstream("unsplash", e))?;
        Ok(body.results)
    }
}
