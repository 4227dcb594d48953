//! Background images for themed PNG rendering.
//!
//! [`BackgroundResolver::resolve`] always yields something drawable: a
//! searched photo, a bundled file, or a solid fill in the theme's color.

use std::path::PathBuf;
use std::time::Duration;

use image::imageops::FilterType;
use image::{DynamicImage, Rgba, RgbaImage};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::BackgroundMode;
use crate::themes::Theme;
use crate::{Config, Error, Result};

/// A resolved background.
#[derive(Debug, Clone)]
pub enum Background {
    Photo(DynamicImage),
    Solid([u8; 3]),
}

impl Background {
    /// Scale and crop to exactly `width` x `height`.
    pub fn to_canvas(&self, width: u32, height: u32) -> RgbaImage {
        match self {
            Background::Photo(photo) => photo
                .resize_to_fill(width, height, FilterType::Triangle)
                .to_rgba8(),
            Background::Solid([r, g, b]) => RgbaImage::from_pixel(width, height, Rgba([*r, *g, *b, 255])),
        }
    }

    pub fn is_photo(&self) -> bool {
        matches!(self, Background::Photo(_))
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchPhoto>,
}

#[derive(Debug, Deserialize)]
struct SearchPhoto {
    urls: PhotoUrls,
}

#[derive(Debug, Deserialize)]
struct PhotoUrls {
    regular: String,
}

pub struct BackgroundResolver {
    mode: BackgroundMode,
    client: reqwest::Client,
    access_key: Option<String>,
    api_url: String,
    assets_dir: PathBuf,
}

impl BackgroundResolver {
    pub fn new(
        mode: BackgroundMode,
        access_key: Option<String>,
        api_url: String,
        assets_dir: PathBuf,
        timeout: Duration,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                warn!(error = %e, "Failed to build photo client with timeout, using defaults");
                reqwest::Client::new()
            });

        Self {
            mode,
            client,
            access_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            assets_dir,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.background_mode,
            config.unsplash_access_key.clone(),
            config.unsplash_api_url.clone(),
            config.assets_dir.clone(),
            config.background_timeout,
        )
    }

    /// Pick a background for `theme`; never fails.
    pub async fn resolve(&self, theme: &Theme) -> Background {
        if self.mode == BackgroundMode::Remote {
            match &self.access_key {
                Some(key) => match self.fetch_remote(theme, key).await {
                    Ok(photo) => return Background::Photo(photo),
                    Err(e) => warn!(theme = theme.name, error = %e, "Photo search failed"),
                },
                None => debug!("UNSPLASH_ACCESS_KEY not set, using bundled backgrounds"),
            }
        }

        match self.load_bundled(theme).await {
            Ok(photo) => Background::Photo(photo),
            Err(e) => {
                warn!(theme = theme.name, error = %e, "Bundled background unavailable, using solid color");
                Background::Solid(theme.fallback_color)
            }
        }
    }

    async fn fetch_remote(&self, theme: &Theme, access_key: &str) -> Result<DynamicImage> {
        let url = reqwest::Url::parse_with_params(
            &format!("{}/search/photos", self.api_url),
            &[
                ("query", theme.search_query),
                ("per_page", "1"),
                ("orientation", "portrait"),
            ],
        )
        .map_err(|e| Error::Config(format!("Invalid photo search URL: {}", e)))?;

        let response = self
            .client
            .get(url)
            .header("authorization", format!("Client-ID {}", access_key))
            .header("accept-version", "v1")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Dependency(format!(
                "Photo search returned {}",
                response.status()
            )));
        }

        let search: SearchResponse = response.json().await?;
        let photo_url = search
            .results
            .into_iter()
            .next()
            .map(|photo| photo.urls.regular)
            .ok_or_else(|| Error::Dependency(format!("No photos for '{}'", theme.search_query)))?;

        let bytes = self
            .client
            .get(&photo_url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        image::load_from_memory(&bytes)
            .map_err(|e| Error::Dependency(format!("Undecodable photo: {}", e)))
    }

    async fn load_bundled(&self, theme: &Theme) -> Result<DynamicImage> {
        let path = self.assets_dir.join("backgrounds").join(theme.background_file);
        let bytes = tokio::fs::read(&path).await?;
        image::load_from_memory(&bytes)
            .map_err(|e| Error::Render(format!("Undecodable background {}: {}", path.display(), e)))
    }
}
