//! Poem artifacts: PDF documents and themed PNG images.

pub mod layout;
pub mod pdf;
pub mod raster;

use std::path::PathBuf;
use std::str::FromStr;

use tracing::info;

use crate::background::BackgroundResolver;
use crate::themes::Theme;
use crate::{Config, Error, Result};

pub const TITLE: &str = "Your AI-Generated Valentine's Gift";
/// Built-in PDF fonts only cover WinAnsi, so the PDF row stays ASCII.
pub const DECORATION_PDF: &str = "~ * ~ * ~";
pub const DECORATION_IMAGE: &str = "\u{2665}  \u{2665}  \u{2665}";

/// Artifact file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactFormat {
    Pdf,
    Png,
}

impl ArtifactFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ArtifactFormat::Pdf => "pdf",
            ArtifactFormat::Png => "png",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ArtifactFormat::Pdf => "application/pdf",
            ArtifactFormat::Png => "image/png",
        }
    }
}

impl FromStr for ArtifactFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pdf" => Ok(ArtifactFormat::Pdf),
            "png" => Ok(ArtifactFormat::Png),
            other => Err(Error::UnsupportedFormat(other.to_string())),
        }
    }
}

/// A rendered poem, alive for one request.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub text: String,
    pub format: ArtifactFormat,
    pub theme: &'static str,
    pub bytes: Vec<u8>,
}

impl Artifact {
    pub fn content_type(&self) -> &'static str {
        self.format.content_type()
    }

    /// Suggested download name.
    pub fn filename(&self) -> String {
        format!("valentine_poem_{}.{}", self.theme, self.format.extension())
    }
}

/// Turns poem text into artifacts.
pub struct Renderer {
    backgrounds: BackgroundResolver,
    assets_dir: PathBuf,
    site_url: String,
}

impl Renderer {
    pub fn new(backgrounds: BackgroundResolver, assets_dir: PathBuf, site_url: String) -> Self {
        Self {
            backgrounds,
            assets_dir,
            site_url,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            BackgroundResolver::from_config(config),
            config.assets_dir.clone(),
            config.site_url.clone(),
        )
    }

    pub async fn render(&self, poem: &str, format: ArtifactFormat, theme: &'static Theme) -> Result<Artifact> {
        let bytes = match format {
            ArtifactFormat::Pdf => pdf::render_pdf(poem, theme, &self.site_url)?,
            ArtifactFormat::Png => {
                let background = self.backgrounds.resolve(theme).await;
                let fonts = raster::ThemeFonts::load(&self.assets_dir, theme);
                raster::render_png(poem, theme, &background, &fonts)?
            }
        };

        info!(
            format = format.extension(),
            theme = theme.name,
            bytes = bytes.len(),
            "Artifact rendered"
        );

        Ok(Artifact {
            text: poem.to_string(),
            format,
            theme: theme.name,
            bytes,
        })
    }
}
