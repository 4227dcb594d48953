//! Themed PNG rendering.

use std::io::Cursor;
use std::path::Path;

use ab_glyph::{FontVec, PxScale};
use image::{DynamicImage, ImageFormat, Pixel, Rgba, RgbaImage};
use imageproc::drawing::{draw_text_mut, text_size};
use tracing::{debug, warn};

use super::layout::{layout_poem, IMAGE_WRAP_WIDTH};
use super::{DECORATION_IMAGE, TITLE};
use crate::background::Background;
use crate::themes::Theme;
use crate::{Error, Result};

pub const CANVAS_WIDTH: u32 = 1080;
pub const CANVAS_HEIGHT: u32 = 1350;

/// Semi-transparent white laid over every background.
const OVERLAY: Rgba<u8> = Rgba([255, 255, 255, 170]);

const TITLE_TOP: i32 = 110;
const TITLE_SIZE: f32 = 60.0;
const DECORATION_TOP: i32 = 200;
const DECORATION_SIZE: f32 = 40.0;
const BODY_TOP: i32 = 300;
const BODY_SIZE: f32 = 36.0;
const LINE_HEIGHT: u32 = 52;
const FOOTER_GAP: i32 = 40;
const FOOTER_SIZE: f32 = 30.0;

/// Fonts tried when a theme's own font files are missing.
const SYSTEM_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/Library/Fonts/Arial Unicode.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Title and body faces for one render; either may be missing.
pub struct ThemeFonts {
    pub title: Option<FontVec>,
    pub body: Option<FontVec>,
}

impl ThemeFonts {
    /// Load the theme's fonts from `{assets_dir}/fonts`, falling back to
    /// system fonts.
    pub fn load(assets_dir: &Path, theme: &Theme) -> Self {
        Self {
            title: load_font(assets_dir, theme.title_font),
            body: load_font(assets_dir, theme.body_font),
        }
    }
}

fn load_font(assets_dir: &Path, file: &str) -> Option<FontVec> {
    let themed = assets_dir.join("fonts").join(file);
    let candidates = std::iter::once(themed.as_path()).chain(SYSTEM_FONTS.iter().map(Path::new));

    for path in candidates {
        let Ok(bytes) = std::fs::read(path) else {
            continue;
        };
        match FontVec::try_from_vec(bytes) {
            Ok(font) => {
                debug!(font = %path.display(), "Loaded font");
                return Some(font);
            }
            Err(e) => warn!(font = %path.display(), error = %e, "Unreadable font file"),
        }
    }

    warn!(font = file, "No usable font found");
    None
}

fn rgba([r, g, b]: [u8; 3]) -> Rgba<u8> {
    Rgba([r, g, b, 255])
}

fn draw_centered(canvas: &mut RgbaImage, text: &str, top: i32, size: f32, color: Rgba<u8>, font: &FontVec) {
    let scale = PxScale::from(size);
    let (width, _) = text_size(scale, font, text);
    let x = ((CANVAS_WIDTH as i32 - width as i32) / 2).max(0);
    draw_text_mut(canvas, color, x, top, scale, font, text);
}

/// Render `poem` over `background` in the theme's colors.
pub fn render_png(poem: &str, theme: &Theme, background: &Background, fonts: &ThemeFonts) -> Result<Vec<u8>> {
    let mut canvas = background.to_canvas(CANVAS_WIDTH, CANVAS_HEIGHT);
    for pixel in canvas.pixels_mut() {
        pixel.blend(&OVERLAY);
    }

    let title_font = fonts.title.as_ref().or(fonts.body.as_ref());
    let body_font = fonts.body.as_ref().or(fonts.title.as_ref());

    match (title_font, body_font) {
        (Some(title_font), Some(body_font)) => {
            let accent = rgba(theme.accent_color);
            let text = rgba(theme.text_color);

            draw_centered(&mut canvas, TITLE, TITLE_TOP, TITLE_SIZE, accent, title_font);
            draw_centered(&mut canvas, DECORATION_IMAGE, DECORATION_TOP, DECORATION_SIZE, accent, body_font);

            let layout = layout_poem(poem, IMAGE_WRAP_WIDTH, LINE_HEIGHT);
            for line in &layout.lines {
                draw_centered(&mut canvas, &line.text, BODY_TOP + line.offset as i32, BODY_SIZE, text, body_font);
            }

            let footer_top = BODY_TOP + layout.height as i32 + FOOTER_GAP;
            draw_centered(&mut canvas, theme.footer, footer_top, FOOTER_SIZE, accent, title_font);
        }
        _ => warn!(theme = theme.name, "Rendering image without text, no fonts available"),
    }

    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(canvas)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|e| Error::Render(format!("Failed to encode PNG: {}", e)))?;

    Ok(bytes)
}
