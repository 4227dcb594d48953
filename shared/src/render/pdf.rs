//! Single-page US Letter PDF using the built-in Helvetica faces.

use printpdf::{BuiltinFont, Color, IndirectFontRef, Mm, PdfDocument, PdfLayerReference, Rgb};

use super::layout::{layout_poem, PDF_WRAP_WIDTH};
use super::{DECORATION_PDF, TITLE};
use crate::themes::Theme;
use crate::{Error, Result};

const PAGE_WIDTH_PT: f32 = 612.0;
const PAGE_HEIGHT_PT: f32 = 792.0;

const TITLE_X: f32 = 50.0;
const TITLE_Y: f32 = 750.0;
const DECORATION_Y: f32 = 730.0;
const BODY_X: f32 = 100.0;
const BODY_TOP: f32 = 700.0;
const LINE_HEIGHT: u32 = 20;
const FOOTER_GAP: f32 = 20.0;
const LINK_GAP: f32 = 30.0;

/// Points to millimetres.
fn pt(value: f32) -> Mm {
    Mm(value * 25.4 / 72.0)
}

fn color([r, g, b]: [u8; 3]) -> Color {
    Color::Rgb(Rgb::new(
        f32::from(r) / 255.0,
        f32::from(g) / 255.0,
        f32::from(b) / 255.0,
        None,
    ))
}

fn font_error(e: printpdf::Error) -> Error {
    Error::Render(format!("Failed to load PDF font: {:?}", e))
}

fn draw(layer: &PdfLayerReference, text: &str, size: f32, x: f32, y: f32, font: &IndirectFontRef) {
    layer.use_text(text, size, pt(x), pt(y), font);
}

/// Render `poem` onto one PDF page styled with `theme`.
pub fn render_pdf(poem: &str, theme: &Theme, site_url: &str) -> Result<Vec<u8>> {
    let (doc, page, layer) = PdfDocument::new(TITLE, pt(PAGE_WIDTH_PT), pt(PAGE_HEIGHT_PT), "Poem");

    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(font_error)?;
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(font_error)?;
    let oblique = doc
        .add_builtin_font(BuiltinFont::HelveticaOblique)
        .map_err(font_error)?;

    let layer = doc.get_page(page).get_layer(layer);

    layer.set_fill_color(color(theme.accent_color));
    draw(&layer, TITLE, 18.0, TITLE_X, TITLE_Y, &bold);
    draw(&layer, DECORATION_PDF, 12.0, TITLE_X, DECORATION_Y, &regular);

    layer.set_fill_color(color(theme.text_color));
    let layout = layout_poem(poem, PDF_WRAP_WIDTH, LINE_HEIGHT);
    for line in &layout.lines {
        draw(&layer, &line.text, 11.0, BODY_X, BODY_TOP - line.offset as f32, &regular);
    }

    let footer_y = BODY_TOP - layout.height as f32 - FOOTER_GAP;
    draw(&layer, theme.footer, 10.0, BODY_X, footer_y, &oblique);
    draw(
        &layer,
        &format!("Created at: {}", site_url),
        8.0,
        BODY_X,
        footer_y - LINK_GAP,
        &oblique,
    );

    doc.save_to_bytes()
        .map_err(|e| Error::Render(format!("Failed to write PDF: {:?}", e)))
}
