use std::fs;
use std::path::Path;

use image::{Rgba, RgbaImage};
use rusttype::{Font, Scale, point};

use super::draw;

/// DejaVu Sans, used unless another font is configured
static BUNDLED_FONT: &[u8] = include_bytes!("../../static/fonts/DejaVuSans.ttf");

pub fn bundled_font() -> Option<Font<'static>> {
    let font = Font::try_from_bytes(BUNDLED_FONT);
    if font.is_none() {
        log::error!("bundled font is not usable");
    }

    font
}

pub fn load_font(path: &Path) -> Option<Font<'static>> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) => {
            log::warn!("cannot read font {}: {err}", path.display());
            return None;
        }
    };

    let font = Font::try_from_vec(bytes);
    if font.is_none() {
        log::warn!("{} is not a usable font", path.display());
    }

    font
}

/// `configured` if it loads, the bundled font otherwise
pub fn find_font(configured: Option<&Path>) -> Option<Font<'static>> {
    if let Some(path) = configured {
        if let Some(font) = load_font(path) {
            log::info!("using font {}", path.display());
            return Some(font);
        }

        log::warn!("falling back to the bundled font");
    }

    bundled_font()
}

/// horizontal advance of `text`, in pixels
pub fn text_width(font: &Font, size: f32, text: &str) -> f32 {
    font.layout(text, Scale::uniform(size), point(0., 0.))
        .last()
        .map_or(0., |glyph| glyph.position().x + glyph.unpositioned().h_metrics().advance_width)
}

/// distance from the top of the line to the bottom of the lowest descender
pub fn line_height(font: &Font, size: f32) -> f32 {
    let metrics = font.v_metrics(Scale::uniform(size));
    metrics.ascent - metrics.descent
}

/// Draws `text` with the top of its line at `position`. Glyph coverage is alpha-blended and
/// anything outside the image is dropped.
#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)] // pixel coordinates
pub fn draw_text(
    image: &mut RgbaImage,
    font: &Font,
    size: f32,
    position: (i32, i32),
    text: &str,
    color: Rgba<u8>,
) {
    let scale = Scale::uniform(size);
    let ascent = font.v_metrics(scale).ascent;
    let origin = point(position.0 as f32, position.1 as f32 + ascent);
    let (width, height) = (i64::from(image.width()), i64::from(image.height()));

    for glyph in font.layout(text, scale, origin) {
        let Some(bounds) = glyph.pixel_bounding_box() else {
            continue;
        };

        glyph.draw(|x, y, coverage| {
            let x = i64::from(bounds.min.x) + i64::from(x);
            let y = i64::from(bounds.min.y) + i64::from(y);
            if x < 0 || y < 0 || x >= width || y >= height {
                return;
            }

            let mut color = color;
            color[3] = (f32::from(color[3]) * coverage).round() as u8;
            draw::blend_pixel(image.get_pixel_mut(x as u32, y as u32), color);
        });
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_missing_font() {
        assert!(load_font(Path::new("/nonexistent/font.ttf")).is_none());
        assert!(find_font(Some(Path::new("/nonexistent/font.ttf"))).is_some());
    }

    #[test]
    fn test_configured_font() {
        let root = Path::new(env!("CARGO_MANIFEST_DIR"));
        let path = root.join("static/fonts/DejaVuSans.ttf");
        assert!(load_font(&path).is_some());
        assert!(find_font(Some(&path)).is_some());
        assert!(load_font(&root.join("Cargo.toml")).is_none());
    }

    #[test]
    fn test_text_metrics() {
        let font = bundled_font().unwrap();

        assert!(text_width(&font, 18., "").abs() < f32::EPSILON);
        assert!(text_width(&font, 18., "10") > text_width(&font, 18., "1"));
        assert!(text_width(&font, 36., "10") > text_width(&font, 18., "10"));
        assert!(line_height(&font, 24.) > 0.);
    }

    #[test]
    fn test_draw_text() {
        let font = bundled_font().unwrap();
        let mut image = RgbaImage::from_pixel(40, 40, Rgba([255, 255, 255, 255]));
        draw_text(&mut image, &font, 24., (-5, 30), "88", Rgba([0, 0, 0, 255]));
        draw_text(&mut image, &font, 24., (4, 4), "8", Rgba([0, 0, 0, 255]));

        assert!(image.pixels().any(|pixel| pixel[0] < 128));
        assert_eq!(image.get_pixel(39, 0)[0], 255);
    }
}
