use std::fmt;

use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView, RgbImage, RgbaImage};
use rand::Rng;
use rusttype::Font;
use time::Date;

use self::decorations::{DropShadow, Engagement};
use self::layout::GridLayout;

pub mod decorations;
pub mod draw;
pub mod enhance;
pub mod layout;
pub mod normalize;
pub mod text;

/// largest canvas a collage may allocate, in pixels
pub const MAX_CANVAS_PIXELS: u64 = 1 << 28;
const SINGLE_SATURATION: f32 = 1.1;
const SINGLE_CONTRAST: f32 = 1.05;

#[derive(Debug, PartialEq, Eq)]
pub enum CollageError {
    NoImages,
    DegenerateImage(usize),
    DegenerateLayout { count: usize, max_width: u32 },
    CanvasTooLarge { width: u32, height: u32 },
}

impl fmt::Display for CollageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoImages => write!(f, "no images provided"),
            Self::DegenerateImage(index) => write!(f, "image {} has no pixels", index + 1),
            Self::DegenerateLayout { count, max_width } => {
                write!(f, "{count} images do not fit in a {max_width}px wide collage")
            }
            Self::CanvasTooLarge { width, height } => {
                write!(f, "a {width}x{height} collage is too large")
            }
        }
    }
}

impl std::error::Error for CollageError {}

/// inputs of the decorative layer that are not derived from the images
pub struct Style<'a> {
    pub font: &'a Font<'a>,
    pub date: Date,
}

/// Lays `images` out in a decorated grid, or frames a lone image. `rng` only feeds the
/// decorative engagement numbers.
pub fn build_collage<R: Rng + ?Sized>(
    images: &[DynamicImage],
    max_size: (u32, u32),
    style: &Style,
    rng: &mut R,
) -> Result<RgbImage, CollageError> {
    if images.is_empty() {
        return Err(CollageError::NoImages);
    }

    if let Some(index) = images.iter().position(|image| image.width() == 0 || image.height() == 0)
    {
        return Err(CollageError::DegenerateImage(index));
    }

    let canvas = match images {
        [image] => single(image, max_size)?,
        images => grid(images, max_size.0, style, rng)?,
    };

    Ok(DynamicImage::ImageRgba8(canvas).into_rgb8())
}

fn single(image: &DynamicImage, max_size: (u32, u32)) -> Result<RgbaImage, CollageError> {
    let (width, height) = layout::fit_within(image.dimensions(), max_size);
    let border = decorations::FRAME_WIDTH * 2;
    check_canvas(width.saturating_add(border), height.saturating_add(border))?;

    let mut image = image.to_rgba8();
    if (width, height) != image.dimensions() {
        log::debug!("shrinking {}x{} image to {width}x{height}", image.width(), image.height());
        image = imageops::resize(&image, width, height, FilterType::Lanczos3);
    }

    enhance::saturation(&mut image, SINGLE_SATURATION);
    enhance::contrast(&mut image, SINGLE_CONTRAST);

    Ok(decorations::frame(&image))
}

fn grid<R: Rng + ?Sized>(
    images: &[DynamicImage],
    max_width: u32,
    style: &Style,
    rng: &mut R,
) -> Result<RgbaImage, CollageError> {
    let layout = GridLayout::compute(images.len(), max_width);
    if layout.cell_size == 0 {
        return Err(CollageError::DegenerateLayout { count: images.len(), max_width });
    }

    check_canvas(layout.width, layout.height)?;

    log::debug!(
        "placing {} images in a {}x{} grid of {}px cells on a {}x{} canvas",
        images.len(),
        layout.shape.columns,
        layout.shape.rows,
        layout.cell_size,
        layout.width,
        layout.height
    );

    let mut canvas = decorations::background(layout.width, layout.height);
    decorations::camera_icon(&mut canvas, &layout);

    let shadow = DropShadow::new(layout.cell_size);
    let mask = draw::rounded_mask(
        (layout.cell_size, layout.cell_size),
        decorations::TILE_CORNER_RADIUS,
    );

    for (index, image) in images.iter().enumerate() {
        let origin = layout.cell_origin(index);
        let tile = normalize::normalize(image, layout.cell_size);
        decorations::place_tile(&mut canvas, origin, tile, &shadow, &mask);

        let badge = decorations::badge(index, style.font);
        decorations::place_badge(&mut canvas, origin, layout.cell_size, &badge);
    }

    decorations::footer(&mut canvas, &layout, style.font, style.date, Engagement::random(rng));

    Ok(canvas)
}

fn check_canvas(width: u32, height: u32) -> Result<(), CollageError> {
    if u64::from(width) * u64::from(height) > MAX_CANVAS_PIXELS {
        return Err(CollageError::CanvasTooLarge { width, height });
    }

    Ok(())
}

#[cfg(test)]
mod test {
    use std::ops::Range;

    use image::{Rgb, Rgba};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use time::macros::date;

    use super::*;

    fn placeholder(color: [u8; 3]) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(40, 30, Rgb(color)))
    }

    fn placeholders(count: usize) -> Vec<DynamicImage> {
        (0..count).map(|i| placeholder([(i * 20) as u8, 128, 200])).collect()
    }

    fn build(images: &[DynamicImage], max_size: (u32, u32)) -> Result<RgbImage, CollageError> {
        let font = text::bundled_font().unwrap();
        let style = Style { font: &font, date: date!(2026 - 10 - 16) };
        build_collage(images, max_size, &style, &mut StdRng::seed_from_u64(0))
    }

    /// mean color of the middle half of a cell
    fn cell_color(image: &RgbImage, origin: (u32, u32), cell_size: u32) -> [u8; 3] {
        let (start, end) = (cell_size / 4, cell_size * 3 / 4);
        let mut sum = [0u64; 3];
        let mut count = 0;

        for y in origin.1 + start..origin.1 + end {
            for x in origin.0 + start..origin.0 + end {
                let pixel = image.get_pixel(x, y);
                for channel in 0..3 {
                    sum[channel] += u64::from(pixel[channel]);
                }
                count += 1;
            }
        }

        sum.map(|channel| (channel / count) as u8)
    }

    fn assert_close(actual: [u8; 3], expected: [u8; 3]) {
        let distance = actual
            .iter()
            .zip(expected)
            .map(|(&a, e)| (f64::from(a) - f64::from(e)).powi(2))
            .sum::<f64>()
            .sqrt();
        assert!(distance < 12., "{actual:?} is not close to {expected:?}");
    }

    #[test]
    fn test_no_images() {
        let result = build(&[], (500, 500));
        assert_eq!(result, Err(CollageError::NoImages));
        assert_eq!(CollageError::NoImages.to_string(), "no images provided");
    }

    #[test]
    fn test_degenerate_image() {
        let images = [placeholder([0, 0, 0]), DynamicImage::new_rgb8(0, 10)];
        assert_eq!(build(&images, (500, 500)), Err(CollageError::DegenerateImage(1)));
    }

    #[test]
    fn test_degenerate_layout() {
        let result = build(&placeholders(5), (4, 4));
        assert_eq!(result, Err(CollageError::DegenerateLayout { count: 5, max_width: 4 }));
    }

    #[test]
    fn test_canvas_too_large() {
        let images = vec![DynamicImage::new_rgb8(1, 1); 2000];
        let Err(CollageError::CanvasTooLarge { width, height }) = build(&images, (4096, 4096))
        else {
            panic!("expected CanvasTooLarge error");
        };

        assert_eq!(width, GridLayout::compute(2000, 4096).width);
        assert!(u64::from(width) * u64::from(height) > MAX_CANVAS_PIXELS);
    }

    #[test]
    fn test_collage_dimensions() {
        let expected = [
            (1, (120, 110)),
            (2, (502, 305)),
            (3, (492, 200)),
            (4, (502, 554)),
            (5, (466, 114)),
            (6, (492, 363)),
            (7, (492, 526)),
            (8, (478, 264)),
            (9, (492, 526)),
            (10, (466, 207)),
            (13, (466, 300)),
        ];

        for (count, dimensions) in expected {
            let collage = build(&placeholders(count), (500, 500)).unwrap();
            assert_eq!(collage.dimensions(), dimensions, "count {count}");
        }
    }

    #[test]
    fn test_single_image_shrinks_to_fit() {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(800, 400, Rgb([0, 0, 255])));
        let collage = build(&[image], (200, 200)).unwrap();
        assert_eq!(collage.dimensions(), (280, 180));

        assert_eq!(*collage.get_pixel(0, 0), Rgb([255, 255, 255]));
        assert_close(collage.get_pixel(140, 90).0, [0, 0, 255]);
    }

    #[test]
    fn test_single_image_is_never_upscaled() {
        let collage = build(&[placeholder([10, 200, 10])], (4096, 4096)).unwrap();
        assert_eq!(collage.dimensions(), (120, 110));
    }

    #[test]
    fn test_tiles_land_in_their_cells() {
        let colors = [[255, 0, 0], [0, 255, 0], [0, 0, 255]];
        let images = colors.map(placeholder);
        let collage = build(&images, (500, 500)).unwrap();

        let layout = GridLayout::compute(3, 500);
        for (index, color) in colors.into_iter().enumerate() {
            let origin = layout.cell_origin(index);
            assert_close(cell_color(&collage, origin, layout.cell_size), color);
        }
    }

    #[test]
    fn test_seventh_tile_is_centered() {
        let colors = [
            [255, 0, 0],
            [0, 255, 0],
            [0, 0, 255],
            [255, 0, 0],
            [0, 255, 0],
            [0, 0, 255],
            [0, 0, 0],
        ];
        let images = colors.map(placeholder);
        let collage = build(&images, (500, 500)).unwrap();

        let layout = GridLayout::compute(7, 500);
        let stride = layout.cell_size + layout.spacing;
        let row = layout.top_padding + 2 * stride;
        let middle = (layout.side_padding + stride, row);
        let left = (layout.side_padding, row);

        assert_eq!(layout.cell_origin(6), middle);
        assert_close(cell_color(&collage, middle, layout.cell_size), [0, 0, 0]);

        let empty = cell_color(&collage, left, layout.cell_size);
        assert!(empty.iter().all(|&channel| channel >= 245), "{empty:?}");
    }

    #[test]
    fn test_same_seed_same_collage() {
        let images = placeholders(4);
        let first = build(&images, (300, 300)).unwrap();
        let second = build(&images, (300, 300)).unwrap();
        assert!(first == second);
    }

    #[test]
    fn test_rgba_sources() {
        let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(30, 30, Rgba([0, 255, 0, 255])));
        let collage = build(&[image.clone(), image], (300, 300)).unwrap();

        let layout = GridLayout::compute(2, 300);
        assert_close(cell_color(&collage, layout.cell_origin(1), layout.cell_size), [0, 255, 0]);
    }

    fn count_pixels(
        image: &RgbImage,
        xs: Range<u32>,
        ys: Range<u32>,
        test: impl Fn(&Rgb<u8>) -> bool,
    ) -> usize {
        ys.flat_map(|y| xs.clone().map(move |x| (x, y)))
            .filter(|&(x, y)| test(image.get_pixel(x, y)))
            .count()
    }

    #[test]
    fn test_text_is_drawn() {
        let black = DynamicImage::ImageRgb8(RgbImage::new(200, 200));
        let collage = build(&[black.clone(), black], (1000, 1000)).unwrap();
        let layout = GridLayout::compute(2, 1000);

        // badge number, white on a black tile
        let size = decorations::BADGE_SIZE;
        let (x, y) = layout.cell_origin(0);
        let (x, y) = (x + layout.cell_size - size - 6, y + 6);
        let white = count_pixels(&collage, x..x + size, y..y + size, |pixel| {
            pixel.0.iter().all(|&channel| channel >= 230)
        });
        assert!(white > 0, "{white}");

        // caption, dark on the light footer
        let (text_offset, _) = decorations::footer_rows(&layout);
        let y = layout.footer_y() + text_offset.unsigned_abs();
        let x = layout.side_padding;
        let caption =
            count_pixels(&collage, x..layout.width / 2, y..y + 18, |pixel| pixel[0] < 200);
        assert!(caption > 50, "{caption}");
    }
}
