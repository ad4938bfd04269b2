use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView, RgbaImage};

use super::enhance;

pub const TILE_SATURATION: f32 = 1.05;
pub const TILE_CONTRAST: f32 = 1.08;
pub const TILE_SHARPNESS: f32 = 1.10;

/// centered square crop of the largest possible size
pub fn square_crop(image: &DynamicImage) -> RgbaImage {
    let (width, height) = image.dimensions();
    let side = width.min(height);
    image.crop_imm((width - side) / 2, (height - side) / 2, side, side).to_rgba8()
}

/// Turns a source image into a `cell_size` square tile: center crop, enhancement, Lanczos resize.
pub fn normalize(image: &DynamicImage, cell_size: u32) -> RgbaImage {
    let mut tile = square_crop(image);

    enhance::saturation(&mut tile, TILE_SATURATION);
    enhance::contrast(&mut tile, TILE_CONTRAST);
    enhance::sharpness(&mut tile, TILE_SHARPNESS);

    imageops::resize(&tile, cell_size, cell_size, FilterType::Lanczos3)
}

#[cfg(test)]
mod test {
    use image::{Rgb, RgbImage};

    use super::*;

    fn stripes() -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(300, 100, |x, _| match x / 100 {
            0 => Rgb([255, 0, 0]),
            1 => Rgb([0, 255, 0]),
            _ => Rgb([0, 0, 255]),
        }))
    }

    #[test]
    fn test_square_crop_is_centered() {
        let crop = square_crop(&stripes());
        assert_eq!(crop.dimensions(), (100, 100));
        assert!(crop.pixels().all(|pixel| pixel.0 == [0, 255, 0, 255]));

        let tall = DynamicImage::ImageRgb8(RgbImage::from_fn(10, 31, |_, y| Rgb([y as u8, 0, 0])));
        let crop = square_crop(&tall);
        assert_eq!(crop.dimensions(), (10, 10));
        assert_eq!(crop.get_pixel(0, 0)[0], 10);
    }

    #[test]
    fn test_normalize_size_and_content() {
        let tile = normalize(&stripes(), 64);
        assert_eq!(tile.dimensions(), (64, 64));

        let center = tile.get_pixel(32, 32);
        assert!(center[0] < 8 && center[1] > 247 && center[2] < 8, "{center:?}");
    }

    #[test]
    fn test_normalize_is_deterministic() {
        let image = DynamicImage::ImageRgb8(RgbImage::from_fn(120, 90, |x, y| {
            Rgb([(x * 2) as u8, (y * 2) as u8, ((x + y) % 256) as u8])
        }));

        assert_eq!(normalize(&image, 50), normalize(&image, 50));
    }

    #[test]
    fn test_normalize_single_pixel() {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(1, 1, Rgb([40, 80, 120])));
        let tile = normalize(&image, 16);
        assert_eq!(tile.dimensions(), (16, 16));
    }
}
