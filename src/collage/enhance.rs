//! Photo enhancers. Each one blends the image with a "degenerate" version of itself: a factor of
//! `1.0` is the identity, larger factors push pixels away from the degenerate image.

use image::{Rgba, RgbaImage};

fn luma(pixel: Rgba<u8>) -> f32 {
    0.299f32.mul_add(
        f32::from(pixel[0]),
        0.587f32.mul_add(f32::from(pixel[1]), 0.114 * f32::from(pixel[2])),
    )
}

#[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // value is clamped to u8
fn blend(degenerate: f32, original: u8, factor: f32) -> u8 {
    factor.mul_add(f32::from(original) - degenerate, degenerate).round().clamp(0., 255.) as u8
}

/// blends against the grayscale version of the image
pub fn saturation(image: &mut RgbaImage, factor: f32) {
    for pixel in image.pixels_mut() {
        let gray = luma(*pixel);
        for channel in 0..3 {
            pixel[channel] = blend(gray, pixel[channel], factor);
        }
    }
}

/// blends against a flat image of the mean brightness
#[expect(clippy::cast_precision_loss, clippy::cast_possible_truncation)] // mean of u8 values
pub fn contrast(image: &mut RgbaImage, factor: f32) {
    let pixel_count = u64::from(image.width()) * u64::from(image.height());
    if pixel_count == 0 {
        return;
    }

    let sum = image.pixels().map(|pixel| f64::from(luma(*pixel))).sum::<f64>();
    let mean = (sum / pixel_count as f64).round() as f32;

    for pixel in image.pixels_mut() {
        for channel in 0..3 {
            pixel[channel] = blend(mean, pixel[channel], factor);
        }
    }
}

/// blends against a smoothed copy of the image, the outermost pixels are left as they are
pub fn sharpness(image: &mut RgbaImage, factor: f32) {
    const KERNEL: [[f32; 3]; 3] = [[1., 1., 1.], [1., 5., 1.], [1., 1., 1.]];
    const KERNEL_SUM: f32 = 13.;

    let (width, height) = image.dimensions();
    if width < 3 || height < 3 {
        return;
    }

    let original = image.clone();
    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let mut smoothed = [0f32; 3];
            for (row, ky) in KERNEL.iter().zip(0u32..) {
                for (weight, kx) in row.iter().zip(0u32..) {
                    let neighbor = original.get_pixel(x + kx - 1, y + ky - 1);
                    for (channel, value) in smoothed.iter_mut().enumerate() {
                        *value += weight * f32::from(neighbor[channel]);
                    }
                }
            }

            let pixel = image.get_pixel_mut(x, y);
            for (channel, value) in smoothed.into_iter().enumerate() {
                pixel[channel] = blend(value / KERNEL_SUM, pixel[channel], factor);
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn two_tone() -> RgbaImage {
        RgbaImage::from_fn(8, 8, |x, _| {
            if x < 4 { Rgba([100, 100, 100, 255]) } else { Rgba([150, 150, 150, 255]) }
        })
    }

    #[test]
    fn test_identity_factor() {
        let original = RgbaImage::from_fn(16, 16, |x, y| {
            Rgba([(x * 16) as u8, (y * 16) as u8, ((x + y) * 8) as u8, 200])
        });

        let mut image = original.clone();
        saturation(&mut image, 1.);
        sharpness(&mut image, 1.);
        assert_eq!(image, original);
    }

    #[test]
    fn test_saturation_keeps_grays() {
        let mut image = two_tone();
        saturation(&mut image, 1.5);
        assert_eq!(image, two_tone());

        let mut image = RgbaImage::from_pixel(2, 2, Rgba([200, 100, 100, 255]));
        saturation(&mut image, 1.1);
        let pixel = image.get_pixel(0, 0);
        assert!(pixel[0] > 200);
        assert!(pixel[1] < 100);
    }

    #[test]
    fn test_contrast_spreads_from_mean() {
        let mut image = two_tone();
        contrast(&mut image, 1.08);
        assert_eq!(*image.get_pixel(0, 0), Rgba([98, 98, 98, 255]));
        assert_eq!(*image.get_pixel(7, 0), Rgba([152, 152, 152, 255]));
    }

    #[test]
    fn test_contrast_uniform_image() {
        let mut image = RgbaImage::from_pixel(4, 4, Rgba([10, 20, 30, 128]));
        contrast(&mut image, 1.08);
        saturation(&mut image, 1.);
        let pixel = image.get_pixel(1, 1);
        assert_eq!(pixel[3], 128);
        assert!(pixel[0] <= 10 && pixel[2] >= 30);
    }

    #[test]
    fn test_sharpness_edges() {
        let mut image = two_tone();
        sharpness(&mut image, 1.1);

        // flat areas and borders are untouched, the edge gets steeper
        assert_eq!(*image.get_pixel(1, 1), Rgba([100, 100, 100, 255]));
        assert_eq!(*image.get_pixel(0, 4), Rgba([100, 100, 100, 255]));
        assert!(image.get_pixel(3, 4)[0] < 100);
        assert!(image.get_pixel(4, 4)[0] > 150);
    }

    #[test]
    fn test_sharpness_kernel_is_centered() {
        let mut image = RgbaImage::from_pixel(5, 5, Rgba([100, 100, 100, 255]));
        image.put_pixel(2, 2, Rgba([200, 200, 200, 255]));
        sharpness(&mut image, 2.);

        assert_eq!(image.get_pixel(2, 2)[0], 255);
        for (x, y) in [(1, 1), (2, 1), (3, 1), (1, 2), (3, 2), (1, 3), (2, 3), (3, 3)] {
            assert_eq!(image.get_pixel(x, y)[0], 92, "({x}, {y})");
        }
        assert_eq!(image.get_pixel(0, 0)[0], 100);
    }
}
