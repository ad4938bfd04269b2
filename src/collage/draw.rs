use image::{GrayImage, Luma, Rgba, RgbaImage, imageops};
use imageproc::drawing;
use imageproc::point::Point;
use imageproc::rect::Rect;

/// Inclusive pixel box, both corners are painted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Bounds {
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self { left, top, right, bottom }
    }

    pub const fn width(self) -> i32 {
        self.right - self.left + 1
    }

    pub const fn height(self) -> i32 {
        self.bottom - self.top + 1
    }

    pub const fn inset(self, amount: i32) -> Self {
        Self::new(self.left + amount, self.top + amount, self.right - amount, self.bottom - amount)
    }

    const fn is_empty(self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }

    #[expect(clippy::cast_sign_loss)] // checked by `is_empty`
    fn rect(self) -> Option<Rect> {
        if self.is_empty() {
            return None;
        }

        Some(Rect::at(self.left, self.top).of_size(self.width() as u32, self.height() as u32))
    }
}

/// Drawing primitives for building up decorations on a raster.
pub trait Draw {
    fn fill_rect(&mut self, bounds: Bounds, color: Rgba<u8>);
    fn stroke_rect(&mut self, bounds: Bounds, width: u32, color: Rgba<u8>);
    fn stroke_rounded_rect(&mut self, bounds: Bounds, radius: u32, width: u32, color: Rgba<u8>);
    fn fill_ellipse(&mut self, bounds: Bounds, color: Rgba<u8>);
    fn stroke_ellipse(&mut self, bounds: Bounds, width: u32, color: Rgba<u8>);
    fn fill_polygon(&mut self, points: &[(i32, i32)], color: Rgba<u8>);
    fn line(&mut self, from: (i32, i32), to: (i32, i32), width: u32, color: Rgba<u8>);
    fn fill_radial_gradient(
        &mut self,
        center: (f32, f32),
        radius: f32,
        inner: Rgba<u8>,
        outer: Rgba<u8>,
    );
    /// alpha-blends `layer` with its top-left corner at `(x, y)`
    fn composite(&mut self, layer: &RgbaImage, x: i64, y: i64);
}

impl Draw for RgbaImage {
    fn fill_rect(&mut self, bounds: Bounds, color: Rgba<u8>) {
        if let Some(rect) = bounds.rect() {
            drawing::draw_filled_rect_mut(self, rect, color);
        }
    }

    fn stroke_rect(&mut self, bounds: Bounds, width: u32, color: Rgba<u8>) {
        for inset in 0..to_i32(width) {
            if let Some(rect) = bounds.inset(inset).rect() {
                drawing::draw_hollow_rect_mut(self, rect, color);
            }
        }
    }

    fn stroke_rounded_rect(&mut self, bounds: Bounds, radius: u32, width: u32, color: Rgba<u8>) {
        if bounds.is_empty() {
            return;
        }

        let (box_width, box_height) = (to_u32(bounds.width()), to_u32(bounds.height()));
        let inner = (
            box_width.saturating_sub(2 * width),
            box_height.saturating_sub(2 * width),
            radius.saturating_sub(width),
        );

        for_each_clipped(self, bounds, |image, x, y, local_x, local_y| {
            let outside_inner = inner.0 == 0
                || inner.1 == 0
                || local_x < width
                || local_y < width
                || !in_rounded_rect(
                    (local_x - width, local_y - width),
                    (inner.0, inner.1),
                    inner.2,
                );

            if outside_inner
                && in_rounded_rect((local_x, local_y), (box_width, box_height), radius)
            {
                image.put_pixel(x, y, color);
            }
        });
    }

    fn fill_ellipse(&mut self, bounds: Bounds, color: Rgba<u8>) {
        if bounds.is_empty() {
            return;
        }

        let (center, radii) = ellipse_geometry(bounds);
        drawing::draw_filled_ellipse_mut(self, center, radii.0, radii.1, color);
    }

    fn stroke_ellipse(&mut self, bounds: Bounds, width: u32, color: Rgba<u8>) {
        for inset in 0..to_i32(width) {
            let bounds = bounds.inset(inset);
            if bounds.is_empty() {
                break;
            }

            let (center, radii) = ellipse_geometry(bounds);
            drawing::draw_hollow_ellipse_mut(self, center, radii.0, radii.1, color);
        }
    }

    fn fill_polygon(&mut self, points: &[(i32, i32)], color: Rgba<u8>) {
        let mut points = points.iter().map(|&(x, y)| Point::new(x, y)).collect::<Vec<_>>();
        if points.len() > 1 && points.first() == points.last() {
            points.pop();
        }

        if points.len() < 3 {
            return;
        }

        drawing::draw_polygon_mut(self, &points, color);
    }

    #[expect(clippy::cast_precision_loss)] // pixel coordinates
    fn line(&mut self, from: (i32, i32), to: (i32, i32), width: u32, color: Rgba<u8>) {
        let horizontal = (to.0 - from.0).abs() >= (to.1 - from.1).abs();
        let width = to_i32(width);

        for offset in 0..width {
            // thickness grows around the center line
            let shift = offset - (width - 1) / 2;
            let (dx, dy) = if horizontal { (0, shift) } else { (shift, 0) };
            drawing::draw_line_segment_mut(
                self,
                ((from.0 + dx) as f32, (from.1 + dy) as f32),
                ((to.0 + dx) as f32, (to.1 + dy) as f32),
                color,
            );
        }
    }

    #[expect(clippy::cast_precision_loss)] // pixel coordinates
    fn fill_radial_gradient(
        &mut self,
        center: (f32, f32),
        radius: f32,
        inner: Rgba<u8>,
        outer: Rgba<u8>,
    ) {
        for (x, y, pixel) in self.enumerate_pixels_mut() {
            let distance = (x as f32 + 0.5 - center.0).hypot(y as f32 + 0.5 - center.1);
            let coverage = (radius - distance + 0.5).clamp(0., 1.);
            if coverage <= 0. {
                continue;
            }

            let ratio = (distance / radius).clamp(0., 1.);
            let mut color = mix(inner, outer, ratio);
            color[3] = scale_alpha(color[3], coverage);
            blend_pixel(pixel, color);
        }
    }

    fn composite(&mut self, layer: &RgbaImage, x: i64, y: i64) {
        imageops::overlay(self, layer, x, y);
    }
}

/// whether the center of pixel `point` lies inside a `size` box with corners rounded by `radius`
#[expect(clippy::cast_precision_loss)] // pixel coordinates
pub fn in_rounded_rect(point: (u32, u32), size: (u32, u32), radius: u32) -> bool {
    let (width, height) = (size.0 as f32, size.1 as f32);
    let radius = (radius as f32).min(width / 2.).min(height / 2.);
    let (x, y) = (point.0 as f32 + 0.5, point.1 as f32 + 0.5);

    if x > width || y > height {
        return false;
    }

    let nearest_x = x.clamp(radius, width - radius);
    let nearest_y = y.clamp(radius, height - radius);
    (x - nearest_x).hypot(y - nearest_y) <= radius
}

/// opaque inside a rounded square, transparent outside
pub fn rounded_mask(size: (u32, u32), radius: u32) -> GrayImage {
    GrayImage::from_fn(size.0, size.1, |x, y| {
        if in_rounded_rect((x, y), size, radius) { Luma([255]) } else { Luma([0]) }
    })
}

pub fn apply_mask(image: &mut RgbaImage, mask: &GrayImage) {
    for (pixel, mask) in image.pixels_mut().zip(mask.pixels()) {
        pixel[3] = scale_alpha(pixel[3], f32::from(mask[0]) / 255.);
    }
}

/// source-over blend of a single pixel
pub fn blend_pixel(base: &mut Rgba<u8>, overlay: Rgba<u8>) {
    let source_alpha = f32::from(overlay[3]) / 255.;
    if source_alpha <= 0. {
        return;
    }

    let base_alpha = f32::from(base[3]) / 255. * (1. - source_alpha);
    let alpha = source_alpha + base_alpha;

    for channel in 0..3 {
        base[channel] = to_u8(
            source_alpha.mul_add(f32::from(overlay[channel]), base_alpha * f32::from(base[channel]))
                / alpha,
        );
    }
    base[3] = to_u8(alpha * 255.);
}

/// linear interpolation from `from` (ratio `0.0`) to `to` (ratio `1.0`)
#[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // value is clamped to u8
pub fn mix(from: Rgba<u8>, to: Rgba<u8>, ratio: f32) -> Rgba<u8> {
    let mut color = from;
    for channel in 0..4 {
        color[channel] = ratio
            .mul_add(f32::from(to[channel]) - f32::from(from[channel]), f32::from(from[channel]))
            .clamp(0., 255.) as u8;
    }
    color
}

fn scale_alpha(alpha: u8, factor: f32) -> u8 {
    to_u8(f32::from(alpha) * factor)
}

#[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // value is clamped to u8
fn to_u8(value: f32) -> u8 {
    value.round().clamp(0., 255.) as u8
}

fn ellipse_geometry(bounds: Bounds) -> ((i32, i32), (i32, i32)) {
    (
        ((bounds.left + bounds.right) / 2, (bounds.top + bounds.bottom) / 2),
        ((bounds.right - bounds.left) / 2, (bounds.bottom - bounds.top) / 2),
    )
}

/// calls `paint` for every pixel of `bounds` inside the image, with image and box-local coordinates
fn for_each_clipped(
    image: &mut RgbaImage,
    bounds: Bounds,
    mut paint: impl FnMut(&mut RgbaImage, u32, u32, u32, u32),
) {
    let right = bounds.right.min(to_i32(image.width()) - 1);
    let bottom = bounds.bottom.min(to_i32(image.height()) - 1);

    for y in bounds.top.max(0)..=bottom {
        for x in bounds.left.max(0)..=right {
            paint(image, to_u32(x), to_u32(y), to_u32(x - bounds.left), to_u32(y - bounds.top));
        }
    }
}

fn to_i32(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

fn to_u32(value: i32) -> u32 {
    u32::try_from(value).unwrap_or(0)
}
