use image::{GrayImage, Rgba, RgbaImage, imageops};
use rand::Rng;
use rusttype::Font;
use time::Date;
use time::macros::format_description;

use super::draw::{self, Bounds, Draw};
use super::layout::GridLayout;
use super::text;

const fn rgb(red: u8, green: u8, blue: u8) -> Rgba<u8> {
    Rgba([red, green, blue, 255])
}

const WHITE: Rgba<u8> = rgb(255, 255, 255);
const BACKGROUND_TOP: Rgba<u8> = rgb(250, 250, 252);
const BACKGROUND_BOTTOM: Rgba<u8> = rgb(252, 252, 250);
const ICON_OUTLINE: Rgba<u8> = rgb(200, 200, 200);
const ICON_FILL: Rgba<u8> = rgb(220, 220, 220);
const CELL_OUTLINE: Rgba<u8> = rgb(240, 240, 240);
const SHADOW: Rgba<u8> = Rgba([0, 0, 0, 30]);
const SEPARATOR: Rgba<u8> = rgb(220, 220, 220);
const TEXT_SHADOW: Rgba<u8> = rgb(180, 180, 180);
const CAPTION: Rgba<u8> = rgb(100, 100, 100);
const TIMESTAMP: Rgba<u8> = rgb(130, 130, 130);
const HEART: Rgba<u8> = rgb(220, 50, 50);
const BADGE_PALETTE: [Rgba<u8>; 3] = [rgb(226, 40, 85), rgb(64, 93, 230), rgb(252, 175, 69)];
const BADGE_NUMBER_SHADOW: Rgba<u8> = Rgba([0, 0, 0, 100]);

pub const FRAME_WIDTH: u32 = 40;
const FRAME_SHADOW_DEPTH: i32 = 5;
pub const TILE_CORNER_RADIUS: u32 = 6;
const SHADOW_OFFSET: i32 = 5;
const SHADOW_BLUR: f32 = 5.;
const SHADOW_MARGIN: u32 = 10;
pub const BADGE_SIZE: u32 = 32;
const BADGE_MARGIN: u32 = 6;
const BADGE_FONT_SIZE: f32 = 20.;
const FOOTER_FONT_SIZE: f32 = 18.;
const FOOTER_TEXT_OFFSET: i32 = 15;
const FOOTER_ICONS_OFFSET: i32 = 50;
/// how far the footer icons reach below their row
const FOOTER_ICON_EXTENT: i32 = 10;

/// decorative like and comment numbers shown in the footer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Engagement {
    pub likes: u32,
    pub comments: u32,
}

impl Engagement {
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self { likes: rng.random_range(100..=999), comments: rng.random_range(10..=99) }
    }
}

/// white border with a soft inset shadow, used around a lone image
pub fn frame(image: &RgbaImage) -> RgbaImage {
    let border = FRAME_WIDTH * 2;
    let mut framed = RgbaImage::from_pixel(image.width() + border, image.height() + border, WHITE);

    let frame_width = to_i32(FRAME_WIDTH);
    let (right, bottom) = (to_i32(framed.width()), to_i32(framed.height()));
    for step in 0..FRAME_SHADOW_DEPTH {
        let shade = u8::try_from(220 - step * 10).unwrap_or(u8::MAX);
        let inset = frame_width - FRAME_SHADOW_DEPTH + step;
        framed.stroke_rect(
            Bounds::new(inset, inset, right - inset, bottom - inset),
            1,
            rgb(shade, shade, shade),
        );
    }

    framed.composite(image, i64::from(FRAME_WIDTH), i64::from(FRAME_WIDTH));
    framed
}

/// near-white vertical gradient, cool at the top and warm at the bottom
#[expect(clippy::cast_precision_loss)] // row index as a ratio
pub fn background(width: u32, height: u32) -> RgbaImage {
    let rows = (0..height)
        .map(|y| draw::mix(BACKGROUND_TOP, BACKGROUND_BOTTOM, y as f32 / height as f32))
        .collect::<Vec<_>>();

    RgbaImage::from_fn(width, height, |_, y| rows[y as usize])
}

/// small outlined camera in the header, right of the space reserved for a logo
pub fn camera_icon(canvas: &mut RgbaImage, layout: &GridLayout) {
    const LOGO_WIDTH: i32 = 120;
    const SIZE: i32 = 30;
    const LENS: i32 = SIZE / 2;
    const VIEWFINDER: i32 = SIZE / 5;

    let x = to_i32(layout.side_padding) + LOGO_WIDTH + 10;
    let y = to_i32(layout.top_padding) / 2 - SIZE / 2;

    canvas.stroke_rounded_rect(Bounds::new(x, y, x + SIZE, y + SIZE), 8, 2, ICON_OUTLINE);

    let lens_x = x + (SIZE - LENS) / 2;
    let lens_y = y + (SIZE - LENS) / 2;
    canvas.stroke_ellipse(
        Bounds::new(lens_x, lens_y, lens_x + LENS, lens_y + LENS),
        2,
        ICON_OUTLINE,
    );

    let viewfinder_x = x + SIZE - VIEWFINDER - 3;
    let viewfinder_y = y + 3;
    canvas.fill_ellipse(
        Bounds::new(
            viewfinder_x,
            viewfinder_y,
            viewfinder_x + VIEWFINDER,
            viewfinder_y + VIEWFINDER,
        ),
        ICON_FILL,
    );
}

/// Blurred translucent square offset down-right of a cell, shared by every cell.
pub struct DropShadow {
    pub layer: RgbaImage,
    /// distance from the cell origin back to the top-left corner of `layer`
    pub margin: i64,
}

impl DropShadow {
    pub fn new(cell_size: u32) -> Self {
        let size = cell_size + SHADOW_MARGIN * 2;
        let mut layer = RgbaImage::from_pixel(size, size, Rgba([0, 0, 0, 0]));

        let start = to_i32(SHADOW_MARGIN) + SHADOW_OFFSET;
        let end = start + to_i32(cell_size) - 1;
        layer.fill_rect(Bounds::new(start, start, end, end), SHADOW);

        Self { layer: imageops::blur(&layer, SHADOW_BLUR), margin: i64::from(SHADOW_MARGIN) }
    }
}

/// outline, shadow and the rounded tile itself, at `origin` on the canvas
pub fn place_tile(
    canvas: &mut RgbaImage,
    origin: (u32, u32),
    mut tile: RgbaImage,
    shadow: &DropShadow,
    mask: &GrayImage,
) {
    let (x, y) = (to_i32(origin.0), to_i32(origin.1));
    let size = to_i32(tile.width());
    canvas.stroke_rect(Bounds::new(x - 1, y - 1, x + size + 1, y + size + 1), 1, CELL_OUTLINE);

    canvas.composite(&shadow.layer, i64::from(x) - shadow.margin, i64::from(y) - shadow.margin);

    draw::apply_mask(&mut tile, mask);
    canvas.composite(&tile, i64::from(x), i64::from(y));
}

/// Round gradient badge with the 1-based tile number. The gradient colors cycle with `index`.
#[expect(clippy::cast_possible_truncation, clippy::cast_precision_loss)] // pixel coordinates
pub fn badge(index: usize, font: &Font) -> RgbaImage {
    let outer = BADGE_PALETTE[index % BADGE_PALETTE.len()];
    let inner = BADGE_PALETTE[(index + 1) % BADGE_PALETTE.len()];
    let radius = BADGE_SIZE as f32 / 2.;

    let mut badge = RgbaImage::from_pixel(BADGE_SIZE, BADGE_SIZE, Rgba([0, 0, 0, 0]));
    badge.fill_radial_gradient((radius, radius), radius, inner, outer);

    let number = (index + 1).to_string();
    let width = text::text_width(font, BADGE_FONT_SIZE, &number);
    let height = text::line_height(font, BADGE_FONT_SIZE);
    let x = ((BADGE_SIZE as f32 - width) / 2.).round() as i32;
    let y = ((BADGE_SIZE as f32 - height) / 2.).round() as i32;

    let shadow = (x + 1, y + 1);
    text::draw_text(&mut badge, font, BADGE_FONT_SIZE, shadow, &number, BADGE_NUMBER_SHADOW);
    text::draw_text(&mut badge, font, BADGE_FONT_SIZE, (x, y), &number, WHITE);

    badge
}

/// puts `badge` in the top-right corner of the cell at `origin`
pub fn place_badge(canvas: &mut RgbaImage, origin: (u32, u32), cell_size: u32, badge: &RgbaImage) {
    let x = i64::from(origin.0) + i64::from(cell_size) - i64::from(BADGE_SIZE + BADGE_MARGIN);
    let y = i64::from(origin.1) + i64::from(BADGE_MARGIN);
    canvas.composite(badge, x, y);
}

pub fn footer_caption(count: usize) -> String {
    let mut caption = format!("Instagram Carousel • {count} Photos");
    if count >= 10 {
        caption.push_str(" • Swipe ➡️");
    }
    caption
}

pub fn format_date(date: Date) -> Result<String, time::error::Format> {
    date.format(format_description!("[month repr:short] [day], [year]"))
}

/// Offsets of the caption row and the icon row below the separator. Short footers squeeze both
/// rows so the icons stay on the canvas.
pub fn footer_rows(layout: &GridLayout) -> (i32, i32) {
    let room = to_i32(layout.height - layout.footer_y());
    (FOOTER_TEXT_OFFSET.min(room / 10), FOOTER_ICONS_OFFSET.min(room - FOOTER_ICON_EXTENT - 2))
}

/// separator, caption, date and the engagement row under the grid
#[expect(clippy::cast_possible_truncation)] // text width in pixels
pub fn footer(
    canvas: &mut RgbaImage,
    layout: &GridLayout,
    font: &Font,
    date: Date,
    engagement: Engagement,
) {
    let side = to_i32(layout.side_padding);
    let right = to_i32(layout.width) - side;
    let footer_y = to_i32(layout.footer_y());
    canvas.line((side, footer_y), (right, footer_y), 1, SEPARATOR);

    let (text_offset, icons_offset) = footer_rows(layout);
    let text_y = footer_y + text_offset;
    let icons_y = footer_y + icons_offset;

    shadowed_text(canvas, font, (side, text_y), &footer_caption(layout.count), CAPTION);

    match format_date(date) {
        Ok(date) => {
            let width = text::text_width(font, FOOTER_FONT_SIZE, &date).round() as i32;
            shadowed_text(canvas, font, (right - width, text_y), &date, TIMESTAMP);
        }
        Err(err) => log::warn!("cannot format collage date: {err}"),
    }

    let heart_x = side;
    heart(canvas, heart_x, icons_y);

    let comment_x = heart_x + 70;
    canvas.stroke_rounded_rect(
        Bounds::new(comment_x, icons_y - 10, comment_x + 22, icons_y + 6),
        8,
        2,
        CAPTION,
    );

    let share_x = comment_x + 60;
    canvas.line((share_x, icons_y - 2), (share_x + 20, icons_y - 2), 2, CAPTION);
    canvas.fill_polygon(
        &[(share_x + 14, icons_y - 8), (share_x + 20, icons_y - 2), (share_x + 14, icons_y + 4)],
        CAPTION,
    );

    let bookmark_x = right - 20;
    canvas.stroke_rect(
        Bounds::new(bookmark_x, icons_y - 10, bookmark_x + 20, icons_y + 10),
        2,
        CAPTION,
    );
    canvas.fill_polygon(
        &[(bookmark_x, icons_y + 5), (bookmark_x + 10, icons_y), (bookmark_x + 20, icons_y + 5)],
        CAPTION,
    );

    let counts = [(heart_x + 29, engagement.likes), (comment_x + 27, engagement.comments)];
    for (x, count) in counts {
        let count = count.to_string();
        text::draw_text(canvas, font, FOOTER_FONT_SIZE, (x, icons_y - 8), &count, CAPTION);
    }
}

fn heart(canvas: &mut RgbaImage, x: i32, y: i32) {
    canvas.fill_ellipse(Bounds::new(x + 2, y - 9, x + 12, y + 1), HEART);
    canvas.fill_ellipse(Bounds::new(x + 12, y - 9, x + 22, y + 1), HEART);
    canvas.fill_polygon(&[(x + 2, y - 3), (x + 22, y - 3), (x + 12, y + 9)], HEART);
}

fn shadowed_text(
    canvas: &mut RgbaImage,
    font: &Font,
    position: (i32, i32),
    text: &str,
    color: Rgba<u8>,
) {
    let (x, y) = position;
    text::draw_text(canvas, font, FOOTER_FONT_SIZE, (x + 1, y + 1), text, TEXT_SHADOW);
    text::draw_text(canvas, font, FOOTER_FONT_SIZE, (x, y), text, color);
}

fn to_i32(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}
