/// gap between cells, as a fraction of the maximum width and then of the cell size
pub const SPACING_RATIO: f64 = 0.02;
const TOP_PADDING_RATIO: f64 = 0.10;
const BOTTOM_PADDING_RATIO: f64 = 0.15;
const FALLBACK_COLUMNS: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridShape {
    pub columns: u32,
    pub rows: u32,
}

impl GridShape {
    const fn new(columns: u32, rows: u32) -> Self {
        Self { columns, rows }
    }

    /// hand-picked shapes that leave no trailing gaps, except 7 in a 3x3
    const fn curated(count: usize) -> Option<Self> {
        let shape = match count {
            1 => Self::new(1, 1),
            2 => Self::new(2, 1),
            3 => Self::new(3, 1),
            4 => Self::new(2, 2),
            5 => Self::new(5, 1),
            6 => Self::new(3, 2),
            7 | 9 => Self::new(3, 3),
            8 => Self::new(4, 2),
            10 => Self::new(5, 2),
            _ => return None,
        };

        Some(shape)
    }

    pub fn for_count(count: usize) -> Self {
        Self::curated(count).unwrap_or_else(|| {
            let rows = count.div_ceil(FALLBACK_COLUMNS as usize);
            Self::new(FALLBACK_COLUMNS, u32::try_from(rows).unwrap_or(u32::MAX))
        })
    }
}

/// Pixel geometry of a grid collage. Cells are square, `cell_size` is both their width and height.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLayout {
    pub shape: GridShape,
    pub count: usize,
    pub cell_size: u32,
    pub spacing: u32,
    pub side_padding: u32,
    pub top_padding: u32,
    pub bottom_padding: u32,
    pub width: u32,
    pub height: u32,
}

impl GridLayout {
    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // truncating float geometry
    pub fn compute(count: usize, max_width: u32) -> Self {
        let shape = GridShape::for_count(count);
        let max_width = f64::from(max_width);

        let available_width =
            max_width - f64::from(shape.columns - 1) * (max_width * SPACING_RATIO);
        let cell_size = (available_width / f64::from(shape.columns)) as u32;
        let spacing = (f64::from(cell_size) * SPACING_RATIO) as u32;

        let grid_width = span(cell_size, spacing, shape.columns);
        let grid_height = span(cell_size, spacing, shape.rows);

        let top_padding = (f64::from(cell_size) * TOP_PADDING_RATIO) as u32;
        let bottom_padding = (f64::from(cell_size) * BOTTOM_PADDING_RATIO) as u32;
        let side_padding = spacing;

        Self {
            shape,
            count,
            cell_size,
            spacing,
            side_padding,
            top_padding,
            bottom_padding,
            width: grid_width.saturating_add(side_padding.saturating_mul(2)),
            height: grid_height.saturating_add(top_padding).saturating_add(bottom_padding),
        }
    }

    /// column and row of the `index`-th tile
    pub fn grid_position(&self, index: usize) -> (u32, u32) {
        let columns = self.shape.columns as usize;
        let mut column = index % columns;
        let row = index / columns;

        // lone 7th tile sits in the middle of the last row
        if self.count == 7 && index == 6 {
            column = 1;
        }

        (
            u32::try_from(column).unwrap_or(u32::MAX),
            u32::try_from(row).unwrap_or(u32::MAX),
        )
    }

    /// top-left pixel of the `index`-th tile
    pub fn cell_origin(&self, index: usize) -> (u32, u32) {
        let (column, row) = self.grid_position(index);
        let stride = self.cell_size + self.spacing;
        (self.side_padding + column * stride, self.top_padding + row * stride)
    }

    pub const fn footer_y(&self) -> u32 {
        self.height - self.bottom_padding + self.bottom_padding / 3
    }
}

fn span(cell_size: u32, spacing: u32, cells: u32) -> u32 {
    cell_size.saturating_mul(cells).saturating_add(spacing.saturating_mul(cells.saturating_sub(1)))
}

/// Shrinks `size` to fit inside `max_size`, keeping the aspect ratio. Never upscales.
#[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // rounded pixel sizes
pub fn fit_within(size: (u32, u32), max_size: (u32, u32)) -> (u32, u32) {
    let (width, height) = size;
    let (max_width, max_height) = max_size;

    if width <= max_width && height <= max_height {
        return size;
    }

    let scale = (f64::from(max_width) / f64::from(width))
        .min(f64::from(max_height) / f64::from(height));

    (
        ((f64::from(width) * scale).round() as u32).clamp(1, max_width.max(1)),
        ((f64::from(height) * scale).round() as u32).clamp(1, max_height.max(1)),
    )
}
