//! Grid layout.
//!
//! A `GridLayout` arranges indexed items into cells of a row/column grid.
//! Every row and column has a minimum extent and a stretch factor; space left
//! over after minimums and spacing is handed out in proportion to stretch
//! (or evenly if nothing stretches).

use charter_core::{Point, Rect, Size};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct GridCell {
    item: usize,
    row: usize,
    col: usize,
}

/// Lays out items in a grid of rows and columns.
#[derive(Debug, Clone, Default)]
pub struct GridLayout {
    cells: Vec<GridCell>,
    row_stretch: Vec<u32>,
    col_stretch: Vec<u32>,
    row_min: Vec<i32>,
    col_min: Vec<i32>,
    spacing: i32,
    border_margin: i32,
}

impl GridLayout {
    /// Create an empty grid with the given dimensions.
    pub fn new(rows: usize, cols: usize) -> Self {
        let mut layout = Self::default();
        layout.resize(rows, cols);
        layout
    }

    /// Change the grid dimensions, dropping cells that fall outside.
    pub fn resize(&mut self, rows: usize, cols: usize) {
        self.row_stretch.resize(rows, 0);
        self.row_min.resize(rows, 0);
        self.col_stretch.resize(cols, 0);
        self.col_min.resize(cols, 0);
        self.cells.retain(|c| c.row < rows && c.col < cols);
    }

    /// Remove every item and reset all row and column settings.
    pub fn clear(&mut self) {
        let (rows, cols) = (self.rows(), self.columns());
        self.cells.clear();
        self.row_stretch = vec![0; rows];
        self.row_min = vec![0; rows];
        self.col_stretch = vec![0; cols];
        self.col_min = vec![0; cols];
    }

    /// Place `item` at a cell, growing the grid if needed.
    pub fn add(&mut self, item: usize, row: usize, col: usize) {
        if row >= self.rows() || col >= self.columns() {
            self.resize(self.rows().max(row + 1), self.columns().max(col + 1));
        }
        self.cells.retain(|c| c.item != item);
        self.cells.push(GridCell { item, row, col });
    }

    pub fn rows(&self) -> usize {
        self.row_stretch.len()
    }

    pub fn columns(&self) -> usize {
        self.col_stretch.len()
    }

    pub fn item_count(&self) -> usize {
        self.cells.len()
    }

    /// The cell an item occupies.
    pub fn position_of(&self, item: usize) -> Option<(usize, usize)> {
        self.cells.iter().find(|c| c.item == item).map(|c| (c.row, c.col))
    }

    pub fn set_row_stretch(&mut self, row: usize, stretch: u32) {
        if let Some(s) = self.row_stretch.get_mut(row) {
            *s = stretch;
        }
    }

    pub fn row_stretch(&self, row: usize) -> u32 {
        self.row_stretch.get(row).copied().unwrap_or(0)
    }

    pub fn set_column_stretch(&mut self, col: usize, stretch: u32) {
        if let Some(s) = self.col_stretch.get_mut(col) {
            *s = stretch;
        }
    }

    pub fn column_stretch(&self, col: usize) -> u32 {
        self.col_stretch.get(col).copied().unwrap_or(0)
    }

    pub fn set_minimum_row_height(&mut self, row: usize, height: i32) {
        if let Some(m) = self.row_min.get_mut(row) {
            *m = height;
        }
    }

    pub fn minimum_row_height(&self, row: usize) -> i32 {
        self.row_min.get(row).copied().unwrap_or(0)
    }

    pub fn set_minimum_column_width(&mut self, col: usize, width: i32) {
        if let Some(m) = self.col_min.get_mut(col) {
            *m = width;
        }
    }

    pub fn minimum_column_width(&self, col: usize) -> i32 {
        self.col_min.get(col).copied().unwrap_or(0)
    }

    pub fn set_spacing(&mut self, spacing: i32) {
        self.spacing = spacing;
    }

    pub fn set_border_margin(&mut self, margin: i32) {
        self.border_margin = margin;
    }

    /// The smallest area that satisfies every minimum.
    pub fn min_usable_size(&self) -> Size {
        let span = |mins: &[i32]| {
            mins.iter().sum::<i32>()
                + self.spacing * (mins.len() as i32 - 1).max(0)
                + 2 * self.border_margin
        };
        Size::new(span(&self.col_min), span(&self.row_min))
    }

    /// Compute the rectangle of every item for a layout area of `size`.
    pub fn arrange(&self, size: Size) -> Vec<(usize, Rect)> {
        let inner = |extent: i32| extent - 2 * self.border_margin;
        let widths = distribute(&self.col_min, &self.col_stretch, inner(size.width), self.spacing);
        let heights =
            distribute(&self.row_min, &self.row_stretch, inner(size.height), self.spacing);
        let xs = positions(&widths, self.spacing, self.border_margin);
        let ys = positions(&heights, self.spacing, self.border_margin);

        self.cells
            .iter()
            .map(|c| {
                let ul = Point::new(xs[c.col], ys[c.row]);
                (c.item, Rect::from_pos_size(ul, Size::new(widths[c.col], heights[c.row])))
            })
            .collect()
    }
}

/// Split `available` among lines with the given minimums and stretch factors.
fn distribute(mins: &[i32], stretch: &[u32], available: i32, spacing: i32) -> Vec<i32> {
    let n = mins.len();
    let mut sizes = mins.to_vec();
    if n == 0 {
        return sizes;
    }

    let used: i32 = mins.iter().sum::<i32>() + spacing * (n as i32 - 1);
    let extra = available - used;
    if extra <= 0 {
        return sizes;
    }

    let total_stretch: u32 = stretch.iter().sum();
    if total_stretch == 0 {
        let share = extra / n as i32;
        let mut remainder = extra % n as i32;
        for size in &mut sizes {
            *size += share;
            if remainder > 0 {
                *size += 1;
                remainder -= 1;
            }
        }
    } else {
        let mut given = 0;
        let mut last_stretched = 0;
        for (i, size) in sizes.iter_mut().enumerate() {
            if stretch[i] > 0 {
                let share =
                    (i64::from(extra) * i64::from(stretch[i]) / i64::from(total_stretch)) as i32;
                *size += share;
                given += share;
                last_stretched = i;
            }
        }
        sizes[last_stretched] += extra - given;
    }
    sizes
}

fn positions(sizes: &[i32], spacing: i32, start: i32) -> Vec<i32> {
    let mut result = Vec::with_capacity(sizes.len());
    let mut pos = start;
    for &size in sizes {
        result.push(pos);
        pos += size + spacing;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stretch_distributes_extra_space() {
        let mut layout = GridLayout::new(3, 1);
        for row in 0..3 {
            layout.add(row, row, 0);
            layout.set_minimum_row_height(row, 10);
        }
        layout.set_row_stretch(0, 1);
        layout.set_row_stretch(2, 3);

        let rects = layout.arrange(Size::new(50, 70));
        assert_eq!(rects[0].1, Rect::from_pos_size(Point::new(0, 0), Size::new(50, 20)));
        assert_eq!(rects[1].1, Rect::from_pos_size(Point::new(0, 20), Size::new(50, 10)));
        assert_eq!(rects[2].1, Rect::from_pos_size(Point::new(0, 30), Size::new(50, 40)));
    }

    #[test]
    fn test_no_stretch_spreads_evenly() {
        let mut layout = GridLayout::new(1, 3);
        for col in 0..3 {
            layout.add(col, 0, col);
        }
        layout.set_spacing(5);

        let widths: Vec<i32> = layout
            .arrange(Size::new(41, 10))
            .iter()
            .map(|(_, r)| r.width())
            .collect();
        assert_eq!(widths, vec![11, 10, 10]);
    }

    #[test]
    fn test_min_usable_size_includes_spacing_and_margin() {
        let mut layout = GridLayout::new(2, 2);
        layout.set_minimum_column_width(0, 30);
        layout.set_minimum_column_width(1, 20);
        layout.set_minimum_row_height(1, 15);
        layout.set_spacing(4);
        layout.set_border_margin(2);
        assert_eq!(layout.min_usable_size(), Size::new(58, 23));
    }

    #[test]
    fn test_add_grows_grid() {
        let mut layout = GridLayout::new(0, 0);
        layout.add(7, 2, 1);
        assert_eq!((layout.rows(), layout.columns()), (3, 2));
        assert_eq!(layout.position_of(7), Some((2, 1)));
    }
}
