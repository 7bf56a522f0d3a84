//! Pixel geometry and colour types.
//!
//! Widget geometry is integral: rectangles are stored as an upper-left and an
//! exclusive lower-right corner in parent-relative pixels.

use std::ops::{Add, Neg, Sub};

/// A point in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    /// Create a new point.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The origin.
    pub const ZERO: Self = Self { x: 0, y: 0 };
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for Point {
    type Output = Point;

    fn neg(self) -> Point {
        Point::new(-self.x, -self.y)
    }
}

/// A width and height in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    /// Create a new size.
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// A zero size.
    pub const ZERO: Self = Self { width: 0, height: 0 };

    /// Check if either dimension is non-positive.
    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Component-wise maximum.
    pub fn max(self, other: Size) -> Size {
        Size::new(self.width.max(other.width), self.height.max(other.height))
    }

    /// Scale both dimensions, truncating toward zero.
    pub fn scaled(self, factor: f64) -> Size {
        Size::new(
            (f64::from(self.width) * factor) as i32,
            (f64::from(self.height) * factor) as i32,
        )
    }

    /// This size as a point offset.
    pub fn to_point(self) -> Point {
        Point::new(self.width, self.height)
    }
}

impl From<(i32, i32)> for Size {
    fn from((width, height): (i32, i32)) -> Self {
        Self::new(width, height)
    }
}

impl Add for Size {
    type Output = Size;

    fn add(self, rhs: Size) -> Size {
        Size::new(self.width + rhs.width, self.height + rhs.height)
    }
}

/// An axis-aligned rectangle from `ul` (inclusive) to `lr` (exclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub ul: Point,
    pub lr: Point,
}

impl Rect {
    /// Create a rectangle from its corners.
    pub const fn new(ul: Point, lr: Point) -> Self {
        Self { ul, lr }
    }

    /// Create a rectangle from a position and a size.
    pub fn from_pos_size(ul: Point, size: Size) -> Self {
        Self::new(ul, Point::new(ul.x + size.width, ul.y + size.height))
    }

    /// Create a rectangle at the origin.
    pub fn from_size(size: Size) -> Self {
        Self::from_pos_size(Point::ZERO, size)
    }

    /// An empty rectangle at the origin.
    pub const ZERO: Self = Self {
        ul: Point::ZERO,
        lr: Point::ZERO,
    };

    pub fn left(&self) -> i32 {
        self.ul.x
    }

    pub fn top(&self) -> i32 {
        self.ul.y
    }

    pub fn right(&self) -> i32 {
        self.lr.x
    }

    pub fn bottom(&self) -> i32 {
        self.lr.y
    }

    pub fn width(&self) -> i32 {
        self.lr.x - self.ul.x
    }

    pub fn height(&self) -> i32 {
        self.lr.y - self.ul.y
    }

    pub fn size(&self) -> Size {
        Size::new(self.width(), self.height())
    }

    /// Check if the rectangle has no area.
    pub fn is_empty(&self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }

    /// Check if a point lies inside the rectangle.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.ul.x && point.x < self.lr.x && point.y >= self.ul.y && point.y < self.lr.y
    }

    /// The smallest rectangle covering both.
    pub fn union(&self, other: &Rect) -> Rect {
        Rect::new(
            Point::new(self.ul.x.min(other.ul.x), self.ul.y.min(other.ul.y)),
            Point::new(self.lr.x.max(other.lr.x), self.lr.y.max(other.lr.y)),
        )
    }

    /// Move the rectangle by an offset.
    pub fn offset(&self, by: Point) -> Rect {
        Rect::new(self.ul + by, self.lr + by)
    }

    /// Shrink every edge by `amount` pixels.
    pub fn deflate(&self, amount: i32) -> Rect {
        Rect::new(
            Point::new(self.ul.x + amount, self.ul.y + amount),
            Point::new(self.lr.x - amount, self.lr.y - amount),
        )
    }
}

/// An 8-bit RGBA colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// Fraction by which disabled colours move toward [`Color::GRAY`].
const DISABLED_GRAY_FACTOR: f64 = 0.75;

impl Color {
    /// Create a colour from 8-bit components.
    pub const fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque colour from 8-bit components.
    pub const fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::from_rgba8(r, g, b, 255)
    }

    pub const TRANSPARENT: Self = Self::from_rgba8(0, 0, 0, 0);
    pub const BLACK: Self = Self::from_rgb8(0, 0, 0);
    pub const WHITE: Self = Self::from_rgb8(255, 255, 255);
    pub const GRAY: Self = Self::from_rgb8(127, 127, 127);
    /// Colour of label drop shadows.
    pub const SHADOW: Self = Self::from_rgba8(127, 127, 127, 127);

    /// The colour a disabled control is drawn with.
    ///
    /// Each channel moves 75% of the way toward grey; alpha is kept.
    pub fn disabled(self) -> Self {
        let toward_gray = |c: u8, g: u8| {
            let c = f64::from(c);
            (c + (f64::from(g) - c) * DISABLED_GRAY_FACTOR) as u8
        };
        Self {
            r: toward_gray(self.r, Self::GRAY.r),
            g: toward_gray(self.g, Self::GRAY.g),
            b: toward_gray(self.b, Self::GRAY.b),
            a: self.a,
        }
    }

    /// Half-intensity colour, used for unselected tabs.
    pub fn dark(self) -> Self {
        Self {
            r: self.r / 2,
            g: self.g / 2,
            b: self.b / 2,
            a: self.a,
        }
    }

    /// [`disabled`](Self::disabled) when `disabled` is true, otherwise unchanged.
    pub fn with_disabled(self, disabled: bool) -> Self {
        if disabled { self.disabled() } else { self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_union_and_size() {
        let a = Rect::from_pos_size(Point::new(0, 4), Size::new(10, 10));
        let b = Rect::from_pos_size(Point::new(15, 0), Size::new(5, 5));
        let u = a.union(&b);
        assert_eq!(u.ul, Point::new(0, 0));
        assert_eq!(u.lr, Point::new(20, 14));
        assert_eq!(u.size(), Size::new(20, 14));
    }

    #[test]
    fn test_rect_contains_is_half_open() {
        let r = Rect::from_size(Size::new(4, 4));
        assert!(r.contains(Point::new(0, 0)));
        assert!(r.contains(Point::new(3, 3)));
        assert!(!r.contains(Point::new(4, 0)));
    }

    #[test]
    fn test_disabled_color_moves_toward_gray() {
        let c = Color::from_rgb8(255, 0, 127).disabled();
        assert_eq!(c, Color::from_rgb8(159, 95, 127));
        assert_eq!(Color::GRAY.disabled(), Color::GRAY);
    }

    #[test]
    fn test_dark_color_halves_channels() {
        let c = Color::from_rgba8(200, 101, 0, 80).dark();
        assert_eq!(c, Color::from_rgba8(100, 50, 0, 80));
    }

    #[test]
    fn test_size_scaled_truncates() {
        assert_eq!(Size::new(120, 180).scaled(0.75), Size::new(90, 135));
        assert_eq!(Size::new(15, 15).scaled(0.5), Size::new(7, 7));
    }
}
