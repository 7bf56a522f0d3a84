//! Text labels and the font metrics they are measured with.
//!
//! Font rasterisation belongs to the host; widgets only need metrics to lay
//! themselves out. [`MonospaceMetrics`] is a fixed-advance implementation
//! that is good enough for headless layout.

use std::sync::Arc;

use bitflags::bitflags;
use charter_core::{Color, Painter, Point, Rect, Size};

bitflags! {
    /// Text alignment and wrapping flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TextFormat: u16 {
        const TOP = 1 << 0;
        const VCENTER = 1 << 1;
        const BOTTOM = 1 << 2;
        const LEFT = 1 << 3;
        const CENTER = 1 << 4;
        const RIGHT = 1 << 5;
        const WORDBREAK = 1 << 6;
        const LINEWRAP = 1 << 7;
    }
}

/// Metrics of a font, supplied by the host.
pub trait FontMetrics: Send + Sync {
    /// Nominal point size.
    fn point_size(&self) -> i32;

    /// Height of one line of glyphs.
    fn height(&self) -> i32;

    /// Distance between the tops of consecutive lines.
    fn lineskip(&self) -> i32;

    /// Advance width of a single line.
    fn text_width(&self, line: &str) -> i32;

    /// Extent of possibly multi-line text.
    fn text_extent(&self, text: &str) -> Size {
        if text.is_empty() {
            return Size::ZERO;
        }
        let mut lines = 0;
        let mut width = 0;
        for line in text.lines() {
            lines += 1;
            width = width.max(self.text_width(line));
        }
        Size::new(width, (lines - 1) * self.lineskip() + self.height())
    }
}

/// Shared handle to font metrics.
pub type SharedFont = Arc<dyn FontMetrics>;

/// Fixed-advance font metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonospaceMetrics {
    pub point_size: i32,
    pub char_width: i32,
    pub height: i32,
    pub lineskip: i32,
}

impl MonospaceMetrics {
    /// Metrics derived from a point size.
    pub fn new(point_size: i32) -> Self {
        let height = point_size + point_size / 3;
        Self {
            point_size,
            char_width: (point_size * 3 / 5).max(1),
            height,
            lineskip: height + 1,
        }
    }

    /// Wrap in a [`SharedFont`].
    pub fn shared(point_size: i32) -> SharedFont {
        Arc::new(Self::new(point_size))
    }
}

impl FontMetrics for MonospaceMetrics {
    fn point_size(&self) -> i32 {
        self.point_size
    }

    fn height(&self) -> i32 {
        self.height
    }

    fn lineskip(&self) -> i32 {
        self.lineskip
    }

    fn text_width(&self, line: &str) -> i32 {
        line.chars().count() as i32 * self.char_width
    }
}

/// Source of fonts at arbitrary point sizes, supplied by the host.
pub trait FontProvider: Send + Sync {
    /// Regular face at `point_size`.
    fn font(&self, point_size: i32) -> SharedFont;

    /// Bold face at `point_size`. Hosts without one fall back to regular.
    fn bold_font(&self, point_size: i32) -> SharedFont {
        self.font(point_size)
    }
}

/// Hands out [`MonospaceMetrics`] for every size.
#[derive(Debug, Clone, Copy, Default)]
pub struct MonospaceFonts;

impl FontProvider for MonospaceFonts {
    fn font(&self, point_size: i32) -> SharedFont {
        MonospaceMetrics::shared(point_size)
    }
}

/// A run of text with a format, colour and font.
#[derive(Clone)]
pub struct TextLabel {
    text: String,
    format: TextFormat,
    color: Color,
    font: SharedFont,
}

impl TextLabel {
    pub fn new(
        text: impl Into<String>,
        format: TextFormat,
        color: Color,
        font: SharedFont,
    ) -> Self {
        Self {
            text: text.into(),
            format,
            color,
            font,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn format(&self) -> TextFormat {
        self.format
    }

    pub fn set_format(&mut self, format: TextFormat) {
        self.format = format;
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    pub fn font(&self) -> &SharedFont {
        &self.font
    }

    pub fn set_font(&mut self, font: SharedFont) {
        self.font = font;
    }

    /// Number of lines, at least one.
    pub fn line_count(&self) -> i32 {
        self.text.lines().count().max(1) as i32
    }

    /// Extent of the whole text.
    pub fn extent(&self) -> Size {
        self.font.text_extent(&self.text)
    }

    /// Upper-left of the text when aligned inside `rect` by its format.
    ///
    /// Horizontal alignment defaults to centred; vertical defaults to centred.
    pub fn origin_in(&self, rect: Rect) -> Point {
        let extent = self.extent();
        let x = if self.format.contains(TextFormat::LEFT) {
            rect.left()
        } else if self.format.contains(TextFormat::RIGHT) {
            rect.right() - extent.width
        } else {
            rect.left() + (rect.width() - extent.width) / 2
        };
        let y = if self.format.contains(TextFormat::TOP) {
            rect.top()
        } else if self.format.contains(TextFormat::BOTTOM) {
            rect.bottom() - extent.height
        } else {
            rect.top() + (rect.height() - extent.height) / 2
        };
        Point::new(x, y)
    }

    /// Draw the text line by line starting at `origin`.
    pub fn render_at(&self, painter: &mut dyn Painter, origin: Point, color: Color) {
        let lineskip = self.font.lineskip();
        for (i, line) in self.text.lines().enumerate() {
            painter.draw_text(Point::new(origin.x, origin.y + i as i32 * lineskip), line, color);
        }
    }
}

impl std::fmt::Debug for TextLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextLabel")
            .field("text", &self.text)
            .field("format", &self.format)
            .field("color", &self.color)
            .finish()
    }
}
