//! Checkable button: check boxes, radio buttons and tabs.
//!
//! A `StateButton` is a label plus a glyph (box or circle) placed according
//! to the label's [`TextFormat`]. Glyph placement is recomputed by
//! [`StateButton::reposition_button`] whenever the widget is resized.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use charter_core::{BevelSides, Color, Painter, Point, Rect, Signal, Size};

use crate::widget::text::{SharedFont, TextFormat, TextLabel};
use crate::widget::{Checkable, Clickable, PointerButton, Widget, WidgetBase};

/// Visual variant of a [`StateButton`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StateButtonStyle {
    #[default]
    CheckBox,
    Radio,
    /// A tab whose bottom edge joins the pane beneath it.
    TopAttachedTab,
    TopDetachedTab,
}

impl StateButtonStyle {
    fn is_tab(self) -> bool {
        matches!(self, Self::TopAttachedTab | Self::TopDetachedTab)
    }
}

const BEVEL: i32 = 2;
/// Gap between glyph and text, as a fraction of the glyph size.
const SPACING: f64 = 0.5;
/// Horizontal slack added to the minimum usable width.
const MIN_USABLE_PADDING: i32 = 25;

/// A toggle button with a checked state.
pub struct StateButton {
    base: WidgetBase,
    label: TextLabel,
    color: Color,
    interior_color: Color,
    style: StateButtonStyle,
    /// Shared so a [`RadioButtonGroup`](super::RadioButtonGroup) can flip
    /// members from inside a signal handler.
    checked: Arc<AtomicBool>,
    button_ul: Point,
    button_lr: Point,
    text_ul: Point,

    /// Emitted with the new state when the user toggles the button.
    pub checked_changed: Signal<bool>,
}

impl StateButton {
    pub fn new(
        text: impl Into<String>,
        font: SharedFont,
        format: TextFormat,
        color: Color,
        text_color: Color,
        style: StateButtonStyle,
    ) -> Self {
        let mut button = Self {
            base: WidgetBase::new::<Self>(),
            label: TextLabel::new(text, format, text_color, font),
            color,
            interior_color: Color::TRANSPARENT,
            style,
            checked: Arc::new(AtomicBool::new(false)),
            button_ul: Point::ZERO,
            button_lr: Point::ZERO,
            text_ul: Point::ZERO,
            checked_changed: Signal::new(),
        };
        button.set_button_position(None);
        button
    }

    /// Set geometry using builder pattern.
    pub fn with_geometry(mut self, rect: Rect) -> Self {
        self.size_move(rect.ul, rect.lr);
        self
    }

    pub fn with_interior_color(mut self, color: Color) -> Self {
        self.interior_color = color;
        self
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn style(&self) -> StateButtonStyle {
        self.style
    }

    pub fn set_style(&mut self, style: StateButtonStyle) {
        self.style = style;
        self.reposition_button();
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    pub fn interior_color(&self) -> Color {
        self.interior_color
    }

    pub fn set_interior_color(&mut self, color: Color) {
        self.interior_color = color;
    }

    pub fn text(&self) -> &str {
        self.label.text()
    }

    pub fn label(&self) -> &TextLabel {
        &self.label
    }

    pub fn text_format(&self) -> TextFormat {
        self.label.format()
    }

    pub fn set_text_format(&mut self, format: TextFormat) {
        self.label.set_format(format);
        self.reposition_button();
    }

    pub fn button_upper_left(&self) -> Point {
        self.button_ul
    }

    pub fn button_lower_right(&self) -> Point {
        self.button_lr
    }

    pub fn text_upper_left(&self) -> Point {
        self.text_ul
    }

    /// Uncheck without notifying.
    pub fn reset(&mut self) {
        self.set_checked(false);
    }

    pub(crate) fn check_cell(&self) -> Arc<AtomicBool> {
        self.checked.clone()
    }

    // =========================================================================
    // Layout
    // =========================================================================

    /// Place the glyph explicitly, or at its default position with `None`.
    ///
    /// A non-positive glyph size falls back to a square of the font's point
    /// size.
    pub fn set_button_position(&mut self, position: Option<(Point, Point)>) {
        let (ul, lr) = position.unwrap_or((Point::new(-1, -1), Point::new(-1, -1)));
        let mut size = Size::new(lr.x - ul.x, lr.y - ul.y);
        if size.width <= 0 || size.height <= 0 {
            let pts = self.label.font().point_size();
            size = Size::new(pts, pts);
        }

        match position {
            None => {
                self.button_ul = Point::ZERO;
                self.button_lr = size.to_point();
                self.reposition_button();
            }
            Some(_) => {
                self.button_ul = ul;
                self.button_lr = ul + size.to_point();
            }
        }
    }

    /// Recompute glyph and text placement from size, font and format.
    pub fn reposition_button(&mut self) {
        if self.style.is_tab() {
            self.button_ul = Point::ZERO;
            self.button_lr = Point::ZERO;
            self.text_ul = Point::ZERO;
            return;
        }

        let w = f64::from(self.base.width());
        let h = f64::from(self.base.height());
        let bn_w = self.button_lr.x - self.button_ul.x;
        let bn_h = self.button_lr.y - self.button_ul.y;
        let (bw, bh) = (f64::from(bn_w), f64::from(bn_h));
        let mut bn_x = self.button_ul.x;
        let mut bn_y = self.button_ul.y;
        let mut text_ul = Point::ZERO;

        let original_format = self.label.format();
        let mut format = original_format;

        if format.contains(TextFormat::VCENTER) {
            bn_y = ((h - bh) / 2.0 + 0.5) as i32;
        }
        if format.contains(TextFormat::TOP) {
            bn_y = 0;
            text_ul.y = bn_h;
        }
        if format.contains(TextFormat::BOTTOM) {
            bn_y = self.base.height() - bn_h;
            let font = self.label.font();
            let text_height =
                f64::from((self.label.line_count() - 1) * font.lineskip() + font.height());
            text_ul.y = (h - bh * (1.0 + SPACING) - text_height + 0.5) as i32;
        }

        if format.contains(TextFormat::CENTER) {
            if format.contains(TextFormat::VCENTER) {
                format.remove(TextFormat::CENTER);
                format.insert(TextFormat::LEFT);
            } else {
                bn_x = ((w - bw) / 2.0 + 0.5) as i32;
            }
        }
        if format.contains(TextFormat::LEFT) {
            bn_x = 0;
            if format.contains(TextFormat::VCENTER) {
                text_ul.x = (bw * (1.0 + SPACING) + 0.5) as i32;
            }
        }
        if format.contains(TextFormat::RIGHT) {
            bn_x = self.base.width() - bn_w;
            if format.contains(TextFormat::VCENTER) {
                text_ul.x = (-bw * (1.0 + SPACING) + 0.5) as i32;
            }
        }

        if format != original_format {
            self.label.set_format(format);
        }
        self.button_ul = Point::new(bn_x, bn_y);
        self.button_lr = self.button_ul + Point::new(bn_w, bn_h);
        self.text_ul = text_ul;
    }

    /// Where the label is drawn, relative to the widget.
    fn text_origin(&self) -> Point {
        let extent = self.label.extent();
        let format = self.label.format();
        let width = self.base.width();
        let x = if format.contains(TextFormat::RIGHT) {
            width + self.text_ul.x - extent.width
        } else if format.contains(TextFormat::LEFT) {
            self.text_ul.x
        } else {
            self.text_ul.x + (width - extent.width) / 2
        };
        let y = if format.contains(TextFormat::VCENTER) || self.style.is_tab() {
            self.text_ul.y + (self.base.height() - extent.height) / 2
        } else {
            self.text_ul.y
        };
        Point::new(x, y)
    }
}

impl Widget for StateButton {
    fn widget_base(&self) -> &WidgetBase {
        &self.base
    }

    fn widget_base_mut(&mut self) -> &mut WidgetBase {
        &mut self.base
    }

    fn min_usable_size(&self) -> Size {
        let text_lr = self.text_ul + self.label.extent().to_point();
        Size::new(
            self.button_lr.x.max(text_lr.x) - self.button_ul.x.min(self.text_ul.x)
                + MIN_USABLE_PADDING,
            self.button_lr.y.max(text_lr.y) - self.button_ul.y.min(self.text_ul.y),
        )
    }

    fn size_move(&mut self, ul: Point, lr: Point) {
        self.base.set_geometry(Rect::new(ul, lr));
        self.reposition_button();
    }

    fn render(&self, painter: &mut dyn Painter, origin: Point) {
        let disabled = self.is_disabled();
        let color = self.color.with_disabled(disabled);
        let interior = self.interior_color.with_disabled(disabled);
        let bn_rect = Rect::new(origin + self.button_ul, origin + self.button_lr);
        let mut text_offset = Point::ZERO;

        match self.style {
            StateButtonStyle::CheckBox => {
                painter.beveled_rectangle(bn_rect, interior, color, false, BEVEL, BevelSides::ALL);
                if self.is_checked() {
                    painter.beveled_check(bn_rect.deflate(2 * BEVEL), color);
                }
            }
            StateButtonStyle::Radio => {
                painter.beveled_circle(bn_rect, interior, color, false, BEVEL);
                if self.is_checked() {
                    painter.bubble(bn_rect.deflate(2 * BEVEL), color);
                }
            }
            StateButtonStyle::TopAttachedTab | StateButtonStyle::TopDetachedTab => {
                let tab_color = if self.is_checked() { self.color } else { self.color.dark() };
                let tab_color = tab_color.with_disabled(disabled);
                let mut rect = Rect::from_pos_size(origin, self.base.size());
                if !self.is_checked() {
                    rect.ul.y += BEVEL;
                    text_offset.y = BEVEL / 2;
                }
                let sides = if self.style == StateButtonStyle::TopAttachedTab {
                    BevelSides::NO_BOTTOM
                } else {
                    BevelSides::ALL
                };
                painter.beveled_rectangle(rect, tab_color, tab_color, true, BEVEL, sides);
            }
        }

        let text_color = self.label.color().with_disabled(disabled);
        self.label
            .render_at(painter, origin + self.text_origin() + text_offset, text_color);
    }
}

impl Checkable for StateButton {
    fn is_checked(&self) -> bool {
        self.checked.load(Ordering::SeqCst)
    }

    fn set_checked(&mut self, checked: bool) {
        if self.checked.swap(checked, Ordering::SeqCst) != checked {
            self.base.update();
        }
    }
}

impl Clickable for StateButton {
    fn handle_pointer_down(&mut self, _button: PointerButton) {}

    fn handle_pointer_drag(&mut self, _button: PointerButton) {}

    fn handle_pointer_up(&mut self, _button: PointerButton) {}

    /// Toggle and announce the new state. Only primary clicks toggle.
    fn handle_click(&mut self, button: PointerButton) {
        if button == PointerButton::Left && !self.is_disabled() {
            let checked = !self.is_checked();
            self.set_checked(checked);
            self.checked_changed.emit(checked);
        }
    }

    fn handle_pointer_enter(&mut self) {}

    fn handle_pointer_leave(&mut self) {}
}

static_assertions::assert_impl_all!(StateButton: Send, Sync);
