//! Push button with a three-state press model.
//!
//! # State machine
//!
//! | Input          | New state  | Side effect                                   |
//! |----------------|------------|-----------------------------------------------|
//! | pointer down   | `Pressed`  | re-fires click if already pressed and repeating |
//! | pointer drag   | `Pressed`  |                                               |
//! | pointer up     | `Unpressed`|                                               |
//! | click          | `Rollover` | fires `left_clicked` / `right_clicked`        |
//! | pointer enter  | `Rollover` |                                               |
//! | pointer leave  | `Unpressed`|                                               |
//!
//! Disabled buttons ignore every input.

use charter_core::{BevelSides, Color, Painter, Point, Rect, Signal, Size, SubImage};

use crate::widget::text::{SharedFont, TextFormat, TextLabel};
use crate::widget::{Clickable, PointerButton, Widget, WidgetBase};
use charter_core::logging::targets;

/// Visual press state of a [`Button`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ButtonState {
    #[default]
    Unpressed,
    Pressed,
    Rollover,
}

/// Offset applied to the label while pressed.
const PRESSED_TEXT_OFFSET: Point = Point::new(1, 1);
/// Offset of the label's drop shadow.
const SHADOW_OFFSET: Point = Point::new(2, 2);

/// A clickable button with a text label.
pub struct Button {
    base: WidgetBase,
    label: TextLabel,
    color: Color,
    state: ButtonState,
    repeat_on_hold: bool,
    unpressed_graphic: Option<SubImage>,
    pressed_graphic: Option<SubImage>,
    rollover_graphic: Option<SubImage>,

    /// Emitted on a completed primary click.
    pub left_clicked: Signal<()>,
    /// Emitted on a completed secondary click.
    pub right_clicked: Signal<()>,
}

impl Button {
    /// Create a button with a centred label.
    pub fn new(text: impl Into<String>, font: SharedFont, color: Color, text_color: Color) -> Self {
        Self {
            base: WidgetBase::new::<Self>(),
            label: TextLabel::new(text, TextFormat::CENTER | TextFormat::VCENTER, text_color, font),
            color,
            state: ButtonState::Unpressed,
            repeat_on_hold: false,
            unpressed_graphic: None,
            pressed_graphic: None,
            rollover_graphic: None,
            left_clicked: Signal::new(),
            right_clicked: Signal::new(),
        }
    }

    /// Set geometry using builder pattern.
    pub fn with_geometry(mut self, rect: Rect) -> Self {
        self.base.set_geometry(rect);
        self
    }

    /// Re-fire clicks while a pointer button is held down.
    pub fn with_repeat_on_hold(mut self, repeat: bool) -> Self {
        self.repeat_on_hold = repeat;
        self
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn state(&self) -> ButtonState {
        self.state
    }

    /// Force a state, bypassing input handling.
    pub fn set_state(&mut self, state: ButtonState) {
        if self.state != state {
            self.state = state;
            self.base.update();
        }
    }

    pub fn text(&self) -> &str {
        self.label.text()
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.label.set_text(text);
        self.base.update();
    }

    pub fn label(&self) -> &TextLabel {
        &self.label
    }

    pub fn label_mut(&mut self) -> &mut TextLabel {
        &mut self.label
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
        self.base.update();
    }

    pub fn repeat_on_hold(&self) -> bool {
        self.repeat_on_hold
    }

    pub fn set_repeat_on_hold(&mut self, repeat: bool) {
        self.repeat_on_hold = repeat;
    }

    pub fn unpressed_graphic(&self) -> Option<&SubImage> {
        self.unpressed_graphic.as_ref()
    }

    pub fn set_unpressed_graphic(&mut self, graphic: Option<SubImage>) {
        self.unpressed_graphic = graphic;
    }

    pub fn pressed_graphic(&self) -> Option<&SubImage> {
        self.pressed_graphic.as_ref()
    }

    pub fn set_pressed_graphic(&mut self, graphic: Option<SubImage>) {
        self.pressed_graphic = graphic;
    }

    pub fn rollover_graphic(&self) -> Option<&SubImage> {
        self.rollover_graphic.as_ref()
    }

    pub fn set_rollover_graphic(&mut self, graphic: Option<SubImage>) {
        self.rollover_graphic = graphic;
    }

    fn clicked_signal(&self, button: PointerButton) -> &Signal<()> {
        match button {
            PointerButton::Left => &self.left_clicked,
            PointerButton::Right => &self.right_clicked,
        }
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    fn graphic_for_state(&self) -> Option<&SubImage> {
        match self.state {
            ButtonState::Unpressed => self.unpressed_graphic.as_ref(),
            ButtonState::Pressed => self.pressed_graphic.as_ref(),
            ButtonState::Rollover => self.rollover_graphic.as_ref(),
        }
    }

    fn render_background(&self, painter: &mut dyn Painter, rect: Rect) {
        let color = self.color.with_disabled(self.is_disabled());
        match self.graphic_for_state() {
            Some(graphic) => painter.blit(graphic, rect, color),
            None => painter.beveled_rectangle(
                rect,
                color,
                color,
                self.state != ButtonState::Pressed,
                1,
                BevelSides::ALL,
            ),
        }
    }
}

impl Widget for Button {
    fn widget_base(&self) -> &WidgetBase {
        &self.base
    }

    fn widget_base_mut(&mut self) -> &mut WidgetBase {
        &mut self.base
    }

    fn min_usable_size(&self) -> Size {
        self.label.extent()
    }

    fn render(&self, painter: &mut dyn Painter, origin: Point) {
        let rect = Rect::from_pos_size(origin, self.base.size());
        self.render_background(painter, rect);

        let text_origin = self.label.origin_in(rect);
        let text_color = self.label.color().with_disabled(self.is_disabled());
        match self.state {
            ButtonState::Pressed => {
                self.label.render_at(painter, text_origin + PRESSED_TEXT_OFFSET, text_color);
            }
            ButtonState::Unpressed | ButtonState::Rollover => {
                self.label.render_at(painter, text_origin + SHADOW_OFFSET, Color::SHADOW);
                self.label.render_at(painter, text_origin, text_color);
            }
        }
    }
}

impl Clickable for Button {
    fn handle_pointer_down(&mut self, button: PointerButton) {
        if self.is_disabled() {
            return;
        }
        let previous = self.state;
        self.set_state(ButtonState::Pressed);
        if previous == ButtonState::Pressed && self.repeat_on_hold {
            tracing::trace!(target: targets::BUTTON, ?button, "repeating click while held");
            self.clicked_signal(button).emit(());
        }
    }

    fn handle_pointer_drag(&mut self, _button: PointerButton) {
        if !self.is_disabled() {
            self.set_state(ButtonState::Pressed);
        }
    }

    fn handle_pointer_up(&mut self, _button: PointerButton) {
        if !self.is_disabled() {
            self.set_state(ButtonState::Unpressed);
        }
    }

    fn handle_click(&mut self, button: PointerButton) {
        if !self.is_disabled() {
            self.set_state(ButtonState::Rollover);
            self.clicked_signal(button).emit(());
        }
    }

    fn handle_pointer_enter(&mut self) {
        if !self.is_disabled() {
            self.set_state(ButtonState::Rollover);
        }
    }

    fn handle_pointer_leave(&mut self) {
        if !self.is_disabled() {
            self.set_state(ButtonState::Unpressed);
        }
    }
}

static_assertions::assert_impl_all!(Button: Send, Sync);
