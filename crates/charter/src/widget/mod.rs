//! Widget system for Charter.
//!
//! Widgets are plain structs that embed a [`WidgetBase`] and implement
//! [`Widget`]. Capabilities are expressed as separate traits
//! ([`Clickable`], [`Checkable`], [`drag_drop::DropTarget`],
//! [`drag_drop::DragSource`]) instead of an inheritance chain.
//!
//! # Rendering
//!
//! Rendering is a pure function of widget state. [`Widget::render`] receives
//! the absolute upper-left of the widget; containers call
//! [`render_child`] for each child so that hidden children are skipped.

pub mod base;
pub mod drag_drop;
pub mod events;
pub mod layout;
pub mod text;
pub mod widgets;

use charter_core::{ObjectId, Painter, Point, Rect, Size};

pub use base::WidgetBase;
pub use drag_drop::{
    DragData, DragDropManager, DragItem, DragResult, DragSource, DragState, DropTarget,
};
pub use events::{Key, ModKeys, PointerButton};
pub use layout::GridLayout;
pub use text::{
    FontMetrics, FontProvider, MonospaceFonts, MonospaceMetrics, SharedFont, TextFormat, TextLabel,
};
pub use widgets::{
    Button, ButtonState, Orientation, RadioButtonGroup, StateButton, StateButtonStyle,
};

/// The interface every widget implements.
pub trait Widget: Send + Sync {
    // =========================================================================
    // Required Methods
    // =========================================================================

    /// Access the embedded base.
    fn widget_base(&self) -> &WidgetBase;

    /// Mutably access the embedded base.
    fn widget_base_mut(&mut self) -> &mut WidgetBase;

    /// Draw the widget with its upper-left corner at `origin`.
    fn render(&self, painter: &mut dyn Painter, origin: Point);

    // =========================================================================
    // Provided Methods
    // =========================================================================

    /// The smallest size at which the widget is still usable.
    fn min_usable_size(&self) -> Size {
        self.widget_base().size()
    }

    /// Move and resize. Containers override this to lay out their children.
    fn size_move(&mut self, ul: Point, lr: Point) {
        self.widget_base_mut().set_geometry(Rect::new(ul, lr));
    }

    /// Resize keeping the upper-left corner.
    fn resize(&mut self, size: Size) {
        let ul = self.widget_base().pos();
        self.size_move(ul, Point::new(ul.x + size.width, ul.y + size.height));
    }

    /// Move keeping the size.
    fn move_to(&mut self, ul: Point) {
        let size = self.widget_base().size();
        self.size_move(ul, Point::new(ul.x + size.width, ul.y + size.height));
    }

    fn object_id(&self) -> ObjectId {
        self.widget_base().object_id()
    }

    fn geometry(&self) -> Rect {
        self.widget_base().geometry()
    }

    fn size(&self) -> Size {
        self.widget_base().size()
    }

    fn is_visible(&self) -> bool {
        self.widget_base().is_visible()
    }

    fn show(&mut self) {
        self.widget_base_mut().show();
    }

    fn hide(&mut self) {
        self.widget_base_mut().hide();
    }

    /// Disabled directly or through an ancestor.
    fn is_disabled(&self) -> bool {
        !self.widget_base().is_effectively_enabled()
    }

    fn set_disabled(&mut self, disabled: bool) {
        self.widget_base_mut().set_enabled(!disabled);
    }
}

/// Widgets that react to pointer clicks.
pub trait Clickable: Widget {
    fn handle_pointer_down(&mut self, button: PointerButton);
    fn handle_pointer_drag(&mut self, button: PointerButton);
    fn handle_pointer_up(&mut self, button: PointerButton);
    fn handle_click(&mut self, button: PointerButton);
    fn handle_pointer_enter(&mut self);
    fn handle_pointer_leave(&mut self);
}

/// Widgets with a checked state.
pub trait Checkable: Widget {
    fn is_checked(&self) -> bool;

    /// Set the state without notifying anyone.
    fn set_checked(&mut self, checked: bool);
}

/// Render `child` relative to its parent's absolute origin, unless hidden.
pub fn render_child(child: &dyn Widget, painter: &mut dyn Painter, parent_origin: Point) {
    if child.is_visible() {
        child.render(painter, parent_origin + child.geometry().ul);
    }
}
