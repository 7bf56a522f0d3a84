//! Widget base implementation.
//!
//! `WidgetBase` holds what every widget has in common: its registry node,
//! its parent-relative geometry and its change notifications. Visibility and
//! enabled state live in the registry so that effective state can be computed
//! through ancestors by id alone.

use charter_core::{
    ObjectBase, ObjectId, ObjectResult, Point, Rect, Retained, Signal, Size, global_registry,
};

/// Common state embedded in every widget.
pub struct WidgetBase {
    object_base: ObjectBase,

    /// Parent-relative bounds.
    geometry: Rect,

    needs_repaint: bool,

    /// Emitted when the geometry changes.
    pub geometry_changed: Signal<Rect>,

    /// Emitted when the widget's own visibility changes.
    pub visible_changed: Signal<bool>,

    /// Emitted when the widget's own enabled flag changes.
    pub enabled_changed: Signal<bool>,
}

impl WidgetBase {
    /// Create a base registered under the type name of `T`.
    pub fn new<T: ?Sized + 'static>() -> Self {
        Self {
            object_base: ObjectBase::new::<T>(),
            geometry: Rect::ZERO,
            needs_repaint: true,
            geometry_changed: Signal::new(),
            visible_changed: Signal::new(),
            enabled_changed: Signal::new(),
        }
    }

    // =========================================================================
    // Object System Delegation
    // =========================================================================

    #[inline]
    pub fn object_id(&self) -> ObjectId {
        self.object_base.id()
    }

    pub fn name(&self) -> String {
        self.object_base.name()
    }

    pub fn set_name(&self, name: impl Into<String>) {
        self.object_base.set_name(name);
    }

    pub fn parent_id(&self) -> Option<ObjectId> {
        self.object_base.parent()
    }

    pub fn set_parent(&self, parent: Option<ObjectId>) -> ObjectResult<()> {
        self.object_base.set_parent(parent)
    }

    /// Remove from the parent's children without orphaning.
    pub fn detach(&self) {
        self.object_base.detach();
    }

    pub fn children_ids(&self) -> Vec<ObjectId> {
        self.object_base.children()
    }

    /// Raise above all siblings.
    pub fn raise(&self) {
        self.object_base.raise();
    }

    /// Keep this widget's node alive past its owner.
    pub fn retain(&self) -> ObjectResult<Retained> {
        self.object_base.retain()
    }

    // =========================================================================
    // Geometry
    // =========================================================================

    #[inline]
    pub fn geometry(&self) -> Rect {
        self.geometry
    }

    pub fn set_geometry(&mut self, rect: Rect) {
        if self.geometry != rect {
            self.geometry = rect;
            self.needs_repaint = true;
            self.geometry_changed.emit(rect);
        }
    }

    #[inline]
    pub fn pos(&self) -> Point {
        self.geometry.ul
    }

    pub fn move_to(&mut self, pos: Point) {
        let size = self.geometry.size();
        self.set_geometry(Rect::from_pos_size(pos, size));
    }

    #[inline]
    pub fn size(&self) -> Size {
        self.geometry.size()
    }

    pub fn resize(&mut self, size: Size) {
        self.set_geometry(Rect::from_pos_size(self.geometry.ul, size));
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.geometry.width()
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.geometry.height()
    }

    /// Local bounds with the origin at zero.
    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::from_size(self.geometry.size())
    }

    // =========================================================================
    // Visibility
    // =========================================================================

    pub fn is_visible(&self) -> bool {
        global_registry().is_visible(self.object_id()).unwrap_or(false)
    }

    pub fn is_effectively_visible(&self) -> bool {
        global_registry()
            .is_effectively_visible(self.object_id())
            .unwrap_or(false)
    }

    pub fn set_visible(&mut self, visible: bool) {
        if self.is_visible() != visible {
            let _ = global_registry().set_visible(self.object_id(), visible);
            self.needs_repaint = true;
            self.visible_changed.emit(visible);
        }
    }

    pub fn show(&mut self) {
        self.set_visible(true);
    }

    pub fn hide(&mut self) {
        self.set_visible(false);
    }

    // =========================================================================
    // Enabled State
    // =========================================================================

    pub fn is_enabled(&self) -> bool {
        global_registry().is_enabled(self.object_id()).unwrap_or(false)
    }

    /// Enabled and not under a disabled ancestor.
    pub fn is_effectively_enabled(&self) -> bool {
        global_registry()
            .is_effectively_enabled(self.object_id())
            .unwrap_or(false)
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        if self.is_enabled() != enabled {
            let _ = global_registry().set_enabled(self.object_id(), enabled);
            self.needs_repaint = true;
            self.enabled_changed.emit(enabled);
        }
    }

    // =========================================================================
    // Repaint
    // =========================================================================

    #[inline]
    pub fn needs_repaint(&self) -> bool {
        self.needs_repaint
    }

    pub fn update(&mut self) {
        self.needs_repaint = true;
    }

    pub fn clear_repaint_flag(&mut self) {
        self.needs_repaint = false;
    }

    // =========================================================================
    // Coordinate Mapping
    // =========================================================================

    #[inline]
    pub fn map_to_parent(&self, point: Point) -> Point {
        point + self.geometry.ul
    }

    #[inline]
    pub fn map_from_parent(&self, point: Point) -> Point {
        point - self.geometry.ul
    }

    /// Check a parent-relative point against the bounds.
    #[inline]
    pub fn contains_point(&self, point: Point) -> bool {
        self.geometry.contains(point)
    }
}

impl std::fmt::Debug for WidgetBase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WidgetBase")
            .field("id", &self.object_id())
            .field("geometry", &self.geometry)
            .finish()
    }
}
