//! The government window: the policy palette above the adopted slots.
//!
//! Drags are driven from outside through [`GovernmentWnd::begin_drag`],
//! [`GovernmentWnd::drag_to`] and [`GovernmentWnd::release`], with points in
//! window coordinates. The window finds the slot or palette under the
//! pointer, asks it whether it takes the drag, and on release lets the
//! target accept and the source give the dragged control up. Everything
//! those hooks request is applied afterwards by
//! [`GovernmentWnd::process_pending`].

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use charter_core::logging::targets;
use charter_core::{
    Color, ConnectionId, ObjectId, Painter, Point, Rect, Signal, Size, global_registry,
};
use parking_lot::Mutex;

use super::domain::{GovernmentContext, PolicyRef};
use super::main_panel::MainPanel;
use super::palette::PolicyPalette;
use crate::config::UiConfig;
use crate::widget::{
    DragData, DragDropManager, DragItem, DragSource, DropTarget, FontProvider, ModKeys, Orientation,
    RadioButtonGroup, StateButton, StateButtonStyle, TextFormat, Widget, WidgetBase, render_child,
};

const SIZE_BUTTON_COLOR: Color = Color::from_rgb8(60, 80, 120);

/// Requests queued by child signal handlers, applied by
/// [`GovernmentWnd::process_pending`].
#[derive(Debug, Clone)]
pub enum GovernmentRequest {
    AddPolicy(PolicyRef),
    ClearPolicy(String),
    Refresh,
}

/// Where a drag started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragOrigin {
    /// The occupant of a main panel slot.
    Slot(usize),
    /// A control in the palette list, by position in the list.
    Palette(usize),
}

/// What lies under the pointer during a drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropZone {
    Slot(usize),
    Palette,
}

/// The government screen.
pub struct GovernmentWnd {
    base: WidgetBase,
    context: Arc<GovernmentContext>,
    config: UiConfig,
    palette: PolicyPalette,
    main_panel: MainPanel,
    size_buttons: RadioButtonGroup,
    drag: DragDropManager,
    drag_origin: Option<DragOrigin>,
    drag_zone: Option<DropZone>,
    dirty: Arc<AtomicBool>,
    changed_connection: ConnectionId,
    pending: Arc<Mutex<Vec<GovernmentRequest>>>,

    /// A palette policy was clicked; the host should show its details.
    pub zoom_to_policy: Signal<String>,
    /// The window asked to be closed.
    pub closing: Signal<()>,
}

impl GovernmentWnd {
    pub fn new(
        context: Arc<GovernmentContext>,
        fonts: Arc<dyn FontProvider>,
        config: UiConfig,
    ) -> Self {
        let pending: Arc<Mutex<Vec<GovernmentRequest>>> = Arc::new(Mutex::new(Vec::new()));

        let main_panel = MainPanel::new(context.clone(), fonts.clone(), &config);
        let palette = PolicyPalette::new(context.clone(), fonts.clone(), &config);

        let queue = pending.clone();
        palette
            .policy_double_clicked
            .connect(move |policy| queue.lock().push(GovernmentRequest::AddPolicy(policy.clone())));
        let queue = pending.clone();
        palette
            .clear_policy
            .connect(move |name| queue.lock().push(GovernmentRequest::ClearPolicy(name.clone())));

        let mut size_buttons = RadioButtonGroup::new(Orientation::Horizontal);
        size_buttons.set_expand_buttons(true);
        size_buttons.set_expand_buttons_proportionally(true);
        let font = fonts.font(config.font_pts);
        for zoom in &config.zoom_factors {
            size_buttons.add_button(StateButton::new(
                format!("{}%", (zoom * 100.0).round() as i32),
                font.clone(),
                TextFormat::CENTER,
                SIZE_BUTTON_COLOR,
                Color::WHITE,
                StateButtonStyle::TopAttachedTab,
            ));
        }
        size_buttons.set_check(Some(0));

        let dirty = Arc::new(AtomicBool::new(false));
        let flag = dirty.clone();
        let changed_connection = context
            .policies_changed
            .connect(move |_| flag.store(true, Ordering::SeqCst));

        let mut wnd = Self {
            base: WidgetBase::new::<Self>(),
            context,
            config,
            palette,
            main_panel,
            size_buttons,
            drag: DragDropManager::new(),
            drag_origin: None,
            drag_zone: None,
            dirty,
            changed_connection,
            pending,
            zoom_to_policy: Signal::new(),
            closing: Signal::new(),
        };
        wnd.base.set_name("GovernmentWnd");

        let zoom = wnd.zoom_to_policy.handle();
        wnd.palette
            .policy_clicked
            .connect(move |(policy, _mods)| zoom.emit(policy.name.clone()));
        let queue = wnd.pending.clone();
        wnd.size_buttons
            .button_changed
            .connect(move |_| queue.lock().push(GovernmentRequest::Refresh));

        let id = wnd.object_id();
        for child in [
            wnd.main_panel.widget_base(),
            wnd.palette.widget_base(),
            wnd.size_buttons.widget_base(),
        ] {
            if let Err(err) = child.set_parent(Some(id)) {
                tracing::error!(
                    target: targets::GOVERNMENT,
                    %err,
                    "could not attach government child"
                );
            }
        }
        wnd.refresh();
        wnd
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn palette(&self) -> &PolicyPalette {
        &self.palette
    }

    pub fn palette_mut(&mut self) -> &mut PolicyPalette {
        &mut self.palette
    }

    pub fn main_panel(&self) -> &MainPanel {
        &self.main_panel
    }

    pub fn main_panel_mut(&mut self) -> &mut MainPanel {
        &mut self.main_panel
    }

    pub fn size_buttons(&self) -> &RadioButtonGroup {
        &self.size_buttons
    }

    pub fn size_buttons_mut(&mut self) -> &mut RadioButtonGroup {
        &mut self.size_buttons
    }

    pub fn drag_manager(&self) -> &DragDropManager {
        &self.drag
    }

    /// Whether a domain change is waiting for [`update`](Self::update).
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    // =========================================================================
    // Zoom
    // =========================================================================

    /// Zoom factor of the checked size button.
    pub fn policy_zoom_factor(&self) -> f64 {
        match self
            .size_buttons
            .checked_button()
            .and_then(|i| self.config.zoom_factors.get(i))
        {
            Some(zoom) => *zoom,
            None => {
                tracing::debug!(
                    target: targets::GOVERNMENT,
                    "GovernmentWnd::policy_zoom_factor: no size button checked"
                );
                1.0
            }
        }
    }

    pub fn policy_slot_size(&self) -> Size {
        self.config.slot_size().scaled(self.policy_zoom_factor())
    }

    pub fn policy_text_size(&self) -> i32 {
        (f64::from(self.config.font_pts) * self.policy_zoom_factor()) as i32
    }

    // =========================================================================
    // Contents
    // =========================================================================

    /// Rebuild palette and slots at the current zoom.
    pub fn refresh(&mut self) {
        let slot_size = self.policy_slot_size();
        let text_pts = self.policy_text_size();
        tracing::debug!(
            target: targets::GOVERNMENT,
            ?slot_size,
            text_pts,
            "refreshing government window"
        );

        self.palette.set_policy_size(slot_size, text_pts);
        self.palette.populate();
        self.main_panel.set_policy_size(slot_size, text_pts);
        self.main_panel.refresh();
        self.dirty.store(false, Ordering::SeqCst);
    }

    pub fn reset(&mut self) {
        self.refresh();
    }

    /// Once per frame: rebuild after a domain change, then free widget nodes
    /// nothing holds any more.
    pub fn update(&mut self) {
        if self.dirty.swap(false, Ordering::SeqCst) {
            self.refresh();
        }
        let collected = global_registry().collect_garbage();
        if collected > 0 {
            tracing::trace!(target: targets::GOVERNMENT, collected, "collected widget nodes");
        }
    }

    pub fn close(&mut self) {
        if let Some(data) = self.drag.cancel() {
            self.restore_source(&data);
        }
        self.closing.emit(());
    }

    /// Palette on the top half, slots on the bottom, size buttons over the
    /// slots' top left corner.
    pub fn do_layout(&mut self) {
        let size = self.base.size();
        let pad = self.config.pad;
        let button_height = self.config.font_pts * 2;

        let palette_ul = Point::ZERO;
        let palette_lr = Point::new(size.width, size.height / 2);
        let main_ul = Point::new(0, size.height / 2 + pad);
        let main_lr = Point::new(size.width, size.height - self.config.inner_border_angle_offset);

        self.main_panel.size_move(main_ul, main_lr);
        self.palette.size_move(palette_ul, palette_lr);

        let num_buttons = self.size_buttons.num_buttons() as i32;
        let buttons_ul = main_ul + Point::new(pad, 0);
        let buttons_lr = main_ul
            + Point::new(
                (pad + self.config.policy_size_button_width) * num_buttons,
                button_height,
            );
        self.size_buttons.size_move(buttons_ul, buttons_lr);
    }

    // =========================================================================
    // Drag and drop
    // =========================================================================

    /// Which slot or palette lies under `point`, in window coordinates.
    pub fn zone_at(&self, point: Point) -> Option<DropZone> {
        let panel = self.main_panel.geometry();
        if panel.contains(point) {
            return self
                .main_panel
                .slot_at(point - panel.ul)
                .map(DropZone::Slot);
        }
        let list = self.palette.list().geometry().offset(self.palette.geometry().ul);
        list.contains(point).then_some(DropZone::Palette)
    }

    fn zone_id(&self, zone: DropZone) -> Option<ObjectId> {
        match zone {
            DropZone::Slot(i) => self.main_panel.slot(i).map(Widget::object_id),
            DropZone::Palette => Some(self.palette.list().object_id()),
        }
    }

    fn zone_target(&mut self, zone: Option<DropZone>) -> Option<&mut dyn DropTarget> {
        match zone? {
            DropZone::Slot(i) => self.main_panel.slot_mut(i).map(|s| s as &mut dyn DropTarget),
            DropZone::Palette => Some(self.palette.list_mut() as &mut dyn DropTarget),
        }
    }

    fn origin_source(&mut self, origin: Option<DragOrigin>) -> Option<&mut dyn DragSource> {
        match origin? {
            DragOrigin::Slot(i) => self.main_panel.slot_mut(i).map(|s| s as &mut dyn DragSource),
            DragOrigin::Palette(_) => Some(self.palette.list_mut() as &mut dyn DragSource),
        }
    }

    /// Arm a drag of the policy at `origin`, pressed at `point`. The drag
    /// starts once [`drag_to`](Self::drag_to) moves past the drag threshold.
    /// Returns false if there is nothing to drag there.
    pub fn begin_drag(&mut self, origin: DragOrigin, point: Point) -> bool {
        if self.drag.is_dragging() || self.drag.has_pending_drag() {
            self.cancel_drag();
        }
        let item = match origin {
            DragOrigin::Slot(i) => self.main_panel.slot(i).and_then(|s| s.occupant_drag_item()),
            DragOrigin::Palette(i) => self.palette.list().drag_item(i),
        };
        let Some(item) = item else {
            tracing::debug!(target: targets::DRAG_DROP, ?origin, "nothing to drag");
            return false;
        };

        self.drag.prepare_drag(DragData::single(item), point);
        self.drag_origin = Some(origin);
        self.drag_zone = None;
        true
    }

    /// Move the drag to `point`, entering and leaving zones as needed.
    pub fn drag_to(&mut self, point: Point, mods: ModKeys) {
        if self.drag.has_pending_drag() {
            if !self.drag.check_drag_start(point) {
                return;
            }
            let widget = self.drag.drag_data().and_then(DragData::first).map(DragItem::widget);
            let origin = self.drag_origin;
            if let (Some(widget), Some(source)) = (widget, self.origin_source(origin)) {
                source.starting_child_drag_drop(widget);
            }
        }
        let Some(data) = self.active_drag_data() else {
            return;
        };
        let zone = self.zone_at(point);
        let target = zone.and_then(|z| self.zone_id(z));
        self.drag.update_position(point, target);
        if zone == self.drag_zone {
            return;
        }

        let previous = self.drag_zone.take();
        if let Some(target) = self.zone_target(previous) {
            target.drag_drop_leave(&data);
        }
        let accepts = match self.zone_target(zone) {
            Some(target) => {
                target.drag_drop_enter(&data, mods);
                target.drops_acceptable(&data, mods)
            }
            None => false,
        };
        self.drag.set_target_accepts(accepts);
        self.drag_zone = zone;
    }

    /// Drop at the current position. Returns whether the drop was taken.
    pub fn release(&mut self, mods: ModKeys) -> bool {
        if self.drag.has_pending_drag() {
            // Released before the threshold: a press, not a drag.
            self.drag.cancel_pending();
            self.drag_origin = None;
            return false;
        }
        let zone = self.drag_zone.take();
        let origin = self.drag_origin.take();
        let Some(result) = self.drag.end_drag(true) else {
            return false;
        };
        let data = result.data;

        if result.accepted {
            if let Some(target) = self.zone_target(zone) {
                target.accept_drops(&data, mods);
            }
            if let Some(source) = self.origin_source(origin) {
                source.children_dragged_away(&data, result.target);
            }
            tracing::debug!(target: targets::DRAG_DROP, ?origin, ?zone, "policy dropped");
        } else {
            if let Some(target) = self.zone_target(zone) {
                target.drag_drop_leave(&data);
            }
            if let Some(source) = self.origin_source(origin) {
                source.cancelling_child_drag_drop(&data);
            }
        }
        self.process_pending();
        result.accepted
    }

    /// Abandon the drag and put the dragged control back.
    pub fn cancel_drag(&mut self) {
        if self.drag.has_pending_drag() {
            self.drag.cancel_pending();
            self.drag_origin = None;
            return;
        }
        let zone = self.drag_zone.take();
        if let Some(data) = self.drag.cancel() {
            if let Some(target) = self.zone_target(zone) {
                target.drag_drop_leave(&data);
            }
            self.restore_source(&data);
        }
    }

    fn restore_source(&mut self, data: &DragData) {
        let origin = self.drag_origin.take();
        if let Some(source) = self.origin_source(origin) {
            source.cancelling_child_drag_drop(data);
        }
    }

    fn active_drag_data(&self) -> Option<DragData> {
        self.drag.drag_data().cloned()
    }

    // =========================================================================
    // Requests
    // =========================================================================

    /// Apply everything the children and their handlers queued, until
    /// nothing is left. Returns how many requests were applied.
    pub fn process_pending(&mut self) -> usize {
        let mut total = 0;
        loop {
            let mut applied = self.palette.process_pending();
            applied += self.main_panel.process_pending();

            let requests = std::mem::take(&mut *self.pending.lock());
            applied += requests.len();
            for request in requests {
                tracing::trace!(target: targets::GOVERNMENT, ?request, "government request");
                match request {
                    GovernmentRequest::AddPolicy(policy) => self.main_panel.add_policy(&policy),
                    GovernmentRequest::ClearPolicy(name) => self.main_panel.clear_policy(&name),
                    GovernmentRequest::Refresh => self.refresh(),
                }
            }

            if applied == 0 {
                return total;
            }
            total += applied;
        }
    }
}

impl Widget for GovernmentWnd {
    fn widget_base(&self) -> &WidgetBase {
        &self.base
    }

    fn widget_base_mut(&mut self) -> &mut WidgetBase {
        &mut self.base
    }

    fn size_move(&mut self, ul: Point, lr: Point) {
        let old_size = self.base.size();
        self.base.set_geometry(Rect::new(ul, lr));
        if old_size != self.base.size() {
            self.do_layout();
        }
    }

    fn render(&self, painter: &mut dyn Painter, origin: Point) {
        render_child(&self.palette, painter, origin);
        render_child(&self.main_panel, painter, origin);
        render_child(&self.size_buttons, painter, origin);
    }
}

impl Drop for GovernmentWnd {
    fn drop(&mut self) {
        self.context.policies_changed.disconnect(self.changed_connection);
    }
}

impl std::fmt::Debug for GovernmentWnd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GovernmentWnd")
            .field("id", &self.object_id())
            .field("zoom", &self.policy_zoom_factor())
            .field("dirty", &self.is_dirty())
            .field("main_panel", &self.main_panel)
            .finish_non_exhaustive()
    }
}

static_assertions::assert_impl_all!(GovernmentWnd: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::domain::Policy;
    use crate::policy::memory::InMemoryGovernment;
    use crate::widget::{Clickable, DragState, MonospaceFonts, PointerButton};

    const ECONOMIC: &str = "ECONOMIC_CATEGORY";
    const SOCIAL: &str = "SOCIAL_CATEGORY";

    fn window() -> (Arc<InMemoryGovernment>, GovernmentWnd) {
        let government = Arc::new(InMemoryGovernment::new());
        government.add_policy(Policy::new("PLC_PLANETARY_INFRA", ECONOMIC, 4.0));
        government.add_policy(Policy::new("PLC_PROPAGANDA", SOCIAL, 5.0));
        government.set_slots(ECONOMIC, 1);
        government.set_slots(SOCIAL, 1);
        let context = government.clone().into_context();
        let mut wnd = GovernmentWnd::new(context, Arc::new(MonospaceFonts), UiConfig::default());
        wnd.size_move(Point::ZERO, Point::new(800, 1000));
        (government, wnd)
    }

    #[test]
    fn test_layout_splits_window() {
        let (_government, wnd) = window();
        assert_eq!(wnd.palette().geometry(), Rect::new(Point::ZERO, Point::new(800, 500)));
        assert_eq!(
            wnd.main_panel().geometry(),
            Rect::new(Point::new(0, 503), Point::new(800, 989))
        );
        assert_eq!(
            wnd.size_buttons().geometry(),
            Rect::new(Point::new(3, 503), Point::new(105, 527))
        );
    }

    #[test]
    fn test_size_buttons_zoom_policies() {
        let (_government, mut wnd) = window();
        assert_eq!(wnd.policy_zoom_factor(), 1.0);
        assert_eq!(wnd.policy_slot_size(), Size::new(120, 180));

        wnd.size_buttons_mut().button_mut(2).unwrap().handle_click(PointerButton::Left);
        assert_eq!(wnd.process_pending(), 1);
        assert_eq!(wnd.policy_zoom_factor(), 0.5);
        assert_eq!(wnd.policy_slot_size(), Size::new(60, 90));
        assert_eq!(wnd.policy_text_size(), 6);
        assert_eq!(wnd.main_panel().slot(0).unwrap().size(), Size::new(60, 90));
        assert_eq!(wnd.palette().list().slot_size(), Size::new(60, 90));
    }

    #[test]
    fn test_palette_double_click_adopts() {
        let (government, mut wnd) = window();
        let index = wnd
            .palette()
            .list()
            .policy_names()
            .iter()
            .position(|n| n == "PLC_PROPAGANDA")
            .unwrap();
        wnd.palette_mut().list_mut().control_mut(index).unwrap().handle_double_click();
        wnd.process_pending();

        assert_eq!(wnd.main_panel().policies(), vec!["", "PLC_PROPAGANDA"]);
        assert_eq!(government.issued().len(), 1);
        assert!(wnd.is_dirty());
        wnd.update();
        assert!(!wnd.is_dirty());
    }

    #[test]
    fn test_palette_click_requests_zoom() {
        let (_government, mut wnd) = window();
        let zoomed = Arc::new(Mutex::new(Vec::new()));
        let z = zoomed.clone();
        wnd.zoom_to_policy.connect(move |name| z.lock().push(name.clone()));

        wnd.palette_mut()
            .list_mut()
            .control_mut(0)
            .unwrap()
            .handle_click(ModKeys::empty());
        assert_eq!(*zoomed.lock(), vec!["PLC_PLANETARY_INFRA"]);
    }

    #[test]
    fn test_external_change_rebuilds_on_update() {
        let (government, mut wnd) = window();
        government.adopt(ECONOMIC, 0, "PLC_PLANETARY_INFRA");
        government.changed.emit(());
        assert_eq!(wnd.main_panel().policies(), vec!["", ""]);

        wnd.update();
        assert_eq!(wnd.main_panel().policies(), vec!["PLC_PLANETARY_INFRA", ""]);
    }

    #[test]
    fn test_drag_from_palette_to_slot() {
        let (government, mut wnd) = window();
        let origin = DragOrigin::Palette(0);
        assert!(wnd.begin_drag(origin, Point::new(10, 60)));

        let slot = wnd
            .main_panel()
            .slot(0)
            .unwrap()
            .geometry()
            .offset(wnd.main_panel().geometry().ul);
        let inside = slot.ul + Point::new(5, 5);
        assert_eq!(wnd.zone_at(inside), Some(DropZone::Slot(0)));
        wnd.drag_to(inside, ModKeys::empty());
        assert!(wnd.drag_manager().target_accepts());

        assert!(wnd.release(ModKeys::empty()));
        assert_eq!(wnd.main_panel().policies(), vec!["PLC_PLANETARY_INFRA", ""]);
        assert_eq!(government.issued().len(), 1);
        assert_eq!(wnd.palette().list().control_count(), 2);
    }

    #[test]
    fn test_drag_to_wrong_category_is_cancelled() {
        let (government, mut wnd) = window();
        assert!(wnd.begin_drag(DragOrigin::Palette(0), Point::new(10, 60)));

        let slot = wnd
            .main_panel()
            .slot(1)
            .unwrap()
            .geometry()
            .offset(wnd.main_panel().geometry().ul);
        wnd.drag_to(slot.ul + Point::new(5, 5), ModKeys::empty());
        assert!(!wnd.drag_manager().target_accepts());
        assert!(!wnd.release(ModKeys::empty()));
        assert!(government.issued().is_empty());
    }

    #[test]
    fn test_drag_slot_to_palette_revokes() {
        let (government, mut wnd) = window();
        government.adopt(SOCIAL, 0, "PLC_PROPAGANDA");
        wnd.refresh();

        assert!(wnd.begin_drag(DragOrigin::Slot(1), Point::new(200, 600)));
        assert!(wnd.drag_manager().has_pending_drag());
        assert!(wnd.main_panel().slot(1).unwrap().occupant().unwrap().is_visible());

        wnd.drag_to(Point::new(50, 100), ModKeys::CTRL);
        assert!(wnd.drag_manager().is_dragging());
        assert!(!wnd.main_panel().slot(1).unwrap().occupant().unwrap().is_visible());
        assert!(wnd.drag_manager().target_accepts());
        assert!(wnd.release(ModKeys::CTRL));

        assert_eq!(wnd.main_panel().policies(), vec!["", ""]);
        let last = government.issued().pop().unwrap();
        assert!(!last.adopt);
        assert_eq!(last.policy_name, "PLC_PROPAGANDA");
    }

    #[test]
    fn test_drag_waits_for_threshold() {
        let (government, mut wnd) = window();
        government.adopt(ECONOMIC, 0, "PLC_PLANETARY_INFRA");
        wnd.refresh();

        let press = Point::new(20, 600);
        assert!(wnd.begin_drag(DragOrigin::Slot(0), press));
        wnd.drag_to(press + Point::new(2, 1), ModKeys::empty());
        assert!(wnd.drag_manager().has_pending_drag());
        assert!(wnd.main_panel().slot(0).unwrap().occupant().unwrap().is_visible());

        // Released in place: nothing moves and nothing is issued.
        assert!(!wnd.release(ModKeys::empty()));
        assert_eq!(wnd.drag_manager().state(), DragState::Idle);
        assert!(wnd.main_panel().slot(0).unwrap().occupant().unwrap().is_visible());
        assert!(government.issued().is_empty());

        assert!(wnd.begin_drag(DragOrigin::Slot(0), press));
        wnd.drag_to(
            press + Point::new(0, DragDropManager::DEFAULT_DRAG_THRESHOLD),
            ModKeys::empty(),
        );
        assert!(wnd.drag_manager().is_dragging());
        assert!(!wnd.main_panel().slot(0).unwrap().occupant().unwrap().is_visible());
        wnd.cancel_drag();
        assert!(wnd.main_panel().slot(0).unwrap().occupant().unwrap().is_visible());
    }

    #[test]
    fn test_cancel_restores_occupant() {
        let (government, mut wnd) = window();
        government.adopt(ECONOMIC, 0, "PLC_PLANETARY_INFRA");
        wnd.refresh();

        assert!(wnd.begin_drag(DragOrigin::Slot(0), Point::new(20, 600)));
        wnd.cancel_drag();
        assert!(wnd.main_panel().slot(0).unwrap().occupant().unwrap().is_visible());
        assert!(!wnd.begin_drag(DragOrigin::Slot(1), Point::new(20, 600)));
    }
}
