//! A slot in the government that holds at most one adopted policy.

use std::sync::Arc;
use std::time::Duration;

use charter_core::logging::targets;
use charter_core::{Color, ObjectId, Painter, Point, Rect, Signal, Size, SubImage};

use super::control::{
    DEFAULT_BROWSE_DELAY, POLICY_CONTROL_DROP_TYPE, POLICY_CONTROL_HEIGHT, POLICY_CONTROL_WIDTH,
    PolicyControl,
};
use super::domain::{GovernmentContext, PolicyRef};
use crate::widget::{
    DragData, DragItem, DragSource, DropTarget, FontProvider, ModKeys, Widget, WidgetBase,
    render_child,
};

const HIGHLIGHT_COLOR: Color = Color::from_rgba8(255, 255, 255, 64);

/// A policy slot of one category.
///
/// The slot never changes its own contents in response to user input. Drops,
/// double-clicks and drags away are reported through
/// [`contents_altered`](Self::contents_altered); the owner issues the
/// matching command and repopulates.
pub struct PolicySlotControl {
    base: WidgetBase,
    category: String,
    category_index: usize,
    context: Arc<GovernmentContext>,
    fonts: Arc<dyn FontProvider>,
    text_pts: i32,
    browse_delay: Duration,
    occupant: Option<PolicyControl>,
    background: SubImage,
    highlighted: bool,

    /// `(new occupant, ctrl held)`. `None` asks for the slot to be emptied.
    pub contents_altered: Signal<(Option<PolicyRef>, bool)>,
    /// The occupant was clicked.
    pub policy_clicked: Signal<(PolicyRef, ModKeys)>,
}

impl PolicySlotControl {
    pub fn new(
        category: impl Into<String>,
        category_index: usize,
        context: Arc<GovernmentContext>,
        fonts: Arc<dyn FontProvider>,
        text_pts: i32,
    ) -> Self {
        let category = category.into();
        let mut slot = Self {
            base: WidgetBase::new::<Self>(),
            background: SubImage::whole(format!(
                "icons/policies/{}_slot.png",
                category.to_lowercase()
            )),
            category,
            category_index,
            context,
            fonts,
            text_pts,
            browse_delay: DEFAULT_BROWSE_DELAY,
            occupant: None,
            highlighted: false,
            contents_altered: Signal::new(),
            policy_clicked: Signal::new(),
        };
        slot.base.resize(Size::new(POLICY_CONTROL_WIDTH, POLICY_CONTROL_HEIGHT));
        slot
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    /// Index of this slot within its category.
    pub fn category_index(&self) -> usize {
        self.category_index
    }

    /// The policy currently shown in the slot.
    pub fn policy(&self) -> Option<&PolicyRef> {
        self.occupant.as_ref().map(PolicyControl::policy)
    }

    pub fn occupant(&self) -> Option<&PolicyControl> {
        self.occupant.as_ref()
    }

    pub fn occupant_mut(&mut self) -> Option<&mut PolicyControl> {
        self.occupant.as_mut()
    }

    pub fn is_highlighted(&self) -> bool {
        self.highlighted
    }

    pub fn highlight(&mut self, highlighted: bool) {
        self.highlighted = highlighted;
    }

    /// Hover time before the occupant offers its details.
    pub fn set_browse_delay(&mut self, delay: Duration) {
        self.browse_delay = delay;
        if let Some(control) = self.occupant.as_mut() {
            control.set_browse_delay(delay);
        }
    }

    /// Replace the shown policy with a freshly built view, or empty the slot.
    pub fn set_policy(&mut self, policy: Option<PolicyRef>) {
        self.occupant = None;
        let Some(policy) = policy else {
            return;
        };

        let mut control = PolicyControl::new(policy, self.fonts.as_ref(), self.text_pts);
        control.resize_with_font(self.size(), self.fonts.as_ref(), self.text_pts);
        control.set_browse_delay(self.browse_delay);
        if let Err(err) = control.widget_base().set_parent(Some(self.object_id())) {
            tracing::error!(
                target: targets::POLICY,
                %err,
                "could not attach policy control to slot"
            );
        }

        control.clicked.forward_to(&self.policy_clicked);
        let altered = self.contents_altered.handle();
        control.double_clicked.connect(move |_| altered.emit((None, false)));

        self.occupant = Some(control);
    }

    /// Resize the slot and its occupant, switching to `text_pts` labels.
    pub fn resize_with_font(&mut self, size: Size, text_pts: i32) {
        self.text_pts = text_pts;
        self.resize(size);
    }

    /// A drag item for the occupant, dragged out of this slot.
    pub fn occupant_drag_item(&self) -> Option<DragItem> {
        self.occupant.as_ref().map(|control| control.drag_item(self.object_id()))
    }

    /// Whether `data` may be dropped here.
    ///
    /// Exactly one policy of this slot's category that is not already the
    /// occupant, and that is neither locked nor restricted.
    pub fn evaluate_drop(&self, data: &DragData) -> bool {
        if data.len() != 1 {
            return false;
        }
        let Some(item) = data.first() else {
            return false;
        };
        if item.drop_type() != POLICY_CONTROL_DROP_TYPE {
            return false;
        }
        let Some(policy) = item.payload::<PolicyRef>() else {
            return false;
        };
        if policy.category != self.category {
            return false;
        }
        if self.occupant.as_ref().is_some_and(|c| c.object_id() == item.widget()) {
            return false;
        }
        let oracle = &self.context.oracle;
        !oracle.is_locked(&policy.name) && !oracle.is_restricted(&policy.name)
    }

    fn is_occupant_dragged(&self, data: &DragData) -> bool {
        self.occupant.as_ref().is_some_and(|c| data.contains_widget(c.object_id()))
    }
}

impl Widget for PolicySlotControl {
    fn widget_base(&self) -> &WidgetBase {
        &self.base
    }

    fn widget_base_mut(&mut self) -> &mut WidgetBase {
        &mut self.base
    }

    fn size_move(&mut self, ul: Point, lr: Point) {
        self.base.set_geometry(Rect::new(ul, lr));
        if let Some(control) = self.occupant.as_mut() {
            let size = self.base.size();
            control.resize_with_font(size, self.fonts.as_ref(), self.text_pts);
        }
    }

    fn render(&self, painter: &mut dyn Painter, origin: Point) {
        let rect = Rect::from_pos_size(origin, self.size());
        painter.blit(&self.background, rect, Color::WHITE);
        if let Some(control) = &self.occupant {
            render_child(control, painter, origin);
        }
        if self.highlighted {
            painter.flat_rectangle(rect, HIGHLIGHT_COLOR, Color::WHITE, 1);
        }
    }
}

impl DropTarget for PolicySlotControl {
    fn drops_acceptable(&self, data: &DragData, _mods: ModKeys) -> bool {
        self.evaluate_drop(data)
    }

    fn accept_drops(&mut self, data: &DragData, mods: ModKeys) {
        if data.len() != 1 {
            tracing::error!(
                target: targets::DRAG_DROP,
                count = data.len(),
                "PolicySlotControl::accept_drops given multiple items unexpectedly"
            );
        }
        if let Some(policy) = data.first().and_then(|item| item.payload::<PolicyRef>()) {
            self.contents_altered.emit((Some(policy.clone()), mods.ctrl()));
        }
    }

    fn drag_drop_enter(&mut self, data: &DragData, mods: ModKeys) {
        // The dragged policy would replace the occupant.
        if self.drops_acceptable(data, mods) {
            if let Some(control) = self.occupant.as_mut() {
                control.hide();
            }
        }
    }

    fn drag_drop_leave(&mut self, data: &DragData) {
        if self.is_occupant_dragged(data) {
            return;
        }
        if let Some(control) = self.occupant.as_mut() {
            control.show();
        }
    }
}

impl DragSource for PolicySlotControl {
    fn starting_child_drag_drop(&mut self, child: ObjectId) {
        if let Some(control) = self.occupant.as_mut().filter(|c| c.object_id() == child) {
            control.hide();
        }
    }

    fn cancelling_child_drag_drop(&mut self, data: &DragData) {
        if self.is_occupant_dragged(data) {
            if let Some(control) = self.occupant.as_mut() {
                control.show();
            }
        }
    }

    fn children_dragged_away(&mut self, data: &DragData, destination: Option<ObjectId>) {
        if !self.is_occupant_dragged(data) {
            return;
        }
        tracing::debug!(
            target: targets::DRAG_DROP,
            category = %self.category,
            slot = self.category_index,
            ?destination,
            "policy dragged out of slot"
        );
        if let Some(control) = self.occupant.take() {
            control.widget_base().detach();
        }
        self.contents_altered.emit((None, false));
    }
}

impl std::fmt::Debug for PolicySlotControl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolicySlotControl")
            .field("id", &self.object_id())
            .field("category", &self.category)
            .field("category_index", &self.category_index)
            .field("policy", &self.policy().map(|p| p.name.as_str()))
            .finish()
    }
}

static_assertions::assert_impl_all!(PolicySlotControl: Send, Sync);
