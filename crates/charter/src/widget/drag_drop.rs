//! Drag and drop between widgets.
//!
//! A drag carries one or more [`DragItem`]s. Each item names the widget being
//! dragged, a drop type string that targets filter on, the widget it was
//! dragged out of, and a typed payload.
//!
//! The [`DragDropManager`] tracks the gesture itself:
//!
//! ```text
//! Idle --prepare_drag--> Pending --threshold--> Dragging --end_drag/cancel--> Idle
//! ```
//!
//! Widgets that receive drops implement [`DropTarget`]; widgets whose
//! children can be dragged out implement [`DragSource`]. The container that
//! owns both routes the manager's transitions to them.

use std::any::Any;
use std::sync::Arc;

use charter_core::{ObjectId, Point, Retained};

use super::events::ModKeys;

/// One dragged widget.
#[derive(Clone)]
pub struct DragItem {
    widget: ObjectId,
    drop_type: Arc<str>,
    source: Option<ObjectId>,
    payload: Arc<dyn Any + Send + Sync>,
    retained: Option<Retained>,
}

impl DragItem {
    pub fn new(
        widget: ObjectId,
        drop_type: impl Into<Arc<str>>,
        payload: impl Any + Send + Sync,
    ) -> Self {
        Self {
            widget,
            drop_type: drop_type.into(),
            source: None,
            payload: Arc::new(payload),
            retained: None,
        }
    }

    /// Record the widget this item is being dragged out of.
    pub fn with_source(mut self, source: ObjectId) -> Self {
        self.source = Some(source);
        self
    }

    /// Keep the dragged widget's registry node alive for the drag's duration,
    /// even if its owner lets go of it.
    pub fn with_retained(mut self, retained: Retained) -> Self {
        self.retained = Some(retained);
        self
    }

    pub fn widget(&self) -> ObjectId {
        self.widget
    }

    pub fn drop_type(&self) -> &str {
        &self.drop_type
    }

    pub fn source(&self) -> Option<ObjectId> {
        self.source
    }

    /// The payload, if it is a `T`.
    pub fn payload<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.payload.downcast_ref::<T>()
    }

    pub fn is_retained(&self) -> bool {
        self.retained.is_some()
    }
}

impl std::fmt::Debug for DragItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DragItem")
            .field("widget", &self.widget)
            .field("drop_type", &self.drop_type)
            .field("source", &self.source)
            .field("retained", &self.retained.is_some())
            .finish()
    }
}

/// Everything being dragged in one gesture.
#[derive(Debug, Clone, Default)]
pub struct DragData {
    items: Vec<DragItem>,
}

impl DragData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(item: DragItem) -> Self {
        Self { items: vec![item] }
    }

    pub fn push(&mut self, item: DragItem) {
        self.items.push(item);
    }

    pub fn items(&self) -> &[DragItem] {
        &self.items
    }

    pub fn first(&self) -> Option<&DragItem> {
        self.items.first()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether `widget` is one of the dragged widgets.
    pub fn contains_widget(&self, widget: ObjectId) -> bool {
        self.items.iter().any(|item| item.widget == widget)
    }
}

/// State of the drag gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    /// No drag is active.
    #[default]
    Idle,
    /// Pointer is down on a draggable widget but has not moved far enough.
    Pending,
    /// A drag is in progress.
    Dragging,
}

/// How a drag ended.
#[derive(Debug, Clone)]
pub struct DragResult {
    pub data: Arc<DragData>,
    /// Target under the pointer when the drag ended.
    pub target: Option<ObjectId>,
    /// Whether the target took the drop.
    pub accepted: bool,
}

/// Tracks the drag in progress.
#[derive(Debug)]
pub struct DragDropManager {
    state: DragState,
    pending_data: Option<DragData>,
    drag_data: Option<Arc<DragData>>,
    current_target: Option<ObjectId>,
    target_accepts: bool,
    start_position: Point,
    drag_position: Point,
    drag_threshold: i32,
}

impl Default for DragDropManager {
    fn default() -> Self {
        Self::new()
    }
}

impl DragDropManager {
    /// Default drag threshold in pixels.
    pub const DEFAULT_DRAG_THRESHOLD: i32 = 4;

    pub fn new() -> Self {
        Self {
            state: DragState::Idle,
            pending_data: None,
            drag_data: None,
            current_target: None,
            target_accepts: false,
            start_position: Point::ZERO,
            drag_position: Point::ZERO,
            drag_threshold: Self::DEFAULT_DRAG_THRESHOLD,
        }
    }

    /// Distance the pointer must travel before a pending drag starts.
    pub fn set_drag_threshold(&mut self, threshold: i32) {
        self.drag_threshold = threshold.max(0);
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        self.state == DragState::Dragging
    }

    pub fn has_pending_drag(&self) -> bool {
        self.state == DragState::Pending
    }

    /// Data of the active drag.
    pub fn drag_data(&self) -> Option<&DragData> {
        self.drag_data.as_deref()
    }

    pub fn current_target(&self) -> Option<ObjectId> {
        self.current_target
    }

    pub fn target_accepts(&self) -> bool {
        self.target_accepts
    }

    pub fn drag_position(&self) -> Point {
        self.drag_position
    }

    /// Whether `widget` is being dragged right now.
    pub fn is_being_dragged(&self, widget: ObjectId) -> bool {
        self.drag_data().is_some_and(|data| data.contains_widget(widget))
    }

    /// Arm a drag on pointer press. It starts once the pointer moves past
    /// the threshold.
    pub fn prepare_drag(&mut self, data: DragData, position: Point) {
        self.reset();
        self.state = DragState::Pending;
        self.pending_data = Some(data);
        self.start_position = position;
        self.drag_position = position;
    }

    /// Drop a pending drag that never started.
    pub fn cancel_pending(&mut self) {
        if self.state == DragState::Pending {
            self.reset();
        }
    }

    /// Start the pending drag if the pointer has moved far enough.
    ///
    /// Returns true if the drag has just started.
    pub fn check_drag_start(&mut self, position: Point) -> bool {
        if self.state != DragState::Pending {
            return false;
        }
        let delta = position - self.start_position;
        let distance_sq = i64::from(delta.x).pow(2) + i64::from(delta.y).pow(2);
        if distance_sq < i64::from(self.drag_threshold).pow(2) {
            return false;
        }
        match self.pending_data.take() {
            Some(data) => {
                self.start_drag(data, position);
                true
            }
            None => false,
        }
    }

    /// Start a drag immediately.
    pub fn start_drag(&mut self, data: DragData, position: Point) {
        tracing::debug!(
            target: charter_core::logging::targets::DRAG_DROP,
            items = data.len(),
            "drag started"
        );
        self.pending_data = None;
        self.drag_data = Some(Arc::new(data));
        self.state = DragState::Dragging;
        self.current_target = None;
        self.target_accepts = false;
        self.drag_position = position;
    }

    /// Move the drag. Returns the previous target when the target changed.
    pub fn update_position(
        &mut self,
        position: Point,
        target: Option<ObjectId>,
    ) -> Option<ObjectId> {
        self.drag_position = position;
        if self.current_target == target {
            return None;
        }
        let previous = self.current_target;
        self.current_target = target;
        self.target_accepts = false;
        previous
    }

    /// Record whether the current target accepts the drag.
    pub fn set_target_accepts(&mut self, accepts: bool) {
        self.target_accepts = accepts && self.current_target.is_some();
    }

    /// Finish the drag. `dropped` is false when the pointer was released
    /// somewhere that does not count as a drop.
    ///
    /// Returns `None` if no drag was in progress.
    pub fn end_drag(&mut self, dropped: bool) -> Option<DragResult> {
        if self.state != DragState::Dragging {
            self.reset();
            return None;
        }
        let result = self.drag_data.take().map(|data| DragResult {
            data,
            target: self.current_target,
            accepted: dropped && self.target_accepts,
        });
        self.reset();
        result
    }

    /// Abort the drag, handing back its data so the source can restore
    /// itself.
    pub fn cancel(&mut self) -> Option<Arc<DragData>> {
        let data = self.drag_data.take();
        self.reset();
        data
    }

    fn reset(&mut self) {
        self.state = DragState::Idle;
        self.pending_data = None;
        self.drag_data = None;
        self.current_target = None;
        self.target_accepts = false;
    }
}

/// A widget that can receive drops.
pub trait DropTarget {
    /// Whether the dragged items would be accepted. Must not change state.
    fn drops_acceptable(&self, data: &DragData, mods: ModKeys) -> bool;

    /// Take a drop that [`drops_acceptable`](Self::drops_acceptable) allowed.
    fn accept_drops(&mut self, data: &DragData, mods: ModKeys);

    /// The drag entered the widget.
    fn drag_drop_enter(&mut self, _data: &DragData, _mods: ModKeys) {}

    /// The drag left the widget without dropping.
    fn drag_drop_leave(&mut self, _data: &DragData) {}
}

/// A widget whose children can be dragged away.
pub trait DragSource {
    /// A drag of `child` is starting.
    fn starting_child_drag_drop(&mut self, _child: ObjectId) {}

    /// A drag of this widget's children was abandoned.
    fn cancelling_child_drag_drop(&mut self, _data: &DragData) {}

    /// Children were dropped on `destination`.
    fn children_dragged_away(&mut self, data: &DragData, destination: Option<ObjectId>);
}

#[cfg(test)]
mod tests {
    use super::*;
    use charter_core::{ObjectRegistry, global_registry};

    fn ids(n: usize) -> Vec<ObjectId> {
        let mut registry = ObjectRegistry::new();
        (0..n).map(|_| registry.register("Test")).collect()
    }

    #[test]
    fn test_item_payload_is_typed() {
        let widget = ids(1)[0];
        let item = DragItem::new(widget, "Text", String::from("hello"));
        assert_eq!(item.payload::<String>().map(String::as_str), Some("hello"));
        assert!(item.payload::<i32>().is_none());
        assert_eq!(item.drop_type(), "Text");
        assert_eq!(item.source(), None);
    }

    #[test]
    fn test_threshold_starts_pending_drag() {
        let ids = ids(1);
        let mut manager = DragDropManager::new();
        manager.set_drag_threshold(10);
        manager.prepare_drag(
            DragData::single(DragItem::new(ids[0], "T", ())),
            Point::new(100, 100),
        );
        assert_eq!(manager.state(), DragState::Pending);

        assert!(!manager.check_drag_start(Point::new(105, 100)));
        assert!(!manager.is_dragging());
        assert!(manager.check_drag_start(Point::new(106, 108)));
        assert!(manager.is_dragging());
        assert!(manager.is_being_dragged(ids[0]));
        assert!(!manager.check_drag_start(Point::new(200, 200)));
    }

    #[test]
    fn test_cancel_pending_returns_to_idle() {
        let ids = ids(1);
        let mut manager = DragDropManager::new();
        manager.prepare_drag(DragData::single(DragItem::new(ids[0], "T", ())), Point::ZERO);
        manager.cancel_pending();
        assert_eq!(manager.state(), DragState::Idle);
        assert!(manager.end_drag(true).is_none());
    }

    #[test]
    fn test_target_tracking_and_acceptance() {
        let ids = ids(3);
        let mut manager = DragDropManager::new();
        manager.start_drag(DragData::single(DragItem::new(ids[0], "T", ())), Point::ZERO);

        assert_eq!(manager.update_position(Point::new(1, 1), Some(ids[1])), None);
        manager.set_target_accepts(true);
        assert!(manager.target_accepts());

        assert_eq!(manager.update_position(Point::new(2, 2), Some(ids[1])), None);
        assert!(manager.target_accepts());

        assert_eq!(manager.update_position(Point::new(3, 3), Some(ids[2])), Some(ids[1]));
        assert!(!manager.target_accepts());

        let result = manager.end_drag(true).unwrap();
        assert_eq!(result.target, Some(ids[2]));
        assert!(!result.accepted);
        assert_eq!(manager.state(), DragState::Idle);
    }

    #[test]
    fn test_end_drag_reports_accepted_drop() {
        let ids = ids(2);
        let mut manager = DragDropManager::new();
        manager.start_drag(DragData::single(DragItem::new(ids[0], "T", 7u32)), Point::ZERO);
        manager.update_position(Point::new(5, 5), Some(ids[1]));
        manager.set_target_accepts(true);

        let result = manager.end_drag(true).unwrap();
        assert!(result.accepted);
        assert_eq!(result.data.first().and_then(|i| i.payload::<u32>()), Some(&7));
    }

    #[test]
    fn test_cancel_hands_back_data() {
        let ids = ids(1);
        let mut manager = DragDropManager::new();
        manager.start_drag(DragData::single(DragItem::new(ids[0], "T", ())), Point::ZERO);
        let data = manager.cancel().unwrap();
        assert!(data.contains_widget(ids[0]));
        assert!(!manager.is_dragging());
    }

    #[test]
    fn test_retained_item_survives_collection() {
        let registry = global_registry();
        let id = registry.register("Dragged");
        let item = DragItem::new(id, "T", ()).with_retained(registry.retain(id).unwrap());
        registry.orphan(id).unwrap();

        registry.collect_garbage();
        assert!(registry.contains(id));

        drop(item);
        registry.collect_garbage();
        assert!(!registry.contains(id));
    }
}
