//! Mutually exclusive group of [`StateButton`]s.
//!
//! The group owns its buttons and lays them out along one axis with a
//! [`GridLayout`]. Each member's `checked_changed` signal is connected to a
//! handler that knows the member's index:
//!
//! - a member becoming checked selects it in the group and emits
//!   `button_changed`;
//! - the checked member being unchecked by the user is immediately checked
//!   again, so a selection cannot be cleared by clicking.
//!
//! Handlers run while the clicked button is still mutably borrowed, so they
//! never touch the group's buttons directly. They flip the members' shared
//! check cells and the shared selection instead. All handlers are
//! reconnected with fresh indices after every insertion or removal.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use charter_core::logging::targets;
use charter_core::{
    Color, ConnectionId, ObjectId, Painter, Point, Rect, Signal, SignalHandle, Size,
};
use parking_lot::Mutex;

use crate::widget::layout::GridLayout;
use crate::widget::widgets::StateButton;
use crate::widget::{Checkable, Widget, WidgetBase, render_child};

/// Axis along which group members are stacked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Orientation {
    #[default]
    Vertical,
    Horizontal,
}

/// Selection state shared with member handlers.
struct GroupShared {
    checked: Option<usize>,
    cells: Vec<Arc<AtomicBool>>,
}

impl GroupShared {
    /// Move the selection to `index`, unchecking the previous holder.
    fn select(&mut self, index: Option<usize>) {
        if let Some(previous) = self.checked {
            if let Some(cell) = self.cells.get(previous) {
                cell.store(false, Ordering::SeqCst);
            }
        }
        if let Some(i) = index {
            if let Some(cell) = self.cells.get(i) {
                cell.store(true, Ordering::SeqCst);
            }
        }
        self.checked = index;
    }
}

struct ButtonSlot {
    button: StateButton,
    connection: Option<ConnectionId>,
    /// Size captured on insertion; the layout never reads stretched geometry.
    min_size: Size,
}

/// A radio-button group.
pub struct RadioButtonGroup {
    base: WidgetBase,
    orientation: Orientation,
    slots: Vec<ButtonSlot>,
    shared: Arc<Mutex<GroupShared>>,
    layout: GridLayout,
    expand_buttons: bool,
    expand_buttons_proportionally: bool,
    render_outline: bool,
    color: Color,

    /// Emitted with the newly checked index, or `None` when cleared.
    pub button_changed: Signal<Option<usize>>,
}

impl RadioButtonGroup {
    pub fn new(orientation: Orientation) -> Self {
        Self {
            base: WidgetBase::new::<Self>(),
            orientation,
            slots: Vec::new(),
            shared: Arc::new(Mutex::new(GroupShared {
                checked: None,
                cells: Vec::new(),
            })),
            layout: GridLayout::new(1, 1),
            expand_buttons: false,
            expand_buttons_proportionally: false,
            render_outline: false,
            color: Color::from_rgb8(255, 255, 0),
            button_changed: Signal::new(),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn num_buttons(&self) -> usize {
        self.slots.len()
    }

    /// Index of the checked member, if any.
    pub fn checked_button(&self) -> Option<usize> {
        self.shared.lock().checked
    }

    pub fn expand_buttons(&self) -> bool {
        self.expand_buttons
    }

    pub fn expand_buttons_proportionally(&self) -> bool {
        self.expand_buttons_proportionally
    }

    pub fn render_outline(&self) -> bool {
        self.render_outline
    }

    pub fn set_render_outline(&mut self, render_outline: bool) {
        self.render_outline = render_outline;
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    pub fn button(&self, index: usize) -> Option<&StateButton> {
        self.slots.get(index).map(|s| &s.button)
    }

    pub fn button_mut(&mut self, index: usize) -> Option<&mut StateButton> {
        self.slots.get_mut(index).map(|s| &mut s.button)
    }

    pub fn buttons(&self) -> impl Iterator<Item = &StateButton> {
        self.slots.iter().map(|s| &s.button)
    }

    /// Position of the member with the given id.
    pub fn index_of(&self, id: ObjectId) -> Option<usize> {
        self.slots.iter().position(|s| s.button.object_id() == id)
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// Check the member at `index` (unchecking the previous one) and emit
    /// `button_changed`, even if the selection did not change.
    ///
    /// An out-of-range index clears the selection.
    pub fn set_check(&mut self, index: Option<usize>) {
        let index = index.filter(|&i| i < self.slots.len());
        self.set_check_impl(index, true);
    }

    fn set_check_impl(&self, index: Option<usize>, signal: bool) {
        self.shared.lock().select(index);
        if signal {
            self.button_changed.emit(index);
        }
    }

    /// Enable or disable a member. Disabling the checked member clears the
    /// selection.
    pub fn disable_button(&mut self, index: usize, disabled: bool) {
        let Some(slot) = self.slots.get_mut(index) else {
            tracing::error!(
                target: targets::RADIO_GROUP,
                index,
                "disable_button: index out of range"
            );
            return;
        };
        let was_disabled = !slot.button.widget_base().is_enabled();
        slot.button.set_disabled(disabled);
        if disabled && !was_disabled && self.checked_button() == Some(index) {
            self.set_check(None);
        }
    }

    /// Raise the checked member above its siblings.
    pub fn raise_checked_button(&mut self) {
        if let Some(slot) = self.checked_button().and_then(|i| self.slots.get(i)) {
            slot.button.widget_base().raise();
        }
    }

    // =========================================================================
    // Membership
    // =========================================================================

    /// Append a member.
    pub fn add_button(&mut self, button: StateButton) {
        self.insert_button(self.slots.len(), button);
    }

    /// Insert a member at `index`, shifting the selection if it moves.
    pub fn insert_button(&mut self, index: usize, button: StateButton) {
        let min_size = if self.expand_buttons {
            button.min_usable_size()
        } else {
            button.size().max(button.min_usable_size())
        };
        self.insert_slot(index, button, min_size);
    }

    fn insert_slot(&mut self, index: usize, mut button: StateButton, min_size: Size) {
        if index > self.slots.len() {
            tracing::error!(
                target: targets::RADIO_GROUP,
                index,
                len = self.slots.len(),
                "insert_button: index out of range"
            );
            return;
        }

        if !self.expand_buttons {
            button.resize(min_size);
        }
        if let Err(err) = button.widget_base().set_parent(Some(self.object_id())) {
            tracing::error!(
                target: targets::RADIO_GROUP,
                %err,
                "insert_button: could not adopt button"
            );
        }

        {
            let mut shared = self.shared.lock();
            shared.cells.insert(index, button.check_cell());
            if let Some(checked) = shared.checked {
                if index <= checked {
                    shared.checked = Some(checked + 1);
                }
            }
        }
        self.slots.insert(
            index,
            ButtonSlot {
                button,
                connection: None,
                min_size,
            },
        );

        self.rebuild_layout();
        self.reconnect();
    }

    /// Remove a member by id and hand it back.
    ///
    /// Removing the checked member clears the selection; removing an earlier
    /// member shifts it down.
    pub fn remove_button(&mut self, id: ObjectId) -> Option<StateButton> {
        let Some(index) = self.index_of(id) else {
            tracing::error!(target: targets::RADIO_GROUP, ?id, "remove_button: not a member");
            return None;
        };
        self.remove_button_at(index)
    }

    /// Remove the member at `index` and hand it back.
    pub fn remove_button_at(&mut self, index: usize) -> Option<StateButton> {
        self.take_slot(index).map(|slot| slot.button)
    }

    fn take_slot(&mut self, index: usize) -> Option<ButtonSlot> {
        if index >= self.slots.len() {
            tracing::error!(
                target: targets::RADIO_GROUP,
                index,
                "remove_button_at: index out of range"
            );
            return None;
        }

        let mut slot = self.slots.remove(index);
        if let Some(connection) = slot.connection.take() {
            slot.button.checked_changed.disconnect(connection);
        }
        {
            let mut shared = self.shared.lock();
            shared.cells.remove(index);
            shared.checked = match shared.checked {
                Some(checked) if checked == index => None,
                Some(checked) if index < checked => Some(checked - 1),
                other => other,
            };
        }
        slot.button.widget_base().detach();

        self.rebuild_layout();
        self.reconnect();
        Some(slot)
    }

    /// Let members fill the group instead of keeping their minimum size.
    pub fn set_expand_buttons(&mut self, expand: bool) {
        if expand != self.expand_buttons {
            self.readd_all(|group| group.expand_buttons = expand);
        }
    }

    /// When expanding, share space in proportion to each member's size.
    pub fn set_expand_buttons_proportionally(&mut self, proportional: bool) {
        if proportional != self.expand_buttons_proportionally {
            self.readd_all(|group| group.expand_buttons_proportionally = proportional);
        }
    }

    /// Take every member out, apply `change`, and put them back in order.
    fn readd_all(&mut self, change: impl FnOnce(&mut Self)) {
        let old_checked = self.checked_button();
        let mut slots = Vec::with_capacity(self.slots.len());
        while let Some(slot) =
            self.slots.len().checked_sub(1).and_then(|last| self.take_slot(last))
        {
            slots.push(slot);
        }
        change(self);
        for slot in slots.into_iter().rev() {
            let index = self.slots.len();
            self.insert_slot(index, slot.button, slot.min_size);
        }
        self.set_check_impl(old_checked, false);
    }

    /// Disconnect every member handler and connect fresh ones, then re-sync
    /// the members' check state with the selection.
    fn reconnect(&mut self) {
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if let Some(connection) = slot.connection.take() {
                slot.button.checked_changed.disconnect(connection);
            }
            let shared = Arc::clone(&self.shared);
            let changed: SignalHandle<Option<usize>> = self.button_changed.handle();
            let cell = slot.button.check_cell();
            slot.connection = Some(slot.button.checked_changed.connect(move |&checked| {
                if checked {
                    shared.lock().select(Some(index));
                    changed.emit(Some(index));
                } else {
                    cell.store(true, Ordering::SeqCst);
                }
            }));
        }
        let checked = self.checked_button();
        self.set_check_impl(checked, false);
    }

    // =========================================================================
    // Layout
    // =========================================================================

    fn rebuild_layout(&mut self) {
        let count = self.slots.len();
        let cells_per_button = if self.expand_buttons { 1 } else { 2 };
        let lines = if count == 0 {
            1
        } else if self.expand_buttons {
            count
        } else {
            2 * count - 1
        };

        self.layout.clear();
        match self.orientation {
            Orientation::Vertical => self.layout.resize(lines, 1),
            Orientation::Horizontal => self.layout.resize(1, lines),
        }

        for (i, slot) in self.slots.iter().enumerate() {
            let line = i * cells_per_button;
            let extent = self.extent_along(slot.min_size);
            let stretch = extent;
            match self.orientation {
                Orientation::Vertical => {
                    self.layout.add(i, line, 0);
                    self.layout.set_minimum_row_height(line, extent);
                }
                Orientation::Horizontal => {
                    self.layout.add(i, 0, line);
                    self.layout.set_minimum_column_width(line, extent);
                }
            }

            let (stretch_line, stretch) = if self.expand_buttons {
                let factor = if self.expand_buttons_proportionally {
                    stretch.max(0) as u32
                } else {
                    1
                };
                (Some(line), factor)
            } else {
                (if i > 0 { Some(line - 1) } else { None }, 1)
            };
            if let Some(stretch_line) = stretch_line {
                match self.orientation {
                    Orientation::Vertical => self.layout.set_row_stretch(stretch_line, stretch),
                    Orientation::Horizontal => {
                        self.layout.set_column_stretch(stretch_line, stretch)
                    }
                }
            }
        }

        self.apply_layout();
    }

    fn extent_along(&self, size: Size) -> i32 {
        match self.orientation {
            Orientation::Vertical => size.height,
            Orientation::Horizontal => size.width,
        }
    }

    fn apply_layout(&mut self) {
        let size = self.base.size();
        for (index, rect) in self.layout.arrange(size) {
            let Some(slot) = self.slots.get(index) else {
                continue;
            };
            let mut lr = rect.lr;
            // Without spacers (a lone member) the row takes all the space; keep
            // the member at its captured extent instead.
            if !self.expand_buttons {
                let extent = self.extent_along(slot.min_size);
                match self.orientation {
                    Orientation::Vertical => lr.y = lr.y.min(rect.ul.y + extent),
                    Orientation::Horizontal => lr.x = lr.x.min(rect.ul.x + extent),
                }
            }
            if let Some(slot) = self.slots.get_mut(index) {
                slot.button.size_move(rect.ul, lr);
            }
        }
    }

    /// The layout grid, for inspection.
    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }
}

impl Widget for RadioButtonGroup {
    fn widget_base(&self) -> &WidgetBase {
        &self.base
    }

    fn widget_base_mut(&mut self) -> &mut WidgetBase {
        &mut self.base
    }

    /// Sum of the members along the orientation, maximum across it.
    fn min_usable_size(&self) -> Size {
        self.slots.iter().fold(Size::ZERO, |acc, slot| {
            let min = slot.button.min_usable_size();
            match self.orientation {
                Orientation::Vertical => {
                    Size::new(acc.width.max(min.width), acc.height + min.height)
                }
                Orientation::Horizontal => {
                    Size::new(acc.width + min.width, acc.height.max(min.height))
                }
            }
        })
    }

    fn size_move(&mut self, ul: Point, lr: Point) {
        self.base.set_geometry(Rect::new(ul, lr));
        self.apply_layout();
    }

    fn render(&self, painter: &mut dyn Painter, origin: Point) {
        if self.render_outline {
            let rect = Rect::from_pos_size(origin, self.base.size());
            painter.flat_rectangle(
                rect,
                Color::TRANSPARENT,
                self.color.with_disabled(self.is_disabled()),
                1,
            );
        }
        // Back to front, so a raised member draws last.
        for id in self.base.children_ids() {
            if let Some(i) = self.index_of(id) {
                render_child(&self.slots[i].button, painter, origin);
            }
        }
    }
}

impl Drop for RadioButtonGroup {
    fn drop(&mut self) {
        for slot in &mut self.slots {
            if let Some(connection) = slot.connection.take() {
                slot.button.checked_changed.disconnect(connection);
            }
        }
    }
}

impl Checkable for RadioButtonGroup {
    fn is_checked(&self) -> bool {
        self.checked_button().is_some()
    }

    fn set_checked(&mut self, checked: bool) {
        if !checked {
            self.set_check_impl(None, false);
        }
    }
}

static_assertions::assert_impl_all!(RadioButtonGroup: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::text::TextFormat;
    use crate::widget::widgets::StateButtonStyle;
    use crate::widget::{Clickable, MonospaceMetrics, PointerButton};

    fn radio(label: &str) -> StateButton {
        StateButton::new(
            label,
            MonospaceMetrics::shared(12),
            TextFormat::LEFT | TextFormat::VCENTER,
            Color::WHITE,
            Color::BLACK,
            StateButtonStyle::Radio,
        )
    }

    fn group_of(labels: &[&str]) -> RadioButtonGroup {
        let mut group = RadioButtonGroup::new(Orientation::Vertical);
        group.size_move(Point::ZERO, Point::new(200, 200));
        for label in labels {
            group.add_button(radio(label));
        }
        group
    }

    fn record(group: &RadioButtonGroup) -> Arc<Mutex<Vec<Option<usize>>>> {
        let received = Arc::new(Mutex::new(Vec::new()));
        let received_clone = received.clone();
        group.button_changed.connect(move |&i| received_clone.lock().push(i));
        received
    }

    fn checked_flags(group: &RadioButtonGroup) -> Vec<bool> {
        group.buttons().map(|b| b.is_checked()).collect()
    }

    #[test]
    fn test_set_check_switches_and_always_fires() {
        let mut group = group_of(&["A", "B", "C"]);
        let received = record(&group);

        group.set_check(Some(0));
        group.set_check(Some(2));
        group.set_check(Some(2));
        assert_eq!(*received.lock(), vec![Some(0), Some(2), Some(2)]);
        assert_eq!(checked_flags(&group), vec![false, false, true]);

        group.set_check(Some(7));
        assert_eq!(group.checked_button(), None);
        assert_eq!(checked_flags(&group), vec![false, false, false]);
        assert_eq!(received.lock().last(), Some(&None));
    }

    #[test]
    fn test_clicking_member_selects_it_once() {
        let mut group = group_of(&["A", "B", "C"]);
        group.set_check(Some(0));
        let received = record(&group);

        group.button_mut(1).unwrap().handle_click(PointerButton::Left);

        assert_eq!(*received.lock(), vec![Some(1)]);
        assert_eq!(group.checked_button(), Some(1));
        assert_eq!(checked_flags(&group), vec![false, true, false]);
    }

    #[test]
    fn test_unchecking_selected_member_is_undone() {
        let mut group = group_of(&["A", "B"]);
        group.set_check(Some(1));
        let received = record(&group);

        group.button_mut(1).unwrap().handle_click(PointerButton::Left);

        assert!(group.button(1).unwrap().is_checked());
        assert_eq!(group.checked_button(), Some(1));
        assert!(received.lock().is_empty());
    }

    #[test]
    fn test_remove_before_checked_shifts_down() {
        let mut group = group_of(&["A", "B", "C"]);
        group.set_check(Some(1));
        assert_eq!(group.checked_button(), Some(1));

        let a = group.button(0).unwrap().object_id();
        let removed = group.remove_button(a).unwrap();
        assert_eq!(removed.text(), "A");

        assert_eq!(group.checked_button(), Some(0));
        assert_eq!(checked_flags(&group), vec![true, false]);
        assert_eq!(group.button(0).unwrap().text(), "B");
    }

    #[test]
    fn test_handlers_use_new_indices_after_removal() {
        let mut group = group_of(&["A", "B", "C"]);
        group.remove_button_at(0);
        let received = record(&group);

        group.button_mut(1).unwrap().handle_click(PointerButton::Left);
        assert_eq!(*received.lock(), vec![Some(1)]);
        assert_eq!(group.button(1).unwrap().text(), "C");
    }

    #[test]
    fn test_remove_checked_clears_selection() {
        let mut group = group_of(&["A", "B", "C"]);
        group.set_check(Some(2));
        group.remove_button_at(2);
        assert_eq!(group.checked_button(), None);
        assert_eq!(checked_flags(&group), vec![false, false]);
    }

    #[test]
    fn test_insert_at_or_before_checked_shifts_up() {
        let mut group = group_of(&["A", "B"]);
        group.set_check(Some(1));

        group.insert_button(1, radio("X"));
        assert_eq!(group.checked_button(), Some(2));
        group.insert_button(3, radio("Y"));
        assert_eq!(group.checked_button(), Some(2));
        assert_eq!(checked_flags(&group), vec![false, false, true, false]);
        assert_eq!(group.button(2).unwrap().text(), "B");
    }

    #[test]
    fn test_insert_out_of_range_is_ignored() {
        let mut group = group_of(&["A"]);
        group.insert_button(5, radio("Z"));
        assert_eq!(group.num_buttons(), 1);
    }

    #[test]
    fn test_at_most_one_checked_under_churn() {
        let mut group = group_of(&["A", "B", "C", "D"]);
        group.set_check(Some(3));
        for step in 0..12 {
            if step % 3 == 0 {
                group.insert_button(step % (group.num_buttons() + 1), radio("N"));
            } else if step % 3 == 1 && group.num_buttons() > 1 {
                group.remove_button_at(step % group.num_buttons());
            } else if let Some(b) = group.button_mut(step % 2) {
                b.handle_click(PointerButton::Left);
            }
            let flags = checked_flags(&group);
            assert!(flags.iter().filter(|&&c| c).count() <= 1);
            match group.checked_button() {
                Some(i) => assert!(flags[i]),
                None => assert!(flags.iter().all(|&c| !c)),
            }
        }
    }

    #[test]
    fn test_disable_checked_button_clears_selection() {
        let mut group = group_of(&["A", "B"]);
        group.set_check(Some(0));
        let received = record(&group);

        group.disable_button(1, true);
        assert_eq!(group.checked_button(), Some(0));
        group.disable_button(0, true);
        assert_eq!(group.checked_button(), None);
        assert_eq!(*received.lock(), vec![None]);
    }

    #[test]
    fn test_vertical_layout_spacers() {
        let group = group_of(&["A", "B", "C"]);
        let layout = group.layout();
        assert_eq!(layout.rows(), 5);
        assert_eq!(layout.row_stretch(0), 0);
        assert_eq!(layout.row_stretch(1), 1);
        assert_eq!(layout.row_stretch(3), 1);

        let a = group.button(0).unwrap().geometry();
        let c = group.button(2).unwrap().geometry();
        assert_eq!(a.top(), 0);
        assert_eq!(c.bottom(), 200);
    }

    #[test]
    fn test_members_keep_their_size_as_group_grows() {
        let mut group = RadioButtonGroup::new(Orientation::Vertical);
        group.size_move(Point::ZERO, Point::new(200, 200));
        let natural = radio("A").min_usable_size().height;

        group.add_button(radio("A"));
        assert_eq!(group.button(0).unwrap().size().height, natural);

        group.add_button(radio("B"));
        group.add_button(radio("C"));
        let heights: Vec<i32> = group.buttons().map(|b| b.size().height).collect();
        assert_eq!(heights, vec![natural; 3]);
        assert!(group.buttons().all(|b| b.geometry().bottom() <= 200));
    }

    #[test]
    fn test_toggling_expand_does_not_inflate_members() {
        let mut group = group_of(&["A", "B"]);
        let natural = group.button(0).unwrap().size().height;

        group.set_expand_buttons(true);
        assert_eq!(group.button(0).unwrap().size().height, 100);
        group.set_expand_buttons(false);
        let heights: Vec<i32> = group.buttons().map(|b| b.size().height).collect();
        assert_eq!(heights, vec![natural; 2]);
        assert_eq!(group.button(1).unwrap().geometry().bottom(), 200);
    }

    #[test]
    fn test_expand_preserves_selection_silently() {
        let mut group = group_of(&["A", "B", "C"]);
        group.set_check(Some(1));
        let received = record(&group);

        group.set_expand_buttons(true);
        assert_eq!(group.layout().rows(), 3);
        assert_eq!(group.layout().row_stretch(0), 1);
        assert_eq!(group.checked_button(), Some(1));
        assert_eq!(checked_flags(&group), vec![false, true, false]);
        assert!(received.lock().is_empty());

        let texts: Vec<_> = group.buttons().map(|b| b.text().to_string()).collect();
        assert_eq!(texts, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_horizontal_min_usable_size() {
        let mut group = RadioButtonGroup::new(Orientation::Horizontal);
        group.add_button(radio("A"));
        group.add_button(radio("BB"));
        let a = group.button(0).unwrap().min_usable_size();
        let b = group.button(1).unwrap().min_usable_size();
        assert_eq!(
            group.min_usable_size(),
            Size::new(a.width + b.width, a.height.max(b.height))
        );
    }

    #[test]
    fn test_raise_checked_button_renders_last() {
        let mut group = group_of(&["A", "B", "C"]);
        group.set_check(Some(0));
        group.raise_checked_button();
        let children = group.widget_base().children_ids();
        assert_eq!(children.last(), Some(&group.button(0).unwrap().object_id()));
    }
}
