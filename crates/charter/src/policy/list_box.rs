//! The grid of draggable policies in the palette.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;

use charter_core::logging::targets;
use charter_core::{Color, ObjectId, Painter, Point, Rect, Signal, Size, global_registry};

use super::availability::AvailabilityManager;
use super::control::{POLICY_CONTROL_DROP_TYPE, PolicyControl};
use super::domain::{GovernmentContext, PolicyRef};
use super::slot::PolicySlotControl;
use crate::config::UiConfig;
use crate::widget::{
    DragData, DragItem, DragSource, DropTarget, FontProvider, ModKeys, TextFormat, TextLabel,
    Widget, WidgetBase, render_child,
};

/// Shown in place of the grid when the filters let nothing through.
pub const ALL_FILTERS_BLOCKING_PROMPT: &str =
    "All policy availability filters are blocking. Enable more filters to show policies.";

const BACKGROUND: Color = Color::from_rgba8(0, 0, 0, 160);

/// Policies that pass the category and availability filters, packed into
/// rows.
pub struct PoliciesListBox {
    base: WidgetBase,
    context: Arc<GovernmentContext>,
    fonts: Arc<dyn FontProvider>,
    availabilities: AvailabilityManager,
    categories_shown: BTreeSet<String>,
    rows: Vec<Vec<PolicyControl>>,
    prompt: Option<TextLabel>,
    previous_num_columns: Option<usize>,
    slot_size: Size,
    text_pts: i32,
    browse_delay: Duration,
    scroll_width: i32,
    pad: i32,

    pub policy_clicked: Signal<(PolicyRef, ModKeys)>,
    pub policy_double_clicked: Signal<PolicyRef>,
    pub policy_right_clicked: Signal<(PolicyRef, Point)>,
    /// A slot's policy was dropped here with Ctrl held: clear it everywhere.
    pub clear_policy: Signal<String>,
}

impl PoliciesListBox {
    pub fn new(
        context: Arc<GovernmentContext>,
        fonts: Arc<dyn FontProvider>,
        config: &UiConfig,
    ) -> Self {
        Self {
            base: WidgetBase::new::<Self>(),
            context,
            fonts,
            availabilities: AvailabilityManager::from(config.availability),
            categories_shown: BTreeSet::new(),
            rows: Vec::new(),
            prompt: None,
            previous_num_columns: None,
            slot_size: config.slot_size(),
            text_pts: config.font_pts,
            browse_delay: config.tooltip_delay(),
            scroll_width: config.scroll_width,
            pad: config.pad,
            policy_clicked: Signal::new(),
            policy_double_clicked: Signal::new(),
            policy_right_clicked: Signal::new(),
            clear_policy: Signal::new(),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn categories_shown(&self) -> &BTreeSet<String> {
        &self.categories_shown
    }

    pub fn availabilities(&self) -> &AvailabilityManager {
        &self.availabilities
    }

    pub fn availabilities_mut(&mut self) -> &mut AvailabilityManager {
        &mut self.availabilities
    }

    pub fn rows(&self) -> &[Vec<PolicyControl>] {
        &self.rows
    }

    /// All controls, row by row.
    pub fn controls(&self) -> impl Iterator<Item = &PolicyControl> {
        self.rows.iter().flatten()
    }

    pub fn control_count(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }

    /// Names of the listed policies, row by row.
    pub fn policy_names(&self) -> Vec<String> {
        self.controls().map(|c| c.policy_name().to_string()).collect()
    }

    pub fn control(&self, index: usize) -> Option<&PolicyControl> {
        self.controls().nth(index)
    }

    pub fn control_mut(&mut self, index: usize) -> Option<&mut PolicyControl> {
        self.rows.iter_mut().flatten().nth(index)
    }

    /// Index of the control under `point`, in list-box coordinates.
    pub fn control_at(&self, point: Point) -> Option<usize> {
        self.controls().position(|c| c.is_visible() && c.geometry().contains(point))
    }

    /// A drag item for the control at `index`, dragged out of this list.
    pub fn drag_item(&self, index: usize) -> Option<DragItem> {
        self.control(index).map(|c| c.drag_item(self.object_id()))
    }

    /// The "all filters blocking" prompt, while it is shown.
    pub fn prompt(&self) -> Option<&TextLabel> {
        self.prompt.as_ref()
    }

    /// Columns that fit in the current width.
    pub fn num_columns(&self) -> usize {
        let total_width = self.base.width() - self.scroll_width;
        let cell = self.slot_size.width + self.pad;
        if cell <= 0 {
            return 1;
        }
        (total_width / cell).max(1) as usize
    }

    // =========================================================================
    // Population
    // =========================================================================

    /// Rebuild every row from the catalog.
    pub fn populate(&mut self) {
        let columns = self.num_columns();
        self.rows.clear();

        for policies in self.group_displayable_policies().into_values() {
            for policy in policies {
                if self.rows.last().is_none_or(|row| row.len() >= columns) {
                    self.rows.push(Vec::with_capacity(columns));
                }
                let control = self.make_control(policy);
                if let Some(row) = self.rows.last_mut() {
                    row.push(control);
                }
            }
        }
        self.previous_num_columns = Some(columns);

        self.prompt = if self.rows.is_empty() {
            Some(TextLabel::new(
                ALL_FILTERS_BLOCKING_PROMPT,
                TextFormat::LEFT | TextFormat::TOP | TextFormat::WORDBREAK,
                Color::WHITE,
                self.fonts.font(self.text_pts),
            ))
        } else {
            None
        };
        self.arrange_controls();

        tracing::debug!(
            target: targets::POLICY,
            policies = self.control_count(),
            rows = self.rows.len(),
            columns,
            "policies list populated"
        );
    }

    /// Displayable policies by category, both sorted by name.
    fn group_displayable_policies(&self) -> BTreeMap<String, Vec<PolicyRef>> {
        let mut grouped: BTreeMap<String, Vec<PolicyRef>> = BTreeMap::new();
        for policy in self.context.catalog.policies() {
            if !self.categories_shown.contains(&policy.category) {
                continue;
            }
            if self.availabilities.is_displayed(self.context.status(&policy.name)) {
                grouped.entry(policy.category.clone()).or_default().push(policy);
            }
        }
        for policies in grouped.values_mut() {
            policies.sort_by(|a, b| a.name.cmp(&b.name));
        }
        grouped
    }

    fn make_control(&self, policy: PolicyRef) -> PolicyControl {
        let mut control = PolicyControl::new(policy, self.fonts.as_ref(), self.text_pts);
        control.resize_with_font(self.slot_size, self.fonts.as_ref(), self.text_pts);
        control.set_browse_delay(self.browse_delay);
        if let Err(err) = control.widget_base().set_parent(Some(self.object_id())) {
            tracing::error!(
                target: targets::POLICY,
                %err,
                "could not attach policy control to list"
            );
        }
        control.clicked.forward_to(&self.policy_clicked);
        control.double_clicked.forward_to(&self.policy_double_clicked);
        control.right_clicked.forward_to(&self.policy_right_clicked);
        control
    }

    fn arrange_controls(&mut self) {
        let cell = Size::new(self.slot_size.width + self.pad, self.slot_size.height + self.pad);
        for (r, row) in self.rows.iter_mut().enumerate() {
            for (c, control) in row.iter_mut().enumerate() {
                control.move_to(Point::new(c as i32 * cell.width, r as i32 * cell.height));
            }
        }
    }

    // =========================================================================
    // Categories
    // =========================================================================

    pub fn show_category(&mut self, category: &str, refresh: bool) {
        if self.categories_shown.insert(category.to_string()) && refresh {
            self.populate();
        }
    }

    pub fn show_all_categories(&mut self, refresh: bool) {
        self.categories_shown.extend(self.context.catalog.categories());
        if refresh {
            self.populate();
        }
    }

    pub fn hide_category(&mut self, category: &str, refresh: bool) {
        if self.categories_shown.remove(category) && refresh {
            self.populate();
        }
    }

    pub fn hide_all_categories(&mut self, refresh: bool) {
        self.categories_shown.clear();
        if refresh {
            self.populate();
        }
    }

    // =========================================================================
    // Sizing
    // =========================================================================

    /// Resize every control and remember the size for later populates.
    pub fn resize_policies(&mut self, slot_size: Size, text_pts: i32) {
        self.slot_size = slot_size;
        self.text_pts = text_pts;
        let fonts = self.fonts.clone();
        for control in self.rows.iter_mut().flatten() {
            control.resize_with_font(slot_size, fonts.as_ref(), text_pts);
        }
        self.arrange_controls();
    }

    pub fn slot_size(&self) -> Size {
        self.slot_size
    }
}

impl Widget for PoliciesListBox {
    fn widget_base(&self) -> &WidgetBase {
        &self.base
    }

    fn widget_base_mut(&mut self) -> &mut WidgetBase {
        &mut self.base
    }

    /// Repopulates when the new width changes the column count.
    fn size_move(&mut self, ul: Point, lr: Point) {
        let old_size = self.base.size();
        self.base.set_geometry(Rect::new(ul, lr));
        if old_size != self.base.size() && self.previous_num_columns != Some(self.num_columns()) {
            self.populate();
        }
    }

    fn render(&self, painter: &mut dyn Painter, origin: Point) {
        let rect = Rect::from_pos_size(origin, self.size());
        painter.flat_rectangle(rect, BACKGROUND, Color::GRAY, 1);
        if let Some(prompt) = &self.prompt {
            let inner = rect.deflate(self.pad);
            prompt.render_at(painter, prompt.origin_in(inner), prompt.color());
        }
        for control in self.controls() {
            render_child(control, painter, origin);
        }
    }
}

impl DropTarget for PoliciesListBox {
    /// Only a single policy dragged out of a slot.
    fn drops_acceptable(&self, data: &DragData, _mods: ModKeys) -> bool {
        if data.len() != 1 {
            return false;
        }
        let Some(item) = data.first() else {
            return false;
        };
        if item.drop_type() != POLICY_CONTROL_DROP_TYPE {
            return false;
        }
        let slot_type = std::any::type_name::<PolicySlotControl>();
        item.source().is_some_and(|source| {
            global_registry()
                .with_read(|registry| registry.type_name(source).is_ok_and(|t| t == slot_type))
        })
    }

    fn accept_drops(&mut self, data: &DragData, mods: ModKeys) {
        if !mods.ctrl() {
            return;
        }
        if let Some(policy) = data.first().and_then(|item| item.payload::<PolicyRef>()) {
            self.clear_policy.emit(policy.name.clone());
        }
    }
}

impl DragSource for PoliciesListBox {
    /// The dropped control now belongs to the target; list a fresh one in
    /// its place.
    fn children_dragged_away(&mut self, data: &DragData, _destination: Option<ObjectId>) {
        let Some(item) = data.first() else {
            return;
        };
        let position = self.rows.iter().enumerate().find_map(|(r, row)| {
            row.iter()
                .position(|c| c.object_id() == item.widget())
                .map(|c| (r, c))
        });
        let Some((r, c)) = position else {
            return;
        };
        let policy = self.rows[r][c].policy().clone();
        let geometry = self.rows[r][c].geometry();
        let mut replacement = self.make_control(policy);
        replacement.size_move(geometry.ul, geometry.lr);
        self.rows[r][c] = replacement;
    }
}

impl std::fmt::Debug for PoliciesListBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoliciesListBox")
            .field("id", &self.object_id())
            .field("categories_shown", &self.categories_shown)
            .field("policies", &self.control_count())
            .field("rows", &self.rows.len())
            .finish()
    }
}

static_assertions::assert_impl_all!(PoliciesListBox: Send, Sync);

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;

    use super::*;
    use crate::policy::domain::Policy;
    use crate::policy::memory::InMemoryGovernment;
    use crate::policy::Availability;
    use crate::widget::MonospaceFonts;

    const ECONOMIC: &str = "ECONOMIC_CATEGORY";
    const SOCIAL: &str = "SOCIAL_CATEGORY";

    fn government() -> Arc<InMemoryGovernment> {
        let government = Arc::new(InMemoryGovernment::new());
        government.add_policy(Policy::new("PLC_PLANETARY_INFRA", ECONOMIC, 4.0));
        government.add_policy(Policy::new("PLC_CENTRALIZATION", ECONOMIC, 30.0));
        government.add_policy(Policy::new("PLC_TECHNOCRACY", ECONOMIC, 10.0));
        government.add_policy(Policy::new("PLC_PROPAGANDA", SOCIAL, 5.0));
        government.add_policy(Policy::new("PLC_LIBERTY", SOCIAL, 12.0));
        government.set_slots(ECONOMIC, 1);
        government.set_slots(SOCIAL, 1);
        government
    }

    fn list_box(government: &Arc<InMemoryGovernment>, width: i32) -> PoliciesListBox {
        let context = government.clone().into_context();
        let mut list =
            PoliciesListBox::new(context, Arc::new(MonospaceFonts), &UiConfig::default());
        list.widget_base_mut().set_geometry(Rect::from_size(Size::new(width, 600)));
        list.show_all_categories(true);
        list
    }

    #[test]
    fn test_column_count_from_width() {
        let government = government();
        // (400 - 14) / 123 = 3
        let list = list_box(&government, 400);
        assert_eq!(list.num_columns(), 3);
        let narrow = list_box(&government, 50);
        assert_eq!(narrow.num_columns(), 1);
    }

    #[test]
    fn test_populate_groups_by_category_then_name() {
        let government = government();
        let list = list_box(&government, 400);
        assert_eq!(
            list.policy_names(),
            vec![
                "PLC_CENTRALIZATION",
                "PLC_PLANETARY_INFRA",
                "PLC_TECHNOCRACY",
                "PLC_LIBERTY",
                "PLC_PROPAGANDA",
            ]
        );
        assert_eq!(list.rows().len(), 2);
        assert_eq!(list.rows()[0].len(), 3);
        assert_eq!(list.rows()[1][1].geometry().ul, Point::new(123, 183));
        assert!(list.prompt().is_none());
    }

    #[test]
    fn test_availability_filters_apply() {
        let government = government();
        government.set_budget(10.0);
        government.set_locked("PLC_LIBERTY", true);
        let mut list = list_box(&government, 400);
        assert_eq!(
            list.policy_names(),
            vec!["PLC_PLANETARY_INFRA", "PLC_TECHNOCRACY", "PLC_PROPAGANDA"]
        );

        list.availabilities_mut().toggle(Availability::Unaffordable);
        list.populate();
        assert!(list.policy_names().contains(&"PLC_CENTRALIZATION".to_string()));
        assert!(!list.policy_names().contains(&"PLC_LIBERTY".to_string()));
    }

    #[test]
    fn test_hidden_categories_and_prompt() {
        let government = government();
        let mut list = list_box(&government, 400);

        list.hide_category(ECONOMIC, true);
        assert_eq!(list.policy_names(), vec!["PLC_LIBERTY", "PLC_PROPAGANDA"]);

        list.hide_all_categories(true);
        assert_eq!(list.control_count(), 0);
        assert_eq!(list.prompt().map(TextLabel::text), Some(ALL_FILTERS_BLOCKING_PROMPT));

        list.show_category(SOCIAL, true);
        assert_eq!(list.control_count(), 2);
        assert!(list.prompt().is_none());
    }

    #[test]
    fn test_size_move_repopulates_on_column_change() {
        let government = government();
        let mut list = list_box(&government, 400);
        let first_id = list.control(0).unwrap().object_id();

        // Same column count: controls are kept.
        list.size_move(Point::ZERO, Point::new(410, 600));
        assert_eq!(list.control(0).unwrap().object_id(), first_id);

        list.size_move(Point::ZERO, Point::new(700, 600));
        assert_eq!(list.num_columns(), 5);
        assert_eq!(list.rows().len(), 1);
        assert_ne!(list.control(0).unwrap().object_id(), first_id);
    }

    #[test]
    fn test_signals_forwarded_from_controls() {
        let government = government();
        let mut list = list_box(&government, 400);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        list.policy_double_clicked.connect(move |p| sink.lock().push(p.name.clone()));

        list.control_mut(1).unwrap().handle_double_click();
        assert_eq!(*seen.lock(), vec!["PLC_PLANETARY_INFRA"]);
    }

    #[test]
    fn test_drops_accepted_only_from_slots() {
        let government = government();
        let context = government.clone().into_context();
        let mut list = list_box(&government, 400);

        // From the list itself.
        let own = DragData::single(list.drag_item(0).unwrap());
        assert!(!list.drops_acceptable(&own, ModKeys::empty()));

        let mut slot =
            PolicySlotControl::new(ECONOMIC, 0, context.clone(), Arc::new(MonospaceFonts), 12);
        slot.set_policy(context.catalog.policy("PLC_TECHNOCRACY"));
        let from_slot = DragData::single(slot.occupant_drag_item().unwrap());
        assert!(list.drops_acceptable(&from_slot, ModKeys::empty()));

        let cleared = Arc::new(Mutex::new(Vec::new()));
        let sink = cleared.clone();
        list.clear_policy.connect(move |name| sink.lock().push(name.clone()));
        list.accept_drops(&from_slot, ModKeys::empty());
        assert!(cleared.lock().is_empty());
        list.accept_drops(&from_slot, ModKeys::CTRL);
        assert_eq!(*cleared.lock(), vec!["PLC_TECHNOCRACY"]);
    }

    #[test]
    fn test_dragged_away_control_replaced() {
        let government = government();
        let mut list = list_box(&government, 400);
        let data = DragData::single(list.drag_item(2).unwrap());
        let old = list.control(2).unwrap();
        let (old_id, old_geometry) = (old.object_id(), old.geometry());

        list.children_dragged_away(&data, None);

        let fresh = list.control(2).unwrap();
        assert_ne!(fresh.object_id(), old_id);
        assert_eq!(fresh.policy_name(), "PLC_TECHNOCRACY");
        assert_eq!(fresh.geometry(), old_geometry);
        assert_eq!(list.control_count(), 5);
    }
}
