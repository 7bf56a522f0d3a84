//! The policy palette: filter buttons above a [`PoliciesListBox`].

use std::collections::BTreeMap;
use std::sync::Arc;

use charter_core::logging::targets;
use charter_core::{Color, Painter, Point, Rect, Signal, Size};
use parking_lot::Mutex;

use super::availability::Availability;
use super::domain::{GovernmentContext, PolicyRef};
use super::list_box::PoliciesListBox;
use crate::config::UiConfig;
use crate::widget::{
    Checkable, FontProvider, ModKeys, StateButton, StateButtonStyle, TextFormat, Widget, WidgetBase,
    render_child,
};

const BUTTON_SEPARATION: i32 = 3;
const BUTTON_EDGE_PAD: i32 = 2;
const RIGHT_EDGE_PAD: i32 = 8;
/// Rough label length the buttons are sized for.
const BUTTON_LABEL_CHARS: i32 = 14;

const BUTTON_COLOR: Color = Color::from_rgb8(60, 80, 120);

/// Requests queued by button handlers, applied by
/// [`PolicyPalette::process_pending`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaletteRequest {
    ToggleCategory(String),
    ToggleAvailability(Availability),
}

/// Category and availability toggles over the list of policies.
pub struct PolicyPalette {
    base: WidgetBase,
    list: PoliciesListBox,
    category_buttons: BTreeMap<String, StateButton>,
    availability_buttons: Vec<StateButton>,
    pending: Arc<Mutex<Vec<PaletteRequest>>>,
    pts: i32,
    inner_border_offset: i32,
    policy_slot_size: Size,
    policy_text_pts: i32,

    pub policy_clicked: Signal<(PolicyRef, ModKeys)>,
    pub policy_double_clicked: Signal<PolicyRef>,
    pub policy_right_clicked: Signal<(PolicyRef, Point)>,
    pub clear_policy: Signal<String>,
}

impl PolicyPalette {
    pub fn new(
        context: Arc<GovernmentContext>,
        fonts: Arc<dyn FontProvider>,
        config: &UiConfig,
    ) -> Self {
        let pending: Arc<Mutex<Vec<PaletteRequest>>> = Arc::new(Mutex::new(Vec::new()));
        let font = fonts.font(config.font_pts);

        let mut category_buttons = BTreeMap::new();
        for category in context.catalog.categories() {
            let button = StateButton::new(
                category.clone(),
                font.clone(),
                TextFormat::CENTER,
                BUTTON_COLOR,
                Color::WHITE,
                StateButtonStyle::TopDetachedTab,
            );
            let queue = pending.clone();
            let name = category.clone();
            button
                .checked_changed
                .connect(move |_| queue.lock().push(PaletteRequest::ToggleCategory(name.clone())));
            category_buttons.insert(category, button);
        }

        let list = PoliciesListBox::new(context, fonts, config);
        let mut availability_buttons = Vec::with_capacity(Availability::COUNT);
        for availability in Availability::ALL {
            let mut button = StateButton::new(
                availability.label(),
                font.clone(),
                TextFormat::CENTER,
                BUTTON_COLOR,
                Color::WHITE,
                StateButtonStyle::TopDetachedTab,
            );
            button.set_checked(list.availabilities().get(availability));
            let queue = pending.clone();
            button
                .checked_changed
                .connect(move |_| {
                    queue.lock().push(PaletteRequest::ToggleAvailability(availability))
                });
            availability_buttons.push(button);
        }

        let mut palette = Self {
            base: WidgetBase::new::<Self>(),
            list,
            category_buttons,
            availability_buttons,
            pending,
            pts: config.font_pts,
            inner_border_offset: config.inner_border_angle_offset,
            policy_slot_size: config.slot_size(),
            policy_text_pts: config.font_pts,
            policy_clicked: Signal::new(),
            policy_double_clicked: Signal::new(),
            policy_right_clicked: Signal::new(),
            clear_policy: Signal::new(),
        };
        palette.attach_children();
        palette.list.policy_clicked.forward_to(&palette.policy_clicked);
        palette.list.policy_double_clicked.forward_to(&palette.policy_double_clicked);
        palette.list.policy_right_clicked.forward_to(&palette.policy_right_clicked);
        palette.list.clear_policy.forward_to(&palette.clear_policy);

        palette.show_all_categories(false);
        palette.populate();
        palette
    }

    fn attach_children(&self) {
        let id = self.object_id();
        let children = std::iter::once(self.list.widget_base())
            .chain(self.category_buttons.values().map(Widget::widget_base))
            .chain(self.availability_buttons.iter().map(Widget::widget_base));
        for child in children {
            if let Err(err) = child.set_parent(Some(id)) {
                tracing::error!(target: targets::POLICY, %err, "could not attach palette child");
            }
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn list(&self) -> &PoliciesListBox {
        &self.list
    }

    pub fn list_mut(&mut self) -> &mut PoliciesListBox {
        &mut self.list
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.category_buttons.keys().map(String::as_str)
    }

    pub fn category_button(&self, category: &str) -> Option<&StateButton> {
        self.category_buttons.get(category)
    }

    pub fn category_button_mut(&mut self, category: &str) -> Option<&mut StateButton> {
        self.category_buttons.get_mut(category)
    }

    pub fn availability_button(&self, availability: Availability) -> Option<&StateButton> {
        self.availability_buttons.get(availability.index())
    }

    pub fn availability_button_mut(
        &mut self,
        availability: Availability,
    ) -> Option<&mut StateButton> {
        self.availability_buttons.get_mut(availability.index())
    }

    // =========================================================================
    // Categories
    // =========================================================================

    pub fn show_category(&mut self, category: &str, refresh: bool) {
        let Some(button) = self.category_buttons.get_mut(category) else {
            tracing::error!(
                target: targets::POLICY,
                category,
                "PolicyPalette::show_category: invalid category name"
            );
            return;
        };
        button.set_checked(true);
        self.list.show_category(category, refresh);
    }

    pub fn hide_category(&mut self, category: &str, refresh: bool) {
        let Some(button) = self.category_buttons.get_mut(category) else {
            tracing::error!(
                target: targets::POLICY,
                category,
                "PolicyPalette::hide_category: invalid category name"
            );
            return;
        };
        button.set_checked(false);
        self.list.hide_category(category, refresh);
    }

    pub fn toggle_category(&mut self, category: &str, refresh: bool) {
        if !self.category_buttons.contains_key(category) {
            tracing::error!(
                target: targets::POLICY,
                category,
                "PolicyPalette::toggle_category: invalid category name"
            );
            return;
        }
        if self.list.categories_shown().contains(category) {
            self.hide_category(category, refresh);
        } else {
            self.show_category(category, refresh);
        }
    }

    pub fn show_all_categories(&mut self, refresh: bool) {
        self.list.show_all_categories(refresh);
        for button in self.category_buttons.values_mut() {
            button.set_checked(true);
        }
    }

    pub fn hide_all_categories(&mut self, refresh: bool) {
        self.list.hide_all_categories(refresh);
        for button in self.category_buttons.values_mut() {
            button.set_checked(false);
        }
    }

    /// Hide everything if every category is shown, else show everything.
    pub fn toggle_all_categories(&mut self, refresh: bool) {
        if self.list.categories_shown().len() == self.category_buttons.len() {
            self.hide_all_categories(refresh);
        } else {
            self.show_all_categories(refresh);
        }
    }

    // =========================================================================
    // Availability
    // =========================================================================

    pub fn toggle_availability(&mut self, availability: Availability) {
        let availabilities = self.list.availabilities_mut();
        availabilities.toggle(availability);
        let shown = availabilities.get(availability);
        if let Some(button) = self.availability_buttons.get_mut(availability.index()) {
            button.set_checked(shown);
        }
        self.populate();
    }

    // =========================================================================
    // Population and layout
    // =========================================================================

    pub fn populate(&mut self) {
        self.list.populate();
        self.do_layout();
    }

    /// Slot size and label points for the listed policies.
    pub fn set_policy_size(&mut self, slot_size: Size, text_pts: i32) {
        self.policy_slot_size = slot_size;
        self.policy_text_pts = text_pts;
        self.list.resize_policies(slot_size, text_pts);
    }

    /// Pack the buttons into the fewest rows that fit, category buttons on
    /// the left, then put the list below them.
    pub fn do_layout(&mut self) {
        let pts_wide = self.pts / 2;
        let button_height = self.pts * 3 / 2;
        let usable_width = (self.base.width() - RIGHT_EDGE_PAD).max(1);
        let min_button_width = pts_wide * BUTTON_LABEL_CHARS;
        let max_buttons_per_row =
            (usable_width / (min_button_width + BUTTON_SEPARATION)).max(1) as usize;

        let num_category_buttons = self.category_buttons.len().max(1);
        let num_availability_buttons = self.availability_buttons.len();
        let total_buttons = num_category_buttons + num_availability_buttons;

        let mut num_rows = 1;
        let mut availability_per_row = num_availability_buttons.div_ceil(num_rows);
        let mut category_per_row = num_category_buttons.div_ceil(num_rows);
        let mut total_per_row = availability_per_row + category_per_row;
        while total_per_row > max_buttons_per_row && num_rows < total_buttons {
            num_rows += 1;
            availability_per_row = num_availability_buttons.div_ceil(num_rows);
            category_per_row = num_category_buttons.div_ceil(num_rows);
            total_per_row = availability_per_row + category_per_row;
        }

        let button_width =
            (usable_width - (total_per_row as i32 - 1) * BUTTON_SEPARATION) / total_per_row as i32;
        let col_offset = button_width + BUTTON_SEPARATION;
        let row_offset = button_height + BUTTON_SEPARATION;
        let place = |col: usize, row: i32| {
            let ul = Point::new(
                BUTTON_EDGE_PAD + col as i32 * col_offset,
                BUTTON_EDGE_PAD + row * row_offset,
            );
            (ul, Point::new(ul.x + button_width, ul.y + button_height))
        };

        let mut col = category_per_row;
        let mut row = -1;
        for button in self.category_buttons.values_mut() {
            if col >= category_per_row {
                col = 0;
                row += 1;
            }
            let (ul, lr) = place(col, row);
            button.size_move(ul, lr);
            col += 1;
        }
        let category_rows = row;

        col = category_per_row;
        row = 0;
        for button in &mut self.availability_buttons {
            if col >= total_per_row {
                col = category_per_row;
                row += 1;
            }
            let (ul, lr) = place(col, row);
            button.size_move(ul, lr);
            col += 1;
        }

        let total_rows = category_rows.max(row);
        let list_ul = Point::new(0, BUTTON_EDGE_PAD + row_offset * (total_rows + 1));
        let list_lr = Point::new(self.base.width(), self.base.height() - self.inner_border_offset);
        self.list.size_move(list_ul, list_lr);
        self.list.resize_policies(self.policy_slot_size, self.policy_text_pts);
    }

    /// Apply requests queued by the buttons. Returns how many were applied.
    pub fn process_pending(&mut self) -> usize {
        let requests = std::mem::take(&mut *self.pending.lock());
        let count = requests.len();
        for request in requests {
            tracing::trace!(target: targets::POLICY, ?request, "palette request");
            match request {
                PaletteRequest::ToggleCategory(category) => self.toggle_category(&category, true),
                PaletteRequest::ToggleAvailability(availability) => {
                    self.toggle_availability(availability)
                }
            }
        }
        count
    }
}

impl Widget for PolicyPalette {
    fn widget_base(&self) -> &WidgetBase {
        &self.base
    }

    fn widget_base_mut(&mut self) -> &mut WidgetBase {
        &mut self.base
    }

    fn size_move(&mut self, ul: Point, lr: Point) {
        self.base.set_geometry(Rect::new(ul, lr));
        self.do_layout();
    }

    fn render(&self, painter: &mut dyn Painter, origin: Point) {
        for button in self.category_buttons.values().chain(&self.availability_buttons) {
            render_child(button, painter, origin);
        }
        render_child(&self.list, painter, origin);
    }
}

impl std::fmt::Debug for PolicyPalette {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolicyPalette")
            .field("id", &self.object_id())
            .field("categories", &self.category_buttons.keys().collect::<Vec<_>>())
            .field("list", &self.list)
            .finish()
    }
}

static_assertions::assert_impl_all!(PolicyPalette: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::domain::Policy;
    use crate::policy::memory::InMemoryGovernment;
    use crate::widget::{Clickable, MonospaceFonts, PointerButton};

    const ECONOMIC: &str = "ECONOMIC_CATEGORY";
    const SOCIAL: &str = "SOCIAL_CATEGORY";

    fn palette(width: i32) -> (Arc<InMemoryGovernment>, PolicyPalette) {
        let government = Arc::new(InMemoryGovernment::new());
        government.add_policy(Policy::new("PLC_PLANETARY_INFRA", ECONOMIC, 4.0));
        government.add_policy(Policy::new("PLC_TECHNOCRACY", ECONOMIC, 10.0));
        government.add_policy(Policy::new("PLC_PROPAGANDA", SOCIAL, 5.0));
        government.add_policy(Policy::new("PLC_LIBERTY", SOCIAL, 40.0));
        government.set_budget(20.0);
        let context = government.clone().into_context();
        let mut palette =
            PolicyPalette::new(context, Arc::new(MonospaceFonts), &UiConfig::default());
        palette.size_move(Point::ZERO, Point::new(width, 500));
        (government, palette)
    }

    #[test]
    fn test_construction_shows_all_categories() {
        let (_government, palette) = palette(800);
        assert_eq!(palette.categories().collect::<Vec<_>>(), vec![ECONOMIC, SOCIAL]);
        assert!(palette.category_button(ECONOMIC).unwrap().is_checked());
        assert!(palette.availability_button(Availability::Adopted).unwrap().is_checked());
        assert!(palette.availability_button(Availability::Adoptable).unwrap().is_checked());
        assert!(!palette.availability_button(Availability::Locked).unwrap().is_checked());
        assert_eq!(
            palette.list().policy_names(),
            vec!["PLC_PLANETARY_INFRA", "PLC_TECHNOCRACY", "PLC_PROPAGANDA"]
        );
    }

    #[test]
    fn test_wide_layout_uses_one_row() {
        let (_government, palette) = palette(800);
        // usable 792, nine buttons fit, seven needed: width (792 - 18) / 7
        let economic = palette.category_button(ECONOMIC).unwrap();
        assert_eq!(economic.geometry(), Rect::new(Point::new(2, 2), Point::new(112, 20)));
        let social = palette.category_button(SOCIAL).unwrap();
        assert_eq!(social.geometry().ul, Point::new(115, 2));
        let adopted = palette.availability_button(Availability::Adopted).unwrap();
        assert_eq!(adopted.geometry().ul, Point::new(228, 2));
        let locked = palette.availability_button(Availability::Locked).unwrap();
        assert_eq!(locked.geometry().ul, Point::new(2 + 6 * 113, 2));
        assert_eq!(palette.list().geometry(), Rect::new(Point::new(0, 23), Point::new(800, 489)));
    }

    #[test]
    fn test_narrow_layout_wraps_rows() {
        let (_government, palette) = palette(300);
        // three buttons per row: one category column, two availability columns
        assert_eq!(palette.category_button(ECONOMIC).unwrap().geometry().ul, Point::new(2, 2));
        assert_eq!(palette.category_button(SOCIAL).unwrap().geometry().ul, Point::new(2, 23));
        let positions: Vec<Point> = Availability::ALL
            .iter()
            .map(|a| palette.availability_button(*a).unwrap().geometry().ul)
            .collect();
        assert_eq!(
            positions,
            vec![
                Point::new(100, 2),
                Point::new(198, 2),
                Point::new(100, 23),
                Point::new(198, 23),
                Point::new(100, 44)
            ]
        );
        assert_eq!(palette.list().geometry().ul, Point::new(0, 65));
    }

    #[test]
    fn test_category_button_click_toggles_through_queue() {
        let (_government, mut palette) = palette(800);
        palette
            .category_button_mut(ECONOMIC)
            .unwrap()
            .handle_click(PointerButton::Left);
        assert_eq!(palette.list().control_count(), 3);

        assert_eq!(palette.process_pending(), 1);
        assert!(!palette.category_button(ECONOMIC).unwrap().is_checked());
        assert_eq!(palette.list().policy_names(), vec!["PLC_PROPAGANDA"]);

        palette.toggle_category(ECONOMIC, true);
        assert!(palette.category_button(ECONOMIC).unwrap().is_checked());
        assert_eq!(palette.list().control_count(), 3);
    }

    #[test]
    fn test_availability_button_click_filters() {
        let (_government, mut palette) = palette(800);
        palette
            .availability_button_mut(Availability::Unaffordable)
            .unwrap()
            .handle_click(PointerButton::Left);
        palette.process_pending();

        assert!(palette.list().availabilities().get(Availability::Unaffordable));
        assert!(palette.availability_button(Availability::Unaffordable).unwrap().is_checked());
        assert!(palette.list().policy_names().contains(&"PLC_LIBERTY".to_string()));
    }

    #[test]
    fn test_unknown_category_is_ignored() {
        let (_government, mut palette) = palette(800);
        palette.toggle_category("NO_SUCH_CATEGORY", true);
        palette.hide_category("NO_SUCH_CATEGORY", true);
        assert_eq!(palette.list().categories_shown().len(), 2);
        assert_eq!(palette.list().control_count(), 3);
    }

    #[test]
    fn test_toggle_all_categories() {
        let (_government, mut palette) = palette(800);
        palette.toggle_all_categories(true);
        assert!(palette.list().categories_shown().is_empty());
        assert!(palette.list().prompt().is_some());
        assert!(!palette.category_button(SOCIAL).unwrap().is_checked());

        palette.hide_category(SOCIAL, true);
        palette.show_category(SOCIAL, true);
        palette.toggle_all_categories(true);
        assert_eq!(palette.list().categories_shown().len(), 2);
        assert!(palette.category_button(ECONOMIC).unwrap().is_checked());
    }

    #[test]
    fn test_double_click_forwarded() {
        let (_government, mut palette) = palette(800);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        palette.policy_double_clicked.connect(move |p| sink.lock().push(p.name.clone()));
        palette.list_mut().control_mut(0).unwrap().handle_double_click();
        assert_eq!(*seen.lock(), vec!["PLC_PLANETARY_INFRA"]);
    }
}
