//! The government's policy slots.

use std::sync::Arc;
use std::time::Duration;

use charter_core::logging::targets;
use charter_core::{Color, Painter, Point, Rect, Signal, Size};
use parking_lot::Mutex;

use super::domain::{GovernmentContext, PolicyCommand, PolicyRef};
use super::slot::PolicySlotControl;
use crate::config::UiConfig;
use crate::error::{CharterError, Result};
use crate::widget::{Button, FontProvider, ModKeys, Widget, WidgetBase, render_child};

const PAD: i32 = 6;
/// Gap between slots, as a fraction of the slot size.
const POLICY_PAD: f64 = 0.125;
/// Rough label length the clear button is sized for.
const BUTTON_LABEL_CHARS: i32 = 25;

const BUTTON_COLOR: Color = Color::from_rgb8(60, 80, 120);

/// Requests queued by slot and button handlers, applied by
/// [`MainPanel::process_pending`].
#[derive(Debug, Clone)]
pub enum PanelRequest {
    SetPolicy { policy: Option<PolicyRef>, slot: usize },
    ClearPolicies,
}

/// One slot control per policy slot the government has.
///
/// Slots are numbered across categories in category order. Changing a slot
/// issues a [`PolicyCommand`] and rebuilds every slot from the inventory.
pub struct MainPanel {
    base: WidgetBase,
    context: Arc<GovernmentContext>,
    fonts: Arc<dyn FontProvider>,
    slots: Vec<PolicySlotControl>,
    clear_button: Button,
    pending: Arc<Mutex<Vec<PanelRequest>>>,
    pts: i32,
    slot_size: Size,
    text_pts: i32,
    browse_delay: Duration,

    /// A slotted policy was clicked.
    pub policy_clicked: Signal<(PolicyRef, ModKeys)>,
}

impl MainPanel {
    pub fn new(
        context: Arc<GovernmentContext>,
        fonts: Arc<dyn FontProvider>,
        config: &UiConfig,
    ) -> Self {
        let pending: Arc<Mutex<Vec<PanelRequest>>> = Arc::new(Mutex::new(Vec::new()));
        let clear_button =
            Button::new("Clear", fonts.font(config.font_pts), BUTTON_COLOR, Color::WHITE);
        let queue = pending.clone();
        clear_button
            .left_clicked
            .connect(move |_| queue.lock().push(PanelRequest::ClearPolicies));

        let mut panel = Self {
            base: WidgetBase::new::<Self>(),
            context,
            fonts,
            slots: Vec::new(),
            clear_button,
            pending,
            pts: config.font_pts,
            slot_size: config.slot_size(),
            text_pts: config.font_pts,
            browse_delay: config.tooltip_delay(),
            policy_clicked: Signal::new(),
        };
        if let Err(err) = panel.clear_button.widget_base().set_parent(Some(panel.object_id())) {
            tracing::error!(target: targets::POLICY, %err, "could not attach clear button");
        }
        panel.populate();
        panel.do_layout();
        panel
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn slots(&self) -> &[PolicySlotControl] {
        &self.slots
    }

    pub fn slot(&self, index: usize) -> Option<&PolicySlotControl> {
        self.slots.get(index)
    }

    pub fn slot_mut(&mut self, index: usize) -> Option<&mut PolicySlotControl> {
        self.slots.get_mut(index)
    }

    /// Index of the slot under `point`, in panel coordinates.
    pub fn slot_at(&self, point: Point) -> Option<usize> {
        self.slots.iter().position(|s| s.geometry().contains(point))
    }

    pub fn clear_button(&self) -> &Button {
        &self.clear_button
    }

    pub fn clear_button_mut(&mut self) -> &mut Button {
        &mut self.clear_button
    }

    /// Policy name in each slot; empty slots give an empty string.
    pub fn policies(&self) -> Vec<String> {
        self.slots
            .iter()
            .map(|s| s.policy().map(|p| p.name.clone()).unwrap_or_default())
            .collect()
    }

    // =========================================================================
    // Slot contents
    // =========================================================================

    /// Map an overall slot number to `(category slot, category)`.
    fn resolve_slot(&self, slot: usize) -> Result<(usize, String)> {
        if slot >= self.slots.len() {
            return Err(CharterError::InvalidIndex {
                index: slot,
                len: self.slots.len(),
            });
        }
        let all_slots = self.context.concatenated_category_slots();
        let len = all_slots.len();
        let (category_slot, category) = all_slots
            .into_iter()
            .nth(slot)
            .ok_or(CharterError::InvalidIndex { index: slot, len })?;

        let available = self.context.slots.total_slots().get(&category).copied();
        match available {
            None => Err(CharterError::UnknownCategory(category)),
            Some(available) if available <= category_slot as i32 => Err(CharterError::MissingSlot {
                category,
                slot: category_slot,
                available,
            }),
            Some(_) => Ok((category_slot, category)),
        }
    }

    /// Adopt `policy` in `slot`, or revoke the slot's policy with `None`.
    ///
    /// Revoking an empty slot, or adopting the policy a slot already holds,
    /// does nothing.
    pub fn set_policy(&mut self, policy: Option<PolicyRef>, slot: usize) {
        tracing::debug!(
            target: targets::GOVERNMENT,
            policy = policy.as_ref().map_or("no policy", |p| p.name.as_str()),
            slot,
            "MainPanel::set_policy"
        );

        let (category_slot, category) = match self.resolve_slot(slot) {
            Ok(resolved) => resolved,
            Err(err) => {
                tracing::error!(
                    target: targets::GOVERNMENT,
                    %err,
                    slot,
                    "MainPanel::set_policy: invalid slot"
                );
                return;
            }
        };

        let initial = self
            .context
            .slots
            .adopted()
            .get(&category)
            .and_then(|slots| slots.get(&category_slot))
            .cloned();

        let adopt = policy.is_some();
        let policy_name = match (policy, initial) {
            (None, None) => {
                tracing::debug!(target: targets::GOVERNMENT, slot, "slot is already empty");
                return;
            }
            (None, Some(existing)) => existing,
            (Some(policy), Some(existing)) if policy.name == existing => {
                tracing::debug!(
                    target: targets::GOVERNMENT,
                    policy = %existing,
                    slot,
                    "policy is already in that slot"
                );
                return;
            }
            (Some(policy), _) => policy.name.clone(),
        };

        self.context.commands.issue(PolicyCommand {
            policy_name,
            category,
            adopt,
            category_slot,
        });
        self.populate();
        self.do_layout();
    }

    /// [`set_policy`](Self::set_policy) by name. An empty name empties the
    /// slot.
    pub fn set_policy_by_name(&mut self, name: &str, slot: usize) {
        if name.is_empty() {
            self.set_policy(None, slot);
            return;
        }
        match self.context.catalog.policy(name) {
            Some(policy) => self.set_policy(Some(policy), slot),
            None => {
                let err = CharterError::UnknownPolicy(name.to_string());
                tracing::error!(
                    target: targets::GOVERNMENT,
                    %err,
                    slot,
                    "MainPanel::set_policy_by_name"
                );
            }
        }
    }

    /// Empty every slot, then put `policies[n]` in slot `n`. Extra names are
    /// ignored.
    pub fn set_policies(&mut self, policies: &[String]) {
        self.clear_policies();
        let count = policies.len().min(self.slots.len());
        for (slot, name) in policies.iter().enumerate().take(count) {
            self.set_policy_by_name(name, slot);
        }
    }

    /// Put `policy` in the first empty slot that can take it.
    pub fn add_policy(&mut self, policy: &PolicyRef) {
        if let Some(slot) = self.find_empty_slot_for_policy(policy) {
            self.set_policy(Some(policy.clone()), slot);
        }
    }

    pub fn can_policy_be_added(&self, policy: &PolicyRef) -> bool {
        self.find_empty_slot_for_policy(policy).is_some()
    }

    /// First empty slot of the policy's category, if the policy is available
    /// and not adopted yet.
    pub fn find_empty_slot_for_policy(&self, policy: &PolicyRef) -> Option<usize> {
        let oracle = &self.context.oracle;
        if oracle.is_locked(&policy.name) || oracle.is_adopted(&policy.name) {
            return None;
        }
        self.slots
            .iter()
            .position(|s| s.policy().is_none() && s.category() == policy.category)
    }

    pub fn clear_policies(&mut self) {
        for slot in 0..self.slots.len() {
            self.set_policy(None, slot);
        }
    }

    /// Revoke `name` from every slot holding it.
    pub fn clear_policy(&mut self, name: &str) {
        let holding: Vec<usize> = self
            .slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.policy().is_some_and(|p| p.name == name))
            .map(|(i, _)| i)
            .collect();
        for slot in holding {
            self.set_policy(None, slot);
        }
    }

    // =========================================================================
    // Population and layout
    // =========================================================================

    /// Rebuild the slots from the inventory.
    pub fn populate(&mut self) {
        self.slots.clear();
        let adopted = self.context.slots.adopted();

        for (n, (category_index, category)) in
            self.context.concatenated_category_slots().into_iter().enumerate()
        {
            let mut slot = PolicySlotControl::new(
                category.clone(),
                category_index,
                self.context.clone(),
                self.fonts.clone(),
                self.text_pts,
            );
            slot.resize_with_font(self.slot_size, self.text_pts);
            slot.set_browse_delay(self.browse_delay);
            if let Err(err) = slot.widget_base().set_parent(Some(self.object_id())) {
                tracing::error!(target: targets::GOVERNMENT, %err, "could not attach slot");
            }

            let occupant = adopted
                .get(&category)
                .and_then(|slots| slots.get(&category_index))
                .and_then(|name| self.context.catalog.policy(name));
            slot.set_policy(occupant);

            let queue = self.pending.clone();
            slot.contents_altered.connect(move |(policy, _ctrl)| {
                queue.lock().push(PanelRequest::SetPolicy {
                    policy: policy.clone(),
                    slot: n,
                });
            });
            slot.policy_clicked.forward_to(&self.policy_clicked);
            self.slots.push(slot);
        }
    }

    /// Slot size and label points for the slots.
    pub fn set_policy_size(&mut self, slot_size: Size, text_pts: i32) {
        self.slot_size = slot_size;
        self.text_pts = text_pts;
        self.do_layout();
    }

    /// Clear button top right; slots flowed left to right below it, wrapping
    /// before the right edge.
    pub fn do_layout(&mut self) {
        let pts_wide = self.pts / 2;
        let button_height = self.pts * 2;
        let button_width = pts_wide * BUTTON_LABEL_CHARS;

        let size = self.base.size();
        let lr = Point::new(size.width - PAD, size.height - PAD);
        self.clear_button
            .size_move(Point::new(lr.x - button_width, 0), Point::new(lr.x, button_height));

        let initial_x = PAD * 2;
        let mut ul = Point::new(initial_x, button_height + PAD);
        let mut count = 0;
        let mut first = true;
        for slot in &mut self.slots {
            slot.resize_with_font(self.slot_size, self.text_pts);
            let slot_size = slot.size();

            if count == 0 {
                ul.x = initial_x;
                if first {
                    first = false;
                } else {
                    ul.y += (f64::from(slot_size.height) * (1.0 + POLICY_PAD)) as i32;
                }
            } else {
                ul.x += (f64::from(slot_size.width) * (1.0 + POLICY_PAD)) as i32;
            }
            slot.move_to(ul);
            count += 1;

            if f64::from(count + 1) * f64::from(slot_size.width) * (1.0 + POLICY_PAD)
                > f64::from(lr.x - PAD)
            {
                count = 0;
            }
        }
    }

    pub fn refresh(&mut self) {
        self.populate();
        self.do_layout();
    }

    /// Apply requests queued by the slots and the clear button. Returns how
    /// many were applied.
    pub fn process_pending(&mut self) -> usize {
        let requests = std::mem::take(&mut *self.pending.lock());
        let count = requests.len();
        for request in requests {
            match request {
                PanelRequest::SetPolicy { policy, slot } => self.set_policy(policy, slot),
                PanelRequest::ClearPolicies => self.clear_policies(),
            }
        }
        count
    }
}

impl Widget for MainPanel {
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
        render_child(&self.clear_button, painter, origin);
        for slot in &self.slots {
            render_child(slot, painter, origin);
        }
    }
}

impl std::fmt::Debug for MainPanel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MainPanel")
            .field("id", &self.object_id())
            .field("policies", &self.policies())
            .finish()
    }
}

static_assertions::assert_impl_all!(MainPanel: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::domain::{Policy, PolicyCatalog};
    use crate::policy::memory::InMemoryGovernment;
    use crate::widget::{Clickable, MonospaceFonts, PointerButton};

    const ECONOMIC: &str = "ECONOMIC_CATEGORY";
    const SOCIAL: &str = "SOCIAL_CATEGORY";

    fn government() -> Arc<InMemoryGovernment> {
        let government = Arc::new(InMemoryGovernment::new());
        government.add_policy(Policy::new("PLC_PLANETARY_INFRA", ECONOMIC, 4.0));
        government.add_policy(Policy::new("PLC_TECHNOCRACY", ECONOMIC, 10.0));
        government.add_policy(Policy::new("PLC_PROPAGANDA", SOCIAL, 5.0));
        government.add_policy(Policy::new("PLC_LIBERTY", SOCIAL, 12.0));
        government.set_slots(ECONOMIC, 2);
        government.set_slots(SOCIAL, 1);
        government
    }

    fn panel(government: &Arc<InMemoryGovernment>) -> MainPanel {
        let context = government.clone().into_context();
        let mut panel = MainPanel::new(context, Arc::new(MonospaceFonts), &UiConfig::default());
        panel.size_move(Point::ZERO, Point::new(600, 500));
        panel
    }

    fn policy(government: &InMemoryGovernment, name: &str) -> PolicyRef {
        government.policy(name).unwrap()
    }

    #[test]
    fn test_slots_follow_inventory() {
        let government = government();
        government.set_slots("MILITARY_CATEGORY", -2);
        government.adopt(SOCIAL, 0, "PLC_PROPAGANDA");
        let panel = panel(&government);

        let categories: Vec<(&str, usize)> = panel
            .slots()
            .iter()
            .map(|s| (s.category(), s.category_index()))
            .collect();
        assert_eq!(categories, vec![(ECONOMIC, 0), (ECONOMIC, 1), (SOCIAL, 0)]);
        assert_eq!(panel.policies(), vec!["", "", "PLC_PROPAGANDA"]);
    }

    #[test]
    fn test_layout_flows_and_wraps() {
        let government = government();
        government.set_slots(ECONOMIC, 4);
        let panel = panel(&government);

        assert_eq!(
            panel.clear_button().geometry(),
            Rect::new(Point::new(444, 0), Point::new(594, 24))
        );
        let positions: Vec<Point> = panel.slots().iter().map(|s| s.geometry().ul).collect();
        assert_eq!(
            positions,
            vec![
                Point::new(12, 30),
                Point::new(147, 30),
                Point::new(282, 30),
                Point::new(417, 30),
                Point::new(12, 232)
            ]
        );
    }

    #[test]
    fn test_set_policy_issues_commands() {
        let government = government();
        let mut panel = panel(&government);

        panel.set_policy(Some(policy(&government, "PLC_TECHNOCRACY")), 1);
        assert_eq!(
            government.issued(),
            vec![PolicyCommand {
                policy_name: "PLC_TECHNOCRACY".into(),
                category: ECONOMIC.into(),
                adopt: true,
                category_slot: 1,
            }]
        );
        assert_eq!(panel.policies(), vec!["", "PLC_TECHNOCRACY", ""]);

        panel.set_policy(None, 1);
        let last = government.issued().pop().unwrap();
        assert!(!last.adopt);
        assert_eq!(last.policy_name, "PLC_TECHNOCRACY");
        assert_eq!(panel.policies(), vec!["", "", ""]);
    }

    #[test]
    fn test_redundant_and_invalid_requests_do_nothing() {
        let government = government();
        government.adopt(ECONOMIC, 0, "PLC_PLANETARY_INFRA");
        let mut panel = panel(&government);

        panel.set_policy(None, 1);
        panel.set_policy(Some(policy(&government, "PLC_PLANETARY_INFRA")), 0);
        panel.set_policy(Some(policy(&government, "PLC_LIBERTY")), 3);
        panel.set_policy_by_name("PLC_UNKNOWN", 2);
        assert!(government.issued().is_empty());
    }

    #[test]
    fn test_add_policy_finds_empty_slot_of_category() {
        let government = government();
        government.adopt(ECONOMIC, 0, "PLC_PLANETARY_INFRA");
        let mut panel = panel(&government);

        let technocracy = policy(&government, "PLC_TECHNOCRACY");
        assert_eq!(panel.find_empty_slot_for_policy(&technocracy), Some(1));
        panel.add_policy(&technocracy);
        assert_eq!(panel.policies(), vec!["PLC_PLANETARY_INFRA", "PLC_TECHNOCRACY", ""]);

        // Adopted already, or no free slot left.
        assert!(!panel.can_policy_be_added(&technocracy));
        assert!(!panel.can_policy_be_added(&policy(&government, "PLC_PLANETARY_INFRA")));

        let liberty = policy(&government, "PLC_LIBERTY");
        government.set_locked("PLC_LIBERTY", true);
        assert!(!panel.can_policy_be_added(&liberty));
        government.set_locked("PLC_LIBERTY", false);
        assert!(panel.can_policy_be_added(&liberty));
    }

    #[test]
    fn test_set_policies_and_clear() {
        let government = government();
        let mut panel = panel(&government);

        panel.set_policies(&[
            "PLC_PLANETARY_INFRA".to_string(),
            String::new(),
            "PLC_PROPAGANDA".to_string(),
            "PLC_LIBERTY".to_string(),
        ]);
        assert_eq!(panel.policies(), vec!["PLC_PLANETARY_INFRA", "", "PLC_PROPAGANDA"]);

        panel.clear_policy("PLC_PROPAGANDA");
        assert_eq!(panel.policies(), vec!["PLC_PLANETARY_INFRA", "", ""]);

        panel.clear_button_mut().handle_click(PointerButton::Left);
        assert_eq!(panel.process_pending(), 1);
        assert_eq!(panel.policies(), vec!["", "", ""]);
    }

    #[test]
    fn test_slot_double_click_revokes_through_queue() {
        let government = government();
        government.adopt(SOCIAL, 0, "PLC_LIBERTY");
        let mut panel = panel(&government);

        panel.slot_mut(2).unwrap().occupant_mut().unwrap().handle_double_click();
        assert_eq!(panel.policies()[2], "PLC_LIBERTY");
        panel.process_pending();
        assert_eq!(panel.policies()[2], "");
        assert_eq!(government.issued().len(), 1);
    }
}
