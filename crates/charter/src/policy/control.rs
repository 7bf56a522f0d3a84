//! The draggable view of one policy.

use std::time::Duration;

use charter_core::{Color, ObjectId, Painter, Point, Rect, Signal, Size, SubImage};

use super::domain::PolicyRef;
use crate::widget::{DragItem, FontProvider, ModKeys, TextFormat, TextLabel, Widget, WidgetBase};

/// Drop type carried by policy drags.
pub const POLICY_CONTROL_DROP_TYPE: &str = "Policy Control";

pub const POLICY_CONTROL_WIDTH: i32 = 120;
pub const POLICY_CONTROL_HEIGHT: i32 = 180;

const TEXT_POS_X: f64 = 0.0625;
const TEXT_POS_Y: f64 = 0.75;
const COST_POS_X: f64 = 0.75;
const COST_POS_Y: f64 = 0.0625;

const TEXT_COLOR: Color = Color::WHITE;

/// Hover time before a control offers its details, unless configured.
pub const DEFAULT_BROWSE_DELAY: Duration = Duration::from_millis(100);

/// What a hovered policy shows in its details popup.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyBrowseInfo {
    pub title: String,
    pub cost: String,
    pub short_description: String,
    pub description: String,
}

/// Texture for a policy card of the given category.
pub(crate) fn policy_background(category: &str) -> SubImage {
    SubImage::whole(format!("icons/policies/{}_policy.png", category.to_lowercase()))
}

fn policy_icon(name: &str) -> SubImage {
    SubImage::whole(format!("icons/policies/{}.png", name.to_lowercase()))
}

fn scale(extent: i32, factor: f64) -> i32 {
    (f64::from(extent) * factor) as i32
}

/// A policy card: background, icon, name and adoption cost.
pub struct PolicyControl {
    base: WidgetBase,
    policy: PolicyRef,
    name_label: TextLabel,
    cost_label: TextLabel,
    name_rect: Rect,
    cost_pos: Point,
    background: SubImage,
    icon: SubImage,
    browse_delay: Duration,

    /// Left click, with the modifiers held.
    pub clicked: Signal<(PolicyRef, ModKeys)>,
    pub double_clicked: Signal<PolicyRef>,
    /// Right click, with the click position.
    pub right_clicked: Signal<(PolicyRef, Point)>,
}

impl PolicyControl {
    pub fn new(policy: PolicyRef, fonts: &dyn FontProvider, pts: i32) -> Self {
        let font = fonts.bold_font(pts);
        let cost = (policy.adoption_cost as i64).to_string();
        let mut control = Self {
            base: WidgetBase::new::<Self>(),
            name_label: TextLabel::new(
                policy.name.clone(),
                TextFormat::WORDBREAK,
                TEXT_COLOR,
                font.clone(),
            ),
            cost_label: TextLabel::new(cost, TextFormat::LEFT | TextFormat::TOP, TEXT_COLOR, font),
            name_rect: Rect::ZERO,
            cost_pos: Point::ZERO,
            background: policy_background(&policy.category),
            icon: policy_icon(&policy.name),
            browse_delay: DEFAULT_BROWSE_DELAY,
            policy,
            clicked: Signal::new(),
            double_clicked: Signal::new(),
            right_clicked: Signal::new(),
        };
        control.base.set_name(control.policy.name.clone());
        control.resize_with_font(
            Size::new(POLICY_CONTROL_WIDTH, POLICY_CONTROL_HEIGHT),
            fonts,
            pts,
        );
        control
    }

    pub fn policy(&self) -> &PolicyRef {
        &self.policy
    }

    pub fn policy_name(&self) -> &str {
        &self.policy.name
    }

    pub fn name_label(&self) -> &TextLabel {
        &self.name_label
    }

    pub fn cost_label(&self) -> &TextLabel {
        &self.cost_label
    }

    /// Where the name is drawn, relative to the control.
    pub fn name_rect(&self) -> Rect {
        self.name_rect
    }

    /// Where the cost is drawn, relative to the control.
    pub fn cost_position(&self) -> Point {
        self.cost_pos
    }

    /// Resize and switch the labels to a font of `pts` points.
    pub fn resize_with_font(&mut self, size: Size, fonts: &dyn FontProvider, pts: i32) {
        let font = fonts.bold_font(pts);
        self.name_label.set_font(font.clone());
        self.cost_label.set_font(font);

        self.name_rect = Rect::new(
            Point::new(scale(size.width, TEXT_POS_X), scale(size.height, TEXT_POS_Y)),
            Point::new(scale(size.width, 1.0 - TEXT_POS_X), scale(size.height, 1.0)),
        );
        self.cost_pos = Point::new(
            scale(size.width, COST_POS_X),
            scale(size.height, 1.0 - COST_POS_Y),
        );
        self.resize(size);
    }

    pub fn browse_delay(&self) -> Duration {
        self.browse_delay
    }

    pub fn set_browse_delay(&mut self, delay: Duration) {
        self.browse_delay = delay;
    }

    /// Details to show once the pointer has rested on the control for
    /// `hovered`, or `None` while the browse delay has not yet passed.
    pub fn browse_info(&self, hovered: Duration) -> Option<PolicyBrowseInfo> {
        (hovered >= self.browse_delay).then(|| PolicyBrowseInfo {
            title: self.policy.name.clone(),
            cost: self.cost_label.text().to_string(),
            short_description: self.policy.short_description.clone(),
            description: self.policy.description.clone(),
        })
    }

    pub fn handle_click(&mut self, mods: ModKeys) {
        self.clicked.emit((self.policy.clone(), mods));
    }

    pub fn handle_double_click(&mut self) {
        self.double_clicked.emit(self.policy.clone());
    }

    pub fn handle_right_click(&mut self, point: Point) {
        self.right_clicked.emit((self.policy.clone(), point));
    }

    /// A drag item for this control, dragged out of `source`.
    ///
    /// The item retains the control's registry node, so the node outlives
    /// the control if its owner drops it mid-drag.
    pub fn drag_item(&self, source: ObjectId) -> DragItem {
        let item = DragItem::new(self.object_id(), POLICY_CONTROL_DROP_TYPE, self.policy.clone())
            .with_source(source);
        match self.base.retain() {
            Ok(retained) => item.with_retained(retained),
            Err(err) => {
                tracing::warn!(
                    target: charter_core::logging::targets::DRAG_DROP,
                    %err,
                    "dragging a policy control without a registry node"
                );
                item
            }
        }
    }
}

impl Widget for PolicyControl {
    fn widget_base(&self) -> &WidgetBase {
        &self.base
    }

    fn widget_base_mut(&mut self) -> &mut WidgetBase {
        &mut self.base
    }

    fn render(&self, painter: &mut dyn Painter, origin: Point) {
        let size = self.size();
        let tint = Color::WHITE.with_disabled(self.is_disabled());
        painter.blit(&self.background, Rect::from_pos_size(origin, size), tint);
        painter.blit(
            &self.icon,
            Rect::from_pos_size(origin, Size::new(size.width, size.height * 2 / 3)),
            tint,
        );
        let name_rect = self.name_rect.offset(origin);
        self.name_label
            .render_at(painter, self.name_label.origin_in(name_rect), self.name_label.color());
        self.cost_label
            .render_at(painter, origin + self.cost_pos, self.cost_label.color());
    }
}

impl std::fmt::Debug for PolicyControl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolicyControl")
            .field("id", &self.object_id())
            .field("policy", &self.policy.name)
            .field("geometry", &self.geometry())
            .finish()
    }
}

static_assertions::assert_impl_all!(PolicyControl: Send, Sync);

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use charter_core::{PaintCommand, RecordingPainter};
    use parking_lot::Mutex;

    use super::*;
    use crate::policy::domain::Policy;
    use crate::widget::MonospaceFonts;

    fn control() -> PolicyControl {
        let policy = Arc::new(Policy::new("PLC_PROPAGANDA", "SOCIAL_CATEGORY", 5.8));
        PolicyControl::new(policy, &MonospaceFonts, 12)
    }

    #[test]
    fn test_labels_at_fractional_positions() {
        let control = control();
        assert_eq!(control.size(), Size::new(120, 180));
        assert_eq!(control.name_rect(), Rect::new(Point::new(7, 135), Point::new(112, 180)));
        assert_eq!(control.cost_position(), Point::new(90, 168));
        assert_eq!(control.cost_label().text(), "5");
    }

    #[test]
    fn test_resize_rescales_labels() {
        let mut control = control();
        control.resize_with_font(Size::new(60, 90), &MonospaceFonts, 6);
        assert_eq!(control.size(), Size::new(60, 90));
        assert_eq!(control.cost_position(), Point::new(45, 84));
        assert_eq!(control.name_label().font().point_size(), 6);
    }

    #[test]
    fn test_click_signals_carry_policy() {
        let mut control = control();
        let received = Arc::new(Mutex::new(Vec::new()));

        let r = received.clone();
        control.clicked.connect(move |(p, mods)| {
            r.lock().push(format!("click {} {}", p.name, mods.ctrl()))
        });
        let r = received.clone();
        control.double_clicked.connect(move |p| r.lock().push(format!("double {}", p.name)));
        let r = received.clone();
        control.right_clicked.connect(move |(p, pt)| {
            r.lock().push(format!("right {} {}", p.name, pt.x))
        });

        control.handle_click(ModKeys::CTRL);
        control.handle_double_click();
        control.handle_right_click(Point::new(3, 4));

        assert_eq!(
            *received.lock(),
            vec!["click PLC_PROPAGANDA true", "double PLC_PROPAGANDA", "right PLC_PROPAGANDA 3"]
        );
    }

    #[test]
    fn test_browse_info_waits_for_delay() {
        let mut control = control();
        assert_eq!(control.browse_delay(), DEFAULT_BROWSE_DELAY);
        control.set_browse_delay(Duration::from_millis(400));

        assert_eq!(control.browse_info(Duration::from_millis(399)), None);
        let info = control.browse_info(Duration::from_millis(400)).unwrap();
        assert_eq!(info.title, "PLC_PROPAGANDA");
        assert_eq!(info.cost, "5");
    }

    #[test]
    fn test_drag_item_describes_control() {
        let control = control();
        let item = control.drag_item(control.object_id());
        assert_eq!(item.widget(), control.object_id());
        assert_eq!(item.drop_type(), POLICY_CONTROL_DROP_TYPE);
        assert!(item.is_retained());
        assert_eq!(item.payload::<PolicyRef>().map(|p| p.name.as_str()), Some("PLC_PROPAGANDA"));
    }

    #[test]
    fn test_render_draws_background_icon_and_labels() {
        let control = control();
        let mut painter = RecordingPainter::new();
        control.render(&mut painter, Point::new(10, 20));

        let blits: Vec<_> = painter
            .commands()
            .iter()
            .filter_map(|c| match c {
                PaintCommand::Blit { image, rect, .. } => Some((image.texture.to_string(), *rect)),
                _ => None,
            })
            .collect();
        assert_eq!(blits[0].0, "icons/policies/social_category_policy.png");
        assert_eq!(blits[0].1, Rect::from_pos_size(Point::new(10, 20), Size::new(120, 180)));
        assert_eq!(blits[1].1.size(), Size::new(120, 120));
        let texts: Vec<&str> = painter.texts().into_iter().map(|(_, text, _)| text).collect();
        assert!(texts.contains(&"PLC_PROPAGANDA"));
        assert!(texts.contains(&"5"));
    }
}
