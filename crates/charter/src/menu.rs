//! The in-game menu: save, load, options, resign and done.
//!
//! The menu does none of these itself. Each button requests a
//! [`MenuAction`] through [`InGameMenu::action_requested`] and the host
//! carries it out. The menu sizes and centres itself; whatever geometry it is
//! given is ignored.

use std::sync::Arc;

use charter_core::logging::targets;
use charter_core::{Color, Painter, Point, Rect, Signal, Size};
use parking_lot::Mutex;

use crate::config::MenuConfig;
use crate::widget::{Button, FontProvider, Key, ModKeys, Widget, WidgetBase, render_child};

/// Initial size before the first layout.
const INITIAL_SIZE: Size = Size::new(150, 280);
/// Upper-left of the first button.
const FIRST_BUTTON: Point = Point::new(15, 12);
/// Extra gap before the Done button, in cells.
const DONE_GAP_CELLS: f64 = 0.75;
/// Height of the menu, in cells: five buttons plus the gap.
const MENU_CELLS: f64 = 5.75;

const BUTTON_COLOR: Color = Color::from_rgb8(60, 80, 120);

/// Something the player asked the menu for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuAction {
    Save,
    Load,
    Options,
    Resign,
    Done,
}

impl MenuAction {
    pub const ALL: [MenuAction; 5] = [
        MenuAction::Save,
        MenuAction::Load,
        MenuAction::Options,
        MenuAction::Resign,
        MenuAction::Done,
    ];

    pub fn label(self) -> &'static str {
        match self {
            MenuAction::Save => "Save",
            MenuAction::Load => "Load",
            MenuAction::Options => "Options",
            MenuAction::Resign => "Resign",
            MenuAction::Done => "Done",
        }
    }

    /// Whether the menu closes after requesting this action.
    pub fn closes_menu(self) -> bool {
        !matches!(self, MenuAction::Options)
    }
}

/// What the menu needs to know about the running game.
pub trait MenuHost: Send + Sync {
    fn is_single_player(&self) -> bool;

    /// Whether a save may be started right now.
    fn can_save_now(&self) -> bool;

    /// Size of the application window the menu is centred in.
    fn app_size(&self) -> Size;
}

/// The modal in-game menu.
pub struct InGameMenu {
    base: WidgetBase,
    host: Arc<dyn MenuHost>,
    config: MenuConfig,
    buttons: Vec<(MenuAction, Button)>,
    pending: Arc<Mutex<Vec<MenuAction>>>,
    done: bool,

    /// The host should carry out this action.
    pub action_requested: Signal<MenuAction>,
}

impl InGameMenu {
    pub fn new(
        host: Arc<dyn MenuHost>,
        fonts: &dyn FontProvider,
        font_pts: i32,
        config: MenuConfig,
    ) -> Self {
        let pending: Arc<Mutex<Vec<MenuAction>>> = Arc::new(Mutex::new(Vec::new()));
        let font = fonts.font(font_pts);

        let buttons = MenuAction::ALL
            .into_iter()
            .map(|action| {
                let button = Button::new(action.label(), font.clone(), BUTTON_COLOR, Color::WHITE);
                let queue = pending.clone();
                button.left_clicked.connect(move |_| queue.lock().push(action));
                (action, button)
            })
            .collect();

        let mut menu = Self {
            base: WidgetBase::new::<Self>(),
            host,
            config,
            buttons,
            pending,
            done: false,
            action_requested: Signal::new(),
        };
        menu.base.set_name("InGameMenu");
        menu.base.resize(INITIAL_SIZE);

        let id = menu.object_id();
        for (_, button) in &menu.buttons {
            if let Err(err) = button.widget_base().set_parent(Some(id)) {
                tracing::error!(target: targets::MENU, %err, "could not attach menu button");
            }
        }

        // A multiplayer game is loaded from the lobby, not from here.
        if !menu.host.is_single_player() {
            menu.set_action_disabled(MenuAction::Load, true);
        }
        if !menu.host.can_save_now() {
            menu.set_action_disabled(MenuAction::Save, true);
        }

        let app = menu.host.app_size();
        menu.size_move(Point::ZERO, app.to_point());
        menu
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn button(&self, action: MenuAction) -> Option<&Button> {
        self.buttons.iter().find(|(a, _)| *a == action).map(|(_, b)| b)
    }

    pub fn button_mut(&mut self, action: MenuAction) -> Option<&mut Button> {
        self.buttons.iter_mut().find(|(a, _)| *a == action).map(|(_, b)| b)
    }

    fn set_action_disabled(&mut self, action: MenuAction, disabled: bool) {
        if let Some(button) = self.button_mut(action) {
            button.set_disabled(disabled);
        }
    }

    /// Whether the menu has finished and should be dismissed.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Width every button is given.
    pub fn button_width(&self) -> i32 {
        self.buttons
            .iter()
            .map(|(_, b)| b.min_usable_size().width)
            .fold(self.config.min_button_width, i32::max)
    }

    /// Vertical distance between button tops.
    pub fn button_cell_height(&self) -> i32 {
        self.done_button_height().max(self.config.min_button_height)
    }

    fn done_button_height(&self) -> i32 {
        self.button(MenuAction::Done)
            .map_or(0, |b| b.min_usable_size().height)
    }

    // =========================================================================
    // Actions
    // =========================================================================

    /// Carry out `action` as if its button had been clicked.
    pub fn activate(&mut self, action: MenuAction) {
        tracing::debug!(target: targets::MENU, ?action, "InGameMenu::activate");
        if self.button(action).is_some_and(|b| b.is_disabled()) {
            tracing::debug!(target: targets::MENU, ?action, "action is disabled");
            return;
        }
        if action == MenuAction::Save && !self.host.can_save_now() {
            tracing::error!(
                target: targets::MENU,
                "InGameMenu::activate: aborting save, the game can't save now"
            );
            return;
        }
        if action == MenuAction::Load {
            self.hide();
        }

        self.action_requested.emit(action);
        if action.closes_menu() {
            self.done = true;
        }
    }

    /// Return, keypad Enter and Escape act as Done. Returns whether the key
    /// was used.
    pub fn key_press(&mut self, key: Key, _mods: ModKeys) -> bool {
        match key {
            Key::Return | Key::KeypadEnter | Key::Escape => {
                self.activate(MenuAction::Done);
                true
            }
            Key::Other(_) => false,
        }
    }

    /// Apply button clicks. Returns how many were applied.
    pub fn process_pending(&mut self) -> usize {
        let actions = std::mem::take(&mut *self.pending.lock());
        let count = actions.len();
        for action in actions {
            self.activate(action);
        }
        count
    }

    /// Stack the buttons, leaving an extra gap above Done.
    pub fn do_layout(&mut self) {
        let width = self.button_width();
        let cell = self.button_cell_height();
        let height = self.done_button_height();

        let mut ul = FIRST_BUTTON;
        for (action, button) in &mut self.buttons {
            if *action == MenuAction::Done {
                ul.y += (f64::from(cell) * DONE_GAP_CELLS) as i32;
            }
            button.size_move(ul, Point::new(ul.x + width, ul.y + height));
            ul.y += cell;
        }
    }
}

impl Widget for InGameMenu {
    fn widget_base(&self) -> &WidgetBase {
        &self.base
    }

    fn widget_base_mut(&mut self) -> &mut WidgetBase {
        &mut self.base
    }

    fn min_usable_size(&self) -> Size {
        Size::new(
            self.button_width() + self.config.horizontal_margin,
            (MENU_CELLS * f64::from(self.button_cell_height())) as i32
                + self.config.vertical_margin,
        )
    }

    /// The menu picks its own size and centres itself in the application.
    fn size_move(&mut self, _ul: Point, _lr: Point) {
        let size = self.min_usable_size();
        let app = self.host.app_size();
        let ul = Point::new(app.width / 2 - size.width / 2, app.height / 2 - size.height / 2);
        let lr = Point::new(app.width / 2 + size.width / 2, app.height / 2 + size.height / 2);
        self.base.set_geometry(Rect::new(ul, lr));
        self.do_layout();
    }

    fn render(&self, painter: &mut dyn Painter, origin: Point) {
        let rect = Rect::from_pos_size(origin, self.size());
        painter.flat_rectangle(rect, Color::from_rgba8(20, 20, 30, 230), Color::GRAY, 1);
        for (_, button) in &self.buttons {
            render_child(button, painter, origin);
        }
    }
}

impl std::fmt::Debug for InGameMenu {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InGameMenu")
            .field("id", &self.object_id())
            .field("geometry", &self.geometry())
            .field("done", &self.done)
            .finish_non_exhaustive()
    }
}

static_assertions::assert_impl_all!(InGameMenu: Send, Sync);
