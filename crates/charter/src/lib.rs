//! Charter - retained-mode widgets and the government policy screens.
//!
//! The widget layer ([`widget`]) provides state buttons, radio groups, push
//! buttons and drag and drop on top of the object model and signals in
//! [`charter_core`]. The [`policy`] screens and the [`menu`] are built from
//! those widgets.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use charter::config::UiConfig;
//! use charter::policy::{GovernmentWnd, InMemoryGovernment, Policy};
//! use charter::widget::MonospaceFonts;
//! use charter::{Point, Widget};
//!
//! let government = Arc::new(InMemoryGovernment::new());
//! government.add_policy(Policy::new("PLC_PROPAGANDA", "SOCIAL_CATEGORY", 5.0));
//! government.set_slots("SOCIAL_CATEGORY", 1);
//!
//! let context = government.clone().into_context();
//! let mut wnd = GovernmentWnd::new(context, Arc::new(MonospaceFonts), UiConfig::default());
//! wnd.size_move(Point::ZERO, Point::new(800, 600));
//! assert_eq!(wnd.main_panel().policies(), vec![String::new()]);
//! ```

pub mod config;
pub mod error;
pub mod menu;
pub mod policy;
pub mod prelude;
pub mod widget;

pub use charter_core::*;

pub use config::UiConfig;
pub use error::{CharterError, ConfigError, Result};
pub use menu::{InGameMenu, MenuAction, MenuHost};
pub use widget::{
    Button, Checkable, Clickable, DragData, DragDropManager, DragItem, DragSource, DropTarget, Key,
    ModKeys, PointerButton, RadioButtonGroup, StateButton, StateButtonStyle, TextFormat, TextLabel,
    Widget, WidgetBase,
};
