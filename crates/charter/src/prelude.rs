//! Prelude module for Charter.
//!
//! ```ignore
//! use charter::prelude::*;
//! ```

// ============================================================================
// Core
// ============================================================================

pub use charter_core::{Color, ObjectId, Painter, Point, Rect, Signal, Size};

// ============================================================================
// Widgets
// ============================================================================

pub use crate::widget::{
    Button, Checkable, Clickable, FontProvider, Key, ModKeys, Orientation, PointerButton,
    RadioButtonGroup, StateButton, StateButtonStyle, TextFormat, Widget, WidgetBase,
};
pub use crate::widget::{DragData, DragDropManager, DragItem, DragSource, DropTarget};

// ============================================================================
// Screens
// ============================================================================

pub use crate::config::UiConfig;
pub use crate::menu::{InGameMenu, MenuAction, MenuHost};
pub use crate::policy::{
    GovernmentContext, GovernmentWnd, InMemoryGovernment, Policy, PolicyCommand,
};
