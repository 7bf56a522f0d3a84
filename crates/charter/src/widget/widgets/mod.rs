//! Concrete widgets.

mod button;
mod radio_group;
mod state_button;

pub use button::{Button, ButtonState};
pub use radio_group::{Orientation, RadioButtonGroup};
pub use state_button::{StateButton, StateButtonStyle};
