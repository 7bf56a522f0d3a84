//! Input event vocabulary shared by widgets.

use bitflags::bitflags;

/// Which pointer button an event concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    /// The primary (usually left) button.
    Left,
    /// The secondary (usually right) button.
    Right,
}

bitflags! {
    /// Keyboard modifiers held during an input event.
    ///
    /// ```
    /// use charter::ModKeys;
    /// let mods = ModKeys::CTRL | ModKeys::SHIFT;
    /// assert!(mods.ctrl());
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ModKeys: u8 {
        const SHIFT = 0b0000_0001;
        const CTRL = 0b0000_0010;
        const ALT = 0b0000_0100;
        const META = 0b0000_1000;
    }
}

impl ModKeys {
    /// Whether a control key is held.
    pub fn ctrl(self) -> bool {
        self.contains(Self::CTRL)
    }
}

/// Keys the widgets in this crate react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Return,
    KeypadEnter,
    Escape,
    Other(char),
}
