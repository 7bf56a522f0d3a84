//! Render primitives consumed by widgets.
//!
//! Charter does not rasterise anything itself. Widgets describe each frame
//! through the [`Painter`] trait, which a host backend implements.
//! [`RecordingPainter`] captures the calls as [`PaintCommand`]s for headless
//! use and for tests.

use std::sync::Arc;

use crate::geometry::{Color, Point, Rect};

/// Which edges of a beveled rectangle receive the bevel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BevelSides {
    pub top: bool,
    pub left: bool,
    pub right: bool,
    pub bottom: bool,
}

impl BevelSides {
    /// Bevel on all four edges.
    pub const ALL: Self = Self {
        top: true,
        left: true,
        right: true,
        bottom: true,
    };

    /// Bevel everywhere except the bottom edge, for tabs attached to a pane.
    pub const NO_BOTTOM: Self = Self {
        top: true,
        left: true,
        right: true,
        bottom: false,
    };
}

impl Default for BevelSides {
    fn default() -> Self {
        Self::ALL
    }
}

/// A region of a texture.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubImage {
    /// Texture identifier understood by the backend, usually a file name.
    pub texture: Arc<str>,
    /// Source region within the texture. An empty rect means the whole texture.
    pub source: Rect,
}

impl SubImage {
    /// The whole of a texture.
    pub fn whole(texture: impl Into<Arc<str>>) -> Self {
        Self {
            texture: texture.into(),
            source: Rect::ZERO,
        }
    }
}

/// Drawing operations widgets need from a backend.
pub trait Painter {
    /// Fill `rect` with `color`, drawing a bevel of `bevel` pixels on `sides`.
    /// `up` selects a raised rather than sunken look.
    fn beveled_rectangle(
        &mut self,
        rect: Rect,
        color: Color,
        border_color: Color,
        up: bool,
        bevel: i32,
        sides: BevelSides,
    );

    /// A beveled circle inscribed in `rect`.
    fn beveled_circle(
        &mut self,
        rect: Rect,
        color: Color,
        border_color: Color,
        up: bool,
        bevel: i32,
    );

    /// A beveled check mark inscribed in `rect`.
    fn beveled_check(&mut self, rect: Rect, color: Color);

    /// A filled, shaded circle inscribed in `rect`.
    fn bubble(&mut self, rect: Rect, color: Color);

    /// A flat filled rectangle with a border of `border_thickness` pixels.
    fn flat_rectangle(&mut self, rect: Rect, fill: Color, border: Color, border_thickness: u32);

    /// Blit a texture region into `rect`, modulated by `tint`.
    fn blit(&mut self, image: &SubImage, rect: Rect, tint: Color);

    /// Draw a single run of text with its upper-left at `origin`.
    fn draw_text(&mut self, origin: Point, text: &str, color: Color);
}

/// A recorded [`Painter`] call.
#[derive(Debug, Clone, PartialEq)]
pub enum PaintCommand {
    BeveledRectangle {
        rect: Rect,
        color: Color,
        border_color: Color,
        up: bool,
        bevel: i32,
        sides: BevelSides,
    },
    BeveledCircle {
        rect: Rect,
        color: Color,
        border_color: Color,
        up: bool,
        bevel: i32,
    },
    BeveledCheck {
        rect: Rect,
        color: Color,
    },
    Bubble {
        rect: Rect,
        color: Color,
    },
    FlatRectangle {
        rect: Rect,
        fill: Color,
        border: Color,
        border_thickness: u32,
    },
    Blit {
        image: SubImage,
        rect: Rect,
        tint: Color,
    },
    Text {
        origin: Point,
        text: String,
        color: Color,
    },
}

/// A [`Painter`] that records every call.
#[derive(Debug, Default)]
pub struct RecordingPainter {
    commands: Vec<PaintCommand>,
}

impl RecordingPainter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands recorded so far, in call order.
    pub fn commands(&self) -> &[PaintCommand] {
        &self.commands
    }

    /// Take the recorded commands, leaving the painter empty.
    pub fn take(&mut self) -> Vec<PaintCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Recorded text runs as `(origin, text, color)`.
    pub fn texts(&self) -> Vec<(Point, &str, Color)> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                PaintCommand::Text { origin, text, color } => {
                    Some((*origin, text.as_str(), *color))
                }
                _ => None,
            })
            .collect()
    }
}

impl Painter for RecordingPainter {
    fn beveled_rectangle(
        &mut self,
        rect: Rect,
        color: Color,
        border_color: Color,
        up: bool,
        bevel: i32,
        sides: BevelSides,
    ) {
        self.commands.push(PaintCommand::BeveledRectangle {
            rect,
            color,
            border_color,
            up,
            bevel,
            sides,
        });
    }

    fn beveled_circle(
        &mut self,
        rect: Rect,
        color: Color,
        border_color: Color,
        up: bool,
        bevel: i32,
    ) {
        self.commands.push(PaintCommand::BeveledCircle {
            rect,
            color,
            border_color,
            up,
            bevel,
        });
    }

    fn beveled_check(&mut self, rect: Rect, color: Color) {
        self.commands.push(PaintCommand::BeveledCheck { rect, color });
    }

    fn bubble(&mut self, rect: Rect, color: Color) {
        self.commands.push(PaintCommand::Bubble { rect, color });
    }

    fn flat_rectangle(&mut self, rect: Rect, fill: Color, border: Color, border_thickness: u32) {
        self.commands.push(PaintCommand::FlatRectangle {
            rect,
            fill,
            border,
            border_thickness,
        });
    }

    fn blit(&mut self, image: &SubImage, rect: Rect, tint: Color) {
        self.commands.push(PaintCommand::Blit {
            image: image.clone(),
            rect,
            tint,
        });
    }

    fn draw_text(&mut self, origin: Point, text: &str, color: Color) {
        self.commands.push(PaintCommand::Text {
            origin,
            text: text.to_owned(),
            color,
        });
    }
}
