//! Core systems for Charter.
//!
//! This crate provides the foundation the widget layer is built on:
//!
//! - **Signal/Slot System**: typed, ordered, re-entrant notifications
//! - **Object Model**: an arena of widget nodes with stable ids, containment,
//!   effective visible/enabled state and end-of-frame garbage collection
//! - **Geometry**: integral points, sizes, rectangles and colours
//! - **Paint**: the render primitives widgets draw with
//! - **Logging**: `tracing` targets and tree debugging
//!
//! # Signal/Slot Example
//!
//! ```
//! use charter_core::Signal;
//!
//! let value_changed = Signal::<i32>::new();
//! let conn_id = value_changed.connect(|value| {
//!     println!("Value changed to: {}", value);
//! });
//! value_changed.emit(42);
//! value_changed.disconnect(conn_id);
//! ```

pub mod geometry;
pub mod logging;
pub mod object;
pub mod paint;
pub mod signal;

pub use geometry::{Color, Point, Rect, Size};
pub use logging::{TreeFormatOptions, TreeStyle, WidgetTreeDebug};
pub use object::{
    ObjectBase, ObjectError, ObjectId, ObjectRegistry, ObjectResult, Retained,
    SharedObjectRegistry, global_registry,
};
pub use paint::{BevelSides, PaintCommand, Painter, RecordingPainter, SubImage};
pub use signal::{ConnectionGuard, ConnectionId, Signal, SignalHandle};
