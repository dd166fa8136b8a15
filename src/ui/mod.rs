//! Ready-made widgets
//!
//! Small entities for putting something on screen quickly:
//! - [`Label`]: multi-line text
//! - [`ColorRect`]: a filled rectangle
//! - [`CircleScroller`]: turns circular mouse motion into an angle
//!
//! All of them draw relative to the origin handed down by their group.

mod circle_scroller;
mod color_rect;
mod label;
mod rect;

pub use circle_scroller::*;
pub use color_rect::*;
pub use label::*;
pub use rect::*;
