//! Value types used to describe sprites at the draw submission API.

mod color;
mod rect;

pub use color::*;
pub use rect::*;
