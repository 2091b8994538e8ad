//! Terminal UI module using ratatui.
//!
//! - `render`: frame layout, title and status bars, overlays
//! - `input`: keyboard event handling
//! - `styles`: colors and text styling
//! - `views`: per-screen content (landing, account forms, gallery, detail)

pub mod input;
pub mod render;
pub mod styles;
pub mod views;
