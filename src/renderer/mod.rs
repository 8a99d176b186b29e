//! Canvas-2D rendering
//!
//! Draws the plain sim model each frame; holds no game state of its own.

pub mod canvas;

pub use canvas::CanvasPainter;
