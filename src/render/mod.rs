//! Board painting and terminal screens

pub mod board;
pub mod canvas;
pub mod renderer;
pub mod surface;

pub use canvas::CellCanvas;
pub use renderer::Renderer;
pub use surface::{Paint, PixelRect, Rgb, Surface};
