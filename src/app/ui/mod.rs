pub mod rendering;
pub mod theme;
pub mod views;
pub mod widgets;

pub use rendering::render;
