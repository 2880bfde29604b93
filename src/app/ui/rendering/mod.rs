pub mod renderer;
pub mod utils;

pub use renderer::render;
