pub mod image;
pub mod song;
pub mod top_box;

pub use image::render_cover_widget;
pub use song::create_song_widget;
pub use top_box::create_top_box;
