pub use app::App;

// Module declarations
pub mod api;
pub mod app;
pub mod cache;
pub mod cli;
pub mod config;
pub mod constructor;
pub mod error;
pub mod event_handlers;
pub mod logging;
pub mod main_loop;
pub mod navigation;
pub mod playback;
pub mod resolver;
pub mod song;
pub mod tasks;
pub mod terminal;
pub mod ui;
pub mod view;
