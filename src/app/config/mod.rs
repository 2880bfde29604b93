pub mod cache;
pub mod config;
pub mod library;
pub mod logging;
pub mod playback;
pub mod server;

pub use config::Config;
pub use logging::LoggingConfig;
pub use server::ServerConfig;
