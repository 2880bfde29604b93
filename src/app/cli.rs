use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "mulise")]
#[command(version)]
#[command(about = "A terminal client for MuLiSe music library servers", long_about = None)]
pub struct Args {
    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Library server base URL (overrides config)
    #[arg(short, long)]
    pub server: Option<String>,

    /// Access token (overrides config)
    #[arg(short, long, env = "MULISE_ACCESS_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Write a default config file to the given path (or directory) and exit
    #[arg(long, value_name = "PATH")]
    pub generate_config: Option<PathBuf>,

    /// Search the library for songs, print the matches and exit
    #[arg(long, value_name = "QUERY")]
    pub search: Option<String>,

    /// Play one song by hash with the configured player and exit when it ends
    #[arg(long, value_name = "SONG_HASH", conflicts_with = "search")]
    pub play: Option<String>,
}
