// Module declarations
mod app;

use std::time::Duration;

use app::api::ApiClient;
use app::cache::new_shared_cache;
use app::cli::Args;
use app::config::Config;
use app::constructor::AppConstructor;
use app::playback::{CommandOutput, PlayOutcome, PlaybackController};
use app::resolver::MediaResolver;
use app::song::LibraryStore;
use app::{
    App,
    main_loop::AppMainLoop,
    terminal::{init_terminal, restore_terminal},
};
use clap::Parser;
use color_eyre::eyre::{WrapErr, eyre};

/// Load the library once and print the songs matching `query`
async fn run_search(client: ApiClient, query: &str) -> color_eyre::Result<()> {
    let mut store = LibraryStore::new(client);
    let snapshot = store.load().await.wrap_err("Failed to load library")?;

    let hits = snapshot.search_songs(query);
    if hits.is_empty() {
        println!("No songs match \"{}\"", query);
    }
    for hit in hits {
        println!(
            "{:>2}  {} - {} ({})  {}",
            hit.score,
            hit.song.artists(),
            hit.song.title,
            hit.song.album,
            hit.song.hash
        );
    }
    Ok(())
}

/// Play a single song without the TUI, waiting until the player exits
async fn run_play(client: ApiClient, config: &Config, song_hash: &str) -> color_eyre::Result<()> {
    let resolver = MediaResolver::new(
        client,
        new_shared_cache(config.cache.max_entries),
        config.playback.audio_cache_key,
    );
    let output = CommandOutput::from_config(&config.playback);
    let mut playback = PlaybackController::new(Box::new(output), config.playback.response_ordering);

    let options = config.playback.transcode_options();
    match playback.play(&resolver, song_hash, &options).await {
        PlayOutcome::Started { .. } => {}
        PlayOutcome::Superseded { song_hash } => {
            return Err(eyre!("Playback of {} was superseded", song_hash));
        }
        PlayOutcome::Failed { song_hash, message } => {
            return Err(eyre!("Could not play {}: {}", song_hash, message));
        }
    }

    println!("Playing {} with {}", song_hash, config.playback.player);
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                playback.stop();
                break;
            }
            _ = tokio::time::sleep(Duration::from_millis(500)) => {
                if playback.now_playing().is_none() {
                    break;
                }
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    // Parse command line arguments
    let args = Args::parse();

    // Handle --generate-config option
    if let Some(path) = &args.generate_config {
        let config_path = if path.is_dir() || path.to_str() == Some(".") {
            path.join("config.toml")
        } else {
            path.clone()
        };
        Config::generate_default(config_path)?;
        return Ok(());
    }

    // Determine config path for logging later
    let config_path = match &args.config {
        Some(path) => path.clone(),
        None => Config::default_config_path()?,
    };
    let config_existed = config_path.exists();

    let (mut config, config_warnings) = Config::load(Some(config_path.clone()))?;

    if let Some(server) = &args.server {
        config.server.base_url = server.clone();
    }
    if let Some(token) = &args.token {
        config.server.access_token = token.clone();
    }

    // Handle must outlive the app or buffered log lines are dropped
    let _logger = if config.logging.enabled {
        app::logging::ensure_log_directory(&config.logging)?;
        let handle = app::logging::init_logger(&config.logging)?;
        app::logging::log_startup_info(&config.logging);
        app::logging::log_config_loading(&config_path, !config_existed);

        for warning in &config_warnings {
            log::warn!("{}", warning);
        }
        Some(handle)
    } else {
        None
    };
    let logging_enabled = config.logging.enabled;

    let client = ApiClient::connect(&config.server)
        .await
        .wrap_err_with(|| format!("Could not connect to {}", config.server.base_url))?;

    if let Some(query) = &args.search {
        return run_search(client, query).await;
    }
    if let Some(song_hash) = &args.play {
        return run_play(client, &config, song_hash).await;
    }

    let terminal = init_terminal()?;

    let app = App::new_with_config(config, client, config_warnings);
    let result = app.run(terminal).await;

    // Log shutdown before restoring terminal
    if logging_enabled {
        app::logging::log_shutdown_info();
    }

    restore_terminal()?;
    result
}
