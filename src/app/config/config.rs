use crate::app::config::cache::CacheConfig;
use crate::app::config::library::LibraryConfig;
use crate::app::config::logging::LoggingConfig;
use crate::app::config::playback::PlaybackConfig;
use crate::app::config::server::ServerConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub library: LibraryConfig,
    #[serde(default)]
    pub playback: PlaybackConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Known keys per section, used to warn about typos
const KNOWN_FIELDS: &[(&str, &[&str])] = &[
    (
        "server",
        &["base_url", "access_token", "email", "password", "timeout_secs"],
    ),
    ("library", &["page_size", "cover_size"]),
    (
        "playback",
        &[
            "transcode",
            "format",
            "bitrate",
            "target_lufs",
            "audio_cache_key",
            "response_ordering",
            "player",
            "player_args",
        ],
    ),
    ("cache", &["max_entries"]),
    (
        "logging",
        &[
            "enabled",
            "level",
            "log_to_console",
            "append_to_file",
            "rotate_logs",
            "rotation_size_mb",
            "keep_log_files",
            "log_directory",
        ],
    ),
];

/// Calculate Levenshtein distance between two strings
fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    if a_chars.is_empty() {
        return b_chars.len();
    }
    if b_chars.is_empty() {
        return a_chars.len();
    }

    // Two rows instead of the full matrix
    let mut prev_row: Vec<usize> = (0..=b_chars.len()).collect();
    let mut curr_row: Vec<usize> = vec![0; b_chars.len() + 1];

    for (i, a_char) in a_chars.iter().enumerate() {
        curr_row[0] = i + 1;
        for (j, b_char) in b_chars.iter().enumerate() {
            let cost = usize::from(a_char != b_char);
            curr_row[j + 1] = (prev_row[j + 1] + 1)
                .min(curr_row[j] + 1)
                .min(prev_row[j] + cost);
        }
        std::mem::swap(&mut prev_row, &mut curr_row);
    }

    prev_row[b_chars.len()]
}

/// Closest candidate within half the longer length (at least 3 edits)
fn find_similar(unknown: &str, candidates: &[&str]) -> Option<String> {
    let unknown_lower = unknown.to_lowercase();

    candidates
        .iter()
        .map(|&candidate| {
            let distance = levenshtein_distance(&unknown_lower, &candidate.to_lowercase());
            (candidate, distance)
        })
        .filter(|(candidate, distance)| {
            let threshold = (unknown.len().max(candidate.len()) / 2).max(3);
            *distance <= threshold
        })
        .min_by_key(|(_, distance)| *distance)
        .map(|(candidate, _)| candidate.to_string())
}

fn unknown_section_warning(key: &str, suggestion: Option<&str>) -> String {
    match suggestion {
        Some(s) => format!("Unknown config section: [{}] (did you mean: [{}]?)", key, s),
        None => format!("Unknown config section: [{}]", key),
    }
}

fn unknown_field_warning(section: &str, key: &str, suggestion: Option<&str>) -> String {
    match suggestion {
        Some(s) => format!(
            "Unknown option in [{}]: {} (did you mean: {}?)",
            section, key, s
        ),
        None => format!("Unknown option in [{}]: {}", section, key),
    }
}

impl Config {
    /// Returns the default config file path based on the platform:
    /// - Linux: ~/.config/mulise/config.toml (XDG_CONFIG_HOME)
    /// - macOS: ~/Library/Application Support/mulise/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\mulise\config.toml
    pub fn default_config_path() -> color_eyre::Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| color_eyre::eyre::eyre!("Could not determine config directory"))?;
        Ok(config_dir.join("mulise").join("config.toml"))
    }

    /// Load the config, writing a default file first if none exists.
    /// Returns the config plus warnings about unknown keys.
    pub fn load(config_path: Option<PathBuf>) -> color_eyre::Result<(Self, Vec<String>)> {
        let config_path = match config_path {
            Some(path) => path,
            None => Self::default_config_path()?,
        };

        if !config_path.exists() {
            if let Some(parent) = config_path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            let default_config = Config::default();
            let toml_string = toml::to_string_pretty(&default_config)?;
            std::fs::write(&config_path, &toml_string)?;

            // Logger is not up yet; main logs the creation once it is
            eprintln!("Created default config file at: {}", config_path.display());

            return Ok((default_config, Vec::new()));
        }

        let contents = std::fs::read_to_string(&config_path)?;
        Self::parse(&contents)
    }

    /// Parse config text. A file that fails to parse falls back to defaults
    /// and reports the parse error as a warning.
    pub fn parse(contents: &str) -> color_eyre::Result<(Self, Vec<String>)> {
        let mut warnings = Self::check_unknown_fields(contents);

        let config = match toml::from_str::<Config>(contents) {
            Ok(config) => config,
            Err(e) => {
                warnings.push(format!("Failed to parse config file, using defaults: {}", e));
                Config::default()
            }
        };
        Ok((config, warnings))
    }

    /// Check for unknown sections and fields and return warnings
    fn check_unknown_fields(contents: &str) -> Vec<String> {
        let mut warnings = Vec::new();

        // Syntax errors are reported by the main parser
        let Ok(table) = toml::from_str::<toml::Table>(contents) else {
            return warnings;
        };

        let sections: Vec<&str> = KNOWN_FIELDS.iter().map(|(name, _)| *name).collect();

        for (key, value) in &table {
            let Some((section, fields)) = KNOWN_FIELDS.iter().find(|(name, _)| name == key) else {
                let suggestion = find_similar(key, &sections);
                warnings.push(unknown_section_warning(key, suggestion.as_deref()));
                continue;
            };

            if let toml::Value::Table(entries) = value {
                for field in entries.keys() {
                    if !fields.contains(&field.as_str()) {
                        let suggestion = find_similar(field, fields);
                        warnings.push(unknown_field_warning(section, field, suggestion.as_deref()));
                    }
                }
            }
        }

        warnings
    }

    /// Generate a default config file at the specified path
    pub fn generate_default(path: PathBuf) -> color_eyre::Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        if path.exists() {
            return Err(color_eyre::eyre::eyre!(
                "Config file already exists at: {}",
                path.display()
            ));
        }

        let toml_string = toml::to_string_pretty(&Config::default())?;
        std::fs::write(&path, &toml_string)?;

        println!("Generated default config at: {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::config::playback::{AudioCacheKey, ResponseOrdering};

    #[test]
    fn test_levenshtein_distance() {
        assert_eq!(levenshtein_distance("", "abc"), 3);
        assert_eq!(levenshtein_distance("kitten", "sitting"), 3);
        assert_eq!(levenshtein_distance("same", "same"), 0);
    }

    #[test]
    fn test_defaults_round_trip_through_toml() {
        let text = toml::to_string_pretty(&Config::default()).unwrap();
        let (config, warnings) = Config::parse(&text).unwrap();
        assert!(warnings.is_empty(), "{:?}", warnings);
        assert_eq!(config.library.page_size, 10);
        assert_eq!(config.playback.audio_cache_key, AudioCacheKey::Song);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let (config, warnings) = Config::parse(
            r#"
            [server]
            base_url = "http://music.local:9000"
            access_token = "abc"

            [playback]
            transcode = true
            format = "aac"
            audio_cache_key = "rendition"
            response_ordering = "latest_request"
            "#,
        )
        .unwrap();

        assert!(warnings.is_empty());
        assert_eq!(config.server.base_url, "http://music.local:9000");
        assert_eq!(config.server.timeout_secs, 60);
        assert_eq!(config.playback.bitrate, 192);
        assert_eq!(config.playback.audio_cache_key, AudioCacheKey::Rendition);
        assert_eq!(config.playback.response_ordering, ResponseOrdering::LatestRequest);
        assert!(config.playback.transcode_options().transcode);
        assert_eq!(config.cache.max_entries, 0);
    }

    #[test]
    fn test_unknown_keys_get_suggestions() {
        let (_, warnings) = Config::parse(
            r#"
            [sever]
            base_url = "x"

            [library]
            page_sise = 5
            "#,
        )
        .unwrap();

        assert_eq!(warnings.len(), 2);
        assert!(warnings.contains(
            &"Unknown config section: [sever] (did you mean: [server]?)".to_string()
        ));
        assert!(warnings.contains(
            &"Unknown option in [library]: page_sise (did you mean: page_size?)".to_string()
        ));
    }

    #[test]
    fn test_invalid_config_falls_back_to_defaults() {
        let (config, warnings) = Config::parse("[library]\npage_size = \"ten\"\n").unwrap();
        assert_eq!(config.library.page_size, 10);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].starts_with("Failed to parse config file"));
    }

    #[test]
    fn test_should_login_only_without_token() {
        let mut server = ServerConfig {
            email: "me@example.com".to_string(),
            password: "pw".to_string(),
            ..Default::default()
        };
        assert!(server.should_login());
        server.access_token = "token".to_string();
        assert!(!server.should_login());
    }
}
