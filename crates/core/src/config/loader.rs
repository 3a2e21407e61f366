use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Provider credentials and knobs that are read from their conventional
/// variable names, mapped onto config keys.
const WELL_KNOWN_ENV: &[(&str, &str)] = &[
    ("ANTHROPIC_API_KEY", "llm.api_key"),
    ("MODEL", "llm.model"),
    ("OLLAMA_BASE_URL", "llm.api_base"),
    ("SERPER_API_KEY", "search.api_key"),
    ("ELEVENLABS_API_KEY", "tts.api_key"),
    ("CURRENT_YEAR", "podcast.current_year"),
];

/// Load configuration from file with environment variable overrides.
///
/// Precedence (lowest to highest): TOML file, well-known provider variables,
/// `BALADO_`-prefixed variables (`BALADO_LLM__MODEL=...`).
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    let mut figment = Figment::new().merge(Toml::file(path));
    for (var, key) in WELL_KNOWN_ENV {
        figment = figment.merge(Env::raw().only(&[*var]).map(move |_| (*key).into()));
    }

    let config: Config = figment
        .merge(Env::prefixed("BALADO_").split("__"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;

    Ok(config)
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}
