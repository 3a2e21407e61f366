use super::{
    types::{Config, LlmProvider},
    ConfigError,
};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Anthropic provider has an API key
/// - Default hosts are non-blank
/// - Voice settings are within [0, 1]
/// - Search asks for at least one result
/// - Audio directory is set
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.llm.model.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "llm.model cannot be empty".to_string(),
        ));
    }

    if config.llm.provider == LlmProvider::Anthropic
        && config
            .llm
            .api_key
            .as_deref()
            .map_or(true, |k| k.trim().is_empty())
    {
        return Err(ConfigError::ValidationError(
            "llm.api_key (or ANTHROPIC_API_KEY) is required for the anthropic provider"
                .to_string(),
        ));
    }

    if config
        .podcast
        .default_hosts
        .iter()
        .any(|h| h.trim().is_empty())
    {
        return Err(ConfigError::ValidationError(
            "podcast.default_hosts cannot contain blank names".to_string(),
        ));
    }

    for (name, value) in [
        ("tts.stability", config.tts.stability),
        ("tts.clarity", config.tts.clarity),
    ] {
        if !(0.0..=1.0).contains(&value) {
            return Err(ConfigError::ValidationError(format!(
                "{} must be between 0.0 and 1.0, got {}",
                name, value
            )));
        }
    }

    if config.search.num_results == 0 {
        return Err(ConfigError::ValidationError(
            "search.num_results must be at least 1".to_string(),
        ));
    }

    if config.output.audio_dir.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "output.audio_dir cannot be empty".to_string(),
        ));
    }

    Ok(())
}
