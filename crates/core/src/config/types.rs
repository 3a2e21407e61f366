use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub llm: LlmConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub podcast: PodcastConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub tts: TtsConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    8080
}

/// Where generated artifacts land.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    /// Directory holding rendered audio segments and their sidecars.
    /// Served read-only under `/audio`.
    #[serde(default = "default_audio_dir")]
    pub audio_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            audio_dir: default_audio_dir(),
        }
    }
}

fn default_audio_dir() -> PathBuf {
    PathBuf::from("data/podcasts")
}

/// Defaults applied to submissions that omit fields.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PodcastConfig {
    #[serde(default = "default_topic")]
    pub default_topic: String,
    #[serde(default = "default_hosts")]
    pub default_hosts: [String; 2],
    /// Year handed to the crew as context. Current calendar year when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_year: Option<i32>,
}

impl Default for PodcastConfig {
    fn default() -> Self {
        Self {
            default_topic: default_topic(),
            default_hosts: default_hosts(),
            current_year: None,
        }
    }
}

fn default_topic() -> String {
    "Current Events".to_string()
}

fn default_hosts() -> [String; 2] {
    ["Alex".to_string(), "Jamie".to_string()]
}

/// LLM provider type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LlmProvider {
    /// Anthropic Claude API.
    Anthropic,
    /// Local Ollama instance.
    Ollama,
}

impl LlmProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            LlmProvider::Anthropic => "anthropic",
            LlmProvider::Ollama => "ollama",
        }
    }
}

/// LLM client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// LLM provider.
    pub provider: LlmProvider,
    /// Model name/identifier.
    pub model: String,
    /// API key (required for Anthropic).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Custom API base URL (for proxies or self-hosted).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    /// Request timeout in seconds.
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u32,
    /// Maximum tokens for completions.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_llm_timeout() -> u32 {
    120
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_temperature() -> f32 {
    0.7
}

/// Serper web search configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    /// Serper API key. Without one, searches return simulated results.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default = "default_search_url")]
    pub api_url: String,
    /// Results requested per query.
    #[serde(default = "default_num_results")]
    pub num_results: u32,
    #[serde(default = "default_http_timeout")]
    pub timeout_secs: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: default_search_url(),
            num_results: default_num_results(),
            timeout_secs: default_http_timeout(),
        }
    }
}

fn default_search_url() -> String {
    "https://google.serper.dev/search".to_string()
}

fn default_num_results() -> u32 {
    5
}

fn default_http_timeout() -> u32 {
    30
}

/// ElevenLabs text-to-speech configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TtsConfig {
    /// ElevenLabs API key. Without one, synthesis writes stub audio.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default = "default_tts_url")]
    pub api_url: String,
    #[serde(default = "default_tts_model")]
    pub model_id: String,
    #[serde(default = "default_stability")]
    pub stability: f32,
    #[serde(default = "default_clarity")]
    pub clarity: f32,
    /// Voice for each host, by position. Voice names or raw voice ids.
    #[serde(default = "default_host_voices")]
    pub host_voices: [String; 2],
    /// Render the episode audio during the voice stage.
    #[serde(default = "default_render_episode")]
    pub render_episode: bool,
    #[serde(default = "default_http_timeout")]
    pub timeout_secs: u32,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: default_tts_url(),
            model_id: default_tts_model(),
            stability: default_stability(),
            clarity: default_clarity(),
            host_voices: default_host_voices(),
            render_episode: default_render_episode(),
            timeout_secs: default_http_timeout(),
        }
    }
}

fn default_tts_url() -> String {
    "https://api.elevenlabs.io/v1".to_string()
}

fn default_tts_model() -> String {
    "eleven_monolingual_v1".to_string()
}

fn default_stability() -> f32 {
    0.7
}

fn default_clarity() -> f32 {
    0.75
}

fn default_host_voices() -> [String; 2] {
    ["adam".to_string(), "antoni".to_string()]
}

fn default_render_episode() -> bool {
    true
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub output: OutputConfig,
    pub podcast: PodcastConfig,
    pub llm: SanitizedLlmConfig,
    pub search: SanitizedSearchConfig,
    pub tts: SanitizedTtsConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedLlmConfig {
    pub provider: String,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    pub api_key_configured: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedSearchConfig {
    pub api_url: String,
    pub api_key_configured: bool,
    pub num_results: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedTtsConfig {
    pub api_url: String,
    pub api_key_configured: bool,
    pub model_id: String,
    pub host_voices: [String; 2],
    pub render_episode: bool,
}

fn key_configured(key: &Option<String>) -> bool {
    key.as_deref().is_some_and(|k| !k.trim().is_empty())
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            output: config.output.clone(),
            podcast: config.podcast.clone(),
            llm: SanitizedLlmConfig {
                provider: config.llm.provider.as_str().to_string(),
                model: config.llm.model.clone(),
                api_base: config.llm.api_base.clone(),
                api_key_configured: key_configured(&config.llm.api_key),
            },
            search: SanitizedSearchConfig {
                api_url: config.search.api_url.clone(),
                api_key_configured: key_configured(&config.search.api_key),
                num_results: config.search.num_results,
            },
            tts: SanitizedTtsConfig {
                api_url: config.tts.api_url.clone(),
                api_key_configured: key_configured(&config.tts.api_key),
                model_id: config.tts.model_id.clone(),
                host_voices: config.tts.host_voices.clone(),
                render_episode: config.tts.render_episode,
            },
        }
    }
}
