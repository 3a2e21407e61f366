//! Text-to-speech abstraction.
//!
//! Synthesis degrades to a stub MP3 frame plus a metadata sidecar when no API
//! key is configured or the provider fails. Only local filesystem failures are
//! reported as errors.

mod elevenlabs;
mod episode;

pub use elevenlabs::{resolve_voice, ElevenLabsClient};
pub use episode::{
    render_episode, segment_script, EpisodeManifest, EpisodeVoices, RenderedSegment, ScriptSegment,
};

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;

/// Minimal MPEG-1 Layer III frame header followed by silence.
pub const STUB_MP3: [u8; 16] = [
    0xFF, 0xFB, 0x90, 0x44, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];

#[derive(Debug, thiserror::Error)]
pub enum TtsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Metadata encoding error: {0}")]
    Metadata(#[from] serde_json::Error),
}

/// Provider failures. Only visible inside the provider; callers get stub
/// audio instead.
#[derive(Debug, thiserror::Error)]
pub enum SpeechError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
}

/// Text to voice with one voice.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechRequest {
    pub text: String,
    /// Voice name (e.g. "adam") or raw provider voice id.
    pub voice: String,
    pub stability: f32,
    pub clarity: f32,
}

/// Files written for one synthesis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeechArtifact {
    pub audio_path: PathBuf,
    pub metadata_path: PathBuf,
    pub voice_id: String,
    /// True when the audio is a stub rather than provider output.
    pub simulated: bool,
}

#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Write audio for `request` to `output_path`, plus a `<stem>_metadata.json` sidecar.
    async fn synthesize(
        &self,
        request: &SpeechRequest,
        output_path: &Path,
    ) -> Result<SpeechArtifact, TtsError>;
}

/// `<dir>/<stem>_metadata.json` next to `audio_path`.
pub fn metadata_path(audio_path: &Path) -> PathBuf {
    let stem = audio_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    audio_path.with_file_name(format!("{}_metadata.json", stem))
}
