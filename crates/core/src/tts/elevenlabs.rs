use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::json;
use tracing::{debug, warn};

use super::{
    metadata_path, SpeechArtifact, SpeechError, SpeechRequest, SpeechSynthesizer, TtsError,
    STUB_MP3,
};
use crate::clock::Clock;
use crate::config::TtsConfig;
use crate::metrics::PROVIDER_DEGRADED;

/// Named ElevenLabs stock voices.
const VOICES: &[(&str, &str)] = &[
    ("adam", "pNInz6obpgDQGcFmaJgB"),
    ("antoni", "ErXwobaYiN019PkySvjV"),
    ("bella", "EXAVITQu4vr4xnSDxMaL"),
    ("elli", "MF3mGyEYCl7XYWbV9V6O"),
    ("josh", "TxGEqnHWrfWFTfGW9XjX"),
    ("rachel", "21m00Tcm4TlvDq8ikWAM"),
    ("sam", "yoZ06aMxZJJ28mfd3POQ"),
];

/// Map a voice name to its id, case-insensitively. Unknown names are assumed
/// to already be ids.
pub fn resolve_voice(voice: &str) -> String {
    let lowered = voice.to_lowercase();
    VOICES
        .iter()
        .find(|(name, _)| *name == lowered)
        .map(|(_, id)| (*id).to_string())
        .unwrap_or_else(|| voice.to_string())
}

/// ElevenLabs text-to-speech client.
pub struct ElevenLabsClient {
    client: reqwest::Client,
    api_key: Option<String>,
    api_url: String,
    model_id: String,
    clock: Arc<dyn Clock>,
}

#[derive(Debug, Serialize)]
struct TtsBody<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: VoiceSettings,
}

#[derive(Debug, Serialize)]
struct VoiceSettings {
    stability: f32,
    similarity_boost: f32,
}

impl ElevenLabsClient {
    pub fn new(config: &TtsConfig, clock: Arc<dyn Clock>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(u64::from(config.timeout_secs)))
            .build()
            .unwrap_or_default();
        Self {
            client,
            api_key: config.api_key.clone().filter(|k| !k.trim().is_empty()),
            api_url: config.api_url.trim_end_matches('/').to_string(),
            model_id: config.model_id.clone(),
            clock,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn fetch_audio(
        &self,
        api_key: &str,
        voice_id: &str,
        request: &SpeechRequest,
    ) -> Result<Vec<u8>, SpeechError> {
        let url = format!(
            "{}/text-to-speech/{}",
            self.api_url,
            urlencoding::encode(voice_id)
        );
        let response = self
            .client
            .post(url)
            .header("xi-api-key", api_key)
            .header("Accept", "audio/mpeg")
            .json(&TtsBody {
                text: &request.text,
                model_id: &self.model_id,
                voice_settings: VoiceSettings {
                    stability: request.stability,
                    similarity_boost: request.clarity,
                },
            })
            .send()
            .await
            .map_err(|e| SpeechError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SpeechError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .bytes()
            .await
            .map(|b| b.to_vec())
            .map_err(|e| SpeechError::Http(e.to_string()))
    }

    async fn write_files(
        &self,
        request: &SpeechRequest,
        voice_id: &str,
        output_path: &Path,
        audio: &[u8],
        simulated: bool,
    ) -> Result<SpeechArtifact, TtsError> {
        if let Some(parent) = output_path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        tokio::fs::write(output_path, audio).await?;

        let mut metadata = json!({
            "success": true,
            "text_length": request.text.chars().count(),
            "voice_id": voice_id,
            "stability": request.stability,
            "clarity": request.clarity,
            "generated_at": self.clock.now().format("%Y-%m-%d %H:%M:%S").to_string(),
            "output_path": output_path.display().to_string(),
        });
        if simulated {
            metadata["simulated"] = json!(true);
            metadata["note"] = json!(
                "Simulated result: no audio was generated by the text-to-speech provider."
            );
        }

        let sidecar = metadata_path(output_path);
        tokio::fs::write(&sidecar, serde_json::to_vec_pretty(&metadata)?).await?;

        Ok(SpeechArtifact {
            audio_path: output_path.to_path_buf(),
            metadata_path: sidecar,
            voice_id: voice_id.to_string(),
            simulated,
        })
    }
}

#[async_trait]
impl SpeechSynthesizer for ElevenLabsClient {
    async fn synthesize(
        &self,
        request: &SpeechRequest,
        output_path: &Path,
    ) -> Result<SpeechArtifact, TtsError> {
        let voice_id = resolve_voice(&request.voice);

        let audio = match &self.api_key {
            None => None,
            Some(api_key) => match self.fetch_audio(api_key, &voice_id, request).await {
                Ok(bytes) => Some(bytes),
                Err(e) => {
                    warn!(voice_id = %voice_id, error = %e, "ElevenLabs request failed, writing stub audio");
                    None
                }
            },
        };

        match audio {
            Some(bytes) => {
                debug!(path = %output_path.display(), bytes = bytes.len(), "Audio generated");
                self.write_files(request, &voice_id, output_path, &bytes, false)
                    .await
            }
            None => {
                PROVIDER_DEGRADED.with_label_values(&["elevenlabs"]).inc();
                self.write_files(request, &voice_id, output_path, &STUB_MP3, true)
                    .await
            }
        }
    }
}
