//! Splitting a dialogue script into per-speaker segments and voicing them.
//!
//! Segments are written as separate files; no container muxing is done.

use std::path::Path;

use serde::Serialize;
use tracing::info;

use super::{SpeechRequest, SpeechSynthesizer, TtsError};
use crate::clock::Clock;
use crate::job::Hosts;

/// One host's uninterrupted turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScriptSegment {
    pub index: usize,
    pub speaker: String,
    pub text: String,
}

/// Split `script` on `Host: text` lines.
///
/// A line whose label equals one of the hosts starts a segment; following
/// plain lines continue it. Headings, blank lines and anything before the
/// first speaker line are dropped, as are segments that end up empty.
pub fn segment_script(script: &str, hosts: &Hosts) -> Vec<ScriptSegment> {
    let mut segments: Vec<ScriptSegment> = Vec::new();
    let mut current: Option<(String, Vec<String>)> = None;

    for line in script.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        match speaker_line(line, hosts) {
            Some((speaker, text)) => {
                flush(&mut current, &mut segments);
                let parts = if text.is_empty() {
                    Vec::new()
                } else {
                    vec![text.to_string()]
                };
                current = Some((speaker.to_string(), parts));
            }
            None => {
                if let Some((_, parts)) = current.as_mut() {
                    parts.push(line.to_string());
                }
            }
        }
    }
    flush(&mut current, &mut segments);

    segments
}

fn flush(current: &mut Option<(String, Vec<String>)>, segments: &mut Vec<ScriptSegment>) {
    if let Some((speaker, parts)) = current.take() {
        let text = parts.join(" ");
        if !text.is_empty() {
            segments.push(ScriptSegment {
                index: segments.len(),
                speaker,
                text,
            });
        }
    }
}

/// `Some((host, text))` when `line` is `Host: text` for one of `hosts`.
fn speaker_line<'a>(line: &'a str, hosts: &'a Hosts) -> Option<(&'a str, &'a str)> {
    let (label, rest) = line.split_once(':')?;
    let label = label.trim().trim_matches('*').trim();
    let host = hosts.iter().find(|h| h.as_str() == label)?;
    Some((host.as_str(), rest.trim_start_matches('*').trim()))
}

/// Voice settings for rendering an episode.
#[derive(Debug, Clone)]
pub struct EpisodeVoices {
    /// Voice for each host, by position.
    pub voices: [String; 2],
    pub stability: f32,
    pub clarity: f32,
}

/// Rendered segment entry in the manifest.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedSegment {
    pub index: usize,
    pub speaker: String,
    pub voice_id: String,
    pub file: String,
    pub simulated: bool,
}

/// Summary of a rendered episode, also written as `<episode>_metadata.json`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EpisodeManifest {
    pub episode: String,
    pub hosts: Hosts,
    pub script_length: usize,
    pub segments: Vec<RenderedSegment>,
    pub generated_at: String,
    pub simulated: bool,
    /// File name of the manifest inside the output directory.
    pub manifest_file: String,
}

/// Voice every segment into `dir` and write the episode manifest.
pub async fn render_episode(
    synthesizer: &dyn SpeechSynthesizer,
    script: &str,
    hosts: &Hosts,
    voices: &EpisodeVoices,
    dir: &Path,
    episode: &str,
    clock: &dyn Clock,
) -> Result<EpisodeManifest, TtsError> {
    tokio::fs::create_dir_all(dir).await?;

    let segments = segment_script(script, hosts);
    let mut rendered = Vec::with_capacity(segments.len());

    for segment in &segments {
        let position = if segment.speaker == hosts[0] { 0 } else { 1 };
        let file = format!(
            "{}_{:02}_{}.mp3",
            episode,
            segment.index + 1,
            file_safe(&segment.speaker)
        );
        let request = SpeechRequest {
            text: segment.text.clone(),
            voice: voices.voices[position].clone(),
            stability: voices.stability,
            clarity: voices.clarity,
        };

        let artifact = synthesizer.synthesize(&request, &dir.join(&file)).await?;
        rendered.push(RenderedSegment {
            index: segment.index,
            speaker: segment.speaker.clone(),
            voice_id: artifact.voice_id,
            file,
            simulated: artifact.simulated,
        });
    }

    let manifest = EpisodeManifest {
        episode: episode.to_string(),
        hosts: hosts.clone(),
        script_length: script.chars().count(),
        simulated: rendered.iter().any(|s| s.simulated),
        segments: rendered,
        generated_at: clock.now().format("%Y-%m-%d %H:%M:%S").to_string(),
        manifest_file: format!("{}_metadata.json", episode),
    };

    tokio::fs::write(
        dir.join(&manifest.manifest_file),
        serde_json::to_vec_pretty(&manifest)?,
    )
    .await?;

    info!(
        episode,
        segments = manifest.segments.len(),
        simulated = manifest.simulated,
        "Episode rendered"
    );

    Ok(manifest)
}

/// Lowercase, with anything but letters and digits turned into dashes.
fn file_safe(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c.to_lowercase().next().unwrap_or(c)
            } else {
                '-'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::config::TtsConfig;
    use crate::tts::ElevenLabsClient;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn hosts() -> Hosts {
        ["Alex".to_string(), "Simon".to_string()]
    }

    #[test]
    fn test_segments_follow_speakers() {
        let script = "# Titre\n\n## Introduction\nAlex: Bonjour!\nSimon: Salut.\nÇa va bien.\n\n## Fin\nAlex: À la prochaine.";
        let segments = segment_script(script, &hosts());

        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0].speaker, "Alex");
        assert_eq!(segments[0].text, "Bonjour!");
        assert_eq!(segments[1].speaker, "Simon");
        assert_eq!(segments[1].text, "Salut. Ça va bien.");
        assert_eq!(segments[2].index, 2);
    }

    #[test]
    fn test_unknown_labels_continue_current_segment() {
        let script = "Alex: Selon l'article:\nNote: ceci continue\nSimon: Oui";
        let segments = segment_script(script, &hosts());
        assert_eq!(segments[0].text, "Selon l'article: Note: ceci continue");
        assert_eq!(segments[1].speaker, "Simon");
    }

    #[test]
    fn test_bold_labels_and_preamble() {
        let script = "Voici le script.\n**Alex:** Allo\n**Simon**: Bonjour";
        let segments = segment_script(script, &hosts());
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].text, "Allo");
        assert_eq!(segments[1].text, "Bonjour");
    }

    #[test]
    fn test_empty_turns_dropped() {
        let segments = segment_script("Alex:\nSimon: Oui", &hosts());
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].index, 0);
        assert_eq!(segments[0].speaker, "Simon");
    }

    #[test]
    fn test_no_dialogue() {
        assert!(segment_script("Du texte sans dialogue.", &hosts()).is_empty());
    }

    #[test]
    fn test_file_safe() {
        assert_eq!(file_safe("Marie-Ève"), "marie-ève");
        assert_eq!(file_safe("J.P. Roy"), "j-p--roy");
    }

    #[tokio::test]
    async fn test_render_episode_writes_segments_and_manifest() {
        let dir = TempDir::new().unwrap();
        let clock: Arc<dyn Clock> = Arc::new(FixedClock::at_date(2025, 3, 1).unwrap());
        let synth = ElevenLabsClient::new(&TtsConfig::default(), Arc::clone(&clock));
        let voices = EpisodeVoices {
            voices: ["adam".to_string(), "antoni".to_string()],
            stability: 0.7,
            clarity: 0.75,
        };

        let manifest = render_episode(
            &synth,
            "Alex: Bonjour\nSimon: Salut\nAlex: Bye",
            &hosts(),
            &voices,
            dir.path(),
            "ep",
            clock.as_ref(),
        )
        .await
        .unwrap();

        assert_eq!(manifest.segments.len(), 3);
        assert!(manifest.simulated);
        assert_eq!(manifest.segments[1].file, "ep_02_simon.mp3");
        assert_eq!(manifest.segments[1].voice_id, "ErXwobaYiN019PkySvjV");
        assert!(dir.path().join("ep_01_alex.mp3").exists());
        assert!(dir.path().join("ep_03_alex_metadata.json").exists());
        assert_eq!(manifest.manifest_file, "ep_metadata.json");

        let written: serde_json::Value = serde_json::from_slice(
            &std::fs::read(dir.path().join("ep_metadata.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(written["segments"].as_array().unwrap().len(), 3);
        assert_eq!(written["hosts"][1], "Simon");
    }
}
