//! LLM-backed crew: four agents run in strict sequence, each feeding the next.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tracing::debug;

use super::personas::AgentPersona;
use super::{Crew, CrewError, CrewOutput, CrewRequest};
use crate::clock::Clock;
use crate::config::Config;
use crate::job::{JobProgress, Stage};
use crate::llm::{create_llm_client, CompletionRequest, LlmClient};
use crate::search::{SearchHit, SerperSearch, WebSearch};
use crate::tts::{render_episode, ElevenLabsClient, EpisodeVoices, SpeechSynthesizer};

const DEBUG_TAG: &str = "debug";

/// Knobs for a crew run.
#[derive(Debug, Clone)]
pub struct CrewSettings {
    pub max_tokens: u32,
    pub temperature: f32,
    /// Web results handed to the researcher.
    pub num_results: usize,
    /// Voice the script into `audio_dir` during the voice stage.
    pub render_episode: bool,
    pub audio_dir: PathBuf,
    pub voices: EpisodeVoices,
    /// Whether real providers are configured, for diagnostics only.
    pub search_configured: bool,
    pub tts_configured: bool,
}

impl CrewSettings {
    pub fn from_config(config: &Config) -> Self {
        let has_key = |key: &Option<String>| key.as_deref().is_some_and(|k| !k.trim().is_empty());
        Self {
            max_tokens: config.llm.max_tokens,
            temperature: config.llm.temperature,
            num_results: config.search.num_results as usize,
            render_episode: config.tts.render_episode,
            audio_dir: config.output.audio_dir.clone(),
            voices: EpisodeVoices {
                voices: config.tts.host_voices.clone(),
                stability: config.tts.stability,
                clarity: config.tts.clarity,
            },
            search_configured: has_key(&config.search.api_key),
            tts_configured: has_key(&config.tts.api_key),
        }
    }
}

pub struct AgentCrew {
    llm: Arc<dyn LlmClient>,
    search: Arc<dyn WebSearch>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    clock: Arc<dyn Clock>,
    settings: CrewSettings,
}

impl AgentCrew {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        search: Arc<dyn WebSearch>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        clock: Arc<dyn Clock>,
        settings: CrewSettings,
    ) -> Self {
        Self {
            llm,
            search,
            synthesizer,
            clock,
            settings,
        }
    }

    /// Wire the configured LLM, Serper and ElevenLabs clients.
    pub fn from_config(config: &Config, clock: Arc<dyn Clock>) -> Result<Self, CrewError> {
        let llm = create_llm_client(&config.llm)
            .map_err(|e| CrewError::Unavailable(e.to_string()))?;
        let search = Arc::new(SerperSearch::new(&config.search, Arc::clone(&clock)));
        let synthesizer = Arc::new(ElevenLabsClient::new(&config.tts, Arc::clone(&clock)));
        Ok(Self::new(
            llm,
            search,
            synthesizer,
            clock,
            CrewSettings::from_config(config),
        ))
    }

    async fn ask(&self, persona: &AgentPersona, prompt: String) -> Result<String, CrewError> {
        let request = CompletionRequest::new(prompt)
            .with_system(persona.system_prompt())
            .with_max_tokens(self.settings.max_tokens)
            .with_temperature(self.settings.temperature);

        let response = self
            .llm
            .complete(request)
            .await
            .map_err(|source| CrewError::Agent {
                agent: persona.name,
                source,
            })?;

        debug!(
            agent = persona.name,
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            "Agent finished"
        );
        Ok(response.text.trim().to_string())
    }

    fn report_diagnostics(&self, progress: &JobProgress) {
        let yes_no = |b: bool| if b { "Yes" } else { "No" };
        progress.stage(
            DEBUG_TAG,
            format!("Using model: {} ({})", self.llm.model(), self.llm.provider()),
        );
        progress.stage(
            DEBUG_TAG,
            format!(
                "API configuration: Serper: {}, ElevenLabs: {}",
                yes_no(self.settings.search_configured),
                yes_no(self.settings.tts_configured)
            ),
        );
    }
}

#[async_trait]
impl Crew for AgentCrew {
    async fn kickoff(
        &self,
        request: &CrewRequest,
        progress: &JobProgress,
    ) -> Result<CrewOutput, CrewError> {
        let topic = request.topic.as_str();
        let [host_a, host_b] = &request.hosts;
        self.report_diagnostics(progress);

        // Research
        progress.stage(
            Stage::Research.as_str(),
            format!("Searching the web for {}", topic),
        );
        let hits = self
            .search
            .search(&format!("{} {}", topic, request.year), self.settings.num_results)
            .await;
        let notes = self
            .ask(
                &AgentPersona::researcher(topic),
                format!(
                    "Research on {topic} for a French Quebec podcast. The current year is {year}.\n\n\
                     Web search results:\n{sources}\n\n\
                     Expected output: Comprehensive research information about {topic} including key facts, trends, and expert opinions.",
                    year = request.year,
                    sources = format_hits(&hits),
                ),
            )
            .await?;
        progress.stage(
            Stage::Research.as_str(),
            format!("Research complete, {} sources found", hits.len()),
        );

        // Curation
        progress.stage(Stage::Summarize.as_str(), "Curating subtopics");
        let curation = self
            .ask(
                &AgentPersona::topic_curator(),
                format!(
                    "Curate topics about {topic} for a French Quebec podcast.\n\n\
                     Research notes:\n{notes}\n\n\
                     Expected output: A curated list of engaging subtopics and angles for a podcast about {topic}, tailored for a Quebec audience."
                ),
            )
            .await?;

        // Script
        progress.stage(Stage::Script.as_str(), "Writing the script");
        let script = self
            .ask(
                &AgentPersona::script_writer(),
                format!(
                    "Write a podcast script in French Quebec style about {topic} for hosts {host_a} and {host_b}.\n\n\
                     Curated angles:\n{curation}\n\n\
                     Research notes:\n{notes}\n\n\
                     Expected output: A complete podcast script with dialogue for both hosts, formatted with clear sections \
                     and including Quebec French expressions. Start every line of dialogue with \"{host_a}:\" or \"{host_b}:\"."
                ),
            )
            .await?;

        // Audio direction
        progress.stage(
            Stage::Voice.as_str(),
            "Preparing audio production guidance",
        );
        let [voice_a, voice_b] = &self.settings.voices.voices;
        let guidance = self
            .ask(
                &AgentPersona::audio_director(),
                format!(
                    "Create audio production guidelines for a French Quebec podcast about {topic} \
                     using voice {voice_a} for {host_a} and voice {voice_b} for {host_b}.\n\n\
                     Script:\n{script}\n\n\
                     Expected output: Detailed audio production guidelines including voice profiles, tone instructions, \
                     and technical specifications for a Quebec-accent podcast."
                ),
            )
            .await?;

        let mut audio = Map::new();
        audio.insert("guidance".to_string(), Value::String(guidance));
        if self.settings.render_episode {
            let manifest = render_episode(
                self.synthesizer.as_ref(),
                &script,
                &request.hosts,
                &self.settings.voices,
                &self.settings.audio_dir,
                &request.job_id,
                self.clock.as_ref(),
            )
            .await?;
            if manifest.segments.is_empty() {
                progress.report("No host dialogue found in script, no audio rendered", None);
            } else {
                progress.report(
                    format!("Rendered {} audio segments", manifest.segments.len()),
                    None,
                );
            }
            audio.insert("episode".to_string(), Value::String(manifest.manifest_file.clone()));
            audio.insert(
                "segments".to_string(),
                Value::Array(
                    manifest
                        .segments
                        .iter()
                        .map(|s| Value::String(s.file.clone()))
                        .collect(),
                ),
            );
            audio.insert("simulated".to_string(), Value::Bool(manifest.simulated));
        }

        let mut output = Map::new();
        output.insert(
            "research_task".to_string(),
            json!({ "sources": hits, "notes": notes }),
        );
        output.insert("topic_curation_task".to_string(), Value::String(curation));
        output.insert("script_writing_task".to_string(), Value::String(script));
        output.insert("audio_production_task".to_string(), Value::Object(audio));

        Ok(CrewOutput::Structured(output))
    }
}

fn format_hits(hits: &[SearchHit]) -> String {
    if hits.is_empty() {
        return "(no results)".to_string();
    }
    hits.iter()
        .enumerate()
        .map(|(i, hit)| {
            format!(
                "{}. {} ({}, {})\n   {}",
                i + 1,
                hit.title,
                hit.url,
                hit.date,
                hit.snippet
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::config::TtsConfig;
    use crate::llm::LlmError;
    use crate::testing::{MockLlm, MockSearch, RecordingObserver};
    use tempfile::TempDir;

    struct Harness {
        crew: AgentCrew,
        llm: Arc<MockLlm>,
        search: Arc<MockSearch>,
        observer: Arc<RecordingObserver>,
        dir: TempDir,
    }

    fn harness(render_episode: bool) -> Harness {
        let dir = TempDir::new().unwrap();
        let clock: Arc<dyn Clock> = Arc::new(FixedClock::at_date(2025, 3, 1).unwrap());
        let llm = Arc::new(MockLlm::new());
        let search = Arc::new(MockSearch::new());
        let settings = CrewSettings {
            max_tokens: 256,
            temperature: 0.7,
            num_results: 3,
            render_episode,
            audio_dir: dir.path().to_path_buf(),
            voices: EpisodeVoices {
                voices: ["adam".to_string(), "antoni".to_string()],
                stability: 0.7,
                clarity: 0.75,
            },
            search_configured: false,
            tts_configured: false,
        };
        let synthesizer = Arc::new(ElevenLabsClient::new(&TtsConfig::default(), Arc::clone(&clock)));
        let crew = AgentCrew::new(llm.clone(), search.clone(), synthesizer, clock, settings);
        Harness {
            crew,
            llm,
            search,
            observer: Arc::new(RecordingObserver::new()),
            dir,
        }
    }

    fn request() -> CrewRequest {
        CrewRequest {
            job_id: "job-42".to_string(),
            topic: "Le hockey".to_string(),
            hosts: ["Alex".to_string(), "Simon".to_string()],
            year: 2025,
        }
    }

    #[tokio::test]
    async fn test_kickoff_runs_four_agents_in_order() {
        let h = harness(false);
        h.llm.push_response("Notes de recherche").await;
        h.llm.push_response("Angles choisis").await;
        h.llm.push_response("Alex: Bonjour!\nSimon: Salut!").await;
        h.llm.push_response("Ton chaleureux").await;
        let progress = JobProgress::new("job-42", h.observer.clone());

        let output = h.crew.kickoff(&request(), &progress).await.unwrap();

        let map = match output {
            CrewOutput::Structured(map) => map,
            other => panic!("unexpected output {:?}", other),
        };
        assert_eq!(map["research_task"]["notes"], "Notes de recherche");
        assert_eq!(map["research_task"]["sources"].as_array().unwrap().len(), 3);
        assert_eq!(map["topic_curation_task"], "Angles choisis");
        assert_eq!(map["script_writing_task"], "Alex: Bonjour!\nSimon: Salut!");
        assert_eq!(map["audio_production_task"]["guidance"], "Ton chaleureux");
        assert!(map["audio_production_task"].get("episode").is_none());

        let requests = h.llm.requests().await;
        assert_eq!(requests.len(), 4);
        assert!(requests[0].system.as_deref().unwrap().contains("Spécialiste de recherche sur Le hockey"));
        assert!(requests[1].prompt.contains("Notes de recherche"));
        assert!(requests[2].prompt.contains("hosts Alex and Simon"));
        assert!(requests[3].prompt.contains("Alex: Bonjour!"));

        assert_eq!(h.search.queries().await, vec![("Le hockey 2025".to_string(), 3)]);
    }

    #[tokio::test]
    async fn test_kickoff_reports_stages() {
        let h = harness(false);
        let progress = JobProgress::new("job-42", h.observer.clone());
        h.crew.kickoff(&request(), &progress).await.unwrap();

        let stages: Vec<String> = h
            .observer
            .updates()
            .into_iter()
            .filter_map(|u| u.stage)
            .filter(|s| s != DEBUG_TAG)
            .collect();
        let mut distinct = stages.clone();
        distinct.dedup();
        assert_eq!(distinct, ["research", "summarize", "script", "voice"]);
        assert!(h
            .observer
            .messages()
            .iter()
            .any(|m| m == "Using model: mock-model (mock)"));
    }

    #[tokio::test]
    async fn test_llm_failure_names_agent() {
        let h = harness(false);
        h.llm.push_response("Notes").await;
        h.llm.push_response("Angles").await;
        h.llm
            .push_error(LlmError::Http("connection refused".to_string()))
            .await;
        let progress = JobProgress::new("job-42", h.observer.clone());

        let err = h.crew.kickoff(&request(), &progress).await.unwrap_err();
        assert!(matches!(err, CrewError::Agent { agent: "script writer", .. }));
        assert_eq!(h.llm.requests().await.len(), 3);
    }

    #[tokio::test]
    async fn test_kickoff_renders_episode() {
        let h = harness(true);
        h.llm.push_response("Notes").await;
        h.llm.push_response("Angles").await;
        h.llm
            .push_response("## Intro\nAlex: Bonjour!\nSimon: Salut!\nAlex: On commence.")
            .await;
        h.llm.push_response("Guide").await;
        let progress = JobProgress::new("job-42", h.observer.clone());

        let output = h.crew.kickoff(&request(), &progress).await.unwrap();
        let CrewOutput::Structured(map) = output else {
            panic!("expected structured output");
        };

        let audio = &map["audio_production_task"];
        assert_eq!(audio["episode"], "job-42_metadata.json");
        assert_eq!(audio["segments"].as_array().unwrap().len(), 3);
        assert_eq!(audio["simulated"], true);
        assert!(h.dir.path().join("job-42_01_alex.mp3").exists());
        assert!(h.dir.path().join("job-42_metadata.json").exists());
        assert!(h
            .observer
            .messages()
            .contains(&"Rendered 3 audio segments".to_string()));
    }
}
