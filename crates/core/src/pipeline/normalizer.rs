//! Coerces crew output into the fixed four-field result.
//!
//! Policy, first match wins:
//! 1. a mapping whose primary keys all hold non-empty values is used as is;
//! 2. missing or empty fields are looked up among the other keys by
//!    case-insensitive substring, and anything still missing is taken
//!    field-by-field from the fallback generator;
//! 3. free text becomes the script (with a derived summary) when it mentions a
//!    host by name;
//! 4. otherwise the full fallback result is used.
//!
//! Absent and empty are treated the same: `null`, a blank string, an empty
//! object and an empty array all count as missing. Research and audio details
//! must be objects; any other shape counts as missing too.

use serde_json::{json, Map, Value};

use super::fallback::FallbackGenerator;
use crate::crew::CrewOutput;
use crate::job::{Hosts, PodcastResult};

/// Result fields and the keys that can supply them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Research,
    Summary,
    Script,
    AudioDetails,
}

impl Field {
    const ALL: [Field; 4] = [
        Field::Research,
        Field::Summary,
        Field::Script,
        Field::AudioDetails,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Research => "research",
            Field::Summary => "summary",
            Field::Script => "script",
            Field::AudioDetails => "audio_details",
        }
    }

    /// Exact keys, in lookup order.
    fn primary_keys(&self) -> &'static [&'static str] {
        match self {
            Field::Research => &["research", "research_task"],
            Field::Summary => &["summary", "topic_curation_task"],
            Field::Script => &["script", "script_writing_task"],
            Field::AudioDetails => &["audio_details", "audioDetails", "audio_production_task"],
        }
    }

    /// Whether `value` has a shape this field can hold.
    fn accepts(&self, value: &Value) -> bool {
        match self {
            Field::Research | Field::AudioDetails => value.is_object(),
            Field::Summary | Field::Script => true,
        }
    }

    /// Lowercase fragments matched against any other key.
    fn alternate_fragments(&self) -> &'static [&'static str] {
        match self {
            Field::Research => &["research"],
            Field::Summary => &["summary", "curation", "curate"],
            Field::Script => &["script", "writing"],
            Field::AudioDetails => &["audio", "voice"],
        }
    }
}

/// How much of the result came from the fallback generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackUse {
    None,
    /// Only these fields were filled from fallback.
    Partial(Vec<Field>),
    /// The whole result is fallback content.
    Full(FallbackReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    /// Nothing came back.
    Empty,
    /// Text came back but named neither host.
    TextWithoutHosts,
    /// A mapping came back with none of the fields.
    NoUsableFields,
}

impl FallbackReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FallbackReason::Empty => "empty",
            FallbackReason::TextWithoutHosts => "text_without_hosts",
            FallbackReason::NoUsableFields => "no_usable_fields",
        }
    }
}

/// A normalized result plus a record of how it was assembled.
#[derive(Debug, Clone)]
pub struct Normalized {
    pub result: PodcastResult,
    pub fallback: FallbackUse,
}

/// Upper bound (in chars) on a derived summary, before the `...` marker.
const SUMMARY_MAX_CHARS: usize = 280;

pub struct ResultNormalizer<'a> {
    fallback: &'a FallbackGenerator,
}

impl<'a> ResultNormalizer<'a> {
    pub fn new(fallback: &'a FallbackGenerator) -> Self {
        Self { fallback }
    }

    pub fn normalize(&self, output: CrewOutput, topic: &str, hosts: &Hosts) -> Normalized {
        match output {
            CrewOutput::Structured(map) => self.from_mapping(&map, topic, hosts),
            CrewOutput::Text(text) if !text.trim().is_empty() => {
                self.from_text(text, topic, hosts)
            }
            _ => self.full_fallback(topic, hosts, FallbackReason::Empty),
        }
    }

    fn from_mapping(&self, map: &Map<String, Value>, topic: &str, hosts: &Hosts) -> Normalized {
        let mut missing = Vec::new();
        let mut found: Vec<(Field, Value)> = Vec::new();

        for field in Field::ALL {
            match lookup(map, field) {
                Some(value) => found.push((field, value.clone())),
                None => missing.push(field),
            }
        }

        if found.is_empty() {
            return self.full_fallback(topic, hosts, FallbackReason::NoUsableFields);
        }

        let mut result = PodcastResult::default();
        for (field, value) in found {
            match field {
                Field::Research => result.research = value,
                Field::Summary => result.summary = to_text(value),
                Field::Script => result.script = to_text(value),
                Field::AudioDetails => result.audio_details = value,
            }
        }

        for field in &missing {
            match field {
                Field::Research => result.research = self.fallback.research(topic),
                Field::Summary => result.summary = self.fallback.summary(topic),
                Field::Script => result.script = self.fallback.script(topic, hosts),
                Field::AudioDetails => result.audio_details = self.fallback.audio_details(hosts),
            }
        }

        let fallback = if missing.is_empty() {
            FallbackUse::None
        } else {
            FallbackUse::Partial(missing)
        };
        Normalized { result, fallback }
    }

    fn from_text(&self, text: String, topic: &str, hosts: &Hosts) -> Normalized {
        if !hosts.iter().any(|host| text.contains(host.as_str())) {
            return self.full_fallback(topic, hosts, FallbackReason::TextWithoutHosts);
        }

        let mut audio_details = self.fallback.audio_details(hosts);
        if let Value::Object(details) = &mut audio_details {
            details.insert(
                "voice_instructions".to_string(),
                Value::String(format!(
                    "Use a conversational tone for {}.",
                    hosts.join(", ")
                )),
            );
        }

        let result = PodcastResult {
            research: json!({
                "sources": [
                    { "title": format!("Research on {topic}"), "url": "https://example.com/research" }
                ],
                "topics": [topic],
            }),
            summary: derive_summary(&text),
            audio_details,
            script: text,
        };

        Normalized {
            result,
            fallback: FallbackUse::None,
        }
    }

    fn full_fallback(&self, topic: &str, hosts: &Hosts, reason: FallbackReason) -> Normalized {
        Normalized {
            result: self.fallback.generate(topic, hosts),
            fallback: FallbackUse::Full(reason),
        }
    }
}

/// Primary keys first, then any key containing one of the field's fragments.
fn lookup<'m>(map: &'m Map<String, Value>, field: Field) -> Option<&'m Value> {
    let usable = |value: &&Value| !is_empty(value) && field.accepts(value);
    let primary = field
        .primary_keys()
        .iter()
        .filter_map(|key| map.get(*key))
        .find(usable);
    if primary.is_some() {
        return primary;
    }

    map.iter()
        .filter(|(key, _)| {
            let key = key.to_lowercase();
            field
                .alternate_fragments()
                .iter()
                .any(|fragment| key.contains(fragment))
        })
        .map(|(_, value)| value)
        .find(usable)
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

fn to_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

/// First `min(5, lines / 4)` lines (the whole text when shorter), cut to
/// `SUMMARY_MAX_CHARS`.
fn derive_summary(text: &str) -> String {
    let trimmed = text.trim();
    let lines: Vec<&str> = trimmed.lines().collect();
    let count = (lines.len() / 4).min(5);
    let lead = if count > 0 {
        lines[..count].join("\n")
    } else {
        trimmed.to_string()
    };

    match lead.char_indices().nth(SUMMARY_MAX_CHARS) {
        Some((cut, _)) => format!("{}...", &lead[..cut]),
        None => lead,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use std::sync::Arc;

    fn generator() -> FallbackGenerator {
        FallbackGenerator::new(Arc::new(FixedClock::at_date(2025, 1, 15).unwrap()))
    }

    fn hosts() -> Hosts {
        ["Alex".to_string(), "Jamie".to_string()]
    }

    fn structured(value: Value) -> CrewOutput {
        match value {
            Value::Object(map) => CrewOutput::Structured(map),
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_complete_mapping_used_directly() {
        let gen = generator();
        let output = structured(json!({
            "research": {"sources": [{"title": "A"}]},
            "summary": "Un résumé",
            "script": "Alex: Salut!\nJamie: Allo!",
            "audio_details": {"ton": "calme"},
        }));

        let normalized = ResultNormalizer::new(&gen).normalize(output, "Hockey", &hosts());
        assert_eq!(normalized.fallback, FallbackUse::None);
        assert_eq!(normalized.result.summary, "Un résumé");
        assert_eq!(normalized.result.script, "Alex: Salut!\nJamie: Allo!");
        assert_eq!(normalized.result.audio_details["ton"], "calme");
    }

    #[test]
    fn test_task_keys_map_to_fields() {
        let gen = generator();
        let output = structured(json!({
            "research_task": {"notes": "n"},
            "topic_curation_task": "Angles",
            "script_writing_task": "Alex: Bonjour",
            "audio_production_task": {"guidance": "g"},
        }));

        let normalized = ResultNormalizer::new(&gen).normalize(output, "Hockey", &hosts());
        assert_eq!(normalized.fallback, FallbackUse::None);
        assert_eq!(normalized.result.research["notes"], "n");
        assert_eq!(normalized.result.summary, "Angles");
        assert_eq!(normalized.result.audio_details["guidance"], "g");
    }

    #[test]
    fn test_empty_summary_filled_from_alternate_key() {
        let gen = generator();
        let output = structured(json!({
            "research": {"sources": []},
            "summary": "",
            "script": "Alex: Bonjour",
            "audioDetails": {"ton": "vif"},
            "Final_Curation": "Sujets choisis",
        }));

        let normalized = ResultNormalizer::new(&gen).normalize(output, "Hockey", &hosts());
        assert_eq!(normalized.result.summary, "Sujets choisis");
        assert_eq!(normalized.result.audio_details["ton"], "vif");
        // `research.sources` is empty but the object itself is not.
        assert_eq!(normalized.fallback, FallbackUse::None);
    }

    #[test]
    fn test_empty_summary_without_alternate_uses_fallback_field() {
        let gen = generator();
        let output = structured(json!({
            "research": {"sources": [1]},
            "summary": "   ",
            "script": "Alex: Bonjour",
            "audio_details": {"ton": "vif"},
        }));

        let normalized = ResultNormalizer::new(&gen).normalize(output, "Hockey", &hosts());
        assert_eq!(normalized.result.summary, gen.summary("Hockey"));
        assert_eq!(normalized.result.script, "Alex: Bonjour");
        assert_eq!(normalized.fallback, FallbackUse::Partial(vec![Field::Summary]));
    }

    #[test]
    fn test_alternate_key_match_is_case_insensitive() {
        let gen = generator();
        let output = structured(json!({
            "RESEARCH_FINDINGS": {"x": 1},
            "Episode_Summary": "S",
            "ScriptDraft": "Jamie: Allo",
            "VoiceNotes": {"y": 2},
        }));

        let normalized = ResultNormalizer::new(&gen).normalize(output, "Hockey", &hosts());
        assert_eq!(normalized.fallback, FallbackUse::None);
        assert_eq!(normalized.result.research["x"], 1);
        assert_eq!(normalized.result.script, "Jamie: Allo");
        assert_eq!(normalized.result.audio_details["y"], 2);
    }

    #[test]
    fn test_research_string_replaced_by_fallback() {
        let gen = generator();
        let output = structured(json!({
            "research_notes": "du texte",
            "summary": "S",
            "script": "Alex: Bonjour",
            "audio_details": {"ton": "vif"},
        }));

        let normalized = ResultNormalizer::new(&gen).normalize(output, "Hockey", &hosts());
        assert!(normalized.result.research.is_object());
        assert_eq!(normalized.result.research, gen.research("Hockey"));
        assert_eq!(normalized.fallback, FallbackUse::Partial(vec![Field::Research]));
    }

    #[test]
    fn test_voice_script_does_not_fill_audio_details() {
        let gen = generator();
        let output = structured(json!({ "voice_script": "Alex: Bonjour\nJamie: Salut" }));

        let normalized = ResultNormalizer::new(&gen).normalize(output, "Hockey", &hosts());
        assert_eq!(normalized.result.script, "Alex: Bonjour\nJamie: Salut");
        assert!(normalized.result.audio_details.is_object());
        assert_eq!(normalized.result.audio_details, gen.audio_details(&hosts()));
        assert_eq!(
            normalized.fallback,
            FallbackUse::Partial(vec![Field::Research, Field::Summary, Field::AudioDetails])
        );
    }

    #[test]
    fn test_primary_audio_key_with_text_value_is_skipped() {
        let gen = generator();
        let output = structured(json!({
            "audio_details": "parler lentement",
            "audio_production_task": {"guidance": "g"},
            "script": "Alex: Bonjour",
        }));

        let normalized = ResultNormalizer::new(&gen).normalize(output, "Hockey", &hosts());
        assert_eq!(normalized.result.audio_details["guidance"], "g");
    }

    #[test]
    fn test_non_string_script_is_stringified() {
        let gen = generator();
        let output = structured(json!({ "script": ["Alex: a", "Jamie: b"] }));

        let normalized = ResultNormalizer::new(&gen).normalize(output, "Hockey", &hosts());
        assert_eq!(normalized.result.script, r#"["Alex: a","Jamie: b"]"#);
        assert_eq!(
            normalized.fallback,
            FallbackUse::Partial(vec![Field::Research, Field::Summary, Field::AudioDetails])
        );
    }

    #[test]
    fn test_mapping_without_fields_uses_full_fallback() {
        let gen = generator();
        let output = structured(json!({ "unrelated": "value", "script": null }));

        let normalized = ResultNormalizer::new(&gen).normalize(output, "Hockey", &hosts());
        assert_eq!(
            normalized.fallback,
            FallbackUse::Full(FallbackReason::NoUsableFields)
        );
        assert_eq!(normalized.result, gen.generate("Hockey", &hosts()));
    }

    #[test]
    fn test_text_with_hosts_kept_verbatim() {
        let gen = generator();
        let text = "Alex: Bonjour tout le monde!\nJamie: Salut Alex!".to_string();

        let normalized =
            ResultNormalizer::new(&gen).normalize(CrewOutput::Text(text.clone()), "Hockey", &hosts());
        assert_eq!(normalized.fallback, FallbackUse::None);
        assert_eq!(normalized.result.script, text);
        assert!(!normalized.result.summary.is_empty());
        assert_eq!(
            normalized.result.research["sources"][0]["title"],
            "Research on Hockey"
        );
        assert_eq!(
            normalized.result.audio_details["voice_instructions"],
            "Use a conversational tone for Alex, Jamie."
        );
    }

    #[test]
    fn test_text_voice_profiles_match_fallback() {
        let gen = generator();
        let hosts = ["Marie".to_string(), "Luc".to_string()];
        let text = "Marie: Bonjour!\nLuc: Salut Marie!".to_string();

        let normalized =
            ResultNormalizer::new(&gen).normalize(CrewOutput::Text(text), "Hockey", &hosts);
        let profiles = &normalized.result.audio_details["profils_voix"];
        assert_eq!(profiles, &gen.audio_details(&hosts)["profils_voix"]);
        assert!(profiles.get("Marie").is_some());
        assert!(profiles.get("Luc").is_some());
    }

    #[test]
    fn test_text_without_hosts_discarded() {
        let gen = generator();
        let text = "Le hockey est un sport populaire au Québec.".to_string();

        let normalized =
            ResultNormalizer::new(&gen).normalize(CrewOutput::Text(text), "Hockey", &hosts());
        assert_eq!(
            normalized.fallback,
            FallbackUse::Full(FallbackReason::TextWithoutHosts)
        );
        assert_eq!(normalized.result.script, gen.script("Hockey", &hosts()));
    }

    #[test]
    fn test_blank_text_and_empty_use_fallback() {
        let gen = generator();
        for output in [CrewOutput::Empty, CrewOutput::Text("  \n ".to_string())] {
            let normalized = ResultNormalizer::new(&gen).normalize(output, "Hockey", &hosts());
            assert_eq!(normalized.fallback, FallbackUse::Full(FallbackReason::Empty));
            assert!(!normalized.result.summary.is_empty());
        }
    }

    #[test]
    fn test_derive_summary_uses_leading_lines() {
        let text = (1..=12)
            .map(|i| format!("Alex: ligne {i}"))
            .collect::<Vec<_>>()
            .join("\n");
        assert_eq!(derive_summary(&text), "Alex: ligne 1\nAlex: ligne 2\nAlex: ligne 3");

        let long = (1..=40).map(|i| format!("l{i}")).collect::<Vec<_>>().join("\n");
        assert_eq!(derive_summary(&long).lines().count(), 5);
    }

    #[test]
    fn test_summary_of_long_first_line_is_bounded() {
        let gen = generator();
        let text = format!("Alex: {}\nJamie: a\nAlex: b\nJamie: c", "x".repeat(20_000));

        let normalized =
            ResultNormalizer::new(&gen).normalize(CrewOutput::Text(text), "Hockey", &hosts());
        let summary = &normalized.result.summary;
        assert!(summary.chars().count() <= SUMMARY_MAX_CHARS + 3);
        assert!(summary.starts_with("Alex: xxx"));
        assert!(summary.ends_with("..."));
    }

    #[test]
    fn test_derive_summary_short_text_is_bounded() {
        let short = "Alex: court";
        assert_eq!(derive_summary(short), "Alex: court");

        let long_line = "é".repeat(400);
        let summary = derive_summary(&long_line);
        assert_eq!(summary.chars().count(), SUMMARY_MAX_CHARS + 3);
        assert!(summary.ends_with("..."));
    }
}
