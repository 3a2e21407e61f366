//! Deterministic placeholder content used when the crew fails or returns
//! something unusable.

use std::sync::Arc;

use serde_json::{json, Value};

use crate::clock::Clock;
use crate::job::{Hosts, PodcastResult};

/// Builds the four-field result from templates.
///
/// Output depends only on the topic, the hosts and the injected clock's date.
#[derive(Clone)]
pub struct FallbackGenerator {
    clock: Arc<dyn Clock>,
}

impl FallbackGenerator {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    pub fn generate(&self, topic: &str, hosts: &Hosts) -> PodcastResult {
        PodcastResult {
            research: self.research(topic),
            summary: self.summary(topic),
            script: self.script(topic, hosts),
            audio_details: self.audio_details(hosts),
        }
    }

    pub fn research(&self, topic: &str) -> Value {
        let date = self.clock.today();
        let slug = slugify(topic);
        json!({
            "sources": [
                {
                    "title": format!("Comprendre {topic}"),
                    "url": format!("https://example.com/comprendre-{slug}"),
                    "snippet": format!("Un guide complet sur {topic} avec des perspectives d'experts et une analyse des tendances actuelles."),
                    "date": date,
                },
                {
                    "title": format!("L'avenir de {topic}"),
                    "url": format!("https://example.com/avenir-de-{slug}"),
                    "snippet": format!("Les experts prédisent des développements significatifs dans {topic} au cours de la prochaine décennie, avec des implications majeures pour la technologie et la société."),
                    "date": date,
                },
                {
                    "title": format!("{topic}: Une analyse approfondie"),
                    "url": format!("https://example.com/{slug}-analyse"),
                    "snippet": format!("Une analyse en profondeur de {topic}, incluant le contexte historique, l'état actuel et les projections futures."),
                    "date": date,
                },
            ],
            "topics": [
                format!("Aperçu de {topic}"),
                format!("Défis de {topic}"),
                format!("Avenir de {topic}"),
            ],
        })
    }

    pub fn summary(&self, topic: &str) -> String {
        format!(
            "Ce podcast explore {topic} sous plusieurs angles, discutant de son état actuel, \
             ses défis et ses implications futures. Créé avec un accent québécois authentique."
        )
    }

    /// Two-host dialogue in five sections.
    pub fn script(&self, topic: &str, hosts: &Hosts) -> String {
        let [a, b] = hosts;
        format!(
            "# {topic} Podcast Script

## Introduction
{a}: Bonjour et bienvenue à notre podcast sur {topic}! Je suis {a}.
{b}: Et moi c'est {b}. Aujourd'hui on plonge dans le sujet de {topic}.

## Discussion Principale
{a}: Commençons par discuter pourquoi {topic} est si important aujourd'hui.
{b}: Absolument! L'impact de {topic} est vraiment considérable, tabarnouche!

## Développements Récents
{a}: Selon des recherches récentes, {topic} a connu des avancées significatives.
{b}: C'est vrai. Les experts prévoient des changements majeurs dans notre approche de {topic}.

## Perspectives d'Avenir
{a}: Qu'est-ce que tu penses que l'avenir réserve pour {topic}?
{b}: Je crois qu'on va voir plus d'intégration avec d'autres technologies et une adoption plus large.

## Conclusion
{a}: Ça conclut notre discussion sur {topic}.
{b}: Merci d'avoir écouté, et à la prochaine fois!
"
        )
    }

    pub fn audio_details(&self, hosts: &Hosts) -> Value {
        let [a, b] = hosts;
        json!({
            "profils_voix": {
                a.as_str(): {
                    "voice_id": "alex",
                    "caracteristiques": "Voix masculine avec accent québécois authentique",
                },
                b.as_str(): {
                    "voice_id": "simon",
                    "caracteristiques": "Voix masculine avec accent québécois authentique",
                },
            },
            "rythme": "Rythme modéré avec des pauses naturelles entre les segments",
            "ton": "Informatif mais conversationnel, avec expressions québécoises",
            "specs_audio": {
                "format": "mp3",
                "bitrate": "192kbps",
                "traitement": "Optimisé pour la clarté des voix",
            },
            "accentuation_quebecoise": "Utiliser des expressions typiquement québécoises comme 'tabarnouche', 'pantoute', 'c'est pas pire'",
        })
    }
}

/// Lowercase, spaces to dashes.
pub(crate) fn slugify(text: &str) -> String {
    text.to_lowercase().replace(' ', "-")
}
