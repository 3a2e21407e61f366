/// Role, goal and backstory for one agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentPersona {
    pub name: &'static str,
    pub role: String,
    pub goal: &'static str,
    pub backstory: &'static str,
}

impl AgentPersona {
    pub fn researcher(topic: &str) -> Self {
        Self {
            name: "researcher",
            role: format!("Spécialiste de recherche sur {topic}"),
            goal: "Effectuer des recherches complètes sur le sujet du podcast",
            backstory: "Vous êtes un chercheur québécois spécialisé en recherche d'information",
        }
    }

    pub fn topic_curator() -> Self {
        Self {
            name: "topic curator",
            role: "Curateur de sujets de podcast".to_string(),
            goal: "Sélectionner et affiner les sujets les plus captivants",
            backstory: "Vous avez un sens aigu pour identifier les sujets tendance québécois",
        }
    }

    pub fn script_writer() -> Self {
        Self {
            name: "script writer",
            role: "Rédacteur de scripts de podcast".to_string(),
            goal: "Transformer les résultats de recherche en un script conversationnel",
            backstory: "Vous maîtrisez le français québécois et ses expressions colorées",
        }
    }

    pub fn audio_director() -> Self {
        Self {
            name: "audio director",
            role: "Spécialiste de production audio de podcast".to_string(),
            goal: "Fournir des conseils pour la production audio du podcast",
            backstory: "Vous connaissez les nuances de l'accent québécois",
        }
    }

    /// System prompt for the agent's completions.
    pub fn system_prompt(&self) -> String {
        format!(
            "Rôle: {}\nObjectif: {}\nContexte: {}",
            self.role, self.goal, self.backstory
        )
    }
}
