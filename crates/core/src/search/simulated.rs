use crate::clock::Clock;

use super::SearchHit;

struct Template {
    title: &'static str,
    url: &'static str,
    snippet: &'static str,
}

const AI_RESULTS: [Template; 5] = [
    Template {
        title: "New AI Model Breaks Records in Multi-Modal Reasoning",
        url: "https://example.com/tech/ai-model-record",
        snippet: "The latest AI model demonstrates unprecedented capabilities in understanding and reasoning about text and images simultaneously.",
    },
    Template {
        title: "AI Regulation Framework Proposed by International Coalition",
        url: "https://example.com/policy/ai-regulation",
        snippet: "A group of 25 countries have proposed a unified framework for regulating artificial intelligence development and deployment.",
    },
    Template {
        title: "AI-Generated Content Now Indistinguishable from Human Work, Study Finds",
        url: "https://example.com/tech/ai-content-study",
        snippet: "Researchers found that most people cannot reliably distinguish between content created by AI systems and human writers in blind tests.",
    },
    Template {
        title: "AI Ethics Board Resigns Over Transparency Concerns",
        url: "https://example.com/ethics/ai-board-resignation",
        snippet: "The entire ethics board of a major AI company has resigned, citing concerns about lack of transparency in the company's development process.",
    },
    Template {
        title: "AI Assistants Being Deployed in Healthcare at Record Rates",
        url: "https://example.com/health/ai-assistants",
        snippet: "Hospitals and healthcare providers are adopting AI assistants at unprecedented rates to help with everything from diagnosis to patient communication.",
    },
];

const CLIMATE_RESULTS: [Template; 5] = [
    Template {
        title: "Global Temperature Rise Exceeds Previous Projections",
        url: "https://example.com/environment/temperature-rise",
        snippet: "New data indicates that global temperatures are rising faster than scientists had previously projected, raising concerns about climate modeling.",
    },
    Template {
        title: "Carbon Capture Technology Breakthrough Announced",
        url: "https://example.com/tech/carbon-capture",
        snippet: "Scientists have developed a new carbon capture method that is 40% more efficient than existing technologies, potentially transforming climate mitigation efforts.",
    },
    Template {
        title: "Major Countries Pledge to Triple Renewable Energy by 2030",
        url: "https://example.com/policy/renewable-energy-pledge",
        snippet: "A coalition of major economies has announced a commitment to triple their renewable energy capacity within the next seven years.",
    },
    Template {
        title: "Climate Refugees Exceed 20 Million Globally",
        url: "https://example.com/society/climate-refugees",
        snippet: "A new UN report estimates that over 20 million people have been displaced by climate change-related events in the past year.",
    },
    Template {
        title: "Ocean Acidity Reaches Historic Levels, Threatening Marine Ecosystems",
        url: "https://example.com/environment/ocean-acidity",
        snippet: "Researchers have measured record levels of ocean acidity, posing severe threats to coral reefs and marine life worldwide.",
    },
];

/// Deterministic stand-in results for `query`.
///
/// Themed sets for AI and climate queries, otherwise five entries templated on
/// the query. Dates alternate between today and yesterday.
pub fn simulated_results(query: &str, num_results: usize, clock: &dyn Clock) -> Vec<SearchHit> {
    let now = clock.now();
    let today = now.format("%Y-%m-%d").to_string();
    let yesterday = (now - chrono::Duration::days(1)).format("%Y-%m-%d").to_string();
    let date_for = |i: usize| if i % 2 == 0 { today.clone() } else { yesterday.clone() };

    let lowered = query.to_lowercase();
    let themed = if mentions_ai(&lowered) {
        Some(&AI_RESULTS)
    } else if lowered.contains("climate") || lowered.contains("environment") {
        Some(&CLIMATE_RESULTS)
    } else {
        None
    };

    let hits: Vec<SearchHit> = match themed {
        Some(templates) => templates
            .iter()
            .enumerate()
            .map(|(i, t)| SearchHit {
                title: t.title.to_string(),
                url: t.url.to_string(),
                snippet: t.snippet.to_string(),
                date: date_for(i),
            })
            .collect(),
        None => {
            let slug = query.replace(' ', "-");
            vec![
                (
                    format!("Latest Developments in {query}"),
                    format!("https://example.com/trending/{slug}"),
                    format!("Recent advancements and news related to {query} that are making headlines globally."),
                ),
                (
                    format!("Expert Opinions on {query} Trends"),
                    format!("https://example.com/experts/{slug}"),
                    format!("Leading experts share their insights on where {query} is headed in the coming months."),
                ),
                (
                    format!("Controversy Surrounding {query}"),
                    format!("https://example.com/analysis/{slug}-debate"),
                    format!("Examining the ongoing debates and controversies related to {query} and their implications."),
                ),
                (
                    format!("Statistical Analysis of {query} Impact"),
                    format!("https://example.com/data/{slug}-statistics"),
                    format!("New data reveals surprising statistics about how {query} is affecting various sectors."),
                ),
                (
                    format!("Future of {query}: Predictions and Forecasts"),
                    format!("https://example.com/future/{slug}-outlook"),
                    format!("Analysts present their forecasts for how {query} will evolve over the next several years."),
                ),
            ]
            .into_iter()
            .enumerate()
            .map(|(i, (title, url, snippet))| SearchHit {
                title,
                url,
                snippet,
                date: date_for(i),
            })
            .collect()
        }
    };

    hits.into_iter().take(num_results).collect()
}

/// "ai" as a word, or "artificial intelligence" anywhere.
fn mentions_ai(lowered: &str) -> bool {
    lowered.contains("artificial intelligence")
        || lowered
            .split(|c: char| !c.is_alphanumeric())
            .any(|word| word == "ai" || word == "ia")
}
