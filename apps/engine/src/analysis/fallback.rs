//! Offline analysis synthesis — the guaranteed-success path.
//!
//! Pure functions over already-scraped fields: no network, no provider, no
//! clock. Output satisfies exactly the same required-keys contract as a
//! validated provider response, so downstream consumers cannot tell the two
//! apart structurally — only the `degraded` flag on the outcome reveals it.
//! Identical input MUST produce byte-identical output.

use serde_json::{json, Map, Value};

use crate::models::content::ContentData;
use crate::models::report::TaskKind;

/// Words too generic to count as topics. English plus the French function
/// words that dominate the scraped sites this backend serves.
const STOPWORDS: &[&str] = &[
    "about", "after", "also", "avec", "been", "cette", "dans", "deux", "elle", "être", "from",
    "have", "here", "into", "leur", "mais", "more", "most", "notre", "nous", "only", "other",
    "over", "pour", "sans", "site", "some", "sont", "sous", "such", "that", "their", "them",
    "then", "they", "this", "tout", "très", "votre", "vous", "were", "what", "when", "will",
    "with", "your",
];

const MAX_TOPICS: usize = 5;

/// Derives a schema-valid structured result for `kind` purely from the
/// scraped content. Never fails, never calls out.
pub fn synthesize(content: &ContentData, url: &str, kind: TaskKind) -> Map<String, Value> {
    let label = site_label(content, url);
    let seed = description_seed(content);
    let topics = key_topics(content, &label);
    let focus = top_keywords(content, 1)
        .into_iter()
        .next()
        .unwrap_or_else(|| label.clone());

    match kind {
        TaskKind::Business => synthesize_business(content, &label, &seed, &topics, &focus),
        TaskKind::Storytelling => synthesize_storytelling(&label, &seed, &topics, &focus),
    }
}

fn synthesize_business(
    content: &ContentData,
    label: &str,
    seed: &str,
    topics: &[String],
    focus: &str,
) -> Map<String, Value> {
    let summary = if seed.is_empty() {
        format!("{label} — overview based on the available page content.")
    } else {
        format!("{label} — {seed}.")
    };

    let h2_sections: Vec<String> = content
        .h2_tags
        .iter()
        .map(|h| h.trim().to_string())
        .filter(|h| !h.is_empty())
        .collect();
    let services = if !h2_sections.is_empty() {
        h2_sections
    } else if !topics.is_empty() {
        topics.to_vec()
    } else {
        vec![format!("Core offering of {label}")]
    };

    let mut result = Map::new();
    result.insert("analysis_summary".to_string(), json!(summary));
    result.insert("key_topics".to_string(), json!(topics));
    result.insert(
        "brand_tone".to_string(),
        json!(format!(
            "Professional and approachable, with a clear focus on {focus}"
        )),
    );
    result.insert(
        "target_audience".to_string(),
        json!(format!("People looking for {focus} and related offerings")),
    );
    result.insert("main_services".to_string(), json!(services));
    result.insert(
        "content_suggestions".to_string(),
        json!([
            format!("Introduce {label} and what makes it different"),
            format!("Share a behind-the-scenes look at {focus}"),
            format!("Answer a common customer question about {focus}"),
        ]),
    );
    result
}

fn synthesize_storytelling(
    label: &str,
    seed: &str,
    topics: &[String],
    focus: &str,
) -> Map<String, Value> {
    let summary = if seed.is_empty() {
        format!("The story behind {label}, told through its own pages.")
    } else {
        format!("The story behind {label}: {seed}.")
    };

    let mut result = Map::new();
    result.insert("story_summary".to_string(), json!(summary));
    result.insert("narrative_themes".to_string(), json!(topics));
    result.insert(
        "emotional_tone".to_string(),
        json!("Warm and authentic, close to everyday customers"),
    );
    result.insert(
        "brand_personality".to_string(),
        json!(format!(
            "{label} comes across as genuine, hands-on and proud of its craft"
        )),
    );
    result.insert(
        "storytelling_hooks".to_string(),
        json!([
            format!("How {label} got started"),
            format!("What {focus} means to the people behind {label}"),
            format!("A day behind the scenes at {label}"),
        ]),
    );
    result.insert(
        "content_suggestions".to_string(),
        json!([
            format!("Tell the origin story of {label} in a short post"),
            format!("Spotlight the people behind {focus}"),
            format!("Share the moment {label} is most proud of"),
        ]),
    );
    result
}

/// Best available display name: meta title, else the URL host, else generic.
fn site_label(content: &ContentData, url: &str) -> String {
    let title = content.meta_title.trim();
    if !title.is_empty() {
        return title.to_string();
    }
    let host = url
        .split("://")
        .last()
        .unwrap_or(url)
        .split('/')
        .next()
        .unwrap_or("")
        .trim();
    if !host.is_empty() {
        return host.to_string();
    }
    "this website".to_string()
}

/// One line of descriptive seed text: meta description, else the first
/// non-blank h1, else empty.
fn description_seed(content: &ContentData) -> String {
    let description = content.meta_description.trim();
    if !description.is_empty() {
        return description.to_string();
    }
    content
        .h1_tags
        .iter()
        .map(|h| h.trim())
        .find(|h| !h.is_empty())
        .unwrap_or("")
        .to_string()
}

/// Headings first, then frequent content words, deduplicated
/// case-insensitively. Never empty: falls back to the site label.
fn key_topics(content: &ContentData, label: &str) -> Vec<String> {
    let mut topics: Vec<String> = Vec::new();
    let mut seen: Vec<String> = Vec::new();

    let headings = content
        .h1_tags
        .iter()
        .chain(content.h2_tags.iter())
        .map(|h| h.trim().to_string())
        .filter(|h| !h.is_empty());
    let candidates = headings.chain(top_keywords(content, MAX_TOPICS));

    for candidate in candidates {
        let lowered = candidate.to_lowercase();
        if !seen.contains(&lowered) {
            seen.push(lowered);
            topics.push(candidate);
        }
        if topics.len() == MAX_TOPICS {
            break;
        }
    }

    if topics.is_empty() {
        topics.push(label.to_string());
    }
    topics
}

/// Most frequent content words, ranked by count then alphabetically so the
/// ordering is stable across calls.
fn top_keywords(content: &ContentData, limit: usize) -> Vec<String> {
    let mut counts = std::collections::BTreeMap::<String, u32>::new();
    for word in content
        .content_text
        .to_lowercase()
        .split(|c: char| !c.is_alphabetic())
    {
        if word.chars().count() > 3 && !STOPWORDS.contains(&word) {
            *counts.entry(word.to_string()).or_insert(0) += 1;
        }
    }

    let mut ranked: Vec<(String, u32)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.into_iter().take(limit).map(|(word, _)| word).collect()
}
