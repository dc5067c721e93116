// All LLM prompt constants for the analysis module.
// Templates use {placeholder} slots filled by the build_* functions below.

use crate::models::content::ContentData;

/// Scraped body text is capped before prompting — long pages blow past
/// context budgets without improving the analysis.
const MAX_CONTENT_CHARS: usize = 6000;

/// System prompt for business analysis — enforces JSON-only output.
pub const BUSINESS_SYSTEM: &str =
    "You are an expert marketing analyst reviewing a business website. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Business analysis prompt template.
/// Replace: {url}, {meta_title}, {meta_description}, {headings}, {content_text}
pub const BUSINESS_PROMPT_TEMPLATE: &str = r#"Analyze the following website content and describe the business behind it.

Return a JSON object with this EXACT schema (no extra fields):
{
  "analysis_summary": "Two or three sentences describing what this business does and who it serves",
  "key_topics": ["topic", "topic"],
  "brand_tone": "One sentence describing the tone the brand projects",
  "target_audience": "One sentence describing who the content is written for",
  "main_services": ["service", "service"],
  "content_suggestions": ["A concrete social media post idea", "Another post idea"]
}

Rules:
- Base every field ONLY on the provided content. Do not invent services or claims.
- key_topics: 3 to 6 short noun phrases, most prominent first.
- content_suggestions: 2 to 4 post ideas a social media manager could act on directly.
- Write in the same language as the website content.

WEBSITE: {url}
META TITLE: {meta_title}
META DESCRIPTION: {meta_description}
HEADINGS: {headings}

PAGE CONTENT:
{content_text}"#;

/// System prompt for storytelling analysis — enforces JSON-only output.
pub const STORYTELLING_SYSTEM: &str =
    "You are a brand storytelling strategist extracting narrative material from a website. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Storytelling analysis prompt template.
/// Replace: {url}, {meta_title}, {meta_description}, {headings}, {content_text}
pub const STORYTELLING_PROMPT_TEMPLATE: &str = r#"Analyze the following website content and extract the brand's story.

Return a JSON object with this EXACT schema (no extra fields):
{
  "story_summary": "Two or three sentences telling this brand's story",
  "narrative_themes": ["theme", "theme"],
  "emotional_tone": "One sentence describing the emotional register of the brand",
  "brand_personality": "One sentence describing the brand as if it were a person",
  "storytelling_hooks": ["A hook that could open a social media story", "Another hook"],
  "content_suggestions": ["A narrative-driven post idea", "Another post idea"]
}

Rules:
- Base every field ONLY on the provided content. Do not invent history or claims.
- narrative_themes: 3 to 5 short phrases, strongest first.
- storytelling_hooks: openings a reader would want to finish.
- Write in the same language as the website content.

WEBSITE: {url}
META TITLE: {meta_title}
META DESCRIPTION: {meta_description}
HEADINGS: {headings}

PAGE CONTENT:
{content_text}"#;

pub fn build_business_prompt(content: &ContentData, url: &str) -> String {
    fill_template(BUSINESS_PROMPT_TEMPLATE, content, url)
}

pub fn build_storytelling_prompt(content: &ContentData, url: &str) -> String {
    fill_template(STORYTELLING_PROMPT_TEMPLATE, content, url)
}

fn fill_template(template: &str, content: &ContentData, url: &str) -> String {
    let headings: Vec<&str> = content
        .h1_tags
        .iter()
        .chain(content.h2_tags.iter())
        .map(|h| h.as_str())
        .filter(|h| !h.trim().is_empty())
        .collect();

    template
        .replace("{url}", url)
        .replace("{meta_title}", &content.meta_title)
        .replace("{meta_description}", &content.meta_description)
        .replace("{headings}", &headings.join("; "))
        .replace(
            "{content_text}",
            &content.content_text.chars().take(MAX_CONTENT_CHARS).collect::<String>(),
        )
}
