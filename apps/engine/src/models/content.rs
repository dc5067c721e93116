use serde::{Deserialize, Serialize};

/// Scraped page content handed in by the extraction layer.
///
/// Every field defaults to empty — scrapers routinely miss meta tags or
/// headings, and the engine (fallback synthesis included) must cope with any
/// subset being absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentData {
    #[serde(default)]
    pub meta_title: String,
    #[serde(default)]
    pub meta_description: String,
    #[serde(default)]
    pub h1_tags: Vec<String>,
    #[serde(default)]
    pub h2_tags: Vec<String>,
    #[serde(default)]
    pub content_text: String,
}
