use serde::{Deserialize, Serialize};

/// Brand metadata returned by the brand lookup source.
///
/// A degraded lookup still produces a profile named after the query as the
/// user typed it, with every other field empty except `domain` when the
/// query was itself a domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandProfile {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    /// Brand palette in the order the provider listed it.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub colors: Vec<String>,
}

impl BrandProfile {
    /// Placeholder profile named `name` (trimmed), with nothing else known
    /// beyond an optional domain.
    #[must_use]
    pub fn placeholder(name: &str, domain: Option<&str>) -> Self {
        Self {
            name: name.trim().to_string(),
            domain: domain.map(str::to_string),
            industry: None,
            description: None,
            logo_url: None,
            colors: Vec::new(),
        }
    }
}

/// Bounded text captured from the company website.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebExcerpt {
    /// Final URL after redirects.
    pub url: String,
    pub status: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub text: String,
    /// `true` when the page text was cut at the excerpt bound.
    pub truncated: bool,
}
