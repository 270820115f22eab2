//! Platform vocabulary and keyword detection.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Deployment target an epic can affect.
///
/// Ordering follows the lowercase name so sorted sets of `Platform` and of
/// their names agree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Android,
    Api,
    Backend,
    Ios,
    Web,
    Unknown,
}

impl Platform {
    /// Platforms that can be detected in text.
    pub const VOCABULARY: [Platform; 5] = [
        Platform::Ios,
        Platform::Android,
        Platform::Web,
        Platform::Backend,
        Platform::Api,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Android => "android",
            Platform::Api => "api",
            Platform::Backend => "backend",
            Platform::Ios => "ios",
            Platform::Web => "web",
            Platform::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl PartialOrd for Platform {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Platform {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.as_str().cmp(other.as_str())
    }
}

/// Find every vocabulary keyword in `text`.
///
/// Case-insensitive substring match with no negation or synonym handling.
/// Returns the sorted, deduplicated matches, or `[Unknown]` when nothing
/// matches.
pub fn detect_platforms(text: &str) -> Vec<Platform> {
    let lowered = text.to_lowercase();
    let found: BTreeSet<Platform> = Platform::VOCABULARY
        .into_iter()
        .filter(|p| lowered.contains(p.as_str()))
        .collect();

    if found.is_empty() {
        vec![Platform::Unknown]
    } else {
        found.into_iter().collect()
    }
}

/// Names of a platform list.
pub fn platform_names(platforms: &[Platform]) -> Vec<String> {
    platforms.iter().map(|p| p.as_str().to_string()).collect()
}

/// Lowercase, trim, drop blanks, sort and deduplicate platform names.
pub fn normalize_platforms<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    names
        .into_iter()
        .map(|n| n.as_ref().trim().to_lowercase())
        .filter(|n| !n.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
