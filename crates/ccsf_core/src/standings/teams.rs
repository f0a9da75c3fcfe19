//! Team label resolution.
//!
//! Generated results name teams loosely ("Red Bull Racing", "RBR Honda").
//! Labels are mapped onto the canonical roster names before aggregation.

use std::collections::HashSet;

/// Maps a free-text team label to a canonical roster name.
pub trait TeamLabelResolver {
    /// Canonical name for `label`, or `None` when nothing matches.
    fn resolve(&self, label: &str) -> Option<&str>;

    /// Canonical name, or the label itself so it becomes its own bucket.
    fn normalize(&self, label: &str) -> String {
        self.resolve(label).map(str::to_string).unwrap_or_else(|| label.to_string())
    }
}

/// Case-insensitive exact match, then best token overlap.
/// Ties go to the earliest roster entry.
#[derive(Debug, Clone)]
pub struct TeamNameNormalizer {
    canonical: Vec<(String, HashSet<String>)>,
}

impl TeamNameNormalizer {
    pub fn new<S: AsRef<str>>(canonical: &[S]) -> Self {
        let canonical = canonical
            .iter()
            .map(|name| (name.as_ref().to_string(), tokenize(name.as_ref())))
            .collect();
        Self { canonical }
    }
}

impl TeamLabelResolver for TeamNameNormalizer {
    fn resolve(&self, label: &str) -> Option<&str> {
        let wanted = label.trim().to_lowercase();
        if wanted.is_empty() {
            return None;
        }
        let exact = self.canonical.iter().find(|(name, _)| name.to_lowercase() == wanted);
        if let Some((name, _)) = exact {
            return Some(name.as_str());
        }

        let tokens = tokenize(label);
        let mut best: Option<(&str, usize)> = None;
        for (name, candidate) in &self.canonical {
            let score = tokens.intersection(candidate).count();
            if score > 0 && best.map_or(true, |(_, top)| score > top) {
                best = Some((name.as_str(), score));
            }
        }
        best.map(|(name, _)| name)
    }
}

/// Exact (case-insensitive) matches only. Unknown labels stay unresolved.
#[derive(Debug, Clone)]
pub struct StrictTeamMatcher {
    canonical: Vec<String>,
}

impl StrictTeamMatcher {
    pub fn new<S: AsRef<str>>(canonical: &[S]) -> Self {
        Self { canonical: canonical.iter().map(|s| s.as_ref().to_string()).collect() }
    }
}

impl TeamLabelResolver for StrictTeamMatcher {
    fn resolve(&self, label: &str) -> Option<&str> {
        let wanted = label.trim().to_lowercase();
        self.canonical.iter().find(|name| name.to_lowercase() == wanted).map(String::as_str)
    }
}

/// Lower-case alphanumeric runs.
fn tokenize(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}
