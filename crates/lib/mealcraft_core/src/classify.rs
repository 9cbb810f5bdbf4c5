//! Keyword classification of completion replies.

use serde::{Deserialize, Serialize};

const RECIPE_KEYWORDS: &[&str] = &["ingredient", "cook", "recipe"];
const SUGGESTION_KEYWORDS: &[&str] = &["suggest", "recommend"];

/// Coarse label for a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseKind {
    Recipe,
    Suggestion,
    Text,
}

impl ResponseKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ResponseKind::Recipe => "recipe",
            ResponseKind::Suggestion => "suggestion",
            ResponseKind::Text => "text",
        }
    }
}

/// Label a reply by substring match on its lower-cased text. Recipe
/// keywords are checked first.
pub fn classify(text: &str) -> ResponseKind {
    let lower = text.to_lowercase();
    if RECIPE_KEYWORDS.iter().any(|k| lower.contains(k)) {
        ResponseKind::Recipe
    } else if SUGGESTION_KEYWORDS.iter().any(|k| lower.contains(k)) {
        ResponseKind::Suggestion
    } else {
        ResponseKind::Text
    }
}
