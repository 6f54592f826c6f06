//! Fixed category taxonomy for extracted concepts.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of concept categories.
///
/// The model is asked to pick from exactly these labels; anything it
/// returns outside the set folds into `Other` rather than failing the
/// note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Technology,
    Science,
    Business,
    Productivity,
    Health,
    Culture,
    Other,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Technology,
        Category::Science,
        Category::Business,
        Category::Productivity,
        Category::Health,
        Category::Culture,
        Category::Other,
    ];

    /// Maps a model-supplied label onto the taxonomy, case-insensitively.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "technology" => Category::Technology,
            "science" => Category::Science,
            "business" => Category::Business,
            "productivity" => Category::Productivity,
            "health" => Category::Health,
            "culture" => Category::Culture,
            _ => Category::Other,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::Technology => "technology",
            Category::Science => "science",
            Category::Business => "business",
            Category::Productivity => "productivity",
            Category::Health => "health",
            Category::Culture => "culture",
            Category::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxonomy_has_seven_labels() {
        assert_eq!(Category::ALL.len(), 7);
    }

    #[test]
    fn labels_round_trip() {
        for cat in Category::ALL {
            assert_eq!(Category::from_label(cat.label()), cat);
        }
    }

    #[test]
    fn unknown_labels_fold_to_other() {
        assert_eq!(Category::from_label("finance"), Category::Other);
        assert_eq!(Category::from_label(""), Category::Other);
    }

    #[test]
    fn label_matching_is_case_insensitive() {
        assert_eq!(Category::from_label("Technology"), Category::Technology);
        assert_eq!(Category::from_label(" SCIENCE "), Category::Science);
    }

    #[test]
    fn serializes_as_lowercase_string() {
        let json = serde_json::to_string(&Category::Technology).unwrap();
        assert_eq!(json, "\"technology\"");
    }
}
