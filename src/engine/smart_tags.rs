//! Metadata suggestion seam.
//!
//! Suggesters propose a list and labels for a new task from its title. They
//! are advisory collaborators: the engine applies suggestions only as
//! defaults when the caller supplied neither list nor labels, and any
//! suggester failure degrades to the empty suggestion.

use crate::model::{Label, List};
use once_cell::sync::Lazy;
use regex::Regex;

/// A suggested list/labels pair. Empty means "no suggestion".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Suggestion {
    pub list_id: Option<i64>,
    pub label_ids: Vec<i64>,
}

/// Suggests metadata for a task title given the candidate lists and labels.
pub trait MetadataSuggester {
    /// Errors are allowed; the engine swallows them and proceeds with no
    /// suggestion. Implementations must not block creation indefinitely.
    fn suggest(
        &self,
        title: &str,
        lists: &[List],
        labels: &[Label],
    ) -> Result<Suggestion, Box<dyn std::error::Error + Send + Sync>>;
}

/// Null implementation: never suggests anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSuggestions;

impl MetadataSuggester for NoSuggestions {
    fn suggest(
        &self,
        _title: &str,
        _lists: &[List],
        _labels: &[Label],
    ) -> Result<Suggestion, Box<dyn std::error::Error + Send + Sync>> {
        Ok(Suggestion::default())
    }
}

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z0-9]+").expect("valid regex"));

/// Local keyword heuristic: a list whose name appears as a word in the title
/// becomes the suggested list (first match wins); every label whose name
/// appears becomes a suggested label.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordSuggester;

impl MetadataSuggester for KeywordSuggester {
    fn suggest(
        &self,
        title: &str,
        lists: &[List],
        labels: &[Label],
    ) -> Result<Suggestion, Box<dyn std::error::Error + Send + Sync>> {
        let words: Vec<String> = WORD_RE
            .find_iter(title)
            .map(|m| m.as_str().to_ascii_lowercase())
            .collect();

        let list_id = lists
            .iter()
            .find(|list| words.contains(&list.name.to_ascii_lowercase()))
            .map(|list| list.id);

        let label_ids = labels
            .iter()
            .filter(|label| words.contains(&label.name.to_ascii_lowercase()))
            .map(|label| label.id)
            .collect();

        Ok(Suggestion { list_id, label_ids })
    }
}
