//! A single annotator's claim about a range of the source text.
//!
//! Offsets count Unicode scalar values (chars), not bytes, so every slice
//! taken here goes through the char-aware helpers at the bottom of the file.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::taxonomy::TypeMap;

/// Annotator that produced a span
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    /// Annotator whose label vocabulary is canonical
    Primary,
    /// Annotator whose labels are mapped onto the primary vocabulary
    Secondary,
}

impl Origin {
    pub fn as_str(&self) -> &'static str {
        match self {
            Origin::Primary => "primary",
            Origin::Secondary => "secondary",
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One annotator's typed, scored claim over `[start, end)`
#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    origin: Origin,
    start: usize,
    end: usize,
    score: f64,
    entity_type: String,
    text: String,
    type_map: Option<Arc<TypeMap>>,
}

impl Span {
    /// Create a span; the label is uppercased.
    pub fn new(
        origin: Origin,
        start: usize,
        end: usize,
        score: f64,
        entity_type: impl AsRef<str>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            origin,
            start,
            end,
            score,
            entity_type: entity_type.as_ref().to_uppercase(),
            text: text.into(),
            type_map: None,
        }
    }

    /// Attach the annotator's label taxonomy
    pub fn with_type_map(mut self, type_map: Arc<TypeMap>) -> Self {
        self.type_map = Some(type_map);
        self
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    /// Raw label as reported by the annotator
    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn type_map(&self) -> Option<&Arc<TypeMap>> {
        self.type_map.as_ref()
    }

    /// Canonical label, falling back to the raw label when unmapped
    pub fn parent_type(&self) -> &str {
        match &self.type_map {
            Some(map) => map.parent_of(&self.entity_type),
            None => &self.entity_type,
        }
    }

    /// True when the raw label is a finer child of its parent label
    pub fn is_subtyped(&self) -> bool {
        self.parent_type() != self.entity_type
    }

    /// Precondition guard: a span without text or label cannot be merged
    pub fn is_empty(&self) -> bool {
        self.text.is_empty() || self.entity_type.is_empty()
    }

    /// Check `text == document[start..end]` in char offsets
    pub fn matches(&self, document: &str) -> bool {
        matches_document(document, self.start, self.end, &self.text)
    }
}

/// Number of chars in `text`
pub(crate) fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// `text[from..]` in char offsets; empty when `from` is past the end
pub(crate) fn skip_chars(text: &str, from: usize) -> &str {
    match text.char_indices().nth(from) {
        Some((byte_idx, _)) => &text[byte_idx..],
        None => "",
    }
}

/// `text[from..to]` in char offsets, clamped to the text
pub(crate) fn char_slice(text: &str, from: usize, to: usize) -> &str {
    let tail = skip_chars(text, from);
    let len = to.saturating_sub(from);
    match tail.char_indices().nth(len) {
        Some((byte_idx, _)) => &tail[..byte_idx],
        None => tail,
    }
}

pub(crate) fn matches_document(document: &str, start: usize, end: usize, text: &str) -> bool {
    end <= char_len(document) && char_slice(document, start, end) == text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_is_uppercased() {
        let span = Span::new(Origin::Secondary, 0, 4, 0.3, "patient_or_family_name", "John");
        assert_eq!(span.entity_type(), "PATIENT_OR_FAMILY_NAME");
    }

    #[test]
    fn test_parent_type_identity_without_map() {
        let span = Span::new(Origin::Primary, 0, 4, 0.9, "NAME", "John");
        assert_eq!(span.parent_type(), "NAME");
        assert!(!span.is_subtyped());
    }

    #[test]
    fn test_parent_type_through_map() {
        let map = Arc::new(TypeMap::secondary());
        let span = Span::new(Origin::Secondary, 0, 4, 0.9, "WARD", "Ward").with_type_map(map);
        assert_eq!(span.parent_type(), "ADDRESS");
        assert!(span.is_subtyped());
    }

    #[test]
    fn test_empty_guard() {
        assert!(Span::new(Origin::Primary, 0, 4, 0.9, "", "John").is_empty());
        assert!(Span::new(Origin::Primary, 0, 4, 0.9, "NAME", "").is_empty());
        assert!(!Span::new(Origin::Primary, 0, 4, 0.9, "NAME", "John").is_empty());
    }

    #[test]
    fn test_char_helpers_multibyte() {
        let text = "The café costs €50";
        assert_eq!(char_len(text), 18);
        assert_eq!(skip_chars(text, 4), "café costs €50");
        assert_eq!(char_slice(text, 4, 8), "café");
        assert_eq!(char_slice(text, 15, 18), "€50");
        assert_eq!(skip_chars(text, 40), "");
    }

    #[test]
    fn test_matches_document() {
        let doc = "Patient is Mr. John Smith";
        let span = Span::new(Origin::Primary, 15, 25, 0.9, "NAME", "John Smith");
        assert!(span.matches(doc));

        let shifted = Span::new(Origin::Primary, 14, 24, 0.9, "NAME", "John Smith");
        assert!(!shifted.matches(doc));

        let past_end = Span::new(Origin::Primary, 20, 30, 0.9, "NAME", "Smith");
        assert!(!past_end.matches(doc));
    }
}
