//! Uniform read access over leaf spans and merged groups.

use super::merge::MergedSpan;
use crate::domain::span::matches_document;
use crate::domain::Span;

/// Either one annotator's span or a finalized group of them
#[derive(Debug, Clone, PartialEq)]
pub enum Annotation {
    Leaf(Span),
    Merged(MergedSpan),
}

impl Annotation {
    pub fn start(&self) -> usize {
        match self {
            Annotation::Leaf(span) => span.start(),
            Annotation::Merged(merged) => merged.start(),
        }
    }

    pub fn end(&self) -> usize {
        match self {
            Annotation::Leaf(span) => span.end(),
            Annotation::Merged(merged) => merged.end(),
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Annotation::Leaf(span) => span.text(),
            Annotation::Merged(merged) => merged.text(),
        }
    }

    /// Raw label of a leaf, resolved label of a group
    pub fn entity_type(&self) -> &str {
        match self {
            Annotation::Leaf(span) => span.entity_type(),
            Annotation::Merged(merged) => merged.entity_type(),
        }
    }

    pub fn score(&self) -> f64 {
        match self {
            Annotation::Leaf(span) => span.score(),
            Annotation::Merged(merged) => merged.score(),
        }
    }

    pub fn parent_type(&self) -> &str {
        match self {
            Annotation::Leaf(span) => span.parent_type(),
            Annotation::Merged(merged) => merged.parent_type(),
        }
    }

    /// Check `text == document[start..end]` in char offsets
    pub fn matches(&self, document: &str) -> bool {
        matches_document(document, self.start(), self.end(), self.text())
    }
}

impl From<Span> for Annotation {
    fn from(span: Span) -> Self {
        Annotation::Leaf(span)
    }
}

impl From<MergedSpan> for Annotation {
    fn from(merged: MergedSpan) -> Self {
        Annotation::Merged(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::merge::{MergePolicy, SpanGroup};
    use crate::domain::Origin;

    #[test]
    fn test_leaf_and_merged_read_alike() {
        let doc = "Patient is Mr. John Smith Jr.";
        let leaf = Span::new(Origin::Primary, 0, 25, 0.99, "NAME", "Patient is Mr. John Smith");
        let merged = SpanGroup::from_spans([
            leaf.clone(),
            Span::new(Origin::Primary, 15, 29, 0.4, "NAME", "John Smith Jr."),
        ])
        .unwrap()
        .finalize(&MergePolicy::default())
        .unwrap();

        let annotations = [Annotation::from(leaf), Annotation::from(merged)];
        for annotation in &annotations {
            assert_eq!(annotation.entity_type(), "NAME");
            assert_eq!(annotation.score(), 0.99);
            assert!(annotation.matches(doc));
        }
        assert_eq!(annotations[1].end(), 29);
    }
}
