//! Merge engine: accumulates overlapping spans into one group and resolves
//! the group's type and score.
//!
//! A [`SpanGroup`] is the mutable accumulator. Once every span is added it is
//! finalized into an immutable [`MergedSpan`] whose [`Resolution`] is computed
//! exactly once from its sources.
//!
//! # Resolution policy
//!
//! 1. One raw label across all sources: that label, highest score.
//! 2. One parent label across all sources: the best-scoring subtyped source
//!    wins if it clears the threshold, otherwise the parent label with the
//!    highest score.
//! 3. Anything else: `UNKNOWN` with the threshold as a sentinel score.

use std::cmp::{max, min};
use std::collections::BTreeSet;
use std::sync::Arc;

use thiserror::Error;

use crate::domain::span::{char_slice, skip_chars, Span};
use crate::domain::{Origin, TypeMap};

/// Resolved type for groups whose sources disagree on the parent label
pub const UNKNOWN_TYPE: &str = "UNKNOWN";

/// Confidence a subtyped label needs to override its parent label
pub const TYPE_THRESHOLD: f64 = 0.5;

/// Tunables for grouping and resolution
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MergePolicy {
    /// Subtype override cutoff, also the UNKNOWN sentinel score
    pub threshold: f64,

    /// Whether spans that only touch (`start == end`) share a group
    pub join_adjacent: bool,
}

impl Default for MergePolicy {
    fn default() -> Self {
        Self {
            threshold: TYPE_THRESHOLD,
            join_adjacent: true,
        }
    }
}

/// Which resolution rule decided a group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Agreement {
    /// Every source carries the same raw label
    Exact,
    /// Raw labels differ but share one parent label
    Family,
    /// Sources disagree on the parent label
    Conflict,
}

/// Outcome of type/score resolution over a group's sources
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub entity_type: String,
    pub score: f64,
    pub agreement: Agreement,
}

impl Resolution {
    pub fn is_unknown(&self) -> bool {
        self.agreement == Agreement::Conflict
    }
}

impl MergePolicy {
    /// Resolve the type and score of `sources`, which must be non-empty
    pub fn resolve(&self, sources: &[Span]) -> Resolution {
        let Some(first) = sources.first() else {
            return self.unknown();
        };

        let max_score = sources
            .iter()
            .map(Span::score)
            .fold(f64::NEG_INFINITY, f64::max);

        if sources.iter().all(|s| s.entity_type() == first.entity_type()) {
            return Resolution {
                entity_type: first.entity_type().to_string(),
                score: max_score,
                agreement: Agreement::Exact,
            };
        }

        let parent = first.parent_type();
        if !sources.iter().all(|s| s.parent_type() == parent) {
            return self.unknown();
        }

        // Ties go to the earliest source.
        let top = sources
            .iter()
            .filter(|s| s.is_subtyped())
            .fold(None::<&Span>, |best, s| match best {
                Some(b) if b.score() >= s.score() => Some(b),
                _ => Some(s),
            });

        match top {
            Some(top) if top.score() >= self.threshold => Resolution {
                entity_type: top.entity_type().to_string(),
                score: top.score(),
                agreement: Agreement::Family,
            },
            _ => Resolution {
                entity_type: parent.to_string(),
                score: max_score,
                agreement: Agreement::Family,
            },
        }
    }

    fn unknown(&self) -> Resolution {
        Resolution {
            entity_type: UNKNOWN_TYPE.to_string(),
            score: self.threshold,
            agreement: Agreement::Conflict,
        }
    }
}

/// Contract violations when building a group
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MergeError {
    #[error("Cannot merge an empty span")]
    EmptySpan,

    #[error("Span [{span_start}, {span_end}) does not overlap merged window [{start}, {end})")]
    DisjointSpan {
        span_start: usize,
        span_end: usize,
        start: usize,
        end: usize,
    },

    #[error("Cannot finalize a group without spans")]
    EmptyGroup,
}

/// Accumulator for spans that overlap one another
#[derive(Debug, Clone, Default)]
pub struct SpanGroup {
    sources: Vec<Span>,
    start: usize,
    end: usize,
    text: String,
    type_map: Option<Arc<TypeMap>>,
}

impl SpanGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulate `spans` in order
    pub fn from_spans(spans: impl IntoIterator<Item = Span>) -> Result<Self, MergeError> {
        let mut group = Self::new();
        for span in spans {
            group.add(span)?;
        }
        Ok(group)
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn sources(&self) -> &[Span] {
        &self.sources
    }

    /// Add a span that overlaps or touches the accumulated window
    pub fn add(&mut self, span: Span) -> Result<(), MergeError> {
        if span.is_empty() {
            return Err(MergeError::EmptySpan);
        }

        if self.sources.is_empty() {
            self.start = span.start();
            self.end = span.end();
            self.text = span.text().to_string();
            self.type_map = span.type_map().cloned();
            self.sources.push(span);
            return Ok(());
        }

        if span.end() < self.start || span.start() > self.end {
            return Err(self.disjoint(&span));
        }

        if self.start <= span.start() {
            self.text.push_str(skip_chars(span.text(), self.end - span.start()));
        } else {
            let tail = skip_chars(&self.text, span.end() - self.start);
            self.text = format!("{}{}", span.text(), tail);
        }

        self.widen(&span);
        self.sources.push(span);
        Ok(())
    }

    /// Add a span lying inside `outer`, bridging any gap to the accumulated
    /// window with the outer group's text.
    pub fn add_within(&mut self, span: Span, outer: &MergedSpan) -> Result<(), MergeError> {
        if span.is_empty() {
            return Err(MergeError::EmptySpan);
        }

        if span.start() < outer.start() || span.end() > outer.end() {
            return Err(MergeError::DisjointSpan {
                span_start: span.start(),
                span_end: span.end(),
                start: outer.start(),
                end: outer.end(),
            });
        }

        if self.sources.is_empty() || (span.end() >= self.start && span.start() <= self.end) {
            return self.add(span);
        }

        let start = min(self.start, span.start());
        let end = max(self.end, span.end());
        self.text = outer.slice(start, end).to_string();
        self.widen(&span);
        self.sources.push(span);
        Ok(())
    }

    /// Freeze the group and resolve its type and score
    pub fn finalize(self, policy: &MergePolicy) -> Result<MergedSpan, MergeError> {
        if self.sources.is_empty() {
            return Err(MergeError::EmptyGroup);
        }

        let resolution = policy.resolve(&self.sources);
        Ok(MergedSpan {
            sources: self.sources,
            start: self.start,
            end: self.end,
            text: self.text,
            type_map: self.type_map,
            resolution,
        })
    }

    fn widen(&mut self, span: &Span) {
        self.start = min(self.start, span.start());
        self.end = max(self.end, span.end());
        if self.type_map.is_none() {
            self.type_map = span.type_map().cloned();
        }
    }

    fn disjoint(&self, span: &Span) -> MergeError {
        MergeError::DisjointSpan {
            span_start: span.start(),
            span_end: span.end(),
            start: self.start,
            end: self.end,
        }
    }
}

/// Finalized group of overlapping spans with its memoized resolution
#[derive(Debug, Clone, PartialEq)]
pub struct MergedSpan {
    sources: Vec<Span>,
    start: usize,
    end: usize,
    text: String,
    type_map: Option<Arc<TypeMap>>,
    resolution: Resolution,
}

impl MergedSpan {
    /// Wrap one span as its own finalized group
    pub fn single(span: Span, policy: &MergePolicy) -> Result<Self, MergeError> {
        SpanGroup::from_spans([span])?.finalize(policy)
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Constituent spans in insertion order
    pub fn sources(&self) -> &[Span] {
        &self.sources
    }

    pub fn resolution(&self) -> &Resolution {
        &self.resolution
    }

    pub fn entity_type(&self) -> &str {
        &self.resolution.entity_type
    }

    pub fn score(&self) -> f64 {
        self.resolution.score
    }

    pub fn agreement(&self) -> Agreement {
        self.resolution.agreement
    }

    /// Parent label of the resolved type under the group's taxonomy
    pub fn parent_type(&self) -> &str {
        match &self.type_map {
            Some(map) => map.parent_of(&self.resolution.entity_type),
            None => &self.resolution.entity_type,
        }
    }

    /// False when the sources disagree on the parent label
    pub fn has_compatible_family_typelist(&self) -> bool {
        !self.resolution.is_unknown()
    }

    pub fn source_types(&self) -> BTreeSet<&str> {
        self.sources.iter().map(Span::entity_type).collect()
    }

    pub fn source_parent_types(&self) -> BTreeSet<&str> {
        self.sources.iter().map(Span::parent_type).collect()
    }

    pub fn source_scores(&self) -> Vec<f64> {
        self.sources.iter().map(Span::score).collect()
    }

    pub fn source_origins(&self) -> BTreeSet<Origin> {
        self.sources.iter().map(Span::origin).collect()
    }

    /// Text over `[start, end)`, clamped to this group's window
    pub fn slice(&self, start: usize, end: usize) -> &str {
        let from = start.saturating_sub(self.start);
        let to = end.min(self.end).saturating_sub(self.start);
        char_slice(&self.text, from, to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn primary(start: usize, end: usize, score: f64, label: &str, text: &str) -> Span {
        Span::new(Origin::Primary, start, end, score, label, text)
    }

    fn secondary(start: usize, end: usize, score: f64, label: &str, text: &str) -> Span {
        Span::new(Origin::Secondary, start, end, score, label, text)
            .with_type_map(Arc::new(TypeMap::secondary()))
    }

    #[test]
    fn test_single_span_identity() {
        let span = primary(33, 35, 0.98, "AGE", "48");
        let merged = MergedSpan::single(span.clone(), &MergePolicy::default()).unwrap();

        assert_eq!(merged.start(), 33);
        assert_eq!(merged.end(), 35);
        assert_eq!(merged.text(), "48");
        assert_eq!(merged.entity_type(), "AGE");
        assert_eq!(merged.score(), 0.98);
        assert_eq!(merged.sources(), &[span]);
    }

    #[test]
    fn test_append_splice() {
        let mut group = SpanGroup::new();
        group.add(primary(0, 25, 0.99, "NAME", "Patient is Mr. John Smith")).unwrap();
        group
            .add(secondary(15, 29, 0.01, "PATIENT_OR_FAMILY_NAME", "John Smith Jr."))
            .unwrap();

        assert_eq!(group.start(), 0);
        assert_eq!(group.end(), 29);
        assert_eq!(group.text(), "Patient is Mr. John Smith Jr.");
    }

    #[test]
    fn test_prepend_splice() {
        let mut group = SpanGroup::new();
        group
            .add(secondary(15, 29, 0.01, "PATIENT_OR_FAMILY_NAME", "John Smith Jr."))
            .unwrap();
        group.add(primary(0, 25, 0.99, "NAME", "Patient is Mr. John Smith")).unwrap();

        assert_eq!(group.start(), 0);
        assert_eq!(group.end(), 29);
        assert_eq!(group.text(), "Patient is Mr. John Smith Jr.");
    }

    #[test]
    fn test_contained_span_keeps_text() {
        let mut group = SpanGroup::new();
        group.add(primary(10, 20, 0.9, "NAME", "abcdefghij")).unwrap();
        group.add(primary(12, 15, 0.9, "NAME", "cde")).unwrap();
        assert_eq!(group.text(), "abcdefghij");

        // A wider span arriving later replaces both ends
        group.add(primary(8, 22, 0.9, "NAME", "xyabcdefghijzw")).unwrap();
        assert_eq!((group.start(), group.end()), (8, 22));
        assert_eq!(group.text(), "xyabcdefghijzw");
    }

    #[test]
    fn test_adjacent_span_is_accepted() {
        let mut group = SpanGroup::new();
        group.add(primary(0, 5, 0.9, "NAME", "hello")).unwrap();
        group.add(primary(5, 11, 0.9, "NAME", " world")).unwrap();
        assert_eq!(group.text(), "hello world");
    }

    #[test]
    fn test_disjoint_span_rejected() {
        let mut group = SpanGroup::new();
        group.add(primary(0, 25, 0.99, "NAME", "Patient is Mr. John Smith")).unwrap();
        let err = group
            .add(secondary(89, 97, 0.04, "PHONE_NUMBER", "867-5309"))
            .unwrap_err();
        assert_eq!(
            err,
            MergeError::DisjointSpan {
                span_start: 89,
                span_end: 97,
                start: 0,
                end: 25
            }
        );
        assert_eq!(group.len(), 1);
    }

    #[test]
    fn test_empty_span_rejected() {
        let mut group = SpanGroup::new();
        let err = group.add(primary(0, 4, 0.5, "", "John")).unwrap_err();
        assert_eq!(err, MergeError::EmptySpan);
        assert!(group.is_empty());
    }

    #[test]
    fn test_finalize_empty_group() {
        let err = SpanGroup::new().finalize(&MergePolicy::default()).unwrap_err();
        assert_eq!(err, MergeError::EmptyGroup);
    }

    #[test]
    fn test_resolution_family_tie_prefers_first() {
        let policy = MergePolicy::default();
        let sources = vec![
            secondary(0, 4, 0.7, "PROVIDER_NAME", "John"),
            secondary(0, 4, 0.7, "PATIENT_OR_FAMILY_NAME", "John"),
        ];
        let resolution = policy.resolve(&sources);
        assert_eq!(resolution.entity_type, "PROVIDER_NAME");
        assert_eq!(resolution.agreement, Agreement::Family);
    }

    #[test]
    fn test_resolution_threshold_is_inclusive() {
        let policy = MergePolicy::default();
        let sources = vec![
            primary(0, 4, 0.9, "NAME", "John"),
            secondary(0, 4, 0.5, "PROVIDER_NAME", "John"),
        ];
        let resolution = policy.resolve(&sources);
        assert_eq!(resolution.entity_type, "PROVIDER_NAME");
        assert_eq!(resolution.score, 0.5);
    }

    #[test]
    fn test_resolution_uses_configured_threshold() {
        let policy = MergePolicy {
            threshold: 0.9,
            ..Default::default()
        };
        let sources = vec![
            primary(0, 4, 0.6, "NAME", "John"),
            secondary(0, 4, 0.8, "PROVIDER_NAME", "John"),
        ];
        let resolution = policy.resolve(&sources);
        assert_eq!(resolution.entity_type, "NAME");
        assert_eq!(resolution.score, 0.8);

        let conflict = vec![
            primary(0, 4, 0.6, "NAME", "John"),
            primary(0, 4, 0.8, "URL_OR_IP", "John"),
        ];
        assert_eq!(policy.resolve(&conflict).score, 0.9);
    }

    #[test]
    fn test_slice_clamps_to_window() {
        let group = SpanGroup::from_spans([primary(10, 20, 0.9, "NAME", "abcdefghij")]).unwrap();
        let merged = group.finalize(&MergePolicy::default()).unwrap();
        assert_eq!(merged.slice(12, 15), "cde");
        assert_eq!(merged.slice(5, 12), "ab");
        assert_eq!(merged.slice(18, 40), "ij");
    }
}
