//! Span factory: validates raw annotator records and turns them into spans.

use thiserror::Error;

use crate::domain::span::char_len;
use crate::domain::{Origin, PrimaryRecord, SecondaryRecord, Span, Taxonomy};

/// Malformed annotator record or request
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{origin} record is missing required field '{field}'")]
    MissingField { origin: Origin, field: &'static str },

    #[error("{origin} record has negative offset {value} in '{field}'")]
    NegativeOffset {
        origin: Origin,
        field: &'static str,
        value: i64,
    },

    #[error("{origin} record has empty or inverted range [{start}, {end})")]
    InvalidRange { origin: Origin, start: i64, end: i64 },

    #[error("{origin} record score {score} is outside [0, 1]")]
    ScoreOutOfRange { origin: Origin, score: f64 },

    #[error("{origin} record text has {actual} chars but range [{start}, {end}) covers {expected}")]
    TextLengthMismatch {
        origin: Origin,
        start: usize,
        end: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Request text is empty")]
    EmptyText,
}

/// Builds spans from raw records using the injected taxonomy
#[derive(Debug, Clone, Default)]
pub struct SpanFactory {
    taxonomy: Taxonomy,
}

/// Field names for one annotator's record schema
struct Fields {
    start: &'static str,
    end: &'static str,
    score: &'static str,
    label: &'static str,
    text: &'static str,
}

const PRIMARY_FIELDS: Fields = Fields {
    start: "BeginOffset",
    end: "EndOffset",
    score: "Score",
    label: "Type",
    text: "Text",
};

const SECONDARY_FIELDS: Fields = Fields {
    start: "start",
    end: "stop",
    score: "confidence",
    label: "label",
    text: "text",
};

impl SpanFactory {
    pub fn new(taxonomy: Taxonomy) -> Self {
        Self { taxonomy }
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    pub fn from_primary(&self, record: &PrimaryRecord) -> Result<Span, ValidationError> {
        self.build(
            Origin::Primary,
            &PRIMARY_FIELDS,
            record.begin_offset,
            record.end_offset,
            record.score,
            record.entity_type.as_deref(),
            record.text.as_deref(),
        )
    }

    pub fn from_secondary(&self, record: &SecondaryRecord) -> Result<Span, ValidationError> {
        self.build(
            Origin::Secondary,
            &SECONDARY_FIELDS,
            record.start,
            record.stop,
            record.confidence,
            record.label.as_deref(),
            record.text.as_deref(),
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn build(
        &self,
        origin: Origin,
        fields: &Fields,
        start: Option<i64>,
        end: Option<i64>,
        score: Option<f64>,
        label: Option<&str>,
        text: Option<&str>,
    ) -> Result<Span, ValidationError> {
        let missing = |field| ValidationError::MissingField { origin, field };

        let start = start.ok_or_else(|| missing(fields.start))?;
        let end = end.ok_or_else(|| missing(fields.end))?;
        let score = score.ok_or_else(|| missing(fields.score))?;
        let label = label.filter(|l| !l.is_empty()).ok_or_else(|| missing(fields.label))?;
        let text = text.filter(|t| !t.is_empty()).ok_or_else(|| missing(fields.text))?;

        let start_idx = offset(origin, fields.start, start)?;
        let end_idx = offset(origin, fields.end, end)?;
        if start_idx >= end_idx {
            return Err(ValidationError::InvalidRange { origin, start, end });
        }

        if !score.is_finite() || !(0.0..=1.0).contains(&score) {
            return Err(ValidationError::ScoreOutOfRange { origin, score });
        }

        let actual = char_len(text);
        if actual != end_idx - start_idx {
            return Err(ValidationError::TextLengthMismatch {
                origin,
                start: start_idx,
                end: end_idx,
                expected: end_idx - start_idx,
                actual,
            });
        }

        let span = Span::new(origin, start_idx, end_idx, score, label, text);
        Ok(match self.taxonomy.for_origin(origin) {
            Some(map) => span.with_type_map(map),
            None => span,
        })
    }
}

fn offset(origin: Origin, field: &'static str, value: i64) -> Result<usize, ValidationError> {
    usize::try_from(value).map_err(|_| ValidationError::NegativeOffset {
        origin,
        field,
        value,
    })
}
