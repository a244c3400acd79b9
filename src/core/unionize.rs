//! Sweep-line unionizer: partitions every annotator's spans into maximal
//! groups connected by overlap and turns each group into output spans.
//!
//! Spans are sorted by start once, then scanned left to right while tracking
//! the furthest end of the open group, so grouping costs O(N log N).

use tracing::debug;

use super::error::EngineError;
use super::merge::{MergePolicy, MergedSpan, SpanGroup};
use super::split::split;
use crate::domain::Span;

/// Group spans by transitive overlap, in left-to-right order.
///
/// A span joins the open group when it starts before the group's furthest
/// end (or exactly at it, when `join_adjacent` is set). Sorting is stable, so
/// spans with equal starts keep their input order.
pub fn partition(mut spans: Vec<Span>, join_adjacent: bool) -> Vec<Vec<Span>> {
    spans.sort_by_key(Span::start);

    let mut groups = Vec::new();
    let mut open: Vec<Span> = Vec::new();
    let mut open_end = 0;

    for span in spans {
        let joins = !open.is_empty()
            && if join_adjacent {
                span.start() <= open_end
            } else {
                span.start() < open_end
            };

        if joins {
            open_end = open_end.max(span.end());
        } else {
            if !open.is_empty() {
                groups.push(std::mem::take(&mut open));
            }
            open_end = span.end();
        }
        open.push(span);
    }

    if !open.is_empty() {
        groups.push(open);
    }

    groups
}

/// Finalized overlap groups, before any subtype splitting
pub fn group(spans: Vec<Span>, policy: &MergePolicy) -> Result<Vec<MergedSpan>, EngineError> {
    partition(spans, policy.join_adjacent)
        .into_iter()
        .map(|members| -> Result<MergedSpan, EngineError> {
            Ok(SpanGroup::from_spans(members)?.finalize(policy)?)
        })
        .collect()
}

/// Final output spans: each group split by subtype, or emitted whole when its
/// sources disagree on the parent label.
pub fn unionize(spans: Vec<Span>, policy: &MergePolicy) -> Result<Vec<MergedSpan>, EngineError> {
    let groups = group(spans, policy)?;
    let group_count = groups.len();
    let mut output = Vec::new();

    for merged in groups {
        if merged.has_compatible_family_typelist() {
            output.extend(split(&merged, policy)?);
        } else {
            output.push(merged);
        }
    }

    debug!(groups = group_count, spans = output.len(), "Unionized overlap groups");
    Ok(output)
}
