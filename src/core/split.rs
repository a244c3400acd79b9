//! Subtype splitting: breaks a group that agrees only on the parent label
//! back into runs of one raw label each.

use std::collections::BTreeSet;

use thiserror::Error;

use super::error::EngineError;
use super::merge::{Agreement, MergePolicy, MergedSpan, SpanGroup};
use crate::domain::Span;

/// Split attempted on a group whose sources have no common parent label
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Cannot split by subtype across multiple parent types: {}", join(.type_set))]
pub struct IncompatibleTypeError {
    /// Every distinct parent label among the group's sources
    pub type_set: BTreeSet<String>,
}

fn join(types: &BTreeSet<String>) -> String {
    types.iter().cloned().collect::<Vec<_>>().join(", ")
}

/// Split `merged` into one group per maximal run of a single raw label.
///
/// - Exact agreement: every source becomes its own single-source group.
/// - Family agreement: the subtyped sources are walked in insertion order and
///   consecutive sources with the same raw label are accumulated together.
///   Sources labelled with the parent itself add no finer label. The runs
///   replace the group only when they cover its whole window, apart from
///   whitespace between runs; otherwise the group is returned whole so no
///   flagged text is lost.
/// - Conflict: fails with [`IncompatibleTypeError`].
pub fn split(merged: &MergedSpan, policy: &MergePolicy) -> Result<Vec<MergedSpan>, EngineError> {
    match merged.agreement() {
        Agreement::Exact => merged
            .sources()
            .iter()
            .cloned()
            .map(|span| MergedSpan::single(span, policy).map_err(EngineError::from))
            .collect(),

        Agreement::Family => {
            let runs = subtype_runs(merged.sources())
                .into_iter()
                .map(|run| accumulate_run(run, merged, policy))
                .collect::<Result<Vec<_>, _>>()?;

            if runs.is_empty() || !covers_window(&runs, merged) {
                return Ok(vec![merged.clone()]);
            }
            Ok(runs)
        }

        Agreement::Conflict => Err(IncompatibleTypeError {
            type_set: merged
                .source_parent_types()
                .into_iter()
                .map(str::to_string)
                .collect(),
        }
        .into()),
    }
}

/// True when every non-whitespace char of `outer` lies inside some run
fn covers_window(runs: &[MergedSpan], outer: &MergedSpan) -> bool {
    let mut bounds: Vec<(usize, usize)> = runs.iter().map(|r| (r.start(), r.end())).collect();
    bounds.sort_unstable();

    let blank = |from, to| outer.slice(from, to).chars().all(char::is_whitespace);

    let mut cursor = outer.start();
    for (start, end) in bounds {
        if start > cursor && !blank(cursor, start) {
            return false;
        }
        cursor = cursor.max(end);
    }
    cursor >= outer.end() || blank(cursor, outer.end())
}

/// Consecutive subtyped sources sharing one raw label
fn subtype_runs(sources: &[Span]) -> Vec<Vec<Span>> {
    let mut runs: Vec<Vec<Span>> = Vec::new();

    for span in sources.iter().filter(|s| s.is_subtyped()) {
        match runs.last_mut() {
            Some(run) if run[0].entity_type() == span.entity_type() => run.push(span.clone()),
            _ => runs.push(vec![span.clone()]),
        }
    }

    runs
}

fn accumulate_run(
    run: Vec<Span>,
    outer: &MergedSpan,
    policy: &MergePolicy,
) -> Result<MergedSpan, EngineError> {
    let mut group = SpanGroup::new();
    for span in run {
        group.add_within(span, outer)?;
    }
    Ok(group.finalize(policy)?)
}
