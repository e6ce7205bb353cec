//! Best-effort suggestions for broken references.
//!
//! When an anchor or file lookup fails, the validator offers at most one
//! nearby candidate: case-insensitive Damerau-Levenshtein distance, capped at
//! [`MAX_SUGGESTION_DISTANCE`], best score wins, first seen wins ties.

use strsim::damerau_levenshtein;

/// Candidates further away than this are never suggested.
pub const MAX_SUGGESTION_DISTANCE: usize = 3;

/// Pick the closest candidate to `query`, if any qualifies.
///
/// Comparison is case-insensitive; the returned string is the candidate in its
/// original casing.
#[must_use]
pub fn best_match<'a, I>(query: &str, candidates: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let needle = query.to_lowercase();
    let mut best: Option<(usize, &str)> = None;

    for candidate in candidates {
        let distance = damerau_levenshtein(&needle, &candidate.to_lowercase());
        if distance > MAX_SUGGESTION_DISTANCE {
            continue;
        }
        let better = match best {
            Some((best_distance, _)) => distance < best_distance,
            None => true,
        };
        if better {
            best = Some((distance, candidate));
        }
    }

    best.map(|(_, candidate)| candidate.to_string())
}

/// All candidates within [`MAX_SUGGESTION_DISTANCE`] of `query`, closest
/// first.
#[must_use]
pub fn close_matches<'a, I>(query: &str, candidates: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let needle = query.to_lowercase();
    let mut scored: Vec<(usize, &str)> = candidates
        .into_iter()
        .filter_map(|candidate| {
            let distance = damerau_levenshtein(&needle, &candidate.to_lowercase());
            (distance <= MAX_SUGGESTION_DISTANCE).then_some((distance, candidate))
        })
        .collect();
    scored.sort_by_key(|&(distance, _)| distance);
    scored
        .into_iter()
        .map(|(_, candidate)| candidate.to_string())
        .collect()
}
