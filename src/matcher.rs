//! Candidate matcher: scores search hits against the requested title and
//! selects a single winner, or refuses when the field is too close to call.
//!
//! Similarity is a normalized sequence-alignment ratio in [0, 1]
//! (Levenshtein via strsim) computed case-insensitively with spaces treated
//! as junk. The matcher is deterministic: scoring is pure and the sort is
//! stable, so identical inputs always produce the same winner or the same
//! failure.

use std::cmp::Ordering;

use reelcache_common::{Error, Result};
use tracing::debug;

use crate::provider::MoviePayload;

/// Candidates scoring below this ratio against the requested title are
/// dropped.
pub const MIN_MATCH: f64 = 0.5;

/// Minimum score gap between the top two candidates; anything closer is an
/// ambiguous match.
pub const MIN_DIFF: f64 = 0.01;

/// A search hit with its similarity score attached.
#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    pub payload: MoviePayload,
    pub score: f64,
}

/// Similarity ratio in [0, 1] between two titles, ignoring case and spaces.
pub fn title_similarity(a: &str, b: &str) -> f64 {
    strsim::normalized_levenshtein(&fold(a), &fold(b))
}

fn fold(s: &str) -> String {
    s.chars()
        .filter(|c| *c != ' ')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Pick the single best candidate for `(title, year)`.
///
/// Candidates with a known year differing from a known target year are
/// dropped, as are candidates scoring below [`MIN_MATCH`]. The filter
/// builds a fresh list so no candidate is skipped when its neighbour is
/// removed. Failure modes are distinct: an empty filtered list is
/// `NoSuitableResults`, a top-two gap under [`MIN_DIFF`] is
/// `AmbiguousMatch`.
pub fn select_best(
    candidates: Vec<MoviePayload>,
    title: &str,
    year: Option<i32>,
) -> Result<ScoredCandidate> {
    let scored = candidates.into_iter().map(|payload| {
        let score = payload
            .title
            .as_deref()
            .map(|candidate_title| title_similarity(candidate_title, title))
            .unwrap_or(0.0);
        ScoredCandidate { payload, score }
    });

    let mut remaining: Vec<ScoredCandidate> = Vec::new();
    for candidate in scored {
        if let (Some(want), Some(have)) = (year, candidate.payload.year) {
            if want != have {
                debug!(
                    title = ?candidate.payload.title,
                    id = ?candidate.payload.id,
                    year = have,
                    "removing candidate (wrong year)"
                );
                continue;
            }
        }
        if candidate.score < MIN_MATCH {
            debug!(
                title = ?candidate.payload.title,
                score = candidate.score,
                "removing candidate (below minimum match)"
            );
            continue;
        }
        remaining.push(candidate);
    }

    if remaining.is_empty() {
        return Err(Error::no_suitable_results(title.to_string()));
    }

    // Stable sort keeps equal-scored candidates in input order
    remaining.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));

    if remaining.len() == 1 {
        debug!("only one candidate remains");
        return Ok(remaining.remove(0));
    }

    let gap = remaining[0].score - remaining[1].score;
    if gap < MIN_DIFF {
        for candidate in &remaining {
            debug!(
                title = ?candidate.payload.title,
                year = ?candidate.payload.year,
                id = ?candidate.payload.id,
                score = candidate.score,
                "remaining candidate"
            );
        }
        return Err(Error::ambiguous_match(format!(
            "`{:?} ({:?}) - {:?}` <-?-> `{:?} ({:?}) - {:?}`",
            remaining[0].payload.title,
            remaining[0].payload.year,
            remaining[0].payload.id,
            remaining[1].payload.title,
            remaining[1].payload.year,
            remaining[1].payload.id,
        )));
    }

    Ok(remaining.swap_remove(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn hit(title: &str, year: Option<i32>, id: i64) -> MoviePayload {
        MoviePayload {
            id: Some(id),
            title: Some(title.to_string()),
            year,
            ..Default::default()
        }
    }

    #[test]
    fn identical_title_scores_one() {
        assert!((title_similarity("Up", "Up") - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn similarity_ignores_case_and_spaces() {
        assert!((title_similarity("the matrix", "The Matrix") - 1.0).abs() < f64::EPSILON);
        assert!((title_similarity("TheMatrix", "The Matrix") - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn clear_winner_is_selected() {
        let candidates = vec![
            hit("The Matrix", Some(1999), 1),
            hit("The Matrix Reloaded", Some(2003), 2),
        ];
        let winner = select_best(candidates, "The Matrix", None).unwrap();
        assert_eq!(winner.payload.id, Some(1));
        assert!((winner.score - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn equal_scores_are_ambiguous() {
        // Two candidates with identical titles: gap 0 < MIN_DIFF
        let candidates = vec![hit("Up", Some(2009), 1), hit("Up", Some(2009), 2)];
        let err = select_best(candidates, "Up", Some(2009)).unwrap_err();
        assert_matches!(err, Error::AmbiguousMatch(_));
    }

    #[test]
    fn wide_gap_is_not_ambiguous() {
        // Scores roughly 1.0 vs 0.53: gap far above MIN_DIFF
        let candidates = vec![
            hit("The Matrix", None, 1),
            hit("The Matrix Reloaded", None, 2),
        ];
        let winner = select_best(candidates, "The Matrix", None).unwrap();
        assert_eq!(winner.payload.id, Some(1));
    }

    #[test]
    fn year_mismatch_excludes_candidate_regardless_of_score() {
        let candidates = vec![hit("Up", Some(1999), 1), hit("Up", Some(2000), 2)];
        let winner = select_best(candidates, "Up", Some(2000)).unwrap();
        assert_eq!(winner.payload.id, Some(2));
    }

    #[test]
    fn unknown_year_passes_year_filter() {
        let candidates = vec![hit("Up", None, 1)];
        let winner = select_best(candidates, "Up", Some(2009)).unwrap();
        assert_eq!(winner.payload.id, Some(1));
    }

    #[test]
    fn all_filtered_is_no_suitable_results() {
        let candidates = vec![
            hit("Something Else Entirely", Some(2009), 1),
            hit("Up", Some(1999), 2),
        ];
        let err = select_best(candidates, "Up", Some(2009)).unwrap_err();
        assert_matches!(err, Error::NoSuitableResults(_));
    }

    #[test]
    fn empty_candidate_list_is_no_suitable_results() {
        let err = select_best(Vec::new(), "Up", None).unwrap_err();
        assert_matches!(err, Error::NoSuitableResults(_));
    }

    #[test]
    fn score_exactly_at_threshold_is_kept() {
        // "abcd" vs "ab": ratio exactly 0.5, not below MIN_MATCH
        let candidates = vec![hit("abcd", None, 1)];
        let winner = select_best(candidates, "ab", None).unwrap();
        assert_eq!(winner.payload.id, Some(1));
        assert!((winner.score - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn adjacent_rejects_are_not_skipped() {
        // Two consecutive wrong-year candidates before the good one; a
        // remove-while-iterating filter would skip the second reject
        let candidates = vec![
            hit("Up", Some(1999), 1),
            hit("Up", Some(2003), 2),
            hit("Up", Some(2009), 3),
        ];
        let winner = select_best(candidates, "Up", Some(2009)).unwrap();
        assert_eq!(winner.payload.id, Some(3));
    }

    #[test]
    fn matcher_is_deterministic() {
        let build = || {
            vec![
                hit("The Matrix", None, 1),
                hit("The Matrix Reloaded", None, 2),
            ]
        };
        let first = select_best(build(), "The Matrix", None).unwrap();
        let second = select_best(build(), "The Matrix", None).unwrap();
        assert_eq!(first.payload.id, second.payload.id);

        let ambiguous = || vec![hit("Up", None, 1), hit("Up", None, 2)];
        let e1 = select_best(ambiguous(), "Up", None).unwrap_err();
        let e2 = select_best(ambiguous(), "Up", None).unwrap_err();
        assert_matches!(e1, Error::AmbiguousMatch(_));
        assert_matches!(e2, Error::AmbiguousMatch(_));
    }
}
