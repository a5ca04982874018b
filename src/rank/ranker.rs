//! Parallel population scoring and deterministic top-K ranking.
//!
//! Scoring is embarrassingly parallel: each customer is a pure function of
//! their history and the immutable fitted parameters, so the population is
//! evaluated with rayon and the collected output preserves input order.
//! Per-customer failures become exclusions, never batch failures.
//!
//! The sort runs in two passes: a total key (score descending, customer id
//! ascending), then an epsilon pass that reorders tied runs by ascending id.
//! The ranking is therefore a function of the population multiset alone and
//! reproducible across runs.

use rayon::prelude::*;

use crate::domain::{CustomerHistory, RankedEntry};
use crate::error::{RequestError, ScoreError};
use crate::models::Scorer;
use crate::rank::normalize;

/// One customer's scores after normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCustomer {
    pub customer_id: String,
    pub raw: f64,
    pub normalized: f64,
}

/// A customer excluded from the ranking, with the reason.
#[derive(Debug, Clone, PartialEq)]
pub struct Exclusion {
    pub customer_id: String,
    pub reason: ScoreError,
}

/// Full output of one ranking request: the top-K entries, every scored
/// customer (for exports/diffs), and the exclusion report.
#[derive(Debug, Clone)]
pub struct RankOutcome {
    pub entries: Vec<RankedEntry>,
    pub scored: Vec<ScoredCustomer>,
    pub excluded: Vec<Exclusion>,
}

/// Score every customer under one scorer, in parallel.
///
/// Output order matches input order. Customers whose records fail the
/// scorer's contract (schema, history, horizon) land in the exclusion list.
pub fn score_population(
    scorer: &dyn Scorer,
    population: &[CustomerHistory],
    horizon_days: Option<f64>,
) -> (Vec<ScoredCustomer>, Vec<Exclusion>) {
    let results: Vec<(String, Result<f64, ScoreError>)> = population
        .par_iter()
        .map(|history| {
            (
                history.customer_id.clone(),
                scorer.score(history, horizon_days),
            )
        })
        .collect();

    let mut scored = Vec::with_capacity(results.len());
    let mut excluded = Vec::new();
    for (customer_id, result) in results {
        match result {
            Ok(raw) => scored.push(ScoredCustomer {
                normalized: normalize(raw, scorer.model_id()),
                customer_id,
                raw,
            }),
            Err(reason) => excluded.push(Exclusion {
                customer_id,
                reason,
            }),
        }
    }
    (scored, excluded)
}

/// Rank a scored population and take the top `k`.
///
/// Output length is `min(k, |scored|)`, ranks are 1-based, and the input is
/// read-only. Fails with `InvalidK` when `k == 0`.
///
/// The order is a function of the population multiset, independent of input
/// arrangement: a total sort on (score descending, customer id ascending),
/// then runs of scores within `tie_epsilon` of the run's top score reorder
/// by ascending id.
pub fn rank(
    scored: &[ScoredCustomer],
    k: usize,
    tie_epsilon: f64,
) -> Result<Vec<RankedEntry>, RequestError> {
    if k == 0 {
        return Err(RequestError::InvalidK(k));
    }

    let mut sorted: Vec<&ScoredCustomer> = scored.iter().collect();
    sorted.sort_by(|a, b| {
        b.normalized
            .partial_cmp(&a.normalized)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.customer_id.cmp(&b.customer_id))
    });

    // Epsilon pass. Every member of a run lies within `tie_epsilon` of the
    // run's top score (and so pairwise within `tie_epsilon` of each other),
    // and tied runs order by ascending customer id.
    let mut start = 0;
    while start < sorted.len() {
        let mut end = start + 1;
        while end < sorted.len()
            && sorted[start].normalized - sorted[end].normalized <= tie_epsilon
        {
            end += 1;
        }
        sorted[start..end].sort_by(|a, b| a.customer_id.cmp(&b.customer_id));
        start = end;
    }

    Ok(sorted
        .into_iter()
        .take(k)
        .enumerate()
        .map(|(i, s)| RankedEntry {
            customer_id: s.customer_id.clone(),
            score: s.normalized,
            rank: i + 1,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CustomerHistory, FeatureRecord, TIE_EPSILON};
    use crate::models::{LinearParams, LinearScorer};

    fn scored(id: &str, normalized: f64) -> ScoredCustomer {
        ScoredCustomer {
            customer_id: id.to_string(),
            raw: normalized,
            normalized,
        }
    }

    fn linear_history(id: &str, features: Vec<f64>) -> CustomerHistory {
        CustomerHistory::from_record(FeatureRecord {
            customer_id: id.to_string(),
            features,
            snapshot_date: None,
        })
    }

    #[test]
    fn output_length_is_min_of_k_and_population() {
        let pop = vec![scored("A", 0.9), scored("B", 0.5), scored("C", 0.1)];
        assert_eq!(rank(&pop, 2, TIE_EPSILON).unwrap().len(), 2);
        assert_eq!(rank(&pop, 3, TIE_EPSILON).unwrap().len(), 3);
        assert_eq!(rank(&pop, 10, TIE_EPSILON).unwrap().len(), 3);
    }

    #[test]
    fn entries_are_strictly_ordered_with_id_tiebreak() {
        let pop = vec![
            scored("Z", 0.5),
            scored("A", 0.5),
            scored("M", 0.9),
            scored("B", 0.1),
        ];
        let entries = rank(&pop, 4, TIE_EPSILON).unwrap();
        let ids: Vec<&str> = entries.iter().map(|e| e.customer_id.as_str()).collect();
        assert_eq!(ids, ["M", "A", "Z", "B"]);

        for pair in entries.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            let ordered = a.score > b.score
                || ((a.score - b.score).abs() <= TIE_EPSILON && a.customer_id < b.customer_id);
            assert!(ordered, "order violated between {a:?} and {b:?}");
        }
    }

    #[test]
    fn ranks_are_one_based_and_sequential() {
        let pop = vec![scored("A", 0.3), scored("B", 0.7)];
        let entries = rank(&pop, 2, TIE_EPSILON).unwrap();
        assert_eq!(entries[0].rank, 1);
        assert_eq!(entries[1].rank, 2);
    }

    #[test]
    fn k_zero_is_invalid() {
        let pop = vec![scored("A", 0.3)];
        let err = rank(&pop, 0, TIE_EPSILON).unwrap_err();
        assert_eq!(err, RequestError::InvalidK(0));
    }

    #[test]
    fn ranking_is_independent_of_input_order() {
        // Three scores spaced 0.9 * epsilon apart: adjacent pairs tie while
        // the extremes do not. Any input arrangement must rank identically.
        let a = scored("A", 0.5);
        let b = scored("B", 0.5 + 0.9e-9);
        let c = scored("C", 0.5 + 1.8e-9);

        let one = rank(&[a.clone(), b.clone(), c.clone()], 3, TIE_EPSILON).unwrap();
        let two = rank(&[b, c, a], 3, TIE_EPSILON).unwrap();

        fn ids(entries: &[RankedEntry]) -> Vec<&str> {
            entries.iter().map(|e| e.customer_id.as_str()).collect()
        }
        assert_eq!(ids(&one), ids(&two));
        assert_eq!(ids(&one), ["B", "C", "A"]);
    }

    #[test]
    fn near_ties_within_epsilon_break_by_id() {
        let eps = 1e-6;
        let pop = vec![scored("B", 0.5), scored("A", 0.5 + 1e-9)];
        let entries = rank(&pop, 2, eps).unwrap();
        assert_eq!(entries[0].customer_id, "A");
    }

    #[test]
    fn score_population_preserves_order_and_collects_exclusions() {
        let scorer = LinearScorer::new(LinearParams {
            weights: vec![1.0, 1.0],
            intercept: 0.0,
        })
        .unwrap();

        let population = vec![
            linear_history("C1", vec![1.0, 2.0]),
            linear_history("C2", vec![1.0]), // wrong length
            linear_history("C3", vec![0.0, 0.0]),
        ];

        let (scored, excluded) = score_population(&scorer, &population, None);
        assert_eq!(scored.len(), 2);
        assert_eq!(scored[0].customer_id, "C1");
        assert_eq!(scored[1].customer_id, "C3");
        assert_eq!(excluded.len(), 1);
        assert_eq!(excluded[0].customer_id, "C2");
        assert_eq!(
            excluded[0].reason,
            ScoreError::SchemaMismatch { expected: 2, got: 1 }
        );
    }

    #[test]
    fn schema_mismatch_population_ranks_the_rest() {
        // 3 records, one with the wrong vector length: the other 2 still get
        // ranked and the bad one is named in the exclusion report.
        let scorer = LinearScorer::new(LinearParams {
            weights: vec![2.0],
            intercept: 0.0,
        })
        .unwrap();
        let population = vec![
            linear_history("C1", vec![1.0]),
            linear_history("C2", vec![1.0, 9.0]),
            linear_history("C3", vec![-1.0]),
        ];

        let (scored, excluded) = score_population(&scorer, &population, None);
        let entries = rank(&scored, 10, TIE_EPSILON).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].customer_id, "C1");
        assert_eq!(entries[1].customer_id, "C3");
        assert_eq!(excluded.len(), 1);
        assert_eq!(excluded[0].customer_id, "C2");
    }

    #[test]
    fn end_to_end_linear_ranking_known_values() {
        // Raw linear scores [2.0, -1.0, 0.0, 0.0, 5.0] with k=3 rank as
        // [5.0, 2.0, first 0.0 by id] with normalized ≈ [0.993, 0.881, 0.5].
        let scorer = LinearScorer::new(LinearParams {
            weights: vec![1.0],
            intercept: 0.0,
        })
        .unwrap();
        let population = vec![
            linear_history("C1", vec![2.0]),
            linear_history("C2", vec![-1.0]),
            linear_history("C3", vec![0.0]),
            linear_history("C4", vec![0.0]),
            linear_history("C5", vec![5.0]),
        ];

        let (scored, excluded) = score_population(&scorer, &population, None);
        assert!(excluded.is_empty());
        let entries = rank(&scored, 3, TIE_EPSILON).unwrap();

        let ids: Vec<&str> = entries.iter().map(|e| e.customer_id.as_str()).collect();
        assert_eq!(ids, ["C5", "C1", "C3"]);
        assert!((entries[0].score - 0.9933071490757153).abs() < 1e-9);
        assert!((entries[1].score - 0.8807970779778823).abs() < 1e-9);
        assert!((entries[2].score - 0.5).abs() < 1e-12);
    }
}
