//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the scoring/ranking code stays clean and testable
//! - output changes are localized (important for future snapshot tests)

use crate::domain::{ModelId, RankRequest, RankedEntry};
use crate::io::ingest::RowError;
use crate::rank::RankOutcome;

/// Format the run summary (request + population + scoring counts).
pub fn format_run_summary(
    request: &RankRequest,
    population_size: usize,
    outcome: &RankOutcome,
) -> String {
    let mut out = String::new();

    out.push_str("=== ipr - Investor Propensity Ranking ===\n");
    out.push_str(&format!("Model: {}\n", request.model));
    out.push_str(&format!("Top-K: {}\n", request.top_k));
    if let Some(h) = request.horizon_days {
        out.push_str(&format!("Horizon: {h:.0} days\n"));
    }
    out.push_str(&format!(
        "Population: n={population_size} | scored={} | excluded={}\n",
        outcome.scored.len(),
        outcome.excluded.len()
    ));
    out.push('\n');

    out
}

/// Format the ranked table.
pub fn format_ranking(entries: &[RankedEntry]) -> String {
    let mut out = String::new();

    out.push_str(&format!("{:>5} {:<24} {:>10}\n", "rank", "customer_id", "score"));
    out.push_str(&format!("{:->5} {:-<24} {:->10}\n", "", "", ""));
    for entry in entries {
        out.push_str(&format!(
            "{:>5} {:<24} {:>10.6}\n",
            entry.rank,
            truncate(&entry.customer_id, 24),
            entry.score
        ));
    }

    out
}

/// Format the exclusion report (empty string when nothing was excluded).
pub fn format_exclusions(outcome: &RankOutcome) -> String {
    if outcome.excluded.is_empty() {
        return String::new();
    }

    let mut out = String::new();
    out.push_str(&format!("Excluded ({}):\n", outcome.excluded.len()));
    for exclusion in &outcome.excluded {
        out.push_str(&format!(
            "- {}: {}\n",
            truncate(&exclusion.customer_id, 24),
            exclusion.reason
        ));
    }
    out
}

/// Format ingest row errors (empty string when the file was clean).
pub fn format_row_errors(row_errors: &[RowError]) -> String {
    if row_errors.is_empty() {
        return String::new();
    }

    let mut out = String::new();
    out.push_str(&format!("Skipped rows ({}):\n", row_errors.len()));
    for err in row_errors {
        match &err.id {
            Some(id) => out.push_str(&format!("- line {} ({}): {}\n", err.line, id, err.message)),
            None => out.push_str(&format!("- line {}: {}\n", err.line, err.message)),
        }
    }
    out
}

/// Format per-model rankings side by side for `ipr compare`.
///
/// Each column is one model's ranked list; diffing columns by eye (or with
/// standard text tooling) is the production form of the old "compare model
/// outputs across approaches" workflow.
pub fn format_compare(rankings: &[(ModelId, Vec<RankedEntry>)]) -> String {
    let mut out = String::new();

    out.push_str(&format!("{:>5}", "rank"));
    for (model, _) in rankings {
        out.push_str(&format!(" | {:<32}", model.display_name()));
    }
    out.push('\n');
    out.push_str(&format!("{:->5}", ""));
    for _ in rankings {
        out.push_str(&format!("-|-{:-<32}", ""));
    }
    out.push('\n');

    let depth = rankings.iter().map(|(_, e)| e.len()).max().unwrap_or(0);
    for i in 0..depth {
        out.push_str(&format!("{:>5}", i + 1));
        for (_, entries) in rankings {
            match entries.get(i) {
                Some(e) => out.push_str(&format!(
                    " | {:<22} {:>9.6}",
                    truncate(&e.customer_id, 22),
                    e.score
                )),
                None => out.push_str(&format!(" | {:<32}", "")),
            }
        }
        out.push('\n');
    }

    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScoreError;
    use crate::rank::{Exclusion, ScoredCustomer};

    fn outcome() -> RankOutcome {
        RankOutcome {
            entries: vec![
                RankedEntry {
                    customer_id: "CUST-0005".to_string(),
                    score: 0.993307,
                    rank: 1,
                },
                RankedEntry {
                    customer_id: "CUST-0001".to_string(),
                    score: 0.880797,
                    rank: 2,
                },
            ],
            scored: vec![
                ScoredCustomer {
                    customer_id: "CUST-0005".to_string(),
                    raw: 5.0,
                    normalized: 0.993307,
                },
                ScoredCustomer {
                    customer_id: "CUST-0001".to_string(),
                    raw: 2.0,
                    normalized: 0.880797,
                },
            ],
            excluded: vec![Exclusion {
                customer_id: "CUST-0009".to_string(),
                reason: ScoreError::SchemaMismatch { expected: 8, got: 3 },
            }],
        }
    }

    #[test]
    fn summary_reports_counts() {
        let request = RankRequest {
            model: ModelId::Linear,
            top_k: 2,
            horizon_days: None,
        };
        let text = format_run_summary(&request, 3, &outcome());
        assert!(text.contains("Model: linear"));
        assert!(text.contains("scored=2"));
        assert!(text.contains("excluded=1"));
    }

    #[test]
    fn ranking_table_lists_entries_in_order() {
        let text = format_ranking(&outcome().entries);
        let pos5 = text.find("CUST-0005").unwrap();
        let pos1 = text.find("CUST-0001").unwrap();
        assert!(pos5 < pos1);
    }

    #[test]
    fn exclusion_report_names_the_customer_and_reason() {
        let text = format_exclusions(&outcome());
        assert!(text.contains("CUST-0009"));
        assert!(text.contains("Schema mismatch"));
    }

    #[test]
    fn compare_view_has_one_column_per_model() {
        let rankings = vec![
            (ModelId::Linear, outcome().entries),
            (ModelId::Survival, vec![]),
        ];
        let text = format_compare(&rankings);
        assert!(text.contains("linear"));
        assert!(text.contains("survival"));
    }
}
