//! Export ranking results to CSV or JSON.
//!
//! CSV is row-per-customer for spreadsheets and downstream scripts; JSON
//! mirrors the structured response the request layer serves (model, count,
//! results, exclusions).

use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::domain::{ModelId, RankedEntry};
use crate::error::RequestError;
use crate::rank::Exclusion;

/// The structured (JSON) export document.
#[derive(Debug, Clone, Serialize)]
pub struct RankingExport {
    pub model: ModelId,
    pub top_k: usize,
    pub count: usize,
    pub results: Vec<RankedEntry>,
    pub excluded: Vec<ExcludedCustomer>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExcludedCustomer {
    pub customer_id: String,
    pub reason: String,
}

impl RankingExport {
    pub fn new(
        model: ModelId,
        top_k: usize,
        entries: &[RankedEntry],
        excluded: &[Exclusion],
    ) -> Self {
        Self {
            model,
            top_k,
            count: entries.len(),
            results: entries.to_vec(),
            excluded: excluded
                .iter()
                .map(|e| ExcludedCustomer {
                    customer_id: e.customer_id.clone(),
                    reason: e.reason.to_string(),
                })
                .collect(),
        }
    }
}

/// Write the ranked list to a CSV file.
pub fn write_ranking_csv(path: &Path, entries: &[RankedEntry]) -> Result<(), RequestError> {
    let mut file = File::create(path).map_err(|e| {
        RequestError::Io(format!(
            "Failed to create export CSV '{}': {e}",
            path.display()
        ))
    })?;

    writeln!(file, "rank,customer_id,score")
        .map_err(|e| RequestError::Io(format!("Failed to write export CSV header: {e}")))?;

    for entry in entries {
        writeln!(
            file,
            "{},{},{:.10}",
            entry.rank, entry.customer_id, entry.score
        )
        .map_err(|e| RequestError::Io(format!("Failed to write export CSV row: {e}")))?;
    }

    Ok(())
}

/// Write a population to CSV in the ingest schema
/// (`customer_id`, `snapshot_date`, feature columns). Used by `ipr gen`.
pub fn write_population_csv(
    path: &Path,
    population: &[crate::domain::CustomerHistory],
    n_features: usize,
) -> Result<(), RequestError> {
    let mut file = File::create(path).map_err(|e| {
        RequestError::Io(format!(
            "Failed to create population CSV '{}': {e}",
            path.display()
        ))
    })?;

    let mut header = String::from("customer_id,snapshot_date");
    for i in 0..n_features {
        header.push_str(&format!(",f{i}"));
    }
    writeln!(file, "{header}")
        .map_err(|e| RequestError::Io(format!("Failed to write population CSV header: {e}")))?;

    for history in population {
        for record in &history.snapshots {
            let date = record
                .snapshot_date
                .map(|d| d.to_string())
                .unwrap_or_default();
            let features: Vec<String> =
                record.features.iter().map(|v| format!("{v:.10}")).collect();
            writeln!(file, "{},{},{}", history.customer_id, date, features.join(","))
                .map_err(|e| RequestError::Io(format!("Failed to write population CSV row: {e}")))?;
        }
    }

    Ok(())
}

/// Write the structured ranking document to a JSON file.
pub fn write_ranking_json(path: &Path, export: &RankingExport) -> Result<(), RequestError> {
    let file = File::create(path).map_err(|e| {
        RequestError::Io(format!(
            "Failed to create export JSON '{}': {e}",
            path.display()
        ))
    })?;
    serde_json::to_writer_pretty(file, export)
        .map_err(|e| RequestError::Io(format!("Failed to write export JSON: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScoreError;

    fn entries() -> Vec<RankedEntry> {
        vec![
            RankedEntry {
                customer_id: "C5".to_string(),
                score: 0.99,
                rank: 1,
            },
            RankedEntry {
                customer_id: "C1".to_string(),
                score: 0.88,
                rank: 2,
            },
        ]
    }

    #[test]
    fn csv_export_is_row_per_customer() {
        let dir = std::env::temp_dir().join("ipr-export-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("ranking.csv");

        write_ranking_csv(&path, &entries()).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines[0], "rank,customer_id,score");
        assert!(lines[1].starts_with("1,C5,0.99"));
        assert_eq!(lines.len(), 3);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn json_export_carries_exclusions() {
        let excluded = vec![Exclusion {
            customer_id: "C9".to_string(),
            reason: ScoreError::SchemaMismatch { expected: 4, got: 2 },
        }];
        let export = RankingExport::new(ModelId::Linear, 10, &entries(), &excluded);
        let json = serde_json::to_string(&export).unwrap();
        assert!(json.contains("\"model\":\"linear\""));
        assert!(json.contains("\"count\":2"));
        assert!(json.contains("C9"));
        assert!(json.contains("Schema mismatch"));
    }
}
