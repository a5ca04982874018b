//! Population CSV ingest.
//!
//! Turns the feature pipeline's CSV export into ordered per-customer
//! histories that are safe to score.
//!
//! Design goals:
//! - **Strict schema** for required columns (clear errors + exit code 2)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Deterministic behavior** (customer order = first appearance, snapshots
//!   sorted by date with a stable fallback to file order)
//! - **Separation of concerns**: no scoring logic here. Feature-vector
//!   length against a fitted schema is the scorer's invariant, so ragged
//!   rows pass through and surface as `SchemaMismatch` exclusions
//!
//! Expected header: `customer_id`, optional `snapshot_date`, then the
//! feature columns in schema order.

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use chrono::NaiveDate;
use csv::StringRecord;

use crate::domain::{CustomerHistory, FeatureRecord};
use crate::error::RequestError;

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub id: Option<String>,
    pub message: String,
}

/// Ingest output: grouped histories + feature names + row errors.
#[derive(Debug, Clone)]
pub struct IngestedPopulation {
    pub population: Vec<CustomerHistory>,
    /// Feature column names, in schema order.
    pub feature_names: Vec<String>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    pub rows_used: usize,
}

/// Load and group a population CSV into per-customer histories.
pub fn load_population_csv(path: &Path) -> Result<IngestedPopulation, RequestError> {
    let file = File::open(path).map_err(|e| {
        RequestError::Io(format!(
            "Failed to open population CSV '{}': {e}",
            path.display()
        ))
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| RequestError::Io(format!("Failed to read CSV headers: {e}")))?
        .clone();

    let layout = resolve_layout(&headers)?;

    let mut rows: Vec<(String, FeatureRecord)> = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2: records() starts after the header row and CSV lines are 1-based.
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    id: None,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(&record, &layout) {
            Ok(parsed) => rows.push((parsed.customer_id.clone(), parsed)),
            Err((id, message)) => row_errors.push(RowError { line, id, message }),
        }
    }

    let rows_used = rows.len();
    let population = group_by_customer(rows);
    if population.is_empty() {
        return Err(RequestError::EmptyPopulation);
    }

    Ok(IngestedPopulation {
        population,
        feature_names: layout.feature_names,
        row_errors,
        rows_read,
        rows_used,
    })
}

struct Layout {
    id_idx: usize,
    date_idx: Option<usize>,
    /// (column index, column name) of each feature, in file order.
    feature_cols: Vec<usize>,
    feature_names: Vec<String>,
}

fn resolve_layout(headers: &StringRecord) -> Result<Layout, RequestError> {
    let mut id_idx = None;
    let mut date_idx = None;
    let mut feature_cols = Vec::new();
    let mut feature_names = Vec::new();

    for (idx, name) in headers.iter().enumerate() {
        match normalize_header_name(name).as_str() {
            "customer_id" => id_idx = Some(idx),
            "snapshot_date" => date_idx = Some(idx),
            other if !other.is_empty() => {
                feature_cols.push(idx);
                feature_names.push(other.to_string());
            }
            _ => {}
        }
    }

    let Some(id_idx) = id_idx else {
        return Err(RequestError::Config(
            "Missing required column: `customer_id`".to_string(),
        ));
    };
    if feature_cols.is_empty() {
        return Err(RequestError::Config(
            "Population CSV has no feature columns.".to_string(),
        ));
    }

    Ok(Layout {
        id_idx,
        date_idx,
        feature_cols,
        feature_names,
    })
}

fn normalize_header_name(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on
    // the first header. If we don't strip it, schema validation incorrectly
    // reports `customer_id` as missing.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn parse_row(
    record: &StringRecord,
    layout: &Layout,
) -> Result<FeatureRecord, (Option<String>, String)> {
    let customer_id = record
        .get(layout.id_idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or((None, "Missing required value: `customer_id`".to_string()))?
        .to_string();

    let snapshot_date = match layout.date_idx {
        Some(idx) => match record.get(idx).map(str::trim).filter(|s| !s.is_empty()) {
            Some(s) => Some(
                parse_date(s).map_err(|msg| (Some(customer_id.clone()), msg))?,
            ),
            None => None,
        },
        None => None,
    };

    let mut features = Vec::with_capacity(layout.feature_cols.len());
    for (col, name) in layout.feature_cols.iter().zip(&layout.feature_names) {
        // Flexible CSVs may have short rows; stop at the first absent cell so
        // the resulting (too short) vector reaches the scorer's schema check.
        let Some(cell) = record.get(*col).map(str::trim).filter(|s| !s.is_empty()) else {
            break;
        };
        let value: f64 = cell.parse().map_err(|_| {
            (
                Some(customer_id.clone()),
                format!("Invalid numeric value '{cell}' in column `{name}`."),
            )
        })?;
        if !value.is_finite() {
            return Err((
                Some(customer_id.clone()),
                format!("Non-finite value in column `{name}`."),
            ));
        }
        features.push(value);
    }

    Ok(FeatureRecord {
        customer_id,
        features,
        snapshot_date,
    })
}

fn group_by_customer(rows: Vec<(String, FeatureRecord)>) -> Vec<CustomerHistory> {
    let mut order: Vec<String> = Vec::new();
    let mut grouped: HashMap<String, Vec<FeatureRecord>> = HashMap::new();

    for (id, record) in rows {
        grouped
            .entry(id.clone())
            .or_insert_with(|| {
                order.push(id);
                Vec::new()
            })
            .push(record);
    }

    order
        .into_iter()
        .map(|id| {
            let mut snapshots = grouped.remove(&id).unwrap_or_default();
            // Stable sort: dated snapshots order chronologically, undated ones
            // keep their file order.
            snapshots.sort_by(|a, b| match (a.snapshot_date, b.snapshot_date) {
                (Some(x), Some(y)) => x.cmp(&y),
                _ => std::cmp::Ordering::Equal,
            });
            CustomerHistory {
                customer_id: id,
                snapshots,
            }
        })
        .collect()
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    // ISO dates are recommended, but feature pipeline exports often use
    // `DD/MM/YYYY` or `DD-MM-YYYY`. Accept a small set of common formats to
    // reduce friction while keeping parsing deterministic.
    const FMTS: [&str; 4] = ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%Y/%m/%d"];
    for fmt in FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    Err(format!(
        "Invalid date '{s}'. Expected one of: YYYY-MM-DD, DD/MM/YYYY, DD-MM-YYYY, YYYY/MM/DD."
    ))
}
