// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Weight record model for storage and API.

use serde::{Deserialize, Serialize};

/// Stored weight record in Firestore.
///
/// Records are never updated in place; corrections are delete + recreate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightRecord {
    /// Document ID (generated at creation)
    pub id: String,
    /// Owning cat's document ID. Immutable.
    pub cat_id: String,
    /// Weight in kilograms, always > 0, stored to full input precision
    pub weight: f64,
    /// Measurement date pinned to 12:00:00 UTC (RFC3339)
    pub date: String,
    /// Free-text note, if any
    pub note: Option<String>,
    /// When the record was created (RFC3339)
    pub created_at: String,
}

/// Latest/previous weight summary for a cat.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(ts_rs::TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct WeightSummary {
    pub latest: Option<f64>,
    pub previous: Option<f64>,
    /// latest - previous, when both exist
    pub diff: Option<f64>,
    pub record_count: u32,
}

/// Compute the latest/previous summary from records sorted newest-first.
pub fn weight_summary(weights: &[WeightRecord]) -> WeightSummary {
    let latest = weights.first().map(|w| w.weight);
    let previous = weights.get(1).map(|w| w.weight);
    let diff = match (latest, previous) {
        (Some(l), Some(p)) => Some(l - p),
        _ => None,
    };

    WeightSummary {
        latest,
        previous,
        diff,
        record_count: weights.len() as u32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(weight: f64, date: &str) -> WeightRecord {
        WeightRecord {
            id: format!("w-{date}"),
            cat_id: "cat-1".to_string(),
            weight,
            date: date.to_string(),
            note: None,
            created_at: date.to_string(),
        }
    }

    #[test]
    fn summary_of_two_records() {
        // Owner records 4.50kg on day 1 and 4.30kg on day 2
        let weights = vec![
            record(4.30, "2025-01-02T12:00:00Z"),
            record(4.50, "2025-01-01T12:00:00Z"),
        ];

        let summary = weight_summary(&weights);
        assert_eq!(summary.latest, Some(4.30));
        assert_eq!(summary.previous, Some(4.50));
        assert!((summary.diff.unwrap() - (-0.20)).abs() < 1e-9);
        assert_eq!(summary.record_count, 2);
    }

    #[test]
    fn summary_of_single_record() {
        let weights = vec![record(3.75, "2025-01-01T12:00:00Z")];

        let summary = weight_summary(&weights);
        assert_eq!(summary.latest, Some(3.75));
        assert_eq!(summary.previous, None);
        assert_eq!(summary.diff, None);
    }

    #[test]
    fn summary_of_empty_list() {
        let summary = weight_summary(&[]);
        assert_eq!(summary.latest, None);
        assert_eq!(summary.diff, None);
        assert_eq!(summary.record_count, 0);
    }

    #[test]
    fn weight_round_trips_at_full_precision() {
        let rec = record(4.123456789, "2025-01-01T12:00:00Z");
        let json = serde_json::to_string(&rec).unwrap();
        let back: WeightRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.weight, 4.123456789);
    }
}
