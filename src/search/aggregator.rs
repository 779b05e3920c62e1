//! Merging of per-type result sets

use crate::models::{ResultRecord, ResultType};

/// Flatten per-type results into one sequence, keeping type order and
/// the order inside each type. Nothing is deduplicated.
pub fn aggregate(per_type: Vec<(ResultType, Vec<ResultRecord>)>) -> Vec<ResultRecord> {
    let total = per_type.iter().map(|(_, records)| records.len()).sum();
    let mut merged = Vec::with_capacity(total);
    for (_, records) in per_type {
        merged.extend(records);
    }
    merged
}
