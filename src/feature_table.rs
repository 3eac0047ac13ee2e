//! Per-method feature table derived from attribution points
//!
//! Flattens the ordered attribution output into fixed-shape rows suitable
//! for CSV export and clustering. This is the only place durations are
//! converted from microseconds to seconds.

use crate::attribution::QueryMethod;
use std::collections::HashSet;

/// One feature row describing a method's aggregate query cost
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    /// Fully-qualified method identifier
    pub method_name: String,
    /// Number of I/O queries attributed to the method
    pub query_count: usize,
    /// Total rows processed across attributed queries
    pub total_rows: u64,
    /// Total query duration in seconds
    pub total_duration_secs: f64,
    /// Number of distinct table names across attributed queries
    pub distinct_tables: usize,
}

/// Build the feature table from attribution points, preserving their order
pub fn build_feature_table(methods: &[QueryMethod<'_>]) -> Vec<FeatureRow> {
    methods
        .iter()
        .map(|method| {
            let mut total_rows = 0u64;
            let mut total_duration_us = 0u64;
            let mut tables: HashSet<&str> = HashSet::new();

            for query in &method.queries {
                total_rows += query.num_rows_processed;
                total_duration_us += query.duration;
                tables.extend(query.table_names.iter().map(String::as_str));
            }

            FeatureRow {
                method_name: method.name.clone(),
                query_count: method.queries.len(),
                total_rows,
                total_duration_secs: total_duration_us as f64 / 1_000_000.0,
                distinct_tables: tables.len(),
            }
        })
        .collect()
}
