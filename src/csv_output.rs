//! CSV output for the feature table and cluster assignments

use crate::feature_table::FeatureRow;

/// Header row of the feature table CSV
const FEATURE_HEADER: &str = "method,query_count,rows_processed,duration_secs,distinct_tables";

/// Header row of the cluster assignment CSV
const CLUSTER_HEADER: &str = "method,cluster";

/// Escape CSV field (handle commas, quotes, newlines)
fn escape_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Render the feature table as CSV
///
/// An empty table renders as the header row alone, keeping the column shape
/// stable for downstream consumers.
pub fn feature_table_to_csv(rows: &[FeatureRow]) -> String {
    let mut output = String::new();
    output.push_str(FEATURE_HEADER);
    output.push('\n');

    for row in rows {
        output.push_str(&format!(
            "{},{},{},{:.6},{}\n",
            escape_field(&row.method_name),
            row.query_count,
            row.total_rows,
            row.total_duration_secs,
            row.distinct_tables
        ));
    }

    output
}

/// Render one cluster label per feature row as CSV
///
/// Callers must pass one label per row; rows and labels are zipped in order.
pub fn cluster_assignments_to_csv(rows: &[FeatureRow], labels: &[usize]) -> String {
    let mut output = String::new();
    output.push_str(CLUSTER_HEADER);
    output.push('\n');

    for (row, label) in rows.iter().zip(labels.iter()) {
        output.push_str(&format!("{},{}\n", escape_field(&row.method_name), label));
    }

    output
}
