//! KMeans clustering of methods by query-cost profile
//!
//! Groups feature rows by their numeric columns (query count, rows
//! processed, duration, distinct tables) so methods with similar database
//! cost profiles land in the same cluster. Cluster count is an input, not
//! something this module tries to optimize.

use crate::feature_table::FeatureRow;
use aprender::cluster::KMeans;
use aprender::primitives::Matrix;
use aprender::traits::UnsupervisedEstimator;

/// Number of numeric feature columns used for clustering
const NUM_FEATURES: usize = 4;

/// Result of clustering one request's feature table
#[derive(Debug, Clone)]
pub struct ClusterProfile {
    /// One label per feature row, in row order; empty when the table was
    /// too small to cluster
    pub labels: Vec<usize>,
    /// Number of clusters actually used
    pub num_clusters: usize,
    /// Row count per cluster, indexed by label
    pub populations: Vec<usize>,
}

impl ClusterProfile {
    /// True if clustering was skipped for lack of samples
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Compact `label=count` summary of cluster populations
    pub fn format_summary(&self) -> String {
        self.populations
            .iter()
            .enumerate()
            .map(|(label, count)| format!("{}={}", label, count))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// KMeans analyzer over feature tables
#[derive(Debug)]
pub struct ClusterAnalyzer {
    num_clusters: usize,
}

impl ClusterAnalyzer {
    /// Create an analyzer targeting `num_clusters` clusters
    pub fn new(num_clusters: usize) -> Self {
        Self { num_clusters }
    }

    /// Cluster the numeric columns of the feature table
    ///
    /// The effective k is clamped to the row count. Fewer than 2 rows (or a
    /// k below 2) yields an empty profile rather than an error: a one-row
    /// table has nothing to group.
    pub fn analyze(&self, rows: &[FeatureRow]) -> ClusterProfile {
        let k = self.num_clusters.min(rows.len());
        if k < 2 {
            return ClusterProfile {
                labels: Vec::new(),
                num_clusters: 0,
                populations: Vec::new(),
            };
        }

        let mut features_data: Vec<f32> = Vec::with_capacity(rows.len() * NUM_FEATURES);
        for row in rows {
            features_data.push(row.query_count as f32);
            features_data.push(row.total_rows as f32);
            features_data.push(row.total_duration_secs as f32);
            features_data.push(row.distinct_tables as f32);
        }

        let features = match Matrix::from_vec(rows.len(), NUM_FEATURES, features_data) {
            Ok(m) => m,
            Err(_) => {
                return ClusterProfile {
                    labels: Vec::new(),
                    num_clusters: 0,
                    populations: Vec::new(),
                }
            }
        };

        let mut kmeans = KMeans::new(k);
        if kmeans.fit(&features).is_err() {
            return ClusterProfile {
                labels: Vec::new(),
                num_clusters: 0,
                populations: Vec::new(),
            };
        }
        let labels = kmeans.predict(&features);

        let mut populations = vec![0usize; k];
        for &label in &labels {
            if label < k {
                populations[label] += 1;
            }
        }

        ClusterProfile {
            labels,
            num_clusters: k,
            populations,
        }
    }
}
