use anyhow::{Context, Result};
use clap::Parser;
use ormscope::attribution::{attribute_request, AttributorConfig, FLUSH_SENTINEL};
use ormscope::cli::Cli;
use ormscope::cluster_profile::ClusterAnalyzer;
use ormscope::csv_output;
use ormscope::feature_table::{build_feature_table, FeatureRow};
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(verbose: bool) {
    if verbose {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

/// Print aggregate totals for one page request's feature table
fn print_totals(rows: &[FeatureRow]) {
    let total_queries: usize = rows.iter().map(|r| r.query_count).sum();
    let total_rows: u64 = rows.iter().map(|r| r.total_rows).sum();
    let total_duration: f64 = rows.iter().map(|r| r.total_duration_secs).sum();

    println!("Queries: {}", total_queries);
    println!("Rows: {}", total_rows);
    println!("Duration: {:.6}s", total_duration);
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.verbose);

    let raw = std::fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read trace dump {}", args.input.display()))?;
    let dump: ormscope::trace_model::TraceDump = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse trace dump {}", args.input.display()))?;

    let config = AttributorConfig {
        app_root_package: args.app_root_package.clone(),
        flush_sentinel: FLUSH_SENTINEL.to_string(),
        naming: args.naming.into(),
    };
    let analyzer = ClusterAnalyzer::new(args.num_clusters);

    tracing::debug!(requests = dump.requests.len(), "loaded trace dump");

    for request in &dump.requests {
        let url = &request.source_info.url;
        let Some(methods) = attribute_request(request, &config)? else {
            tracing::debug!(%url, "skipping non-page request");
            continue;
        };

        tracing::debug!(%url, methods = methods.len(), "attributed page request");

        let rows = build_feature_table(&methods);
        print_totals(&rows);

        std::fs::write(&args.output, csv_output::feature_table_to_csv(&rows))
            .with_context(|| format!("failed to write {}", args.output.display()))?;

        let profile = analyzer.analyze(&rows);
        if !profile.is_empty() {
            println!("Clusters: {}", profile.format_summary());
            std::fs::write(
                &args.clusters_output,
                csv_output::cluster_assignments_to_csv(&rows, &profile.labels),
            )
            .with_context(|| format!("failed to write {}", args.clusters_output.display()))?;
        } else {
            tracing::debug!(%url, "too few methods to cluster");
        }
    }

    Ok(())
}
