//! CLI argument parsing for Ormscope

use crate::attribution::{MethodNaming, DEFAULT_APP_ROOT_PACKAGE};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Naming source for attribution points
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum NamingPolicy {
    /// Name attribution points after the nearest enclosing application
    /// frame, falling back to the ORM call site (default)
    ApplicationAncestor,
    /// Name attribution points after the ORM call site itself
    OrmSite,
}

impl From<NamingPolicy> for MethodNaming {
    fn from(policy: NamingPolicy) -> Self {
        match policy {
            NamingPolicy::ApplicationAncestor => MethodNaming::ApplicationAncestor,
            NamingPolicy::OrmSite => MethodNaming::OrmSite,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "ormscope")]
#[command(version)]
#[command(about = "ORM query-cost profiler for recorded web-request traces", long_about = None)]
pub struct Cli {
    /// Recorded trace dump (JSON) to analyze
    pub input: PathBuf,

    /// Where to write the per-method feature table CSV
    #[arg(short = 'o', long = "output", default_value = "result.csv")]
    pub output: PathBuf,

    /// Where to write the cluster assignment CSV
    #[arg(long = "clusters-output", default_value = "clusters.csv")]
    pub clusters_output: PathBuf,

    /// Number of KMeans clusters (clamped to the number of methods)
    #[arg(short = 'k', long = "clusters", default_value = "8")]
    pub num_clusters: usize,

    /// Package prefix that marks trace frames as application code
    #[arg(long = "app-root", default_value = DEFAULT_APP_ROOT_PACKAGE)]
    pub app_root_package: String,

    /// Naming source for attribution points
    #[arg(long = "naming", value_enum, default_value = "application-ancestor")]
    pub naming: NamingPolicy,

    /// Enable debug logging to stderr
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}
