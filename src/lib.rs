//! Ormscope - ORM query-cost profiler for recorded web-request traces
//!
//! This library ingests a recorded request trace (a tree of nested method
//! call frames annotated with database-access metadata) and produces, per
//! HTTP page request, a feature table describing which application methods
//! triggered ORM activity and what that activity cost (query count, rows
//! processed, duration, distinct tables). The table feeds an unsupervised
//! clustering step that groups methods by query-cost profile.

pub mod attribution;
pub mod cli;
pub mod cluster_profile;
pub mod csv_output;
pub mod feature_table;
pub mod trace_model;
