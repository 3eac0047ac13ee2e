//! Data model for recorded web-request trace dumps
//!
//! Mirrors the JSON shape emitted by the request profiler: a top-level
//! `requests` array, each request carrying a nested call tree plus flat
//! lists of low-level I/O queries and ORM query descriptors. Trace nodes
//! reference queries by id only; resolution happens during attribution.

use serde::{Deserialize, Serialize};

/// Top-level shape of a recorded trace dump file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceDump {
    /// All recorded request interactions, in capture order
    pub requests: Vec<Request>,
}

/// One recorded HTTP interaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    /// Request type and URL metadata
    #[serde(rename = "sourceInfo")]
    pub source_info: SourceInfo,
    /// Root frame of the recorded call tree
    pub trace: Trace,
    /// Flat list of low-level I/O query executions, referenced by id
    #[serde(default)]
    pub queries: Vec<Query>,
    /// Flat list of ORM-level query descriptors, referenced by id
    #[serde(rename = "ormQueries", default)]
    pub orm_queries: Vec<OrmQuery>,
}

/// Request classification metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceInfo {
    /// Request type discriminator (e.g., "http")
    #[serde(rename = "type")]
    pub request_type: String,
    /// Requested URL path
    pub url: String,
}

/// One stack frame / call-tree node
///
/// The child list, I/O-query id list, and ORM-query id are all optional on
/// the wire; absence means the frame has no children, issued no I/O queries
/// directly, and is not an ORM call site, respectively.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trace {
    /// Package of the invoked method
    #[serde(rename = "packageName")]
    pub package_name: String,
    /// Class of the invoked method
    #[serde(rename = "className")]
    pub class_name: String,
    /// Method name
    #[serde(rename = "methodName")]
    pub method_name: String,
    /// Child frames, in invocation order
    #[serde(rename = "traces", skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<Trace>>,
    /// Ids of I/O queries issued directly by this frame, in issue order
    #[serde(rename = "ioQueryIdList", skip_serializing_if = "Option::is_none")]
    pub io_query_ids: Option<Vec<u64>>,
    /// Id of the ORM query this frame represents, if it is an ORM call site
    #[serde(rename = "ormQueryId", skip_serializing_if = "Option::is_none")]
    pub orm_query_id: Option<u64>,
}

impl Trace {
    /// Fully-qualified `package.class.method` identifier for this frame
    pub fn qualified_name(&self) -> String {
        format!(
            "{}.{}.{}",
            self.package_name, self.class_name, self.method_name
        )
    }

    /// True if the frame directly lists at least one I/O query id
    pub fn has_io_queries(&self) -> bool {
        self.io_query_ids.as_ref().is_some_and(|ids| !ids.is_empty())
    }
}

/// One low-level I/O query execution with measured cost
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Query {
    /// Unique id within the owning request
    pub id: u64,
    /// Rows processed by this query
    #[serde(rename = "numRowsProcessed")]
    pub num_rows_processed: u64,
    /// Execution duration in microseconds
    pub duration: u64,
    /// Names of tables this query touched
    #[serde(rename = "tableNames", default)]
    pub table_names: Vec<String>,
}

/// One ORM-level query descriptor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrmQuery {
    /// Unique id within the owning request
    pub id: u64,
    /// Raw query text as recorded by the ORM layer
    #[serde(rename = "rawQuery")]
    pub raw_query: String,
}
