//! Trace-tree attribution of I/O queries to ORM-issuing methods
//!
//! This is the core of the profiler: a depth-first walk over one request's
//! recorded call tree that classifies the request, resolves I/O-query and
//! ORM-query id references through per-request indexes, and attributes every
//! low-level query to the nearest enclosing ORM call site that has an
//! application-method identity.
//!
//! Attribution rules:
//! - A node's own I/O queries attribute to the *inherited* active
//!   attribution point, never to one the node itself opens.
//! - Only nodes with children can open an attribution point or become the
//!   remembered nearest application frame.
//! - An already-active attribution point is never replaced by a nested ORM
//!   frame; it stays active for the whole subtree and expires on backtrack.
//! - "Session.flush" ORM entries are bookkeeping, not meaningful ORM
//!   activity, and never open an attribution point.
//! - I/O queries issued with no active attribution point are dropped.

use crate::trace_model::{OrmQuery, Query, Request, Trace};
use std::collections::HashMap;
use thiserror::Error;

/// Default package prefix marking frames as application code
pub const DEFAULT_APP_ROOT_PACKAGE: &str = "br.com.ggas";

/// Raw-query text the ORM layer records for session flushes
pub const FLUSH_SENTINEL: &str = "Session.flush";

/// URL suffixes identifying static-asset requests, excluded from attribution
const ASSET_EXTENSIONS: [&str; 4] = [".js", ".htm", ".css", ".jsp"];

/// Request type discriminator for HTTP page interactions
const HTTP_REQUEST_TYPE: &str = "http";

/// Errors for trace attribution
#[derive(Error, Debug)]
pub enum AttributionError {
    #[error("trace references unknown I/O query id {id}")]
    DanglingQueryRef { id: u64 },
}

/// Naming source for a newly opened attribution point
///
/// The recorded traces leave it ambiguous whether an attribution point
/// should carry the name of the nearest enclosing application frame or of
/// the ORM call site itself, so both policies are supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MethodNaming {
    /// Prefer the nearest application frame seen so far; fall back to the
    /// ORM call site when no application ancestor exists
    #[default]
    ApplicationAncestor,
    /// Always the ORM call site's own qualified name
    OrmSite,
}

/// Attribution configuration
#[derive(Debug, Clone)]
pub struct AttributorConfig {
    /// Package prefix that marks a frame as application code
    pub app_root_package: String,
    /// Raw-query text to treat as a non-semantic flush
    pub flush_sentinel: String,
    /// Naming policy for attribution points
    pub naming: MethodNaming,
}

impl Default for AttributorConfig {
    fn default() -> Self {
        Self {
            app_root_package: DEFAULT_APP_ROOT_PACKAGE.to_string(),
            flush_sentinel: FLUSH_SENTINEL.to_string(),
            naming: MethodNaming::default(),
        }
    }
}

/// An attribution point: a method identified as the origin of one or more
/// I/O queries, with the queries attributed to it in traversal order
#[derive(Debug, Clone)]
pub struct QueryMethod<'a> {
    /// Fully-qualified `package.class.method` identifier
    pub name: String,
    /// Attributed queries, in the order they were encountered
    pub queries: Vec<&'a Query>,
}

/// Classify a request as an HTTP page request
///
/// Static-asset fetches (scripts, stylesheets, markup fragments) share the
/// HTTP request type but carry no ORM activity worth attributing.
pub fn is_page_request(request: &Request) -> bool {
    let info = &request.source_info;
    info.request_type == HTTP_REQUEST_TYPE
        && !ASSET_EXTENSIONS.iter().any(|ext| info.url.ends_with(ext))
}

/// Attribute one request's I/O queries to its ORM-issuing methods
///
/// Returns `None` for non-page requests (expected filtering, not an error).
/// For page requests, returns the attribution points in creation order,
/// which equals pre-order traversal order of the call tree.
///
/// # Errors
///
/// Returns [`AttributionError::DanglingQueryRef`] if a trace node lists an
/// I/O query id absent from the request's flat query list.
pub fn attribute_request<'a>(
    request: &'a Request,
    config: &AttributorConfig,
) -> Result<Option<Vec<QueryMethod<'a>>>, AttributionError> {
    if !is_page_request(request) {
        return Ok(None);
    }

    let mut attributor = Attributor::new(request, config);
    attributor.walk(std::slice::from_ref(&request.trace), WalkContext::default())?;
    Ok(Some(attributor.methods))
}

/// Per-branch walk context, passed down by value so sibling subtrees never
/// observe each other's state
#[derive(Debug, Clone, Copy, Default)]
struct WalkContext<'a> {
    /// Deepest application frame seen on the path from the root
    nearest_app: Option<&'a Trace>,
    /// Index into the output list of the active attribution point
    active_method: Option<usize>,
}

struct Attributor<'a, 'c> {
    config: &'c AttributorConfig,
    queries_by_id: HashMap<u64, &'a Query>,
    orm_queries_by_id: HashMap<u64, &'a OrmQuery>,
    methods: Vec<QueryMethod<'a>>,
}

impl<'a, 'c> Attributor<'a, 'c> {
    fn new(request: &'a Request, config: &'c AttributorConfig) -> Self {
        Self {
            config,
            queries_by_id: request.queries.iter().map(|q| (q.id, q)).collect(),
            orm_queries_by_id: request.orm_queries.iter().map(|q| (q.id, q)).collect(),
            methods: Vec::new(),
        }
    }

    /// Pre-order, depth-first, left-to-right walk
    fn walk(
        &mut self,
        nodes: &'a [Trace],
        ctx: WalkContext<'a>,
    ) -> Result<(), AttributionError> {
        for node in nodes {
            // Attribution uses the inherited context: queries listed on the
            // node that opens an attribution point still belong to whatever
            // point was active above it (or to none).
            if let (Some(ids), Some(method_idx)) = (&node.io_query_ids, ctx.active_method) {
                for &id in ids {
                    let query = self
                        .queries_by_id
                        .get(&id)
                        .copied()
                        .ok_or(AttributionError::DanglingQueryRef { id })?;
                    self.methods[method_idx].queries.push(query);
                }
            }

            if let Some(children) = &node.children {
                let mut child_ctx = ctx;

                if child_ctx.active_method.is_none() && self.is_meaningful_orm(node) {
                    child_ctx.active_method = Some(self.open_method(node, ctx.nearest_app));
                }

                if node.package_name.starts_with(&self.config.app_root_package) {
                    child_ctx.nearest_app = Some(node);
                }

                self.walk(children, child_ctx)?;
            }
        }
        Ok(())
    }

    /// True if the node's ORM id resolves to a non-flush ORM query
    ///
    /// An `ormQueryId` absent from the index means the node is not an ORM
    /// call site at all, not malformed input.
    fn is_meaningful_orm(&self, node: &Trace) -> bool {
        node.orm_query_id
            .and_then(|id| self.orm_queries_by_id.get(&id))
            .is_some_and(|orm| orm.raw_query != self.config.flush_sentinel)
    }

    /// Open a new attribution point and append it to the output list;
    /// output order is creation order
    fn open_method(&mut self, orm_site: &'a Trace, nearest_app: Option<&'a Trace>) -> usize {
        let naming_source = match self.config.naming {
            MethodNaming::ApplicationAncestor => nearest_app.unwrap_or(orm_site),
            MethodNaming::OrmSite => orm_site,
        };
        self.methods.push(QueryMethod {
            name: naming_source.qualified_name(),
            queries: Vec::new(),
        });
        self.methods.len() - 1
    }
}
