//! # pleme-content-graph
//!
//! Relay node identity and connection pagination for the Pleme content graph.
//!
//! ## Features
//!
//! - **Global IDs** - Type-tagged, reversible node identifiers
//! - **Node Registry** - Resolve any global ID back to its entity
//! - **Cursor Pagination** - Relay-style connections over ordered collections
//! - **Mutation Envelope** - `clientMutationId` pass-through
//! - **Schema** - `node` / `viewer` query root over a [`ContentSource`]
//!
//! ## Usage
//!
//! ```rust
//! use pleme_content_graph::{ConnectionArgs, Ordered, Pager};
//!
//! let pager = Pager::default();
//! let args = ConnectionArgs { first: Some(2), ..Default::default() };
//! let connection = pager.paginate(Ordered::sorted(vec![3, 1, 2]), &args).unwrap();
//! assert_eq!(connection.edges.len(), 2);
//! assert!(connection.page_info.has_next_page);
//! ```

pub mod config;
pub mod entities;
pub mod global_id;
pub mod memory;
pub mod mutation;
pub mod node;
pub mod pagination;
pub mod schema;
pub mod source;
pub mod types;

pub use config::{GraphConfig, PagerConfig, RegistryConfig};
pub use entities::{Menu, MenuItem, Page, Post, Postmeta, Setting, SiteOption, User};
pub use global_id::{GlobalId, NodeKind};
pub use memory::InMemorySource;
pub use mutation::MutationEnvelope;
pub use node::{Node, NodeRegistry};
pub use pagination::{Connection, ConnectionArgs, CursorCodec, Edge, Ordered, PageInfo, Pager};
pub use schema::{build_schema, ContentQuery, ContentSchema};
pub use source::{BoxError, ContentSource, FetchResult};
pub use types::DateTime;

use thiserror::Error;

/// Content graph errors
///
/// "Not found" is never an error: resolvers return `Ok(None)` for it.
#[derive(Error, Debug)]
pub enum GraphQLError {
    #[error("Invalid type tag: {0}")]
    InvalidTag(String),

    #[error("Malformed identifier: {0}")]
    MalformedIdentifier(String),

    #[error("Unknown type tag: {0}")]
    UnknownTag(String),

    #[error("Invalid cursor: {0}")]
    InvalidCursor(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Upstream fetch failed: {0}")]
    Upstream(#[source] BoxError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for content graph operations
pub type Result<T> = std::result::Result<T, GraphQLError>;
