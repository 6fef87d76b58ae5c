//! Node registry
//!
//! Resolves global IDs to entities and tells which kind an entity is. The set
//! of kinds is the closed [`NodeKind`] enum, so every resolvable kind is also
//! classifiable; [`RegistryConfig`] only narrows which of them are served.

use std::sync::Arc;

use async_graphql::{Interface, ID};
use tracing::{debug, info, warn};

use crate::config::RegistryConfig;
use crate::entities::{Menu, Page, Post, Postmeta, Setting, SiteOption, User, SETTINGS_ID};
use crate::global_id::{self, GlobalId, NodeKind};
use crate::source::{BoxError, ContentSource};
use crate::{GraphQLError, Result};

/// Any entity reachable through a global ID
///
/// Exposed as the Relay `Node` interface; every variant's `id` is its
/// global ID.
#[derive(Interface, Debug, Clone, PartialEq)]
#[graphql(field(name = "id", ty = "ID", desc = "Global identifier of the node"))]
pub enum Node {
    User(User),
    Setting(Setting),
    Option(SiteOption),
    Page(Page),
    Post(Post),
    Postmeta(Postmeta),
    Menu(Menu),
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::User(_) => NodeKind::User,
            Node::Setting(_) => NodeKind::Setting,
            Node::Option(_) => NodeKind::Option,
            Node::Page(_) => NodeKind::Page,
            Node::Post(_) => NodeKind::Post,
            Node::Postmeta(_) => NodeKind::Postmeta,
            Node::Menu(_) => NodeKind::Menu,
        }
    }

    pub fn local_id(&self) -> String {
        match self {
            Node::User(user) => user.id.clone(),
            Node::Setting(_) => SETTINGS_ID.to_string(),
            Node::Option(option) => option.option_id.to_string(),
            Node::Page(page) => page.id.to_string(),
            Node::Post(post) => post.id.to_string(),
            Node::Postmeta(meta) => meta.meta_id.to_string(),
            Node::Menu(menu) => menu.id.to_string(),
        }
    }

    pub fn global_id(&self) -> GlobalId {
        GlobalId::new(self.kind(), self.local_id())
    }
}

pub(crate) fn upstream(error: BoxError) -> GraphQLError {
    warn!(error = %error, "Content source call failed");
    GraphQLError::Upstream(error)
}

/// Immutable registry over a content source
#[derive(Clone)]
pub struct NodeRegistry {
    source: Arc<dyn ContentSource>,
    config: Arc<RegistryConfig>,
}

impl std::fmt::Debug for NodeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeRegistry")
            .field("kinds", &self.config.kinds)
            .finish_non_exhaustive()
    }
}

impl NodeRegistry {
    /// Create a registry, rejecting inconsistent configuration up front
    pub fn new(source: Arc<dyn ContentSource>, config: &RegistryConfig) -> Result<Self> {
        config.validate()?;
        info!(kinds = ?config.kinds, "Node registry ready");
        Ok(Self {
            source,
            config: Arc::new(config.clone()),
        })
    }

    pub fn source(&self) -> &dyn ContentSource {
        self.source.as_ref()
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Resolve a global ID
    ///
    /// Malformed IDs and unknown tags are errors and are reported before the
    /// source is called. A well-formed ID naming nothing is `Ok(None)`.
    pub async fn resolve(&self, global_id: &str) -> Result<Option<Node>> {
        let id = global_id::decode(global_id).inspect_err(|e| {
            warn!(global_id, error = %e, "Rejected global id");
        })?;
        if !self.config.accepts(&id) {
            debug!(kind = %id.kind, "Kind not served by this registry");
            return Ok(None);
        }
        self.fetch(id.kind, &id.local_id).await
    }

    /// Fetch a node by kind and local ID, skipping the decode step
    pub async fn fetch(&self, kind: NodeKind, local_id: &str) -> Result<Option<Node>> {
        debug!(%kind, local_id, "Fetching node");
        let source = self.source();
        let node = match kind {
            NodeKind::User => source.user(local_id).await.map_err(upstream)?.map(Node::User),
            NodeKind::Setting => Some(Node::Setting(source.settings().await.map_err(upstream)?)),
            NodeKind::Option => source.option(local_id).await.map_err(upstream)?.map(Node::Option),
            NodeKind::Page => source.page(local_id).await.map_err(upstream)?.map(Node::Page),
            NodeKind::Post => source.post(local_id).await.map_err(upstream)?.map(Node::Post),
            NodeKind::Postmeta => source
                .postmeta(local_id)
                .await
                .map_err(upstream)?
                .map(Node::Postmeta),
            NodeKind::Menu => source.menu(local_id).await.map_err(upstream)?.map(Node::Menu),
        };
        if node.is_none() {
            debug!(%kind, local_id, "Node not found");
        }
        Ok(node)
    }

    /// Kind of a resolved node, if this registry serves it
    pub fn classify(&self, node: &Node) -> Option<NodeKind> {
        let kind = node.kind();
        self.config.is_enabled(kind).then_some(kind)
    }

    pub async fn viewer(&self) -> Result<Option<User>> {
        self.source.viewer().await.map_err(upstream)
    }

    pub async fn settings(&self) -> Result<Setting> {
        self.source.settings().await.map_err(upstream)
    }

    pub async fn post(&self, id: i64) -> Result<Option<Post>> {
        self.source.post(&id.to_string()).await.map_err(upstream)
    }

    pub async fn post_by_name(&self, name: &str) -> Result<Option<Post>> {
        self.source.post_by_name(name).await.map_err(upstream)
    }

    pub async fn menu_by_name(&self, name: &str) -> Result<Option<Menu>> {
        self.source.menu_by_name(name).await.map_err(upstream)
    }
}
