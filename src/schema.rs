//! Query root for the content graph
//!
//! The registry and pager live in schema data, so every resolver reaches the
//! same immutable configuration.

use std::sync::Arc;

use async_graphql::{Context, EmptyMutation, EmptySubscription, Object, Result, Schema, ID};

use crate::config::GraphConfig;
use crate::entities::User;
use crate::node::{Node, NodeRegistry};
use crate::pagination::Pager;
use crate::source::ContentSource;

/// Content graph schema
pub type ContentSchema = Schema<ContentQuery, EmptyMutation, EmptySubscription>;

/// Build the schema over a content source
pub fn build_schema(
    source: Arc<dyn ContentSource>,
    config: &GraphConfig,
) -> crate::Result<ContentSchema> {
    config.pagination.validate()?;
    let registry = NodeRegistry::new(source, &config.registry)?;
    let pager = Pager::new(config.pagination.clone());
    Ok(Schema::build(ContentQuery, EmptyMutation, EmptySubscription)
        .data(registry)
        .data(pager)
        .finish())
}

pub struct ContentQuery;

#[Object]
impl ContentQuery {
    /// Fetch any node by global ID
    async fn node(&self, ctx: &Context<'_>, id: ID) -> Result<Option<Node>> {
        let registry = ctx.data::<NodeRegistry>()?;
        Ok(registry.resolve(&id).await?)
    }

    async fn viewer(&self, ctx: &Context<'_>) -> Result<Option<User>> {
        let registry = ctx.data::<NodeRegistry>()?;
        Ok(registry.viewer().await?)
    }
}
