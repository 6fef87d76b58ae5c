//! Content entities exposed by the graph
//!
//! Every node entity keeps its local ID out of the schema and exposes the
//! global ID as `id` instead.

use async_graphql::{ComplexObject, Context, Result, SimpleObject, ID};

use crate::global_id::{GlobalId, NodeKind};
use crate::node::NodeRegistry;
use crate::pagination::{Connection, ConnectionArgs, Ordered, Pager};
use crate::types::DateTime;

/// Local ID used for the settings singleton
pub const SETTINGS_ID: &str = "public";

fn global_id(kind: NodeKind, local_id: impl std::fmt::Display) -> ID {
    ID(GlobalId::new(kind, local_id).encode())
}

/// A site user
#[derive(SimpleObject, Debug, Clone, PartialEq, Eq)]
#[graphql(complex)]
pub struct User {
    #[graphql(skip)]
    pub id: String,
    pub login: String,
    pub display_name: String,
}

#[ComplexObject]
impl User {
    pub(crate) async fn id(&self) -> ID {
        global_id(NodeKind::User, &self.id)
    }

    async fn settings(&self, ctx: &Context<'_>) -> Result<Setting> {
        let registry = ctx.data::<NodeRegistry>()?;
        Ok(registry.settings().await?)
    }

    async fn options(
        &self,
        ctx: &Context<'_>,
        first: Option<i32>,
        after: Option<String>,
        last: Option<i32>,
        before: Option<String>,
    ) -> Result<Connection<SiteOption>> {
        let registry = ctx.data::<NodeRegistry>()?;
        let pager = ctx.data::<Pager>()?;
        let args = ConnectionArgs { first, after, last, before };
        Ok(pager.paginate_pending(registry.source().options(), &args).await?)
    }

    /// Posts of one type
    async fn posts(
        &self,
        ctx: &Context<'_>,
        #[graphql(default = "post")] post_type: String,
        first: Option<i32>,
        after: Option<String>,
        last: Option<i32>,
        before: Option<String>,
    ) -> Result<Connection<Post>> {
        let registry = ctx.data::<NodeRegistry>()?;
        let pager = ctx.data::<Pager>()?;
        let args = ConnectionArgs { first, after, last, before };
        Ok(pager.paginate_pending(registry.source().posts(&post_type), &args).await?)
    }

    /// Post or page by slug
    async fn page(&self, ctx: &Context<'_>, post_name: Option<String>) -> Result<Option<Post>> {
        let Some(post_name) = post_name else {
            return Ok(None);
        };
        let registry = ctx.data::<NodeRegistry>()?;
        Ok(registry.post_by_name(&post_name).await?)
    }

    async fn menus(&self, ctx: &Context<'_>, name: Option<String>) -> Result<Option<Menu>> {
        let Some(name) = name else {
            return Ok(None);
        };
        let registry = ctx.data::<NodeRegistry>()?;
        Ok(registry.menu_by_name(&name).await?)
    }

    /// Metadata rows of one post; empty without `postId`
    async fn postmeta(
        &self,
        ctx: &Context<'_>,
        post_id: Option<i64>,
        first: Option<i32>,
        after: Option<String>,
        last: Option<i32>,
        before: Option<String>,
    ) -> Result<Connection<Postmeta>> {
        let registry = ctx.data::<NodeRegistry>()?;
        let pager = ctx.data::<Pager>()?;
        let args = ConnectionArgs { first, after, last, before };
        let Some(post_id) = post_id else {
            return Ok(pager.paginate(Ordered::default(), &args)?);
        };
        Ok(pager
            .paginate_pending(registry.source().postmeta_for_post(post_id), &args)
            .await?)
    }
}

/// Public site settings
#[derive(SimpleObject, Debug, Clone, PartialEq, Eq, Default)]
#[graphql(complex)]
pub struct Setting {
    pub uploads: String,
    pub amazon_s3: bool,
}

#[ComplexObject]
impl Setting {
    pub(crate) async fn id(&self) -> ID {
        global_id(NodeKind::Setting, SETTINGS_ID)
    }
}

/// A row of the options table
#[derive(SimpleObject, Debug, Clone, PartialEq, Eq)]
#[graphql(complex, name = "Option")]
pub struct SiteOption {
    #[graphql(skip)]
    pub option_id: i64,
    pub option_name: String,
    pub option_value: String,
}

#[ComplexObject]
impl SiteOption {
    pub(crate) async fn id(&self) -> ID {
        global_id(NodeKind::Option, self.option_id)
    }
}

/// A post of any post type
#[derive(SimpleObject, Debug, Clone, PartialEq, Eq)]
#[graphql(complex)]
pub struct Post {
    #[graphql(skip)]
    pub id: i64,
    pub post_title: String,
    pub post_content: String,
    pub post_excerpt: String,
    pub post_status: String,
    pub post_type: String,
    pub post_name: String,
    pub post_parent: i64,
    pub menu_order: i32,
    pub post_date: DateTime,
}

#[ComplexObject]
impl Post {
    pub(crate) async fn id(&self) -> ID {
        global_id(NodeKind::Post, self.id)
    }

    /// Metadata rows attached to this post
    async fn post_meta(
        &self,
        ctx: &Context<'_>,
        first: Option<i32>,
        after: Option<String>,
        last: Option<i32>,
        before: Option<String>,
    ) -> Result<Connection<Postmeta>> {
        let registry = ctx.data::<NodeRegistry>()?;
        let pager = ctx.data::<Pager>()?;
        let args = ConnectionArgs { first, after, last, before };
        Ok(pager
            .paginate_pending(registry.source().postmeta_for_post(self.id), &args)
            .await?)
    }
}

/// A post whose type is `page`
#[derive(SimpleObject, Debug, Clone, PartialEq, Eq)]
#[graphql(complex)]
pub struct Page {
    #[graphql(skip)]
    pub id: i64,
    pub post_title: String,
    pub post_content: String,
    pub post_excerpt: String,
    pub post_status: String,
    pub post_name: String,
    pub post_parent: i64,
    pub menu_order: i32,
    pub post_date: DateTime,
}

#[ComplexObject]
impl Page {
    pub(crate) async fn id(&self) -> ID {
        global_id(NodeKind::Page, self.id)
    }
}

impl From<Post> for Page {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            post_title: post.post_title,
            post_content: post.post_content,
            post_excerpt: post.post_excerpt,
            post_status: post.post_status,
            post_name: post.post_name,
            post_parent: post.post_parent,
            menu_order: post.menu_order,
            post_date: post.post_date,
        }
    }
}

/// A metadata row of a post
#[derive(SimpleObject, Debug, Clone, PartialEq, Eq)]
#[graphql(complex)]
pub struct Postmeta {
    #[graphql(skip)]
    pub meta_id: i64,
    pub post_id: i64,
    pub meta_key: String,
    pub meta_value: String,
}

#[ComplexObject]
impl Postmeta {
    pub(crate) async fn id(&self) -> ID {
        global_id(NodeKind::Postmeta, self.meta_id)
    }
}

/// A navigation menu
#[derive(SimpleObject, Debug, Clone, PartialEq, Eq)]
#[graphql(complex)]
pub struct Menu {
    #[graphql(skip)]
    pub id: i64,
    pub name: String,
    pub items: Vec<MenuItem>,
}

#[ComplexObject]
impl Menu {
    pub(crate) async fn id(&self) -> ID {
        global_id(NodeKind::Menu, self.id)
    }
}

/// Entry of a menu, possibly nested
#[derive(SimpleObject, Debug, Clone, PartialEq, Eq)]
#[graphql(complex)]
pub struct MenuItem {
    pub id: i64,
    pub linked_id: i64,
    pub order: i32,
    pub children: Vec<MenuItem>,
}

#[ComplexObject]
impl MenuItem {
    /// The post this entry links to
    async fn navitem(&self, ctx: &Context<'_>) -> Result<Option<Post>> {
        let registry = ctx.data::<NodeRegistry>()?;
        Ok(registry.post(self.linked_id).await?)
    }
}
