//! In-memory content source
//!
//! Holds every table in plain vectors. Used for tests, fixtures and local
//! development; lists come back ordered by primary key.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use crate::entities::{Menu, MenuItem, Page, Post, Postmeta, Setting, SiteOption, User};
use crate::pagination::Ordered;
use crate::source::{ContentSource, FetchResult};

#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    users: BTreeMap<String, User>,
    viewer: Option<String>,
    settings: Setting,
    options: BTreeMap<i64, SiteOption>,
    posts: BTreeMap<i64, Post>,
    postmeta: BTreeMap<i64, Postmeta>,
    menus: BTreeMap<i64, Menu>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, user: User) -> Self {
        self.users.insert(user.id.clone(), user);
        self
    }

    /// Make an already added user the viewer
    pub fn with_viewer(mut self, id: impl Into<String>) -> Self {
        self.viewer = Some(id.into());
        self
    }

    pub fn with_settings(mut self, settings: Setting) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_option(mut self, option: SiteOption) -> Self {
        self.options.insert(option.option_id, option);
        self
    }

    pub fn with_post(mut self, post: Post) -> Self {
        self.posts.insert(post.id, post);
        self
    }

    pub fn with_postmeta(mut self, meta: Postmeta) -> Self {
        self.postmeta.insert(meta.meta_id, meta);
        self
    }

    pub fn with_menu(mut self, menu: Menu) -> Self {
        self.menus.insert(menu.id, menu);
        self
    }

    /// A small site: one user, a few posts and pages, options, metadata and
    /// a main menu
    pub fn fixture() -> Self {
        let mut source = Self::new()
            .with_user(User {
                id: "1".to_string(),
                login: "admin".to_string(),
                display_name: "Site Admin".to_string(),
            })
            .with_viewer("1")
            .with_settings(Setting {
                uploads: "https://cdn.example.com/uploads".to_string(),
                amazon_s3: true,
            });

        let posts = [
            (1, "Hello world", "hello-world", "post"),
            (2, "About", "about", "page"),
            (3, "Second post", "second-post", "post"),
            (4, "Contact", "contact", "page"),
            (5, "Third post", "third-post", "post"),
        ];
        for (id, title, name, post_type) in posts {
            source = source.with_post(fixture_post(id, title, name, post_type));
        }

        let options = [
            (1, "blogname", "Example"),
            (2, "blogdescription", "Just a site"),
            (3, "posts_per_page", "10"),
        ];
        for (id, name, value) in options {
            source = source.with_option(SiteOption {
                option_id: id,
                option_name: name.to_string(),
                option_value: value.to_string(),
            });
        }

        let postmeta = [
            (1, 1, "hero", "a.png"),
            (2, 1, "layout", "wide"),
            (3, 2, "layout", "narrow"),
        ];
        for (meta_id, post_id, key, value) in postmeta {
            source = source.with_postmeta(Postmeta {
                meta_id,
                post_id,
                meta_key: key.to_string(),
                meta_value: value.to_string(),
            });
        }

        source.with_menu(Menu {
            id: 1,
            name: "main".to_string(),
            items: vec![
                MenuItem {
                    id: 10,
                    linked_id: 2,
                    order: 1,
                    children: vec![MenuItem {
                        id: 11,
                        linked_id: 4,
                        order: 1,
                        children: Vec::new(),
                    }],
                },
                MenuItem {
                    id: 12,
                    linked_id: 1,
                    order: 2,
                    children: Vec::new(),
                },
            ],
        })
    }
}

fn fixture_post(id: i64, title: &str, name: &str, post_type: &str) -> Post {
    Post {
        id,
        post_title: title.to_string(),
        post_content: format!("<p>{}</p>", title),
        post_excerpt: String::new(),
        post_status: "publish".to_string(),
        post_type: post_type.to_string(),
        post_name: name.to_string(),
        post_parent: 0,
        menu_order: 0,
        post_date: Utc
            .timestamp_opt(1_460_000_000 + id * 86_400, 0)
            .single()
            .unwrap_or_default()
            .into(),
    }
}

/// Local IDs of numeric tables; anything else names no row
fn numeric(id: &str) -> Option<i64> {
    id.parse().ok()
}

#[async_trait]
impl ContentSource for InMemorySource {
    async fn user(&self, id: &str) -> FetchResult<Option<User>> {
        Ok(self.users.get(id).cloned())
    }

    async fn viewer(&self) -> FetchResult<Option<User>> {
        Ok(self.viewer.as_ref().and_then(|id| self.users.get(id)).cloned())
    }

    async fn settings(&self) -> FetchResult<Setting> {
        Ok(self.settings.clone())
    }

    async fn option(&self, id: &str) -> FetchResult<Option<SiteOption>> {
        Ok(numeric(id).and_then(|id| self.options.get(&id)).cloned())
    }

    async fn options(&self) -> FetchResult<Ordered<SiteOption>> {
        Ok(Ordered::presorted(self.options.values().cloned().collect()))
    }

    async fn page(&self, id: &str) -> FetchResult<Option<Page>> {
        Ok(numeric(id)
            .and_then(|id| self.posts.get(&id))
            .filter(|post| post.post_type == "page")
            .cloned()
            .map(Page::from))
    }

    async fn post(&self, id: &str) -> FetchResult<Option<Post>> {
        Ok(numeric(id).and_then(|id| self.posts.get(&id)).cloned())
    }

    async fn post_by_name(&self, name: &str) -> FetchResult<Option<Post>> {
        Ok(self.posts.values().find(|post| post.post_name == name).cloned())
    }

    async fn posts(&self, post_type: &str) -> FetchResult<Ordered<Post>> {
        let posts = self
            .posts
            .values()
            .filter(|post| post.post_type == post_type)
            .cloned()
            .collect();
        Ok(Ordered::presorted(posts))
    }

    async fn postmeta(&self, id: &str) -> FetchResult<Option<Postmeta>> {
        Ok(numeric(id).and_then(|id| self.postmeta.get(&id)).cloned())
    }

    async fn postmeta_for_post(&self, post_id: i64) -> FetchResult<Ordered<Postmeta>> {
        let rows = self
            .postmeta
            .values()
            .filter(|meta| meta.post_id == post_id)
            .cloned()
            .collect();
        Ok(Ordered::presorted(rows))
    }

    async fn menu(&self, id: &str) -> FetchResult<Option<Menu>> {
        Ok(numeric(id).and_then(|id| self.menus.get(&id)).cloned())
    }

    async fn menu_by_name(&self, name: &str) -> FetchResult<Option<Menu>> {
        Ok(self.menus.values().find(|menu| menu.name == name).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_posts_filtered_and_ordered() {
        let source = InMemorySource::fixture();
        let ids: Vec<i64> = source.posts("post").await.unwrap().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 3, 5]);
        let pages: Vec<i64> = source.posts("page").await.unwrap().iter().map(|p| p.id).collect();
        assert_eq!(pages, vec![2, 4]);
    }

    #[tokio::test]
    async fn test_page_requires_page_type() {
        let source = InMemorySource::fixture();
        assert_eq!(source.page("2").await.unwrap().map(|p| p.post_name), Some("about".to_string()));
        assert_eq!(source.page("1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_non_numeric_ids_find_nothing() {
        let source = InMemorySource::fixture();
        assert_eq!(source.post("abc").await.unwrap(), None);
        assert_eq!(source.menu("").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_viewer() {
        let source = InMemorySource::fixture();
        assert_eq!(source.viewer().await.unwrap().map(|u| u.login), Some("admin".to_string()));
        assert_eq!(InMemorySource::new().viewer().await.unwrap(), None);
    }
}
