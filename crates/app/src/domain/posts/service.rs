//! Posts service.

use std::cmp::Reverse;

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use rustc_hash::FxHashMap;
use tokio::sync::RwLock;
use tracing::info;

use crate::{
    domain::{
        Page,
        posts::{
            errors::PostsServiceError,
            models::{NewPost, Post, PostStatus, PostUpdate, PostUuid},
        },
    },
    slugs::{slugify, unique_slug},
};

/// Posts held in process memory.
#[derive(Debug, Default)]
pub struct InMemoryPostsService {
    posts: RwLock<FxHashMap<PostUuid, Post>>,
}

impl InMemoryPostsService {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    async fn set_status(
        &self,
        post: PostUuid,
        status: PostStatus,
    ) -> Result<Post, PostsServiceError> {
        let mut posts = self.posts.write().await;

        let existing = posts.get_mut(&post).ok_or(PostsServiceError::NotFound)?;
        let now = Timestamp::now();

        existing.status = status;
        existing.updated_at = now;

        if status == PostStatus::Published && existing.published_at.is_none() {
            existing.published_at = Some(now);
        }

        info!(slug = %existing.slug, ?status, "post status changed");

        Ok(existing.clone())
    }
}

fn slug_for(posts: &FxHashMap<PostUuid, Post>, title: &str, except: Option<PostUuid>) -> String {
    unique_slug(&slugify(title), |candidate| {
        posts
            .values()
            .any(|post| post.slug == candidate && Some(post.uuid) != except)
    })
}

#[async_trait]
impl PostsService for InMemoryPostsService {
    async fn create(&self, post: NewPost) -> Result<Post, PostsServiceError> {
        if post.title.trim().is_empty() {
            return Err(PostsServiceError::MissingRequiredData("title"));
        }

        let mut posts = self.posts.write().await;
        let now = Timestamp::now();

        let created = Post {
            uuid: PostUuid::new(),
            slug: slug_for(&posts, &post.title, None),
            title: post.title.trim().to_string(),
            excerpt: post.excerpt,
            content: post.content,
            cover_image: post.cover_image,
            author: post.author,
            tags: post.tags,
            status: PostStatus::Draft,
            published_at: None,
            created_at: now,
            updated_at: now,
        };

        posts.insert(created.uuid, created.clone());

        Ok(created)
    }

    async fn get_by_id(&self, post: PostUuid) -> Result<Post, PostsServiceError> {
        self.posts
            .read()
            .await
            .get(&post)
            .cloned()
            .ok_or(PostsServiceError::NotFound)
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Post, PostsServiceError> {
        self.posts
            .read()
            .await
            .values()
            .find(|post| post.slug == slug)
            .cloned()
            .ok_or(PostsServiceError::NotFound)
    }

    async fn list(
        &self,
        status: Option<PostStatus>,
        page: usize,
        page_size: usize,
    ) -> Result<Page<Post>, PostsServiceError> {
        let mut posts: Vec<Post> = self
            .posts
            .read()
            .await
            .values()
            .filter(|post| status.is_none_or(|status| post.status == status))
            .cloned()
            .collect();

        posts.sort_by_key(|post| {
            Reverse((post.published_at.unwrap_or(post.created_at), post.uuid))
        });

        Ok(Page::paginate(posts, page, page_size))
    }

    async fn update(&self, post: PostUuid, update: PostUpdate) -> Result<Post, PostsServiceError> {
        let mut posts = self.posts.write().await;

        let slug = match update.title.as_deref() {
            Some(title) if title.trim().is_empty() => {
                return Err(PostsServiceError::MissingRequiredData("title"));
            }
            Some(title) => Some(slug_for(&posts, title, Some(post))),
            None => None,
        };

        let existing = posts.get_mut(&post).ok_or(PostsServiceError::NotFound)?;

        if let Some(title) = update.title {
            existing.title = title.trim().to_string();
        }

        if let Some(slug) = slug {
            existing.slug = slug;
        }

        if let Some(excerpt) = update.excerpt {
            existing.excerpt = excerpt;
        }

        if let Some(content) = update.content {
            existing.content = content;
        }

        if let Some(cover_image) = update.cover_image {
            existing.cover_image = cover_image;
        }

        if let Some(tags) = update.tags {
            existing.tags = tags;
        }

        existing.updated_at = Timestamp::now();

        Ok(existing.clone())
    }

    async fn delete(&self, post: PostUuid) -> Result<(), PostsServiceError> {
        self.posts
            .write()
            .await
            .remove(&post)
            .map(|_| ())
            .ok_or(PostsServiceError::NotFound)
    }

    async fn publish(&self, post: PostUuid) -> Result<Post, PostsServiceError> {
        self.set_status(post, PostStatus::Published).await
    }

    async fn archive(&self, post: PostUuid) -> Result<Post, PostsServiceError> {
        self.set_status(post, PostStatus::Archived).await
    }
}

#[automock]
#[async_trait]
pub trait PostsService: Send + Sync {
    /// Create a draft post with a unique slug derived from its title.
    async fn create(&self, post: NewPost) -> Result<Post, PostsServiceError>;

    /// Retrieve a single post.
    async fn get_by_id(&self, post: PostUuid) -> Result<Post, PostsServiceError>;

    /// Retrieve a post by its URL slug.
    async fn get_by_slug(&self, slug: &str) -> Result<Post, PostsServiceError>;

    /// List one page of posts, most recently published first.
    async fn list(
        &self,
        status: Option<PostStatus>,
        page: usize,
        page_size: usize,
    ) -> Result<Page<Post>, PostsServiceError>;

    /// Update a post.
    async fn update(&self, post: PostUuid, update: PostUpdate) -> Result<Post, PostsServiceError>;

    /// Delete a post.
    async fn delete(&self, post: PostUuid) -> Result<(), PostsServiceError>;

    /// Publish a post.
    async fn publish(&self, post: PostUuid) -> Result<Post, PostsServiceError>;

    /// Archive a post.
    async fn archive(&self, post: PostUuid) -> Result<Post, PostsServiceError>;
}
