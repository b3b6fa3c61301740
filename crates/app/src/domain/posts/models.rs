//! Blog Post Models

use biuty::uuids::TypedUuid;
use jiff::Timestamp;

/// Post UUID
pub type PostUuid = TypedUuid<Post>;

/// Publication status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PostStatus {
    Draft,
    Published,
    Archived,
}

/// Blog post
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    pub uuid: PostUuid,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub content: String,
    pub cover_image: Option<String>,
    pub author: String,
    pub tags: Vec<String>,
    pub status: PostStatus,

    /// First time the post was published; kept through archive and re-publish
    pub published_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// New Post Model
#[derive(Debug, Clone, PartialEq)]
pub struct NewPost {
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub cover_image: Option<String>,
    pub author: String,
    pub tags: Vec<String>,
}

/// Post Update Model
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostUpdate {
    pub title: Option<String>,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    pub cover_image: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
}
