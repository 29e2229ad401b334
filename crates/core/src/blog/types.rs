use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::{build_key, CompositeKey, Item, KeyError, RepositoryError, Value};

use super::entity::{
    get_bool, get_datetime, get_optional_datetime, get_optional_string, get_string,
    get_string_map, get_string_set, get_u64, put, put_optional, string_map_value,
};
use super::{Collection, Entity};

// ============================================================================
// Category
// ============================================================================

/// A top-level category. Keyed by its own id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Category {
    pub fn key_for(id: &str) -> Result<CompositeKey, KeyError> {
        build_key(id, None)
    }
}

impl Entity for Category {
    const COLLECTION: Collection = Collection::Categories;
    const IMMUTABLE_FIELDS: &'static [&'static str] = &["id", "createdAt"];

    fn key(&self) -> Result<CompositeKey, KeyError> {
        Self::key_for(&self.id)
    }

    fn to_item(&self) -> Item {
        let mut item = Item::new();
        put(&mut item, "id", self.id.as_str());
        put(&mut item, "name", self.name.as_str());
        put(&mut item, "slug", self.slug.as_str());
        put_optional(&mut item, "description", self.description.as_deref());
        put(&mut item, "createdAt", self.created_at.to_rfc3339());
        put(&mut item, "updatedAt", self.updated_at.to_rfc3339());
        item
    }

    fn from_item(item: &Item) -> Result<Self, RepositoryError> {
        Ok(Self {
            id: get_string(item, "id")?,
            name: get_string(item, "name")?,
            slug: get_string(item, "slug")?,
            description: get_optional_string(item, "description")?,
            created_at: get_datetime(item, "createdAt")?,
            updated_at: get_datetime(item, "updatedAt")?,
        })
    }
}

// ============================================================================
// Subcategory
// ============================================================================

/// A subcategory, stored under its parent category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subcategory {
    pub category_id: String,
    pub subcategory_id: String,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Subcategory {
    pub fn key_for(category_id: &str, subcategory_id: &str) -> Result<CompositeKey, KeyError> {
        build_key(category_id, Some(subcategory_id))
    }
}

impl Entity for Subcategory {
    const COLLECTION: Collection = Collection::Subcategories;
    const IMMUTABLE_FIELDS: &'static [&'static str] =
        &["categoryId", "subcategoryId", "createdAt"];

    fn key(&self) -> Result<CompositeKey, KeyError> {
        Self::key_for(&self.category_id, &self.subcategory_id)
    }

    fn to_item(&self) -> Item {
        let mut item = Item::new();
        put(&mut item, "categoryId", self.category_id.as_str());
        put(&mut item, "subcategoryId", self.subcategory_id.as_str());
        put(&mut item, "name", self.name.as_str());
        put(&mut item, "slug", self.slug.as_str());
        put_optional(&mut item, "description", self.description.as_deref());
        put(&mut item, "createdAt", self.created_at.to_rfc3339());
        put(&mut item, "updatedAt", self.updated_at.to_rfc3339());
        item
    }

    fn from_item(item: &Item) -> Result<Self, RepositoryError> {
        Ok(Self {
            category_id: get_string(item, "categoryId")?,
            subcategory_id: get_string(item, "subcategoryId")?,
            name: get_string(item, "name")?,
            slug: get_string(item, "slug")?,
            description: get_optional_string(item, "description")?,
            created_at: get_datetime(item, "createdAt")?,
            updated_at: get_datetime(item, "updatedAt")?,
        })
    }
}

// ============================================================================
// Author
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub id: String,
    pub name: String,
    pub email: String,
    pub bio: Option<String>,
    /// Network name to profile URL.
    pub social_links: BTreeMap<String, String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Author {
    pub fn key_for(id: &str) -> Result<CompositeKey, KeyError> {
        build_key(id, None)
    }
}

impl Entity for Author {
    const COLLECTION: Collection = Collection::Authors;
    const IMMUTABLE_FIELDS: &'static [&'static str] = &["id", "createdAt"];

    fn key(&self) -> Result<CompositeKey, KeyError> {
        Self::key_for(&self.id)
    }

    fn to_item(&self) -> Item {
        let mut item = Item::new();
        put(&mut item, "id", self.id.as_str());
        put(&mut item, "name", self.name.as_str());
        put(&mut item, "email", self.email.as_str());
        put_optional(&mut item, "bio", self.bio.as_deref());
        put(&mut item, "socialLinks", string_map_value(&self.social_links));
        put(&mut item, "createdAt", self.created_at.to_rfc3339());
        put(&mut item, "updatedAt", self.updated_at.to_rfc3339());
        item
    }

    fn from_item(item: &Item) -> Result<Self, RepositoryError> {
        Ok(Self {
            id: get_string(item, "id")?,
            name: get_string(item, "name")?,
            email: get_string(item, "email")?,
            bio: get_optional_string(item, "bio")?,
            social_links: get_string_map(item, "socialLinks")?,
            created_at: get_datetime(item, "createdAt")?,
            updated_at: get_datetime(item, "updatedAt")?,
        })
    }
}

// ============================================================================
// Post
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Draft,
    Published,
    Archived,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Published => "published",
            PostStatus::Archived => "archived",
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostStatus {
    type Err = RepositoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(PostStatus::Draft),
            "published" => Ok(PostStatus::Published),
            "archived" => Ok(PostStatus::Archived),
            _ => Err(RepositoryError::InvalidData(format!(
                "Invalid post status: {s}"
            ))),
        }
    }
}

impl From<PostStatus> for Value {
    fn from(status: PostStatus) -> Self {
        Value::from(status.as_str())
    }
}

/// A post, stored under its author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub author_id: String,
    pub post_id: String,
    pub title: String,
    pub slug: String,
    pub summary: Option<String>,
    pub category_id: Option<String>,
    pub subcategory_id: Option<String>,
    pub tags: BTreeSet<String>,
    pub status: PostStatus,
    pub views: u64,
    pub featured: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    pub fn key_for(author_id: &str, post_id: &str) -> Result<CompositeKey, KeyError> {
        build_key(author_id, Some(post_id))
    }
}

impl Entity for Post {
    const COLLECTION: Collection = Collection::Posts;
    const IMMUTABLE_FIELDS: &'static [&'static str] = &["authorId", "postId", "createdAt"];

    fn key(&self) -> Result<CompositeKey, KeyError> {
        Self::key_for(&self.author_id, &self.post_id)
    }

    fn to_item(&self) -> Item {
        let mut item = Item::new();
        put(&mut item, "authorId", self.author_id.as_str());
        put(&mut item, "postId", self.post_id.as_str());
        put(&mut item, "title", self.title.as_str());
        put(&mut item, "slug", self.slug.as_str());
        put_optional(&mut item, "summary", self.summary.as_deref());
        put_optional(&mut item, "categoryId", self.category_id.as_deref());
        put_optional(&mut item, "subcategoryId", self.subcategory_id.as_deref());
        // An empty string set is not representable on the wide-column wire.
        if !self.tags.is_empty() {
            put(&mut item, "tags", self.tags.clone());
        }
        put(&mut item, "status", self.status);
        put(&mut item, "views", self.views);
        put(&mut item, "featured", self.featured);
        put_optional(&mut item, "publishedAt", self.published_at.map(|t| t.to_rfc3339()));
        put(&mut item, "createdAt", self.created_at.to_rfc3339());
        put(&mut item, "updatedAt", self.updated_at.to_rfc3339());
        item
    }

    fn from_item(item: &Item) -> Result<Self, RepositoryError> {
        Ok(Self {
            author_id: get_string(item, "authorId")?,
            post_id: get_string(item, "postId")?,
            title: get_string(item, "title")?,
            slug: get_string(item, "slug")?,
            summary: get_optional_string(item, "summary")?,
            category_id: get_optional_string(item, "categoryId")?,
            subcategory_id: get_optional_string(item, "subcategoryId")?,
            tags: get_string_set(item, "tags")?,
            status: get_string(item, "status")?.parse()?,
            views: get_u64(item, "views")?,
            featured: get_bool(item, "featured")?,
            published_at: get_optional_datetime(item, "publishedAt")?,
            created_at: get_datetime(item, "createdAt")?,
            updated_at: get_datetime(item, "updatedAt")?,
        })
    }
}

// ============================================================================
// Comment
// ============================================================================

/// A reader comment, stored under its post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub post_id: String,
    pub comment_id: String,
    pub author_name: String,
    pub content: String,
    pub approved: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    pub fn key_for(post_id: &str, comment_id: &str) -> Result<CompositeKey, KeyError> {
        build_key(post_id, Some(comment_id))
    }
}

impl Entity for Comment {
    const COLLECTION: Collection = Collection::Comments;
    const IMMUTABLE_FIELDS: &'static [&'static str] = &["postId", "commentId", "createdAt"];

    fn key(&self) -> Result<CompositeKey, KeyError> {
        Self::key_for(&self.post_id, &self.comment_id)
    }

    fn to_item(&self) -> Item {
        let mut item = Item::new();
        put(&mut item, "postId", self.post_id.as_str());
        put(&mut item, "commentId", self.comment_id.as_str());
        put(&mut item, "authorName", self.author_name.as_str());
        put(&mut item, "content", self.content.as_str());
        put(&mut item, "approved", self.approved);
        put(&mut item, "createdAt", self.created_at.to_rfc3339());
        put(&mut item, "updatedAt", self.updated_at.to_rfc3339());
        item
    }

    fn from_item(item: &Item) -> Result<Self, RepositoryError> {
        Ok(Self {
            post_id: get_string(item, "postId")?,
            comment_id: get_string(item, "commentId")?,
            author_name: get_string(item, "authorName")?,
            content: get_string(item, "content")?,
            approved: get_bool(item, "approved")?,
            created_at: get_datetime(item, "createdAt")?,
            updated_at: get_datetime(item, "updatedAt")?,
        })
    }
}

// ============================================================================
// User
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Admin,
    Editor,
    #[default]
    Author,
    Subscriber,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "ADMIN",
            UserRole::Editor => "EDITOR",
            UserRole::Author => "AUTHOR",
            UserRole::Subscriber => "SUBSCRIBER",
        }
    }
}

impl FromStr for UserRole {
    type Err = RepositoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADMIN" => Ok(UserRole::Admin),
            "EDITOR" => Ok(UserRole::Editor),
            "AUTHOR" => Ok(UserRole::Author),
            "SUBSCRIBER" => Ok(UserRole::Subscriber),
            _ => Err(RepositoryError::InvalidData(format!("Invalid user role: {s}"))),
        }
    }
}

impl From<UserRole> for Value {
    fn from(role: UserRole) -> Self {
        Value::from(role.as_str())
    }
}

/// A platform user profile. Keyed by its own id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub name: String,
    pub avatar: Option<String>,
    pub bio: Option<String>,
    pub website: Option<String>,
    pub social_links: BTreeMap<String, String>,
    pub role: UserRole,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn key_for(id: &str) -> Result<CompositeKey, KeyError> {
        build_key(id, None)
    }
}

impl Entity for User {
    const COLLECTION: Collection = Collection::Users;
    const IMMUTABLE_FIELDS: &'static [&'static str] = &["id", "createdAt"];

    fn key(&self) -> Result<CompositeKey, KeyError> {
        Self::key_for(&self.id)
    }

    fn to_item(&self) -> Item {
        let mut item = Item::new();
        put(&mut item, "id", self.id.as_str());
        put(&mut item, "username", self.username.as_str());
        put(&mut item, "email", self.email.as_str());
        put(&mut item, "name", self.name.as_str());
        put_optional(&mut item, "avatar", self.avatar.as_deref());
        put_optional(&mut item, "bio", self.bio.as_deref());
        put_optional(&mut item, "website", self.website.as_deref());
        put(&mut item, "socialLinks", string_map_value(&self.social_links));
        put(&mut item, "role", self.role);
        put(&mut item, "isActive", self.is_active);
        put(&mut item, "createdAt", self.created_at.to_rfc3339());
        put(&mut item, "updatedAt", self.updated_at.to_rfc3339());
        item
    }

    fn from_item(item: &Item) -> Result<Self, RepositoryError> {
        Ok(Self {
            id: get_string(item, "id")?,
            username: get_string(item, "username")?,
            email: get_string(item, "email")?,
            name: get_string(item, "name")?,
            avatar: get_optional_string(item, "avatar")?,
            bio: get_optional_string(item, "bio")?,
            website: get_optional_string(item, "website")?,
            social_links: get_string_map(item, "socialLinks")?,
            role: get_string(item, "role")?.parse()?,
            is_active: get_bool(item, "isActive")?,
            created_at: get_datetime(item, "createdAt")?,
            updated_at: get_datetime(item, "updatedAt")?,
        })
    }
}

// ============================================================================
// Notification
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationType {
    NewComment,
    NewLike,
    NewFollower,
    PostPublished,
    Mention,
    System,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::NewComment => "NEW_COMMENT",
            NotificationType::NewLike => "NEW_LIKE",
            NotificationType::NewFollower => "NEW_FOLLOWER",
            NotificationType::PostPublished => "POST_PUBLISHED",
            NotificationType::Mention => "MENTION",
            NotificationType::System => "SYSTEM",
        }
    }
}

impl FromStr for NotificationType {
    type Err = RepositoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NEW_COMMENT" => Ok(NotificationType::NewComment),
            "NEW_LIKE" => Ok(NotificationType::NewLike),
            "NEW_FOLLOWER" => Ok(NotificationType::NewFollower),
            "POST_PUBLISHED" => Ok(NotificationType::PostPublished),
            "MENTION" => Ok(NotificationType::Mention),
            "SYSTEM" => Ok(NotificationType::System),
            _ => Err(RepositoryError::InvalidData(format!(
                "Invalid notification type: {s}"
            ))),
        }
    }
}

impl From<NotificationType> for Value {
    fn from(kind: NotificationType) -> Self {
        Value::from(kind.as_str())
    }
}

/// A notification, stored under the user it is addressed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub user_id: String,
    pub notification_id: String,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub title: String,
    pub message: String,
    pub link: Option<String>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Notification {
    pub fn key_for(user_id: &str, notification_id: &str) -> Result<CompositeKey, KeyError> {
        build_key(user_id, Some(notification_id))
    }
}

impl Entity for Notification {
    const COLLECTION: Collection = Collection::Notifications;
    const IMMUTABLE_FIELDS: &'static [&'static str] =
        &["userId", "notificationId", "type", "createdAt"];

    fn key(&self) -> Result<CompositeKey, KeyError> {
        Self::key_for(&self.user_id, &self.notification_id)
    }

    fn to_item(&self) -> Item {
        let mut item = Item::new();
        put(&mut item, "userId", self.user_id.as_str());
        put(&mut item, "notificationId", self.notification_id.as_str());
        put(&mut item, "type", self.kind);
        put(&mut item, "title", self.title.as_str());
        put(&mut item, "message", self.message.as_str());
        put_optional(&mut item, "link", self.link.as_deref());
        put(&mut item, "isRead", self.is_read);
        put(&mut item, "createdAt", self.created_at.to_rfc3339());
        put(&mut item, "updatedAt", self.updated_at.to_rfc3339());
        item
    }

    fn from_item(item: &Item) -> Result<Self, RepositoryError> {
        Ok(Self {
            user_id: get_string(item, "userId")?,
            notification_id: get_string(item, "notificationId")?,
            kind: get_string(item, "type")?.parse()?,
            title: get_string(item, "title")?,
            message: get_string(item, "message")?,
            link: get_optional_string(item, "link")?,
            is_read: get_bool(item, "isRead")?,
            created_at: get_datetime(item, "createdAt")?,
            updated_at: get_datetime(item, "updatedAt")?,
        })
    }
}
