//! API request types for blog operations.
//!
//! Create requests turn into entities; update requests turn into a [`Patch`]
//! where an omitted field stays undefined and an explicit JSON `null` on a
//! nullable field clears it.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::storage::{Patch, Value};

use super::entity::string_map_value;
use super::types::{
    Author, Category, Comment, Notification, NotificationType, Post, PostStatus, Subcategory,
    User, UserRole,
};

/// Deserialize a present field (including `null`) as `Some(..)` so that it
/// can be told apart from an omitted one.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn set_nullable(patch: Patch, field: &str, value: Option<Option<String>>) -> Patch {
    match value {
        None => patch.set_optional::<Value>(field, None),
        Some(None) => patch.set(field, Value::Null),
        Some(Some(s)) => patch.set(field, s),
    }
}

/// Lowercase, ASCII alphanumerics separated by single dashes.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

// ============================================================================
// Category
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryRequest {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl CreateCategoryRequest {
    pub fn into_category(self, now: DateTime<Utc>) -> Category {
        Category {
            id: new_id(),
            slug: self.slug.unwrap_or_else(|| slugify(&self.name)),
            name: self.name,
            description: self.description,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoryRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
}

impl From<UpdateCategoryRequest> for Patch {
    fn from(request: UpdateCategoryRequest) -> Self {
        let patch = Patch::new()
            .set_optional("name", request.name)
            .set_optional("slug", request.slug);
        set_nullable(patch, "description", request.description)
    }
}

// ============================================================================
// Subcategory
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubcategoryRequest {
    /// Generated when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory_id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl CreateSubcategoryRequest {
    pub fn into_subcategory(self, category_id: &str, now: DateTime<Utc>) -> Subcategory {
        Subcategory {
            category_id: category_id.to_string(),
            subcategory_id: self.subcategory_id.unwrap_or_else(new_id),
            slug: self.slug.unwrap_or_else(|| slugify(&self.name)),
            name: self.name,
            description: self.description,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSubcategoryRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
}

impl From<UpdateSubcategoryRequest> for Patch {
    fn from(request: UpdateSubcategoryRequest) -> Self {
        let patch = Patch::new()
            .set_optional("name", request.name)
            .set_optional("slug", request.slug);
        set_nullable(patch, "description", request.description)
    }
}

// ============================================================================
// Author
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAuthorRequest {
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default)]
    pub social_links: BTreeMap<String, String>,
}

impl CreateAuthorRequest {
    pub fn into_author(self, now: DateTime<Utc>) -> Author {
        Author {
            id: new_id(),
            name: self.name,
            email: self.email,
            bio: self.bio,
            social_links: self.social_links,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAuthorRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub bio: Option<Option<String>>,
    #[serde(default)]
    pub social_links: Option<BTreeMap<String, String>>,
}

impl From<UpdateAuthorRequest> for Patch {
    fn from(request: UpdateAuthorRequest) -> Self {
        let patch = Patch::new()
            .set_optional("name", request.name)
            .set_optional("email", request.email)
            .set_optional(
                "socialLinks",
                request.social_links.as_ref().map(string_map_value),
            );
        set_nullable(patch, "bio", request.bio)
    }
}

// ============================================================================
// Post
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory_id: Option<String>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub status: PostStatus,
    #[serde(default)]
    pub featured: bool,
}

impl CreatePostRequest {
    /// Post ids are always generated: comments are keyed by post id alone,
    /// so it must be unique across authors.
    pub fn into_post(self, author_id: &str, now: DateTime<Utc>) -> Post {
        Post {
            author_id: author_id.to_string(),
            post_id: new_id(),
            slug: self.slug.unwrap_or_else(|| slugify(&self.title)),
            title: self.title,
            summary: self.summary,
            category_id: self.category_id,
            subcategory_id: self.subcategory_id,
            tags: self.tags,
            published_at: (self.status == PostStatus::Published).then_some(now),
            status: self.status,
            views: 0,
            featured: self.featured,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub summary: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub category_id: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub subcategory_id: Option<Option<String>>,
    #[serde(default)]
    pub tags: Option<BTreeSet<String>>,
    #[serde(default)]
    pub status: Option<PostStatus>,
    #[serde(default)]
    pub featured: Option<bool>,
    #[serde(default)]
    pub views: Option<u64>,
}

impl UpdatePostRequest {
    /// Build the patch, stamping `publishedAt` when the post becomes published.
    pub fn into_patch(self, now: DateTime<Utc>) -> Patch {
        let published_at = (self.status == Some(PostStatus::Published)).then(|| now.to_rfc3339());
        Patch::from(self).set_optional("publishedAt", published_at)
    }
}

impl From<UpdatePostRequest> for Patch {
    fn from(request: UpdatePostRequest) -> Self {
        // An empty set clears the tags; the wire has no empty string set.
        let tags = request.tags.map(|tags| {
            if tags.is_empty() {
                Value::Null
            } else {
                Value::StringSet(tags)
            }
        });
        let patch = Patch::new()
            .set_optional("title", request.title)
            .set_optional("slug", request.slug)
            .set_optional("tags", tags)
            .set_optional("status", request.status)
            .set_optional("featured", request.featured)
            .set_optional("views", request.views);
        let patch = set_nullable(patch, "summary", request.summary);
        let patch = set_nullable(patch, "categoryId", request.category_id);
        set_nullable(patch, "subcategoryId", request.subcategory_id)
    }
}

// ============================================================================
// Comment
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub author_name: String,
    pub content: String,
}

impl CreateCommentRequest {
    pub fn into_comment(self, post_id: &str, now: DateTime<Utc>) -> Comment {
        Comment {
            post_id: post_id.to_string(),
            comment_id: new_id(),
            author_name: self.author_name,
            content: self.content,
            approved: false,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCommentRequest {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub approved: Option<bool>,
}

impl From<UpdateCommentRequest> for Patch {
    fn from(request: UpdateCommentRequest) -> Self {
        Patch::new()
            .set_optional("content", request.content)
            .set_optional("approved", request.approved)
    }
}

// ============================================================================
// User
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default)]
    pub social_links: BTreeMap<String, String>,
    #[serde(default)]
    pub role: UserRole,
}

impl CreateUserRequest {
    /// New users start active.
    pub fn into_user(self, now: DateTime<Utc>) -> User {
        User {
            id: new_id(),
            username: self.username,
            email: self.email,
            name: self.name,
            avatar: self.avatar,
            bio: self.bio,
            website: self.website,
            social_links: self.social_links,
            role: self.role,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub avatar: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub bio: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub website: Option<Option<String>>,
    #[serde(default)]
    pub social_links: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub role: Option<UserRole>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl From<UpdateUserRequest> for Patch {
    fn from(request: UpdateUserRequest) -> Self {
        let patch = Patch::new()
            .set_optional("username", request.username)
            .set_optional("email", request.email)
            .set_optional("name", request.name)
            .set_optional(
                "socialLinks",
                request.social_links.as_ref().map(string_map_value),
            )
            .set_optional("role", request.role)
            .set_optional("isActive", request.is_active);
        let patch = set_nullable(patch, "avatar", request.avatar);
        let patch = set_nullable(patch, "bio", request.bio);
        set_nullable(patch, "website", request.website)
    }
}

// ============================================================================
// Notification
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNotificationRequest {
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub title: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl CreateNotificationRequest {
    pub fn into_notification(self, user_id: &str, now: DateTime<Utc>) -> Notification {
        Notification {
            user_id: user_id.to_string(),
            notification_id: new_id(),
            kind: self.kind,
            title: self.title,
            message: self.message,
            link: self.link,
            is_read: false,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNotificationRequest {
    #[serde(default)]
    pub is_read: Option<bool>,
}

impl From<UpdateNotificationRequest> for Patch {
    fn from(request: UpdateNotificationRequest) -> Self {
        Patch::new().set_optional("isRead", request.is_read)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blog::Entity;
    use crate::storage::UpdateDescriptor;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello, World!"), "hello-world");
        assert_eq!(slugify("  Async   Rust  "), "async-rust");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_create_category_derives_slug() {
        let category = CreateCategoryRequest {
            name: "Systems Programming".to_string(),
            slug: None,
            description: None,
        }
        .into_category(Utc::now());

        assert_eq!(category.slug, "systems-programming");
        assert!(!category.id.is_empty());
        assert!(!category.id.contains('#'));
    }

    #[test]
    fn test_update_request_distinguishes_null_from_omitted() {
        let omitted: UpdateCategoryRequest = serde_json::from_str(r#"{"name":"New"}"#).unwrap();
        let cleared: UpdateCategoryRequest =
            serde_json::from_str(r#"{"description":null}"#).unwrap();

        let omitted = Patch::from(omitted);
        assert_eq!(omitted.get("description"), Some(None));
        assert_eq!(omitted.get("name"), Some(Some(&Value::from("New"))));

        let cleared = Patch::from(cleared);
        assert_eq!(cleared.get("description"), Some(Some(&Value::Null)));
        assert_eq!(cleared.get("name"), Some(None));
    }

    #[test]
    fn test_empty_update_builds_no_descriptor() {
        let request: UpdateSubcategoryRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(UpdateDescriptor::build(&Patch::from(request), &[]), None);
    }

    #[test]
    fn test_publishing_a_post_stamps_published_at() {
        let request = UpdatePostRequest {
            status: Some(PostStatus::Published),
            ..Default::default()
        };
        let patch = request.into_patch(Utc::now());

        assert_eq!(patch.get("status"), Some(Some(&Value::from("published"))));
        assert!(matches!(patch.get("publishedAt"), Some(Some(Value::String(_)))));
    }

    #[test]
    fn test_empty_tag_set_clears_tags() {
        let request = UpdatePostRequest {
            tags: Some(BTreeSet::new()),
            ..Default::default()
        };
        assert_eq!(Patch::from(request).get("tags"), Some(Some(&Value::Null)));
    }

    #[test]
    fn test_new_post_starts_with_zero_views() {
        let post = CreatePostRequest {
            title: "Hello".to_string(),
            slug: None,
            summary: None,
            category_id: None,
            subcategory_id: None,
            tags: BTreeSet::new(),
            status: PostStatus::Draft,
            featured: false,
        }
        .into_post("author-1", Utc::now());

        assert_eq!(post.views, 0);
        assert_eq!(post.published_at, None);
        assert_eq!(
            post.key().unwrap().partition,
            format!("author-1#{}", post.post_id)
        );
    }

    #[test]
    fn test_new_user_is_active_author() {
        let request: CreateUserRequest = serde_json::from_str(
            r#"{"username": "ferris", "email": "ferris@example.com", "name": "Ferris"}"#,
        )
        .unwrap();

        let user = request.into_user(Utc::now());

        assert!(user.is_active);
        assert_eq!(user.role, UserRole::Author);
        assert!(!user.id.contains('#'));
    }

    #[test]
    fn test_update_user_patch() {
        let request: UpdateUserRequest =
            serde_json::from_str(r#"{"role": "ADMIN", "website": null}"#).unwrap();

        let patch = Patch::from(request);

        assert_eq!(patch.get("role"), Some(Some(&Value::from("ADMIN"))));
        assert_eq!(patch.get("website"), Some(Some(&Value::Null)));
        assert_eq!(patch.get("bio"), Some(None));
    }

    #[test]
    fn test_new_notification_is_unread() {
        let request: CreateNotificationRequest = serde_json::from_str(
            r#"{"type": "POST_PUBLISHED", "title": "Live", "message": "Your post is live"}"#,
        )
        .unwrap();

        let notification = request.into_notification("user-1", Utc::now());

        assert_eq!(notification.kind, NotificationType::PostPublished);
        assert!(!notification.is_read);
        assert!(notification
            .key()
            .unwrap()
            .partition
            .starts_with("user-1#"));
    }

    #[test]
    fn test_client_supplied_post_id_is_ignored() {
        let request: CreatePostRequest =
            serde_json::from_str(r#"{"postId": "hello", "title": "Hello"}"#).unwrap();

        let first = request.clone().into_post("author-1", Utc::now());
        let second = request.into_post("author-2", Utc::now());

        assert_ne!(first.post_id, "hello");
        assert_ne!(first.post_id, second.post_id);
    }
}
