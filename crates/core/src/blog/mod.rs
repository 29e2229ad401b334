//! Blog domain entities and their mapping onto storage items.

mod collection;
mod entity;
mod requests;
mod types;

pub use collection::Collection;
pub use entity::Entity;
pub use requests::{
    slugify, CreateAuthorRequest, CreateCategoryRequest, CreateCommentRequest,
    CreateNotificationRequest, CreatePostRequest, CreateSubcategoryRequest, CreateUserRequest,
    UpdateAuthorRequest, UpdateCategoryRequest, UpdateCommentRequest,
    UpdateNotificationRequest, UpdatePostRequest, UpdateSubcategoryRequest, UpdateUserRequest,
};
pub use types::{
    Author, Category, Comment, Notification, NotificationType, Post, PostStatus, Subcategory,
    User, UserRole,
};
