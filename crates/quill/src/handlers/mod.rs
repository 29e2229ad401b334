pub mod authors;
pub mod categories;
pub mod comments;
pub mod database;
pub mod error;
pub mod health;
pub mod notifications;
pub mod pagination;
pub mod posts;
pub mod subcategories;
pub mod users;

pub use error::AppError;
