//! Domain services over the provider-selected repositories.

mod entity;
mod error;

pub use entity::{EntityPage, EntityService};
pub use error::ServiceError;
