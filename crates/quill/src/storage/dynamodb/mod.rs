//! DynamoDB storage backend implementation.
//!
//! This module provides a DynamoDB-based implementation of `ItemRepository`
//! using `aws-sdk-dynamodb`, one table per collection.

mod backend;
mod codec;
mod error;
mod expressions;
mod keys;
#[cfg(test)]
pub mod memory;
mod repository;

pub use backend::{AwsDynamoBackend, DynamoBackend};
pub use repository::DynamoDbRepository;
