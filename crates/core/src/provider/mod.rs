//! Per-request selection of the storage backend.

mod context;
mod environment;
mod types;

pub use context::{current, ProviderContext};
pub use environment::{EnvironmentInfo, WideColumnEnvironment};
pub use types::{Provider, UnknownProvider};
