mod error;
mod http_mapping;
pub mod keys;
mod traits;
mod types;
pub mod update;
mod value;

pub use error::{KeyError, RepositoryError, Result};
pub use http_mapping::{
    key_error_to_status_code, repository_error_to_status_code, retry_after_seconds,
};
pub use keys::{build_key, KEY_SEPARATOR};
pub use traits::ItemRepository;
pub use types::{
    effective_limit, CompositeKey, Cursor, KeyCondition, Page, PutOptions, ReturnPolicy,
    ScanFilter, SortCondition, DEFAULT_PAGE_SIZE,
};
pub use update::{Assignment, UpdateDescriptor};
pub use value::{Item, Patch, Value};
