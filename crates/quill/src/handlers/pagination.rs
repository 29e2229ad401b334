//! Cursor pagination for flat collections.
//!
//! The cursor handed to clients is the id of the last entity examined.

use serde::{Deserialize, Serialize};

use quill_core::storage::{keys::validate_id, CompositeKey, Cursor, KeyError};

use crate::services::EntityPage;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// Page size; omitted or zero means the default.
    pub limit: Option<usize>,
    /// Continue after this id.
    pub after: Option<String>,
}

impl ListQuery {
    pub fn limit(&self) -> usize {
        self.limit.unwrap_or_default()
    }

    pub fn cursor(&self) -> Result<Option<Cursor>, KeyError> {
        self.after
            .as_deref()
            .map(|id| {
                validate_id("cursor", id)?;
                Ok(Cursor::after(CompositeKey::flat(id)))
            })
            .transpose()
    }
}

#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

impl<T> From<EntityPage<T>> for ListResponse<T> {
    fn from(page: EntityPage<T>) -> Self {
        Self {
            items: page.items,
            next: page.next.map(|cursor| cursor.into_key().partition),
        }
    }
}
