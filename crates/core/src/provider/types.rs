use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The storage backends a request can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Provider {
    /// Document-relational store behind an ORM-like client.
    Relational,
    /// Wide-column key-value store with attribute-typed items.
    WideColumn,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown database provider: {0}")]
pub struct UnknownProvider(pub String);

impl Provider {
    pub const ALL: [Provider; 2] = [Provider::Relational, Provider::WideColumn];

    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Relational => "RELATIONAL",
            Provider::WideColumn => "WIDE_COLUMN",
        }
    }

    /// Parse a provider name, case-insensitively.
    ///
    /// Besides the canonical names, the `PRISMA` and `DYNAMODB` names used by
    /// existing clients are accepted.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "RELATIONAL" | "PRISMA" => Some(Provider::Relational),
            "WIDE_COLUMN" | "DYNAMODB" => Some(Provider::WideColumn),
            _ => None,
        }
    }

    /// Resolve a request hint, falling back to `default` when the hint is
    /// absent or not a known provider.
    pub fn resolve(hint: Option<&str>, default: Provider) -> Provider {
        hint.and_then(Provider::parse).unwrap_or(default)
    }

    pub fn description(&self) -> &'static str {
        match self {
            Provider::Relational => "Relational store (SQLite)",
            Provider::WideColumn => "Wide-column store (DynamoDB)",
        }
    }
}

impl FromStr for Provider {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Provider::parse(s).ok_or_else(|| UnknownProvider(s.to_string()))
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
