use std::env;

use quill_core::blog::Collection;
use quill_core::provider::Provider;
use thiserror::Error;

/// Errors raised while reading process configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Provider used when a request carries no valid hint (default: RELATIONAL)
    pub default_provider: Provider,
    /// AWS region of the wide-column store
    pub aws_region: String,
    /// Local wide-column endpoint; unset means the cloud service
    pub dynamodb_endpoint: Option<String>,
    /// Prefix prepended to every wide-column table name
    pub table_prefix: Option<String>,
    /// Relational connection string (a SQLite path)
    pub database_url: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `DATABASE_PROVIDER` - Default provider (default: RELATIONAL)
    /// - `AWS_REGION` - AWS region (required)
    /// - `DYNAMODB_ENDPOINT` - Local DynamoDB endpoint (optional)
    /// - `DYNAMODB_TABLE_PREFIX` - Table name prefix (optional)
    /// - `DATABASE_URL` - SQLite database path, optionally `sqlite://`-prefixed (required)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let default_provider = match get("DATABASE_PROVIDER") {
            None => Provider::Relational,
            Some(value) => Provider::parse(&value).ok_or(ConfigError::Invalid {
                name: "DATABASE_PROVIDER",
                value,
            })?,
        };

        Ok(Self {
            default_provider,
            aws_region: get("AWS_REGION").ok_or(ConfigError::Missing("AWS_REGION"))?,
            dynamodb_endpoint: get("DYNAMODB_ENDPOINT"),
            table_prefix: get("DYNAMODB_TABLE_PREFIX"),
            database_url: get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?,
        })
    }

    /// Wide-column table holding `collection`.
    pub fn table_name(&self, collection: Collection) -> String {
        table_name(self.table_prefix.as_deref(), collection)
    }

    /// Filesystem path of the SQLite database.
    pub fn sqlite_path(&self) -> &str {
        let url = self.database_url.as_str();
        url.strip_prefix("sqlite://")
            .or_else(|| url.strip_prefix("sqlite:"))
            .unwrap_or(url)
    }
}

pub fn table_name(prefix: Option<&str>, collection: Collection) -> String {
    format!("{}{}", prefix.unwrap_or_default(), collection.table_suffix())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    fn required() -> Vec<(&'static str, &'static str)> {
        vec![("AWS_REGION", "us-east-1"), ("DATABASE_URL", "quill.db")]
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&required())).unwrap();

        assert_eq!(config.default_provider, Provider::Relational);
        assert_eq!(config.dynamodb_endpoint, None);
        assert_eq!(config.table_name(Collection::Posts), "Posts");
        assert_eq!(config.sqlite_path(), "quill.db");
    }

    #[test]
    fn test_missing_region() {
        let result = Config::from_lookup(lookup(&[("DATABASE_URL", "quill.db")]));
        assert_eq!(result, Err(ConfigError::Missing("AWS_REGION")));
    }

    #[test]
    fn test_missing_database_url() {
        let result = Config::from_lookup(lookup(&[("AWS_REGION", "us-east-1")]));
        assert_eq!(result, Err(ConfigError::Missing("DATABASE_URL")));
    }

    #[test]
    fn test_unknown_default_provider_is_rejected() {
        let mut vars = required();
        vars.push(("DATABASE_PROVIDER", "MYSQL"));

        assert_eq!(
            Config::from_lookup(lookup(&vars)),
            Err(ConfigError::Invalid {
                name: "DATABASE_PROVIDER",
                value: "MYSQL".to_string()
            })
        );
    }

    #[test]
    fn test_legacy_provider_names_are_accepted() {
        let mut vars = required();
        vars.push(("DATABASE_PROVIDER", "dynamodb"));

        let config = Config::from_lookup(lookup(&vars)).unwrap();
        assert_eq!(config.default_provider, Provider::WideColumn);
    }

    #[test]
    fn test_table_prefix_and_sqlite_url() {
        let vars = vec![
            ("AWS_REGION", "eu-west-1"),
            ("DATABASE_URL", "sqlite://data/blog.db"),
            ("DYNAMODB_TABLE_PREFIX", "dev-"),
            ("DYNAMODB_ENDPOINT", "http://localhost:8000"),
        ];
        let config = Config::from_lookup(lookup(&vars)).unwrap();

        assert_eq!(config.table_name(Collection::Subcategories), "dev-Subcategories");
        assert_eq!(config.sqlite_path(), "data/blog.db");
        assert_eq!(
            config.dynamodb_endpoint.as_deref(),
            Some("http://localhost:8000")
        );
    }
}
