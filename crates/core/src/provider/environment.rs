use serde::Serialize;

use super::Provider;

/// Where the wide-column store lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WideColumnEnvironment {
    /// A local emulator reached through an explicit endpoint.
    Local,
    Cloud,
}

impl WideColumnEnvironment {
    pub fn from_endpoint(endpoint: Option<&str>) -> Self {
        match endpoint {
            Some(e) if !e.trim().is_empty() => WideColumnEnvironment::Local,
            _ => WideColumnEnvironment::Cloud,
        }
    }
}

/// Description of the store a request is talking to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentInfo {
    pub provider: Provider,
    pub description: &'static str,
    pub is_relational: bool,
    pub is_wide_column: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wide_column_environment: Option<WideColumnEnvironment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

impl EnvironmentInfo {
    pub fn new(provider: Provider, endpoint: Option<&str>) -> Self {
        let is_wide_column = provider == Provider::WideColumn;
        Self {
            provider,
            description: provider.description(),
            is_relational: provider == Provider::Relational,
            is_wide_column,
            wide_column_environment: is_wide_column
                .then(|| WideColumnEnvironment::from_endpoint(endpoint)),
            endpoint: endpoint
                .filter(|e| is_wide_column && !e.trim().is_empty())
                .map(str::to_string),
        }
    }
}
