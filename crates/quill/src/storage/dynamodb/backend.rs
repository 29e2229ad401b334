//! The seam between the repository and the DynamoDB client.
//!
//! The trait stays close to the client's own operations so the untestable part
//! is thin; tests swap in an in-memory implementation.

use std::fmt::Debug;

use async_trait::async_trait;
use aws_sdk_dynamodb::config::Credentials;
use aws_sdk_dynamodb::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_dynamodb::types::ReturnValue;
use aws_sdk_dynamodb::Client;
use quill_core::storage::{KeyCondition, ReturnPolicy, ScanFilter, UpdateDescriptor};
use thiserror::Error;

use super::codec::AttributeMap;
use super::expressions::{
    render_condition, render_filter, render_key_condition, render_update, Condition,
};

/// A backend failure, identified by the service's exception name.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct BackendError {
    /// Exception name such as `ConditionalCheckFailedException`. `None` for
    /// transport failures that never reached the service.
    pub code: Option<String>,
    pub message: String,
}

#[cfg(test)]
impl BackendError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            message: message.into(),
        }
    }
}

impl<E, R> From<SdkError<E, R>> for BackendError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: Debug + Send + Sync + 'static,
{
    fn from(err: SdkError<E, R>) -> Self {
        Self {
            code: err.code().map(str::to_string),
            message: DisplayErrorContext(&err).to_string(),
        }
    }
}

/// Raw page as returned by `Scan`/`Query`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawPage {
    pub items: Vec<AttributeMap>,
    pub last_evaluated_key: Option<AttributeMap>,
}

#[async_trait]
pub trait DynamoBackend: Send + Sync {
    async fn get_item(
        &self,
        table: &str,
        key: AttributeMap,
    ) -> Result<Option<AttributeMap>, BackendError>;

    async fn put_item(
        &self,
        table: &str,
        item: AttributeMap,
        condition: Option<Condition>,
    ) -> Result<(), BackendError>;

    async fn update_item(
        &self,
        table: &str,
        key: AttributeMap,
        update: &UpdateDescriptor,
        condition: Option<Condition>,
        returning: ReturnPolicy,
    ) -> Result<Option<AttributeMap>, BackendError>;

    async fn delete_item(&self, table: &str, key: AttributeMap) -> Result<(), BackendError>;

    async fn scan(
        &self,
        table: &str,
        filter: &ScanFilter,
        limit: usize,
        exclusive_start_key: Option<AttributeMap>,
    ) -> Result<RawPage, BackendError>;

    async fn query(
        &self,
        table: &str,
        condition: &KeyCondition,
        limit: usize,
        exclusive_start_key: Option<AttributeMap>,
    ) -> Result<RawPage, BackendError>;
}

// ============================================================================
// AWS SDK implementation
// ============================================================================

/// Backend over the real `aws_sdk_dynamodb::Client`.
#[derive(Clone)]
pub struct AwsDynamoBackend {
    client: Client,
}

impl AwsDynamoBackend {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client for `region`.
    ///
    /// With a local `endpoint` the client talks to that endpoint using static
    /// placeholder credentials; otherwise the default credential chain is used.
    pub async fn connect(region: &str, endpoint: Option<&str>) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(region.to_string()));

        if let Some(endpoint) = endpoint {
            loader = loader
                .endpoint_url(endpoint)
                .credentials_provider(Credentials::new("local", "local", None, None, "static"));
        }

        let config = loader.load().await;
        Self::new(Client::new(&config))
    }
}

fn return_value(policy: ReturnPolicy) -> ReturnValue {
    match policy {
        ReturnPolicy::None => ReturnValue::None,
        ReturnPolicy::AllNew => ReturnValue::AllNew,
        ReturnPolicy::AllOld => ReturnValue::AllOld,
        ReturnPolicy::UpdatedNew => ReturnValue::UpdatedNew,
    }
}

fn page_limit(limit: usize) -> i32 {
    i32::try_from(limit.max(1)).unwrap_or(i32::MAX)
}

#[async_trait]
impl DynamoBackend for AwsDynamoBackend {
    async fn get_item(
        &self,
        table: &str,
        key: AttributeMap,
    ) -> Result<Option<AttributeMap>, BackendError> {
        let output = self
            .client
            .get_item()
            .table_name(table)
            .set_key(Some(key))
            .send()
            .await?;

        Ok(output.item)
    }

    async fn put_item(
        &self,
        table: &str,
        item: AttributeMap,
        condition: Option<Condition>,
    ) -> Result<(), BackendError> {
        let mut request = self.client.put_item().table_name(table).set_item(Some(item));

        if let Some(condition) = condition {
            let condition = render_condition(condition);
            request = request
                .condition_expression(&condition.text)
                .set_expression_attribute_names(condition.names())
                .set_expression_attribute_values(condition.values());
        }

        request.send().await?;
        Ok(())
    }

    async fn update_item(
        &self,
        table: &str,
        key: AttributeMap,
        update: &UpdateDescriptor,
        condition: Option<Condition>,
        returning: ReturnPolicy,
    ) -> Result<Option<AttributeMap>, BackendError> {
        let mut expression = render_update(update);
        let condition_text = condition.map(|condition| {
            let rendered = render_condition(condition);
            let text = rendered.text.clone();
            expression.absorb(rendered);
            text
        });

        let output = self
            .client
            .update_item()
            .table_name(table)
            .set_key(Some(key))
            .update_expression(&expression.text)
            .set_condition_expression(condition_text)
            .set_expression_attribute_names(expression.names())
            .set_expression_attribute_values(expression.values())
            .return_values(return_value(returning))
            .send()
            .await?;

        Ok(output.attributes)
    }

    async fn delete_item(&self, table: &str, key: AttributeMap) -> Result<(), BackendError> {
        self.client
            .delete_item()
            .table_name(table)
            .set_key(Some(key))
            .send()
            .await?;

        Ok(())
    }

    async fn scan(
        &self,
        table: &str,
        filter: &ScanFilter,
        limit: usize,
        exclusive_start_key: Option<AttributeMap>,
    ) -> Result<RawPage, BackendError> {
        let mut request = self
            .client
            .scan()
            .table_name(table)
            .limit(page_limit(limit))
            .set_exclusive_start_key(exclusive_start_key);

        if let Some(filter) = render_filter(filter) {
            request = request
                .filter_expression(&filter.text)
                .set_expression_attribute_names(filter.names())
                .set_expression_attribute_values(filter.values());
        }

        let output = request.send().await?;

        Ok(RawPage {
            items: output.items.unwrap_or_default(),
            last_evaluated_key: output.last_evaluated_key,
        })
    }

    async fn query(
        &self,
        table: &str,
        condition: &KeyCondition,
        limit: usize,
        exclusive_start_key: Option<AttributeMap>,
    ) -> Result<RawPage, BackendError> {
        let expression = render_key_condition(condition);

        let output = self
            .client
            .query()
            .table_name(table)
            .key_condition_expression(&expression.text)
            .set_expression_attribute_names(expression.names())
            .set_expression_attribute_values(expression.values())
            .limit(page_limit(limit))
            .set_exclusive_start_key(exclusive_start_key)
            .send()
            .await?;

        Ok(RawPage {
            items: output.items.unwrap_or_default(),
            last_evaluated_key: output.last_evaluated_key,
        })
    }
}
