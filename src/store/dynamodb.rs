use crate::{
    common::{
        self,
        attribute::{AttributeMap, Record},
        key::RecordKey,
    },
    read::filter::Filter,
    store::{Error, RecordStore, Result},
    write::update::UpdateOp,
};

use async_trait::async_trait;
use aws_sdk_dynamodb::{Client, types};
use serde_dynamo::{from_item, to_item};
use std::collections;

type Item = collections::HashMap<String, types::AttributeValue>;

/// update item operation
#[derive(Clone, Debug, Default, PartialEq)]
struct UpdateItemInput {
    condition_expression: String,
    expression_attribute_names: collections::HashMap<String, String>,
    expression_attribute_values: collections::HashMap<String, types::AttributeValue>,
    key: Item,
    update_expression: String,
}

impl TryFrom<&UpdateOp> for UpdateItemInput {
    type Error = serde_dynamo::Error;

    fn try_from(update_op: &UpdateOp) -> serde_dynamo::Result<Self> {
        let mut operation: common::ExpressionInput = update_op.try_into()?;
        // the record must already exist: an update never creates a partial record
        let key_placeholder = update_op.key_placeholder();
        let condition_expression = format!("attribute_exists({key_placeholder})");
        operation
            .expression_attribute_names
            .insert(key_placeholder, update_op.key.name.clone());
        let input = Self {
            condition_expression,
            expression_attribute_names: operation.expression_attribute_names,
            expression_attribute_values: operation.expression_attribute_values,
            key: (&update_op.key).into(),
            update_expression: operation.expression,
        };
        Ok(input)
    }
}

/// scan operation
#[derive(Clone, Debug, Default, PartialEq)]
struct ScanInput {
    expression_attribute_names: Option<collections::HashMap<String, String>>,
    expression_attribute_values: Option<collections::HashMap<String, types::AttributeValue>>,
    filter_expression: Option<String>,
}

impl TryFrom<Option<&Filter>> for ScanInput {
    type Error = serde_dynamo::Error;

    fn try_from(filter: Option<&Filter>) -> serde_dynamo::Result<Self> {
        let Some(filter) = filter else {
            return Ok(Self::default());
        };
        let operation: common::ExpressionInput = filter.try_into()?;
        let input = Self {
            expression_attribute_names: Some(operation.expression_attribute_names),
            expression_attribute_values: Some(operation.expression_attribute_values),
            filter_expression: Some(operation.expression),
        };
        Ok(input)
    }
}

fn record_from_item(key_attribute: &str, item: Item) -> Result<Record> {
    let attributes: serde_json::Map<String, serde_json::Value> = from_item(item)?;
    let mut attributes = AttributeMap::from(attributes);
    let key = RecordKey::take_from(key_attribute, &mut attributes).ok_or_else(|| {
        Error::MalformedItem(format!(
            "the item has no string key attribute \"{key_attribute}\""
        ))
    })?;
    Ok(Record { key, attributes })
}

/// [RecordStore] backed by a DynamoDB table whose partition key is the record key.
///
/// ```rust,no_run
/// use aws_sdk_dynamodb::Client;
/// use record_gateway::{common::key::RecordKey, store::{RecordStore, dynamodb::DynamoDbStore}};
///
/// # async fn example(client: Client) -> Result<(), Box<dyn std::error::Error>> {
/// let store = DynamoDbStore::new(client, "users", "userId");
/// let record = store.get(&RecordKey::new("userId", "u1")).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct DynamoDbStore {
    client: Client,
    key_attribute: String,
    table_name: String,
}

impl DynamoDbStore {
    /// Create a store over `table_name`, keyed by `key_attribute`.
    pub fn new(
        client: Client,
        table_name: impl Into<String>,
        key_attribute: impl Into<String>,
    ) -> Self {
        Self {
            client,
            key_attribute: key_attribute.into(),
            table_name: table_name.into(),
        }
    }
}

#[async_trait]
impl RecordStore for DynamoDbStore {
    #[tracing::instrument(name = "record_gateway.get_item", skip(self), err)]
    async fn get(&self, key: &RecordKey) -> Result<Record> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .set_key(Some(key.into()))
            .send()
            .await
            .map_err(Error::backend)?;
        match output.item {
            Some(item) => record_from_item(&self.key_attribute, item),
            None => Err(Error::NotFound(key.clone())),
        }
    }

    #[tracing::instrument(
        name = "record_gateway.put_item",
        skip(self, record),
        fields(key = %record.key.value),
        err
    )]
    async fn create(&self, record: Record) -> Result<()> {
        let item: Item = to_item(&record)?;
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .send()
            .await
            .map_err(Error::backend)?;
        Ok(())
    }

    #[tracing::instrument(
        name = "record_gateway.update_item",
        skip(self, update_op),
        fields(key = %update_op.key.value),
        err
    )]
    async fn update(&self, update_op: UpdateOp) -> Result<()> {
        let input = UpdateItemInput::try_from(&update_op)?;
        let result = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .set_key(Some(input.key))
            .update_expression(input.update_expression)
            .condition_expression(input.condition_expression)
            .set_expression_attribute_names(Some(input.expression_attribute_names))
            .set_expression_attribute_values(Some(input.expression_attribute_values))
            .send()
            .await;
        match result {
            Ok(_) => Ok(()),
            Err(err)
                if err
                    .as_service_error()
                    .is_some_and(|err| err.is_conditional_check_failed_exception()) =>
            {
                Err(Error::NotFound(update_op.key))
            }
            Err(err) => Err(Error::backend(err)),
        }
    }

    #[tracing::instrument(name = "record_gateway.delete_item", skip(self), err)]
    async fn delete(&self, key: &RecordKey) -> Result<()> {
        self.client
            .delete_item()
            .table_name(&self.table_name)
            .set_key(Some(key.into()))
            .send()
            .await
            .map_err(Error::backend)?;
        Ok(())
    }

    #[tracing::instrument(name = "record_gateway.scan", skip(self), err)]
    async fn scan(&self, filter: Option<&Filter>) -> Result<Vec<Record>> {
        let input = ScanInput::try_from(filter)?;
        let mut paginator = self
            .client
            .scan()
            .table_name(&self.table_name)
            .set_expression_attribute_names(input.expression_attribute_names)
            .set_expression_attribute_values(input.expression_attribute_values)
            .set_filter_expression(input.filter_expression)
            .into_paginator()
            .send();
        let mut records = Vec::new();
        while let Some(page) = paginator.next().await {
            let page = page.map_err(Error::backend)?;
            for item in page.items.unwrap_or_default() {
                records.push(record_from_item(&self.key_attribute, item)?);
            }
        }
        tracing::debug!(count = records.len(), "scan complete");
        Ok(records)
    }
}
