use crate::{
    common::{attribute::{AttributeMap, Record}, key::RecordKey},
    read::filter::Filter,
    store::{Error, RecordStore, Result},
    write::update::UpdateOp,
};

use async_trait::async_trait;
use indexmap::IndexMap;
use tokio::sync::RwLock;

/// In-memory [RecordStore], holding records keyed by their key value.
///
/// Each operation takes the lock once, so a single call is atomic with respect to the others.
#[derive(Debug)]
pub struct MemoryStore {
    key_attribute: String,
    records: RwLock<IndexMap<String, AttributeMap>>,
}

impl MemoryStore {
    /// Create an empty store whose records are keyed by `key_attribute`.
    pub fn new(key_attribute: impl Into<String>) -> Self {
        Self {
            key_attribute: key_attribute.into(),
            records: RwLock::default(),
        }
    }

    fn record(&self, value: &str, attributes: &AttributeMap) -> Record {
        Record {
            key: RecordKey::new(&self.key_attribute, value),
            attributes: attributes.clone(),
        }
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn get(&self, key: &RecordKey) -> Result<Record> {
        let records = self.records.read().await;
        records
            .get(&key.value)
            .map(|attributes| self.record(&key.value, attributes))
            .ok_or_else(|| Error::NotFound(key.clone()))
    }

    async fn create(&self, record: Record) -> Result<()> {
        self.records
            .write()
            .await
            .insert(record.key.value, record.attributes);
        Ok(())
    }

    async fn update(&self, update_op: UpdateOp) -> Result<()> {
        let mut records = self.records.write().await;
        let attributes = records
            .get_mut(&update_op.key.value)
            .ok_or_else(|| Error::NotFound(update_op.key.clone()))?;
        for (name, value) in update_op.assignments() {
            attributes.insert(name, value.clone());
        }
        Ok(())
    }

    async fn delete(&self, key: &RecordKey) -> Result<()> {
        self.records.write().await.shift_remove(&key.value);
        Ok(())
    }

    async fn scan(&self, filter: Option<&Filter>) -> Result<Vec<Record>> {
        let records = self.records.read().await;
        let records = records
            .iter()
            .map(|(value, attributes)| self.record(value, attributes))
            .filter(|record| filter.is_none_or(|filter| filter.matches(record)))
            .collect();
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{common::attribute::AttributeValue, read::filter, write::update};

    use serde_json::{Value, json};

    fn record(body: Value) -> Record {
        Record::from_body("k", body).unwrap()
    }

    async fn seeded() -> MemoryStore {
        let store = MemoryStore::new("k");
        store
            .create(record(json!({"k": "k1", "name": "Alice", "age": 30})))
            .await
            .unwrap();
        store
            .create(record(json!({"k": "k2", "name": "Bob"})))
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_create_then_get_round_trips() {
        let store = MemoryStore::new("k");
        let input = record(json!({"k": "k1", "name": "Alice", "tags": ["a"], "meta": {"x": null}}));
        store.create(input.clone()).await.unwrap();
        assert_eq!(store.get(&input.key).await.unwrap(), input);
    }

    #[tokio::test]
    async fn test_create_replaces_existing_record() {
        let store = seeded().await;
        store
            .create(record(json!({"k": "k1", "email": "a@example.com"})))
            .await
            .unwrap();
        let actual = store.get(&RecordKey::new("k", "k1")).await.unwrap();
        assert_eq!(actual, record(json!({"k": "k1", "email": "a@example.com"})));
    }

    #[tokio::test]
    async fn test_get_missing_record() {
        let store = seeded().await;
        let key = RecordKey::new("k", "k9");
        assert!(matches!(store.get(&key).await, Err(Error::NotFound(missing)) if missing == key));
    }

    #[tokio::test]
    async fn test_update_changes_only_named_attributes() {
        let store = seeded().await;
        let key = RecordKey::new("k", "k1");
        let body = AttributeMap::try_from(json!({"name": "X", "email": "x@example.com"})).unwrap();
        store
            .update(update::compile(&key, body).unwrap())
            .await
            .unwrap();
        let actual = store.get(&key).await.unwrap();
        assert_eq!(
            actual,
            record(json!({"k": "k1", "name": "X", "age": 30, "email": "x@example.com"}))
        );
        assert_eq!(actual.attributes.get("age"), Some(&AttributeValue::Number(30.into())));
    }

    #[tokio::test]
    async fn test_update_missing_record_is_not_found() {
        let store = seeded().await;
        let key = RecordKey::new("k", "k9");
        let body = AttributeMap::try_from(json!({"name": "X"})).unwrap();
        let actual = store.update(update::compile(&key, body).unwrap()).await;
        assert!(matches!(actual, Err(Error::NotFound(_))));
        assert!(matches!(store.get(&key).await, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = seeded().await;
        let key = RecordKey::new("k", "k1");
        store.delete(&key).await.unwrap();
        store.delete(&key).await.unwrap();
        assert!(matches!(store.get(&key).await, Err(Error::NotFound(_))));
        assert_eq!(store.scan(None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_scan_with_filter() {
        let store = seeded().await;
        let filter = filter::build("name", Some("Alice")).unwrap();
        let actual = store.scan(Some(&filter)).await.unwrap();
        assert_eq!(actual, vec![record(json!({"k": "k1", "name": "Alice", "age": 30}))]);
    }

    #[tokio::test]
    async fn test_scan_without_filter_returns_everything() {
        let store = seeded().await;
        let keys = store
            .scan(None)
            .await
            .unwrap()
            .into_iter()
            .map(|record| record.key.value)
            .collect::<Vec<_>>();
        assert_eq!(keys, ["k1", "k2"]);
    }

    #[tokio::test]
    async fn test_scan_with_absent_value_matches_empty_strings_only() {
        let store = seeded().await;
        store
            .create(record(json!({"k": "k3", "name": ""})))
            .await
            .unwrap();
        let filter = filter::build("name", None).unwrap();
        let actual = store.scan(Some(&filter)).await.unwrap();
        assert_eq!(actual, vec![record(json!({"k": "k3", "name": ""}))]);
    }
}
