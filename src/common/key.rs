use crate::common::attribute::{AttributeMap, AttributeValue};

use aws_sdk_dynamodb::types;
use std::collections;

/// The key identifying a record: a single string attribute.
///
/// ```rust
/// use record_gateway::common::key::RecordKey;
///
/// let key = RecordKey::new("userId", "u1");
/// assert_eq!(key.name, "userId");
/// ```
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct RecordKey {
    /// The attribute name of the key.
    pub name: String,
    /// The value of the key.
    pub value: String,
}

impl RecordKey {
    /// Create a key.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Remove the key attribute from `attributes`, if it is present and holds a string.
    pub fn take_from(name: &str, attributes: &mut AttributeMap) -> Option<Self> {
        match attributes.remove(name)? {
            AttributeValue::String(value) => Some(Self::new(name, value)),
            _ => None,
        }
    }
}

impl From<&RecordKey> for collections::HashMap<String, types::AttributeValue> {
    fn from(key: &RecordKey) -> Self {
        Self::from([(key.name.clone(), types::AttributeValue::S(key.value.clone()))])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;
    use serde_json::{Value, json};

    #[test]
    fn test_key_to_hash_map() {
        let actual: collections::HashMap<String, types::AttributeValue> =
            (&RecordKey::new("a", "b")).into();
        assert_eq!(
            actual,
            collections::HashMap::from(
                [(
                    "a".to_string(),
                    types::AttributeValue::S(
                        "b".to_string()
                    ),
                )]
            )
        );
    }

    #[rstest]
    #[case::string_key(json!({"a": "b", "c": 1}), Some(RecordKey::new("a", "b")), 1)]
    #[case::missing_key(json!({"c": 1}), None, 1)]
    #[case::numeric_key(json!({"a": 1, "c": 1}), None, 1)]
    fn test_take_from(
        #[case] body: Value,
        #[case] expected: Option<RecordKey>,
        #[case] remaining: usize,
    ) {
        let mut attributes = AttributeMap::try_from(body).unwrap();
        assert_eq!(RecordKey::take_from("a", &mut attributes), expected);
        assert_eq!(attributes.len(), remaining);
        assert!(attributes.get("a").is_none());
    }
}
