use crate::{Error, Result, common::key::RecordKey};

use indexmap::IndexMap;
use serde::{Serialize, Serializer, ser::SerializeMap};
use serde_json::Value;

/// A single attribute value.
///
/// Lists and maps are atomic: they are written as one value, never expanded into
/// nested update clauses.
///
/// ```rust
/// use record_gateway::common::attribute::AttributeValue;
/// use serde_json::json;
///
/// let value = AttributeValue::from(json!(["a", 1]));
/// assert!(matches!(value, AttributeValue::List(_)));
/// ```
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// JSON `null`.
    Null,
    /// A boolean.
    Bool(bool),
    /// A number, kept at the precision it was received with.
    Number(serde_json::Number),
    /// A string.
    String(String),
    /// An ordered list of values.
    List(Vec<AttributeValue>),
    /// A nested object.
    Map(IndexMap<String, AttributeValue>),
}

impl From<Value> for AttributeValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(value) => Self::Bool(value),
            Value::Number(value) => Self::Number(value),
            Value::String(value) => Self::String(value),
            Value::Array(values) => Self::List(values.into_iter().map(Self::from).collect()),
            Value::Object(map) => Self::Map(
                map.into_iter()
                    .map(|(name, value)| (name, Self::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

/// The variable attribute set of a record, in insertion order.
///
/// ```rust
/// use record_gateway::common::attribute::AttributeMap;
/// use serde_json::json;
///
/// let attributes = AttributeMap::try_from(json!({"name": "Ann", "age": 30})).unwrap();
/// assert_eq!(attributes.names().collect::<Vec<_>>(), ["name", "age"]);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AttributeMap(IndexMap<String, AttributeValue>);

impl AttributeMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an attribute.
    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.0.get(name)
    }

    /// Set an attribute; an existing attribute keeps its position.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<AttributeValue>) {
        self.0.insert(name.into(), value.into());
    }

    /// Remove an attribute, preserving the order of the rest.
    pub fn remove(&mut self, name: &str) -> Option<AttributeValue> {
        self.0.shift_remove(name)
    }

    /// Whether the map holds no attributes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of attributes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Attribute names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Attributes in order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &AttributeValue)> {
        self.0.iter()
    }
}

impl FromIterator<(String, AttributeValue)> for AttributeMap {
    fn from_iter<I: IntoIterator<Item = (String, AttributeValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for AttributeMap {
    type Item = (String, AttributeValue);
    type IntoIter = indexmap::map::IntoIter<String, AttributeValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

// Items read back from the store are trusted: their names are never empty.
impl From<serde_json::Map<String, Value>> for AttributeMap {
    fn from(map: serde_json::Map<String, Value>) -> Self {
        map.into_iter()
            .map(|(name, value)| (name, AttributeValue::from(value)))
            .collect()
    }
}

impl TryFrom<Value> for AttributeMap {
    type Error = Error;

    fn try_from(body: Value) -> Result<Self> {
        let Value::Object(map) = body else {
            return Err(Error::Validation(
                "the request body must be a JSON object".to_string(),
            ));
        };
        if map.contains_key("") {
            return Err(Error::InvalidAttributeName(String::new()));
        }
        Ok(map.into())
    }
}

/// A record: its key plus every other attribute.
///
/// Serializes as a single flat object with the key attribute first.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    /// The record key.
    pub key: RecordKey,
    /// All attributes except the key.
    pub attributes: AttributeMap,
}

impl Record {
    /// Build a record from a full request body, which must carry the key attribute as a string.
    ///
    /// ```rust
    /// use record_gateway::common::attribute::Record;
    /// use serde_json::json;
    ///
    /// let record = Record::from_body("id", json!({"id": "u1", "name": "Ann"})).unwrap();
    /// assert_eq!(record.key.value, "u1");
    /// assert_eq!(record.attributes.len(), 1);
    /// ```
    pub fn from_body(key_attribute: &str, body: Value) -> Result<Self> {
        let mut attributes = AttributeMap::try_from(body)?;
        let key = match attributes.remove(key_attribute) {
            Some(AttributeValue::String(value)) if !value.is_empty() => {
                RecordKey::new(key_attribute, value)
            }
            Some(AttributeValue::String(_)) => {
                return Err(Error::Validation(format!(
                    "\"{key_attribute}\" must not be empty"
                )));
            }
            _ => {
                return Err(Error::Validation(format!(
                    "\"{key_attribute}\" must be a string"
                )));
            }
        };
        Ok(Self { key, attributes })
    }

    /// Look up an attribute by name, the key attribute included.
    pub fn get(&self, name: &str) -> Option<AttributeValue> {
        if name == self.key.name {
            Some(AttributeValue::String(self.key.value.clone()))
        } else {
            self.attributes.get(name).cloned()
        }
    }

    /// Keep the key plus the named attributes; an empty selection keeps everything.
    pub fn project(&self, names: &[String]) -> Self {
        if names.is_empty() {
            return self.clone();
        }
        let attributes = self
            .attributes
            .iter()
            .filter(|(name, _)| names.contains(*name))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        Self {
            key: self.key.clone(),
            attributes,
        }
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.attributes.len() + 1))?;
        map.serialize_entry(&self.key.name, &self.key.value)?;
        for (name, value) in self.attributes.iter() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
