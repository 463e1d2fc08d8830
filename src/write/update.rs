use crate::{
    Error, Result,
    common::{
        self,
        attribute::{AttributeMap, AttributeValue},
        key::RecordKey,
    },
};

use indexmap::IndexMap;
use serde_dynamo::to_attribute_value;
use std::collections;

/// Separator between assignment terms of the update clause.
const TERM_SEPARATOR: &str = ", ";

/// A compiled partial update: one aliased assignment per attribute.
///
/// The literal attribute names never appear in `clause`; they are reached only through
/// `name_aliases`, so reserved words and oddly-cased names are safe to update.
#[derive(Clone, Debug, PartialEq)]
pub struct UpdateOp {
    /// The record to update.
    pub key: RecordKey,
    /// The update clause, e.g. `SET #name = :name, #age = :age`.
    pub clause: String,
    /// Name placeholder to attribute name, in clause order.
    pub name_aliases: IndexMap<String, String>,
    /// Value placeholder to attribute value, in clause order.
    pub value_aliases: IndexMap<String, AttributeValue>,
}

impl UpdateOp {
    /// The `(name, value)` pairs this operation assigns, in clause order.
    pub fn assignments(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.name_aliases
            .values()
            .map(String::as_str)
            .zip(self.value_aliases.values())
    }

    /// Name placeholder reserved for the key attribute.
    pub fn key_placeholder(&self) -> String {
        common::name_placeholder(&common::sanitize(&self.key.name))
    }
}

/// Compile a request body into a partial update of the record identified by `key`.
///
/// The key attribute is dropped from `body` when it repeats the target key, and rejected
/// when it would change it. Placeholders are derived from attribute names, so compiling
/// the same body twice yields the same tokens.
///
/// ```rust
/// use record_gateway::{common::{attribute::AttributeMap, key::RecordKey}, write::update};
/// use serde_json::json;
///
/// let body = AttributeMap::try_from(json!({"name": "Jane", "status": "active"})).unwrap();
/// let update_op = update::compile(&RecordKey::new("userId", "u1"), body).unwrap();
/// assert_eq!(update_op.clause, "SET #name = :name, #status = :status");
/// ```
pub fn compile(key: &RecordKey, body: AttributeMap) -> Result<UpdateOp> {
    compile_guarded(key, body, &[])
}

/// [compile], additionally refusing to touch the attributes named in `read_only`.
pub fn compile_guarded(
    key: &RecordKey,
    mut body: AttributeMap,
    read_only: &[&str],
) -> Result<UpdateOp> {
    match body.remove(&key.name) {
        Some(AttributeValue::String(value)) if value == key.value => {}
        Some(_) => {
            return Err(Error::Validation(format!(
                "\"{}\" identifies the record and cannot be updated",
                key.name
            )));
        }
        None => {}
    }
    if let Some(name) = body.names().find(|name| read_only.contains(name)) {
        return Err(Error::ReadOnlyAttribute(name.to_string()));
    }
    if body.is_empty() {
        return Err(Error::EmptyUpdate {
            key: key.name.clone(),
        });
    }

    // token -> attribute that claimed it; the key's token is reserved for its existence check
    let mut owners = collections::HashMap::with_capacity(body.len() + 1);
    owners.insert(common::placeholder_token(&key.name)?, key.name.clone());

    let mut terms = Vec::with_capacity(body.len());
    let mut name_aliases = IndexMap::with_capacity(body.len());
    let mut value_aliases = IndexMap::with_capacity(body.len());
    for (name, value) in body {
        let token = common::placeholder_token(&name)?;
        let name_placeholder = common::name_placeholder(&token);
        if let Some(first) = owners.get(&token) {
            return Err(Error::AliasCollision {
                first: first.clone(),
                second: name,
                placeholder: name_placeholder,
            });
        }
        let value_placeholder = common::value_placeholder(&token);
        owners.insert(token, name.clone());
        terms.push(format!("{name_placeholder} = {value_placeholder}"));
        name_aliases.insert(name_placeholder, name);
        value_aliases.insert(value_placeholder, value);
    }

    let update_op = UpdateOp {
        key: key.clone(),
        clause: format!("SET {}", terms.join(TERM_SEPARATOR)),
        name_aliases,
        value_aliases,
    };
    tracing::debug!(clause = %update_op.clause, key = %key.value, "compiled update");
    Ok(update_op)
}

impl TryFrom<&UpdateOp> for common::ExpressionInput {
    type Error = serde_dynamo::Error;

    fn try_from(update_op: &UpdateOp) -> serde_dynamo::Result<Self> {
        let mut expression_attribute_values =
            collections::HashMap::with_capacity(update_op.value_aliases.len());
        for (placeholder, value) in &update_op.value_aliases {
            expression_attribute_values.insert(placeholder.clone(), to_attribute_value(value)?);
        }
        let operation = Self {
            expression: update_op.clause.clone(),
            expression_attribute_names: update_op
                .name_aliases
                .iter()
                .map(|(placeholder, name)| (placeholder.clone(), name.clone()))
                .collect(),
            expression_attribute_values,
        };
        Ok(operation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use aws_sdk_dynamodb::types;
    use rstest::rstest;
    use serde_json::{Value, json};

    fn key() -> RecordKey {
        RecordKey::new("userId", "u1")
    }

    fn body(value: Value) -> AttributeMap {
        AttributeMap::try_from(value).unwrap()
    }

    #[rstest]
    #[case::single(
        json!({"name": "X"}),
        "SET #name = :name"
    )]
    #[case::multiple_in_order(
        json!({"name": "X", "email": "x@example.com", "age": 3}),
        "SET #name = :name, #email = :email, #age = :age"
    )]
    #[case::reserved_words(
        json!({"status": "active", "date": "today"}),
        "SET #status = :status, #date = :date"
    )]
    #[case::matching_key_dropped(
        json!({"userId": "u1", "name": "X"}),
        "SET #name = :name"
    )]
    #[case::escaped_name(
        json!({"first-name": "X"}),
        "SET #first_2d_name = :first_2d_name"
    )]
    #[case::underscore_name(
        json!({"first_name": "X"}),
        "SET #first__name = :first__name"
    )]
    #[case::nested_values_are_atomic(
        json!({"address": {"city": "Y"}, "tags": ["a", "b"]}),
        "SET #address = :address, #tags = :tags"
    )]
    fn test_compile_clause(#[case] input: Value, #[case] expected: &str) {
        let update_op = compile(&key(), body(input)).unwrap();
        assert_eq!(update_op.clause, expected);
        assert_eq!(update_op.key, key());
    }

    #[rstest]
    #[case::one(json!({"a": 1}), 1)]
    #[case::two(json!({"a": 1, "b": 2}), 2)]
    #[case::five(json!({"a": 1, "b": 2, "c": 3, "d": 4, "e": 5}), 5)]
    #[case::with_key(json!({"userId": "u1", "a": 1, "b": 2}), 2)]
    fn test_compile_term_count(#[case] input: Value, #[case] count: usize) {
        let update_op = compile(&key(), body(input)).unwrap();
        let terms = update_op
            .clause
            .strip_prefix("SET ")
            .unwrap()
            .split(TERM_SEPARATOR)
            .collect::<Vec<_>>();
        assert_eq!(terms.len(), count);
        assert!(terms.iter().all(|term| !term.is_empty()));
        assert!(!update_op.clause.ends_with(','));
        assert!(!update_op.clause.ends_with(' '));
        assert!(!update_op.clause.contains(",,"));
        assert_eq!(update_op.name_aliases.len(), count);
        assert_eq!(update_op.value_aliases.len(), count);
        assert!(!update_op.name_aliases.values().any(|name| name == "userId"));
    }

    #[test]
    fn test_compile_alias_tables() {
        let update_op = compile(&key(), body(json!({"name": "X", "age": 3}))).unwrap();
        assert_eq!(
            update_op.name_aliases,
            IndexMap::from(
                [
                    ("#name".to_string(), "name".to_string()),
                    ("#age".to_string(), "age".to_string()),
                ]
            )
        );
        assert_eq!(
            update_op.value_aliases,
            IndexMap::from(
                [
                    (":name".to_string(), AttributeValue::from("X")),
                    (":age".to_string(), AttributeValue::Number(3.into())),
                ]
            )
        );
        assert_eq!(
            update_op.assignments().collect::<Vec<_>>(),
            vec![
                ("name", &AttributeValue::from("X")),
                ("age", &AttributeValue::Number(3.into())),
            ]
        );
        assert_eq!(update_op.key_placeholder(), "#userId");
    }

    #[test]
    fn test_compile_is_deterministic() {
        let input = json!({"b": 1, "a": true, "c": null});
        let first = compile(&key(), body(input.clone())).unwrap();
        let second = compile(&key(), body(input)).unwrap();
        assert_eq!(first, second);
    }

    #[rstest]
    #[case::empty_body(json!({}))]
    #[case::only_key(json!({"userId": "u1"}))]
    fn test_compile_empty_update(#[case] input: Value) {
        assert!(matches!(
            compile(&key(), body(input)),
            Err(Error::EmptyUpdate { key }) if key == "userId"
        ));
    }

    #[rstest]
    #[case::other_key_value(json!({"userId": "u2", "name": "X"}))]
    #[case::non_string_key(json!({"userId": 7, "name": "X"}))]
    fn test_compile_rejects_key_change(#[case] input: Value) {
        assert!(matches!(
            compile(&key(), body(input)),
            Err(Error::Validation(_))
        ));
    }

    #[rstest]
    #[case::dash_and_underscore(key(), json!({"first_name": "X", "first-name": "Y"}), 2)]
    #[case::space_and_dot(key(), json!({"a b": 1, "a.b": 2}), 2)]
    #[case::accented(key(), json!({"né": 1, "nà": 2}), 2)]
    #[case::near_key_name(RecordKey::new("user_id", "u1"), json!({"user-id": 1, "userId": 2}), 2)]
    fn test_compile_similar_names_get_distinct_placeholders(
        #[case] target: RecordKey,
        #[case] input: Value,
        #[case] count: usize,
    ) {
        let update_op = compile(&target, body(input)).unwrap();
        assert_eq!(update_op.name_aliases.len(), count);
        assert_eq!(update_op.value_aliases.len(), count);
        assert!(!update_op.name_aliases.contains_key(&update_op.key_placeholder()));
    }

    #[rstest]
    #[case::alone(json!({"createdAt": "2020-01-01"}))]
    #[case::with_others(json!({"name": "X", "createdAt": "2020-01-01"}))]
    fn test_compile_guarded_rejects_read_only(#[case] input: Value) {
        assert!(matches!(
            compile_guarded(&key(), body(input), &["createdAt"]),
            Err(Error::ReadOnlyAttribute(name)) if name == "createdAt"
        ));
    }

    #[test]
    fn test_compile_guarded_allows_other_attributes() {
        let update_op =
            compile_guarded(&key(), body(json!({"name": "X"})), &["createdAt"]).unwrap();
        assert_eq!(update_op.clause, "SET #name = :name");
    }

    #[test]
    fn test_update_op_to_expression_input() {
        let update_op = compile(&key(), body(json!({"name": "X", "tags": ["a"]}))).unwrap();
        let actual: common::ExpressionInput = (&update_op).try_into().unwrap();
        let expected = common::ExpressionInput {
            expression: "SET #name = :name, #tags = :tags".to_string(),
            expression_attribute_names: collections::HashMap::from(
                [
                    ("#name".to_string(), "name".to_string()),
                    ("#tags".to_string(), "tags".to_string()),
                ]
            ),
            expression_attribute_values: collections::HashMap::from(
                [
                    (
                        ":name".to_string(),
                        types::AttributeValue::S(
                            "X".to_string()
                        )
                    ),
                    (
                        ":tags".to_string(),
                        types::AttributeValue::L(
                            vec![
                                types::AttributeValue::S(
                                    "a".to_string()
                                )
                            ]
                        )
                    ),
                ]
            ),
        };
        assert_eq!(actual, expected);
    }
}
