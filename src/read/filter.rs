use crate::{
    Result,
    common::{
        self,
        attribute::{AttributeValue, Record},
    },
};

use serde_dynamo::to_attribute_value;
use std::collections;

/// Equality filter for bulk reads: `name == value`.
///
/// ```rust
/// use record_gateway::read::filter;
///
/// let filter = filter::build("name", Some("Alice")).unwrap();
/// assert_eq!(filter.expression(), "#name = :name");
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Filter {
    /// The attribute compared.
    pub name: String,
    /// The value it must equal.
    pub value: AttributeValue,
    token: String,
}

impl Filter {
    /// Name placeholder for the filtered attribute.
    pub fn name_placeholder(&self) -> String {
        common::name_placeholder(&self.token)
    }

    /// Value placeholder for the compared value.
    pub fn value_placeholder(&self) -> String {
        common::value_placeholder(&self.token)
    }

    /// The aliased filter expression.
    pub fn expression(&self) -> String {
        format!("{} = {}", self.name_placeholder(), self.value_placeholder())
    }

    /// Whether `record` passes the filter; a missing attribute never matches.
    pub fn matches(&self, record: &Record) -> bool {
        record.get(&self.name).as_ref() == Some(&self.value)
    }
}

/// Build the filter for a single query parameter.
///
/// An absent value filters on the empty string rather than dropping the filter, so
/// `build("name", None)` only matches records whose `name` is `""`. Callers wanting
/// every record should scan without a filter instead.
pub fn build(param_name: &str, param_value: Option<&str>) -> Result<Filter> {
    let token = common::placeholder_token(param_name)?;
    let filter = Filter {
        name: param_name.to_string(),
        value: AttributeValue::from(param_value.unwrap_or_default()),
        token,
    };
    Ok(filter)
}

impl TryFrom<&Filter> for common::ExpressionInput {
    type Error = serde_dynamo::Error;

    fn try_from(filter: &Filter) -> serde_dynamo::Result<Self> {
        let value = to_attribute_value(&filter.value)?;
        let operation = Self {
            expression: filter.expression(),
            expression_attribute_names: collections::HashMap::from([(
                filter.name_placeholder(),
                filter.name.clone(),
            )]),
            expression_attribute_values: collections::HashMap::from([(
                filter.value_placeholder(),
                value,
            )]),
        };
        Ok(operation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    use aws_sdk_dynamodb::types;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case::present("name", Some("Alice"), "#name = :name", "Alice")]
    #[case::absent_matches_empty_string("name", None, "#name = :name", "")]
    #[case::explicit_empty_string("name", Some(""), "#name = :name", "")]
    #[case::reserved_word("status", Some("active"), "#status = :status", "active")]
    #[case::escaped_name("e-mail", Some("a@b"), "#e_2d_mail = :e_2d_mail", "a@b")]
    fn test_build(
        #[case] name: &str,
        #[case] value: Option<&str>,
        #[case] expression: &str,
        #[case] expected_value: &str,
    ) {
        let filter = build(name, value).unwrap();
        assert_eq!(filter.expression(), expression);
        assert_eq!(filter.name, name);
        assert_eq!(filter.value, AttributeValue::from(expected_value));
    }

    #[test]
    fn test_build_rejects_empty_name() {
        assert!(matches!(
            build("", Some("a")),
            Err(Error::InvalidAttributeName(_))
        ));
    }

    #[rstest]
    #[case::equal(json!({"k": "k1", "name": "Alice"}), Some("Alice"), true)]
    #[case::different(json!({"k": "k2", "name": "Bob"}), Some("Alice"), false)]
    #[case::missing_attribute(json!({"k": "k3"}), Some("Alice"), false)]
    #[case::missing_attribute_vs_empty(json!({"k": "k3"}), None, false)]
    #[case::empty_string(json!({"k": "k4", "name": ""}), None, true)]
    #[case::number_is_not_string(json!({"k": "k5", "name": 1}), Some("1"), false)]
    fn test_matches(
        #[case] body: serde_json::Value,
        #[case] value: Option<&str>,
        #[case] expected: bool,
    ) {
        let record = Record::from_body("k", body).unwrap();
        assert_eq!(build("name", value).unwrap().matches(&record), expected);
    }

    #[test]
    fn test_matches_key_attribute() {
        let record = Record::from_body("k", json!({"k": "k1"})).unwrap();
        assert!(build("k", Some("k1")).unwrap().matches(&record));
    }

    #[test]
    fn test_filter_to_expression_input() {
        let filter = build("name", Some("Alice")).unwrap();
        let actual: common::ExpressionInput = (&filter).try_into().unwrap();
        let expected = common::ExpressionInput {
            expression: "#name = :name".to_string(),
            expression_attribute_names: collections::HashMap::from(
                [
                    ("#name".to_string(), "name".to_string()),
                ]
            ),
            expression_attribute_values: collections::HashMap::from(
                [
                    (
                        ":name".to_string(),
                        types::AttributeValue::S(
                            "Alice".to_string()
                        )
                    ),
                ]
            ),
        };
        assert_eq!(actual, expected);
    }
}
