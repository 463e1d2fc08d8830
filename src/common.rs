//! Common types for record gateway operations.
//!
//! This module provides the value model shared by reads and writes, the record key,
//! and the placeholder scheme that keeps literal attribute names out of expressions.

/// Attribute values, attribute maps and records.
pub mod attribute;

/// Record keys.
pub mod key;

use crate::{Error, Result};

use aws_sdk_dynamodb::types;
use std::{collections, fmt::Write};

/// Encode an attribute name into the token used for its placeholders.
///
/// ASCII letters and digits are kept, `_` is doubled and every other character becomes
/// `_<hex code point>_`. The encoding is injective: distinct names never share a token.
pub(crate) fn sanitize(name: &str) -> String {
    let mut token = String::with_capacity(name.len());
    for c in name.chars() {
        match c {
            c if c.is_ascii_alphanumeric() => token.push(c),
            '_' => token.push_str("__"),
            c => {
                let _ = write!(token, "_{:x}_", u32::from(c));
            }
        }
    }
    token
}

/// Placeholder token for an attribute name; empty names are rejected.
pub(crate) fn placeholder_token(name: &str) -> Result<String> {
    if name.is_empty() {
        return Err(Error::InvalidAttributeName(name.to_string()));
    }
    Ok(sanitize(name))
}

pub(crate) fn name_placeholder(token: &str) -> String {
    format!("#{token}")
}

pub(crate) fn value_placeholder(token: &str) -> String {
    format!(":{token}")
}

/// expression operation
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct ExpressionInput {
    pub(crate) expression: String,
    pub(crate) expression_attribute_names: collections::HashMap<String, String>,
    pub(crate) expression_attribute_values: collections::HashMap<String, types::AttributeValue>,
}
