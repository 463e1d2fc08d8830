//! Process configuration, read once at start from flags or the environment.

use crate::{Error, Result};

use clap::Parser;
use std::{net::SocketAddr, time::Duration};

/// Gateway configuration. Every field can also be set through its environment variable.
#[derive(Clone, Debug, Parser, PartialEq)]
#[command(name = "record-gateway", version, about = "JSON record gateway over DynamoDB")]
pub struct Config {
    /// Table holding the records.
    #[arg(long, env = "RECORDS_TABLE")]
    pub table_name: String,

    /// Attribute identifying a record.
    #[arg(long, env = "KEY_ATTRIBUTE", default_value = "userId")]
    pub key_attribute: String,

    /// Identity provider app client identifier.
    #[arg(long, env = "IDENTITY_CLIENT_ID")]
    pub identity_client_id: String,

    /// Identity provider user pool identifier, e.g. `us-east-1_AbCdEf`.
    #[arg(long, env = "IDENTITY_POOL_ID")]
    pub identity_pool_id: String,

    /// Milliseconds an identity provider request may take before it is abandoned.
    #[arg(long, env = "IDENTITY_TIMEOUT_MS", default_value_t = 10_000)]
    pub identity_timeout_ms: u64,

    /// Address the HTTP server listens on.
    #[arg(long, env = "BIND_ADDRESS", default_value = "0.0.0.0:3000")]
    pub bind_address: SocketAddr,

    /// When set, `GET /records` without parameters filters this attribute on `""`
    /// instead of returning every record.
    #[arg(long, env = "DEFAULT_FILTER_ATTRIBUTE")]
    pub default_filter_attribute: Option<String>,

    /// When set, created records get this attribute stamped with the creation time
    /// (RFC 3339, UTC), and updates may not change it.
    #[arg(long, env = "CREATED_AT_ATTRIBUTE")]
    pub created_at_attribute: Option<String>,

    /// Comma-separated attributes returned alongside the key; empty returns them all.
    #[arg(long, env = "PROJECTION", value_delimiter = ',')]
    pub projection: Vec<String>,

    /// DynamoDB endpoint override, e.g. a local instance.
    #[arg(long, env = "DYNAMODB_ENDPOINT")]
    pub dynamodb_endpoint: Option<String>,

    /// Emit logs as JSON lines.
    #[arg(long, env = "LOG_JSON")]
    pub log_json: bool,
}

impl Config {
    /// Configuration with defaults for everything but the required identifiers.
    pub fn new(
        table_name: impl Into<String>,
        identity_client_id: impl Into<String>,
        identity_pool_id: impl Into<String>,
    ) -> Self {
        Self {
            table_name: table_name.into(),
            key_attribute: "userId".to_string(),
            identity_client_id: identity_client_id.into(),
            identity_pool_id: identity_pool_id.into(),
            identity_timeout_ms: 10_000,
            bind_address: SocketAddr::from(([0, 0, 0, 0], 3000)),
            default_filter_attribute: None,
            created_at_attribute: None,
            projection: Vec::new(),
            dynamodb_endpoint: None,
            log_json: false,
        }
    }

    /// Timeout applied to identity provider requests.
    pub fn identity_timeout(&self) -> Duration {
        Duration::from_millis(self.identity_timeout_ms)
    }

    /// Reject settings that would make every request of some kind fail.
    pub fn validate(&self) -> Result<()> {
        if self.key_attribute.is_empty() {
            return Err(Error::Validation("the key attribute must not be empty".to_string()));
        }
        if self.default_filter_attribute.as_deref() == Some("") {
            return Err(Error::Validation(
                "the default filter attribute must not be empty".to_string(),
            ));
        }
        match self.created_at_attribute.as_deref() {
            Some("") => {
                return Err(Error::Validation(
                    "the creation time attribute must not be empty".to_string(),
                ));
            }
            Some(name) if name == self.key_attribute => {
                return Err(Error::Validation(format!(
                    "\"{name}\" cannot be both the key and the creation time attribute"
                )));
            }
            _ => {}
        }
        if self.projection.iter().any(String::is_empty) {
            return Err(Error::Validation(
                "projected attribute names must not be empty".to_string(),
            ));
        }
        if self.identity_timeout_ms == 0 {
            return Err(Error::Validation(
                "the identity provider timeout must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
