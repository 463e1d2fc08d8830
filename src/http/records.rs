use crate::{
    Error, Result,
    common::{
        attribute::{AttributeMap, AttributeValue, Record},
        key::RecordKey,
    },
    http::AppState,
    read::filter,
    write::update,
};

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
};
use chrono::{SecondsFormat, Utc};
use serde_json::Value;

type JsonBody = std::result::Result<Json<Value>, JsonRejection>;

type QueryPairs = std::result::Result<Query<Vec<(String, String)>>, QueryRejection>;

/// `GET /records/:key`
pub(crate) async fn get(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<Record>> {
    let key = RecordKey::new(&state.config.key_attribute, key);
    let record = state.store.get(&key).await?;
    Ok(Json(record.project(&state.config.projection)))
}

/// `POST /records`: write the whole record, replacing any previous one.
///
/// The creation time attribute, when configured, is always set by the server.
pub(crate) async fn create(
    State(state): State<AppState>,
    payload: JsonBody,
) -> Result<Json<Record>> {
    let Json(body) = payload?;
    let mut record = Record::from_body(&state.config.key_attribute, body)?;
    if let Some(name) = &state.config.created_at_attribute {
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        record.attributes.insert(name, AttributeValue::String(now));
    }
    state.store.create(record.clone()).await?;
    tracing::debug!(key = %record.key.value, "created record");
    Ok(Json(record.project(&state.config.projection)))
}

/// `PUT /records/:key`: set the attributes in the body and leave the others untouched.
pub(crate) async fn update(
    State(state): State<AppState>,
    Path(key): Path<String>,
    payload: JsonBody,
) -> Result<Json<Record>> {
    let Json(body) = payload?;
    let key = RecordKey::new(&state.config.key_attribute, key);
    let read_only: Vec<&str> = state
        .config
        .created_at_attribute
        .as_deref()
        .into_iter()
        .collect();
    let update_op = update::compile_guarded(&key, AttributeMap::try_from(body)?, &read_only)?;
    let attributes = update_op
        .assignments()
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect();
    state.store.update(update_op).await?;
    let record = Record { key, attributes };
    Ok(Json(record.project(&state.config.projection)))
}

/// `DELETE /records/:key`: succeeds whether or not the record exists.
pub(crate) async fn delete(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<Record>> {
    let key = RecordKey::new(&state.config.key_attribute, key);
    state.store.delete(&key).await?;
    Ok(Json(Record {
        key,
        attributes: AttributeMap::new(),
    }))
}

/// `GET /records?name=value`: every record, or those matching a single equality filter.
pub(crate) async fn scan(
    State(state): State<AppState>,
    query: QueryPairs,
) -> Result<Json<Vec<Record>>> {
    let Query(pairs) = query?;
    let filter = match pairs.as_slice() {
        [] => state
            .config
            .default_filter_attribute
            .as_deref()
            .map(|name| filter::build(name, None))
            .transpose()?,
        [(name, value)] => Some(filter::build(name, Some(value.as_str()))?),
        _ => {
            return Err(Error::Validation(
                "at most one filter parameter is supported".to_string(),
            ));
        }
    };
    let records = state.store.scan(filter.as_ref()).await?;
    let records = records
        .iter()
        .map(|record| record.project(&state.config.projection))
        .collect();
    Ok(Json(records))
}
