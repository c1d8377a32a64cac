//! Row to record mapping

use serde_json::{Map, Value};

use crate::error::{Result, StoreError};
use crate::record::{Property, Record};
use crate::sql::sanitize::{validate_name, validate_uuid};

/// Convert a stored `(name, id, data)` triple into a record
///
/// Returns `Ok(None)` when there is no payload or the payload has no keys.
/// Every top-level key becomes a scalar property in payload order. Strings
/// are taken as they are, other values as their JSON text, and `null` keys
/// are skipped.
pub fn to_record(
    type_name: &str,
    external_id: &str,
    payload: Option<&Map<String, Value>>,
) -> Result<Option<Record>> {
    if type_name.is_empty() {
        return Err(StoreError::invalid_input(
            "The name of the record cannot be blank",
        ));
    }
    validate_name(type_name)?;

    if external_id.is_empty() {
        return Err(StoreError::invalid_input(
            "The external identifier for the record cannot be blank",
        ));
    }
    validate_uuid(external_id)?;

    let Some(payload) = payload.filter(|p| !p.is_empty()) else {
        return Ok(None);
    };

    let properties = payload
        .iter()
        .filter_map(|(key, value)| match value {
            Value::Null => None,
            Value::String(s) => Some(Property::new(key.as_str(), s.as_str())),
            other => Some(Property::new(key.as_str(), other.to_string())),
        })
        .collect();

    Ok(Some(
        Record::new(type_name, properties).with_external_id(external_id),
    ))
}
