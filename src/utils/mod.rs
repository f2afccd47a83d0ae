use serde::{de::Deserializer, Deserialize};
use validator::Validate;

use crate::api::error;

/// Distinguishes an explicit `null` (`Some(None)`) from an absent field (`None`).
/// Pair with `#[serde(default)]`.
pub fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(de).map(Some)
}

/// Deserializes and validates a JSON payload. Malformed JSON, unknown enum
/// values and failed field rules all surface as `StoreError::Validation`.
pub fn validated_json<T>(value: serde_json::Value) -> Result<T, error::StoreError>
where
    T: Validate + serde::de::DeserializeOwned,
{
    let model: T = serde_json::from_value(value)?;
    model.validate()?;
    Ok(model)
}
