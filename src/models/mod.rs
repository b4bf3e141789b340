//! Domain model module declarations.

use serde::{Deserialize, Deserializer};

pub mod session;
pub mod settings;

/// Loosely typed JSON scalar accepted by the tuning endpoint.
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Bool(bool),
    Number(f64),
    Text(String),
}

/// Deserialize an optional non-negative integer from a number, a numeric
/// string, or a boolean.
///
/// Fractions are truncated and negative values saturate to zero, matching
/// the loose coercion HTML form clients rely on.
pub(crate) fn deserialize_lenient_u64<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(scalar) = Option::<Scalar>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let number = match scalar {
        Scalar::Bool(flag) => f64::from(u8::from(flag)),
        Scalar::Number(number) => number,
        Scalar::Text(text) => text.trim().parse::<f64>().map_err(|_| {
            serde::de::Error::custom(format!("expected a number, found {text:?}"))
        })?,
    };
    if !number.is_finite() {
        return Err(serde::de::Error::custom("expected a finite number"));
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    Ok(Some(number.max(0.0).trunc() as u64))
}

/// Like [`deserialize_lenient_u64`], saturating at `u8::MAX`.
pub(crate) fn deserialize_lenient_u8<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(deserialize_lenient_u64(deserializer)?
        .map(|value| u8::try_from(value).unwrap_or(u8::MAX)))
}

/// Like [`deserialize_lenient_u64`], saturating at `u32::MAX`.
pub(crate) fn deserialize_lenient_u32<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(deserialize_lenient_u64(deserializer)?
        .map(|value| u32::try_from(value).unwrap_or(u32::MAX)))
}

/// Deserialize an optional boolean from a bool, a number (non-zero is
/// true), or one of `"true"`, `"false"`, `"1"`, `"0"`, `"on"`, `"off"`.
pub(crate) fn deserialize_lenient_bool<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(scalar) = Option::<Scalar>::deserialize(deserializer)? else {
        return Ok(None);
    };
    match scalar {
        Scalar::Bool(flag) => Ok(Some(flag)),
        Scalar::Number(number) => Ok(Some(number != 0.0)),
        Scalar::Text(text) => match text.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(Some(true)),
            "false" | "0" | "no" | "off" | "" => Ok(Some(false)),
            _ => Err(serde::de::Error::custom(format!(
                "expected a boolean, found {text:?}"
            ))),
        },
    }
}
