//! Helpers for partial-update DTOs.

use serde::{Deserialize, Deserializer};

/// Deserialize a field that distinguishes "absent" from "explicit null".
///
/// Use together with `#[serde(default)]`:
///
/// - field absent        -> `None` (leave the column alone)
/// - `"field": null`     -> `Some(None)` (clear the column)
/// - `"field": value`    -> `Some(Some(value))`
pub fn nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
