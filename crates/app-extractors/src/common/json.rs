use serde::{de::DeserializeOwned, Deserialize, Deserializer};
use serde_json::Value;

use super::extractor_error::{ExtractorError, ExtractorResult};

/// Render scalar JSON as a string. Ids come back as numbers on some
/// platforms and as strings on others.
#[must_use]
pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(x) => Some(x.clone()),
        Value::Number(x) => Some(x.to_string()),
        Value::Bool(x) => Some(x.to_string()),
        _ => None,
    }
}

/// Serde helper for fields that may be a string, a number or null.
pub fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;

    Ok(scalar_to_string(&value).unwrap_or_default())
}

/// Look up a JSON pointer, failing with the pointer as the missing anchor.
pub fn required<'a>(value: &'a Value, pointer: &str) -> ExtractorResult<&'a Value> {
    value
        .pointer(pointer)
        .filter(|x| !x.is_null())
        .ok_or_else(|| ExtractorError::shape_mismatch(format!("`{pointer}` missing from payload")))
}

pub fn required_str(value: &Value, pointer: &str) -> ExtractorResult<String> {
    required(value, pointer).and_then(|x| {
        scalar_to_string(x).ok_or_else(|| {
            ExtractorError::shape_mismatch(format!("`{pointer}` is not a string"))
        })
    })
}

/// String at `pointer`, or an empty string when absent.
#[must_use]
pub fn str_or_empty(value: &Value, pointer: &str) -> String {
    value
        .pointer(pointer)
        .and_then(scalar_to_string)
        .unwrap_or_default()
}

/// Deserialize the value at `pointer` into a typed payload.
pub fn decode_at<T>(value: &Value, pointer: &str) -> ExtractorResult<T>
where
    T: DeserializeOwned,
{
    T::deserialize(required(value, pointer)?)
        .map_err(|e| ExtractorError::shape_mismatch(format!("`{pointer}` has unexpected shape: {e}")))
}

pub fn parse_json(text: &str, anchor: &str) -> ExtractorResult<Value> {
    serde_json::from_str(text)
        .map_err(|e| ExtractorError::shape_mismatch(format!("`{anchor}` is not valid JSON: {e}")))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[derive(Deserialize)]
    struct Owner {
        #[serde(deserialize_with = "string_or_number", default)]
        mid: String,
    }

    #[test]
    fn numbers_and_strings_both_deserialize() {
        let a: Owner = serde_json::from_value(json!({ "mid": 12345 })).expect("number");
        let b: Owner = serde_json::from_value(json!({ "mid": "abc" })).expect("string");
        let c: Owner = serde_json::from_value(json!({ "mid": null })).expect("null");
        let d: Owner = serde_json::from_value(json!({})).expect("absent");

        assert_eq!(a.mid, "12345");
        assert_eq!(b.mid, "abc");
        assert_eq!(c.mid, "");
        assert_eq!(d.mid, "");
    }

    #[test]
    fn required_names_the_missing_pointer() {
        let value = json!({ "data": { "post": null } });

        let err = required(&value, "/data/post").expect_err("null counts as missing");

        assert_eq!(
            err.to_string(),
            "upstream response changed shape: `/data/post` missing from payload"
        );
    }

    #[test]
    fn pointer_lookups_index_arrays() {
        let value = json!({ "list": [{ "url": "a" }, { "url": "b" }] });

        assert_eq!(required_str(&value, "/list/1/url").expect("present"), "b");
        assert_eq!(str_or_empty(&value, "/list/2/url"), "");
    }
}
