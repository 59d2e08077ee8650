//! Unmarshal and marshal YAML/JSON/TOML documents

use crate::format::DataFormat;
use types::{CodecError, Mapping, Value};

/// Decode a serialized document into a mapping.
///
/// Empty documents decode to an empty mapping. A document whose root is not a
/// mapping is a decode error.
pub fn decode(bytes: &[u8], format: DataFormat) -> Result<Value, CodecError> {
    let text = std::str::from_utf8(bytes).map_err(|e| decode_error(format, e))?;
    decode_str(text, format)
}

/// [`decode`] for text already in memory
pub fn decode_str(text: &str, format: DataFormat) -> Result<Value, CodecError> {
    if text.trim().is_empty() {
        return Ok(Value::mapping());
    }

    tracing::debug!(format = %format, bytes = text.len(), "Unmarshaling data");

    let value = match format {
        DataFormat::Yaml => {
            let raw: serde_yaml::Value =
                serde_yaml::from_str(text).map_err(|e| decode_error(format, e))?;
            from_yaml(raw).map_err(|e| decode_error(format, e))?
        }
        DataFormat::Json => {
            let raw: serde_json::Value =
                serde_json::from_str(text).map_err(|e| decode_error(format, e))?;
            from_json(raw)
        }
        DataFormat::Toml => {
            let raw: toml::Table = text.parse().map_err(|e| decode_error(format, e))?;
            from_toml(toml::Value::Table(raw))
        }
    };

    match value {
        Value::Mapping(_) => Ok(value),
        Value::Null => Ok(Value::mapping()),
        other => Err(decode_error(
            format,
            format!("document root is a {}, expected a mapping", other.kind()),
        )),
    }
}

/// Serialize a value in the given format
pub fn encode(value: &Value, format: DataFormat) -> Result<String, CodecError> {
    let encoded = match format {
        DataFormat::Yaml => serde_yaml::to_string(value).map_err(|e| e.to_string()),
        DataFormat::Json => serde_json::to_string_pretty(value).map_err(|e| e.to_string()),
        DataFormat::Toml => toml::to_string(value).map_err(|e| e.to_string()),
    };

    encoded.map_err(|message| CodecError::Encode { format: format.name().to_string(), message })
}

fn decode_error(format: DataFormat, err: impl std::fmt::Display) -> CodecError {
    CodecError::Decode { format: format.name().to_string(), message: err.to_string() }
}

fn from_yaml(value: serde_yaml::Value) -> Result<Value, String> {
    Ok(match value {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(b) => Value::Bool(b),
        serde_yaml::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Integer(i),
            None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        serde_yaml::Value::String(s) => Value::String(s),
        serde_yaml::Value::Sequence(seq) => {
            Value::List(seq.into_iter().map(from_yaml).collect::<Result<_, _>>()?)
        }
        serde_yaml::Value::Mapping(map) => {
            let mut out = Mapping::with_capacity(map.len());
            for (key, val) in map {
                out.insert(yaml_key(key)?, from_yaml(val)?);
            }
            Value::Mapping(out)
        }
        serde_yaml::Value::Tagged(tagged) => from_yaml(tagged.value)?,
    })
}

// Mapping keys are always strings; scalar YAML keys are stringified.
fn yaml_key(key: serde_yaml::Value) -> Result<String, String> {
    match key {
        serde_yaml::Value::String(s) => Ok(s),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        serde_yaml::Value::Bool(b) => Ok(b.to_string()),
        other => Err(format!("unsupported mapping key: {:?}", other)),
    }
}

fn from_json(value: serde_json::Value) -> Value {
    match value {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Integer(i),
            None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(items) => Value::List(items.into_iter().map(from_json).collect()),
        serde_json::Value::Object(map) => {
            Value::Mapping(map.into_iter().map(|(k, v)| (k, from_json(v))).collect())
        }
    }
}

fn from_toml(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::Integer(i),
        toml::Value::Float(f) => Value::Float(f),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::List(items.into_iter().map(from_toml).collect()),
        toml::Value::Table(table) => {
            Value::Mapping(table.into_iter().map(|(k, v)| (k, from_toml(v))).collect())
        }
    }
}
