//! YAML loading via yaml-rust2
//!
//! Documents are parsed with yaml-rust2, converted to `serde_json::Value`, and
//! then deserialized with serde. Keeping serde_json as the single data model
//! means every typed struct only needs the usual `Deserialize` derive.

use serde::de::DeserializeOwned;
use serde_json::{Map, Number, Value};
use thiserror::Error;
use yaml_rust2::{Yaml, YamlLoader};

use crate::Error;

/// Error produced when text is not a single well-formed YAML document
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct YamlError(String);

/// Load exactly one YAML document as a `serde_json::Value`.
///
/// Empty input yields `Value::Null`. Input holding more than one document is
/// rejected rather than silently truncated.
pub fn load_document(input: &str) -> Result<Value, YamlError> {
    let mut docs = YamlLoader::load_from_str(input).map_err(|e| YamlError(e.to_string()))?;
    match docs.len() {
        0 => Ok(Value::Null),
        1 => to_json(docs.remove(0)),
        n => Err(YamlError(format!("expected a single YAML document, found {n}"))),
    }
}

/// Parse a single YAML document straight into a typed value.
///
/// Malformed YAML becomes [`Error::Yaml`]; well-formed YAML whose shape does
/// not match `T` becomes [`Error::Serialization`].
pub fn from_yaml_str<T: DeserializeOwned>(input: &str) -> Result<T, Error> {
    let value = load_document(input)?;
    serde_json::from_value(value).map_err(|e| Error::serialization(e.to_string()))
}

fn to_json(yaml: Yaml) -> Result<Value, YamlError> {
    Ok(match yaml {
        Yaml::Null => Value::Null,
        Yaml::Boolean(b) => Value::Bool(b),
        Yaml::Integer(i) => Value::Number(i.into()),
        Yaml::Real(raw) => {
            let f: f64 = raw
                .parse()
                .map_err(|_| YamlError(format!("invalid float '{raw}'")))?;
            Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null)
        }
        Yaml::String(s) => Value::String(s),
        Yaml::Array(items) => Value::Array(
            items
                .into_iter()
                .map(to_json)
                .collect::<Result<Vec<_>, _>>()?,
        ),
        Yaml::Hash(hash) => {
            let mut map = Map::with_capacity(hash.len());
            for (k, v) in hash {
                map.insert(key_string(k)?, to_json(v)?);
            }
            Value::Object(map)
        }
        Yaml::Alias(_) => return Err(YamlError("YAML aliases are not supported".to_string())),
        Yaml::BadValue => return Err(YamlError("bad YAML value".to_string())),
    })
}

fn key_string(key: Yaml) -> Result<String, YamlError> {
    match key {
        Yaml::String(s) | Yaml::Real(s) => Ok(s),
        Yaml::Integer(i) => Ok(i.to_string()),
        Yaml::Boolean(b) => Ok(b.to_string()),
        Yaml::Null => Ok("null".to_string()),
        other => Err(YamlError(format!("unsupported YAML key: {other:?}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[test]
    fn loads_nested_document() {
        let yaml = r#"
schemaVersion: 2.2.0
metadata:
  name: nodejs
components:
  - name: runtime
    container:
      image: node:18
"#;
        let doc = load_document(yaml).unwrap();
        assert_eq!(doc["schemaVersion"], "2.2.0");
        assert_eq!(doc["metadata"]["name"], "nodejs");
        assert_eq!(doc["components"][0]["container"]["image"], "node:18");
    }

    #[test]
    fn empty_input_is_null() {
        assert_eq!(load_document("").unwrap(), Value::Null);
    }

    #[test]
    fn rejects_multiple_documents() {
        let err = load_document("a: 1\n---\nb: 2\n").unwrap_err();
        assert!(err.to_string().contains("found 2"));
    }

    #[test]
    fn rejects_malformed_yaml() {
        assert!(load_document("not: valid: yaml: {{").is_err());
    }

    #[test]
    fn scalars_convert_to_json_types() {
        let doc = load_document("port: 3000\nsecure: true\nratio: 1.5\nnothing: null").unwrap();
        assert_eq!(doc["port"], 3000);
        assert_eq!(doc["secure"], true);
        assert!((doc["ratio"].as_f64().unwrap() - 1.5).abs() < f64::EPSILON);
        assert!(doc["nothing"].is_null());
    }

    #[test]
    fn integer_keys_become_strings() {
        let doc = load_document("8080: http").unwrap();
        assert_eq!(doc["8080"], "http");
    }

    #[derive(Deserialize, Debug, PartialEq)]
    struct Endpoint {
        name: String,
        #[serde(rename = "targetPort")]
        target_port: u16,
    }

    #[test]
    fn deserializes_into_typed_values() {
        let ep: Endpoint = from_yaml_str("name: http\ntargetPort: 3000").unwrap();
        assert_eq!(
            ep,
            Endpoint {
                name: "http".to_string(),
                target_port: 3000
            }
        );
    }

    #[test]
    fn shape_mismatch_is_a_serialization_error() {
        let err = from_yaml_str::<Endpoint>("name: http").unwrap_err();
        assert!(matches!(err, Error::Serialization { .. }));
    }

    #[test]
    fn bad_yaml_is_a_yaml_error() {
        let err = from_yaml_str::<Endpoint>("name: [unclosed").unwrap_err();
        assert!(matches!(err, Error::Yaml(_)));
    }
}
