// ABOUTME: Provider-specific cloud property values and their manifest sources.
// ABOUTME: Sources are literals or env var references resolved on demand.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Resolved cloud properties, keyed by provider-defined names.
pub type CloudProperties = BTreeMap<String, PropertyValue>;

/// A value a provider accepts as a cloud property.
///
/// Integers that do not fit in `i64` land in `UInteger` rather than being
/// rounded into a `Float`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Null,
    Bool(bool),
    Integer(i64),
    UInteger(u64),
    Float(f64),
    String(String),
    List(Vec<PropertyValue>),
    Map(BTreeMap<String, PropertyValue>),
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::String(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::String(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Integer(value)
    }
}

impl From<u64> for PropertyValue {
    fn from(value: u64) -> Self {
        PropertyValue::UInteger(value)
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Float(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

/// Reference to an environment variable, with an optional fallback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnvReference {
    pub env: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<PropertyValue>,
}

/// Where a cloud property's value comes from.
///
/// A mapping with exactly an `env` key (and optionally `default`) is an
/// environment reference. Anything else is taken literally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertySource {
    FromEnv(EnvReference),
    Literal(PropertyValue),
}

impl PropertySource {
    pub fn from_env(var: impl Into<String>, default: Option<PropertyValue>) -> Self {
        PropertySource::FromEnv(EnvReference {
            env: var.into(),
            default,
        })
    }

    pub fn resolve(&self) -> Result<PropertyValue, PropertyError> {
        match self {
            PropertySource::Literal(value) => Ok(value.clone()),
            PropertySource::FromEnv(EnvReference { env, default }) => match std::env::var(env) {
                Ok(val) => Ok(parse_env_scalar(val)),
                Err(std::env::VarError::NotUnicode(_)) => {
                    Err(PropertyError::InvalidEnvVar(env.clone()))
                }
                Err(std::env::VarError::NotPresent) => default
                    .clone()
                    .ok_or_else(|| PropertyError::MissingEnvVar(env.clone())),
            },
        }
    }
}

/// Read an env var value the way the same text would read as a YAML scalar,
/// so `DISK_IOPS=3000` and `default: 3000` resolve to the same value.
/// Anything that is not a bool or number stays a string.
fn parse_env_scalar(val: String) -> PropertyValue {
    match serde_yaml::from_str::<PropertyValue>(&val) {
        Ok(
            scalar @ (PropertyValue::Bool(_)
            | PropertyValue::Integer(_)
            | PropertyValue::UInteger(_)
            | PropertyValue::Float(_)),
        ) => scalar,
        _ => PropertyValue::String(val),
    }
}

/// Non-finite floats do not survive a JSON round trip and never compare
/// equal to themselves, so they are rejected anywhere in a value.
fn ensure_finite(key: &str, value: &PropertyValue) -> Result<(), PropertyError> {
    match value {
        PropertyValue::Float(f) if !f.is_finite() => {
            Err(PropertyError::NonFiniteFloat(key.to_string()))
        }
        PropertyValue::List(items) => items.iter().try_for_each(|v| ensure_finite(key, v)),
        PropertyValue::Map(entries) => entries.values().try_for_each(|v| ensure_finite(key, v)),
        _ => Ok(()),
    }
}

impl From<PropertyValue> for PropertySource {
    fn from(value: PropertyValue) -> Self {
        PropertySource::Literal(value)
    }
}

impl From<&str> for PropertySource {
    fn from(value: &str) -> Self {
        PropertySource::Literal(value.into())
    }
}

impl From<i64> for PropertySource {
    fn from(value: i64) -> Self {
        PropertySource::Literal(value.into())
    }
}

/// Errors from resolving cloud property sources.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PropertyError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("environment variable is not valid unicode: {0}")]
    InvalidEnvVar(String),

    #[error("cloud property '{0}' must be a finite number")]
    NonFiniteFloat(String),
}

/// Resolve every source in a property map, failing on the first bad entry.
pub fn resolve_properties(
    sources: &BTreeMap<String, PropertySource>,
) -> Result<CloudProperties, PropertyError> {
    sources
        .iter()
        .map(|(k, v)| {
            let resolved = v.resolve()?;
            ensure_finite(k, &resolved)?;
            Ok((k.clone(), resolved))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_reference_parses_before_literal_map() {
        let source: PropertySource = serde_yaml::from_str("{ env: DISK_TYPE }").unwrap();
        assert_eq!(source, PropertySource::from_env("DISK_TYPE", None));

        let literal: PropertySource =
            serde_yaml::from_str("{ env: DISK_TYPE, zone: us-east-1a }").unwrap();
        assert!(matches!(literal, PropertySource::Literal(PropertyValue::Map(_))));
    }

    #[test]
    fn scalar_kinds_parse_into_matching_variants() {
        let value: PropertyValue =
            serde_yaml::from_str("[true, 3, 1.5, ssd, null, {a: b}]").unwrap();
        let PropertyValue::List(items) = value else {
            panic!("expected a list");
        };
        assert_eq!(items[0], PropertyValue::Bool(true));
        assert_eq!(items[1], PropertyValue::Integer(3));
        assert_eq!(items[2], PropertyValue::Float(1.5));
        assert_eq!(items[3], PropertyValue::String("ssd".to_string()));
        assert_eq!(items[4], PropertyValue::Null);
        assert!(matches!(items[5], PropertyValue::Map(_)));
    }

    #[test]
    fn integers_beyond_i64_stay_exact() {
        let value: PropertyValue = serde_yaml::from_str("18446744073709551615").unwrap();
        assert_eq!(value, PropertyValue::UInteger(u64::MAX));

        let value: PropertyValue = serde_yaml::from_str("-5").unwrap();
        assert_eq!(value, PropertyValue::Integer(-5));
    }

    #[test]
    fn env_scalars_parse_like_yaml() {
        assert_eq!(parse_env_scalar("3000".to_string()), PropertyValue::Integer(3000));
        assert_eq!(parse_env_scalar("true".to_string()), PropertyValue::Bool(true));
        assert_eq!(parse_env_scalar("0.5".to_string()), PropertyValue::Float(0.5));
        assert_eq!(parse_env_scalar("gp3".to_string()), PropertyValue::from("gp3"));
        assert_eq!(parse_env_scalar("a: b".to_string()), PropertyValue::from("a: b"));
        assert_eq!(parse_env_scalar(String::new()), PropertyValue::from(""));
    }

    #[test]
    fn non_finite_floats_are_rejected_at_any_depth() {
        let sources = BTreeMap::from([(
            "tuning".to_string(),
            PropertySource::Literal(PropertyValue::List(vec![PropertyValue::Float(
                f64::NAN,
            )])),
        )]);
        assert_eq!(
            resolve_properties(&sources),
            Err(PropertyError::NonFiniteFloat("tuning".to_string()))
        );
    }

    #[test]
    fn literal_resolves_to_itself() {
        let source = PropertySource::from(42_i64);
        assert_eq!(source.resolve().unwrap(), PropertyValue::Integer(42));
    }
}
