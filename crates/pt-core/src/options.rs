//! Option values attached to component instances.

use std::collections::BTreeMap;

use crate::error::{PtError, PtResult};

/// A single option value from a description.
///
/// Arrays carry one value per evaluation point (or a fixed small count);
/// everything else counts as a scalar.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(untagged)
)]
pub enum OptionValue {
    Flag(bool),
    Integer(i64),
    Number(f64),
    Text(String),
    Array(Vec<f64>),
}

impl OptionValue {
    /// Number of values carried: 1 for scalars, the length for arrays.
    pub fn cardinality(&self) -> usize {
        match self {
            OptionValue::Array(values) => values.len(),
            _ => 1,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            OptionValue::Flag(_) => "flag",
            OptionValue::Integer(_) => "integer",
            OptionValue::Number(_) => "number",
            OptionValue::Text(_) => "text",
            OptionValue::Array(_) => "array",
        }
    }

    pub fn as_f64(&self) -> PtResult<f64> {
        match self {
            OptionValue::Integer(v) => Ok(*v as f64),
            OptionValue::Number(v) => Ok(*v),
            other => Err(PtError::OptionType {
                expected: "number",
                found: other.kind_name(),
            }),
        }
    }

    /// Non-negative integer value (counts such as `number_of_points`).
    pub fn as_count(&self) -> PtResult<usize> {
        match self {
            OptionValue::Integer(v) if *v >= 0 => Ok(*v as usize),
            other => Err(PtError::OptionType {
                expected: "non-negative integer",
                found: other.kind_name(),
            }),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptionValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<f64> for OptionValue {
    fn from(v: f64) -> Self {
        OptionValue::Number(v)
    }
}

impl From<i64> for OptionValue {
    fn from(v: i64) -> Self {
        OptionValue::Integer(v)
    }
}

impl From<bool> for OptionValue {
    fn from(v: bool) -> Self {
        OptionValue::Flag(v)
    }
}

impl From<&str> for OptionValue {
    fn from(v: &str) -> Self {
        OptionValue::Text(v.to_string())
    }
}

impl From<Vec<f64>> for OptionValue {
    fn from(v: Vec<f64>) -> Self {
        OptionValue::Array(v)
    }
}

/// Ordered name → value map.
///
/// Deserialization rejects duplicate keys instead of silently keeping the
/// last one.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(transparent))]
pub struct OptionMap(BTreeMap<String, OptionValue>);

impl OptionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Insert a value, returning the previous one if the key was present.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: impl Into<OptionValue>,
    ) -> Option<OptionValue> {
        self.0.insert(name.into(), value.into())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> + '_ {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, OptionValue)> for OptionMap {
    fn from_iter<I: IntoIterator<Item = (String, OptionValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for OptionMap {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OptionMapVisitor;

        impl<'de> serde::de::Visitor<'de> for OptionMapVisitor {
            type Value = OptionMap;

            fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str("a map of option names to values")
            }

            fn visit_map<A: serde::de::MapAccess<'de>>(
                self,
                mut map: A,
            ) -> Result<OptionMap, A::Error> {
                let mut entries = BTreeMap::new();
                while let Some((key, value)) = map.next_entry::<String, OptionValue>()? {
                    if entries.contains_key(&key) {
                        return Err(serde::de::Error::custom(format!("duplicate key `{key}`")));
                    }
                    entries.insert(key, value);
                }
                Ok(OptionMap(entries))
            }
        }

        deserializer.deserialize_map(OptionMapVisitor)
    }
}
