// SPDX-License-Identifier: MIT

//! rclone option-map encoding, grounded on
//! `original_source/rclone_bisync_manager/sync.py`'s `get_rclone_args`:
//! `null -> --key`, `true -> --key`, `false -> omitted`, a list repeats
//! `--key value`, and any other scalar becomes `--key value`. Keys are
//! kebab-cased (`_` replaced with `-`) the way the Python does with
//! `key.replace('_', '-')`.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, Visitor};
use serde::ser::SerializeSeq;
use serde::{Deserializer, Serialize, Serializer};

/// Keys disallowed in any `rclone_options`/`bisync_options`/`resync_options`
/// map because the engine injects them itself (spec.md §3).
pub const RESERVED_OPTION_KEYS: &[&str] = &["resync", "bisync", "log-file"];

pub type OptionMap = BTreeMap<String, OptionValue>;

/// One entry in an option map. Mirrors the value shapes the YAML config
/// accepts: a bare flag (`null`), a boolean, a scalar (number or string,
/// normalized to text), or a list of scalars.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    Flag,
    Bool(bool),
    Text(String),
    List(Vec<String>),
}

impl OptionValue {
    /// Append this value's CLI-argument encoding for `key` (already
    /// kebab-cased) onto `args`.
    pub fn encode_into(&self, flag: &str, args: &mut Vec<String>) {
        match self {
            OptionValue::Flag => args.push(flag.to_string()),
            OptionValue::Bool(true) => args.push(flag.to_string()),
            OptionValue::Bool(false) => {}
            OptionValue::Text(value) => {
                args.push(flag.to_string());
                args.push(value.clone());
            }
            OptionValue::List(items) => {
                for item in items {
                    args.push(flag.to_string());
                    args.push(item.clone());
                }
            }
        }
    }
}

/// Kebab-case an option key the way `get_rclone_args` does.
pub fn kebab_flag(key: &str) -> String {
    format!("--{}", key.replace('_', "-"))
}

/// Encode an option map (in key order) into a flat rclone argument list.
pub fn encode_options(options: &OptionMap) -> Vec<String> {
    let mut args = Vec::new();
    for (key, value) in options {
        value.encode_into(&kebab_flag(key), &mut args);
    }
    args
}

impl Serialize for OptionValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            OptionValue::Flag => serializer.serialize_none(),
            OptionValue::Bool(b) => serializer.serialize_bool(*b),
            OptionValue::Text(s) => serializer.serialize_str(s),
            OptionValue::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
        }
    }
}

impl<'de> serde::Deserialize<'de> for OptionValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(OptionValueVisitor)
    }
}

struct OptionValueVisitor;

impl<'de> Visitor<'de> for OptionValueVisitor {
    type Value = OptionValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("null, a bool, a number/string, or a list of scalars")
    }

    fn visit_unit<E>(self) -> Result<OptionValue, E> {
        Ok(OptionValue::Flag)
    }

    fn visit_none<E>(self) -> Result<OptionValue, E> {
        Ok(OptionValue::Flag)
    }

    fn visit_bool<E>(self, v: bool) -> Result<OptionValue, E> {
        Ok(OptionValue::Bool(v))
    }

    fn visit_str<E>(self, v: &str) -> Result<OptionValue, E> {
        Ok(OptionValue::Text(v.to_string()))
    }

    fn visit_string<E>(self, v: String) -> Result<OptionValue, E> {
        Ok(OptionValue::Text(v))
    }

    fn visit_i64<E>(self, v: i64) -> Result<OptionValue, E> {
        Ok(OptionValue::Text(v.to_string()))
    }

    fn visit_u64<E>(self, v: u64) -> Result<OptionValue, E> {
        Ok(OptionValue::Text(v.to_string()))
    }

    fn visit_f64<E>(self, v: f64) -> Result<OptionValue, E> {
        Ok(OptionValue::Text(v.to_string()))
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<OptionValue, A::Error>
    where
        A: de::SeqAccess<'de>,
    {
        let mut items = Vec::new();
        while let Some(scalar) = seq.next_element::<OptionScalar>()? {
            items.push(scalar.0);
        }
        Ok(OptionValue::List(items))
    }
}

/// A single list element, coerced to text the same way a top-level scalar is.
struct OptionScalar(String);

impl<'de> serde::Deserialize<'de> for OptionScalar {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct V;
        impl<'de> Visitor<'de> for V {
            type Value = OptionScalar;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a string, number, or bool")
            }

            fn visit_str<E>(self, v: &str) -> Result<OptionScalar, E> {
                Ok(OptionScalar(v.to_string()))
            }
            fn visit_string<E>(self, v: String) -> Result<OptionScalar, E> {
                Ok(OptionScalar(v))
            }
            fn visit_i64<E>(self, v: i64) -> Result<OptionScalar, E> {
                Ok(OptionScalar(v.to_string()))
            }
            fn visit_u64<E>(self, v: u64) -> Result<OptionScalar, E> {
                Ok(OptionScalar(v.to_string()))
            }
            fn visit_f64<E>(self, v: f64) -> Result<OptionScalar, E> {
                Ok(OptionScalar(v.to_string()))
            }
            fn visit_bool<E>(self, v: bool) -> Result<OptionScalar, E> {
                Ok(OptionScalar(v.to_string()))
            }
        }
        deserializer.deserialize_any(V)
    }
}

/// Validate that none of `options`' keys are in [`RESERVED_OPTION_KEYS`].
pub fn check_reserved_keys(options: &OptionMap) -> Result<(), Vec<String>> {
    let hit: Vec<String> = options
        .keys()
        .filter(|k| RESERVED_OPTION_KEYS.contains(&k.as_str()))
        .cloned()
        .collect();
    if hit.is_empty() {
        Ok(())
    } else {
        Err(hit)
    }
}

#[cfg(test)]
#[path = "options_tests.rs"]
mod tests;
