//! # Canonical Serialization
//!
//! [`CanonicalBytes`] is the sole construction path for bytes that feed a
//! digest. The inner buffer is private; the only constructor serializes
//! through `serde_json::Value` and then writes it out with sorted keys,
//! independent of whether `serde_json` was built with `preserve_order`.
//!
//! ## Coercion Rules
//!
//! 1. Floats are rejected. Amounts travel as strings or integers.
//! 2. Object keys are sorted lexicographically.
//! 3. No insignificant whitespace.

use serde::Serialize;
use serde_json::Value;

use crate::error::CanonicalizationError;

/// Bytes produced exclusively by canonical serialization.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Canonicalize any serializable value.
    pub fn new(obj: &impl Serialize) -> Result<Self, CanonicalizationError> {
        let value = serde_json::to_value(obj)?;
        reject_floats(&value)?;
        let mut out = Vec::new();
        write_canonical(&value, &mut out)?;
        Ok(Self(out))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

fn reject_floats(value: &Value) -> Result<(), CanonicalizationError> {
    match value {
        Value::Number(n) if n.is_f64() => Err(CanonicalizationError::FloatRejected(
            n.as_f64().unwrap_or(f64::NAN),
        )),
        Value::Array(items) => items.iter().try_for_each(reject_floats),
        Value::Object(map) => map.values().try_for_each(reject_floats),
        _ => Ok(()),
    }
}

fn write_canonical(value: &Value, out: &mut Vec<u8>) -> Result<(), CanonicalizationError> {
    match value {
        Value::Array(items) => {
            out.push(b'[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                write_canonical(item, out)?;
            }
            out.push(b']');
        }
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            out.push(b'{');
            for (i, (key, item)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                serde_json::to_writer(&mut *out, key)?;
                out.push(b':');
                write_canonical(item, out)?;
            }
            out.push(b'}');
        }
        scalar => serde_json::to_writer(&mut *out, scalar)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn keys_are_sorted_and_compact() {
        let value = json!({"b": 1, "a": {"d": true, "c": null}});
        let bytes = CanonicalBytes::new(&value).unwrap();
        assert_eq!(bytes.as_bytes(), br#"{"a":{"c":null,"d":true},"b":1}"#);
    }

    #[test]
    fn floats_are_rejected_at_any_depth() {
        let value = json!({"outer": [1, {"premium": 1.5}]});
        let err = CanonicalBytes::new(&value).unwrap_err();
        assert!(matches!(err, CanonicalizationError::FloatRejected(f) if f == 1.5));
    }

    #[test]
    fn integers_and_strings_pass() {
        let value = json!({"amount": "1000000000000000000", "count": 3});
        let bytes = CanonicalBytes::new(&value).unwrap();
        assert_eq!(
            bytes.into_bytes(),
            br#"{"amount":"1000000000000000000","count":3}"#.to_vec()
        );
    }
}
