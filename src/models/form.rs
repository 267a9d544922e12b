//! Raw form input and its coercion into typed values.
//!
//! The UI submits every widget value as it was typed. Numbers may arrive as
//! JSON strings or JSON numbers, so each field is captured as a [`RawField`]
//! and converted only when the record is written. A conversion failure names
//! the offending field instead of aborting the request.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormError {
    #[error("Field '{field}' must be a number, got '{value}'")]
    InvalidNumber { field: &'static str, value: String },

    #[error("Field '{field}' must be yes/no, got '{value}'")]
    InvalidFlag { field: &'static str, value: String },

    #[error("Field '{0}' is required")]
    Missing(&'static str),
}

/// One form value exactly as submitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RawField(String);

impl RawField {
    pub fn as_str(&self) -> &str {
        self.0.trim()
    }

    pub fn is_blank(&self) -> bool {
        self.as_str().is_empty()
    }
}

impl From<&str> for RawField {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for RawField {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for RawField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RawField {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        let text = match value {
            serde_json::Value::Null => String::new(),
            serde_json::Value::String(s) => s,
            serde_json::Value::Number(n) => n.to_string(),
            serde_json::Value::Bool(b) => if b { "1" } else { "0" }.to_string(),
            other => other.to_string(),
        };
        Ok(Self(text))
    }
}

/// A validated record waiting for its row id and timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecord<M> {
    pub patient_id: i64,
    pub measurements: M,
}

/// Measurements that can be listed as labelled values (chat prompts, UI).
pub trait LabelledValues {
    fn labelled_values(&self) -> Vec<(&'static str, String)>;

    /// `Label: value` pairs joined into a single prompt-friendly line.
    fn describe(&self) -> String {
        self.labelled_values()
            .into_iter()
            .map(|(label, value)| format!("{label}: {value}"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

// ═══════════════════════════════════════════
// Coercion helpers
// ═══════════════════════════════════════════

pub fn parse_int(field: &'static str, raw: &RawField) -> Result<i64, FormError> {
    if raw.is_blank() {
        return Err(FormError::Missing(field));
    }
    let text = raw.as_str();
    if let Ok(v) = text.parse::<i64>() {
        return Ok(v);
    }
    // Number widgets can submit "72.0" for an integer field
    match text.parse::<f64>() {
        Ok(v) if v.fract() == 0.0 && (i64::MIN as f64..i64::MAX as f64).contains(&v) => {
            Ok(v as i64)
        }
        _ => Err(FormError::InvalidNumber {
            field,
            value: text.to_string(),
        }),
    }
}

/// Integer field that defaults when left blank.
pub fn parse_int_or(field: &'static str, raw: &RawField, default: i64) -> Result<i64, FormError> {
    if raw.is_blank() {
        return Ok(default);
    }
    parse_int(field, raw)
}

pub fn parse_real(field: &'static str, raw: &RawField) -> Result<f64, FormError> {
    if raw.is_blank() {
        return Err(FormError::Missing(field));
    }
    let text = raw.as_str();
    match text.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(FormError::InvalidNumber {
            field,
            value: text.to_string(),
        }),
    }
}

/// Yes/no widget value as 0/1.
pub fn parse_flag(field: &'static str, raw: &RawField) -> Result<i64, FormError> {
    if raw.is_blank() {
        return Err(FormError::Missing(field));
    }
    match raw.as_str().to_ascii_lowercase().as_str() {
        "1" | "yes" | "y" | "true" => Ok(1),
        "0" | "no" | "n" | "false" => Ok(0),
        other => Err(FormError::InvalidFlag {
            field,
            value: other.to_string(),
        }),
    }
}

pub fn required_text(field: &'static str, raw: &RawField) -> Result<String, FormError> {
    if raw.is_blank() {
        return Err(FormError::Missing(field));
    }
    Ok(raw.as_str().to_string())
}

pub fn optional_text(raw: &RawField) -> Option<String> {
    if raw.is_blank() {
        None
    } else {
        Some(raw.as_str().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_accepts_whole_floats() {
        assert_eq!(parse_int("age", &"42".into()).unwrap(), 42);
        assert_eq!(parse_int("age", &" 42.0 ".into()).unwrap(), 42);
    }

    #[test]
    fn int_rejects_text_with_field_name() {
        let err = parse_int("glucose", &"abc".into()).unwrap_err();
        assert_eq!(
            err,
            FormError::InvalidNumber {
                field: "glucose",
                value: "abc".into()
            }
        );
        assert!(err.to_string().contains("glucose"));
    }

    #[test]
    fn int_rejects_fractional_values() {
        assert!(matches!(
            parse_int("insulin", &"1.5".into()),
            Err(FormError::InvalidNumber { field: "insulin", .. })
        ));
    }

    #[test]
    fn int_rejects_out_of_range_floats() {
        assert!(matches!(
            parse_int("glucose", &"1e300".into()),
            Err(FormError::InvalidNumber { field: "glucose", .. })
        ));
        assert!(parse_int("glucose", &"-1e19".into()).is_err());
        assert!(parse_int("glucose", &"inf".into()).is_err());
    }

    #[test]
    fn blank_required_field_is_missing() {
        assert_eq!(parse_real("bmi", &"  ".into()), Err(FormError::Missing("bmi")));
        assert_eq!(required_text("name", &"".into()), Err(FormError::Missing("name")));
    }

    #[test]
    fn blank_with_default() {
        assert_eq!(parse_int_or("pregnancies", &"".into(), 0).unwrap(), 0);
        assert_eq!(parse_int_or("pregnancies", &"3".into(), 0).unwrap(), 3);
    }

    #[test]
    fn real_rejects_non_finite() {
        assert!(parse_real("fo", &"NaN".into()).is_err());
        assert!(parse_real("fo", &"inf".into()).is_err());
        assert_eq!(parse_real("fo", &"119.992".into()).unwrap(), 119.992);
    }

    #[test]
    fn flag_variants() {
        assert_eq!(parse_flag("smoking", &"Yes".into()).unwrap(), 1);
        assert_eq!(parse_flag("smoking", &"0".into()).unwrap(), 0);
        assert_eq!(parse_flag("smoking", &"false".into()).unwrap(), 0);
        assert!(matches!(
            parse_flag("smoking", &"maybe".into()),
            Err(FormError::InvalidFlag { field: "smoking", .. })
        ));
    }

    #[test]
    fn raw_field_from_json_number_or_string() {
        #[derive(Deserialize)]
        struct Probe {
            a: RawField,
            b: RawField,
            c: RawField,
            #[serde(default)]
            d: RawField,
        }
        let probe: Probe = serde_json::from_str(r#"{"a": 12.5, "b": "7", "c": true}"#).unwrap();
        assert_eq!(probe.a.as_str(), "12.5");
        assert_eq!(probe.b.as_str(), "7");
        assert_eq!(probe.c.as_str(), "1");
        assert!(probe.d.is_blank());
    }
}
