//! Strategy parameter values, schemas and resolution.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::error::AavcError;

#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Float(f64),
    Int(i64),
    Text(String),
}

impl ParamValue {
    /// Numeric view; integers widen to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Float(v) => Some(*v),
            ParamValue::Int(v) => Some(*v as f64),
            ParamValue::Text(_) => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ParamValue::Int(v) => Some(*v),
            ParamValue::Float(v) if v.fract() == 0.0 => Some(*v as i64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Parse a raw string (from a CLI flag or config file): int, then float,
    /// then text.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if let Ok(i) = raw.parse::<i64>() {
            ParamValue::Int(i)
        } else if let Ok(f) = raw.parse::<f64>() {
            ParamValue::Float(f)
        } else {
            ParamValue::Text(raw.to_string())
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Float(v) => write!(f, "{}", v),
            ParamValue::Int(v) => write!(f, "{}", v),
            ParamValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Float(v)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Text(v.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Float,
    Int,
    Text,
}

impl ParamKind {
    /// Whether `value` is acceptable for a parameter of this kind.
    /// Floats accept integers; ints accept integral floats.
    pub fn accepts(self, value: &ParamValue) -> bool {
        match self {
            ParamKind::Float => value.as_f64().is_some(),
            ParamKind::Int => value.as_i64().is_some(),
            ParamKind::Text => value.as_str().is_some(),
        }
    }
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParamKind::Float => "float",
            ParamKind::Int => "int",
            ParamKind::Text => "str",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    pub kind: ParamKind,
    /// `None` means the parameter is optional with no value by default.
    pub default: Option<ParamValue>,
    pub description: String,
}

impl ParamSpec {
    pub fn float(default: f64, description: &str) -> Self {
        Self {
            kind: ParamKind::Float,
            default: Some(ParamValue::Float(default)),
            description: description.to_string(),
        }
    }

    pub fn optional_float(description: &str) -> Self {
        Self {
            kind: ParamKind::Float,
            default: None,
            description: description.to_string(),
        }
    }

    pub fn int(default: i64, description: &str) -> Self {
        Self {
            kind: ParamKind::Int,
            default: Some(ParamValue::Int(default)),
            description: description.to_string(),
        }
    }

    pub fn text(default: &str, description: &str) -> Self {
        Self {
            kind: ParamKind::Text,
            default: Some(ParamValue::Text(default.to_string())),
            description: description.to_string(),
        }
    }
}

/// Declared parameter schema: name → spec.
pub type ParamSchema = BTreeMap<String, ParamSpec>;

/// Parameter set scoped to one strategy instance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StrategyParameters {
    values: BTreeMap<String, ParamValue>,
}

impl StrategyParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: &str, value: impl Into<ParamValue>) {
        self.values.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.values.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.values.get(key).and_then(ParamValue::as_f64)
    }

    pub fn f64_or(&self, key: &str, default: f64) -> f64 {
        self.get_f64(key).unwrap_or(default)
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.values.get(key).and_then(ParamValue::as_i64)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(ParamValue::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ParamValue)> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Merge declared defaults ← `base` ← `overrides`.
    ///
    /// Only keys present in `schema` flow through either layer; anything
    /// else is dropped.
    pub fn resolve(schema: &ParamSchema, base: &Self, overrides: &Self) -> Self {
        let mut resolved = Self::new();
        for (name, spec) in schema {
            if let Some(default) = &spec.default {
                resolved.values.insert(name.clone(), default.clone());
            }
        }
        for layer in [base, overrides] {
            for (key, value) in &layer.values {
                if schema.contains_key(key) {
                    resolved.values.insert(key.clone(), value.clone());
                }
            }
        }
        resolved
    }

    /// Check every present value against its declared kind.
    pub fn check_kinds(&self, strategy: &str, schema: &ParamSchema) -> Result<(), AavcError> {
        for (key, value) in &self.values {
            if let Some(spec) = schema.get(key) {
                if !spec.kind.accepts(value) {
                    return Err(AavcError::invalid_params(
                        strategy,
                        format!("{} must be {}, got {:?}", key, spec.kind, value),
                    ));
                }
            }
        }
        Ok(())
    }
}

impl FromIterator<(String, ParamValue)> for StrategyParameters {
    fn from_iter<T: IntoIterator<Item = (String, ParamValue)>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// How often a strategy considers investing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvestmentFrequency {
    Daily,
    Monthly,
}

impl FromStr for InvestmentFrequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" => Ok(InvestmentFrequency::Daily),
            "monthly" => Ok(InvestmentFrequency::Monthly),
            other => Err(format!(
                "investment_frequency must be daily or monthly, got {}",
                other
            )),
        }
    }
}

impl fmt::Display for InvestmentFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvestmentFrequency::Daily => f.write_str("daily"),
            InvestmentFrequency::Monthly => f.write_str("monthly"),
        }
    }
}
