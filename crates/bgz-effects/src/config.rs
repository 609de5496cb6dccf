//! Option parsing: sparse option tables merged onto typed defaults
//!
//! Every effect reads its options through an `OptionReader`, which performs
//! all type and value validation up front so nothing is checked again once
//! the effect is running. Keys may be given in snake_case or in the
//! camelCase form (`burst_speed` / `burstSpeed`).

use bgz_core::{BgzError, Color, ConfigError, Result};
use serde::Serialize;
use std::collections::BTreeSet;
use toml::Value;

use crate::rand::ParticleRng;

/// Sparse options mapping handed to an effect
pub type Options = toml::Table;

/// Parse an options table from TOML text
pub fn parse_options(text: &str) -> Result<Options> {
    Ok(toml::from_str(text)?)
}

/// A `[min, max)` sampling range
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ValueRange {
    pub min: f32,
    pub max: f32,
}

impl ValueRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn sample(&self, rng: &mut ParticleRng) -> f32 {
        rng.range(self.min, self.max)
    }
}

/// Reads typed options out of a sparse table, remembering which keys were used
pub struct OptionReader<'a> {
    table: &'a Options,
    aliases: Vec<(&'static str, &'static str)>,
    consumed: BTreeSet<String>,
}

impl<'a> OptionReader<'a> {
    pub fn new(table: &'a Options) -> Self {
        Self {
            table,
            aliases: Vec::new(),
            consumed: BTreeSet::new(),
        }
    }

    /// Accept `alias` as another spelling of option `name`
    pub fn alias(&mut self, alias: &'static str, name: &'static str) -> &mut Self {
        self.aliases.push((alias, name));
        self
    }

    /// Look up an option under any accepted spelling
    pub fn raw(&mut self, name: &str) -> Option<&'a Value> {
        let camel = snake_to_camel(name);
        let mut keys = vec![name.to_string(), camel];
        keys.extend(
            self.aliases
                .iter()
                .filter(|(_, target)| *target == name)
                .map(|(alias, _)| alias.to_string()),
        );
        let table = self.table;
        for key in keys {
            if let Some(value) = table.get(&key) {
                self.consumed.insert(key);
                return Some(value);
            }
        }
        None
    }

    /// Any finite number
    pub fn number(&mut self, name: &str, default: f32) -> Result<f32> {
        match self.raw(name) {
            Some(value) => number_value(name, value),
            None => Ok(default),
        }
    }

    /// A finite number >= 0
    pub fn non_negative(&mut self, name: &str, default: f32) -> Result<f32> {
        let value = self.number(name, default)?;
        if value < 0.0 {
            return Err(ConfigError::Negative {
                field: name.to_string(),
                value: value as f64,
            }
            .into());
        }
        Ok(value)
    }

    /// A finite number > 0
    pub fn positive(&mut self, name: &str, default: f32) -> Result<f32> {
        let value = self.number(name, default)?;
        if value <= 0.0 {
            return Err(ConfigError::NotPositive {
                field: name.to_string(),
                value: value as f64,
            }
            .into());
        }
        Ok(value)
    }

    /// A finite number within `[0, 1]`
    pub fn fraction(&mut self, name: &str, default: f32) -> Result<f32> {
        let value = self.non_negative(name, default)?;
        if value > 1.0 {
            return Err(ConfigError::OutOfBounds {
                field: name.to_string(),
                value: value as f64,
                min: 0.0,
                max: 1.0,
            }
            .into());
        }
        Ok(value)
    }

    /// A finite number >= `min`
    pub fn at_least(&mut self, name: &str, default: f32, min: f32) -> Result<f32> {
        let value = self.number(name, default)?;
        if value < min {
            return Err(ConfigError::BelowMinimum {
                field: name.to_string(),
                value: value as f64,
                min: min as f64,
            }
            .into());
        }
        Ok(value)
    }

    /// A non-negative whole number
    pub fn count(&mut self, name: &str, default: usize) -> Result<usize> {
        let Some(value) = self.raw(name) else {
            return Ok(default);
        };
        match value {
            Value::Integer(i) if *i >= 0 => Ok(*i as usize),
            Value::Integer(i) => Err(ConfigError::Negative {
                field: name.to_string(),
                value: *i as f64,
            }
            .into()),
            Value::Float(f) if !f.is_finite() => Err(not_finite(name, *f)),
            Value::Float(f) if *f < 0.0 => Err(ConfigError::Negative {
                field: name.to_string(),
                value: *f,
            }
            .into()),
            // Counts written as 10.0 are accepted, 10.5 is not
            Value::Float(f) if f.fract() == 0.0 => Ok(*f as usize),
            other => Err(wrong_type(name, "non-negative integer", other)),
        }
    }

    pub fn color(&mut self, name: &str, default: Color) -> Result<Color> {
        match self.raw(name) {
            Some(value) => color_value(name, value),
            None => Ok(default),
        }
    }

    /// A non-empty list of colors; a single color string is a one-color list
    pub fn colors(&mut self, name: &str, default: &[Color]) -> Result<Vec<Color>> {
        let Some(value) = self.raw(name) else {
            return Ok(default.to_vec());
        };
        let colors = match value {
            Value::Array(items) => items
                .iter()
                .map(|item| color_value(name, item))
                .collect::<Result<Vec<_>>>()?,
            Value::String(_) => vec![color_value(name, value)?],
            other => return Err(wrong_type(name, "array of colors", other)),
        };
        if colors.is_empty() {
            return Err(ConfigError::Empty {
                field: name.to_string(),
            }
            .into());
        }
        Ok(colors)
    }

    /// A non-empty string
    pub fn text(&mut self, name: &str, default: &str) -> Result<String> {
        let Some(value) = self.raw(name) else {
            return Ok(default.to_string());
        };
        let Value::String(s) = value else {
            return Err(wrong_type(name, "string", value));
        };
        if s.is_empty() {
            return Err(ConfigError::Empty {
                field: name.to_string(),
            }
            .into());
        }
        Ok(s.clone())
    }

    /// Either a `{ min, max }` table with `min < max`, or a single
    /// non-negative number turned into a range by `from_number`
    pub fn range(
        &mut self,
        name: &str,
        default: ValueRange,
        from_number: impl Fn(f32) -> ValueRange,
    ) -> Result<ValueRange> {
        let Some(value) = self.raw(name) else {
            return Ok(default);
        };
        match value {
            Value::Table(t) => {
                let bound = |key: &str| -> Result<f32> {
                    let field = format!("{name}.{key}");
                    match t.get(key) {
                        Some(v) => number_value(&field, v),
                        None => Err(ConfigError::InvalidFieldType {
                            field,
                            expected: "number".into(),
                            got: "nothing".into(),
                        }
                        .into()),
                    }
                };
                let (min, max) = (bound("min")?, bound("max")?);
                if min >= max {
                    return Err(ConfigError::InvalidRange {
                        field: name.to_string(),
                        min: min as f64,
                        max: max as f64,
                    }
                    .into());
                }
                Ok(ValueRange::new(min, max))
            }
            Value::Integer(_) | Value::Float(_) => {
                let n = number_value(name, value)?;
                if n < 0.0 {
                    return Err(ConfigError::Negative {
                        field: name.to_string(),
                        value: n as f64,
                    }
                    .into());
                }
                Ok(from_number(n))
            }
            other => Err(wrong_type(name, "number or { min, max } table", other)),
        }
    }

    /// One of `allowed`
    pub fn choice(&mut self, name: &str, allowed: &[&str], default: &str) -> Result<String> {
        let Some(value) = self.raw(name) else {
            return Ok(default.to_string());
        };
        let Value::String(s) = value else {
            return Err(wrong_type(name, "string", value));
        };
        if !allowed.contains(&s.as_str()) {
            return Err(ConfigError::InvalidEnumValue {
                field: name.to_string(),
                value: s.clone(),
                allowed: allowed.iter().map(|a| a.to_string()).collect(),
            }
            .into());
        }
        Ok(s.clone())
    }

    /// Keys present in the table that no reader call asked for
    pub fn unused_keys(&self) -> Vec<String> {
        self.table
            .keys()
            .filter(|k| !self.consumed.contains(*k))
            .cloned()
            .collect()
    }

    /// Warn about ignored keys; unknown options are not an error
    pub fn finish(self, effect: &str) {
        for key in self.unused_keys() {
            tracing::warn!(effect, option = %key, "ignoring unknown option");
        }
    }
}

/// Read a finite number from a TOML value
pub fn number_value(field: &str, value: &Value) -> Result<f32> {
    let n = match value {
        Value::Integer(i) => *i as f64,
        Value::Float(f) => *f,
        other => return Err(wrong_type(field, "number", other)),
    };
    if !n.is_finite() || !(n as f32).is_finite() {
        return Err(not_finite(field, n));
    }
    Ok(n as f32)
}

fn color_value(field: &str, value: &Value) -> Result<Color> {
    let Value::String(s) = value else {
        return Err(wrong_type(field, "color string", value));
    };
    Color::parse(s).ok_or_else(|| {
        ConfigError::InvalidColor {
            field: field.to_string(),
            value: s.clone(),
        }
        .into()
    })
}

fn not_finite(field: &str, value: f64) -> BgzError {
    ConfigError::NotFinite {
        field: field.to_string(),
        value,
    }
    .into()
}

pub(crate) fn wrong_type(field: &str, expected: &str, got: &Value) -> BgzError {
    ConfigError::InvalidFieldType {
        field: field.to_string(),
        expected: expected.to_string(),
        got: got.type_str().to_string(),
    }
    .into()
}

fn snake_to_camel(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = false;
    for c in name.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.push(c.to_ascii_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Serialize a resolved config into a table for display
pub(crate) fn to_table<T: Serialize>(config: &T) -> Options {
    match Value::try_from(config) {
        Ok(Value::Table(table)) => table,
        _ => Options::new(),
    }
}
