//! Argument validators.
//!
//! A [`Validator`] is either a constraint, which must pass, or a type check.
//! An argument passes its type checks when ANY of them matches, and its
//! constraints only when ALL of them pass.

use std::fmt;
use std::rc::Rc;

/// A check every bound value must pass.
pub trait Constraint {
    /// `Err` carries a human-readable description of the failure.
    fn check(&self, value: Option<&str>) -> Result<(), String>;
}

impl<F> Constraint for F
where
    F: Fn(Option<&str>) -> Result<(), String>,
{
    fn check(&self, value: Option<&str>) -> Result<(), String> {
        self(value)
    }
}

/// Rejects absent and empty values.
#[derive(Debug, Clone, Copy, Default)]
pub struct Required;

impl Constraint for Required {
    fn check(&self, value: Option<&str>) -> Result<(), String> {
        match value {
            None | Some("") => Err("a value is required".to_string()),
            Some(_) => Ok(()),
        }
    }
}

/// Value types a type validator can accept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueType {
    /// Anything that is not numeric.
    String,
    /// Numeric values only.
    Number,
    /// A type name nobody recognises. Never matches.
    Unknown(String),
}

impl ValueType {
    pub fn from_name(name: &str) -> Self {
        match name {
            "string" => Self::String,
            "number" => Self::Number,
            other => Self::Unknown(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Unknown(name) => name,
        }
    }

    /// Absent values match every type.
    pub fn matches(&self, value: Option<&str>) -> bool {
        let Some(value) = value else {
            return true;
        };
        match self {
            Self::String => !is_numeric(value),
            Self::Number => is_numeric(value),
            Self::Unknown(name) => {
                log::debug!("unrecognised type validator '{name}'");
                false
            },
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A constraint or a type check.
#[derive(Clone)]
pub enum Validator {
    Constraint(Rc<dyn Constraint>),
    Type(ValueType),
}

impl Validator {
    pub fn required() -> Self {
        Self::Constraint(Rc::new(Required))
    }

    pub fn of_type(name: &str) -> Self {
        Self::Type(ValueType::from_name(name))
    }

    pub fn constraint(check: impl Constraint + 'static) -> Self {
        Self::Constraint(Rc::new(check))
    }

    pub fn is_type(&self) -> bool {
        matches!(self, Self::Type(_))
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constraint(_) => f.write_str("Constraint(..)"),
            Self::Type(t) => f.debug_tuple("Type").field(t).finish(),
        }
    }
}

/// Whether `value` reads as a number.
///
/// Surrounding whitespace is ignored and blank text counts as zero.
/// Accepts decimal and exponent forms, `Infinity`, and unsigned `0x` / `0o`
/// / `0b` integer literals.
pub fn is_numeric(value: &str) -> bool {
    let v = value.trim();
    if v.is_empty() {
        return true;
    }
    let radix = match v.get(..2) {
        Some("0x" | "0X") => Some(16),
        Some("0o" | "0O") => Some(8),
        Some("0b" | "0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        let digits = &v[2..];
        return !digits.is_empty() && digits.chars().all(|c| c.is_digit(radix));
    }
    let unsigned = v.strip_prefix(['+', '-']).unwrap_or(v);
    if unsigned == "Infinity" {
        return true;
    }
    // Rust also parses "inf" and "nan" spellings; only digit forms count here.
    if !unsigned.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
        return false;
    }
    v.parse::<f64>().is_ok()
}
