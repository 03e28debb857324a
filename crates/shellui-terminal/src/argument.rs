//! Declared command arguments.

use std::rc::Rc;

use crate::validator::{Constraint, Validator, ValueType};

/// A declared command parameter: its validators, default value and alias.
#[derive(Clone)]
pub struct ArgumentDefinition {
    name: String,
    constraints: Vec<Rc<dyn Constraint>>,
    types: Vec<ValueType>,
    default_value: Option<String>,
    alias: Option<String>,
}

impl ArgumentDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            constraints: Vec::new(),
            types: Vec::new(),
            default_value: None,
            alias: None,
        }
    }

    /// Add a validator (builder form of [`add_validator`](Self::add_validator)).
    pub fn validator(mut self, validator: Validator) -> Self {
        self.add_validator(validator);
        self
    }

    /// Add several validators in order.
    pub fn validators(mut self, validators: impl IntoIterator<Item = Validator>) -> Self {
        for v in validators {
            self.add_validator(v);
        }
        self
    }

    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Alternative flag name that binds this argument.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Sort a validator into the constraint or type list.
    pub fn add_validator(&mut self, validator: Validator) {
        match validator {
            Validator::Constraint(c) => self.constraints.push(c),
            Validator::Type(t) => self.types.push(t),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn default(&self) -> Option<&str> {
        self.default_value.as_deref()
    }

    pub fn alias_name(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    pub fn types(&self) -> &[ValueType] {
        &self.types
    }

    /// Validate a bound value.
    ///
    /// Every constraint runs and each failure is collected. Then, if any
    /// type is declared, at least one must match or a single type error is
    /// appended.
    pub fn validate(&self, value: Option<&str>) -> Result<(), Vec<String>> {
        let mut errors: Vec<String> = self
            .constraints
            .iter()
            .filter_map(|c| c.check(value).err())
            .collect();

        if !self.types.is_empty() && !self.types.iter().any(|t| t.matches(value)) {
            let expected: Vec<&str> = self.types.iter().map(ValueType::name).collect();
            errors.push(format!("Type error: expected one of {}", expected.join(", ")));
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

impl std::fmt::Debug for ArgumentDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArgumentDefinition")
            .field("name", &self.name)
            .field("constraints", &self.constraints.len())
            .field("types", &self.types)
            .field("default_value", &self.default_value)
            .field("alias", &self.alias)
            .finish()
    }
}
