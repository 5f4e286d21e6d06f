//! Validation - Required fields and field-group constraints
//!
//! Resources walk their own tree with a [`Validator`], which collects every
//! violation instead of stopping at the first one.

use thiserror::Error;

use crate::differ::FieldPath;
use crate::field::Field;

/// A single validation failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("Required field '{field}' is missing")]
    MissingRequired { field: String },

    #[error("Exactly one of {} must be set, found {set}", .fields.join(", "))]
    ExactlyOneOf { fields: Vec<String>, set: usize },

    #[error("Invalid value for '{field}': {message}")]
    Invalid { field: String, message: String },
}

/// All validation failures of one resource
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", .errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "))]
pub struct ValidationError {
    pub errors: Vec<FieldError>,
}

/// Implemented by every object in a resource tree
pub trait Validate {
    /// Record violations of this object (found at `path`) and its children
    fn validate_fields(&self, path: &FieldPath, v: &mut Validator);
}

#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// The field must be set to a non-zero value
    pub fn required<T: Field>(&mut self, value: &Option<T>, path: FieldPath) {
        if value.as_ref().is_none_or(|v| v.is_zero()) {
            self.errors.push(FieldError::MissingRequired {
                field: path.to_string(),
            });
        }
    }

    /// Exactly one of the named child fields of `path` must be set
    pub fn exactly_one_of(&mut self, path: &FieldPath, fields: &[(&str, bool)]) {
        let set = fields.iter().filter(|(_, is_set)| *is_set).count();
        if set != 1 {
            self.errors.push(FieldError::ExactlyOneOf {
                fields: fields
                    .iter()
                    .map(|(name, _)| path.nest(name).to_string())
                    .collect(),
                set,
            });
        }
    }

    pub fn invalid(&mut self, path: FieldPath, message: impl Into<String>) {
        self.errors.push(FieldError::Invalid {
            field: path.to_string(),
            message: message.into(),
        });
    }

    /// Validate an optional child object
    pub fn nested<T: Validate>(&mut self, value: &Option<T>, path: FieldPath) {
        if let Some(value) = value {
            value.validate_fields(&path, self);
        }
    }

    /// Validate every element of an optional list of objects
    pub fn each<T: Validate>(&mut self, values: &Option<Vec<T>>, path: FieldPath) {
        for (i, value) in values.iter().flatten().enumerate() {
            value.validate_fields(&path.index(i), self);
        }
    }

    pub fn finish(self) -> Result<(), ValidationError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError {
                errors: self.errors,
            })
        }
    }
}
