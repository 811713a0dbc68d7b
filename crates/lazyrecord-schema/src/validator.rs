//! Column validators.
//!
//! Every validator is driven through one capability, [`Validator`], which yields a
//! [`ValidationOutcome`]. The older shapes (a predicate, a predicate with a message, a
//! structured validator looked up by name) are adapted into it.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use lazyrecord_core::{
    EmailValidator, Error, PatternValidator, Result, StructuredValidator, ValidationOutcome,
    Value, ValueMap,
};

use crate::column::ColumnDef;
use crate::schema::RecordView;

/// Message used when a validator does not supply one.
pub const DEFAULT_VALIDATION_MESSAGE: &str = "Validation failed.";

/// What a validator can see besides the value itself.
pub struct ValidationContext<'a> {
    pub column: &'a ColumnDef,
    pub record: &'a dyn RecordView,
    /// The full argument set of the operation.
    pub args: &'a ValueMap,
}

/// Validates one column value.
pub trait Validator: Send + Sync {
    fn validate(&self, value: &Value, ctx: &ValidationContext<'_>) -> Result<ValidationOutcome>;
}

/// Adapts a `bool` predicate. Failures carry the default message.
pub struct PredicateValidator<F>(pub F);

impl<F> Validator for PredicateValidator<F>
where
    F: Fn(&Value, &ValidationContext<'_>) -> bool + Send + Sync,
{
    fn validate(&self, value: &Value, ctx: &ValidationContext<'_>) -> Result<ValidationOutcome> {
        Ok(ValidationOutcome::new(
            (self.0)(value, ctx),
            ctx.column.name.as_str(),
            DEFAULT_VALIDATION_MESSAGE,
        ))
    }
}

/// Adapts a predicate that returns `(valid, message)`.
pub struct MessageValidator<F>(pub F);

impl<F> Validator for MessageValidator<F>
where
    F: Fn(&Value, &ValidationContext<'_>) -> (bool, String) + Send + Sync,
{
    fn validate(&self, value: &Value, ctx: &ValidationContext<'_>) -> Result<ValidationOutcome> {
        let (valid, message) = (self.0)(value, ctx);
        Ok(ValidationOutcome::new(valid, ctx.column.name.as_str(), message))
    }
}

/// Builds a fresh structured validator from the column's validator arguments.
pub type StructuredFactory =
    Arc<dyn Fn(Option<&Value>) -> Box<dyn StructuredValidator> + Send + Sync>;

/// Adapts a [`StructuredValidator`]: a new instance per validation, with the first
/// reported message (or the default one) as the outcome message.
pub struct StructuredValidatorAdapter {
    factory: StructuredFactory,
}

impl StructuredValidatorAdapter {
    pub fn new(factory: StructuredFactory) -> Self {
        Self { factory }
    }
}

impl Validator for StructuredValidatorAdapter {
    fn validate(&self, value: &Value, ctx: &ValidationContext<'_>) -> Result<ValidationOutcome> {
        let mut validator = (self.factory)(ctx.column.validator_args.as_ref());
        let valid = validator.validate(value);
        let message = validator
            .messages()
            .into_iter()
            .next()
            .unwrap_or_else(|| DEFAULT_VALIDATION_MESSAGE.to_string());
        Ok(ValidationOutcome::new(valid, ctx.column.name.as_str(), message))
    }
}

/// The validator attached to a column.
#[derive(Clone)]
pub enum ColumnValidator {
    Callable(Arc<dyn Validator>),
    /// A structured validator resolved by name through a [`ValidatorRegistry`].
    Named(String),
}

impl fmt::Debug for ColumnValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnValidator::Callable(_) => f.write_str("Callable(..)"),
            ColumnValidator::Named(name) => f.debug_tuple("Named").field(name).finish(),
        }
    }
}

/// Named structured validators.
///
/// `ValidatorRegistry::default()` knows `pattern` and `email`.
#[derive(Clone)]
pub struct ValidatorRegistry {
    factories: HashMap<String, StructuredFactory>,
}

impl ValidatorRegistry {
    /// A registry without any validators.
    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(Option<&Value>) -> Box<dyn StructuredValidator> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Arc::new(factory));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Resolve a validator name for `column`.
    pub fn resolve(&self, column: &str, name: &str) -> Result<StructuredValidatorAdapter> {
        self.factories
            .get(name)
            .map(|f| StructuredValidatorAdapter::new(Arc::clone(f)))
            .ok_or_else(|| Error::UnsupportedValidatorShape {
                column: column.to_string(),
                detail: format!("no validator named {name}"),
            })
    }
}

impl Default for ValidatorRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register("pattern", |args| Box::new(PatternValidator::new(args)));
        registry.register("email", |args| Box::new(EmailValidator::new(args)));
        registry
    }
}

impl fmt::Debug for ValidatorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.factories.keys().collect();
        names.sort();
        f.debug_struct("ValidatorRegistry")
            .field("validators", &names)
            .finish()
    }
}
