//! Column definitions and their per-column rules.

use std::fmt;
use std::sync::Arc;

use lazyrecord_core::{Error, Result, ValidationOutcome, Value, ValueMap};

use crate::isa::Isa;
use crate::schema::RecordView;
use crate::validator::{
    ColumnValidator, MessageValidator, PredicateValidator, ValidationContext, Validator,
    ValidatorRegistry,
};

/// Rewrites a value given the record and the operation's arguments.
pub type Transform = Arc<dyn Fn(Value, &dyn RecordView, &ValueMap) -> Value + Send + Sync>;

/// Computes a default value; `None` leaves the value absent.
pub type DefaultBuilder = Arc<dyn Fn(&dyn RecordView, &ValueMap) -> Option<Value> + Send + Sync>;

/// Computes the allowed values at validation time.
pub type ValidValuesBuilder = Arc<dyn Fn(&dyn RecordView, &ValueMap) -> ValidValues + Send + Sync>;

/// A column default.
#[derive(Clone)]
pub enum ColumnDefault {
    /// A static value. `Value::Raw` is a SQL expression written verbatim.
    Value(Value),
    /// Computed per operation; never written into DDL.
    Builder(DefaultBuilder),
}

impl fmt::Debug for ColumnDefault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnDefault::Value(v) => f.debug_tuple("Value").field(v).finish(),
            ColumnDefault::Builder(_) => f.write_str("Builder(..)"),
        }
    }
}

/// The set of values a column accepts.
#[derive(Clone)]
pub enum ValidValues {
    List(Vec<Value>),
    /// `(label, value)` options.
    Labeled(Vec<(String, Value)>),
    /// Option groups: `(group label, [(label, value)])`.
    Grouped(Vec<(String, Vec<(String, Value)>)>),
    Builder(ValidValuesBuilder),
}

impl ValidValues {
    /// Evaluate a builder; static sets are returned as they are.
    pub fn resolve(&self, record: &dyn RecordView, args: &ValueMap) -> ValidValues {
        match self {
            ValidValues::Builder(build) => build(record, args),
            other => other.clone(),
        }
    }

    /// Every allowed value, groups flattened. A builder yields nothing until resolved.
    pub fn values(&self) -> Vec<&Value> {
        match self {
            ValidValues::List(values) => values.iter().collect(),
            ValidValues::Labeled(options) => options.iter().map(|(_, v)| v).collect(),
            ValidValues::Grouped(groups) => groups
                .iter()
                .flat_map(|(_, options)| options.iter().map(|(_, v)| v))
                .collect(),
            ValidValues::Builder(_) => Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.values().is_empty()
    }

    /// Loose membership, so `"2"` is accepted where `2` is listed.
    pub fn contains(&self, value: &Value) -> bool {
        self.values().into_iter().any(|v| v.loosely_eq(value))
    }

    pub fn label_for(&self, value: &Value) -> Option<&str> {
        match self {
            ValidValues::Labeled(options) => options
                .iter()
                .find(|(_, v)| v.loosely_eq(value))
                .map(|(label, _)| label.as_str()),
            ValidValues::Grouped(groups) => groups
                .iter()
                .flat_map(|(_, options)| options.iter())
                .find(|(_, v)| v.loosely_eq(value))
                .map(|(label, _)| label.as_str()),
            ValidValues::List(_) | ValidValues::Builder(_) => None,
        }
    }
}

impl fmt::Debug for ValidValues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidValues::List(v) => f.debug_tuple("List").field(v).finish(),
            ValidValues::Labeled(v) => f.debug_tuple("Labeled").field(v).finish(),
            ValidValues::Grouped(v) => f.debug_tuple("Grouped").field(v).finish(),
            ValidValues::Builder(_) => f.write_str("Builder(..)"),
        }
    }
}

/// A column of a [`Schema`](crate::Schema).
///
/// Built with chained setters:
///
/// ```
/// use lazyrecord_schema::{ColumnDef, Isa};
///
/// let title = ColumnDef::new("title").isa(Isa::Str).required(true).label("Title");
/// assert_eq!(title.label_text(), "Title");
/// ```
#[derive(Clone)]
pub struct ColumnDef {
    pub name: String,
    pub isa: Isa,
    /// Explicit SQL type; overrides the type derived from `isa` in DDL.
    pub sql_type: Option<String>,
    pub label: Option<String>,
    pub required: bool,
    pub not_null: bool,
    pub null: bool,
    pub primary: bool,
    pub auto_increment: bool,
    pub unique: bool,
    pub default: Option<ColumnDefault>,
    pub validator: Option<ColumnValidator>,
    /// Arguments handed to a named validator.
    pub validator_args: Option<Value>,
    pub valid_values: Option<ValidValues>,
    pub filter: Option<Transform>,
    pub canonicalizer: Option<Transform>,
    /// Reject values of the wrong type instead of coercing them.
    pub type_constraint: bool,
    /// Not persisted: excluded from SQL but readable on records.
    pub is_virtual: bool,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            isa: Isa::Str,
            sql_type: None,
            label: None,
            required: false,
            not_null: false,
            null: false,
            primary: false,
            auto_increment: false,
            unique: false,
            default: None,
            validator: None,
            validator_args: None,
            valid_values: None,
            filter: None,
            canonicalizer: None,
            type_constraint: false,
            is_virtual: false,
        }
    }

    pub fn isa(mut self, isa: Isa) -> Self {
        self.isa = isa;
        self
    }

    pub fn sql_type(mut self, sql_type: impl Into<String>) -> Self {
        self.sql_type = Some(sql_type.into());
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn required(mut self, value: bool) -> Self {
        self.required = value;
        self
    }

    pub fn not_null(mut self, value: bool) -> Self {
        self.not_null = value;
        self
    }

    pub fn null(mut self, value: bool) -> Self {
        self.null = value;
        self
    }

    pub fn primary(mut self, value: bool) -> Self {
        self.primary = value;
        self
    }

    pub fn auto_increment(mut self, value: bool) -> Self {
        self.auto_increment = value;
        self
    }

    pub fn unique(mut self, value: bool) -> Self {
        self.unique = value;
        self
    }

    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(ColumnDefault::Value(value.into()));
        self
    }

    /// A SQL expression default such as `CURRENT_TIMESTAMP`.
    pub fn default_raw(mut self, expr: impl Into<String>) -> Self {
        self.default = Some(ColumnDefault::Value(Value::Raw(expr.into())));
        self
    }

    pub fn default_builder<F>(mut self, build: F) -> Self
    where
        F: Fn(&dyn RecordView, &ValueMap) -> Option<Value> + Send + Sync + 'static,
    {
        self.default = Some(ColumnDefault::Builder(Arc::new(build)));
        self
    }

    pub fn validator(mut self, validator: impl Validator + 'static) -> Self {
        self.validator = Some(ColumnValidator::Callable(Arc::new(validator)));
        self
    }

    /// Validate with a predicate; failures use the default message.
    pub fn validator_fn<F>(self, predicate: F) -> Self
    where
        F: Fn(&Value, &ValidationContext<'_>) -> bool + Send + Sync + 'static,
    {
        self.validator(PredicateValidator(predicate))
    }

    /// Validate with a predicate that also returns the failure message.
    pub fn validator_with_message<F>(self, predicate: F) -> Self
    where
        F: Fn(&Value, &ValidationContext<'_>) -> (bool, String) + Send + Sync + 'static,
    {
        self.validator(MessageValidator(predicate))
    }

    /// Validate with a structured validator registered under `name`.
    pub fn named_validator(mut self, name: impl Into<String>, args: impl Into<Value>) -> Self {
        self.validator = Some(ColumnValidator::Named(name.into()));
        let args = args.into();
        self.validator_args = (!args.is_null()).then_some(args);
        self
    }

    pub fn valid_values(mut self, values: Vec<Value>) -> Self {
        self.valid_values = Some(ValidValues::List(values));
        self
    }

    pub fn labeled_values<L, V, I>(mut self, options: I) -> Self
    where
        L: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (L, V)>,
    {
        self.valid_values = Some(ValidValues::Labeled(
            options
                .into_iter()
                .map(|(l, v)| (l.into(), v.into()))
                .collect(),
        ));
        self
    }

    pub fn grouped_values(mut self, groups: Vec<(String, Vec<(String, Value)>)>) -> Self {
        self.valid_values = Some(ValidValues::Grouped(groups));
        self
    }

    pub fn valid_values_builder<F>(mut self, build: F) -> Self
    where
        F: Fn(&dyn RecordView, &ValueMap) -> ValidValues + Send + Sync + 'static,
    {
        self.valid_values = Some(ValidValues::Builder(Arc::new(build)));
        self
    }

    pub fn filter<F>(mut self, transform: F) -> Self
    where
        F: Fn(Value, &dyn RecordView, &ValueMap) -> Value + Send + Sync + 'static,
    {
        self.filter = Some(Arc::new(transform));
        self
    }

    pub fn canonicalizer<F>(mut self, transform: F) -> Self
    where
        F: Fn(Value, &dyn RecordView, &ValueMap) -> Value + Send + Sync + 'static,
    {
        self.canonicalizer = Some(Arc::new(transform));
        self
    }

    pub fn type_constraint(mut self, value: bool) -> Self {
        self.type_constraint = value;
        self
    }

    pub fn is_virtual(mut self, value: bool) -> Self {
        self.is_virtual = value;
        self
    }

    /// Human-readable name, falling back to the column name.
    pub fn label_text(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }

    // ========================================================================
    // Value rules
    // ========================================================================

    /// Resolve the default: the static value, or the builder's result.
    pub fn default_value(&self, record: &dyn RecordView, args: &ValueMap) -> Option<Value> {
        match self.default.as_ref()? {
            ColumnDefault::Value(v) => Some(v.clone()),
            ColumnDefault::Builder(build) => build(record, args),
        }
    }

    pub fn check_type_constraint(&self, value: &Value) -> Result<()> {
        if self.isa.accepts(value) {
            Ok(())
        } else {
            Err(Error::TypeConstraintViolation {
                column: self.name.clone(),
                value: value.clone(),
                expected: self.isa.as_str().to_string(),
            })
        }
    }

    pub fn type_cast(&self, value: Value) -> Value {
        self.isa.cast(value)
    }

    /// Enforce the type constraint or coerce, depending on the column. NULL and
    /// composite values pass through.
    pub fn resolve_type(&self, value: Value) -> Result<Value> {
        if value.is_null() || value.is_composite() {
            return Ok(value);
        }
        if self.type_constraint {
            self.check_type_constraint(&value)?;
            Ok(value)
        } else {
            Ok(self.type_cast(value))
        }
    }

    pub fn has_canonicalizer(&self) -> bool {
        self.filter.is_some() || self.canonicalizer.is_some()
    }

    /// Apply the filter, then the canonicalizer.
    pub fn canonicalize(&self, value: Value, record: &dyn RecordView, args: &ValueMap) -> Value {
        let value = match &self.filter {
            Some(filter) => filter(value, record, args),
            None => value,
        };
        match &self.canonicalizer {
            Some(canonicalize) => canonicalize(value, record, args),
            None => value,
        }
    }

    pub fn deflate(&self, value: Value) -> Value {
        self.isa.deflate(value)
    }

    pub fn inflate(&self, value: Value) -> Value {
        self.isa.inflate(value)
    }

    pub fn resolve_valid_values(
        &self,
        record: &dyn RecordView,
        args: &ValueMap,
    ) -> Option<ValidValues> {
        self.valid_values.as_ref().map(|v| v.resolve(record, args))
    }

    /// Display text: the option label when the valid values carry labels.
    pub fn display(&self, value: &Value, record: &dyn RecordView) -> String {
        let args = ValueMap::new();
        self.resolve_valid_values(record, &args)
            .and_then(|valid| valid.label_for(value).map(str::to_string))
            .unwrap_or_else(|| value.to_string())
    }

    /// Validate a value.
    ///
    /// Returns `None` when no rule applies to the column. Only one rule is consulted,
    /// in this order: required, validator, valid values (for truthy values).
    pub fn validate(
        &self,
        value: &Value,
        record: &dyn RecordView,
        args: &ValueMap,
        validators: &ValidatorRegistry,
    ) -> Result<Option<ValidationOutcome>> {
        if self.required && value.is_blank() {
            return Ok(Some(ValidationOutcome::invalid(
                self.name.as_str(),
                format!("Field {} is required.", self.label_text()),
            )));
        }

        let ctx = ValidationContext {
            column: self,
            record,
            args,
        };

        if let Some(validator) = &self.validator {
            let outcome = match validator {
                ColumnValidator::Callable(v) => v.validate(value, &ctx)?,
                ColumnValidator::Named(name) => {
                    validators.resolve(&self.name, name)?.validate(value, &ctx)?
                }
            };
            return Ok(Some(outcome));
        }

        if value.is_truthy() {
            if let Some(valid) = self.resolve_valid_values(record, args) {
                if !valid.is_empty() && !valid.contains(value) {
                    return Ok(Some(ValidationOutcome::invalid(
                        self.name.as_str(),
                        format!("{value} is not a valid value for {}", self.name),
                    )));
                }
            }
        }

        Ok(None)
    }
}

impl fmt::Debug for ColumnDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnDef")
            .field("name", &self.name)
            .field("isa", &self.isa)
            .field("sql_type", &self.sql_type)
            .field("required", &self.required)
            .field("primary", &self.primary)
            .field("auto_increment", &self.auto_increment)
            .field("unique", &self.unique)
            .field("default", &self.default)
            .field("validator", &self.validator)
            .field("valid_values", &self.valid_values)
            .field("type_constraint", &self.type_constraint)
            .field("is_virtual", &self.is_virtual)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lazyrecord_core::value_map;

    fn validate(column: &ColumnDef, value: Value) -> Option<ValidationOutcome> {
        let record = ValueMap::new();
        column
            .validate(&value, &record, &ValueMap::new(), &ValidatorRegistry::default())
            .unwrap()
    }

    #[test]
    fn test_required_uses_label() {
        let column = ColumnDef::new("title").required(true).label("Title");
        let outcome = validate(&column, Value::from("")).unwrap();
        assert!(!outcome.valid);
        assert_eq!(outcome.field, "title");
        assert_eq!(outcome.message, "Field Title is required.");

        let outcome = validate(&column, Value::Null).unwrap();
        assert!(!outcome.valid);

        assert!(validate(&column, Value::from("Dune")).is_none());
    }

    #[test]
    fn test_required_accepts_zero() {
        let column = ColumnDef::new("count").isa(Isa::Int).required(true);
        assert!(validate(&column, Value::Int(0)).is_none());
    }

    #[test]
    fn test_validator_outcome_always_recorded() {
        let column = ColumnDef::new("age").validator_fn(|v, _| v.as_i64().is_some_and(|n| n > 0));
        let outcome = validate(&column, Value::Int(3)).unwrap();
        assert!(outcome.valid);
        let outcome = validate(&column, Value::Int(-3)).unwrap();
        assert!(!outcome.valid);
        assert_eq!(outcome.message, "Validation failed.");
    }

    #[test]
    fn test_validator_with_message() {
        let column = ColumnDef::new("isbn")
            .validator_with_message(|v, _| (v.to_string().len() == 13, "ISBN needs 13 digits".into()));
        let outcome = validate(&column, Value::from("123")).unwrap();
        assert!(!outcome.valid);
        assert_eq!(outcome.message, "ISBN needs 13 digits");
    }

    #[test]
    fn test_unknown_named_validator_is_fault() {
        let column = ColumnDef::new("isbn").named_validator("isbn", Value::Null);
        let record = ValueMap::new();
        let err = column
            .validate(
                &Value::from("1"),
                &record,
                &ValueMap::new(),
                &ValidatorRegistry::default(),
            )
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedValidatorShape { .. }));
    }

    #[test]
    fn test_named_email_validator() {
        let column = ColumnDef::new("email").named_validator("email", Value::Null);
        assert!(validate(&column, Value::from("a@b.io")).unwrap().valid);
        let outcome = validate(&column, Value::from("nope")).unwrap();
        assert_eq!(outcome.message, "Invalid email address.");
    }

    #[test]
    fn test_valid_values_list() {
        let column = ColumnDef::new("status")
            .valid_values(vec![Value::from("draft"), Value::from("published")]);
        assert!(validate(&column, Value::from("draft")).is_none());
        let outcome = validate(&column, Value::from("deleted")).unwrap();
        assert!(!outcome.valid);
        assert_eq!(outcome.message, "deleted is not a valid value for status");
        // falsy values are not checked
        assert!(validate(&column, Value::from("")).is_none());
    }

    #[test]
    fn test_valid_values_labeled_and_grouped() {
        let column = ColumnDef::new("rating").labeled_values([("Good", 1), ("Great", 2)]);
        assert!(validate(&column, Value::from("2")).is_none());
        assert!(!validate(&column, Value::Int(5)).unwrap().valid);

        let column = ColumnDef::new("city").grouped_values(vec![
            (
                "Asia".into(),
                vec![("Taipei".into(), Value::from("TPE"))],
            ),
            (
                "Europe".into(),
                vec![("Paris".into(), Value::from("PAR"))],
            ),
        ]);
        assert!(validate(&column, Value::from("PAR")).is_none());
        assert!(!validate(&column, Value::from("NYC")).unwrap().valid);
    }

    #[test]
    fn test_valid_values_builder_sees_args() {
        let column = ColumnDef::new("size").valid_values_builder(|_, args| {
            if args.contains_key("big") {
                ValidValues::List(vec![Value::from("XL")])
            } else {
                ValidValues::List(vec![Value::from("S")])
            }
        });
        let record = ValueMap::new();
        let registry = ValidatorRegistry::default();
        let args = value_map! { "big" => true };
        let outcome = column
            .validate(&Value::from("XL"), &record, &args, &registry)
            .unwrap();
        assert!(outcome.is_none());
        let outcome = column
            .validate(&Value::from("XL"), &record, &ValueMap::new(), &registry)
            .unwrap();
        assert!(!outcome.unwrap().valid);
    }

    #[test]
    fn test_default_value() {
        let record = ValueMap::new();
        let args = ValueMap::new();
        let column = ColumnDef::new("status").default("draft");
        assert_eq!(column.default_value(&record, &args), Some(Value::from("draft")));

        let column = ColumnDef::new("created_on").default_raw("CURRENT_TIMESTAMP");
        assert_eq!(
            column.default_value(&record, &args),
            Some(Value::raw("CURRENT_TIMESTAMP"))
        );

        let column = ColumnDef::new("slug").default_builder(|_, args| {
            args.get("title").map(|t| Value::from(t.to_string().to_lowercase()))
        });
        let args = value_map! { "title" => "Dune" };
        assert_eq!(column.default_value(&record, &args), Some(Value::from("dune")));
    }

    #[test]
    fn test_resolve_type() {
        let strict = ColumnDef::new("count").isa(Isa::Int).type_constraint(true);
        let err = strict.resolve_type(Value::from("12")).unwrap_err();
        assert!(matches!(
            err,
            Error::TypeConstraintViolation { ref column, .. } if column == "count"
        ));
        assert_eq!(strict.resolve_type(Value::Int(12)).unwrap(), Value::Int(12));

        let loose = ColumnDef::new("count").isa(Isa::Int);
        assert_eq!(loose.resolve_type(Value::from("12")).unwrap(), Value::Int(12));
        assert_eq!(
            loose.resolve_type(Value::raw("count + 1")).unwrap(),
            Value::raw("count + 1")
        );
    }

    #[test]
    fn test_canonicalize_order() {
        let record = ValueMap::new();
        let column = ColumnDef::new("name")
            .filter(|v, _, _| Value::from(v.to_string().trim().to_string()))
            .canonicalizer(|v, _, _| Value::from(v.to_string().to_uppercase()));
        assert!(column.has_canonicalizer());
        assert_eq!(
            column.canonicalize(Value::from("  ada "), &record, &ValueMap::new()),
            Value::from("ADA")
        );
    }

    #[test]
    fn test_display_uses_labels() {
        let record = ValueMap::new();
        let column = ColumnDef::new("rating").labeled_values([("Good", 1), ("Great", 2)]);
        assert_eq!(column.display(&Value::Int(2), &record), "Great");
        assert_eq!(column.display(&Value::Int(9), &record), "9");
    }
}
