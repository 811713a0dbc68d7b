//! The column pipeline run by create and update.
//!
//! For every persisted column, in schema order: default injection, type
//! resolution, canonicalization, validation, deflation. All validation outcomes are
//! collected before the pipeline gives up, so a failure reports every column.

use lazyrecord_core::{Error, ResultExtra, Validations, Value, ValueMap};
use lazyrecord_schema::{ColumnDef, RecordView, Schema, ValidatorRegistry};

use crate::record::Failure;

/// Which lifecycle operation the pipeline runs for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mode {
    /// Every column is processed; absent values still go through validation.
    Create,
    /// Only columns present in the arguments are processed.
    Update,
}

/// Arguments ready to be written, with the outcomes gathered on the way.
#[derive(Debug)]
pub(crate) struct Prepared {
    pub args: ValueMap,
    pub validations: Validations,
}

fn is_set(args: &ValueMap, column: &str) -> bool {
    args.get(column).is_some_and(|v| !v.is_null())
}

fn inject_default(column: &ColumnDef, args: &mut ValueMap, record: &dyn RecordView) {
    if let Some(value) = column.default_value(record, args) {
        if value.is_truthy() {
            args.insert(column.name.clone(), value);
        }
    }
}

pub(crate) fn run(
    schema: &Schema,
    mode: Mode,
    mut args: ValueMap,
    record: &dyn RecordView,
    validators: &ValidatorRegistry,
) -> Result<Prepared, Failure> {
    let mut validations = Validations::new();
    let mut failed = false;

    for column in schema.get_columns(false) {
        let name = column.name.as_str();

        match mode {
            Mode::Create => {
                if !column.primary && !args.get(name).is_some_and(Value::is_truthy) {
                    inject_default(column, &mut args, record);
                }
            }
            Mode::Update => {
                if !is_set(&args, name) {
                    continue;
                }
                if !column.primary && !args.get(name).is_some_and(Value::is_truthy) {
                    inject_default(column, &mut args, record);
                }
            }
        }

        let mut value = args.get(name).cloned().unwrap_or_default();

        value = match column.resolve_type(value) {
            Ok(v) => v,
            Err(error) => return Err(failure(error, args, validations)),
        };

        if column.has_canonicalizer() {
            value = column.canonicalize(value, record, &args);
        }

        match column.validate(&value, record, &args, validators) {
            Ok(Some(outcome)) => {
                if !outcome.valid {
                    failed = true;
                }
                validations.insert(name.to_string(), outcome);
            }
            Ok(None) => {}
            Err(error) => return Err(failure(error, args, validations)),
        }

        if !value.is_null() {
            let stored = if value.is_composite() {
                value
            } else {
                column.deflate(value)
            };
            args.insert(name.to_string(), stored);
        }
    }

    if failed {
        tracing::debug!(
            schema = schema.name(),
            failed = validations.values().filter(|o| !o.valid).count(),
            "Column validation failed"
        );
        let error = Error::ValidationFailed {
            outcomes: validations.clone(),
        };
        return Err(failure(error, args, validations));
    }

    Ok(Prepared { args, validations })
}

fn failure(error: Error, args: ValueMap, validations: Validations) -> Failure {
    Failure::new(
        error,
        ResultExtra::new().args(args).validations(validations),
    )
}
