//! Operation results and validation outcomes.

use indexmap::IndexMap;
use serde::Serialize;

use crate::error::Error;
use crate::value::{Value, ValueMap};

/// The outcome of validating one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationOutcome {
    pub valid: bool,
    pub field: String,
    pub message: String,
}

impl ValidationOutcome {
    pub fn new(valid: bool, field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            valid,
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(false, field, message)
    }
}

/// Outcomes keyed by column name, in pipeline order.
pub type Validations = IndexMap<String, ValidationOutcome>;

/// Diagnostic context attached to an [`OperationResult`].
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ResultExtra {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sql: Option<String>,
    /// The argument set after the column pipeline ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub args: Option<ValueMap>,
    /// Bound parameters, in placeholder order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vars: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub validations: Validations,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    /// The underlying fault, when the result is an error.
    #[serde(skip)]
    pub error: Option<Error>,
}

impl ResultExtra {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sql(mut self, sql: impl Into<String>) -> Self {
        self.sql = Some(sql.into());
        self
    }

    pub fn args(mut self, args: ValueMap) -> Self {
        self.args = Some(args);
        self
    }

    pub fn vars(mut self, vars: Vec<Value>) -> Self {
        self.vars = Some(vars);
        self
    }

    pub fn validations(mut self, validations: Validations) -> Self {
        self.validations = validations;
        self
    }

    pub fn id(mut self, id: Value) -> Self {
        self.id = Some(id);
        self
    }
}

/// The tagged outcome of a lifecycle operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum OperationResult {
    Success { message: String, extra: ResultExtra },
    Error { message: String, extra: ResultExtra },
}

impl OperationResult {
    pub fn success(message: impl Into<String>, extra: ResultExtra) -> Self {
        OperationResult::Success {
            message: message.into(),
            extra,
        }
    }

    pub fn error(message: impl Into<String>, extra: ResultExtra) -> Self {
        OperationResult::Error {
            message: message.into(),
            extra,
        }
    }

    /// Fold a fault into an error result. The message is the fault's display text and
    /// validation outcomes carried by the fault are surfaced in `extra`.
    pub fn from_error(err: Error, mut extra: ResultExtra) -> Self {
        if let Error::ValidationFailed { outcomes } = &err {
            if extra.validations.is_empty() {
                extra.validations = outcomes.clone();
            }
        }
        let message = err.to_string();
        extra.error = Some(err);
        OperationResult::Error { message, extra }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, OperationResult::Success { .. })
    }

    pub fn is_error(&self) -> bool {
        !self.is_success()
    }

    pub fn message(&self) -> &str {
        match self {
            OperationResult::Success { message, .. } | OperationResult::Error { message, .. } => {
                message
            }
        }
    }

    pub fn extra(&self) -> &ResultExtra {
        match self {
            OperationResult::Success { extra, .. } | OperationResult::Error { extra, .. } => extra,
        }
    }

    pub fn id(&self) -> Option<&Value> {
        self.extra().id.as_ref()
    }

    pub fn sql(&self) -> Option<&str> {
        self.extra().sql.as_deref()
    }

    pub fn validations(&self) -> &Validations {
        &self.extra().validations
    }

    /// Outcomes that failed, in pipeline order.
    pub fn failed_validations(&self) -> impl Iterator<Item = &ValidationOutcome> {
        self.validations().values().filter(|o| !o.valid)
    }

    /// The underlying fault, if any.
    pub fn fault(&self) -> Option<&Error> {
        self.extra().error.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Right;

    #[test]
    fn test_from_error_uses_display_message() {
        let result = OperationResult::from_error(
            Error::PermissionDenied {
                right: Right::Delete,
            },
            ResultExtra::new(),
        );
        assert!(result.is_error());
        assert_eq!(result.message(), "Permission denied. Can not delete record.");
        assert!(matches!(
            result.fault(),
            Some(Error::PermissionDenied { .. })
        ));
    }

    #[test]
    fn test_from_error_surfaces_validations() {
        let mut outcomes = Validations::new();
        outcomes.insert(
            "title".into(),
            ValidationOutcome::invalid("title", "Field Title is required."),
        );
        let result = OperationResult::from_error(
            Error::ValidationFailed { outcomes },
            ResultExtra::new().sql(""),
        );
        assert_eq!(result.message(), "Validation failed.");
        let failed: Vec<&str> = result.failed_validations().map(|o| o.field.as_str()).collect();
        assert_eq!(failed, vec!["title"]);
    }

    #[test]
    fn test_serializes_with_status_tag() {
        let result = OperationResult::success("Created", ResultExtra::new().id(Value::Int(3)));
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["message"], "Created");
        assert_eq!(json["extra"]["id"], 3);
    }
}
