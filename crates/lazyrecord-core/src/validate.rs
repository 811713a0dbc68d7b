//! Structured validators and regex helpers.
//!
//! A [`StructuredValidator`] is a stateful object built per validation from the
//! column's validator arguments: it validates one value and then reports its
//! messages. Columns refer to them by name; the model layer resolves the name
//! through its validator registry.

use std::collections::HashMap;
use std::sync::{OnceLock, PoisonError, RwLock};

use regex::Regex;

use crate::value::Value;

/// An external validator: validate a value, then read back its messages.
pub trait StructuredValidator {
    fn validate(&mut self, value: &Value) -> bool;

    /// Messages collected by the last `validate` call, most relevant first.
    fn messages(&self) -> Vec<String>;
}

/// Thread-safe regex cache for compiled patterns.
///
/// Patterns are compiled lazily on first use and cached for the lifetime
/// of the program.
struct RegexCache {
    cache: RwLock<HashMap<String, Regex>>,
}

impl RegexCache {
    fn new() -> Self {
        Self {
            cache: RwLock::new(HashMap::new()),
        }
    }

    fn get_or_compile(&self, pattern: &str) -> Result<Regex, regex::Error> {
        {
            let cache = self.cache.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(regex) = cache.get(pattern) {
                return Ok(regex.clone());
            }
        }

        let regex = Regex::new(pattern)?;
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(pattern.to_string(), regex.clone());
        Ok(regex)
    }
}

fn regex_cache() -> &'static RegexCache {
    static CACHE: OnceLock<RegexCache> = OnceLock::new();
    CACHE.get_or_init(RegexCache::new)
}

/// Check if a string matches a regex pattern.
///
/// Returns `false` if the pattern is invalid (logs a warning).
pub fn matches_pattern(value: &str, pattern: &str) -> bool {
    match regex_cache().get_or_compile(pattern) {
        Ok(regex) => regex.is_match(value),
        Err(e) => {
            tracing::warn!(
                pattern = pattern,
                error = %e,
                "Invalid regex pattern in validation, treating as non-match"
            );
            false
        }
    }
}

pub(crate) const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$";

/// Matches text against a regex given as the validator argument.
///
/// Arguments: the pattern as text, or `[pattern, message]`.
#[derive(Debug, Clone, Default)]
pub struct PatternValidator {
    pattern: Option<String>,
    message: Option<String>,
    messages: Vec<String>,
}

impl PatternValidator {
    pub fn new(args: Option<&Value>) -> Self {
        let (pattern, message) = match args {
            Some(Value::Text(p)) => (Some(p.clone()), None),
            Some(Value::Array(items)) => (
                items.first().and_then(Value::as_str).map(str::to_string),
                items.get(1).and_then(Value::as_str).map(str::to_string),
            ),
            _ => (None, None),
        };
        Self {
            pattern,
            message,
            messages: Vec::new(),
        }
    }
}

impl StructuredValidator for PatternValidator {
    fn validate(&mut self, value: &Value) -> bool {
        self.messages.clear();
        let Some(pattern) = self.pattern.as_deref() else {
            self.messages.push("No pattern given.".to_string());
            return false;
        };
        let text = value.to_string();
        if matches_pattern(&text, pattern) {
            return true;
        }
        self.messages.push(
            self.message
                .clone()
                .unwrap_or_else(|| format!("{text} does not match the required format.")),
        );
        false
    }

    fn messages(&self) -> Vec<String> {
        self.messages.clone()
    }
}

/// Accepts syntactically valid email addresses.
#[derive(Debug, Clone, Default)]
pub struct EmailValidator {
    messages: Vec<String>,
}

impl EmailValidator {
    pub fn new(_args: Option<&Value>) -> Self {
        Self::default()
    }
}

impl StructuredValidator for EmailValidator {
    fn validate(&mut self, value: &Value) -> bool {
        self.messages.clear();
        let valid = value
            .as_str()
            .is_some_and(|s| matches_pattern(s, EMAIL_PATTERN));
        if !valid {
            self.messages.push("Invalid email address.".to_string());
        }
        valid
    }

    fn messages(&self) -> Vec<String> {
        self.messages.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_email_pattern() {
        assert!(matches_pattern("test@example.com", EMAIL_PATTERN));
        assert!(matches_pattern("user.name+tag@domain.org", EMAIL_PATTERN));
        assert!(!matches_pattern("invalid", EMAIL_PATTERN));
        assert!(!matches_pattern("@example.com", EMAIL_PATTERN));
    }

    #[test]
    fn test_invalid_pattern_is_non_match() {
        assert!(!matches_pattern("anything", "(unclosed"));
    }

    #[test]
    fn test_cached_pattern_reused() {
        let pattern = r"^\d{4}$";
        assert!(matches_pattern("2024", pattern));
        assert!(matches_pattern("1999", pattern));
        assert!(!matches_pattern("99", pattern));
    }

    #[test]
    fn test_pattern_validator_messages() {
        let args = Value::Array(vec![
            Value::from(r"^[A-Z]{3}$"),
            Value::from("Use a three letter code."),
        ]);
        let mut v = PatternValidator::new(Some(&args));
        assert!(v.validate(&Value::from("ABC")));
        assert!(v.messages().is_empty());
        assert!(!v.validate(&Value::from("abcd")));
        assert_eq!(v.messages(), vec!["Use a three letter code.".to_string()]);
    }

    #[test]
    fn test_pattern_validator_without_pattern() {
        let mut v = PatternValidator::new(None);
        assert!(!v.validate(&Value::from("x")));
        assert_eq!(v.messages().len(), 1);
    }

    #[test]
    fn test_email_validator() {
        let mut v = EmailValidator::new(None);
        assert!(v.validate(&Value::from("a@b.io")));
        assert!(!v.validate(&Value::Int(3)));
        assert_eq!(v.messages(), vec!["Invalid email address.".to_string()]);
    }
}
