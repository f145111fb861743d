use std::collections::BTreeMap;

use lazy_static::lazy_static;
use regex::Regex;

use super::dto::{Credentials, Field};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s.]+(\.[^@\s.]+)+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Field name -> error message. A missing entry means the field is valid.
pub type FieldErrors = BTreeMap<Field, String>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    Required,
    Email,
    MinLength(usize),
}

impl Rule {
    fn accepts(&self, value: &str) -> bool {
        match self {
            Rule::Required => !value.trim().is_empty(),
            // Emptiness is Required's job.
            Rule::Email => value.is_empty() || is_valid_email(value.trim()),
            Rule::MinLength(n) => value.is_empty() || value.chars().count() >= *n,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRule {
    pub rule: Rule,
    pub message: String,
}

impl FieldRule {
    pub fn new(rule: Rule, message: impl Into<String>) -> Self {
        Self {
            rule,
            message: message.into(),
        }
    }
}

/// Declarative per-field rules. Rules run in order; the first one that
/// rejects the value provides the field's error.
#[derive(Debug, Clone, Default)]
pub struct ValidationSchema {
    rules: BTreeMap<Field, Vec<FieldRule>>,
}

impl ValidationSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, field: Field, rule: Rule, message: impl Into<String>) -> Self {
        self.rules
            .entry(field)
            .or_default()
            .push(FieldRule::new(rule, message));
        self
    }

    pub fn sign_up(min_password_len: usize) -> Self {
        Self::new()
            .field(Field::Email, Rule::Required, "Email is required")
            .field(Field::Email, Rule::Email, "Invalid email")
            .field(Field::Password, Rule::Required, "Password is required")
            .field(
                Field::Password,
                Rule::MinLength(min_password_len),
                format!("Password must be at least {min_password_len} characters"),
            )
    }

    pub fn rules(&self, field: Field) -> &[FieldRule] {
        self.rules.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn validate_field(&self, field: Field, value: &str) -> Option<String> {
        self.rules(field)
            .iter()
            .find(|r| !r.rule.accepts(value))
            .map(|r| r.message.clone())
    }

    pub fn validate(&self, values: &Credentials) -> FieldErrors {
        Field::ALL
            .iter()
            .filter_map(|&f| self.validate_field(f, values.get(f)).map(|msg| (f, msg)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds(email: &str, password: &str) -> Credentials {
        Credentials {
            email: email.into(),
            password: password.into(),
        }
    }

    #[test]
    fn email_regex() {
        assert!(is_valid_email("diner@example.com"));
        assert!(is_valid_email("a.b+c@sub.domain.io"));
        assert!(!is_valid_email("diner@example"));
        assert!(!is_valid_email("diner.example.com"));
        assert!(!is_valid_email("di ner@example.com"));
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("a@.b.c"));
        assert!(!is_valid_email("a@b..c"));
        assert!(!is_valid_email("a@b.c."));
    }

    #[test]
    fn empty_fields_report_required() {
        let errors = ValidationSchema::sign_up(6).validate(&creds("", "  "));
        assert_eq!(errors[&Field::Email], "Email is required");
        assert_eq!(errors[&Field::Password], "Password is required");
    }

    #[test]
    fn malformed_email_and_short_password() {
        let errors = ValidationSchema::sign_up(6).validate(&creds("nope", "12345"));
        assert_eq!(errors[&Field::Email], "Invalid email");
        assert_eq!(errors[&Field::Password], "Password must be at least 6 characters");
    }

    #[test]
    fn min_length_comes_from_configuration() {
        let schema = ValidationSchema::sign_up(10);
        assert!(schema.validate_field(Field::Password, "123456789").is_some());
        assert!(schema.validate_field(Field::Password, "1234567890").is_none());
    }

    #[test]
    fn valid_input_has_no_errors() {
        let errors = ValidationSchema::sign_up(6).validate(&creds("diner@example.com", "secret1"));
        assert!(errors.is_empty());
    }

    #[test]
    fn field_without_rules_is_always_valid() {
        let schema = ValidationSchema::new().field(Field::Email, Rule::Required, "needed");
        assert!(schema.validate_field(Field::Password, "").is_none());
        assert_eq!(schema.validate_field(Field::Email, "").as_deref(), Some("needed"));
    }
}
