use std::collections::BTreeSet;

use super::dto::{Credentials, Field};
use super::schema::{FieldErrors, ValidationSchema};

/// Values, per-field errors and touched markers of one form instance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    pub values: Credentials,
    pub errors: FieldErrors,
    pub touched: BTreeSet<Field>,
}

impl FormState {
    /// Keystroke. Only the edited field is re-validated.
    pub fn on_change(&mut self, schema: &ValidationSchema, field: Field, value: impl Into<String>) {
        self.values.set(field, value.into());
        self.revalidate(schema, field);
    }

    /// Focus left the field; its error may now be shown.
    pub fn on_blur(&mut self, schema: &ValidationSchema, field: Field) {
        self.touched.insert(field);
        self.revalidate(schema, field);
    }

    /// Touches every field and validates the whole form. Returns `true` when
    /// the form may be submitted.
    pub fn validate_for_submit(&mut self, schema: &ValidationSchema) -> bool {
        self.touched.extend(Field::ALL);
        self.errors = schema.validate(&self.values);
        self.errors.is_empty()
    }

    pub fn visible_error(&self, field: Field) -> Option<&str> {
        if self.touched.contains(&field) {
            self.errors.get(&field).map(String::as_str)
        } else {
            None
        }
    }

    pub fn is_touched(&self, field: Field) -> bool {
        self.touched.contains(&field)
    }

    fn revalidate(&mut self, schema: &ValidationSchema, field: Field) {
        match schema.validate_field(field, self.values.get(field)) {
            Some(msg) => {
                self.errors.insert(field, msg);
            }
            None => {
                self.errors.remove(&field);
            }
        }
    }
}
