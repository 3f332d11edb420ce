//! Text forms used by the auth screens and the profile tab

use crate::validation::{Field, FieldErrors};

/// A vertical list of labelled text inputs
#[derive(Debug, Clone, Default)]
pub struct Form {
    fields: Vec<(Field, String)>,
    focus: usize,
    errors: FieldErrors,
}

impl Form {
    /// Empty form with the given fields, focus on the first
    pub fn new(fields: &[Field]) -> Self {
        Self {
            fields: fields.iter().map(|f| (*f, String::new())).collect(),
            focus: 0,
            errors: FieldErrors::default(),
        }
    }

    /// Fields in display order
    pub fn fields(&self) -> impl Iterator<Item = (Field, &str)> {
        self.fields.iter().map(|(field, value)| (*field, value.as_str()))
    }

    /// Value of a field (empty if the form does not have it)
    pub fn value(&self, field: Field) -> &str {
        self.fields
            .iter()
            .find(|(f, _)| *f == field)
            .map_or("", |(_, value)| value.as_str())
    }

    /// Overwrite a field
    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        if let Some((_, slot)) = self.fields.iter_mut().find(|(f, _)| *f == field) {
            *slot = value.into();
        }
    }

    /// Focused field
    pub fn focused(&self) -> Option<Field> {
        self.fields.get(self.focus).map(|(field, _)| *field)
    }

    /// Index of the focused field
    pub const fn focus_index(&self) -> usize {
        self.focus
    }

    /// Move focus down, wrapping
    pub fn focus_next(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + 1) % self.fields.len();
        }
    }

    /// Move focus up, wrapping
    pub fn focus_prev(&mut self) {
        if !self.fields.is_empty() {
            self.focus = self.focus.checked_sub(1).unwrap_or(self.fields.len() - 1);
        }
    }

    /// Type into the focused field
    pub fn push(&mut self, c: char) {
        if let Some((field, value)) = self.fields.get_mut(self.focus) {
            value.push(c);
            let field = *field;
            self.clear_error(field);
        }
    }

    /// Delete from the focused field
    pub fn pop(&mut self) {
        if let Some((_, value)) = self.fields.get_mut(self.focus) {
            value.pop();
        }
    }

    /// Validation messages
    pub const fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Replace validation messages (focus jumps to the first bad field)
    pub fn set_errors(&mut self, errors: FieldErrors) {
        if let Some((field, _)) = errors.iter().next()
            && let Some(index) = self.fields.iter().position(|(f, _)| *f == field)
        {
            self.focus = index;
        }
        self.errors = errors;
    }

    fn clear_error(&mut self, field: Field) {
        if self.errors.get(field).is_some() {
            let mut remaining = FieldErrors::default();
            for (f, message) in self.errors.iter().filter(|(f, _)| *f != field) {
                remaining.insert(f, message);
            }
            self.errors = remaining;
        }
    }

    /// Check with a validator and record the outcome
    pub fn validate(&mut self, check: impl FnOnce(&Self) -> Result<(), FieldErrors>) -> bool {
        match check(self) {
            Ok(()) => {
                self.errors = FieldErrors::default();
                true
            }
            Err(errors) => {
                self.set_errors(errors);
                false
            }
        }
    }

    /// Clear every value and message, keeping the fields
    pub fn reset(&mut self) {
        for (_, value) in &mut self.fields {
            value.clear();
        }
        self.focus = 0;
        self.errors = FieldErrors::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation;

    fn login_form() -> Form {
        Form::new(&[Field::Email, Field::Password])
    }

    #[test]
    fn test_typing_goes_to_focused_field() {
        let mut form = login_form();
        form.push('a');
        form.focus_next();
        form.push('x');
        form.push('y');
        form.pop();

        assert_eq!(form.value(Field::Email), "a");
        assert_eq!(form.value(Field::Password), "x");
        assert_eq!(form.value(Field::Code), "");
    }

    #[test]
    fn test_focus_wraps() {
        let mut form = login_form();
        form.focus_prev();
        assert_eq!(form.focused(), Some(Field::Password));
        form.focus_next();
        assert_eq!(form.focused(), Some(Field::Email));
    }

    #[test]
    fn test_failed_validation_focuses_first_error() {
        let mut form = login_form();
        form.set(Field::Email, "a@b.co");
        form.focus_prev();
        let ok = form.validate(|f| validation::login(f.value(Field::Email), f.value(Field::Password)));

        assert!(!ok);
        assert_eq!(form.focused(), Some(Field::Password));
        assert_eq!(form.errors().get(Field::Password), Some("Password is required"));
    }

    #[test]
    fn test_typing_clears_that_fields_error() {
        let mut form = login_form();
        form.validate(|f| validation::login(f.value(Field::Email), f.value(Field::Password)));
        assert!(form.errors().get(Field::Email).is_some());

        form.push('a');
        assert!(form.errors().get(Field::Email).is_none());
        assert!(form.errors().get(Field::Password).is_some());
    }
}
