//! Form validation
//!
//! Each form validates to a [`FieldErrors`] map so messages can be shown next
//! to the field they belong to.

use regex_lite::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Minimum length of a new password
pub const MIN_PASSWORD_LEN: usize = 6;

static EMAIL_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok());

/// Form field identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    /// Email address
    Email,
    /// Password
    Password,
    /// Password confirmation
    PasswordConfirmation,
    /// Emailed reset code
    Code,
    /// First name
    FirstName,
    /// Last name
    LastName,
}

impl Field {
    /// Label shown next to the input
    pub const fn label(self) -> &'static str {
        match self {
            Self::Email => "Email",
            Self::Password => "Password",
            Self::PasswordConfirmation => "Confirm password",
            Self::Code => "Code",
            Self::FirstName => "First name",
            Self::LastName => "Last name",
        }
    }

    /// Whether the input should be masked
    pub const fn is_secret(self) -> bool {
        matches!(self, Self::Password | Self::PasswordConfirmation)
    }
}

/// Validation messages keyed by field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<Field, String>);

impl FieldErrors {
    /// No errors
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Message for a field
    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    /// Record the first error for a field
    fn add(&mut self, field: Field, message: &str) {
        self.0.entry(field).or_insert_with(|| message.to_string());
    }

    /// Set the message for a field, replacing any earlier one
    pub fn insert(&mut self, field: Field, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    /// Convert into a `Result`
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }

    /// Iterate over errors in field order
    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }
}

/// Whether `email` looks like an address
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE
        .as_ref()
        .is_some_and(|re| re.is_match(email.trim()))
}

fn required(errors: &mut FieldErrors, field: Field, value: &str, message: &str) {
    if value.trim().is_empty() {
        errors.add(field, message);
    }
}

/// Login: email and password are required
pub fn login(email: &str, password: &str) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::default();
    required(&mut errors, Field::Email, email, "Email is required");
    required(&mut errors, Field::Password, password, "Password is required");
    errors.into_result()
}

/// Signup: all fields required and the confirmation must match
pub fn signup(email: &str, password: &str, confirmation: &str) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::default();
    required(&mut errors, Field::Email, email, "Email is required");
    required(&mut errors, Field::Password, password, "Password is required");
    required(
        &mut errors,
        Field::PasswordConfirmation,
        confirmation,
        "Password confirmation is required",
    );
    if !confirmation.is_empty() && password != confirmation {
        errors.add(Field::PasswordConfirmation, "Passwords do not match");
    }
    errors.into_result()
}

/// First step of a password reset
pub fn reset_request(email: &str) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::default();
    required(&mut errors, Field::Email, email, "Email is required");
    if !email.trim().is_empty() && !is_valid_email(email) {
        errors.add(Field::Email, "Email is invalid");
    }
    errors.into_result()
}

/// Second step: the emailed code
pub fn reset_code(code: &str) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::default();
    required(&mut errors, Field::Code, code, "Code is required");
    errors.into_result()
}

/// Final step: the new password
pub fn new_password(password: &str, confirmation: &str) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::default();
    let password = password.trim();
    let confirmation = confirmation.trim();

    required(&mut errors, Field::Password, password, "Password is required");
    if !password.is_empty() && password.chars().count() < MIN_PASSWORD_LEN {
        errors.add(Field::Password, "Password must be at least 6 characters");
    }
    required(
        &mut errors,
        Field::PasswordConfirmation,
        confirmation,
        "Password confirmation is required",
    );
    if !confirmation.is_empty() && password != confirmation {
        errors.add(Field::PasswordConfirmation, "Passwords do not match");
    }
    errors.into_result()
}

/// Profile: names required; the password pair must match when either is set
pub fn profile(
    first_name: &str,
    last_name: &str,
    password: &str,
    confirmation: &str,
) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::default();
    required(&mut errors, Field::FirstName, first_name, "First name is required");
    required(&mut errors, Field::LastName, last_name, "Last name is required");
    if (!password.is_empty() || !confirmation.is_empty()) && password != confirmation {
        errors.add(Field::PasswordConfirmation, "Passwords must match");
    }
    errors.into_result()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_pattern() {
        assert!(is_valid_email("ruth@moab.org"));
        assert!(is_valid_email("  a@b.co "));
        assert!(!is_valid_email("ruth@moab"));
        assert!(!is_valid_email("ruth moab@x.org"));
        assert!(!is_valid_email("@x.org"));
    }

    #[test]
    fn test_login_requires_both() {
        let errors = login("", " ").unwrap_err();
        assert_eq!(errors.get(Field::Email), Some("Email is required"));
        assert_eq!(errors.get(Field::Password), Some("Password is required"));
        assert!(login("a@b.co", "secret").is_ok());
    }

    #[test]
    fn test_signup_mismatch() {
        let errors = signup("a@b.co", "secret", "secreT").unwrap_err();
        assert_eq!(
            errors.get(Field::PasswordConfirmation),
            Some("Passwords do not match")
        );
        assert!(errors.get(Field::Email).is_none());
    }

    #[test]
    fn test_signup_missing_confirmation_reports_required() {
        let errors = signup("a@b.co", "secret", "").unwrap_err();
        assert_eq!(
            errors.get(Field::PasswordConfirmation),
            Some("Password confirmation is required")
        );
    }

    #[test]
    fn test_reset_request() {
        assert_eq!(
            reset_request("").unwrap_err().get(Field::Email),
            Some("Email is required")
        );
        assert_eq!(
            reset_request("nope").unwrap_err().get(Field::Email),
            Some("Email is invalid")
        );
        assert!(reset_request("a@b.co").is_ok());
    }

    #[test]
    fn test_reset_code() {
        assert!(reset_code("  ").is_err());
        assert!(reset_code("123456").is_ok());
    }

    #[test]
    fn test_new_password_length_and_match() {
        let errors = new_password("abc", "abc").unwrap_err();
        assert_eq!(
            errors.get(Field::Password),
            Some("Password must be at least 6 characters")
        );

        let errors = new_password("abcdef", "abcdeg").unwrap_err();
        assert!(errors.get(Field::Password).is_none());
        assert_eq!(
            errors.get(Field::PasswordConfirmation),
            Some("Passwords do not match")
        );

        assert!(new_password(" abcdef ", "abcdef").is_ok());
    }

    #[test]
    fn test_profile() {
        let errors = profile("", "Smith", "", "").unwrap_err();
        assert_eq!(errors.get(Field::FirstName), Some("First name is required"));
        assert!(profile("Ann", "Smith", "", "").is_ok());
        assert!(profile("Ann", "Smith", "new", "").is_err());
        assert!(profile("Ann", "Smith", "newpass", "newpass").is_ok());
    }

    #[test]
    fn test_errors_iterate_in_field_order() {
        let errors = signup("", "", "").unwrap_err();
        let fields: Vec<Field> = errors.iter().map(|(field, _)| field).collect();
        assert_eq!(
            fields,
            vec![Field::Email, Field::Password, Field::PasswordConfirmation]
        );
    }
}
