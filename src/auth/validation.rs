//! Pure form predicates.
//!
//! Every check returns a [`ValidationResult`]; rendering the message is left to
//! [`MessageBoard`](super::messages::MessageBoard).

use lazy_static::lazy_static;
use regex::Regex;
use std::borrow::Cow;
use validator::ValidationError;

pub const NAME_MESSAGE: &str =
    "Name must be between 3 and 20 characters and may only contain letters and spaces";
pub const EMAIL_MESSAGE: &str = "Email address is not valid";
pub const PASSWORD_MESSAGE: &str =
    "Password must be at least 8 characters with a lowercase letter, a number and a special character";
pub const REPEAT_MESSAGE: &str = "Passwords do not match";
pub const EMAIL_TAKEN_MESSAGE: &str = "This email is already registered";

const PASSWORD_MIN_CHARS: usize = 8;

lazy_static! {
    // Letters from any script (combining marks included) plus plain spaces.
    static ref NAME_REGEX: Regex = Regex::new(r"^[\p{L}\p{M} ]{3,20}$").unwrap();
    static ref EMAIL_REGEX: Regex =
        Regex::new(r"^[a-zA-Z0-9._-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,6}$").unwrap();
    static ref LOWERCASE_REGEX: Regex = Regex::new(r"[a-z]").unwrap();
    static ref DIGIT_REGEX: Regex = Regex::new(r"[0-9]").unwrap();
}

/// Outcome of a single field check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub valid: bool,
    pub message: String,
}

impl ValidationResult {
    fn check(valid: bool, message: &str) -> Self {
        Self {
            valid,
            message: if valid { String::new() } else { message.to_string() },
        }
    }

    /// Adapts the result to a `validator` field rule.
    pub fn into_rule(self, code: &'static str) -> Result<(), ValidationError> {
        if self.valid {
            return Ok(());
        }
        let mut error = ValidationError::new(code);
        error.message = Some(Cow::Owned(self.message));
        Err(error)
    }
}

pub fn validate_name(name: &str) -> ValidationResult {
    ValidationResult::check(NAME_REGEX.is_match(name.trim()), NAME_MESSAGE)
}

pub fn validate_email(email: &str) -> ValidationResult {
    ValidationResult::check(EMAIL_REGEX.is_match(email), EMAIL_MESSAGE)
}

pub fn validate_password(password: &str) -> ValidationResult {
    let valid = password.chars().count() >= PASSWORD_MIN_CHARS
        && !password.chars().any(char::is_whitespace)
        && LOWERCASE_REGEX.is_match(password)
        && DIGIT_REGEX.is_match(password)
        && password.chars().any(is_special);
    ValidationResult::check(valid, PASSWORD_MESSAGE)
}

pub fn validate_repeat(password: &str, repeat: &str) -> ValidationResult {
    ValidationResult::check(password == repeat, REPEAT_MESSAGE)
}

/// Neither a word character (`[A-Za-z0-9_]`) nor whitespace.
fn is_special(c: char) -> bool {
    !(c.is_ascii_alphanumeric() || c == '_' || c.is_whitespace())
}

pub(crate) fn name_rule(value: &str) -> Result<(), ValidationError> {
    validate_name(value).into_rule("name")
}

pub(crate) fn email_rule(value: &str) -> Result<(), ValidationError> {
    validate_email(value).into_rule("email")
}

pub(crate) fn password_rule(value: &str) -> Result<(), ValidationError> {
    validate_password(value).into_rule("password")
}
