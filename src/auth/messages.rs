use std::collections::BTreeMap;
use std::fmt;

use super::validation::ValidationResult;

/// A form input that can carry a validation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Name,
    Email,
    Password,
    Repeat,
    /// Form-level messages, e.g. rejected credentials.
    Form,
}

impl Field {
    /// Name of the matching form struct field.
    pub fn as_str(self) -> &'static str {
        match self {
            Field::Name => "username",
            Field::Email => "email",
            Field::Password => "password",
            Field::Repeat => "repeat_password",
            Field::Form => "form",
        }
    }

    /// Element id of the message node rendered after the input.
    pub fn message_id(self) -> String {
        let prefix = match self {
            Field::Name => "name",
            other => other.as_str(),
        };
        format!("{}-validation-message", prefix)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Holds the visible validation messages of one form.
///
/// There is never more than one message per field: showing a message replaces
/// whatever the field displayed before.
#[derive(Debug, Default, Clone)]
pub struct MessageBoard {
    messages: BTreeMap<Field, String>,
}

impl MessageBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, field: Field, message: impl Into<String>) {
        self.clear(field);
        self.messages.insert(field, message.into());
    }

    pub fn clear(&mut self, field: Field) {
        self.messages.remove(&field);
    }

    pub fn clear_all(&mut self) {
        self.messages.clear();
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.messages.get(&field).map(String::as_str)
    }

    /// Renders `result` for `field` and returns whether it passed.
    pub fn report(&mut self, field: Field, result: &ValidationResult) -> bool {
        if result.valid {
            self.clear(field);
        } else {
            self.show(field, result.message.clone());
        }
        result.valid
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.messages.iter().map(|(field, msg)| (*field, msg.as_str()))
    }
}
