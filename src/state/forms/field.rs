//! Form field value objects

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// The fields of the create-user form, in declaration order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldName {
    Name,
    Email,
    Password,
}

impl FieldName {
    /// All fields in declaration order
    pub const ALL: [FieldName; 3] = [FieldName::Name, FieldName::Email, FieldName::Password];

    /// Key used by engines that address fields by string path
    pub fn key(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Password => "password",
        }
    }

    /// Resolve a string path back to a field
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "name" => Some(Self::Name),
            "email" => Some(Self::Email),
            "password" => Some(Self::Password),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Name => "Fullname",
            Self::Email => "E-mail",
            Self::Password => "Password",
        }
    }

    pub fn placeholder(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Password => "password",
        }
    }

    /// Whether the input should hide what is typed
    pub fn is_secret(&self) -> bool {
        matches!(self, Self::Password)
    }

    pub fn next(&self) -> Self {
        match self {
            Self::Name => Self::Email,
            Self::Email => Self::Password,
            Self::Password => Self::Name,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            Self::Name => Self::Password,
            Self::Email => Self::Name,
            Self::Password => Self::Email,
        }
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Raw (or, after validation, transformed) values of the create-user form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormValues {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl FormValues {
    #[cfg(test)]
    pub fn new(name: &str, email: &str, password: &str) -> Self {
        Self {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    pub fn get(&self, field: FieldName) -> &str {
        match field {
            FieldName::Name => &self.name,
            FieldName::Email => &self.email,
            FieldName::Password => &self.password,
        }
    }

    fn get_mut(&mut self, field: FieldName) -> &mut String {
        match field {
            FieldName::Name => &mut self.name,
            FieldName::Email => &mut self.email,
            FieldName::Password => &mut self.password,
        }
    }

    pub fn set(&mut self, field: FieldName, value: String) {
        *self.get_mut(field) = value;
    }

    /// Push a character to a field value
    pub fn push_char(&mut self, field: FieldName, c: char) {
        self.get_mut(field).push(c);
    }

    /// Remove the last character from a field value
    pub fn pop_char(&mut self, field: FieldName) -> Option<char> {
        self.get_mut(field).pop()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        FieldName::ALL.iter().all(|f| self.get(*f).is_empty())
    }

    /// Get the display value for rendering; secret fields are masked
    pub fn display_value(&self, field: FieldName) -> String {
        let value = self.get(field);
        if field.is_secret() {
            mask(value)
        } else {
            value.to_string()
        }
    }
}

/// Replace every character with `*`, preserving character count
pub fn mask(value: &str) -> String {
    "*".repeat(value.chars().count())
}

/// Fields the user has interacted with during the current session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TouchedSet(BTreeSet<FieldName>);

impl TouchedSet {
    pub fn insert(&mut self, field: FieldName) {
        self.0.insert(field);
    }

    pub fn touch_all(&mut self) {
        self.0.extend(FieldName::ALL);
    }

    pub fn contains(&self, field: FieldName) -> bool {
        self.0.contains(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

/// Fields whose current value differs from the initial empty value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirtySet(BTreeSet<FieldName>);

impl DirtySet {
    /// Recompute dirtiness of one field against its initial value
    pub fn update(&mut self, field: FieldName, value: &str) {
        if value.is_empty() {
            self.0.remove(&field);
        } else {
            self.0.insert(field);
        }
    }

    pub fn contains(&self, field: FieldName) -> bool {
        self.0.contains(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}
