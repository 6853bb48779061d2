use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowId(String);

impl RowId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RowId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Name,
    Website,
    Phone,
    Status,
    Preferred,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::Name,
        Field::Website,
        Field::Phone,
        Field::Status,
        Field::Preferred,
    ];

    /// Fields reachable with Tab/Arrow navigation, in column order.
    pub const NAVIGABLE: [Field; 4] = [Field::Name, Field::Website, Field::Phone, Field::Status];

    pub fn kind(self) -> FieldKind {
        match self {
            Field::Name => FieldKind::Text,
            Field::Website => FieldKind::Url,
            Field::Phone => FieldKind::Phone,
            Field::Status => FieldKind::Enum,
            Field::Preferred => FieldKind::Boolean,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Field::Name => "Name",
            Field::Website => "Website",
            Field::Phone => "Phone",
            Field::Status => "Status",
            Field::Preferred => "Preferred",
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Website => "website",
            Field::Phone => "phone",
            Field::Status => "status",
            Field::Preferred => "preferred",
        }
    }

    pub fn column_index(self) -> Option<usize> {
        Self::NAVIGABLE.iter().position(|field| *field == self)
    }

    pub fn from_column_index(index: usize) -> Option<Field> {
        Self::NAVIGABLE.get(index).copied()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Url,
    Phone,
    Enum,
    Boolean,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SupplierStatus {
    #[default]
    Active,
    OnHold,
    Inactive,
    Archived,
}

impl SupplierStatus {
    pub fn all() -> &'static [Self] {
        &[Self::Active, Self::OnHold, Self::Inactive, Self::Archived]
    }

    pub fn code(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::OnHold => "onHold",
            Self::Inactive => "inactive",
            Self::Archived => "archived",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "active" => Some(Self::Active),
            "onHold" => Some(Self::OnHold),
            "inactive" => Some(Self::Inactive),
            "archived" => Some(Self::Archived),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::OnHold => "On hold",
            Self::Inactive => "Inactive",
            Self::Archived => "Archived",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Url(String),
    Phone(String),
    Enum(SupplierStatus),
    Boolean(bool),
}

impl FieldValue {
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Text(_) => FieldKind::Text,
            FieldValue::Url(_) => FieldKind::Url,
            FieldValue::Phone(_) => FieldKind::Phone,
            FieldValue::Enum(_) => FieldKind::Enum,
            FieldValue::Boolean(_) => FieldKind::Boolean,
        }
    }

    /// Builds a value for `field` from raw input text (an `<input>` value or
    /// a `<select>` option code).
    pub fn from_input(field: Field, input: &str) -> Result<FieldValue, ValidationError> {
        match field.kind() {
            FieldKind::Text => Ok(FieldValue::Text(input.to_string())),
            FieldKind::Url => Ok(FieldValue::Url(input.to_string())),
            FieldKind::Phone => Ok(FieldValue::Phone(input.to_string())),
            FieldKind::Enum => SupplierStatus::from_code(input)
                .map(FieldValue::Enum)
                .ok_or_else(|| ValidationError::UnknownStatus(input.to_string())),
            FieldKind::Boolean => match input {
                "true" | "on" => Ok(FieldValue::Boolean(true)),
                "false" | "off" | "" => Ok(FieldValue::Boolean(false)),
                other => Err(ValidationError::KindMismatch {
                    field,
                    found: other.to_string(),
                }),
            },
        }
    }

    pub fn display(&self) -> String {
        match self {
            FieldValue::Text(s) | FieldValue::Url(s) | FieldValue::Phone(s) => s.clone(),
            FieldValue::Enum(status) => status.label().to_string(),
            FieldValue::Boolean(b) => b.to_string(),
        }
    }

    pub fn input_text(&self) -> String {
        match self {
            FieldValue::Text(s) | FieldValue::Url(s) | FieldValue::Phone(s) => s.clone(),
            FieldValue::Enum(status) => status.code().to_string(),
            FieldValue::Boolean(b) => b.to_string(),
        }
    }

    pub fn validate_for(&self, field: Field) -> Result<(), ValidationError> {
        if self.kind() != field.kind() {
            return Err(ValidationError::KindMismatch {
                field,
                found: self.display(),
            });
        }

        match self {
            FieldValue::Text(name) => {
                if name.trim().is_empty() {
                    Err(ValidationError::EmptyName)
                } else {
                    Ok(())
                }
            }
            FieldValue::Url(url) => validate_url(url),
            FieldValue::Phone(phone) => validate_phone(phone),
            FieldValue::Enum(_) | FieldValue::Boolean(_) => Ok(()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("name cannot be empty")]
    EmptyName,
    #[error("'{0}' is not a valid website address")]
    InvalidUrl(String),
    #[error("'{0}' is not a valid phone number")]
    InvalidPhone(String),
    #[error("unknown supplier status '{0}'")]
    UnknownStatus(String),
    #[error("value '{found}' does not fit the {} column", .field.label())]
    KindMismatch { field: Field, found: String },
}

fn validate_url(url: &str) -> Result<(), ValidationError> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return Ok(());
    }

    let invalid = || ValidationError::InvalidUrl(url.to_string());
    if trimmed.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    let rest = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .unwrap_or(trimmed);
    let host = rest.split(['/', '?', '#']).next().unwrap_or_default();
    let valid_host = host.contains('.')
        && !host.starts_with('.')
        && !host.ends_with('.')
        && host
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '.' | '-' | ':'));

    if valid_host {
        Ok(())
    } else {
        Err(invalid())
    }
}

fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    let trimmed = phone.trim();
    if trimmed.is_empty() {
        return Ok(());
    }

    let allowed = trimmed
        .chars()
        .all(|ch| ch.is_ascii_digit() || matches!(ch, ' ' | '+' | '-' | '(' | ')' | '.'));
    let digits = trimmed.chars().filter(char::is_ascii_digit).count();

    if allowed && digits >= 7 {
        Ok(())
    } else {
        Err(ValidationError::InvalidPhone(phone.to_string()))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Row {
    pub id: RowId,
    pub name: String,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub status: SupplierStatus,
    #[serde(default)]
    pub preferred: bool,
}

impl Row {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: RowId::new(id),
            name: name.into(),
            website: String::new(),
            phone: String::new(),
            status: SupplierStatus::Active,
            preferred: false,
        }
    }

    pub fn get(&self, field: Field) -> FieldValue {
        match field {
            Field::Name => FieldValue::Text(self.name.clone()),
            Field::Website => FieldValue::Url(self.website.clone()),
            Field::Phone => FieldValue::Phone(self.phone.clone()),
            Field::Status => FieldValue::Enum(self.status),
            Field::Preferred => FieldValue::Boolean(self.preferred),
        }
    }

    pub fn set(&mut self, field: Field, value: FieldValue) -> bool {
        match (field, value) {
            (Field::Name, FieldValue::Text(v)) => self.name = v,
            (Field::Website, FieldValue::Url(v)) => self.website = v,
            (Field::Phone, FieldValue::Phone(v)) => self.phone = v,
            (Field::Status, FieldValue::Enum(v)) => self.status = v,
            (Field::Preferred, FieldValue::Boolean(v)) => self.preferred = v,
            _ => return false,
        }
        true
    }

    pub fn with(mut self, field: Field, value: FieldValue) -> Self {
        self.set(field, value);
        self
    }

    pub fn with_website(mut self, website: impl Into<String>) -> Self {
        self.website = website.into();
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = phone.into();
        self
    }

    pub fn with_status(mut self, status: SupplierStatus) -> Self {
        self.status = status;
        self
    }
}
