use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::FieldError;

/// Matches `local@domain.tld` without being clever about RFC 5321 corner
/// cases: no whitespace, no second `@`, at least one dot in the domain.
pub static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

pub const NAME_PART_MAX: usize = 50;
pub const AGE_STORED_MIN: i32 = 0;
pub const AGE_STORED_MAX: i32 = 150;

/// The single persisted record of this application.
///
/// `first_name`/`last_name` are never accepted from clients directly; they
/// are derived by splitting the submitted `name` (see
/// [`crate::service::split_name`]).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,
    pub first_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    pub fn new(
        first_name: String,
        last_name: Option<String>,
        email: String,
        age: Option<i32>,
    ) -> Self {
        let now = Utc::now();

        Self {
            id: Uuid::new_v4().to_string(),
            first_name,
            last_name,
            email,
            age,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Storage-layer constraints, checked before every persist.
    ///
    /// Deliberately looser than the request validation in
    /// [`crate::validation`] (age 0..=150 here versus 13..=120 there); both
    /// layers are kept independent.
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();

        let first_name = self.first_name.trim();
        if first_name.is_empty() {
            errors.push(FieldError::new(
                "firstName",
                "First name must be at least 1 character long",
            ));
        }
        if first_name.chars().count() > NAME_PART_MAX {
            errors.push(FieldError::new(
                "firstName",
                "First name cannot exceed 50 characters",
            ));
        }

        if let Some(last_name) = &self.last_name {
            if last_name.trim().chars().count() > NAME_PART_MAX {
                errors.push(FieldError::new(
                    "lastName",
                    "Last name cannot exceed 50 characters",
                ));
            }
        }

        if self.email.trim().is_empty() {
            errors.push(FieldError::new("email", "Email is required"));
        } else if !EMAIL_PATTERN.is_match(self.email.trim()) {
            errors.push(FieldError::new(
                "email",
                "Please provide a valid email address",
            ));
        }

        if let Some(age) = self.age {
            if age < AGE_STORED_MIN {
                errors.push(FieldError::new("age", "Age must be a positive number"));
            }
            if age > AGE_STORED_MAX {
                errors.push(FieldError::new("age", "Age cannot exceed 150"));
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}
