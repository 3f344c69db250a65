//! Request-level validation.
//!
//! Every rule on every field is checked independently, so one bad request
//! reports all of its problems at once. Rule order and messages follow the
//! API contract; a violated rule contributes exactly one
//! [`FieldError`](crate::error::FieldError).

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use crate::{error::FieldError, model::EMAIL_PATTERN};

static NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z\s]+$").unwrap());

pub const NAME_MIN: usize = 3;
pub const NAME_MAX: usize = 100;
pub const EMAIL_MAX: usize = 100;
pub const AGE_MIN: i64 = 13;
pub const AGE_MAX: i64 = 120;

/// Raw request body. Fields are taken loosely (age as any JSON value) so
/// that deserialization never pre-empts validation and numeric-like strings
/// can be coerced.
#[derive(Debug, Default, Deserialize)]
pub struct RawProfileInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub age: Option<Value>,
}

/// Normalized create payload: trimmed name, lower-cased email, coerced age.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateInput {
    pub name: String,
    pub email: String,
    pub age: Option<i32>,
}

/// Normalized partial-update payload; absent fields stay untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub age: Option<i32>,
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn validate_create(raw: &RawProfileInput) -> Result<CreateInput, Vec<FieldError>> {
    let mut errors = Vec::new();

    let name = raw.name.as_deref().unwrap_or("").trim().to_string();
    if name.is_empty() {
        errors.push(FieldError::new("name", "Name is required"));
    }
    check_name_rules(&name, &mut errors);

    let email = normalize_email(raw.email.as_deref().unwrap_or(""));
    if email.is_empty() {
        errors.push(FieldError::new("email", "Email is required"));
    }
    check_email_rules(&email, &mut errors);

    let age = check_age(raw.age.as_ref(), &mut errors);

    if errors.is_empty() {
        Ok(CreateInput { name, email, age })
    } else {
        Err(errors)
    }
}

pub fn validate_update(raw: &RawProfileInput) -> Result<UpdateInput, Vec<FieldError>> {
    let mut errors = Vec::new();

    let name = raw.name.as_deref().map(|n| n.trim().to_string());
    if let Some(name) = &name {
        check_name_rules(name, &mut errors);
    }

    let email = raw.email.as_deref().map(normalize_email);
    if let Some(email) = &email {
        check_email_rules(email, &mut errors);
    }

    let age = check_age(raw.age.as_ref(), &mut errors);

    if errors.is_empty() {
        Ok(UpdateInput { name, email, age })
    } else {
        Err(errors)
    }
}

fn check_name_rules(name: &str, errors: &mut Vec<FieldError>) {
    let length = name.chars().count();

    if length < NAME_MIN {
        errors.push(FieldError::new(
            "name",
            "Name must be at least 3 characters long",
        ));
    }
    if length > NAME_MAX {
        errors.push(FieldError::new("name", "Name cannot exceed 100 characters"));
    }
    if !NAME_PATTERN.is_match(name) {
        errors.push(FieldError::new(
            "name",
            "Name can only contain letters and spaces",
        ));
    }
}

fn check_email_rules(email: &str, errors: &mut Vec<FieldError>) {
    if !EMAIL_PATTERN.is_match(email) {
        errors.push(FieldError::new(
            "email",
            "Please provide a valid email address",
        ));
    }
    if email.chars().count() > EMAIL_MAX {
        errors.push(FieldError::new(
            "email",
            "Email cannot exceed 100 characters",
        ));
    }
}

/// Coerces an optional age from a JSON number or a numeric string, then
/// range-checks it. Anything else (floats, booleans, unparsable strings,
/// out-of-range integers) is one violation of the age rule.
fn check_age(age: Option<&Value>, errors: &mut Vec<FieldError>) -> Option<i32> {
    let value = age?;

    let parsed = match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };

    match parsed {
        Some(n) if (AGE_MIN..=AGE_MAX).contains(&n) => Some(n as i32),
        _ => {
            errors.push(FieldError::new(
                "age",
                "Age must be an integer between 13 and 120",
            ));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn raw(name: Option<&str>, email: Option<&str>, age: Option<Value>) -> RawProfileInput {
        RawProfileInput {
            name: name.map(str::to_string),
            email: email.map(str::to_string),
            age,
        }
    }

    #[test]
    fn create_normalizes_name_and_email() {
        let input = validate_create(&raw(
            Some("  John Doe  "),
            Some("  John@Example.COM "),
            Some(json!(30)),
        ))
        .unwrap();

        assert_eq!(input.name, "John Doe");
        assert_eq!(input.email, "john@example.com");
        assert_eq!(input.age, Some(30));
    }

    #[test]
    fn every_violated_rule_is_reported() {
        let errors = validate_create(&raw(
            Some("Jo"),
            Some("invalid-email"),
            Some(json!(-5)),
        ))
        .unwrap_err();

        assert_eq!(errors.len(), 3);
        assert_eq!(errors[0].field, "name");
        assert_eq!(errors[0].message, "Name must be at least 3 characters long");
        assert_eq!(errors[1].field, "email");
        assert_eq!(errors[2].field, "age");
    }

    #[test]
    fn missing_fields_fail_required_and_shape_rules() {
        let errors = validate_create(&raw(None, None, None)).unwrap_err();

        let messages: Vec<&str> = errors.iter().map(|e| e.message.as_str()).collect();
        assert!(messages.contains(&"Name is required"));
        assert!(messages.contains(&"Email is required"));
        assert!(messages.contains(&"Please provide a valid email address"));
    }

    #[test]
    fn name_rejects_digits_and_punctuation() {
        for bad in ["John 3rd", "Anne-Marie", "O'Brien"] {
            let errors =
                validate_create(&raw(Some(bad), Some("a@example.com"), None)).unwrap_err();
            assert_eq!(errors.len(), 1, "{bad}");
            assert_eq!(errors[0].message, "Name can only contain letters and spaces");
        }
    }

    #[test]
    fn overlong_fields_are_rejected() {
        let long_name = "a".repeat(101);
        let long_email = format!("{}@example.com", "a".repeat(100));

        let errors =
            validate_create(&raw(Some(&long_name), Some(&long_email), None)).unwrap_err();

        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].message, "Name cannot exceed 100 characters");
        assert_eq!(errors[1].message, "Email cannot exceed 100 characters");
    }

    #[test]
    fn age_coerces_numeric_strings_only() {
        let ok = validate_create(&raw(
            Some("John"),
            Some("a@example.com"),
            Some(json!("42")),
        ))
        .unwrap();
        assert_eq!(ok.age, Some(42));

        for bad in [json!("forty"), json!(30.5), json!(true), json!(12), json!(121)] {
            let errors =
                validate_create(&raw(Some("John"), Some("a@example.com"), Some(bad.clone())))
                    .unwrap_err();
            assert_eq!(errors.len(), 1, "{bad}");
            assert_eq!(
                errors[0].message,
                "Age must be an integer between 13 and 120"
            );
        }
    }

    #[test]
    fn age_boundaries_are_inclusive() {
        for age in [13, 120] {
            let input = validate_create(&raw(
                Some("John"),
                Some("a@example.com"),
                Some(json!(age)),
            ))
            .unwrap();
            assert_eq!(input.age, Some(age));
        }
    }

    #[test]
    fn update_skips_absent_fields() {
        let input = validate_update(&raw(None, None, None)).unwrap();
        assert_eq!(input, UpdateInput::default());
    }

    #[test]
    fn update_still_checks_present_fields() {
        let errors = validate_update(&raw(Some("Jo"), None, Some(json!(5)))).unwrap_err();
        assert_eq!(errors.len(), 2);
    }
}
