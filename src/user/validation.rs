//! Field validation rules and the aggregated error they produce.

use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use thiserror::Error;

/// Why a single field failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationReason {
    #[error("cannot be blank")]
    Required,

    #[error("must be a valid email address")]
    InvalidFormat,

    #[error("the length must be between {min} and {max}")]
    LengthOutOfRange { min: usize, max: usize },
}

/// A failed field together with the reason it failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: ValidationReason,
}

/// Every field failure of one validation pass, in field declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    pub fn get(&self, field: &str) -> Option<&ValidationReason> {
        self.0.iter().find(|e| e.field == field).map(|e| &e.reason)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// A single check applied to a string field value.
pub trait Rule {
    fn check(&self, value: &str) -> Result<(), ValidationReason>;
}

pub struct Required;

impl Rule for Required {
    fn check(&self, value: &str) -> Result<(), ValidationReason> {
        if value.is_empty() {
            return Err(ValidationReason::Required);
        }
        Ok(())
    }
}

/// Applies [`Required`] only when the predicate holds at check time.
pub struct RequiredIf<F> {
    predicate: F,
}

impl<F: Fn() -> bool> Rule for RequiredIf<F> {
    fn check(&self, value: &str) -> Result<(), ValidationReason> {
        if (self.predicate)() {
            return Required.check(value);
        }
        Ok(())
    }
}

pub struct Email;

impl Rule for Email {
    fn check(&self, value: &str) -> Result<(), ValidationReason> {
        if value.is_empty() || is_valid_email(value) {
            return Ok(());
        }
        Err(ValidationReason::InvalidFormat)
    }
}

/// Inclusive bounds on the number of characters. Empty values pass.
pub struct Length {
    min: usize,
    max: usize,
}

impl Rule for Length {
    fn check(&self, value: &str) -> Result<(), ValidationReason> {
        if value.is_empty() {
            return Ok(());
        }
        let len = value.chars().count();
        if len < self.min || len > self.max {
            return Err(ValidationReason::LengthOutOfRange {
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

pub fn required() -> Required {
    Required
}

pub fn required_if<F: Fn() -> bool>(predicate: F) -> RequiredIf<F> {
    RequiredIf { predicate }
}

pub fn email() -> Email {
    Email
}

pub fn length(min: usize, max: usize) -> Length {
    Length { min, max }
}

const MAX_EMAIL_LEN: usize = 254;
const MAX_LOCAL_PART_LEN: usize = 64;

/// Dot-separated non-empty atoms on both sides of a single `@`, and a
/// top-level domain of at least two characters.
pub fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex =
            Regex::new(r"^[^@\s.]+(?:\.[^@\s.]+)*@(?:[^@\s.]+\.)+[^@\s.]{2,}$").unwrap();
    }
    if email.len() > MAX_EMAIL_LEN {
        return false;
    }
    match email.split_once('@') {
        Some((local, _)) if local.len() <= MAX_LOCAL_PART_LEN => EMAIL_RE.is_match(email),
        _ => false,
    }
}

/// Runs each field's rule chain and collects the first failure per field.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<ValidationError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: &'static str, value: &str, rules: &[&dyn Rule]) -> Self {
        if let Some(reason) = rules.iter().find_map(|rule| rule.check(value).err()) {
            self.errors.push(ValidationError { field: name, reason });
        }
        self
    }

    pub fn finish(self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(self.errors))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_rule_accepts_plain_addresses() {
        assert!(email().check("a@b.com").is_ok());
        assert!(email().check("first.last+tag@mail.example.org").is_ok());
    }

    #[test]
    fn email_rule_rejects_malformed_addresses() {
        let long_local = format!("{}@b.com", "a".repeat(300));
        let bad = [
            "not-an-email",
            "a@b",
            "@b.com",
            "a b@c.com",
            "a@@b.com",
            "a..b@c.com",
            ".a@b.com",
            "a.@b.com",
            "a@b..com",
            "a@.b.com",
            "a@b.com.",
            "a@b.c",
            long_local.as_str(),
        ];
        for bad in bad {
            assert_eq!(
                email().check(bad),
                Err(ValidationReason::InvalidFormat),
                "{bad}"
            );
        }
    }

    #[test]
    fn email_length_limits() {
        let local_64 = format!("{}@b.com", "a".repeat(64));
        let local_65 = format!("{}@b.com", "a".repeat(65));
        assert!(email().check(&local_64).is_ok());
        assert!(email().check(&local_65).is_err());

        // "a@" + 248 + ".com"
        let at_limit = format!("a@{}.com", "b".repeat(248));
        assert_eq!(at_limit.len(), 254);
        assert!(email().check(&at_limit).is_ok());
        let over_limit = format!("a@{}.com", "b".repeat(249));
        assert!(email().check(&over_limit).is_err());
    }

    #[test]
    fn optional_rules_skip_empty_values() {
        assert!(email().check("").is_ok());
        assert!(length(8, 16).check("").is_ok());
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        // eight two-byte characters
        assert!(length(8, 16).check("éééééééé").is_ok());
        assert_eq!(
            length(8, 16).check("short"),
            Err(ValidationReason::LengthOutOfRange { min: 8, max: 16 })
        );
        assert!(length(8, 16).check("exactly-sixteen!").is_ok());
        assert!(length(8, 16).check("seventeen-chars!!").is_err());
    }

    #[test]
    fn required_if_follows_predicate() {
        assert_eq!(
            required_if(|| true).check(""),
            Err(ValidationReason::Required)
        );
        assert!(required_if(|| false).check("").is_ok());
        assert!(required_if(|| true).check("x").is_ok());
    }

    #[test]
    fn validator_keeps_first_failure_per_field_and_all_fields() {
        let errs = Validator::new()
            .field("email", "", &[&required(), &email()])
            .field("password", "abc", &[&required(), &length(8, 16)])
            .field("name", "ok", &[&required()])
            .finish()
            .unwrap_err();

        assert_eq!(errs.len(), 2);
        assert_eq!(errs.get("email"), Some(&ValidationReason::Required));
        assert_eq!(
            errs.get("password"),
            Some(&ValidationReason::LengthOutOfRange { min: 8, max: 16 })
        );
        assert_eq!(errs.get("name"), None);
        assert_eq!(
            errs.to_string(),
            "email: cannot be blank; password: the length must be between 8 and 16"
        );
    }

    #[test]
    fn errors_serialize_as_tagged_list() {
        let errs = Validator::new()
            .field("password", "abc", &[&length(8, 16)])
            .finish()
            .unwrap_err();
        let json = serde_json::to_value(&errs).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                { "field": "password", "reason": { "kind": "length_out_of_range", "min": 8, "max": 16 } }
            ])
        );
    }
}
