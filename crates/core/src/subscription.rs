//! Newsletter subscription form validation.
//!
//! Each field can be checked on its own (the storefront does this as the
//! visitor leaves a field) and [`validate`] checks everything at once on
//! submit. Validation never touches cart state.
//!
//! Error messages are user-facing copy and therefore in Spanish.

use core::fmt;
use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::types::{Category, Email, EmailError};

/// A subscription form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    FirstName,
    LastName,
    Email,
    AcceptTerms,
    Interests,
}

impl Field {
    /// Fields in form order.
    pub const ALL: [Self; 5] = [
        Self::FirstName,
        Self::LastName,
        Self::Email,
        Self::AcceptTerms,
        Self::Interests,
    ];

    /// The HTML form field name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::FirstName => "first_name",
            Self::LastName => "last_name",
            Self::Email => "email",
            Self::AcceptTerms => "accept_terms",
            Self::Interests => "interests",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a field name is not recognised.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown subscription field: {0}")]
pub struct UnknownField(pub String);

impl FromStr for Field {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.name() == s)
            .ok_or_else(|| UnknownField(s.to_string()))
    }
}

/// A failed field rule.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Por favor, ingresa tu nombre.")]
    FirstNameRequired,
    #[error("Por favor, ingresa tu apellido.")]
    LastNameRequired,
    #[error("Por favor, ingresa un correo electrónico válido.")]
    InvalidEmail(#[source] EmailError),
    #[error("Debes aceptar los términos y condiciones.")]
    TermsNotAccepted,
    #[error("Interés desconocido: {0}")]
    UnknownInterest(String),
}

impl ValidationError {
    /// The field this error belongs to.
    #[must_use]
    pub const fn field(&self) -> Field {
        match self {
            Self::FirstNameRequired => Field::FirstName,
            Self::LastNameRequired => Field::LastName,
            Self::InvalidEmail(_) => Field::Email,
            Self::TermsNotAccepted => Field::AcceptTerms,
            Self::UnknownInterest(_) => Field::Interests,
        }
    }
}

/// Every failed rule from a full submission, at most one per field.
#[derive(Error, Debug, Clone, PartialEq, Eq, Default)]
#[error("{} subscription field(s) failed validation", .0.len())]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    /// The error for `field`, if it failed.
    #[must_use]
    pub fn get(&self, field: Field) -> Option<&ValidationError> {
        self.0.iter().find(|e| e.field() == field)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.0.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Raw form input, as submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub accept_terms: bool,
    pub interests: Vec<String>,
}

impl SubscriptionInput {
    /// Build input from urlencoded form pairs.
    ///
    /// `interests` may repeat. A checkbox posts `on` when checked; `true`,
    /// `1` and `yes` are accepted too. Unrecognised keys are ignored.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut input = Self::default();
        for (key, value) in pairs {
            let Ok(field) = key.as_ref().parse::<Field>() else {
                continue;
            };
            let value = value.into();
            match field {
                Field::FirstName => input.first_name = value,
                Field::LastName => input.last_name = value,
                Field::Email => input.email = value,
                Field::AcceptTerms => {
                    input.accept_terms = matches!(
                        value.trim().to_ascii_lowercase().as_str(),
                        "on" | "true" | "1" | "yes"
                    );
                }
                Field::Interests => {
                    if !value.trim().is_empty() {
                        input.interests.push(value);
                    }
                }
            }
        }
        input
    }
}

/// An accepted subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Subscription {
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub interests: Vec<Category>,
    pub subscribed_at: DateTime<Utc>,
}

/// Check one field of the form.
///
/// # Errors
///
/// Returns the rule that `field` breaks.
pub fn validate_field(input: &SubscriptionInput, field: Field) -> Result<(), ValidationError> {
    match field {
        Field::FirstName => required(&input.first_name, ValidationError::FirstNameRequired),
        Field::LastName => required(&input.last_name, ValidationError::LastNameRequired),
        Field::Email => Email::parse(&input.email)
            .map(|_| ())
            .map_err(ValidationError::InvalidEmail),
        Field::AcceptTerms => {
            if input.accept_terms {
                Ok(())
            } else {
                Err(ValidationError::TermsNotAccepted)
            }
        }
        Field::Interests => parse_interests(&input.interests).map(|_| ()),
    }
}

/// Check every field and build the subscription.
///
/// # Errors
///
/// Returns every broken rule if any field fails.
pub fn validate(input: &SubscriptionInput) -> Result<Subscription, ValidationErrors> {
    let errors: Vec<ValidationError> = Field::ALL
        .into_iter()
        .filter_map(|field| validate_field(input, field).err())
        .collect();
    if !errors.is_empty() {
        return Err(ValidationErrors(errors));
    }

    let email = Email::parse(&input.email)
        .map_err(|e| ValidationErrors(vec![ValidationError::InvalidEmail(e)]))?;
    let interests = parse_interests(&input.interests).map_err(|e| ValidationErrors(vec![e]))?;

    Ok(Subscription {
        first_name: input.first_name.trim().to_string(),
        last_name: input.last_name.trim().to_string(),
        email,
        interests,
        subscribed_at: Utc::now(),
    })
}

fn required(value: &str, error: ValidationError) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(error)
    } else {
        Ok(())
    }
}

fn parse_interests(raw: &[String]) -> Result<Vec<Category>, ValidationError> {
    let mut interests = Vec::with_capacity(raw.len());
    for slug in raw {
        let category = slug
            .parse::<Category>()
            .map_err(|_| ValidationError::UnknownInterest(slug.trim().to_string()))?;
        if !interests.contains(&category) {
            interests.push(category);
        }
    }
    Ok(interests)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn valid_input() -> SubscriptionInput {
        SubscriptionInput {
            first_name: "  Ana ".to_string(),
            last_name: "Gómez".to_string(),
            email: "ana@example.com ".to_string(),
            accept_terms: true,
            interests: vec!["running".to_string(), "futbol".to_string()],
        }
    }

    #[test]
    fn test_names_required() {
        let mut input = valid_input();
        input.first_name = "   ".to_string();
        input.last_name = String::new();

        assert_eq!(
            validate_field(&input, Field::FirstName),
            Err(ValidationError::FirstNameRequired)
        );
        assert_eq!(
            validate_field(&input, Field::LastName),
            Err(ValidationError::LastNameRequired)
        );
        assert!(validate_field(&input, Field::Email).is_ok());
    }

    #[test]
    fn test_email_rule() {
        let mut input = valid_input();
        for bad in ["", "ana", "ana@example", "ana @example.com"] {
            input.email = bad.to_string();
            assert!(
                matches!(
                    validate_field(&input, Field::Email),
                    Err(ValidationError::InvalidEmail(_))
                ),
                "{bad}"
            );
        }
        input.email = " ana.gomez+news@mail.example.co ".to_string();
        assert!(validate_field(&input, Field::Email).is_ok());
    }

    #[test]
    fn test_terms_rule() {
        let mut input = valid_input();
        input.accept_terms = false;
        assert_eq!(
            validate_field(&input, Field::AcceptTerms),
            Err(ValidationError::TermsNotAccepted)
        );
    }

    #[test]
    fn test_interests_rule() {
        let mut input = valid_input();
        input.interests = vec!["tenis".to_string()];
        assert_eq!(
            validate_field(&input, Field::Interests),
            Err(ValidationError::UnknownInterest("tenis".to_string()))
        );
        input.interests.clear();
        assert!(validate_field(&input, Field::Interests).is_ok());
    }

    #[test]
    fn test_validate_success() {
        let subscription = validate(&valid_input()).unwrap();
        assert_eq!(subscription.first_name, "Ana");
        assert_eq!(subscription.email.as_str(), "ana@example.com");
        assert_eq!(
            subscription.interests,
            vec![Category::Running, Category::Futbol]
        );
    }

    #[test]
    fn test_validate_collects_every_failure() {
        let input = SubscriptionInput {
            first_name: String::new(),
            last_name: "Gómez".to_string(),
            email: "nope".to_string(),
            accept_terms: false,
            interests: Vec::new(),
        };

        let errors = validate(&input).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert_eq!(
            errors.get(Field::FirstName),
            Some(&ValidationError::FirstNameRequired)
        );
        assert!(errors.get(Field::LastName).is_none());
        assert!(errors.get(Field::Email).is_some());
        assert_eq!(
            errors.get(Field::AcceptTerms),
            Some(&ValidationError::TermsNotAccepted)
        );
    }

    #[test]
    fn test_from_pairs() {
        let input = SubscriptionInput::from_pairs(vec![
            ("first_name", "Ana"),
            ("last_name", "Gómez"),
            ("email", "ana@example.com"),
            ("interests", "running"),
            ("interests", "baloncesto"),
            ("accept_terms", "on"),
            ("csrf", "ignored"),
        ]);
        assert_eq!(input.first_name, "Ana");
        assert!(input.accept_terms);
        assert_eq!(input.interests, vec!["running", "baloncesto"]);

        let unchecked = SubscriptionInput::from_pairs(vec![("first_name", "Ana")]);
        assert!(!unchecked.accept_terms);
    }

    #[test]
    fn test_field_names_roundtrip() {
        for field in Field::ALL {
            assert_eq!(field.name().parse::<Field>().unwrap(), field);
        }
        assert!("password".parse::<Field>().is_err());
    }

    #[test]
    fn test_messages_are_user_copy() {
        assert_eq!(
            ValidationError::TermsNotAccepted.to_string(),
            "Debes aceptar los términos y condiciones."
        );
    }
}
