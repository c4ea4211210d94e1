//! Field-level validation rules for the onboarding forms.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use super::model::BusinessCategory;

static PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9\s\-\(\)]{7,20}$").expect("phone pattern compiles"));

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles")
});

static TIME_OF_DAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([01][0-9]|2[0-3]):[0-5][0-9]$").expect("time pattern compiles"));

/// Validation messages keyed by field name, in the order they were found.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldErrors(Vec<(String, String)>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: &str) {
        self.0.push((field.to_string(), message.to_string()));
    }

    /// First message recorded for `field`.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(f, _)| f == field)
            .map(|(_, m)| m.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(f, m)| (f.as_str(), m.as_str()))
    }

    /// `Ok(())` when nothing was recorded.
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }

    /// Require at least `min` characters.
    pub fn min_len(&mut self, field: &str, value: &str, min: usize, message: &str) {
        if value.chars().count() < min {
            self.add(field, message);
        }
    }

    /// Allow at most `max` characters.
    pub fn max_len(&mut self, field: &str, value: &str, max: usize, message: &str) {
        if value.chars().count() > max {
            self.add(field, message);
        }
    }
}

pub fn is_valid_phone(value: &str) -> bool {
    PHONE.is_match(value)
}

pub fn is_valid_email(value: &str) -> bool {
    EMAIL.is_match(value)
}

/// `HH:MM`, 24-hour clock.
pub fn is_valid_time(value: &str) -> bool {
    TIME_OF_DAY.is_match(value)
}

/// Basic info step: name, description, category, phone, email.
pub fn validate_basic_info(
    business_name: &str,
    description: &str,
    category: &str,
    phone: &str,
    email: &str,
) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    errors.min_len(
        "businessName",
        business_name,
        2,
        "Business name must be at least 2 characters.",
    );
    errors.min_len(
        "description",
        description,
        10,
        "Description must be at least 10 characters.",
    );
    errors.max_len(
        "description",
        description,
        500,
        "Description must not exceed 500 characters.",
    );
    if BusinessCategory::from_label(category).is_none() {
        errors.add("category", "Please select a business category.");
    }
    if !is_valid_phone(phone) {
        errors.add("phone", "Please enter a valid phone number.");
    }
    if !is_valid_email(email) {
        errors.add("email", "Please enter a valid email address.");
    }
    errors.into_result()
}

/// Location step. Times are only checked when filled in.
pub fn validate_location(
    address: &str,
    city: &str,
    state: &str,
    postal_code: &str,
    country: &str,
    opening: &str,
    closing: &str,
) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    errors.min_len("address", address, 5, "Address must be at least 5 characters.");
    errors.min_len("city", city, 2, "City name must be at least 2 characters.");
    errors.min_len("state", state, 2, "State must be at least 2 characters.");
    errors.min_len(
        "postalCode",
        postal_code,
        5,
        "Postal code must be at least 5 characters.",
    );
    errors.min_len("country", country, 2, "Country must be at least 2 characters.");
    if !opening.is_empty() && !is_valid_time(opening) {
        errors.add("operatingHoursStart", "Please enter a time as HH:MM.");
    }
    if !closing.is_empty() && !is_valid_time(closing) {
        errors.add("operatingHoursEnd", "Please enter a time as HH:MM.");
    }
    errors.into_result()
}

/// Profile step: only the tagline is constrained.
pub fn validate_profile(promotional_text: &str) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    errors.max_len(
        "promotionalText",
        promotional_text,
        200,
        "Promotional text must not exceed 200 characters.",
    );
    errors.into_result()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_pattern() {
        for ok in ["+1 (555) 123-4567", "5551234", "020 7946 0958"] {
            assert!(is_valid_phone(ok), "{ok} should be valid");
        }
        for bad in ["12345", "call me maybe", "+1 555 123 4567 890 1234 5"] {
            assert!(!is_valid_phone(bad), "{bad} should be invalid");
        }
    }

    #[test]
    fn email_pattern() {
        assert!(is_valid_email("hello@calmrooms.example"));
        assert!(!is_valid_email("hello@"));
        assert!(!is_valid_email("no spaces@x.io"));
        assert!(!is_valid_email("plain"));
    }

    #[test]
    fn time_pattern() {
        assert!(is_valid_time("09:00"));
        assert!(is_valid_time("23:59"));
        assert!(!is_valid_time("24:00"));
        assert!(!is_valid_time("9:00"));
    }

    #[test]
    fn basic_info_collects_every_failure() {
        let errors = validate_basic_info("A", "short", "hearing", "123", "nope").unwrap_err();
        assert_eq!(errors.len(), 5);
        assert_eq!(
            errors.get("businessName"),
            Some("Business name must be at least 2 characters.")
        );
        assert_eq!(errors.get("category"), Some("Please select a business category."));
    }

    #[test]
    fn basic_info_accepts_valid_values() {
        assert!(
            validate_basic_info(
                "Calm Rooms",
                "Float tanks and quiet rooms downtown.",
                "touch",
                "+1 (555) 123-4567",
                "hi@calmrooms.example",
            )
            .is_ok()
        );
    }

    #[test]
    fn description_length_is_counted_in_characters() {
        let long = "é".repeat(501);
        let errors = validate_basic_info("Spa", &long, "touch", "5551234", "a@b.co").unwrap_err();
        assert_eq!(
            errors.get("description"),
            Some("Description must not exceed 500 characters.")
        );
        let exact = "é".repeat(500);
        assert!(validate_basic_info("Spa", &exact, "touch", "5551234", "a@b.co").is_ok());
    }

    #[test]
    fn location_rules() {
        assert!(
            validate_location("12 Main St", "Austin", "TX", "78701", "United States", "09:00", "")
                .is_ok()
        );
        let errors = validate_location("", "A", "T", "787", "U", "9am", "17:00").unwrap_err();
        assert_eq!(errors.len(), 6);
        assert!(errors.get("operatingHoursEnd").is_none());
    }

    #[test]
    fn profile_rules() {
        assert!(validate_profile("").is_ok());
        assert!(validate_profile(&"x".repeat(201)).is_err());
    }
}
