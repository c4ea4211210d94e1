//! Business record, category enum and the typed view of wizard form data.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Wellness category a business is listed under.
///
/// Stored upper-case (`"TOUCH"`); forms use the lower-case label (`"touch"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BusinessCategory {
    Touch,
    Sight,
    Smell,
    Taste,
    Sound,
    Connection,
}

impl BusinessCategory {
    pub const ALL: [BusinessCategory; 6] = [
        Self::Touch,
        Self::Sight,
        Self::Smell,
        Self::Taste,
        Self::Sound,
        Self::Connection,
    ];

    /// Map a human-facing label to a category, ignoring case.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(label.trim()))
    }

    /// Form label, e.g. `"touch"`.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Touch => "touch",
            Self::Sight => "sight",
            Self::Smell => "smell",
            Self::Taste => "taste",
            Self::Sound => "sound",
            Self::Connection => "connection",
        }
    }

    /// Storage form, e.g. `"TOUCH"`.
    pub fn as_storage(&self) -> &'static str {
        match self {
            Self::Touch => "TOUCH",
            Self::Sight => "SIGHT",
            Self::Smell => "SMELL",
            Self::Taste => "TASTE",
            Self::Sound => "SOUND",
            Self::Connection => "CONNECTION",
        }
    }

    /// Capitalised name for display, e.g. `"Touch"`.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Touch => "Touch",
            Self::Sight => "Sight",
            Self::Smell => "Smell",
            Self::Taste => "Taste",
            Self::Sound => "Sound",
            Self::Connection => "Connection",
        }
    }
}

impl fmt::Display for BusinessCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_storage())
    }
}

impl FromStr for BusinessCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s).ok_or_else(|| format!("Unknown business category: {s}"))
    }
}

/// Parse the leading integer of a numeric string, the way form inputs are
/// converted: `"10 miles"` → 10, `"  7"` → 7, `"abc"` → `None`.
pub fn parse_int_prefix(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(digits.len());
    let value: i64 = digits[..end].parse().ok()?;
    Some(if negative { -value } else { value })
}

/// A persisted business profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Business {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<BusinessCategory>,
    pub phone: Option<String>,
    pub email: Option<String>,

    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub service_radius: Option<i64>,
    pub operating_hours_start: Option<String>,
    pub operating_hours_end: Option<String>,
    pub capacity: Option<i64>,

    pub profile_image: Option<String>,
    pub certifications: Option<String>,
    pub promotional_text: Option<String>,
    pub years_in_business: Option<i64>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Listing projection returned by the business search endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessSummary {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<BusinessCategory>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub profile_image: Option<String>,
}

impl From<&Business> for BusinessSummary {
    fn from(b: &Business) -> Self {
        Self {
            id: b.id.clone(),
            name: b.name.clone(),
            description: b.description.clone(),
            category: b.category,
            city: b.city.clone(),
            state: b.state.clone(),
            profile_image: b.profile_image.clone(),
        }
    }
}

/// Typed view of everything the onboarding wizard collects.
///
/// Keys match the wizard's form data (`businessName`, `postalCode`, ...).
/// Numbers arrive either as JSON numbers (already converted by a form) or as
/// numeric strings (raw API payloads).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BusinessFormData {
    pub id: Option<String>,
    pub owner_id: Option<String>,
    pub business_name: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,

    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub service_radius: Option<NumberOrText>,
    pub operating_hours_start: Option<String>,
    pub operating_hours_end: Option<String>,
    pub capacity: Option<NumberOrText>,

    pub profile_image: Option<String>,
    pub certifications: Option<String>,
    pub promotional_text: Option<String>,
    pub years_in_business: Option<NumberOrText>,
}

/// A numeric field that may still be in its textual form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumberOrText {
    Number(i64),
    Float(f64),
    Text(String),
}

impl NumberOrText {
    /// Integer value; fractions are truncated and text is parsed by its
    /// leading digits.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Float(f) if f.is_finite() => Some(f.trunc() as i64),
            Self::Float(_) => None,
            Self::Text(s) => parse_int_prefix(s),
        }
    }
}

impl BusinessFormData {
    /// Display name: `businessName`, falling back to `name`.
    pub fn resolved_name(&self) -> Option<&str> {
        self.business_name
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.name.as_deref().filter(|s| !s.is_empty()))
    }

    /// Category from either its storage form or its label.
    pub fn resolved_category(&self) -> Option<BusinessCategory> {
        self.category.as_deref().and_then(BusinessCategory::from_label)
    }
}

/// A partial set of business fields for create/update.
///
/// `None` means "leave unchanged" on update and "store NULL" on create.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BusinessPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<BusinessCategory>,
    pub phone: Option<String>,
    pub email: Option<String>,

    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub service_radius: Option<i64>,
    pub operating_hours_start: Option<String>,
    pub operating_hours_end: Option<String>,
    pub capacity: Option<i64>,

    pub profile_image: Option<String>,
    pub certifications: Option<String>,
    pub promotional_text: Option<String>,
    pub years_in_business: Option<i64>,
}

impl BusinessPatch {
    pub fn from_form_data(data: &BusinessFormData) -> Self {
        Self {
            name: data.resolved_name().map(str::to_string),
            description: data.description.clone(),
            category: data.resolved_category(),
            phone: data.phone.clone(),
            email: data.email.clone(),
            address: data.address.clone(),
            city: data.city.clone(),
            state: data.state.clone(),
            postal_code: data.postal_code.clone(),
            country: data.country.clone(),
            service_radius: data.service_radius.as_ref().and_then(NumberOrText::as_i64),
            operating_hours_start: data.operating_hours_start.clone(),
            operating_hours_end: data.operating_hours_end.clone(),
            capacity: data.capacity.as_ref().and_then(NumberOrText::as_i64),
            profile_image: data.profile_image.clone(),
            certifications: data.certifications.clone(),
            promotional_text: data.promotional_text.clone(),
            years_in_business: data.years_in_business.as_ref().and_then(NumberOrText::as_i64),
        }
    }

    /// Only the basic-info fields of `data`.
    pub fn basic_info(data: &BusinessFormData) -> Self {
        Self {
            name: data.resolved_name().map(str::to_string),
            description: data.description.clone(),
            category: data.resolved_category(),
            phone: data.phone.clone(),
            email: data.email.clone(),
            ..Default::default()
        }
    }
}
