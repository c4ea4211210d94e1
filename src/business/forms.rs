//! The three data-entry steps of business onboarding.
//!
//! Each form is mounted through a [`WizardScope`], seeds its field values from
//! the wizard's form data, and acts as the [`StepSubmitter`] for its step's
//! gate: validate, persist, then merge into form data. A failed save leaves
//! the form data as it was.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::model::{BusinessCategory, BusinessFormData, BusinessPatch, parse_int_prefix};
use super::validation::{FieldErrors, validate_basic_info, validate_location, validate_profile};
use crate::error::{SubmitError, WizardError};
use crate::store::BusinessStore;
use crate::wizard::{FormData, StepSubmitter, SubmittingFlag, Wizard, WizardScope};

pub const BASIC_INFO_STEP: &str = "basic-info";
pub const LOCATION_DETAILS_STEP: &str = "location-details";
pub const PROFILE_COMPLETION_STEP: &str = "profile-completion";
pub const SUCCESS_STEP: &str = "success";

const NO_OWNER: &str = "No user found to assign as business owner";

/// One input of a form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Form data key.
    pub key: &'static str,
    pub label: &'static str,
}

const fn field(key: &'static str, label: &'static str) -> FieldSpec {
    FieldSpec { key, label }
}

const BASIC_INFO_FIELDS: &[FieldSpec] = &[
    field("businessName", "Business name"),
    field("description", "Description"),
    field(
        "category",
        "Category (touch, sight, smell, taste, sound, connection)",
    ),
    field("phone", "Phone"),
    field("email", "Email"),
];

const LOCATION_FIELDS: &[FieldSpec] = &[
    field("address", "Street address"),
    field("city", "City"),
    field("state", "State"),
    field("postalCode", "Postal code"),
    field("country", "Country"),
    field("serviceRadius", "Service radius (miles)"),
    field("operatingHoursStart", "Opening time (HH:MM)"),
    field("operatingHoursEnd", "Closing time (HH:MM)"),
    field("capacity", "Capacity"),
];

const PROFILE_FIELDS: &[FieldSpec] = &[
    field("profileImage", "Profile image URL"),
    field("certifications", "Certifications"),
    field("promotionalText", "Promotional text"),
    field("yearsInBusiness", "Years in business"),
];

/// Raw text values of a form's inputs, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValues(Vec<(&'static str, String)>);

impl FormValues {
    fn seeded(fields: &[FieldSpec], mut seed: impl FnMut(&str) -> String) -> Self {
        Self(fields.iter().map(|f| (f.key, seed(f.key))).collect())
    }

    /// Current text of `key`; empty for unknown keys.
    pub fn get(&self, key: &str) -> &str {
        self.0
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
            .unwrap_or("")
    }

    /// Returns false if the form has no such field.
    pub fn set(&mut self, key: &str, value: impl Into<String>) -> bool {
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some((_, v)) => {
                *v = value.into();
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(k, v)| (*k, v.as_str()))
    }
}

/// Host-facing surface shared by every concrete form.
#[async_trait]
pub trait StepForm: Send + Sync {
    fn step_id(&self) -> &'static str;

    fn fields(&self) -> &'static [FieldSpec];

    async fn values(&self) -> FormValues;

    /// Set one input. Returns false for unknown keys.
    async fn set_field(&self, key: &str, value: &str) -> bool;

    /// Messages from the last rejected submit.
    async fn errors(&self) -> FieldErrors;
}

/// State common to the three forms.
struct FormCore {
    wizard: Wizard,
    store: Arc<dyn BusinessStore>,
    owner_id: Option<String>,
    values: RwLock<FormValues>,
    errors: RwLock<FieldErrors>,
    submitting: SubmittingFlag,
}

impl FormCore {
    async fn mount(
        scope: &WizardScope,
        component: &str,
        store: Arc<dyn BusinessStore>,
        owner_id: Option<String>,
        fields: &[FieldSpec],
        seed: impl Fn(&FormData, &str) -> String,
    ) -> Result<Self, WizardError> {
        let wizard = scope.wizard(component)?.clone();
        let data = wizard.form_data().await;
        let values = FormValues::seeded(fields, |key| seed(&data, key));
        Ok(Self {
            wizard,
            store,
            owner_id,
            values: RwLock::new(values),
            errors: RwLock::new(FieldErrors::new()),
            submitting: SubmittingFlag::new(),
        })
    }

    async fn set_field(&self, key: &str, value: &str) -> bool {
        self.values.write().await.set(key, value)
    }

    /// Record validation results; true when the values passed.
    async fn check(&self, step: &str, result: Result<(), FieldErrors>) -> bool {
        match result {
            Ok(()) => {
                *self.errors.write().await = FieldErrors::new();
                true
            }
            Err(errors) => {
                debug!(step, fields = errors.len(), "Validation failed");
                *self.errors.write().await = errors;
                false
            }
        }
    }

    /// Owner for a newly created record: `ownerId` in form data, the
    /// configured owner, or the first owner in the store.
    async fn resolve_owner(&self, data: &FormData) -> Result<String, SubmitError> {
        if let Some(owner) = data.get_str("ownerId").filter(|o| !o.is_empty()) {
            return Ok(owner.to_string());
        }
        if let Some(owner) = &self.owner_id {
            return Ok(owner.clone());
        }
        self.store
            .first_owner_id()
            .await?
            .ok_or_else(|| SubmitError::Failed(NO_OWNER.to_string()))
    }
}

/// Clears the submitting flag when dropped, including on panic.
struct InFlight<'a>(&'a SubmittingFlag);

impl<'a> InFlight<'a> {
    fn start(flag: &'a SubmittingFlag) -> Self {
        flag.set(true);
        Self(flag)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// Text form of a stored value: strings as-is, numbers printed, anything
/// else (absent, null, empty) falls back to `default`.
fn seed_text(data: &FormData, key: &str, default: &str) -> String {
    match data.get(key) {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => default.to_string(),
    }
}

/// Leading-integer conversion of an input; empty or non-numeric is null.
fn int_or_null(text: &str) -> Value {
    parse_int_prefix(text).map(Value::from).unwrap_or(Value::Null)
}

// ── Basic info ──────────────────────────────────────────────────────

/// Name, description, category and contact details.
///
/// Persists on every successful submit, so the record exists from the first
/// step onwards and later steps update it.
pub struct BasicInfoForm {
    core: FormCore,
}

impl BasicInfoForm {
    pub async fn mount(
        scope: &WizardScope,
        store: Arc<dyn BusinessStore>,
        owner_id: Option<String>,
    ) -> Result<Self, WizardError> {
        let core = FormCore::mount(
            scope,
            "BasicInfoForm",
            store,
            owner_id,
            BASIC_INFO_FIELDS,
            |data, key| match key {
                "businessName" => {
                    let name = seed_text(data, "businessName", "");
                    if name.is_empty() { seed_text(data, "name", "") } else { name }
                }
                "category" => data
                    .get_str("category")
                    .and_then(BusinessCategory::from_label)
                    .map(|c| c.label().to_string())
                    .unwrap_or_default(),
                _ => seed_text(data, key, ""),
            },
        )
        .await?;
        Ok(Self { core })
    }

    pub async fn set_values(&self, values: &[(&str, &str)]) {
        for (key, value) in values {
            self.core.set_field(key, value).await;
        }
    }

    pub fn submitting_flag(&self) -> SubmittingFlag {
        self.core.submitting.clone()
    }
}

#[async_trait]
impl StepForm for BasicInfoForm {
    fn step_id(&self) -> &'static str {
        BASIC_INFO_STEP
    }

    fn fields(&self) -> &'static [FieldSpec] {
        BASIC_INFO_FIELDS
    }

    async fn values(&self) -> FormValues {
        self.core.values.read().await.clone()
    }

    async fn set_field(&self, key: &str, value: &str) -> bool {
        self.core.set_field(key, value).await
    }

    async fn errors(&self) -> FieldErrors {
        self.core.errors.read().await.clone()
    }
}

#[async_trait]
impl StepSubmitter for BasicInfoForm {
    async fn submit(&self, form_data: &FormData) -> Result<bool, SubmitError> {
        let values = self.core.values.read().await.clone();
        let name = values.get("businessName").trim().to_string();
        let description = values.get("description");
        let category = values.get("category");
        let phone = values.get("phone");
        let email = values.get("email");

        let valid = validate_basic_info(&name, description, category, phone, email);
        if !self.core.check(BASIC_INFO_STEP, valid).await {
            return Ok(false);
        }

        let _in_flight = InFlight::start(&self.core.submitting);
        let category = BusinessCategory::from_label(category);
        let patch = BusinessPatch {
            name: Some(name.clone()),
            description: Some(description.to_string()),
            category,
            phone: Some(phone.to_string()),
            email: Some(email.to_string()),
            ..Default::default()
        };
        let owner_id = self.core.resolve_owner(form_data).await?;
        let business = self
            .core
            .store
            .upsert_business(form_data.id(), &owner_id, &patch)
            .await?;

        self.core
            .wizard
            .update_form_data(
                FormData::new()
                    .with("businessName", name.as_str())
                    .with("name", name.as_str())
                    .with("description", description)
                    .with("category", category.map(|c| c.as_storage()))
                    .with("phone", phone)
                    .with("email", email)
                    .with("id", business.id.as_str())
                    .with("ownerId", business.owner_id.as_str()),
            )
            .await;
        info!(business_id = %business.id, "Basic info saved");
        Ok(true)
    }
}

// ── Location details ────────────────────────────────────────────────

/// Address, service radius, opening hours and capacity.
pub struct LocationDetailsForm {
    core: FormCore,
}

impl LocationDetailsForm {
    pub async fn mount(
        scope: &WizardScope,
        store: Arc<dyn BusinessStore>,
        owner_id: Option<String>,
    ) -> Result<Self, WizardError> {
        let core = FormCore::mount(
            scope,
            "LocationDetailsForm",
            store,
            owner_id,
            LOCATION_FIELDS,
            |data, key| match key {
                "country" => seed_text(data, key, "United States"),
                "serviceRadius" => seed_text(data, key, "5"),
                "operatingHoursStart" => seed_text(data, key, "09:00"),
                "operatingHoursEnd" => seed_text(data, key, "17:00"),
                "capacity" => seed_text(data, key, "1"),
                _ => seed_text(data, key, ""),
            },
        )
        .await?;
        Ok(Self { core })
    }

    pub async fn set_values(&self, values: &[(&str, &str)]) {
        for (key, value) in values {
            self.core.set_field(key, value).await;
        }
    }

    pub fn submitting_flag(&self) -> SubmittingFlag {
        self.core.submitting.clone()
    }
}

#[async_trait]
impl StepForm for LocationDetailsForm {
    fn step_id(&self) -> &'static str {
        LOCATION_DETAILS_STEP
    }

    fn fields(&self) -> &'static [FieldSpec] {
        LOCATION_FIELDS
    }

    async fn values(&self) -> FormValues {
        self.core.values.read().await.clone()
    }

    async fn set_field(&self, key: &str, value: &str) -> bool {
        self.core.set_field(key, value).await
    }

    async fn errors(&self) -> FieldErrors {
        self.core.errors.read().await.clone()
    }
}

#[async_trait]
impl StepSubmitter for LocationDetailsForm {
    async fn submit(&self, form_data: &FormData) -> Result<bool, SubmitError> {
        let values = self.core.values.read().await.clone();
        let valid = validate_location(
            values.get("address"),
            values.get("city"),
            values.get("state"),
            values.get("postalCode"),
            values.get("country"),
            values.get("operatingHoursStart"),
            values.get("operatingHoursEnd"),
        );
        if !self.core.check(LOCATION_DETAILS_STEP, valid).await {
            return Ok(false);
        }

        let _in_flight = InFlight::start(&self.core.submitting);
        let partial = FormData::new()
            .with("address", values.get("address"))
            .with("city", values.get("city"))
            .with("state", values.get("state"))
            .with("postalCode", values.get("postalCode"))
            .with("country", values.get("country"))
            .with("serviceRadius", int_or_null(values.get("serviceRadius")))
            .with("operatingHoursStart", values.get("operatingHoursStart"))
            .with("operatingHoursEnd", values.get("operatingHoursEnd"))
            .with("capacity", int_or_null(values.get("capacity")));

        if let Some(id) = form_data.id() {
            let typed: BusinessFormData = partial.typed()?;
            let patch = BusinessPatch::from_form_data(&typed);
            self.core.store.update_business(id, &patch).await?;
            debug!(business_id = %id, "Location saved");
        }
        self.core.wizard.update_form_data(partial).await;
        Ok(true)
    }
}

// ── Profile completion ──────────────────────────────────────────────

/// Image, certifications, tagline and experience. Its submit is the final
/// save of everything the wizard collected.
pub struct ProfileCompletionForm {
    core: FormCore,
}

impl ProfileCompletionForm {
    pub async fn mount(
        scope: &WizardScope,
        store: Arc<dyn BusinessStore>,
        owner_id: Option<String>,
    ) -> Result<Self, WizardError> {
        let core = FormCore::mount(
            scope,
            "ProfileCompletionForm",
            store,
            owner_id,
            PROFILE_FIELDS,
            |data, key| seed_text(data, key, ""),
        )
        .await?;
        Ok(Self { core })
    }

    pub async fn set_values(&self, values: &[(&str, &str)]) {
        for (key, value) in values {
            self.core.set_field(key, value).await;
        }
    }

    /// Set while the final save is in flight; the profile gate shares it.
    pub fn submitting_flag(&self) -> SubmittingFlag {
        self.core.submitting.clone()
    }
}

#[async_trait]
impl StepForm for ProfileCompletionForm {
    fn step_id(&self) -> &'static str {
        PROFILE_COMPLETION_STEP
    }

    fn fields(&self) -> &'static [FieldSpec] {
        PROFILE_FIELDS
    }

    async fn values(&self) -> FormValues {
        self.core.values.read().await.clone()
    }

    async fn set_field(&self, key: &str, value: &str) -> bool {
        self.core.set_field(key, value).await
    }

    async fn errors(&self) -> FieldErrors {
        self.core.errors.read().await.clone()
    }
}

#[async_trait]
impl StepSubmitter for ProfileCompletionForm {
    async fn submit(&self, form_data: &FormData) -> Result<bool, SubmitError> {
        let values = self.core.values.read().await.clone();
        let valid = validate_profile(values.get("promotionalText"));
        if !self.core.check(PROFILE_COMPLETION_STEP, valid).await {
            return Ok(false);
        }

        let _in_flight = InFlight::start(&self.core.submitting);
        let partial = FormData::new()
            .with("profileImage", values.get("profileImage"))
            .with("certifications", values.get("certifications"))
            .with("promotionalText", values.get("promotionalText"))
            .with("yearsInBusiness", int_or_null(values.get("yearsInBusiness")));

        let mut all = form_data.clone();
        all.merge(partial.clone());
        let typed: BusinessFormData = all.typed()?;
        let patch = BusinessPatch::from_form_data(&typed);
        let owner_id = self.core.resolve_owner(form_data).await?;
        let business = self
            .core
            .store
            .upsert_business(all.id(), &owner_id, &patch)
            .await?;

        self.core
            .wizard
            .update_form_data(partial.with("id", business.id.as_str()))
            .await;
        info!(business_id = %business.id, "Business profile completed");
        Ok(true)
    }
}
