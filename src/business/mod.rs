//! Business onboarding: the record, its validation rules, the step forms and
//! the page that composes them into a wizard.

pub mod forms;
pub mod model;
pub mod page;
pub mod summary;
pub mod validation;

pub use forms::{
    BasicInfoForm, FieldSpec, FormValues, LocationDetailsForm, ProfileCompletionForm, StepForm,
};
pub use model::{Business, BusinessCategory, BusinessFormData, BusinessPatch, BusinessSummary};
pub use page::{OnboardingPage, onboarding_steps};
pub use summary::OnboardingSummary;
pub use validation::FieldErrors;
