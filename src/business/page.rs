//! The onboarding page: one wizard, its indicator, a gate per step and the
//! three forms, wired together.

use std::sync::Arc;

use tracing::info;

use super::forms::{
    BASIC_INFO_STEP, BasicInfoForm, LOCATION_DETAILS_STEP, LocationDetailsForm,
    PROFILE_COMPLETION_STEP, ProfileCompletionForm, SUCCESS_STEP, StepForm,
};
use super::summary::OnboardingSummary;
use crate::error::WizardError;
use crate::store::BusinessStore;
use crate::wizard::{
    FormData, GateOptions, GateOutcome, StepDescriptor, StepGate, StepIndicator, StepRegistry,
    Wizard, WizardScope,
};

pub const PAGE_TITLE: &str = "Set Up Your Business";
pub const PAGE_SUBTITLE: &str =
    "Complete the steps below to create your wellness business profile.";

/// The four onboarding steps, in order.
pub fn onboarding_steps() -> Vec<StepDescriptor> {
    vec![
        StepDescriptor::new(BASIC_INFO_STEP, "Basic Info", "Tell us about your business"),
        StepDescriptor::new(LOCATION_DETAILS_STEP, "Location", "Where are you located"),
        StepDescriptor::new(PROFILE_COMPLETION_STEP, "Profile", "Complete your profile"),
        StepDescriptor::new(SUCCESS_STEP, "Complete", "All done!"),
    ]
}

pub struct OnboardingPage {
    wizard: Wizard,
    indicator: StepIndicator,
    gates: Vec<StepGate>,
    basic_info: Arc<BasicInfoForm>,
    location: Arc<LocationDetailsForm>,
    profile: Arc<ProfileCompletionForm>,
}

impl OnboardingPage {
    /// Build the page. `initial_data` resumes a previous session's values.
    pub async fn mount(
        store: Arc<dyn BusinessStore>,
        owner_id: Option<String>,
        initial_data: FormData,
    ) -> Result<Self, WizardError> {
        let wizard = Wizard::with_initial_data(StepRegistry::new(onboarding_steps())?, initial_data);
        let scope = WizardScope::new(wizard.clone());

        let indicator = StepIndicator::mount(&scope)?;
        let basic_info =
            Arc::new(BasicInfoForm::mount(&scope, store.clone(), owner_id.clone()).await?);
        let location =
            Arc::new(LocationDetailsForm::mount(&scope, store.clone(), owner_id.clone()).await?);
        let profile = Arc::new(ProfileCompletionForm::mount(&scope, store, owner_id).await?);

        let gates = vec![
            StepGate::mount(
                &scope,
                BASIC_INFO_STEP,
                GateOptions::titled(
                    "Business Information",
                    "Tell us about your wellness business",
                ),
            )?
            .with_submitter(basic_info.clone())
            .with_submitting_flag(basic_info.submitting_flag()),
            StepGate::mount(
                &scope,
                LOCATION_DETAILS_STEP,
                GateOptions::titled(
                    "Location & Service Details",
                    "Where you operate and how clients can find you",
                ),
            )?
            .with_submitter(location.clone())
            .with_submitting_flag(location.submitting_flag()),
            StepGate::mount(
                &scope,
                PROFILE_COMPLETION_STEP,
                GateOptions::titled(
                    "Complete Your Profile",
                    "Add finishing touches to make your profile stand out",
                )
                .with_next_label("Complete Setup"),
            )?
            .with_submitter(profile.clone())
            .with_submitting_flag(profile.submitting_flag()),
            StepGate::mount(
                &scope,
                SUCCESS_STEP,
                GateOptions::titled("Setup Complete", "Your business profile is ready")
                    .without_back(),
            )?,
        ];

        Ok(Self {
            wizard,
            indicator,
            gates,
            basic_info,
            location,
            profile,
        })
    }

    pub fn wizard(&self) -> &Wizard {
        &self.wizard
    }

    pub fn indicator(&self) -> &StepIndicator {
        &self.indicator
    }

    pub fn gate(&self, step_id: &str) -> Option<&StepGate> {
        self.gates.iter().find(|g| g.step_id() == step_id)
    }

    /// Gate of the current step.
    pub async fn active_gate(&self) -> Option<&StepGate> {
        let current = self.wizard.current_step().await;
        self.gate(&current.id)
    }

    /// Form content of a step; the success step has none.
    pub fn form(&self, step_id: &str) -> Option<Arc<dyn StepForm>> {
        match step_id {
            BASIC_INFO_STEP => Some(self.basic_info.clone() as Arc<dyn StepForm>),
            LOCATION_DETAILS_STEP => Some(self.location.clone() as Arc<dyn StepForm>),
            PROFILE_COMPLETION_STEP => Some(self.profile.clone() as Arc<dyn StepForm>),
            _ => None,
        }
    }

    pub fn basic_info(&self) -> &BasicInfoForm {
        &self.basic_info
    }

    pub fn location(&self) -> &LocationDetailsForm {
        &self.location
    }

    pub fn profile(&self) -> &ProfileCompletionForm {
        &self.profile
    }

    /// Submit whatever step is active.
    pub async fn submit_current(&self) -> GateOutcome {
        let Some(gate) = self.active_gate().await else {
            return GateOutcome::Inactive;
        };
        let outcome = gate.submit().await;
        if outcome == GateOutcome::Advanced && gate.step_id() == PROFILE_COMPLETION_STEP {
            let data = self.wizard.form_data().await;
            info!(business_id = data.id().unwrap_or_default(), "Onboarding complete");
        }
        outcome
    }

    /// Back control of the active step.
    pub async fn back(&self) -> bool {
        match self.active_gate().await {
            Some(gate) => gate.go_back().await,
            None => false,
        }
    }

    /// Completion summary, once the success step is reached.
    pub async fn summary(&self) -> Option<OnboardingSummary> {
        if self.wizard.current_step().await.id != SUCCESS_STEP {
            return None;
        }
        Some(OnboardingSummary::from_form_data(&self.wizard.form_data().await))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::LibSqlStore;

    async fn page() -> OnboardingPage {
        let store = Arc::new(LibSqlStore::new_memory().await.unwrap());
        store.create_owner("Ada", None).await.unwrap();
        OnboardingPage::mount(store, None, FormData::new()).await.unwrap()
    }

    #[test]
    fn steps_are_in_onboarding_order() {
        let ids: Vec<_> = onboarding_steps().into_iter().map(|s| s.id).collect();
        assert_eq!(
            ids,
            [BASIC_INFO_STEP, LOCATION_DETAILS_STEP, PROFILE_COMPLETION_STEP, SUCCESS_STEP]
        );
    }

    #[tokio::test]
    async fn only_the_first_gate_is_visible_at_start() {
        let page = page().await;
        let view = page.active_gate().await.unwrap().view().await.unwrap();
        assert_eq!(view.title, "Business Information");
        assert!(view.back.is_none());
        assert_eq!(view.submit.label, "Continue");
        assert!(page.gate(SUCCESS_STEP).unwrap().view().await.is_none());
        assert!(page.summary().await.is_none());
    }

    #[tokio::test]
    async fn profile_gate_uses_complete_setup_label() {
        let page = page().await;
        page.wizard().go_to_step(2).await;
        let view = page.gate(PROFILE_COMPLETION_STEP).unwrap().view().await.unwrap();
        assert_eq!(view.submit.label, "Complete Setup");
        assert!(view.back.is_some());
    }

    #[tokio::test]
    async fn success_gate_hides_back() {
        let page = page().await;
        page.wizard().go_to_step(3).await;
        let view = page.active_gate().await.unwrap().view().await.unwrap();
        assert!(view.back.is_none());
        assert_eq!(view.submit.label, "Complete");
        assert!(!page.back().await);
        assert_eq!(page.summary().await.unwrap().business_name, "Your Business");
    }

    #[tokio::test]
    async fn forms_exist_for_data_steps_only() {
        let page = page().await;
        assert_eq!(page.form(BASIC_INFO_STEP).unwrap().fields().len(), 5);
        assert_eq!(page.form(LOCATION_DETAILS_STEP).unwrap().fields().len(), 9);
        assert_eq!(page.form(PROFILE_COMPLETION_STEP).unwrap().fields().len(), 4);
        assert!(page.form(SUCCESS_STEP).is_none());
    }
}
