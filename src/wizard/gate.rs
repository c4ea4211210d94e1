//! Step gate: wraps one step's content and runs its submission handshake.
//!
//! A gate is visible only while its step is the wizard's current step. On
//! submit it awaits the step's [`StepSubmitter`]; success marks the step
//! complete and advances, a rejection leaves everything as is, and a failure
//! (error or panic) is logged and contained here.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use futures::FutureExt;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::form_data::FormData;
use super::handle::{Wizard, WizardScope};
use crate::error::{SubmitError, WizardError};

/// Validates and persists one step's data.
#[async_trait]
pub trait StepSubmitter: Send + Sync {
    /// `Ok(true)`: accepted, the wizard may advance.
    /// `Ok(false)`: rejected but handled (the form shows its own messages).
    /// `Err(_)`: the submission itself failed.
    async fn submit(&self, form_data: &FormData) -> Result<bool, SubmitError>;
}

/// Caller-owned "submission in flight" flag.
///
/// The gate reads it to disable its controls; it never sets it.
#[derive(Debug, Clone, Default)]
pub struct SubmittingFlag(Arc<AtomicBool>);

impl SubmittingFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, submitting: bool) {
        self.0.store(submitting, Ordering::SeqCst);
    }

    pub fn get(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Display options for a gate.
#[derive(Debug, Clone)]
pub struct GateOptions {
    /// Overrides the registry title when set.
    pub title: Option<String>,
    /// Overrides the registry description when set.
    pub description: Option<String>,
    pub next_label: String,
    pub back_label: String,
    pub show_back: bool,
}

impl Default for GateOptions {
    fn default() -> Self {
        Self {
            title: None,
            description: None,
            next_label: "Continue".to_string(),
            back_label: "Back".to_string(),
            show_back: true,
        }
    }
}

impl GateOptions {
    pub fn titled(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            description: Some(description.into()),
            ..Default::default()
        }
    }

    pub fn with_next_label(mut self, label: impl Into<String>) -> Self {
        self.next_label = label.into();
        self
    }

    pub fn without_back(mut self) -> Self {
        self.show_back = false;
        self
    }
}

/// Label on the submit button of the last step.
pub const COMPLETE_LABEL: &str = "Complete";

/// What a submit attempt did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    /// The gate's step is not the current step; nothing ran.
    Inactive,
    /// Accepted: step marked complete and the wizard advanced (unless last).
    Advanced,
    /// The submitter declined; the step stays active.
    Rejected,
    /// The submitter errored or panicked; the step stays active.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ButtonView {
    pub label: String,
    pub enabled: bool,
    /// Shows an in-flight spinner.
    pub busy: bool,
}

/// Renderable state of a visible gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GateView {
    pub step_id: String,
    pub title: String,
    pub description: String,
    pub back: Option<ButtonView>,
    pub submit: ButtonView,
}

/// Per-step submission wrapper.
pub struct StepGate {
    wizard: Wizard,
    step_id: String,
    options: GateOptions,
    submitter: Option<Arc<dyn StepSubmitter>>,
    submitting: SubmittingFlag,
}

impl StepGate {
    /// Mount a gate for `step_id` inside the scope's wizard.
    pub fn mount(
        scope: &WizardScope,
        step_id: impl Into<String>,
        options: GateOptions,
    ) -> Result<Self, WizardError> {
        let wizard = scope.wizard("StepGate")?.clone();
        Ok(Self {
            wizard,
            step_id: step_id.into(),
            options,
            submitter: None,
            submitting: SubmittingFlag::new(),
        })
    }

    /// Without a submitter, every submit is an automatic success.
    pub fn with_submitter(mut self, submitter: Arc<dyn StepSubmitter>) -> Self {
        self.submitter = Some(submitter);
        self
    }

    /// Share a caller-owned submitting flag.
    pub fn with_submitting_flag(mut self, flag: SubmittingFlag) -> Self {
        self.submitting = flag;
        self
    }

    pub fn step_id(&self) -> &str {
        &self.step_id
    }

    pub fn submitting_flag(&self) -> SubmittingFlag {
        self.submitting.clone()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.get()
    }

    /// True iff this gate's step is the wizard's current step.
    pub async fn is_visible(&self) -> bool {
        self.wizard.read().await.current_step().id == self.step_id
    }

    /// Run the submission handshake.
    pub async fn submit(&self) -> GateOutcome {
        if !self.is_visible().await {
            debug!(step = %self.step_id, "Submit ignored for inactive step");
            return GateOutcome::Inactive;
        }

        let accepted = match &self.submitter {
            None => true,
            Some(submitter) => {
                let form_data = self.wizard.form_data().await;
                let attempt = AssertUnwindSafe(submitter.submit(&form_data)).catch_unwind();
                match attempt.await {
                    Ok(Ok(accepted)) => accepted,
                    Ok(Err(e)) => {
                        warn!(step = %self.step_id, error = %e, "Step submission failed");
                        return GateOutcome::Failed(e.to_string());
                    }
                    Err(panic) => {
                        let reason = panic_message(panic.as_ref());
                        warn!(step = %self.step_id, reason = %reason, "Step submission panicked");
                        return GateOutcome::Failed(reason);
                    }
                }
            }
        };

        if !accepted {
            debug!(step = %self.step_id, "Step submission rejected");
            return GateOutcome::Rejected;
        }

        self.wizard.mark_step_complete(&self.step_id).await;
        self.wizard.go_to_next_step().await;
        info!(step = %self.step_id, "Step completed");
        GateOutcome::Advanced
    }

    /// Back control. Returns whether the wizard moved.
    pub async fn go_back(&self) -> bool {
        if self.is_submitting() || !self.options.show_back {
            return false;
        }
        if !self.is_visible().await {
            return false;
        }
        self.wizard.go_to_previous_step().await
    }

    /// Renderable state, or `None` while another step is active.
    pub async fn view(&self) -> Option<GateView> {
        let state = self.wizard.read().await;
        let step = state.current_step();
        if step.id != self.step_id {
            return None;
        }

        let submitting = self.is_submitting();
        let back = (self.options.show_back && !state.is_first_step()).then(|| ButtonView {
            label: self.options.back_label.clone(),
            enabled: !submitting,
            busy: false,
        });
        let submit_label = if state.is_last_step() {
            COMPLETE_LABEL.to_string()
        } else {
            self.options.next_label.clone()
        };

        Some(GateView {
            step_id: self.step_id.clone(),
            title: self.options.title.clone().unwrap_or_else(|| step.title.clone()),
            description: self
                .options
                .description
                .clone()
                .unwrap_or_else(|| step.description.clone()),
            back,
            submit: ButtonView {
                label: submit_label,
                enabled: !submitting,
                busy: submitting,
            },
        })
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "submit handler panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;
    use crate::wizard::registry::{StepDescriptor, StepRegistry};

    fn abc() -> Wizard {
        Wizard::new(
            StepRegistry::new(vec![
                StepDescriptor::new("A", "Step A", "first"),
                StepDescriptor::new("B", "Step B", "second"),
                StepDescriptor::new("C", "Step C", "third"),
            ])
            .unwrap(),
        )
    }

    enum Behavior {
        Accept,
        Reject,
        Error,
        Panic,
    }

    struct Scripted {
        behavior: Behavior,
        calls: AtomicUsize,
    }

    impl Scripted {
        fn new(behavior: Behavior) -> Arc<Self> {
            Arc::new(Self {
                behavior,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl StepSubmitter for Scripted {
        async fn submit(&self, _form_data: &FormData) -> Result<bool, SubmitError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
            match self.behavior {
                Behavior::Accept => Ok(true),
                Behavior::Reject => Ok(false),
                Behavior::Error => Err(SubmitError::Failed("store unreachable".into())),
                Behavior::Panic => panic!("boom"),
            }
        }
    }

    struct SeesFormData;

    #[async_trait]
    impl StepSubmitter for SeesFormData {
        async fn submit(&self, form_data: &FormData) -> Result<bool, SubmitError> {
            Ok(form_data.get_str("email") == Some("a@b.example"))
        }
    }

    fn gate(wizard: &Wizard, step: &str) -> StepGate {
        StepGate::mount(&WizardScope::new(wizard.clone()), step, GateOptions::default()).unwrap()
    }

    #[tokio::test]
    async fn only_the_current_step_is_visible() {
        let w = abc();
        let (a, b) = (gate(&w, "A"), gate(&w, "B"));
        assert!(a.is_visible().await);
        assert!(!b.is_visible().await);

        w.go_to_next_step().await;
        assert!(!a.is_visible().await);
        assert!(b.is_visible().await);
        assert!(a.view().await.is_none());
    }

    #[tokio::test]
    async fn accept_reject_scenario() {
        let w = abc();
        let a = gate(&w, "A").with_submitter(Scripted::new(Behavior::Accept));
        let b = gate(&w, "B").with_submitter(Scripted::new(Behavior::Reject));

        assert_eq!(a.submit().await, GateOutcome::Advanced);
        assert!(w.is_step_complete("A").await);
        assert_eq!(w.current_step_index().await, 1);

        assert_eq!(b.submit().await, GateOutcome::Rejected);
        assert_eq!(w.current_step_index().await, 1);
        assert!(!w.is_step_complete("B").await);
    }

    #[tokio::test]
    async fn missing_submitter_is_automatic_success() {
        let w = abc();
        assert_eq!(gate(&w, "A").submit().await, GateOutcome::Advanced);
        assert!(w.is_step_complete("A").await);
        assert_eq!(w.current_step_index().await, 1);
    }

    #[tokio::test]
    async fn errors_and_panics_are_contained() {
        for behavior in [Behavior::Error, Behavior::Panic] {
            let w = abc();
            let before = w.snapshot().await;
            let a = gate(&w, "A").with_submitter(Scripted::new(behavior));

            match a.submit().await {
                GateOutcome::Failed(reason) => assert!(!reason.is_empty()),
                other => panic!("expected failure, got {other:?}"),
            }
            assert_eq!(w.snapshot().await, before);
            assert!(a.is_visible().await);
        }
    }

    #[tokio::test]
    async fn inactive_gate_does_not_call_submitter() {
        let w = abc();
        let submitter = Scripted::new(Behavior::Accept);
        let c = gate(&w, "C").with_submitter(submitter.clone());

        assert_eq!(c.submit().await, GateOutcome::Inactive);
        assert_eq!(submitter.calls.load(Ordering::SeqCst), 0);
        assert!(!w.is_step_complete("C").await);
    }

    #[tokio::test]
    async fn submitter_receives_current_form_data() {
        let w = abc();
        let a = gate(&w, "A").with_submitter(Arc::new(SeesFormData));

        assert_eq!(a.submit().await, GateOutcome::Rejected);
        w.update_form_data(FormData::new().with("email", "a@b.example")).await;
        assert_eq!(a.submit().await, GateOutcome::Advanced);
    }

    #[tokio::test]
    async fn last_step_completes_without_moving() {
        let w = abc();
        w.go_to_step(2).await;
        let c = gate(&w, "C");

        assert_eq!(c.view().await.unwrap().submit.label, COMPLETE_LABEL);
        assert_eq!(c.submit().await, GateOutcome::Advanced);
        assert!(w.is_step_complete("C").await);
        assert_eq!(w.current_step_index().await, 2);
    }

    #[tokio::test]
    async fn back_is_locked_while_submitting() {
        let w = abc();
        w.go_to_next_step().await;
        let b = gate(&w, "B");
        let flag = b.submitting_flag();

        flag.set(true);
        let view = b.view().await.unwrap();
        assert!(!view.back.as_ref().unwrap().enabled);
        assert!(!view.submit.enabled);
        assert!(view.submit.busy);
        assert!(!b.go_back().await);
        assert_eq!(w.current_step_index().await, 1);

        flag.set(false);
        assert!(b.go_back().await);
        assert_eq!(w.current_step_index().await, 0);
    }

    #[tokio::test]
    async fn view_uses_options_and_hides_back_on_first_step() {
        let w = abc();
        let a = StepGate::mount(
            &WizardScope::new(w.clone()),
            "A",
            GateOptions::titled("Business Information", "Tell us more").with_next_label("Next"),
        )
        .unwrap();

        let view = a.view().await.unwrap();
        assert_eq!(view.title, "Business Information");
        assert_eq!(view.description, "Tell us more");
        assert!(view.back.is_none());
        assert_eq!(view.submit.label, "Next");
        assert!(view.submit.enabled);

        w.go_to_next_step().await;
        let b = StepGate::mount(&WizardScope::new(w.clone()), "B", GateOptions::default().without_back())
            .unwrap();
        let view = b.view().await.unwrap();
        assert_eq!(view.title, "Step B");
        assert!(view.back.is_none());
        assert!(!b.go_back().await);
    }

    #[test]
    fn mount_outside_wizard_fails() {
        let err = StepGate::mount(&WizardScope::empty(), "A", GateOptions::default())
            .err()
            .unwrap();
        assert!(matches!(err, WizardError::OutsideWizard { ref component } if component == "StepGate"));
    }
}
