//! Wizard state machine: tracks the active step, per-step completion and the
//! accumulated form data.
//!
//! States are the indices `0..steps.len()`; the only transitions are
//! next / previous / jump. Out-of-range requests are silently ignored: they
//! originate from disabled controls, not from untrusted input.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::form_data::FormData;
use super::registry::{StepDescriptor, StepRegistry};

/// Receives explicit enter/exit notifications for step transitions.
///
/// Called synchronously from the navigation operation that moved the index,
/// exit before enter. Implementations must not call back into the wizard.
pub trait StepLifecycle: Send + Sync {
    fn on_step_exit(&self, _step: &StepDescriptor, _index: usize) {}

    fn on_step_enter(&self, _step: &StepDescriptor, _index: usize) {}
}

/// Serializable view of the state machine at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WizardSnapshot {
    pub current_index: usize,
    pub completed: HashMap<String, bool>,
    pub form_data: FormData,
}

/// The wizard state machine.
pub struct WizardState {
    steps: StepRegistry,
    current_index: usize,
    completed: HashMap<String, bool>,
    form_data: FormData,
    observers: Vec<Arc<dyn StepLifecycle>>,
}

impl WizardState {
    pub fn new(steps: StepRegistry) -> Self {
        Self::with_initial_data(steps, FormData::new())
    }

    /// Start at the first step with form data seeded from a prior record.
    pub fn with_initial_data(steps: StepRegistry, initial_data: FormData) -> Self {
        Self {
            steps,
            current_index: 0,
            completed: HashMap::new(),
            form_data: initial_data,
            observers: Vec::new(),
        }
    }

    /// Attach a lifecycle observer. Does not replay the current step.
    pub fn add_observer(&mut self, observer: Arc<dyn StepLifecycle>) {
        self.observers.push(observer);
    }

    // ── Navigation ──────────────────────────────────────────────────

    pub fn current_step_index(&self) -> usize {
        self.current_index
    }

    pub fn current_step(&self) -> &StepDescriptor {
        &self.steps.as_slice()[self.current_index]
    }

    pub fn steps(&self) -> &StepRegistry {
        &self.steps
    }

    pub fn is_first_step(&self) -> bool {
        self.current_index == 0
    }

    pub fn is_last_step(&self) -> bool {
        self.current_index == self.steps.len() - 1
    }

    /// Advance one step. No-op at the last step.
    pub fn go_to_next_step(&mut self) -> bool {
        if self.is_last_step() {
            return false;
        }
        self.transition_to(self.current_index + 1);
        true
    }

    /// Go back one step. No-op at the first step.
    pub fn go_to_previous_step(&mut self) -> bool {
        if self.is_first_step() {
            return false;
        }
        self.transition_to(self.current_index - 1);
        true
    }

    /// Jump to `index` if it is in range; otherwise no-op.
    ///
    /// Which targets a user may pick (visited or completed steps) is decided
    /// by the indicator, not here.
    pub fn go_to_step(&mut self, index: usize) -> bool {
        if index >= self.steps.len() {
            debug!(index, steps = self.steps.len(), "Ignoring out-of-range step jump");
            return false;
        }
        if index != self.current_index {
            self.transition_to(index);
        }
        true
    }

    fn transition_to(&mut self, index: usize) {
        let from = self.current_index;
        self.current_index = index;

        let exited = &self.steps.as_slice()[from];
        let entered = &self.steps.as_slice()[index];
        debug!(from = %exited.id, to = %entered.id, "Wizard step changed");

        for observer in &self.observers {
            observer.on_step_exit(exited, from);
        }
        for observer in &self.observers {
            observer.on_step_enter(entered, index);
        }
    }

    // ── Completion ──────────────────────────────────────────────────

    /// Record the step as complete. Ids are not checked against the registry.
    pub fn mark_step_complete(&mut self, step_id: &str) {
        self.completed.insert(step_id.to_string(), true);
    }

    pub fn mark_step_incomplete(&mut self, step_id: &str) {
        self.completed.insert(step_id.to_string(), false);
    }

    pub fn is_step_complete(&self, step_id: &str) -> bool {
        self.completed.get(step_id).copied().unwrap_or(false)
    }

    pub fn completed_steps(&self) -> &HashMap<String, bool> {
        &self.completed
    }

    // ── Form data ───────────────────────────────────────────────────

    pub fn form_data(&self) -> &FormData {
        &self.form_data
    }

    /// Shallow-merge `partial` into the accumulated form data.
    pub fn update_form_data(&mut self, partial: FormData) {
        self.form_data.merge(partial);
    }

    pub fn snapshot(&self) -> WizardSnapshot {
        WizardSnapshot {
            current_index: self.current_index,
            completed: self.completed.clone(),
            form_data: self.form_data.clone(),
        }
    }
}

impl fmt::Debug for WizardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WizardState")
            .field("current_index", &self.current_index)
            .field("steps", &self.steps.len())
            .field("completed", &self.completed)
            .field("form_data", &self.form_data)
            .field("observers", &self.observers.len())
            .finish()
    }
}
