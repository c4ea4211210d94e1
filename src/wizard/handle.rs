//! Shared wizard handle and the scope step content is mounted through.
//!
//! One `Wizard` is built at the root of a wizard and passed explicitly to
//! every gate, the indicator and every concrete form. Clones share the same
//! underlying state.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{RwLock, RwLockReadGuard, broadcast};
use tracing::info;

use super::form_data::FormData;
use super::registry::{StepDescriptor, StepRegistry};
use super::state::{StepLifecycle, WizardSnapshot, WizardState};
use crate::error::WizardError;

/// Default broadcast channel capacity.
const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Events published to wizard subscribers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WizardEvent {
    StepExited { step_id: String, index: usize },
    StepEntered { step_id: String, index: usize },
    StepCompleted { step_id: String },
    StepReopened { step_id: String },
    FormDataUpdated { keys: Vec<String> },
}

/// Forwards lifecycle callbacks onto the broadcast channel.
struct BroadcastLifecycle {
    tx: broadcast::Sender<WizardEvent>,
}

impl StepLifecycle for BroadcastLifecycle {
    fn on_step_exit(&self, step: &StepDescriptor, index: usize) {
        let _ = self.tx.send(WizardEvent::StepExited {
            step_id: step.id.clone(),
            index,
        });
    }

    fn on_step_enter(&self, step: &StepDescriptor, index: usize) {
        let _ = self.tx.send(WizardEvent::StepEntered {
            step_id: step.id.clone(),
            index,
        });
    }
}

/// Cloneable handle to a single wizard's state.
#[derive(Clone)]
pub struct Wizard {
    state: Arc<RwLock<WizardState>>,
    tx: broadcast::Sender<WizardEvent>,
}

impl Wizard {
    pub fn new(steps: StepRegistry) -> Self {
        Self::with_initial_data(steps, FormData::new())
    }

    pub fn with_initial_data(steps: StepRegistry, initial_data: FormData) -> Self {
        let (tx, _rx) = broadcast::channel(DEFAULT_EVENT_CAPACITY);
        let mut state = WizardState::with_initial_data(steps, initial_data);
        state.add_observer(Arc::new(BroadcastLifecycle { tx: tx.clone() }));

        info!(
            steps = state.steps().len(),
            resumed = state.form_data().id().is_some(),
            "Wizard created"
        );

        Self {
            state: Arc::new(RwLock::new(state)),
            tx,
        }
    }

    /// Subscribe to step and data events.
    pub fn subscribe(&self) -> broadcast::Receiver<WizardEvent> {
        self.tx.subscribe()
    }

    /// Attach an additional synchronous lifecycle observer.
    pub async fn add_observer(&self, observer: Arc<dyn StepLifecycle>) {
        self.state.write().await.add_observer(observer);
    }

    /// Read several fields consistently under one lock.
    pub async fn read(&self) -> RwLockReadGuard<'_, WizardState> {
        self.state.read().await
    }

    pub async fn current_step_index(&self) -> usize {
        self.state.read().await.current_step_index()
    }

    pub async fn current_step(&self) -> StepDescriptor {
        self.state.read().await.current_step().clone()
    }

    pub async fn steps(&self) -> StepRegistry {
        self.state.read().await.steps().clone()
    }

    pub async fn is_first_step(&self) -> bool {
        self.state.read().await.is_first_step()
    }

    pub async fn is_last_step(&self) -> bool {
        self.state.read().await.is_last_step()
    }

    pub async fn go_to_next_step(&self) -> bool {
        self.state.write().await.go_to_next_step()
    }

    pub async fn go_to_previous_step(&self) -> bool {
        self.state.write().await.go_to_previous_step()
    }

    pub async fn go_to_step(&self, index: usize) -> bool {
        self.state.write().await.go_to_step(index)
    }

    pub async fn mark_step_complete(&self, step_id: &str) {
        self.state.write().await.mark_step_complete(step_id);
        let _ = self.tx.send(WizardEvent::StepCompleted {
            step_id: step_id.to_string(),
        });
    }

    pub async fn mark_step_incomplete(&self, step_id: &str) {
        self.state.write().await.mark_step_incomplete(step_id);
        let _ = self.tx.send(WizardEvent::StepReopened {
            step_id: step_id.to_string(),
        });
    }

    pub async fn is_step_complete(&self, step_id: &str) -> bool {
        self.state.read().await.is_step_complete(step_id)
    }

    /// Copy of the accumulated form data.
    pub async fn form_data(&self) -> FormData {
        self.state.read().await.form_data().clone()
    }

    pub async fn update_form_data(&self, partial: FormData) {
        let keys: Vec<String> = partial.keys().cloned().collect();
        self.state.write().await.update_form_data(partial);
        let _ = self.tx.send(WizardEvent::FormDataUpdated { keys });
    }

    pub async fn snapshot(&self) -> WizardSnapshot {
        self.state.read().await.snapshot()
    }
}

/// Where step content gets its wizard from.
///
/// Mounting a gate, indicator or form through an empty scope is a wiring
/// bug and fails immediately with [`WizardError::OutsideWizard`].
#[derive(Clone, Default)]
pub struct WizardScope {
    wizard: Option<Wizard>,
}

impl WizardScope {
    pub fn new(wizard: Wizard) -> Self {
        Self {
            wizard: Some(wizard),
        }
    }

    /// A scope with no wizard in it.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The scope's wizard, for the named component.
    pub fn wizard(&self, component: &str) -> Result<&Wizard, WizardError> {
        self.wizard.as_ref().ok_or_else(|| WizardError::OutsideWizard {
            component: component.to_string(),
        })
    }
}
