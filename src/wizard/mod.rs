//! Multi-step wizard core.
//!
//! A [`StepRegistry`] fixes the steps, a [`WizardState`] tracks the active
//! step, completion flags and accumulated [`FormData`], and a shared
//! [`Wizard`] handle is passed explicitly into each [`StepGate`], the
//! [`StepIndicator`] and every concrete form.

pub mod form_data;
pub mod gate;
pub mod handle;
pub mod indicator;
pub mod registry;
pub mod state;

pub use form_data::FormData;
pub use gate::{
    ButtonView, GateOptions, GateOutcome, GateView, StepGate, StepSubmitter, SubmittingFlag,
};
pub use handle::{Wizard, WizardEvent, WizardScope};
pub use indicator::{IndicatorItem, IndicatorView, StepIndicator, progress_fraction};
pub use registry::{StepDescriptor, StepRegistry};
pub use state::{StepLifecycle, WizardSnapshot, WizardState};
