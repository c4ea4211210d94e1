//! Step indicator: progress rendering plus jump-to-step.

use serde::Serialize;
use tracing::debug;

use super::handle::{Wizard, WizardScope};
use crate::error::WizardError;

/// Fill fraction of the progress bar: `current / (total - 1)`, and 0 for a
/// single-step wizard.
pub fn progress_fraction(current: usize, total: usize) -> f64 {
    if total <= 1 {
        return 0.0;
    }
    current as f64 / (total - 1) as f64
}

/// One step's marker in the indicator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndicatorItem {
    pub index: usize,
    pub id: String,
    pub title: String,
    pub is_active: bool,
    pub is_past: bool,
    pub is_complete: bool,
    /// Past steps and completed steps can be jumped to.
    pub is_clickable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorView {
    pub items: Vec<IndicatorItem>,
    pub current_index: usize,
    pub progress: f64,
}

impl IndicatorView {
    pub fn progress_percent(&self) -> f64 {
        self.progress * 100.0
    }

    /// Single-line text rendering, e.g. `[✓ Basic Info] ── (2 Location) ── 3 Profile`.
    ///
    /// Completed steps show a check mark, the active step is parenthesised
    /// and clickable ones are bracketed.
    pub fn render_text(&self) -> String {
        let markers: Vec<String> = self
            .items
            .iter()
            .map(|item| {
                let label = if item.is_complete {
                    format!("✓ {}", item.title)
                } else {
                    format!("{} {}", item.index + 1, item.title)
                };
                if item.is_active {
                    format!("({label})")
                } else if item.is_clickable {
                    format!("[{label}]")
                } else {
                    label
                }
            })
            .collect();
        format!(
            "{}  {:.0}%",
            markers.join(" ── "),
            self.progress_percent()
        )
    }
}

/// Reads the wizard to render progress and requests jumps.
#[derive(Clone)]
pub struct StepIndicator {
    wizard: Wizard,
}

impl StepIndicator {
    pub fn mount(scope: &WizardScope) -> Result<Self, WizardError> {
        Ok(Self {
            wizard: scope.wizard("StepIndicator")?.clone(),
        })
    }

    pub async fn view(&self) -> IndicatorView {
        let state = self.wizard.read().await;
        let current = state.current_step_index();
        let items = state
            .steps()
            .iter()
            .enumerate()
            .map(|(index, step)| {
                let is_past = index < current;
                let is_complete = state.is_step_complete(&step.id);
                IndicatorItem {
                    index,
                    id: step.id.clone(),
                    title: step.title.clone(),
                    is_active: index == current,
                    is_past,
                    is_complete,
                    is_clickable: is_past || is_complete,
                }
            })
            .collect();

        IndicatorView {
            items,
            current_index: current,
            progress: progress_fraction(current, state.steps().len()),
        }
    }

    /// Jump to `index` if its marker is clickable and not already active.
    pub async fn click(&self, index: usize) -> bool {
        let view = self.view().await;
        match view.items.get(index) {
            Some(item) if item.is_clickable && !item.is_active => {
                self.wizard.go_to_step(index).await
            }
            _ => {
                debug!(index, "Indicator click ignored");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wizard::registry::{StepDescriptor, StepRegistry};

    fn wizard(n: usize) -> Wizard {
        Wizard::new(
            StepRegistry::new(
                (0..n)
                    .map(|i| StepDescriptor::new(format!("s{i}"), format!("S{i}"), ""))
                    .collect(),
            )
            .unwrap(),
        )
    }

    fn indicator(w: &Wizard) -> StepIndicator {
        StepIndicator::mount(&WizardScope::new(w.clone())).unwrap()
    }

    #[test]
    fn progress_fraction_cases() {
        assert_eq!(progress_fraction(0, 1), 0.0);
        assert_eq!(progress_fraction(0, 0), 0.0);
        assert!((progress_fraction(2, 4) - 2.0 / 3.0).abs() < f64::EPSILON);
        assert_eq!(progress_fraction(0, 4), 0.0);
        assert_eq!(progress_fraction(3, 4), 1.0);
    }

    #[tokio::test]
    async fn single_step_progress_is_zero() {
        let w = wizard(1);
        let view = indicator(&w).view().await;
        assert_eq!(view.progress, 0.0);
        assert_eq!(view.items.len(), 1);
        assert!(view.items[0].is_active);
    }

    #[tokio::test]
    async fn past_steps_always_clickable_future_only_when_complete() {
        let w = wizard(5);
        w.go_to_step(2).await;
        w.mark_step_complete("s4").await;
        let view = indicator(&w).view().await;

        let clickable: Vec<bool> = view.items.iter().map(|i| i.is_clickable).collect();
        assert_eq!(clickable, [true, true, false, false, true]);
        assert!(view.items[2].is_active);
        assert!(!view.items[0].is_complete);
        assert!(view.items[1].is_past);
        assert!((view.progress - 0.5).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn click_rejects_inert_and_active_markers() {
        let w = wizard(3);
        w.mark_step_complete("s0").await;
        w.go_to_next_step().await;
        let ind = indicator(&w);

        assert!(!ind.click(2).await, "s2 is neither past nor complete");
        assert!(!ind.click(1).await, "active marker");
        assert!(!ind.click(7).await, "out of range");
        assert_eq!(w.current_step_index().await, 1);

        assert!(ind.click(0).await);
        assert_eq!(w.current_step_index().await, 0);
    }

    #[tokio::test]
    async fn can_jump_forward_to_completed_step() {
        let w = wizard(3);
        w.mark_step_complete("s0").await;
        w.mark_step_complete("s2").await;
        let ind = indicator(&w);

        assert!(ind.click(2).await);
        assert_eq!(w.current_step_index().await, 2);
    }

    #[tokio::test]
    async fn render_text_marks_state() {
        let w = wizard(3);
        w.mark_step_complete("s0").await;
        w.go_to_next_step().await;

        let text = indicator(&w).view().await.render_text();
        assert_eq!(text, "[✓ S0] ── (2 S1) ── 3 S2  50%");
    }

    #[test]
    fn mount_outside_wizard_fails() {
        assert!(StepIndicator::mount(&WizardScope::empty()).is_err());
    }
}
