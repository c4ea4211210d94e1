//! Step registry: the ordered, immutable list of wizard steps.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::WizardError;

/// One page of the wizard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepDescriptor {
    /// Stable identifier, unique within a registry.
    pub id: String,
    pub title: String,
    pub description: String,
}

impl StepDescriptor {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
        }
    }
}

/// Ordered list of step descriptors, fixed for the wizard's lifetime.
///
/// Order defines navigation order. A registry always holds at least one step
/// so that a current index exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepRegistry {
    steps: Vec<StepDescriptor>,
}

impl StepRegistry {
    /// Build a registry. Rejects an empty list and duplicated ids.
    pub fn new(steps: Vec<StepDescriptor>) -> Result<Self, WizardError> {
        if steps.is_empty() {
            return Err(WizardError::NoSteps);
        }

        let mut seen = HashSet::with_capacity(steps.len());
        for step in &steps {
            if !seen.insert(step.id.as_str()) {
                return Err(WizardError::DuplicateStep(step.id.clone()));
            }
        }

        Ok(Self { steps })
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&StepDescriptor> {
        self.steps.get(index)
    }

    /// Index of the step with the given id, if registered.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.steps.iter().position(|s| s.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &StepDescriptor> {
        self.steps.iter()
    }

    pub fn as_slice(&self) -> &[StepDescriptor] {
        &self.steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abc() -> Vec<StepDescriptor> {
        vec![
            StepDescriptor::new("a", "A", "first"),
            StepDescriptor::new("b", "B", "second"),
            StepDescriptor::new("c", "C", "third"),
        ]
    }

    #[test]
    fn keeps_declared_order() {
        let registry = StepRegistry::new(abc()).unwrap();
        let ids: Vec<&str> = registry.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.position("c"), Some(2));
        assert_eq!(registry.position("zzz"), None);
        assert_eq!(registry.get(1).unwrap().title, "B");
        assert!(registry.get(3).is_none());
    }

    #[test]
    fn rejects_empty_registry() {
        assert!(matches!(StepRegistry::new(vec![]), Err(WizardError::NoSteps)));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let mut steps = abc();
        steps.push(StepDescriptor::new("b", "Again", "dup"));
        match StepRegistry::new(steps) {
            Err(WizardError::DuplicateStep(id)) => assert_eq!(id, "b"),
            other => panic!("expected duplicate error, got {other:?}"),
        }
    }

    #[test]
    fn descriptor_serde_uses_plain_field_names() {
        let step = StepDescriptor::new("basic-info", "Basic Info", "Tell us about your business");
        let json = serde_json::to_value(&step).unwrap();
        assert_eq!(json["id"], "basic-info");
        assert_eq!(json["title"], "Basic Info");
        assert_eq!(json["description"], "Tell us about your business");
    }
}
