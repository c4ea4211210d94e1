//! What the success step shows once onboarding is done.

use std::fmt::Write as _;

use serde::Serialize;

use super::model::BusinessCategory;
use crate::wizard::FormData;

pub const NEXT_STEPS: [&str; 3] = [
    "Set up your detailed availability in the calendar to begin accepting bookings.",
    "Add payment information to receive payments from clients.",
    "Review and customize your business profile from the dashboard.",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingSummary {
    pub business_name: String,
    pub category: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub next_steps: Vec<String>,
}

impl OnboardingSummary {
    pub fn from_form_data(data: &FormData) -> Self {
        let text = |key: &str| data.get_str(key).unwrap_or_default().to_string();

        let business_name = data
            .get_str("businessName")
            .filter(|s| !s.is_empty())
            .or_else(|| data.get_str("name").filter(|s| !s.is_empty()))
            .unwrap_or("Your Business")
            .to_string();

        let category = data
            .get_str("category")
            .and_then(BusinessCategory::from_label)
            .map(|c| c.display_name().to_string())
            .unwrap_or_else(|| "Wellness Service".to_string());

        let location = format!(
            "{}, {}, {} {}",
            text("address"),
            text("city"),
            text("state"),
            text("postalCode")
        );

        Self {
            business_name,
            category,
            email: text("email"),
            phone: text("phone"),
            location,
            next_steps: NEXT_STEPS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Plain-text rendering for the terminal host.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Your business profile has been successfully created.");
        let _ = writeln!(out);
        let _ = writeln!(out, "Business Name  {}", self.business_name);
        let _ = writeln!(out, "Category       {}", self.category);
        let _ = writeln!(out, "Contact        {} {}", self.email, self.phone);
        let _ = writeln!(out, "Location       {}", self.location);
        let _ = writeln!(out);
        let _ = writeln!(out, "Next Steps");
        for step in &self.next_steps {
            let _ = writeln!(out, "  - {step}");
        }
        out
    }
}
