use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use tessera_core::ProjectId;

/// Research project master record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Stable project identifier.
    pub id: ProjectId,
    /// Project title.
    pub title: String,
    /// Declared total budget across all periods.
    pub total_budget: f64,
    /// Project start date.
    pub start_date: NaiveDate,
    /// Project end date.
    pub end_date: NaiveDate,
}

/// Budget declared for one annual period of a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectBudget {
    /// Period ordinal within the project, starting at 1.
    pub period_number: u32,
    /// Period start date.
    pub start_date: NaiveDate,
    /// Period end date.
    pub end_date: NaiveDate,
    /// Total budget declared for the period.
    pub total_budget: f64,
    /// Personnel cost declared within the period budget.
    pub personnel_cost: f64,
    /// Amount already spent in the period.
    pub spent_amount: f64,
}

/// Declared participation of one person in a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectMember {
    /// Given name, for display.
    pub first_name: String,
    /// Family name, for display.
    pub last_name: String,
    /// Participation start date.
    pub start_date: NaiveDate,
    /// Participation end date.
    pub end_date: NaiveDate,
    /// Monthly cost rate while participating.
    pub monthly_amount: f64,
    /// Percentage of working capacity allocated to the project, 0 to 100.
    pub participation_rate: f64,
    /// Employment start date, when known.
    pub hire_date: Option<NaiveDate>,
    /// Employment end date, when the person has left.
    pub termination_date: Option<NaiveDate>,
}

impl ProjectMember {
    /// Returns the member's display name, or `None` when the record carries
    /// no resolvable employee identity.
    #[must_use]
    pub fn display_name(&self) -> Option<String> {
        let first = self.first_name.trim();
        let last = self.last_name.trim();
        match (first.is_empty(), last.is_empty()) {
            (true, true) => None,
            (false, true) => Some(first.to_owned()),
            (true, false) => Some(last.to_owned()),
            (false, false) => Some(format!("{first} {last}")),
        }
    }
}

/// Spending record tagged to a budget period and a cost category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceItem {
    /// Budget period the spending belongs to.
    pub period_number: u32,
    /// Cost category, e.g. "personnel" or "equipment".
    pub category_name: String,
    /// Spent amount.
    pub spent_amount: f64,
}
