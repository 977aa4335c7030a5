//! Consistency checks for research-project accounting.
//!
//! Every check is a pure function over already-fetched records and returns a
//! [`ValidationResult`]; a failed business rule is a value, never an error.

mod budget_consistency;
mod employment_period;
mod participation_rate;
mod personnel_cost;
mod result;
mod support;
mod usage_rate;

pub use budget_consistency::check_budget_consistency;
pub use employment_period::{check_evidence_employment, check_member_employment};
pub use participation_rate::check_participation_rates;
pub use personnel_cost::{actual_personnel_cost, check_personnel_cost};
pub use result::{ValidationReason, ValidationResult, ValidationSummary};
pub use support::{
    DEFAULT_AMOUNT_TOLERANCE, amounts_match, date_ranges_overlap, months_spanned, overlap_window,
};
pub use usage_rate::{DEFAULT_USAGE_RATE_MARGIN, check_usage_rates};
