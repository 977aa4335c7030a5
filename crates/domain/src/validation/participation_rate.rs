use std::collections::BTreeSet;

use crate::project::ProjectMember;

use super::result::{ValidationReason, ValidationResult};

/// Checks individual and concurrent participation rates.
///
/// A single member above 100%, or any set of members with overlapping
/// intervals whose rates sum above 100%, fails the check. Concurrent groups
/// are found by summing rates at every interval start date: the intersection
/// of any maximal overlapping group contains at least one member's start
/// date, so the sweep sees every violating group.
#[must_use]
pub fn check_participation_rates(members: &[ProjectMember]) -> ValidationResult {
    let mut issues = Vec::new();

    for member in members {
        if member.participation_rate > 100.0 {
            let name = member
                .display_name()
                .unwrap_or_else(|| "unnamed member".to_owned());
            issues.push(format!(
                "{name}: participation rate {:.0}% exceeds 100%",
                member.participation_rate
            ));
        }
    }

    let boundaries: BTreeSet<_> = members.iter().map(|member| member.start_date).collect();
    for boundary in boundaries {
        let concurrent: Vec<_> = members
            .iter()
            .filter(|member| member.start_date <= boundary && boundary <= member.end_date)
            .collect();
        if concurrent.len() < 2 {
            continue;
        }
        let total: f64 = concurrent
            .iter()
            .map(|member| member.participation_rate)
            .sum();
        if total > 100.0 {
            issues.push(format!(
                "{} concurrent members total {total:.0}% participation ({:.0}% over) as of {boundary}",
                concurrent.len(),
                total - 100.0
            ));
        }
    }
    issues.dedup();

    if issues.is_empty() {
        return ValidationResult::valid("participation rates are within capacity");
    }

    ValidationResult::invalid(
        ValidationReason::ParticipationRateInvalid,
        "participation exceeds available capacity",
    )
    .with_issues(issues)
}
