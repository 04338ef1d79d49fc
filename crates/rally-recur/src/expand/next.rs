use chrono::NaiveDate;
use rally_core::constants::NEXT_OCCURRENCE_CAP;

use crate::rule::RecurrenceRule;

/// ## Summary
/// Returns the first occurrence on or after `after`, if any.
///
/// `after` itself counts when it is an occurrence. Returns `None` when the
/// rule ends first or when no occurrence turns up within
/// `NEXT_OCCURRENCE_CAP` candidates.
#[must_use]
pub fn next_occurrence(rule: &RecurrenceRule, after: NaiveDate) -> Option<NaiveDate> {
    next_occurrence_capped(rule, after, NEXT_OCCURRENCE_CAP)
}

/// Like [`next_occurrence`], examining at most `max_steps` candidates.
#[must_use]
pub fn next_occurrence_capped(
    rule: &RecurrenceRule,
    after: NaiveDate,
    max_steps: u32,
) -> Option<NaiveDate> {
    let mut index = rule.first_index_on_or_after(after)?;

    for _ in 0..max_steps {
        let candidate = rule.nth(index)?;
        if !rule.within_end(candidate) {
            return None;
        }
        if !rule.is_excluded(candidate) {
            return Some(candidate);
        }
        index = index.checked_add(1)?;
    }

    tracing::debug!(%after, max_steps, "No occurrence found within cap");
    None
}
