use chrono::NaiveDate;
use rally_core::window::DateWindow;
use serde::Serialize;

use crate::error::RecurResult;
use crate::rule::RecurrenceRule;

/// How an expansion ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpansionOutcome {
    /// Every occurrence inside the window was produced.
    Completed,
    /// The iteration cap was hit while candidates were still inside the window.
    CapReached,
}

/// The dates produced for one rule and window, in strictly ascending order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Expansion {
    pub dates: Vec<NaiveDate>,
    pub outcome: ExpansionOutcome,
}

impl Expansion {
    const fn completed(dates: Vec<NaiveDate>) -> Self {
        Self {
            dates,
            outcome: ExpansionOutcome::Completed,
        }
    }

    #[must_use]
    pub const fn is_complete(&self) -> bool {
        matches!(self.outcome, ExpansionOutcome::Completed)
    }
}

/// ## Summary
/// Expands `rule` over the inclusive range `window_start..=window_end`.
///
/// ## Errors
/// Returns `CoreError::InvertedWindow` (wrapped) if `window_start` is after `window_end`.
pub fn generate(
    rule: &RecurrenceRule,
    window_start: NaiveDate,
    window_end: NaiveDate,
) -> RecurResult<Expansion> {
    let window = DateWindow::new(window_start, window_end)?;
    Ok(expand(rule, &window))
}

/// ## Summary
/// Expands `rule` over `window` using the cadence's iteration cap.
///
/// The result holds every date `d` with `d` in the window, `d >= start_date`,
/// `d <= end_date` (when set), and `d` not excluded.
#[must_use]
pub fn expand(rule: &RecurrenceRule, window: &DateWindow) -> Expansion {
    expand_capped(rule, window, rule.cadence().iteration_cap())
}

/// ## Summary
/// Expands `rule` over `window`, examining at most `max_steps` candidates.
///
/// Excluded dates count against the cap. When the cap runs out before the
/// window is covered, the dates found so far are returned with
/// [`ExpansionOutcome::CapReached`].
#[tracing::instrument(level = "trace", skip(rule), fields(cadence = %rule.cadence(), start = %rule.start_date()))]
#[must_use]
pub fn expand_capped(rule: &RecurrenceRule, window: &DateWindow, max_steps: u32) -> Expansion {
    let limit = rule
        .end_date()
        .map_or(window.end(), |end| end.min(window.end()));
    let mut dates = Vec::new();

    if limit < window.start() {
        return Expansion::completed(dates);
    }

    let Some(mut index) = rule.first_index_on_or_after(window.start()) else {
        return Expansion::completed(dates);
    };

    for _ in 0..max_steps {
        let Some(candidate) = rule.nth(index) else {
            return Expansion::completed(dates);
        };
        if candidate > limit {
            return Expansion::completed(dates);
        }
        if !rule.is_excluded(candidate) {
            dates.push(candidate);
        }
        let Some(next) = index.checked_add(1) else {
            return Expansion::completed(dates);
        };
        index = next;
    }

    // Only a truncation if the next candidate would still have been in range
    if rule.nth(index).is_some_and(|candidate| candidate <= limit) {
        tracing::warn!(
            max_steps,
            produced = dates.len(),
            "Recurrence expansion hit its iteration cap; window truncated"
        );
        return Expansion {
            dates,
            outcome: ExpansionOutcome::CapReached,
        };
    }

    Expansion::completed(dates)
}
