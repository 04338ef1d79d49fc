//! Expansion of recurrence rules into concrete dates.
//!
//! Both entry points walk the rule by occurrence index. Candidate `n` is always
//! computed from the start date, so monthly series never drift after a
//! clamped month, and the cursor jumps straight to the first index inside the
//! requested range.

mod generate;
mod next;

pub use generate::{Expansion, ExpansionOutcome, expand, expand_capped, generate};
pub use next::{next_occurrence, next_occurrence_capped};
