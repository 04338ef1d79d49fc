//! Recurrence expansion for club events.
//!
//! A [`RecurrenceRule`] describes a schedule (start date, cadence, optional end
//! date, cancelled dates). The [`expand`] module turns rules into concrete
//! calendar dates and answers "what comes next" lookups; [`lead`] works out
//! when each occurrence's invitation goes out. Everything in this crate is
//! pure and synchronous.

pub mod cadence;
pub mod error;
pub mod expand;
pub mod lead;
pub mod rule;

pub use cadence::Cadence;
pub use error::{RecurError, RecurResult};
pub use expand::{
    Expansion, ExpansionOutcome, expand, expand_capped, generate, next_occurrence,
    next_occurrence_capped,
};
pub use lead::{LeadTime, is_sent};
pub use rule::RecurrenceRule;
