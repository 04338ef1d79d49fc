//! Services built on the recurrence engine: invitation materialization,
//! calendar aggregation, upcoming-event lookup, schedule edits and
//! change-feed driven resync.

pub mod calendar;
pub mod error;
pub mod invitation;
pub mod schedule;
pub mod sync;
pub mod upcoming;
