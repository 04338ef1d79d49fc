//! The `rally-sync` worker: periodic invitation materialization for the
//! configured clubs.

pub mod error;
pub mod sweep;
