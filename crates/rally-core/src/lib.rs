//! Shared building blocks for the rally workspace.
//!
//! Holds the types every other crate agrees on (repeat types, invitation
//! statuses, date windows), configuration loading and the core error type.

pub mod config;
pub mod constants;
pub mod error;
pub mod types;
pub mod window;
