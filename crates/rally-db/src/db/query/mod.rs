//! Query functions, one module per table.

pub mod event;
pub mod invitation;
pub mod subgroup;
