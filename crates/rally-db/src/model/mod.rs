pub mod event;
pub mod invitation;
pub mod subgroup;
