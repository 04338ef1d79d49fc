//! The per-user invitation ledger.
//!
//! Materialization only ever inserts missing `pending` records; members'
//! answers are the only updates, and nothing here deletes.

pub mod ledger;
pub mod materialize;

pub use ledger::{
    respond, sent_invitations_for_user, visible_invitations, visible_invitations_for_user,
};
pub use materialize::{
    EventMaterialization, FailedInsert, MaterializeReport, UserFailure, materialize,
    materialize_event, materialize_for_user, materialize_for_users,
};
