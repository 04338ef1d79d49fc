//! Persistence for club events, subgroups and per-occurrence invitations.
//!
//! [`db`] holds the diesel schema, migrations and query functions for
//! `PostgreSQL`; [`store`] exposes the async store traits the services are
//! written against, with a Postgres and an in-memory implementation.

pub mod db;
pub mod error;
pub mod model;
pub mod store;
