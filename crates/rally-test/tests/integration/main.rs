#![expect(clippy::expect_used, reason = "tests fail loudly on broken fixtures")]
//! Integration tests for the recurrence engine and the services built on it.

mod calendar;
mod helpers;
mod materialize;
mod partial_failure;
mod postgres;
