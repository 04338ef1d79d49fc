//! Rally integration test support.
//!
//! Re-exports the workspace crates under one path so the integration tests
//! can use `rally_test::component::` imports.

pub mod component {
    pub use rally_app::sweep;
    pub use rally_core::{constants, types, window};
    pub use rally_recur as recur;
    pub use rally_service::{calendar, invitation, schedule, sync, upcoming};

    pub mod db {
        pub use rally_db::db::*;
        pub use rally_db::error::{DbError, DbResult};
        pub use rally_db::model;
        pub use rally_db::store;
    }
}
