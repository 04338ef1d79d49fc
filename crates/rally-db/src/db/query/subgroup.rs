//! Query composition for `subgroups`.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::db::connection::DbConnection;
use crate::db::schema::subgroups;
use crate::model::subgroup::{NewSubgroup, Subgroup};

/// ## Summary
/// Lists a club's subgroups by name.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn for_club(conn: &mut DbConnection<'_>, club_id: Uuid) -> QueryResult<Vec<Subgroup>> {
    subgroups::table
        .filter(subgroups::club_id.eq(club_id))
        .order(subgroups::name.asc())
        .select(Subgroup::as_select())
        .load(conn)
        .await
}

/// ## Summary
/// Inserts a subgroup and returns the stored row.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn insert(conn: &mut DbConnection<'_>, subgroup: &NewSubgroup) -> QueryResult<Subgroup> {
    diesel::insert_into(subgroups::table)
        .values(subgroup)
        .returning(Subgroup::as_returning())
        .get_result(conn)
        .await
}
