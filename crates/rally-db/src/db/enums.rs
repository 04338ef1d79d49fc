//! Database enum types with Diesel serialization.
//!
//! Each enum maps a CHECK-constrained text column and implements `ToSql` and
//! `FromSql` for conversion between Rust and `PostgreSQL`.

use diesel::deserialize::{self, FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::pg::{Pg, PgValue};
use diesel::serialize::{self, IsNull, Output, ToSql};
use diesel::sql_types::Text;
use rally_core::types::InvitationStatus;
use std::fmt;
use std::io::Write;

/// Invitation answer as stored.
///
/// Maps to `event_invitations.status` CHECK constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsExpression, FromSqlRow)]
#[diesel(sql_type = Text)]
pub enum StatusColumn {
    Pending,
    Accepted,
    Rejected,
}

impl ToSql<Text, Pg> for StatusColumn {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        out.write_all(self.as_str().as_bytes())?;
        Ok(IsNull::No)
    }
}

impl FromSql<Text, Pg> for StatusColumn {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        match bytes.as_bytes() {
            b"pending" => Ok(Self::Pending),
            b"accepted" => Ok(Self::Accepted),
            b"rejected" => Ok(Self::Rejected),
            _ => Err("Unrecognized enum variant".into()),
        }
    }
}

impl StatusColumn {
    /// Returns the database string representation of this status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for StatusColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<InvitationStatus> for StatusColumn {
    fn from(status: InvitationStatus) -> Self {
        match status {
            InvitationStatus::Pending => Self::Pending,
            InvitationStatus::Accepted => Self::Accepted,
            InvitationStatus::Rejected => Self::Rejected,
        }
    }
}

impl From<StatusColumn> for InvitationStatus {
    fn from(column: StatusColumn) -> Self {
        match column {
            StatusColumn::Pending => Self::Pending,
            StatusColumn::Accepted => Self::Accepted,
            StatusColumn::Rejected => Self::Rejected,
        }
    }
}
