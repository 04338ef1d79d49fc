use chrono::{DateTime, NaiveDate, Utc};
use diesel::{pg::Pg, prelude::*};
use rally_core::types::InvitationStatus;
use uuid::Uuid;

use crate::db::enums::StatusColumn;
use crate::db::schema;

/// One member's invitation to one occurrence of an event.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Identifiable)]
#[diesel(table_name = schema::event_invitations)]
#[diesel(check_for_backend(Pg))]
pub struct Invitation {
    pub id: Uuid,
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub occurrence_date: NaiveDate,
    pub status: StatusColumn,
    pub responded_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Invitation {
    #[must_use]
    pub fn status(&self) -> InvitationStatus {
        self.status.into()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Insertable)]
#[diesel(table_name = schema::event_invitations)]
pub struct NewInvitation {
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub occurrence_date: NaiveDate,
    pub status: StatusColumn,
}

impl NewInvitation {
    #[must_use]
    pub const fn pending(event_id: Uuid, user_id: Uuid, occurrence_date: NaiveDate) -> Self {
        Self {
            event_id,
            user_id,
            occurrence_date,
            status: StatusColumn::Pending,
        }
    }
}

/// A member's answer for one occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvitationResponse {
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub occurrence_date: NaiveDate,
    pub status: InvitationStatus,
    pub responded_at: DateTime<Utc>,
}
