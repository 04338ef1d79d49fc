use diesel::{pg::Pg, prelude::*};
use uuid::Uuid;

use crate::db::schema;

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Identifiable)]
#[diesel(table_name = schema::subgroups)]
#[diesel(check_for_backend(Pg))]
pub struct Subgroup {
    pub id: Uuid,
    pub club_id: Uuid,
    pub name: String,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::subgroups)]
pub struct NewSubgroup {
    pub id: Uuid,
    pub club_id: Uuid,
    pub name: String,
    pub color: Option<String>,
}

impl NewSubgroup {
    #[must_use]
    pub fn new(club_id: Uuid, name: impl Into<String>, color: Option<&str>) -> Self {
        Self {
            id: Uuid::now_v7(),
            club_id,
            name: name.into(),
            color: color.map(str::to_owned),
        }
    }

    #[must_use]
    pub fn into_subgroup(self) -> Subgroup {
        Subgroup {
            id: self.id,
            club_id: self.club_id,
            name: self.name,
            color: self.color,
        }
    }
}
