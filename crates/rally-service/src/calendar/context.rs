use std::collections::HashMap;

use rally_core::constants::DEFAULT_GROUP_COLOR;
use rally_db::model::event::Event;
use rally_db::model::subgroup::Subgroup;
use rally_db::store::EventStore;
use uuid::Uuid;

use crate::error::ServiceResult;

/// Request-scoped lookup from subgroup to display colour.
///
/// Built per request and passed explicitly; nothing is cached between calls.
#[derive(Debug, Clone, Default)]
pub struct DisplayContext {
    colors: HashMap<Uuid, String>,
}

impl DisplayContext {
    #[must_use]
    pub fn from_subgroups(subgroups: &[Subgroup]) -> Self {
        let colors = subgroups
            .iter()
            .filter_map(|subgroup| {
                subgroup
                    .color
                    .as_deref()
                    .map(str::trim)
                    .filter(|color| !color.is_empty())
                    .map(|color| (subgroup.id, color.to_owned()))
            })
            .collect();
        Self { colors }
    }

    /// ## Summary
    /// Builds the context from a club's subgroups.
    ///
    /// ## Errors
    /// Returns an error if the store fails.
    pub async fn load<S>(store: &S, club_id: Uuid) -> ServiceResult<Self>
    where
        S: EventStore + ?Sized,
    {
        let subgroups = store.subgroups(club_id).await?;
        Ok(Self::from_subgroups(&subgroups))
    }

    /// ## Summary
    /// The colour for `event`: its first target subgroup's colour, or the
    /// default when it targets no subgroup or one without a colour.
    #[must_use]
    pub fn group_key(&self, event: &Event) -> String {
        event
            .primary_subgroup()
            .and_then(|id| self.colors.get(&id))
            .map_or_else(|| DEFAULT_GROUP_COLOR.to_owned(), Clone::clone)
    }
}
