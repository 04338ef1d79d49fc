//! Table-change notifications.
//!
//! Subscribers receive the raw broadcast receiver so they can tell when they
//! fell behind (`RecvError::Lagged`) and fall back to a full reload.

use std::collections::HashMap;
use std::sync::Mutex;

use rally_core::constants::{EVENTS_CHANNEL, INVITATIONS_CHANNEL};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Default number of notices buffered per scope before slow receivers lag.
pub const FEED_CAPACITY: usize = 100;

/// Who a notice concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "id")]
pub enum ChangeScope {
    Club(Uuid),
    User(Uuid),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangedTable {
    Events,
    Invitations,
}

impl ChangedTable {
    /// Notification channel name for this table.
    #[must_use]
    pub const fn channel(self) -> &'static str {
        match self {
            Self::Events => EVENTS_CHANNEL,
            Self::Invitations => INVITATIONS_CHANNEL,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeNotice {
    pub scope: ChangeScope,
    pub table: ChangedTable,
    /// The changed row, when known.
    pub record_id: Option<Uuid>,
}

impl ChangeNotice {
    #[must_use]
    pub const fn events(club_id: Uuid) -> Self {
        Self {
            scope: ChangeScope::Club(club_id),
            table: ChangedTable::Events,
            record_id: None,
        }
    }

    #[must_use]
    pub const fn invitations(user_id: Uuid) -> Self {
        Self {
            scope: ChangeScope::User(user_id),
            table: ChangedTable::Invitations,
            record_id: None,
        }
    }

    #[must_use]
    pub const fn with_record(mut self, record_id: Uuid) -> Self {
        self.record_id = Some(record_id);
        self
    }
}

/// Publish/subscribe for table changes, scoped per club or user.
pub trait ChangeFeed: Send + Sync {
    /// Sends `notice` to current subscribers of its scope and returns how many
    /// received it. Notices with no subscriber are dropped.
    fn publish(&self, notice: ChangeNotice) -> usize;

    fn subscribe(&self, scope: ChangeScope) -> broadcast::Receiver<ChangeNotice>;
}

/// In-process feed backed by one tokio broadcast channel per scope.
#[derive(Debug)]
pub struct MemoryChangeFeed {
    channels: Mutex<HashMap<ChangeScope, broadcast::Sender<ChangeNotice>>>,
    capacity: usize,
}

impl MemoryChangeFeed {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(FEED_CAPACITY)
    }

    /// ## Summary
    /// A feed buffering `capacity` notices per scope (at least one).
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            channels: Mutex::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    fn sender(&self, scope: ChangeScope) -> broadcast::Sender<ChangeNotice> {
        let mut channels = match self.channels.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                self.channels.clear_poison();
                poisoned.into_inner()
            }
        };
        channels
            .entry(scope)
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .clone()
    }
}

impl Default for MemoryChangeFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeFeed for MemoryChangeFeed {
    fn publish(&self, notice: ChangeNotice) -> usize {
        let channel = notice.table.channel();
        let scope = notice.scope;
        // No receivers is fine
        let delivered = self.sender(scope).send(notice).unwrap_or(0);
        tracing::trace!(channel, ?scope, delivered, "Published change notice");
        delivered
    }

    fn subscribe(&self, scope: ChangeScope) -> broadcast::Receiver<ChangeNotice> {
        self.sender(scope).subscribe()
    }
}
