//! Change notifications and the invitation resync they drive.

pub mod feed;
pub mod reload;

pub use feed::{ChangeFeed, ChangeNotice, ChangeScope, ChangedTable, MemoryChangeFeed};
pub use reload::{InvitationSync, SyncSummary};
