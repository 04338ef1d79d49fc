/// Lookahead used when materializing invitations and no override is configured.
pub const DEFAULT_LOOKAHEAD_WEEKS: u32 = 4;

/// Colour used for events that target the whole club or an unknown subgroup.
pub const DEFAULT_GROUP_COLOR: &str = "#6366f1";

/// Maximum number of candidates examined when looking for the next occurrence.
pub const NEXT_OCCURRENCE_CAP: u32 = 365;

/// Time of day assumed for occurrences without a start time, as hours.
pub const DEFAULT_OCCURRENCE_HOUR: u32 = 12;

/// Change-notification channel names shared by publishers and subscribers
pub const CHANNEL_PREFIX: &str = "rally";
pub const EVENTS_CHANNEL: &str = const_str::concat!(CHANNEL_PREFIX, "_events");
pub const INVITATIONS_CHANNEL: &str = const_str::concat!(CHANNEL_PREFIX, "_invitations");
