/// Number of entries in the name-derived color palette.
pub const PALETTE_SIZE: usize = 50;

/// Sessions shown for a collapsed multi-session group.
pub const GROUP_PREVIEW_LIMIT: usize = 3;

/// Length of a suggested session window when none is configured.
pub const DEFAULT_SESSION_LENGTH_DAYS: i64 = 14;

pub const MIN_SESSION_LENGTH_DAYS: i64 = 1;

/// Upper bound on a single voting window (a leap year).
pub const MAX_SESSION_LENGTH_DAYS: i64 = 366;

pub const MAX_NAME_LEN: usize = 256;
