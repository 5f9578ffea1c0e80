// ── Planner metrics ─────────────────────────────────────────────
//
// Recorded through the `metrics` facade. The embedding process installs the
// recorder; with none installed these are no-ops.

/// Counter: sessions created through the planner.
pub const SESSIONS_CREATED_TOTAL: &str = "tally_sessions_created_total";

/// Counter: candidates rejected by the conflict check. Labels: kind.
pub const SESSION_CONFLICTS_TOTAL: &str = "tally_session_conflicts_total";

/// Counter: candidates rejected by window validation. Labels: reason.
pub const INVALID_WINDOWS_TOTAL: &str = "tally_invalid_windows_total";

/// Counter: failed calls to the session source.
pub const SOURCE_ERRORS_TOTAL: &str = "tally_source_errors_total";

/// Histogram: time to build a board, in seconds.
pub const BOARD_BUILD_DURATION_SECONDS: &str = "tally_board_build_duration_seconds";

/// Gauge: sessions on the most recently built board.
pub const BOARD_SESSIONS: &str = "tally_board_sessions";

