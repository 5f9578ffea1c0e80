use super::*;
use crate::conflict::ConflictKind;
use crate::dates::{add_days, parse_local_date};

use async_trait::async_trait;

fn d(s: &str) -> CalendarDate {
    parse_local_date(s)
}

fn product(id: &str, name: &str) -> Product {
    Product {
        id: id.into(),
        name: name.into(),
        color_hex: None,
    }
}

fn stored(id: &str, product_id: &str, start: &str, end: &str) -> Session {
    Session {
        id: Some(id.into()),
        title: None,
        product_id: Some(product_id.into()),
        product_name: None,
        start_date: d(start),
        end_date: d(end),
    }
}

fn new_session(product_id: &str, start: &str, end: &str) -> NewSession {
    NewSession {
        product_id: product_id.into(),
        title: None,
        start_date: d(start),
        end_date: d(end),
    }
}

/// Product P with an active session [2025-01-01, 2025-01-14].
fn planner_with_active_session() -> SessionPlanner<InMemorySource> {
    let source = InMemorySource::new();
    source.add_product(product("P", "Catalyst Cloud"));
    source.add_session(stored("s1", "P", "2025-01-01", "2025-01-14"));
    SessionPlanner::new(Arc::new(source), Arc::new(Config::default()))
}

// ── Conflict gating ─────────────────────────────────────

#[tokio::test]
async fn overlap_with_active_session_rejected() {
    let planner = planner_with_active_session();
    let today = d("2025-01-05");

    let err = planner
        .create_session(new_session("P", "2025-01-10", "2025-01-24"), today)
        .await
        .unwrap_err();
    match err {
        PlanError::Conflict(c) => {
            assert_eq!(c.kind, ConflictKind::Overlap);
            assert_eq!(c.conflicting.end_date, d("2025-01-14"));
        }
        other => panic!("expected conflict, got {other}"),
    }
}

#[tokio::test]
async fn day_after_active_end_accepted() {
    let planner = planner_with_active_session();
    let today = d("2025-01-05");

    let session = planner
        .create_session(new_session("P", "2025-01-15", "2025-01-29"), today)
        .await
        .unwrap();
    assert!(session.id.is_some());
    assert_eq!(planner.source().sessions_for_product("P").await.unwrap().len(), 2);
}

#[tokio::test]
async fn duplicate_window_rejected_regardless_of_time() {
    let source = InMemorySource::new();
    source.add_product(product("P", "Atlas"));
    source.add_session(stored("s1", "P", "2025-02-01T00:00:00", "2025-02-14T00:00:00"));
    let planner = SessionPlanner::new(Arc::new(source), Arc::new(Config::default()));

    // Long after the window, so nothing is active
    let today = d("2025-06-01");
    let err = planner
        .check_candidate("P", d("2025-02-01T23:59:59"), d("2025-02-14T23:59:59"), today)
        .await
        .unwrap_err();
    assert!(matches!(err, PlanError::Conflict(ref c) if c.kind == ConflictKind::Duplicate));
    assert!(err.to_string().contains("2025-02-01 to 2025-02-14"));
}

#[tokio::test]
async fn check_does_not_write() {
    let planner = planner_with_active_session();
    let window = planner
        .check_candidate("P", d("2025-03-01"), d("2025-03-15"), d("2025-01-05"))
        .await
        .unwrap();
    assert_eq!(window.product_id.as_deref(), Some("P"));
    assert_eq!(planner.source().sessions().await.unwrap().len(), 1);
}

#[tokio::test]
async fn fresh_product_always_passes() {
    let source = InMemorySource::new();
    source.add_product(product("Q", "Beacon"));
    let planner = SessionPlanner::new(Arc::new(source), Arc::new(Config::default()));
    let result = planner
        .check_candidate("Q", d("2025-01-01"), d("2025-01-14"), d("2025-01-01"))
        .await;
    assert!(result.is_ok());
}

// ── Validation ──────────────────────────────────────────

#[tokio::test]
async fn end_must_be_after_start() {
    let planner = planner_with_active_session();
    for (start, end) in [("2025-03-10", "2025-03-10"), ("2025-03-10", "2025-03-01")] {
        let err = planner
            .check_candidate("P", d(start), d(end), d("2025-01-05"))
            .await
            .unwrap_err();
        assert!(matches!(err, PlanError::InvalidWindow { .. }), "{start}..{end}");
    }
}

#[tokio::test]
async fn invalid_window_message_shows_dates() {
    let planner = planner_with_active_session();
    let err = planner
        .check_candidate("P", d("2025-03-10"), d("2025-03-01"), d("2025-01-05"))
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "invalid session window: 2025-03-10 to 2025-03-01; end must be after start"
    );

    let err = planner
        .check_candidate("P", CalendarDate::new(2025, 2, 30), d("2025-03-10"), d("2025-01-05"))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("2025-02-30 to 2025-03-10"));
}

#[tokio::test]
async fn invalid_calendar_date_rejected() {
    let planner = planner_with_active_session();
    let bogus = CalendarDate::new(2025, 2, 30);
    let err = planner
        .check_candidate("P", bogus, d("2025-03-10"), d("2025-01-05"))
        .await
        .unwrap_err();
    assert!(matches!(err, PlanError::InvalidWindow { .. }));
}

#[tokio::test]
async fn overly_long_window_rejected() {
    let planner = planner_with_active_session();
    let start = d("2025-03-01");
    let end = add_days(start, MAX_SESSION_LENGTH_DAYS + 1);
    let err = planner
        .check_candidate("P", start, end, d("2025-01-05"))
        .await
        .unwrap_err();
    assert!(matches!(err, PlanError::LimitExceeded(_)));
}

#[tokio::test]
async fn long_title_rejected() {
    let planner = planner_with_active_session();
    let mut new = new_session("P", "2025-03-01", "2025-03-15");
    new.title = Some("x".repeat(MAX_NAME_LEN + 1));
    let err = planner.create_session(new, d("2025-01-05")).await.unwrap_err();
    assert!(err.to_string().contains("title too long"));
}

#[tokio::test]
async fn unknown_product_rejected() {
    let planner = planner_with_active_session();
    let err = planner
        .check_candidate("nope", d("2025-03-01"), d("2025-03-15"), d("2025-01-05"))
        .await
        .unwrap_err();
    assert!(matches!(err, PlanError::UnknownProduct(ref id) if id == "nope"));
}

// ── Concurrent creates ──────────────────────────────────

/// Yields before each insert so concurrent creates interleave between the
/// conflict check and the write.
struct YieldingSource(InMemorySource);

#[async_trait]
impl SessionSource for YieldingSource {
    async fn products(&self) -> Result<Vec<Product>, SourceError> {
        self.0.products().await
    }

    async fn product(&self, id: &str) -> Result<Option<Product>, SourceError> {
        self.0.product(id).await
    }

    async fn sessions(&self) -> Result<Vec<Session>, SourceError> {
        self.0.sessions().await
    }

    async fn sessions_for_product(&self, product_id: &str) -> Result<Vec<Session>, SourceError> {
        self.0.sessions_for_product(product_id).await
    }

    async fn active_session(
        &self,
        product_id: &str,
        today: CalendarDate,
    ) -> Result<Option<Session>, SourceError> {
        self.0.active_session(product_id, today).await
    }

    async fn insert_session(&self, session: NewSession) -> Result<Session, SourceError> {
        tokio::task::yield_now().await;
        self.0.insert_session(session).await
    }

    async fn admin_role(&self, email: &str) -> Result<Option<bool>, SourceError> {
        self.0.admin_role(email).await
    }
}

fn yielding_planner() -> SessionPlanner<YieldingSource> {
    let inner = InMemorySource::new();
    inner.add_product(product("P", "Atlas"));
    inner.add_product(product("Q", "Beacon"));
    SessionPlanner::new(Arc::new(YieldingSource(inner)), Arc::new(Config::default()))
}

#[tokio::test]
async fn concurrent_identical_creates_store_one_session() {
    let planner = yielding_planner();
    let today = d("2025-01-05");

    let (a, b) = tokio::join!(
        planner.create_session(new_session("P", "2025-03-01", "2025-03-15"), today),
        planner.create_session(new_session("P", "2025-03-01", "2025-03-15"), today),
    );
    assert_eq!(a.is_ok() as usize + b.is_ok() as usize, 1);
    let err = a.err().or(b.err()).unwrap();
    assert!(matches!(err, PlanError::Conflict(ref c) if c.kind == ConflictKind::Duplicate));
    assert_eq!(planner.source().sessions_for_product("P").await.unwrap().len(), 1);
}

#[tokio::test]
async fn concurrent_creates_on_different_products_both_land() {
    let planner = yielding_planner();
    let today = d("2025-01-05");

    let (a, b) = tokio::join!(
        planner.create_session(new_session("P", "2025-03-01", "2025-03-15"), today),
        planner.create_session(new_session("Q", "2025-03-01", "2025-03-15"), today),
    );
    a.unwrap();
    b.unwrap();
    assert_eq!(planner.source().sessions().await.unwrap().len(), 2);
}

// ── Admin gate ──────────────────────────────────────────

fn planner_with_admins(fallback: &[&str]) -> SessionPlanner<InMemorySource> {
    let source = InMemorySource::new();
    source.add_product(product("P", "Atlas"));
    source.set_role("root@example.com", true);
    source.set_role("demoted@example.com", false);
    let config = Config {
        fallback_admins: fallback.iter().map(|e| e.to_string()).collect(),
        ..Config::default()
    };
    SessionPlanner::new(Arc::new(source), Arc::new(config))
}

#[tokio::test]
async fn source_role_wins_over_fallback_list() {
    let planner = planner_with_admins(&["demoted@example.com", "ops@example.com"]);
    assert!(planner.is_admin("root@example.com").await.unwrap());
    assert!(!planner.is_admin("demoted@example.com").await.unwrap());
    // No role in the source: the configured list decides
    assert!(planner.is_admin("OPS@example.com").await.unwrap());
    assert!(!planner.is_admin("guest@example.com").await.unwrap());
}

#[tokio::test]
async fn non_admin_cannot_create() {
    let planner = planner_with_admins(&["ops@example.com"]);
    let today = d("2025-01-05");

    let err = planner
        .create_session_as("guest@example.com", new_session("P", "2025-03-01", "2025-03-15"), today)
        .await
        .unwrap_err();
    assert!(matches!(err, PlanError::Forbidden(ref who) if who == "guest@example.com"));
    assert!(planner.source().sessions().await.unwrap().is_empty());

    planner
        .create_session_as("ops@example.com", new_session("P", "2025-03-01", "2025-03-15"), today)
        .await
        .unwrap();
    assert_eq!(planner.source().sessions().await.unwrap().len(), 1);
}

#[tokio::test]
async fn admin_check_surfaces_source_errors() {
    struct RolesDown;

    #[async_trait]
    impl SessionSource for RolesDown {
        async fn products(&self) -> Result<Vec<Product>, SourceError> {
            Ok(Vec::new())
        }
        async fn product(&self, _id: &str) -> Result<Option<Product>, SourceError> {
            Ok(None)
        }
        async fn sessions(&self) -> Result<Vec<Session>, SourceError> {
            Ok(Vec::new())
        }
        async fn sessions_for_product(&self, _id: &str) -> Result<Vec<Session>, SourceError> {
            Ok(Vec::new())
        }
        async fn active_session(
            &self,
            _id: &str,
            _today: CalendarDate,
        ) -> Result<Option<Session>, SourceError> {
            Ok(None)
        }
        async fn insert_session(&self, _session: NewSession) -> Result<Session, SourceError> {
            Err(SourceError::Rejected("read-only".into()))
        }
        async fn admin_role(&self, _email: &str) -> Result<Option<bool>, SourceError> {
            Err(SourceError::Unavailable("directory offline".into()))
        }
    }

    let config = Config {
        fallback_admins: vec!["ops@example.com".into()],
        ..Config::default()
    };
    let planner = SessionPlanner::new(Arc::new(RolesDown), Arc::new(config));
    let err = planner.is_admin("ops@example.com").await.unwrap_err();
    assert!(matches!(err, PlanError::Source(SourceError::Unavailable(_))));
}

// ── Suggestions ─────────────────────────────────────────

#[tokio::test]
async fn suggestion_follows_active_session() {
    let planner = planner_with_active_session();
    let today = d("2025-01-05");
    let window = planner.suggest_window("P", today).await.unwrap();
    assert_eq!(window.start_date, d("2025-01-15"));
    assert_eq!(window.end_date, d("2025-01-29"));

    // The suggestion itself passes the gate
    planner
        .check_candidate("P", window.start_date, window.end_date, today)
        .await
        .unwrap();
}

#[tokio::test]
async fn suggestion_uses_configured_length() {
    let source = InMemorySource::new();
    source.add_product(product("P", "Atlas"));
    let config = Config {
        session_length_days: 7,
        ..Config::default()
    };
    let planner = SessionPlanner::new(Arc::new(source), Arc::new(config));
    let window = planner.suggest_window("P", d("2025-01-30")).await.unwrap();
    assert_eq!(window.start_date, d("2025-01-30"));
    assert_eq!(window.end_date, d("2025-02-06"));
}

// ── Board ───────────────────────────────────────────────

#[tokio::test]
async fn board_groups_sessions_by_product() {
    let source = InMemorySource::new();
    source.add_product(product("p1", "Alpha"));
    source.add_product(product("p2", "Beta"));
    source.add_session(stored("1", "p1", "2025-01-01", "2025-01-14"));
    source.add_session(stored("2", "p1", "2025-01-15", "2025-01-29"));
    source.add_session(stored("3", "p2", "2025-01-01", "2025-01-14"));
    let planner = SessionPlanner::new(Arc::new(source), Arc::new(Config::default()));

    let board = planner.board().await.unwrap();
    assert_eq!(board.groups.len(), 1);
    assert_eq!(board.groups[0].key, "alpha");
    assert_eq!(board.groups[0].preview[0].id.as_deref(), Some("2"));
    assert_eq!(board.singles.len(), 1);
    assert_eq!(board.singles[0].product_label, "Beta");
}

// ── Source failures ─────────────────────────────────────

struct DownSource;

#[async_trait]
impl SessionSource for DownSource {
    async fn products(&self) -> Result<Vec<Product>, SourceError> {
        Err(SourceError::Unavailable("offline".into()))
    }

    async fn product(&self, _id: &str) -> Result<Option<Product>, SourceError> {
        Err(SourceError::Unavailable("offline".into()))
    }

    async fn sessions(&self) -> Result<Vec<Session>, SourceError> {
        Err(SourceError::Unavailable("offline".into()))
    }

    async fn sessions_for_product(&self, _product_id: &str) -> Result<Vec<Session>, SourceError> {
        Err(SourceError::Unavailable("offline".into()))
    }

    async fn active_session(
        &self,
        _product_id: &str,
        _today: CalendarDate,
    ) -> Result<Option<Session>, SourceError> {
        Err(SourceError::Unavailable("offline".into()))
    }

    async fn insert_session(&self, _session: NewSession) -> Result<Session, SourceError> {
        Err(SourceError::Unavailable("offline".into()))
    }
}

#[tokio::test]
async fn source_errors_propagate() {
    let planner = SessionPlanner::new(Arc::new(DownSource), Arc::new(Config::default()));
    let err = planner.board().await.unwrap_err();
    assert!(matches!(err, PlanError::Source(SourceError::Unavailable(_))));

    let err = planner
        .check_candidate("P", d("2025-03-01"), d("2025-03-15"), d("2025-01-05"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "session source unavailable: offline");
}

#[tokio::test]
async fn validation_runs_before_source() {
    // A bad window is rejected without touching the (broken) source
    let planner = SessionPlanner::new(Arc::new(DownSource), Arc::new(Config::default()));
    let err = planner
        .check_candidate("P", d("2025-03-15"), d("2025-03-01"), d("2025-01-05"))
        .await
        .unwrap_err();
    assert!(matches!(err, PlanError::InvalidWindow { .. }));
}
