use std::collections::BTreeMap;

use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::model::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    Unavailable(String),
    Rejected(String),
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceError::Unavailable(msg) => write!(f, "session source unavailable: {msg}"),
            SourceError::Rejected(msg) => write!(f, "session source rejected write: {msg}"),
        }
    }
}

impl std::error::Error for SourceError {}

/// A session the planner has cleared for creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSession {
    pub product_id: String,
    pub title: Option<String>,
    pub start_date: CalendarDate,
    pub end_date: CalendarDate,
}

/// The persistence collaborator. Owns products and sessions and decides which
/// session is currently active for a product.
#[async_trait]
pub trait SessionSource: Send + Sync {
    async fn products(&self) -> Result<Vec<Product>, SourceError>;

    async fn product(&self, id: &str) -> Result<Option<Product>, SourceError>;

    async fn sessions(&self) -> Result<Vec<Session>, SourceError>;

    async fn sessions_for_product(&self, product_id: &str) -> Result<Vec<Session>, SourceError>;

    /// Session whose window contains `today`, if any.
    async fn active_session(
        &self,
        product_id: &str,
        today: CalendarDate,
    ) -> Result<Option<Session>, SourceError>;

    /// Store the session and return it with its assigned id.
    async fn insert_session(&self, session: NewSession) -> Result<Session, SourceError>;

    /// Whether `email` holds the admin role, or `None` when the source keeps
    /// no role for that user.
    async fn admin_role(&self, _email: &str) -> Result<Option<bool>, SourceError> {
        Ok(None)
    }
}

/// Everything a source holds, as loaded from or dumped to JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub sessions: Vec<Session>,
    /// Lowercased email → holds the admin role.
    #[serde(default)]
    pub roles: BTreeMap<String, bool>,
}

/// In-process source. Sessions without an id get a fresh ULID on load.
pub struct InMemorySource {
    products: DashMap<String, Product>,
    /// session id → session
    sessions: DashMap<String, Session>,
    /// lowercased email → admin
    roles: DashMap<String, bool>,
}

fn role_key(email: &str) -> String {
    email.trim().to_lowercase()
}

impl InMemorySource {
    pub fn new() -> Self {
        Self {
            products: DashMap::new(),
            sessions: DashMap::new(),
            roles: DashMap::new(),
        }
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let source = Self::new();
        for product in snapshot.products {
            source.add_product(product);
        }
        for session in snapshot.sessions {
            source.add_session(session);
        }
        for (email, admin) in snapshot.roles {
            source.set_role(&email, admin);
        }
        source
    }

    pub fn set_role(&self, email: &str, admin: bool) {
        self.roles.insert(role_key(email), admin);
    }

    pub fn add_product(&self, product: Product) {
        self.products.insert(product.id.clone(), product);
    }

    /// Store a session as-is, minting an id if it has none.
    pub fn add_session(&self, mut session: Session) -> String {
        let id = match &session.id {
            Some(id) if !id.is_empty() => id.clone(),
            _ => Ulid::new().to_string(),
        };
        session.id = Some(id.clone());
        self.sessions.insert(id.clone(), session);
        id
    }

    pub fn snapshot(&self) -> Snapshot {
        let mut products: Vec<Product> = self.products.iter().map(|e| e.value().clone()).collect();
        products.sort_by(|a, b| a.id.cmp(&b.id));
        let mut sessions: Vec<Session> = self.sessions.iter().map(|e| e.value().clone()).collect();
        sessions.sort_by(|a, b| a.id.cmp(&b.id));
        let roles = self
            .roles
            .iter()
            .map(|e| (e.key().clone(), *e.value()))
            .collect();
        Snapshot {
            products,
            sessions,
            roles,
        }
    }

    fn for_product(&self, product_id: &str) -> Vec<Session> {
        let mut sessions: Vec<Session> = self
            .sessions
            .iter()
            .filter(|e| e.value().product_id.as_deref() == Some(product_id))
            .map(|e| e.value().clone())
            .collect();
        sessions.sort_by_key(|s| s.start_date);
        sessions
    }
}

impl Default for InMemorySource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionSource for InMemorySource {
    async fn products(&self) -> Result<Vec<Product>, SourceError> {
        Ok(self.products.iter().map(|e| e.value().clone()).collect())
    }

    async fn product(&self, id: &str) -> Result<Option<Product>, SourceError> {
        Ok(self.products.get(id).map(|e| e.value().clone()))
    }

    async fn sessions(&self) -> Result<Vec<Session>, SourceError> {
        Ok(self.sessions.iter().map(|e| e.value().clone()).collect())
    }

    async fn sessions_for_product(&self, product_id: &str) -> Result<Vec<Session>, SourceError> {
        Ok(self.for_product(product_id))
    }

    async fn active_session(
        &self,
        product_id: &str,
        today: CalendarDate,
    ) -> Result<Option<Session>, SourceError> {
        Ok(self
            .for_product(product_id)
            .into_iter()
            .filter(|s| s.window().contains(today))
            .max_by_key(|s| s.end_date))
    }

    async fn insert_session(&self, session: NewSession) -> Result<Session, SourceError> {
        if !self.products.contains_key(&session.product_id) {
            return Err(SourceError::Rejected(format!(
                "unknown product {}",
                session.product_id
            )));
        }
        let stored = Session {
            id: None,
            title: session.title,
            product_id: Some(session.product_id),
            product_name: None,
            start_date: session.start_date,
            end_date: session.end_date,
        };
        let id = self.add_session(stored);
        self.sessions
            .get(&id)
            .map(|e| e.value().clone())
            .ok_or_else(|| SourceError::Unavailable(format!("session {id} vanished after insert")))
    }

    async fn admin_role(&self, email: &str) -> Result<Option<bool>, SourceError> {
        Ok(self.roles.get(&role_key(email)).map(|e| *e.value()))
    }
}
