use crate::limits::*;

pub const ENV_SESSION_LENGTH_DAYS: &str = "TALLY_SESSION_LENGTH_DAYS";
pub const ENV_FALLBACK_ADMINS: &str = "TALLY_FALLBACK_ADMINS";

/// Process settings. Built once at startup, then shared read-only
/// (`Arc<Config>`) with whatever needs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Length of suggested session windows.
    pub session_length_days: i64,
    /// Lowercased emails treated as admins when the session source keeps no
    /// role for them.
    pub fallback_admins: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            session_length_days: DEFAULT_SESSION_LENGTH_DAYS,
            fallback_admins: Vec::new(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key → value source. Unset or unparseable values keep
    /// their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let session_length_days = lookup(ENV_SESSION_LENGTH_DAYS)
            .and_then(|s| s.trim().parse().ok())
            .filter(|d| (MIN_SESSION_LENGTH_DAYS..=MAX_SESSION_LENGTH_DAYS).contains(d))
            .unwrap_or(defaults.session_length_days);

        let fallback_admins = lookup(ENV_FALLBACK_ADMINS)
            .map(|raw| {
                raw.split(',')
                    .map(|email| email.trim().to_lowercase())
                    .filter(|email| !email.is_empty())
                    .collect()
            })
            .unwrap_or(defaults.fallback_admins);

        Self {
            session_length_days,
            fallback_admins,
        }
    }

    pub fn is_fallback_admin(&self, email: &str) -> bool {
        let email = email.trim().to_lowercase();
        self.fallback_admins.iter().any(|admin| *admin == email)
    }
}
