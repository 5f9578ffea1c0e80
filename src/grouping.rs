use std::collections::HashMap;

use crate::limits::GROUP_PREVIEW_LIMIT;
use crate::model::{ProductLookup, Session};
use crate::naming::resolve_display_name;

/// Grouping identity for a display name: trimmed and case-folded.
pub fn normalize_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Stable sort, furthest-future end date first.
pub fn sort_by_end_date_desc(sessions: &mut [Session]) {
    sessions.sort_by(|a, b| b.end_date.cmp(&a.end_date));
}

/// Sessions keyed by normalized display name, input order kept within a key.
/// Sessions that refer to no product are left out.
pub fn group_sessions_by_product(
    sessions: &[Session],
    lookup: &ProductLookup,
) -> HashMap<String, Vec<Session>> {
    let mut groups: HashMap<String, Vec<Session>> = HashMap::new();
    for session in sessions {
        if let Some(name) = resolve_display_name(session, lookup) {
            groups.entry(normalize_key(&name)).or_default().push(session.clone());
        }
    }
    groups
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductGroup {
    pub normalized_key: String,
    /// Name as written on the first session of the group.
    pub display_name: String,
    pub sessions: Vec<Session>,
}

impl ProductGroup {
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn is_multi_session(&self) -> bool {
        self.sessions.len() >= 2
    }

    /// Sessions to render: all of them when expanded, otherwise the first few.
    pub fn preview(&self, expanded: bool) -> &[Session] {
        if expanded {
            &self.sessions
        } else {
            &self.sessions[..self.sessions.len().min(GROUP_PREVIEW_LIMIT)]
        }
    }

    /// How many sessions a collapsed group hides.
    pub fn hidden_count(&self, expanded: bool) -> usize {
        self.len() - self.preview(expanded).len()
    }
}

/// Presentation split of a session list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupedSessions {
    /// Products with two or more sessions, in order of their latest session.
    pub multi: Vec<ProductGroup>,
    /// Lone sessions of a product plus sessions with no product at all.
    pub singles: Vec<Session>,
}

/// Sort globally by end date, then split into multi-session groups and
/// ungrouped singles.
pub fn partition_sessions(sessions: &[Session], lookup: &ProductLookup) -> GroupedSessions {
    let mut sorted = sessions.to_vec();
    sort_by_end_date_desc(&mut sorted);

    let mut groups: Vec<ProductGroup> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut singles = Vec::new();

    for session in sorted {
        let Some(name) = resolve_display_name(&session, lookup) else {
            singles.push(session);
            continue;
        };
        let key = normalize_key(&name);
        match index.get(&key) {
            Some(&pos) => groups[pos].sessions.push(session),
            None => {
                index.insert(key.clone(), groups.len());
                groups.push(ProductGroup {
                    normalized_key: key,
                    display_name: name,
                    sessions: vec![session],
                });
            }
        }
    }

    let mut multi = Vec::new();
    for group in groups {
        if group.is_multi_session() {
            multi.push(group);
        } else {
            singles.extend(group.sessions);
        }
    }
    sort_by_end_date_desc(&mut singles);

    GroupedSessions { multi, singles }
}
