use crate::hash::bucket;
use crate::model::{ProductLookup, Session};

/// Label for a session with no resolvable product. Only for display; the
/// resolver itself reports that case as `None`.
pub const NO_PRODUCT_LABEL: &str = "No Product";

const DEFAULT_SEED: &str = "default-product";

/// Plausible placeholder names for sessions that carry no product data.
pub const FALLBACK_PRODUCT_NAMES: [&str; 20] = [
    "Catalyst Cloud",
    "Nimbus Insights",
    "Atlas Workspace",
    "Beacon Analytics",
    "Harbor Connect",
    "Summit Planner",
    "Lumen Reports",
    "Vertex Studio",
    "Orbit Mobile",
    "Cascade Billing",
    "Meridian CRM",
    "Pioneer Portal",
    "Quartz Dashboards",
    "Relay Messaging",
    "Sierra Scheduling",
    "Tandem Collaboration",
    "Unity Admin",
    "Vista Marketplace",
    "Willow Onboarding",
    "Zenith Search",
];

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// The product name a session really has: its own free-text name, then the
/// lookup entry for its product id. `None` when neither is usable.
pub fn resolve_product_name(session: &Session, lookup: &ProductLookup) -> Option<String> {
    if let Some(name) = non_blank(session.product_name.as_deref()) {
        return Some(name.to_string());
    }
    let product_id = session.product_id.as_deref()?;
    non_blank(lookup.get(product_id).map(String::as_str)).map(str::to_string)
}

/// Placeholder name derived from `seed`. Same seed, same name.
pub fn fallback_product_name(seed: &str) -> &'static str {
    FALLBACK_PRODUCT_NAMES[bucket(seed, FALLBACK_PRODUCT_NAMES.len())]
}

fn fallback_seed(session: &Session) -> &str {
    [&session.product_id, &session.id, &session.title]
        .into_iter()
        .filter_map(|field| field.as_deref())
        .find(|v| !v.is_empty())
        .unwrap_or(DEFAULT_SEED)
}

/// Display name of the product a session refers to. An id the lookup no
/// longer knows still names a product, through the placeholder seeded by that
/// id. `None` only when the session carries no product reference at all.
pub fn resolve_display_name(session: &Session, lookup: &ProductLookup) -> Option<String> {
    resolve_product_name(session, lookup).or_else(|| {
        session
            .product_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .map(|id| fallback_product_name(id).to_string())
    })
}

/// User-facing product name for a session. Never empty.
pub fn get_display_product_name(session: &Session, lookup: &ProductLookup) -> String {
    resolve_display_name(session, lookup)
        .unwrap_or_else(|| fallback_product_name(fallback_seed(session)).to_string())
}

/// Converts a resolver result to text at the display boundary.
pub fn product_label(resolved: Option<&str>) -> &str {
    resolved.unwrap_or(NO_PRODUCT_LABEL)
}
