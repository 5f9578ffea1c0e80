use std::collections::HashMap;

use serde::Serialize;

use crate::color::get_product_color;
use crate::grouping::{partition_sessions, ProductGroup};
use crate::model::*;
use crate::naming::{get_display_product_name, product_label, resolve_display_name};

/// Presentation-ready view of every session: multi-session product groups
/// first, then the ungrouped list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Board {
    pub groups: Vec<BoardGroup>,
    pub singles: Vec<BoardEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardGroup {
    pub key: String,
    pub display_name: String,
    pub color: ColorSet,
    pub total: usize,
    /// Sessions shown while collapsed.
    pub preview: Vec<Session>,
    /// Sessions revealed on expand.
    pub hidden: Vec<Session>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardEntry {
    pub session: Session,
    /// Product display name, or the "No Product" label.
    pub product_label: String,
    pub color: ColorSet,
}

impl Board {
    pub fn session_count(&self) -> usize {
        self.groups.iter().map(|g| g.total).sum::<usize>() + self.singles.len()
    }
}

/// Build the board from raw collaborator records.
pub fn build_board(products: &[Product], sessions: &[Session]) -> Board {
    let lookup: ProductLookup = products
        .iter()
        .map(|p| (p.id.clone(), p.name.clone()))
        .collect();
    let custom_colors: HashMap<&str, &str> = products
        .iter()
        .filter_map(|p| Some((p.id.as_str(), p.color_hex.as_deref()?)))
        .collect();
    let custom_color_of = |session: &Session| {
        session
            .product_id
            .as_deref()
            .and_then(|id| custom_colors.get(id).copied())
    };

    let parted = partition_sessions(sessions, &lookup);

    let groups = parted
        .multi
        .iter()
        .map(|group| {
            // Legacy free-text rows carry no product id; take the color from
            // the newest session that links to a known product.
            let custom_hex = group
                .sessions
                .iter()
                .find(|s| s.product_id.as_deref().is_some_and(|id| lookup.contains_key(id)))
                .and_then(custom_color_of);
            board_group(group, custom_hex)
        })
        .collect();

    let singles = parted
        .singles
        .into_iter()
        .map(|session| {
            let resolved = resolve_display_name(&session, &lookup);
            let display_name = get_display_product_name(&session, &lookup);
            BoardEntry {
                product_label: product_label(resolved.as_deref()).to_string(),
                color: get_product_color(Some(display_name.as_str()), custom_color_of(&session)),
                session,
            }
        })
        .collect();

    Board { groups, singles }
}

fn board_group(group: &ProductGroup, custom_hex: Option<&str>) -> BoardGroup {
    let preview = group.preview(false).to_vec();
    let hidden = group.sessions[preview.len()..].to_vec();
    BoardGroup {
        key: group.normalized_key.clone(),
        display_name: group.display_name.clone(),
        color: get_product_color(Some(group.display_name.as_str()), custom_hex),
        total: group.len(),
        preview,
        hidden,
    }
}
