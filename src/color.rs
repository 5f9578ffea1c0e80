//! Deterministic color identity for products.
//!
//! A product either carries an explicit hex color, from which a full set is
//! derived with a contrast-safe text color, or gets a palette entry chosen by
//! hashing its normalized name. The palette and hash are fixed constants.

use palette::{LinSrgb, Srgb};

use crate::hash::bucket;
use crate::limits::PALETTE_SIZE;
use crate::model::{ColorSet, Product};

/// Text color on light backgrounds.
pub const DARK_TEXT: &str = "#111827";
/// Text color on dark backgrounds.
pub const LIGHT_TEXT: &str = "#FFFFFF";

/// Backgrounds brighter than this get [`DARK_TEXT`].
const LUMINANCE_THRESHOLD: f64 = 0.6;
const BORDER_DARKEN: f64 = 0.20;
const HOVER_DARKEN: f64 = 0.05;
const CUSTOM_BADGE_ALPHA: f64 = 0.15;
/// 8-digit hex alpha suffix (~10%) for palette badges.
const PALETTE_BADGE_ALPHA: &str = "1A";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteEntry {
    pub background: &'static str,
    pub text: &'static str,
    pub border: &'static str,
}

impl PaletteEntry {
    const fn new(background: &'static str, text: &'static str, border: &'static str) -> Self {
        Self {
            background,
            text,
            border,
        }
    }
}

pub const PALETTE: [PaletteEntry; PALETTE_SIZE] = [
    PaletteEntry::new("#FEE2E2", "#991B1B", "#FCA5A5"), // red
    PaletteEntry::new("#FFEDD5", "#9A3412", "#FDBA74"), // orange
    PaletteEntry::new("#FEF3C7", "#92400E", "#FCD34D"), // amber
    PaletteEntry::new("#FEF9C3", "#854D0E", "#FDE047"), // yellow
    PaletteEntry::new("#ECFCCB", "#3F6212", "#BEF264"), // lime
    PaletteEntry::new("#DCFCE7", "#166534", "#86EFAC"), // green
    PaletteEntry::new("#D1FAE5", "#065F46", "#6EE7B7"), // emerald
    PaletteEntry::new("#CCFBF1", "#115E59", "#5EEAD4"), // teal
    PaletteEntry::new("#CFFAFE", "#155E75", "#67E8F9"), // cyan
    PaletteEntry::new("#E0F2FE", "#075985", "#7DD3FC"), // sky
    PaletteEntry::new("#DBEAFE", "#1E40AF", "#93C5FD"), // blue
    PaletteEntry::new("#E0E7FF", "#3730A3", "#A5B4FC"), // indigo
    PaletteEntry::new("#EDE9FE", "#5B21B6", "#C4B5FD"), // violet
    PaletteEntry::new("#F3E8FF", "#6B21A8", "#D8B4FE"), // purple
    PaletteEntry::new("#FAE8FF", "#86198F", "#F0ABFC"), // fuchsia
    PaletteEntry::new("#FCE7F3", "#9D174D", "#F9A8D4"), // pink
    PaletteEntry::new("#FFE4E6", "#9F1239", "#FDA4AF"), // rose
    PaletteEntry::new("#FECACA", "#7F1D1D", "#F87171"), // red
    PaletteEntry::new("#FED7AA", "#7C2D12", "#FB923C"), // orange
    PaletteEntry::new("#FDE68A", "#78350F", "#FBBF24"), // amber
    PaletteEntry::new("#FEF08A", "#713F12", "#FACC15"), // yellow
    PaletteEntry::new("#D9F99D", "#365314", "#A3E635"), // lime
    PaletteEntry::new("#BBF7D0", "#14532D", "#4ADE80"), // green
    PaletteEntry::new("#A7F3D0", "#064E3B", "#34D399"), // emerald
    PaletteEntry::new("#99F6E4", "#134E4A", "#2DD4BF"), // teal
    PaletteEntry::new("#A5F3FC", "#164E63", "#22D3EE"), // cyan
    PaletteEntry::new("#BAE6FD", "#0C4A6E", "#38BDF8"), // sky
    PaletteEntry::new("#BFDBFE", "#1E3A8A", "#60A5FA"), // blue
    PaletteEntry::new("#C7D2FE", "#312E81", "#818CF8"), // indigo
    PaletteEntry::new("#DDD6FE", "#4C1D95", "#A78BFA"), // violet
    PaletteEntry::new("#E9D5FF", "#581C87", "#C084FC"), // purple
    PaletteEntry::new("#F5D0FE", "#701A75", "#E879F9"), // fuchsia
    PaletteEntry::new("#FBCFE8", "#831843", "#F472B6"), // pink
    PaletteEntry::new("#FECDD3", "#881337", "#FB7185"), // rose
    PaletteEntry::new("#FEF2F2", "#B91C1C", "#FECACA"), // red
    PaletteEntry::new("#FFF7ED", "#C2410C", "#FED7AA"), // orange
    PaletteEntry::new("#FFFBEB", "#B45309", "#FDE68A"), // amber
    PaletteEntry::new("#FEFCE8", "#A16207", "#FEF08A"), // yellow
    PaletteEntry::new("#F7FEE7", "#4D7C0F", "#D9F99D"), // lime
    PaletteEntry::new("#F0FDF4", "#15803D", "#BBF7D0"), // green
    PaletteEntry::new("#ECFDF5", "#047857", "#A7F3D0"), // emerald
    PaletteEntry::new("#F0FDFA", "#0F766E", "#99F6E4"), // teal
    PaletteEntry::new("#ECFEFF", "#0E7490", "#A5F3FC"), // cyan
    PaletteEntry::new("#F0F9FF", "#0369A1", "#BAE6FD"), // sky
    PaletteEntry::new("#EFF6FF", "#1D4ED8", "#BFDBFE"), // blue
    PaletteEntry::new("#EEF2FF", "#4338CA", "#C7D2FE"), // indigo
    PaletteEntry::new("#F5F3FF", "#6D28D9", "#DDD6FE"), // violet
    PaletteEntry::new("#FAF5FF", "#7E22CE", "#E9D5FF"), // purple
    PaletteEntry::new("#FDF4FF", "#A21CAF", "#F5D0FE"), // fuchsia
    PaletteEntry::new("#FDF2F8", "#BE185D", "#FBCFE8"), // pink
];

/// Parse `#RGB` / `#RRGGBB` (leading `#` optional, any case, surrounding
/// whitespace ignored).
pub fn parse_hex(input: &str) -> Option<Srgb<u8>> {
    let trimmed = input.trim();
    let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);
    // from_str_radix would take a sign, and slicing needs ASCII
    if !matches!(digits.len(), 3 | 6) || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    digits.parse::<Srgb<u8>>().ok()
}

/// Canonical uppercase `#RRGGBB`.
pub fn to_hex(color: Srgb<u8>) -> String {
    format!("#{:02X}{:02X}{:02X}", color.red, color.green, color.blue)
}

/// Canonical `#RRGGBB` form of a user-supplied hex color, or `None` if invalid.
pub fn normalize_hex(input: &str) -> Option<String> {
    parse_hex(input).map(to_hex)
}

/// WCAG relative luminance over the linearized channels. Range `0.0..=1.0`.
pub fn relative_luminance(color: Srgb<u8>) -> f64 {
    let linear: LinSrgb<f64> = color.into_format::<f64>().into_linear();
    0.2126 * linear.red + 0.7152 * linear.green + 0.0722 * linear.blue
}

pub fn contrast_text(background: Srgb<u8>) -> &'static str {
    if relative_luminance(background) > LUMINANCE_THRESHOLD {
        DARK_TEXT
    } else {
        LIGHT_TEXT
    }
}

/// Scale every encoded channel by `1 - amount`, rounded and clamped to `0..=255`.
pub fn darken(color: Srgb<u8>, amount: f64) -> Srgb<u8> {
    let scale = 1.0 - amount;
    let apply = |c: u8| (f64::from(c) * scale).round().clamp(0.0, 255.0) as u8;
    Srgb::new(apply(color.red), apply(color.green), apply(color.blue))
}

/// Palette slot for a product name: trimmed, lowercased, hashed.
/// A missing or blank name always lands on slot 0.
pub fn palette_index(name: Option<&str>) -> usize {
    let normalized = name.map(|n| n.trim().to_lowercase()).unwrap_or_default();
    bucket(&normalized, PALETTE.len())
}

/// Color set for a product name, preferring a valid explicit color.
pub fn get_product_color(name: Option<&str>, custom_hex: Option<&str>) -> ColorSet {
    match custom_hex.and_then(parse_hex) {
        Some(color) => custom_color_set(color),
        None => palette_color_set(&PALETTE[palette_index(name)]),
    }
}

pub fn product_color(product: &Product) -> ColorSet {
    get_product_color(Some(product.name.as_str()), product.color_hex.as_deref())
}

fn custom_color_set(color: Srgb<u8>) -> ColorSet {
    let text = contrast_text(color).to_string();
    ColorSet {
        background: to_hex(color),
        border: to_hex(darken(color, BORDER_DARKEN)),
        badge_background: format!(
            "rgba({}, {}, {}, {CUSTOM_BADGE_ALPHA})",
            color.red, color.green, color.blue
        ),
        badge_text: text.clone(),
        hover_background: to_hex(darken(color, HOVER_DARKEN)),
        hover_text: text.clone(),
        text,
    }
}

fn palette_color_set(entry: &PaletteEntry) -> ColorSet {
    ColorSet {
        background: entry.background.to_string(),
        text: entry.text.to_string(),
        border: entry.border.to_string(),
        badge_background: format!("{}{PALETTE_BADGE_ALPHA}", entry.background),
        badge_text: entry.text.to_string(),
        hover_background: entry.background.to_string(),
        hover_text: entry.text.to_string(),
    }
}
