//! Garment size label to print size lookup.
//!
//! Manifest rows carry a free-text size label ("140", "XS (40-42)", "6XL").
//! The leading alphanumeric token is looked up first in the child-size table
//! (height codes 122..152), then in the adult table (XS..6XL). Unrecognized
//! or empty labels fall back to [`SizeMm::DEFAULT`].

use serde::Serialize;

/// A physical print size in millimeters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SizeMm {
    pub width: f64,
    pub height: f64,
}

impl SizeMm {
    /// Fallback print size used whenever a label cannot be resolved.
    pub const DEFAULT: SizeMm = SizeMm {
        width: 200.0,
        height: 250.0,
    };

    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Extract the leading alphanumeric token from a size label.
///
/// Walks the trimmed label and collects ASCII letters and digits until the
/// first other character, uppercasing letters. "XS (40-42)" yields "XS",
/// "140 / 10y" yields "140". Returns an empty string for labels that do not
/// start with an alphanumeric character.
fn leading_token(label: &str) -> String {
    let mut token = String::new();
    for ch in label.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            token.push(ch.to_ascii_uppercase());
        } else {
            break;
        }
    }
    token
}

/// Child size table: garment height codes.
fn child_size(token: &str) -> Option<SizeMm> {
    let size = match token {
        "122" | "128" => SizeMm::new(180.0, 230.0),
        "134" | "140" => SizeMm::new(190.0, 240.0),
        "146" | "152" => SizeMm::new(200.0, 250.0),
        _ => return None,
    };
    Some(size)
}

/// Adult size table: letter codes XS through 6XL.
fn adult_size(token: &str) -> Option<SizeMm> {
    let size = match token {
        "XS" => SizeMm::new(220.0, 280.0),
        "S" => SizeMm::new(230.0, 290.0),
        "M" => SizeMm::new(240.0, 300.0),
        "L" => SizeMm::new(250.0, 310.0),
        "XL" => SizeMm::new(260.0, 320.0),
        "2XL" | "XXL" => SizeMm::new(270.0, 330.0),
        "3XL" | "4XL" => SizeMm::new(280.0, 340.0),
        "5XL" | "6XL" => SizeMm::new(290.0, 350.0),
        _ => return None,
    };
    Some(size)
}

/// Resolve a free-text size label to a print size in millimeters.
///
/// Total: always returns a size, falling back to [`SizeMm::DEFAULT`] when
/// no token can be extracted or no table entry matches.
#[must_use]
pub fn resolve(size_label: &str) -> SizeMm {
    let token = leading_token(size_label);
    if token.is_empty() {
        return SizeMm::DEFAULT;
    }
    child_size(&token)
        .or_else(|| adult_size(&token))
        .unwrap_or(SizeMm::DEFAULT)
}
