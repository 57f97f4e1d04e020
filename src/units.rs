//! Millimeter/pixel conversion and scale-factor math.
//!
//! DPI is always an explicit parameter supplied by the caller at conversion
//! time. The historical pinned-72-DPI constant (0.352778 mm per px) is just
//! `px_to_mm(1.0, 72.0)`; there is no hardcoded resolution anywhere else.

use crate::error::{PrintmatchError, Result};

const MM_PER_INCH: f64 = 25.4;

/// Convert millimeters to pixels at the given resolution.
#[must_use]
pub fn mm_to_px(mm: f64, dpi: f64) -> f64 {
    mm / MM_PER_INCH * dpi
}

/// Convert pixels to millimeters at the given resolution.
#[must_use]
pub fn px_to_mm(px: f64, dpi: f64) -> f64 {
    px * MM_PER_INCH / dpi
}

/// Round a millimeter value to one decimal place for record storage.
#[must_use]
pub fn round_mm(mm: f64) -> f64 {
    (mm * 10.0).round() / 10.0
}

/// Scale percentage that maps `current_px` onto `target_px`.
///
/// # Errors
///
/// Returns [`PrintmatchError::DegenerateExtent`] when `current_px` is zero
/// or negative; a zero-size layer bound must never be scaled.
pub fn scale_factor_percent(current_px: f64, target_px: f64) -> Result<f64> {
    if current_px <= 0.0 {
        return Err(PrintmatchError::DegenerateExtent { current_px });
    }
    Ok(target_px / current_px * 100.0)
}
