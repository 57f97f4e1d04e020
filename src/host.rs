//! Capability boundary to the image-editing host.
//!
//! The reconciliation and unit-conversion logic never talks to a live
//! document directly; everything goes through [`LayerHost`] so the core can
//! be driven by a fake in tests. Hosts are expected to issue document
//! mutations one at a time; [`LayerHost::apply_scale`] is a single atomic
//! transform per invocation with no partial-application state.

use serde::Serialize;

use crate::error::Result;

/// Stable layer identity for the lifetime of a document session.
pub type LayerId = u32;

/// Pixel-space bounding box of a layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PixelBounds {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl PixelBounds {
    #[must_use]
    pub const fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }
}

/// One layer as enumerated by the host.
///
/// `bounds` is `None` when the host's bounds read failed transiently for
/// this layer; the engine binds the layer anyway but leaves the record's
/// physical size alone.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerRef {
    pub id: LayerId,
    pub name: String,
    pub bounds: Option<PixelBounds>,
    pub is_background: bool,
}

impl LayerRef {
    #[must_use]
    pub fn new(id: LayerId, name: &str, bounds: PixelBounds) -> Self {
        Self {
            id,
            name: name.to_string(),
            bounds: Some(bounds),
            is_background: false,
        }
    }

    /// The document background layer, never eligible for matching.
    #[must_use]
    pub fn background(id: LayerId, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            bounds: None,
            is_background: true,
        }
    }
}

/// The narrow host surface the session needs.
///
/// Implementations wrap a live document API (layer tree enumeration,
/// resolution query, selection, non-destructive scale) or a test double.
pub trait LayerHost {
    /// Enumerate layers in document order, background included.
    fn list_layers(&mut self) -> Result<Vec<LayerRef>>;

    /// Current document resolution in DPI.
    fn resolution(&mut self) -> Result<f64>;

    /// Make the given layer the active layer in the host UI.
    fn select_layer(&mut self, id: LayerId) -> Result<()>;

    /// Apply a non-destructive scale transform, in percent per axis.
    fn apply_scale(&mut self, id: LayerId, scale_x_percent: f64, scale_y_percent: f64)
        -> Result<()>;

    /// Invoke the external layout/placement script, if the host has one.
    ///
    /// The layout algorithm itself is out of scope here; the session only
    /// triggers it and re-reconciles afterwards.
    fn run_layout(&mut self) -> Result<()>;
}
