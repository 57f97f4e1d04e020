//! Common test utilities: a scriptable fake host and record helpers.
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

use printmatch::error::{PrintmatchError, Result};
use printmatch::host::{LayerHost, LayerId, LayerRef, PixelBounds};
use printmatch::manifest::PrintRecord;

/// In-memory host double: a layer list, a resolution, and call recording.
#[derive(Debug, Clone)]
pub struct FakeHost {
    pub layers: Vec<LayerRef>,
    pub dpi: f64,
    pub scale_calls: Vec<(LayerId, f64, f64)>,
    pub selected_layers: Vec<LayerId>,
    pub layout_runs: usize,
    pub fail_list: bool,
    pub fail_select: bool,
    pub fail_apply: bool,
}

impl FakeHost {
    pub fn new(dpi: f64) -> Self {
        Self {
            layers: Vec::new(),
            dpi,
            scale_calls: Vec::new(),
            selected_layers: Vec::new(),
            layout_runs: 0,
            fail_list: false,
            fail_select: false,
            fail_apply: false,
        }
    }

    pub fn with_layers(dpi: f64, layers: Vec<LayerRef>) -> Self {
        let mut host = Self::new(dpi);
        host.layers = layers;
        host
    }

    pub fn push_layer(&mut self, id: LayerId, name: &str, bounds: PixelBounds) {
        self.layers.push(LayerRef::new(id, name, bounds));
    }
}

impl LayerHost for FakeHost {
    fn list_layers(&mut self) -> Result<Vec<LayerRef>> {
        if self.fail_list {
            return Err(PrintmatchError::HostTransient(
                "layer enumeration failed".to_string(),
            ));
        }
        Ok(self.layers.clone())
    }

    fn resolution(&mut self) -> Result<f64> {
        Ok(self.dpi)
    }

    fn select_layer(&mut self, id: LayerId) -> Result<()> {
        if self.fail_select {
            return Err(PrintmatchError::HostTransient(
                "select failed".to_string(),
            ));
        }
        self.selected_layers.push(id);
        Ok(())
    }

    fn apply_scale(&mut self, id: LayerId, scale_x_percent: f64, scale_y_percent: f64) -> Result<()> {
        if self.fail_apply {
            return Err(PrintmatchError::HostTransient("scale failed".to_string()));
        }
        // Mirror the document mutation so a later refresh sees new bounds
        let layer = self
            .layers
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| PrintmatchError::HostTransient(format!("no layer {id}")))?;
        if let Some(b) = layer.bounds.as_mut() {
            b.right = b.left + b.width() * scale_x_percent / 100.0;
            b.bottom = b.top + b.height() * scale_y_percent / 100.0;
        }
        self.scale_calls.push((id, scale_x_percent, scale_y_percent));
        Ok(())
    }

    fn run_layout(&mut self) -> Result<()> {
        self.layout_runs += 1;
        Ok(())
    }
}

/// A minimal record with the given article, for engine-level tests.
pub fn record(index: usize, article: &str) -> PrintRecord {
    PrintRecord {
        row_index: index,
        photo: None,
        size_label: String::new(),
        order_id: String::new(),
        name: String::new(),
        color: String::new(),
        article: article.to_string(),
        physical_width_mm: None,
        physical_height_mm: None,
        linked_layer_id: None,
    }
}
