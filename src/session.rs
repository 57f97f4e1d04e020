//! Operator-facing session wrapping the engine, selection, and host.
//!
//! `PrintSession` is the one control surface: load/clear a manifest, run
//! the external layout step, select records, edit target sizes, and apply
//! a size to the selected record's layer. One session per document; the
//! engine state lives behind `Rc<RefCell<...>>` so readers share it, and an
//! overlapping reconciliation request is rejected with `Busy` instead of
//! observing a half-updated table.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, warn};

use crate::error::{PrintmatchError, Result};
use crate::host::{LayerHost, LayerId};
use crate::manifest::{self, ParserOptions, PrintRecord};
use crate::reconcile::{AssociationTable, ReconciliationEngine};
use crate::selection::SelectionController;
use crate::{size_codes, units};

/// Session behavior switches.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionOptions {
    pub parser: ParserOptions,
    /// Fixed DPI to use instead of asking the host. Normally unset; the
    /// document resolution is queried at every conversion site.
    pub dpi_override: Option<f64>,
}

/// Result of a manifest load request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Manifest replaced; carries the number of parsed records.
    Loaded(usize),
    /// The operator cancelled the file pick; nothing changed.
    Cancelled,
}

/// One operator session against one host document.
pub struct PrintSession<H: LayerHost> {
    host: H,
    engine: Rc<RefCell<ReconciliationEngine>>,
    selection: SelectionController,
    options: SessionOptions,
}

impl<H: LayerHost> PrintSession<H> {
    #[must_use]
    pub fn new(host: H) -> Self {
        Self::with_options(host, SessionOptions::default())
    }

    #[must_use]
    pub fn with_options(host: H, options: SessionOptions) -> Self {
        Self {
            host,
            engine: Rc::new(RefCell::new(ReconciliationEngine::new())),
            selection: SelectionController::new(),
            options,
        }
    }

    /// Shared handle to the engine state.
    #[must_use]
    pub fn engine(&self) -> Rc<RefCell<ReconciliationEngine>> {
        Rc::clone(&self.engine)
    }

    /// Direct access to the host, mainly for tests and shims.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    fn dpi(&mut self) -> Result<f64> {
        match self.options.dpi_override {
            Some(dpi) => Ok(dpi),
            None => self.host.resolution(),
        }
    }

    /// Load a manifest from a picked file.
    ///
    /// `None` means the operator cancelled the file pick; that is a
    /// non-error [`LoadOutcome::Cancelled`]. On success the previous batch
    /// is replaced wholesale, the selection is cleared, and a
    /// reconciliation pass runs against the host's current layers.
    ///
    /// # Errors
    ///
    /// A decode/parse failure is fatal to this load only; the previously
    /// loaded manifest stays in place.
    pub fn load_manifest(&mut self, picked: Option<&[u8]>) -> Result<LoadOutcome> {
        let Some(bytes) = picked else {
            debug!("file pick cancelled");
            return Ok(LoadOutcome::Cancelled);
        };

        let records = manifest::parse_xlsx(bytes, self.options.parser)?;
        let count = records.len();

        self.engine
            .try_borrow_mut()
            .map_err(|_| PrintmatchError::Busy)?
            .load(records);
        self.selection.clear();

        self.refresh()?;
        debug!(records = count, "manifest loaded");
        Ok(LoadOutcome::Loaded(count))
    }

    /// Drop the manifest batch, its associations, and the selection.
    pub fn clear_manifest(&mut self) -> Result<()> {
        self.engine
            .try_borrow_mut()
            .map_err(|_| PrintmatchError::Busy)?
            .clear();
        self.selection.clear();
        Ok(())
    }

    /// Re-reconcile against the host's current layer set.
    ///
    /// # Errors
    ///
    /// Returns [`PrintmatchError::Busy`] when a pass is already in flight;
    /// the previous table stays in place. Host enumeration failures
    /// propagate without touching the table.
    pub fn refresh(&mut self) -> Result<()> {
        let layers = self.host.list_layers()?;
        let dpi = self.dpi()?;
        self.engine
            .try_borrow_mut()
            .map_err(|_| PrintmatchError::Busy)?
            .reconcile(&layers, dpi);
        Ok(())
    }

    /// Invoke the host's external layout/placement step, then re-reconcile.
    pub fn run_layout(&mut self) -> Result<()> {
        self.host.run_layout()?;
        self.refresh()
    }

    /// Select a record and mirror the selection to its layer in the host.
    ///
    /// The range check is strict; a host failure while activating the
    /// layer is absorbed with a warning (the selection itself stands).
    pub fn select_record(&mut self, index: usize) -> Result<()> {
        let (len, linked) = {
            let engine = self
                .engine
                .try_borrow()
                .map_err(|_| PrintmatchError::Busy)?;
            (engine.len(), engine.linked_layer(index))
        };
        self.selection.select(index, len)?;

        if let Some(layer_id) = linked {
            if let Err(e) = self.host.select_layer(layer_id) {
                warn!(layer = layer_id, error = %e, "could not activate layer");
            }
        }
        Ok(())
    }

    /// Currently selected record index, if any.
    #[must_use]
    pub fn selection(&self) -> Option<usize> {
        self.selection.current()
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Layer id associated with the given record, if any.
    pub fn resolve_layer_id(&self, index: usize) -> Result<Option<LayerId>> {
        let engine = self
            .engine
            .try_borrow()
            .map_err(|_| PrintmatchError::Busy)?;
        Ok(engine.linked_layer(index))
    }

    /// Overwrite a record's size label.
    ///
    /// In seeded mode the record's physical size is re-derived from the
    /// size tables as well.
    pub fn set_size_label(&mut self, index: usize, label: &str) -> Result<()> {
        let mut engine = self
            .engine
            .try_borrow_mut()
            .map_err(|_| PrintmatchError::Busy)?;
        engine.set_size_label(index, label)?;
        if self.options.parser.seed_physical_size {
            let size = size_codes::resolve(label);
            engine.set_physical_size(index, size.width, size.height)?;
        }
        Ok(())
    }

    /// Set a record's target physical size in millimeters.
    pub fn set_physical_size(&mut self, index: usize, width_mm: f64, height_mm: f64) -> Result<()> {
        self.engine
            .try_borrow_mut()
            .map_err(|_| PrintmatchError::Busy)?
            .set_physical_size(index, width_mm, height_mm)
    }

    /// Scale the selected record's layer to the record's target size.
    ///
    /// Converts the millimeter target to pixels at the current resolution,
    /// derives per-axis scale percentages from the layer's current bounds,
    /// and issues one atomic scale transform to the host, then
    /// re-reconciles.
    ///
    /// # Errors
    ///
    /// `NoSelection` without a selected record, `NotLinked` when the record
    /// has no layer, `InvalidSize` when it has no target size,
    /// `DegenerateExtent` on a zero/negative current extent, and host
    /// errors from the transform itself. Each aborts only this operation.
    pub fn apply_size_to_selected(&mut self) -> Result<()> {
        let index = self
            .selection
            .current()
            .ok_or(PrintmatchError::NoSelection)?;

        let (layer_id, width_mm, height_mm) = {
            let engine = self
                .engine
                .try_borrow()
                .map_err(|_| PrintmatchError::Busy)?;
            let len = engine.len();
            let record = engine
                .record(index)
                .ok_or(PrintmatchError::OutOfRange { index, len })?;
            let layer_id = record
                .linked_layer_id
                .ok_or(PrintmatchError::NotLinked { index })?;
            let width_mm = record
                .physical_width_mm
                .ok_or_else(|| PrintmatchError::InvalidSize("no target width".to_string()))?;
            let height_mm = record
                .physical_height_mm
                .ok_or_else(|| PrintmatchError::InvalidSize("no target height".to_string()))?;
            (layer_id, width_mm, height_mm)
        };

        let dpi = self.dpi()?;
        let layers = self.host.list_layers()?;
        let layer = layers.iter().find(|l| l.id == layer_id).ok_or_else(|| {
            PrintmatchError::HostTransient(format!("layer {layer_id} no longer exists"))
        })?;
        let bounds = layer.bounds.ok_or_else(|| {
            PrintmatchError::HostTransient(format!("bounds unavailable for layer {layer_id}"))
        })?;

        let scale_x = units::scale_factor_percent(bounds.width(), units::mm_to_px(width_mm, dpi))?;
        let scale_y =
            units::scale_factor_percent(bounds.height(), units::mm_to_px(height_mm, dpi))?;

        self.host.apply_scale(layer_id, scale_x, scale_y)?;
        debug!(
            layer = layer_id,
            width_mm, height_mm, "applied physical size"
        );

        self.refresh()
    }

    /// Snapshot of all records in manifest order.
    pub fn records(&self) -> Result<Vec<PrintRecord>> {
        let engine = self
            .engine
            .try_borrow()
            .map_err(|_| PrintmatchError::Busy)?;
        Ok(engine.records().to_vec())
    }

    /// Snapshot of records currently linked to a layer, with their indices.
    pub fn matched_records(&self) -> Result<Vec<(usize, PrintRecord)>> {
        let engine = self
            .engine
            .try_borrow()
            .map_err(|_| PrintmatchError::Busy)?;
        Ok(engine
            .records()
            .iter()
            .enumerate()
            .filter(|(_, r)| r.linked_layer_id.is_some())
            .map(|(i, r)| (i, r.clone()))
            .collect())
    }

    /// Matched records whose article contains `query`, case-insensitively.
    pub fn filter_matched(&self, query: &str) -> Result<Vec<(usize, PrintRecord)>> {
        let needle = query.to_lowercase();
        let mut matched = self.matched_records()?;
        matched.retain(|(_, r)| r.article.to_lowercase().contains(&needle));
        Ok(matched)
    }

    /// Snapshot of the current association table.
    pub fn association(&self) -> Result<AssociationTable> {
        let engine = self
            .engine
            .try_borrow()
            .map_err(|_| PrintmatchError::Busy)?;
        Ok(engine.association().clone())
    }
}
