//! Manifest-to-layer reconciliation.
//!
//! The engine owns the manifest batch and the derived association table and
//! recomputes the table from scratch on every pass. Matching is a fuzzy
//! substring heuristic: a layer binds to the first not-yet-matched record
//! whose article occurs verbatim in the layer name. First match wins, one
//! record per layer, one layer per record.
//!
//! Known limitation, kept on purpose: when one article is a substring of
//! another ("ABC1" vs "ABC12"), the outcome depends on layer and record
//! order. Tests pin the current behavior.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{PrintmatchError, Result};
use crate::host::{LayerId, LayerRef};
use crate::manifest::PrintRecord;
use crate::units;

/// Bidirectional `layer id <-> record index` mapping.
///
/// A 1:1 partial function in both directions: at most one record per layer
/// and at most one layer per record. Fully recomputed on each pass, never
/// persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AssociationTable {
    layer_to_record: HashMap<LayerId, usize>,
    record_to_layer: HashMap<usize, LayerId>,
}

impl AssociationTable {
    fn bind(&mut self, layer: LayerId, record: usize) {
        self.layer_to_record.insert(layer, record);
        self.record_to_layer.insert(record, layer);
    }

    /// Record index matched to the given layer, if any.
    #[must_use]
    pub fn record_for_layer(&self, layer: LayerId) -> Option<usize> {
        self.layer_to_record.get(&layer).copied()
    }

    /// Layer matched to the given record index, if any.
    #[must_use]
    pub fn layer_for_record(&self, record: usize) -> Option<LayerId> {
        self.record_to_layer.get(&record).copied()
    }

    /// Number of matched pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.layer_to_record.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layer_to_record.is_empty()
    }

    /// Iterate matched `(record index, layer id)` pairs in no particular
    /// order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, LayerId)> + '_ {
        self.record_to_layer.iter().map(|(r, l)| (*r, *l))
    }
}

/// Owns one session's manifest batch and its layer associations.
///
/// Constructed explicitly per session; there are no ambient singletons.
/// The layer set stays host-owned: the engine only ever reads the
/// descriptors passed into [`ReconciliationEngine::reconcile`].
#[derive(Debug, Default)]
pub struct ReconciliationEngine {
    records: Vec<PrintRecord>,
    table: AssociationTable,
}

impl ReconciliationEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the manifest batch wholesale.
    ///
    /// The previous batch and its associations are discarded; loads never
    /// merge.
    pub fn load(&mut self, records: Vec<PrintRecord>) {
        self.records = records;
        self.table = AssociationTable::default();
    }

    /// Drop the manifest batch and all associations.
    pub fn clear(&mut self) {
        self.records.clear();
        self.table = AssociationTable::default();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn records(&self) -> &[PrintRecord] {
        &self.records
    }

    #[must_use]
    pub fn record(&self, index: usize) -> Option<&PrintRecord> {
        self.records.get(index)
    }

    #[must_use]
    pub fn association(&self) -> &AssociationTable {
        &self.table
    }

    /// Layer currently linked to the given record, if any.
    #[must_use]
    pub fn linked_layer(&self, index: usize) -> Option<LayerId> {
        self.records.get(index).and_then(|r| r.linked_layer_id)
    }

    /// Overwrite a record's free-text size label.
    pub fn set_size_label(&mut self, index: usize, label: &str) -> Result<()> {
        let len = self.records.len();
        let record = self
            .records
            .get_mut(index)
            .ok_or(PrintmatchError::OutOfRange { index, len })?;
        record.size_label = label.trim().to_string();
        Ok(())
    }

    /// Set a record's target physical size in millimeters.
    ///
    /// # Errors
    ///
    /// Rejects out-of-range indices and non-positive or non-finite sizes.
    pub fn set_physical_size(&mut self, index: usize, width_mm: f64, height_mm: f64) -> Result<()> {
        if !(width_mm.is_finite() && height_mm.is_finite() && width_mm > 0.0 && height_mm > 0.0) {
            return Err(PrintmatchError::InvalidSize(format!(
                "{width_mm}x{height_mm} mm"
            )));
        }
        let len = self.records.len();
        let record = self
            .records
            .get_mut(index)
            .ok_or(PrintmatchError::OutOfRange { index, len })?;
        record.set_size_mm(width_mm, height_mm);
        Ok(())
    }

    /// Recompute the association table against the given layer set.
    ///
    /// Single deterministic pass in layer order, nested pass over records
    /// still unmatched in this pass:
    ///
    /// - background layers never participate
    /// - a record with an empty article never matches, regardless of
    ///   substring semantics
    /// - the first unmatched record whose article occurs in the layer name
    ///   wins; the layer then stops scanning (one record per layer)
    /// - a matched record gets its physical size from the layer bounds at
    ///   `dpi`; a failed bounds read (`bounds: None`) is absorbed with a
    ///   warning and leaves the size untouched
    /// - records not matched in this pass keep their previous link and size
    ///
    /// The table is rebuilt off to the side and swapped in whole, so a
    /// reader never observes a half-updated pass. Idempotent for unchanged
    /// inputs.
    pub fn reconcile(&mut self, layers: &[LayerRef], dpi: f64) -> &AssociationTable {
        let mut table = AssociationTable::default();
        let mut matched = vec![false; self.records.len()];

        for layer in layers {
            if layer.is_background {
                continue;
            }

            for (index, record) in self.records.iter_mut().enumerate() {
                if matched.get(index).copied().unwrap_or(true) {
                    continue;
                }
                if record.article.is_empty() || !layer.name.contains(&record.article) {
                    continue;
                }

                record.linked_layer_id = Some(layer.id);
                match layer.bounds {
                    Some(bounds) => {
                        record.set_size_mm(
                            units::px_to_mm(bounds.width(), dpi),
                            units::px_to_mm(bounds.height(), dpi),
                        );
                    }
                    None => {
                        warn!(
                            layer = layer.id,
                            article = %record.article,
                            "bounds unavailable, leaving physical size unset"
                        );
                    }
                }

                table.bind(layer.id, index);
                if let Some(slot) = matched.get_mut(index) {
                    *slot = true;
                }
                break; // first match wins; one record per layer
            }
        }

        debug!(
            layers = layers.len(),
            records = self.records.len(),
            matched = table.len(),
            "reconciliation pass complete"
        );

        self.table = table;
        &self.table
    }
}
