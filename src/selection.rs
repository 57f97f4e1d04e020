//! Single-slot record selection.

use crate::error::{PrintmatchError, Result};

/// Tracks which single record is active, if any.
///
/// The slot is only meaningful against the manifest batch it was selected
/// in; callers clear it whenever the batch is replaced.
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectionController {
    selected: Option<usize>,
}

impl SelectionController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Select a record by index.
    ///
    /// # Errors
    ///
    /// An index outside `[0, manifest_len)` is rejected with
    /// [`PrintmatchError::OutOfRange`] and leaves the slot unchanged;
    /// indices are never clamped.
    pub fn select(&mut self, index: usize, manifest_len: usize) -> Result<()> {
        if index >= manifest_len {
            return Err(PrintmatchError::OutOfRange {
                index,
                len: manifest_len,
            });
        }
        self.selected = Some(index);
        Ok(())
    }

    /// Currently selected record index, if any.
    #[must_use]
    pub fn current(&self) -> Option<usize> {
        self.selected
    }

    /// Empty the slot.
    pub fn clear(&mut self) {
        self.selected = None;
    }
}
