//! printmatch - reconciles print order manifests with document layers
//!
//! Matches rows of a spreadsheet-derived print order manifest to layers in
//! an open image-editing document and drives millimeter-accurate resizing
//! of each matched layer:
//! - XLSX manifest decode (first sheet, fixed column contract)
//! - fuzzy article-in-layer-name matching, first match wins, 1:1
//! - mm <-> px conversion under an explicit, host-supplied DPI
//! - single-slot record selection and atomic scale application
//!
//! The host document API sits behind the [`host::LayerHost`] trait; the
//! core never talks to a live document directly.
//!
//! # Usage
//!
//! ```no_run
//! use printmatch::host::LayerHost;
//! use printmatch::session::PrintSession;
//!
//! fn run(host: impl LayerHost, bytes: &[u8]) -> printmatch::Result<()> {
//!     let mut session = PrintSession::new(host);
//!     session.load_manifest(Some(bytes))?;
//!     session.select_record(0)?;
//!     session.set_physical_size(0, 200.0, 250.0)?;
//!     session.apply_size_to_selected()
//! }
//! ```

pub mod error;
pub mod host;
pub mod manifest;
pub mod reconcile;
pub mod selection;
pub mod session;
pub mod size_codes;
pub mod units;

pub use error::{PrintmatchError, Result};
pub use host::{LayerHost, LayerId, LayerRef, PixelBounds};
pub use manifest::{ParserOptions, PrintRecord};
pub use reconcile::{AssociationTable, ReconciliationEngine};
pub use selection::SelectionController;
pub use session::{LoadOutcome, PrintSession, SessionOptions};
pub use size_codes::SizeMm;

/// Get the library version
#[must_use]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
