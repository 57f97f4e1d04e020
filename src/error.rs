//! Structured error types for printmatch.
//!
//! Every error is scoped to one operation; nothing here is fatal to the
//! process. See the per-variant docs for the blast radius of each.

/// All errors that can occur while loading, reconciling, or applying sizes.
#[derive(Debug, thiserror::Error)]
pub enum PrintmatchError {
    /// XML parsing error from quick-xml.
    #[error("XML parsing: {0}")]
    Xml(#[from] quick_xml::Error),

    /// ZIP archive error.
    #[error("ZIP archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed or unreadable manifest file. Fatal to the one load
    /// operation; the previously loaded manifest is left untouched.
    #[error("manifest parse error: {0}")]
    Parse(String),

    /// Zero or negative current pixel extent when computing a scale factor.
    /// Aborts only the one size-apply operation.
    #[error("degenerate layer extent: {current_px}px")]
    DegenerateExtent { current_px: f64 },

    /// Selection index outside the current manifest. Rejected, no state
    /// change.
    #[error("record index {index} out of range (manifest has {len} records)")]
    OutOfRange { index: usize, len: usize },

    /// A size-apply was requested with no record selected.
    #[error("no record selected")]
    NoSelection,

    /// The record has no associated layer to act on.
    #[error("record {index} is not linked to a layer")]
    NotLinked { index: usize },

    /// Operator-supplied physical size that is not a positive finite pair.
    #[error("invalid physical size: {0}")]
    InvalidSize(String),

    /// A single host call (bounds read, layer select, transform) failed.
    /// Absorbed at per-layer/per-record granularity where possible.
    #[error("host error: {0}")]
    HostTransient(String),

    /// A reconciliation pass was requested while one is already in flight.
    #[error("reconciliation already in progress")]
    Busy,
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PrintmatchError>;
