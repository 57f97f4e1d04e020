//! Manifest parsing - turns tabular rows into normalized print records.
//!
//! The input is the raw row grid of the first sheet of a print order
//! manifest. Row 0 is always the header. The column layout is fixed by
//! contract (a reordered manifest is silently misparsed, by design):
//!
//! | col | field      |
//! |-----|------------|
//! | 0   | photo      |
//! | 1   | size label |
//! | 2   | order id   |
//! | 3   | name       |
//! | 4   | color      |
//! | 5   | article    |

pub(crate) mod xlsx;

use serde::Serialize;

use crate::host::LayerId;
use crate::size_codes;

const COL_PHOTO: usize = 0;
const COL_SIZE_LABEL: usize = 1;
const COL_ORDER_ID: usize = 2;
const COL_NAME: usize = 3;
const COL_COLOR: usize = 4;
const COL_ARTICLE: usize = 5;

/// One normalized manifest row.
///
/// `article` is the join key against layer names: it is probed verbatim and
/// case-sensitively as a substring, and an empty article never matches.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrintRecord {
    /// Sequential index among kept records for this manifest load.
    ///
    /// This is the post-filter position, not the source row ordinal;
    /// skipped header/blank rows leave no gaps.
    pub row_index: usize,
    /// Opaque photo reference from the manifest, if any.
    pub photo: Option<String>,
    /// Free-text garment size label, e.g. "140" or "XS (40-42)".
    pub size_label: String,
    pub order_id: String,
    pub name: String,
    pub color: String,
    /// Product code joined against layer names.
    pub article: String,
    /// Target print width in millimeters; `None` until determined.
    pub physical_width_mm: Option<f64>,
    /// Target print height in millimeters; `None` until determined.
    pub physical_height_mm: Option<f64>,
    /// Current layer association, maintained by the reconciliation engine.
    pub linked_layer_id: Option<LayerId>,
}

impl PrintRecord {
    /// Record the physical target size, rounded for storage.
    pub(crate) fn set_size_mm(&mut self, width_mm: f64, height_mm: f64) {
        self.physical_width_mm = Some(crate::units::round_mm(width_mm));
        self.physical_height_mm = Some(crate::units::round_mm(height_mm));
    }
}

/// Parser behavior switches.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParserOptions {
    /// Pre-seed each record's physical size from the size-label tables.
    ///
    /// Off by default: sizes stay `None` until a layer match supplies them
    /// from pixel bounds. Both behaviors exist in this feature's lineage,
    /// so the choice is explicit rather than baked in.
    pub seed_physical_size: bool,
}

impl ParserOptions {
    /// Sizes come only from layer matches.
    #[must_use]
    pub fn unseeded() -> Self {
        Self {
            seed_physical_size: false,
        }
    }

    /// Sizes are pre-seeded from the size-label lookup tables.
    #[must_use]
    pub fn seeded() -> Self {
        Self {
            seed_physical_size: true,
        }
    }
}

fn field(row: &[String], col: usize) -> &str {
    row.get(col).map(|s| s.trim()).unwrap_or("")
}

/// A row is kept only if it carries at least one of the two load-bearing
/// columns. This drops stray blank rows from spreadsheet export without
/// losing rows that carry only a size label or only an article.
fn is_data_row(row: &[String]) -> bool {
    !field(row, COL_SIZE_LABEL).is_empty() || !field(row, COL_ARTICLE).is_empty()
}

/// Parse a manifest row grid into print records.
///
/// Row 0 (the header) is always skipped; blank and load-bearing-empty rows
/// are dropped. Infallible: malformed byte content fails earlier, in the
/// XLSX decode step.
#[must_use]
pub fn parse_rows(rows: &[Vec<String>], options: ParserOptions) -> Vec<PrintRecord> {
    let mut records = Vec::new();

    for row in rows.iter().skip(1) {
        if row.is_empty() || !is_data_row(row) {
            continue;
        }

        let size_label = field(row, COL_SIZE_LABEL).to_string();
        let photo = match field(row, COL_PHOTO) {
            "" => None,
            p => Some(p.to_string()),
        };

        let (width_mm, height_mm) = if options.seed_physical_size {
            let size = size_codes::resolve(&size_label);
            (Some(size.width), Some(size.height))
        } else {
            (None, None)
        };

        records.push(PrintRecord {
            row_index: records.len(),
            photo,
            size_label,
            order_id: field(row, COL_ORDER_ID).to_string(),
            name: field(row, COL_NAME).to_string(),
            color: field(row, COL_COLOR).to_string(),
            article: field(row, COL_ARTICLE).to_string(),
            physical_width_mm: width_mm,
            physical_height_mm: height_mm,
            linked_layer_id: None,
        });
    }

    tracing::debug!(records = records.len(), "parsed manifest rows");
    records
}

/// Decode a manifest workbook and parse its first sheet into records.
///
/// # Errors
///
/// A structurally malformed workbook fails the whole load; no partial
/// record set is produced.
pub fn parse_xlsx(data: &[u8], options: ParserOptions) -> crate::error::Result<Vec<PrintRecord>> {
    let rows = xlsx::read_first_sheet(data)?;
    Ok(parse_rows(&rows, options))
}
